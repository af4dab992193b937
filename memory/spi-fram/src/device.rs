use crate::AddressWidth;

/// JEDEC manufacturer id of Fujitsu.
const FUJITSU: u8 = 0x04;
/// JEDEC manufacturer id reported by Cypress (first continuation bank).
const CYPRESS: u8 = 0x7F;
/// JEDEC manufacturer id of Lapis.
const LAPIS: u8 = 0xAE;

/// JEDEC bank continuation code.
const CONTINUATION_CODE: u8 = 0x7F;

/// Identity reported by the RDID command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceId {
    pub manufacturer_id: u8,
    pub product_id: u16,
}

impl DeviceId {
    pub const fn new(manufacturer_id: u8, product_id: u16) -> Self {
        Self {
            manufacturer_id,
            product_id,
        }
    }

    /// Decode the first four bytes of an RDID response.
    ///
    /// Vendors using a JEDEC continuation bank report `0x7F` as the second byte,
    /// in which case the product id follows it.
    pub const fn decode(response: [u8; 4]) -> Self {
        let [manufacturer_id, a1, a2, a3] = response;
        let product_id = if a1 == CONTINUATION_CODE {
            u16::from_be_bytes([a2, a3])
        } else {
            u16::from_be_bytes([a1, a2])
        };
        Self::new(manufacturer_id, product_id)
    }
}

/// A known FRAM part.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceDescriptor {
    /// Part number
    pub name: &'static str,
    pub manufacturer_id: u8,
    pub product_id: u16,
    /// Capacity in bytes
    pub size_bytes: u32,
    /// Whether the part implements the SLEEP command
    pub supports_sleep: bool,
}

impl DeviceDescriptor {
    pub const fn new(
        name: &'static str,
        manufacturer_id: u8,
        product_id: u16,
        size_bytes: u32,
        supports_sleep: bool,
    ) -> Self {
        Self {
            name,
            manufacturer_id,
            product_id,
            size_bytes,
            supports_sleep,
        }
    }

    pub const fn id(&self) -> DeviceId {
        DeviceId::new(self.manufacturer_id, self.product_id)
    }

    pub const fn address_width(&self) -> AddressWidth {
        AddressWidth::for_capacity(self.size_bytes)
    }

    /// Whether the part enters hibernate rather than sleep, which takes longer to recover from.
    pub const fn hibernates(&self) -> bool {
        self.manufacturer_id == FUJITSU && (self.product_id & 0xFF) == 0x0B
    }
}

/// All supported parts, in ascending id order per manufacturer.
pub static DEVICES: [DeviceDescriptor; 11] = [
    DeviceDescriptor::new("MB85RS16", FUJITSU, 0x0101, 2 * 1024, false),
    DeviceDescriptor::new("MB85RS64V", FUJITSU, 0x0302, 8 * 1024, false),
    DeviceDescriptor::new("MB85RS64T", FUJITSU, 0x2303, 8 * 1024, true),
    DeviceDescriptor::new("MB85RS256TY", FUJITSU, 0x2503, 32 * 1024, true),
    DeviceDescriptor::new("MB85RS1MT", FUJITSU, 0x2703, 128 * 1024, true),
    DeviceDescriptor::new("MB85RS2MTA", FUJITSU, 0x4803, 256 * 1024, true),
    DeviceDescriptor::new("MB85RS2MT", FUJITSU, 0x2803, 256 * 1024, true),
    DeviceDescriptor::new("MB85RS4MT", FUJITSU, 0x4903, 512 * 1024, true),
    DeviceDescriptor::new("MB85RS4MTY", FUJITSU, 0x490B, 512 * 1024, true),
    // The manufacturer is 7F7F7F7F7F7FC2 and the device 0x2200, so only continuation codes are seen.
    DeviceDescriptor::new("FM25V02", CYPRESS, 0x7F7F, 32 * 1024, false),
    DeviceDescriptor::new("MR45V064B", LAPIS, 0x8305, 8 * 1024, false),
];

/// Find the part with the given id.
pub fn lookup(manufacturer_id: u8, product_id: u16) -> Option<&'static DeviceDescriptor> {
    DEVICES
        .iter()
        .find(|d| d.manufacturer_id == manufacturer_id && d.product_id == product_id)
}
