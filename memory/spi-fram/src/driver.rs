use core::slice;

use bitfield::bitfield;
use embedded_hal_async::{
    delay::DelayNs,
    spi::{Operation, SpiDevice},
};

use crate::{
    device::{lookup, DeviceDescriptor, DeviceId},
    frame::{AddressWidth, Frame},
    opcode::Opcode,
    DriverError,
};

bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct StatusRegister(u8);
    impl Debug;
    /// Status register write protection
    pub wpen, set_wpen: 7;
    /// Reserved for future use
    reserved, _: 6, 4;
    /// Block write protection
    pub bp, set_bp: 3, 2;
    /// Write enable latch
    pub wel, _: 1;
}

impl From<u8> for StatusRegister {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<StatusRegister> for u8 {
    fn from(value: StatusRegister) -> Self {
        value.0
    }
}

/// Time chip select is held asserted to start the recovery from sleep.
const WAKE_SELECT_HOLD_US: u32 = 300;
/// Time after releasing chip select before the device accepts commands, completing tREC (max 400us).
const WAKE_SETTLE_US: u32 = 100;
/// Additional recovery time when waking from hibernate (450us total).
const HIBERNATE_EXTRA_US: u32 = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    Active,
    Asleep,
}

pub struct Driver<Spi, Delay>
where
    Spi: SpiDevice,
    Delay: DelayNs,
{
    spi: Spi,
    delay: Delay,
    address_width: Option<AddressWidth>,
    device: Option<&'static DeviceDescriptor>,
    power: PowerState,
}

impl<Spi, Delay> Driver<Spi, Delay>
where
    Spi: SpiDevice,
    Delay: DelayNs,
{
    pub const fn new(spi: Spi, delay: Delay) -> Self {
        Self {
            spi,
            delay,
            address_width: None,
            device: None,
            power: PowerState::Active,
        }
    }

    /// Identify the device and configure the address width from its capacity.
    ///
    /// If the device is not known, the address width is left as is.
    /// Status register access still works, and memory can be accessed after
    /// a manual [`Driver::set_address_width()`].
    pub async fn initialize(&mut self) -> Result<&'static DeviceDescriptor, DriverError> {
        let id = match self.read_device_id().await {
            Ok(id) => id,
            Err(e) => {
                warn!("Unable to read device id: {:?}", e);
                return Err(DriverError::BusUnavailable);
            }
        };

        let Some(device) = lookup(id.manufacturer_id, id.product_id) else {
            warn!("Unexpected device {:?}", id);
            self.device = None;
            return Err(DriverError::UnsupportedDevice(id));
        };

        let address_width = device.address_width();
        debug!(
            "Found {} with {} bytes, using {} byte addresses",
            device.name,
            device.size_bytes,
            address_width.bytes()
        );

        self.device = Some(device);
        self.address_width = Some(address_width);
        Ok(device)
    }

    /// The device found by [`Driver::initialize()`].
    pub const fn device(&self) -> Option<&'static DeviceDescriptor> {
        self.device
    }

    /// Get the FRAM capacity in bytes.
    pub fn capacity(&self) -> Option<u32> {
        self.device.map(|device| device.size_bytes)
    }

    pub const fn address_width(&self) -> Option<AddressWidth> {
        self.address_width
    }

    /// Override the address width, e.g. for a device that is not in the device table.
    pub fn set_address_width(&mut self, address_width: AddressWidth) {
        self.address_width = Some(address_width);
    }

    /// Whether the device was last put to sleep or woken.
    ///
    /// Memory must not be accessed while the device is asleep, this is not checked.
    pub const fn power_state(&self) -> PowerState {
        self.power
    }

    /// Read the manufacturer and product id.
    pub async fn read_device_id(&mut self) -> Result<DeviceId, DriverError> {
        const TX: [u8; 1] = [Opcode::RDID.as_u8()];
        let mut rx = [0; 4];
        self.spi
            .transaction(&mut [Operation::Write(&TX), Operation::Read(&mut rx)])
            .await?;
        Ok(DeviceId::decode(rx))
    }

    /// Set or reset the write enable latch.
    ///
    /// The latch must be set before every memory or status register write,
    /// the device resets it when the write completes.
    pub async fn write_enable(&mut self, enable: bool) -> Result<(), DriverError> {
        let opcode = if enable { Opcode::WREN } else { Opcode::WRDI };
        self.spi.write(&[opcode.as_u8()]).await?;
        Ok(())
    }

    /// Write a single byte to the FRAM.
    pub async fn write8(&mut self, address: u32, value: u8) -> Result<(), DriverError> {
        self.write(address, slice::from_ref(&value)).await
    }

    /// Write a sequence of bytes to the FRAM.
    pub async fn write(&mut self, address: u32, buffer: &[u8]) -> Result<(), DriverError> {
        let frame = self.frame(Opcode::WRITE, address)?;
        self.spi
            .transaction(&mut [
                Operation::Write(frame.as_ref()),
                Operation::Write(buffer),
            ])
            .await?;
        Ok(())
    }

    /// Read a single byte from the FRAM.
    pub async fn read8(&mut self, address: u32) -> Result<u8, DriverError> {
        let mut value = 0;
        self.read(address, slice::from_mut(&mut value)).await?;
        Ok(value)
    }

    /// Read a sequence of bytes from the FRAM.
    pub async fn read(&mut self, address: u32, buffer: &mut [u8]) -> Result<(), DriverError> {
        let frame = self.frame(Opcode::READ, address)?;
        self.spi
            .transaction(&mut [Operation::Write(frame.as_ref()), Operation::Read(buffer)])
            .await?;
        Ok(())
    }

    pub async fn read_status_register(&mut self) -> Result<StatusRegister, DriverError> {
        const TX: [u8; 1] = [Opcode::RDSR.as_u8()];
        let mut value = 0;
        self.spi
            .transaction(&mut [
                Operation::Write(&TX),
                Operation::Read(slice::from_mut(&mut value)),
            ])
            .await?;
        Ok(StatusRegister(value))
    }

    pub async fn write_status_register(&mut self, value: StatusRegister) -> Result<(), DriverError> {
        self.spi.write(&[Opcode::WRSR.as_u8(), value.0]).await?;
        Ok(())
    }

    /// Put the device to sleep.
    pub async fn sleep(&mut self) -> Result<(), DriverError> {
        const TX: [u8; 1] = [Opcode::SLEEP.as_u8()];
        self.sleep_capable_device()?;

        self.spi.write(&TX).await?;
        trace!("Device is asleep");
        self.power = PowerState::Asleep;
        Ok(())
    }

    /// Wake the device from sleep.
    ///
    /// The device starts recovering on the falling edge of chip select,
    /// which must not fall again before the recovery time has passed.
    pub async fn wake(&mut self) -> Result<(), DriverError> {
        let device = self.sleep_capable_device()?;

        self.spi
            .transaction(&mut [Operation::DelayNs(WAKE_SELECT_HOLD_US * 1_000)])
            .await?;
        self.delay.delay_us(WAKE_SETTLE_US).await;
        if device.hibernates() {
            self.delay.delay_us(HIBERNATE_EXTRA_US).await;
        }

        trace!("Device is awake");
        self.power = PowerState::Active;
        Ok(())
    }

    /// Release the bus and delay.
    pub fn release(self) -> (Spi, Delay) {
        (self.spi, self.delay)
    }

    fn frame(&self, opcode: Opcode, address: u32) -> Result<Frame, DriverError> {
        let address_width = self.address_width.ok_or(DriverError::Unconfigured)?;
        Ok(Frame::new(opcode, address, address_width))
    }

    fn sleep_capable_device(&self) -> Result<&'static DeviceDescriptor, DriverError> {
        match self.device {
            Some(device) if device.supports_sleep => Ok(device),
            _ => Err(DriverError::NotSupported),
        }
    }
}
