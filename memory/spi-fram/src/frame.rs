use crate::{opcode::Opcode, DriverError};

/// Opcode followed by the widest supported address.
const FRAME_MAX: usize = 1 + 3;

/// Largest capacity that can be addressed with two address bytes.
const TWO_BYTE_CAPACITY: u32 = 64 * 1024;

/// Number of address bytes sent after a READ or WRITE opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressWidth {
    Two = 2,
    Three = 3,
}

impl AddressWidth {
    /// Get the address width needed for a device of the given capacity.
    ///
    /// Capacities beyond what fits in three bytes are still addressed with three,
    /// four byte addressing is not supported.
    pub const fn for_capacity(size_bytes: u32) -> Self {
        if size_bytes > TWO_BYTE_CAPACITY {
            AddressWidth::Three
        } else {
            AddressWidth::Two
        }
    }

    pub const fn bytes(self) -> usize {
        self as usize
    }

    /// The highest address that survives the truncation to this width.
    pub const fn max_address(self) -> u32 {
        match self {
            AddressWidth::Two => 0xFFFF,
            AddressWidth::Three => 0xFF_FFFF,
        }
    }
}

impl TryFrom<u8> for AddressWidth {
    type Error = DriverError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(AddressWidth::Two),
            3 => Ok(AddressWidth::Three),
            _ => Err(DriverError::InvalidAddressWidth),
        }
    }
}

/// The opcode and address header of a memory access.
///
/// Address bits above the width are dropped without notice.
pub(crate) struct Frame {
    buf: [u8; FRAME_MAX],
    len: usize,
}

impl Frame {
    pub const fn new(opcode: Opcode, address: u32, width: AddressWidth) -> Self {
        let [_, a2, a1, a0] = address.to_be_bytes();
        match width {
            AddressWidth::Two => Self {
                buf: [opcode.as_u8(), a1, a0, 0],
                len: 3,
            },
            AddressWidth::Three => Self {
                buf: [opcode.as_u8(), a2, a1, a0],
                len: 4,
            },
        }
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_byte_address() {
        let frame = Frame::new(Opcode::READ, 0x1234, AddressWidth::Two);
        assert_eq!(&[0b0011, 0x12, 0x34], frame.as_ref());
    }

    #[test]
    fn three_byte_address() {
        let frame = Frame::new(Opcode::READ, 0x123456, AddressWidth::Three);
        assert_eq!(&[0b0011, 0x12, 0x34, 0x56], frame.as_ref());
    }

    #[test]
    fn zero_address_is_sent_in_full() {
        let frame = Frame::new(Opcode::WRITE, 0x000000, AddressWidth::Three);
        assert_eq!(&[0b0010, 0x00, 0x00, 0x00], frame.as_ref());
    }

    #[test]
    fn high_address_bits_are_truncated() {
        let frame = Frame::new(Opcode::WRITE, 0x12345678, AddressWidth::Two);
        assert_eq!(&[0b0010, 0x56, 0x78], frame.as_ref());

        let frame = Frame::new(Opcode::WRITE, 0x12345678, AddressWidth::Three);
        assert_eq!(&[0b0010, 0x34, 0x56, 0x78], frame.as_ref());
    }

    #[test]
    fn width_from_capacity() {
        assert_eq!(AddressWidth::Two, AddressWidth::for_capacity(2 * 1024));
        assert_eq!(AddressWidth::Two, AddressWidth::for_capacity(64 * 1024));
        assert_eq!(AddressWidth::Three, AddressWidth::for_capacity(64 * 1024 + 1));
        assert_eq!(AddressWidth::Three, AddressWidth::for_capacity(512 * 1024));
        assert_eq!(AddressWidth::Three, AddressWidth::for_capacity(u32::MAX));
    }

    #[test]
    fn width_from_byte_count() {
        assert_eq!(Ok(AddressWidth::Two), AddressWidth::try_from(2));
        assert_eq!(Ok(AddressWidth::Three), AddressWidth::try_from(3));
        assert_eq!(Err(DriverError::InvalidAddressWidth), AddressWidth::try_from(0));
        assert_eq!(Err(DriverError::InvalidAddressWidth), AddressWidth::try_from(1));
        assert_eq!(Err(DriverError::InvalidAddressWidth), AddressWidth::try_from(4));
    }

    #[test]
    fn max_address() {
        assert_eq!(0xFFFF, AddressWidth::Two.max_address());
        assert_eq!(0xFF_FFFF, AddressWidth::Three.max_address());
    }
}
