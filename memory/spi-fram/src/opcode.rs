/// Instruction set shared by the supported FRAM parts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Opcode {
    /// Set write enable latch
    WREN = 0b0000_0110,
    /// Reset write enable latch
    WRDI = 0b0000_0100,
    /// Read status register
    RDSR = 0b0000_0101,
    /// Write status register
    WRSR = 0b0000_0001,
    /// Read from memory array
    READ = 0b0000_0011,
    /// Write to memory array
    WRITE = 0b0000_0010,
    /// Read device id
    RDID = 0b1001_1111,
    /// Enter sleep mode
    SLEEP = 0b1011_1001,
}

impl Opcode {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}
