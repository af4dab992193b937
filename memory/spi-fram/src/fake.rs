use core::convert::Infallible;

use embedded_hal_async::spi::{ErrorType, Operation, SpiDevice};

use crate::opcode::Opcode;

const WEL: u8 = 0x02;
/// Bits writable through WRSR: WPEN and BP1..BP0.
const WRSR_MASK: u8 = 0x8C;

/// A simulated FRAM chip behind a dedicated chip select.
pub struct FakeFram {
    pub memory: Vec<u8>,
    pub status: u8,
    id: [u8; 4],
    address_bytes: usize,
}

/// Decoding state of the command currently clocked in.
#[derive(Default)]
struct Command {
    opcode: Option<u8>,
    address: u32,
    address_left: usize,
    id_offset: usize,
    written: bool,
}

impl FakeFram {
    pub fn new(id: [u8; 4], size: usize, address_bytes: usize) -> Self {
        Self {
            memory: vec![0xFF; size],
            status: 0x00,
            id,
            address_bytes,
        }
    }

    fn clock_in(&mut self, command: &mut Command, word: u8) {
        let Some(opcode) = command.opcode else {
            command.opcode = Some(word);
            match word {
                op if op == Opcode::WREN.as_u8() => self.status |= WEL,
                op if op == Opcode::WRDI.as_u8() => self.status &= !WEL,
                op if op == Opcode::READ.as_u8() || op == Opcode::WRITE.as_u8() => {
                    command.address_left = self.address_bytes
                }
                _ => {}
            }
            return;
        };

        if command.address_left > 0 {
            command.address = command.address << 8 | word as u32;
            command.address_left -= 1;
            return;
        }

        if opcode == Opcode::WRITE.as_u8() && self.status & WEL != 0 {
            let len = self.memory.len();
            self.memory[command.address as usize % len] = word;
            command.address += 1;
            command.written = true;
        } else if opcode == Opcode::WRSR.as_u8() && self.status & WEL != 0 {
            self.status = (word & WRSR_MASK) | (self.status & !WRSR_MASK);
            command.written = true;
        }
    }

    fn clock_out(&mut self, command: &mut Command) -> u8 {
        match command.opcode {
            Some(op) if op == Opcode::READ.as_u8() && command.address_left == 0 => {
                let len = self.memory.len();
                let word = self.memory[command.address as usize % len];
                command.address += 1;
                word
            }
            Some(op) if op == Opcode::RDID.as_u8() => {
                let word = self.id.get(command.id_offset).copied().unwrap_or(0x00);
                command.id_offset += 1;
                word
            }
            Some(op) if op == Opcode::RDSR.as_u8() => self.status,
            _ => 0xFF,
        }
    }
}

impl ErrorType for FakeFram {
    type Error = Infallible;
}

impl SpiDevice for FakeFram {
    async fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
        let mut command = Command::default();

        for operation in operations {
            match operation {
                Operation::Read(words) => {
                    for word in words.iter_mut() {
                        *word = self.clock_out(&mut command);
                    }
                }
                Operation::Write(words) => {
                    for word in words.iter() {
                        self.clock_in(&mut command, *word);
                    }
                }
                Operation::Transfer(read, write) => {
                    for i in 0..usize::max(read.len(), write.len()) {
                        let out = self.clock_out(&mut command);
                        if let Some(word) = read.get_mut(i) {
                            *word = out;
                        }
                        self.clock_in(&mut command, write.get(i).copied().unwrap_or(0x00));
                    }
                }
                Operation::TransferInPlace(words) => {
                    for word in words.iter_mut() {
                        let out = self.clock_out(&mut command);
                        self.clock_in(&mut command, *word);
                        *word = out;
                    }
                }
                Operation::DelayNs(_) => {}
            }
        }

        // Deselecting after a completed write resets the write enable latch.
        if command.written {
            self.status &= !WEL;
        }

        Ok(())
    }
}
