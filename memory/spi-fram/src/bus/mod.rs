//! [`SpiDevice`](embedded_hal_async::spi::SpiDevice) implementations for driving the FRAM
//! without a HAL provided device.
//!
//! Every transaction runs with chip select held by a [`SelectGuard`],
//! so chip select is released on every exit path, also when a transfer fails halfway.

mod bitbang;
mod exclusive;
mod select;
mod shared;

use embedded_hal::digital;
use embedded_hal_async::{
    delay::DelayNs,
    spi::{self, Operation, SpiBus},
};

pub use self::{
    bitbang::{BitBangBus, BitBangError},
    exclusive::ExclusiveDevice,
    select::SelectGuard,
    shared::SharedDevice,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError<BusError, PinError> {
    /// The bus failed.
    Spi(BusError),
    /// The chip select pin could not be set.
    Cs(PinError),
}

impl<BusError, PinError> spi::Error for DeviceError<BusError, PinError>
where
    BusError: spi::Error,
    PinError: digital::Error,
{
    fn kind(&self) -> spi::ErrorKind {
        match self {
            Self::Spi(e) => e.kind(),
            Self::Cs(_) => spi::ErrorKind::ChipSelectFault,
        }
    }
}

/// Run the operations of a transaction on a bus that is already selected.
///
/// The bus is flushed before returning, also when an operation fails,
/// so that chip select is never released while words are still being shifted.
/// The first error is returned.
async fn run<Bus, Delay>(
    bus: &mut Bus,
    delay: &mut Delay,
    operations: &mut [Operation<'_, u8>],
) -> Result<(), Bus::Error>
where
    Bus: SpiBus,
    Delay: DelayNs,
{
    let result = run_operations(bus, delay, operations).await;
    let flushed = bus.flush().await;
    result.and(flushed)
}

async fn run_operations<Bus, Delay>(
    bus: &mut Bus,
    delay: &mut Delay,
    operations: &mut [Operation<'_, u8>],
) -> Result<(), Bus::Error>
where
    Bus: SpiBus,
    Delay: DelayNs,
{
    for operation in operations {
        match operation {
            Operation::Read(words) => bus.read(words).await?,
            Operation::Write(words) => bus.write(words).await?,
            Operation::Transfer(read, write) => bus.transfer(read, write).await?,
            Operation::TransferInPlace(words) => bus.transfer_in_place(words).await?,
            Operation::DelayNs(ns) => {
                bus.flush().await?;
                delay.delay_ns(*ns).await;
            }
        }
    }
    Ok(())
}
