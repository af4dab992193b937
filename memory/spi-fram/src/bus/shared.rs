use embassy_sync::{blocking_mutex::raw::RawMutex, mutex::Mutex};
use embedded_hal::digital::OutputPin;
use embedded_hal_async::{
    delay::DelayNs,
    spi::{ErrorType, Operation, SpiBus, SpiDevice},
};

use super::{run, DeviceError, SelectGuard};

/// A device on a bus shared with other devices.
///
/// The bus is claimed for the duration of each transaction.
pub struct SharedDevice<'a, M: RawMutex, Bus, Cs, Delay> {
    bus: &'a Mutex<M, Bus>,
    cs: Cs,
    delay: Delay,
}

impl<'a, M, Bus, Cs, Delay> SharedDevice<'a, M, Bus, Cs, Delay>
where
    M: RawMutex,
    Bus: SpiBus,
    Cs: OutputPin,
    Delay: DelayNs,
{
    /// Create the device, deasserting chip select.
    pub fn new(bus: &'a Mutex<M, Bus>, mut cs: Cs, delay: Delay) -> Result<Self, Cs::Error> {
        cs.set_high()?;
        Ok(Self { bus, cs, delay })
    }

    pub fn release(self) -> (Cs, Delay) {
        (self.cs, self.delay)
    }
}

impl<M, Bus, Cs, Delay> ErrorType for SharedDevice<'_, M, Bus, Cs, Delay>
where
    M: RawMutex,
    Bus: SpiBus,
    Cs: OutputPin,
{
    type Error = DeviceError<Bus::Error, Cs::Error>;
}

impl<M, Bus, Cs, Delay> SpiDevice for SharedDevice<'_, M, Bus, Cs, Delay>
where
    M: RawMutex,
    Bus: SpiBus,
    Cs: OutputPin,
    Delay: DelayNs,
{
    async fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        // Chip select is released before the bus, as the guards drop in reverse order.
        let mut bus = self.bus.lock().await;
        let guard = SelectGuard::assert(&mut self.cs).map_err(DeviceError::Cs)?;
        let result = run(&mut *bus, &mut self.delay, operations)
            .await
            .map_err(DeviceError::Spi);
        let released = guard.release().map_err(DeviceError::Cs);
        result.and(released)
    }
}
