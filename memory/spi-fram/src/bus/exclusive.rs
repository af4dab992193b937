use embedded_hal::digital::OutputPin;
use embedded_hal_async::{
    delay::DelayNs,
    spi::{ErrorType, Operation, SpiBus, SpiDevice},
};

use super::{run, DeviceError, SelectGuard};

/// A device with a bus of its own.
pub struct ExclusiveDevice<Bus, Cs, Delay> {
    bus: Bus,
    cs: Cs,
    delay: Delay,
}

impl<Bus, Cs, Delay> ExclusiveDevice<Bus, Cs, Delay>
where
    Bus: SpiBus,
    Cs: OutputPin,
    Delay: DelayNs,
{
    /// Create the device, deasserting chip select.
    pub fn new(bus: Bus, mut cs: Cs, delay: Delay) -> Result<Self, Cs::Error> {
        cs.set_high()?;
        Ok(Self { bus, cs, delay })
    }

    pub fn release(self) -> (Bus, Cs, Delay) {
        (self.bus, self.cs, self.delay)
    }
}

impl<Bus, Cs, Delay> ErrorType for ExclusiveDevice<Bus, Cs, Delay>
where
    Bus: SpiBus,
    Cs: OutputPin,
{
    type Error = DeviceError<Bus::Error, Cs::Error>;
}

impl<Bus, Cs, Delay> SpiDevice for ExclusiveDevice<Bus, Cs, Delay>
where
    Bus: SpiBus,
    Cs: OutputPin,
    Delay: DelayNs,
{
    async fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        let guard = SelectGuard::assert(&mut self.cs).map_err(DeviceError::Cs)?;
        let result = run(&mut self.bus, &mut self.delay, operations)
            .await
            .map_err(DeviceError::Spi);
        let released = guard.release().map_err(DeviceError::Cs);
        result.and(released)
    }
}
