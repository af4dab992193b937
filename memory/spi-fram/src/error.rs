use embedded_hal_async::spi;

use crate::DeviceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// The bus failed while the device was being identified.
    BusUnavailable,
    /// The device id is not in the device table.
    UnsupportedDevice(DeviceId),
    /// The device does not support sleep mode.
    NotSupported,
    /// No address width is configured, so memory cannot be accessed.
    Unconfigured,
    /// Only two and three byte addresses are supported.
    InvalidAddressWidth,
    /// The access goes beyond the end of the device.
    Capacity,
    /// A transfer failed.
    Spi(spi::ErrorKind),
}

impl<SpiError> From<SpiError> for DriverError
where
    SpiError: spi::Error,
{
    fn from(value: SpiError) -> Self {
        Self::Spi(value.kind())
    }
}
