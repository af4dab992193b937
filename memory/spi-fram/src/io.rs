//! [`embedded_io_async`] adapter for a configured [`Driver`].

use embedded_hal_async::{delay::DelayNs, spi::SpiDevice};
use embedded_io_async::{Error, ErrorKind, ErrorType, Read, Seek, SeekFrom, Write};

use crate::{Driver, DriverError};

impl Error for DriverError {
    fn kind(&self) -> ErrorKind {
        match self {
            DriverError::Capacity => ErrorKind::InvalidInput,
            DriverError::NotSupported => ErrorKind::Unsupported,
            _ => ErrorKind::Other,
        }
    }
}

/// A stateful read/write position on the FRAM.
///
/// Writes set the write enable latch before writing.
pub struct Cursor<Spi, Delay>
where
    Spi: SpiDevice,
    Delay: DelayNs,
{
    pub driver: Driver<Spi, Delay>,
    position: u32,
}

impl<Spi, Delay> Cursor<Spi, Delay>
where
    Spi: SpiDevice,
    Delay: DelayNs,
{
    pub const fn new(driver: Driver<Spi, Delay>) -> Self {
        Self {
            driver,
            position: 0,
        }
    }

    pub const fn position(&self) -> u32 {
        self.position
    }

    pub fn into_inner(self) -> Driver<Spi, Delay> {
        self.driver
    }

    fn remaining(&self) -> Result<usize, DriverError> {
        let capacity = self.driver.capacity().ok_or(DriverError::Unconfigured)?;
        Ok(capacity.saturating_sub(self.position) as usize)
    }
}

impl<Spi, Delay> ErrorType for Cursor<Spi, Delay>
where
    Spi: SpiDevice,
    Delay: DelayNs,
{
    type Error = DriverError;
}

impl<Spi, Delay> Seek for Cursor<Spi, Delay>
where
    Spi: SpiDevice,
    Delay: DelayNs,
{
    async fn seek(&mut self, pos: SeekFrom) -> Result<u64, Self::Error> {
        let capacity = self.driver.capacity().ok_or(DriverError::Unconfigured)? as i64;
        let pos = match pos {
            SeekFrom::Start(offset) => i64::try_from(offset).map_err(|_| DriverError::Capacity)?,
            SeekFrom::End(offset) => capacity
                .checked_add(offset)
                .ok_or(DriverError::Capacity)?,
            SeekFrom::Current(offset) => (self.position as i64)
                .checked_add(offset)
                .ok_or(DriverError::Capacity)?,
        };

        if !(0..=capacity).contains(&pos) {
            return Err(DriverError::Capacity);
        }

        self.position = pos as u32;
        Ok(pos as u64)
    }
}

impl<Spi, Delay> Read for Cursor<Spi, Delay>
where
    Spi: SpiDevice,
    Delay: DelayNs,
{
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let length = usize::min(buf.len(), self.remaining()?);
        if length == 0 {
            return Ok(0);
        }

        self.driver.read(self.position, &mut buf[..length]).await?;
        self.position += length as u32;
        Ok(length)
    }
}

impl<Spi, Delay> Write for Cursor<Spi, Delay>
where
    Spi: SpiDevice,
    Delay: DelayNs,
{
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }

        let length = usize::min(buf.len(), self.remaining()?);
        if length == 0 {
            return Err(DriverError::Capacity);
        }

        self.driver.write_enable(true).await?;
        self.driver.write(self.position, &buf[..length]).await?;
        self.position += length as u32;
        Ok(length)
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        // Writes complete at bus speed, there is no write cycle to wait for.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use embedded_hal_async_mocks::delay::MockDelay;

    use crate::fake::FakeFram;

    use super::*;

    const MB85RS16: [u8; 4] = [0x04, 0x7F, 0x01, 0x01];

    async fn cursor() -> Cursor<FakeFram, MockDelay> {
        let mut driver = Driver::new(FakeFram::new(MB85RS16, 2 * 1024, 2), MockDelay::new());
        driver.initialize().await.unwrap();
        Cursor::new(driver)
    }

    #[tokio::test]
    async fn write_advances_position() {
        let mut cursor = cursor().await;

        cursor.write_all(b"hello").await.unwrap();
        cursor.write_all(b" world").await.unwrap();
        assert_eq!(11, cursor.position());

        cursor.seek(SeekFrom::Start(0)).await.unwrap();
        let mut buf = [0; 11];
        cursor.read_exact(&mut buf).await.unwrap();
        assert_eq!(b"hello world", &buf);
    }

    #[tokio::test]
    async fn read_stops_at_end() {
        let mut cursor = cursor().await;

        assert_eq!(2044, cursor.seek(SeekFrom::End(-4)).await.unwrap());
        let mut buf = [0; 8];
        assert_eq!(4, cursor.read(&mut buf).await.unwrap());
        assert_eq!(0, cursor.read(&mut buf).await.unwrap());
    }

    #[tokio::test]
    async fn write_stops_at_end() {
        let mut cursor = cursor().await;

        cursor.seek(SeekFrom::End(-2)).await.unwrap();
        assert_eq!(2, cursor.write(&[1, 2, 3]).await.unwrap());
        assert_eq!(Err(DriverError::Capacity), cursor.write(&[4]).await);

        let fram = cursor.into_inner().release().0;
        assert_eq!(&[1, 2], &fram.memory[2046..]);
    }

    #[tokio::test]
    async fn seek_outside_device() {
        let mut cursor = cursor().await;

        assert_eq!(Err(DriverError::Capacity), cursor.seek(SeekFrom::Current(-1)).await);
        assert_eq!(Err(DriverError::Capacity), cursor.seek(SeekFrom::End(1)).await);
        assert_eq!(2048, cursor.seek(SeekFrom::End(0)).await.unwrap());
        assert_eq!(2048, cursor.position());
    }

    #[tokio::test]
    async fn seek_with_overflowing_offset() {
        let mut cursor = cursor().await;
        cursor.seek(SeekFrom::Start(10)).await.unwrap();

        assert_eq!(Err(DriverError::Capacity), cursor.seek(SeekFrom::End(i64::MAX)).await);
        assert_eq!(Err(DriverError::Capacity), cursor.seek(SeekFrom::Current(i64::MAX)).await);
        assert_eq!(Err(DriverError::Capacity), cursor.seek(SeekFrom::Start(u64::MAX)).await);
        assert_eq!(10, cursor.position());
    }

    #[tokio::test]
    async fn requires_known_device() {
        let driver = Driver::new(FakeFram::new([0; 4], 16, 2), MockDelay::new());
        let mut cursor = Cursor::new(driver);

        assert_eq!(Err(DriverError::Unconfigured), cursor.seek(SeekFrom::Start(0)).await);
        assert_eq!(Err(DriverError::Unconfigured), cursor.read(&mut [0; 1]).await);
    }
}
