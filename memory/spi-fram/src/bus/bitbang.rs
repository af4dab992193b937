use embedded_hal::digital::{self, InputPin, OutputPin, PinState};
use embedded_hal_async::{
    delay::DelayNs,
    spi::{self, ErrorType, SpiBus},
};

/// Half of a 1MHz clock period.
const HALF_PERIOD_NS: u32 = 500;
/// Word clocked out while reading.
const READ_FILL: u8 = 0xFF;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitBangError(pub digital::ErrorKind);

impl BitBangError {
    fn pin<E: digital::Error>(e: E) -> Self {
        Self(e.kind())
    }
}

impl spi::Error for BitBangError {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

/// A software clocked SPI bus in mode 0, MSB first.
pub struct BitBangBus<Sck, Mosi, Miso, Delay> {
    sck: Sck,
    mosi: Mosi,
    miso: Miso,
    delay: Delay,
}

impl<Sck, Mosi, Miso, Delay> BitBangBus<Sck, Mosi, Miso, Delay>
where
    Sck: OutputPin,
    Mosi: OutputPin,
    Miso: InputPin,
    Delay: DelayNs,
{
    /// Create the bus with the clock idling low.
    pub fn new(mut sck: Sck, mosi: Mosi, miso: Miso, delay: Delay) -> Result<Self, BitBangError> {
        sck.set_low().map_err(BitBangError::pin)?;
        Ok(Self {
            sck,
            mosi,
            miso,
            delay,
        })
    }

    pub fn release(self) -> (Sck, Mosi, Miso, Delay) {
        (self.sck, self.mosi, self.miso, self.delay)
    }

    /// Exchange a single word.
    async fn exchange(&mut self, out: u8) -> Result<u8, BitBangError> {
        let mut word = 0;
        for bit in (0..8).rev() {
            self.mosi
                .set_state(PinState::from(out & (1 << bit) != 0))
                .map_err(BitBangError::pin)?;
            self.delay.delay_ns(HALF_PERIOD_NS).await;

            // The device samples on the rising edge and shifts on the falling edge.
            self.sck.set_high().map_err(BitBangError::pin)?;
            if self.miso.is_high().map_err(BitBangError::pin)? {
                word |= 1 << bit;
            }
            self.delay.delay_ns(HALF_PERIOD_NS).await;
            self.sck.set_low().map_err(BitBangError::pin)?;
        }
        Ok(word)
    }
}

impl<Sck, Mosi, Miso, Delay> ErrorType for BitBangBus<Sck, Mosi, Miso, Delay> {
    type Error = BitBangError;
}

impl<Sck, Mosi, Miso, Delay> SpiBus for BitBangBus<Sck, Mosi, Miso, Delay>
where
    Sck: OutputPin,
    Mosi: OutputPin,
    Miso: InputPin,
    Delay: DelayNs,
{
    async fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words.iter_mut() {
            *word = self.exchange(READ_FILL).await?;
        }
        Ok(())
    }

    async fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        for word in words {
            self.exchange(*word).await?;
        }
        Ok(())
    }

    async fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        for i in 0..usize::max(read.len(), write.len()) {
            let word = self
                .exchange(write.get(i).copied().unwrap_or(READ_FILL))
                .await?;
            if let Some(rx) = read.get_mut(i) {
                *rx = word;
            }
        }
        Ok(())
    }

    async fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words.iter_mut() {
            *word = self.exchange(*word).await?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
