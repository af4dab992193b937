use embedded_hal::digital::OutputPin;

/// Chip select, asserted (low) for as long as the guard is alive.
///
/// Chip select is deasserted exactly once: by [`SelectGuard::release()`],
/// or when the guard is dropped on an early return.
pub struct SelectGuard<'a, Cs: OutputPin> {
    cs: &'a mut Cs,
    released: bool,
}

impl<'a, Cs: OutputPin> SelectGuard<'a, Cs> {
    pub fn assert(cs: &'a mut Cs) -> Result<Self, Cs::Error> {
        cs.set_low()?;
        Ok(Self {
            cs,
            released: false,
        })
    }

    /// Deassert chip select, reporting if the pin could not be set.
    pub fn release(mut self) -> Result<(), Cs::Error> {
        self.released = true;
        self.cs.set_high()
    }
}

impl<Cs: OutputPin> Drop for SelectGuard<'_, Cs> {
    fn drop(&mut self) {
        if !self.released {
            // Nothing left to report the error to.
            let _ = self.cs.set_high();
        }
    }
}
