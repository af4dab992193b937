use embedded_hal_async::spi::{self, Operation};
use mockall::{mock, Sequence};

#[derive(Debug, Clone, Copy)]
pub struct SpiError;

impl spi::Error for SpiError {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

/// An operation expected inside a mocked transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedOperation {
    /// Expect a read of as many words as given, and answer with them.
    Read(Vec<u8>),
    /// Expect exactly these words to be written.
    Write(Vec<u8>),
    /// Expect a transfer writing the second vector, answering with the first.
    Transfer(Vec<u8>, Vec<u8>),
    /// Expect a delay of exactly this many nanoseconds with chip select asserted.
    DelayNs(u32),
}

mock! {
    #[derive(Debug)]
    pub SpiDevice<Word: Copy + 'static = u8> { }

    impl<Word: Copy + 'static> spi::SpiDevice<Word> for SpiDevice<Word> {
        async fn transaction<'a>(&mut self,operations: &mut [spi::Operation<'a, Word>]) -> Result<(), SpiError>;
    }

    impl<Word: Copy + 'static> spi::ErrorType for SpiDevice<Word> {
        type Error = SpiError;
    }
}

mock! {
    #[derive(Debug)]
    pub SpiBus {}

    impl spi::ErrorType for SpiBus {
        type Error = SpiError;
    }

    impl spi::SpiBus<u8> for SpiBus {
        async fn read(&mut self, words: &mut [u8]) -> Result<(), SpiError>;
        async fn write(&mut self, words: &[u8]) -> Result<(), SpiError>;
        async fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), SpiError>;
        async fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), SpiError>;
        async fn flush(&mut self) -> Result<(), SpiError>;
    }
}

impl MockSpiDevice<u8> {
    /// Expect a single transaction consisting of exactly the `expected` operations.
    pub fn expect_operations(&mut self, seq: &mut Sequence, expected: Vec<ExpectedOperation>) {
        let matcher = expected.clone();
        self.expect_transaction()
            .withf(move |transaction| Self::is_match(transaction, &matcher))
            .times(1)
            .in_sequence(seq)
            .returning(move |transaction| {
                for (dest, src) in transaction.iter_mut().zip(&expected) {
                    Self::assign(dest, src);
                }
                Ok(())
            });
    }

    /// Expect a single transaction consisting of exactly the `expected` operations, and fail it.
    pub fn expect_failing_operations(
        &mut self,
        seq: &mut Sequence,
        expected: Vec<ExpectedOperation>,
    ) {
        self.expect_transaction()
            .withf(move |transaction| Self::is_match(transaction, &expected))
            .times(1)
            .in_sequence(seq)
            .returning(|_| Err(SpiError));
    }

    fn is_match(transaction: &[Operation<'_, u8>], expected: &[ExpectedOperation]) -> bool {
        if transaction.len() != expected.len() {
            return false;
        }

        transaction
            .iter()
            .zip(expected)
            .all(|(actual, expected)| match (actual, expected) {
                (Operation::Read(words), ExpectedOperation::Read(answer)) => {
                    words.len() == answer.len()
                }
                (Operation::Write(words), ExpectedOperation::Write(expected)) => {
                    *words == expected.as_slice()
                }
                (Operation::Transfer(read, write), ExpectedOperation::Transfer(answer, expected)) => {
                    read.len() == answer.len() && *write == expected.as_slice()
                }
                (Operation::DelayNs(ns), ExpectedOperation::DelayNs(expected)) => ns == expected,
                _ => false,
            })
    }

    fn assign(dest: &mut Operation<'_, u8>, src: &ExpectedOperation) {
        match (dest, src) {
            (Operation::Read(words), ExpectedOperation::Read(answer)) => {
                words.copy_from_slice(answer)
            }
            (Operation::Transfer(read, _), ExpectedOperation::Transfer(answer, _)) => {
                read.copy_from_slice(answer)
            }
            _ => {}
        }
    }
}
