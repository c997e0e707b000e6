// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! I2C bus adapter.
//!
//! The HAL's blocking I2C peripheral speaks the embedded-hal 0.2 traits; the device drivers are
//! written against the 1.0 [`I2c`] trait. [`I2cBus`] bridges the two. Operations in a
//! transaction are issued back to back with a STOP between them, which is all the lighting and
//! expander drivers need.

use embedded_hal::i2c::{self, ErrorKind, ErrorType, I2c, Operation, SevenBitAddress};
use stm32f7xx_hal::prelude::{
    _embedded_hal_blocking_i2c_Read as LegacyRead,
    _embedded_hal_blocking_i2c_Write as LegacyWrite,
};

/// Bus error reported by the HAL peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cBusError;

impl i2c::Error for I2cBusError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

pub struct I2cBus<I> {
    i2c: I,
}

impl<I> I2cBus<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    /// Consume the wrapper and return the HAL peripheral.
    pub fn free(self) -> I {
        self.i2c
    }
}

impl<I> ErrorType for I2cBus<I> {
    type Error = I2cBusError;
}

impl<I, E> I2c<SevenBitAddress> for I2cBus<I>
where
    I: LegacyWrite<Error = E> + LegacyRead<Error = E>,
{
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations {
            match op {
                Operation::Write(bytes) => self.i2c.write(address, bytes),
                Operation::Read(buf) => self.i2c.read(address, buf),
            }
            .map_err(|_| I2cBusError)?;
        }
        Ok(())
    }
}
