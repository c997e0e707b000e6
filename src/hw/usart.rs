// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! USART link port.
//!
//! Wraps a HAL serial peripheral as a [`SerialPort`] for the inter-board link: 921 600 baud,
//! 8N1, non-blocking reads, blocking writes. Frames are at most 100 bytes, so a write blocks for
//! roughly a millisecond at most.

use nb::block;

use stm32f7xx_hal::{
    prelude::*,
    serial::{self, Instance, Pins, Rx, Serial, Tx},
};

use crate::hw::SerialPort;
use crate::protocol::frame::LINK_BAUD;

#[derive(Debug)]
pub enum LinkSerialError {
    /// Framing, noise, overrun or parity error on receive.
    Rx(serial::Error),
    Tx,
}

/// Serial configuration for the link.
pub fn link_config() -> serial::Config {
    serial::Config {
        baud_rate: LINK_BAUD.bps(),
        ..Default::default()
    }
}

pub struct LinkSerial<U: Instance> {
    tx: Tx<U>,
    rx: Rx<U>,
}

impl<U: Instance> LinkSerial<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, rx) = serial.split();
        Self { tx, rx }
    }

    /// Block until the hardware TX FIFO/drain is flushed.
    #[inline]
    pub fn flush(&mut self) {
        let _ = block!(self.tx.flush());
    }
}

impl<U: Instance> SerialPort for LinkSerial<U> {
    type Error = LinkSerialError;

    fn read_byte(&mut self) -> nb::Result<u8, Self::Error> {
        self.rx.read().map_err(|e| e.map(LinkSerialError::Rx))
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        for &b in bytes {
            block!(self.tx.write(b)).map_err(|_| LinkSerialError::Tx)?;
        }
        Ok(())
    }
}
