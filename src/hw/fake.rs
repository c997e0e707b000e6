// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Deterministic stand-ins for the hardware traits, used by the unit tests.

use std::collections::VecDeque;
use std::vec::Vec;

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use super::{Board, SerialPort};
use crate::protocol::{Frame, Parser};

const PINS: usize = 128;

/// Board with RAM-backed pins and PWM outputs.
pub struct FakeBoard {
    pins: [bool; PINS],
    pwm: [u16; PINS],
    max_duty: u16,
    pub voltage: f32,
}

impl FakeBoard {
    pub fn new() -> Self {
        Self {
            pins: [false; PINS],
            pwm: [0; PINS],
            max_duty: 1000,
            voltage: 12.4,
        }
    }

    pub fn pin(&self, pin: u8) -> bool {
        self.pins[pin as usize]
    }

    pub fn pwm(&self, pin: u8) -> u16 {
        self.pwm[pin as usize]
    }
}

impl Board for FakeBoard {
    fn set_pin(&mut self, pin: u8, high: bool) {
        if let Some(p) = self.pins.get_mut(pin as usize) {
            *p = high;
        }
    }

    fn set_pwm(&mut self, pin: u8, duty: u16) {
        if let Some(p) = self.pwm.get_mut(pin as usize) {
            *p = duty.min(self.max_duty);
        }
    }

    fn max_duty(&self) -> u16 {
        self.max_duty
    }

    fn battery_voltage(&mut self) -> f32 {
        self.voltage
    }
}

/// I2C bus that records every write and can be told to NAK.
pub struct FakeI2c {
    writes: Vec<(u8, Vec<u8>)>,
    /// When set, transactions to this address fail.
    pub fail_address: Option<u8>,
}

impl FakeI2c {
    pub fn new() -> Self {
        Self {
            writes: Vec::new(),
            fail_address: None,
        }
    }

    pub fn writes(&self) -> Vec<(u8, Vec<u8>)> {
        self.writes.clone()
    }

    /// Writes addressed to one device, in order.
    pub fn writes_to(&self, address: u8) -> Vec<Vec<u8>> {
        self.writes
            .iter()
            .filter(|(a, _)| *a == address)
            .map(|(_, bytes)| bytes.clone())
            .collect()
    }

    pub fn clear(&mut self) {
        self.writes.clear();
    }
}

impl ErrorType for FakeI2c {
    type Error = ErrorKind;
}

impl I2c for FakeI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.fail_address == Some(address) {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        for op in operations {
            match op {
                Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                Operation::Read(buf) => buf.fill(0),
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeSerialError;

/// Serial port with an injectable receive queue and a captured transmit buffer.
pub struct FakeSerial {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    pub fail_writes: bool,
}

impl FakeSerial {
    pub fn new() -> Self {
        Self {
            rx: VecDeque::new(),
            tx: Vec::new(),
            fail_writes: false,
        }
    }

    pub fn inject(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    pub fn take_tx(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.tx)
    }
}

impl SerialPort for FakeSerial {
    type Error = FakeSerialError;

    fn read_byte(&mut self) -> nb::Result<u8, Self::Error> {
        self.rx.pop_front().ok_or(nb::Error::WouldBlock)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(FakeSerialError);
        }
        self.tx.extend_from_slice(bytes);
        Ok(())
    }
}

/// Move everything one port transmitted into another port's receive queue.
pub fn pump(from: &mut FakeSerial, to: &mut FakeSerial) {
    let bytes = from.take_tx();
    to.inject(&bytes);
}

/// Every validated frame in a byte stream.
pub fn decode_all(bytes: &[u8]) -> Vec<Frame> {
    let mut parser = Parser::new();
    bytes
        .iter()
        .filter_map(|&b| parser.push(b).and_then(|raw| Frame::try_from(raw).ok()))
        .collect()
}
