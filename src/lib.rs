// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Trackbot Firmware
//!
//! This crate contains the firmware for a two-board remote-controlled tracked vehicle, written in
//! Rust, targeting STM32F7 MCUs. The master board turns pilot input into commands; the slave board
//! drives both tracks and the lighting rig. The two boards talk over a single UART link.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`protocol`] | Wire frames, the byte-at-a-time parser and typed payloads |
//! | [`link`] | Originating (master) and actuating (slave) link endpoints |
//! | [`control`] | PID, ramp limiting and the drive controllers |
//! | [`motors`] | Ramp-limited dual H-bridge track motor |
//! | [`drivers`] | I2C devices (MCP23017, TCA9548A, PCA9685) |
//! | [`lighting`] | Four-fixture RGB pattern state machine |
//! | [`hw`] | Hardware capability traits and the STM32F7 implementations |
//! | [`config`] | Vehicle configuration snapshot and tuning |
//! | [`pilot`] | Pilot-input interface and receiver channel mapping |
//! | [`app`] | Master and slave poll loops |
//!
//! ## Getting Started
//!
//! Run the host tests:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash a board:
//!
//! ```bash
//! cargo run --release --features stm32 --bin slave
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod macros;

pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod hw;
pub mod lighting;
pub mod link;
pub mod motors;
pub mod pilot;
pub mod protocol;
