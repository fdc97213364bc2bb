//! # Extreme Link Library
//!
//! BLE peripheral for an ExpressLRS link device.
//!
//! This library exposes RC channels, telemetry, binding control and a
//! diagnostic ping-pong channel to a companion mobile app over a single
//! GATT service. The BLE stack itself sits behind the `GattStack` trait.

pub mod binding;
pub mod commands;
pub mod config;
pub mod error;
pub mod gatt;
pub mod payload;
pub mod peripheral;
