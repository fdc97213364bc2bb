//! # Payload Module
//!
//! Binary payloads carried by the RC and telemetry characteristics.
//!
//! This module handles:
//! - RC channel payload encoding/decoding (16 channels, little-endian u16)
//! - Telemetry record encoding (basic and extended, packed little-endian)
//! - Failsafe channel values

pub mod protocol;
pub mod encoder;
pub mod decoder;
