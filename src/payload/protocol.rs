//! # Payload Constants and Types
//!
//! Layout definitions shared with the companion app. Payloads carry no
//! length prefix, version or checksum, so these layouts are the contract.

/// Number of RC channels
pub const RC_NUM_CHANNELS: usize = 16;

/// RC payload size (16 channels × 2 bytes)
pub const RC_PAYLOAD_SIZE: usize = RC_NUM_CHANNELS * 2;

/// Failsafe channel value (stick centered)
pub const RC_CHANNEL_FAILSAFE: u16 = 1500;

/// Basic telemetry payload size: voltage(4) + current(4) + rssi(1) + lq(1)
pub const TELEMETRY_PAYLOAD_SIZE: usize = 10;

/// Extended telemetry payload size: basic(10) + 5 × f32(20) + satellites(1)
pub const EXTENDED_TELEMETRY_PAYLOAD_SIZE: usize = 31;

/// RC channels array type
pub type RcChannels = [u16; RC_NUM_CHANNELS];

/// All channels centered
pub const FAILSAFE_CHANNELS: RcChannels = [RC_CHANNEL_FAILSAFE; RC_NUM_CHANNELS];

/// Link and battery telemetry pushed by the flight loop
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TelemetryRecord {
    /// Battery voltage in volts
    pub voltage: f32,

    /// Current draw in amperes
    pub current: f32,

    /// Received signal strength in dBm
    pub rssi: i8,

    /// Link quality (0-100%)
    pub link_quality: u8,
}

/// Telemetry record with attitude and GPS fields
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExtendedTelemetry {
    /// Link and battery fields, encoded first
    pub base: TelemetryRecord,

    /// Ground speed in m/s
    pub speed: f32,

    /// Heading in degrees
    pub heading: f32,

    /// Attitude in degrees
    pub pitch: f32,
    pub roll: f32,
    pub yaw: f32,

    /// Satellites in view
    pub satellites: u8,
}

impl TelemetryRecord {
    pub fn new(voltage: f32, current: f32, rssi: i8, link_quality: u8) -> Self {
        Self {
            voltage,
            current,
            rssi,
            link_quality,
        }
    }
}
