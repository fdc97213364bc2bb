//! # Payload Encoder
//!
//! Encodes RC channels and telemetry records into characteristic values.

use bytes::{BufMut, Bytes, BytesMut};

use super::protocol::*;

/// Encode RC channels into a 32-byte payload
///
/// Each channel is written as a little-endian `u16`, channel 1 first.
/// Values are not clamped; the app receives exactly what the flight loop
/// published.
///
/// # Examples
///
/// ```
/// use extreme_link::payload::encoder::encode_rc_channels;
/// use extreme_link::payload::protocol::FAILSAFE_CHANNELS;
///
/// let payload = encode_rc_channels(&FAILSAFE_CHANNELS);
/// assert_eq!(payload.len(), 32);
/// assert_eq!(&payload[..2], &1500u16.to_le_bytes());
/// ```
pub fn encode_rc_channels(channels: &RcChannels) -> Bytes {
    let mut buf = BytesMut::with_capacity(RC_PAYLOAD_SIZE);
    for &channel in channels.iter() {
        buf.put_u16_le(channel);
    }
    buf.freeze()
}

/// Encode a basic telemetry record (10 bytes, packed)
///
/// ```text
/// Offset 0: voltage  f32 LE
/// Offset 4: current  f32 LE
/// Offset 8: rssi     i8
/// Offset 9: lq       u8
/// ```
pub fn encode_telemetry(record: &TelemetryRecord) -> Bytes {
    let mut buf = BytesMut::with_capacity(TELEMETRY_PAYLOAD_SIZE);
    put_telemetry(&mut buf, record);
    buf.freeze()
}

/// Encode an extended telemetry record (31 bytes, packed)
///
/// The basic record comes first, followed by speed, heading, pitch, roll
/// and yaw as `f32` LE and the satellite count as a single byte.
pub fn encode_extended_telemetry(record: &ExtendedTelemetry) -> Bytes {
    let mut buf = BytesMut::with_capacity(EXTENDED_TELEMETRY_PAYLOAD_SIZE);
    put_telemetry(&mut buf, &record.base);
    buf.put_f32_le(record.speed);
    buf.put_f32_le(record.heading);
    buf.put_f32_le(record.pitch);
    buf.put_f32_le(record.roll);
    buf.put_f32_le(record.yaw);
    buf.put_u8(record.satellites);
    buf.freeze()
}

fn put_telemetry(buf: &mut BytesMut, record: &TelemetryRecord) {
    buf.put_f32_le(record.voltage);
    buf.put_f32_le(record.current);
    buf.put_i8(record.rssi);
    buf.put_u8(record.link_quality);
}
