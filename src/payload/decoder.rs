//! # Payload Decoder
//!
//! Decodes RC channel writes coming from the companion app.

use super::protocol::*;
use crate::error::{LinkError, Result};

/// Decode a 32-byte RC payload into 16 channels
///
/// Byte pairs are read as little-endian `u16` in channel order.
///
/// # Errors
///
/// Returns `InvalidPayload` if the payload is not exactly 32 bytes. No
/// partial decode is attempted.
pub fn decode_rc_channels(payload: &[u8]) -> Result<RcChannels> {
    if payload.len() != RC_PAYLOAD_SIZE {
        return Err(LinkError::InvalidPayload(format!(
            "RC payload must be {} bytes, got {}",
            RC_PAYLOAD_SIZE,
            payload.len()
        )));
    }

    let mut channels = [0u16; RC_NUM_CHANNELS];
    for (channel, pair) in channels.iter_mut().zip(payload.chunks_exact(2)) {
        *channel = u16::from_le_bytes([pair[0], pair[1]]);
    }

    Ok(channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::encoder::encode_rc_channels;

    #[test]
    fn test_decode_failsafe() {
        let payload = encode_rc_channels(&FAILSAFE_CHANNELS);
        assert_eq!(decode_rc_channels(&payload).unwrap(), FAILSAFE_CHANNELS);
    }

    #[test]
    fn test_decode_little_endian_pairs() {
        let payload: Vec<u8> = (0u8..32).collect();
        let channels = decode_rc_channels(&payload).unwrap();

        for (i, &value) in channels.iter().enumerate() {
            let lo = (2 * i) as u16;
            let hi = (2 * i + 1) as u16;
            assert_eq!(value, lo | (hi << 8), "channel {} mismatch", i);
        }
    }

    #[test]
    fn test_decode_rejects_short_payload() {
        let result = decode_rc_channels(&[0u8; 31]);
        match result {
            Err(LinkError::InvalidPayload(msg)) => assert!(msg.contains("31")),
            other => panic!("Expected InvalidPayload, got: {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_long_payload() {
        assert!(decode_rc_channels(&[0u8; 33]).is_err());
    }

    #[test]
    fn test_decode_rejects_empty_payload() {
        assert!(decode_rc_channels(&[]).is_err());
    }
}
