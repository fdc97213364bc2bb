//! # GATT Module
//!
//! Service layout exposed to the companion app and the seam to the
//! underlying BLE stack.
//!
//! This module handles:
//! - Service and characteristic UUIDs
//! - Characteristic access rights
//! - Advertising parameters
//! - The `GattStack` trait implemented by BLE backends

pub mod stack_trait;

pub use stack_trait::{GattStack, SimulatedStack};

use uuid::Uuid;

/// Primary service
pub const SERVICE_UUID: Uuid = Uuid::from_u128(0x4fafc201_1fb5_459e_8fcc_c5c9c331914b);

/// RC channel data (32 bytes, inbound and outbound)
pub const RC_CHAR_UUID: Uuid = Uuid::from_u128(0x12345678_1234_5678_9abc_123456789abd);

/// Telemetry record (outbound only)
pub const TELEMETRY_CHAR_UUID: Uuid = Uuid::from_u128(0x12345678_1234_5678_9abc_123456789abe);

/// Binding control text channel
pub const BINDING_CHAR_UUID: Uuid = Uuid::from_u128(0x12345678_1234_5678_9abc_123456789abf);

/// Ping-pong diagnostic text channel
pub const PING_PONG_CHAR_UUID: Uuid = Uuid::from_u128(0xbeb5483e_36e1_4688_b7f5_ea07361b26a8);

/// Static firmware version string
pub const DEVICE_INFO_CHAR_UUID: Uuid = Uuid::from_u128(0x6ba7b810_9dad_11d1_80b4_00c04fd430c8);

/// Bluetooth controller state as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerStatus {
    /// Not initialized by anyone yet
    Idle,
    /// Initialized but not enabled
    Initialized,
    /// Running, owned by someone else
    Enabled,
}

/// Characteristic access rights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Properties {
    pub read: bool,
    pub write: bool,
    pub notify: bool,
}

impl Properties {
    pub const READ: Properties = Properties { read: true, write: false, notify: false };
    pub const READ_NOTIFY: Properties = Properties { read: true, write: false, notify: true };
    pub const READ_WRITE_NOTIFY: Properties = Properties { read: true, write: true, notify: true };
}

/// Characteristics owned by the peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Characteristic {
    Rc,
    Telemetry,
    PingPong,
    Binding,
    DeviceInfo,
}

impl Characteristic {
    /// Every characteristic, in creation order
    pub const ALL: [Characteristic; 5] = [
        Characteristic::Rc,
        Characteristic::Telemetry,
        Characteristic::PingPong,
        Characteristic::Binding,
        Characteristic::DeviceInfo,
    ];

    pub fn uuid(self) -> Uuid {
        match self {
            Characteristic::Rc => RC_CHAR_UUID,
            Characteristic::Telemetry => TELEMETRY_CHAR_UUID,
            Characteristic::PingPong => PING_PONG_CHAR_UUID,
            Characteristic::Binding => BINDING_CHAR_UUID,
            Characteristic::DeviceInfo => DEVICE_INFO_CHAR_UUID,
        }
    }

    pub fn properties(self) -> Properties {
        match self {
            Characteristic::Rc | Characteristic::PingPong | Characteristic::Binding => {
                Properties::READ_WRITE_NOTIFY
            }
            Characteristic::Telemetry => Properties::READ_NOTIFY,
            Characteristic::DeviceInfo => Properties::READ,
        }
    }

    pub fn from_uuid(uuid: Uuid) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.uuid() == uuid)
    }
}

/// Advertising configuration applied before advertising starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvertisingParams {
    pub service_uuid: Uuid,
    pub scan_response: bool,
    pub min_preferred: u16,
    pub max_preferred: u16,
}

/// Build the advertised device name from the last three MAC bytes
///
/// # Examples
///
/// ```
/// use extreme_link::gatt::device_name;
///
/// let name = device_name("Extreme-Pilot", [0x24, 0x6f, 0x28, 0xa1, 0xb2, 0xc3]);
/// assert_eq!(name, "Extreme-Pilot A1B2C3");
/// ```
pub fn device_name(prefix: &str, mac: [u8; 6]) -> String {
    format!("{} {:02X}{:02X}{:02X}", prefix, mac[3], mac[4], mac[5])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_strings() {
        assert_eq!(SERVICE_UUID.to_string(), "4fafc201-1fb5-459e-8fcc-c5c9c331914b");
        assert_eq!(RC_CHAR_UUID.to_string(), "12345678-1234-5678-9abc-123456789abd");
        assert_eq!(TELEMETRY_CHAR_UUID.to_string(), "12345678-1234-5678-9abc-123456789abe");
        assert_eq!(PING_PONG_CHAR_UUID.to_string(), "beb5483e-36e1-4688-b7f5-ea07361b26a8");
        assert_eq!(DEVICE_INFO_CHAR_UUID.to_string(), "6ba7b810-9dad-11d1-80b4-00c04fd430c8");
    }

    #[test]
    fn test_characteristic_uuids_are_unique() {
        for a in Characteristic::ALL {
            for b in Characteristic::ALL {
                if a != b {
                    assert_ne!(a.uuid(), b.uuid(), "{:?} and {:?} share a UUID", a, b);
                }
            }
        }
    }

    #[test]
    fn test_access_rights() {
        assert_eq!(Characteristic::Rc.properties(), Properties::READ_WRITE_NOTIFY);
        assert_eq!(Characteristic::Telemetry.properties(), Properties::READ_NOTIFY);
        assert_eq!(Characteristic::PingPong.properties(), Properties::READ_WRITE_NOTIFY);
        assert_eq!(Characteristic::Binding.properties(), Properties::READ_WRITE_NOTIFY);
        assert_eq!(Characteristic::DeviceInfo.properties(), Properties::READ);
    }

    #[test]
    fn test_from_uuid() {
        for c in Characteristic::ALL {
            assert_eq!(Characteristic::from_uuid(c.uuid()), Some(c));
        }
        assert_eq!(Characteristic::from_uuid(SERVICE_UUID), None);
    }

    #[test]
    fn test_device_name_uppercases_suffix() {
        let name = device_name("Extreme-Pilot", [0x00, 0x11, 0x22, 0xab, 0xcd, 0xef]);
        assert_eq!(name, "Extreme-Pilot ABCDEF");
    }

    #[test]
    fn test_device_name_zero_pads() {
        let name = device_name("X", [0xff, 0xff, 0xff, 0x01, 0x02, 0x03]);
        assert_eq!(name, "X 010203");
    }
}
