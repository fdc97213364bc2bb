//! Trait abstraction for BLE GATT stack operations to enable testing

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use super::{AdvertisingParams, ControllerStatus, Properties};
use crate::error::{LinkError, Result};

/// Trait for the GATT server operations the peripheral relies on
///
/// Backends map their own failures to `LinkError::Stack`.
#[async_trait]
pub trait GattStack: Send {
    /// Current state of the Bluetooth controller
    fn controller_status(&self) -> ControllerStatus;

    /// Device MAC address, most significant byte first
    fn mac_address(&self) -> [u8; 6];

    /// Bring up the device under the given advertised name
    async fn init_device(&mut self, name: &str) -> Result<()>;

    async fn create_service(&mut self, uuid: Uuid) -> Result<()>;

    async fn create_characteristic(
        &mut self,
        service: Uuid,
        uuid: Uuid,
        properties: Properties,
    ) -> Result<()>;

    async fn start_service(&mut self, uuid: Uuid) -> Result<()>;

    /// Overwrite a characteristic value
    async fn set_value(&mut self, uuid: Uuid, value: Bytes) -> Result<()>;

    /// Notify subscribers with the current characteristic value
    async fn notify(&mut self, uuid: Uuid) -> Result<()>;

    async fn configure_advertising(&mut self, params: AdvertisingParams) -> Result<()>;

    async fn start_advertising(&mut self) -> Result<()>;
}

/// In-process GATT stack that keeps characteristic values in memory
///
/// Used by the host binary to exercise the peripheral without radio
/// hardware. Every operation is logged at debug level.
#[derive(Debug)]
pub struct SimulatedStack {
    mac: [u8; 6],
    status: ControllerStatus,
    name: Option<String>,
    characteristics: HashMap<Uuid, Properties>,
    values: HashMap<Uuid, Bytes>,
    notifications: u64,
    advertising: bool,
}

impl SimulatedStack {
    pub fn new(mac: [u8; 6]) -> Self {
        Self {
            mac,
            status: ControllerStatus::Idle,
            name: None,
            characteristics: HashMap::new(),
            values: HashMap::new(),
            notifications: 0,
            advertising: false,
        }
    }

    /// Advertised name, once the device is initialized
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Current value of a characteristic
    pub fn value(&self, uuid: Uuid) -> Option<&Bytes> {
        self.values.get(&uuid)
    }

    /// Total notifications sent since startup
    pub fn notifications(&self) -> u64 {
        self.notifications
    }

    pub fn is_advertising(&self) -> bool {
        self.advertising
    }

    fn ensure_characteristic(&self, uuid: Uuid) -> Result<Properties> {
        self.characteristics
            .get(&uuid)
            .copied()
            .ok_or_else(|| LinkError::Stack(format!("Unknown characteristic {}", uuid)))
    }
}

#[async_trait]
impl GattStack for SimulatedStack {
    fn controller_status(&self) -> ControllerStatus {
        self.status
    }

    fn mac_address(&self) -> [u8; 6] {
        self.mac
    }

    async fn init_device(&mut self, name: &str) -> Result<()> {
        if self.status != ControllerStatus::Idle {
            return Err(LinkError::Stack("Controller already initialized".to_string()));
        }
        debug!("Simulated device up as {:?}", name);
        self.name = Some(name.to_string());
        self.status = ControllerStatus::Enabled;
        Ok(())
    }

    async fn create_service(&mut self, uuid: Uuid) -> Result<()> {
        debug!("Simulated service {}", uuid);
        Ok(())
    }

    async fn create_characteristic(
        &mut self,
        service: Uuid,
        uuid: Uuid,
        properties: Properties,
    ) -> Result<()> {
        debug!("Simulated characteristic {} on {} ({:?})", uuid, service, properties);
        self.characteristics.insert(uuid, properties);
        Ok(())
    }

    async fn start_service(&mut self, uuid: Uuid) -> Result<()> {
        debug!("Simulated service {} started", uuid);
        Ok(())
    }

    async fn set_value(&mut self, uuid: Uuid, value: Bytes) -> Result<()> {
        self.ensure_characteristic(uuid)?;
        self.values.insert(uuid, value);
        Ok(())
    }

    async fn notify(&mut self, uuid: Uuid) -> Result<()> {
        let properties = self.ensure_characteristic(uuid)?;
        if !properties.notify {
            return Err(LinkError::Stack(format!("Characteristic {} does not notify", uuid)));
        }
        self.notifications += 1;
        Ok(())
    }

    async fn configure_advertising(&mut self, params: AdvertisingParams) -> Result<()> {
        debug!("Simulated advertising config: {:?}", params);
        Ok(())
    }

    async fn start_advertising(&mut self) -> Result<()> {
        debug!("Simulated advertising started");
        self.advertising = true;
        Ok(())
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// One recorded call into the mock stack
    #[derive(Debug, Clone, PartialEq)]
    pub enum StackEvent {
        InitDevice(String),
        CreateService(Uuid),
        CreateCharacteristic(Uuid, Properties),
        StartService(Uuid),
        SetValue(Uuid, Bytes),
        Notify(Uuid),
        ConfigureAdvertising(AdvertisingParams),
        StartAdvertising,
    }

    /// Mock GATT stack for testing
    #[derive(Clone)]
    pub struct MockGattStack {
        pub events: Arc<Mutex<Vec<StackEvent>>>,
        pub values: Arc<Mutex<HashMap<Uuid, Bytes>>>,
        pub status: Arc<Mutex<ControllerStatus>>,
        pub mac: [u8; 6],
        pub fail_set_value: Arc<Mutex<bool>>,
        pub fail_init: Arc<Mutex<bool>>,
    }

    impl MockGattStack {
        pub fn new() -> Self {
            Self {
                events: Arc::new(Mutex::new(Vec::new())),
                values: Arc::new(Mutex::new(HashMap::new())),
                status: Arc::new(Mutex::new(ControllerStatus::Idle)),
                mac: [0x24, 0x6f, 0x28, 0xa1, 0xb2, 0xc3],
                fail_set_value: Arc::new(Mutex::new(false)),
                fail_init: Arc::new(Mutex::new(false)),
            }
        }

        pub fn get_events(&self) -> Vec<StackEvent> {
            self.events.lock().unwrap().clone()
        }

        pub fn clear_events(&self) {
            self.events.lock().unwrap().clear();
        }

        pub fn value(&self, uuid: Uuid) -> Option<Bytes> {
            self.values.lock().unwrap().get(&uuid).cloned()
        }

        pub fn notifications(&self, uuid: Uuid) -> usize {
            self.get_events()
                .iter()
                .filter(|e| **e == StackEvent::Notify(uuid))
                .count()
        }

        pub fn set_status(&self, status: ControllerStatus) {
            *self.status.lock().unwrap() = status;
        }

        pub fn set_fail_set_value(&self, fail: bool) {
            *self.fail_set_value.lock().unwrap() = fail;
        }

        pub fn set_fail_init(&self, fail: bool) {
            *self.fail_init.lock().unwrap() = fail;
        }

        fn record(&self, event: StackEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[async_trait]
    impl GattStack for MockGattStack {
        fn controller_status(&self) -> ControllerStatus {
            *self.status.lock().unwrap()
        }

        fn mac_address(&self) -> [u8; 6] {
            self.mac
        }

        async fn init_device(&mut self, name: &str) -> Result<()> {
            if *self.fail_init.lock().unwrap() {
                return Err(LinkError::Stack("Mock init error".to_string()));
            }
            self.record(StackEvent::InitDevice(name.to_string()));
            Ok(())
        }

        async fn create_service(&mut self, uuid: Uuid) -> Result<()> {
            self.record(StackEvent::CreateService(uuid));
            Ok(())
        }

        async fn create_characteristic(
            &mut self,
            _service: Uuid,
            uuid: Uuid,
            properties: Properties,
        ) -> Result<()> {
            self.record(StackEvent::CreateCharacteristic(uuid, properties));
            Ok(())
        }

        async fn start_service(&mut self, uuid: Uuid) -> Result<()> {
            self.record(StackEvent::StartService(uuid));
            Ok(())
        }

        async fn set_value(&mut self, uuid: Uuid, value: Bytes) -> Result<()> {
            if *self.fail_set_value.lock().unwrap() {
                return Err(LinkError::Stack("Mock set_value error".to_string()));
            }
            self.values.lock().unwrap().insert(uuid, value.clone());
            self.record(StackEvent::SetValue(uuid, value));
            Ok(())
        }

        async fn notify(&mut self, uuid: Uuid) -> Result<()> {
            self.record(StackEvent::Notify(uuid));
            Ok(())
        }

        async fn configure_advertising(&mut self, params: AdvertisingParams) -> Result<()> {
            self.record(StackEvent::ConfigureAdvertising(params));
            Ok(())
        }

        async fn start_advertising(&mut self) -> Result<()> {
            self.record(StackEvent::StartAdvertising);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gatt::{PING_PONG_CHAR_UUID, DEVICE_INFO_CHAR_UUID};

    #[tokio::test]
    async fn test_simulated_stack_rejects_unknown_characteristic() {
        let mut stack = SimulatedStack::new([0; 6]);
        let result = stack.set_value(PING_PONG_CHAR_UUID, Bytes::from_static(b"PONG")).await;
        assert!(matches!(result, Err(LinkError::Stack(_))));
    }

    #[tokio::test]
    async fn test_simulated_stack_stores_values() {
        let mut stack = SimulatedStack::new([0; 6]);
        stack
            .create_characteristic(Uuid::nil(), PING_PONG_CHAR_UUID, Properties::READ_WRITE_NOTIFY)
            .await
            .unwrap();

        stack.set_value(PING_PONG_CHAR_UUID, Bytes::from_static(b"PONG")).await.unwrap();
        stack.notify(PING_PONG_CHAR_UUID).await.unwrap();

        assert_eq!(stack.value(PING_PONG_CHAR_UUID).unwrap(), &Bytes::from_static(b"PONG"));
        assert_eq!(stack.notifications(), 1);
    }

    #[tokio::test]
    async fn test_simulated_stack_refuses_notify_on_read_only() {
        let mut stack = SimulatedStack::new([0; 6]);
        stack
            .create_characteristic(Uuid::nil(), DEVICE_INFO_CHAR_UUID, Properties::READ)
            .await
            .unwrap();

        assert!(stack.notify(DEVICE_INFO_CHAR_UUID).await.is_err());
        assert_eq!(stack.notifications(), 0);
    }

    #[tokio::test]
    async fn test_simulated_stack_init_once() {
        let mut stack = SimulatedStack::new([0; 6]);
        assert_eq!(stack.controller_status(), ControllerStatus::Idle);

        stack.init_device("Extreme-Pilot 000000").await.unwrap();
        assert_eq!(stack.controller_status(), ControllerStatus::Enabled);
        assert_eq!(stack.name(), Some("Extreme-Pilot 000000"));

        assert!(stack.init_device("again").await.is_err());
    }
}
