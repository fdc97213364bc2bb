//! # BLE Peripheral
//!
//! Owns the GATT service exposed to the companion app and routes traffic
//! between it and the flight loop.
//!
//! This module handles:
//! - Bringing up the service and advertising
//! - Publishing RC and telemetry with a bounded lock wait
//! - Inbound RC, ping-pong and binding writes
//! - Connection lifecycle and the diagnostic heartbeat
//!
//! All characteristic access goes through a single `tokio::sync::Mutex`.
//! Publishers never wait longer than the configured lock timeout; an update
//! that cannot get the lock in time is dropped and reported as
//! `LinkError::LockTimeout`.

use bytes::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::binding::BindingHooks;
use crate::commands::{binding_status, ping_pong_response, BindingCommand, HEARTBEAT_MESSAGE};
use crate::commands::{BINDING_STARTED, BINDING_STOPPED, BINDING_UNKNOWN};
use crate::config::BleConfig;
use crate::error::{LinkError, Result};
use crate::gatt::{
    device_name, AdvertisingParams, Characteristic, ControllerStatus, GattStack,
    BINDING_CHAR_UUID, DEVICE_INFO_CHAR_UUID, PING_PONG_CHAR_UUID, RC_CHAR_UUID, SERVICE_UUID,
    TELEMETRY_CHAR_UUID,
};
use crate::payload::decoder::decode_rc_channels;
use crate::payload::encoder::{encode_extended_telemetry, encode_rc_channels, encode_telemetry};
use crate::payload::protocol::{ExtendedTelemetry, RcChannels, TelemetryRecord, FAILSAFE_CHANNELS};

/// What an inbound write did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// RC write accepted into the received-channel buffer
    ChannelsUpdated(RcChannels),
    /// RC write with the wrong length, buffer left untouched
    Rejected { len: usize },
    /// Text command answered with a write-back and notify
    Responded(Bytes),
    /// Write to a characteristic that takes no input
    Ignored,
}

/// State guarded by the GATT lock
struct GattState<S> {
    stack: S,
    received_rc: RcChannels,
    last_heartbeat: Instant,
}

/// BLE peripheral adapter
///
/// Constructed once with [`BlePeripheral::init`] and shared by reference
/// (usually an `Arc`) between the flight loop and the stack's event
/// delivery.
pub struct BlePeripheral<S: GattStack, H: BindingHooks> {
    config: BleConfig,
    device_name: String,
    state: Mutex<GattState<S>>,
    hooks: H,
    connected: AtomicBool,
}

impl<S: GattStack, H: BindingHooks> std::fmt::Debug for BlePeripheral<S, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlePeripheral")
            .field("device_name", &self.device_name)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

impl<S: GattStack, H: BindingHooks> BlePeripheral<S, H> {
    /// Bring up the GATT service and start advertising
    ///
    /// # Control Flow
    ///
    /// 1. Refuse to start unless the controller is idle
    /// 2. Derive the device name from the MAC address
    /// 3. Create the service and its five characteristics
    /// 4. Write the device info string, start the service
    /// 5. Configure advertising, write failsafe RC, start advertising
    ///
    /// # Errors
    ///
    /// Returns `ControllerBusy` if the controller is already in use, or
    /// `Stack` if any stack call fails. Nothing is retried.
    pub async fn init(config: BleConfig, mut stack: S, hooks: H) -> Result<Self> {
        info!("Initializing BLE peripheral...");

        let status = stack.controller_status();
        if status != ControllerStatus::Idle {
            warn!("Bluetooth controller busy ({:?}), skipping init", status);
            return Err(LinkError::ControllerBusy);
        }

        let name = device_name(&config.name_prefix, stack.mac_address());

        if let Err(e) = Self::bring_up(&mut stack, &config, &name).await {
            warn!("BLE init failed: {}", e);
            return Err(e);
        }

        info!("BLE peripheral started as {:?}", name);

        Ok(Self {
            config,
            device_name: name,
            state: Mutex::new(GattState {
                stack,
                received_rc: FAILSAFE_CHANNELS,
                last_heartbeat: Instant::now(),
            }),
            hooks,
            connected: AtomicBool::new(false),
        })
    }

    async fn bring_up(stack: &mut S, config: &BleConfig, name: &str) -> Result<()> {
        stack.init_device(name).await?;
        stack.create_service(SERVICE_UUID).await?;

        for characteristic in Characteristic::ALL {
            stack
                .create_characteristic(SERVICE_UUID, characteristic.uuid(), characteristic.properties())
                .await?;
        }

        stack
            .set_value(DEVICE_INFO_CHAR_UUID, Bytes::from(config.device_info.clone()))
            .await?;
        stack.start_service(SERVICE_UUID).await?;

        stack
            .configure_advertising(AdvertisingParams {
                service_uuid: SERVICE_UUID,
                scan_response: true,
                min_preferred: config.adv_min_preferred,
                max_preferred: config.adv_max_preferred,
            })
            .await?;

        // Centered sticks until the flight loop publishes
        stack.set_value(RC_CHAR_UUID, encode_rc_channels(&FAILSAFE_CHANNELS)).await?;

        stack.start_advertising().await
    }

    /// Advertised device name
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Whether a central is connected
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn lock_bounded(&self) -> Result<MutexGuard<'_, GattState<S>>> {
        let wait = self.config.lock_timeout();
        timeout(wait, self.state.lock())
            .await
            .map_err(|_| LinkError::LockTimeout(wait))
    }

    /// Overwrite a characteristic and notify if a central is listening
    async fn publish(&self, uuid: Uuid, value: Bytes) -> Result<()> {
        let mut state = self.lock_bounded().await?;
        state.stack.set_value(uuid, value).await?;
        if self.is_connected() {
            state.stack.notify(uuid).await?;
        }
        Ok(())
    }

    /// Publish the flight controller's RC channels
    ///
    /// # Errors
    ///
    /// `LockTimeout` if the lock is held past the bounded wait (the update
    /// is dropped), `Stack` if the stack rejects the write or notify.
    pub async fn publish_rc(&self, channels: &RcChannels) -> Result<()> {
        self.publish(RC_CHAR_UUID, encode_rc_channels(channels)).await
    }

    /// Publish link and battery telemetry
    pub async fn publish_telemetry(&self, record: &TelemetryRecord) -> Result<()> {
        self.publish(TELEMETRY_CHAR_UUID, encode_telemetry(record)).await
    }

    /// Publish telemetry including attitude and GPS fields
    pub async fn publish_extended_telemetry(&self, record: &ExtendedTelemetry) -> Result<()> {
        self.publish(TELEMETRY_CHAR_UUID, encode_extended_telemetry(record)).await
    }

    /// Last RC channels written by the companion app
    ///
    /// Failsafe values until the first valid write arrives.
    pub async fn received_rc_channels(&self) -> Result<RcChannels> {
        let state = self.lock_bounded().await?;
        Ok(state.received_rc)
    }

    /// Handle a write from the connected central
    ///
    /// Called from the stack's event context. Inbound writes wait for the
    /// lock without a bound.
    pub async fn handle_write(&self, uuid: Uuid, data: &[u8]) -> Result<WriteOutcome> {
        match Characteristic::from_uuid(uuid) {
            Some(Characteristic::Rc) => Ok(self.handle_rc_write(data).await),
            Some(Characteristic::PingPong) => {
                info!("[ping-pong] Received: {}", String::from_utf8_lossy(data));
                let response = ping_pong_response(data);
                self.respond(PING_PONG_CHAR_UUID, response).await
            }
            Some(Characteristic::Binding) => {
                let command = String::from_utf8_lossy(data);
                info!("[binding] Received: {}", command);
                let response = self.binding_response(BindingCommand::parse(&command));
                self.respond(BINDING_CHAR_UUID, Bytes::from_static(response.as_bytes()))
                    .await
            }
            _ => {
                warn!("Ignoring write to {} ({} bytes)", uuid, data.len());
                Ok(WriteOutcome::Ignored)
            }
        }
    }

    async fn handle_rc_write(&self, data: &[u8]) -> WriteOutcome {
        match decode_rc_channels(data) {
            Ok(channels) => {
                self.state.lock().await.received_rc = channels;
                debug!("Received RC channels: {:?}", channels);
                WriteOutcome::ChannelsUpdated(channels)
            }
            Err(e) => {
                warn!("Rejected RC write: {}", e);
                WriteOutcome::Rejected { len: data.len() }
            }
        }
    }

    fn binding_response(&self, command: BindingCommand) -> &'static str {
        match command {
            BindingCommand::Start => {
                self.hooks.enter_binding_mode();
                BINDING_STARTED
            }
            BindingCommand::Stop => {
                self.hooks.exit_binding_mode();
                BINDING_STOPPED
            }
            BindingCommand::Status => binding_status(self.hooks.is_binding_active()),
            BindingCommand::Unknown => BINDING_UNKNOWN,
        }
    }

    async fn respond(&self, uuid: Uuid, response: Bytes) -> Result<WriteOutcome> {
        let mut state = self.state.lock().await;
        state.stack.set_value(uuid, response.clone()).await?;
        state.stack.notify(uuid).await?;
        debug!("Sent response {:?} on {}", response, uuid);
        Ok(WriteOutcome::Responded(response))
    }

    /// Record a central connection
    pub fn on_connect(&self) {
        info!("Client connected");
        self.connected.store(true, Ordering::SeqCst);
    }

    /// Record a disconnect and restart advertising straight away
    pub async fn on_disconnect(&self) -> Result<()> {
        info!("Client disconnected");
        self.connected.store(false, Ordering::SeqCst);

        let mut state = self.state.lock().await;
        state.stack.start_advertising().await
    }

    /// Push a text message over the ping-pong channel
    ///
    /// Returns `Ok(false)` without touching the stack when no central is
    /// connected.
    pub async fn send_diagnostic_message(&self, message: &str) -> Result<bool> {
        if !self.is_connected() {
            return Ok(false);
        }

        let mut state = self.lock_bounded().await?;
        send_text(&mut state.stack, PING_PONG_CHAR_UUID, message).await?;
        info!("[ping-pong] Sent: {}", message);
        Ok(true)
    }

    /// Send a heartbeat if connected and the interval has passed
    ///
    /// Returns `Ok(true)` when a heartbeat went out. The interval is
    /// measured from the previous heartbeat, or from startup for the first
    /// one, and must be strictly exceeded.
    pub async fn test_communication_tick(&self) -> Result<bool> {
        if !self.is_connected() {
            return Ok(false);
        }

        let mut state = self.lock_bounded().await?;
        let now = Instant::now();
        if now.duration_since(state.last_heartbeat) <= self.config.heartbeat_interval() {
            return Ok(false);
        }

        send_text(&mut state.stack, PING_PONG_CHAR_UUID, HEARTBEAT_MESSAGE).await?;
        state.last_heartbeat = now;
        debug!("Heartbeat sent");
        Ok(true)
    }

    /// Periodic housekeeping called from the flight loop
    pub async fn task(&self) -> Result<()> {
        self.test_communication_tick().await.map(|_| ())
    }

    pub fn start_binding(&self) {
        self.hooks.enter_binding_mode();
    }

    pub fn stop_binding(&self) {
        self.hooks.exit_binding_mode();
    }

    pub fn is_binding(&self) -> bool {
        self.hooks.is_binding_active()
    }

    /// Run a closure against the stack, waiting for the lock
    pub async fn with_stack<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let state = self.state.lock().await;
        f(&state.stack)
    }
}

async fn send_text<S: GattStack>(stack: &mut S, uuid: Uuid, text: &str) -> Result<()> {
    stack.set_value(uuid, Bytes::copy_from_slice(text.as_bytes())).await?;
    stack.notify(uuid).await
}
