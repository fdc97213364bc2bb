//! # Extreme Link
//!
//! Host-side harness for the BLE peripheral.
//!
//! Brings the peripheral up on an in-process simulated GATT stack and
//! drives it the way the flight loop does: RC channels and telemetry on
//! fixed intervals plus the once-a-second housekeeping hook.

use anyhow::Result;
use extreme_link::binding::BindingFlag;
use extreme_link::config::Config;
use extreme_link::gatt::SimulatedStack;
use extreme_link::payload::protocol::{TelemetryRecord, FAILSAFE_CHANNELS, RC_CHANNEL_FAILSAFE};
use extreme_link::peripheral::BlePeripheral;
use tokio::time::{interval, Duration};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// MAC address reported by the simulated controller
const SIMULATED_MAC: [u8; 6] = [0x24, 0x6f, 0x28, 0x5e, 0x1a, 0x0c];

/// Housekeeping hook period
const TASK_INTERVAL_MS: u64 = 1000;

/// Number of RC publishes between status log messages
const LOG_INTERVAL_PUBLISHES: u64 = 500;

/// Main entry point for the Extreme Link harness
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration from the first argument, or use defaults
///    - Bring up the peripheral on the simulated stack
///
/// 2. **Main Loop**
///    - Publish failsafe RC channels at `rc_rate_hz`
///    - Publish telemetry every `telemetry_interval_ms`
///    - Run the housekeeping hook every second
///    - Handle Ctrl+C for graceful shutdown
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/extreme-link.toml
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Extreme Link v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from {}", path);
            Config::load(&path)?
        }
        None => Config::default(),
    };

    let stack = SimulatedStack::new(SIMULATED_MAC);
    let peripheral = BlePeripheral::init(config.ble.clone(), stack, BindingFlag::new()).await?;
    info!("Advertising as {}", peripheral.device_name());

    let mut rc_interval = interval(Duration::from_millis(rc_period_ms(config.link.rc_rate_hz)));
    let mut telemetry_interval =
        interval(Duration::from_millis(config.link.telemetry_interval_ms));
    let mut task_interval = interval(Duration::from_millis(TASK_INTERVAL_MS));

    let telemetry = TelemetryRecord::new(16.8, 0.0, -60, 100);

    info!("Publishing RC at {}Hz", config.link.rc_rate_hz);
    info!("Press Ctrl+C to exit");

    let mut publish_count: u64 = 0;
    let mut dropped_count: u64 = 0;

    loop {
        tokio::select! {
            _ = rc_interval.tick() => {
                if let Err(e) = peripheral.publish_rc(&FAILSAFE_CHANNELS).await {
                    debug!("RC publish dropped: {}", e);
                    dropped_count += 1;
                    continue;
                }

                publish_count += 1;
                if publish_count % LOG_INTERVAL_PUBLISHES == 0 {
                    info!("Published {} RC updates ({} dropped, all channels at {})",
                        publish_count, dropped_count, RC_CHANNEL_FAILSAFE);
                }
            }

            _ = telemetry_interval.tick() => {
                if let Err(e) = peripheral.publish_telemetry(&telemetry).await {
                    debug!("Telemetry publish dropped: {}", e);
                }
            }

            _ = task_interval.tick() => {
                if let Err(e) = peripheral.task().await {
                    debug!("Housekeeping failed: {}", e);
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    let notifications = peripheral.with_stack(|stack| stack.notifications()).await;
    info!("Total RC updates published: {} ({} dropped)", publish_count, dropped_count);
    info!("Total notifications sent: {}", notifications);

    Ok(())
}

/// RC publish period for a given rate
fn rc_period_ms(rate_hz: u32) -> u64 {
    1000 / rate_hz.max(1) as u64
}
