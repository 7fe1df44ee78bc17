//! FireSense Firmware — Main Entry Point
//!
//! Hexagonal architecture around a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter          WifiAdapter   HttpCollector          │
//! │  (Sensor+Actuator+Display)(LinkPort)    (CollectorPort)        │
//! │  Esp32TimeAdapter         LogEventSink                         │
//! │  (TimePort)               (EventSink)                          │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Controller (pure logic)                   │    │
//! │  │  Scheduler · Acquisition · Risk · Alarm · Status       │    │
//! │  │  Connectivity · Telemetry                              │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::Ets;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{error, info, warn};

use firesense::adapters::device_id;
use firesense::adapters::hardware::HardwareAdapter;
use firesense::adapters::http_collector::HttpCollector;
use firesense::adapters::log_sink::LogEventSink;
use firesense::adapters::time::Esp32TimeAdapter;
use firesense::adapters::wifi::WifiAdapter;
use firesense::app::ports::TimePort;
use firesense::app::service::Controller;
use firesense::config::SystemConfig;
use firesense::drivers::hw_init;
use firesense::drivers::lcd::Lcd1602;
use firesense::drivers::watchdog::Watchdog;
use firesense::pins;

use embedded_hal::delay::DelayNs;

/// Longest idle sleep between scheduler iterations.  Bounds how stale the
/// link supervision can get and how late a MEDIUM pulse can end.
const LOOP_IDLE_MAX_MS: u64 = 20;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  FireSense v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let (config, problem) = SystemConfig::default().sanitized();
    if let Some(e) = problem {
        warn!("Config: {}, falling back to default tuning", e);
    }

    // ── 3. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Sensors read as faults and hold their values; keep running.
        error!("HAL init failed: {}, continuing degraded", e);
    }
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()
        .inspect_err(|e| warn!("NVS unavailable ({}), WiFi driver keeps its state in RAM", e))
        .ok();

    // ── 4. Display ────────────────────────────────────────────
    let i2c_config = I2cConfig::new().baudrate(Hertz(pins::LCD_I2C_FREQ_HZ));
    let display = match I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &i2c_config,
    ) {
        Ok(i2c) => {
            let mut lcd = Lcd1602::new(i2c, Ets, pins::LCD_I2C_ADDR);
            // A missing panel is reported on every frame as NotPresent.
            if let Err(e) = lcd.init() {
                warn!("LCD: init failed ({}), status lines will be dropped", e);
            }
            Some(lcd)
        }
        Err(e) => {
            warn!("I2C init failed ({}), running without display", e);
            None
        }
    };
    let mut hw = HardwareAdapter::new(display);

    // ── 5. Network ────────────────────────────────────────────
    let mut link = WifiAdapter::new(
        peripherals.modem,
        sysloop,
        nvs,
        &config.wifi_ssid,
        &config.wifi_password,
    )
    .inspect_err(|e| warn!("WiFi unavailable ({}), running offline", e))
    .ok();

    let mut collector = HttpCollector::new(&config.collector_url, config.http_timeout_ms)
        .inspect_err(|e| warn!("Collector '{}' unusable ({}), telemetry disabled", config.collector_url, e))
        .ok();

    // ── 6. Identity + controller ──────────────────────────────
    let identity = device_id::resolve(&config, &device_id::read_mac());
    let mut time = Esp32TimeAdapter::new();
    let mut sink = LogEventSink::new();
    let mut controller = Controller::new(&config, identity);

    watchdog.feed();
    controller.start(&mut link, &mut time, &mut sink);

    info!("System ready. Entering control loop.");

    // ── 7. Control loop ───────────────────────────────────────
    loop {
        watchdog.feed();
        controller.tick(&mut hw, &mut link, &mut collector, &mut time, &mut sink);

        let idle = controller.idle_budget_ms(time.now_ms()).clamp(1, LOOP_IDLE_MAX_MS);
        time.delay_ms(idle as u32);
    }
}
