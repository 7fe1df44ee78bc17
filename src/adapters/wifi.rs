//! WiFi station-mode adapter.
//!
//! Implements [`LinkPort`] — the hexagonal boundary for the network link.
//! Association is started with [`start_connect`](LinkPort::start_connect)
//! and completes in the background; the connectivity manager polls
//! [`is_up`](LinkPort::is_up) with its own bounded backoff.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::wifi::EspWifi` in STA mode.
//! - **all other targets**: a simulated link whose reachability tests
//!   control directly.
//!
//! ## Credentials
//!
//! Compiled-in credentials are validated once at construction.  An empty
//! SSID means "no network configured": the adapter still exists but every
//! connection attempt fails fast with `NoCredentials`, which leaves the
//! node in offline mode.

use log::{info, warn};

use crate::app::ports::LinkPort;
use crate::error::CommsError;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

pub fn validate_ssid(ssid: &str) -> Result<(), CommsError> {
    if ssid.is_empty() {
        return Err(CommsError::NoCredentials);
    }
    if ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(CommsError::InvalidSsid);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), CommsError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(CommsError::InvalidPassword);
    }
    Ok(())
}

/// Both checks, SSID first.
pub fn validate_credentials(ssid: &str, password: &str) -> Result<(), CommsError> {
    validate_ssid(ssid)?;
    validate_password(password)
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    ssid: heapless::String<32>,
    /// Outcome of credential validation at construction.
    credentials: Result<(), CommsError>,
    connect_calls: u32,
    #[cfg(target_os = "espidf")]
    wifi: esp_idf_svc::wifi::EspWifi<'static>,
    #[cfg(not(target_os = "espidf"))]
    sim: SimLink,
}

/// Host-side stand-in for the radio.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
struct SimLink {
    /// Whether an association attempt would succeed.
    reachable: bool,
    up: bool,
}

impl WifiAdapter {
    /// Create the STA driver and apply the client configuration.
    ///
    /// Fails only when the WiFi driver itself cannot be brought up.
    /// Bad or missing credentials are kept and reported on each connect.
    #[cfg(target_os = "espidf")]
    pub fn new(
        modem: esp_idf_hal::modem::Modem,
        sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
        nvs: Option<esp_idf_svc::nvs::EspDefaultNvsPartition>,
        ssid: &str,
        password: &str,
    ) -> Result<Self, CommsError> {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};

        let credentials = validate_credentials(ssid, password);
        let mut wifi = EspWifi::new(modem, sysloop, nvs).map_err(|e| {
            warn!("WiFi: driver init failed: {}", e);
            CommsError::WifiConnectFailed
        })?;

        if credentials.is_ok() {
            let conf = Configuration::Client(ClientConfiguration {
                ssid: ssid.try_into().map_err(|_| CommsError::InvalidSsid)?,
                password: password.try_into().map_err(|_| CommsError::InvalidPassword)?,
                auth_method: if password.is_empty() {
                    AuthMethod::None
                } else {
                    AuthMethod::WPA2Personal
                },
                ..Default::default()
            });
            wifi.set_configuration(&conf).map_err(|e| {
                warn!("WiFi: set_configuration failed: {}", e);
                CommsError::WifiConnectFailed
            })?;
            wifi.start().map_err(|e| {
                warn!("WiFi: start failed: {}", e);
                CommsError::WifiConnectFailed
            })?;
            info!("WiFi: STA started for '{}'", ssid);
        } else if let Err(e) = credentials {
            warn!("WiFi: {}, running offline", e);
        }

        Ok(Self {
            ssid: crate::config::bounded(ssid),
            credentials,
            connect_calls: 0,
            wifi,
        })
    }

    /// Simulated adapter.  The link starts down and unreachable.
    #[cfg(not(target_os = "espidf"))]
    pub fn new(ssid: &str, password: &str) -> Self {
        let credentials = validate_credentials(ssid, password);
        if let Err(e) = credentials {
            warn!("WiFi(sim): {}, running offline", e);
        }
        Self {
            ssid: crate::config::bounded(ssid),
            credentials,
            connect_calls: 0,
            sim: SimLink::default(),
        }
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// Association attempts started since boot.
    pub fn connect_calls(&self) -> u32 {
        self.connect_calls
    }

    // ── Simulation controls ───────────────────────────────────

    /// Whether future association attempts succeed.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_reachable(&mut self, reachable: bool) {
        self.sim.reachable = reachable;
    }

    /// Drop the link as if the AP went away.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_drop_link(&mut self) {
        self.sim.up = false;
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        // A stale half-open association makes connect() fail; clear it first.
        let _ = self.wifi.disconnect();
        self.wifi.connect().map_err(|e| {
            warn!("WiFi: connect request failed: {}", e);
            CommsError::WifiConnectFailed
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        if self.sim.reachable {
            self.sim.up = true;
        }
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_up(&mut self) -> bool {
        self.wifi.is_up().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_up(&mut self) -> bool {
        self.sim.up
    }
}

impl LinkPort for WifiAdapter {
    fn start_connect(&mut self) -> Result<(), CommsError> {
        self.credentials?;
        self.connect_calls = self.connect_calls.saturating_add(1);
        info!("WiFi: associating with '{}' (attempt {})", self.ssid, self.connect_calls);
        self.platform_connect()
    }

    fn is_up(&mut self) -> bool {
        self.credentials.is_ok() && self.platform_is_up()
    }
}
