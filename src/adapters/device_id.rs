//! Device identity.
//!
//! A provisioned identity (`FIRESENSE_DEVICE_ID`) always wins.  Unprovisioned
//! boards fall back to an ID derived from the factory MAC, `FIRE-XXYYZZ`
//! (last 3 bytes of the 6-byte MAC in uppercase hex), which is stable
//! across reboots.

use core::fmt::Write;

use crate::config::SystemConfig;
use crate::context::DeviceIdentity;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: writes exactly 6 bytes into `mac`.
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// `FIRE-XXYYZZ` from the last 3 MAC bytes.
pub fn mac_identity(mac: &MacAddress) -> DeviceIdentity {
    let mut id = heapless::String::<16>::new();
    let _ = write!(id, "FIRE-{:02X}{:02X}{:02X}", mac[3], mac[4], mac[5]);
    DeviceIdentity::new(&id)
}

/// The identity this node reports under.
pub fn resolve(config: &SystemConfig, mac: &MacAddress) -> DeviceIdentity {
    let configured = config.device_id.trim();
    if configured.is_empty() {
        mac_identity(mac)
    } else {
        DeviceIdentity::new(configured)
    }
}
