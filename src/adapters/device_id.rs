//! Device identity derived from the ESP32 factory MAC address.
//!
//! The broker client id is the configured device name followed by the
//! last two MAC bytes in lowercase hex, e.g. `pico1a2b`. It is stable
//! across reboots and doubles as the topic prefix in unique-topic mode.

use core::fmt::Write;

use crate::app::topics::ClientId;

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

/// `prefix` + lowercase hex of the last two MAC bytes.
pub fn client_id(prefix: &str, mac: &MacAddress) -> ClientId {
    let mut id = ClientId::new();
    let _ = write!(id, "{}{:02x}{:02x}", prefix, mac[4], mac[5]);
    id
}
