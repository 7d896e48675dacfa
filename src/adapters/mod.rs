//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements           | Connects to               |
//! |-------------|----------------------|---------------------------|
//! | `hardware`  | SensorPort           | HC-SR04 via RangeFinder   |
//! |             | AnnunciatorPort      | RGB LED, buzzers, panel   |
//! | `log_sink`  | EventSink            | Serial log output         |
//! | `mqtt`      | MessagePort          | ESP-IDF MQTT client       |
//! | `nvs`       | ConfigPort           | NVS / in-memory store     |
//! | `time`      | TimePort             | ESP32 system timer        |
//! | `wifi`      | ConnectivityPort     | ESP-IDF WiFi STA          |
//! | `device_id` | -                    | eFuse MAC → client id     |

pub mod device_id;
pub mod hardware;
pub mod log_sink;
#[cfg(target_os = "espidf")]
pub mod mqtt;
pub mod nvs;
pub mod time;
pub mod wifi;
