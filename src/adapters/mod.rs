//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter          | Implements    | Connects to                    |
//! |------------------|---------------|--------------------------------|
//! | `hardware`       | SensorPort    | DHT22 GPIO, MQ-2/MQ-135 ADC1   |
//! |                  | ActuatorPort  | indicator GPIOs, buzzer LEDC   |
//! |                  | DisplayPort   | 16×2 LCD over I2C              |
//! | `wifi`           | LinkPort      | ESP-IDF WiFi STA               |
//! | `http_collector` | CollectorPort | HTTP POST to the collector     |
//! | `time`           | TimePort      | ESP32 system timer, FreeRTOS   |
//! | `log_sink`       | EventSink     | Serial log output              |
//! | `device_id`      | —             | eFuse MAC                      |

pub mod device_id;
pub mod hardware;
pub mod http_collector;
pub mod log_sink;
pub mod time;
pub mod wifi;
