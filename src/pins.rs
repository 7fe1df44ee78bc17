//! GPIO / peripheral pin assignments for the FireSense node (ESP32-WROOM-32).
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// DHT22 single-wire data line (open-drain, external 10 kΩ pull-up).
pub const DHT_DATA_GPIO: i32 = 4;

/// MQ-2 smoke sensor analog output.  ADC1 channel 6 (GPIO 34, input only).
pub const SMOKE_ADC_GPIO: i32 = 34;

/// MQ-135 gas sensor analog output.  ADC1 channel 7 (GPIO 35, input only).
pub const GAS_ADC_GPIO: i32 = 35;

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// Green "safe" indicator LED (active HIGH).
pub const SAFE_LED_GPIO: i32 = 26;

/// Red "danger" indicator LED (active HIGH).
pub const DANGER_LED_GPIO: i32 = 27;

/// Passive piezo buzzer, driven by an LEDC channel.
pub const BUZZER_GPIO: i32 = 25;

// ---------------------------------------------------------------------------
// Display (16x2 LCD on a PCF8574 I2C backpack)
// ---------------------------------------------------------------------------

pub const LCD_I2C_SDA_GPIO: i32 = 21;
pub const LCD_I2C_SCL_GPIO: i32 = 22;
/// 7-bit address of the PCF8574 expander (0x27 default, 0x3F on "A" parts).
pub const LCD_I2C_ADDR: u8 = 0x27;
pub const LCD_I2C_FREQ_HZ: u32 = 100_000;
