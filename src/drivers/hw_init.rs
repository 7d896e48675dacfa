//! One-shot hardware peripheral initialization.
//!
//! Configures the LED GPIO outputs and the two LEDC timer/channel pairs
//! that drive the buzzers, using raw ESP-IDF sys calls. Called once from
//! `main()` before the loop starts. The ranger pins are owned by
//! `PinDriver`s created in `main()` and are not touched here.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    LedcInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::LedcInitFailed(rc) => write!(f, "LEDC timer/channel config failed (rc={})", rc),
        }
    }
}

impl core::error::Error for HwInitError {}

/// The two buzzers. Each has its own LEDC timer so they can sound
/// different pitches at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzerId {
    Alarm,
    Tone,
}

impl BuzzerId {
    /// LEDC channel (and timer) index.
    pub const fn channel(self) -> u32 {
        match self {
            Self::Alarm => 0,
            Self::Tone => 1,
        }
    }
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the loop; single-threaded.
    unsafe {
        init_gpio_outputs()?;
        init_ledc()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    let output_pins = [pins::LED_R_GPIO, pins::LED_G_GPIO, pins::LED_B_GPIO];

    for &pin in &output_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
        unsafe { gpio_set_level(pin, 0) };
    }

    info!("hw_init: LED outputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an output configured in
    // init_gpio_outputs(). Main-loop only.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── LEDC PWM (buzzers) ───────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_ledc() -> Result<(), HwInitError> {
    let buzzers = [
        (BuzzerId::Alarm, pins::BUZZER_ALARM_GPIO),
        (BuzzerId::Tone, pins::BUZZER_TONE_GPIO),
    ];

    for (id, gpio) in buzzers {
        let timer = ledc_timer_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            timer_num: ledc_timer_t_LEDC_TIMER_0 + id.channel(),
            duty_resolution: ledc_timer_bit_t_LEDC_TIMER_8_BIT,
            freq_hz: pins::BUZZER_BASE_FREQ_HZ,
            clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
            ..Default::default()
        };
        // SAFETY: single main-task context via init_peripherals().
        let ret = unsafe { ledc_timer_config(&timer) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::LedcInitFailed(ret));
        }

        let ret = unsafe {
            ledc_channel_config(&ledc_channel_config_t {
                speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
                channel: ledc_channel_t_LEDC_CHANNEL_0 + id.channel(),
                timer_sel: ledc_timer_t_LEDC_TIMER_0 + id.channel(),
                gpio_num: gpio,
                duty: 0,
                hpoint: 0,
                ..Default::default()
            })
        };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::LedcInitFailed(ret));
        }
    }

    info!("hw_init: LEDC configured (alarm=CH0, tone=CH1)");
    Ok(())
}

/// Start a square wave at `freq_hz` on `buzzer`.
#[cfg(target_os = "espidf")]
pub fn buzzer_tone(buzzer: BuzzerId, freq_hz: u32) {
    // SAFETY: timer/channel configured in init_ledc(); main loop only.
    unsafe {
        ledc_set_freq(
            ledc_mode_t_LEDC_LOW_SPEED_MODE,
            ledc_timer_t_LEDC_TIMER_0 + buzzer.channel(),
            freq_hz,
        );
        ledc_set_duty(
            ledc_mode_t_LEDC_LOW_SPEED_MODE,
            ledc_channel_t_LEDC_CHANNEL_0 + buzzer.channel(),
            pins::BUZZER_DUTY,
        );
        ledc_update_duty(
            ledc_mode_t_LEDC_LOW_SPEED_MODE,
            ledc_channel_t_LEDC_CHANNEL_0 + buzzer.channel(),
        );
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn buzzer_tone(_buzzer: BuzzerId, _freq_hz: u32) {}

#[cfg(target_os = "espidf")]
pub fn buzzer_off(buzzer: BuzzerId) {
    // SAFETY: see buzzer_tone().
    unsafe {
        ledc_set_duty(
            ledc_mode_t_LEDC_LOW_SPEED_MODE,
            ledc_channel_t_LEDC_CHANNEL_0 + buzzer.channel(),
            0,
        );
        ledc_update_duty(
            ledc_mode_t_LEDC_LOW_SPEED_MODE,
            ledc_channel_t_LEDC_CHANNEL_0 + buzzer.channel(),
        );
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn buzzer_off(_buzzer: BuzzerId) {}

/// Block the calling task for `ms`.
#[cfg(target_os = "espidf")]
pub fn block_ms(ms: u32) {
    esp_idf_hal::delay::FreeRtos::delay_ms(ms);
}

#[cfg(not(target_os = "espidf"))]
pub fn block_ms(_ms: u32) {}
