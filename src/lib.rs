#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`Backlight`**: Controls the backlight LED, discrete levels plus the breathing animation
//! - **`BacklightConfig`**: Per-keyboard constants (pin, polarity, level count, breathing defaults)
//! - **`BacklightDriver`**: Trait to implement for boards with bespoke backlight hardware
//! - **`PwmChannel`**: Commits duty values through a hardware comparator or the software fallback
//! - **`BacklightPin` / `PwmTimer`**: Traits to implement for your GPIO and timer hardware
//! - **`SoftwarePwm`**: 16-phase fallback for pins without a comparator
//! - **`BreathingEngine`**: Interrupt-tick-driven animation state machine
//! - **`cie_lightness`**: Perceptual correction so linear level steps look evenly spaced
//!
//! Duty values are `u16` timer-comparator thresholds in `[0, TIMER_TOP]`;
//! brightness levels are small integers in `[0, levels]` from the keyboard's
//! configuration.

pub mod backlight;
pub mod breathing;
pub mod curve;
pub mod pwm;
pub mod soft_pwm;

pub use backlight::{Backlight, BacklightConfig, BacklightDriver, BacklightError};
pub use breathing::{
    BREATHING_TABLE, BreathingEngine, BreathingSample, BreathingState, DEFAULT_TICK_RATE,
};
pub use curve::cie_lightness;
pub use pwm::{
    BacklightPin, ComparatorChannel, CompareUnit, Pin, PinState, Port, PwmCapability, PwmChannel,
    PwmTimer, TimerId, comparator_for_pin,
};
pub use soft_pwm::{SOFT_PWM_PHASES, SoftwarePwm};

/// Maximum timer count: full duty for a 16-bit fast-PWM timer.
pub const TIMER_TOP: u16 = 0xFFFF;

/// Entries in one full breathing cycle.
pub const BREATHING_STEPS: usize = 128;

/// Default breathing period in seconds.
pub const DEFAULT_BREATHING_PERIOD: u8 = 6;
