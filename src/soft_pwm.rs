//! Software PWM fallback for pins without a hardware comparator.
//!
//! Approximates a duty cycle by toggling the pin over a repeating 16-phase
//! pattern, one phase per call to [`SoftwarePwm::tick`] from the firmware's
//! cooperative main loop. Resolution is fixed at 1/16 regardless of how many
//! brightness levels are configured; the tradeoff (coarse granularity, zero
//! hardware dependency) is deliberate.

use crate::pwm::{BacklightPin, PinState};

/// Number of phases in one software PWM cycle.
pub const SOFT_PWM_PHASES: u8 = 16;

/// 16-phase software PWM driver.
///
/// Holds only the cyclic phase counter; the brightness level is passed in on
/// every tick by the owning controller, which is the single source of truth
/// for it.
#[derive(Debug, Default)]
pub struct SoftwarePwm {
    phase: u8,
}

impl SoftwarePwm {
    /// Creates a driver at phase 0.
    pub const fn new() -> Self {
        Self { phase: 0 }
    }

    /// The current phase, in `[0, 16)`.
    #[inline]
    pub fn phase(&self) -> u8 {
        self.phase
    }

    /// On-pattern for a level: a mask with one bit per phase.
    ///
    /// `level == levels` yields an all-ones mask (always on) and `level == 0`
    /// an empty one (always off); intermediate levels set a proportional
    /// number of bits. Level 0 is special-cased because the proportional
    /// shift only empties the mask once it reaches 16, which a small level
    /// count never does; an off backlight must not glow. Levels above
    /// `levels` count as full.
    fn mask(level: u8, levels: u8) -> u16 {
        let level = level.min(levels);
        if level == 0 {
            return 0;
        }
        let shift = (levels - level) as u32 * ((levels as u32 + 1) / 2);
        0xFFFFu16.checked_shr(shift).unwrap_or(0)
    }

    /// Advances one phase and drives the pin for it.
    ///
    /// If the current phase's bit is set in the level's on-pattern the pin is
    /// driven to `on_state`, otherwise to its inverse. Non-blocking; call
    /// once per pass of the cooperative main loop.
    ///
    /// `level` is clamped to `[0, levels]`.
    pub fn tick<P: BacklightPin>(&mut self, pin: &mut P, on_state: PinState, level: u8, levels: u8) {
        let mask = Self::mask(level, levels);
        if mask & (1u16 << self.phase) != 0 {
            pin.write(on_state);
        } else {
            pin.write(on_state.inverted());
        }
        self.phase = (self.phase + 1) % SOFT_PWM_PHASES;
    }
}
