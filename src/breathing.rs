//! Breathing animation state machine.
//!
//! [`BreathingEngine`] tracks where a continuous fade-up/fade-down animation
//! is within its cycle. It is advanced once per timer-overflow interrupt by
//! [`advance`](BreathingEngine::advance), which is the only operation that
//! touches the cyclic counter; everything else runs in task context and
//! only writes single-word state, matching the interrupt discipline of the
//! surrounding firmware.
//!
//! The engine itself produces table indices; scaling by the user's chosen
//! brightness, perceptual correction, and the actual duty commit live in
//! [`crate::backlight::Backlight`], which also owns turning the tick source
//! on and off.

use crate::{BREATHING_STEPS, DEFAULT_BREATHING_PERIOD};

/// Ticks per second delivered by a 16 MHz clock with a 16-bit fast-PWM timer
/// counting to 64k: the overflow interrupt fires about 244 times per second.
pub const DEFAULT_TICK_RATE: u16 = 244;

/// One full breathing cycle: rise then fall.
///
/// Generated as `int(sin(x / 128 * pi) ** 4 * 255)` for `x` in `0..128`. The
/// fourth power keeps the LED near-dark longer than a plain sine, which
/// reads as a calmer breath.
pub const BREATHING_TABLE: [u8; BREATHING_STEPS] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 2, 3, 4, 5, 6, 8, 10, 12, 15, 17, 20, 24, 28, 32, 36,
    41, 46, 51, 57, 63, 70, 76, 83, 91, 98, 106, 113, 121, 129, 138, 146, 154, 162, 170, 178, 185,
    193, 200, 207, 213, 220, 225, 231, 235, 240, 244, 247, 250, 252, 253, 254, 255, 254, 253, 252,
    250, 247, 244, 240, 235, 231, 225, 220, 213, 207, 200, 193, 185, 178, 170, 162, 154, 146, 138,
    129, 121, 113, 106, 98, 91, 83, 76, 70, 63, 57, 51, 46, 41, 36, 32, 28, 24, 20, 17, 15, 12,
    10, 8, 6, 5, 4, 3, 2, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

/// Index of the table's peak entry, where a halt-at-on pulse stops.
pub const PEAK_INDEX: u8 = (BREATHING_STEPS / 2) as u8;

/// Index of the table's final entry, where a halt-at-off request stops.
pub const REST_INDEX: u8 = (BREATHING_STEPS - 1) as u8;

/// Animation lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BreathingState {
    /// Not animating.
    Disabled,
    /// Cycling continuously.
    Running,
    /// Stop at the next pass through the curve's dark rest point.
    HaltPendingOff,
    /// Stop at the next pass through the curve's peak.
    HaltPendingOn,
}

/// One advance of the animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BreathingSample {
    /// Index into [`BREATHING_TABLE`] for this tick.
    pub index: u8,
    /// A pending halt condition was reached; the caller must turn off the
    /// tick source.
    pub halt: bool,
}

/// Breathing animation state machine.
///
/// `period` is the length of one full breath in seconds (at the default tick
/// rate); `tick_rate` is how many times per second [`advance`] is invoked.
///
/// [`advance`]: BreathingEngine::advance
#[derive(Debug)]
pub struct BreathingEngine {
    state: BreathingState,
    period: u8,
    tick_rate: u16,
    counter: u32,
}

impl BreathingEngine {
    /// Creates a disabled engine. `period` is clamped to at least 1.
    pub const fn new(period: u8, tick_rate: u16) -> Self {
        Self {
            state: BreathingState::Disabled,
            period: if period == 0 { 1 } else { period },
            tick_rate,
            counter: 0,
        }
    }

    /// The current lifecycle state.
    #[inline]
    pub fn state(&self) -> BreathingState {
        self.state
    }

    /// The configured period.
    #[inline]
    pub fn period(&self) -> u8 {
        self.period
    }

    /// Starts the animation from the dark end of the curve.
    pub fn enable(&mut self) {
        self.counter = 0;
        self.state = BreathingState::Running;
    }

    /// Stops the animation.
    ///
    /// The caller is responsible for disabling the tick source *before* this
    /// call and for restoring the discrete brightness level afterwards; see
    /// `Backlight::breathing_disable`.
    pub fn disable(&mut self) {
        self.state = BreathingState::Disabled;
    }

    /// Primes a one-shot pulse that halts at the curve's peak.
    ///
    /// Starting point depends on the user's brightness: from a dark
    /// backlight (`level_is_zero`) the pulse rises out of the rest point;
    /// from a lit backlight it starts at the peak.
    pub fn pulse(&mut self, level_is_zero: bool) {
        if level_is_zero {
            self.seek_min();
        } else {
            self.seek_max();
        }
        self.state = BreathingState::HaltPendingOn;
    }

    /// Requests that the animation stop itself at its nearest rest point:
    /// the dark end when the backlight level is 0, the peak otherwise.
    pub fn request_halt(&mut self, level_is_zero: bool) {
        self.state = if level_is_zero {
            BreathingState::HaltPendingOff
        } else {
            BreathingState::HaltPendingOn
        };
    }

    /// Rewinds the counter to the curve's minimum point.
    pub fn seek_min(&mut self) {
        self.counter = 0;
    }

    /// Positions the counter at the curve's maximum point.
    pub fn seek_max(&mut self) {
        self.counter = self.span() / 2;
    }

    /// Sets the period, clamping to at least 1.
    pub fn set_period(&mut self, period: u8) {
        self.period = if period == 0 { 1 } else { period };
    }

    /// Lengthens the period by one second, saturating.
    pub fn period_inc(&mut self) {
        self.set_period(self.period.saturating_add(1));
    }

    /// Shortens the period by one second, stopping at 1.
    pub fn period_dec(&mut self) {
        self.set_period(self.period.saturating_sub(1));
    }

    /// Restores the default period.
    pub fn period_default(&mut self) {
        self.set_period(DEFAULT_BREATHING_PERIOD);
    }

    /// Ticks in one full breathing cycle.
    fn span(&self) -> u32 {
        self.period as u32 * self.tick_rate as u32
    }

    /// Advances the animation by one tick.
    ///
    /// Steps the cyclic counter, derives the table index for this tick, and
    /// reports whether a pending halt condition was reached (peak for
    /// [`BreathingState::HaltPendingOn`], dark rest point for
    /// [`BreathingState::HaltPendingOff`]). Bounded constant time; intended
    /// to be called from the timer-overflow interrupt.
    pub fn advance(&mut self) -> BreathingSample {
        let span = self.span();
        // Wrapping after exactly one period avoids a visible jump when the
        // raw counter would overflow.
        self.counter = (self.counter + 1) % span;

        let interval = (span / BREATHING_STEPS as u32).max(1);
        let index = ((self.counter / interval) % BREATHING_STEPS as u32) as u8;

        let halt = match self.state {
            BreathingState::HaltPendingOn => index == PEAK_INDEX,
            BreathingState::HaltPendingOff => index == REST_INDEX,
            _ => false,
        };

        BreathingSample { index, halt }
    }
}

impl Default for BreathingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_BREATHING_PERIOD, DEFAULT_TICK_RATE)
    }
}
