//! Backlight controller: discrete brightness levels and the public facade.
//!
//! [`Backlight`] owns the LED pin, the PWM channel, the software PWM
//! fallback, and the breathing engine, and is the single object the
//! firmware's settings layer talks to. It converts discrete levels into
//! perceptually-corrected duty values and routes every breathing lifecycle
//! operation through the interrupt-gate discipline described on
//! [`breathing_disable`](Backlight::breathing_disable).

use crate::breathing::{BREATHING_TABLE, BreathingEngine, BreathingState, DEFAULT_TICK_RATE};
use crate::curve::cie_lightness;
use crate::pwm::{BacklightPin, Pin, PinState, PwmCapability, PwmChannel, PwmTimer};
use crate::soft_pwm::SoftwarePwm;
use crate::{DEFAULT_BREATHING_PERIOD, TIMER_TOP};

/// Configuration constants supplied by the per-keyboard definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BacklightConfig {
    /// Identifier of the LED output pin, used to resolve the PWM capability.
    pub pin: Pin,

    /// Output level that turns the LED on (active-high or active-low).
    pub on_state: PinState,

    /// Number of discrete brightness steps above off. At least 1.
    pub levels: u8,

    /// Level restored by [`Backlight::init_ports`].
    pub initial_level: u8,

    /// Default breathing period in seconds.
    pub breathing_period: u8,

    /// Start the breathing animation during `init_ports`.
    pub breathing_on_boot: bool,

    /// Breathing ticks per second delivered by the timer-overflow interrupt.
    pub tick_rate: u16,
}

impl BacklightConfig {
    /// Creates a configuration with `levels` brightness steps (clamped to at
    /// least 1), starting at full brightness, breathing off.
    pub const fn new(pin: Pin, on_state: PinState, levels: u8) -> Self {
        let levels = if levels == 0 { 1 } else { levels };
        Self {
            pin,
            on_state,
            levels,
            initial_level: levels,
            breathing_period: DEFAULT_BREATHING_PERIOD,
            breathing_on_boot: false,
            tick_rate: DEFAULT_TICK_RATE,
        }
    }

    /// Sets the level restored at initialization, clamped to `levels`.
    pub const fn with_initial_level(mut self, level: u8) -> Self {
        self.initial_level = if level > self.levels {
            self.levels
        } else {
            level
        };
        self
    }

    /// Enables the breathing animation at boot with the given period.
    pub const fn with_breathing(mut self, period: u8) -> Self {
        self.breathing_period = if period == 0 { 1 } else { period };
        self.breathing_on_boot = true;
        self
    }

    /// Overrides the breathing tick rate. The default of 244 Hz matches a
    /// 16 MHz clock with the timer counting to 64k.
    pub const fn with_tick_rate(mut self, tick_rate: u16) -> Self {
        self.tick_rate = tick_rate;
        self
    }
}

/// Errors surfaced when a backlight controller is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BacklightError {
    /// Breathing was requested for a pin with no hardware comparator. The
    /// animation needs a real timer interrupt; the software PWM fallback
    /// cannot provide one.
    BreathingRequiresHardwarePwm,
}

impl core::fmt::Display for BacklightError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BacklightError::BreathingRequiresHardwarePwm => {
                write!(
                    f,
                    "breathing requires a pin with a hardware PWM comparator"
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BacklightError {}

/// Board-level override hook for the backlight driver.
///
/// [`Backlight`] is the default implementation. A board with bespoke
/// backlight hardware (shift registers, LED drivers on I²C, ...) implements
/// this trait instead and plugs its own driver into the firmware's lighting
/// subsystem.
pub trait BacklightDriver {
    /// One-time hardware setup. Called once at startup.
    fn init_ports(&mut self);

    /// Sets the discrete brightness level.
    fn set(&mut self, level: u8);

    /// Cooperative main-loop hook; called once per scheduler pass.
    fn task(&mut self);
}

/// Controls a single backlight LED: discrete levels plus the breathing
/// animation.
///
/// All methods except [`breathing_tick`](Backlight::breathing_tick) run in
/// ordinary task context. `breathing_tick` is meant to be called from the
/// timer-overflow interrupt; it touches only the breathing counter and the
/// duty register, both of which are safe against the task-context methods
/// under the gate discipline documented on
/// [`breathing_disable`](Backlight::breathing_disable).
///
/// # Type Parameters
/// * `P` - GPIO pin implementation
/// * `T` - PWM timer implementation
#[derive(Debug)]
pub struct Backlight<P: BacklightPin, T: PwmTimer> {
    pin: P,
    channel: PwmChannel<T>,
    config: BacklightConfig,
    level: u8,
    soft_pwm: SoftwarePwm,
    breathing: BreathingEngine,
}

impl<P: BacklightPin, T: PwmTimer> Backlight<P, T> {
    /// Creates a controller for the configured pin.
    ///
    /// Resolves the pin's PWM capability immediately so that an impossible
    /// configuration fails here, at startup, rather than degrading silently.
    ///
    /// # Errors
    /// * `BreathingRequiresHardwarePwm` - breathing was requested at boot but
    ///   the pin has no hardware comparator
    pub fn new(pin: P, timer: T, config: BacklightConfig) -> Result<Self, BacklightError> {
        let channel = PwmChannel::configure(timer, config.pin);

        if config.breathing_on_boot && !channel.capability().is_hardware() {
            return Err(BacklightError::BreathingRequiresHardwarePwm);
        }

        Ok(Self {
            pin,
            channel,
            config,
            level: config.initial_level,
            soft_pwm: SoftwarePwm::new(),
            breathing: BreathingEngine::new(config.breathing_period, config.tick_rate),
        })
    }

    /// One-time hardware setup.
    ///
    /// Order matters: the pin is made an output and parked at its inactive
    /// level *before* the timer is programmed, so the LED cannot flash at
    /// full brightness while the PWM hardware is half-configured. The
    /// configured initial level is committed last, then breathing is started
    /// if the configuration asks for it.
    pub fn init_ports(&mut self) {
        self.pin.set_as_output();
        self.pin.write(self.config.on_state.inverted());
        self.channel.init();
        self.set(self.level);
        if self.config.breathing_on_boot {
            self.breathing_enable();
        }
    }

    /// Sets the discrete brightness level, clamping into `[0, levels]`.
    ///
    /// Converts the level to a linear duty value, applies perceptual
    /// correction, and commits it. Idempotent for repeated calls with the
    /// same level.
    pub fn set(&mut self, level: u8) {
        let level = level.min(self.config.levels);
        self.level = level;

        let linear = (TIMER_TOP as u32 * level as u32 / self.config.levels as u32) as u16;
        self.channel.set_duty(cie_lightness(linear));
    }

    /// The current discrete brightness level.
    #[inline]
    pub fn level(&self) -> u8 {
        self.level
    }

    /// The configured number of brightness steps.
    #[inline]
    pub fn levels(&self) -> u8 {
        self.config.levels
    }

    /// The last duty value committed to the PWM channel.
    #[inline]
    pub fn duty(&self) -> u16 {
        self.channel.duty()
    }

    /// The PWM capability resolved for the configured pin.
    #[inline]
    pub fn capability(&self) -> PwmCapability {
        self.channel.capability()
    }

    /// Cooperative main-loop hook.
    ///
    /// No-op under hardware PWM. Under software PWM, advances the 16-phase
    /// driver by one step; call once per pass of the main loop.
    pub fn task(&mut self) {
        if self.channel.capability().is_hardware() {
            return;
        }
        self.soft_pwm.tick(
            &mut self.pin,
            self.config.on_state,
            self.level,
            self.config.levels,
        );
    }

    /// Whether the breathing tick source is currently active.
    #[inline]
    pub fn is_breathing(&self) -> bool {
        self.channel.tick_enabled()
    }

    /// The current breathing state.
    #[inline]
    pub fn breathing_state(&self) -> BreathingState {
        self.breathing.state()
    }

    /// Starts the breathing animation from the dark end of its curve.
    ///
    /// No-op on a software-capability pin.
    pub fn breathing_enable(&mut self) {
        if !self.channel.capability().is_hardware() {
            return;
        }
        self.breathing.enable();
        self.channel.enable_tick();
    }

    /// Stops the breathing animation and restores the discrete level.
    ///
    /// The tick interrupt is gated off first; that gate is the
    /// synchronization boundary between task context and the interrupt, so
    /// once it is off the remaining state changes (engine state, duty
    /// register, comparator connection) cannot race the tick. Unconditionally
    /// effective: after this returns the LED shows the discrete level.
    pub fn breathing_disable(&mut self) {
        self.channel.disable_tick();
        self.breathing.disable();
        self.set(self.level);
    }

    /// Toggles the breathing animation.
    pub fn breathing_toggle(&mut self) {
        if self.is_breathing() {
            self.breathing_disable();
        } else {
            self.breathing_enable();
        }
    }

    /// Fires a one-shot pulse that halts at the curve's peak.
    ///
    /// From a dark backlight the pulse rises out of the rest point; from a
    /// lit one it starts at the peak. No-op on a software-capability pin.
    pub fn breathing_pulse(&mut self) {
        if !self.channel.capability().is_hardware() {
            return;
        }
        self.breathing.pulse(self.level == 0);
        self.channel.enable_tick();
    }

    /// Asks the running animation to stop itself at its nearest rest point:
    /// dark when the current level is 0, the peak otherwise.
    pub fn breathing_self_disable(&mut self) {
        self.breathing.request_halt(self.level == 0);
    }

    /// Sets the breathing period, clamped to at least 1 second.
    pub fn breathing_period_set(&mut self, period: u8) {
        self.breathing.set_period(period);
    }

    /// Lengthens the breathing period by one second.
    pub fn breathing_period_inc(&mut self) {
        self.breathing.period_inc();
    }

    /// Shortens the breathing period by one second, stopping at 1.
    pub fn breathing_period_dec(&mut self) {
        self.breathing.period_dec();
    }

    /// Restores the configured default breathing period.
    pub fn breathing_period_default(&mut self) {
        self.breathing.set_period(self.config.breathing_period);
    }

    /// The current breathing period in seconds.
    #[inline]
    pub fn breathing_period(&self) -> u8 {
        self.breathing.period()
    }

    /// Advances the breathing animation by one tick.
    ///
    /// Call from the timer-overflow interrupt handler. Returns immediately
    /// when the tick source is gated off, so a late interrupt after
    /// [`breathing_disable`](Backlight::breathing_disable) cannot re-animate
    /// the LED.
    ///
    /// The table sample is widened to 16 bits, scaled by the current
    /// discrete level so the breath cycles around the user's chosen
    /// brightness rather than full range, perceptually corrected, and
    /// committed. Bounded constant time.
    pub fn breathing_tick(&mut self) {
        if !self.is_breathing() {
            return;
        }

        let sample = self.breathing.advance();

        let value = BREATHING_TABLE[sample.index as usize] as u16 * 0x0101;
        let scaled = value / self.config.levels as u16 * self.level as u16;
        self.channel.set_duty(cie_lightness(scaled));

        if sample.halt {
            self.channel.disable_tick();
        }
    }
}

impl<P: BacklightPin, T: PwmTimer> BacklightDriver for Backlight<P, T> {
    fn init_ports(&mut self) {
        Backlight::init_ports(self);
    }

    fn set(&mut self, level: u8) {
        Backlight::set(self, level);
    }

    fn task(&mut self) {
        Backlight::task(self);
    }
}
