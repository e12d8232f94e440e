//! PWM channel abstraction and hardware capability resolution.
//!
//! The backlight LED is driven either by a hardware output-compare unit or,
//! for pins without one, by the software fallback in [`crate::soft_pwm`].
//! Which of the two applies is decided once, at configuration time, from a
//! fixed pin-to-comparator table; after that [`PwmChannel::set_duty`] is the
//! single point of contact for committing a duty value to the LED.
//!
//! Hardware access goes through the [`BacklightPin`] and [`PwmTimer`] traits.
//! Implement these for your MCU's GPIO and 16-bit timer peripherals.

use crate::TIMER_TOP;

/// GPIO port identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    B,
    C,
    D,
    E,
    F,
}

/// A port/index pair naming the backlight output pin, e.g. `B7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pin {
    pub port: Port,
    pub index: u8,
}

impl Pin {
    /// Creates a pin identifier. `index` is the bit position within the port
    /// (0..=7).
    #[inline]
    pub const fn new(port: Port, index: u8) -> Self {
        Self { port, index }
    }
}

/// Logical output level of the backlight pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinState {
    Low,
    High,
}

impl PinState {
    /// The opposite output level.
    #[inline]
    pub const fn inverted(self) -> Self {
        match self {
            PinState::Low => PinState::High,
            PinState::High => PinState::Low,
        }
    }
}

/// 16-bit timer peripheral owning a set of output-compare units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerId {
    Timer1,
    Timer3,
}

/// Output-compare unit within a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompareUnit {
    A,
    B,
    C,
}

/// A concrete hardware comparator: one compare unit of one timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ComparatorChannel {
    pub timer: TimerId,
    pub unit: CompareUnit,
}

/// Looks up the output-compare unit wired to a pin, if any.
///
/// The table mirrors the ATmega32U4-class wiring: `B5`/`B6`/`B7` sit on
/// timer 1's compare units A/B/C, `C6` on timer 3's unit A. Every other pin
/// has no comparator and falls back to software PWM.
pub const fn comparator_for_pin(pin: Pin) -> Option<ComparatorChannel> {
    match (pin.port, pin.index) {
        (Port::B, 5) => Some(ComparatorChannel {
            timer: TimerId::Timer1,
            unit: CompareUnit::A,
        }),
        (Port::B, 6) => Some(ComparatorChannel {
            timer: TimerId::Timer1,
            unit: CompareUnit::B,
        }),
        (Port::B, 7) => Some(ComparatorChannel {
            timer: TimerId::Timer1,
            unit: CompareUnit::C,
        }),
        (Port::C, 6) => Some(ComparatorChannel {
            timer: TimerId::Timer3,
            unit: CompareUnit::A,
        }),
        _ => None,
    }
}

/// How the configured pin can be driven. Fixed after configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmCapability {
    /// The pin is wired to a hardware output-compare unit.
    Hardware(ComparatorChannel),
    /// No comparator on this pin; duty is approximated in software.
    Software,
}

impl PwmCapability {
    /// Returns true for the hardware-comparator case.
    #[inline]
    pub fn is_hardware(&self) -> bool {
        matches!(self, PwmCapability::Hardware(_))
    }
}

/// Trait for abstracting the backlight GPIO pin.
///
/// Implement this for your hardware. Methods cannot fail; handle any
/// hardware errors internally.
pub trait BacklightPin {
    /// Configures the pin as an output.
    fn set_as_output(&mut self);

    /// Drives the pin to the given level.
    fn write(&mut self, state: PinState);
}

/// Trait for abstracting the 16-bit PWM timer peripheral.
///
/// One implementation typically wraps the MCU's timer register block. The
/// tick-interrupt methods gate the timer-overflow interrupt that drives the
/// breathing animation; `tick_interrupt_enabled` is the source of truth for
/// whether the animation is live.
pub trait PwmTimer {
    /// Programs the comparator's timer for fast PWM: waveform mode, no
    /// prescaling, counter top of [`TIMER_TOP`], and a non-inverted
    /// compare output (pin high while the count is below the compare value).
    fn configure_fast_pwm(&mut self, channel: ComparatorChannel, top: u16);

    /// Writes the compare register. Non-blocking; safe in interrupt context.
    fn set_compare(&mut self, channel: ComparatorChannel, value: u16);

    /// Connects the compare unit's output to the pin.
    fn connect_output(&mut self, channel: ComparatorChannel);

    /// Disconnects the compare unit from the pin, releasing it to GPIO.
    fn disconnect_output(&mut self, channel: ComparatorChannel);

    /// Enables the timer-overflow interrupt (the breathing tick source).
    fn enable_tick_interrupt(&mut self);

    /// Disables the timer-overflow interrupt.
    fn disable_tick_interrupt(&mut self);

    /// Whether the overflow interrupt is currently enabled.
    fn tick_interrupt_enabled(&self) -> bool;
}

/// Single point of contact for committing a duty value to the LED.
///
/// Owns the timer peripheral and the capability resolved for the configured
/// pin. Under [`PwmCapability::Software`] the duty commit is deferred to the
/// software PWM tick; the channel itself touches no hardware.
#[derive(Debug)]
pub struct PwmChannel<T: PwmTimer> {
    timer: T,
    capability: PwmCapability,
    duty: u16,
}

impl<T: PwmTimer> PwmChannel<T> {
    /// Resolves the pin's capability from the comparator table.
    ///
    /// Touches no hardware; register programming is deferred to [`init`] so
    /// the owning controller can order it after the pin has been parked in
    /// its inactive state.
    ///
    /// [`init`]: PwmChannel::init
    pub fn configure(timer: T, pin: Pin) -> Self {
        let capability = match comparator_for_pin(pin) {
            Some(channel) => PwmCapability::Hardware(channel),
            None => PwmCapability::Software,
        };

        Self {
            timer,
            capability,
            duty: 0,
        }
    }

    /// Programs the timer for fast PWM. No-op under software capability.
    pub fn init(&mut self) {
        if let PwmCapability::Hardware(channel) = self.capability {
            self.timer.configure_fast_pwm(channel, TIMER_TOP);
        }
    }

    /// The capability resolved at configuration time.
    #[inline]
    pub fn capability(&self) -> PwmCapability {
        self.capability
    }

    /// Commits a duty value.
    ///
    /// Hardware: writes the compare register, and keeps the compare unit
    /// connected to the pin only while the duty is nonzero; a zero duty
    /// releases the pin to its GPIO level instead of leaving a degenerate
    /// always-low PWM waveform. Software: records the target; the pin is
    /// toggled on the next software PWM tick.
    ///
    /// O(1) register writes only; safe in interrupt context.
    pub fn set_duty(&mut self, duty: u16) {
        if let PwmCapability::Hardware(channel) = self.capability {
            if duty == 0 {
                self.timer.disconnect_output(channel);
            } else if self.duty == 0 {
                self.timer.connect_output(channel);
            }
            self.timer.set_compare(channel, duty);
        }
        self.duty = duty;
    }

    /// The last committed duty value.
    #[inline]
    pub fn duty(&self) -> u16 {
        self.duty
    }

    /// Turns on the breathing tick source.
    #[inline]
    pub fn enable_tick(&mut self) {
        self.timer.enable_tick_interrupt();
    }

    /// Turns off the breathing tick source.
    #[inline]
    pub fn disable_tick(&mut self) {
        self.timer.disable_tick_interrupt();
    }

    /// Whether the breathing tick source is active.
    #[inline]
    pub fn tick_enabled(&self) -> bool {
        self.timer.tick_interrupt_enabled()
    }

    /// Releases the timer peripheral.
    pub fn free(self) -> T {
        self.timer
    }
}
