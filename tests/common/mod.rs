//! Shared test infrastructure for pwm-backlight integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use std::cell::RefCell;
use std::rc::Rc;

use pwm_backlight::{BacklightPin, ComparatorChannel, PinState, PwmTimer};

// ============================================================================
// Mock Pin
// ============================================================================

/// Everything a [`MockPin`] has been asked to do.
#[derive(Debug, Default)]
pub struct PinLog {
    pub is_output: bool,
    pub writes: heapless::Vec<PinState, 64>,
}

impl PinLog {
    pub fn last_write(&self) -> Option<PinState> {
        self.writes.last().copied()
    }

    /// Number of writes driving the given level.
    pub fn count(&self, state: PinState) -> usize {
        self.writes.iter().filter(|w| **w == state).count()
    }
}

/// Mock GPIO pin that records direction and every level written.
///
/// The log is shared so tests can inspect it while the pin itself is owned
/// by the backlight controller.
pub struct MockPin {
    log: Rc<RefCell<PinLog>>,
}

impl MockPin {
    pub fn new() -> (Self, Rc<RefCell<PinLog>>) {
        let log = Rc::new(RefCell::new(PinLog::default()));
        (Self { log: log.clone() }, log)
    }
}

impl BacklightPin for MockPin {
    fn set_as_output(&mut self) {
        self.log.borrow_mut().is_output = true;
    }

    fn write(&mut self, state: PinState) {
        let _ = self.log.borrow_mut().writes.push(state);
    }
}

// ============================================================================
// Mock Timer
// ============================================================================

/// Register-level history of a [`MockTimer`].
#[derive(Debug, Default)]
pub struct TimerLog {
    /// Channel and top value passed to `configure_fast_pwm`, if called.
    pub fast_pwm: Option<(ComparatorChannel, u16)>,
    /// Every compare value written, in order.
    pub compares: heapless::Vec<u16, 512>,
    /// Whether the compare unit is currently connected to the pin.
    pub output_connected: bool,
    pub connects: usize,
    pub disconnects: usize,
    /// Whether the overflow (tick) interrupt is enabled.
    pub tick_enabled: bool,
}

impl TimerLog {
    pub fn last_compare(&self) -> Option<u16> {
        self.compares.last().copied()
    }
}

/// Mock 16-bit PWM timer recording every register access.
pub struct MockTimer {
    log: Rc<RefCell<TimerLog>>,
}

impl MockTimer {
    pub fn new() -> (Self, Rc<RefCell<TimerLog>>) {
        let log = Rc::new(RefCell::new(TimerLog::default()));
        (Self { log: log.clone() }, log)
    }
}

impl PwmTimer for MockTimer {
    fn configure_fast_pwm(&mut self, channel: ComparatorChannel, top: u16) {
        let mut log = self.log.borrow_mut();
        log.fast_pwm = Some((channel, top));
        log.output_connected = true;
    }

    fn set_compare(&mut self, _channel: ComparatorChannel, value: u16) {
        let _ = self.log.borrow_mut().compares.push(value);
    }

    fn connect_output(&mut self, _channel: ComparatorChannel) {
        let mut log = self.log.borrow_mut();
        log.output_connected = true;
        log.connects += 1;
    }

    fn disconnect_output(&mut self, _channel: ComparatorChannel) {
        let mut log = self.log.borrow_mut();
        log.output_connected = false;
        log.disconnects += 1;
    }

    fn enable_tick_interrupt(&mut self) {
        self.log.borrow_mut().tick_enabled = true;
    }

    fn disable_tick_interrupt(&mut self) {
        self.log.borrow_mut().tick_enabled = false;
    }

    fn tick_interrupt_enabled(&self) -> bool {
        self.log.borrow().tick_enabled
    }
}

// ============================================================================
// Test Helper Functions
// ============================================================================

use pwm_backlight::{Pin, Port, TIMER_TOP, cie_lightness};

/// A pin with a hardware comparator (timer 1, unit C).
pub const HW_PIN: Pin = Pin {
    port: Port::B,
    index: 7,
};

/// A pin with no comparator; selects the software fallback.
pub const SW_PIN: Pin = Pin {
    port: Port::D,
    index: 4,
};

/// Expected duty for a discrete level, straight from the level formula.
pub fn expected_duty(level: u8, levels: u8) -> u16 {
    cie_lightness((TIMER_TOP as u32 * level as u32 / levels as u32) as u16)
}
