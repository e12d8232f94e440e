//! Perceptual brightness correction.
//!
//! The human eye's response to luminance is non-linear: equal steps in PWM
//! duty cycle do not look like equal steps in brightness. [`cie_lightness`]
//! maps a linear duty value onto a CIE-1931-style lightness curve so that
//! linear level steps and breathing fades look evenly spaced.
//!
//! The math is integer-only and safe to call from interrupt context.

use crate::TIMER_TOP;

/// 8% of [`TIMER_TOP`], the breakpoint between the linear and cubic segments.
const LINEAR_SEGMENT_MAX: u16 = 5243;

/// 16% of [`TIMER_TOP`], the offset applied in the cubic segment.
const CUBIC_OFFSET: u32 = 10486;

/// Maps a linear duty value to a perceptually-linear duty value.
///
/// Below 8% of full scale the curve is a gentle linear ramp (`v / 9`); above
/// it, a cubic segment `((v + 0.16 * top) / (1.16 * top))^3 * top`. The
/// cubic is evaluated in fixed point: the ratio is scaled up by `<< 8`
/// before cubing and the excess `2 * 8` bits are shifted back out, keeping
/// everything in integer arithmetic.
///
/// Pure and total: any `u16` input yields a result in `[0, TIMER_TOP]`, and
/// the mapping is monotonic non-decreasing within each segment. Integer
/// truncation puts a dip of a few dozen counts right at the breakpoint,
/// carried over from the reference fixed-point math; it is far below what
/// the eye can resolve.
pub fn cie_lightness(v: u16) -> u16 {
    if v <= LINEAR_SEGMENT_MAX {
        // Same as dividing by 900%.
        v / 9
    } else {
        let y = ((v as u32 + CUBIC_OFFSET) << 8) / (CUBIC_OFFSET + TIMER_TOP as u32);
        // y fits in 9 bits, so the cube fits well within u64.
        let y = (y as u64 * y as u64 * y as u64) >> 8;
        if y > TIMER_TOP as u64 {
            TIMER_TOP
        } else {
            y as u16
        }
    }
}
