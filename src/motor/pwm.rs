// Velocity byte -> PWM duty mapping

use crate::config::DUTY_LIMIT;

/// Map an 8-bit velocity onto [0, DUTY_LIMIT], rounding to nearest.
/// The product is widened before dividing; 480 * 255 does not fit in
/// 16 bits. Linear and monotonic, with 0 -> 0 and 255 -> DUTY_LIMIT.
pub fn velocity_to_duty(velocity: u8) -> u16 {
    ((u32::from(velocity) * u32::from(DUTY_LIMIT) + 127) / 255) as u16
}
