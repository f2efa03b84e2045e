// Motor driver seam
//
// The dispatcher drives the power stage through this trait, so tests can
// substitute a recording fake and deployments can swap the output mechanism
// (memory-mapped PWM block, GPIO expander, simulation) without touching the
// command path.

use crate::command::Direction;

/// Error types for motor output
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("channel {channel} out of range")]
    BadChannel { channel: u8 },
}

pub trait MotorDriver {
    /// Set one channel's duty and direction. The duty is already clamped
    /// to the safety ceiling by the caller.
    fn set_velocity(
        &mut self,
        channel: u8,
        duty: u16,
        direction: Direction,
    ) -> Result<(), DriverError>;

    /// Short-brake every channel: all outputs driven, held at the
    /// inactive level, resisting motion rather than coasting.
    fn brake_all(&mut self) -> Result<(), DriverError>;
}
