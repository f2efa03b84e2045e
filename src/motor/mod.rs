// Motor output side
//
// Provides:
// - The driver seam the dispatcher talks through
// - Velocity byte -> PWM duty mapping
// - The override-pair power stage implementation

mod driver;
mod power_stage;
pub mod pwm;

pub use driver::{DriverError, MotorDriver};
pub use power_stage::{PowerStage, StageRegisters};
