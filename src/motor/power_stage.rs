// Override-pair PWM power stage
//
// Models a full-bridge PWM peripheral: each channel owns a complementary
// pair of override bits (2N for the negative side, 2N+1 for the positive
// side). A set override bit hands the pin to the duty generator; a clear
// bit pins it to the matching output-state level. Short brake clears every
// override bit and holds every output-state level inactive.

use tracing::debug;

use super::driver::{DriverError, MotorDriver};
use crate::command::{CHANNEL_COUNT, Direction};

/// Register image for the output stage. On the target this is a
/// memory-mapped block; host builds keep it as plain state so tests and
/// simulations can inspect exactly what was last written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StageRegisters {
    /// Per-pin override select, two bits per channel.
    pub override_drive: u8,
    /// Pin level applied while the matching override bit is clear.
    pub output_state: u8,
    /// Duty register pairs, one per channel, high byte first.
    pub duty: [[u8; 2]; CHANNEL_COUNT as usize],
}

pub struct PowerStage {
    regs: StageRegisters,
}

impl PowerStage {
    /// Bring the stage up already braked.
    pub fn new() -> Self {
        Self {
            regs: StageRegisters::default(),
        }
    }

    /// Last written register image, for diagnostics and tests.
    pub fn registers(&self) -> StageRegisters {
        self.regs
    }
}

impl Default for PowerStage {
    fn default() -> Self {
        Self::new()
    }
}

impl MotorDriver for PowerStage {
    fn set_velocity(
        &mut self,
        channel: u8,
        duty: u16,
        direction: Direction,
    ) -> Result<(), DriverError> {
        if channel >= CHANNEL_COUNT {
            return Err(DriverError::BadChannel { channel });
        }

        // Exactly one side of the bridge follows the duty generator
        let negative = 1u8 << (channel * 2);
        let positive = 1u8 << (channel * 2 + 1);
        match direction {
            Direction::Forward => {
                self.regs.override_drive &= !negative;
                self.regs.override_drive |= positive;
            }
            Direction::Reverse => {
                self.regs.override_drive |= negative;
                self.regs.override_drive &= !positive;
            }
        }

        self.regs.duty[channel as usize] = [(duty >> 8) as u8, (duty & 0xFF) as u8];
        debug!("channel {} {:?} duty {}", channel, direction, duty);
        Ok(())
    }

    fn brake_all(&mut self) -> Result<(), DriverError> {
        debug!("short-braking all channels");
        self.regs.override_drive = 0x00;
        self.regs.output_state = 0x00;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_sets_positive_side_only() {
        let mut stage = PowerStage::new();
        stage.set_velocity(0, 100, Direction::Forward).unwrap();
        assert_eq!(stage.registers().override_drive, 0b0000_0010);

        stage.set_velocity(2, 100, Direction::Forward).unwrap();
        assert_eq!(stage.registers().override_drive, 0b0010_0010);
    }

    #[test]
    fn test_reverse_sets_negative_side_only() {
        let mut stage = PowerStage::new();
        stage.set_velocity(3, 50, Direction::Reverse).unwrap();
        assert_eq!(stage.registers().override_drive, 0b0100_0000);
    }

    #[test]
    fn test_direction_flip_swaps_pair() {
        let mut stage = PowerStage::new();
        stage.set_velocity(1, 200, Direction::Forward).unwrap();
        assert_eq!(stage.registers().override_drive & 0b1100, 0b1000);
        stage.set_velocity(1, 200, Direction::Reverse).unwrap();
        assert_eq!(stage.registers().override_drive & 0b1100, 0b0100);
    }

    #[test]
    fn test_duty_written_as_register_pair() {
        let mut stage = PowerStage::new();
        stage.set_velocity(2, 480, Direction::Forward).unwrap();
        assert_eq!(stage.registers().duty[2], [0x01, 0xE0]);
    }

    #[test]
    fn test_brake_clears_overrides_and_levels() {
        let mut stage = PowerStage::new();
        stage.set_velocity(0, 480, Direction::Forward).unwrap();
        stage.set_velocity(3, 480, Direction::Reverse).unwrap();
        stage.brake_all().unwrap();

        let regs = stage.registers();
        assert_eq!(regs.override_drive, 0x00);
        assert_eq!(regs.output_state, 0x00);
    }

    #[test]
    fn test_channel_out_of_range() {
        let mut stage = PowerStage::new();
        let err = stage.set_velocity(4, 0, Direction::Forward).unwrap_err();
        assert!(matches!(err, DriverError::BadChannel { channel: 4 }));
    }

    #[test]
    fn test_brake_preserves_duty_registers() {
        // Braking works through the override bits; the duty pair keeps
        // its last commanded value.
        let mut stage = PowerStage::new();
        stage.set_velocity(1, 307, Direction::Forward).unwrap();
        stage.brake_all().unwrap();
        assert_eq!(stage.registers().duty[1], [0x01, 0x33]);
    }
}
