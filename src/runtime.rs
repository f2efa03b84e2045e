// Dispatcher: the single-threaded command loop
//
// Pulls bytes one at a time, drives the decoder, maps completed commands
// onto the motor driver, and short-brakes everything when the idle
// watchdog fires. The idle check runs only while no bytes are pending, so
// an in-flight frame is never interrupted by a brake.

use std::thread::sleep;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::command::{CommandDecoder, Feed, MotorCommand};
use crate::config::{DUTY_LIMIT, POLL_INTERVAL};
use crate::motor::pwm::velocity_to_duty;
use crate::motor::{DriverError, MotorDriver, PowerStage};
use crate::transport::{ByteSource, SerialSource, TransportError};
use crate::watchdog::{Clock, IdleWatchdog, MonotonicClock};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Externally visible effect of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Nothing pending, watchdog quiet.
    Idle,
    /// Watchdog fired; all channels braked, decoder reset.
    Braked,
    /// One byte consumed without completing a frame.
    Fed,
    /// A frame completed and was written to the driver.
    Dispatched(MotorCommand),
}

pub struct Dispatcher<S: ByteSource, M: MotorDriver, C: Clock> {
    source: S,
    driver: M,
    watchdog: IdleWatchdog<C>,
    decoder: CommandDecoder,
}

impl<S: ByteSource, M: MotorDriver, C: Clock> Dispatcher<S, M, C> {
    /// Brakes all channels and arms the watchdog before the first byte.
    pub fn new(source: S, driver: M, watchdog: IdleWatchdog<C>) -> Result<Self, RuntimeError> {
        let mut dispatcher = Self {
            source,
            driver,
            watchdog,
            decoder: CommandDecoder::new(),
        };
        dispatcher.driver.brake_all()?;
        dispatcher.watchdog.reset();
        Ok(dispatcher)
    }

    /// One iteration of the main loop.
    pub fn poll_once(&mut self) -> Result<Step, RuntimeError> {
        if self.source.bytes_pending()? == 0 {
            if self.watchdog.poll_and_clear() {
                warn!("no command within the idle window, braking all channels");
                self.driver.brake_all()?;
                // A frame abandoned mid-parse must not swallow the bytes
                // of the next one.
                self.decoder.reset();
                return Ok(Step::Braked);
            }
            return Ok(Step::Idle);
        }

        let byte = self.source.read_byte()?;
        match self.decoder.feed(byte) {
            Feed::Complete(command) => {
                self.dispatch(command)?;
                Ok(Step::Dispatched(command))
            }
            Feed::InProgress => Ok(Step::Fed),
            Feed::Invalid { position } => {
                debug!("parse error at frame position {}", position);
                Ok(Step::Fed)
            }
        }
    }

    fn dispatch(&mut self, command: MotorCommand) -> Result<(), RuntimeError> {
        // The mapping already tops out at DUTY_LIMIT; the clamp stays so
        // no code path can command a duty past the ceiling even if the
        // mapping changes.
        let duty = velocity_to_duty(command.velocity).min(DUTY_LIMIT);
        debug!(
            "channel {} {:?} velocity {} -> duty {}",
            command.channel, command.direction, command.velocity, duty
        );
        self.driver.set_velocity(command.channel, duty, command.direction)?;
        self.watchdog.reset();
        Ok(())
    }

    /// Loop forever, sleeping briefly whenever the stream is quiet.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        loop {
            if self.poll_once()? == Step::Idle {
                sleep(POLL_INTERVAL);
            }
        }
    }

    pub fn driver(&self) -> &M {
        &self.driver
    }
}

/// Open the serial command stream and drive the power stage until an
/// unrecoverable transport or driver error.
pub fn run(port: &str, baud: u32, idle_window: Duration) -> Result<(), RuntimeError> {
    let source = SerialSource::open(port, baud)?;
    let driver = PowerStage::new();
    let watchdog = IdleWatchdog::new(MonotonicClock, idle_window);

    info!(
        "Dispatcher started: {}ms idle window, duty ceiling {}",
        idle_window.as_millis(),
        DUTY_LIMIT
    );
    Dispatcher::new(source, driver, watchdog)?.run()
}
