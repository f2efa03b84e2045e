// Frame sender: ramps one channel up and back down, then goes silent so
// the runtime's idle watchdog can be watched braking the stage.
//
// Usage: cargo run --example frame_sender -- --port /dev/ttyUSB0 --channel 0
use clap::Parser;
use std::io::Write;
use std::thread::sleep;
use std::time::Duration;
use tracing::info;

use quadmotor_runtime::command::{Direction, MotorCommand};
use quadmotor_runtime::config::{DEFAULT_BAUD, DEFAULT_PORT, IDLE_WINDOW};

const RAMP_STEP: u8 = 0x20;
const STEP_HOLD: Duration = Duration::from_millis(200);

/// Scripted sender for the quadmotor command stream
#[derive(Parser, Debug)]
struct Args {
    /// Serial port the runtime listens on
    #[arg(long, default_value = DEFAULT_PORT)]
    port: String,

    #[arg(long, default_value_t = DEFAULT_BAUD)]
    baud: u32,

    /// Channel to exercise (0-3)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
    channel: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let mut port = serialport::new(&args.port, args.baud)
        .timeout(Duration::from_millis(100))
        .open()?;

    info!("Ramping channel {} on {}", args.channel, args.port);

    let ramp: Vec<u8> = (0..=255u8).step_by(RAMP_STEP as usize).collect();
    let velocities = ramp.iter().chain(ramp.iter().rev());

    for &velocity in velocities {
        let frame = MotorCommand {
            channel: args.channel,
            direction: Direction::Forward,
            velocity,
        }
        .encode();
        port.write_all(&frame)?;
        info!("velocity {}", velocity);
        sleep(STEP_HOLD);
    }

    info!(
        "Going silent; the runtime should short-brake within {}ms",
        IDLE_WINDOW.as_millis()
    );
    sleep(IDLE_WINDOW * 2);

    Ok(())
}
