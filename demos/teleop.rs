// Keyboard teleop: 1-4 pick channel, K/J throttle, R flip, Space stop, Q quit
//
// Sends a frame every cycle so the runtime's idle watchdog stays fed;
// stop sending (or quit) and the power stage short-brakes on its own.
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::io::Write;
use std::time::Duration;
use tracing::info;

use quadmotor_runtime::command::{CHANNEL_COUNT, Direction, MotorCommand};
use quadmotor_runtime::config::{DEFAULT_BAUD, DEFAULT_PORT};

const VELOCITY_STEP: u8 = 0x10;

// Resend cadence; must stay well inside the runtime's idle window
const RESEND: Duration = Duration::from_millis(100);

/// Keyboard sender for the quadmotor command stream
#[derive(Parser, Debug)]
struct Args {
    /// Serial port the runtime listens on
    #[arg(long, default_value = DEFAULT_PORT)]
    port: String,

    #[arg(long, default_value_t = DEFAULT_BAUD)]
    baud: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let mut port = serialport::new(&args.port, args.baud)
        .timeout(Duration::from_millis(100))
        .open()?;

    info!("Sending to {}", args.port);
    info!("Controls: 1-4=channel, K/J=throttle up/down, R=flip direction, Space=all stop, Q=quit");

    enable_raw_mode()?;
    let result = run_teleop(port.as_mut());
    disable_raw_mode()?;

    result
}

fn run_teleop(port: &mut dyn serialport::SerialPort) -> Result<(), Box<dyn std::error::Error>> {
    let mut channel: u8 = 0;
    let mut direction = Direction::Forward;
    let mut velocity: u8 = 0;

    loop {
        if event::poll(RESEND)? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                let pressed = kind == KeyEventKind::Press || kind == KeyEventKind::Repeat;

                match code {
                    KeyCode::Char(c @ '1'..='4') if pressed => {
                        channel = c as u8 - b'1';
                        velocity = 0;
                        info!("Channel {}", channel);
                    }
                    KeyCode::Char('k') if pressed => {
                        velocity = velocity.saturating_add(VELOCITY_STEP);
                    }
                    KeyCode::Char('j') if pressed => {
                        velocity = velocity.saturating_sub(VELOCITY_STEP);
                    }
                    KeyCode::Char('r') if pressed => {
                        direction = match direction {
                            Direction::Forward => Direction::Reverse,
                            Direction::Reverse => Direction::Forward,
                        };
                    }
                    KeyCode::Char(' ') if pressed => {
                        velocity = 0;
                        stop_all(port)?;
                    }
                    KeyCode::Char('q') if pressed => {
                        stop_all(port)?;
                        return Ok(());
                    }
                    _ => {}
                }
            }
        }

        // Refresh the current command every cycle
        let frame = MotorCommand {
            channel,
            direction,
            velocity,
        }
        .encode();
        port.write_all(&frame)?;
    }
}

fn stop_all(port: &mut dyn serialport::SerialPort) -> Result<(), Box<dyn std::error::Error>> {
    for channel in 0..CHANNEL_COUNT {
        let frame = MotorCommand {
            channel,
            direction: Direction::Forward,
            velocity: 0,
        }
        .encode();
        port.write_all(&frame)?;
    }
    Ok(())
}
