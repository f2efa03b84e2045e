// Duty ceiling, idle window, serial defaults
use std::time::Duration;

// Hard duty ceiling for every channel
//   720: close to full 7.2V drive
//   480: 66% of 7.2V drive
pub const DUTY_LIMIT: u16 = 480;

// Idle window before the watchdog short-brakes all channels.
// Matches the source controller's free-running 16-bit timer:
// 8MHz clock / 4 instruction rate / 65536 counts / 1:16 prescale.
// A deployment parameter, overridable on the command line.
pub const IDLE_WINDOW: Duration = Duration::from_micros(524_288);

// How long the dispatcher sleeps when no bytes are pending
pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

// Serial defaults for the command stream
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";
pub const DEFAULT_BAUD: u32 = 9600;
