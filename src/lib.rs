// Serial command runtime for a 4-channel DC motor power stage
//
// Provides:
// - Byte-at-a-time decoder for 5-byte ASCII command frames
// - Velocity -> PWM duty mapping with a hard safety ceiling
// - Idle watchdog that short-brakes all channels when commands stop
// - Dispatcher loop tying them together over a serial byte source

pub mod command;
pub mod config;
pub mod motor;
pub mod runtime;
pub mod transport;
pub mod watchdog;
