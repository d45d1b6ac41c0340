//! Command parsing for chat commands.
//!
//! This module provides types and parsing for the commands users send to the
//! bot, plus validation of the threshold entered after `/start`.
//!
//! # Supported Commands
//!
//! - `/start` - Asks for a CO2 threshold and starts monitoring
//! - `/stop` - Stops monitoring
//! - `/co2` - Shows the current CO2 value
//! - `/sleep` - Shows the sleep menu
//! - `/sleep N min`, `/sleep N hour` - Pauses alerts for a while
//! - `/help` - Shows usage
//!
//! # Example
//!
//! ```
//! use co2_monitor::commands::{parse_command, parse_threshold, Command, SleepDuration};
//!
//! assert_eq!(parse_command("/stop"), Some(Command::Stop));
//! assert_eq!(parse_threshold("800"), Ok(800));
//! assert_eq!(SleepDuration::from_label("/sleep 1 hour"), Some(SleepDuration::OneHour));
//! ```

mod parser;
mod threshold;
mod types;

pub use parser::{is_command, parse_command};
pub use threshold::{MAX_THRESHOLD, ThresholdError, parse_threshold};
pub use types::{Command, SleepDuration};
