//! Command types for chat commands.
//!
//! These commands are parsed from the text of inbound chat messages.

use std::time::Duration;

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Starts monitoring: `/start`
    ///
    /// Opens the threshold dialog; the next message is read as the threshold.
    Start,

    /// Stops monitoring: `/stop`
    Stop,

    /// Shows the current reading: `/co2`
    Co2,

    /// Shows the sleep menu: `/sleep`
    SleepMenu,

    /// Shows usage: `/help`
    Help,

    /// A sleep directive such as `/sleep 30 min`.
    ///
    /// Carries the full message text; the running worker decides whether it
    /// is one of the durations it understands (see [`SleepDuration`]).
    Sleep(String),
}

/// How long a worker can be told to stay quiet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SleepDuration {
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    TwoHours,
    FiveHours,
}

impl SleepDuration {
    /// All durations, in menu order.
    pub const ALL: [SleepDuration; 5] = [
        SleepDuration::FifteenMinutes,
        SleepDuration::ThirtyMinutes,
        SleepDuration::OneHour,
        SleepDuration::TwoHours,
        SleepDuration::FiveHours,
    ];

    /// The menu text that selects this duration.
    pub fn label(self) -> &'static str {
        match self {
            SleepDuration::FifteenMinutes => "/sleep 15 min",
            SleepDuration::ThirtyMinutes => "/sleep 30 min",
            SleepDuration::OneHour => "/sleep 1 hour",
            SleepDuration::TwoHours => "/sleep 2 hour",
            SleepDuration::FiveHours => "/sleep 5 hour",
        }
    }

    /// Length of the quiet period in seconds.
    pub fn seconds(self) -> u64 {
        match self {
            SleepDuration::FifteenMinutes => 900,
            SleepDuration::ThirtyMinutes => 1800,
            SleepDuration::OneHour => 3600,
            SleepDuration::TwoHours => 7200,
            SleepDuration::FiveHours => 18000,
        }
    }

    pub fn duration(self) -> Duration {
        Duration::from_secs(self.seconds())
    }

    /// Matches a control text against the menu labels exactly.
    pub fn from_label(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.label() == text)
    }
}
