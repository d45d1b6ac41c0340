//! Reply keyboard payload attached to outgoing messages.

use serde::{Deserialize, Serialize};

/// A custom reply keyboard: one row of buttons per entry in `keyboard`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyKeyboard {
    pub keyboard: Vec<Vec<String>>,
    /// Hide the keyboard after one button press.
    pub one_time_keyboard: bool,
}

impl ReplyKeyboard {
    /// Builds a one-time keyboard with a single button per row.
    pub fn one_per_row<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ReplyKeyboard {
            keyboard: labels.into_iter().map(|l| vec![l.into()]).collect(),
            one_time_keyboard: true,
        }
    }
}
