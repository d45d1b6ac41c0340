//! Parser for chat commands in message text.
//!
//! This module provides a pure parser that maps message text to structured
//! commands.

use super::types::Command;

/// Parses a chat command from message text.
///
/// # Parsing Rules
///
/// - Surrounding whitespace is ignored
/// - Bare commands (`/start`, `/stop`, `/co2`, `/sleep`, `/help`) must be the
///   whole message, optionally addressed to a bot as `/start@my_bot`
/// - A sleep directive is recognized anywhere in the text: `/sleep`, one
///   whitespace character, digits, one whitespace character, then `min` or
///   `hour`
/// - Returns `None` for anything else
///
/// # Examples
///
/// ```
/// use co2_monitor::commands::{parse_command, Command};
///
/// assert_eq!(parse_command("/start"), Some(Command::Start));
/// assert_eq!(parse_command("/co2@office_bot"), Some(Command::Co2));
/// assert_eq!(
///     parse_command("/sleep 30 min"),
///     Some(Command::Sleep("/sleep 30 min".to_string()))
/// );
/// assert_eq!(parse_command("hello"), None);
/// ```
pub fn parse_command(text: &str) -> Option<Command> {
    let text = text.trim();

    if let Some(cmd) = parse_bare_command(text) {
        return Some(cmd);
    }

    if contains_sleep_directive(text) {
        return Some(Command::Sleep(text.to_string()));
    }

    None
}

/// Returns true when the text looks like any command at all (`/word`).
///
/// Used to let a command interrupt a pending dialog.
pub fn is_command(text: &str) -> bool {
    text.trim_start().starts_with('/')
}

fn parse_bare_command(text: &str) -> Option<Command> {
    if text.chars().any(|c| c.is_whitespace()) {
        return None;
    }

    // Strip an `@botname` suffix.
    let word = text.split_once('@').map_or(text, |(word, _)| word);

    match word {
        "/start" => Some(Command::Start),
        "/stop" => Some(Command::Stop),
        "/co2" => Some(Command::Co2),
        "/sleep" => Some(Command::SleepMenu),
        "/help" => Some(Command::Help),
        _ => None,
    }
}

/// Searches for `/sleep<ws><digits><ws>(min|hour)` anywhere in the text.
fn contains_sleep_directive(text: &str) -> bool {
    const TRIGGER: &str = "/sleep";

    text.match_indices(TRIGGER)
        .any(|(pos, _)| matches_directive_tail(&text[pos + TRIGGER.len()..]))
}

fn matches_directive_tail(rest: &str) -> bool {
    let Some(rest) = strip_one_whitespace(rest) else {
        return false;
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return false;
    }

    let Some(unit) = strip_one_whitespace(&rest[digits_end..]) else {
        return false;
    };

    unit.starts_with("min") || unit.starts_with("hour")
}

fn strip_one_whitespace(text: &str) -> Option<&str> {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_whitespace() => Some(chars.as_str()),
        _ => None,
    }
}
