//! Human-readable usage summary

use super::level::LogLevel;
use super::template::{
    DATETIME_PLACEHOLDER, DATE_PLACEHOLDER, LEVEL_PLACEHOLDER, MESSAGE_PLACEHOLDER,
    TIME_PLACEHOLDER,
};

/// Describe level numbering and template placeholders
pub fn help_text() -> String {
    let mut out = String::from("daylog levels (entries below the configured level are dropped):\n");
    for level in LogLevel::ALL {
        out.push_str(&format!("  {} = {}\n", level.as_u8(), level.as_str()));
    }
    out.push_str("\nTemplate placeholders:\n");
    let placeholders = [
        (DATE_PLACEHOLDER, "current date, YYYY-MM-DD (also used in file names)"),
        (TIME_PLACEHOLDER, "current time, HH:MM:SS"),
        (DATETIME_PLACEHOLDER, "date and time, YYYY-MM-DD HH:MM:SS (banners)"),
        (LEVEL_PLACEHOLDER, "level name of the entry"),
        (MESSAGE_PLACEHOLDER, "message text, with newlines and tabs removed"),
    ];
    for (name, meaning) in placeholders {
        out.push_str(&format!("  {:<11} {}\n", name, meaning));
    }
    out.push_str("\nTimes are local when use_server_time is set, UTC otherwise.\n");
    out
}
