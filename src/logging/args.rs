//! Arguments for the level-specific convenience methods
//!
//! Each argument is turned into text by one of three strategies, chosen by
//! the variant rather than by inspecting the value at runtime.

use std::error::Error as StdError;

use serde::Serialize;

/// One argument to `debug`/`info`/`warning`/`error`/`critical`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogArg {
    /// An error rendered with its whole source chain
    Error(String),
    /// A value rendered as JSON
    Structured(String),
    /// Text passed through unchanged
    Text(String),
}

impl LogArg {
    /// Render an error and every `source()` below it
    pub fn error(err: &(dyn StdError + 'static)) -> Self {
        let mut text = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            text.push_str(": caused by: ");
            text.push_str(&cause.to_string());
            source = cause.source();
        }
        LogArg::Error(text)
    }

    /// Render any serializable value as compact JSON
    pub fn structured<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(json) => LogArg::Structured(json),
            Err(e) => LogArg::Structured(format!("<unserializable: {}>", e)),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        LogArg::Text(text.into())
    }

    /// The rendered text of this argument
    pub fn as_str(&self) -> &str {
        match self {
            LogArg::Error(s) | LogArg::Structured(s) | LogArg::Text(s) => s,
        }
    }
}

impl From<&str> for LogArg {
    fn from(value: &str) -> Self {
        LogArg::Text(value.to_string())
    }
}

impl From<String> for LogArg {
    fn from(value: String) -> Self {
        LogArg::Text(value)
    }
}

impl From<&String> for LogArg {
    fn from(value: &String) -> Self {
        LogArg::Text(value.clone())
    }
}

impl From<anyhow::Error> for LogArg {
    fn from(err: anyhow::Error) -> Self {
        LogArg::from(&err)
    }
}

impl From<&anyhow::Error> for LogArg {
    fn from(err: &anyhow::Error) -> Self {
        let text = err
            .chain()
            .map(|cause| cause.to_string())
            .collect::<Vec<_>>()
            .join(": caused by: ");
        LogArg::Error(text)
    }
}

impl From<serde_json::Value> for LogArg {
    fn from(value: serde_json::Value) -> Self {
        LogArg::Structured(value.to_string())
    }
}

impl From<&serde_json::Value> for LogArg {
    fn from(value: &serde_json::Value) -> Self {
        LogArg::Structured(value.to_string())
    }
}

macro_rules! display_arg {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for LogArg {
                fn from(value: $ty) -> Self {
                    LogArg::Text(value.to_string())
                }
            }
        )*
    };
}

display_arg!(bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

/// Join rendered arguments with single spaces
pub fn join_args<I>(args: I) -> String
where
    I: IntoIterator,
    I::Item: Into<LogArg>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| arg.as_str().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build a `Vec<LogArg>` from mixed values
///
/// ```
/// let args = daylog::log_args!["retries", 3, daylog::LogArg::structured(&[1, 2])];
/// assert_eq!(daylog::logging::join_args(args), "retries 3 [1,2]");
/// ```
#[macro_export]
macro_rules! log_args {
    ($($arg:expr),* $(,)?) => {
        ::std::vec![$($crate::LogArg::from($arg)),*]
    };
}
