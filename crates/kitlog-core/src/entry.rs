//! Log entry model shared by every sink

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::TIMESTAMP_FORMAT;
use crate::error::{Error, Result};

/// Severity or category of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    /// HTTP access records
    Access,
    /// Messages that may be routed apart from ordinary info
    Important,
}

impl Level {
    pub const ALL: [Level; 7] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
        Level::Access,
        Level::Important,
    ];

    /// Fixed-width label used in rendered lines
    pub fn label(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO ",
            Level::Warn => "WARN ",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
            Level::Access => "ACCSS",
            Level::Important => "IMPNT",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
            Level::Access => "access",
            Level::Important => "important",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            "access" | "accss" => Ok(Level::Access),
            "important" | "impnt" => Ok(Level::Important),
            _ => Err(Error::InvalidLevel(s.to_string())),
        }
    }
}

impl TryFrom<String> for Level {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.as_str().to_string()
    }
}

/// A single log record, rendered to text by a formatter
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub time: DateTime<Local>,
    pub level: Level,
    pub program: String,
    pub component: String,
    pub message: String,
}

impl Entry {
    /// Create an entry stamped with the current time
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            time: Local::now(),
            level,
            program: String::new(),
            component: String::new(),
            message: message.into(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = component.into();
        self
    }

    /// Render as `<time> [<program>] [<component>] [<level>] <message>`
    pub fn render(&self) -> String {
        format!(
            "{} [{}] [{}] [{}] {}",
            self.time.format(TIMESTAMP_FORMAT),
            self.program,
            self.component,
            self.level.label(),
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_level_labels_are_fixed_width() {
        for level in Level::ALL {
            assert_eq!(level.label().len(), 5, "{:?}", level);
        }
    }

    #[test]
    fn test_level_parse() {
        assert_eq!("INFO".parse::<Level>().unwrap(), Level::Info);
        assert_eq!("warning".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!("IMPNT".parse::<Level>().unwrap(), Level::Important);
        assert!(matches!("verbose".parse::<Level>(), Err(Error::InvalidLevel(_))));
    }

    #[test]
    fn test_level_serde() {
        let level: Level = serde_json::from_str("\"access\"").unwrap();
        assert_eq!(level, Level::Access);
        assert_eq!(serde_json::to_string(&Level::Warn).unwrap(), "\"warn\"");
    }

    #[test]
    fn test_entry_render() {
        let entry = Entry {
            time: Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap(),
            level: Level::Info,
            program: "api".to_string(),
            component: "http".to_string(),
            message: "listening".to_string(),
        };
        assert_eq!(
            entry.render(),
            "2024-03-09T14:05:07.000 [api] [http] [INFO ] listening"
        );
    }

    #[test]
    fn test_entry_builders() {
        let entry = Entry::new(Level::Error, "boom")
            .with_program("svc")
            .with_component("db");
        assert_eq!(entry.program, "svc");
        assert_eq!(entry.component, "db");
        assert!(entry.render().ends_with("[svc] [db] [ERROR] boom"));
    }
}
