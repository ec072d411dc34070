//! Human-readable byte sizes

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{GB, KB, MB};
use crate::error::{Error, Result};

/// Matches `512`, `64KB`, `2 MiB`, `1g`; all multiples are binary
static SIZE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(\d+)\s*([kmgt]?)(?:i?b)?\s*$").expect("Invalid size regex")
});

/// A size in bytes, parsed from plain integers or unit-suffixed strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ByteSize(pub u64);

impl ByteSize {
    pub const fn bytes(self) -> u64 {
        self.0
    }

    pub const fn kb(n: u64) -> Self {
        ByteSize(n * KB)
    }

    pub const fn mb(n: u64) -> Self {
        ByteSize(n * MB)
    }

    pub const fn gb(n: u64) -> Self {
        ByteSize(n * GB)
    }
}

impl From<u64> for ByteSize {
    fn from(n: u64) -> Self {
        ByteSize(n)
    }
}

impl FromStr for ByteSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let caps = SIZE_REGEX
            .captures(s)
            .ok_or_else(|| Error::InvalidSize(s.to_string()))?;

        let value: u64 = caps[1]
            .parse()
            .map_err(|_| Error::InvalidSize(s.to_string()))?;

        let multiplier = match caps[2].to_ascii_lowercase().as_str() {
            "" => 1,
            "k" => KB,
            "m" => MB,
            "g" => GB,
            "t" => GB * KB,
            _ => return Err(Error::InvalidSize(s.to_string())),
        };

        value
            .checked_mul(multiplier)
            .map(ByteSize)
            .ok_or_else(|| Error::InvalidSize(s.to_string()))
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.0;
        if n >= GB && n % GB == 0 {
            write!(f, "{}GB", n / GB)
        } else if n >= MB && n % MB == 0 {
            write!(f, "{}MB", n / MB)
        } else if n >= KB && n % KB == 0 {
            write!(f, "{}KB", n / KB)
        } else {
            write!(f, "{}B", n)
        }
    }
}

impl<'de> Deserialize<'de> for ByteSize {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bytes(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Bytes(n) => Ok(ByteSize(n)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}
