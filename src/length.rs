use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseOptionError;

/// Requested size of the generated post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BlogLength {
    Short,
    #[default]
    Medium,
    Long,
}

/// Word-count range handed to the LLM as a budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordCountTarget {
    pub min: u32,
    pub max: u32,
    pub target: u32,
}

impl BlogLength {
    pub const ALL: [BlogLength; 3] = [BlogLength::Short, BlogLength::Medium, BlogLength::Long];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlogLength::Short => "short",
            BlogLength::Medium => "medium",
            BlogLength::Long => "long",
        }
    }

    pub fn word_count(&self) -> WordCountTarget {
        let (min, max, target) = match self {
            BlogLength::Short => (300, 500, 400),
            BlogLength::Medium => (700, 1000, 850),
            BlogLength::Long => (1500, 2000, 1750),
        };
        WordCountTarget { min, max, target }
    }

    /// Default number of transcript characters the fallback synthesizer reads; `None` reads all
    pub fn fallback_char_budget(&self) -> Option<usize> {
        match self {
            BlogLength::Short => Some(2000),
            BlogLength::Medium => Some(4000),
            BlogLength::Long => None,
        }
    }
}

impl fmt::Display for BlogLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlogLength {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlogLength::ALL
            .into_iter()
            .find(|length| length.as_str() == s)
            .ok_or_else(|| ParseOptionError::new("length", s, BlogLength::ALL.map(|l| l.as_str())))
    }
}
