use std::fmt::{Display, Formatter};
use std::str::FromStr;

use super::category::Category;
use crate::engine::errors::KeyError;

pub const KEY_SEPARATOR: char = '_';
pub const KEY_SEGMENTS: usize = 4;

/// Logical identity of a histogram artifact: `Category_Channel_Era_Sample`.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ArtifactKey {
    pub category: Category,
    pub channel: String,
    pub era: String,
    pub sample: String,
}

impl ArtifactKey {
    pub fn new(
        category: Category,
        channel: impl Into<String>,
        era: impl Into<String>,
        sample: impl Into<String>,
    ) -> Self {
        Self {
            category,
            channel: channel.into(),
            era: era.into(),
            sample: sample.into(),
        }
    }

    /// Parses a key, rejecting anything that is not exactly four segments
    /// with a known category. Nothing is returned for a partial parse.
    pub fn parse(key: &str) -> Result<Self, KeyError> {
        let parts: Vec<&str> = key.split(KEY_SEPARATOR).collect();
        if parts.len() != KEY_SEGMENTS {
            return Err(KeyError::Malformed {
                key: key.to_string(),
                segments: parts.len(),
            });
        }

        let category = Category::from_segment(parts[0]).ok_or_else(|| KeyError::UnknownCategory {
            key: key.to_string(),
            category: parts[0].to_string(),
        })?;

        Ok(Self {
            category,
            channel: parts[1].to_string(),
            era: parts[2].to_string(),
            sample: parts[3].to_string(),
        })
    }

    /// Positional access in key order: category, channel, era, sample.
    pub fn segment(&self, index: usize) -> Option<&str> {
        match index {
            0 => Some(self.category.as_str()),
            1 => Some(&self.channel),
            2 => Some(&self.era),
            3 => Some(&self.sample),
            _ => None,
        }
    }

    #[inline]
    pub fn is_data(&self) -> bool {
        self.category == Category::Data
    }

    pub fn with_era(&self, era: impl Into<String>) -> Self {
        Self {
            era: era.into(),
            ..self.clone()
        }
    }
}

impl FromStr for ArtifactKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for ArtifactKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}{sep}{}",
            self.category,
            self.channel,
            self.era,
            self.sample,
            sep = KEY_SEPARATOR
        )
    }
}
