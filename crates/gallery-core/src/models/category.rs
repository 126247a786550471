//! Gallery categories

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// The fixed set of categories an upload can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    General,
    #[serde(rename = "Sci-Fi")]
    SciFi,
    Fantasy,
    Abstract,
    Nature,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Self; 5] = [
        Self::General,
        Self::SciFi,
        Self::Fantasy,
        Self::Abstract,
        Self::Nature,
    ];

    /// Wire and display name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::General => "General",
            Self::SciFi => "Sci-Fi",
            Self::Fantasy => "Fantasy",
            Self::Abstract => "Abstract",
            Self::Nature => "Nature",
        }
    }

    /// Lenient parse for records coming back from the store.
    ///
    /// Anything outside the fixed set files under `General`.
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == trimmed)
            .ok_or_else(|| ValidationError::UnknownCategory(trimmed.to_string()))
    }
}
