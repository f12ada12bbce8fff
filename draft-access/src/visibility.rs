//! Visibility lattice for draft documents.
//!
//! A draft is classified at one of three levels, ordered from most private
//! to most public:
//!
//! `hidden` < `constituents` < `public`
//!
//! The ordering is only ever used for comparison. Whether a given actor may
//! see a document is decided by [`crate::permissions::resolve`], which is
//! role-aware; the internal team bypasses the lattice entirely.

use crate::error::{AccessError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Visibility classification of a draft document.
///
/// Higher numeric values = wider audience.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Visibility {
    /// Internal team only
    #[default]
    Hidden = 0,
    /// Residents of the owning entity's district
    Constituents = 1,
    /// Everyone, including anonymous visitors
    Public = 2,
}

impl Visibility {
    /// All levels, most private first.
    pub const ALL: [Visibility; 3] = [Self::Hidden, Self::Constituents, Self::Public];

    /// Parse a caller-supplied value.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hidden" => Ok(Self::Hidden),
            "constituents" => Ok(Self::Constituents),
            "public" => Ok(Self::Public),
            _ => Err(AccessError::InvalidVisibility(value.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Constituents => "constituents",
            Self::Public => "public",
        }
    }

    /// True if this level is `threshold` or wider.
    pub fn at_least(&self, threshold: Visibility) -> bool {
        *self >= threshold
    }
}

/// Free-function form of [`Visibility::at_least`].
pub fn at_least(visibility: Visibility, threshold: Visibility) -> bool {
    visibility.at_least(threshold)
}

impl FromStr for Visibility {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
