//! Message intents and knowledge categories.
//!
//! The same enum labels a classified message (its intent) and a knowledge
//! entry (its category). Declaration order is the classifier priority order:
//! safety first, general last.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Intent of a message, or category of a knowledge entry.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Pain, injury or medical red flags. Always handled locally.
    Safety,
    /// Exercise technique and training questions.
    Exercise,
    /// Food, hydration and supplements.
    Nutrition,
    /// Motivation and consistency.
    Motivation,
    /// Routines, schedules and goals.
    Planning,
    /// Anything else.
    General,
}

impl Intent {
    /// All intents in classifier priority order.
    pub const ALL: [Self; 6] = [
        Self::Safety,
        Self::Exercise,
        Self::Nutrition,
        Self::Motivation,
        Self::Planning,
        Self::General,
    ];

    /// Stable string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Safety => "safety",
            Self::Exercise => "exercise",
            Self::Nutrition => "nutrition",
            Self::Motivation => "motivation",
            Self::Planning => "planning",
            Self::General => "general",
        }
    }

    /// Confidence attached when this family is the first keyword match.
    #[must_use]
    pub const fn family_confidence(self) -> f64 {
        match self {
            Self::Safety => 0.9,
            Self::Exercise | Self::Nutrition => 0.8,
            Self::Planning => 0.75,
            Self::Motivation => 0.7,
            Self::General => 0.6,
        }
    }

    /// Whether a confident classification into this intent may be answered
    /// from the knowledge store.
    #[must_use]
    pub const fn is_coaching_topic(self) -> bool {
        matches!(
            self,
            Self::Exercise | Self::Nutrition | Self::Motivation | Self::Planning
        )
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|intent| intent.as_str() == needle)
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// Urgency of a classified message.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// Regular request.
    #[default]
    Normal,
    /// Safety-related request that must be answered immediately.
    High,
}

impl Urgency {
    /// Stable string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
