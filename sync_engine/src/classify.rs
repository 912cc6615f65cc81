use crate::facility::Facility;
use serde::{Deserialize, Serialize};
use shared::DEFAULT_LOW_STOCK_THRESHOLD;
use std::fmt;
use std::str::FromStr;

/// Visibility/status bucket derived purely from a facility's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Inactive,
    Empty,
    Low,
    Available,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Available,
        Category::Low,
        Category::Empty,
        Category::Inactive,
    ];

    pub const fn index(self) -> usize {
        match self {
            Category::Inactive => 0,
            Category::Empty => 1,
            Category::Low => 2,
            Category::Available => 3,
        }
    }

    pub const fn color(self) -> &'static str {
        match self {
            Category::Inactive => "#808080",
            Category::Empty => "#f44336",
            Category::Low => "#FFA500",
            Category::Available => "#4CAF50",
        }
    }

    /// Legend label shown next to the filter toggle.
    pub const fn label(self) -> &'static str {
        match self {
            Category::Inactive => "Hors service",
            Category::Empty => "Aucun vélo",
            Category::Low => "Peu de vélos",
            Category::Available => "Disponible",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Inactive => "inactive",
            Category::Empty => "empty",
            Category::Low => "low",
            Category::Available => "available",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category {0:?}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Counts strictly below this (and above zero) are `Low`.
    pub low_stock: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low_stock: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

/// First matching rule wins: out of service, then empty, then low.
pub fn classify(facility: &Facility, thresholds: &Thresholds) -> Category {
    if !facility.state.is_in_service() {
        Category::Inactive
    } else if facility.available_units == 0 {
        Category::Empty
    } else if facility.available_units < thresholds.low_stock {
        Category::Low
    } else {
        Category::Available
    }
}
