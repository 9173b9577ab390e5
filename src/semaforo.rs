//! Traffic-light classification for validity periods.
//!
//! This is the single authoritative implementation of the urgency rule:
//! every producer (listing endpoints, dashboard aggregation) and every
//! consumer annotates records through `classify`, never by re-deriving the
//! thresholds in SQL or elsewhere.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const SECONDS_PER_DAY: i64 = 86_400;

/// Default day thresholds applied when a record is created without explicit
/// ones. This is creation policy: `classify` itself never assumes a default.
pub const DEFAULT_THRESHOLDS: (i64, i64, i64) = (90, 30, 15);

/// Urgency bucket for a validity period, ordered most-urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrafficColor {
    /// Past due; rendered as neutral ("gris") in the UI.
    Expired,
    /// At or under the red threshold.
    Critical,
    /// At or under the yellow threshold.
    Warning,
    /// At or under the green threshold.
    Ok,
    /// Beyond the green horizon ("azul" in the UI).
    Far,
}

impl TrafficColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expired => "EXPIRED",
            Self::Critical => "CRITICAL",
            Self::Warning => "WARNING",
            Self::Ok => "OK",
            Self::Far => "FAR",
        }
    }
}

impl std::fmt::Display for TrafficColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ThresholdError {
    #[error("thresholds must be ordered green >= yellow >= red (got {green}/{yellow}/{red})")]
    NotMonotonic { green: i64, yellow: i64, red: i64 },

    #[error("thresholds must be non-negative (got {green}/{yellow}/{red})")]
    Negative { green: i64, yellow: i64, red: i64 },
}

/// Validated day thresholds, ordered `green >= yellow >= red >= 0`.
///
/// Ordering is checked at construction so that classification is total: a
/// record that carries a `Thresholds` always maps to exactly one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Thresholds {
    green: i64,
    yellow: i64,
    red: i64,
}

impl Thresholds {
    pub fn new(green: i64, yellow: i64, red: i64) -> Result<Self, ThresholdError> {
        if green < 0 || yellow < 0 || red < 0 {
            return Err(ThresholdError::Negative { green, yellow, red });
        }
        if red > yellow || yellow > green {
            return Err(ThresholdError::NotMonotonic { green, yellow, red });
        }
        Ok(Self { green, yellow, red })
    }

    pub fn green(&self) -> i64 {
        self.green
    }

    pub fn yellow(&self) -> i64 {
        self.yellow
    }

    pub fn red(&self) -> i64 {
        self.red
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        let (green, yellow, red) = DEFAULT_THRESHOLDS;
        Self { green, yellow, red }
    }
}

/// Classification result for one validity period at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub days_remaining: i64,
    pub color: TrafficColor,
}

/// Whole days remaining until `expires_at`, rounded **up**.
///
/// Ceiling is the canonical rule for both the API layer and any client-side
/// recomputation: a period expiring later today reports 0 days remaining
/// ("still today"), not -1. The result is negative once the expiration
/// instant has passed by a full day or more.
pub fn days_remaining(expires_at: i64, now: i64) -> i64 {
    let diff = expires_at - now;
    diff.div_euclid(SECONDS_PER_DAY)
        + if diff.rem_euclid(SECONDS_PER_DAY) > 0 {
            1
        } else {
            0
        }
}

/// Classify a validity period against its thresholds at instant `now`.
///
/// Evaluation order is fixed, first match wins:
/// negative => Expired, <= red => Critical, <= yellow => Warning,
/// <= green => Ok, otherwise Far. Pure and deterministic: callers supply
/// `now` explicitly, so two calls with identical inputs agree.
pub fn classify(expires_at: i64, now: i64, thresholds: &Thresholds) -> Classification {
    let days = days_remaining(expires_at, now);
    let color = if days < 0 {
        TrafficColor::Expired
    } else if days <= thresholds.red {
        TrafficColor::Critical
    } else if days <= thresholds.yellow {
        TrafficColor::Warning
    } else if days <= thresholds.green {
        TrafficColor::Ok
    } else {
        TrafficColor::Far
    };
    Classification {
        days_remaining: days,
        color,
    }
}
