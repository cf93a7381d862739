//! Adaptive fitness weights.
//!
//! Maps two behavioral signals from the analytics collaborator onto the
//! three weights of the scheduling objective:
//!
//! - `w_u = base_urgency_weight` (urgency is weighted the same for everyone)
//! - `w_m = k_m · (1 − completion_rate)` (low finishers get quick wins first)
//! - `w_v = k_v · (f_max − focus) / (f_max − f_min)` (low focus gets more
//!   duration alternation)
//!
//! Missing or unusable signals fall back to neutral values
//! (`completion_rate = 0.5`, `focus = 3.0`). Scheduling never fails on
//! analytics.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Completion rate assumed when the collaborator has none.
pub const DEFAULT_COMPLETION_RATE: f64 = 0.5;
/// Focus level assumed when the collaborator has none.
pub const DEFAULT_FOCUS_LEVEL: f64 = 3.0;
/// Lowest self-reported focus level.
pub const FOCUS_MIN: f64 = 1.0;
/// Highest self-reported focus level.
pub const FOCUS_MAX: f64 = 5.0;

/// Weights of the three fitness components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessWeights {
    /// Deadline urgency weight (`w_u`).
    pub urgency: f64,
    /// Early-momentum weight (`w_m`).
    pub momentum: f64,
    /// Duration-variety weight (`w_v`).
    pub variety: f64,
}

impl FitnessWeights {
    /// Creates explicit weights.
    pub fn new(urgency: f64, momentum: f64, variety: f64) -> Self {
        Self {
            urgency,
            momentum,
            variety,
        }
    }

    /// All three components weighted 1.0.
    pub fn uniform() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    /// Weights for the given behavioral signals.
    pub fn adaptive(constants: &WeightConstants, snapshot: &AnalyticsSnapshot) -> Self {
        let (completion_rate, focus) = snapshot.sanitized();
        Self {
            urgency: constants.base_urgency_weight,
            momentum: constants.momentum_gain * (1.0 - completion_rate),
            variety: constants.variety_gain * (FOCUS_MAX - focus) / (FOCUS_MAX - FOCUS_MIN),
        }
    }

    /// Weights for whatever the provider can supply; gaps use neutral defaults.
    pub fn from_provider(
        constants: &WeightConstants,
        provider: Option<&dyn AnalyticsProvider>,
    ) -> Self {
        let snapshot = match provider {
            Some(provider) => AnalyticsSnapshot {
                completion_rate: provider.completion_rate(),
                average_focus_level: provider.average_focus_level(),
            },
            None => {
                warn!("no analytics provider; using neutral adaptive weights");
                AnalyticsSnapshot::default()
            }
        };
        Self::adaptive(constants, &snapshot)
    }
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self::adaptive(&WeightConstants::default(), &AnalyticsSnapshot::default())
    }
}

/// Tunable constants of the weight mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConstants {
    /// `w_u`.
    pub base_urgency_weight: f64,
    /// `k_m`.
    pub momentum_gain: f64,
    /// `k_v`.
    pub variety_gain: f64,
}

impl Default for WeightConstants {
    fn default() -> Self {
        Self {
            base_urgency_weight: 1.0,
            momentum_gain: 1.0,
            variety_gain: 1.0,
        }
    }
}

/// Source of a user's behavioral signals.
///
/// Implemented by the surrounding application over its own history
/// store. Returning `None` means "unknown"; the scheduler substitutes a
/// neutral default.
pub trait AnalyticsProvider: Send + Sync {
    /// Fraction of tasks the user completed over the history window, in `[0, 1]`.
    fn completion_rate(&self) -> Option<f64>;

    /// Mean self-reported focus level over the history window, in `[1, 5]`.
    fn average_focus_level(&self) -> Option<f64>;
}

/// A plain-value analytics reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    /// Completion rate, if known.
    pub completion_rate: Option<f64>,
    /// Average focus level, if known.
    pub average_focus_level: Option<f64>,
}

impl AnalyticsSnapshot {
    /// Snapshot with both signals known.
    pub fn new(completion_rate: f64, average_focus_level: f64) -> Self {
        Self {
            completion_rate: Some(completion_rate),
            average_focus_level: Some(average_focus_level),
        }
    }

    /// Derives both signals from raw history.
    ///
    /// `completed`/`total` count tasks in the window; `reports` are the
    /// focus self-reports in the same window. Empty history leaves a
    /// signal unknown.
    pub fn from_history(completed: usize, total: usize, reports: &[FocusLevel]) -> Self {
        let completion_rate = (total > 0).then(|| completed.min(total) as f64 / total as f64);
        let average_focus_level = (!reports.is_empty()).then(|| {
            reports.iter().map(|r| f64::from(r.score())).sum::<f64>() / reports.len() as f64
        });
        Self {
            completion_rate,
            average_focus_level,
        }
    }

    /// Signals clamped into range, with defaults for unknown or non-finite values.
    pub fn sanitized(&self) -> (f64, f64) {
        let completion_rate = match self.completion_rate {
            Some(rate) if rate.is_finite() => rate.clamp(0.0, 1.0),
            other => {
                warn!(
                    value = ?other,
                    default = DEFAULT_COMPLETION_RATE,
                    "completion rate unavailable"
                );
                DEFAULT_COMPLETION_RATE
            }
        };
        let focus = match self.average_focus_level {
            Some(level) if level.is_finite() => level.clamp(FOCUS_MIN, FOCUS_MAX),
            other => {
                warn!(value = ?other, default = DEFAULT_FOCUS_LEVEL, "focus level unavailable");
                DEFAULT_FOCUS_LEVEL
            }
        };
        (completion_rate, focus)
    }
}

impl AnalyticsProvider for AnalyticsSnapshot {
    fn completion_rate(&self) -> Option<f64> {
        self.completion_rate
    }

    fn average_focus_level(&self) -> Option<f64> {
        self.average_focus_level
    }
}

/// A focus self-report after a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FocusLevel {
    /// 1
    HighlyDistracted,
    /// 2
    Distracted,
    /// 3
    Neutral,
    /// 4
    Focused,
    /// 5
    HighlyFocused,
}

impl FocusLevel {
    /// Numeric score, 1–5.
    pub fn score(self) -> u8 {
        match self {
            FocusLevel::HighlyDistracted => 1,
            FocusLevel::Distracted => 2,
            FocusLevel::Neutral => 3,
            FocusLevel::Focused => 4,
            FocusLevel::HighlyFocused => 5,
        }
    }

    /// Parses a stored label; unknown labels count as neutral.
    pub fn from_label_lossy(label: &str) -> Self {
        label.parse().unwrap_or(FocusLevel::Neutral)
    }

    fn label(self) -> &'static str {
        match self {
            FocusLevel::HighlyDistracted => "HIGHLY_DISTRACTED",
            FocusLevel::Distracted => "DISTRACTED",
            FocusLevel::Neutral => "NEUTRAL",
            FocusLevel::Focused => "FOCUSED",
            FocusLevel::HighlyFocused => "HIGHLY_FOCUSED",
        }
    }
}

impl fmt::Display for FocusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FocusLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            FocusLevel::HighlyDistracted,
            FocusLevel::Distracted,
            FocusLevel::Neutral,
            FocusLevel::Focused,
            FocusLevel::HighlyFocused,
        ]
        .into_iter()
        .find(|level| level.label().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| format!("unknown focus level '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_default_weights_are_neutral() {
        let w = FitnessWeights::default();
        assert!(approx(w.urgency, 1.0));
        assert!(approx(w.momentum, 0.5));
        assert!(approx(w.variety, 0.5));
    }

    #[test]
    fn test_adaptive_extremes() {
        let c = WeightConstants::default();
        let struggling = FitnessWeights::adaptive(&c, &AnalyticsSnapshot::new(0.0, 1.0));
        assert!(approx(struggling.momentum, 1.0));
        assert!(approx(struggling.variety, 1.0));

        let thriving = FitnessWeights::adaptive(&c, &AnalyticsSnapshot::new(1.0, 5.0));
        assert!(approx(thriving.momentum, 0.0));
        assert!(approx(thriving.variety, 0.0));
        assert!(approx(thriving.urgency, 1.0));
    }

    #[test]
    fn test_gains_scale_weights() {
        let c = WeightConstants {
            base_urgency_weight: 2.0,
            momentum_gain: 3.0,
            variety_gain: 4.0,
        };
        let w = FitnessWeights::adaptive(&c, &AnalyticsSnapshot::new(0.25, 2.0));
        assert!(approx(w.urgency, 2.0));
        assert!(approx(w.momentum, 2.25));
        assert!(approx(w.variety, 3.0));
    }

    #[test]
    fn test_out_of_range_signals_are_clamped() {
        let snapshot = AnalyticsSnapshot::new(1.7, 0.0);
        let w = FitnessWeights::adaptive(&WeightConstants::default(), &snapshot);
        assert!(approx(w.momentum, 0.0));
        assert!(approx(w.variety, 1.0));
    }

    #[test]
    fn test_non_finite_signals_fall_back() {
        let w = FitnessWeights::adaptive(
            &WeightConstants::default(),
            &AnalyticsSnapshot::new(f64::NAN, f64::INFINITY),
        );
        assert_eq!(w, FitnessWeights::default());
    }

    #[test]
    fn test_missing_provider_falls_back() {
        let w = FitnessWeights::from_provider(&WeightConstants::default(), None);
        assert_eq!(w, FitnessWeights::default());

        let snapshot = AnalyticsSnapshot {
            completion_rate: Some(0.9),
            average_focus_level: None,
        };
        let w = FitnessWeights::from_provider(&WeightConstants::default(), Some(&snapshot));
        assert!(approx(w.momentum, 0.1));
        assert!(approx(w.variety, 0.5));
    }

    #[test]
    fn test_from_history() {
        let s = AnalyticsSnapshot::from_history(
            3,
            4,
            &[FocusLevel::Focused, FocusLevel::HighlyDistracted],
        );
        assert_eq!(s.completion_rate, Some(0.75));
        assert_eq!(s.average_focus_level, Some(2.5));

        let empty = AnalyticsSnapshot::from_history(0, 0, &[]);
        assert_eq!(empty, AnalyticsSnapshot::default());
    }

    #[test]
    fn test_focus_labels() {
        assert_eq!("highly_focused".parse::<FocusLevel>().unwrap(), FocusLevel::HighlyFocused);
        assert_eq!(FocusLevel::from_label_lossy("SLEEPY"), FocusLevel::Neutral);
        assert_eq!(FocusLevel::Distracted.to_string(), "DISTRACTED");
        let json = serde_json::to_string(&FocusLevel::HighlyDistracted).unwrap();
        assert_eq!(json, "\"HIGHLY_DISTRACTED\"");
    }
}
