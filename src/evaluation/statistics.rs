//! Nonparametric comparison statistics.
//!
//! # Tests
//!
//! | Statistic | Use |
//! |-----------|-----|
//! | Wilcoxon signed-rank | paired significance, two-sided |
//! | Cliff's delta | effect size, `δ ∈ [-1, 1]` |
//! | Improvement ratio | percentage change of the mean |
//!
//! # Reference
//! - Wilcoxon (1945), "Individual Comparisons by Ranking Methods"
//! - Cliff (1993), "Dominance statistics: Ordinal analyses to answer
//!   ordinal questions"
//! - Romano et al. (2006), effect size thresholds 0.147 / 0.33 / 0.474

use std::cmp::Ordering;
use std::f64::consts::SQRT_2;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest sample size for which the exact null distribution is used.
pub const EXACT_WILCOXON_LIMIT: usize = 50;

/// Arithmetic mean; 0 for an empty sample.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; 0 for an empty sample.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// `(baseline − ga) / |baseline| × 100`.
///
/// Positive means the GA mean is lower, for signed baselines too. A zero
/// baseline gives 0 when GA is also zero, otherwise −100.
pub fn improvement_ratio(baseline_mean: f64, ga_mean: f64) -> f64 {
    if baseline_mean == 0.0 {
        return if ga_mean == 0.0 { 0.0 } else { -100.0 };
    }
    (baseline_mean - ga_mean) / baseline_mean.abs() * 100.0
}

/// Cliff's delta: `(#{x > y} − #{x < y}) / (|X|·|Y|)`.
///
/// Returns 0 when either sample is empty.
pub fn cliffs_delta(x: &[f64], y: &[f64]) -> f64 {
    if x.is_empty() || y.is_empty() {
        return 0.0;
    }
    let mut dominance: i64 = 0;
    for a in x {
        for b in y {
            match a.partial_cmp(b) {
                Some(Ordering::Greater) => dominance += 1,
                Some(Ordering::Less) => dominance -= 1,
                _ => {}
            }
        }
    }
    dominance as f64 / (x.len() * y.len()) as f64
}

/// Qualitative size of a Cliff's delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectMagnitude {
    /// `|δ| < 0.147`
    Negligible,
    /// `|δ| < 0.33`
    Small,
    /// `|δ| < 0.474`
    Medium,
    /// `|δ| ≥ 0.474`
    Large,
}

impl EffectMagnitude {
    /// Buckets `|delta|`.
    pub fn from_delta(delta: f64) -> Self {
        let d = delta.abs();
        if d < 0.147 {
            EffectMagnitude::Negligible
        } else if d < 0.33 {
            EffectMagnitude::Small
        } else if d < 0.474 {
            EffectMagnitude::Medium
        } else {
            EffectMagnitude::Large
        }
    }
}

impl fmt::Display for EffectMagnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EffectMagnitude::Negligible => "negligible",
            EffectMagnitude::Small => "small",
            EffectMagnitude::Medium => "medium",
            EffectMagnitude::Large => "large",
        })
    }
}

/// Conventional significance marker for a p-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Significance {
    /// p < 0.001
    VeryHigh,
    /// p < 0.01
    High,
    /// p < 0.05
    Significant,
    /// p ≥ 0.05
    NotSignificant,
}

impl Significance {
    /// Classifies a p-value.
    pub fn from_p_value(p: f64) -> Self {
        if p < 0.001 {
            Significance::VeryHigh
        } else if p < 0.01 {
            Significance::High
        } else if p < 0.05 {
            Significance::Significant
        } else {
            Significance::NotSignificant
        }
    }

    /// `***`, `**`, `*`, or `ns`.
    pub fn marker(self) -> &'static str {
        match self {
            Significance::VeryHigh => "***",
            Significance::High => "**",
            Significance::Significant => "*",
            Significance::NotSignificant => "ns",
        }
    }
}

impl fmt::Display for Significance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// How a Wilcoxon p-value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WilcoxonMethod {
    /// No non-zero differences; nothing to test.
    Degenerate,
    /// Exact null distribution.
    Exact,
    /// Normal approximation with tie correction.
    Normal,
}

/// Outcome of a Wilcoxon signed-rank test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WilcoxonResult {
    /// `min(W+, W−)`.
    pub statistic: f64,
    /// Two-sided p-value in `(0, 1]`.
    pub p_value: f64,
    /// Non-zero paired differences used.
    pub n: usize,
    /// Distribution used.
    pub method: WilcoxonMethod,
}

/// Two-sided Wilcoxon signed-rank test on paired samples.
///
/// Samples are truncated to the shorter length. Zero differences are
/// dropped. The exact null distribution is used for up to
/// [`EXACT_WILCOXON_LIMIT`] differences without tied ranks, the normal
/// approximation otherwise.
pub fn wilcoxon_signed_rank(x: &[f64], y: &[f64]) -> WilcoxonResult {
    let diffs: Vec<f64> = x
        .iter()
        .zip(y)
        .map(|(a, b)| a - b)
        .filter(|d| *d != 0.0 && d.is_finite())
        .collect();
    let n = diffs.len();
    if n == 0 {
        return WilcoxonResult {
            statistic: 0.0,
            p_value: 1.0,
            n: 0,
            method: WilcoxonMethod::Degenerate,
        };
    }

    let (ranks, tie_sizes) = average_ranks(&diffs);
    let w_plus: f64 = diffs
        .iter()
        .zip(&ranks)
        .filter(|(d, _)| **d > 0.0)
        .map(|(_, r)| r)
        .sum();
    let total = (n * (n + 1)) as f64 / 2.0;
    let statistic = w_plus.min(total - w_plus);

    let (p_value, method) = if n <= EXACT_WILCOXON_LIMIT && tie_sizes.is_empty() {
        (exact_p_value(n, statistic), WilcoxonMethod::Exact)
    } else {
        (normal_p_value(n, statistic, &tie_sizes), WilcoxonMethod::Normal)
    };

    WilcoxonResult {
        statistic,
        p_value: p_value.clamp(f64::MIN_POSITIVE, 1.0),
        n,
        method,
    }
}

/// Average ranks of `|d|` and the sizes of tied groups (size ≥ 2).
fn average_ranks(diffs: &[f64]) -> (Vec<f64>, Vec<usize>) {
    let mut order: Vec<usize> = (0..diffs.len()).collect();
    order.sort_by(|&a, &b| diffs[a].abs().total_cmp(&diffs[b].abs()));

    let mut ranks = vec![0.0; diffs.len()];
    let mut ties = Vec::new();
    let mut start = 0;
    while start < order.len() {
        let value = diffs[order[start]].abs();
        let mut end = start + 1;
        while end < order.len() && diffs[order[end]].abs() == value {
            end += 1;
        }
        // 1-based ranks start+1..=end share their average.
        let rank = (start + 1 + end) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = rank;
        }
        if end - start > 1 {
            ties.push(end - start);
        }
        start = end;
    }
    (ranks, ties)
}

/// `2·P(W ≤ t)` under the exact null distribution of `W+`.
fn exact_p_value(n: usize, statistic: f64) -> f64 {
    let max_sum = n * (n + 1) / 2;
    let mut counts = vec![0.0f64; max_sum + 1];
    counts[0] = 1.0;
    for k in 1..=n {
        for s in (k..=max_sum).rev() {
            counts[s] += counts[s - k];
        }
    }
    let total = 2f64.powi(n as i32);
    let t = statistic.floor() as usize;
    let lower: f64 = counts[..=t.min(max_sum)].iter().sum();
    (2.0 * lower / total).min(1.0)
}

fn normal_p_value(n: usize, statistic: f64, tie_sizes: &[usize]) -> f64 {
    let n = n as f64;
    let expected = n * (n + 1.0) / 4.0;
    let tie_correction: f64 = tie_sizes
        .iter()
        .map(|&t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum::<f64>()
        / 48.0;
    let variance = n * (n + 1.0) * (2.0 * n + 1.0) / 24.0 - tie_correction;
    if variance <= 0.0 {
        return 1.0;
    }
    let z = (statistic - expected) / variance.sqrt();
    (2.0 * normal_cdf(-z.abs())).min(1.0)
}

/// Standard normal CDF.
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / SQRT_2)
}

/// Complementary error function, fractional error below 1.2e-7.
///
/// # Reference
/// Press et al., "Numerical Recipes", §6.2 (Chebyshev fit `erfcc`)
fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87 + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let r = t * poly.exp();
    if x >= 0.0 { r } else { 2.0 - r }
}
