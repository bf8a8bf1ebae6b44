use crate::error::{Result, RiskError};
use crate::group_counter::count_groups;
use crate::structs::{Dataset, QuasiIdentifierSet, RecordId};
use crate::uniqueness::{RARE_MAX_K, SAFE_MIN_K, UniquenessClass};
use log::info;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;

/// Unique on at least this many quasi-identifier sets means high risk
/// regardless of `k`.
pub const MULTI_UNIQUE_MIN_SETS: usize = 2;

const HIGH_K1_SCORE: f64 = 0.95;
const HIGH_K2_SCORE: f64 = 0.90;
const MEDIUM_MAX_SCORE: f64 = 0.80;
const LOW_MAX_SCORE: f64 = 0.40;
const STRONG_MIN_K: usize = 20;
const GOOD_MIN_K: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskLevel::High => "high",
            RiskLevel::Medium => "medium",
            RiskLevel::Low => "low",
        })
    }
}

/// The rule that fired for a record. Rules are tried in declaration order
/// and the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskDecision {
    HighByCount {
        unique_count: usize,
        total_sets: usize,
    },
    HighByK1,
    HighByK2,
    Medium {
        min_k: usize,
    },
    Low {
        min_k: usize,
    },
}

impl RiskDecision {
    pub fn decide(unique_count: usize, total_sets: usize, min_k: usize) -> Self {
        match (unique_count, min_k) {
            (count, _) if count >= MULTI_UNIQUE_MIN_SETS => RiskDecision::HighByCount {
                unique_count: count,
                total_sets,
            },
            (_, 0 | 1) => RiskDecision::HighByK1,
            (_, 2) => RiskDecision::HighByK2,
            (_, 3..=RARE_MAX_K) => RiskDecision::Medium { min_k },
            _ => RiskDecision::Low { min_k },
        }
    }

    pub fn level(&self) -> RiskLevel {
        match self {
            RiskDecision::HighByCount { .. } | RiskDecision::HighByK1 | RiskDecision::HighByK2 => {
                RiskLevel::High
            }
            RiskDecision::Medium { .. } => RiskLevel::Medium,
            RiskDecision::Low { .. } => RiskLevel::Low,
        }
    }

    pub fn score(&self) -> f64 {
        match *self {
            RiskDecision::HighByCount {
                unique_count,
                total_sets,
            } => {
                let share = unique_count as f64 / total_sets.max(1) as f64;
                (0.9 + share * 0.1).min(1.0)
            }
            RiskDecision::HighByK1 => HIGH_K1_SCORE,
            RiskDecision::HighByK2 => HIGH_K2_SCORE,
            RiskDecision::Medium { min_k } => {
                (0.4 + (SAFE_MIN_K as f64 - min_k as f64) / 20.0).min(MEDIUM_MAX_SCORE)
            }
            RiskDecision::Low { min_k } => {
                (0.1 + (SAFE_MIN_K as f64 / min_k as f64) * 0.25).min(LOW_MAX_SCORE)
            }
        }
    }

    pub fn reasoning(&self) -> String {
        match *self {
            RiskDecision::HighByCount { unique_count, .. } => {
                format!("Unique on {unique_count} different quasi-identifier combinations")
            }
            RiskDecision::HighByK1 => {
                "Uniquely identifiable (k=1) - high re-identification risk".to_string()
            }
            RiskDecision::HighByK2 => {
                "Extremely rare (k=2) - very high re-identification risk".to_string()
            }
            RiskDecision::Medium { min_k } => {
                format!("Insufficient anonymity (k={min_k}) - below k>=10 standard")
            }
            RiskDecision::Low { min_k } if min_k >= STRONG_MIN_K => {
                format!("Strong anonymity (k={min_k}) - well-protected")
            }
            RiskDecision::Low { min_k } if min_k >= GOOD_MIN_K => {
                format!("Good anonymity (k={min_k}) - adequately protected")
            }
            RiskDecision::Low { min_k } => {
                format!("Adequate anonymity (k={min_k}) - meets k>=10 standard")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskScore {
    record_id: RecordId,
    risk_level: RiskLevel,
    risk_score: f64,
    unique_on_qi_count: usize,
    k_anonymity: usize,
    reasoning: String,
}

impl RiskScore {
    pub fn from_decision(
        record_id: RecordId,
        decision: RiskDecision,
        unique_on_qi_count: usize,
        k_anonymity: usize,
    ) -> Self {
        Self {
            record_id,
            risk_level: decision.level(),
            risk_score: decision.score(),
            unique_on_qi_count,
            k_anonymity,
            reasoning: decision.reasoning(),
        }
    }

    pub fn record_id(&self) -> &RecordId {
        &self.record_id
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    pub fn risk_score(&self) -> f64 {
        self.risk_score
    }

    pub fn unique_on_qi_count(&self) -> usize {
        self.unique_on_qi_count
    }

    pub fn k_anonymity(&self) -> usize {
        self.k_anonymity
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }
}

/// A bad column in any set aborts the whole run.
pub fn score(dataset: &Dataset, qi_sets: &[QuasiIdentifierSet]) -> Result<Vec<RiskScore>> {
    if qi_sets.is_empty() {
        return Err(RiskError::NoQuasiIdentifierSets);
    }
    for qi_set in qi_sets {
        dataset.validate_qi_set(qi_set)?;
    }

    let counts = qi_sets
        .par_iter()
        .map(|qi_set| count_groups(dataset, qi_set))
        .collect::<Result<Vec<_>>>()?;

    let total_sets = qi_sets.len();
    let scores: Vec<RiskScore> = dataset
        .records()
        .par_iter()
        .enumerate()
        .map(|(position, record)| {
            let (unique_count, min_k) = counts.iter().map(|c| c.k_at(position)).fold(
                (0, usize::MAX),
                |(unique_count, min_k), k| {
                    let unique = UniquenessClass::from_k(k) == UniquenessClass::Unique;
                    (unique_count + usize::from(unique), min_k.min(k))
                },
            );
            let decision = RiskDecision::decide(unique_count, total_sets, min_k);
            RiskScore::from_decision(record.id().clone(), decision, unique_count, min_k)
        })
        .collect();

    info!(
        "Scored {} records against {total_sets} quasi-identifier sets",
        scores.len()
    );
    Ok(scores)
}
