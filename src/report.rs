use crate::scorer::{RiskLevel, RiskScore};
use crate::structs::RecordId;
use crate::utils::{round2, save_json};
use anyhow::Result;
use log::info;
use num_format::{Locale, ToFormattedString};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

// Report buckets use their own boundaries, separate from `UniquenessClass`:
// rare is 2..=5 here and safe starts above 10.
pub const REPORT_RARE_MAX_K: usize = 5;
pub const REPORT_SAFE_ABOVE_K: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    pub total_records: usize,
    pub high_risk_count: usize,
    pub medium_risk_count: usize,
    pub low_risk_count: usize,
    pub high_risk_percentage: f64,
    pub medium_risk_percentage: f64,
    pub low_risk_percentage: f64,
    pub average_k_anonymity: f64,
    pub min_k_anonymity: usize,
    pub unique_records: Vec<RecordId>,
    pub rare_records: Vec<RecordId>,
    pub safe_records: Vec<RecordId>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    high: usize,
    medium: usize,
    low: usize,
    k_sum: usize,
    min_k: Option<usize>,
}

impl Tally {
    fn push(mut self, score: &RiskScore) -> Self {
        match score.risk_level() {
            RiskLevel::High => self.high += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::Low => self.low += 1,
        }
        self.k_sum += score.k_anonymity();
        self.min_k = Some(self.min_k.map_or(score.k_anonymity(), |m| m.min(score.k_anonymity())));
        self
    }

    fn merge(self, other: Self) -> Self {
        Self {
            high: self.high + other.high,
            medium: self.medium + other.medium,
            low: self.low + other.low,
            k_sum: self.k_sum + other.k_sum,
            min_k: match (self.min_k, other.min_k) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            },
        }
    }
}

fn records_where(risk_scores: &[RiskScore], keep: impl Fn(usize) -> bool + Sync) -> Vec<RecordId> {
    risk_scores
        .par_iter()
        .filter(|s| keep(s.k_anonymity()))
        .map(|s| s.record_id().clone())
        .collect()
}

/// An empty input reports zeros everywhere.
pub fn summarize(risk_scores: &[RiskScore]) -> RiskReport {
    let tally = risk_scores
        .par_iter()
        .fold(Tally::default, Tally::push)
        .reduce(Tally::default, Tally::merge);

    let total = risk_scores.len();
    let percentage = |count: usize| {
        if total == 0 {
            0.0
        } else {
            round2(count as f64 / total as f64 * 100.0)
        }
    };
    let average_k_anonymity = if total == 0 {
        0.0
    } else {
        round2(tally.k_sum as f64 / total as f64)
    };

    RiskReport {
        total_records: total,
        high_risk_count: tally.high,
        medium_risk_count: tally.medium,
        low_risk_count: tally.low,
        high_risk_percentage: percentage(tally.high),
        medium_risk_percentage: percentage(tally.medium),
        low_risk_percentage: percentage(tally.low),
        average_k_anonymity,
        min_k_anonymity: tally.min_k.unwrap_or(0),
        unique_records: records_where(risk_scores, |k| k == 1),
        rare_records: records_where(risk_scores, |k| (2..=REPORT_RARE_MAX_K).contains(&k)),
        safe_records: records_where(risk_scores, |k| k > REPORT_SAFE_ABOVE_K),
    }
}

impl RiskReport {
    pub fn save_json(&self, output_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join("risk_report.json");
        save_json(&path, self)?;
        Ok(path)
    }

    pub fn log_summary(&self) {
        info!("\nRisk Assessment Summary:");
        info!(
            "Total records: {}",
            self.total_records.to_formatted_string(&Locale::en)
        );
        info!(
            "High risk: {} ({:.1}%)",
            self.high_risk_count.to_formatted_string(&Locale::en),
            self.high_risk_percentage
        );
        info!(
            "Medium risk: {} ({:.1}%)",
            self.medium_risk_count.to_formatted_string(&Locale::en),
            self.medium_risk_percentage
        );
        info!(
            "Low risk: {} ({:.1}%)",
            self.low_risk_count.to_formatted_string(&Locale::en),
            self.low_risk_percentage
        );
        info!(
            "k-anonymity: average {:.2}, minimum {}",
            self.average_k_anonymity, self.min_k_anonymity
        );
        info!(
            "Unique records (k=1): {}",
            self.unique_records.len().to_formatted_string(&Locale::en)
        );
        info!(
            "Rare records (k=2-{REPORT_RARE_MAX_K}): {}",
            self.rare_records.len().to_formatted_string(&Locale::en)
        );
        info!(
            "Safe records (k>{REPORT_SAFE_ABOVE_K}): {}",
            self.safe_records.len().to_formatted_string(&Locale::en)
        );
    }
}
