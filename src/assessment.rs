use crate::error::Result;
use crate::report::{RiskReport, summarize};
use crate::scorer::{RiskScore, score};
use crate::structs::{Dataset, QuasiIdentifierSet};
use log::{info, warn};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub qi_sets: Vec<QuasiIdentifierSet>,
    pub risk_scores: Vec<RiskScore>,
    pub risk_report: RiskReport,
}

pub fn assess_dataset(dataset: &Dataset, qi_sets: &[QuasiIdentifierSet]) -> Result<Assessment> {
    info!(
        "Testing {} quasi-identifier combinations: {}",
        qi_sets.len(),
        qi_sets
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    );
    let risk_scores = score(dataset, qi_sets)?;
    let risk_report = summarize(&risk_scores);

    if risk_report.total_records > 0 && risk_report.high_risk_count == risk_report.total_records {
        warn!(
            "All {} records are high risk. The dataset may be very small, or too many \
             quasi-identifiers are being combined",
            risk_report.total_records
        );
    }

    Ok(Assessment {
        qi_sets: qi_sets.to_vec(),
        risk_scores,
        risk_report,
    })
}

/// Pairs only, never three or more columns at once.
pub fn pairwise_qi_sets(columns: &[String]) -> Result<Vec<QuasiIdentifierSet>> {
    let pairs: Vec<[&String; 2]> = match columns {
        [] => Vec::new(),
        [only] => return Ok(vec![QuasiIdentifierSet::new([only.as_str()])?]),
        [c0, c1] => vec![[c0, c1]],
        [c0, c1, c2] => vec![[c0, c1], [c1, c2]],
        [c0, c1, c2, c3, ..] => vec![[c0, c1], [c0, c3], [c1, c2]],
    };
    pairs
        .into_iter()
        .map(|pair| QuasiIdentifierSet::new(pair.map(String::as_str)))
        .collect()
}
