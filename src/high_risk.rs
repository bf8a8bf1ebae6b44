use crate::error::{Result, RiskError};
use crate::scorer::{RiskLevel, RiskScore};
use crate::structs::{Dataset, Record, RecordId};
use ahash::AHashMap;
use rayon::prelude::*;
use serde::ser::{Serialize, SerializeStruct, Serializer};

pub const DEFAULT_HIGH_RISK_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub struct HighRiskRecord<'a> {
    pub record: &'a Record,
    pub risk_score: f64,
    pub reasoning: &'a str,
    columns: &'a [String],
}

impl Serialize for HighRiskRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("HighRiskRecord", 3)?;
        state.serialize_field("record", &self.record.in_column_order(self.columns))?;
        state.serialize_field("risk_score", &self.risk_score)?;
        state.serialize_field("reasoning", self.reasoning)?;
        state.end()
    }
}

pub fn checked_limit(limit: i64) -> Result<usize> {
    usize::try_from(limit).map_err(|_| RiskError::NegativeLimit(limit))
}

/// Ties keep their input order.
pub fn select_high_risk<'a>(
    dataset: &'a Dataset,
    risk_scores: &'a [RiskScore],
    limit: usize,
) -> Result<Vec<HighRiskRecord<'a>>> {
    if limit == 0 {
        return Ok(Vec::new());
    }

    let mut high: Vec<&RiskScore> = risk_scores
        .par_iter()
        .filter(|s| s.risk_level() == RiskLevel::High)
        .collect();
    high.par_sort_by(|a, b| b.risk_score().total_cmp(&a.risk_score()));
    high.truncate(limit);

    let by_id: AHashMap<&RecordId, &Record> =
        dataset.records().iter().map(|r| (r.id(), r)).collect();

    high.into_iter()
        .map(|score| {
            let record = by_id
                .get(score.record_id())
                .copied()
                .ok_or_else(|| RiskError::UnknownRecord(score.record_id().clone()))?;
            Ok(HighRiskRecord {
                record,
                risk_score: score.risk_score(),
                reasoning: score.reasoning(),
                columns: dataset.columns(),
            })
        })
        .collect()
}
