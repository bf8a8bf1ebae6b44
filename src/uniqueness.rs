use crate::error::Result;
use crate::group_counter::{GroupCounts, count_groups};
use crate::structs::{Dataset, QuasiIdentifierSet, RecordId, Value};
use serde::Serialize;

/// Largest `k` still counted as rare. Anything above is safe.
pub const RARE_MAX_K: usize = 9;
/// Smallest `k` meeting the k >= 10 standard.
pub const SAFE_MIN_K: usize = RARE_MAX_K + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UniquenessClass {
    Unique,
    Rare,
    Safe,
}

impl UniquenessClass {
    #[inline]
    pub fn from_k(k: usize) -> Self {
        match k {
            0 | 1 => UniquenessClass::Unique,
            2..=RARE_MAX_K => UniquenessClass::Rare,
            _ => UniquenessClass::Safe,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniquenessResult {
    pub record_id: RecordId,
    pub k_anonymity: usize,
    pub quasi_identifier_values: Vec<(String, Value)>,
    pub is_unique: bool,
    pub is_rare: bool,
    pub is_safe: bool,
}

impl UniquenessResult {
    pub fn class(&self) -> UniquenessClass {
        UniquenessClass::from_k(self.k_anonymity)
    }
}

pub fn classify(dataset: &Dataset, qi_set: &QuasiIdentifierSet) -> Result<Vec<UniquenessResult>> {
    let counts = count_groups(dataset, qi_set)?;
    Ok(classify_counts(dataset, &counts, qi_set))
}

pub(crate) fn classify_counts(
    dataset: &Dataset,
    counts: &GroupCounts<'_>,
    qi_set: &QuasiIdentifierSet,
) -> Vec<UniquenessResult> {
    dataset
        .records()
        .iter()
        .zip(counts.ks())
        .map(|(record, &k)| {
            let class = UniquenessClass::from_k(k);
            UniquenessResult {
                record_id: record.id().clone(),
                k_anonymity: k,
                quasi_identifier_values: qi_set
                    .columns()
                    .iter()
                    .map(|c| (c.clone(), record.get(c).clone()))
                    .collect(),
                is_unique: class == UniquenessClass::Unique,
                is_rare: class == UniquenessClass::Rare,
                is_safe: class == UniquenessClass::Safe,
            }
        })
        .collect()
}
