use crate::error::Result;
use crate::structs::{Dataset, QuasiIdentifierSet, Record, RecordId, Value};
use ahash::AHashMap;
use log::debug;
use rayon::prelude::*;

// k values are in dataset order
#[derive(Debug, Clone)]
pub struct GroupCounts<'a> {
    records: &'a [Record],
    ks: Vec<usize>,
    group_count: usize,
}

impl<'a> GroupCounts<'a> {
    #[inline]
    pub fn k_at(&self, position: usize) -> usize {
        self.ks[position]
    }

    pub fn ks(&self) -> &[usize] {
        &self.ks
    }

    pub fn group_count(&self) -> usize {
        self.group_count
    }

    pub fn get(&self, id: &RecordId) -> Option<usize> {
        self.iter().find(|(rid, _)| *rid == id).map(|(_, k)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a RecordId, usize)> + '_ {
        self.records.iter().map(Record::id).zip(self.ks.iter().copied())
    }

    pub fn to_map(&self) -> AHashMap<RecordId, usize> {
        self.iter().map(|(id, k)| (id.clone(), k)).collect()
    }
}

/// Nulls and absent cells group together as one value.
pub fn count_groups<'a>(
    dataset: &'a Dataset,
    qi_set: &QuasiIdentifierSet,
) -> Result<GroupCounts<'a>> {
    dataset.validate_qi_set(qi_set)?;

    let keys: Vec<Vec<&Value>> = dataset
        .records()
        .par_iter()
        .map(|record| qi_set.columns().iter().map(|c| record.get(c)).collect())
        .collect();

    let mut buckets: AHashMap<&Vec<&Value>, usize> = AHashMap::with_capacity(keys.len());
    for key in &keys {
        *buckets.entry(key).or_insert(0) += 1;
    }

    let ks: Vec<usize> = keys
        .par_iter()
        .map(|key| buckets.get(key).copied().unwrap_or(1))
        .collect();

    debug!(
        "qi set {qi_set}: {} records in {} groups",
        ks.len(),
        buckets.len()
    );

    Ok(GroupCounts {
        records: dataset.records(),
        ks,
        group_count: buckets.len(),
    })
}
