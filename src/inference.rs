use crate::assessment::{Assessment, assess_dataset, pairwise_qi_sets};
use crate::error::Result;
use crate::structs::Dataset;
use ahash::AHashMap;
use log::info;

pub type ColumnPiiTags = AHashMap<String, Vec<String>>;

/// Picks the quasi-identifier columns of a dataset.
///
/// Implementations must leave out direct identifiers (names, emails,
/// government ids, street addresses) and return demographic or geographic
/// columns only, in a stable order.
pub trait QuasiIdentifierInference {
    fn infer_quasi_identifiers(&self, dataset: &Dataset, pii_tags: &ColumnPiiTags) -> Vec<String>;
}

impl<F> QuasiIdentifierInference for F
where
    F: Fn(&Dataset, &ColumnPiiTags) -> Vec<String>,
{
    fn infer_quasi_identifiers(&self, dataset: &Dataset, pii_tags: &ColumnPiiTags) -> Vec<String> {
        self(dataset, pii_tags)
    }
}

pub fn assess_with_inference(
    dataset: &Dataset,
    pii_tags: &ColumnPiiTags,
    inference: &impl QuasiIdentifierInference,
) -> Result<Assessment> {
    let columns = inference.infer_quasi_identifiers(dataset, pii_tags);
    info!("Using quasi-identifiers: {}", columns.join(", "));
    let qi_sets = pairwise_qi_sets(&columns)?;
    assess_dataset(dataset, &qi_sets)
}
