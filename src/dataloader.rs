use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::structs::{Dataset, Record, Value};
use ahash::AHashMap;
use anyhow::{Result, anyhow};
use log::info;
use rayon::prelude::*;

pub struct DatasetLoader {
    dataset_path: PathBuf,
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self {
            dataset_path: Path::new("/tmp/data/risk/dataset.json").to_path_buf(),
        }
    }
}

impl DatasetLoader {
    pub fn new(dataset_path: impl Into<PathBuf>) -> Self {
        Self {
            dataset_path: dataset_path.into(),
        }
    }
}

impl DatasetLoader {
    /// Loads a JSON array of flat objects. Every row must carry an id in
    /// `id_column`; the schema is the union of all row keys.
    pub fn load(&self, id_column: &str) -> Result<Dataset> {
        if !self.dataset_path.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Dataset not found: {}", self.dataset_path.display()),
            )
            .into());
        }

        let reader = BufReader::new(File::open(&self.dataset_path)?);
        let rows: Vec<AHashMap<String, Value>> = serde_json::from_reader(reader)
            .map_err(|e| anyhow!("{}: {e}", self.dataset_path.display()))?;

        let records = rows
            .into_par_iter()
            .enumerate()
            .map(|(row, values)| Record::from_row(values, id_column, row))
            .collect::<crate::error::Result<Vec<_>>>()?;

        let dataset = Dataset::from_records(records)?;
        info!(
            "Loaded {} records with {} columns from {}",
            dataset.len(),
            dataset.columns().len(),
            self.dataset_path.display()
        );
        Ok(dataset)
    }
}
