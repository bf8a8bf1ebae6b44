use crate::assessment::pairwise_qi_sets;
use crate::error::{Result, RiskError};
use crate::high_risk::{DEFAULT_HIGH_RISK_LIMIT, checked_limit};
use crate::structs::QuasiIdentifierSet;
use std::path::PathBuf;

const DEFAULT_DATASET_PATH: &str = "/tmp/data/risk/dataset.json";
const DEFAULT_OUTPUT_DIR: &str = "/tmp/data/risk/report";
const DEFAULT_ID_COLUMN: &str = "id";

#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentConfig {
    /// `DATASET_PATH`: JSON array of flat row objects.
    pub dataset_path: PathBuf,
    /// `ID_COLUMN`: column carrying each record's id.
    pub id_column: String,
    /// `QI_SETS` (`age,zip;age,gender`), or pairs built from `QI_COLUMNS`.
    pub qi_sets: Vec<QuasiIdentifierSet>,
    pub high_risk_limit: usize,
    pub output_dir: PathBuf,
}

impl AssessmentConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let qi_sets = match (lookup("QI_SETS"), lookup("QI_COLUMNS")) {
            (Some(sets), _) => parse_qi_sets(&sets)?,
            (None, Some(columns)) => pairwise_qi_sets(&split_columns(&columns))?,
            (None, None) => {
                return Err(RiskError::InvalidConfig {
                    key: "QI_SETS".to_string(),
                    message: "set QI_SETS or QI_COLUMNS".to_string(),
                });
            }
        };
        if qi_sets.is_empty() {
            return Err(RiskError::NoQuasiIdentifierSets);
        }

        let high_risk_limit = match lookup("HIGH_RISK_LIMIT") {
            Some(raw) => {
                let limit = raw.trim().parse::<i64>().map_err(|e| RiskError::InvalidConfig {
                    key: "HIGH_RISK_LIMIT".to_string(),
                    message: format!("{raw:?}: {e}"),
                })?;
                checked_limit(limit)?
            }
            None => DEFAULT_HIGH_RISK_LIMIT,
        };

        Ok(Self {
            dataset_path: lookup("DATASET_PATH")
                .unwrap_or_else(|| DEFAULT_DATASET_PATH.to_string())
                .into(),
            id_column: lookup("ID_COLUMN").unwrap_or_else(|| DEFAULT_ID_COLUMN.to_string()),
            qi_sets,
            high_risk_limit,
            output_dir: lookup("OUTPUT_DIR")
                .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string())
                .into(),
        })
    }
}

fn split_columns(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
        .collect()
}

/// `;` separates sets, `,` separates columns. Blank sets between
/// separators are skipped.
pub fn parse_qi_sets(raw: &str) -> Result<Vec<QuasiIdentifierSet>> {
    raw.split(';')
        .filter(|set| !set.trim().is_empty())
        .map(|set| QuasiIdentifierSet::new(split_columns(set)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AssessmentConfig::from_lookup(lookup_from(&[("QI_SETS", "age,zip")])).unwrap();
        assert_eq!(config.dataset_path, PathBuf::from(DEFAULT_DATASET_PATH));
        assert_eq!(config.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert_eq!(config.id_column, "id");
        assert_eq!(config.high_risk_limit, DEFAULT_HIGH_RISK_LIMIT);
        assert_eq!(config.qi_sets.len(), 1);
    }

    #[test]
    fn test_explicit_values() {
        let config = AssessmentConfig::from_lookup(lookup_from(&[
            ("QI_SETS", " age , zip ; age,gender ;"),
            ("DATASET_PATH", "/data/customers.json"),
            ("ID_COLUMN", "customer_id"),
            ("HIGH_RISK_LIMIT", "25"),
            ("OUTPUT_DIR", "/data/out"),
        ]))
        .unwrap();
        let sets: Vec<String> = config.qi_sets.iter().map(ToString::to_string).collect();
        assert_eq!(sets, vec!["[age, zip]", "[age, gender]"]);
        assert_eq!(config.id_column, "customer_id");
        assert_eq!(config.high_risk_limit, 25);
        assert_eq!(config.dataset_path, PathBuf::from("/data/customers.json"));
        assert_eq!(config.output_dir, PathBuf::from("/data/out"));
    }

    #[test]
    fn test_qi_columns_expand_to_pairs() {
        let config =
            AssessmentConfig::from_lookup(lookup_from(&[("QI_COLUMNS", "age,zip,dob,income")]))
                .unwrap();
        let sets: Vec<String> = config.qi_sets.iter().map(ToString::to_string).collect();
        assert_eq!(sets, vec!["[age, zip]", "[age, income]", "[zip, dob]"]);
    }

    #[test]
    fn test_missing_qi_configuration() {
        let err = AssessmentConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, RiskError::InvalidConfig { ref key, .. } if key == "QI_SETS"));

        let err = AssessmentConfig::from_lookup(lookup_from(&[("QI_SETS", " ; ")])).unwrap_err();
        assert!(matches!(err, RiskError::NoQuasiIdentifierSets));
    }

    #[test]
    fn test_empty_set_is_rejected() {
        let err = parse_qi_sets("age,zip; , ").unwrap_err();
        assert!(matches!(err, RiskError::EmptyQuasiIdentifierSet));
    }

    #[test]
    fn test_negative_limit() {
        let err = AssessmentConfig::from_lookup(lookup_from(&[
            ("QI_SETS", "age"),
            ("HIGH_RISK_LIMIT", "-3"),
        ]))
        .unwrap_err();
        assert!(matches!(err, RiskError::NegativeLimit(-3)));

        let err = AssessmentConfig::from_lookup(lookup_from(&[
            ("QI_SETS", "age"),
            ("HIGH_RISK_LIMIT", "ten"),
        ]))
        .unwrap_err();
        assert!(matches!(err, RiskError::InvalidConfig { ref key, .. } if key == "HIGH_RISK_LIMIT"));
    }
}
