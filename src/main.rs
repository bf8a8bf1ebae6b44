use anyhow::Result;
use log::info;
use reid_risk::{AssessmentConfig, DatasetLoader, assess_dataset, save_json, select_high_risk};
use std::fs;

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<()> {
    env_logger::init();
    // `DATASET_PATH`, `ID_COLUMN`, `QI_SETS`/`QI_COLUMNS`, `HIGH_RISK_LIMIT`, `OUTPUT_DIR`
    let config = AssessmentConfig::from_env()?;
    info!("dataset: {}", config.dataset_path.display());
    info!("output_dir: {}", config.output_dir.display());

    let dataset = DatasetLoader::new(&config.dataset_path).load(&config.id_column)?;
    let assessment = assess_dataset(&dataset, &config.qi_sets)?;
    assessment.risk_report.log_summary();

    fs::create_dir_all(&config.output_dir)?;
    save_json(
        &config.output_dir.join("risk_scores.json"),
        &assessment.risk_scores,
    )?;
    let report_path = assessment.risk_report.save_json(&config.output_dir)?;
    info!("Report saved to {}", report_path.display());

    let high_risk = select_high_risk(&dataset, &assessment.risk_scores, config.high_risk_limit)?;
    if !high_risk.is_empty() {
        info!("\nHigh-risk records (top {}):", high_risk.len());
        for entry in &high_risk {
            info!(
                "Record {}: score {:.2} - {}",
                entry.record.id(),
                entry.risk_score,
                entry.reasoning
            );
        }
    }
    save_json(&config.output_dir.join("high_risk_records.json"), &high_risk)?;

    Ok(())
}
