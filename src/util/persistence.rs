use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Error as SerdeError;

use crate::domain::RecommendationReport;

const REPORT_FILENAME: &str = "last_report.json";

pub fn last_report_file() -> Option<PathBuf> {
    super::project_dirs().map(|dirs| dirs.data_dir().join(REPORT_FILENAME))
}

pub fn load_last_report() -> Option<RecommendationReport> {
    load_report_from(&last_report_file()?)
}

pub fn save_last_report(report: &RecommendationReport) -> Result<PathBuf, PersistSaveError> {
    let path = last_report_file().ok_or(PersistSaveError::StorageUnavailable)?;
    save_report_to(&path, report)?;
    Ok(path)
}

pub fn load_report_from(path: &Path) -> Option<RecommendationReport> {
    let data = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&data) {
        Ok(report) => Some(report),
        Err(e) => {
            tracing::warn!("ignoring unreadable report {}: {e}", path.display());
            None
        }
    }
}

pub fn save_report_to(path: &Path, report: &RecommendationReport) -> Result<(), PersistSaveError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum PersistSaveError {
    #[error("storage directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AreaType, EvaluationSummary};

    #[test]
    fn report_is_saved_and_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join(REPORT_FILENAME);
        let report = RecommendationReport::new(
            AreaType::from("kamakura"),
            "Kamakura",
            EvaluationSummary {
                scores: Vec::new(),
                results: Vec::new(),
            },
        );

        save_report_to(&path, &report).unwrap();
        assert_eq!(load_report_from(&path), Some(report));
    }

    #[test]
    fn garbage_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(REPORT_FILENAME);
        fs::write(&path, "[]").unwrap();
        assert_eq!(load_report_from(&path), None);
    }
}
