use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::database::manager::DatabaseError;
use crate::database::models::PredefinedSkill;
use crate::database::repository::Store;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid reference data in {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Parse a JSON array of `{state, district, skill, whatsNew}` records.
pub fn parse_reference_data(json: &str) -> Result<Vec<PredefinedSkill>, serde_json::Error> {
    serde_json::from_str(json)
}

pub async fn load_reference_file(path: &Path) -> Result<Vec<PredefinedSkill>, SeedError> {
    let display = path.display().to_string();
    let raw = tokio::fs::read_to_string(path).await.map_err(|source| SeedError::Read {
        path: display.clone(),
        source,
    })?;
    parse_reference_data(&raw).map_err(|source| SeedError::Parse { path: display, source })
}

/// Load reference data into an empty store. A populated store is left alone
/// so restarts do not duplicate the catalog.
pub async fn seed_if_empty(store: &dyn Store, path: &Path) -> Result<usize, SeedError> {
    let existing = store.count_reference().await?;
    if existing > 0 {
        info!("Reference data already present ({} rows), skipping {}", existing, path.display());
        return Ok(0);
    }

    let records = load_reference_file(path).await?;
    let inserted = store.insert_reference(records).await?;
    info!("Loaded {} reference rows from {}", inserted, path.display());
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::database::repository::ReferenceRepository;
    use std::io::Write;

    const SAMPLE: &str = r#"[
        {"state": "Telangana", "district": "Warangal", "skill": "Durries", "whatsNew": "Natural dyes"},
        {"state": "Kerala", "district": "Alappuzha", "skill": "Coir weaving"}
    ]"#;

    #[test]
    fn parses_camel_case_records() {
        let records = parse_reference_data(SAMPLE).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].whats_new.as_deref(), Some("Natural dyes"));
        assert_eq!(records[1].whats_new, None);
    }

    #[tokio::test]
    async fn seeds_once() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let store = MemoryStore::new();
        assert_eq!(seed_if_empty(&store, file.path()).await.unwrap(), 2);
        assert_eq!(seed_if_empty(&store, file.path()).await.unwrap(), 0);
        assert_eq!(store.count_reference().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn missing_file_is_read_error() {
        let store = MemoryStore::new();
        let result = seed_if_empty(&store, Path::new("/nonexistent/skills.json")).await;
        assert!(matches!(result, Err(SeedError::Read { .. })));
    }
}
