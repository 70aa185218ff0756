use serde::{Deserialize, Serialize};

/// Runtime configuration for the complaint desk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeskConfig {
    /// SQLite database path, or ":memory:".
    pub database_path: String,
    pub classifier: ClassifierPaths,
    /// Admin account created at startup if it does not exist yet.
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Locations of the two halves of the trained classifier artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierPaths {
    pub vectorizer_path: String,
    pub model_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

impl DeskConfig {
    /// Load configuration from `{data_dir}/desk.json`.
    ///
    /// In tests, use DeskConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/desk.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: DeskConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// In-memory database plus the artifact shipped in the repo's data/
    /// directory. Used by integration tests.
    pub fn default_test() -> Self {
        let artifact_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../data/classifier");
        Self {
            database_path: ":memory:".to_string(),
            classifier: ClassifierPaths {
                vectorizer_path: format!("{artifact_dir}/vectorizer.json"),
                model_path: format!("{artifact_dir}/model.json"),
            },
            bootstrap_admin: None,
        }
    }
}
