use crate::types::{current_month, validate_month, AdvisorName, MonthId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpsConfig {
    /// Shared access string checked by the session gate.
    pub access_code: String,
    /// The `<scope>` part of export filenames.
    pub export_scope: String,
    /// Roster used until the store returns a non-empty advisor list.
    #[serde(default)]
    pub default_advisors: Vec<AdvisorName>,
    /// Month selected at session start. Falls back to the current month.
    #[serde(default)]
    pub default_month: Option<MonthId>,
    /// Seed the example month when the initial load fails.
    #[serde(default)]
    pub seed_examples_on_load_failure: bool,
}

impl NpsConfig {
    /// Load from the data/ directory.
    /// In tests, use NpsConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/config/nps_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: NpsConfig = serde_json::from_str(&content)?;
        if let Some(month) = &config.default_month {
            validate_month(month).map_err(|e| anyhow::anyhow!("{path}: {e}"))?;
        }
        if config.access_code.is_empty() {
            anyhow::bail!("{path}: access_code must not be empty");
        }
        Ok(config)
    }

    pub fn initial_month(&self) -> MonthId {
        self.default_month.clone().unwrap_or_else(current_month)
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self {
            access_code: "test-code".into(),
            export_scope: "Test".into(),
            default_advisors: vec!["Abidam".into(), "Leo".into(), "Lupita".into()],
            default_month: Some("2024-01".into()),
            seed_examples_on_load_failure: true,
        }
    }
}
