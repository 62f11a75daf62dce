use std::fs;
use std::path::Path;

use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};

pub const ANALYSIS_CONFIGURATION_FILE_NAME: &str = "analysis.settings.json";
pub const DEFAULT_SLOW_METHOD_THRESHOLD_MS: u64 = 150;
pub const DEFAULT_PROGRESS_INTERVAL: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Extensions (without the dot) of files handed to the parser.
    pub file_extensions: Vec<String>,
    /// Parse every file regardless of extension.
    pub force: bool,
    pub slow_method_threshold_ms: u64,
    /// Classes linked between two progress lines.
    pub progress_interval: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfigBuilder::build(false, 0)
    }
}

impl AnalysisConfig {
    pub fn accepts(&self, path: &Path) -> bool {
        if self.force {
            return true;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.file_extensions.iter().any(|e| e == ext))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

pub struct AnalysisConfigBuilder;

impl AnalysisConfigBuilder {
    pub fn build(force: bool, slow_method_threshold_ms: u64) -> AnalysisConfig {
        AnalysisConfig {
            file_extensions: vec!["json".to_string()],
            force,
            slow_method_threshold_ms: Self::get_effective_threshold(slow_method_threshold_ms),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    pub fn get_effective_threshold(threshold_ms: u64) -> u64 {
        if threshold_ms == 0 {
            DEFAULT_SLOW_METHOD_THRESHOLD_MS
        } else {
            threshold_ms
        }
    }
}

pub fn read_analysis_configuration(path: &Path) -> AnalysisConfig {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(
                "Could not read analysis configuration: {}. Returning default configuration.",
                e
            );
            return AnalysisConfig::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(configuration) => configuration,
        Err(e) => {
            warn!(
                "Could not parse analysis configuration: {}. Returning default configuration.",
                e
            );
            AnalysisConfig::default()
        }
    }
}
