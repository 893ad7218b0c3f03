// Run configuration: reported KPI families, business-view sign rules, and
// chart depth. Loaded from an optional JSON file next to the binary so the
// reporting scope can change without a rebuild; the defaults mirror the
// telecom KPI workbooks this tool was built around.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RcaError;
use crate::types::SignRule;
use crate::view::BusinessView;

pub const DEFAULT_CONFIG_FILE: &str = "rca_config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// KPI families the narrative walks, in reporting order.
    pub sections: Vec<String>,
    /// Segments whose change figures invert in presentation layers.
    pub sign_rules: Vec<SignRule>,
    /// How many drivers each chart series carries.
    pub top_n: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            sections: [
                "Handset Type",
                "Arpu Segment",
                "Usage Category",
                "Gb Slab",
                "Base Type",
                "Multisimmer",
                "Clustername",
                "Mou Slab",
                "Aon Bucket",
                "Vc User Category",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            sign_rules: vec![
                SignRule {
                    marker: "GP_MULTISIM".to_string(),
                    multiplier: -1.0,
                },
                SignRule {
                    marker: "ROBI_MULTISIM".to_string(),
                    multiplier: -1.0,
                },
            ],
            top_n: 10,
        }
    }
}

impl RunConfig {
    /// Read the config file when present, otherwise fall back to defaults.
    /// A file that exists but does not parse is a hard error: silently
    /// analyzing with defaults the user did not ask for is worse.
    pub fn load(path: &str) -> Result<RunConfig, RcaError> {
        if !Path::new(path).exists() {
            return Ok(RunConfig::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let cfg: RunConfig = serde_json::from_str(&raw)
            .map_err(|e| RcaError::Config(format!("{}: {}", path, e)))?;
        Ok(cfg)
    }

    /// Validate the sign rules into the shared business-view transform.
    pub fn business_view(&self) -> Result<BusinessView, RcaError> {
        BusinessView::new(self.sign_rules.clone())
    }
}
