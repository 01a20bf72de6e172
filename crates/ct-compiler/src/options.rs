use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Assembler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssemblerOptions {
    /// Precision used by arithmetic relations that carry no `[p]` suffix.
    pub default_precision: f64,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            default_precision: 0.0,
        }
    }
}

impl AssemblerOptions {
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        let mut options: AssemblerOptions = serde_json::from_str(json)?;
        options.default_precision = options.default_precision.abs();
        Ok(options)
    }
}
