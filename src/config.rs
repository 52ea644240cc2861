//! Generator configuration
//!
//! The recognized invocation options for a generation run. Components
//! read this record but never mutate it.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Options controlling a single generation run
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Emit unit names without the `_Def`/`_Dec` suffixes
    pub simple_naming: bool,
    /// Mark emitted type references for lazy evaluation (recursion escape)
    pub lazy: bool,
    /// Enable ws-addressing action URIs on operation stubs
    pub address: bool,
    /// Faster generation defaults with reduced output (implies `lazy`)
    pub fast: bool,
    /// Fail early on structurally weak definitions
    pub strict_schema: bool,
}

impl GeneratorConfig {
    /// Load a configuration record from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse a configuration record from a JSON string
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Effective lazy flag (`fast` implies `lazy`)
    pub fn effective_lazy(&self) -> bool {
        self.lazy || self.fast
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = GeneratorConfig::default();
        assert!(!cfg.simple_naming);
        assert!(!cfg.effective_lazy());
    }

    #[test]
    fn test_from_json() {
        let cfg = GeneratorConfig::from_json(r#"{"simple_naming": true, "fast": true}"#).unwrap();
        assert!(cfg.simple_naming);
        assert!(cfg.fast);
        assert!(cfg.effective_lazy());
        assert!(!cfg.strict_schema);
    }

    #[test]
    fn test_bad_json() {
        assert!(GeneratorConfig::from_json("{nope").is_err());
    }
}
