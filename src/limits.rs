// Front-end safety limits
//
// Caps the resources a single source file can consume before analysis:
// input size, token count, identifier and string literal lengths, parser
// recursion depth, and parse-tree size. All limits have permissive defaults
// and can be overridden from an optional project.toml.

use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct CompilerLimits {
    pub max_input_size: usize,        // source file size in bytes
    pub max_token_count: usize,       // tokens per file
    pub max_identifier_length: usize, // identifier length in bytes
    pub max_string_length: usize,     // string literal length in bytes
    pub max_expr_depth: usize,        // parser recursion depth
    pub max_ast_nodes: usize,         // parse-tree nodes per file
}

impl Default for CompilerLimits {
    fn default() -> Self {
        Self {
            max_input_size: 10_000_000, // 10 MB
            max_token_count: 100_000,
            max_identifier_length: 1_000,
            max_string_length: 1_000_000, // 1 MB
            max_expr_depth: 256,
            max_ast_nodes: 1_000_000,
        }
    }
}

impl CompilerLimits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load limits from a project.toml, falling back to defaults
    ///
    /// A missing file is not an error; malformed TOML is.
    pub fn from_project_toml<P: AsRef<Path>>(path: P) -> Result<Self, LimitError> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| LimitError {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;

        let config: ProjectConfig = toml::from_str(&content).map_err(|e| LimitError {
            message: format!("Failed to parse {}: {}", path.display(), e),
        })?;

        let defaults = Self::default();
        let overrides = config.limits.unwrap_or_default();

        Ok(Self {
            max_input_size: overrides.max_input_size.unwrap_or(defaults.max_input_size),
            max_token_count: overrides
                .max_token_count
                .unwrap_or(defaults.max_token_count),
            max_identifier_length: overrides
                .max_identifier_length
                .unwrap_or(defaults.max_identifier_length),
            max_string_length: overrides
                .max_string_length
                .unwrap_or(defaults.max_string_length),
            max_expr_depth: overrides.max_expr_depth.unwrap_or(defaults.max_expr_depth),
            max_ast_nodes: overrides.max_ast_nodes.unwrap_or(defaults.max_ast_nodes),
        })
    }

    /// Reject zero or absurdly large limits
    pub fn validate(&self) -> Result<(), LimitError> {
        const MAX_REASONABLE: usize = 100_000_000; // 100 MB

        if self.max_input_size == 0 || self.max_input_size > MAX_REASONABLE {
            return Err(LimitError::invalid("max_input_size", self.max_input_size));
        }
        if self.max_token_count == 0 {
            return Err(LimitError::invalid("max_token_count", self.max_token_count));
        }
        if self.max_identifier_length == 0 || self.max_identifier_length > 100_000 {
            return Err(LimitError::invalid(
                "max_identifier_length",
                self.max_identifier_length,
            ));
        }
        if self.max_string_length == 0 || self.max_string_length > MAX_REASONABLE {
            return Err(LimitError::invalid(
                "max_string_length",
                self.max_string_length,
            ));
        }
        if self.max_expr_depth == 0 || self.max_expr_depth > 10_000 {
            return Err(LimitError::invalid("max_expr_depth", self.max_expr_depth));
        }
        if self.max_ast_nodes == 0 || self.max_ast_nodes > 10_000_000 {
            return Err(LimitError::invalid("max_ast_nodes", self.max_ast_nodes));
        }

        Ok(())
    }
}

// TOML shape: a [limits] table with optional per-limit overrides
#[derive(Debug, Deserialize)]
struct ProjectConfig {
    limits: Option<LimitsConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct LimitsConfig {
    max_input_size: Option<usize>,
    max_token_count: Option<usize>,
    max_identifier_length: Option<usize>,
    max_string_length: Option<usize>,
    max_expr_depth: Option<usize>,
    max_ast_nodes: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct LimitError {
    pub message: String,
}

impl LimitError {
    fn invalid(name: &str, value: usize) -> Self {
        Self {
            message: format!(
                "Invalid limit '{}': {} (must be positive and reasonable)",
                name, value
            ),
        }
    }
}

impl std::fmt::Display for LimitError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Limit error: {}", self.message)
    }
}

impl std::error::Error for LimitError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits_are_reasonable() {
        let limits = CompilerLimits::default();
        assert!(limits.validate().is_ok());
    }

    #[test]
    fn test_validation_catches_zero_values() {
        let limits = CompilerLimits {
            max_token_count: 0,
            ..Default::default()
        };
        assert!(limits.validate().is_err());

        let limits = CompilerLimits {
            max_ast_nodes: 0,
            ..Default::default()
        };
        assert!(limits.validate().is_err());
    }

    #[test]
    fn test_validation_catches_too_large_values() {
        let limits = CompilerLimits {
            max_expr_depth: 20_000,
            ..Default::default()
        };
        assert!(limits.validate().is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let limits = CompilerLimits::from_project_toml("nonexistent.toml").unwrap();
        assert_eq!(limits.max_input_size, 10_000_000);
        assert_eq!(limits.max_expr_depth, 256);
    }

    #[test]
    fn test_partial_override() {
        let toml_content = r#"
[limits]
max_token_count = 5000
max_expr_depth = 64
"#;
        let temp_path = "/tmp/maru_test_limits.toml";
        fs::write(temp_path, toml_content).unwrap();

        let limits = CompilerLimits::from_project_toml(temp_path).unwrap();
        assert_eq!(limits.max_token_count, 5_000); // overridden
        assert_eq!(limits.max_expr_depth, 64); // overridden
        assert_eq!(limits.max_input_size, 10_000_000); // default

        let _ = fs::remove_file(temp_path);
    }

    #[test]
    fn test_malformed_toml_returns_error() {
        let temp_path = "/tmp/maru_test_malformed.toml";
        fs::write(temp_path, "this is not valid toml {{{").unwrap();

        let result = CompilerLimits::from_project_toml(temp_path);
        assert!(result.is_err());

        let _ = fs::remove_file(temp_path);
    }
}
