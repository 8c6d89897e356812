//! mwscript Config - Pure configuration data structures
//!
//! This crate contains only data structures, no logic or global state.
//! It serves as the shared configuration vocabulary across all mwscript crates.

use serde::{Deserialize, Serialize};

/// How the compiler treats warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningsMode {
    /// Drop warnings silently
    Ignore,
    /// Keep warnings next to errors (they never fail a compile)
    #[default]
    Report,
    /// Record every warning as an error
    Strict,
}

/// Configuration for compiler behavior
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Warning handling
    pub warnings: WarningsMode,
}

/// Configuration for execution limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitConfig {
    /// Maximum stack size
    pub max_stack_size: usize,
    /// Stack capacity reserved when a run starts
    pub initial_stack_capacity: usize,
}

/// Execution phase enum for phase-specific configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Lexer,
    Parser,
    Compiler,
    Vm,
}

impl Phase {
    /// All phases, in pipeline order
    pub const ALL: [Phase; 4] = [Phase::Lexer, Phase::Parser, Phase::Compiler, Phase::Vm];

    /// Get the string name of the phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Lexer => "lexer",
            Phase::Parser => "parser",
            Phase::Compiler => "compiler",
            Phase::Vm => "vm",
        }
    }

    /// Get the log target name for this phase
    pub fn target(&self) -> String {
        format!("mwscript::{}", self.as_str())
    }
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_stack_size: 1024,
            initial_stack_capacity: 32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_compiler_config() {
        let cfg = CompilerConfig::default();
        assert_eq!(cfg.warnings, WarningsMode::Report);
    }

    #[test]
    fn test_default_limit_config() {
        let cfg = LimitConfig::default();
        assert_eq!(cfg.max_stack_size, 1024);
        assert_eq!(cfg.initial_stack_capacity, 32);
    }

    #[test]
    fn test_phase_as_str() {
        assert_eq!(Phase::Lexer.as_str(), "lexer");
        assert_eq!(Phase::Vm.target(), "mwscript::vm");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: LimitConfig = serde_json::from_str(r#"{ "max_stack_size": 16 }"#).unwrap();
        assert_eq!(cfg.max_stack_size, 16);
        assert_eq!(cfg.initial_stack_capacity, 32);

        let cfg: CompilerConfig = serde_json::from_str(r#"{ "warnings": "strict" }"#).unwrap();
        assert_eq!(cfg.warnings, WarningsMode::Strict);
    }
}
