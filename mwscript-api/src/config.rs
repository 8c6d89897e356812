//! API 层配置

use mwscript_config::{CompilerConfig, LimitConfig};
use serde::{Deserialize, Serialize};

/// Execution configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Whether to keep a disassembly listing of every compiled script
    pub dump_bytecode: bool,
    /// Compiler configuration
    pub compiler: CompilerConfig,
    /// Execution limits
    pub limits: LimitConfig,
}
