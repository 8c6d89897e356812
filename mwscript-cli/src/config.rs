//! CLI 配置
//!
//! 分阶段的日志级别

use mwscript_config::Phase;
use tracing_subscriber::filter::LevelFilter;

/// CLI 日志配置
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub global: LevelFilter,
    pub lexer: Option<LevelFilter>,
    pub parser: Option<LevelFilter>,
    pub compiler: Option<LevelFilter>,
    pub vm: Option<LevelFilter>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            global: LevelFilter::WARN,
            lexer: None,
            parser: None,
            compiler: None,
            vm: None,
        }
    }
}

impl LogConfig {
    /// Get log level for a specific phase
    pub fn level_for(&self, phase: Phase) -> LevelFilter {
        let level = match phase {
            Phase::Lexer => self.lexer,
            Phase::Parser => self.parser,
            Phase::Compiler => self.compiler,
            Phase::Vm => self.vm,
        };
        level.unwrap_or(self.global)
    }

    /// Apply a `phase=level` override
    pub fn set_phase(&mut self, spec: &str) -> Result<(), String> {
        let (phase, level) = spec
            .split_once('=')
            .ok_or_else(|| format!("expected PHASE=LEVEL, got '{spec}'"))?;
        let level = parse_level(level)?;
        let slot = match phase.trim().to_lowercase().as_str() {
            "lexer" => &mut self.lexer,
            "parser" => &mut self.parser,
            "compiler" => &mut self.compiler,
            "vm" => &mut self.vm,
            other => return Err(format!("unknown phase '{other}'")),
        };
        *slot = Some(level);
        Ok(())
    }
}

/// Parse log level string; "silent" is an alias of "off"
pub fn parse_level(s: &str) -> Result<LevelFilter, String> {
    match s.trim().to_lowercase().as_str() {
        "silent" => Ok(LevelFilter::OFF),
        other => other
            .parse()
            .map_err(|_| format!("unknown log level '{s}'")),
    }
}
