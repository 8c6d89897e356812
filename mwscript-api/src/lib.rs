//! mwscript API - Execution orchestration layer
//!
//! Provides the unified compile/execute interface, including:
//! - Execution flow orchestration ([`Toolchain`])
//! - Configuration abstraction ([`RunConfig`])
//! - Unified error handling ([`ScriptError`], [`ErrorReport`])
//!
//! Configuration is passed explicitly; there is no global state.

use std::sync::Arc;

use tracing::{debug, info};

use mwscript_core::extensions::{install_script_control, register_standard};
use mwscript_core::{
    binary, CompiledScript, CompilerContext, Context, Disassembler, ErrorHandler, Extensions,
    Interpreter, MemoryContext, ScriptCompiler,
};

pub mod config;
pub mod error;
pub mod types;

pub use config::RunConfig;
pub use error::{DiagnosticReport, ErrorReport, ScriptError};
pub use types::{CompileOutput, ExecuteOutput, RunOutput};

// Re-export config and core
pub use mwscript_config::{CompilerConfig, LimitConfig, Phase, WarningsMode};
pub use mwscript_core;

/// Compile with explicit configuration
///
/// Fails when the compile records any error; warnings are returned in the
/// output (or dropped/escalated according to `config.compiler.warnings`).
pub fn compile_with_config(
    source: &str,
    context: &dyn CompilerContext,
    extensions: &Extensions,
    config: &RunConfig,
) -> Result<CompileOutput, ScriptError> {
    info!(target: "mwscript::api", bytes = source.len(), "Starting compilation");

    let mut errors = ErrorHandler::with_warnings_mode(config.compiler.warnings);
    let script = ScriptCompiler::new(context, extensions)
        .compile(source, &mut errors)
        .map_err(|e| ScriptError::Unrecoverable(e.diagnostic().clone()))?;

    if !errors.is_good() {
        let diagnostics: Vec<_> = errors.errors().cloned().collect();
        info!(target: "mwscript::api", errors = diagnostics.len(), "Compilation failed");
        return Err(ScriptError::Compile { diagnostics });
    }

    let listing = config
        .dump_bytecode
        .then(|| Disassembler::new(&script).with_extensions(extensions).render());
    debug!(
        target: "mwscript::api",
        name = script.name(),
        instructions = script.code().len(),
        warnings = errors.warning_count(),
        "Compilation completed"
    );

    Ok(CompileOutput {
        script,
        warnings: errors.warnings().cloned().collect(),
        listing,
    })
}

/// Execute a compiled script against a runtime context
pub fn execute_with_config(
    script: &CompiledScript,
    extensions: Arc<Extensions>,
    context: &mut dyn Context,
    config: &RunConfig,
) -> Result<ExecuteOutput, ScriptError> {
    info!(target: "mwscript::api", name = script.name(), "Starting execution");
    let outcome = Interpreter::with_limits(extensions, config.limits.clone()).run(script, context)?;
    info!(target: "mwscript::api", ?outcome, "Execution completed");
    Ok(ExecuteOutput {
        script: script.name().to_string(),
        outcome,
    })
}

/// Load a compiled script from a binary container
pub fn load(bytes: &[u8]) -> Result<CompiledScript, ScriptError> {
    let script = binary::decode(bytes)?;
    debug!(target: "mwscript::api", name = script.name(), "Loaded compiled script");
    Ok(script)
}

/// Registry with the standard extension names and script-control handlers
pub fn standard_extensions() -> Result<Extensions, ScriptError> {
    let mut extensions = Extensions::new();
    register_standard(&mut extensions)?;
    install_script_control(&mut extensions)?;
    Ok(extensions)
}

/// Compiler context, extension registry and configuration bundled together
pub struct Toolchain {
    context: Box<dyn CompilerContext>,
    extensions: Arc<Extensions>,
    config: RunConfig,
}

impl Toolchain {
    pub fn new(
        context: impl CompilerContext + 'static,
        extensions: Arc<Extensions>,
        config: RunConfig,
    ) -> Self {
        Self {
            context: Box::new(context),
            extensions,
            config,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn extensions(&self) -> &Arc<Extensions> {
        &self.extensions
    }

    pub fn compile(&self, source: &str) -> Result<CompileOutput, ScriptError> {
        compile_with_config(source, self.context.as_ref(), &self.extensions, &self.config)
    }

    pub fn execute(
        &self,
        script: &CompiledScript,
        context: &mut dyn Context,
    ) -> Result<ExecuteOutput, ScriptError> {
        execute_with_config(script, Arc::clone(&self.extensions), context, &self.config)
    }

    /// Compile and run once in a fresh [`MemoryContext`]
    ///
    /// `prepare` runs before execution, e.g. to define globals.
    pub fn run(
        &self,
        source: &str,
        prepare: impl FnOnce(&mut MemoryContext),
    ) -> Result<RunOutput, ScriptError> {
        let compiled = self.compile(source)?;
        let mut context = MemoryContext::new(&compiled.script);
        prepare(&mut context);
        let execution = self.execute(&compiled.script, &mut context)?;
        Ok(RunOutput {
            compiled,
            execution,
            context,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mwscript_core::{Data, RunOutcome, RuntimeFault, StaticCompilerContext, VarType};

    fn toolchain(config: RunConfig) -> Toolchain {
        let context = StaticCompilerContext::new().with_global("Day", VarType::Long);
        Toolchain::new(context, Arc::new(standard_extensions().unwrap()), config)
    }

    #[test]
    fn test_run_with_explicit_config() {
        let output = toolchain(RunConfig::default())
            .run("begin t\nshort x\nset x to Day * 2\nend", |ctx| {
                ctx.define_global("day", VarType::Long, Data::Integer(21))
            })
            .unwrap();
        assert_eq!(output.execution.outcome, RunOutcome::Completed);
        assert_eq!(output.execution.script, "t");
        assert_eq!(output.context.locals.shorts, vec![42]);
        assert!(output.compiled.listing.is_none());
    }

    #[test]
    fn test_compile_errors_are_batched() {
        let err = toolchain(RunConfig::default())
            .compile("begin t\nset y to 1\nfrobnicate\nend")
            .unwrap_err();
        match err {
            ScriptError::Compile { diagnostics } => assert_eq!(diagnostics.len(), 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unrecoverable() {
        let err = toolchain(RunConfig::default())
            .compile("not a script")
            .unwrap_err();
        assert!(matches!(err, ScriptError::Unrecoverable(_)));
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn test_strict_warnings_fail_compilation() {
        let source = "begin t\nshort x junk\nend";
        assert!(toolchain(RunConfig::default()).compile(source).is_ok());

        let mut config = RunConfig::default();
        config.compiler.warnings = WarningsMode::Strict;
        assert!(toolchain(config).compile(source).is_err());
    }

    #[test]
    fn test_dump_bytecode_keeps_listing() {
        let config = RunConfig {
            dump_bytecode: true,
            ..RunConfig::default()
        };
        let output = toolchain(config).compile("begin t\nshort x\nset x to 1\nend").unwrap();
        let listing = output.listing.unwrap();
        assert!(listing.contains("StoreLocalShort"));
    }

    #[test]
    fn test_runtime_fault_surfaces() {
        let err = toolchain(RunConfig::default())
            .run("begin t\nshort x\nset x to 1 / x\nend", |_| {})
            .unwrap_err();
        assert!(matches!(
            err,
            ScriptError::Runtime(RuntimeFault::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_load_roundtrip() {
        let chain = toolchain(RunConfig::default());
        let output = chain.compile("begin t\nfloat f\nset f to 0.5\nend").unwrap();
        let loaded = load(&binary::encode(&output.script)).unwrap();
        assert_eq!(loaded, output.script);
        assert!(matches!(load(b"junk"), Err(ScriptError::Decode(_))));
    }
}
