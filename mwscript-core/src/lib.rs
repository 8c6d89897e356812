//! mwscript Core - compiler and virtual machine (pure logic, no IO)
//!
//! Contains the scanner, parser, code generator, extension registry,
//! bytecode container, and interpreter.
//! Only operates on in-memory data structures, no file IO or terminal output.
//!
//! Configuration is passed explicitly via parameters, not via global state.

pub mod binary;
pub mod bytecode;
pub mod compiler;
pub mod extensions;
pub mod kit;
pub mod runtime;
pub mod types;

// Re-export common types
pub use bytecode::{CompiledScript, Disassembler};
pub use compiler::{
    CompileError, CompilerContext, ErrorHandler, ScriptCompiler, StaticCompilerContext,
};
pub use extensions::Extensions;
pub use runtime::{Context, Data, Interpreter, MemoryContext, RunOutcome, RuntimeFault};
pub use types::{ValueType, VarType};

// Re-export config types from mwscript-config
pub use mwscript_config::{CompilerConfig, LimitConfig, Phase, WarningsMode};
