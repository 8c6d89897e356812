//! 运行时：值、上下文、故障与虚拟机

pub mod context;
pub mod error;
pub mod value;
pub mod vm;

pub use context::{Context, LocalVariables, MemoryContext};
pub use error::{ContextError, RuntimeFault};
pub use value::Data;
pub use vm::{Interpreter, RunOutcome, Runtime};
