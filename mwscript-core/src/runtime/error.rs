//! 运行时错误
//!
//! 运行时故障对本次运行是致命的，不重试；已编译脚本不受影响。

use crate::bytecode::Opcode;
use crate::types::{ValueType, VarType};

/// 运行时上下文报告的错误
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContextError {
    #[error("no {ty} local in slot {slot}")]
    UnknownLocal { ty: VarType, slot: u32 },
    #[error("unknown global variable '{0}'")]
    UnknownGlobal(String),
    #[error("'{object}' has no member variable '{name}'")]
    UnknownMember { object: String, name: String },
    #[error("{0}")]
    Host(String),
}

/// 运行时故障
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeFault {
    #[error("stack underflow at instruction {pc}")]
    StackUnderflow { pc: usize },
    #[error("stack overflow at instruction {pc} (limit {limit})")]
    StackOverflow { pc: usize, limit: usize },
    #[error("undefined instruction word {word:#010x} at {pc}")]
    UndefinedInstruction { pc: usize, word: u32 },
    #[error("no handler installed for opcode {opcode} at {pc}")]
    MissingHandler { pc: usize, opcode: Opcode },
    #[error("jump from {pc} to {target} leaves the code (length {len})")]
    BadJump { pc: usize, target: i64, len: usize },
    #[error("{kind} literal {index} does not exist (instruction {pc})")]
    BadLiteral {
        pc: usize,
        kind: &'static str,
        index: i64,
    },
    #[error("expected {expected:?} on the stack at instruction {pc}")]
    TypeMismatch { pc: usize, expected: ValueType },
    #[error("division by zero at instruction {pc}")]
    DivisionByZero { pc: usize },
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error("{0}")]
    Host(String),
}

impl RuntimeFault {
    /// 宿主扩展报告失败
    pub fn host(message: impl Into<String>) -> Self {
        RuntimeFault::Host(message.into())
    }
}
