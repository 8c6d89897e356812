//! 字节码：指令字、字面量池、局部变量表与已编译脚本

pub mod chunk;
pub mod disasm;
pub mod literals;
pub mod locals;
pub mod opcode;
pub mod script;

pub use chunk::{CodeBuffer, JumpPatch};
pub use disasm::Disassembler;
pub use literals::{LiteralPool, Literals};
pub use locals::{DuplicateLocal, Locals};
pub use opcode::{
    EncodeError, Instruction, Op0, Op1, Op2, Opcode, Segment, UndefinedInstruction,
};
pub use script::CompiledScript;
