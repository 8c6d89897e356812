//! 代码缓冲区
//!
//! 平铺的 `Vec<u32>` 指令字，跳转使用相对偏移（相对跳转指令自身的地址）。
//! 前向跳转先写占位符，块结束时再回填。

use super::opcode::{EncodeError, Instruction, Op0, Op1};

/// 待回填的前向跳转
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a forward jump must be patched"]
pub struct JumpPatch {
    at: usize,
    op: Op0,
}

#[derive(Debug, Clone, Default)]
pub struct CodeBuffer {
    code: Vec<u32>,
}

impl CodeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入一条指令，返回其地址
    pub fn emit(&mut self, instruction: Instruction) -> Result<usize, EncodeError> {
        let word = instruction.encode()?;
        self.code.push(word);
        Ok(self.code.len() - 1)
    }

    pub fn emit_op0(&mut self, op: Op0, arg: u32) -> Result<usize, EncodeError> {
        self.emit(Instruction::Segment0 { op, arg })
    }

    pub fn emit_op1(&mut self, op: Op1) -> Result<usize, EncodeError> {
        self.emit(Instruction::Segment1(op))
    }

    /// 写入跳转指令 (占位，稍后 patch)
    pub fn emit_jump(&mut self, op: Op0) -> Result<JumpPatch, EncodeError> {
        let at = self.emit_op0(op, 0)?;
        Ok(JumpPatch { at, op })
    }

    /// 让占位跳转指向当前位置
    pub fn patch_jump(&mut self, patch: JumpPatch) -> Result<(), EncodeError> {
        let offset = (self.code.len() - patch.at) as u32;
        self.code[patch.at] = Instruction::Segment0 {
            op: patch.op,
            arg: offset,
        }
        .encode()?;
        Ok(())
    }

    /// 写入循环跳转 (负向跳转)
    pub fn emit_loop(&mut self, loop_start: usize) -> Result<usize, EncodeError> {
        let offset = (self.code.len() - loop_start) as u32;
        self.emit_op0(Op0::JumpBackward, offset)
    }

    /// 获取当前代码位置 (用于计算跳转)
    pub fn current_offset(&self) -> usize {
        self.code.len()
    }

    pub fn finish(self) -> Vec<u32> {
        self.code
    }
}
