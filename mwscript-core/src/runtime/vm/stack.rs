//! 单次运行的状态：值栈、程序计数器、停止标志
//!
//! 扩展处理函数通过 [`Runtime`] 弹出参数、压入结果、访问上下文。

use crate::bytecode::CompiledScript;
use crate::runtime::context::Context;
use crate::runtime::error::RuntimeFault;
use crate::runtime::value::Data;
use crate::types::ValueType;

pub struct Runtime<'a> {
    script: &'a CompiledScript,
    context: &'a mut dyn Context,
    stack: Vec<Data>,
    max_stack: usize,
    /// 下一条要执行的指令
    pc: usize,
    /// 正在执行的指令
    current: usize,
    stopped: bool,
}

impl<'a> Runtime<'a> {
    pub(crate) fn new(
        script: &'a CompiledScript,
        context: &'a mut dyn Context,
        max_stack: usize,
        initial_capacity: usize,
    ) -> Self {
        Self {
            script,
            context,
            stack: Vec::with_capacity(initial_capacity.min(max_stack)),
            max_stack,
            pc: 0,
            current: 0,
            stopped: false,
        }
    }

    // ==================== 栈操作 ====================

    pub fn push(&mut self, value: Data) -> Result<(), RuntimeFault> {
        if self.stack.len() >= self.max_stack {
            return Err(RuntimeFault::StackOverflow {
                pc: self.current,
                limit: self.max_stack,
            });
        }
        self.stack.push(value);
        Ok(())
    }

    pub fn push_integer(&mut self, value: i32) -> Result<(), RuntimeFault> {
        self.push(Data::Integer(value))
    }

    pub fn push_float(&mut self, value: f32) -> Result<(), RuntimeFault> {
        self.push(Data::Float(value))
    }

    pub fn pop(&mut self) -> Result<Data, RuntimeFault> {
        self.stack
            .pop()
            .ok_or(RuntimeFault::StackUnderflow { pc: self.current })
    }

    pub fn pop_integer(&mut self) -> Result<i32, RuntimeFault> {
        match self.pop()? {
            Data::Integer(v) => Ok(v),
            Data::Float(_) => Err(self.type_mismatch(ValueType::Integer)),
        }
    }

    pub fn pop_float(&mut self) -> Result<f32, RuntimeFault> {
        match self.pop()? {
            Data::Float(v) => Ok(v),
            Data::Integer(_) => Err(self.type_mismatch(ValueType::Float)),
        }
    }

    /// 弹出字符串参数（栈上是字面量索引）
    pub fn pop_string(&mut self) -> Result<&'a str, RuntimeFault> {
        let index = self.pop_integer()?;
        let index = u32::try_from(index).map_err(|_| RuntimeFault::BadLiteral {
            pc: self.current,
            kind: "string",
            index: i64::from(index),
        })?;
        self.string_literal(index)
    }

    /// 查看距栈顶 depth 处的值（0 为栈顶）
    pub fn peek(&self, depth: usize) -> Result<Data, RuntimeFault> {
        self.stack
            .len()
            .checked_sub(depth + 1)
            .map(|i| self.stack[i])
            .ok_or(RuntimeFault::StackUnderflow { pc: self.current })
    }

    pub(crate) fn peek_mut(&mut self, depth: usize) -> Result<&mut Data, RuntimeFault> {
        let pc = self.current;
        match self.stack.len().checked_sub(depth + 1) {
            Some(i) => Ok(&mut self.stack[i]),
            None => Err(RuntimeFault::StackUnderflow { pc }),
        }
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    // ==================== 字面量 ====================

    pub fn string_literal(&self, index: u32) -> Result<&'a str, RuntimeFault> {
        self.script
            .literals()
            .string(index)
            .ok_or(RuntimeFault::BadLiteral {
                pc: self.current,
                kind: "string",
                index: i64::from(index),
            })
    }

    pub(crate) fn integer_literal(&self, index: u32) -> Result<i32, RuntimeFault> {
        self.script
            .literals()
            .integer(index)
            .ok_or(RuntimeFault::BadLiteral {
                pc: self.current,
                kind: "integer",
                index: i64::from(index),
            })
    }

    pub(crate) fn float_literal(&self, index: u32) -> Result<f32, RuntimeFault> {
        self.script
            .literals()
            .float(index)
            .ok_or(RuntimeFault::BadLiteral {
                pc: self.current,
                kind: "float",
                index: i64::from(index),
            })
    }

    // ==================== 控制 ====================

    pub fn context(&mut self) -> &mut dyn Context {
        &mut *self.context
    }

    pub fn script_name(&self) -> &'a str {
        self.script.name()
    }

    /// 请求停止：当前指令完成后不再执行任何指令
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// 正在执行的指令地址
    pub fn pc(&self) -> usize {
        self.current
    }

    /// 取出下一条指令的地址并前进
    pub(crate) fn advance(&mut self) -> usize {
        self.current = self.pc;
        self.pc += 1;
        self.current
    }

    pub(crate) fn jump_to(&mut self, target: usize) {
        self.pc = target;
    }

    pub(crate) fn next_pc(&self) -> usize {
        self.pc
    }

    pub(crate) fn type_mismatch(&self, expected: ValueType) -> RuntimeFault {
        RuntimeFault::TypeMismatch {
            pc: self.current,
            expected,
        }
    }
}
