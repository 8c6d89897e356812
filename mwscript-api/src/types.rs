//! API 类型定义
//!
//! 编译和执行的输入输出类型。

use mwscript_core::compiler::Diagnostic;
use mwscript_core::{CompiledScript, RunOutcome};

/// 编译输出
#[derive(Debug)]
pub struct CompileOutput {
    /// 已编译脚本
    pub script: CompiledScript,
    /// 编译成功时保留的警告
    pub warnings: Vec<Diagnostic>,
    /// 反汇编清单（`dump_bytecode` 开启时）
    pub listing: Option<String>,
}

/// 执行输出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteOutput {
    /// 脚本名
    pub script: String,
    /// 结束方式
    pub outcome: RunOutcome,
}

/// 编译并执行一次的结果
#[derive(Debug)]
pub struct RunOutput {
    pub compiled: CompileOutput,
    pub execution: ExecuteOutput,
    /// 执行后的上下文状态
    pub context: mwscript_core::MemoryContext,
}
