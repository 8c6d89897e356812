//! 虚拟机实现
//!
//! 每次 [`Interpreter::run`] 都创建新的栈与程序计数器；已编译脚本只读，
//! 可被多个上下文反复执行。

use std::sync::Arc;

use mwscript_config::LimitConfig;
use tracing::debug;

use crate::bytecode::CompiledScript;
use crate::extensions::Extensions;
use crate::runtime::context::Context;
use crate::runtime::error::RuntimeFault;

mod execution;
mod operators;
mod stack;

pub use stack::Runtime;

/// 一次运行的结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// 执行到代码末尾或 `return`
    Completed,
    /// 处理函数请求了停止
    Stopped,
}

#[derive(Debug, Clone)]
pub struct Interpreter {
    extensions: Arc<Extensions>,
    limits: LimitConfig,
}

impl Interpreter {
    pub fn new(extensions: Arc<Extensions>) -> Self {
        Self::with_limits(extensions, LimitConfig::default())
    }

    pub fn with_limits(extensions: Arc<Extensions>, limits: LimitConfig) -> Self {
        Self { extensions, limits }
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// 执行脚本直到结束、`return` 或停止请求
    pub fn run(
        &self,
        script: &CompiledScript,
        context: &mut dyn Context,
    ) -> Result<RunOutcome, RuntimeFault> {
        debug!(
            target: "mwscript::vm",
            script = script.name(),
            instructions = script.code().len(),
            "Running script"
        );
        let mut runtime = Runtime::new(
            script,
            context,
            self.limits.max_stack_size,
            self.limits.initial_stack_capacity,
        );
        let result = execution::run(&mut runtime, script.code(), &self.extensions);
        match &result {
            Ok(outcome) => debug!(target: "mwscript::vm", ?outcome, "Script finished"),
            Err(fault) => debug!(target: "mwscript::vm", %fault, "Script faulted"),
        }
        result
    }
}
