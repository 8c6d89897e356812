//! 语法树 → 字节码
//!
//! 表达式按静态类型选择整数或浮点指令，必要时插入转换；
//! 控制流使用占位跳转并在块结束时回填。

pub mod expr;
pub mod stmt;

use tracing::debug;

use crate::bytecode::{CodeBuffer, CompiledScript, LiteralPool};
use crate::compiler::diagnostics::{DiagnosticKind, ErrorHandler};
use crate::compiler::parser::{ScriptAst, Stmt};

pub struct CodeGenerator<'h> {
    pub(crate) code: CodeBuffer,
    pub(crate) literals: LiteralPool,
    errors: &'h mut ErrorHandler,
}

impl<'h> CodeGenerator<'h> {
    pub fn new(errors: &'h mut ErrorHandler) -> Self {
        Self {
            code: CodeBuffer::new(),
            literals: LiteralPool::new(),
            errors,
        }
    }

    /// 生成整个脚本；编码失败记录到诊断中，其余语句照常生成
    pub fn generate(mut self, ast: ScriptAst) -> CompiledScript {
        self.compile_block(&ast.body);
        let code = self.code.finish();
        debug!(
            target: "mwscript::compiler",
            name = %ast.name,
            words = code.len(),
            "Generated bytecode"
        );
        CompiledScript::new(ast.name, code, ast.locals, self.literals.finish())
    }

    pub(crate) fn compile_block(&mut self, body: &[Stmt]) {
        for stmt in body {
            if let Err(err) = stmt::compile_stmt(self, stmt) {
                self.errors
                    .error(DiagnosticKind::Encode(err), Some(stmt.location.clone()));
            }
        }
    }
}
