//! 编译器：源码 → 词法 → 语法树 → 字节码

pub mod codegen;
pub mod context;
pub mod diagnostics;
pub mod lexer;
pub mod parser;

pub use context::{CompilerContext, StaticCompilerContext};
pub use diagnostics::{
    CompileError, Diagnostic, DiagnosticClass, DiagnosticKind, ErrorHandler, Location, Severity,
};

use tracing::debug;

use crate::bytecode::CompiledScript;
use crate::extensions::Extensions;
use codegen::CodeGenerator;
use parser::Parser;

/// 脚本编译器
///
/// 诊断累积在调用方提供的 [`ErrorHandler`] 中；返回 `Ok` 只表示没有遇到
/// 无法继续的错误，编译是否成功以 `errors.is_good()` 为准。
pub struct ScriptCompiler<'a> {
    context: &'a dyn CompilerContext,
    extensions: &'a Extensions,
}

impl<'a> ScriptCompiler<'a> {
    pub fn new(context: &'a dyn CompilerContext, extensions: &'a Extensions) -> Self {
        Self {
            context,
            extensions,
        }
    }

    pub fn compile(
        &self,
        source: &str,
        errors: &mut ErrorHandler,
    ) -> Result<CompiledScript, CompileError> {
        let ast = Parser::new(source, self.context, self.extensions, errors).parse()?;
        let script = CodeGenerator::new(errors).generate(ast);
        debug!(
            target: "mwscript::compiler",
            name = script.name(),
            errors = errors.error_count(),
            warnings = errors.warning_count(),
            "Compiled script"
        );
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{Instruction, Op0, Op1};
    use crate::extensions::{codes, register_standard};
    use crate::types::VarType;

    fn compile(source: &str) -> (CompiledScript, ErrorHandler) {
        let mut extensions = Extensions::new();
        register_standard(&mut extensions).unwrap();
        let context = StaticCompilerContext::new()
            .with_global("GameHour", VarType::Float)
            .with_id("player");
        let mut errors = ErrorHandler::new();
        let script = ScriptCompiler::new(&context, &extensions)
            .compile(source, &mut errors)
            .unwrap();
        (script, errors)
    }

    fn decoded(script: &CompiledScript) -> Vec<Instruction> {
        script
            .code()
            .iter()
            .map(|&word| Instruction::decode(word).unwrap())
            .collect()
    }

    #[test]
    fn test_store_inserts_conversion() {
        let (script, errors) = compile("begin test\nshort a\nset a to 2.5\nend");
        assert!(errors.is_good());
        assert_eq!(
            decoded(&script),
            vec![
                Instruction::Segment0 { op: Op0::PushFloat, arg: 0 },
                Instruction::Segment1(Op1::FloatToInt),
                Instruction::Segment0 { op: Op0::StoreLocalShort, arg: 0 },
            ]
        );
    }

    #[test]
    fn test_mixed_arithmetic_promotes() {
        let (script, _) = compile("begin test\nfloat f\nshort a\nset f to a + f\nend");
        let code = decoded(&script);
        assert_eq!(code[2], Instruction::Segment1(Op1::IntToFloatBelow));
        assert_eq!(code[3], Instruction::Segment1(Op1::AddFloat));
    }

    #[test]
    fn test_function_statement_result_discarded() {
        let (script, errors) = compile("begin test\nplayer->GetHealth\nend");
        assert!(errors.is_good());
        assert_eq!(
            decoded(&script),
            vec![
                Instruction::Segment0 { op: Op0::PushString, arg: 0 },
                Instruction::Extension { opcode: codes::GET_HEALTH_EXPLICIT, arg: 0 },
                Instruction::Segment1(Op1::Pop),
            ]
        );
        assert_eq!(script.literals().string(0), Some("player"));
    }

    #[test]
    fn test_optional_argument_count_encoded() {
        let (script, _) = compile("begin test\nMessageBox \"%f %f\" 1 2\nend");
        let code = decoded(&script);
        assert_eq!(
            code.last(),
            Some(&Instruction::Extension { opcode: codes::MESSAGE_BOX, arg: 2 })
        );
        // 第一个参数最后压入
        assert_eq!(code[code.len() - 2], Instruction::Segment0 { op: Op0::PushString, arg: 0 });
    }

    #[test]
    fn test_while_jumps() {
        let (script, _) = compile("begin test\nshort a\nwhile ( a < 3 )\nset a to a + 1\nendwhile\nend");
        let code = decoded(&script);
        let exit = code
            .iter()
            .position(|i| matches!(i, Instruction::Segment0 { op: Op0::JumpIfZero, .. }))
            .unwrap();
        assert_eq!(code[exit], Instruction::Segment0 { op: Op0::JumpIfZero, arg: (code.len() - exit) as u32 });
        assert_eq!(
            code.last(),
            Some(&Instruction::Segment0 { op: Op0::JumpBackward, arg: (code.len() - 1) as u32 })
        );
    }

    #[test]
    fn test_errors_still_return_script() {
        let (_, errors) = compile("begin test\nset nothing to 1\nend");
        assert!(!errors.is_good());
    }
}
