//! 测试辅助工具
//!
//! 提供端到端测试的编译与运行辅助函数

#![allow(dead_code)]

use std::sync::Arc;

use mwscript_core::extensions::{install_script_control, register_standard};
use mwscript_core::{
    CompileError, CompiledScript, Data, ErrorHandler, Extensions, Interpreter, MemoryContext,
    RunOutcome, RuntimeFault, ScriptCompiler, StaticCompilerContext, VarType,
};

/// 测试用的编译期环境：`player` 是对象 id，`GameHour` 是 float 全局变量
pub fn compiler_context() -> StaticCompilerContext {
    StaticCompilerContext::new()
        .with_id("player")
        .with_global("GameHour", VarType::Float)
}

/// 注册标准扩展并安装脚本控制处理函数
pub fn standard_extensions() -> Extensions {
    let mut extensions = Extensions::new();
    register_standard(&mut extensions).unwrap();
    install_script_control(&mut extensions).unwrap();
    extensions
}

/// 编译并返回脚本与诊断
pub fn compile_with(
    source: &str,
    extensions: &Extensions,
) -> (Result<CompiledScript, CompileError>, ErrorHandler) {
    let context = compiler_context();
    let mut errors = ErrorHandler::new();
    let result = ScriptCompiler::new(&context, extensions).compile(source, &mut errors);
    (result, errors)
}

/// 编译必须成功且没有错误
///
/// # Example
/// ```
/// let script = compile_ok("begin t\nshort a\nend t", &standard_extensions());
/// ```
pub fn compile_ok(source: &str, extensions: &Extensions) -> CompiledScript {
    let (result, errors) = compile_with(source, extensions);
    let script = result.unwrap_or_else(|e| panic!("unrecoverable: {e}"));
    assert!(
        errors.is_good(),
        "unexpected diagnostics: {:?}",
        errors.diagnostics()
    );
    script
}

/// 编译结果是否无错误
pub fn compiles(source: &str, extensions: &Extensions) -> bool {
    let (result, errors) = compile_with(source, extensions);
    result.is_ok() && errors.is_good()
}

/// 在给定上下文中运行
pub fn run_in(
    script: &CompiledScript,
    extensions: Arc<Extensions>,
    context: &mut MemoryContext,
) -> Result<RunOutcome, RuntimeFault> {
    Interpreter::new(extensions).run(script, context)
}

/// 读取局部变量的整数值
pub fn local_int(context: &MemoryContext, script: &CompiledScript, name: &str) -> i32 {
    context
        .locals
        .get_by_name(script.locals(), name)
        .unwrap_or_else(|| panic!("no local named {name}"))
        .as_integer()
}

/// 读取局部变量的浮点值
pub fn local_float(context: &MemoryContext, script: &CompiledScript, name: &str) -> f32 {
    match context.locals.get_by_name(script.locals(), name) {
        Some(Data::Float(value)) => value,
        other => panic!("local {name} is not a float: {other:?}"),
    }
}

/// 设置 short 局部变量
pub fn set_short(context: &mut MemoryContext, script: &CompiledScript, name: &str, value: i16) {
    match script.locals().search(name) {
        Some((VarType::Short, slot)) => context.locals.shorts[slot as usize] = value,
        other => panic!("no short named {name}: {other:?}"),
    }
}
