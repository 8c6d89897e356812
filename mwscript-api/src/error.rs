//! API 错误类型
//!
//! 提供统一的错误类型和结构化错误报告。

use serde::Serialize;
use thiserror::Error;

use mwscript_core::binary::DecodeError;
use mwscript_core::compiler::{Diagnostic, DiagnosticClass, Severity};
use mwscript_core::extensions::RegistryError;
use mwscript_core::RuntimeFault;

/// mwscript 错误类型
#[derive(Error, Debug, Clone)]
pub enum ScriptError {
    /// 无法继续的编译错误（如缺少 `Begin`）
    #[error("{0}")]
    Unrecoverable(Diagnostic),

    /// 编译结束时记录了错误；`diagnostics` 只含错误，按出现顺序
    #[error("compilation failed with {} error(s)", diagnostics.len())]
    Compile { diagnostics: Vec<Diagnostic> },

    /// 二进制容器无法读取
    #[error("cannot load compiled script: {0}")]
    Decode(#[from] DecodeError),

    /// 扩展注册失败
    #[error("extension registry: {0}")]
    Registry(#[from] RegistryError),

    /// 运行时故障
    #[error("runtime fault: {0}")]
    Runtime(#[from] RuntimeFault),
}

impl ScriptError {
    /// 第一条带位置的诊断
    fn first_diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            ScriptError::Unrecoverable(d) => Some(d),
            ScriptError::Compile { diagnostics } => diagnostics.first(),
            _ => None,
        }
    }

    /// 获取错误行号（如果有）
    pub fn line(&self) -> Option<usize> {
        self.first_diagnostic()
            .and_then(|d| d.location.as_ref())
            .map(|loc| loc.line)
    }

    /// 获取错误列号（如果有）
    pub fn column(&self) -> Option<usize> {
        self.first_diagnostic()
            .and_then(|d| d.location.as_ref())
            .map(|loc| loc.column)
    }

    /// 获取错误阶段名称
    pub fn phase(&self) -> &'static str {
        match self {
            ScriptError::Unrecoverable(d) => class_phase(d.kind.class()),
            ScriptError::Compile { diagnostics } => diagnostics
                .first()
                .map(|d| class_phase(d.kind.class()))
                .unwrap_or("compiler"),
            ScriptError::Decode(_) => "loader",
            ScriptError::Registry(_) => "registry",
            ScriptError::Runtime(_) => "vm",
        }
    }

    /// 转换为结构化错误报告
    ///
    /// CLI 可以直接打印，上层应用可以序列化为 JSON。
    pub fn to_report(&self) -> ErrorReport {
        let diagnostics = match self {
            ScriptError::Unrecoverable(d) => vec![DiagnosticReport::from(d)],
            ScriptError::Compile { diagnostics } => {
                diagnostics.iter().map(DiagnosticReport::from).collect()
            }
            _ => Vec::new(),
        };
        let error_kind = match self {
            ScriptError::Unrecoverable(d) => variant_name(&d.kind),
            ScriptError::Compile { diagnostics } => diagnostics
                .first()
                .map(|d| variant_name(&d.kind))
                .unwrap_or_else(|| "CompileError".to_string()),
            ScriptError::Decode(e) => variant_name(e),
            ScriptError::Registry(e) => variant_name(e),
            ScriptError::Runtime(e) => variant_name(e),
        };
        let message = match self.first_diagnostic() {
            Some(d) => d.kind.to_string(),
            None => self.to_string(),
        };
        ErrorReport {
            phase: self.phase(),
            line: self.line(),
            column: self.column(),
            error_kind,
            message,
            diagnostics,
        }
    }
}

fn class_phase(class: DiagnosticClass) -> &'static str {
    match class {
        DiagnosticClass::Lexical => "lexer",
        DiagnosticClass::Syntax | DiagnosticClass::Semantic => "parser",
        DiagnosticClass::Codegen => "compiler",
    }
}

/// `Debug` 输出中的变体名（去掉负载）
fn variant_name(value: &impl std::fmt::Debug) -> String {
    let debug = format!("{value:?}");
    debug
        .split(|c: char| c == '(' || c == ' ' || c == '{')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// 结构化错误报告
///
/// 上层应用（CLI、Web、LSP）可以根据自己的需求格式化。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    /// 错误阶段: lexer, parser, compiler, loader, registry, vm
    pub phase: &'static str,
    /// 错误行号（1-based，如果有）
    pub line: Option<usize>,
    /// 错误列号（1-based，如果有）
    pub column: Option<usize>,
    /// 错误类型（可用于程序化处理）
    pub error_kind: String,
    /// 人类可读的错误消息
    pub message: String,
    /// 全部编译诊断
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<DiagnosticReport>,
}

/// 单条诊断的报告形式
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticReport {
    pub severity: Severity,
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub message: String,
}

impl From<&Diagnostic> for DiagnosticReport {
    fn from(d: &Diagnostic) -> Self {
        Self {
            severity: d.severity,
            line: d.location.as_ref().map(|loc| loc.line),
            column: d.location.as_ref().map(|loc| loc.column),
            message: d.kind.to_string(),
        }
    }
}

impl std::fmt::Display for ErrorReport {
    /// 默认的 CLI 友好格式
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(col)) => {
                write!(f, "[{}:{}] {} error: {}", line, col, self.phase, self.message)
            }
            _ => write!(f, "[{}] error: {}", self.phase, self.message),
        }
    }
}

impl ErrorReport {
    /// 转换为 JSON 格式（Web API 使用）
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// 简洁格式（适合终端）
    pub fn to_short(&self) -> String {
        format!("{}: {}", self.phase, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mwscript_core::compiler::{DiagnosticKind, Location};

    fn diagnostic(kind: DiagnosticKind, line: usize, column: usize) -> Diagnostic {
        Diagnostic {
            severity: Severity::Error,
            kind,
            location: Some(Location {
                line,
                column,
                literal: "x".into(),
            }),
        }
    }

    #[test]
    fn test_compile_error_line_column() {
        let err = ScriptError::Compile {
            diagnostics: vec![
                diagnostic(DiagnosticKind::UnknownIdentifier("x".into()), 3, 7),
                diagnostic(DiagnosticKind::MissingEnd, 9, 1),
            ],
        };
        assert_eq!(err.line(), Some(3));
        assert_eq!(err.column(), Some(7));
        assert_eq!(err.phase(), "parser");
        assert_eq!(err.to_string(), "compilation failed with 2 error(s)");
    }

    #[test]
    fn test_runtime_error_has_no_location() {
        let err = ScriptError::Runtime(RuntimeFault::DivisionByZero { pc: 4 });
        assert_eq!(err.line(), None);
        assert_eq!(err.phase(), "vm");

        let report = err.to_report();
        assert_eq!(report.error_kind, "DivisionByZero");
        assert_eq!(report.message, "runtime fault: division by zero at instruction 4");
        assert_eq!(report.to_string(), "[vm] error: runtime fault: division by zero at instruction 4");
    }

    #[test]
    fn test_report_display_with_location() {
        let err = ScriptError::Unrecoverable(diagnostic(DiagnosticKind::MissingBegin, 1, 1));
        let report = err.to_report();
        assert_eq!(report.error_kind, "MissingBegin");
        assert_eq!(
            report.to_string(),
            "[1:1] parser error: script does not start with 'begin'"
        );
        assert_eq!(report.to_short(), "parser: script does not start with 'begin'");
    }

    #[test]
    fn test_report_to_json() {
        let err = ScriptError::Compile {
            diagnostics: vec![diagnostic(DiagnosticKind::NotANumber("big \"x\"".into()), 2, 10)],
        };
        let value: serde_json::Value = serde_json::from_str(&err.to_report().to_json()).unwrap();
        assert_eq!(value["phase"], "parser");
        assert_eq!(value["line"], 2);
        assert_eq!(value["error_kind"], "NotANumber");
        assert_eq!(value["diagnostics"][0]["severity"], "error");
        assert_eq!(value["diagnostics"][0]["message"], "'big \"x\"' is not a number");
    }

    #[test]
    fn test_report_json_null_values() {
        let err = ScriptError::Decode(DecodeError::InvalidOffset);
        let value: serde_json::Value = serde_json::from_str(&err.to_report().to_json()).unwrap();
        assert_eq!(value["phase"], "loader");
        assert!(value["line"].is_null());
        assert!(value.get("diagnostics").is_none());
    }
}
