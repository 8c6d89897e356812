//! 编译诊断
//!
//! 词法、语法、语义错误都记录到 [`ErrorHandler`]，编译继续进行；
//! 编译结束后以 `is_good()` 判定成败。只有缺少 `Begin` 这类无法继续的情况
//! 才走 [`CompileError::Unrecoverable`]。

use serde::Serialize;
use tracing::{debug, warn};

use crate::bytecode::EncodeError;
use crate::kit::lexer::{LexErrorKind, SourcePosition};
use mwscript_config::WarningsMode;

/// 诊断位置：行、列以及出错处的源码文本
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub literal: String,
}

impl Location {
    pub fn new(position: SourcePosition, literal: impl Into<String>) -> Self {
        Self {
            line: position.line,
            column: position.column,
            literal: literal.into(),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// 诊断所属的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticClass {
    Lexical,
    Syntax,
    Semantic,
    Codegen,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DiagnosticKind {
    // 词法
    #[error("{0}")]
    Lexical(LexErrorKind),

    // 语法
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },
    #[error("script does not start with 'begin'")]
    MissingBegin,
    #[error("script is missing 'end'")]
    MissingEnd,
    #[error("missing '{0}'")]
    MissingBlockEnd(&'static str),
    #[error("'{0}' without a matching block")]
    StrayBlockEnd(String),
    #[error("missing argument for '{0}'")]
    MissingArgument(String),
    #[error("string literal is not allowed here")]
    StringNotAllowed,

    // 语义
    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),
    #[error("unknown instruction or function '{0}'")]
    UnknownInstruction(String),
    #[error("'{0}' does not return a value")]
    NotAFunction(String),
    #[error("local variable '{0}' is declared twice")]
    DuplicateLocal(String),
    #[error("local variable '{0}' has the same name as a global variable")]
    LocalShadowsGlobal(String),
    #[error("local variables cannot be declared in this script")]
    LocalsNotAllowed,
    #[error("'{0}' is not a known reference")]
    UnknownReference(String),
    #[error("'{object}' has no member '{name}'")]
    UnknownMember { object: String, name: String },
    #[error("'{0}' cannot be called with an explicit reference")]
    NoExplicitReference(String),
    #[error("'{0}' is not a number")]
    NotANumber(String),

    // 代码生成
    #[error(transparent)]
    Encode(#[from] EncodeError),

    // 警告
    #[error("extra tokens ignored")]
    ExtraTokensIgnored,
    #[error("explicit reference '{object}' ignored for global '{name}'")]
    ExplicitReferenceIgnored { object: String, name: String },
    #[error("expression has no effect")]
    StrayExpression,
}

impl DiagnosticKind {
    pub fn class(&self) -> DiagnosticClass {
        use DiagnosticKind::*;
        match self {
            Lexical(_) => DiagnosticClass::Lexical,
            UnexpectedToken { .. }
            | MissingBegin
            | MissingEnd
            | MissingBlockEnd(_)
            | StrayBlockEnd(_)
            | MissingArgument(_)
            | StringNotAllowed
            | ExtraTokensIgnored
            | StrayExpression => DiagnosticClass::Syntax,
            Encode(_) => DiagnosticClass::Codegen,
            _ => DiagnosticClass::Semantic,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub location: Option<Location>,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        match &self.location {
            Some(loc) => write!(f, "{label} at {loc}: {}", self.kind),
            None => write!(f, "{label}: {}", self.kind),
        }
    }
}

/// 诊断收集器
#[derive(Debug, Clone, Default)]
pub struct ErrorHandler {
    diagnostics: Vec<Diagnostic>,
    mode: WarningsMode,
}

impl ErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_warnings_mode(mode: WarningsMode) -> Self {
        Self {
            diagnostics: Vec::new(),
            mode,
        }
    }

    pub fn set_warnings_mode(&mut self, mode: WarningsMode) {
        self.mode = mode;
    }

    pub fn error(&mut self, kind: DiagnosticKind, location: Option<Location>) {
        debug!(target: "mwscript::compiler", %kind, ?location, "Compile error");
        self.diagnostics.push(Diagnostic {
            severity: Severity::Error,
            kind,
            location,
        });
    }

    /// 按警告模式记录：Ignore 丢弃，Strict 升级为错误
    pub fn warning(&mut self, kind: DiagnosticKind, location: Option<Location>) {
        let severity = match self.mode {
            WarningsMode::Ignore => return,
            WarningsMode::Report => Severity::Warning,
            WarningsMode::Strict => Severity::Error,
        };
        warn!(target: "mwscript::compiler", %kind, ?location, "Compile warning");
        self.diagnostics.push(Diagnostic {
            severity,
            kind,
            location,
        });
    }

    /// 没有任何错误
    pub fn is_good(&self) -> bool {
        self.error_count() == 0
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// 清空诊断，保留警告模式
    pub fn reset(&mut self) {
        self.diagnostics.clear();
    }
}

/// 无法继续编译的错误
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("unrecoverable: {0}")]
    Unrecoverable(Diagnostic),
}

impl CompileError {
    pub fn diagnostic(&self) -> &Diagnostic {
        match self {
            CompileError::Unrecoverable(d) => d,
        }
    }
}
