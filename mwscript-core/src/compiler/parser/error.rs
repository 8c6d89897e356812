use crate::compiler::diagnostics::{DiagnosticKind, Location};

/// 语法/语义错误，包含位置信息
///
/// 解析函数以 `?` 向上传播；行级入口捕获后记入 `ErrorHandler` 并跳到下一行。
#[derive(Debug, Clone, PartialEq)]
pub struct ParserError {
    pub kind: DiagnosticKind,
    pub location: Location,
}

impl ParserError {
    pub fn new(kind: DiagnosticKind, location: Location) -> Self {
        Self { kind, location }
    }

    pub fn line(&self) -> usize {
        self.location.line
    }

    pub fn column(&self) -> usize {
        self.location.column
    }
}

impl std::fmt::Display for ParserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.location, self.kind)
    }
}

impl std::error::Error for ParserError {}

pub type ParseResult<T> = Result<T, ParserError>;
