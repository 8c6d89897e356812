//! mwscript 词法分析器
//!
//! - O(n) 单遍扫描，无回溯
//! - 错误可恢复：报告后继续扫描
//! - 精准位置追踪（行、列、字节偏移）

pub mod core;
pub mod error;
pub mod lexer;
pub mod mwscript;
pub mod scanner;

pub use core::{CharStream, SourcePosition, SourceSpan};
pub use error::{LexError, LexErrorKind};
pub use lexer::{scan, Lexer};
pub use mwscript::MwScanner;
pub use scanner::{ScanResult, Token, TokenValue};
