//! Lexer 主入口
//!
//! 把 [`MwScanner`] 包装成惰性迭代器：每次调用 [`scan`] 得到一条新的序列，
//! 以一个 `Eof` token 结束。词法错误作为 `Err` 项产出，迭代继续。
//!
//! # 示例
//!
//! ```rust
//! use mwscript_core::kit::lexer::scan;
//! use mwscript_core::compiler::lexer::TokenKind;
//!
//! let kinds: Vec<TokenKind> = scan("set a to 1")
//!     .filter_map(Result::ok)
//!     .map(|t| t.kind)
//!     .collect();
//! assert_eq!(kinds.last(), Some(&TokenKind::Eof));
//! ```

use super::core::CharStream;
use super::error::LexError;
use super::mwscript::MwScanner;
use super::scanner::{ScanResult, Token};

use tracing::debug;

/// 词法分析迭代器
pub struct Lexer<'a> {
    scanner: MwScanner,
    stream: CharStream<'a>,
    finished: bool,
}

/// 从源码创建新的 token 序列
pub fn scan(source: &str) -> Lexer<'_> {
    Lexer::new(source)
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        debug!(target: "mwscript::lexer", bytes = source.len(), "Creating lexer");
        Self {
            scanner: MwScanner::new(),
            stream: CharStream::new(source),
            finished: false,
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.scanner.next_token(&mut self.stream) {
            ScanResult::Token(token) => Some(Ok(token)),
            ScanResult::Error(err) => Some(Err(err)),
            ScanResult::Eof => {
                self.finished = true;
                Some(Ok(Token::eof(self.stream.position())))
            }
        }
    }
}
