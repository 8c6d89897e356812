//! mwscript 语言的 token 词表

pub mod token_kind;

pub use token_kind::TokenKind;
