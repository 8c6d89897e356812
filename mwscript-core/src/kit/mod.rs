//! 可复用的基础组件

pub mod lexer;
