pub mod error;
pub mod expr;
pub mod parser;
pub mod stmt;

// 重新导出常用类型
pub use error::{ParseResult, ParserError};
pub use expr::{BinaryOp, Call, CallArg, Expr, ExprKind, Target};
pub use parser::Parser;
pub use stmt::{ScriptAst, Stmt, StmtKind};
