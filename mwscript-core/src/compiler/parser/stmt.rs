//! 语句语法树

use super::expr::{Call, Expr, Target};
use crate::bytecode::Locals;
use crate::compiler::diagnostics::Location;

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Set {
        target: Target,
        value: Expr,
    },
    /// `if`/`elseif` 分支按顺序排列
    If {
        branches: Vec<(Expr, Vec<Stmt>)>,
        otherwise: Option<Vec<Stmt>>,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    Call(Call),
    Return,
}

impl Stmt {
    pub fn new(kind: StmtKind, location: Location) -> Self {
        Self { kind, location }
    }
}

/// 整个脚本：`Begin name … End`
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptAst {
    pub name: String,
    pub locals: Locals,
    pub body: Vec<Stmt>,
}
