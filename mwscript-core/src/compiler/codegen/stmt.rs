//! 语句编译

use super::expr::{compile_call, compile_expr, emit_conversion};
use super::CodeGenerator;
use crate::bytecode::{EncodeError, Instruction, Op0, Op1, Op2};
use crate::compiler::parser::{Expr, Stmt, StmtKind, Target};

/// 编译语句
pub fn compile_stmt(gen: &mut CodeGenerator<'_>, stmt: &Stmt) -> Result<(), EncodeError> {
    match &stmt.kind {
        StmtKind::Set { target, value } => compile_set(gen, target, value)?,
        StmtKind::If {
            branches,
            otherwise,
        } => compile_if(gen, branches, otherwise.as_deref())?,
        StmtKind::While { condition, body } => {
            let loop_start = gen.code.current_offset();
            compile_expr(gen, condition)?;
            let exit = gen.code.emit_jump(Op0::JumpIfZero)?;
            gen.compile_block(body);
            gen.code.emit_loop(loop_start)?;
            gen.code.patch_jump(exit)?;
        }
        StmtKind::Call(call) => {
            compile_call(gen, call)?;
            // 函数作为语句时丢弃返回值
            if call.returns.is_some() {
                gen.code.emit_op1(Op1::Pop)?;
            }
        }
        StmtKind::Return => {
            gen.code.emit_op1(Op1::Return)?;
        }
    }
    Ok(())
}

fn compile_set(gen: &mut CodeGenerator<'_>, target: &Target, value: &Expr) -> Result<(), EncodeError> {
    compile_expr(gen, value)?;
    emit_conversion(gen, value.ty, target.var_type().value_type())?;
    match target {
        Target::Local { ty, slot } => {
            gen.code.emit_op0(Op0::store_local(*ty), *slot)?;
        }
        Target::Global { ty, name } => {
            let index = gen.literals.add_string(name);
            gen.code.emit_op0(Op0::store_global(*ty), index)?;
        }
        Target::Member { ty, object, name } => {
            let a = gen.literals.add_string(object);
            let b = gen.literals.add_string(name);
            gen.code.emit(Instruction::Segment2 {
                op: Op2::store_member(*ty),
                a,
                b,
            })?;
        }
    }
    Ok(())
}

/// 每个条件为假时跳到下一个分支；分支体末尾跳到整个链的结尾
fn compile_if(
    gen: &mut CodeGenerator<'_>,
    branches: &[(Expr, Vec<Stmt>)],
    otherwise: Option<&[Stmt]>,
) -> Result<(), EncodeError> {
    let mut end_jumps = Vec::with_capacity(branches.len());
    for (index, (condition, body)) in branches.iter().enumerate() {
        compile_expr(gen, condition)?;
        let next = gen.code.emit_jump(Op0::JumpIfZero)?;
        gen.compile_block(body);
        let is_last = index + 1 == branches.len() && otherwise.is_none();
        if !is_last {
            end_jumps.push(gen.code.emit_jump(Op0::JumpForward)?);
        }
        gen.code.patch_jump(next)?;
    }
    if let Some(body) = otherwise {
        gen.compile_block(body);
    }
    for jump in end_jumps {
        gen.code.patch_jump(jump)?;
    }
    Ok(())
}
