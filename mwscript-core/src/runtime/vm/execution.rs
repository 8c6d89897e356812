//! 虚拟机主循环与指令分派

use super::operators::{self, Flow};
use super::stack::Runtime;
use super::RunOutcome;
use crate::bytecode::{Instruction, Op0, Op2};
use crate::extensions::Extensions;
use crate::runtime::context::narrow;
use crate::runtime::error::RuntimeFault;
use crate::runtime::value::Data;
use crate::types::VarType;

#[cfg(feature = "trace_execution")]
use tracing::trace;

pub(super) fn run(
    runtime: &mut Runtime<'_>,
    code: &[u32],
    extensions: &Extensions,
) -> Result<RunOutcome, RuntimeFault> {
    loop {
        if runtime.is_stopped() {
            return Ok(RunOutcome::Stopped);
        }
        let Some(&word) = code.get(runtime.next_pc()) else {
            return Ok(RunOutcome::Completed);
        };
        let pc = runtime.advance();
        let instruction = Instruction::decode(word)
            .map_err(|_| RuntimeFault::UndefinedInstruction { pc, word })?;

        #[cfg(feature = "trace_execution")]
        trace!(
            target: "mwscript::vm",
            pc,
            ?instruction,
            depth = runtime.stack_depth(),
            "Execute"
        );

        match instruction {
            Instruction::Segment0 { op, arg } => execute_op0(runtime, op, arg, code.len())?,
            Instruction::Segment1(op) => {
                if operators::execute(runtime, op)? == Flow::Return {
                    return Ok(RunOutcome::Completed);
                }
            }
            Instruction::Segment2 { op, a, b } => execute_op2(runtime, op, a, b)?,
            Instruction::Extension { opcode, arg } => {
                let handler = extensions
                    .handler(opcode)
                    .ok_or(RuntimeFault::MissingHandler { pc, opcode })?;
                handler(runtime, arg)?;
            }
        }
    }
}

fn execute_op0(
    runtime: &mut Runtime<'_>,
    op: Op0,
    arg: u32,
    len: usize,
) -> Result<(), RuntimeFault> {
    match op {
        Op0::PushInt => {
            let value = runtime.integer_literal(arg)?;
            runtime.push_integer(value)
        }
        Op0::PushFloat => {
            let value = runtime.float_literal(arg)?;
            runtime.push_float(value)
        }
        Op0::PushString => {
            runtime.string_literal(arg)?;
            runtime.push_integer(arg as i32)
        }
        Op0::FetchLocalShort => fetch_local(runtime, VarType::Short, arg),
        Op0::FetchLocalLong => fetch_local(runtime, VarType::Long, arg),
        Op0::FetchLocalFloat => fetch_local(runtime, VarType::Float, arg),
        Op0::StoreLocalShort => store_local(runtime, VarType::Short, arg),
        Op0::StoreLocalLong => store_local(runtime, VarType::Long, arg),
        Op0::StoreLocalFloat => store_local(runtime, VarType::Float, arg),
        Op0::FetchGlobalShort => fetch_global(runtime, VarType::Short, arg),
        Op0::FetchGlobalLong => fetch_global(runtime, VarType::Long, arg),
        Op0::FetchGlobalFloat => fetch_global(runtime, VarType::Float, arg),
        Op0::StoreGlobalShort => store_global(runtime, VarType::Short, arg),
        Op0::StoreGlobalLong => store_global(runtime, VarType::Long, arg),
        Op0::StoreGlobalFloat => store_global(runtime, VarType::Float, arg),
        Op0::JumpForward => jump(runtime, i64::from(arg), len),
        Op0::JumpBackward => jump(runtime, -i64::from(arg), len),
        Op0::JumpIfZero => {
            if runtime.pop()?.is_zero() {
                jump(runtime, i64::from(arg), len)
            } else {
                Ok(())
            }
        }
    }
}

fn execute_op2(runtime: &mut Runtime<'_>, op: Op2, a: u32, b: u32) -> Result<(), RuntimeFault> {
    let object = runtime.string_literal(a)?;
    let name = runtime.string_literal(b)?;
    let (ty, store) = match op {
        Op2::FetchMemberShort => (VarType::Short, false),
        Op2::FetchMemberLong => (VarType::Long, false),
        Op2::FetchMemberFloat => (VarType::Float, false),
        Op2::StoreMemberShort => (VarType::Short, true),
        Op2::StoreMemberLong => (VarType::Long, true),
        Op2::StoreMemberFloat => (VarType::Float, true),
    };
    if store {
        let value = narrow(ty, runtime.pop()?);
        runtime.context().set_member(object, name, ty, value)?;
        Ok(())
    } else {
        let value = runtime.context().get_member(object, name, ty)?;
        runtime.push(typed(ty, value))
    }
}

/// 相对跳转；目标允许等于代码长度（即结束）
fn jump(runtime: &mut Runtime<'_>, offset: i64, len: usize) -> Result<(), RuntimeFault> {
    let pc = runtime.pc();
    let target = pc as i64 + offset;
    if target < 0 || target > len as i64 {
        return Err(RuntimeFault::BadJump { pc, target, len });
    }
    runtime.jump_to(target as usize);
    Ok(())
}

fn fetch_local(runtime: &mut Runtime<'_>, ty: VarType, slot: u32) -> Result<(), RuntimeFault> {
    let value = runtime.context().get_local(ty, slot)?;
    runtime.push(typed(ty, value))
}

fn store_local(runtime: &mut Runtime<'_>, ty: VarType, slot: u32) -> Result<(), RuntimeFault> {
    let value = narrow(ty, runtime.pop()?);
    runtime.context().set_local(ty, slot, value)?;
    Ok(())
}

fn fetch_global(runtime: &mut Runtime<'_>, ty: VarType, name: u32) -> Result<(), RuntimeFault> {
    let name = runtime.string_literal(name)?;
    let value = runtime.context().get_global(name, ty)?;
    runtime.push(typed(ty, value))
}

fn store_global(runtime: &mut Runtime<'_>, ty: VarType, name: u32) -> Result<(), RuntimeFault> {
    let name = runtime.string_literal(name)?;
    let value = narrow(ty, runtime.pop()?);
    runtime.context().set_global(name, ty, value)?;
    Ok(())
}

/// 上下文返回的值按变量类型打标签，保证栈上类型与编译期一致
fn typed(ty: VarType, value: Data) -> Data {
    match ty {
        VarType::Short | VarType::Long => Data::Integer(value.as_integer()),
        VarType::Float => Data::Float(value.as_float()),
    }
}
