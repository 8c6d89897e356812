//! 反汇编
//!
//! 把已编译脚本渲染成可读清单；提供注册表时扩展指令显示为名字。

use std::fmt::Write;

use super::opcode::{Instruction, Op0, Op2, Segment};
use super::script::CompiledScript;
use crate::extensions::Extensions;
use crate::types::VarType;

pub struct Disassembler<'a> {
    script: &'a CompiledScript,
    extensions: Option<&'a Extensions>,
}

impl<'a> Disassembler<'a> {
    pub fn new(script: &'a CompiledScript) -> Self {
        Self {
            script,
            extensions: None,
        }
    }

    pub fn with_extensions(mut self, extensions: &'a Extensions) -> Self {
        self.extensions = Some(extensions);
        self
    }

    /// 完整清单：局部变量、字面量、代码
    pub fn render(&self) -> String {
        let mut out = String::new();
        let script = self.script;
        let _ = writeln!(out, "== {} ==", script.name());

        if !script.locals().is_empty() {
            let _ = writeln!(out, "locals:");
            for ty in VarType::ALL {
                for (slot, name) in script.locals().names(ty).iter().enumerate() {
                    let _ = writeln!(out, "  {ty:<5} [{slot}] {name}");
                }
            }
        }

        let literals = script.literals();
        if !literals.is_empty() {
            let _ = writeln!(out, "literals:");
            for (i, v) in literals.integers.iter().enumerate() {
                let _ = writeln!(out, "  int    [{i}] {v}");
            }
            for (i, v) in literals.floats.iter().enumerate() {
                let _ = writeln!(out, "  float  [{i}] {v:?}");
            }
            for (i, v) in literals.strings.iter().enumerate() {
                let _ = writeln!(out, "  string [{i}] {v:?}");
            }
        }

        let _ = writeln!(out, "code:");
        for pc in 0..script.code().len() {
            let _ = writeln!(out, "{}", self.instruction(pc));
        }
        out
    }

    /// 单条指令
    pub fn instruction(&self, pc: usize) -> String {
        let Some(&word) = self.script.code().get(pc) else {
            return format!("{pc:04}  <out of range>");
        };
        let instruction = match Instruction::decode(word) {
            Ok(instruction) => instruction,
            Err(_) => return format!("{pc:04}  .word {word:#010x}"),
        };

        let (mnemonic, detail) = match instruction {
            Instruction::Segment0 { op, arg } => (format!("{op:?} {arg}"), self.op0_detail(pc, op, arg)),
            Instruction::Segment1(op) => (format!("{op:?}"), None),
            Instruction::Segment2 { op, a, b } => {
                let ty = match op {
                    Op2::FetchMemberShort | Op2::StoreMemberShort => VarType::Short,
                    Op2::FetchMemberLong | Op2::StoreMemberLong => VarType::Long,
                    Op2::FetchMemberFloat | Op2::StoreMemberFloat => VarType::Float,
                };
                (
                    format!("{op:?} {a} {b}"),
                    Some(format!("{}->{} ({ty})", self.string(a), self.string(b))),
                )
            }
            Instruction::Extension { opcode, arg } => {
                let name = self
                    .extensions
                    .and_then(|ext| ext.name_of(opcode))
                    .unwrap_or("?");
                let detail = if opcode.segment == Segment::Three {
                    format!("{name} optional={arg}")
                } else {
                    name.to_string()
                };
                (format!("Call {opcode}"), Some(detail))
            }
        };

        match detail {
            Some(detail) => format!("{pc:04}  {mnemonic:<24} ; {detail}"),
            None => format!("{pc:04}  {mnemonic}"),
        }
    }

    fn op0_detail(&self, pc: usize, op: Op0, arg: u32) -> Option<String> {
        let literals = self.script.literals();
        let local = |ty: VarType| {
            self.script
                .locals()
                .names(ty)
                .get(arg as usize)
                .cloned()
                .unwrap_or_else(|| "?".to_string())
        };
        Some(match op {
            Op0::PushInt => literals.integer(arg).map_or("?".into(), |v| v.to_string()),
            Op0::PushFloat => literals.float(arg).map_or("?".into(), |v| format!("{v:?}")),
            Op0::PushString => format!("{:?}", self.string(arg)),
            Op0::FetchLocalShort | Op0::StoreLocalShort => local(VarType::Short),
            Op0::FetchLocalLong | Op0::StoreLocalLong => local(VarType::Long),
            Op0::FetchLocalFloat | Op0::StoreLocalFloat => local(VarType::Float),
            Op0::FetchGlobalShort
            | Op0::FetchGlobalLong
            | Op0::FetchGlobalFloat
            | Op0::StoreGlobalShort
            | Op0::StoreGlobalLong
            | Op0::StoreGlobalFloat => format!("global {}", self.string(arg)),
            Op0::JumpForward | Op0::JumpIfZero => format!("-> {:04}", pc + arg as usize),
            Op0::JumpBackward => match pc.checked_sub(arg as usize) {
                Some(target) => format!("-> {target:04}"),
                None => "-> ?".to_string(),
            },
        })
    }

    fn string(&self, index: u32) -> &str {
        self.script.literals().string(index).unwrap_or("?")
    }
}
