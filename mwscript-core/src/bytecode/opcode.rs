//! 指令字编码
//!
//! 每条指令是一个 32 位字，高 3 位（31..29）选择段：
//!
//! | 段 | 用途 | 布局 |
//! |----|------|------|
//! | 0 | 内置，单操作数 | 操作码 5 位 (28..24)，操作数 24 位 |
//! | 1 | 内置，无操作数 | 操作码 29 位 |
//! | 2 | 内置，双操作数 | 操作码 5 位，操作数 A/B 各 12 位 |
//! | 3 | 扩展，带可选参数个数 | 操作码 21 位 (28..8)，个数 8 位 |
//! | 4 | 扩展，无操作数 | 操作码 29 位 |

use crate::types::VarType;
use serde::{Deserialize, Serialize};

const SEGMENT_SHIFT: u32 = 29;
const CODE29_MASK: u32 = (1 << 29) - 1;
const CODE5_SHIFT: u32 = 24;
const CODE5_MASK: u32 = 0x1f;

/// 段 0 操作数上限（24 位）
pub const MAX_OPERAND24: u32 = (1 << 24) - 1;
/// 段 2 操作数上限（12 位）
pub const MAX_OPERAND12: u32 = (1 << 12) - 1;
/// 段 3 可选参数个数上限（8 位）
pub const MAX_OPTIONAL_COUNT: u32 = 0xff;

/// 指令段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Segment {
    Zero = 0,
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
}

impl Segment {
    pub fn from_index(index: u32) -> Option<Segment> {
        match index {
            0 => Some(Segment::Zero),
            1 => Some(Segment::One),
            2 => Some(Segment::Two),
            3 => Some(Segment::Three),
            4 => Some(Segment::Four),
            _ => None,
        }
    }

    pub fn index(self) -> u32 {
        self as u32
    }

    /// 段 3、4 留给宿主扩展，其余为内置
    pub fn is_extension(self) -> bool {
        matches!(self, Segment::Three | Segment::Four)
    }

    /// 该段可容纳的最大操作码
    pub fn max_code(self) -> u32 {
        match self {
            Segment::Zero | Segment::Two => CODE5_MASK,
            Segment::One | Segment::Four => CODE29_MASK,
            Segment::Three => (1 << 21) - 1,
        }
    }
}

/// 扩展操作码：(段, 码)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Opcode {
    pub segment: Segment,
    pub code: u32,
}

impl Opcode {
    pub const fn new(segment: Segment, code: u32) -> Self {
        Self { segment, code }
    }

    /// 带可选参数的扩展
    pub const fn segment3(code: u32) -> Self {
        Self::new(Segment::Three, code)
    }

    /// 无操作数的扩展
    pub const fn segment4(code: u32) -> Self {
        Self::new(Segment::Four, code)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{:#x}", self.segment.index(), self.code)
    }
}

macro_rules! core_opcodes {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u32)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn from_code(code: u32) -> Option<$name> {
                Self::ALL.get(code as usize).copied()
            }

            pub fn code(self) -> u32 {
                self as u32
            }
        }
    };
}

core_opcodes! {
    /// 段 0：单操作数指令
    Op0 {
        PushInt,
        PushFloat,
        PushString,
        FetchLocalShort,
        FetchLocalLong,
        FetchLocalFloat,
        StoreLocalShort,
        StoreLocalLong,
        StoreLocalFloat,
        FetchGlobalShort,
        FetchGlobalLong,
        FetchGlobalFloat,
        StoreGlobalShort,
        StoreGlobalLong,
        StoreGlobalFloat,
        JumpForward,
        JumpBackward,
        JumpIfZero,
    }
}

core_opcodes! {
    /// 段 1：无操作数指令
    Op1 {
        AddInt,
        AddFloat,
        SubInt,
        SubFloat,
        MulInt,
        MulFloat,
        DivInt,
        DivFloat,
        NegateInt,
        NegateFloat,
        IntToFloat,
        FloatToInt,
        /// 转换栈顶之下的值
        IntToFloatBelow,
        FloatToIntBelow,
        EqualInt,
        NotEqualInt,
        LessInt,
        LessEqualInt,
        GreaterInt,
        GreaterEqualInt,
        EqualFloat,
        NotEqualFloat,
        LessFloat,
        LessEqualFloat,
        GreaterFloat,
        GreaterEqualFloat,
        Pop,
        Return,
    }
}

core_opcodes! {
    /// 段 2：双操作数指令（对象名、成员名的字面量索引）
    Op2 {
        FetchMemberShort,
        FetchMemberLong,
        FetchMemberFloat,
        StoreMemberShort,
        StoreMemberLong,
        StoreMemberFloat,
    }
}

impl Op0 {
    pub fn fetch_local(ty: VarType) -> Op0 {
        match ty {
            VarType::Short => Op0::FetchLocalShort,
            VarType::Long => Op0::FetchLocalLong,
            VarType::Float => Op0::FetchLocalFloat,
        }
    }

    pub fn store_local(ty: VarType) -> Op0 {
        match ty {
            VarType::Short => Op0::StoreLocalShort,
            VarType::Long => Op0::StoreLocalLong,
            VarType::Float => Op0::StoreLocalFloat,
        }
    }

    pub fn fetch_global(ty: VarType) -> Op0 {
        match ty {
            VarType::Short => Op0::FetchGlobalShort,
            VarType::Long => Op0::FetchGlobalLong,
            VarType::Float => Op0::FetchGlobalFloat,
        }
    }

    pub fn store_global(ty: VarType) -> Op0 {
        match ty {
            VarType::Short => Op0::StoreGlobalShort,
            VarType::Long => Op0::StoreGlobalLong,
            VarType::Float => Op0::StoreGlobalFloat,
        }
    }

    pub fn is_jump(self) -> bool {
        matches!(self, Op0::JumpForward | Op0::JumpBackward | Op0::JumpIfZero)
    }
}

impl Op2 {
    pub fn fetch_member(ty: VarType) -> Op2 {
        match ty {
            VarType::Short => Op2::FetchMemberShort,
            VarType::Long => Op2::FetchMemberLong,
            VarType::Float => Op2::FetchMemberFloat,
        }
    }

    pub fn store_member(ty: VarType) -> Op2 {
        match ty {
            VarType::Short => Op2::StoreMemberShort,
            VarType::Long => Op2::StoreMemberLong,
            VarType::Float => Op2::StoreMemberFloat,
        }
    }
}

/// 指令编码错误
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodeError {
    #[error("operand {operand} exceeds the {max} limit of its instruction")]
    OperandOutOfRange { operand: u32, max: u32 },
    #[error("opcode {0} does not fit its segment")]
    CodeOutOfRange(Opcode),
    #[error("opcode {0} is not in an extension segment")]
    NotAnExtension(Opcode),
}

/// 解码失败：段号或操作码未定义
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("undefined instruction word {0:#010x}")]
pub struct UndefinedInstruction(pub u32);

/// 解码后的指令
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instruction {
    Segment0 { op: Op0, arg: u32 },
    Segment1(Op1),
    Segment2 { op: Op2, a: u32, b: u32 },
    /// 段 3/4 扩展调用；`arg` 为可选参数个数（段 4 恒为 0）
    Extension { opcode: Opcode, arg: u32 },
}

impl Instruction {
    pub fn encode(self) -> Result<u32, EncodeError> {
        match self {
            Instruction::Segment0 { op, arg } => {
                check_operand(arg, MAX_OPERAND24)?;
                Ok(op.code() << CODE5_SHIFT | arg)
            }
            Instruction::Segment1(op) => Ok(1 << SEGMENT_SHIFT | op.code()),
            Instruction::Segment2 { op, a, b } => {
                check_operand(a, MAX_OPERAND12)?;
                check_operand(b, MAX_OPERAND12)?;
                Ok(2 << SEGMENT_SHIFT | op.code() << CODE5_SHIFT | a << 12 | b)
            }
            Instruction::Extension { opcode, arg } => {
                if !opcode.segment.is_extension() {
                    return Err(EncodeError::NotAnExtension(opcode));
                }
                if opcode.code > opcode.segment.max_code() {
                    return Err(EncodeError::CodeOutOfRange(opcode));
                }
                let segment = opcode.segment.index() << SEGMENT_SHIFT;
                if opcode.segment == Segment::Three {
                    check_operand(arg, MAX_OPTIONAL_COUNT)?;
                    Ok(segment | opcode.code << 8 | arg)
                } else {
                    Ok(segment | opcode.code)
                }
            }
        }
    }

    pub fn decode(word: u32) -> Result<Instruction, UndefinedInstruction> {
        let undefined = UndefinedInstruction(word);
        let segment = Segment::from_index(word >> SEGMENT_SHIFT).ok_or(undefined)?;
        let body = word & CODE29_MASK;
        match segment {
            Segment::Zero => {
                let op = Op0::from_code(body >> CODE5_SHIFT).ok_or(undefined)?;
                Ok(Instruction::Segment0 {
                    op,
                    arg: body & MAX_OPERAND24,
                })
            }
            Segment::One => Op1::from_code(body)
                .map(Instruction::Segment1)
                .ok_or(undefined),
            Segment::Two => {
                let op = Op2::from_code(body >> CODE5_SHIFT & CODE5_MASK).ok_or(undefined)?;
                Ok(Instruction::Segment2 {
                    op,
                    a: body >> 12 & MAX_OPERAND12,
                    b: body & MAX_OPERAND12,
                })
            }
            Segment::Three => Ok(Instruction::Extension {
                opcode: Opcode::segment3(body >> 8),
                arg: body & MAX_OPTIONAL_COUNT,
            }),
            Segment::Four => Ok(Instruction::Extension {
                opcode: Opcode::segment4(body),
                arg: 0,
            }),
        }
    }
}

fn check_operand(operand: u32, max: u32) -> Result<(), EncodeError> {
    if operand > max {
        Err(EncodeError::OperandOutOfRange { operand, max })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_bits() {
        let word = Instruction::Segment1(Op1::Return).encode().unwrap();
        assert_eq!(word >> 29, 1);
        let word = Instruction::Extension {
            opcode: Opcode::segment4(0x1234),
            arg: 0,
        }
        .encode()
        .unwrap();
        assert_eq!(word >> 29, 4);
        assert_eq!(word & CODE29_MASK, 0x1234);
    }

    #[test]
    fn test_core_opcode_codes_follow_declaration_order() {
        for (index, op) in Op1::ALL.iter().enumerate() {
            assert_eq!(op.code(), index as u32);
            assert_eq!(Op1::from_code(op.code()), Some(*op));
        }
        let below = Op1::IntToFloatBelow;
        assert_eq!(Op1::from_code(below.code()), Some(Op1::IntToFloatBelow));
        assert_eq!(Op1::from_code(Op1::ALL.len() as u32), None);
    }

    #[test]
    fn test_segment3_carries_count() {
        let instr = Instruction::Extension {
            opcode: Opcode::segment3(77),
            arg: 3,
        };
        let word = instr.encode().unwrap();
        assert_eq!(Instruction::decode(word).unwrap(), instr);
    }

    #[test]
    fn test_segment2_operands() {
        let instr = Instruction::Segment2 {
            op: Op2::StoreMemberFloat,
            a: 4095,
            b: 17,
        };
        assert_eq!(Instruction::decode(instr.encode().unwrap()).unwrap(), instr);
    }

    #[test]
    fn test_operand_limits() {
        let err = Instruction::Segment0 {
            op: Op0::PushInt,
            arg: MAX_OPERAND24 + 1,
        }
        .encode()
        .unwrap_err();
        assert!(matches!(err, EncodeError::OperandOutOfRange { .. }));

        let err = Instruction::Extension {
            opcode: Opcode::new(Segment::One, 3),
            arg: 0,
        }
        .encode()
        .unwrap_err();
        assert!(matches!(err, EncodeError::NotAnExtension(_)));
    }

    #[test]
    fn test_undefined_words() {
        // 段 5..7 未定义
        assert!(Instruction::decode(5 << 29).is_err());
        assert!(Instruction::decode(7 << 29 | 1).is_err());
        // 段 1 中超出定义范围的操作码
        assert!(Instruction::decode(1 << 29 | 0x0fff_ffff).is_err());
    }

    #[test]
    fn test_typed_helpers() {
        assert_eq!(Op0::store_local(VarType::Short), Op0::StoreLocalShort);
        assert_eq!(Op0::fetch_global(VarType::Float), Op0::FetchGlobalFloat);
        assert_eq!(Op2::store_member(VarType::Long), Op2::StoreMemberLong);
        assert!(Op0::JumpIfZero.is_jump());
        assert_eq!(Op1::from_code(Op1::Return.code()), Some(Op1::Return));
    }
}
