//! 扩展注册表
//!
//! 名字 → (签名, 操作码) 供编译器查询；操作码 → 处理函数 供虚拟机分派。
//! 启动阶段单线程填充，之后通过 `Arc<Extensions>` 只读共享。

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::signature::{Signature, SignatureError};
use crate::bytecode::{Opcode, Segment};
use crate::runtime::{Runtime, RuntimeFault};
use crate::types::ValueType;

/// 扩展处理函数：自行从栈上弹出参数，函数类扩展需压入一个结果。
/// 第二个参数是段 3 指令携带的可选参数个数（段 4 恒为 0）。
pub type Handler = Arc<dyn Fn(&mut Runtime<'_>, u32) -> Result<(), RuntimeFault> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionKind {
    /// 有返回值，可出现在表达式中
    Function(ValueType),
    /// 无返回值，只能作为语句
    Instruction,
}

/// 已注册扩展的描述
#[derive(Debug, Clone, PartialEq)]
pub struct Extension {
    /// 小写名字
    pub name: String,
    pub kind: ExtensionKind,
    pub signature: Signature,
    pub code: Opcode,
    /// `obj->Name` 形式使用的操作码
    pub explicit_code: Option<Opcode>,
}

impl Extension {
    pub fn returns(&self) -> Option<ValueType> {
        match self.kind {
            ExtensionKind::Function(ty) => Some(ty),
            ExtensionKind::Instruction => None,
        }
    }

    pub fn opcode(&self, explicit: bool) -> Option<Opcode> {
        if explicit {
            self.explicit_code
        } else {
            Some(self.code)
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("extension '{0}' is already registered")]
    DuplicateName(String),
    #[error("opcode {opcode} is already claimed by '{owner}'")]
    OpcodeTaken { opcode: Opcode, owner: String },
    #[error("opcode {0} lies in a segment reserved for built-in instructions")]
    ReservedSegment(Opcode),
    #[error("opcode {0} does not fit its segment")]
    CodeOutOfRange(Opcode),
    #[error("extension '{name}' takes optional arguments and must use segment 3, not {opcode}")]
    OptionalArgumentsOutsideSegment3 { name: String, opcode: Opcode },
    #[error("opcode {0} already has a handler")]
    DuplicateHandler(Opcode),
    #[error("extension registry is sealed")]
    Sealed,
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

#[derive(Default)]
pub struct Extensions {
    by_name: HashMap<String, Extension>,
    owners: HashMap<Opcode, String>,
    handlers: HashMap<Opcode, Handler>,
    sealed: bool,
}

impl std::fmt::Debug for Extensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut handled: Vec<&Opcode> = self.handlers.keys().collect();
        handled.sort();
        f.debug_struct("Extensions")
            .field("names", &self.by_name.len())
            .field("handlers", &handled)
            .field("sealed", &self.sealed)
            .finish()
    }
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册函数（有返回值）
    pub fn register_function(
        &mut self,
        name: &str,
        returns: ValueType,
        signature: &str,
        code: Opcode,
        explicit_code: Option<Opcode>,
    ) -> Result<(), RegistryError> {
        self.register(
            name,
            ExtensionKind::Function(returns),
            signature,
            code,
            explicit_code,
        )
    }

    /// 注册指令（无返回值）
    pub fn register_instruction(
        &mut self,
        name: &str,
        signature: &str,
        code: Opcode,
        explicit_code: Option<Opcode>,
    ) -> Result<(), RegistryError> {
        self.register(
            name,
            ExtensionKind::Instruction,
            signature,
            code,
            explicit_code,
        )
    }

    fn register(
        &mut self,
        name: &str,
        kind: ExtensionKind,
        signature: &str,
        code: Opcode,
        explicit_code: Option<Opcode>,
    ) -> Result<(), RegistryError> {
        if self.sealed {
            return Err(RegistryError::Sealed);
        }
        let key = name.to_lowercase();
        if self.by_name.contains_key(&key) {
            return Err(RegistryError::DuplicateName(key));
        }
        let signature = Signature::parse(signature)?;

        let opcodes: Vec<Opcode> = std::iter::once(code).chain(explicit_code).collect();
        for (i, &opcode) in opcodes.iter().enumerate() {
            self.check_opcode(opcode)?;
            if signature.has_optional() && opcode.segment != Segment::Three {
                return Err(RegistryError::OptionalArgumentsOutsideSegment3 {
                    name: key,
                    opcode,
                });
            }
            if opcodes[..i].contains(&opcode) {
                return Err(RegistryError::OpcodeTaken {
                    opcode,
                    owner: key,
                });
            }
        }

        for &opcode in &opcodes {
            self.owners.insert(opcode, key.clone());
        }
        debug!(
            target: "mwscript::compiler",
            name = %key,
            ?kind,
            %code,
            signature = signature.as_str(),
            "Registered extension"
        );
        self.by_name.insert(
            key.clone(),
            Extension {
                name: key,
                kind,
                signature,
                code,
                explicit_code,
            },
        );
        Ok(())
    }

    fn check_opcode(&self, opcode: Opcode) -> Result<(), RegistryError> {
        if !opcode.segment.is_extension() {
            return Err(RegistryError::ReservedSegment(opcode));
        }
        if opcode.code > opcode.segment.max_code() {
            return Err(RegistryError::CodeOutOfRange(opcode));
        }
        if let Some(owner) = self.owners.get(&opcode) {
            return Err(RegistryError::OpcodeTaken {
                opcode,
                owner: owner.clone(),
            });
        }
        Ok(())
    }

    /// 为操作码安装处理函数
    pub fn install<F>(&mut self, opcode: Opcode, handler: F) -> Result<(), RegistryError>
    where
        F: Fn(&mut Runtime<'_>, u32) -> Result<(), RuntimeFault> + Send + Sync + 'static,
    {
        if self.sealed {
            return Err(RegistryError::Sealed);
        }
        if !opcode.segment.is_extension() {
            return Err(RegistryError::ReservedSegment(opcode));
        }
        if self.handlers.contains_key(&opcode) {
            return Err(RegistryError::DuplicateHandler(opcode));
        }
        self.handlers.insert(opcode, Arc::new(handler));
        Ok(())
    }

    /// 按名字查找（大小写无关）
    pub fn lookup(&self, name: &str) -> Option<&Extension> {
        self.by_name.get(&name.to_lowercase())
    }

    pub fn handler(&self, opcode: Opcode) -> Option<&Handler> {
        self.handlers.get(&opcode)
    }

    /// 操作码对应的扩展名（反汇编用）
    pub fn name_of(&self, opcode: Opcode) -> Option<&str> {
        self.owners.get(&opcode).map(String::as_str)
    }

    /// 宣告注册阶段结束，此后注册与安装都会失败
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Extension> {
        self.by_name.values()
    }
}
