//! 已编译脚本的二进制容器 (`.mwsb`)
//!
//! # 文件格式
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  File Header (16 bytes)      │  magic "MWSB"、版本、directory 位置
//! ├──────────────────────────────┤
//! │  Name Section                │  脚本名
//! │  Code Section                │  指令字
//! │  Literals Section            │  整数、浮点、字符串字面量
//! │  Locals Section              │  short/long/float 局部变量名
//! ├──────────────────────────────┤
//! │  Section Directory           │  每个 section 12 bytes
//! └──────────────────────────────┘
//! ```
//!
//! # 示例
//!
//! ```rust
//! use mwscript_core::binary;
//! use mwscript_core::bytecode::{CompiledScript, Literals, Locals};
//!
//! let script = CompiledScript::new("demo", vec![], Locals::new(), Literals::default());
//! let bytes = binary::encode(&script);
//! assert_eq!(binary::decode(&bytes).unwrap(), script);
//! ```

mod data;
mod header;
mod reader;
mod section;
mod writer;

pub use header::{FileHeader, HeaderError, HEADER_SIZE, MAGIC, VERSION};
pub use reader::{BinaryReader, DecodeError};
pub use section::{SectionDirectory, SectionEntry, SectionError, SectionKind};
pub use writer::BinaryWriter;

use tracing::debug;

use crate::bytecode::CompiledScript;

/// 文件扩展名
pub const EXTENSION: &str = "mwsb";

/// 序列化为二进制容器
pub fn encode(script: &CompiledScript) -> Vec<u8> {
    let mut writer = BinaryWriter::new();
    writer.write_section(SectionKind::Name, script.name().as_bytes());
    writer.write_section(SectionKind::Code, &data::encode_code(script.code()));
    writer.write_section(SectionKind::Literals, &data::encode_literals(script.literals()));
    writer.write_section(SectionKind::Locals, &data::encode_locals(script.locals()));
    let bytes = writer.finish();
    debug!(target: "mwscript::compiler", name = script.name(), bytes = bytes.len(), "Encoded container");
    bytes
}

/// 从二进制容器还原
pub fn decode(bytes: &[u8]) -> Result<CompiledScript, DecodeError> {
    let reader = BinaryReader::from_bytes(bytes)?;
    let name = std::str::from_utf8(reader.read_section(SectionKind::Name)?)
        .map_err(|_| DecodeError::InvalidUtf8(SectionKind::Name))?;
    let code = data::decode_code(reader.read_section(SectionKind::Code)?)?;
    let literals = data::decode_literals(reader.read_section(SectionKind::Literals)?)?;
    let locals = data::decode_locals(reader.read_section(SectionKind::Locals)?)?;
    Ok(CompiledScript::new(name, code, locals, literals))
}

/// 字节开头是否为容器 magic
pub fn is_container(bytes: &[u8]) -> bool {
    bytes.starts_with(&MAGIC)
}
