//! Section 负载的编解码
//!
//! 所有整数小端；字符串为 u32 长度前缀的 UTF-8；列表为 u32 个数前缀。

use super::reader::DecodeError;
use super::section::SectionKind;
use crate::bytecode::{Literals, Locals};
use crate::types::VarType;

#[derive(Debug, Default)]
pub(crate) struct ByteWriter {
    bytes: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_u32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn put_i32(&mut self, value: i32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn put_f32(&mut self, value: f32) {
        self.put_u32(value.to_bits());
    }

    pub fn put_str(&mut self, value: &str) {
        self.put_u32(value.len() as u32);
        self.bytes.extend_from_slice(value.as_bytes());
    }

    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    section: SectionKind,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8], section: SectionKind) -> Self {
        Self {
            bytes,
            pos: 0,
            section,
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(DecodeError::Truncated(self.section))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn u32(&mut self) -> Result<u32, DecodeError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn i32(&mut self) -> Result<i32, DecodeError> {
        let b = self.take(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn f32(&mut self) -> Result<f32, DecodeError> {
        self.u32().map(f32::from_bits)
    }

    pub fn string(&mut self) -> Result<String, DecodeError> {
        let len = self.u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8(self.section))
    }

    /// 读取个数前缀；个数不可能超过剩余字节数
    pub fn count(&mut self, item_size: usize) -> Result<usize, DecodeError> {
        let count = self.u32()? as usize;
        if count.saturating_mul(item_size) > self.bytes.len() - self.pos {
            return Err(DecodeError::Truncated(self.section));
        }
        Ok(count)
    }

    pub fn finish(self) -> Result<(), DecodeError> {
        if self.pos == self.bytes.len() {
            Ok(())
        } else {
            Err(DecodeError::TrailingBytes(self.section))
        }
    }
}

pub(crate) fn encode_code(code: &[u32]) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.put_u32(code.len() as u32);
    for &word in code {
        w.put_u32(word);
    }
    w.finish()
}

pub(crate) fn decode_code(bytes: &[u8]) -> Result<Vec<u32>, DecodeError> {
    let mut r = ByteReader::new(bytes, SectionKind::Code);
    let count = r.count(4)?;
    let code = (0..count).map(|_| r.u32()).collect::<Result<Vec<_>, _>>()?;
    r.finish()?;
    Ok(code)
}

pub(crate) fn encode_literals(literals: &Literals) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.put_u32(literals.integers.len() as u32);
    for &value in &literals.integers {
        w.put_i32(value);
    }
    w.put_u32(literals.floats.len() as u32);
    for &value in &literals.floats {
        w.put_f32(value);
    }
    w.put_u32(literals.strings.len() as u32);
    for value in &literals.strings {
        w.put_str(value);
    }
    w.finish()
}

pub(crate) fn decode_literals(bytes: &[u8]) -> Result<Literals, DecodeError> {
    let mut r = ByteReader::new(bytes, SectionKind::Literals);
    let count = r.count(4)?;
    let integers = (0..count).map(|_| r.i32()).collect::<Result<Vec<_>, _>>()?;
    let count = r.count(4)?;
    let floats = (0..count).map(|_| r.f32()).collect::<Result<Vec<_>, _>>()?;
    let count = r.count(4)?;
    let strings = (0..count).map(|_| r.string()).collect::<Result<Vec<_>, _>>()?;
    r.finish()?;
    Ok(Literals {
        integers,
        floats,
        strings,
    })
}

/// 依次写出 short/long/float 三张名字表
pub(crate) fn encode_locals(locals: &Locals) -> Vec<u8> {
    let mut w = ByteWriter::new();
    for ty in VarType::ALL {
        let names = locals.names(ty);
        w.put_u32(names.len() as u32);
        for name in names {
            w.put_str(name);
        }
    }
    w.finish()
}

pub(crate) fn decode_locals(bytes: &[u8]) -> Result<Locals, DecodeError> {
    let mut r = ByteReader::new(bytes, SectionKind::Locals);
    let mut locals = Locals::new();
    for ty in VarType::ALL {
        let count = r.count(4)?;
        for _ in 0..count {
            let name = r.string()?;
            locals
                .declare(ty, &name)
                .map_err(|dup| DecodeError::DuplicateLocal(dup.0))?;
        }
    }
    r.finish()?;
    Ok(locals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_detects_truncation() {
        let mut r = ByteReader::new(&[1, 0], SectionKind::Code);
        assert_eq!(r.u32(), Err(DecodeError::Truncated(SectionKind::Code)));
    }

    #[test]
    fn test_count_larger_than_data() {
        let bytes = 1000u32.to_le_bytes();
        assert_eq!(decode_code(&bytes), Err(DecodeError::Truncated(SectionKind::Code)));
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = encode_code(&[7]);
        bytes.push(0);
        assert_eq!(decode_code(&bytes), Err(DecodeError::TrailingBytes(SectionKind::Code)));
    }

    #[test]
    fn test_literals_preserve_float_bits() {
        let literals = Literals {
            integers: vec![-3],
            floats: vec![-0.0, 1.5],
            strings: vec!["Jejubãr".into()],
        };
        let decoded = decode_literals(&encode_literals(&literals)).unwrap();
        assert_eq!(decoded.floats[0].to_bits(), (-0.0f32).to_bits());
        assert_eq!(decoded, literals);
    }
}
