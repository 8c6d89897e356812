//! 二进制文件读取器

use super::header::{FileHeader, HeaderError, HEADER_SIZE};
use super::section::{SectionDirectory, SectionError, SectionKind};

/// 读取错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("header error: {0}")]
    Header(#[from] HeaderError),
    #[error("section error: {0}")]
    Section(#[from] SectionError),
    #[error("section directory lies outside the file")]
    InvalidOffset,
    #[error("section count mismatch: header says {expected}, directory has {found}")]
    SectionCount { expected: usize, found: usize },
    #[error("section {0:?} not found")]
    SectionNotFound(SectionKind),
    #[error("section {0:?} is truncated")]
    Truncated(SectionKind),
    #[error("section {0:?} has trailing bytes")]
    TrailingBytes(SectionKind),
    #[error("section {0:?} contains invalid UTF-8")]
    InvalidUtf8(SectionKind),
    #[error("local variable '{0}' appears twice")]
    DuplicateLocal(String),
}

pub struct BinaryReader<'a> {
    data: &'a [u8],
    header: FileHeader,
    sections: SectionDirectory,
}

impl<'a> BinaryReader<'a> {
    pub fn from_bytes(data: &'a [u8]) -> Result<Self, DecodeError> {
        let header = FileHeader::from_bytes(data)?;
        header.validate()?;

        let start = header.section_dir_offset as usize;
        let end = start
            .checked_add(header.section_dir_size as usize)
            .filter(|end| *end <= data.len() && start >= HEADER_SIZE)
            .ok_or(DecodeError::InvalidOffset)?;
        let sections = SectionDirectory::from_bytes(&data[start..end])?;
        if sections.count() != header.section_count as usize {
            return Err(DecodeError::SectionCount {
                expected: header.section_count as usize,
                found: sections.count(),
            });
        }

        Ok(Self {
            data,
            header,
            sections,
        })
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn has_section(&self, kind: SectionKind) -> bool {
        self.sections.find(kind).is_some()
    }

    /// 读取指定 section 的原始数据
    pub fn read_section(&self, kind: SectionKind) -> Result<&'a [u8], DecodeError> {
        let entry = self
            .sections
            .find(kind)
            .ok_or(DecodeError::SectionNotFound(kind))?;
        self.data
            .get(entry.offset as usize..entry.end())
            .ok_or(DecodeError::Truncated(kind))
    }
}
