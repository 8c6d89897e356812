//! 二进制文件写入器
//!
//! 布局：文件头 | section 数据（4 字节对齐）| section directory

use super::header::{FileHeader, HEADER_SIZE};
use super::section::{SectionDirectory, SectionEntry, SectionKind};

pub struct BinaryWriter {
    sections: SectionDirectory,
    buffer: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        let mut buffer = Vec::with_capacity(256);
        // 预留文件头空间
        buffer.resize(HEADER_SIZE, 0);
        Self {
            sections: SectionDirectory::new(),
            buffer,
        }
    }

    fn align_to(&mut self, alignment: usize) {
        let rem = self.buffer.len() % alignment;
        if rem != 0 {
            self.buffer.resize(self.buffer.len() + alignment - rem, 0);
        }
    }

    /// 写入 section 数据，返回其在文件中的偏移
    pub fn write_section(&mut self, kind: SectionKind, data: &[u8]) -> u32 {
        self.align_to(4);
        let offset = self.buffer.len() as u32;
        self.sections
            .add(SectionEntry::new(kind, offset, data.len() as u32));
        self.buffer.extend_from_slice(data);
        offset
    }

    /// 写出 directory 并回填文件头
    pub fn finish(mut self) -> Vec<u8> {
        self.align_to(4);
        let directory = self.sections.to_bytes();
        let header = FileHeader {
            section_count: self.sections.count() as u16,
            section_dir_offset: self.buffer.len() as u32,
            section_dir_size: directory.len() as u32,
            ..FileHeader::new()
        };
        self.buffer.extend_from_slice(&directory);
        self.buffer[..HEADER_SIZE].copy_from_slice(&header.to_bytes());
        self.buffer
    }
}

impl Default for BinaryWriter {
    fn default() -> Self {
        Self::new()
    }
}
