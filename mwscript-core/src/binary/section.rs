//! Section 定义和管理
//!
//! Section Directory 位于文件末尾，记录每个 section 的偏移和大小

/// Section 类型
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// 脚本名
    Name = 0x01,
    /// 指令字
    Code = 0x02,
    /// 字面量池
    Literals = 0x03,
    /// 局部变量表
    Locals = 0x04,
}

impl SectionKind {
    pub const ALL: [SectionKind; 4] = [
        SectionKind::Name,
        SectionKind::Code,
        SectionKind::Literals,
        SectionKind::Locals,
    ];

    pub fn from_u8(value: u8) -> Option<Self> {
        SectionKind::ALL.into_iter().find(|k| *k as u8 == value)
    }
}

/// Section Directory 条目 (12 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionEntry {
    pub kind: SectionKind,
    /// 标志（预留，恒为 0）
    pub flags: u16,
    pub offset: u32,
    pub size: u32,
}

impl SectionEntry {
    pub const ENTRY_SIZE: usize = 12;

    pub fn new(kind: SectionKind, offset: u32, size: u32) -> Self {
        Self {
            kind,
            flags: 0,
            offset,
            size,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::ENTRY_SIZE] {
        let mut bytes = [0u8; Self::ENTRY_SIZE];
        bytes[0] = self.kind as u8;
        bytes[2..4].copy_from_slice(&self.flags.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.offset.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.size.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SectionError> {
        if bytes.len() < Self::ENTRY_SIZE {
            return Err(SectionError::TooShort);
        }
        let kind = SectionKind::from_u8(bytes[0]).ok_or(SectionError::InvalidKind(bytes[0]))?;
        Ok(Self {
            kind,
            flags: u16::from_le_bytes([bytes[2], bytes[3]]),
            offset: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            size: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
        })
    }

    /// 数据区间的结束偏移
    pub fn end(&self) -> usize {
        self.offset as usize + self.size as usize
    }
}

#[derive(Debug, Clone, Default)]
pub struct SectionDirectory {
    pub entries: Vec<SectionEntry>,
}

impl SectionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: SectionEntry) {
        self.entries.push(entry);
    }

    /// 查找指定类型的 section
    pub fn find(&self, kind: SectionKind) -> Option<&SectionEntry> {
        self.entries.iter().find(|e| e.kind == kind)
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.entries.len() * SectionEntry::ENTRY_SIZE);
        for entry in &self.entries {
            bytes.extend_from_slice(&entry.to_bytes());
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SectionError> {
        if bytes.len() % SectionEntry::ENTRY_SIZE != 0 {
            return Err(SectionError::InvalidSize);
        }
        let entries = bytes
            .chunks_exact(SectionEntry::ENTRY_SIZE)
            .map(SectionEntry::from_bytes)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }
}

/// Section 错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SectionError {
    #[error("section data too short")]
    TooShort,
    #[error("invalid section kind {0:#04x}")]
    InvalidKind(u8),
    #[error("invalid section directory size")]
    InvalidSize,
}
