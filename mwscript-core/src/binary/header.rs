//! 文件头 (16 bytes)
//!
//! ```text
//! 0..4   magic "MWSB"
//! 4..6   格式版本 (u16 LE)
//! 6..8   section 数量 (u16 LE)
//! 8..12  section directory 偏移 (u32 LE)
//! 12..16 section directory 大小 (u32 LE)
//! ```

pub const MAGIC: [u8; 4] = *b"MWSB";
pub const VERSION: u16 = 1;
pub const HEADER_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub version: u16,
    pub section_count: u16,
    pub section_dir_offset: u32,
    pub section_dir_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    #[error("file header is too short")]
    TooShort,
    #[error("bad magic {0:?}, expected \"MWSB\"")]
    BadMagic([u8; 4]),
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u16),
}

impl FileHeader {
    pub fn new() -> Self {
        Self {
            version: VERSION,
            section_count: 0,
            section_dir_offset: 0,
            section_dir_size: 0,
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&MAGIC);
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.section_count.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.section_dir_offset.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.section_dir_size.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HeaderError> {
        if bytes.len() < HEADER_SIZE {
            return Err(HeaderError::TooShort);
        }
        let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
        if magic != MAGIC {
            return Err(HeaderError::BadMagic(magic));
        }
        Ok(Self {
            version: u16::from_le_bytes([bytes[4], bytes[5]]),
            section_count: u16::from_le_bytes([bytes[6], bytes[7]]),
            section_dir_offset: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            section_dir_size: u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
        })
    }

    pub fn validate(&self) -> Result<(), HeaderError> {
        if self.version != VERSION {
            return Err(HeaderError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

impl Default for FileHeader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_bytes() {
        let header = FileHeader {
            section_count: 4,
            section_dir_offset: 64,
            section_dir_size: 48,
            ..FileHeader::new()
        };
        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..4], b"MWSB");
        assert_eq!(FileHeader::from_bytes(&bytes), Ok(header));
    }

    #[test]
    fn test_header_rejects_bad_input() {
        assert_eq!(FileHeader::from_bytes(b"MWS"), Err(HeaderError::TooShort));
        let mut bytes = FileHeader::new().to_bytes();
        bytes[0] = b'X';
        assert!(matches!(FileHeader::from_bytes(&bytes), Err(HeaderError::BadMagic(_))));

        let future = FileHeader {
            version: 9,
            ..FileHeader::new()
        };
        assert_eq!(future.validate(), Err(HeaderError::UnsupportedVersion(9)));
    }
}
