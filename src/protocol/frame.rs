//! Schema-Registry Wire Framing
//!
//! Layout:
//! ┌───────────┬──────────────────────────┬─────────────────────────┐
//! │ magic (1) │ schema id (4, big-endian)│ codec payload (variable)│
//! └───────────┴──────────────────────────┴─────────────────────────┘
//!
//! Header fixed 5 bytes, sama dengan konvensi framing schema registry.

/// Magic byte framing schema registry
pub const MAGIC_BYTE: u8 = 0x00;
pub const HEADER_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("frame too short: {len} bytes, header needs {}", HEADER_SIZE)]
    TooShort { len: usize },
    #[error("bad magic byte {found:#04x}, expected {:#04x}", MAGIC_BYTE)]
    BadMagic { found: u8 },
}

/// Header frame: hanya membawa schema id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub schema_id: u32,
}

impl FrameHeader {
    #[inline(always)]
    pub fn new(schema_id: u32) -> Self {
        Self { schema_id }
    }

    /// Serialize header ke 5 bytes
    #[inline(always)]
    pub fn to_bytes(self) -> [u8; HEADER_SIZE] {
        let id = self.schema_id.to_be_bytes();
        [MAGIC_BYTE, id[0], id[1], id[2], id[3]]
    }

    /// Append header ke buffer
    #[inline(always)]
    pub fn write_to(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_bytes());
    }

    /// Parse header, return header + sisa payload (zero-copy)
    #[inline(always)]
    pub fn parse(buf: &[u8]) -> Result<(Self, &[u8]), FrameError> {
        if buf.len() < HEADER_SIZE {
            return Err(FrameError::TooShort { len: buf.len() });
        }
        if buf[0] != MAGIC_BYTE {
            return Err(FrameError::BadMagic { found: buf[0] });
        }
        let schema_id = u32::from_be_bytes([buf[1], buf[2], buf[3], buf[4]]);
        Ok((Self { schema_id }, &buf[HEADER_SIZE..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let bytes = FrameHeader::new(0x0102_0304).to_bytes();
        assert_eq!(bytes, [0x00, 0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_parse_splits_payload() {
        let mut buf = Vec::new();
        FrameHeader::new(7).write_to(&mut buf);
        buf.extend_from_slice(b"payload");

        let (header, payload) = FrameHeader::parse(&buf).unwrap();
        assert_eq!(header.schema_id, 7);
        assert_eq!(payload, b"payload");
    }

    #[test]
    fn test_header_only_is_valid() {
        let (header, payload) = FrameHeader::parse(&[0, 0, 0, 0, 1]).unwrap();
        assert_eq!(header.schema_id, 1);
        assert!(payload.is_empty());
    }

    #[test]
    fn test_too_short() {
        assert_eq!(
            FrameHeader::parse(&[0, 0, 0, 1]),
            Err(FrameError::TooShort { len: 4 })
        );
        assert_eq!(FrameHeader::parse(&[]), Err(FrameError::TooShort { len: 0 }));
    }

    #[test]
    fn test_bad_magic() {
        assert_eq!(
            FrameHeader::parse(&[0x01, 0, 0, 0, 1, 2]),
            Err(FrameError::BadMagic { found: 0x01 })
        );
    }
}
