/// Parsing of the raw `REPARSE_DATA_BUFFER` returned by `FSCTL_GET_REPARSE_POINT`.
///
/// Layout (all little-endian):
///
/// ```text
///  0: ReparseTag           (u32)
///  4: ReparseDataLength    (u16)   bytes following the 8-byte header
///  6: Reserved             (u16)
///  8: SubstituteNameOffset (u16)   relative to PathBuffer
/// 10: SubstituteNameLength (u16)   in bytes
/// 12: PrintNameOffset      (u16)
/// 14: PrintNameLength      (u16)
/// 16: PathBuffer           mount points
/// 16: Flags (u32), 20: PathBuffer   symbolic links
/// ```
///
/// Only the substitute name is used; the print name is for display only.
use crate::error::ReparseError;

/// Junctions and volume mount points.
pub const IO_REPARSE_TAG_MOUNT_POINT: u32 = 0xA000_0003;

/// Symbolic links (file or directory).
pub const IO_REPARSE_TAG_SYMLINK: u32 = 0xA000_000C;

/// Size of the fixed header preceding the tag-specific data.
const HEADER_LEN: usize = 8;

/// Extract the substitute name from a reparse data buffer.
pub fn parse_substitute_name(buf: &[u8]) -> Result<String, ReparseError> {
    let tag = read_u32(buf, 0).ok_or(ReparseError::Malformed("buffer shorter than header"))?;
    let data_len =
        read_u16(buf, 4).ok_or(ReparseError::Malformed("buffer shorter than header"))? as usize;

    let path_buffer = match tag {
        IO_REPARSE_TAG_MOUNT_POINT => 16,
        IO_REPARSE_TAG_SYMLINK => 20,
        other => return Err(ReparseError::UnsupportedTag(other)),
    };

    let name_offset =
        read_u16(buf, 8).ok_or(ReparseError::Malformed("missing substitute name offset"))? as usize;
    let name_len =
        read_u16(buf, 10).ok_or(ReparseError::Malformed("missing substitute name length"))? as usize;

    if name_offset % 2 != 0 || name_len % 2 != 0 {
        return Err(ReparseError::Malformed("substitute name is not UTF-16 aligned"));
    }

    let start = path_buffer + name_offset;
    let end = start + name_len;
    let limit = (HEADER_LEN + data_len).min(buf.len());
    if end > limit {
        return Err(ReparseError::Malformed("substitute name runs past the data"));
    }

    let units = buf[start..end]
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map_err(|_| ReparseError::Malformed("substitute name is not valid UTF-16"))
}

fn read_u16(buf: &[u8], at: usize) -> Option<u16> {
    let bytes = buf.get(at..at + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn read_u32(buf: &[u8], at: usize) -> Option<u32> {
    let bytes = buf.get(at..at + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Encode a reparse data buffer the way the filesystem returns it.
///
/// The substitute name is written first and the print name right after it.
#[cfg(test)]
pub(crate) fn encode(tag: u32, substitute: &str, print: &str) -> Vec<u8> {
    let sub: Vec<u8> = substitute.encode_utf16().flat_map(u16::to_le_bytes).collect();
    let prn: Vec<u8> = print.encode_utf16().flat_map(u16::to_le_bytes).collect();
    let flags_len = if tag == IO_REPARSE_TAG_SYMLINK { 4 } else { 0 };
    let data_len = 8 + flags_len + sub.len() + prn.len();

    let mut buf = Vec::with_capacity(HEADER_LEN + data_len);
    buf.extend_from_slice(&tag.to_le_bytes());
    buf.extend_from_slice(&(data_len as u16).to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes());
    buf.extend_from_slice(&(sub.len() as u16).to_le_bytes());
    buf.extend_from_slice(&(sub.len() as u16).to_le_bytes());
    buf.extend_from_slice(&(prn.len() as u16).to_le_bytes());
    buf.extend(std::iter::repeat(0u8).take(flags_len));
    buf.extend_from_slice(&sub);
    buf.extend_from_slice(&prn);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn junction_substitute_name() {
        let buf = encode(IO_REPARSE_TAG_MOUNT_POINT, r"\??\D:\Data", r"D:\Data");
        assert_eq!(parse_substitute_name(&buf).unwrap(), r"\??\D:\Data");
    }

    #[test]
    fn symlink_skips_flags_field() {
        let buf = encode(IO_REPARSE_TAG_SYMLINK, r"\??\C:\Users", r"C:\Users");
        assert_eq!(parse_substitute_name(&buf).unwrap(), r"\??\C:\Users");
    }

    #[test]
    fn trailing_capacity_is_ignored() {
        // The IOCTL output buffer is much larger than the data it holds.
        let mut buf = encode(IO_REPARSE_TAG_MOUNT_POINT, r"\??\E:\", "");
        buf.resize(16 * 1024, 0xAA);
        assert_eq!(parse_substitute_name(&buf).unwrap(), r"\??\E:\");
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let buf = encode(0x9000_001A, "whatever", "");
        assert!(matches!(
            parse_substitute_name(&buf),
            Err(ReparseError::UnsupportedTag(0x9000_001A))
        ));
    }

    #[test]
    fn truncated_buffers_are_malformed() {
        assert!(matches!(
            parse_substitute_name(&[0x03, 0x00]),
            Err(ReparseError::Malformed(_))
        ));

        let buf = encode(IO_REPARSE_TAG_MOUNT_POINT, r"\??\C:\Long\Target", "");
        assert!(matches!(
            parse_substitute_name(&buf[..buf.len() - 6]),
            Err(ReparseError::Malformed(_))
        ));
    }

    #[test]
    fn length_past_declared_data_is_malformed() {
        let mut buf = encode(IO_REPARSE_TAG_MOUNT_POINT, r"\??\C:\x", "");
        // Claim a substitute name longer than the data region.
        buf[10..12].copy_from_slice(&200u16.to_le_bytes());
        buf.resize(1024, 0);
        assert!(matches!(
            parse_substitute_name(&buf),
            Err(ReparseError::Malformed(_))
        ));
    }

    #[test]
    fn odd_length_is_malformed() {
        let mut buf = encode(IO_REPARSE_TAG_MOUNT_POINT, r"\??\C:\x", "");
        buf[10..12].copy_from_slice(&3u16.to_le_bytes());
        assert!(matches!(
            parse_substitute_name(&buf),
            Err(ReparseError::Malformed(_))
        ));
    }

    #[test]
    fn unpaired_surrogate_is_malformed() {
        let mut buf = encode(IO_REPARSE_TAG_MOUNT_POINT, "ab", "");
        buf[16..18].copy_from_slice(&0xD800u16.to_le_bytes());
        assert!(matches!(
            parse_substitute_name(&buf),
            Err(ReparseError::Malformed(_))
        ));
    }
}
