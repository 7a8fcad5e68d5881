//! Parsing of the local-header extra area
//!
//! The extra area is a sequence of `(tag: u16, size: u16, payload)` records.
//! Parsing is best-effort: a truncated or ill-sized payload abandons that
//! tag, not the entry. The one exception is a Zip64 record that is too short
//! to hold a size the header deferred to it, which makes the entry
//! unreadable and is therefore a format error.

use time::OffsetDateTime;

use crate::result::{ZipError, ZipResult};
use crate::spec;
use crate::types;

#[derive(Debug, Default)]
pub(crate) struct ExtraFields {
    /// Compressed size from the Zip64 record, when the 32-bit slot was maxed
    pub compressed_size64: Option<u64>,
    /// Uncompressed size from the Zip64 record, when the 32-bit slot was maxed
    pub uncompressed_size64: Option<u64>,
    /// A Zip64 record was present
    pub zip64: bool,
    /// Absolute modification time from an NTFS, Unix or extended-timestamp
    /// record; the record appearing last in the extra area wins.
    pub modified: Option<OffsetDateTime>,
}

pub(crate) fn parse(extra: &[u8], need_csize: bool, need_usize: bool) -> ZipResult<ExtraFields> {
    let mut out = ExtraFields::default();
    let mut need_csize = need_csize;
    let mut need_usize = need_usize;

    let mut rest = extra;
    while rest.len() >= 4 {
        let tag = u16::from_le_bytes([rest[0], rest[1]]);
        let size = u16::from_le_bytes([rest[2], rest[3]]) as usize;
        rest = &rest[4..];
        if rest.len() < size {
            break;
        }
        let (field, tail) = rest.split_at(size);
        rest = tail;

        match tag {
            spec::ZIP64_EXTRA_ID => {
                out.zip64 = true;
                // Replacement values appear in order, and only for fields
                // whose 32-bit slot was maxed out: uncompressed first, then
                // compressed.
                let mut field = field;
                if need_usize {
                    need_usize = false;
                    if field.len() < 8 {
                        return Err(ZipError::InvalidArchive(
                            "zip64 extra too short for the uncompressed size",
                        ));
                    }
                    out.uncompressed_size64 = Some(read_u64(&mut field));
                }
                if need_csize {
                    need_csize = false;
                    if field.len() < 8 {
                        return Err(ZipError::InvalidArchive(
                            "zip64 extra too short for the compressed size",
                        ));
                    }
                    out.compressed_size64 = Some(read_u64(&mut field));
                }
            }
            spec::NTFS_EXTRA_ID => {
                if field.len() < 4 {
                    continue;
                }
                // 4 reserved bytes, then an attribute sub-stream; only
                // attribute 1 (file times, 24 bytes) is consumed.
                let mut field = &field[4..];
                while field.len() >= 4 {
                    let attr_tag = u16::from_le_bytes([field[0], field[1]]);
                    let attr_size = u16::from_le_bytes([field[2], field[3]]) as usize;
                    field = &field[4..];
                    if field.len() < attr_size {
                        break;
                    }
                    let (attr, tail) = field.split_at(attr_size);
                    field = tail;
                    if attr_tag != 1 || attr_size != 24 {
                        continue;
                    }
                    let mut attr = attr;
                    let ticks = read_u64(&mut attr);
                    if let Some(ts) = types::ntfs_to_datetime(ticks) {
                        out.modified = Some(ts);
                    }
                }
            }
            spec::UNIX_EXTRA_ID | spec::INFOZIP_UNIX_EXTRA_ID => {
                if field.len() < 8 {
                    continue;
                }
                // 32-bit access time (ignored), then the modification time.
                let mtime = u32::from_le_bytes([field[4], field[5], field[6], field[7]]);
                if let Ok(ts) = OffsetDateTime::from_unix_timestamp(mtime as i64) {
                    out.modified = Some(ts);
                }
            }
            spec::EXTENDED_TIMESTAMP_EXTRA_ID => {
                // First byte flags which times follow; bit 0 is mtime.
                if field.len() < 5 || field[0] & 1 == 0 {
                    continue;
                }
                let mtime = u32::from_le_bytes([field[1], field[2], field[3], field[4]]);
                if let Ok(ts) = OffsetDateTime::from_unix_timestamp(mtime as i64) {
                    out.modified = Some(ts);
                }
            }
            _ => {}
        }
    }

    Ok(out)
}

fn read_u64(field: &mut &[u8]) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&field[..8]);
    *field = &field[8..];
    u64::from_le_bytes(raw)
}
