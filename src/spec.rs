//! On-the-wire constants and records of the streaming ZIP subset

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::result::ZipResult;

pub(crate) const LOCAL_FILE_HEADER_SIGNATURE: u32 = 0x04034b50;
pub(crate) const CENTRAL_DIRECTORY_HEADER_SIGNATURE: u32 = 0x02014b50;
pub(crate) const CENTRAL_DIRECTORY_END_SIGNATURE: u32 = 0x06054b50;
pub(crate) const DATA_DESCRIPTOR_SIGNATURE: u32 = 0x08074b50;

/// A 32-bit size field holding this value defers to the Zip64 extra field.
pub(crate) const ZIP64_BYTES_THR: u64 = u32::MAX as u64;

// Extra field header IDs understood by the streaming reader.
// See http://mdfs.net/Docs/Comp/Archiving/Zip/ExtraField
pub(crate) const ZIP64_EXTRA_ID: u16 = 0x0001;
pub(crate) const NTFS_EXTRA_ID: u16 = 0x000a;
pub(crate) const UNIX_EXTRA_ID: u16 = 0x000d;
pub(crate) const EXTENDED_TIMESTAMP_EXTRA_ID: u16 = 0x5455;
pub(crate) const INFOZIP_UNIX_EXTRA_ID: u16 = 0x5855;

/// The record trailing a deflated entry whose local header declared its
/// sizes as unknown (general-purpose bit 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DataDescriptor {
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
}

impl DataDescriptor {
    /// Reads a data descriptor from the current stream position.
    ///
    /// The APPNOTE says: "Although not originally assigned a signature, the
    /// value 0x08074b50 has commonly been adopted as a signature value for
    /// the data descriptor record. Implementers should be aware that ZIP
    /// files may be encountered with or without this signature marking data
    /// descriptors and should account for either case when reading ZIP
    /// files to ensure compatibility."
    ///
    /// `zip64` selects the 20-byte payload with 64-bit sizes; the caller
    /// decides based on the byte counts it observed while decoding.
    pub(crate) fn read<R: Read>(reader: &mut R, zip64: bool) -> ZipResult<DataDescriptor> {
        let first = reader.read_u32::<LittleEndian>()?;
        let crc32 = if first == DATA_DESCRIPTOR_SIGNATURE {
            reader.read_u32::<LittleEndian>()?
        } else {
            first
        };
        let (compressed_size, uncompressed_size) = if zip64 {
            (
                reader.read_u64::<LittleEndian>()?,
                reader.read_u64::<LittleEndian>()?,
            )
        } else {
            (
                reader.read_u32::<LittleEndian>()? as u64,
                reader.read_u32::<LittleEndian>()? as u64,
            )
        };
        Ok(DataDescriptor {
            crc32,
            compressed_size,
            uncompressed_size,
        })
    }
}

#[cfg(test)]
mod test {
    use byteorder::WriteBytesExt;

    use super::*;
    use crate::result::ZipError;

    fn descriptor_bytes(signature: bool, crc32: u32, csize: u64, usize_: u64, zip64: bool) -> Vec<u8> {
        let mut buf = Vec::new();
        if signature {
            buf.write_u32::<LittleEndian>(DATA_DESCRIPTOR_SIGNATURE).unwrap();
        }
        buf.write_u32::<LittleEndian>(crc32).unwrap();
        if zip64 {
            buf.write_u64::<LittleEndian>(csize).unwrap();
            buf.write_u64::<LittleEndian>(usize_).unwrap();
        } else {
            buf.write_u32::<LittleEndian>(csize as u32).unwrap();
            buf.write_u32::<LittleEndian>(usize_ as u32).unwrap();
        }
        buf
    }

    #[test]
    fn reads_descriptor_with_and_without_signature() {
        for signature in [false, true] {
            let buf = descriptor_bytes(signature, 0xdead_beef, 17, 42, false);
            let descriptor = DataDescriptor::read(&mut buf.as_slice(), false).unwrap();
            assert_eq!(
                descriptor,
                DataDescriptor {
                    crc32: 0xdead_beef,
                    compressed_size: 17,
                    uncompressed_size: 42,
                }
            );
        }
    }

    #[test]
    fn reads_zip64_descriptor() {
        let csize = 7 * 1024 * 1024 * 1024u64;
        let buf = descriptor_bytes(true, 1, csize, csize + 9, true);
        let descriptor = DataDescriptor::read(&mut buf.as_slice(), true).unwrap();
        assert_eq!(descriptor.compressed_size, csize);
        assert_eq!(descriptor.uncompressed_size, csize + 9);
    }

    #[test]
    fn partial_descriptor_is_an_unexpected_eof() {
        let mut buf = descriptor_bytes(true, 1, 2, 3, false);
        buf.truncate(9);
        let err = DataDescriptor::read(&mut buf.as_slice(), false).unwrap_err();
        assert!(matches!(err, ZipError::UnexpectedEof(_)));
    }

    #[test]
    fn crc_matching_the_signature_value_still_parses() {
        // A descriptor without a leading signature whose crc32 happens to be
        // 0x08074b50 is indistinguishable from one with a signature; the
        // reader treats the first word as the signature, as the original
        // implementations do.
        let buf = descriptor_bytes(true, DATA_DESCRIPTOR_SIGNATURE, 5, 6, false);
        let descriptor = DataDescriptor::read(&mut buf.as_slice(), false).unwrap();
        assert_eq!(descriptor.crc32, DATA_DESCRIPTOR_SIGNATURE);
    }
}
