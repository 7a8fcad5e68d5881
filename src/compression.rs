//! Possible ZIP compression methods and the decompressor registry

use std::collections::HashMap;
use std::fmt;
use std::io::{BufRead, Read};
use std::sync::{PoisonError, RwLock};

use once_cell::sync::Lazy;

use crate::deflate::Deflater;

/// Identifies the compression method of an entry's contents.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum CompressionMethod {
    /// The contents are stored (no compression)
    Stored,
    /// The contents are Deflated
    Deflated,
    /// A method this crate ships no decoder for; it may still be readable
    /// through a registered [`Decompressor`] or via `open_raw`.
    Unsupported(u16),
}

impl CompressionMethod {
    /// Converts a wire value into a `CompressionMethod`.
    pub const fn from_u16(val: u16) -> CompressionMethod {
        match val {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflated,
            v => CompressionMethod::Unsupported(v),
        }
    }

    /// Converts a `CompressionMethod` into its wire value.
    pub const fn to_u16(self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflated => 8,
            CompressionMethod::Unsupported(v) => v,
        }
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompressionMethod::Stored => write!(f, "Stored"),
            CompressionMethod::Deflated => write!(f, "Deflated"),
            CompressionMethod::Unsupported(v) => write!(f, "Unsupported({v})"),
        }
    }
}

/// Factory producing a streaming decoder over an entry's compressed bytes.
///
/// The source is buffered; a decoder must not consume bytes past the end of
/// its compressed stream, since whatever follows belongs to the next archive
/// record.
pub type Decompressor = for<'a> fn(Box<dyn BufRead + 'a>) -> Box<dyn Read + 'a>;

static DECOMPRESSORS: Lazy<RwLock<HashMap<u16, Decompressor>>> = Lazy::new(|| {
    let mut map: HashMap<u16, Decompressor> = HashMap::new();
    map.insert(CompressionMethod::Stored.to_u16(), stored_decoder);
    map.insert(CompressionMethod::Deflated.to_u16(), deflate_decoder);
    RwLock::new(map)
});

fn stored_decoder<'a>(reader: Box<dyn BufRead + 'a>) -> Box<dyn Read + 'a> {
    reader
}

fn deflate_decoder<'a>(reader: Box<dyn BufRead + 'a>) -> Box<dyn Read + 'a> {
    Box::new(Deflater::new(reader))
}

/// Registers (or replaces) the decoder factory for a method code,
/// process-wide. Methods 0 (stored) and 8 (deflate) are pre-registered.
pub fn register_decompressor(method: u16, decompressor: Decompressor) {
    let mut map = DECOMPRESSORS
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    map.insert(method, decompressor);
}

pub(crate) fn decompressor(method: u16) -> Option<Decompressor> {
    let map = DECOMPRESSORS.read().unwrap_or_else(PoisonError::into_inner);
    map.get(&method).copied()
}
