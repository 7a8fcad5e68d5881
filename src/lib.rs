//! A library for reading ZIP archives as a forward-only stream.
//!
//! Unlike readers built around the central directory, this crate consumes
//! sequential bytes only: no seeking, no known archive size. That makes it
//! usable on network response bodies, pipes and stdin, at the price of the
//! metadata that lives only in the central directory (comments, external
//! attributes).
//!
//! Entries written in streaming mode (general-purpose bit 3) declare their
//! sizes as unknown; the reader recovers the true compressed length from the
//! deflate stream itself and then consumes the trailing data descriptor.
//! Byte counts and CRC-32 are validated as each entry is read.
//!
//! ```no_run
//! use std::fs::File;
//! use std::io;
//!
//! use zipstream::ZipStreamReader;
//!
//! fn main() -> zipstream::ZipResult<()> {
//!     let mut zip = ZipStreamReader::new(File::open("archive.zip")?);
//!     while zip.next() {
//!         let mut entry = zip.entry()?;
//!         println!("{} ({} bytes)", entry.name(), entry.uncompressed_size());
//!         if entry.is_file() {
//!             let mut contents = entry.open()?;
//!             io::copy(&mut contents, &mut io::sink())?;
//!         }
//!     }
//!     if let Some(err) = zip.err() {
//!         return Err(err.clone());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub use crate::compression::{register_decompressor, CompressionMethod, Decompressor};
pub use crate::read::{EntryReader, ZipEntry, ZipStreamReader};
pub use crate::result::{ZipError, ZipResult};

mod compression;
mod cp437;
mod deflate;
mod extra_fields;
mod read;
mod result;
mod spec;
mod types;
mod util;
