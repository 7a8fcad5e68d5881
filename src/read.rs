//! Types for reading ZIP archives from a forward-only byte stream

use std::fmt;
use std::io::{self, BufRead, BufReader, Read, Take};

use byteorder::{LittleEndian, ReadBytesExt};
use crc32fast::Hasher;
use flate2::{Decompress, FlushDecompress, Status};
use log::debug;

use crate::compression::{decompressor, CompressionMethod};
use crate::cp437::FromCp437;
use crate::deflate::Deflater;
use crate::extra_fields;
use crate::result::{ZipError, ZipResult};
use crate::spec::{self, DataDescriptor};
use crate::types::{self, EntryData};
use crate::util::{self, CountingReader};

/// Streaming decoder for zip archives.
///
/// The reader owns a buffered view of the byte source and yields entries in
/// archive order. It never seeks and never reads the central directory, so
/// it works over pipes, sockets and response bodies where the archive size
/// is unknown.
///
/// Iteration follows the `next` / `entry` / `err` contract: [`next`] reports
/// whether another local entry follows (draining the previous entry if the
/// caller left it unread), [`entry`] parses the header it found, and a
/// `false` from [`next`] means either the end of the local-file section or a
/// sticky error exposed by [`err`].
///
/// [`next`]: ZipStreamReader::next
/// [`entry`]: ZipStreamReader::entry
/// [`err`]: ZipStreamReader::err
pub struct ZipStreamReader<R: Read> {
    reader: BufReader<R>,
    cur: Option<EntryData>,
    err: Option<ZipError>,
    local_file_end: bool,
    header_pending: bool,
}

impl<R: Read> ZipStreamReader<R> {
    /// Creates a new `ZipStreamReader`. The source is buffered internally.
    pub fn new(reader: R) -> ZipStreamReader<R> {
        ZipStreamReader {
            reader: BufReader::new(reader),
            cur: None,
            err: None,
            local_file_end: false,
            header_pending: false,
        }
    }

    /// Advances to the next local file entry, reporting whether one exists.
    ///
    /// If the previous entry was not read to its end, its remaining payload
    /// (and trailing data descriptor, if any) is drained first so the stream
    /// stays aligned. When this returns `false`, [`err`](ZipStreamReader::err)
    /// distinguishes the clean end of the local-file section from a failure.
    pub fn next(&mut self) -> bool {
        if self.err.is_some() || self.local_file_end {
            return false;
        }
        if let Err(err) = self.finish_current() {
            self.err = Some(err);
            return false;
        }
        let signature = match self.reader.read_u32::<LittleEndian>() {
            Ok(signature) => signature,
            Err(err) => {
                self.err = Some(ZipError::from(err));
                return false;
            }
        };
        match signature {
            spec::LOCAL_FILE_HEADER_SIGNATURE => {
                self.header_pending = true;
                true
            }
            spec::CENTRAL_DIRECTORY_HEADER_SIGNATURE | spec::CENTRAL_DIRECTORY_END_SIGNATURE => {
                debug!("end of local file section (signature {signature:#010x})");
                self.local_file_end = true;
                false
            }
            _ => {
                self.err = Some(ZipError::InvalidArchive(
                    "invalid local file header signature",
                ));
                false
            }
        }
    }

    /// Parses the header found by the last successful [`next`] and returns a
    /// handle to the entry. Must be called at most once per `next`.
    ///
    /// [`next`]: ZipStreamReader::next
    pub fn entry(&mut self) -> ZipResult<ZipEntry<'_, R>> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        if !self.header_pending {
            return Err(ZipError::InvalidState(
                "entry() requires a successful call to next()",
            ));
        }
        self.header_pending = false;
        let data = match read_entry_data(&mut self.reader) {
            Ok(data) => data,
            Err(err) => {
                self.err = Some(err.clone());
                return Err(err);
            }
        };
        let data = self.cur.insert(data);
        Ok(ZipEntry {
            data,
            reader: &mut self.reader,
        })
    }

    /// Convenience fusing [`next`] and [`entry`]: `Ok(None)` marks the clean
    /// end of the local-file section.
    ///
    /// [`next`]: ZipStreamReader::next
    /// [`entry`]: ZipStreamReader::entry
    pub fn next_entry(&mut self) -> ZipResult<Option<ZipEntry<'_, R>>> {
        if self.next() {
            return self.entry().map(Some);
        }
        match &self.err {
            Some(err) => Err(err.clone()),
            None => Ok(None),
        }
    }

    /// The sticky error, if iteration has failed.
    pub fn err(&self) -> Option<&ZipError> {
        self.err.as_ref()
    }

    /// Drains whatever of the current entry the caller left behind,
    /// including a header that `entry()` was never called for.
    fn finish_current(&mut self) -> ZipResult<()> {
        if self.header_pending {
            self.header_pending = false;
            self.cur = Some(read_entry_data(&mut self.reader)?);
        }
        let Some(entry) = self.cur.as_mut() else {
            return Ok(());
        };
        // Entry failures are fatal for the driver as well.
        if let Some(err) = entry.err.clone() {
            return Err(err);
        }
        if !entry.eof {
            if entry.opened {
                return Err(ZipError::InvalidState(
                    "previous entry reader was leaked before reaching its end",
                ));
            }
            EntryReader::open(entry, &mut self.reader, false)?.close()?;
        }
        self.cur = None;
        Ok(())
    }
}

/// Parses the fixed local file header (the 4-byte signature has already been
/// consumed), the name, the extra area, and derives the effective sizes and
/// modification time.
fn read_entry_data<R: Read>(reader: &mut BufReader<R>) -> ZipResult<EntryData> {
    let reader_version = reader.read_u16::<LittleEndian>()?;
    let flags = reader.read_u16::<LittleEndian>()?;
    let method = reader.read_u16::<LittleEndian>()?;
    let mod_time = reader.read_u16::<LittleEndian>()?;
    let mod_date = reader.read_u16::<LittleEndian>()?;
    let crc32 = reader.read_u32::<LittleEndian>()?;
    let compressed_size = reader.read_u32::<LittleEndian>()?;
    let uncompressed_size = reader.read_u32::<LittleEndian>()?;
    let name_len = reader.read_u16::<LittleEndian>()? as usize;
    let extra_len = reader.read_u16::<LittleEndian>()? as usize;

    let mut name_raw = vec![0u8; name_len];
    reader.read_exact(&mut name_raw)?;
    let mut extra = vec![0u8; extra_len];
    reader.read_exact(&mut extra)?;

    if flags & 1 != 0 {
        return Err(ZipError::UnsupportedArchive(
            "encrypted entries are not supported",
        ));
    }
    // A stored entry followed by a descriptor cannot be located: without a
    // known size and without deflate self-termination there is no way to
    // find where it ends.
    if flags & 8 != 0 && method != CompressionMethod::Deflated.to_u16() {
        return Err(ZipError::UnsupportedArchive(
            "only deflated entries may use a data descriptor",
        ));
    }

    let name = if flags & (1 << 11) != 0 {
        String::from_utf8_lossy(&name_raw).into_owned()
    } else {
        name_raw.clone().from_cp437()
    };

    let parsed = extra_fields::parse(
        &extra,
        compressed_size == u32::MAX,
        uncompressed_size == u32::MAX,
    )?;
    let compressed_size64 = match parsed.compressed_size64 {
        Some(promoted) => promoted,
        None if compressed_size == u32::MAX => {
            return Err(ZipError::InvalidArchive(
                "compressed size deferred to a missing zip64 extra",
            ));
        }
        None => compressed_size as u64,
    };
    let uncompressed_size64 = parsed
        .uncompressed_size64
        .unwrap_or(uncompressed_size as u64);

    let modified = types::resolve_modified(mod_date, mod_time, parsed.modified);

    debug!("local file header: name={name:?} method={method} flags={flags:#06x}");

    Ok(EntryData {
        reader_version,
        flags,
        method,
        crc32,
        compressed_size64,
        uncompressed_size64,
        name,
        name_raw,
        extra,
        modified,
        zip64: parsed.zip64,
        opened: false,
        eof: false,
        err: None,
    })
}

/// A single entry of the archive, borrowed from the driver.
///
/// Metadata read from the local header is available immediately; for entries
/// written in streaming mode (data descriptor), `crc32` and the sizes take
/// their final values only once the entry has been read to its end.
pub struct ZipEntry<'a, R: Read> {
    data: &'a mut EntryData,
    reader: &'a mut BufReader<R>,
}

impl<'a, R: Read> fmt::Debug for ZipEntry<'a, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZipEntry").finish_non_exhaustive()
    }
}

impl<'a, R: Read> ZipEntry<'a, R> {
    /// The entry name as stored in the local header, decoded as UTF-8 when
    /// general-purpose bit 11 is set and as CP437 otherwise.
    ///
    /// # Warnings
    ///
    /// It is dangerous to use this name directly when extracting an archive.
    /// It may contain an absolute path (`/etc/shadow`), or break out of the
    /// current directory (`../runtime`). Sanitize it before using it as a
    /// filesystem path.
    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// The name in its raw (undecoded) byte representation.
    pub fn name_raw(&self) -> &[u8] {
        &self.data.name_raw
    }

    /// The entry comment. Comments live in the central directory, which a
    /// streaming reader never sees, so this is always empty.
    pub fn comment(&self) -> &str {
        ""
    }

    /// Version needed to extract, as declared by the local header.
    pub fn reader_version(&self) -> u16 {
        self.data.reader_version
    }

    /// The general-purpose bit flags.
    pub fn flags(&self) -> u16 {
        self.data.flags
    }

    /// The compression method used to store the entry.
    pub fn compression(&self) -> CompressionMethod {
        CompressionMethod::from_u16(self.data.method)
    }

    /// The declared CRC-32 of the decoded contents; for data-descriptor
    /// entries this is 0 until the entry has been read to its end.
    pub fn crc32(&self) -> u32 {
        self.data.crc32
    }

    /// Size of the compressed payload in bytes (64-bit effective value).
    pub fn compressed_size(&self) -> u64 {
        self.data.compressed_size64
    }

    /// Size of the decoded contents in bytes (64-bit effective value).
    pub fn uncompressed_size(&self) -> u64 {
        self.data.uncompressed_size64
    }

    /// The modification time, in a fixed-offset zone estimated from the
    /// header's MS-DOS and extended timestamps. A UTC offset means no
    /// extended timestamp was present (or it matched the MS-DOS one).
    pub fn modified(&self) -> time::OffsetDateTime {
        self.data.modified
    }

    /// The raw bytes of the local-header extra area.
    pub fn extra(&self) -> &[u8] {
        &self.data.extra
    }

    /// Whether the name ends with a forward slash, marking a directory.
    pub fn is_dir(&self) -> bool {
        self.data.is_dir()
    }

    /// Whether the entry is a regular file.
    pub fn is_file(&self) -> bool {
        !self.is_dir()
    }

    /// Whether the sizes and CRC trail the payload in a data descriptor
    /// (general-purpose bit 3).
    pub fn has_data_descriptor(&self) -> bool {
        self.data.has_data_descriptor()
    }

    /// Whether a Zip64 extra record was present or a Zip64 data descriptor
    /// was consumed.
    pub fn is_zip64(&self) -> bool {
        self.data.zip64
    }

    /// Opens the entry for reading its decoded contents.
    ///
    /// The returned reader validates byte counts and the CRC-32 at EOF and,
    /// for streaming entries, consumes the trailing data descriptor. Each
    /// entry can be opened once; opening again or after the entry has been
    /// read fails with [`ZipError::InvalidState`].
    pub fn open(&mut self) -> ZipResult<EntryReader<'_, R>> {
        EntryReader::open(self.data, self.reader, false)
    }

    /// Opens the entry for reading its original compressed bytes.
    ///
    /// No CRC is verified; checking decoded contents is the caller's duty.
    /// For stored entries this is the same as [`open`](ZipEntry::open). For
    /// streaming (data-descriptor) entries a deflate decoder runs alongside
    /// the reads, solely to find where the compressed stream ends; the
    /// caller still observes the exact compressed byte sequence.
    pub fn open_raw(&mut self) -> ZipResult<EntryReader<'_, R>> {
        EntryReader::open(self.data, self.reader, true)
    }

    /// Reads the entry to its end without keeping the contents, leaving the
    /// stream positioned at the next record.
    pub fn skip(&mut self) -> ZipResult<()> {
        if let Some(err) = self.data.err.clone() {
            return Err(err);
        }
        if self.data.eof {
            return Ok(());
        }
        EntryReader::open(self.data, self.reader, false)?.close()
    }
}

/// The byte source shaped for one entry: a zero-length or length-capped view
/// when the compressed size is known up front, the bare source when only the
/// deflate stream itself can reveal the end.
enum EntrySource<'a, R: Read> {
    Bounded(CountingReader<Take<&'a mut BufReader<R>>>),
    Streaming(CountingReader<&'a mut BufReader<R>>),
}

impl<'a, R: Read> EntrySource<'a, R> {
    fn bounded(reader: &'a mut BufReader<R>, limit: u64) -> EntrySource<'a, R> {
        EntrySource::Bounded(CountingReader::new(reader.take(limit)))
    }

    fn streaming(reader: &'a mut BufReader<R>) -> EntrySource<'a, R> {
        EntrySource::Streaming(CountingReader::new(reader))
    }

    /// Compressed bytes consumed so far.
    fn nread(&self) -> u64 {
        match self {
            EntrySource::Bounded(counting) => counting.nread(),
            EntrySource::Streaming(counting) => counting.nread(),
        }
    }

    /// The underlying buffered source, for reading the records that follow
    /// the compressed payload (these must not count as payload bytes).
    fn stream_mut(&mut self) -> &mut BufReader<R> {
        match self {
            EntrySource::Bounded(counting) => counting.get_mut().get_mut(),
            EntrySource::Streaming(counting) => counting.get_mut(),
        }
    }
}

impl<'a, R: Read> Read for EntrySource<'a, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            EntrySource::Bounded(counting) => counting.read(buf),
            EntrySource::Streaming(counting) => counting.read(buf),
        }
    }
}

impl<'a, R: Read> BufRead for EntrySource<'a, R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            EntrySource::Bounded(counting) => counting.fill_buf(),
            EntrySource::Streaming(counting) => counting.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            EntrySource::Bounded(counting) => counting.consume(amt),
            EntrySource::Streaming(counting) => counting.consume(amt),
        }
    }
}

enum EntryReaderKind<'a, R: Read> {
    /// Decoded reads with the compressed size known up front; the decoder
    /// comes from the registry.
    Decode {
        decoder: Box<dyn Read + 'a>,
        hasher: Hasher,
        produced: u64,
    },
    /// Decoded reads in data-descriptor mode. The inflater is held directly
    /// (descriptor entries are guaranteed deflate) so the source can be
    /// reclaimed at stream end to consume the trailing descriptor.
    DecodeStreaming {
        decoder: Deflater<EntrySource<'a, R>>,
        hasher: Hasher,
        produced: u64,
    },
    /// Raw reads with the compressed size known up front; a pass-through
    /// over the bounded source.
    Raw { source: EntrySource<'a, R> },
    /// Raw reads in data-descriptor mode: an inflater consumes the shared
    /// source to find the end of the deflate stream, and every byte it
    /// consumes is handed to the caller verbatim, in order. Its decoded
    /// output is discarded into a pooled scratch buffer, counted only to
    /// pick the descriptor width.
    RawStreaming {
        source: EntrySource<'a, R>,
        inflate: Box<Decompress>,
        scratch: Vec<u8>,
        produced: u64,
    },
}

/// Scoped reader over one entry's bytes, created by [`ZipEntry::open`] or
/// [`ZipEntry::open_raw`].
///
/// At EOF the reader has validated sizes (and CRC, for decoded reads) and
/// consumed any trailing data descriptor, leaving the stream positioned at
/// the next record. Errors are sticky. Dropping the reader before EOF drains
/// the remainder of the entry; [`close`](EntryReader::close) does the same
/// while reporting any failure.
pub struct EntryReader<'a, R: Read> {
    entry: &'a mut EntryData,
    inner: EntryReaderKind<'a, R>,
}

impl<'a, R: Read> fmt::Debug for EntryReader<'a, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryReader").finish_non_exhaustive()
    }
}

impl<'a, R: Read> EntryReader<'a, R> {
    fn open(
        entry: &'a mut EntryData,
        reader: &'a mut BufReader<R>,
        raw: bool,
    ) -> ZipResult<EntryReader<'a, R>> {
        if let Some(err) = entry.err.clone() {
            return Err(err);
        }
        if entry.eof {
            return Err(ZipError::InvalidState(
                "entry has already been read to its end",
            ));
        }
        if entry.opened {
            return Err(ZipError::InvalidState("repeated open is not supported"));
        }

        // Raw reads of a stored entry are the same bytes as decoded reads;
        // take the validating path.
        let raw = raw && entry.method != CompressionMethod::Stored.to_u16();
        let streaming = entry.has_data_descriptor() && !entry.is_dir();

        let inner = if raw {
            if streaming {
                EntryReaderKind::RawStreaming {
                    source: EntrySource::streaming(reader),
                    inflate: Box::new(Decompress::new(false)),
                    scratch: util::take_buffer(),
                    produced: 0,
                }
            } else {
                let limit = if entry.is_dir() {
                    0
                } else {
                    entry.compressed_size64
                };
                EntryReaderKind::Raw {
                    source: EntrySource::bounded(reader, limit),
                }
            }
        } else if streaming {
            EntryReaderKind::DecodeStreaming {
                decoder: Deflater::new(EntrySource::streaming(reader)),
                hasher: Hasher::new(),
                produced: 0,
            }
        } else {
            let decompress = decompressor(entry.method)
                .ok_or(ZipError::UnsupportedArchive("compression method not supported"))?;
            let limit = if entry.is_dir() {
                0
            } else {
                entry.compressed_size64
            };
            let source: Box<dyn BufRead + 'a> = Box::new(EntrySource::bounded(reader, limit));
            EntryReaderKind::Decode {
                decoder: decompress(source),
                hasher: Hasher::new(),
                produced: 0,
            }
        };

        entry.opened = true;
        Ok(EntryReader { entry, inner })
    }

    /// Reads the entry to its end and reports any failure met on the way.
    /// Consuming the reader makes a second close (and reads after close)
    /// unrepresentable; dropping after `close` is a no-op.
    pub fn close(mut self) -> ZipResult<()> {
        self.drain()
    }

    fn drain(&mut self) -> ZipResult<()> {
        if let Some(err) = self.entry.err.clone() {
            return Err(err);
        }
        let mut buf = util::take_buffer();
        let mut result = Ok(());
        while !self.entry.eof {
            match self.read_inner(&mut buf) {
                Ok(_) => {}
                Err(err) => {
                    self.entry.err = Some(err.clone());
                    result = Err(err);
                    break;
                }
            }
        }
        util::recycle_buffer(buf);
        result
    }

    fn read_inner(&mut self, buf: &mut [u8]) -> ZipResult<usize> {
        match &mut self.inner {
            EntryReaderKind::Decode {
                decoder,
                hasher,
                produced,
            } => {
                let n = decoder.read(buf)?;
                hasher.update(&buf[..n]);
                *produced += n as u64;
                if n == 0 {
                    let crc = hasher.clone().finalize();
                    finish_decoded(self.entry, *produced, crc)?;
                }
                Ok(n)
            }
            EntryReaderKind::DecodeStreaming {
                decoder,
                hasher,
                produced,
            } => {
                let n = decoder.read(buf)?;
                hasher.update(&buf[..n]);
                *produced += n as u64;
                if n == 0 {
                    let crc = hasher.clone().finalize();
                    let produced = *produced;
                    let source = decoder.get_mut();
                    if produced != self.entry.uncompressed_size64
                        && self.entry.uncompressed_size64 > 0
                    {
                        return Err(ZipError::UnexpectedEof(
                            "decoded entry ended before its declared size",
                        ));
                    }
                    read_data_descriptor(self.entry, source, produced)?;
                    if source.nread() != self.entry.compressed_size64 {
                        return Err(ZipError::SizeMismatch {
                            field: "compressed",
                            declared: self.entry.compressed_size64,
                            observed: source.nread(),
                        });
                    }
                    if produced != self.entry.uncompressed_size64 {
                        return Err(ZipError::SizeMismatch {
                            field: "uncompressed",
                            declared: self.entry.uncompressed_size64,
                            observed: produced,
                        });
                    }
                    self.entry.eof = true;
                    if self.entry.crc32 != 0 && crc != self.entry.crc32 {
                        return Err(ZipError::Crc32Mismatch {
                            expected: self.entry.crc32,
                            actual: crc,
                        });
                    }
                }
                Ok(n)
            }
            EntryReaderKind::Raw { source } => {
                let n = source.read(buf).map_err(ZipError::from)?;
                if n == 0 {
                    if self.entry.compressed_size64 > 0
                        && source.nread() != self.entry.compressed_size64
                    {
                        return Err(ZipError::UnexpectedEof(
                            "compressed data ended before its declared size",
                        ));
                    }
                    self.entry.eof = true;
                }
                Ok(n)
            }
            EntryReaderKind::RawStreaming {
                source,
                inflate,
                scratch,
                produced,
            } => {
                let (consumed, stream_end) = {
                    let input = source.fill_buf().map_err(ZipError::from)?;
                    if input.is_empty() {
                        return Err(ZipError::UnexpectedEof(
                            "byte source ended inside a deflate stream",
                        ));
                    }
                    // Feed the inflater at most the caller's appetite; the
                    // consumed prefix is exactly what the caller receives.
                    let want = input.len().min(buf.len());
                    let mut consumed = 0usize;
                    let mut stream_end = false;
                    while consumed < want && !stream_end {
                        let before_in = inflate.total_in();
                        let before_out = inflate.total_out();
                        let status = inflate
                            .decompress(&input[consumed..want], scratch, FlushDecompress::None)
                            .map_err(|_| ZipError::InvalidArchive("corrupt deflate stream"))?;
                        let in_delta = (inflate.total_in() - before_in) as usize;
                        let out_delta = inflate.total_out() - before_out;
                        consumed += in_delta;
                        *produced += out_delta;
                        match status {
                            Status::StreamEnd => stream_end = true,
                            Status::Ok | Status::BufError => {
                                if in_delta == 0 && out_delta == 0 {
                                    return Err(ZipError::InvalidArchive(
                                        "deflate stream made no progress",
                                    ));
                                }
                            }
                        }
                    }
                    buf[..consumed].copy_from_slice(&input[..consumed]);
                    (consumed, stream_end)
                };
                source.consume(consumed);
                if stream_end {
                    let produced = *produced;
                    read_data_descriptor(self.entry, source, produced)?;
                    if self.entry.compressed_size64 > 0
                        && source.nread() != self.entry.compressed_size64
                    {
                        return Err(ZipError::SizeMismatch {
                            field: "compressed",
                            declared: self.entry.compressed_size64,
                            observed: source.nread(),
                        });
                    }
                    self.entry.eof = true;
                }
                Ok(consumed)
            }
        }
    }
}

impl<'a, R: Read> Read for EntryReader<'a, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(err) = &self.entry.err {
            return Err(err.clone().into());
        }
        if self.entry.eof || buf.is_empty() {
            return Ok(0);
        }
        match self.read_inner(buf) {
            Ok(n) => Ok(n),
            Err(err) => {
                self.entry.err = Some(err.clone());
                Err(err.into())
            }
        }
    }
}

impl<'a, R: Read> Drop for EntryReader<'a, R> {
    fn drop(&mut self) {
        if !self.entry.eof && self.entry.err.is_none() {
            let _ = self.drain();
        }
        if let EntryReaderKind::RawStreaming { scratch, .. } = &mut self.inner {
            util::recycle_buffer(std::mem::take(scratch));
        }
    }
}

/// Consumes the trailing data descriptor and rewrites the entry's CRC and
/// sizes from it. The 20-byte Zip64 form is selected when either observed
/// count overflows 32 bits. Descriptor bytes are read from the source
/// directly, past the counting layer.
fn read_data_descriptor<R: Read>(
    entry: &mut EntryData,
    source: &mut EntrySource<'_, R>,
    produced: u64,
) -> ZipResult<()> {
    let zip64 = source.nread() > spec::ZIP64_BYTES_THR || produced > spec::ZIP64_BYTES_THR;
    let descriptor = DataDescriptor::read(source.stream_mut(), zip64)?;
    debug!(
        "data descriptor: crc32={:#010x} compressed={} uncompressed={} zip64={zip64}",
        descriptor.crc32, descriptor.compressed_size, descriptor.uncompressed_size
    );
    entry.crc32 = descriptor.crc32;
    entry.compressed_size64 = descriptor.compressed_size;
    entry.uncompressed_size64 = descriptor.uncompressed_size;
    entry.zip64 = entry.zip64 || zip64;
    Ok(())
}

/// EOF handling for decoded reads when the compressed size was known up
/// front: the produced byte count and the CRC must match the header.
fn finish_decoded(entry: &mut EntryData, produced: u64, crc: u32) -> ZipResult<()> {
    if entry.uncompressed_size64 > 0 && produced != entry.uncompressed_size64 {
        return Err(ZipError::UnexpectedEof(
            "decoded entry ended before its declared size",
        ));
    }
    entry.eof = true;
    if entry.crc32 != 0 && crc != entry.crc32 {
        return Err(ZipError::Crc32Mismatch {
            expected: entry.crc32,
            actual: crc,
        });
    }
    Ok(())
}
