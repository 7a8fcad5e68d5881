//! Internal I/O helpers shared by the entry readers

use std::io::{self, BufRead, Read};
use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;

/// Size of the pooled scratch buffers used for draining entries and for the
/// discard output of the raw streaming decoder.
pub(crate) const SCRATCH_LEN: usize = 16 * 1024;

const POOL_LIMIT: usize = 8;

static BUF_POOL: Lazy<Mutex<Vec<Vec<u8>>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Checks a scratch buffer out of the process-wide pool.
pub(crate) fn take_buffer() -> Vec<u8> {
    let mut pool = BUF_POOL.lock().unwrap_or_else(PoisonError::into_inner);
    pool.pop().unwrap_or_else(|| vec![0; SCRATCH_LEN])
}

/// Returns a scratch buffer to the pool. Foreign-sized buffers are dropped.
pub(crate) fn recycle_buffer(buf: Vec<u8>) {
    if buf.len() != SCRATCH_LEN {
        return;
    }
    let mut pool = BUF_POOL.lock().unwrap_or_else(PoisonError::into_inner);
    if pool.len() < POOL_LIMIT {
        pool.push(buf);
    }
}

/// Reader decorator that tracks how many raw bytes have been taken from its
/// inner reader, whether through `read` or through `fill_buf`/`consume`.
///
/// The count is what recovers the true compressed length of an entry whose
/// local header declared the sizes as unknown.
pub(crate) struct CountingReader<R> {
    inner: R,
    count: u64,
}

impl<R> CountingReader<R> {
    pub(crate) fn new(inner: R) -> CountingReader<R> {
        CountingReader { inner, count: 0 }
    }

    /// Number of bytes consumed from the inner reader so far.
    pub(crate) fn nread(&self) -> u64 {
        self.count
    }

    pub(crate) fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}

impl<R: BufRead> BufRead for CountingReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.count += amt as u64;
        self.inner.consume(amt);
    }
}
