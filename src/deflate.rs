//! Bounded inflate over a buffered source
//!
//! The decoder consumes from the source only what the deflate stream itself
//! used, so the byte immediately after the stream is still unconsumed when
//! EOF is reported. Entry readers rely on this to locate the trailing data
//! descriptor of streamed entries.

use std::io::{self, BufRead, Read};

use flate2::{Decompress, FlushDecompress, Status};

pub(crate) struct Deflater<S> {
    inner: S,
    transformer: Box<Decompress>,
    done: bool,
}

impl<S> Deflater<S> {
    pub(crate) fn new(inner: S) -> Deflater<S> {
        Deflater {
            inner,
            transformer: Box::new(Decompress::new(false)),
            done: false,
        }
    }

    pub(crate) fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: BufRead> Read for Deflater<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.done || buf.is_empty() {
            return Ok(0);
        }
        loop {
            let input = self.inner.fill_buf()?;
            let eof = input.is_empty();
            let before_out = self.transformer.total_out();
            let before_in = self.transformer.total_in();
            let flush = if eof {
                FlushDecompress::Finish
            } else {
                FlushDecompress::None
            };

            let ret = self.transformer.decompress(input, buf, flush);

            let num_read = (self.transformer.total_out() - before_out) as usize;
            let num_consumed = (self.transformer.total_in() - before_in) as usize;
            self.inner.consume(num_consumed);

            match ret {
                Ok(Status::StreamEnd) => {
                    self.done = true;
                    return Ok(num_read);
                }
                Ok(Status::Ok | Status::BufError) => {
                    if num_read > 0 {
                        return Ok(num_read);
                    }
                    if eof {
                        return Err(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            "deflate stream ended unexpectedly",
                        ));
                    }
                }
                Err(_) => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "corrupt deflate stream",
                    ));
                }
            }
        }
    }
}
