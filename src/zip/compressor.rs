//! Raw deflate over a sequence of input spans.
//!
//! ZIP stores deflate data without the zlib header and trailer, so the
//! encoder is created with `zlib_header = false` (the equivalent of a negative
//! window size in zlib). The spans are compressed as one logical stream into
//! a single buffer. The buffer starts at [`deflate_bound`] and grows if the
//! encoder still has output pending.

use anyhow::{Result, bail};
use flate2::{Compress, Compression, FlushCompress, Status};

use crate::error::ArchiveError;

/// Expected upper bound on the deflate output for `len` input bytes.
///
/// zlib's `compressBound` is too tight for miniz at level 1, which can emit
/// Huffman blocks slightly larger than the input on incompressible data.
/// This allows 1/64 of expansion plus room for the block headers and the
/// end of stream. The session still grows its buffer if a backend exceeds it.
pub fn deflate_bound(len: u64) -> u64 {
    len + (len >> 6) + 64
}

/// Minimum extra capacity reserved when the output buffer is full
const GROW_STEP: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Ready,
    Streaming,
    Finished,
}

/// One raw-deflate stream fed in spans.
///
/// `push` any number of intermediate spans, then `finish` with the last one.
/// `finish` is the only way into [`SessionState::Finished`]; the session
/// rejects further input afterwards.
pub struct DeflateSession {
    encoder: Compress,
    output: Vec<u8>,
    expected_input: u64,
    state: SessionState,
}

impl DeflateSession {
    /// Start a session for `total_input` bytes spread across all spans.
    pub fn new(total_input: u64, level: Compression) -> Self {
        Self {
            encoder: Compress::new(level, false),
            output: Vec::with_capacity(deflate_bound(total_input) as usize),
            expected_input: total_input,
            state: SessionState::Ready,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Bytes consumed by the encoder so far
    pub fn total_in(&self) -> u64 {
        self.encoder.total_in()
    }

    /// Bytes produced by the encoder so far
    pub fn total_out(&self) -> u64 {
        self.encoder.total_out()
    }

    /// Feed an intermediate span. The encoder may keep it buffered.
    pub fn push(&mut self, span: &[u8]) -> Result<()> {
        let status = self.feed(span, FlushCompress::None)?;
        if !matches!(status, Status::Ok | Status::BufError) {
            bail!(ArchiveError::Compressor(format!(
                "unexpected status {status:?} before end of input"
            )));
        }
        self.state = SessionState::Streaming;
        Ok(())
    }

    /// Feed the last span and terminate the stream.
    ///
    /// Returns the total compressed length.
    pub fn finish(&mut self, span: &[u8]) -> Result<usize> {
        let status = self.feed(span, FlushCompress::Finish)?;
        if status != Status::StreamEnd {
            bail!(ArchiveError::Compressor(format!(
                "stream did not end after finish (status {status:?})"
            )));
        }
        if self.total_in() != self.expected_input {
            bail!(ArchiveError::Compressor(format!(
                "consumed {} bytes, expected {}",
                self.total_in(),
                self.expected_input
            )));
        }
        self.state = SessionState::Finished;
        Ok(self.output.len())
    }

    /// Compressed bytes produced so far
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn into_output(self) -> Vec<u8> {
        self.output
    }

    fn feed(&mut self, mut span: &[u8], flush: FlushCompress) -> Result<Status> {
        if self.state == SessionState::Finished {
            bail!(ArchiveError::Compressor("input after the stream was finished".into()));
        }

        let finishing = matches!(flush, FlushCompress::Finish);
        loop {
            // compress_vec only writes into spare capacity
            if self.output.len() == self.output.capacity() {
                self.output.reserve(span.len().max(GROW_STEP));
            }

            let in_before = self.encoder.total_in();
            let out_before = self.encoder.total_out();
            let status = self
                .encoder
                .compress_vec(span, &mut self.output, flush)
                .map_err(|e| ArchiveError::Compressor(e.to_string()))?;

            let consumed = (self.encoder.total_in() - in_before) as usize;
            span = &span[consumed..];

            let done = if finishing {
                status == Status::StreamEnd
            } else {
                span.is_empty()
            };
            if done {
                return Ok(status);
            }

            let progressed = consumed > 0 || self.encoder.total_out() > out_before;
            if !progressed && self.output.len() < self.output.capacity() {
                bail!(ArchiveError::Compressor(format!(
                    "encoder stalled with {} input bytes left (status {status:?})",
                    span.len()
                )));
            }
        }
    }
}

/// Compress `spans` as one stream and return the raw deflate bytes.
pub fn compress_chunks(spans: &[&[u8]], level: Compression) -> Result<Vec<u8>> {
    let total: u64 = spans.iter().map(|s| s.len() as u64).sum();
    let mut session = DeflateSession::new(total, level);

    match spans.split_last() {
        Some((last, init)) => {
            for span in init {
                session.push(span)?;
            }
            session.finish(last)?;
        }
        None => {
            session.finish(&[])?;
        }
    }

    Ok(session.into_output())
}
