//! Streaming MessagePack unpacker.
//!
//! Bytes arrive either through [`Unpacker::feed`] or by pulling from a bound
//! [`std::io::Read`] source. Objects are decoded from the commit offset; a
//! partial object leaves the offset where it was until its last byte
//! arrives.
//!
//! An `Unpacker` is single-owner state. Every mutating operation takes
//! `&mut self`, so one instance is never fed and drained concurrently.

use std::io::{ErrorKind, Read};

use log::{debug, trace, warn};

use crate::decoder::{decode_one, decode_span, Decoded, Scan};
use crate::{DecodeError, Value};

/// Default number of bytes requested from a source per pull.
pub const DEFAULT_READ_SIZE: usize = 8 * 1024;

/// Committed bytes are dropped from the buffer once they pass this size or
/// half of the buffer.
const COMPACT_THRESHOLD: usize = 8 * 1024;

pub type ByteSource = Box<dyn Read + Send>;

pub struct Unpacker {
    buffer: Vec<u8>,
    /// Commit offset into `buffer`; everything before it is consumed.
    offset: usize,
    data: Option<Value>,
    finished: bool,
    /// Progress through the object pending at `offset`, kept across retries.
    scan: Option<Scan>,
    source: Option<ByteSource>,
    read_size: usize,
}

impl Default for Unpacker {
    fn default() -> Self {
        Self::new()
    }
}

enum Pull {
    Read,
    NoSource,
    Exhausted,
}

impl Unpacker {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            offset: 0,
            data: None,
            finished: false,
            scan: None,
            source: None,
            read_size: DEFAULT_READ_SIZE,
        }
    }

    /// Creates an unpacker that pulls its input from `source`.
    pub fn with_source<R: Read + Send + 'static>(source: R) -> Self {
        let mut unpacker = Self::new();
        unpacker.set_source(source);
        unpacker
    }

    /// Sets how many bytes each pull asks the source for.
    pub fn with_read_size(mut self, read_size: usize) -> Self {
        self.read_size = read_size.max(1);
        self
    }

    /// Binds a pull source. Bytes already buffered are decoded first.
    pub fn set_source<R: Read + Send + 'static>(&mut self, source: R) {
        self.source = Some(Box::new(source));
    }

    /// Unbinds and returns the current source.
    pub fn take_source(&mut self) -> Option<ByteSource> {
        self.source.take()
    }

    /// Appends bytes to the internal buffer without parsing them.
    pub fn feed(&mut self, bytes: &[u8]) {
        trace!("feed: {} bytes, {} pending", bytes.len(), self.pending().len());
        self.buffer.extend_from_slice(bytes);
    }

    /// Buffered bytes past the commit offset.
    pub fn pending(&self) -> &[u8] {
        &self.buffer[self.offset..]
    }

    /// Decodes one object from `buffer` at `offset`.
    ///
    /// Returns the offset just past the object, or `offset` itself when the
    /// buffer ends first. Only `data()` and `finished()` are affected; the
    /// internal buffer is not touched.
    pub fn execute(&mut self, buffer: &[u8], offset: usize) -> Result<usize, DecodeError> {
        self.execute_window(buffer, offset, buffer.len())
    }

    /// Like [`Unpacker::execute`] but reads at most `limit` bytes starting at
    /// `offset`.
    pub fn execute_limit(
        &mut self,
        buffer: &[u8],
        offset: usize,
        limit: usize,
    ) -> Result<usize, DecodeError> {
        self.execute_window(buffer, offset, offset.saturating_add(limit))
    }

    fn execute_window(
        &mut self,
        buffer: &[u8],
        offset: usize,
        end: usize,
    ) -> Result<usize, DecodeError> {
        match decode_one(buffer, offset, end) {
            Ok(Decoded::Complete { value, offset: next }) => {
                self.data = Some(value);
                self.finished = true;
                Ok(next)
            }
            Ok(Decoded::Incomplete) => {
                self.finished = false;
                Ok(offset)
            }
            Err(err) => {
                warn!("execute at offset {}: {}", offset, err);
                self.finished = false;
                Err(err)
            }
        }
    }

    /// `true` when the last `execute` call produced a value.
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// The value produced by the last successful `execute` call.
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Decodes the next object from the commit offset.
    ///
    /// With a source bound, more bytes are pulled only while the pending
    /// bytes cannot complete an object. `Ok(None)` means no further object is
    /// available right now. A source that runs dry in the middle of an object
    /// yields [`DecodeError::Truncated`].
    pub fn next_value(&mut self) -> Result<Option<Value>, DecodeError> {
        loop {
            let scan = self.scan.get_or_insert_with(|| Scan::new(self.offset));
            let scanned = scan.advance(&self.buffer, self.buffer.len());
            let decoded = match scanned {
                Ok(Some(end)) => decode_span(&self.buffer, self.offset, end),
                Ok(None) => Ok(Decoded::Incomplete),
                Err(err) => Err(err),
            }
            .map_err(|err| {
                warn!("malformed input at offset {}: {}", self.offset, err);
                err
            })?;
            match decoded {
                Decoded::Complete { value, offset } => {
                    trace!("decoded {} ({} bytes)", value.shape(), offset - self.offset);
                    self.offset = offset;
                    self.scan = None;
                    self.compact();
                    return Ok(Some(value));
                }
                Decoded::Incomplete => match self.pull()? {
                    Pull::Read => continue,
                    Pull::NoSource => return Ok(None),
                    Pull::Exhausted if self.pending().is_empty() => return Ok(None),
                    Pull::Exhausted => {
                        let pending = self.pending().len();
                        warn!("source exhausted with {} bytes of a partial object", pending);
                        return Err(DecodeError::Truncated { pending });
                    }
                },
            }
        }
    }

    /// Lazily yields every object that can be completed from the commit
    /// offset. Calling it again later resumes after the last emitted object.
    pub fn each(&mut self) -> Values<'_> {
        Values {
            unpacker: self,
            done: false,
        }
    }

    /// Passes every available object to `sink`, in arrival order.
    pub fn each_with<F>(&mut self, mut sink: F) -> Result<(), DecodeError>
    where
        F: FnMut(Value),
    {
        for value in self.each() {
            sink(value?);
        }
        Ok(())
    }

    /// [`Unpacker::feed`] followed by [`Unpacker::each_with`].
    pub fn feed_each<F>(&mut self, bytes: &[u8], sink: F) -> Result<(), DecodeError>
    where
        F: FnMut(Value),
    {
        self.feed(bytes);
        self.each_with(sink)
    }

    /// Does nothing. Sources are only read on demand while iterating.
    pub fn fill(&self) {}

    /// Forgets all buffered bytes and the last decoded value.
    ///
    /// The bound source, if any, stays bound; bytes already pulled from it
    /// are discarded with the rest of the buffer.
    pub fn reset(&mut self) {
        debug!("reset: dropping {} pending bytes", self.pending().len());
        self.buffer.clear();
        self.offset = 0;
        self.data = None;
        self.finished = false;
        self.scan = None;
    }

    fn pull(&mut self) -> Result<Pull, DecodeError> {
        let Some(source) = self.source.as_mut() else {
            return Ok(Pull::NoSource);
        };
        let start = self.buffer.len();
        self.buffer.resize(start + self.read_size, 0);
        let read = loop {
            match source.read(&mut self.buffer[start..]) {
                Ok(n) => break n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.buffer.truncate(start);
                    return Err(err.into());
                }
            }
        };
        self.buffer.truncate(start + read);
        debug!("pulled {} bytes from source", read);
        Ok(if read == 0 {
            Pull::Exhausted
        } else {
            Pull::Read
        })
    }

    fn compact(&mut self) {
        if self.offset == 0 {
            return;
        }
        if self.offset == self.buffer.len() {
            self.buffer.clear();
            self.offset = 0;
            return;
        }
        if self.offset >= COMPACT_THRESHOLD || self.offset * 2 >= self.buffer.len() {
            self.buffer.drain(..self.offset);
            self.offset = 0;
        }
    }
}

/// Iterator returned by [`Unpacker::each`]. Stops after the first error.
pub struct Values<'u> {
    unpacker: &'u mut Unpacker,
    done: bool,
}

impl Iterator for Values<'_> {
    type Item = Result<Value, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.unpacker.next_value() {
            Ok(Some(value)) => Some(Ok(value)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl std::iter::FusedIterator for Values<'_> {}
