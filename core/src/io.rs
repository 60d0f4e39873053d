//! IO primitives around bytes.

use core::fmt::Debug;
use alloc::{format, vec::Vec};

use crate::JsonError;

/// A source of bytes.
///
/// This is deliberately minimal so it may be implemented for buffers and streams alike.
pub trait Read: Debug {
  /// The type for errors when reading.
  type Error: Debug;

  /// Read the next byte, yielding `None` once the input is exhausted.
  fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;
}

impl Read for &[u8] {
  type Error = core::convert::Infallible;

  #[inline(always)]
  fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
    let Some((first, rest)) = self.split_first() else { return Ok(None) };
    *self = rest;
    Ok(Some(*first))
  }
}

impl<R: Read> Read for &mut R {
  type Error = R::Error;

  #[inline(always)]
  fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
    (**self).read_byte()
  }
}

/// A sink for bytes.
pub trait Write {
  /// The type for errors when writing.
  type Error: Debug;

  /// Write the entire slice.
  fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

impl Write for Vec<u8> {
  type Error = core::convert::Infallible;

  #[inline(always)]
  fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
    self.extend_from_slice(bytes);
    Ok(())
  }
}

impl<W: Write> Write for &mut W {
  type Error = W::Error;

  #[inline(always)]
  fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
    (**self).write_all(bytes)
  }
}

/// A reader with a single byte of lookahead, tracking how many bytes have been consumed.
#[derive(Debug)]
pub(crate) struct PeekableRead<R: Read> {
  reader: R,
  peeked: Option<Option<u8>>,
  offset: usize,
}

impl<R: Read> PeekableRead<R> {
  pub(crate) fn new(reader: R) -> Self {
    Self { reader, peeked: None, offset: 0 }
  }

  /// The offset of the next byte to be read.
  #[inline(always)]
  pub(crate) fn offset(&self) -> usize {
    self.offset
  }

  #[inline(always)]
  fn fill(&mut self) -> Result<Option<u8>, JsonError> {
    if let Some(peeked) = self.peeked {
      return Ok(peeked);
    }
    let offset = self.offset;
    let byte = self
      .reader
      .read_byte()
      .map_err(|e| JsonError::Read { offset, reason: format!("{e:?}") })?;
    self.peeked = Some(byte);
    Ok(byte)
  }

  /// Peek at the next byte, without consuming it.
  #[inline(always)]
  pub(crate) fn peek(&mut self) -> Result<Option<u8>, JsonError> {
    self.fill()
  }

  /// Read the next byte, if there is one.
  #[inline(always)]
  pub(crate) fn next(&mut self) -> Result<Option<u8>, JsonError> {
    let byte = self.fill()?;
    self.peeked = None;
    if byte.is_some() {
      self.offset += 1;
    }
    Ok(byte)
  }

  /// Read the next byte, requiring there be one.
  #[inline(always)]
  pub(crate) fn read_byte(&mut self, expected: &'static str) -> Result<u8, JsonError> {
    let offset = self.offset;
    self.next()?.ok_or(JsonError::MalformedInput { offset, expected })
  }

  /// Read bytes into a slice, requiring the input have enough.
  #[inline(always)]
  pub(crate) fn read_exact(
    &mut self,
    slice: &mut [u8],
    expected: &'static str,
  ) -> Result<(), JsonError> {
    for byte in slice {
      *byte = self.read_byte(expected)?;
    }
    Ok(())
  }

  /// Advance past any whitespace.
  ///
  /// https://datatracker.ietf.org/doc/html/rfc8259#section-2 defines whitespace.
  #[inline(always)]
  pub(crate) fn skip_whitespace(&mut self) -> Result<(), JsonError> {
    while matches!(self.peek()?, Some(b'\x20' | b'\x09' | b'\x0A' | b'\x0D')) {
      self.next()?;
    }
    Ok(())
  }
}

/// An adapter from [`std::io::Read`] to [`Read`].
///
/// Bytes are read one at a time, so the reader should be buffered.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct IoReader<R: std::io::Read + Debug>(pub R);

#[cfg(feature = "std")]
impl<R: std::io::Read + Debug> Read for IoReader<R> {
  type Error = std::io::Error;

  fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
    let mut byte = [0; 1];
    loop {
      match self.0.read(&mut byte) {
        Ok(0) => return Ok(None),
        Ok(_) => return Ok(Some(byte[0])),
        Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
        Err(e) => return Err(e),
      }
    }
  }
}

/// An adapter from [`std::io::Write`] to [`Write`].
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct IoWriter<W: std::io::Write>(pub W);

#[cfg(feature = "std")]
impl<W: std::io::Write> Write for IoWriter<W> {
  type Error = std::io::Error;

  #[inline(always)]
  fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
    self.0.write_all(bytes)
  }
}

#[test]
fn peekable_read_offsets() {
  let mut reader = PeekableRead::new(b" \t{}".as_slice());
  reader.skip_whitespace().unwrap();
  assert_eq!(reader.offset(), 2);
  assert_eq!(reader.peek().unwrap(), Some(b'{'));
  assert_eq!(reader.offset(), 2);
  assert_eq!(reader.read_byte("`{`").unwrap(), b'{');
  assert_eq!(reader.read_byte("`}`").unwrap(), b'}');
  assert_eq!(reader.offset(), 4);
  assert_eq!(
    reader.read_byte("a value"),
    Err(JsonError::MalformedInput { offset: 4, expected: "a value" })
  );
}

#[cfg(feature = "std")]
#[test]
fn io_adapters() {
  use crate::{Token, Tokenizer, JsonWriter};

  let mut tokenizer = Tokenizer::new(IoReader(std::io::Cursor::new(b"[true, \"x\"]".to_vec())), 64);
  let mut tokens = Vec::new();
  while let Some(token) = tokenizer.next_token().unwrap() {
    tokens.push(token);
  }
  tokenizer.finish().unwrap();
  assert_eq!(
    tokens,
    [(Token::ArrayStart, 0), (Token::True, 1), (Token::String("x".into()), 7), (Token::ArrayEnd, 10)]
  );

  #[derive(Debug)]
  struct Closed;
  impl std::io::Read for Closed {
    fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
      Err(std::io::Error::other("closed"))
    }
  }
  assert!(matches!(
    Tokenizer::new(IoReader(Closed), 64).next_token(),
    Err(JsonError::Read { offset: 0, .. })
  ));

  let mut writer = JsonWriter::new(IoWriter(Vec::new()), false);
  writer.begin_array().unwrap();
  writer.u64(1).unwrap();
  writer.end_array().unwrap();
  assert_eq!(writer.into_inner().0, b"[1]");

  // A full sink is an error
  let mut buffer = [0; 2];
  let mut writer = JsonWriter::new(IoWriter(buffer.as_mut_slice()), false);
  writer.begin_array().unwrap();
  assert!(matches!(writer.string("long"), Err(JsonError::Write { .. })));
}
