#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(not(test), no_std)]

use core::fmt::Debug;

use graph_json::{Read as GjRead, Write as GjWrite};
use embedded_io::{Error as _, ErrorKind, Read, Write};

/// An adapter from [`embedded_io::Read`] to [`graph_json::Read`].
///
/// Bytes are read one at a time, so the reader should be buffered.
#[derive(Debug)]
pub struct ReadAdapter<R: Read + Debug> {
  reader: R,
}

impl<R: Read + Debug> From<R> for ReadAdapter<R> {
  fn from(reader: R) -> Self {
    Self { reader }
  }
}

impl<R: Read + Debug> ReadAdapter<R> {
  /// Take the underlying reader.
  pub fn into_inner(self) -> R {
    self.reader
  }
}

impl<R: Read + Debug> GjRead for ReadAdapter<R> {
  type Error = R::Error;

  fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
    let mut byte = [0; 1];
    loop {
      match self.reader.read(&mut byte) {
        Ok(0) => return Ok(None),
        Ok(_) => return Ok(Some(byte[0])),
        Err(e) if e.kind() == ErrorKind::Interrupted => {}
        Err(e) => Err(e)?,
      }
    }
  }
}

/// An adapter from [`embedded_io::Write`] to [`graph_json::Write`].
#[derive(Debug)]
pub struct WriteAdapter<W: Write> {
  writer: W,
}

impl<W: Write> From<W> for WriteAdapter<W> {
  fn from(writer: W) -> Self {
    Self { writer }
  }
}

impl<W: Write> WriteAdapter<W> {
  /// Take the underlying writer.
  pub fn into_inner(self) -> W {
    self.writer
  }
}

impl<W: Write> GjWrite for WriteAdapter<W> {
  type Error = W::Error;

  #[inline(always)]
  fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
    self.writer.write_all(bytes)
  }
}

#[test]
fn test_read() {
  use graph_json::{Token, Tokenizer};

  const SERIALIZATION: &[u8] = br#"{ "hello": ["goodbye", 1] }"#;

  let mut tokenizer = Tokenizer::new(ReadAdapter::from(SERIALIZATION), 64);
  let mut tokens = vec![];
  while let Some((token, offset)) = tokenizer.next_token().unwrap() {
    tokens.push((token.kind(), offset));
  }
  tokenizer.finish().unwrap();
  assert_eq!(tokens.len(), 7);
  assert_eq!(tokens[1].1, 2);
  assert_eq!(tokens[3].1, 12);

  let mut tokenizer = Tokenizer::new(ReadAdapter::from(br#"{"hello":"#.as_slice()), 64);
  assert_eq!(tokenizer.expect_token().unwrap().0, Token::ObjectStart);
  tokenizer.expect_token().unwrap();
  assert!(matches!(
    tokenizer.expect_token(),
    Err(graph_json::JsonError::MalformedInput { offset: 9, .. })
  ));
}

#[test]
fn test_write() {
  use graph_json::JsonWriter;

  let mut buffer = [0; 32];
  let mut writer = JsonWriter::new(WriteAdapter::from(buffer.as_mut_slice()), false);
  writer.begin_object().unwrap();
  writer.member_name("hello").unwrap();
  writer.string("goodbye").unwrap();
  writer.end_object().unwrap();
  let remaining = writer.into_inner().into_inner().len();
  let written = buffer.len() - remaining;
  assert_eq!(&buffer[.. written], br#"{"hello":"goodbye"}"#);

  // Running out of space is an error, not a truncation
  let mut buffer = [0; 4];
  let mut writer = JsonWriter::new(WriteAdapter::from(buffer.as_mut_slice()), false);
  writer.begin_array().unwrap();
  assert!(matches!(writer.string("too long"), Err(graph_json::JsonError::Write { .. })));
}
