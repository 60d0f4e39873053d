use crate::{Read, PeekableRead, JsonError, Token, State, Stack, read_string, read_number};

/// What the grammar allows next.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Expect {
  /// Any value.
  Value,
  /// A value or `]`, immediately after `[`.
  FirstValueOrClose,
  /// A member name or `}`, immediately after `{`.
  FirstKeyOrClose,
  /// A member name, after a `,` within an object.
  Key,
  /// A `,` or the close of the current container, after a value within it.
  CommaOrClose,
  /// Nothing, as the top-level value has been read.
  End,
}

/// A tokenizer for a single JSON value.
///
/// Every token yielded has been validated against the grammar of everything preceding it. Once
/// the top-level value has been read, [`Tokenizer::next_token`] yields `None`.
#[derive(Debug)]
pub struct Tokenizer<R: Read> {
  reader: PeekableRead<R>,
  stack: Stack,
  expect: Expect,
}

impl<R: Read> Tokenizer<R> {
  /// Create a new tokenizer, which fails upon nesting deeper than `max_depth` containers.
  pub fn new(reader: R, max_depth: usize) -> Self {
    Self { reader: PeekableRead::new(reader), stack: Stack::new(max_depth), expect: Expect::Value }
  }

  /// The offset of the next byte to be read.
  #[inline(always)]
  pub fn offset(&self) -> usize {
    self.reader.offset()
  }

  /// The amount of containers currently open.
  #[inline(always)]
  pub fn depth(&self) -> usize {
    self.stack.depth()
  }

  /// Update what's expected after a complete value.
  #[inline(always)]
  fn after_value(&mut self) {
    self.expect = if self.stack.depth() == 0 { Expect::End } else { Expect::CommaOrClose };
  }

  /// Close the container on top of the stack.
  #[inline(always)]
  fn close(&mut self) -> Result<(), JsonError> {
    self.reader.next()?;
    self.stack.pop().ok_or(JsonError::Internal("closed a container which wasn't open"))?;
    self.after_value();
    Ok(())
  }

  /// Read a literal, such as `true`, whose first byte is the next byte.
  #[inline(always)]
  fn literal(
    &mut self,
    literal: &[u8],
    offset: usize,
    expected: &'static str,
  ) -> Result<(), JsonError> {
    for byte in literal {
      if self.reader.next()? != Some(*byte) {
        Err(JsonError::malformed(offset, expected))?;
      }
    }
    Ok(())
  }

  /// Read a member name, and the `:` following it.
  fn key(&mut self, offset: usize) -> Result<Token, JsonError> {
    if self.reader.next()? != Some(b'"') {
      Err(JsonError::malformed(offset, "a member name"))?;
    }
    let name = read_string(&mut self.reader)?;
    self.reader.skip_whitespace()?;
    let colon = self.reader.offset();
    if self.reader.next()? != Some(b':') {
      Err(JsonError::malformed(colon, "`:`"))?;
    }
    self.expect = Expect::Value;
    Ok(Token::PropertyName(name))
  }

  /// Read the value whose first byte is the next byte.
  fn value(&mut self, offset: usize) -> Result<Token, JsonError> {
    let token = match self.reader.peek()? {
      Some(b'{') => {
        self.stack.push(State::Object)?;
        self.reader.next()?;
        self.expect = Expect::FirstKeyOrClose;
        return Ok(Token::ObjectStart);
      }
      Some(b'[') => {
        self.stack.push(State::Array)?;
        self.reader.next()?;
        self.expect = Expect::FirstValueOrClose;
        return Ok(Token::ArrayStart);
      }
      Some(b'"') => {
        self.reader.next()?;
        Token::String(read_string(&mut self.reader)?)
      }
      Some(b't') => {
        self.literal(b"true", offset, "`true`")?;
        Token::True
      }
      Some(b'f') => {
        self.literal(b"false", offset, "`false`")?;
        Token::False
      }
      Some(b'n') => {
        self.literal(b"null", offset, "`null`")?;
        Token::Null
      }
      Some(b'-' | b'0' ..= b'9') => Token::Number(read_number(&mut self.reader)?),
      _ => Err(JsonError::malformed(offset, "a value"))?,
    };
    self.after_value();
    Ok(token)
  }

  /// Read the next token, with the offset it starts at.
  ///
  /// Yields `None` once the top-level value has been read, regardless of any trailing bytes.
  pub fn next_token(&mut self) -> Result<Option<(Token, usize)>, JsonError> {
    loop {
      if self.expect == Expect::End {
        return Ok(None);
      }

      self.reader.skip_whitespace()?;
      let offset = self.reader.offset();
      let token = match self.expect {
        Expect::End => return Ok(None),
        Expect::Value => self.value(offset)?,
        Expect::Key => self.key(offset)?,
        Expect::FirstKeyOrClose => {
          if self.reader.peek()? == Some(b'}') {
            self.close()?;
            Token::ObjectEnd
          } else {
            self.key(offset)?
          }
        }
        Expect::FirstValueOrClose => {
          if self.reader.peek()? == Some(b']') {
            self.close()?;
            Token::ArrayEnd
          } else {
            self.value(offset)?
          }
        }
        Expect::CommaOrClose => match (self.stack.peek(), self.reader.peek()?) {
          (Some(State::Object), Some(b',')) => {
            self.reader.next()?;
            self.expect = Expect::Key;
            continue;
          }
          (Some(State::Array), Some(b',')) => {
            self.reader.next()?;
            self.expect = Expect::Value;
            continue;
          }
          (Some(State::Object), Some(b'}')) => {
            self.close()?;
            Token::ObjectEnd
          }
          (Some(State::Array), Some(b']')) => {
            self.close()?;
            Token::ArrayEnd
          }
          (Some(State::Object), _) => Err(JsonError::malformed(offset, "`,` or `}`"))?,
          (Some(State::Array), _) => Err(JsonError::malformed(offset, "`,` or `]`"))?,
          (None, _) => Err(JsonError::Internal("expected a comma outside of any container"))?,
        },
      };
      return Ok(Some((token, offset)));
    }
  }

  /// Read the next token, requiring there be one.
  #[inline(always)]
  pub fn expect_token(&mut self) -> Result<(Token, usize), JsonError> {
    let offset = self.reader.offset();
    self.next_token()?.ok_or(JsonError::malformed(offset, "a value"))
  }

  /// Skip the rest of a value, whose first token has already been read.
  ///
  /// Everything skipped is validated as it would be if it were read.
  pub fn skip_value(&mut self, first: &Token) -> Result<(), JsonError> {
    if !matches!(first, Token::ObjectStart | Token::ArrayStart) {
      return Ok(());
    }
    let depth = self
      .stack
      .depth()
      .checked_sub(1)
      .ok_or(JsonError::Internal("skipped a container which wasn't open"))?;
    while self.stack.depth() > depth {
      self.expect_token()?;
    }
    Ok(())
  }

  /// Assert the top-level value was fully read, and only whitespace follows it.
  pub fn finish(mut self) -> Result<(), JsonError> {
    if self.expect != Expect::End {
      Err(JsonError::Internal("finished before reading the complete value"))?;
    }
    self.reader.skip_whitespace()?;
    if self.reader.peek()?.is_some() {
      Err(JsonError::malformed(self.reader.offset(), "the end of the input"))?;
    }
    Ok(())
  }
}

#[cfg(test)]
fn tokenize(json: &str) -> Result<alloc::vec::Vec<(Token, usize)>, JsonError> {
  let mut tokenizer = Tokenizer::new(json.as_bytes(), 64);
  let mut tokens = alloc::vec::Vec::new();
  while let Some(token) = tokenizer.next_token()? {
    tokens.push(token);
  }
  tokenizer.finish()?;
  Ok(tokens)
}

#[cfg(test)]
fn malformed_at(json: &str) -> usize {
  match tokenize(json) {
    Err(JsonError::MalformedInput { offset, .. }) => offset,
    other => panic!("{json} yielded {other:?}"),
  }
}

#[test]
fn tokens() {
  use alloc::string::ToString;

  let tokens = tokenize(r#" { "a" : [1, -2.5e3, "x"], "b": {}, "c": [], "d": true, "e": null } "#)
    .unwrap()
    .into_iter()
    .map(|(token, _)| token)
    .collect::<alloc::vec::Vec<_>>();
  assert_eq!(tokens.len(), 18);
  assert_eq!(tokens[0], Token::ObjectStart);
  assert_eq!(tokens[1], Token::PropertyName("a".to_string()));
  assert_eq!(tokens[2], Token::ArrayStart);
  assert!(matches!(&tokens[3], Token::Number(number) if number.i64() == Some(1)));
  assert!(matches!(&tokens[4], Token::Number(number) if number.as_str() == "-2.5e3"));
  assert_eq!(tokens[5], Token::String("x".to_string()));
  assert_eq!(tokens[6], Token::ArrayEnd);
  assert_eq!(tokens[8], Token::ObjectStart);
  assert_eq!(tokens[9], Token::ObjectEnd);
  assert_eq!(tokens[14], Token::True);
  assert_eq!(tokens[16], Token::Null);
  assert_eq!(tokens[17], Token::ObjectEnd);

  // Offsets are of the token's first byte
  let tokens = tokenize(r#"[ "x" ,  12 ]"#).unwrap();
  let offsets = tokens.iter().map(|(_, offset)| *offset).collect::<alloc::vec::Vec<_>>();
  assert_eq!(offsets, [0, 2, 9, 12]);

  for scalar in ["0", "\"\"", "true", "false", "null", "  -0.0  "] {
    assert_eq!(tokenize(scalar).unwrap().len(), 1);
  }
}

#[test]
fn malformed() {
  assert_eq!(malformed_at(""), 0);
  assert_eq!(malformed_at("   "), 3);
  assert_eq!(malformed_at("[1,]"), 3);
  assert_eq!(malformed_at(r#"{"a":1,}"#), 7);
  assert_eq!(malformed_at(r#"{"a" 1}"#), 5);
  assert_eq!(malformed_at("{1:2}"), 1);
  assert_eq!(malformed_at("[1}"), 2);
  assert_eq!(malformed_at(r#"{"a":1]"#), 6);
  assert_eq!(malformed_at("[1 2]"), 3);
  assert_eq!(malformed_at("[01]"), 1);
  assert_eq!(malformed_at("tru"), 0);
  assert_eq!(malformed_at("trUe"), 0);
  assert_eq!(malformed_at("[nul]"), 1);
  assert_eq!(malformed_at("'a'"), 0);
  assert_eq!(malformed_at("["), 1);
  assert_eq!(malformed_at(r#"{"a":"#), 5);
  assert_eq!(malformed_at("1 2"), 2);
  assert_eq!(malformed_at(r#"["\u00"]"#), 2);
}

#[test]
fn trailing() {
  // Trailing bytes are only rejected by `finish`
  let mut tokenizer = Tokenizer::new(b"{} x".as_slice(), 64);
  assert_eq!(tokenizer.next_token().unwrap().unwrap().0, Token::ObjectStart);
  assert_eq!(tokenizer.next_token().unwrap().unwrap().0, Token::ObjectEnd);
  assert_eq!(tokenizer.next_token().unwrap(), None);
  assert_eq!(
    tokenizer.finish(),
    Err(JsonError::MalformedInput { offset: 3, expected: "the end of the input" })
  );
}

#[test]
fn depth() {
  use alloc::string::String;

  let nested = |depth| {
    let mut json = String::new();
    for _ in 0 .. depth {
      json.push('[');
    }
    for _ in 0 .. depth {
      json.push(']');
    }
    json
  };

  let json = nested(4);
  let mut tokenizer = Tokenizer::new(json.as_bytes(), 4);
  while tokenizer.next_token().unwrap().is_some() {}

  let json = nested(5);
  let mut tokenizer = Tokenizer::new(json.as_bytes(), 4);
  let error = loop {
    match tokenizer.next_token() {
      Ok(Some(_)) => {}
      Ok(None) => panic!("read past the depth limit"),
      Err(e) => break e,
    }
  };
  assert_eq!(error, JsonError::DepthExceeded { limit: 4 });
}

#[test]
fn skip_value() {
  let mut tokenizer =
    Tokenizer::new(br#"{"skip": {"a": [1, {"b": null}], "c": "d"}, "keep": 1}"#.as_slice(), 64);
  assert_eq!(tokenizer.expect_token().unwrap().0, Token::ObjectStart);
  assert!(matches!(tokenizer.expect_token().unwrap().0, Token::PropertyName(name) if name == "skip"));
  let (first, _) = tokenizer.expect_token().unwrap();
  tokenizer.skip_value(&first).unwrap();
  assert_eq!(tokenizer.depth(), 1);
  assert!(matches!(tokenizer.expect_token().unwrap().0, Token::PropertyName(name) if name == "keep"));

  // Skipped values are still validated
  let mut tokenizer = Tokenizer::new(br#"{"skip": [1, 2,], "keep": 1}"#.as_slice(), 64);
  tokenizer.expect_token().unwrap();
  tokenizer.expect_token().unwrap();
  let (first, _) = tokenizer.expect_token().unwrap();
  assert_eq!(
    tokenizer.skip_value(&first),
    Err(JsonError::MalformedInput { offset: 15, expected: "a value" })
  );
}
