use core::any::Any;

use crate::{
  Read, Tokenizer, Token, TokenKind, JsonError, TypeCache, TypeDescriptor, Shape, ScalarToken,
  Options, UnknownMembers, path::Path,
};

/// A reader of values, driven by their type descriptors.
struct Reader<'a, R: Read> {
  tokens: Tokenizer<R>,
  cache: &'a TypeCache,
  options: &'a Options,
  path: Path,
}

impl<R: Read> Reader<'_, R> {
  fn mismatch(&self, expected: &'static str, observed: TokenKind, offset: usize) -> JsonError {
    JsonError::TypeMismatch {
      expected,
      observed,
      offset,
      path: self.path.to_string(),
    }
  }

  fn invalid_cast(&self, ty: &TypeDescriptor, token: TokenKind, offset: usize) -> JsonError {
    JsonError::InvalidCast {
      target: ty.type_name(),
      token,
      offset,
      path: self.path.to_string(),
    }
  }

  /// Read a value of the described type, whose first token has already been read.
  fn read_value(
    &mut self,
    ty: &TypeDescriptor,
    token: Token,
    offset: usize,
  ) -> Result<Box<dyn Any>, JsonError> {
    match ty.shape() {
      Shape::Nullable(nullable) => {
        if token == Token::Null {
          return Ok(nullable.none());
        }
        let inner = self.cache.resolve_ref(nullable.inner());
        let value = self.read_value(&inner, token, offset)?;
        nullable.some(value)
      }

      Shape::Pointer(pointer) => {
        let inner = self.cache.resolve_ref(pointer.inner());
        let value = self.read_value(&inner, token, offset)?;
        pointer.wrap(value)
      }

      // Only `Option` may be `null`
      _ if token == Token::Null => Err(self.invalid_cast(ty, TokenKind::Null, offset)),

      Shape::Scalar(scalar) => {
        let kind = token.kind();
        let scalar_token = match token {
          Token::String(string) => ScalarToken::Str(string),
          Token::Number(number) => ScalarToken::Number(number),
          Token::True => ScalarToken::Bool(true),
          Token::False => ScalarToken::Bool(false),
          _ => Err(self.mismatch(scalar.kind().description(), kind, offset))?,
        };
        scalar.read(scalar_token).ok_or_else(|| self.invalid_cast(ty, kind, offset))
      }

      Shape::Object(object) => {
        if token != Token::ObjectStart {
          Err(self.mismatch("an object", token.kind(), offset))?;
        }
        let mut value = object.construct().ok_or(JsonError::UnsupportedTarget {
          type_name: ty.type_name(),
          reason: "the object has no default to deserialize into",
        })?;

        loop {
          let (token, name_offset) = self.tokens.expect_token()?;
          let name = match token {
            Token::ObjectEnd => break,
            Token::PropertyName(name) => name,
            _ => Err(JsonError::Internal("object member wasn't preceded by its name"))?,
          };

          let (first, value_offset) = self.tokens.expect_token()?;
          let member = object.member(&name, self.options.case_insensitive);
          let Some(member) = member.filter(|member| member.is_writable()) else {
            if member.is_none() && (self.options.unknown_members == UnknownMembers::Fail) {
              Err(JsonError::UnknownMember {
                name,
                type_name: ty.type_name(),
                offset: name_offset,
              })?;
            }
            // Read-only and unknown members are skipped, validating what's skipped
            self.tokens.skip_value(&first)?;
            continue;
          };

          self.path.push_member(member.name());
          let element = self.cache.resolve_ref(member.element());
          let item = self.read_value(&element, first, value_offset)?;
          self.path.pop();
          // If a member is present multiple times, the last occurrence wins
          member.set(&mut *value, item)?;
        }
        Ok(value)
      }

      Shape::Collection(collection) => {
        if token != Token::ArrayStart {
          Err(self.mismatch("an array", token.kind(), offset))?;
        }
        let mut sequence = collection.begin().ok_or(JsonError::UnsupportedTarget {
          type_name: ty.type_name(),
          reason: "the collection may only be iterated",
        })?;
        let element = self.cache.resolve_ref(collection.element());

        let mut index = 0;
        loop {
          let (token, item_offset) = self.tokens.expect_token()?;
          if token == Token::ArrayEnd {
            break;
          }
          self.path.push_index(index);
          let item = self.read_value(&element, token, item_offset)?;
          self.path.pop();
          collection.append(&mut *sequence, item)?;
          index += 1;
        }

        collection
          .finish(sequence)
          .ok_or_else(|| self.invalid_cast(ty, TokenKind::ArrayStart, offset))
      }
    }
  }
}

/// Read a value of the described type.
///
/// The descriptor is checked to be readable before any input is read.
pub(crate) fn read<R: Read>(
  reader: R,
  ty: &TypeDescriptor,
  cache: &TypeCache,
  options: &Options,
) -> Result<Box<dyn Any>, JsonError> {
  cache.check_readable(ty)?;

  let tokens = Tokenizer::new(reader, options.max_depth);
  let mut reader = Reader { tokens, cache, options, path: Path::default() };
  let (first, offset) = reader.tokens.expect_token()?;
  let value = reader.read_value(ty, first, offset)?;
  if options.strict_trailing {
    reader.tokens.finish()?;
  }
  Ok(value)
}
