use core::fmt;
use alloc::string::String;

use crate::Number;

/// A lexical unit of a JSON document.
///
/// https://datatracker.ietf.org/doc/html/rfc8259#section-2 defines the grammar these are drawn
/// from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Token {
  /// `{`
  ObjectStart,
  /// `}`
  ObjectEnd,
  /// `[`
  ArrayStart,
  /// `]`
  ArrayEnd,
  /// The name of a member within an object, with its escapes resolved.
  ///
  /// The `:` following the name has already been consumed.
  PropertyName(String),
  /// A string value, with its escapes resolved.
  String(String),
  /// A number.
  Number(Number),
  /// `true`
  True,
  /// `false`
  False,
  /// `null`
  Null,
}

impl Token {
  /// The kind of this token.
  #[inline(always)]
  pub fn kind(&self) -> TokenKind {
    match self {
      Token::ObjectStart => TokenKind::ObjectStart,
      Token::ObjectEnd => TokenKind::ObjectEnd,
      Token::ArrayStart => TokenKind::ArrayStart,
      Token::ArrayEnd => TokenKind::ArrayEnd,
      Token::PropertyName(_) => TokenKind::PropertyName,
      Token::String(_) => TokenKind::String,
      Token::Number(_) => TokenKind::Number,
      Token::True | Token::False => TokenKind::Bool,
      Token::Null => TokenKind::Null,
    }
  }
}

/// The kind of a [`Token`], without its contents.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TokenKind {
  /// `{`
  ObjectStart,
  /// `}`
  ObjectEnd,
  /// `[`
  ArrayStart,
  /// `]`
  ArrayEnd,
  /// A member name.
  PropertyName,
  /// A string.
  String,
  /// A number.
  Number,
  /// `true` or `false`.
  Bool,
  /// `null`
  Null,
}

impl fmt::Display for TokenKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      TokenKind::ObjectStart => "`{`",
      TokenKind::ObjectEnd => "`}`",
      TokenKind::ArrayStart => "`[`",
      TokenKind::ArrayEnd => "`]`",
      TokenKind::PropertyName => "a member name",
      TokenKind::String => "a string",
      TokenKind::Number => "a number",
      TokenKind::Bool => "a boolean",
      TokenKind::Null => "`null`",
    })
  }
}
