use alloc::string::String;

use crate::{Read, Write, PeekableRead, JsonError};

mod unicode;
mod hex;

use unicode::*;
use hex::*;

/// A character within a JSON-serialized string.
enum StringCharacter {
  /// The character itself.
  Character(char),
  /// The UTF-16 code unit from a `\u` escape.
  EscapedUnicode(u16),
}

/// Read the next character of a string, yielding `None` upon reaching the closing `"`.
#[inline(always)]
fn next_char<R: Read>(reader: &mut PeekableRead<R>) -> Result<Option<StringCharacter>, JsonError> {
  let offset = reader.offset();
  let this = reader.read_byte("the rest of a string")?;

  // https://datatracker.ietf.org/doc/html/rfc8259#section-7
  Ok(match this {
    // The characters allowed to be unescaped
    b'\x20' ..= b'\x21' | b'\x23' ..= b'\x5b' | b'\x5d' ..= b'\x7f' => {
      Some(StringCharacter::Character(this as char))
    }
    b'\x80' ..= b'\xff' => {
      Some(StringCharacter::Character(read_non_ascii_utf8(reader, this, offset)?))
    }
    // The escaping character
    b'\\' => {
      let escaped = reader.read_byte("an escape sequence")?;
      Some(match escaped {
        b'"' | b'\\' | b'/' => StringCharacter::Character(escaped as char),
        b'b' => StringCharacter::Character('\x08'),
        b'f' => StringCharacter::Character('\x0c'),
        b'n' => StringCharacter::Character('\n'),
        b'r' => StringCharacter::Character('\r'),
        b't' => StringCharacter::Character('\t'),
        b'u' => {
          let mut hex = [0; 4];
          reader.read_exact(&mut hex, "four hexadecimal digits")?;
          if !validate_hex(hex) {
            Err(JsonError::malformed(offset, "four hexadecimal digits"))?;
          }
          StringCharacter::EscapedUnicode(decode_hex(hex))
        }
        _ => Err(JsonError::malformed(offset, "a valid escape sequence"))?,
      })
    }
    b'"' => None,
    // Control characters must be escaped
    _ => Err(JsonError::malformed(offset, "an escaped control character"))?,
  })
}

/// Read a string whose opening `"` has already been consumed, through its closing `"`.
pub(crate) fn read_string<R: Read>(reader: &mut PeekableRead<R>) -> Result<String, JsonError> {
  let mut string = String::new();
  loop {
    let offset = reader.offset();
    match next_char(reader)? {
      None => return Ok(string),
      Some(StringCharacter::Character(char)) => string.push(char),
      Some(StringCharacter::EscapedUnicode(next)) => {
        /*
          Codepoints past 0xffff are encoded as a UTF-16 surrogate pair, for which
          https://en.wikipedia.org/wiki/UTF-16#U+D800_to_U+DFFF_(surrogates) is used as reference.

          RFC 8259 section 8.2 allows unpaired surrogates syntactically yet notes they cannot
          represent Unicode characters. As a Rust `String` may only hold Unicode characters, an
          unpaired surrogate is rejected as malformed.
        */
        let codepoint = match next {
          0xd800 ..= 0xdbff => {
            let high = u32::from(next - 0xd800) << 10;
            let Some(StringCharacter::EscapedUnicode(low @ 0xdc00 ..= 0xdfff)) = next_char(reader)?
            else {
              Err(JsonError::malformed(offset, "a low surrogate following a high surrogate"))?
            };
            high + u32::from(low - 0xdc00) + 0x10000
          }
          0xdc00 ..= 0xdfff => {
            Err(JsonError::malformed(offset, "a high surrogate preceding a low surrogate"))?
          }
          _ => u32::from(next),
        };
        string.push(
          char::from_u32(codepoint)
            .ok_or(JsonError::malformed(offset, "a valid Unicode codepoint"))?,
        );
      }
    }
  }
}

/// Write a string's contents, escaped, without the surrounding quotes.
///
/// `"` and `\` are escaped, as are control characters. Control characters with a short escape use
/// it, with the rest written as `\u00XX`. Everything else, including `/` and non-ASCII characters,
/// is written verbatim.
pub(crate) fn write_escaped<W: Write>(writer: &mut W, string: &str) -> Result<(), W::Error> {
  let bytes = string.as_bytes();
  let mut unescaped_from = 0;
  for (i, byte) in bytes.iter().copied().enumerate() {
    let short: &[u8] = match byte {
      b'"' => b"\\\"",
      b'\\' => b"\\\\",
      b'\x08' => b"\\b",
      b'\x0c' => b"\\f",
      b'\n' => b"\\n",
      b'\r' => b"\\r",
      b'\t' => b"\\t",
      b'\x00' ..= b'\x1f' => b"",
      _ => continue,
    };
    writer.write_all(&bytes[unescaped_from .. i])?;
    unescaped_from = i + 1;
    if short.is_empty() {
      writer.write_all(b"\\u")?;
      writer.write_all(&encode_hex(u16::from(byte)))?;
    } else {
      writer.write_all(short)?;
    }
  }
  writer.write_all(&bytes[unescaped_from ..])
}

#[cfg(test)]
fn read_all(json: &[u8]) -> Result<String, JsonError> {
  let mut reader = PeekableRead::new(json);
  assert_eq!(reader.read_byte("`\"`")?, b'"');
  read_string(&mut reader)
}

#[test]
fn strings() {
  assert_eq!(read_all(br#""hello""#).unwrap(), "hello");
  assert_eq!(read_all(br#""a\"b\\c\/d""#).unwrap(), "a\"b\\c/d");
  assert_eq!(read_all(br#""\b\f\n\r\t""#).unwrap(), "\x08\x0c\n\r\t");
  assert_eq!(read_all("\"é€\"".as_bytes()).unwrap(), "é€");
  assert_eq!(read_all("\"😀\"".as_bytes()).unwrap(), "😀");
  assert_eq!(read_all("\"é😀\"".as_bytes()).unwrap(), "é😀");

  // Unterminated
  assert!(matches!(read_all(br#""abc"#), Err(JsonError::MalformedInput { offset: 4, .. })));
  // Unescaped control character
  assert!(matches!(read_all(b"\"a\nb\""), Err(JsonError::MalformedInput { offset: 2, .. })));
  // Invalid escapes
  assert!(read_all(br#""\x""#).is_err());
  assert!(read_all(br#""\u12g4""#).is_err());
  // Lone surrogates
  assert!(read_all(br#""\ud83d""#).is_err());
  assert!(read_all(br#""\ud83dx""#).is_err());
  assert!(read_all(br#""\ude00""#).is_err());
  assert!(read_all(br#""\ud83dA""#).is_err());
  // Invalid UTF-8
  assert!(read_all(b"\"\xff\"").is_err());
}

#[test]
fn escaping() {
  let escape = |str: &str| {
    let mut buf = alloc::vec::Vec::new();
    write_escaped(&mut buf, str).unwrap();
    String::from_utf8(buf).unwrap()
  };
  assert_eq!(escape("plain text"), "plain text");
  assert_eq!(escape("bfnrt"), "bfnrt");
  assert_eq!(escape("a\"b\\c/d"), r#"a\"b\\c/d"#);
  assert_eq!(escape("\x08\x0c\n\r\t"), r#"\b\f\n\r\t"#);
  assert_eq!(escape("\x00\x1f"), r#"\u0000\u001f"#);
  assert_eq!(escape("é😀"), "é😀");

  for str in ["", "\"", "mixed \x01 \u{7f} é \\ \n end"] {
    let mut json = alloc::vec![b'"'];
    write_escaped(&mut json, str).unwrap();
    json.push(b'"');
    assert_eq!(read_all(&json).unwrap(), str);
  }
}
