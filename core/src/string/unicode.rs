use crate::{Read, PeekableRead, JsonError};

/// Calculate the length of the non-ASCII UTF-8 codepoint from its first byte.
///
/// Returns an undefined value if the codepoint is ASCII.
#[inline(always)]
fn non_ascii_utf8_codepoint_len(b: u8) -> usize {
  // The amount of zeroes in a `u8` will be positive and fit within a `usize`
  ((!(b | 0b0100_0000)) | 0b1111).leading_zeros() as usize
}

/// Read a non-ASCII UTF-8 character, whose first byte has already been consumed.
#[inline(always)]
pub(super) fn read_non_ascii_utf8<R: Read>(
  reader: &mut PeekableRead<R>,
  first_byte: u8,
  offset: usize,
) -> Result<char, JsonError> {
  // Continuation bytes, overlong two-byte forms, and leads past U+10FFFF are never valid leads
  if !matches!(first_byte, 0xc2 ..= 0xf4) {
    Err(JsonError::malformed(offset, "a valid UTF-8 codepoint"))?;
  }
  let len = non_ascii_utf8_codepoint_len(first_byte);

  let mut codepoint = [0; 4];
  let codepoint = &mut codepoint[.. len];
  codepoint[0] = first_byte;
  reader.read_exact(&mut codepoint[1 ..], "the rest of a UTF-8 codepoint")?;

  // `from_utf8` rejects overlong forms, surrogates, and out-of-range codepoints
  core::str::from_utf8(codepoint)
    .ok()
    .and_then(|str| str.chars().next())
    .ok_or(JsonError::malformed(offset, "a valid UTF-8 codepoint"))
}

#[test]
fn test_non_ascii_utf8_codepoint_len() {
  for (char, len) in [('\u{80}', 2), ('\u{7ff}', 2), ('\u{800}', 3), ('\u{ffff}', 3), ('\u{10000}', 4)]
  {
    let mut buf = [0; 4];
    assert_eq!(non_ascii_utf8_codepoint_len(char.encode_utf8(&mut buf).as_bytes()[0]), len);
  }
}

#[test]
fn test_read_non_ascii_utf8() {
  let encoded = "é€😀".as_bytes();
  let mut reader = PeekableRead::new(&encoded[1 ..]);
  assert_eq!(read_non_ascii_utf8(&mut reader, encoded[0], 0).unwrap(), 'é');
  let first = reader.next().unwrap().unwrap();
  assert_eq!(read_non_ascii_utf8(&mut reader, first, 2).unwrap(), '€');
  let first = reader.next().unwrap().unwrap();
  assert_eq!(read_non_ascii_utf8(&mut reader, first, 5).unwrap(), '😀');

  // A surrogate encoded directly in UTF-8
  let mut reader = PeekableRead::new([0xa0, 0x80].as_slice());
  assert!(read_non_ascii_utf8(&mut reader, 0xed, 0).is_err());
  // An overlong encoding of `/`
  let mut reader = PeekableRead::new([0xaf].as_slice());
  assert!(read_non_ascii_utf8(&mut reader, 0xc0, 0).is_err());
  // A truncated codepoint
  let mut reader = PeekableRead::new([0x82].as_slice());
  assert!(read_non_ascii_utf8(&mut reader, 0xe2, 0).is_err());
}
