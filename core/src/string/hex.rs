/// Check four bytes are all ASCII hexadecimal digits.
#[must_use]
#[inline(always)]
pub(super) fn validate_hex(bytes: [u8; 4]) -> bool {
  /*
    Each byte is checked within its own lane of a `u32`, using the eighth bit of each lane to
    absorb carries and borrows so lanes never interfere.
  */
  let bytes = u32::from_ne_bytes(bytes);

  const fn splat(byte: u8) -> u32 {
    u32::from_ne_bytes([byte; 4])
  }
  const HIGH_BITS: u32 = splat(1 << 7);
  const FIFTH_BITS: u32 = splat(1 << 5);
  const ZERO_CHAR: u32 = splat(b'0');
  const A_CHAR: u32 = splat(b'a');
  const DISTANCES_AFTER_NINE: u32 = splat((1 << 7) - (b'9' + 1));
  const DISTANCES_AFTER_F: u32 = splat((1 << 7) - (b'f' + 1));

  let bytes_with_high_bits = bytes | HIGH_BITS;

  // The high bit survives the subtraction if the lane was `>=` the constant
  let gte_zero = bytes_with_high_bits.wrapping_sub(ZERO_CHAR);
  // `'A' ..= 'F'` become `'a' ..= 'f'` with their fifth bit set
  let gte_a = (bytes_with_high_bits | FIFTH_BITS).wrapping_sub(A_CHAR);

  // The high bit is set by the addition if the lane was `>` the upper bound
  let lte_9 = bytes.wrapping_add(DISTANCES_AFTER_NINE);
  let lte_f = (bytes | FIFTH_BITS).wrapping_add(DISTANCES_AFTER_F);

  // Valid lanes are `>=` the lower bound and not `>` the upper bound
  let number = gte_zero ^ lte_9;
  let alpha = gte_a ^ lte_f;
  let ascii = (!bytes) & HIGH_BITS;
  (ascii & (number | alpha)) == HIGH_BITS
}

/// Decode a `u16` from four hexadecimal digits which have already been validated.
#[inline(always)]
pub(super) fn decode_hex(hex: [u8; 4]) -> u16 {
  #[inline(always)]
  fn nibble(char: u8) -> u16 {
    // Lowercase the letters, which leaves digits unaffected
    let char = char | 0b0010_0000;
    u16::from(if char <= b'9' { char - b'0' } else { (char - b'a') + 10 })
  }
  hex.into_iter().fold(0, |value, char| (value << 4) | nibble(char))
}

/// Encode a `u16` as four lowercase hexadecimal digits.
#[inline(always)]
pub(super) fn encode_hex(value: u16) -> [u8; 4] {
  const DIGITS: &[u8; 16] = b"0123456789abcdef";
  let mut hex = [0; 4];
  for (i, char) in hex.iter_mut().enumerate() {
    *char = DIGITS[usize::from((value >> (12 - (i * 4))) & 0b1111)];
  }
  hex
}

#[test]
fn test_validate_hex() {
  let mut hex = [0, b'f', b'f', b'f'];
  for i in u8::MIN ..= u8::MAX {
    hex[0] = i;
    assert_eq!(validate_hex(hex), hex[0].is_ascii_hexdigit());
  }
}

#[test]
fn test_decode_hex() {
  assert_eq!(decode_hex(*b"0000"), 0);
  assert_eq!(decode_hex(*b"00e9"), 0xe9);
  assert_eq!(decode_hex(*b"D83D"), 0xd83d);
  assert_eq!(decode_hex(*b"ffff"), u16::MAX);
  assert_eq!(&encode_hex(0xd83d), b"d83d");
  assert_eq!(&encode_hex(0x001f), b"001f");
}
