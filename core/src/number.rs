use core::str::FromStr;
use alloc::string::String;

use crate::{Read, PeekableRead, JsonError};

/// A validator for the syntax of a number, fed one byte at a time.
/*
  The syntax applied is (expanded)
  `[ minus ] int [ decimal-point 1*DIGIT ] [ e [ minus / plus ] 1*DIGIT ]`, where `int` is either
  `0` or a non-zero digit followed by any amount of digits.

  https://datatracker.ietf.org/doc/html/rfc8259#section-6
*/
struct NumberGrammar {
  /// If a sign character is currently allowed.
  sign_character_allowed: bool,
  /// The amount of digits read for the current part.
  digits_in_current_part: usize,
  /// If the integer part began with a zero.
  leading_zero: bool,
  /// If we're before the decimal point.
  before_decimal: bool,
  /// If we're before the exponent marker.
  before_exponent: bool,
  /// If the syntax has been violated.
  invalid: bool,
}

impl NumberGrammar {
  #[inline(always)]
  fn new() -> Self {
    Self {
      sign_character_allowed: true,
      digits_in_current_part: 0,
      leading_zero: false,
      before_decimal: true,
      before_exponent: true,
      invalid: false,
    }
  }

  #[inline(always)]
  fn push_byte(&mut self, c: u8) {
    if self.invalid {
      return;
    }

    let sign_character_allowed = self.sign_character_allowed;
    self.sign_character_allowed = false;

    if self.before_exponent {
      match c {
        // Only `-` is allowed as the sign of the number itself
        b'-' => self.invalid |= !sign_character_allowed,
        b'e' | b'E' => {
          // The preceding part may never be empty
          if self.digits_in_current_part == 0 {
            self.invalid = true;
            return;
          }
          self.sign_character_allowed = true;
          self.digits_in_current_part = 0;
          self.before_exponent = false;
        }
        b'0' ..= b'9' => {
          if self.before_decimal {
            // We do not allow leading zeroes for the integer part, unless it's solely zero
            if self.leading_zero {
              self.invalid = true;
              return;
            }
            self.leading_zero = (self.digits_in_current_part == 0) && (c == b'0');
          }
          self.digits_in_current_part += 1;
        }
        b'.' => {
          // Only one '.' is allowed, and it must follow a non-empty integer part
          if (!self.before_decimal) || (self.digits_in_current_part == 0) {
            self.invalid = true;
            return;
          }
          self.digits_in_current_part = 0;
          self.before_decimal = false;
        }
        _ => self.invalid = true,
      }
      return;
    }

    match c {
      b'-' | b'+' => self.invalid |= !sign_character_allowed,
      b'0' ..= b'9' => self.digits_in_current_part += 1,
      _ => self.invalid = true,
    }
  }

  #[inline(always)]
  fn valid(&self) -> bool {
    // It has to not have been marked invalid and the last part must not have been empty
    !(self.invalid || (self.digits_in_current_part == 0))
  }

  /// If the number had neither a fractional part nor an exponent.
  #[inline(always)]
  fn integer(&self) -> bool {
    self.before_decimal && self.before_exponent
  }
}

/// Read a number, whose first byte is the next byte within the reader.
pub(crate) fn read_number<R: Read>(reader: &mut PeekableRead<R>) -> Result<Number, JsonError> {
  let offset = reader.offset();
  let mut grammar = NumberGrammar::new();
  let mut raw = String::new();

  // Read every byte which could be part of a number, leaving the following byte to the caller
  while let Some(char @ (b'0' ..= b'9' | b'-' | b'+' | b'.' | b'e' | b'E')) = reader.peek()? {
    reader.next()?;
    grammar.push_byte(char);
    raw.push(char as char);
  }

  if !grammar.valid() {
    Err(JsonError::malformed(offset, "a number"))?;
  }

  Ok(Number { integer: grammar.integer(), raw })
}

/// A number deserialized from JSON.
///
/// The number is held as the text it was written with, allowing it to be converted into whichever
/// type it's ultimately requested as without an intermediate loss of precision.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Number {
  raw: String,
  integer: bool,
}

impl Number {
  /// The number as it was written.
  #[inline(always)]
  pub fn as_str(&self) -> &str {
    &self.raw
  }

  /// If this number was written without a fractional part or an exponent.
  #[inline(always)]
  pub fn is_integer(&self) -> bool {
    self.integer
  }

  /// Get the number as an `i64`.
  ///
  /// This is only yielded for numbers written as integers, within the range of an `i64`. "10.0"
  /// and "1e1" are not considered integers.
  #[inline(always)]
  pub fn i64(&self) -> Option<i64> {
    if !self.integer {
      None?;
    }
    i64::from_str(&self.raw).ok()
  }

  /// Get the number as a `u64`.
  ///
  /// This is only yielded for numbers written as integers, within the range of a `u64`.
  #[inline(always)]
  pub fn u64(&self) -> Option<u64> {
    if !self.integer {
      None?;
    }
    // `-0` is zero
    if self.raw == "-0" {
      return Some(0);
    }
    u64::from_str(&self.raw).ok()
  }

  /// Get the number as an `f64`.
  ///
  /// This may be lossy due to the inherent nature of floats. This returns `None` if the value's
  /// magnitude exceeds `f64`'s range, as JSON cannot represent infinite values.
  #[inline(always)]
  pub fn f64(&self) -> Option<f64> {
    let candidate = f64::from_str(&self.raw).ok()?;
    if !candidate.is_finite() {
      None?;
    }
    Some(candidate)
  }
}

#[cfg(test)]
fn read(json: &str) -> Result<Number, JsonError> {
  read_number(&mut PeekableRead::new(json.as_bytes()))
}

#[test]
fn number_grammar() {
  for valid in ["0", "-0", "1", "-1", "10", "0.5", "-0.5", "1e5", "1E5", "1e+5", "1e-5", "1.5e10"] {
    assert_eq!(read(valid).unwrap().as_str(), valid);
  }
  for invalid in
    ["-", "+1", "01", "-01", "00", "1.", ".5", "1.e5", "1e", "1e+", "1e5.0", "1..2", "1-", "--1"]
  {
    assert!(
      matches!(read(invalid), Err(JsonError::MalformedInput { offset: 0, .. })),
      "{invalid} was accepted"
    );
  }
}

#[test]
#[allow(clippy::float_cmp)]
fn number_conversions() {
  assert_eq!(read("42").unwrap().i64(), Some(42));
  assert_eq!(read("-42").unwrap().i64(), Some(-42));
  assert_eq!(read("-42").unwrap().u64(), None);
  assert_eq!(read("-0").unwrap().u64(), Some(0));
  assert_eq!(read("9223372036854775807").unwrap().i64(), Some(i64::MAX));
  assert_eq!(read("9223372036854775808").unwrap().i64(), None);
  assert_eq!(read("18446744073709551615").unwrap().u64(), Some(u64::MAX));
  assert_eq!(read("10.0").unwrap().i64(), None);
  assert_eq!(read("1e1").unwrap().i64(), None);
  assert_eq!(read("10.0").unwrap().f64(), Some(10.0));
  assert_eq!(read("1.5e3").unwrap().f64(), Some(1500.0));
  assert_eq!(read("1e400").unwrap().f64(), None);
  assert!(read("1").unwrap().is_integer());
  assert!(!read("1.0").unwrap().is_integer());
}

#[test]
fn number_stops_at_delimiter() {
  let mut reader = PeekableRead::new(b"123,".as_slice());
  assert_eq!(read_number(&mut reader).unwrap().as_str(), "123");
  assert_eq!(reader.peek().unwrap(), Some(b','));
}
