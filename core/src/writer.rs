use core::fmt::Debug;
use alloc::{format, string::String, vec::Vec};

use crate::{Write, JsonError, write_escaped};

// Floats are written in the shortest form which round-trips through the same type.
macro_rules! float {
  ($($float: ident,)*) => {
    $(
      #[doc = concat!("Write an `", stringify!($float), "`.")]
      ///
      /// JSON cannot represent `NaN` or infinities, which fail with `NonFiniteNumber`. The path
      /// within the error is left empty, as the writer isn't aware of it.
      pub fn $float(&mut self, value: $float) -> Result<(), JsonError> {
        if !value.is_finite() {
          Err(JsonError::NonFiniteNumber { path: String::new() })?;
        }
        self.separate()?;

        #[cfg(feature = "zmij")]
        let mut buffer = zmij::Buffer::new();
        #[cfg(feature = "zmij")]
        let formatted: &str = buffer.format(value);
        // `Debug` yields the shortest representation which round-trips, always with a `.` or exponent
        #[cfg(not(feature = "zmij"))]
        let formatted = &format!("{value:?}");
        self.raw(formatted.as_bytes())
      }
    )*
  };
}

/// A streaming writer of JSON tokens.
///
/// Bytes are written to the underlying sink as each token is written, with separators and
/// (optionally) indentation inserted as needed. The writer does not validate the order tokens are
/// written in; that's the caller's responsibility.
#[derive(Debug)]
pub struct JsonWriter<W: Write> {
  writer: W,
  indent: bool,
  /// For each open container, if an item has been written within it.
  stack: Vec<bool>,
  /// If a member name was just written, so the next value shouldn't be preceded by a separator.
  after_name: bool,
}

#[inline(always)]
fn write_error<E: Debug>(e: E) -> JsonError {
  JsonError::Write { reason: format!("{e:?}") }
}

impl<W: Write> JsonWriter<W> {
  /// Create a new writer.
  ///
  /// If `indent` is set, the output will be pretty-printed with two spaces per level. Else, the
  /// output is compact. No trailing newline is written either way.
  pub fn new(writer: W, indent: bool) -> Self {
    Self { writer, indent, stack: Vec::new(), after_name: false }
  }

  /// Consume the writer, returning the underlying sink.
  pub fn into_inner(self) -> W {
    self.writer
  }

  /// The amount of containers currently open.
  #[inline(always)]
  pub fn depth(&self) -> usize {
    self.stack.len()
  }

  #[inline(always)]
  fn raw(&mut self, bytes: &[u8]) -> Result<(), JsonError> {
    self.writer.write_all(bytes).map_err(write_error)
  }

  fn newline(&mut self) -> Result<(), JsonError> {
    self.raw(b"\n")?;
    for _ in 0 .. self.stack.len() {
      self.raw(b"  ")?;
    }
    Ok(())
  }

  /// Write the separator preceding a value or member name.
  fn separate(&mut self) -> Result<(), JsonError> {
    if core::mem::take(&mut self.after_name) {
      return Ok(());
    }
    let Some(has_items) = self.stack.last_mut() else { return Ok(()) };
    let first = !core::mem::replace(has_items, true);
    if !first {
      self.raw(b",")?;
    }
    if self.indent {
      self.newline()?;
    }
    Ok(())
  }

  fn close(&mut self, close: &[u8]) -> Result<(), JsonError> {
    let had_items =
      self.stack.pop().ok_or(JsonError::Internal("closed a container which wasn't open"))?;
    if self.indent && had_items {
      self.newline()?;
    }
    self.raw(close)
  }

  /// Write `{`.
  pub fn begin_object(&mut self) -> Result<(), JsonError> {
    self.separate()?;
    self.raw(b"{")?;
    self.stack.push(false);
    Ok(())
  }

  /// Write the name of a member, and the `:` following it.
  pub fn member_name(&mut self, name: &str) -> Result<(), JsonError> {
    self.separate()?;
    self.raw(b"\"")?;
    write_escaped(&mut self.writer, name).map_err(write_error)?;
    self.raw(if self.indent { b"\": ".as_slice() } else { b"\":".as_slice() })?;
    self.after_name = true;
    Ok(())
  }

  /// Write `}`.
  pub fn end_object(&mut self) -> Result<(), JsonError> {
    self.close(b"}")
  }

  /// Write `[`.
  pub fn begin_array(&mut self) -> Result<(), JsonError> {
    self.separate()?;
    self.raw(b"[")?;
    self.stack.push(false);
    Ok(())
  }

  /// Write `]`.
  pub fn end_array(&mut self) -> Result<(), JsonError> {
    self.close(b"]")
  }

  /// Write a string.
  pub fn string(&mut self, value: &str) -> Result<(), JsonError> {
    self.separate()?;
    self.raw(b"\"")?;
    write_escaped(&mut self.writer, value).map_err(write_error)?;
    self.raw(b"\"")
  }

  /// Write a signed integer.
  pub fn i64(&mut self, value: i64) -> Result<(), JsonError> {
    self.separate()?;
    self.raw(format!("{value}").as_bytes())
  }

  /// Write an unsigned integer.
  pub fn u64(&mut self, value: u64) -> Result<(), JsonError> {
    self.separate()?;
    self.raw(format!("{value}").as_bytes())
  }

  float! {
    f32,
    f64,
  }

  /// Write a boolean.
  pub fn bool(&mut self, value: bool) -> Result<(), JsonError> {
    self.separate()?;
    self.raw(if value { b"true".as_slice() } else { b"false".as_slice() })
  }

  /// Write `null`.
  pub fn null(&mut self) -> Result<(), JsonError> {
    self.separate()?;
    self.raw(b"null")
  }
}

#[cfg(test)]
fn sample(indent: bool) -> String {
  let mut writer = JsonWriter::new(Vec::new(), indent);
  writer.begin_object().unwrap();
  writer.member_name("name").unwrap();
  writer.string("Microsoft \"Way\"").unwrap();
  writer.member_name("sites").unwrap();
  writer.begin_array().unwrap();
  writer.i64(-1).unwrap();
  writer.u64(2).unwrap();
  writer.f64(0.5).unwrap();
  writer.end_array().unwrap();
  writer.member_name("empty").unwrap();
  writer.begin_array().unwrap();
  writer.end_array().unwrap();
  writer.member_name("inner").unwrap();
  writer.begin_object().unwrap();
  writer.member_name("flag").unwrap();
  writer.bool(true).unwrap();
  writer.member_name("none").unwrap();
  writer.null().unwrap();
  writer.end_object().unwrap();
  writer.end_object().unwrap();
  assert_eq!(writer.depth(), 0);
  String::from_utf8(writer.into_inner()).unwrap()
}

#[test]
fn shortest_floats() {
  let mut writer = JsonWriter::new(Vec::new(), false);
  writer.begin_array().unwrap();
  writer.f32(0.1).unwrap();
  writer.f32(1.1).unwrap();
  writer.f64(0.1).unwrap();
  writer.f64(1e300).unwrap();
  writer.end_array().unwrap();
  assert!(matches!(writer.f32(f32::NAN), Err(JsonError::NonFiniteNumber { .. })));
  assert!(matches!(writer.f64(f64::INFINITY), Err(JsonError::NonFiniteNumber { .. })));
  assert_eq!(String::from_utf8(writer.into_inner()).unwrap(), "[0.1,1.1,0.1,1e300]");
}

#[test]
fn compact() {
  assert_eq!(
    sample(false),
    r#"{"name":"Microsoft \"Way\"","sites":[-1,2,0.5],"empty":[],"inner":{"flag":true,"none":null}}"#
  );
}

#[test]
fn indented() {
  assert_eq!(
    sample(true),
    r#"{
  "name": "Microsoft \"Way\"",
  "sites": [
    -1,
    2,
    0.5
  ],
  "empty": [],
  "inner": {
    "flag": true,
    "none": null
  }
}"#
  );
}

#[test]
fn floats() {
  let write = |value: f64| {
    let mut writer = JsonWriter::new(Vec::new(), false);
    writer.f64(value).map(|()| String::from_utf8(writer.into_inner()).unwrap())
  };
  for value in [0.0, 1.0, -2.5, 1e300, 5e-324, f64::MAX, f64::MIN_POSITIVE] {
    assert_eq!(write(value).unwrap().parse::<f64>().unwrap().to_bits(), value.to_bits());
  }
  for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
    assert!(matches!(write(value), Err(JsonError::NonFiniteNumber { .. })));
  }
}
