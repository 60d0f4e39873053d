use graph_json::{JsonError, Token, Tokenizer, JsonWriter};
use serde_json::{Map, Number, Value};

/*
  `serde_json::Value` is used as the reference model. Documents are tokenized into a `Value` with
  `graph-json` and compared against `serde_json`'s own parse, and `Value`s are written with
  `graph-json` and parsed back with `serde_json`.
*/

fn number(number: &graph_json::Number) -> Result<Number, JsonError> {
  if let Some(integer) = number.i64() {
    return Ok(Number::from(integer));
  }
  if let Some(integer) = number.u64() {
    return Ok(Number::from(integer));
  }
  number
    .f64()
    .and_then(Number::from_f64)
    .ok_or(JsonError::Internal("tokenized a number which wasn't finite"))
}

fn build(tokens: &mut Tokenizer<&[u8]>, token: Token) -> Result<Value, JsonError> {
  Ok(match token {
    Token::Null => Value::Null,
    Token::True => Value::Bool(true),
    Token::False => Value::Bool(false),
    Token::Number(value) => Value::Number(number(&value)?),
    Token::String(string) => Value::String(string),
    Token::ArrayStart => {
      let mut array = vec![];
      loop {
        let (token, _) = tokens.expect_token()?;
        if token == Token::ArrayEnd {
          break;
        }
        array.push(build(tokens, token)?);
      }
      Value::Array(array)
    }
    Token::ObjectStart => {
      let mut object = Map::new();
      loop {
        let name = match tokens.expect_token()?.0 {
          Token::ObjectEnd => break,
          Token::PropertyName(name) => name,
          _ => Err(JsonError::Internal("object member wasn't preceded by its name"))?,
        };
        let (token, _) = tokens.expect_token()?;
        object.insert(name, build(tokens, token)?);
      }
      Value::Object(object)
    }
    Token::ObjectEnd | Token::ArrayEnd | Token::PropertyName(_) => {
      Err(JsonError::Internal("value started with a closing token or name"))?
    }
  })
}

/// Tokenize a complete document into a `serde_json::Value`.
pub fn parse(encoding: &[u8]) -> Result<Value, JsonError> {
  let mut tokens = Tokenizer::new(encoding, 128);
  let (first, _) = tokens.expect_token()?;
  let value = build(&mut tokens, first)?;
  tokens.finish()?;
  Ok(value)
}

fn write_value(writer: &mut JsonWriter<Vec<u8>>, value: &Value) -> Result<(), JsonError> {
  match value {
    Value::Null => writer.null(),
    Value::Bool(bool) => writer.bool(*bool),
    Value::Number(number) => {
      if let Some(integer) = number.as_i64() {
        writer.i64(integer)
      } else if let Some(integer) = number.as_u64() {
        writer.u64(integer)
      } else {
        writer.f64(number.as_f64().ok_or(JsonError::Internal("number wasn't representable"))?)
      }
    }
    Value::String(string) => writer.string(string),
    Value::Array(array) => {
      writer.begin_array()?;
      for item in array {
        write_value(writer, item)?;
      }
      writer.end_array()
    }
    Value::Object(object) => {
      writer.begin_object()?;
      for (name, item) in object {
        writer.member_name(name)?;
        write_value(writer, item)?;
      }
      writer.end_object()
    }
  }
}

/// Write a `serde_json::Value` with `graph-json`.
pub fn write(value: &Value, indent: bool) -> Result<Vec<u8>, JsonError> {
  let mut writer = JsonWriter::new(Vec::new(), indent);
  write_value(&mut writer, value)?;
  Ok(writer.into_inner())
}

/// Escape every non-ASCII character within a serialized document as `\uXXXX`.
///
/// Non-ASCII characters only occur within strings, so this yields an equivalent document.
pub fn escape_non_ascii(encoding: &str) -> String {
  let mut result = String::with_capacity(encoding.len());
  let mut units = [0; 2];
  for char in encoding.chars() {
    if char.is_ascii() {
      result.push(char);
      continue;
    }
    for unit in char.encode_utf16(&mut units) {
      result.push_str(&format!("\\u{unit:04x}"));
    }
  }
  result
}

fn check_float(number: f64, expected: f64) {
  // 0.1% of the smaller number
  let allowed_deviation = number.min(expected).abs() / 1000.0;
  assert!((number - expected).abs() <= allowed_deviation);
}

/// Assert two values are equivalent, allowing floats to deviate slightly.
pub fn check_values_equivalent(a: &Value, b: &Value) {
  match (a, b) {
    (Value::Number(a), Value::Number(b)) => {
      if a.is_f64() || b.is_f64() {
        check_float(a.as_f64().unwrap(), b.as_f64().unwrap());
      } else {
        assert_eq!(a, b);
      }
    }
    (Value::Array(a), Value::Array(b)) => {
      assert_eq!(a.len(), b.len());
      for (a, b) in a.iter().zip(b) {
        check_values_equivalent(a, b);
      }
    }
    (Value::Object(a), Value::Object(b)) => {
      assert_eq!(a.len(), b.len());
      for (key, value) in a {
        check_values_equivalent(value, &b[key]);
      }
    }
    _ => assert_eq!(a, b),
  }
}

#[cfg(test)]
mod tests {
  use rand_core::{RngCore, OsRng};
  use graph_json_traits::JsonSerializer;
  use super::*;

  // Containers beyond this depth are never generated
  const MAX_DEPTH: usize = 4;

  #[allow(clippy::cast_possible_truncation)]
  fn random_char() -> char {
    if (OsRng.next_u64() % 2) == 1 {
      // ASCII, including control characters
      return char::from_u32((OsRng.next_u64() % 128) as u32).unwrap();
    }
    // Any non-ASCII scalar value, stepping over the surrogates
    const SURROGATES: u32 = 0xe000 - 0xd800;
    let mut scalar = 0x80 + (OsRng.next_u64() % u64::from(0x11_0000 - 0x80 - SURROGATES)) as u32;
    if scalar >= 0xd800 {
      scalar += SURROGATES;
    }
    char::from_u32(scalar).unwrap()
  }

  fn random_string() -> String {
    (0 .. (OsRng.next_u64() % 32)).map(|_| random_char()).collect()
  }

  fn random_number() -> Number {
    match OsRng.next_u64() % 3 {
      0 => Number::from(i64::try_from(OsRng.next_u64() >> 1).unwrap().wrapping_neg()),
      1 => Number::from(OsRng.next_u64()),
      _ => loop {
        if let Some(float) = Number::from_f64(f64::from_bits(OsRng.next_u64())) {
          break float;
        }
      },
    }
  }

  fn random_value(depth: usize) -> Value {
    let modulus = if depth == MAX_DEPTH { 4 } else { 6 };
    match OsRng.next_u64() % modulus {
      0 => Value::Null,
      1 => Value::Bool((OsRng.next_u64() % 2) == 1),
      2 => Value::Number(random_number()),
      3 => Value::String(random_string()),
      4 => Value::Array((0 .. (OsRng.next_u64() % 6)).map(|_| random_value(depth + 1)).collect()),
      _ => Value::Object(
        (0 .. (OsRng.next_u64() % 6)).map(|_| (random_string(), random_value(depth + 1))).collect(),
      ),
    }
  }

  fn random_container() -> Value {
    loop {
      let value = random_value(0);
      if matches!(value, Value::Object(_) | Value::Array(_)) {
        break value;
      }
    }
  }

  fn depth(value: &Value) -> usize {
    match value {
      Value::Array(items) => 1 + items.iter().map(depth).max().unwrap_or(0),
      Value::Object(members) => 1 + members.values().map(depth).max().unwrap_or(0),
      _ => 0,
    }
  }

  #[test]
  fn generator() {
    for _ in 0 .. 1000 {
      assert!(depth(&random_container()) <= MAX_DEPTH);
      assert!(random_string().chars().count() < 32);
    }
  }

  #[test]
  fn tokenizer() {
    for _ in 0 .. 100 {
      let value = random_container();
      let encoding = serde_json::to_string(&value).unwrap();
      check_values_equivalent(&value, &parse(encoding.as_bytes()).unwrap());
      check_values_equivalent(&value, &parse(escape_non_ascii(&encoding).as_bytes()).unwrap());
      let pretty = serde_json::to_string_pretty(&value).unwrap();
      check_values_equivalent(&value, &parse(pretty.as_bytes()).unwrap());
    }
  }

  #[test]
  fn writer() {
    for _ in 0 .. 100 {
      let value = random_container();
      for indent in [false, true] {
        let encoding = write(&value, indent).unwrap();
        check_values_equivalent(&value, &serde_json::from_slice(&encoding).unwrap());
      }
    }
  }

  #[test]
  fn pretty_printing() {
    // Without floats, whose shortest representations may differ, the output should be identical
    let value = serde_json::json!({
      "empty": [],
      "nested": { "a": [1, -2, null, { "b": true }], "c": {} },
      "string": "line\nbreak \u{1f600} \u{7f}",
      "large": u64::MAX,
    });
    assert_eq!(
      String::from_utf8(write(&value, true).unwrap()).unwrap(),
      serde_json::to_string_pretty(&value).unwrap()
    );
    assert_eq!(
      String::from_utf8(write(&value, false).unwrap()).unwrap(),
      serde_json::to_string(&value).unwrap()
    );
  }

  #[test]
  fn typed() {
    let serializer = JsonSerializer::default();
    for _ in 0 .. 100 {
      let floats = (0 .. (OsRng.next_u64() % 16))
        .map(|_| loop {
          let float = f64::from_bits(OsRng.next_u64());
          if float.is_finite() {
            break float;
          }
        })
        .collect::<Vec<_>>();
      let strings = (0 .. (OsRng.next_u64() % 16)).map(|_| random_string()).collect::<Vec<_>>();

      let encoding = serde_json::to_string(&floats).unwrap();
      let read = serializer.from_str::<Vec<f64>>(&encoding).unwrap();
      assert_eq!(read.len(), floats.len());
      for (read, expected) in read.into_iter().zip(&floats) {
        check_float(read, *expected);
      }
      let written = serializer.to_string(&floats).unwrap();
      let reread = serde_json::from_str::<Vec<f64>>(&written).unwrap();
      for (read, expected) in reread.into_iter().zip(&floats) {
        check_float(read, *expected);
      }

      let encoding = serde_json::to_string(&strings).unwrap();
      assert_eq!(serializer.from_str::<Vec<String>>(&encoding).unwrap(), strings);
      let written = serializer.to_string(&strings).unwrap();
      assert_eq!(serde_json::from_str::<Vec<String>>(&written).unwrap(), strings);
    }
  }

  #[test]
  fn rejects_invalid() {
    for invalid in
      ["", "[", "[1,]", r#"{"a"}"#, r#"{"a":1,}"#, "[01]", "[1.]", r#"["\x"]"#, r#"["\ud800"]"#, "[1] 2"]
    {
      assert!(serde_json::from_str::<Value>(invalid).is_err());
      assert!(parse(invalid.as_bytes()).is_err(), "accepted {invalid}");
    }
  }
}
