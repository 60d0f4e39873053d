use crate::{JsonType, JsonScalar, TypeDescriptor, ScalarKind, ScalarToken, ScalarRef};

macro_rules! signed {
  ($($ty: ty),*) => {
    $(
      impl JsonType for $ty {
        fn describe() -> TypeDescriptor {
          TypeDescriptor::scalar::<Self>()
        }
      }
      impl JsonScalar for $ty {
        const KIND: ScalarKind = ScalarKind::Integer;
        fn from_token(token: ScalarToken) -> Option<Self> {
          let ScalarToken::Number(number) = token else { return None };
          number.i64()?.try_into().ok()
        }
        fn to_scalar(&self) -> ScalarRef<'_> {
          ScalarRef::I64(i64::from(*self))
        }
      }
    )*
  };
}

macro_rules! unsigned {
  ($($ty: ty),*) => {
    $(
      impl JsonType for $ty {
        fn describe() -> TypeDescriptor {
          TypeDescriptor::scalar::<Self>()
        }
      }
      impl JsonScalar for $ty {
        const KIND: ScalarKind = ScalarKind::Integer;
        fn from_token(token: ScalarToken) -> Option<Self> {
          let ScalarToken::Number(number) = token else { return None };
          number.u64()?.try_into().ok()
        }
        fn to_scalar(&self) -> ScalarRef<'_> {
          ScalarRef::U64(u64::from(*self))
        }
      }
    )*
  };
}

signed!(i8, i16, i32, i64);
unsigned!(u8, u16, u32, u64);

impl JsonType for bool {
  fn describe() -> TypeDescriptor {
    TypeDescriptor::scalar::<Self>()
  }
}
impl JsonScalar for bool {
  const KIND: ScalarKind = ScalarKind::Bool;
  fn from_token(token: ScalarToken) -> Option<Self> {
    let ScalarToken::Bool(value) = token else { return None };
    Some(value)
  }
  fn to_scalar(&self) -> ScalarRef<'_> {
    ScalarRef::Bool(*self)
  }
}

impl JsonType for char {
  fn describe() -> TypeDescriptor {
    TypeDescriptor::scalar::<Self>()
  }
}
impl JsonScalar for char {
  const KIND: ScalarKind = ScalarKind::Char;
  /// This accepts a string of exactly one character.
  fn from_token(token: ScalarToken) -> Option<Self> {
    let ScalarToken::Str(string) = token else { return None };
    let mut chars = string.chars();
    let char = chars.next()?;
    chars.next().is_none().then_some(char)
  }
  fn to_scalar(&self) -> ScalarRef<'_> {
    ScalarRef::Char(*self)
  }
}

#[test]
fn integers() {
  let number = |raw: &str| {
    let mut tokens = crate::Tokenizer::new(raw.as_bytes(), 1);
    let Some((crate::Token::Number(number), _)) = tokens.next_token().unwrap() else {
      panic!("{raw} wasn't a number")
    };
    ScalarToken::Number(number)
  };

  assert_eq!(u8::from_token(number("255")), Some(255));
  assert_eq!(u8::from_token(number("256")), None);
  assert_eq!(u8::from_token(number("-1")), None);
  assert_eq!(i8::from_token(number("-128")), Some(-128));
  assert_eq!(i32::from_token(number("1.5")), None);
  assert_eq!(i32::from_token(number("1e2")), None);
  assert_eq!(u64::from_token(number("18446744073709551615")), Some(u64::MAX));
  assert_eq!(i64::from_token(number("-9223372036854775808")), Some(i64::MIN));
  assert_eq!(i32::from_token(ScalarToken::Str("30".to_string())), None);
  assert_eq!(u16::MAX.to_scalar(), ScalarRef::U64(65535));
  assert_eq!((-5i16).to_scalar(), ScalarRef::I64(-5));
}

#[test]
fn bools_and_chars() {
  assert_eq!(bool::from_token(ScalarToken::Bool(true)), Some(true));
  assert_eq!(bool::from_token(ScalarToken::Str("true".to_string())), None);
  assert_eq!(char::from_token(ScalarToken::Str("é".to_string())), Some('é'));
  assert_eq!(char::from_token(ScalarToken::Str("ab".to_string())), None);
  assert_eq!(char::from_token(ScalarToken::Str(String::new())), None);
  assert_eq!('x'.to_scalar(), ScalarRef::Char('x'));
}
