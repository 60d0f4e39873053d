use crate::{JsonType, JsonScalar, TypeDescriptor, ScalarKind, ScalarToken, ScalarRef};

impl JsonType for f64 {
  fn describe() -> TypeDescriptor {
    TypeDescriptor::scalar::<Self>()
  }
}
impl JsonScalar for f64 {
  const KIND: ScalarKind = ScalarKind::Float;
  /// This accepts any number whose nearest `f64` is finite.
  fn from_token(token: ScalarToken) -> Option<Self> {
    let ScalarToken::Number(number) = token else { return None };
    number.f64()
  }
  fn to_scalar(&self) -> ScalarRef<'_> {
    ScalarRef::F64(*self)
  }
}

impl JsonType for f32 {
  fn describe() -> TypeDescriptor {
    TypeDescriptor::scalar::<Self>()
  }
}
impl JsonScalar for f32 {
  const KIND: ScalarKind = ScalarKind::Float;
  /// This accepts any number whose nearest `f32` is finite.
  fn from_token(token: ScalarToken) -> Option<Self> {
    let ScalarToken::Number(number) = token else { return None };
    // Parsed directly, as rounding through an `f64` may round twice
    let value = number.as_str().parse::<f32>().ok()?;
    value.is_finite().then_some(value)
  }
  fn to_scalar(&self) -> ScalarRef<'_> {
    ScalarRef::F32(*self)
  }
}

#[allow(clippy::float_cmp)]
#[test]
fn floats() {
  let number = |raw: &str| {
    let mut tokens = crate::Tokenizer::new(raw.as_bytes(), 1);
    let Some((crate::Token::Number(number), _)) = tokens.next_token().unwrap() else {
      panic!("{raw} wasn't a number")
    };
    ScalarToken::Number(number)
  };

  assert_eq!(f64::from_token(number("0.1")), Some(0.1));
  assert_eq!(f64::from_token(number("-2")), Some(-2.0));
  assert_eq!(f64::from_token(number("1.7976931348623157e308")), Some(f64::MAX));
  assert_eq!(f64::from_token(number("1e309")), None);
  assert_eq!(f32::from_token(number("1.5")), Some(1.5));
  assert_eq!(f32::from_token(number("1e39")), None);
  assert_eq!(f64::from_token(ScalarToken::Bool(true)), None);
  assert_eq!(f32::from_token(number("0.1")), Some(0.1));
  assert_eq!(1.5f32.to_scalar(), ScalarRef::F32(1.5));
}

#[test]
fn shortest_forms() {
  let serializer = crate::JsonSerializer::default();
  assert_eq!(serializer.to_string(&vec![0.1f32, 1.1, -2.5e-8]).unwrap(), "[0.1,1.1,-2.5e-8]");
  assert_eq!(serializer.to_string(&vec![0.1f64, 1.1]).unwrap(), "[0.1,1.1]");
  assert_eq!(serializer.from_str::<Vec<f32>>("[0.1,1.1]").unwrap(), [0.1f32, 1.1]);
  assert!(matches!(
    serializer.to_string(&Some(f32::INFINITY)),
    Err(crate::JsonError::NonFiniteNumber { .. })
  ));
}
