use crate::{JsonType, TypeDescriptor};

/// `None` is represented as `null`, and `Some(value)` as `value`.
impl<T: JsonType> JsonType for Option<T> {
  fn describe() -> TypeDescriptor {
    TypeDescriptor::nullable::<T>()
  }
}

#[test]
fn options() {
  use crate::JsonSerializer;

  let serializer = JsonSerializer::default();
  assert_eq!(serializer.from_str::<Option<u8>>("null").unwrap(), None);
  assert_eq!(serializer.from_str::<Option<u8>>(" 5").unwrap(), Some(5));
  assert_eq!(serializer.from_str::<Vec<Option<bool>>>("[true,null]").unwrap(), [Some(true), None]);
  assert_eq!(serializer.to_string(&Some(1u8)).unwrap(), "1");
  assert_eq!(serializer.to_string(&Option::<u8>::None).unwrap(), "null");
  // `null` isn't a valid value for anything other than an `Option`
  assert!(matches!(
    serializer.from_str::<u8>("null"),
    Err(crate::JsonError::InvalidCast { token: crate::TokenKind::Null, offset: 0, .. })
  ));
}
