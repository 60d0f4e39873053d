use crate::{JsonType, JsonScalar, TypeDescriptor, ScalarKind, ScalarToken, ScalarRef};

impl JsonType for String {
  fn describe() -> TypeDescriptor {
    TypeDescriptor::scalar::<Self>()
  }
}

impl JsonScalar for String {
  const KIND: ScalarKind = ScalarKind::String;
  fn from_token(token: ScalarToken) -> Option<Self> {
    let ScalarToken::Str(string) = token else { return None };
    Some(string)
  }
  fn to_scalar(&self) -> ScalarRef<'_> {
    ScalarRef::Str(self)
  }
}

#[test]
fn strings() {
  assert_eq!(
    String::from_token(ScalarToken::Str("a\u{1F600}".to_string())).as_deref(),
    Some("a\u{1F600}")
  );
  assert_eq!(String::from_token(ScalarToken::Bool(false)), None);
  assert_eq!("quote\"".to_string().to_scalar(), ScalarRef::Str("quote\""));
}
