use core::iter::Peekable;
use alloc::string::{String, ToString};

use proc_macro::{Delimiter, TokenTree, TokenStream};

/// The attributes recognized on a type, field, or variant.
#[derive(Default)]
pub(crate) struct Attributes {
  /// The string literal from `key("...")`, as written.
  pub(crate) key: Option<String>,
  pub(crate) skip: bool,
  pub(crate) readonly: bool,
  pub(crate) flatten: bool,
}

/// Parse a potentially-present `OuterAttribute`, returning the contained `Attr`.
///
/// This follows the syntax from
/// <https://doc.rust-lang.org/1.91.0/reference/attributes.html#grammar-OuterAttribute>, but only
/// performs partial validation.
fn parse_optional_outer_attribute(
  iter: &mut Peekable<impl Iterator<Item = TokenTree>>,
) -> Option<TokenStream> {
  // If this is present, it will have the mandatory `#`
  if !matches!(iter.peek(), Some(TokenTree::Punct(pound)) if pound.as_char() == '#') {
    return None;
  }
  let _pound = iter.next();
  let Some(TokenTree::Group(group)) = iter.next() else {
    panic!("attribute declaration wasn't followed by `TokenTree::Group`");
  };
  assert_eq!(group.delimiter(), Delimiter::Bracket, "attribute had unexpected delimiter");
  Some(group.stream())
}

/// Parse the argument to `key`, a string literal within parentheses.
fn parse_key(argument: Option<TokenTree>) -> String {
  let Some(TokenTree::Group(group)) = argument else {
    panic!("`key` attribute not followed with `(...)`")
  };
  assert_eq!(
    group.delimiter(),
    Delimiter::Parenthesis,
    "`key` attribute with a non-parentheses group"
  );
  let mut arguments = group.stream().into_iter();
  let Some(TokenTree::Literal(literal)) = arguments.next() else {
    panic!("`key` attribute with a non-literal argument")
  };
  assert!(arguments.next().is_none(), "`key` attribute with multiple tokens within parentheses");
  let literal = literal.to_string();
  assert!(
    literal.starts_with('"') || literal.starts_with("r\"") || literal.starts_with("r#"),
    "`key` attribute's argument wasn't a string literal"
  );
  literal
}

impl Attributes {
  /// Parse every outer attribute present, keeping those recognized.
  pub(crate) fn parse(iter: &mut Peekable<impl Iterator<Item = TokenTree>>) -> Self {
    let mut result = Self::default();
    while let Some(attribute) = parse_optional_outer_attribute(iter) {
      let mut attribute = attribute.into_iter();
      let Some(TokenTree::Ident(ident)) = attribute.next() else { continue };
      match ident.to_string().as_str() {
        "skip" => result.skip = true,
        "readonly" => result.readonly = true,
        "flatten" => result.flatten = true,
        "key" => result.key = Some(parse_key(attribute.next())),
        // `doc`, `allow`, and the like
        _ => {}
      }
    }
    result
  }
}
