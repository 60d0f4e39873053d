use core::iter::Peekable;
use alloc::{vec::Vec, string::{String, ToString}};

use proc_macro::{Spacing, TokenTree, TokenStream};

use crate::{attributes::Attributes, identifier::Identifier};

pub(crate) struct StructField {
  pub(crate) attributes: Attributes,
  pub(crate) identifier: Identifier,
  /// The field's type, as Rust source.
  pub(crate) ty: String,
}

/// Take the tokens of a type, up to and including the `,` which terminates it.
///
/// `<` and `>` don't open groups, so they're counted to find the `,` at the top level.
fn take_type(iter: &mut Peekable<impl Iterator<Item = TokenTree>>) -> TokenStream {
  let mut ty = Vec::new();
  let mut depth = 0usize;
  let mut after_dash = false;
  for item in iter.by_ref() {
    if let TokenTree::Punct(punct) = &item {
      match punct.as_char() {
        ',' if depth == 0 => break,
        '<' => depth += 1,
        // The `>` of `->` doesn't close anything
        '>' if !after_dash => depth = depth.checked_sub(1).expect("unbalanced `>` within type"),
        _ => {}
      }
      after_dash = (punct.as_char() == '-') && matches!(punct.spacing(), Spacing::Joint);
    } else {
      after_dash = false;
    }
    ty.push(item);
  }
  TokenStream::from_iter(ty)
}

impl StructField {
  /// Parse a `StructField`, if present.
  ///
  /// This follows the syntax from
  /// <https://doc.rust-lang.org/1.91.0/reference/items/structs.html#grammar-StructField>, but only
  /// performs partial validation.
  fn parse_optional(iter: &mut Peekable<impl Iterator<Item = TokenTree>>) -> Option<Self> {
    iter.peek()?;

    let attributes = Attributes::parse(iter);
    crate::vis::skip_optional_visibility(iter);
    let identifier = Identifier::parse(iter);

    let Some(TokenTree::Punct(colon)) = iter.next() else {
      panic!("colon not found after identifier within `StructField`")
    };
    assert_eq!(colon.as_char(), ':', "colon wasn't a colon");
    assert!(
      matches!(colon.spacing(), Spacing::Alone),
      "colon between identifier and type wasn't independent"
    );

    let ty = take_type(iter).to_string();
    assert!(!ty.is_empty(), "field `{}` had no type", identifier.name());

    Some(StructField { attributes, identifier, ty })
  }
}

/// Parse `StructFields`.
///
/// This follows the syntax from
/// <https://doc.rust-lang.org/1.91.0/reference/items/structs.html#grammar-StructFields>.
pub(crate) fn parse_struct_fields(
  iter: &mut Peekable<impl Iterator<Item = TokenTree>>,
) -> impl Iterator<Item = StructField> {
  core::iter::from_fn(|| StructField::parse_optional(iter))
}
