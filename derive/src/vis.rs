use core::iter::Peekable;
use alloc::string::ToString;

use proc_macro::{Delimiter, TokenTree};

/// Advance past an optionally-present `Visibility`.
///
/// This follows the syntax from
/// <https://doc.rust-lang.org/1.91.0/reference/visibility-and-privacy.html#grammar-Visibility>,
/// yet doesn't validate the scope within parentheses, as the compiler already has.
pub(crate) fn skip_optional_visibility(iter: &mut Peekable<impl Iterator<Item = TokenTree>>) {
  // If this is present, it will have the mandatory `pub`
  if !matches!(iter.peek(), Some(TokenTree::Ident(ident)) if ident.to_string() == "pub") {
    return;
  }
  let _pub = iter.next();

  // An optional scope within parentheses may follow, such as `(crate)` or `(in super::path)`
  const PARENS: Delimiter = Delimiter::Parenthesis;
  if matches!(iter.peek(), Some(TokenTree::Group(group)) if group.delimiter() == PARENS) {
    let _scope = iter.next();
  }
}
