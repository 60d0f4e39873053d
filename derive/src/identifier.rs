use core::iter::Peekable;
use alloc::string::{String, ToString};

use proc_macro::{Ident, TokenTree};

pub(crate) struct Identifier {
  ident: Ident,
}

impl Identifier {
  /// Parse an `IDENTIFIER`.
  ///
  /// This only checks the next item is a `TokenTree::Ident`, without checking it isn't a keyword.
  pub(crate) fn parse(iter: &mut Peekable<impl Iterator<Item = TokenTree>>) -> Self {
    let Some(TokenTree::Ident(ident)) = iter.next() else { panic!("expected an identifier") };
    Self { ident }
  }

  /// The name as declared, without the `r#` prefix of a raw identifier.
  pub(crate) fn name(&self) -> String {
    let ident = self.ident.to_string();
    ident.strip_prefix("r#").unwrap_or(&ident).to_string()
  }

  /// The identifier as Rust source, with any `r#` prefix.
  pub(crate) fn source(&self) -> String {
    self.ident.to_string()
  }
}
