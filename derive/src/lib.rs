#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![no_std]

use core::{borrow::Borrow, str::FromStr, iter::Peekable};

extern crate alloc;
use alloc::{
  vec,
  vec::Vec,
  string::{String, ToString},
  format,
};

extern crate proc_macro;
use proc_macro::{Delimiter, Spacing, Punct, TokenTree, TokenStream};

mod attributes;
mod identifier;
mod vis;
mod r#struct;

use attributes::Attributes;
use identifier::Identifier;
use r#struct::StructField;

// `<` will not open a group, so we use this to take all items within a `< ... >` expression.
fn take_angle_expression(
  iter: &mut Peekable<impl Iterator<Item: Borrow<TokenTree>>>,
) -> TokenStream {
  {
    let Some(peeked) = iter.peek() else { return TokenStream::default() };
    let TokenTree::Punct(punct) = peeked.borrow() else { return TokenStream::default() };
    if punct.as_char() != '<' {
      return TokenStream::default();
    }
  }

  let mut result = vec![];
  let mut count = 0;
  loop {
    let item = iter.next().expect("`TokenTree` unexpectedly terminated when taking `< ... >`");
    result.push(item.borrow().clone());
    if let TokenTree::Punct(punct) = item.borrow() {
      let punct = punct.as_char();
      if punct == '<' {
        count += 1;
      }
      if punct == '>' {
        count -= 1;
      }
      if count == 0 {
        break;
      }
    }
  }
  TokenStream::from_iter(result)
}

// Advance the iterator past the next `,` on this depth, if there is one.
fn skip_comma_delimited(iter: &mut Peekable<impl Iterator<Item: Borrow<TokenTree>>>) {
  loop {
    take_angle_expression(iter);
    let Some(item) = iter.next() else { return };
    if let TokenTree::Punct(punct) = item.borrow() &&
      punct.as_char() == ','
    {
      return;
    }
  }
}

struct Variant {
  attributes: Attributes,
  identifier: Identifier,
}

enum Body {
  Struct(Vec<StructField>),
  Enum(Vec<Variant>),
}

struct Item {
  attributes: Attributes,
  generic_bounds: String,
  generics: String,
  name: String,
  body: Body,
}

// Parse the generics of an item into those with their bounds, and those without.
//
// This is somewhat comparable to `syn::Generics`, especially its `split_for_impl` method.
fn parse_generics(iter: &mut Peekable<impl Iterator<Item = TokenTree>>) -> (String, String) {
  let generic_bounds_tree = take_angle_expression(iter);

  let mut generics_tree = vec![];
  {
    let mut iter = generic_bounds_tree.clone().into_iter().peekable();
    while let Some(component) = iter.next() {
      // Take until the next colon, used to mark trait bounds
      if let TokenTree::Punct(punct) = &component &&
        punct.as_char() == ':'
      {
        // Skip the actual bounds
        skip_comma_delimited(&mut iter);
        // Add our own comma delimiter and move to the next item
        generics_tree.push(TokenTree::Punct(Punct::new(',', Spacing::Alone)));
        continue;
      }
      // Push this component as it isn't part of the bounds
      generics_tree.push(component);
    }
  }
  // Ensure this is terminated, which it won't be if the last item had bounds yet didn't have a
  // trailing comma
  if let Some(last) = generics_tree.last() {
    match last {
      TokenTree::Punct(punct) if punct.as_char() == '>' => {}
      _ => generics_tree.push(TokenTree::Punct(Punct::new('>', Spacing::Alone))),
    }
  }

  (generic_bounds_tree.to_string(), TokenStream::from_iter(generics_tree).to_string())
}

fn parse_variants(body: TokenStream) -> Vec<Variant> {
  let mut body = body.into_iter().peekable();
  let mut variants = vec![];
  while body.peek().is_some() {
    let attributes = Attributes::parse(&mut body);
    let identifier = Identifier::parse(&mut body);
    if let Some(TokenTree::Group(_)) = body.peek() {
      panic!("`JsonType` can only be derived for `enum`s whose variants have no fields");
    }
    assert!(!attributes.skip, "`skip` isn't supported on `enum` variants");
    assert!(!attributes.flatten, "`flatten` isn't supported on `enum` variants");
    variants.push(Variant { attributes, identifier });
    // Advance past any discriminant to the next variant
    skip_comma_delimited(&mut body);
  }
  variants
}

fn parse_item(item: TokenStream) -> Item {
  let mut item = item.into_iter().peekable();

  let attributes = Attributes::parse(&mut item);
  vis::skip_optional_visibility(&mut item);

  let kind = match item.next() {
    Some(TokenTree::Ident(ident)) => ident.to_string(),
    _ => panic!("`JsonType` wasn't applied to a `struct` or `enum`"),
  };
  let name = Identifier::parse(&mut item).source();
  let (generic_bounds, generics) = parse_generics(&mut item);

  // This presumably means we don't support items defined with `where` bounds
  let Some(TokenTree::Group(body)) = item.next() else {
    panic!("`{kind}`'s name was not followed by its body");
  };
  if body.delimiter() != Delimiter::Brace {
    panic!("`JsonType` derivation applied to `{kind}` with anonymous fields");
  }

  let body = match kind.as_str() {
    "struct" => {
      let mut fields = body.stream().into_iter().peekable();
      Body::Struct(r#struct::parse_struct_fields(&mut fields).collect())
    }
    "enum" => {
      assert!(generic_bounds.is_empty(), "`JsonType` can't be derived for generic `enum`s");
      Body::Enum(parse_variants(body.stream()))
    }
    _ => panic!("`JsonType` wasn't applied to a `struct` or `enum`"),
  };

  Item { attributes, generic_bounds, generics, name, body }
}

fn derive_object(item: &Item, fields: &[StructField]) -> String {
  let Item { attributes, generic_bounds, generics, name, .. } = item;

  let (constructor, bound) = if attributes.readonly {
    ("object_without_default", "")
  } else {
    ("object", "where Self: core::default::Default")
  };

  let mut members = String::new();
  for StructField { attributes, identifier, ty } in fields {
    if attributes.skip {
      continue;
    }
    let access = identifier.source();
    if attributes.flatten {
      assert!(attributes.key.is_none(), "`key` can't be used with `flatten`");
      members.push_str(&if attributes.readonly {
        format!(".read_only_flatten::<{ty}>(|this| &this.{access})")
      } else {
        format!(".flatten::<{ty}>(|this| &this.{access}, |this| &mut this.{access})")
      });
      continue;
    }
    let (name, explicit) = match &attributes.key {
      Some(key) => (key.clone(), true),
      None => (format!(r#""{}""#, identifier.name()), false),
    };
    members.push_str(&if attributes.readonly {
      format!(
        r#"
        .read_only_member::<{ty}>({name}, {explicit}, |this| &this.{access})
        "#
      )
    } else {
      format!(
        r#"
        .member::<{ty}>(
          {name},
          {explicit},
          |this| &this.{access},
          |this, value| this.{access} = value,
        )
        "#
      )
    });
  }

  format!(
    r#"
    impl{generic_bounds} graph_json_traits::JsonType for {name}{generics} {bound} {{
      fn describe() -> graph_json_traits::TypeDescriptor {{
        graph_json_traits::TypeDescriptor::{constructor}::<Self>()
          {members}
          .build()
      }}
    }}
    "#
  )
}

fn derive_enum(name: &str, variants: &[Variant]) -> String {
  let mut from_name = String::new();
  let mut to_name = String::new();
  for Variant { attributes, identifier } in variants {
    let variant = identifier.source();
    let key = match &attributes.key {
      Some(key) => key.clone(),
      None => format!(r#""{}""#, identifier.name()),
    };
    from_name.push_str(&format!("{key} => Some(Self::{variant}),\n"));
    to_name.push_str(&format!("Self::{variant} => {key},\n"));
  }

  format!(
    r#"
    impl graph_json_traits::JsonType for {name} {{
      fn describe() -> graph_json_traits::TypeDescriptor {{
        graph_json_traits::TypeDescriptor::scalar::<Self>()
      }}
    }}
    impl graph_json_traits::JsonScalar for {name} {{
      const KIND: graph_json_traits::ScalarKind = graph_json_traits::ScalarKind::Enum;
      fn from_token(token: graph_json_traits::ScalarToken) -> Option<Self> {{
        let graph_json_traits::ScalarToken::Str(name) = token else {{ return None }};
        match name.as_str() {{
          {from_name}
          _ => None,
        }}
      }}
      fn to_scalar(&self) -> graph_json_traits::ScalarRef<'_> {{
        graph_json_traits::ScalarRef::Str(match self {{
          {to_name}
        }})
      }}
    }}
    "#
  )
}

/// Derive an implementation of the `JsonType` trait.
///
/// For a `struct`, every field becomes a member of the object, in declaration order, named as the
/// field is (with the serializer's naming policy applied). The `struct` must implement `Default`,
/// which members absent from the input are left as.
///
/// - `#[key("name")]` on a field uses `name` within JSON, verbatim.
/// - `#[skip]` on a field omits it entirely.
/// - `#[readonly]` on a field serializes it yet never deserializes it.
/// - `#[flatten]` on a field, whose type is an object, places that object's members within this
///   object in its stead, in the order they're declared.
/// - `#[readonly]` on the `struct` makes it serialize-only, not requiring `Default`.
///
/// For an `enum` without fields, each variant is represented as a string of its name, which may
/// be overriden with `#[key("name")]`.
///
/// As a procedural macro, this will panic causing a compile-time error on any unexpected input.
#[proc_macro_derive(JsonType, attributes(key, skip, readonly, flatten))]
pub fn derive_json_type(item: TokenStream) -> TokenStream {
  let item = parse_item(item);
  let implementation = match &item.body {
    Body::Struct(fields) => derive_object(&item, fields),
    Body::Enum(variants) => derive_enum(&item.name, variants),
  };
  TokenStream::from_str(&implementation).expect("typo in implementation of `JsonType`")
}
