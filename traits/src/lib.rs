#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

pub use graph_json::*;

mod options;
mod path;
mod descriptor;
mod cache;
mod read;
mod write;
mod serializer;

mod primitives;
mod float;
mod string;
mod option;
mod boxed;
mod sequences;

pub use options::{NullHandling, UnknownMembers, MemberNaming, Options};
pub use descriptor::{
  TypeRef, ScalarKind, ScalarToken, ScalarRef, Visitor, Convert, Visit, ScalarDescriptor,
  MemberDescriptor, ObjectDescriptor, CollectionDescriptor, NullableDescriptor, PointerDescriptor,
  Shape, TypeDescriptor, ObjectBuilder,
};
pub use cache::TypeCache;
pub use serializer::JsonSerializer;
pub use sequences::{Appendable, Iterable, FromSequence};

/// A type which may be mapped to and from JSON.
///
/// Implementations describe the type's shape, and are typically derived with
/// `#[derive(JsonType)]` from `graph-json-derive`.
pub trait JsonType: 'static {
  /// Describe this type.
  ///
  /// This is called at most once per [`TypeCache`], unless threads race to resolve the type first.
  /// Types referred to are described lazily, by [`TypeRef`].
  fn describe() -> TypeDescriptor;
}

/// A type represented by a single JSON string, number, or boolean.
pub trait JsonScalar: JsonType + Sized {
  /// The kind of this scalar.
  const KIND: ScalarKind;

  /// Convert a token into this type, yielding `None` if it's of the wrong kind or out of range.
  fn from_token(token: ScalarToken) -> Option<Self>;

  /// View this value as something to be written.
  fn to_scalar(&self) -> ScalarRef<'_>;
}
