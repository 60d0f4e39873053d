use core::{any::TypeId, fmt};
use std::{
  collections::{HashMap, HashSet},
  sync::{Arc, RwLock, PoisonError},
};

use crate::{JsonError, JsonType, TypeRef, TypeDescriptor, MemberDescriptor, Shape, MemberNaming};

/// A cache of type descriptors, keyed by `TypeId`.
///
/// Descriptors are built on first use and live as long as the cache. Once cached, a descriptor is
/// never modified, so concurrent resolutions of the same type observe the same descriptor.
pub struct TypeCache {
  naming: MemberNaming,
  types: RwLock<HashMap<TypeId, Arc<TypeDescriptor>>>,
}

impl fmt::Debug for TypeCache {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TypeCache")
      .field("naming", &self.naming)
      .field("len", &self.len())
      .finish_non_exhaustive()
  }
}

impl TypeCache {
  /// Create an empty cache, applying the specified naming policy to the members of objects.
  pub fn new(naming: MemberNaming) -> Self {
    Self { naming, types: RwLock::new(HashMap::new()) }
  }

  /// Resolve the descriptor for `T`.
  #[inline(always)]
  pub fn resolve<T: JsonType>(&self) -> Arc<TypeDescriptor> {
    self.resolve_ref(TypeRef::of::<T>())
  }

  /// Resolve the descriptor for a referenced type.
  pub fn resolve_ref(&self, ty: TypeRef) -> Arc<TypeDescriptor> {
    if let Some(descriptor) =
      self.types.read().unwrap_or_else(PoisonError::into_inner).get(&ty.id())
    {
      return descriptor.clone();
    }

    /*
      The descriptor is built without holding the lock. If another thread inserts a descriptor for
      this type in the meantime, its descriptor is kept and ours is discarded, so every caller
      observes a single descriptor per type.
    */
    let mut descriptor = ty.describe();
    descriptor.apply_naming(self.naming);
    self
      .types
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .entry(ty.id())
      .or_insert_with(|| Arc::new(descriptor))
      .clone()
  }

  /// The amount of types cached.
  pub fn len(&self) -> usize {
    self.types.read().unwrap_or_else(PoisonError::into_inner).len()
  }

  /// If no types have been cached.
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Check a type may be deserialized.
  ///
  /// This walks every type reachable through members which may be set, failing with
  /// `UnsupportedTarget` if any of them cannot be constructed.
  pub fn check_readable(&self, root: &TypeDescriptor) -> Result<(), JsonError> {
    fn check(
      descriptor: &TypeDescriptor,
      visited: &mut HashSet<TypeId>,
      queue: &mut Vec<TypeRef>,
    ) -> Result<(), JsonError> {
      if !visited.insert(descriptor.id()) {
        return Ok(());
      }
      let unsupported =
        |reason| JsonError::UnsupportedTarget { type_name: descriptor.type_name(), reason };
      match descriptor.shape() {
        Shape::Scalar(_) => {}
        Shape::Object(object) => {
          if !object.is_constructible() {
            Err(unsupported("the object has no default to deserialize into"))?;
          }
          let writable = object.members().iter().filter(|member| member.is_writable());
          queue.extend(writable.map(MemberDescriptor::element));
        }
        Shape::Collection(collection) => {
          if !collection.is_buildable() {
            Err(unsupported("the collection may only be iterated"))?;
          }
          queue.push(collection.element());
        }
        Shape::Nullable(nullable) => queue.push(nullable.inner()),
        Shape::Pointer(pointer) => {
          if !pointer.is_constructible() {
            Err(unsupported("the pointer cannot be constructed"))?;
          }
          queue.push(pointer.inner());
        }
      }
      Ok(())
    }

    let mut visited = HashSet::new();
    let mut queue = vec![];
    check(root, &mut visited, &mut queue)?;
    while let Some(ty) = queue.pop() {
      check(&self.resolve_ref(ty), &mut visited, &mut queue)?;
    }
    Ok(())
  }
}
