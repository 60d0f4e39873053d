use std::{
  rc::Rc,
  sync::Arc,
  collections::{VecDeque, BTreeSet},
};

use crate::{JsonType, TypeDescriptor};

/// A collection which items may be appended to.
pub trait Appendable<T> {
  /// Append an item to the end of this collection.
  ///
  /// For sets, this inserts the item, with later duplicates being dropped.
  fn append(&mut self, item: T);
}

/// A collection which may be iterated over, in a stable order.
pub trait Iterable<T: 'static> {
  /// Iterate over the items within this collection.
  ///
  /// Each call yields a fresh iterator from the start of the collection.
  fn items(&self) -> impl Iterator<Item = &T>;
}

/// A collection which may be built from the canonical sequence of its items.
pub trait FromSequence<T>: Sized {
  /// Convert a sequence into this collection, yielding `None` if this collection can't hold it.
  fn from_sequence(sequence: Vec<T>) -> Option<Self>;
}

impl<T> Appendable<T> for Vec<T> {
  #[inline(always)]
  fn append(&mut self, item: T) {
    self.push(item);
  }
}
impl<T> Appendable<T> for VecDeque<T> {
  #[inline(always)]
  fn append(&mut self, item: T) {
    self.push_back(item);
  }
}
impl<T: Ord> Appendable<T> for BTreeSet<T> {
  #[inline(always)]
  fn append(&mut self, item: T) {
    self.insert(item);
  }
}

fn append_all<T, C: Default + Appendable<T>>(sequence: Vec<T>) -> C {
  let mut collection = C::default();
  for item in sequence {
    Appendable::append(&mut collection, item);
  }
  collection
}

macro_rules! sliced {
  ($($collection: ty),*) => {
    $(
      impl<T: 'static> Iterable<T> for $collection {
        #[inline(always)]
        fn items(&self) -> impl Iterator<Item = &T> {
          self.iter()
        }
      }
    )*
  };
}
sliced!(Vec<T>, VecDeque<T>, Box<[T]>, Rc<[T]>, Arc<[T]>, BTreeSet<T>, &'static [T]);

impl<T: 'static, const N: usize> Iterable<T> for [T; N] {
  #[inline(always)]
  fn items(&self) -> impl Iterator<Item = &T> {
    self.iter()
  }
}

impl<T> FromSequence<T> for Vec<T> {
  #[inline(always)]
  fn from_sequence(sequence: Vec<T>) -> Option<Self> {
    Some(sequence)
  }
}
impl<T> FromSequence<T> for VecDeque<T> {
  fn from_sequence(sequence: Vec<T>) -> Option<Self> {
    Some(append_all(sequence))
  }
}
impl<T: Ord> FromSequence<T> for BTreeSet<T> {
  fn from_sequence(sequence: Vec<T>) -> Option<Self> {
    Some(append_all(sequence))
  }
}
impl<T> FromSequence<T> for Box<[T]> {
  fn from_sequence(sequence: Vec<T>) -> Option<Self> {
    Some(sequence.into_boxed_slice())
  }
}
impl<T> FromSequence<T> for Rc<[T]> {
  fn from_sequence(sequence: Vec<T>) -> Option<Self> {
    Some(Rc::from(sequence))
  }
}
impl<T> FromSequence<T> for Arc<[T]> {
  fn from_sequence(sequence: Vec<T>) -> Option<Self> {
    Some(Arc::from(sequence))
  }
}
/// This yields `None` unless the sequence has exactly `N` items.
impl<T, const N: usize> FromSequence<T> for [T; N] {
  fn from_sequence(sequence: Vec<T>) -> Option<Self> {
    sequence.try_into().ok()
  }
}

macro_rules! collection {
  ($($collection: ty),*) => {
    $(
      impl<T: JsonType> JsonType for $collection {
        fn describe() -> TypeDescriptor {
          TypeDescriptor::collection::<T, Self>()
        }
      }
    )*
  };
}
collection!(Vec<T>, VecDeque<T>, Box<[T]>, Rc<[T]>, Arc<[T]>);

impl<T: JsonType + Ord> JsonType for BTreeSet<T> {
  fn describe() -> TypeDescriptor {
    TypeDescriptor::collection::<T, Self>()
  }
}

impl<T: JsonType, const N: usize> JsonType for [T; N] {
  fn describe() -> TypeDescriptor {
    TypeDescriptor::collection::<T, Self>()
  }
}

/// A borrowed slice may be serialized, yet never deserialized.
impl<T: JsonType> JsonType for &'static [T] {
  fn describe() -> TypeDescriptor {
    TypeDescriptor::write_only_collection::<T, Self>()
  }
}
