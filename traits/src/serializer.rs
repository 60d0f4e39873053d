use core::any::Any;
use std::sync::Arc;

use crate::{Read, Write, JsonError, JsonType, TypeCache, TypeDescriptor, Options, read, write};

/// A serializer of object graphs to and from JSON.
///
/// Cloning a serializer is cheap, with clones sharing the cache of type descriptors. A serializer
/// may be shared across threads.
#[derive(Clone, Debug)]
pub struct JsonSerializer {
  options: Options,
  cache: Arc<TypeCache>,
}

impl Default for JsonSerializer {
  fn default() -> Self {
    Self::new(Options::default())
  }
}

fn downcast<T: JsonType>(value: Box<dyn Any>) -> Result<T, JsonError> {
  value
    .downcast::<T>()
    .map(|value| *value)
    .map_err(|_| JsonError::Internal("deserialized value was of an unexpected type"))
}

impl JsonSerializer {
  /// Create a serializer with the specified options.
  pub fn new(options: Options) -> Self {
    Self { options, cache: Arc::new(TypeCache::new(options.member_naming)) }
  }

  /// The options this serializer was created with.
  #[inline(always)]
  pub fn options(&self) -> &Options {
    &self.options
  }

  /// The cache of type descriptors used by this serializer.
  #[inline(always)]
  pub fn cache(&self) -> &TypeCache {
    &self.cache
  }

  /// Resolve the descriptor for `T`, as used by this serializer.
  #[inline(always)]
  pub fn resolve<T: JsonType>(&self) -> Arc<TypeDescriptor> {
    self.cache.resolve::<T>()
  }

  /// Deserialize a value from a reader.
  pub fn from_reader<T: JsonType, R: Read>(&self, reader: R) -> Result<T, JsonError> {
    let ty = self.cache.resolve::<T>();
    downcast(read::read(reader, &ty, &self.cache, &self.options)?)
  }

  /// Deserialize a value from a slice.
  #[inline(always)]
  pub fn from_slice<T: JsonType>(&self, json: &[u8]) -> Result<T, JsonError> {
    self.from_reader(json)
  }

  /// Deserialize a value from a string.
  #[inline(always)]
  pub fn from_str<T: JsonType>(&self, json: &str) -> Result<T, JsonError> {
    self.from_slice(json.as_bytes())
  }

  /// Serialize a value into a writer, returning the writer.
  pub fn to_writer<T: JsonType, W: Write>(&self, writer: W, value: &T) -> Result<W, JsonError> {
    let ty = self.cache.resolve::<T>();
    write::write(writer, &ty, value, &self.cache, &self.options)
  }

  /// Serialize a value into a `Vec<u8>`.
  #[inline(always)]
  pub fn to_vec<T: JsonType>(&self, value: &T) -> Result<Vec<u8>, JsonError> {
    self.to_writer(Vec::new(), value)
  }

  /// Serialize a value into a `String`.
  pub fn to_string<T: JsonType>(&self, value: &T) -> Result<String, JsonError> {
    String::from_utf8(self.to_vec(value)?)
      .map_err(|_| JsonError::Internal("serialized JSON wasn't valid UTF-8"))
  }
}
