use core::any::{Any, TypeId};

use crate::{
  Write, JsonWriter, JsonError, TypeCache, TypeDescriptor, Shape, ScalarRef, Options, NullHandling,
  path::Path,
};

/// A writer of values, driven by their type descriptors.
struct Writer<'a, W: Write> {
  out: JsonWriter<W>,
  cache: &'a TypeCache,
  options: &'a Options,
  path: Path,
  /// The objects currently being written, by address and type.
  ///
  /// The type is included as an object and its first member may share an address.
  active: Vec<(usize, TypeId)>,
}

impl<W: Write> Writer<'_, W> {
  /// Check another container may be opened without exceeding the depth limit.
  fn check_depth(&self) -> Result<(), JsonError> {
    if self.out.depth() >= self.options.max_depth {
      Err(JsonError::DepthExceeded { limit: self.options.max_depth })?;
    }
    Ok(())
  }

  fn write_value(&mut self, ty: &TypeDescriptor, value: &dyn Any) -> Result<(), JsonError> {
    match ty.shape() {
      Shape::Scalar(scalar) => match scalar.write(value)? {
        ScalarRef::Str(string) => self.out.string(string),
        ScalarRef::Char(char) => self.out.string(char.encode_utf8(&mut [0; 4])),
        ScalarRef::I64(value) => self.out.i64(value),
        ScalarRef::U64(value) => self.out.u64(value),
        ScalarRef::F32(value) => {
          if !value.is_finite() {
            Err(JsonError::NonFiniteNumber { path: self.path.to_string() })?;
          }
          self.out.f32(value)
        }
        ScalarRef::F64(value) => {
          if !value.is_finite() {
            Err(JsonError::NonFiniteNumber { path: self.path.to_string() })?;
          }
          self.out.f64(value)
        }
        ScalarRef::Bool(value) => self.out.bool(value),
      },

      Shape::Nullable(nullable) => match nullable.get(value)? {
        None => self.out.null(),
        Some(value) => {
          let inner = self.cache.resolve_ref(nullable.inner());
          self.write_value(&inner, value)
        }
      },

      Shape::Pointer(pointer) => {
        let inner = self.cache.resolve_ref(pointer.inner());
        pointer.visit(value, &mut |pointee: &dyn Any| self.write_value(&inner, pointee))
      }

      Shape::Object(object) => {
        self.check_depth()?;
        let identity = ((value as *const dyn Any).cast::<()>().addr(), ty.id());
        if self.active.contains(&identity) {
          Err(JsonError::CycleDetected { path: self.path.to_string() })?;
        }
        self.active.push(identity);

        self.out.begin_object()?;
        for member in object.members() {
          let member_value = member.get(value)?;
          let element = self.cache.resolve_ref(member.element());
          if (self.options.null_handling == NullHandling::Omit) &&
            let Shape::Nullable(nullable) = element.shape() &&
            nullable.get(member_value)?.is_none()
          {
            continue;
          }

          self.out.member_name(member.name())?;
          self.path.push_member(member.name());
          self.write_value(&element, member_value)?;
          self.path.pop();
        }
        self.out.end_object()?;

        self.active.pop();
        Ok(())
      }

      Shape::Collection(collection) => {
        self.check_depth()?;
        let element = self.cache.resolve_ref(collection.element());
        self.out.begin_array()?;
        let mut index = 0;
        collection.iterate(value, &mut |item: &dyn Any| {
          self.path.push_index(index);
          self.write_value(&element, item)?;
          self.path.pop();
          index += 1;
          Ok(())
        })?;
        self.out.end_array()
      }
    }
  }
}

/// Write a value of the described type, returning the sink once done.
pub(crate) fn write<W: Write>(
  writer: W,
  ty: &TypeDescriptor,
  value: &dyn Any,
  cache: &TypeCache,
  options: &Options,
) -> Result<W, JsonError> {
  let mut writer = Writer {
    out: JsonWriter::new(writer, options.indent),
    cache,
    options,
    path: Path::default(),
    active: vec![],
  };
  writer.write_value(ty, value)?;
  Ok(writer.out.into_inner())
}
