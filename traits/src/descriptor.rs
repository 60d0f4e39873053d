use core::{
  fmt,
  any::{Any, TypeId},
  marker::PhantomData,
};

use crate::{
  JsonError, Number, JsonType, JsonScalar, Appendable, FromSequence, Iterable, MemberNaming,
};

/// A lazy reference to a type's descriptor.
///
/// Descriptors refer to the types within them by `TypeRef`, which are only resolved (through the
/// [`crate::TypeCache`]) once needed. This allows describing types which refer to themselves.
#[derive(Clone, Copy)]
pub struct TypeRef {
  id: TypeId,
  name: &'static str,
  describe: fn() -> TypeDescriptor,
}

impl TypeRef {
  /// A reference to the type `T`.
  #[inline(always)]
  pub fn of<T: JsonType>() -> Self {
    Self { id: TypeId::of::<T>(), name: core::any::type_name::<T>(), describe: T::describe }
  }

  /// The ID of the referenced type.
  #[inline(always)]
  pub fn id(&self) -> TypeId {
    self.id
  }

  /// The name of the referenced type.
  #[inline(always)]
  pub fn name(&self) -> &'static str {
    self.name
  }

  /// Build the referenced type's descriptor, without consulting any cache.
  #[inline(always)]
  pub fn describe(&self) -> TypeDescriptor {
    (self.describe)()
  }
}

impl PartialEq for TypeRef {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}
impl Eq for TypeRef {}

impl fmt::Debug for TypeRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("TypeRef").field(&self.name).finish()
  }
}

/// The kind of a scalar, used to describe it within errors.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ScalarKind {
  /// A string.
  String,
  /// A single character, represented as a string.
  Char,
  /// An integer.
  Integer,
  /// A float.
  Float,
  /// A boolean.
  Bool,
  /// A fieldless enum, represented as the name of its variant.
  Enum,
}

impl ScalarKind {
  /// A description of the JSON value expected for this kind of scalar.
  pub fn description(self) -> &'static str {
    match self {
      ScalarKind::String => "a string",
      ScalarKind::Char => "a single-character string",
      ScalarKind::Integer => "an integer",
      ScalarKind::Float => "a number",
      ScalarKind::Bool => "a boolean",
      ScalarKind::Enum => "the name of a variant",
    }
  }
}

/// A scalar token read from JSON, to be converted into a scalar type.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ScalarToken {
  /// A string.
  Str(String),
  /// A number, not yet converted to any numeric type.
  Number(Number),
  /// A boolean.
  Bool(bool),
}

/// A view of a scalar, to be written as JSON.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ScalarRef<'a> {
  /// A string.
  Str(&'a str),
  /// A character, written as a string.
  Char(char),
  /// A signed integer.
  I64(i64),
  /// An unsigned integer.
  U64(u64),
  /// A single-precision float, written in its shortest form as an `f32`.
  F32(f32),
  /// A double-precision float.
  F64(f64),
  /// A boolean.
  Bool(bool),
}

/// A callback visiting a value, as used when walking values through type-erased descriptors.
pub type Visitor<'a> = dyn FnMut(&dyn Any) -> Result<(), JsonError> + 'a;

/// A function converting an owned value into another type, yielding `None` on a type mismatch.
pub type Convert = fn(Box<dyn Any>) -> Option<Box<dyn Any>>;

/// A function visiting the value(s) within a container.
pub type Visit = fn(&dyn Any, &mut Visitor<'_>) -> Result<(), JsonError>;

/// The descriptor for a scalar.
pub struct ScalarDescriptor {
  kind: ScalarKind,
  read: fn(ScalarToken) -> Option<Box<dyn Any>>,
  write: fn(&dyn Any) -> Option<ScalarRef<'_>>,
}

fn read_scalar<T: JsonScalar>(token: ScalarToken) -> Option<Box<dyn Any>> {
  T::from_token(token).map(|value| Box::new(value) as Box<dyn Any>)
}

fn write_scalar<T: JsonScalar>(value: &dyn Any) -> Option<ScalarRef<'_>> {
  value.downcast_ref::<T>().map(T::to_scalar)
}

impl ScalarDescriptor {
  /// The kind of this scalar.
  #[inline(always)]
  pub fn kind(&self) -> ScalarKind {
    self.kind
  }

  /// Convert a token into this scalar, yielding `None` if it's of the wrong kind or out of range.
  #[inline(always)]
  pub fn read(&self, token: ScalarToken) -> Option<Box<dyn Any>> {
    (self.read)(token)
  }

  /// View a value of this scalar's type as something to be written.
  #[inline(always)]
  pub fn write<'a>(&self, value: &'a dyn Any) -> Result<ScalarRef<'a>, JsonError> {
    (self.write)(value).ok_or(JsonError::Internal("scalar was of an unexpected type"))
  }
}

/// Type-erased access to a member of an object.
trait MemberAccess: Send + Sync {
  fn get<'a>(&self, object: &'a dyn Any) -> Option<&'a dyn Any>;
  fn set(&self, object: &mut dyn Any, value: Box<dyn Any>) -> bool;
  fn writable(&self) -> bool;
}

struct Field<T, M> {
  get: fn(&T) -> &M,
  set: Option<fn(&mut T, M)>,
}

impl<T: 'static, M: 'static> MemberAccess for Field<T, M> {
  fn get<'a>(&self, object: &'a dyn Any) -> Option<&'a dyn Any> {
    object.downcast_ref::<T>().map(|object| (self.get)(object) as &dyn Any)
  }

  fn set(&self, object: &mut dyn Any, value: Box<dyn Any>) -> bool {
    let (Some(set), Some(object)) = (self.set, object.downcast_mut::<T>()) else { return false };
    let Ok(value) = value.downcast::<M>() else { return false };
    set(object, *value);
    true
  }

  fn writable(&self) -> bool {
    self.set.is_some()
  }
}

// A member of an object `B` embedded within `T`, accessed through `T`.
struct Nested<T, B> {
  get: fn(&T) -> &B,
  get_mut: Option<fn(&mut T) -> &mut B>,
  inner: Box<dyn MemberAccess>,
}

impl<T: 'static, B: 'static> MemberAccess for Nested<T, B> {
  fn get<'a>(&self, object: &'a dyn Any) -> Option<&'a dyn Any> {
    let object = object.downcast_ref::<T>()?;
    self.inner.get((self.get)(object))
  }

  fn set(&self, object: &mut dyn Any, value: Box<dyn Any>) -> bool {
    let (Some(get_mut), Some(object)) = (self.get_mut, object.downcast_mut::<T>()) else {
      return false;
    };
    self.inner.set(get_mut(object), value)
  }

  fn writable(&self) -> bool {
    self.get_mut.is_some() && self.inner.writable()
  }
}

/// The descriptor for a member of an object.
pub struct MemberDescriptor {
  declared: &'static str,
  explicit: bool,
  name: String,
  ordinal: usize,
  element: TypeRef,
  access: Box<dyn MemberAccess>,
}

impl MemberDescriptor {
  /// The name the member was declared with.
  #[inline(always)]
  pub fn declared(&self) -> &'static str {
    self.declared
  }

  /// The name of the member within JSON.
  ///
  /// This is the declared name with the naming policy applied, unless the name was explicitly
  /// specified.
  #[inline(always)]
  pub fn name(&self) -> &str {
    &self.name
  }

  /// The position of this member within its object.
  #[inline(always)]
  pub fn ordinal(&self) -> usize {
    self.ordinal
  }

  /// The type of this member.
  #[inline(always)]
  pub fn element(&self) -> TypeRef {
    self.element
  }

  /// If this member may be set when deserializing.
  #[inline(always)]
  pub fn is_writable(&self) -> bool {
    self.access.writable()
  }

  /// Get this member from an object.
  #[inline(always)]
  pub fn get<'a>(&self, object: &'a dyn Any) -> Result<&'a dyn Any, JsonError> {
    self.access.get(object).ok_or(JsonError::Internal("object was of an unexpected type"))
  }

  /// Set this member within an object.
  #[inline(always)]
  pub fn set(&self, object: &mut dyn Any, value: Box<dyn Any>) -> Result<(), JsonError> {
    if !self.access.set(object, value) {
      Err(JsonError::Internal("member couldn't be set"))?;
    }
    Ok(())
  }
}

impl fmt::Debug for MemberDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MemberDescriptor")
      .field("name", &self.name)
      .field("ordinal", &self.ordinal)
      .field("element", &self.element)
      .field("writable", &self.is_writable())
      .finish_non_exhaustive()
  }
}

/// The descriptor for an object.
pub struct ObjectDescriptor {
  members: Vec<MemberDescriptor>,
  construct: Option<fn() -> Box<dyn Any>>,
}

impl ObjectDescriptor {
  /// The members of this object, in order.
  #[inline(always)]
  pub fn members(&self) -> &[MemberDescriptor] {
    &self.members
  }

  /// Find a member by its JSON name.
  pub fn member(&self, name: &str, case_insensitive: bool) -> Option<&MemberDescriptor> {
    self.members.iter().find(|member| {
      if case_insensitive {
        member.name.eq_ignore_ascii_case(name)
      } else {
        member.name == name
      }
    })
  }

  /// If this object may be constructed when deserializing.
  #[inline(always)]
  pub fn is_constructible(&self) -> bool {
    self.construct.is_some()
  }

  /// Construct a default instance of this object, if it may be constructed.
  #[inline(always)]
  pub fn construct(&self) -> Option<Box<dyn Any>> {
    self.construct.map(|construct| construct())
  }
}

/// The functions to build a collection while deserializing.
///
/// Every collection is built by appending to a `Vec` of its elements, which is then converted into
/// the collection itself.
struct CollectionBuilder {
  begin: fn() -> Box<dyn Any>,
  append: fn(&mut dyn Any, Box<dyn Any>) -> bool,
  finish: Convert,
}

fn begin_sequence<T: 'static>() -> Box<dyn Any> {
  Box::new(Vec::<T>::new())
}

fn append_to_sequence<T: 'static>(sequence: &mut dyn Any, item: Box<dyn Any>) -> bool {
  let (Some(sequence), Ok(item)) = (sequence.downcast_mut::<Vec<T>>(), item.downcast::<T>()) else {
    return false;
  };
  Appendable::append(sequence, *item);
  true
}

fn finish_sequence<T: 'static, C: FromSequence<T> + 'static>(
  sequence: Box<dyn Any>,
) -> Option<Box<dyn Any>> {
  let sequence = sequence.downcast::<Vec<T>>().ok()?;
  C::from_sequence(*sequence).map(|collection| Box::new(collection) as Box<dyn Any>)
}

fn iterate<T: 'static, C: Iterable<T> + 'static>(
  collection: &dyn Any,
  visit: &mut Visitor<'_>,
) -> Result<(), JsonError> {
  let collection = collection
    .downcast_ref::<C>()
    .ok_or(JsonError::Internal("collection was of an unexpected type"))?;
  for item in collection.items() {
    visit(item)?;
  }
  Ok(())
}

/// The descriptor for a homogeneous collection.
pub struct CollectionDescriptor {
  element: TypeRef,
  builder: Option<CollectionBuilder>,
  iterate: Visit,
}

impl CollectionDescriptor {
  /// The type of the elements within this collection.
  #[inline(always)]
  pub fn element(&self) -> TypeRef {
    self.element
  }

  /// If this collection may be built when deserializing.
  #[inline(always)]
  pub fn is_buildable(&self) -> bool {
    self.builder.is_some()
  }

  /// Begin building this collection, returning the sequence to append elements to.
  pub fn begin(&self) -> Option<Box<dyn Any>> {
    self.builder.as_ref().map(|builder| (builder.begin)())
  }

  /// Append an element to a sequence returned by `begin`.
  pub fn append(&self, sequence: &mut dyn Any, item: Box<dyn Any>) -> Result<(), JsonError> {
    let builder = self.builder.as_ref().ok_or(JsonError::Internal("collection isn't buildable"))?;
    if !(builder.append)(sequence, item) {
      Err(JsonError::Internal("element was of an unexpected type"))?;
    }
    Ok(())
  }

  /// Convert a sequence returned by `begin` into the collection.
  ///
  /// This yields `None` if the collection can't hold the elements, such as an array of a distinct
  /// length.
  pub fn finish(&self, sequence: Box<dyn Any>) -> Option<Box<dyn Any>> {
    (self.builder.as_ref()?.finish)(sequence)
  }

  /// Visit each element within the collection, in order.
  #[inline(always)]
  pub fn iterate(&self, collection: &dyn Any, visit: &mut Visitor<'_>) -> Result<(), JsonError> {
    (self.iterate)(collection, visit)
  }
}

/// The descriptor for an `Option`.
pub struct NullableDescriptor {
  inner: TypeRef,
  none: fn() -> Box<dyn Any>,
  some: Convert,
  get: fn(&dyn Any) -> Option<Option<&dyn Any>>,
}

fn none<T: 'static>() -> Box<dyn Any> {
  Box::new(Option::<T>::None)
}

fn some<T: 'static>(value: Box<dyn Any>) -> Option<Box<dyn Any>> {
  value.downcast::<T>().ok().map(|value| Box::new(Some(*value)) as Box<dyn Any>)
}

fn get_option<T: 'static>(value: &dyn Any) -> Option<Option<&dyn Any>> {
  value.downcast_ref::<Option<T>>().map(|value| value.as_ref().map(|value| value as &dyn Any))
}

impl NullableDescriptor {
  /// The type within the `Option`.
  #[inline(always)]
  pub fn inner(&self) -> TypeRef {
    self.inner
  }

  /// Construct `None`.
  #[inline(always)]
  pub fn none(&self) -> Box<dyn Any> {
    (self.none)()
  }

  /// Construct `Some(value)`.
  #[inline(always)]
  pub fn some(&self, value: Box<dyn Any>) -> Result<Box<dyn Any>, JsonError> {
    (self.some)(value).ok_or(JsonError::Internal("value was of an unexpected type"))
  }

  /// Get the value within the `Option`, if there is one.
  #[inline(always)]
  pub fn get<'a>(&self, value: &'a dyn Any) -> Result<Option<&'a dyn Any>, JsonError> {
    (self.get)(value).ok_or(JsonError::Internal("option was of an unexpected type"))
  }
}

/// The descriptor for a pointer, which is transparent within JSON.
pub struct PointerDescriptor {
  inner: TypeRef,
  wrap: Option<Convert>,
  visit: Visit,
}

impl PointerDescriptor {
  /// The type pointed to.
  #[inline(always)]
  pub fn inner(&self) -> TypeRef {
    self.inner
  }

  /// If this pointer may be constructed when deserializing.
  #[inline(always)]
  pub fn is_constructible(&self) -> bool {
    self.wrap.is_some()
  }

  /// Wrap a value within this pointer.
  pub fn wrap(&self, value: Box<dyn Any>) -> Result<Box<dyn Any>, JsonError> {
    let wrap = self.wrap.ok_or(JsonError::Internal("pointer isn't constructible"))?;
    wrap(value).ok_or(JsonError::Internal("value was of an unexpected type"))
  }

  /// Visit the value pointed to.
  #[inline(always)]
  pub fn visit(&self, pointer: &dyn Any, visit: &mut Visitor<'_>) -> Result<(), JsonError> {
    (self.visit)(pointer, visit)
  }
}

/// The shape of a type, as represented within JSON.
pub enum Shape {
  /// A string, number, or boolean.
  Scalar(ScalarDescriptor),
  /// An object with named members.
  Object(ObjectDescriptor),
  /// A homogeneous collection.
  Collection(CollectionDescriptor),
  /// A value which may be `null`.
  Nullable(NullableDescriptor),
  /// A pointer to another value.
  Pointer(PointerDescriptor),
}

/// A description of how a type maps to and from JSON.
pub struct TypeDescriptor {
  id: TypeId,
  type_name: &'static str,
  shape: Shape,
}

impl TypeDescriptor {
  #[inline(always)]
  fn new<T: 'static>(shape: Shape) -> Self {
    Self { id: TypeId::of::<T>(), type_name: core::any::type_name::<T>(), shape }
  }

  /// The ID of the described type.
  #[inline(always)]
  pub fn id(&self) -> TypeId {
    self.id
  }

  /// The name of the described type.
  #[inline(always)]
  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  /// The shape of the described type.
  #[inline(always)]
  pub fn shape(&self) -> &Shape {
    &self.shape
  }

  /// Describe a scalar.
  pub fn scalar<T: JsonScalar>() -> Self {
    Self::new::<T>(Shape::Scalar(ScalarDescriptor {
      kind: T::KIND,
      read: read_scalar::<T>,
      write: write_scalar::<T>,
    }))
  }

  /// Begin describing an object, which will be constructed with `Default` when deserializing.
  pub fn object<T: JsonType + Default>() -> ObjectBuilder<T> {
    fn construct<T: Default + 'static>() -> Box<dyn Any> {
      Box::new(T::default())
    }
    ObjectBuilder { members: Vec::new(), construct: Some(construct::<T>), _type: PhantomData }
  }

  /// Begin describing an object which cannot be deserialized, only serialized.
  pub fn object_without_default<T: JsonType>() -> ObjectBuilder<T> {
    ObjectBuilder { members: Vec::new(), construct: None, _type: PhantomData }
  }

  /// Describe a collection `C` of `T`, which may be serialized and deserialized.
  pub fn collection<T: JsonType, C: JsonType + FromSequence<T> + Iterable<T>>() -> Self {
    Self::new::<C>(Shape::Collection(CollectionDescriptor {
      element: TypeRef::of::<T>(),
      builder: Some(CollectionBuilder {
        begin: begin_sequence::<T>,
        append: append_to_sequence::<T>,
        finish: finish_sequence::<T, C>,
      }),
      iterate: iterate::<T, C>,
    }))
  }

  /// Describe a collection `C` of `T`, which may only be serialized.
  pub fn write_only_collection<T: JsonType, C: JsonType + Iterable<T>>() -> Self {
    Self::new::<C>(Shape::Collection(CollectionDescriptor {
      element: TypeRef::of::<T>(),
      builder: None,
      iterate: iterate::<T, C>,
    }))
  }

  /// Describe `Option<T>`.
  pub fn nullable<T: JsonType>() -> Self {
    Self::new::<Option<T>>(Shape::Nullable(NullableDescriptor {
      inner: TypeRef::of::<T>(),
      none: none::<T>,
      some: some::<T>,
      get: get_option::<T>,
    }))
  }

  /// Describe a pointer `P` to `T`.
  ///
  /// `wrap` converts a boxed `T` into a boxed `P`, and is `None` if `P` cannot be constructed.
  /// `visit` calls its callback with the `T` within a `P`.
  pub fn pointer<P: JsonType, T: JsonType>(wrap: Option<Convert>, visit: Visit) -> Self {
    Self::new::<P>(Shape::Pointer(PointerDescriptor { inner: TypeRef::of::<T>(), wrap, visit }))
  }

  /// Apply a naming policy to the members of this type, if it's an object.
  pub(crate) fn apply_naming(&mut self, naming: MemberNaming) {
    if let Shape::Object(object) = &mut self.shape {
      for member in &mut object.members {
        if !member.explicit {
          member.name = naming.apply(member.declared);
        }
      }
    }
  }
}

impl fmt::Debug for TypeDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut debug = f.debug_struct("TypeDescriptor");
    debug.field("type_name", &self.type_name);
    match &self.shape {
      Shape::Scalar(scalar) => debug.field("scalar", &scalar.kind),
      Shape::Object(object) => debug.field("members", &object.members),
      Shape::Collection(collection) => debug.field("collection_of", &collection.element),
      Shape::Nullable(nullable) => debug.field("nullable", &nullable.inner),
      Shape::Pointer(pointer) => debug.field("pointer_to", &pointer.inner),
    };
    debug.finish_non_exhaustive()
  }
}

/// A builder for the descriptor of an object.
///
/// Members are ordered as they're added.
pub struct ObjectBuilder<T> {
  members: Vec<MemberDescriptor>,
  construct: Option<fn() -> Box<dyn Any>>,
  _type: PhantomData<fn() -> T>,
}

impl<T: JsonType> ObjectBuilder<T> {
  fn push<M: JsonType>(
    mut self,
    name: &'static str,
    explicit: bool,
    get: fn(&T) -> &M,
    set: Option<fn(&mut T, M)>,
  ) -> Self {
    self.members.push(MemberDescriptor {
      declared: name,
      explicit,
      name: name.to_string(),
      ordinal: self.members.len(),
      element: TypeRef::of::<M>(),
      access: Box::new(Field { get, set }),
    });
    self
  }

  /// Add a member.
  ///
  /// If `explicit` is set, `name` is used verbatim, without applying the naming policy.
  pub fn member<M: JsonType>(
    self,
    name: &'static str,
    explicit: bool,
    get: fn(&T) -> &M,
    set: fn(&mut T, M),
  ) -> Self {
    self.push(name, explicit, get, Some(set))
  }

  /// Add a member which is serialized yet never deserialized.
  pub fn read_only_member<M: JsonType>(
    self,
    name: &'static str,
    explicit: bool,
    get: fn(&T) -> &M,
  ) -> Self {
    self.push(name, explicit, get, None)
  }

  fn splice<B: JsonType>(
    mut self,
    get: fn(&T) -> &B,
    get_mut: Option<fn(&mut T) -> &mut B>,
  ) -> Self {
    let Shape::Object(base) = B::describe().shape else { return self };
    for MemberDescriptor { declared, explicit, name, element, access, .. } in base.members {
      self.members.push(MemberDescriptor {
        declared,
        explicit,
        name,
        ordinal: self.members.len(),
        element,
        access: Box::new(Nested { get, get_mut, inner: access }),
      });
    }
    self
  }

  /// Add every member of the object `B` embedded within this object, in the order `B` declares
  /// them, as if they were declared here.
  ///
  /// If `B` isn't described as an object, this adds no members.
  pub fn flatten<B: JsonType>(self, get: fn(&T) -> &B, get_mut: fn(&mut T) -> &mut B) -> Self {
    self.splice(get, Some(get_mut))
  }

  /// Add every member of the object `B` embedded within this object, with none of them
  /// deserialized.
  pub fn read_only_flatten<B: JsonType>(self, get: fn(&T) -> &B) -> Self {
    self.splice(get, None)
  }

  /// Finish describing the object.
  pub fn build(self) -> TypeDescriptor {
    TypeDescriptor::new::<T>(Shape::Object(ObjectDescriptor {
      members: self.members,
      construct: self.construct,
    }))
  }
}
