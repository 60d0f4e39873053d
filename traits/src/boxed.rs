use core::{any::Any, cell::RefCell};
use std::{rc::Rc, sync::Arc};

use crate::{JsonError, JsonType, TypeDescriptor, Visitor, Convert};

#[inline(always)]
fn downcast<P: 'static>(pointer: &dyn Any) -> Result<&P, JsonError> {
  pointer.downcast_ref::<P>().ok_or(JsonError::Internal("pointer was of an unexpected type"))
}

macro_rules! owning {
  ($($pointer: ident),*) => {
    $(
      /// This is represented as the value pointed to.
      impl<T: JsonType> JsonType for $pointer<T> {
        fn describe() -> TypeDescriptor {
          fn wrap<T: 'static>(value: Box<dyn Any>) -> Option<Box<dyn Any>> {
            value.downcast::<T>().ok().map(|value| Box::new($pointer::new(*value)) as Box<dyn Any>)
          }
          fn visit<T: 'static>(pointer: &dyn Any, visit: &mut Visitor<'_>) -> Result<(), JsonError> {
            visit(&**downcast::<$pointer<T>>(pointer)?)
          }
          TypeDescriptor::pointer::<Self, T>(Some(wrap::<T> as Convert), visit::<T>)
        }
      }
    )*
  };
}

owning!(Box, Rc, Arc);

/// This is represented as the value within.
///
/// Serializing a `RefCell` which is mutably borrowed fails with `JsonError::Internal`.
impl<T: JsonType> JsonType for RefCell<T> {
  fn describe() -> TypeDescriptor {
    fn wrap<T: 'static>(value: Box<dyn Any>) -> Option<Box<dyn Any>> {
      value.downcast::<T>().ok().map(|value| Box::new(RefCell::new(*value)) as Box<dyn Any>)
    }
    fn visit<T: 'static>(cell: &dyn Any, visit: &mut Visitor<'_>) -> Result<(), JsonError> {
      let value = downcast::<RefCell<T>>(cell)?
        .try_borrow()
        .map_err(|_| JsonError::Internal("`RefCell` was mutably borrowed while serializing"))?;
      visit(&*value)
    }
    TypeDescriptor::pointer::<Self, T>(Some(wrap::<T> as Convert), visit::<T>)
  }
}
