use alloc::vec::Vec;

use crate::JsonError;

/// An item within the stack, representing the container currently being tokenized.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum State {
  /// Corresponds to `{`, used for representing objects
  Object,
  /// Corresponds to `[`, used for representing arrays
  Array,
}

/// A stack of the containers currently open, bounded to a maximum depth.
#[derive(Debug)]
pub(crate) struct Stack {
  items: Vec<State>,
  limit: usize,
}

impl Stack {
  #[inline(always)]
  pub(crate) fn new(limit: usize) -> Self {
    Self { items: Vec::with_capacity(limit.min(16)), limit }
  }

  /// The current stack depth.
  #[inline(always)]
  pub(crate) fn depth(&self) -> usize {
    self.items.len()
  }

  /// Peek at the current item on the stack.
  #[inline(always)]
  pub(crate) fn peek(&self) -> Option<State> {
    self.items.last().copied()
  }

  /// Pop the next item from the stack.
  #[inline(always)]
  pub(crate) fn pop(&mut self) -> Option<State> {
    self.items.pop()
  }

  /// Push an item onto the stack.
  #[inline(always)]
  pub(crate) fn push(&mut self, item: State) -> Result<(), JsonError> {
    if self.items.len() == self.limit {
      Err(JsonError::DepthExceeded { limit: self.limit })?;
    }
    self.items.push(item);
    Ok(())
  }
}

#[test]
fn stack_limit() {
  let mut stack = Stack::new(2);
  stack.push(State::Object).unwrap();
  stack.push(State::Array).unwrap();
  assert_eq!(stack.push(State::Array), Err(JsonError::DepthExceeded { limit: 2 }));
  assert_eq!(stack.depth(), 2);
  assert_eq!(stack.pop(), Some(State::Array));
  assert_eq!(stack.peek(), Some(State::Object));
}
