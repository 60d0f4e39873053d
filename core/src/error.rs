use alloc::string::String;

use thiserror::Error;

use crate::TokenKind;

/// An error incurred when tokenizing, deserializing, or serializing.
///
/// Every error is terminal for the call which raised it. No attempt is made to resynchronize the
/// input after an error.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
#[non_exhaustive]
pub enum JsonError {
  /// The input was not valid JSON.
  #[error("malformed input at byte {offset}: expected {expected}")]
  MalformedInput {
    /// The offset of the offending byte.
    offset: usize,
    /// A description of what the grammar allowed at this position.
    expected: &'static str,
  },

  /// The structure of the input did not match the structure of the target type.
  #[error("type mismatch at `{path}` (byte {offset}): expected {expected}, found {observed}")]
  TypeMismatch {
    /// The kind of value the target type expected.
    expected: &'static str,
    /// The token actually present.
    observed: TokenKind,
    /// The offset of the observed token.
    offset: usize,
    /// The path to the value within the document.
    path: String,
  },

  /// A token could not be converted to the target type.
  #[error("cannot convert {token} at `{path}` (byte {offset}) into `{target}`")]
  InvalidCast {
    /// The name of the target type.
    target: &'static str,
    /// The token which could not be converted.
    token: TokenKind,
    /// The offset of the token.
    offset: usize,
    /// The path to the value within the document.
    path: String,
  },

  /// The value was nested deeper than the configured limit.
  #[error("maximum nesting depth of {limit} exceeded")]
  DepthExceeded {
    /// The configured limit.
    limit: usize,
  },

  /// The value being serialized contains a reference cycle.
  #[error("reference cycle detected at `{path}`")]
  CycleDetected {
    /// The path at which an already-active object was reached again.
    path: String,
  },

  /// The type cannot be used as requested.
  #[error("`{type_name}` is not a supported target: {reason}")]
  UnsupportedTarget {
    /// The name of the unsupported type.
    type_name: &'static str,
    /// Why the type is unsupported.
    reason: &'static str,
  },

  /// A member was present which the target type doesn't declare.
  ///
  /// This is only raised when unknown members are configured to fail.
  #[error("unknown member `{name}` for `{type_name}` at byte {offset}")]
  UnknownMember {
    /// The name of the member.
    name: String,
    /// The name of the type being deserialized.
    type_name: &'static str,
    /// The offset of the member's name.
    offset: usize,
  },

  /// A float which JSON cannot represent (`NaN`, `inf`) was serialized.
  #[error("non-finite number at `{path}`")]
  NonFiniteNumber {
    /// The path to the value.
    path: String,
  },

  /// The underlying reader raised an error.
  #[error("failed to read input at byte {offset}: {reason}")]
  Read {
    /// The offset of the byte being read.
    offset: usize,
    /// The error from the reader.
    reason: String,
  },

  /// The underlying writer raised an error.
  #[error("failed to write output: {reason}")]
  Write {
    /// The error from the writer.
    reason: String,
  },

  /// An unexpected state was reached.
  #[error("internal error: {0}")]
  Internal(&'static str),
}

impl JsonError {
  /// Create an error for an input which ended early or had an unexpected byte.
  #[cold]
  pub fn malformed(offset: usize, expected: &'static str) -> Self {
    JsonError::MalformedInput { offset, expected }
  }
}
