use crate::key::Key;

use std::error::Error as StdError;
use thiserror::Error;

/// Any failure raised by user code: a provider, a construction operation, or
/// something they call.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// The error returned when a key cannot be constructed.
///
/// Every level of a failing resolution wraps the failure once, so the
/// outermost error names the key that was requested and its `source` chain
/// walks down through each dependency that failed to the original cause.
#[derive(Debug, Error)]
#[error("Failed to construct {key}")]
pub struct ConstructionError {
  key: String,
  #[source]
  cause: BoxError,
}

impl ConstructionError {
  pub(crate) fn new(key: &Key, cause: impl Into<BoxError>) -> Self {
    Self {
      key: key.to_string(),
      cause: cause.into(),
    }
  }

  /// The reference of the key that failed at this level.
  pub fn key(&self) -> &str {
    &self.key
  }

  /// The failure this error wraps.
  pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
    &*self.cause
  }

  pub fn into_cause(self) -> BoxError {
    self.cause
  }

  /// The innermost error of the chain, never a `ConstructionError`.
  pub fn root_cause(&self) -> &(dyn StdError + 'static) {
    let mut current: &(dyn StdError + 'static) = &*self.cause;
    while let Some(next) = current.source() {
      current = next;
    }
    current
  }

  /// The keys of every nested `ConstructionError`, outermost first.
  pub fn key_path(&self) -> Vec<&str> {
    let mut path = vec![self.key()];
    let mut current: &(dyn StdError + 'static) = &*self.cause;
    while let Some(nested) = current.downcast_ref::<ConstructionError>() {
      path.push(nested.key());
      current = &*nested.cause;
    }
    path
  }
}

/// The default construction path was reached for a key that has no
/// construction operation.
#[derive(Debug, Error)]
#[error("`{key}` has no construction operation and nothing is registered or provided for it")]
pub struct NotConstructible {
  pub key: String,
}

/// A key was requested again while it was still being constructed.
#[derive(Debug, Error)]
#[error("circular dependency: {}", .path.join(" -> "))]
pub struct CircularDependency {
  /// The keys of the cycle, starting and ending with the re-entered key.
  pub path: Vec<String>,
}

/// A resolved value did not have the type the caller asked for.
#[derive(Debug, Error)]
#[error("resolved value is a `{found}`, expected `{expected}`")]
pub struct TypeMismatch {
  pub expected: &'static str,
  pub found: &'static str,
}

/// Bad positional access to [`Args`](crate::Args).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgsError {
  #[error("argument {index} requested but only {len} were resolved")]
  OutOfRange { index: usize, len: usize },

  #[error("argument {index} is a `{found}`, expected `{expected}`")]
  Mismatch {
    index: usize,
    expected: &'static str,
    found: &'static str,
  },
}

/// A specialized `Result` type for container operations.
pub type Result<T, E = ConstructionError> = std::result::Result<T, E>;
