//! Core data structures shared by the container: type-erased instances,
//! providers, cache slots and the resolution guard.

use crate::error::{BoxError, CircularDependency};
use crate::key::Key;

use once_cell::sync::OnceCell;
use std::any::{self, Any};
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

thread_local! {
  // Keys currently being constructed on this thread, outermost first, tagged
  // with the id of the container resolving them.
  static RESOLVING_STACK: RefCell<Vec<(usize, Key)>> = const { RefCell::new(Vec::new()) };
}

/// A resolved value, shared between the cache and every caller that asked for it.
#[derive(Clone)]
pub struct Instance {
  value: Arc<dyn Any + Send + Sync>,
  type_name: &'static str,
}

impl Instance {
  pub fn new<T: Any + Send + Sync>(value: T) -> Self {
    Self::from_arc(Arc::new(value))
  }

  pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
    Self {
      value,
      type_name: any::type_name::<T>(),
    }
  }

  /// Wraps a trait object. Read it back with [`Instance::downcast_trait`].
  pub fn from_trait<I: ?Sized + Send + Sync + 'static>(value: Arc<I>) -> Self {
    Self {
      value: Arc::new(value),
      type_name: any::type_name::<Arc<I>>(),
    }
  }

  pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
    Arc::clone(&self.value).downcast::<T>().ok()
  }

  pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
    self.value.downcast_ref::<T>()
  }

  pub fn downcast_trait<I: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<I>> {
    self.value.downcast_ref::<Arc<I>>().cloned()
  }

  pub fn is<T: Any>(&self) -> bool {
    self.value.is::<T>()
  }

  /// The full type name of the stored value.
  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  /// Whether both handles point at the same allocation.
  pub fn ptr_eq(a: &Instance, b: &Instance) -> bool {
    std::ptr::eq(
      Arc::as_ptr(&a.value) as *const (),
      Arc::as_ptr(&b.value) as *const (),
    )
  }
}

impl fmt::Debug for Instance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Instance({})", self.type_name)
  }
}

pub(crate) type ProviderFn = Arc<dyn Fn() -> Result<Instance, BoxError> + Send + Sync>;

/// A cache entry. It is inserted empty before the first construction and
/// filled at most once; waiters on other threads block on the cell.
pub(crate) type Slot = Arc<OnceCell<Instance>>;

pub(crate) fn filled_slot(instance: Instance) -> Slot {
  Arc::new(OnceCell::with_value(instance))
}

/// An RAII guard to detect circular dependencies.
///
/// Entering pushes the key onto the thread-local resolution stack; if the same
/// container is already constructing that key on this thread, the dependency
/// graph has a cycle and entering fails. Dropping the guard pops the key.
pub(crate) struct ResolutionGuard {
  _private: (),
}

impl ResolutionGuard {
  pub(crate) fn enter(container: usize, key: &Key) -> Result<Self, CircularDependency> {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      let start = stack
        .iter()
        .position(|(owner, resolving)| *owner == container && resolving == key);
      if let Some(start) = start {
        let path = stack[start..]
          .iter()
          .filter(|(owner, _)| *owner == container)
          .map(|(_, resolving)| resolving.to_string())
          .chain(std::iter::once(key.to_string()))
          .collect();
        return Err(CircularDependency { path });
      }
      stack.push((container, key.clone()));
      Ok(Self { _private: () })
    })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING_STACK.with(|stack| {
      stack.borrow_mut().pop();
    });
  }
}
