//! The main `Container` struct and its associated methods.

use crate::builder::ContainerBuilder;
use crate::constructible::{Args, Blueprint, Constructible};
use crate::core::{filled_slot, Instance, ProviderFn, ResolutionGuard, Slot};
use crate::error::{BoxError, ConstructionError, NotConstructible, Result, TypeMismatch};
use crate::key::Key;

use dashmap::DashMap;
use std::any::{self, Any};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static NEXT_CONTAINER_ID: AtomicUsize = AtomicUsize::new(1);

/// The dependency-resolution container.
///
/// It holds an instance cache and a provider registry, both keyed by [`Key`].
/// [`construct`](Container::construct) resolves a key from the cache, then from
/// its provider, then by building it from its declared dependencies; whatever
/// it produces is cached, so every key yields a single shared instance.
///
/// The container is thread-safe. Registration takes `&self` and returns
/// `&Self`, so calls chain.
pub struct Container {
  id: usize,
  label: Arc<str>,
  instances: DashMap<Key, Slot>,
  providers: DashMap<Key, ProviderFn>,
}

impl Default for Container {
  fn default() -> Self {
    ContainerBuilder::default().build()
  }
}

impl fmt::Debug for Container {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Container")
      .field("label", &self.label)
      .field("instances", &self.len())
      .field("providers", &self.providers.len())
      .finish()
  }
}

impl Container {
  /// Creates a new, empty `Container`.
  pub fn new() -> Self {
    Self::default()
  }

  pub fn builder() -> ContainerBuilder {
    ContainerBuilder::new()
  }

  pub(crate) fn from_builder(builder: ContainerBuilder) -> Self {
    let (instances, providers) = match builder.shards {
      Some(shards) => (
        DashMap::with_capacity_and_shard_amount(builder.capacity, shards),
        DashMap::with_capacity_and_shard_amount(builder.capacity, shards),
      ),
      None => (
        DashMap::with_capacity(builder.capacity),
        DashMap::with_capacity(builder.capacity),
      ),
    };
    Self {
      id: NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed),
      label: builder.label,
      instances,
      providers,
    }
  }

  pub fn label(&self) -> &str {
    &self.label
  }

  // --- Registration ---

  /// Stores `value` as the instance for `key`, replacing any cached one.
  pub fn register<T: Any + Send + Sync>(&self, key: impl Into<Key>, value: T) -> &Self {
    self.register_instance(key, Instance::new(value))
  }

  /// Stores an already type-erased instance for `key`.
  pub fn register_instance(&self, key: impl Into<Key>, instance: Instance) -> &Self {
    self.instances.insert(key.into(), filled_slot(instance));
    self
  }

  /// Registers a provider that builds the value for `key` in place of its
  /// default construction. It runs on the first `construct` of `key` and its
  /// result is cached.
  pub fn provide<T, F>(&self, key: impl Into<Key>, provider: F) -> &Self
  where
    T: Any + Send + Sync,
    F: Fn() -> T + Send + Sync + 'static,
  {
    self.provide_instance(key, move || Ok(Instance::new(provider())))
  }

  /// Like [`provide`](Container::provide), for providers that can fail.
  pub fn try_provide<T, E, F>(&self, key: impl Into<Key>, provider: F) -> &Self
  where
    T: Any + Send + Sync,
    E: Into<BoxError>,
    F: Fn() -> std::result::Result<T, E> + Send + Sync + 'static,
  {
    self.provide_instance(key, move || {
      provider().map(Instance::new).map_err(Into::into)
    })
  }

  /// Registers a provider that returns a type-erased instance.
  pub fn provide_instance<F>(&self, key: impl Into<Key>, provider: F) -> &Self
  where
    F: Fn() -> std::result::Result<Instance, BoxError> + Send + Sync + 'static,
  {
    self.providers.insert(key.into(), Arc::new(provider));
    self
  }

  // --- Resolution ---

  /// Resolves the value for `key`, constructing it and its dependencies on demand.
  pub fn construct(&self, key: impl Into<Key>) -> Result<Instance> {
    let key = key.into();

    if let Some(instance) = self.cached(&key) {
      tracing::trace!(container = %self.label, key = %key, "served from cache");
      return Ok(instance);
    }

    self.resolve(&key).map_err(|cause| {
      tracing::debug!(container = %self.label, key = %key, error = %cause, "construction failed");
      ConstructionError::new(&key, cause)
    })
  }

  /// Resolves the constructible type `T`.
  pub fn get<T: Constructible>(&self) -> Result<Arc<T>> {
    self.construct_as::<T>(Key::of::<T>())
  }

  /// Resolves `key` and hands the value back as a `T`.
  pub fn construct_as<T: Any + Send + Sync>(&self, key: impl Into<Key>) -> Result<Arc<T>> {
    let key = key.into();
    let instance = self.construct(&key)?;
    instance.downcast::<T>().ok_or_else(|| {
      ConstructionError::new(
        &key,
        TypeMismatch {
          expected: any::type_name::<T>(),
          found: instance.type_name(),
        },
      )
    })
  }

  // --- Introspection ---

  /// Whether an instance for `key` has been registered or constructed.
  pub fn is_cached(&self, key: impl Into<Key>) -> bool {
    self.cached(&key.into()).is_some()
  }

  pub fn has_provider(&self, key: impl Into<Key>) -> bool {
    self.providers.contains_key(&key.into())
  }

  /// The number of cached instances.
  pub fn len(&self) -> usize {
    self
      .instances
      .iter()
      .filter(|slot| slot.value().get().is_some())
      .count()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  // --- PRIVATE HELPERS ---

  fn cached(&self, key: &Key) -> Option<Instance> {
    self
      .instances
      .get(key)
      .and_then(|slot| slot.value().get().cloned())
  }

  fn resolve(&self, key: &Key) -> std::result::Result<Instance, BoxError> {
    let _guard = ResolutionGuard::enter(self.id, key)?;

    // Clone the slot out so no shard lock is held while user code runs.
    let slot = Arc::clone(self.instances.entry(key.clone()).or_default().value());
    match slot.get_or_try_init(|| self.produce(key)) {
      Ok(instance) => {
        // A waiter may have filled a slot that a failed attempt already dropped.
        self.instances.entry(key.clone()).or_insert_with(|| Arc::clone(&slot));
        Ok(instance.clone())
      }
      Err(cause) => {
        // Drop the empty placeholder, but never a slot registered in the meantime.
        self
          .instances
          .remove_if(key, |_, current| Arc::ptr_eq(current, &slot) && current.get().is_none());
        Err(cause)
      }
    }
  }

  fn produce(&self, key: &Key) -> std::result::Result<Instance, BoxError> {
    let provider = self.providers.get(key).map(|entry| Arc::clone(entry.value()));
    if let Some(provider) = provider {
      tracing::debug!(container = %self.label, key = %key, "invoking provider");
      return provider();
    }

    let blueprint = Blueprint::of(key).ok_or_else(|| NotConstructible {
      key: key.to_string(),
    })?;

    let dependencies = blueprint.dependencies();
    tracing::debug!(
      container = %self.label,
      key = %key,
      dependencies = dependencies.len(),
      "constructing"
    );

    let mut values = Vec::with_capacity(dependencies.len());
    for dependency in dependencies {
      values.push(self.construct(dependency)?);
    }
    blueprint.construct(Args::new(values))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::constructible::Recipe;
  use crate::key::Symbol;

  #[test]
  fn failed_keys_leave_no_entries() {
    let container = Container::new();

    for _ in 0..1000 {
      assert!(container.construct(Symbol::anonymous()).is_err());
    }
    let failing = Key::recipe(Recipe::new(|_| Err::<u8, BoxError>("unavailable".into())));
    for _ in 0..10 {
      assert!(container.construct(&failing).is_err());
    }

    assert_eq!(container.instances.len(), 0);
    assert!(container.is_empty());
  }

  #[test]
  fn failed_dependency_chain_leaves_no_entries() {
    let container = Container::new();
    let parent = Key::recipe(
      Recipe::new(|_| Ok::<_, BoxError>(1u8)).depends_on([Key::named("missing")]),
    );

    assert!(container.construct(&parent).is_err());

    assert_eq!(container.instances.len(), 0);
  }

  #[test]
  fn retry_after_failure_fills_a_fresh_entry() {
    let container = Container::new();
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    container.try_provide("flaky", move || match counter.fetch_add(1, Ordering::SeqCst) {
      0 => Err::<&str, BoxError>("not yet".into()),
      _ => Ok("ready"),
    });

    assert!(container.construct("flaky").is_err());
    assert_eq!(container.instances.len(), 0);

    let ready = container.construct_as::<&str>("flaky").unwrap();
    assert_eq!(*ready, "ready");
    assert_eq!(container.instances.len(), 1);
    assert!(container.is_cached("flaky"));
  }
}
