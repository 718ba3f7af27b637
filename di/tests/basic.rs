use fibre_di::{keys, Args, BoxError, Constructible, Container, Instance, Key, Recipe};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// --- Test Fixtures ---

// `A` has no dependencies.
struct A;

impl Constructible for A {
  fn construct(_: Args) -> Result<Self, BoxError> {
    Ok(A)
  }
}

// `B` depends on `A` and carries two settings with defaults.
struct B {
  a: Instance,
  first: bool,
  second: bool,
}

impl Constructible for B {
  fn dependencies() -> Vec<Key> {
    keys![A]
  }

  fn construct(args: Args) -> Result<Self, BoxError> {
    Ok(B::with_settings(args.instance(0)?.clone(), true, false))
  }
}

impl B {
  fn with_settings(a: Instance, first: bool, second: bool) -> Self {
    B { a, first, second }
  }
}

// `C` depends on `A` and `B`, in that order.
struct C {
  a: Instance,
  b: Arc<B>,
}

impl Constructible for C {
  fn dependencies() -> Vec<Key> {
    keys![A, B]
  }

  fn construct(args: Args) -> Result<Self, BoxError> {
    Ok(C {
      a: args.instance(0)?.clone(),
      b: args.get::<B>(1)?,
    })
  }
}

fn counting_recipe(counter: &Arc<AtomicUsize>, value: u32) -> Recipe {
  let counter = Arc::clone(counter);
  Recipe::new(move |_| {
    counter.fetch_add(1, Ordering::SeqCst);
    Ok::<_, BoxError>(value)
  })
}

// --- Basic Tests ---

#[test]
fn test_construct_without_dependencies_returns_singleton() {
  // Arrange
  let container = Container::new();
  let calls = Arc::new(AtomicUsize::new(0));
  let key = Key::recipe(counting_recipe(&calls, 7));

  // Act
  let first = container.construct(&key).unwrap();
  let second = container.construct(&key).unwrap();

  // Assert
  assert_eq!(first.downcast_ref::<u32>(), Some(&7));
  assert!(Instance::ptr_eq(&first, &second));
  assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_dependencies_are_injected_in_declared_order() {
  // Arrange
  let container = Container::new();
  let order = Arc::new(Mutex::new(Vec::new()));

  let make_leaf = |name: &'static str| {
    let order = Arc::clone(&order);
    Key::recipe(
      Recipe::new(move |_| {
        order.lock().unwrap().push(name);
        Ok::<_, BoxError>(name)
      })
      .named(name),
    )
  };
  let first = make_leaf("first");
  let second = make_leaf("second");
  let third = make_leaf("third");

  let parent = Key::recipe(
    Recipe::new(|args: Args| {
      let names: Vec<&'static str> = args
        .iter()
        .map(|arg| *arg.downcast_ref::<&'static str>().unwrap())
        .collect();
      Ok::<_, BoxError>(names)
    })
    .depends_on([third.clone(), first.clone(), second.clone()]),
  );

  // Act
  let names = container.construct_as::<Vec<&'static str>>(&parent).unwrap();

  // Assert
  assert_eq!(*names, vec!["third", "first", "second"]);
  assert_eq!(*order.lock().unwrap(), vec!["third", "first", "second"]);
}

#[test]
fn test_register_short_circuits_construction() {
  // Arrange
  let container = Container::new();
  let calls = Arc::new(AtomicUsize::new(0));
  let key = Key::recipe(counting_recipe(&calls, 1));

  // Act
  container.register(&key, 99u32);
  let value = container.construct_as::<u32>(&key).unwrap();

  // Assert
  assert_eq!(*value, 99);
  assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_shared_dependency_is_built_once_and_reused() {
  // Arrange
  let container = Container::new();

  // Act
  let c = container.get::<C>().unwrap();
  let a = container.construct(Key::of::<A>()).unwrap();

  // Assert
  assert!(c.b.first);
  assert!(!c.b.second);
  assert!(Instance::ptr_eq(&c.a, &c.b.a));
  assert!(Instance::ptr_eq(&a, &c.a));
  assert!(Arc::ptr_eq(&c.b, &container.get::<B>().unwrap()));
  assert_eq!(container.len(), 3);
}

#[test]
fn test_typed_get_matches_untyped_construct() {
  // Arrange
  let container = Container::new();

  // Act
  let typed = container.get::<A>().unwrap();
  let untyped = container.construct(Key::of::<A>()).unwrap();

  // Assert
  assert!(Arc::ptr_eq(&typed, &untyped.downcast::<A>().unwrap()));
}

#[test]
fn test_type_keys_share_an_entry_with_or_without_recipe() {
  // Arrange
  let container = Container::new();
  container.register(Key::of_type::<A>(), A);

  // Act
  let registered = container.construct(Key::of_type::<A>()).unwrap();
  let via_recipe = container.construct(Key::of::<A>()).unwrap();

  // Assert
  assert!(Instance::ptr_eq(&registered, &via_recipe));
}

#[test]
fn test_registration_chains() {
  // Arrange
  let container = Container::new();

  // Act
  container
    .register("host", String::from("localhost"))
    .register("port", 5432u16)
    .provide("url", || String::from("postgres://localhost:5432"));

  // Assert
  assert_eq!(*container.construct_as::<String>("host").unwrap(), "localhost");
  assert_eq!(*container.construct_as::<u16>("port").unwrap(), 5432);
  assert_eq!(
    *container.construct_as::<String>("url").unwrap(),
    "postgres://localhost:5432"
  );
}

#[test]
fn test_introspection_tracks_cache_and_providers() {
  // Arrange
  let container = Container::new();
  assert!(container.is_empty());

  // Act
  container.provide("lazy", || 1u8);

  // Assert: providing does not touch the cache.
  assert!(container.has_provider("lazy"));
  assert!(!container.is_cached("lazy"));
  assert_eq!(container.len(), 0);

  container.construct("lazy").unwrap();
  assert!(container.is_cached("lazy"));
  assert!(container.has_provider("lazy"));
  assert_eq!(container.len(), 1);
}

#[test]
fn test_symbol_and_null_keys_hold_values() {
  // Arrange
  let container = Container::new();
  let token = fibre_di::Symbol::new("token");

  // Act
  container.register(token.clone(), "secret");
  container.register(Key::null(), 0i64);

  // Assert
  assert_eq!(*container.construct_as::<&str>(token).unwrap(), "secret");
  assert_eq!(*container.construct_as::<i64>(None::<&'static str>).unwrap(), 0);
  assert!(container
    .construct(fibre_di::Symbol::new("token"))
    .is_err());
}
