use fibre_di::{keys, Args, BoxError, Constructible, Container, Instance, Key};
use tracing_subscriber::EnvFilter;

struct A;

impl Constructible for A {
  fn construct(_: Args) -> Result<Self, BoxError> {
    Ok(A)
  }
}

struct B {
  a: Instance,
}

impl Constructible for B {
  fn dependencies() -> Vec<Key> {
    keys![A]
  }

  fn construct(args: Args) -> Result<Self, BoxError> {
    Ok(B {
      a: args.instance(0)?.clone(),
    })
  }
}

struct C {
  a: Instance,
}

impl Constructible for C {
  fn dependencies() -> Vec<Key> {
    keys![A, B]
  }

  fn construct(args: Args) -> Result<Self, BoxError> {
    Ok(C {
      a: args.instance(0)?.clone(),
    })
  }
}

fn main() -> Result<(), BoxError> {
  // RUST_LOG=fibre_di=trace shows every cache hit and construction.
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
    .init();

  let container = Container::builder().label("overriding").build();

  // Replace how A is built before anything depends on it.
  container.provide(Key::of::<A>(), || "hello, world");

  let c = container.get::<C>()?;
  let b = container.get::<B>()?;

  println!("C's A slot: {:?}", c.a.downcast_ref::<&str>());
  assert_eq!(c.a.downcast_ref::<&str>(), Some(&"hello, world"));
  assert!(!c.a.is::<A>());
  assert!(Instance::ptr_eq(&c.a, &b.a));
  Ok(())
}
