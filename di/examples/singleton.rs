use fibre_di::{keys, Args, BoxError, Constructible, Container, Instance, Key};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// Counts how many times each component is built.
static BUILDS: AtomicUsize = AtomicUsize::new(0);

struct A;

impl Constructible for A {
  fn construct(_: Args) -> Result<Self, BoxError> {
    println!("Building A...");
    BUILDS.fetch_add(1, Ordering::SeqCst);
    Ok(A)
  }
}

// B takes A plus two settings that keep their defaults.
struct B {
  a: Instance,
  verbose: bool,
  strict: bool,
}

impl Constructible for B {
  fn dependencies() -> Vec<Key> {
    keys![A]
  }

  fn construct(args: Args) -> Result<Self, BoxError> {
    println!("Building B...");
    BUILDS.fetch_add(1, Ordering::SeqCst);
    Ok(B {
      a: args.instance(0)?.clone(),
      verbose: true,
      strict: false,
    })
  }
}

struct C {
  a: Instance,
  b: Arc<B>,
}

impl Constructible for C {
  fn dependencies() -> Vec<Key> {
    keys![A, B]
  }

  fn construct(args: Args) -> Result<Self, BoxError> {
    println!("Building C...");
    BUILDS.fetch_add(1, Ordering::SeqCst);
    Ok(C {
      a: args.instance(0)?.clone(),
      b: args.get(1)?,
    })
  }
}

fn main() -> Result<(), BoxError> {
  let container = Container::new();

  println!("--- Constructing C ---");
  let c = container.get::<C>()?;
  println!("B settings: verbose={}, strict={}", c.b.verbose, c.b.strict);

  println!("\n--- Constructing A again ---");
  let a = container.construct(Key::of::<A>())?;

  assert_eq!(BUILDS.load(Ordering::SeqCst), 3);
  assert!(Instance::ptr_eq(&a, &c.a));
  assert!(Instance::ptr_eq(&a, &c.b.a));
  println!("A, B and C were each built once; every A is the same instance.");
  Ok(())
}
