use fibre_di::{keys, resolve, Args, BoxError, Constructible, Container, Key};
use std::panic;

// Needs a setting nobody registered.
struct Mailer;

impl Constructible for Mailer {
  fn dependencies() -> Vec<Key> {
    vec![Key::named("smtp_host")]
  }

  fn construct(_: Args) -> Result<Self, BoxError> {
    Ok(Mailer)
  }
}

struct Signup;

impl Constructible for Signup {
  fn dependencies() -> Vec<Key> {
    keys![Mailer]
  }

  fn construct(_: Args) -> Result<Self, BoxError> {
    Ok(Signup)
  }
}

fn main() {
  let container = Container::new();

  // --- Using the fallible `get()` method ---
  println!("Attempting to construct a service whose dependency is missing...");
  let err = match container.get::<Signup>() {
    Ok(_) => panic!("Should not have constructed Signup!"),
    Err(err) => err,
  };

  println!("Error: {}", err);
  println!("Failing keys: {}", err.key_path().join(" -> "));
  println!("Root cause: {}", err.root_cause());
  assert_eq!(err.key_path(), vec!["Signup", "Mailer", "smtp_host"]);

  // --- Registering the missing piece fixes it ---
  container.register("smtp_host", String::from("mail.example.com"));
  assert!(container.get::<Signup>().is_ok());
  println!("\nConstructed Signup after registering smtp_host.");

  // --- Using the panicking `resolve!` macro ---
  let empty = Container::new();
  let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
    // This line will panic!
    let _signup = resolve!(empty, Signup);
  }));
  assert!(result.is_err(), "resolve! should have panicked.");
  println!("Successfully caught the expected panic from resolve!.");
}
