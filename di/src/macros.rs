//! Public macros for declaring and resolving dependencies.

/// Builds the dependency list of a [`Constructible`](crate::Constructible)
/// from constructible types, in order.
///
/// ```
/// use fibre_di::{keys, Key};
/// # use fibre_di::{Args, BoxError, Constructible};
/// # struct Clock;
/// # impl Constructible for Clock {
/// #   fn construct(_: Args) -> Result<Self, BoxError> { Ok(Clock) }
/// # }
/// # struct Logger;
/// # impl Constructible for Logger {
/// #   fn construct(_: Args) -> Result<Self, BoxError> { Ok(Logger) }
/// # }
///
/// assert_eq!(keys![Clock, Logger], vec![Key::of::<Clock>(), Key::of::<Logger>()]);
/// ```
#[macro_export]
macro_rules! keys {
  () => {
    ::std::vec::Vec::<$crate::Key>::new()
  };
  ($($type:ty),+ $(,)?) => {
    ::std::vec![$($crate::Key::of::<$type>()),+]
  };
}

/// Resolves a value from a container, panicking if it cannot be constructed.
///
/// The panic message carries the whole chain of failing keys and the root
/// cause. For a non-panicking version, use `Container::get` or
/// `Container::construct_as` directly.
///
/// # Examples
///
/// ```
/// use fibre_di::{resolve, Args, BoxError, Constructible, Container};
///
/// struct Greeting(String);
///
/// impl Constructible for Greeting {
///   fn construct(_: Args) -> Result<Self, BoxError> {
///     Ok(Greeting("hello".into()))
///   }
/// }
///
/// let container = Container::new();
/// container.register("port", 8080u16);
///
/// // A constructible type.
/// assert_eq!(resolve!(container, Greeting).0, "hello");
///
/// // A value of a given type under any key.
/// assert_eq!(*resolve!(container, u16, "port"), 8080);
/// ```
#[macro_export]
macro_rules! resolve {
  // Arm for resolving a constructible type: resolve!(container, MyService)
  ($container:expr, $type:ty) => {
    $container
      .get::<$type>()
      .unwrap_or_else(|err| $crate::__resolve_failed(&err))
  };

  // Arm for resolving a value under a key: resolve!(container, MyService, key)
  ($container:expr, $type:ty, $key:expr) => {
    $container
      .construct_as::<$type>($key)
      .unwrap_or_else(|err| $crate::__resolve_failed(&err))
  };
}

#[doc(hidden)]
#[track_caller]
pub fn __resolve_failed(err: &crate::ConstructionError) -> ! {
  panic!(
    "Failed to resolve required service: {} (via {}): {}",
    err,
    err.key_path().join(" -> "),
    err.root_cause()
  )
}
