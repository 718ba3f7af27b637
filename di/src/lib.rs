//! # Fibre DI
//!
//! A small, thread-safe dependency-resolution container for Rust.
//!
//! Components declare the keys they depend on; the container builds them
//! depth-first, hands the resolved values to each constructor in declaration
//! order, and caches every value it produces. Asking for the same key again,
//! directly or as somebody else's dependency, returns the same instance.
//!
//! ## Core Concepts
//!
//! - **Key**: the identity of an entry. A constructible type, a runtime
//!   [`Recipe`], a string name, a [`Symbol`], or the null key.
//! - **Constructible**: a type that knows its dependencies and how to build
//!   itself from them.
//! - **Container**: the instance cache plus the provider registry.
//!   [`Container::register`] stores a ready value and [`Container::provide`]
//!   overrides how a key is built.
//! - **ConstructionError**: every failure is wrapped once per level with the
//!   key that failed, so the error chain reads from the requested key down to
//!   the root cause.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_di::{keys, Args, BoxError, Constructible, Container, Instance, Key};
//! use std::sync::Arc;
//!
//! struct Settings;
//!
//! impl Constructible for Settings {
//!   fn construct(_: Args) -> Result<Self, BoxError> {
//!     Ok(Settings)
//!   }
//! }
//!
//! struct Service {
//!   settings: Instance,
//! }
//!
//! impl Constructible for Service {
//!   fn dependencies() -> Vec<Key> {
//!     keys![Settings]
//!   }
//!
//!   fn construct(args: Args) -> Result<Self, BoxError> {
//!     Ok(Service { settings: args.instance(0)?.clone() })
//!   }
//! }
//!
//! let container = Container::new();
//! let service = container.get::<Service>().unwrap();
//! let settings = container.get::<Settings>().unwrap();
//! assert!(Arc::ptr_eq(&service.settings.downcast::<Settings>().unwrap(), &settings));
//!
//! // Overrides win over default construction.
//! let container = Container::new();
//! container.provide(Key::of::<Settings>(), || "hello, world");
//! let service = container.get::<Service>().unwrap();
//! assert_eq!(service.settings.downcast_ref::<&str>(), Some(&"hello, world"));
//! ```

mod builder;
mod constructible;
mod container;
mod core;
mod error;
mod key;
mod macros;

pub use builder::ContainerBuilder;
pub use constructible::{Args, Constructible, Recipe};
pub use container::Container;
pub use crate::core::Instance;
pub use error::{
  ArgsError, BoxError, CircularDependency, ConstructionError, NotConstructible, Result,
  TypeMismatch,
};
pub use key::{Key, Symbol};
#[doc(hidden)]
pub use macros::__resolve_failed;
