//! The construction contract: how a key turns resolved dependencies into an instance.

use crate::core::Instance;
use crate::error::{ArgsError, BoxError};
use crate::key::{Key, KeyKind};

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// A type the container can build on its own.
///
/// `dependencies` lists, in order, the keys whose resolved values are handed to
/// `construct` as positional [`Args`]. Types without dependencies only need
/// `construct`.
///
/// ```
/// use fibre_di::{keys, Args, BoxError, Constructible, Container};
/// use std::sync::Arc;
///
/// struct Config {
///   url: String,
/// }
///
/// impl Constructible for Config {
///   fn construct(_: Args) -> Result<Self, BoxError> {
///     Ok(Config { url: "postgres://localhost/app".into() })
///   }
/// }
///
/// struct Database {
///   config: Arc<Config>,
/// }
///
/// impl Constructible for Database {
///   fn dependencies() -> Vec<fibre_di::Key> {
///     keys![Config]
///   }
///
///   fn construct(args: Args) -> Result<Self, BoxError> {
///     Ok(Database { config: args.get(0)? })
///   }
/// }
///
/// let container = Container::new();
/// let db = container.get::<Database>().unwrap();
/// assert_eq!(db.config.url, "postgres://localhost/app");
/// ```
pub trait Constructible: Sized + Send + Sync + 'static {
  fn dependencies() -> Vec<Key> {
    Vec::new()
  }

  fn construct(args: Args) -> Result<Self, BoxError>;
}

/// The construction operation of a type key, erased to plain function pointers.
#[derive(Clone, Copy)]
pub(crate) struct TypeRecipe {
  dependencies: fn() -> Vec<Key>,
  construct: fn(Args) -> Result<Instance, BoxError>,
}

impl TypeRecipe {
  pub(crate) fn of<T: Constructible>() -> Self {
    fn construct_erased<T: Constructible>(args: Args) -> Result<Instance, BoxError> {
      T::construct(args).map(Instance::new)
    }

    Self {
      dependencies: T::dependencies,
      construct: construct_erased::<T>,
    }
  }
}

type ConstructFn = Box<dyn Fn(Args) -> Result<Instance, BoxError> + Send + Sync>;

/// A constructible descriptor assembled at runtime.
///
/// Use it when the thing being built is not a dedicated type, or when several
/// differently configured instances of one type need their own keys. The key
/// made from a recipe is identified by that recipe, so build the key once and
/// clone it wherever the dependency is declared.
///
/// ```
/// use fibre_di::{BoxError, Container, Key, Recipe};
///
/// let port = Key::recipe(Recipe::new(|_| Ok::<_, BoxError>(8080u16)).named("Port"));
/// let address = Key::recipe(
///   Recipe::new(|args| {
///     let port = args.get::<u16>(0)?;
///     Ok::<_, BoxError>(format!("0.0.0.0:{port}"))
///   })
///   .depends_on([port.clone()]),
/// );
///
/// let container = Container::new();
/// let address = container.construct_as::<String>(&address).unwrap();
/// assert_eq!(*address, "0.0.0.0:8080");
/// ```
pub struct Recipe {
  name: Option<Cow<'static, str>>,
  dependencies: Vec<Key>,
  construct: ConstructFn,
}

impl Recipe {
  pub fn new<T, E, F>(construct: F) -> Self
  where
    T: Any + Send + Sync,
    E: Into<BoxError>,
    F: Fn(Args) -> Result<T, E> + Send + Sync + 'static,
  {
    Self {
      name: None,
      dependencies: Vec::new(),
      construct: Box::new(move |args| construct(args).map(Instance::new).map_err(Into::into)),
    }
  }

  /// Like [`Recipe::new`], for closures that already produce an [`Instance`].
  pub fn from_instance_fn<F>(construct: F) -> Self
  where
    F: Fn(Args) -> Result<Instance, BoxError> + Send + Sync + 'static,
  {
    Self {
      name: None,
      dependencies: Vec::new(),
      construct: Box::new(construct),
    }
  }

  /// Sets the display name used when this recipe appears in errors.
  pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
    self.name = Some(name.into());
    self
  }

  /// Appends dependency keys, resolved in the order given.
  pub fn depends_on<I, K>(mut self, dependencies: I) -> Self
  where
    I: IntoIterator<Item = K>,
    K: Into<Key>,
  {
    self.dependencies.extend(dependencies.into_iter().map(Into::into));
    self
  }

  pub fn name(&self) -> Option<&str> {
    self.name.as_deref()
  }

  pub fn dependencies(&self) -> &[Key] {
    &self.dependencies
  }
}

impl fmt::Debug for Recipe {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Recipe")
      .field("name", &self.name)
      .field("dependencies", &self.dependencies)
      .finish_non_exhaustive()
  }
}

/// Borrowed view of whatever construction operation a key carries.
pub(crate) enum Blueprint<'a> {
  Type(&'a TypeRecipe),
  Recipe(&'a Arc<Recipe>),
}

impl Blueprint<'_> {
  pub(crate) fn of(key: &Key) -> Option<Blueprint<'_>> {
    match &key.kind {
      KeyKind::Type {
        recipe: Some(recipe),
        ..
      } => Some(Blueprint::Type(recipe)),
      KeyKind::Recipe(recipe) => Some(Blueprint::Recipe(recipe)),
      _ => None,
    }
  }

  pub(crate) fn dependencies(&self) -> Vec<Key> {
    match self {
      Blueprint::Type(recipe) => (recipe.dependencies)(),
      Blueprint::Recipe(recipe) => recipe.dependencies.clone(),
    }
  }

  pub(crate) fn construct(&self, args: Args) -> Result<Instance, BoxError> {
    match self {
      Blueprint::Type(recipe) => (recipe.construct)(args),
      Blueprint::Recipe(recipe) => (recipe.construct)(args),
    }
  }
}

/// The resolved dependencies of a key, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct Args {
  values: Vec<Instance>,
}

impl Args {
  pub fn new(values: Vec<Instance>) -> Self {
    Self { values }
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// Returns the argument at `index` as a `T`.
  pub fn get<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>, ArgsError> {
    let instance = self.instance(index)?;
    instance.downcast::<T>().ok_or_else(|| ArgsError::Mismatch {
      index,
      expected: std::any::type_name::<T>(),
      found: instance.type_name(),
    })
  }

  /// Returns the argument at `index` as a trait object registered with
  /// [`Instance::from_trait`].
  pub fn get_trait<I: ?Sized + Send + Sync + 'static>(
    &self,
    index: usize,
  ) -> Result<Arc<I>, ArgsError> {
    let instance = self.instance(index)?;
    instance
      .downcast_trait::<I>()
      .ok_or_else(|| ArgsError::Mismatch {
        index,
        expected: std::any::type_name::<Arc<I>>(),
        found: instance.type_name(),
      })
  }

  pub fn instance(&self, index: usize) -> Result<&Instance, ArgsError> {
    self.values.get(index).ok_or(ArgsError::OutOfRange {
      index,
      len: self.values.len(),
    })
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Instance> {
    self.values.iter()
  }

  pub fn into_vec(self) -> Vec<Instance> {
    self.values
  }
}

impl<'a> IntoIterator for &'a Args {
  type Item = &'a Instance;
  type IntoIter = std::slice::Iter<'a, Instance>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}
