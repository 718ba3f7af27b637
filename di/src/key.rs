//! Keys: the opaque identities the container stores entries under.

use crate::constructible::{Constructible, Recipe, TypeRecipe};

use std::any::{self, Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

/// A unique identity with an optional description.
///
/// Every call to [`Symbol::new`] or [`Symbol::anonymous`] yields a symbol that
/// is equal only to itself and its clones, regardless of the description.
#[derive(Clone)]
pub struct Symbol {
  id: u64,
  description: Option<Arc<str>>,
}

impl Symbol {
  pub fn new(description: impl Into<Arc<str>>) -> Self {
    Self {
      id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
      description: Some(description.into()),
    }
  }

  pub fn anonymous() -> Self {
    Self {
      id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
      description: None,
    }
  }

  pub fn description(&self) -> Option<&str> {
    self.description.as_deref()
  }
}

impl PartialEq for Symbol {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for Symbol {}

impl Hash for Symbol {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.id.hash(state);
  }
}

impl fmt::Display for Symbol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Symbol({})", self.description().unwrap_or_default())
  }
}

impl fmt::Debug for Symbol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}#{}", self, self.id)
  }
}

#[derive(Clone)]
pub(crate) enum KeyKind {
  Null,
  Type {
    id: TypeId,
    name: &'static str,
    recipe: Option<TypeRecipe>,
  },
  Recipe(Arc<Recipe>),
  Name(Cow<'static, str>),
  Symbol(Symbol),
}

/// The identity under which the container caches instances and providers.
///
/// Two keys are equal when they address the same entry:
/// - type keys compare by `TypeId`, whether or not they carry a recipe,
/// - recipe keys compare by allocation, so clones of one key are equal while
///   two separately built recipes never are,
/// - name keys compare by string, symbol keys by symbol identity,
/// - all null keys are equal.
///
/// The `Display` form is the reference used in error messages.
#[derive(Clone)]
pub struct Key {
  pub(crate) kind: KeyKind,
}

impl Key {
  /// A key for a constructible type. Constructing it with nothing cached or
  /// provided for it runs `T::construct` with `T::dependencies()`.
  pub fn of<T: Constructible>() -> Self {
    Self {
      kind: KeyKind::Type {
        id: TypeId::of::<T>(),
        name: any::type_name::<T>(),
        recipe: Some(TypeRecipe::of::<T>()),
      },
    }
  }

  /// A key for any type, including trait objects. It has no construction
  /// operation of its own, so a value must be registered or provided.
  pub fn of_type<T: ?Sized + Any>() -> Self {
    Self {
      kind: KeyKind::Type {
        id: TypeId::of::<T>(),
        name: any::type_name::<T>(),
        recipe: None,
      },
    }
  }

  pub fn recipe(recipe: Recipe) -> Self {
    Self {
      kind: KeyKind::Recipe(Arc::new(recipe)),
    }
  }

  pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
    Self {
      kind: KeyKind::Name(name.into()),
    }
  }

  pub fn symbol(symbol: Symbol) -> Self {
    Self {
      kind: KeyKind::Symbol(symbol),
    }
  }

  pub fn null() -> Self {
    Self {
      kind: KeyKind::Null,
    }
  }

  pub fn is_null(&self) -> bool {
    matches!(self.kind, KeyKind::Null)
  }

  fn discriminant(&self) -> u8 {
    match self.kind {
      KeyKind::Null => 0,
      KeyKind::Type { .. } => 1,
      KeyKind::Recipe(_) => 2,
      KeyKind::Name(_) => 3,
      KeyKind::Symbol(_) => 4,
    }
  }
}

impl PartialEq for Key {
  fn eq(&self, other: &Self) -> bool {
    match (&self.kind, &other.kind) {
      (KeyKind::Null, KeyKind::Null) => true,
      (KeyKind::Type { id: a, .. }, KeyKind::Type { id: b, .. }) => a == b,
      (KeyKind::Recipe(a), KeyKind::Recipe(b)) => Arc::ptr_eq(a, b),
      (KeyKind::Name(a), KeyKind::Name(b)) => a == b,
      (KeyKind::Symbol(a), KeyKind::Symbol(b)) => a == b,
      _ => false,
    }
  }
}

impl Eq for Key {}

impl Hash for Key {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.discriminant().hash(state);
    match &self.kind {
      KeyKind::Null => {}
      KeyKind::Type { id, .. } => id.hash(state),
      KeyKind::Recipe(recipe) => (Arc::as_ptr(recipe) as *const () as usize).hash(state),
      KeyKind::Name(name) => name.hash(state),
      KeyKind::Symbol(symbol) => symbol.hash(state),
    }
  }
}

impl fmt::Display for Key {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.kind {
      KeyKind::Null => f.write_str("null"),
      KeyKind::Type { name, .. } => f.write_str(&short_type_name(name)),
      KeyKind::Recipe(recipe) => match recipe.name() {
        Some(name) => f.write_str(name),
        None => f.write_str("[object Recipe]"),
      },
      KeyKind::Name(name) => f.write_str(name),
      KeyKind::Symbol(symbol) => fmt::Display::fmt(symbol, f),
    }
  }
}

impl fmt::Debug for Key {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.kind {
      KeyKind::Null => f.write_str("Key(null)"),
      KeyKind::Type { id, name, .. } => write!(f, "Key(TypeId({:?}), Type({}))", id, name),
      KeyKind::Recipe(recipe) => write!(f, "Key(Recipe({:p}), {})", Arc::as_ptr(recipe), self),
      KeyKind::Name(name) => write!(f, "Key(Name({}))", name),
      KeyKind::Symbol(symbol) => write!(f, "Key({:?})", symbol),
    }
  }
}

impl From<&'static str> for Key {
  fn from(name: &'static str) -> Self {
    Key::named(name)
  }
}

impl From<String> for Key {
  fn from(name: String) -> Self {
    Key::named(name)
  }
}

impl From<Symbol> for Key {
  fn from(symbol: Symbol) -> Self {
    Key::symbol(symbol)
  }
}

impl From<Recipe> for Key {
  fn from(recipe: Recipe) -> Self {
    Key::recipe(recipe)
  }
}

impl From<&Key> for Key {
  fn from(key: &Key) -> Self {
    key.clone()
  }
}

impl<K: Into<Key>> From<Option<K>> for Key {
  fn from(key: Option<K>) -> Self {
    key.map_or_else(Key::null, Into::into)
  }
}

/// Strips module paths from every segment of a type name, so
/// `alloc::vec::Vec<my_app::Config>` becomes `Vec<Config>`.
pub(crate) fn short_type_name(full: &str) -> String {
  fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
  }

  let mut out = String::with_capacity(full.len());
  let mut start = None;
  for (index, c) in full.char_indices() {
    if c.is_alphanumeric() || c == '_' || c == ':' {
      start.get_or_insert(index);
      continue;
    }
    if let Some(from) = start.take() {
      out.push_str(last_segment(&full[from..index]));
    }
    out.push(c);
  }
  if let Some(from) = start {
    out.push_str(last_segment(&full[from..]));
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::hash_map::DefaultHasher;

  fn hash_of(key: &Key) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
  }

  #[test]
  fn short_type_name_strips_nested_paths() {
    assert_eq!(short_type_name("my_app::db::Pool"), "Pool");
    assert_eq!(
      short_type_name("alloc::vec::Vec<my_app::Config>"),
      "Vec<Config>"
    );
    assert_eq!(
      short_type_name("std::collections::HashMap<u8, (a::B, c::D)>"),
      "HashMap<u8, (B, D)>"
    );
    assert_eq!(short_type_name("&str"), "&str");
  }

  #[test]
  fn symbols_compare_by_identity() {
    let a = Symbol::new("token");
    let b = Symbol::new("token");
    assert_ne!(a, b);
    assert_eq!(a, a.clone());
    assert_eq!(a.to_string(), "Symbol(token)");
    assert_eq!(Symbol::anonymous().to_string(), "Symbol()");
  }

  #[test]
  fn typed_keys_compare_by_type_only() {
    struct Marker;
    impl Constructible for Marker {
      fn construct(_: crate::Args) -> Result<Self, crate::BoxError> {
        Ok(Marker)
      }
    }

    let with_recipe = Key::of::<Marker>();
    let bare = Key::of_type::<Marker>();
    assert_eq!(with_recipe, bare);
    assert_eq!(hash_of(&with_recipe), hash_of(&bare));
    assert_ne!(with_recipe, Key::of_type::<String>());
    assert_eq!(with_recipe.to_string(), "Marker");
  }

  #[test]
  fn recipe_keys_compare_by_allocation() {
    let a = Key::recipe(Recipe::new(|_| Ok::<_, crate::BoxError>(1u8)));
    let b = Key::recipe(Recipe::new(|_| Ok::<_, crate::BoxError>(1u8)));
    assert_eq!(a, a.clone());
    assert_eq!(hash_of(&a), hash_of(&a.clone()));
    assert_ne!(a, b);
  }

  #[test]
  fn option_and_strings_convert() {
    assert!(Key::from(None::<&'static str>).is_null());
    assert_eq!(Key::from(Some("db")), Key::named("db"));
    assert_eq!(Key::from(String::from("db")), Key::from("db"));
    assert_ne!(Key::named("null"), Key::null());
  }
}
