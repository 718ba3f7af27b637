use crate::container::Container;

use std::fmt;
use std::sync::Arc;

const MAX_SHARDS: usize = 1 << (usize::BITS - 1);

/// A builder for creating [`Container`] instances.
///
/// ```
/// use fibre_di::Container;
///
/// let container = Container::builder()
///   .label("http")
///   .capacity(64)
///   .shards(8)
///   .build();
///
/// assert_eq!(container.label(), "http");
/// ```
pub struct ContainerBuilder {
  pub(crate) label: Arc<str>,
  pub(crate) capacity: usize,
  pub(crate) shards: Option<usize>,
}

impl Default for ContainerBuilder {
  fn default() -> Self {
    Self {
      label: Arc::from("default"),
      capacity: 0,
      shards: None,
    }
  }
}

impl fmt::Debug for ContainerBuilder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ContainerBuilder")
      .field("label", &self.label)
      .field("capacity", &self.capacity)
      .field("shards", &self.shards)
      .finish()
  }
}

impl ContainerBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Sets the name the container reports in its tracing events.
  pub fn label(mut self, label: impl Into<Arc<str>>) -> Self {
    self.label = label.into();
    self
  }

  /// Sets the number of entries each map can hold before reallocating.
  pub fn capacity(mut self, capacity: usize) -> Self {
    self.capacity = capacity;
    self
  }

  /// Sets the number of shards of each map.
  pub fn shards(mut self, shards: usize) -> Self {
    // DashMap requires a power of two greater than one.
    self.shards = Some(
      shards
        .max(2)
        .checked_next_power_of_two()
        .unwrap_or(MAX_SHARDS),
    );
    self
  }

  pub fn build(self) -> Container {
    Container::from_builder(self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn shards_are_normalised() {
    assert_eq!(ContainerBuilder::new().shards(0).shards, Some(2));
    assert_eq!(ContainerBuilder::new().shards(5).shards, Some(8));
    assert_eq!(ContainerBuilder::new().shards(16).shards, Some(16));
    assert_eq!(ContainerBuilder::new().shards(usize::MAX).shards, Some(MAX_SHARDS));
    assert_eq!(
      ContainerBuilder::new().shards(MAX_SHARDS + 1).shards,
      Some(MAX_SHARDS)
    );
  }

  #[test]
  fn defaults() {
    let builder = ContainerBuilder::default();
    assert_eq!(&*builder.label, "default");
    assert_eq!(builder.capacity, 0);
    assert_eq!(builder.shards, None);
  }
}
