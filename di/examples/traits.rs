use fibre_di::{Args, BoxError, Container, Instance, Key, Recipe};
use std::sync::Arc;

// 1. Define the abstraction (the trait)
trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

// 2. Define a concrete implementation
struct ConsoleLogger;
impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[CONSOLE LOG]: {}", message);
  }
}

// 3. Define a service that depends on the abstraction
struct ReportService {
  logger: Arc<dyn Logger>,
}

impl ReportService {
  fn generate_report(&self) {
    self.logger.log("Starting report generation.");
    self.logger.log("Finished report generation.");
  }
}

fn main() -> Result<(), BoxError> {
  let container = Container::new();

  // --- Registration ---
  // The trait object is stored under the key of `dyn Logger`.
  container.register_instance(
    Key::of_type::<dyn Logger>(),
    Instance::from_trait::<dyn Logger>(Arc::new(ConsoleLogger)),
  );

  // The report service declares the logger as its only dependency.
  let report = Key::recipe(
    Recipe::new(|args: Args| {
      Ok::<_, BoxError>(ReportService {
        logger: args.get_trait::<dyn Logger>(0)?,
      })
    })
    .named("ReportService")
    .depends_on([Key::of_type::<dyn Logger>()]),
  );

  // --- Resolution and Usage ---
  println!("Resolving the high-level service...");
  let report_service = container.construct_as::<ReportService>(&report)?;

  println!("Using the service...");
  report_service.generate_report();
  Ok(())
}
