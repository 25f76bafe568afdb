pub mod config;
pub mod router;
pub mod runtime;
pub mod tracing;

pub use config::load_config;
pub use router::{headless_router, HeadlessNavigator, RouteQueue};
pub use runtime::{create_runtime, prepare_data_root, AppRuntime};
