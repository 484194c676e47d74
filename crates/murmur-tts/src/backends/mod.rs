//! Built-in synthesis backends

pub mod mock;
pub mod noop;

pub use mock::{MockBackend, MockBackendConfig, MockBackendFactory};
pub use noop::{NoopBackend, NoopBackendFactory};
