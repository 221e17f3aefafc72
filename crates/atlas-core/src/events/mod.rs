//! Lifecycle events for federation loading and index builds.

pub mod dispatcher;
pub mod handler;
pub mod types;

pub use dispatcher::EventDispatcher;
pub use handler::AtlasEventHandler;
