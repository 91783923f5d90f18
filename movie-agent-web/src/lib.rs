pub mod form;
pub mod page;
pub mod service;

pub use service::{AgentFactory, AppState, WebError, build_router};
