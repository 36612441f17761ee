//! Fetch-and-render implementations.

pub mod http;
pub mod mock;
pub mod robots;

pub use http::{HttpRenderer, HttpRendererOptions};
pub use mock::MockRenderer;
pub use robots::RobotsTxt;
