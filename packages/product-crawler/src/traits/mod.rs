// Trait definitions for the external collaborators.
//
// These are INFRASTRUCTURE seams only. Crawl logic lives in `crawl` and
// `supervisor` and reaches collaborators through these traits.

pub mod renderer;
pub mod router;
pub mod store;

pub use renderer::{PageRenderer, RenderedPage};
pub use router::MessageRouter;
pub use store::UrlStore;
