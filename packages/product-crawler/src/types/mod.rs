//! Domain data types shared across the crawler.

pub mod likelihood;
pub mod record;

pub use likelihood::{ProductLikelihood, SourceType, EXTRACTION_THRESHOLD};
pub use record::{PageMeta, PriceInfo, ProductInfo, RecordId, RecordUpdate, UrlRecord};
