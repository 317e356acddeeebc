pub mod pipeline;
pub mod resize;
pub mod worker;

pub use pipeline::ThumbnailPipeline;
pub use resize::{Thumbnail, ThumbnailError, ThumbnailSpec, make_thumbnail};
pub use worker::ThumbnailWorker;
