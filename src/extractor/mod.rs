pub mod formats;
pub mod models;
pub mod resolver;
pub mod sources;
pub mod traits;
pub mod video_id;

pub use models::{Format, Origin, Resolution, VideoId, VideoMetadata};
pub use resolver::MetadataResolver;
pub use traits::MetadataSource;
pub use video_id::extract_video_id;
