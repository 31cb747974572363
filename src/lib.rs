pub mod config;
pub mod geometry;
pub mod models;
pub mod pipeline;
pub mod segmentation;

pub use config::SegmentationConfig;
pub use geometry::{OrientedBox, oriented_bounding_box};
pub use models::{BoundingBox, Contour};
pub use pipeline::{DebugConfig, Frame, MetadataValue, Pipeline, PipelineContext, PipelineStep};
pub use segmentation::{ForegroundExtractor, FusionParams, segment_candidates};
