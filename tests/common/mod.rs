mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from dlt_segment for tests
pub use dlt_segment::{Contour, ForegroundExtractor, OrientedBox, SegmentationConfig};
