//! Keypoint detection for video annotation
//!
//! Frames come in as RGBA buffers ([`FrameBuffer`]). The [`edges`] pipeline
//! turns a frame, or a rectangle of it, into dots and lines ready to be
//! merged into an annotation collection. [`EdgeDetector`] wraps the pipeline
//! with a validated configuration and can restrict the search to boxes from
//! an external region proposer.

pub mod bbox;
pub mod detection;
pub mod edges;
pub mod frame;

// Re-export commonly used types
pub use bbox::{BBox, BBoxCollection};
pub use detection::{DetectionConfig, DetectionResult, DetectionStats, EdgeDetector, EdgeOptions};
pub use edges::EdgeKeypoints;
pub use frame::{FrameBuffer, Region};

// Error handling
pub type Result<T> = anyhow::Result<T>;

/// Seams for plugging in other detectors
pub mod traits {
    use super::*;

    /// Produces candidate boxes worth searching for keypoints, for example
    /// from a person or object detector
    pub trait RegionProposer {
        fn propose(&self, frame: &FrameBuffer) -> Result<BBoxCollection>;
    }

    impl<F> RegionProposer for F
    where
        F: Fn(&FrameBuffer) -> Result<BBoxCollection>,
    {
        fn propose(&self, frame: &FrameBuffer) -> Result<BBoxCollection> {
            self(frame)
        }
    }

    /// Anything that can turn a frame into keypoints
    pub trait KeypointDetector {
        fn detect_keypoints(&self, frame: &FrameBuffer, region: Option<&Region>) -> DetectionResult;
    }
}
