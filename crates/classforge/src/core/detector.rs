//! Core detector trait for input format identification

/// Core trait for diagram format detectors
///
/// Each input format provides a detector that recognises its markup from a
/// cheap scan of the raw text, before any real parsing happens.
///
/// # Example
/// ```
/// use classforge::core::Detector;
/// use classforge::plugins::drawio::DrawioDetector;
///
/// let detector = DrawioDetector::new();
/// assert!(detector.detect("<mxfile><diagram/></mxfile>"));
/// ```
pub trait Detector: Send + Sync {
    /// Detect if the input matches this format
    fn detect(&self, input: &str) -> bool;

    /// Get the confidence level of the detection (0.0 to 1.0)
    fn confidence(&self, input: &str) -> f64;

    /// Get the format name
    fn diagram_type(&self) -> &'static str;

    /// Get key patterns that this detector looks for
    fn patterns(&self) -> Vec<&'static str>;
}
