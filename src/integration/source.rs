//! Trait for capture/pre-processing stages feeding the tracker.

use crate::frame::Frame;

/// Anything that yields binary masks (and optionally depth) frame by frame.
///
/// # Example
///
/// ```ignore
/// use blobtrack_rs::{Frame, FrameSource};
///
/// struct Replay {
///     frames: std::vec::IntoIter<Frame>,
/// }
///
/// impl FrameSource for Replay {
///     type Error = std::convert::Infallible;
///
///     fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error> {
///         Ok(self.frames.next())
///     }
/// }
/// ```
pub trait FrameSource {
    /// Error type for acquisition failures.
    type Error;

    /// Return the next frame, or `None` once the stream has ended.
    fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error>;
}

impl FrameSource for std::vec::IntoIter<Frame> {
    type Error = std::convert::Infallible;

    fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error> {
        Ok(self.next())
    }
}
