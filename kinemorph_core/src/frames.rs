// kinemorph_core/src/frames.rs

use crate::error::{ClipError, ClipResult};
use crate::types::Vec3;
use serde::{Deserialize, Serialize};
use std::ops::Range;

pub mod layout;

/// One frame of landmark positions from the pose estimator.
///
/// Index `i` is the estimator's landmark id. A landmark whose position is
/// exactly the zero vector was not detected in this frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkFrame {
    pub points: Vec<Vec3>,
}

impl LandmarkFrame {
    pub fn new(points: Vec<Vec3>) -> Self {
        Self { points }
    }

    /// A frame in which nothing was detected.
    pub fn missing(len: usize) -> Self {
        Self {
            points: vec![Vec3::zeros(); len],
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The landmark at `index`, or the zero vector when the frame is too short.
    pub fn point(&self, index: usize) -> Vec3 {
        self.points.get(index).copied().unwrap_or_else(Vec3::zeros)
    }

    pub fn is_present(&self, index: usize) -> bool {
        self.points.get(index).is_some_and(|p| *p != Vec3::zeros())
    }

    /// `true` if at least one landmark in the frame was detected.
    pub fn any_present(&self) -> bool {
        self.points.iter().any(|p| *p != Vec3::zeros())
    }
}

/// A recorded clip: three parallel landmark streams at a shared frame rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkClip {
    /// Frames per second of the recording.
    pub fps: f64,
    pub body: Vec<LandmarkFrame>,
    pub left_hand: Vec<LandmarkFrame>,
    pub right_hand: Vec<LandmarkFrame>,
}

impl LandmarkClip {
    /// Checks the frame rate and that all three streams have the same length.
    pub fn validate(&self) -> ClipResult<()> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(ClipError::InvalidFrameRate(self.fps));
        }
        let (body, left, right) = (self.body.len(), self.left_hand.len(), self.right_hand.len());
        if body != left || body != right {
            return Err(ClipError::StreamLengthMismatch { body, left, right });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Seconds between two consecutive frames.
    pub fn frame_interval(&self) -> f64 {
        1.0 / self.fps
    }

    /// A copy of the frames in `range`, all three streams cut identically.
    pub fn slice(&self, range: Range<usize>) -> LandmarkClip {
        LandmarkClip {
            fps: self.fps,
            body: self.body[range.clone()].to_vec(),
            left_hand: self.left_hand[range.clone()].to_vec(),
            right_hand: self.right_hand[range].to_vec(),
        }
    }

    /// Mutable access to the three streams in body, left, right order.
    pub fn streams_mut(&mut self) -> [&mut Vec<LandmarkFrame>; 3] {
        [&mut self.body, &mut self.left_hand, &mut self.right_hand]
    }
}

/// The half-open span from the first to the last frame in which anything was
/// detected, or `None` if the stream never detects anything.
pub fn detected_span(stream: &[LandmarkFrame]) -> Option<Range<usize>> {
    let first = stream.iter().position(LandmarkFrame::any_present)?;
    let last = stream.iter().rposition(LandmarkFrame::any_present)?;
    Some(first..last + 1)
}
