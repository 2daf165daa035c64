// kinemorph_core/src/estimation/conditioner.rs

use crate::error::{ClipError, ClipResult};
use crate::estimation::filters::kalman::LandmarkKalmanFilter;
use crate::estimation::filters::moving_average::MovingAverageFilter;
use crate::frames::layout::{
    HAND_LANDMARK_COUNT, POSE_LEFT_HIP, POSE_LEFT_SHOULDER, POSE_LEFT_WRIST, POSE_RIGHT_HIP,
    POSE_RIGHT_SHOULDER, POSE_RIGHT_WRIST,
};
use crate::frames::{detected_span, LandmarkClip, LandmarkFrame};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::{debug, info, warn};

/// Settings for [`LandmarkConditioner`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConditionerConfig {
    /// Moving-average window in frames. 1 disables the smoothing pass.
    pub window: usize,
    /// Diagonal of the Kalman process noise `Q`.
    pub process_noise: f64,
    /// Diagonal of the Kalman measurement noise `R`.
    pub measurement_noise: f64,
    /// Fraction of the torso height, from the hips, a wrist must reach for
    /// the frame to count as active.
    pub activity_fraction: f64,
    /// Drop idle frames at both ends of the clip before filtering.
    pub trim_idle: bool,
    /// Run the Kalman stage on the hand streams.
    pub filter_hands: bool,
}

impl Default for ConditionerConfig {
    fn default() -> Self {
        Self {
            window: 1,
            process_noise: 0.001,
            measurement_noise: 0.0015,
            activity_fraction: 0.2,
            trim_idle: true,
            filter_hands: true,
        }
    }
}

impl ConditionerConfig {
    pub fn validate(&self) -> ClipResult<()> {
        if self.window == 0 {
            return Err(ClipError::invalid_config("window must be at least 1"));
        }
        for (name, value) in [
            ("process_noise", self.process_noise),
            ("measurement_noise", self.measurement_noise),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ClipError::invalid_config(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.activity_fraction) {
            return Err(ClipError::invalid_config(format!(
                "activity_fraction must lie in [0, 1], got {}",
                self.activity_fraction
            )));
        }
        Ok(())
    }
}

/// Turns a raw recorded clip into one ready for the rotation solver.
#[derive(Debug, Clone)]
pub struct LandmarkConditioner {
    config: ConditionerConfig,
}

impl LandmarkConditioner {
    pub fn new(config: ConditionerConfig) -> ClipResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ConditionerConfig {
        &self.config
    }

    /// Runs every conditioning stage over `clip`.
    ///
    /// 1. Trims idle frames from both ends (see [`trim_to_activity`]).
    /// 2. Kalman-filters the first 21 channels of each hand stream inside
    ///    that hand's detected span.
    /// 3. Crops to the union of both hands' detected spans. A clip in which
    ///    no hand is ever detected is kept whole.
    /// 4. Applies the moving average to every stream.
    pub fn condition(&self, clip: &LandmarkClip) -> ClipResult<LandmarkClip> {
        clip.validate()?;
        let frames_in = clip.len();

        let mut clip = if self.config.trim_idle {
            trim_to_activity(clip, self.config.activity_fraction)
        } else {
            clip.clone()
        };

        let left_span = detected_span(&clip.left_hand);
        let right_span = detected_span(&clip.right_hand);

        if self.config.filter_hands {
            let dt = clip.frame_interval();
            for (stream, span) in [
                (&mut clip.left_hand, &left_span),
                (&mut clip.right_hand, &right_span),
            ] {
                if let Some(span) = span {
                    self.filter_hand_stream(stream, span.clone(), dt);
                }
            }
        }

        let mut clip = match span_union(left_span, right_span) {
            Some(span) => clip.slice(span),
            None => {
                warn!("no hand detected anywhere in the clip, keeping every frame");
                clip
            }
        };

        let smoother = MovingAverageFilter::new(self.config.window);
        for stream in clip.streams_mut() {
            *stream = smoother.smooth_stream(stream);
        }

        info!(
            frames_in,
            frames_out = clip.len(),
            window = self.config.window,
            "conditioned clip"
        );
        Ok(clip)
    }

    /// Tracks each landmark channel from its first two detections in `span`.
    /// Channels detected fewer than twice are left as recorded.
    fn filter_hand_stream(&self, stream: &mut [LandmarkFrame], span: Range<usize>, dt: f64) {
        for channel in 0..HAND_LANDMARK_COUNT {
            let mut detections = span.clone().filter(|&i| stream[i].is_present(channel));
            let (Some(first), Some(second)) = (detections.next(), detections.next()) else {
                debug!(channel, "too few detections to track");
                continue;
            };

            let mut filter = LandmarkKalmanFilter::from_detections(
                &stream[first].point(channel),
                &stream[second].point(channel),
                (second - first) as f64 * dt,
                dt,
                self.config.process_noise,
                self.config.measurement_noise,
            );

            for frame in &mut stream[second + 1..span.end] {
                let measurement = frame.is_present(channel).then(|| frame.point(channel));
                let position = filter.step(measurement.as_ref());
                if let Some(point) = frame.points.get_mut(channel) {
                    *point = position;
                }
            }
        }
    }
}

/// Whether either wrist is raised past `fraction` of the torso height.
///
/// Works on image `x`/`y` only. Each wrist is projected onto the hip→shoulder
/// direction and compared with the point `fraction` of the way from the hip
/// to the shoulder on the same side. A torso of zero height is never active.
pub fn hand_raised(body: &LandmarkFrame, fraction: f64) -> bool {
    let xy = |id: usize| body.point(id).xy();
    let shoulders = (xy(POSE_LEFT_SHOULDER) + xy(POSE_RIGHT_SHOULDER)) / 2.0;
    let hips = (xy(POSE_LEFT_HIP) + xy(POSE_RIGHT_HIP)) / 2.0;

    let spine: Vector2<f64> = shoulders - hips;
    let length = spine.norm();
    if !(length.is_finite() && length > 0.0) {
        return false;
    }
    let dir = spine / length;

    let raised = |wrist: usize, shoulder: usize, hip: usize| {
        let threshold = xy(shoulder) * fraction + xy(hip) * (1.0 - fraction);
        xy(wrist).dot(&dir) >= threshold.dot(&dir)
    };

    raised(POSE_LEFT_WRIST, POSE_LEFT_SHOULDER, POSE_LEFT_HIP)
        || raised(POSE_RIGHT_WRIST, POSE_RIGHT_SHOULDER, POSE_RIGHT_HIP)
}

/// Drops the frames before the first and after the last active body frame.
/// If no frame is active the result is empty.
pub fn trim_to_activity(clip: &LandmarkClip, fraction: f64) -> LandmarkClip {
    let len = clip.len();
    let mut first = 0;
    while first < len && !hand_raised(&clip.body[first], fraction) {
        first += 1;
    }
    let mut end = len;
    while end > first && !hand_raised(&clip.body[end - 1], fraction) {
        end -= 1;
    }
    debug!(first, end, total = len, "trimmed idle frames");
    clip.slice(first..end)
}

fn span_union(a: Option<Range<usize>>, b: Option<Range<usize>>) -> Option<Range<usize>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.start.min(b.start)..a.end.max(b.end)),
        (a, b) => a.or(b),
    }
}
