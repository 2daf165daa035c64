// kinemorph_core/src/estimation/filters/moving_average.rs

use crate::frames::LandmarkFrame;
use num_traits::Float;

/// Uniform moving average over edge-padded samples.
///
/// Output `i` averages input samples `i - window/2 ..= i - window/2 + window - 1`,
/// where indices outside the slice repeat the nearest end sample. The output
/// has the same length as the input. A window of 0 or 1 returns the input.
pub fn moving_average<T: Float>(samples: &[T], window: usize) -> Vec<T> {
    if window <= 1 || samples.is_empty() {
        return samples.to_vec();
    }
    let Some(width) = T::from(window) else {
        return samples.to_vec();
    };

    let last = samples.len() as isize - 1;
    let half = (window / 2) as isize;

    (0..samples.len() as isize)
        .map(|i| {
            let sum = (0..window as isize)
                .map(|k| samples[(i - half + k).clamp(0, last) as usize])
                .fold(T::zero(), |acc, v| acc + v);
            sum / width
        })
        .collect()
}

/// Smooths every channel and axis of a landmark stream independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovingAverageFilter {
    pub window: usize,
}

impl MovingAverageFilter {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    /// Returns the smoothed stream; frame count and per-frame lengths are kept.
    pub fn smooth_stream(&self, stream: &[LandmarkFrame]) -> Vec<LandmarkFrame> {
        let mut smoothed = stream.to_vec();
        if self.window <= 1 {
            return smoothed;
        }

        let channels = stream.iter().map(LandmarkFrame::len).max().unwrap_or(0);
        for channel in 0..channels {
            for axis in 0..3 {
                let series: Vec<f64> = stream.iter().map(|f| f.point(channel)[axis]).collect();
                let filtered = moving_average(&series, self.window);
                for (frame, value) in smoothed.iter_mut().zip(filtered) {
                    if let Some(point) = frame.points.get_mut(channel) {
                        point[axis] = value;
                    }
                }
            }
        }
        smoothed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vec3;
    use approx::assert_abs_diff_eq;

    #[test]
    fn odd_window_is_centred_with_edge_padding() {
        let out = moving_average(&[1.0, 2.0, 3.0, 4.0, 10.0], 3);
        let expected = [4.0 / 3.0, 2.0, 3.0, 17.0 / 3.0, 8.0];
        for (o, e) in out.iter().zip(expected) {
            assert_abs_diff_eq!(*o, e, epsilon = 1e-12);
        }
    }

    #[test]
    fn even_window_leans_backwards() {
        // window 4 at i covers i-2 ..= i+1
        let out = moving_average(&[0.0f32, 4.0, 8.0], 4);
        assert_abs_diff_eq!(out[0], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out[1], 3.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out[2], 5.0, epsilon = 1e-6);
    }

    #[test]
    fn preserves_length_and_constant_signals() {
        let samples = vec![2.5; 7];
        for window in [1, 2, 5, 9, 20] {
            let out = moving_average(&samples, window);
            assert_eq!(out.len(), samples.len());
            for v in out {
                assert_abs_diff_eq!(v, 2.5, epsilon = 1e-12);
            }
        }
        assert!(moving_average::<f64>(&[], 5).is_empty());
    }

    #[test]
    fn stream_smoothing_keeps_frame_shape() {
        let stream: Vec<LandmarkFrame> = (0..6)
            .map(|i| LandmarkFrame::new(vec![Vec3::new(i as f64, 0.0, 1.0), Vec3::zeros()]))
            .collect();
        let out = MovingAverageFilter::new(3).smooth_stream(&stream);
        assert_eq!(out.len(), stream.len());
        assert!(out.iter().all(|f| f.len() == 2));
        assert_abs_diff_eq!(out[2].point(0).x, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out[0].point(0).x, 1.0 / 3.0, epsilon = 1e-12);
        assert_eq!(out[3].point(1), Vec3::zeros());
    }
}
