use crate::Error;
use crate::waveform::Waveform;

/// A piecewise-linear waveform through a set of samples.
///
/// Queries before the first sample or after the last one return the nearest
/// sample's value. Rates use the four-point stencil.
#[derive(Clone, Debug)]
pub struct SampledWaveform {
    times: Vec<f64>,
    values: Vec<f64>,
}

impl SampledWaveform {
    /// Creates a new `SampledWaveform`.
    ///
    /// Fails if there are no samples, if the arrays differ in length, or if the
    /// times are not finite and strictly increasing.
    pub fn new(times: Vec<f64>, values: Vec<f64>) -> Result<Self, Error> {
        if times.len() != values.len() {
            return Err(Error::LengthMismatch {
                times: times.len(),
                values: values.len(),
            })
        }
        if times.is_empty() {
            return Err(Error::EmptyChannel)
        }
        if let Some(index) = times.iter().position(|t| !t.is_finite()) {
            return Err(Error::NonFiniteSampleTime { index, time: times[index] })
        }
        if let Some(index) = times.windows(2).position(|w| w[1] <= w[0]) {
            return Err(Error::NonMonotonicSamples {
                index: index + 1,
                previous: times[index],
                time: times[index + 1],
            })
        }

        Ok(Self { times, values })
    }

    #[inline]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl Waveform for SampledWaveform {
    #[inline]
    fn value_at(&self, t: f64) -> f64 {
        let n = self.times.len();
        if n == 1 || t <= self.times[0] {
            return self.values[0];
        }
        if t >= self.times[n - 1] {
            return self.values[n - 1];
        }

        // t_i <= t < t_{i+1}, so a knot resolves to its own sample
        let mut i = 0;
        while t >= self.times[i + 1] {
            i += 1;
        }

        let w = (t - self.times[i]) / (self.times[i + 1] - self.times[i]);
        self.values[i] + w * (self.values[i + 1] - self.values[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pulse() -> SampledWaveform {
        SampledWaveform::new(
            vec![0.0, 4.0e-3, 8.0e-3, 1.0],
            vec![0.0, 1.0e6, 0.0, 0.0],
        ).unwrap()
    }

    #[test]
    fn interpolates_inside_interval() {
        assert_eq!(pulse().value_at(0.002), 5.0e5);
        assert_relative_eq!(pulse().value_at(0.006), 5.0e5, max_relative = 1e-12);
    }

    #[test]
    fn clamps_outside_range() {
        let wave = pulse();
        assert_eq!(wave.value_at(-1.0), 0.0);
        assert_eq!(wave.value_at(2.0), 0.0);

        let ramp = SampledWaveform::new(vec![1.0, 2.0], vec![3.0, 5.0]).unwrap();
        assert_eq!(ramp.value_at(f64::NEG_INFINITY), 3.0);
        assert_eq!(ramp.value_at(0.0), 3.0);
        assert_eq!(ramp.value_at(100.0), 5.0);
    }

    #[test]
    fn single_sample_is_constant() {
        let wave = SampledWaveform::new(vec![0.5], vec![42.0]).unwrap();
        for t in [-1.0e9, 0.0, 0.5, 0.75, 1.0e9] {
            assert_eq!(wave.value_at(t), 42.0);
        }
        assert_eq!(wave.rate_at(0.5, 1.0e-3), 0.0);
    }

    #[test]
    fn knots_are_exact() {
        let times = vec![0.0, 0.1, 0.35, 0.7, 2.0];
        let values = vec![1.5, -2.25, 3.0e3, 7.0, -1.0e-3];
        let wave = SampledWaveform::new(times.clone(), values.clone()).unwrap();
        for (t, v) in times.iter().zip(values.iter()) {
            assert_eq!(wave.value_at(*t), *v);
        }
    }

    #[test]
    fn affine_within_intervals_and_continuous_at_knots() {
        let wave = SampledWaveform::new(
            vec![0.0, 1.0, 3.0],
            vec![0.0, 2.0, -2.0],
        ).unwrap();

        // midpoint of each interval is the mean of its ends
        assert_relative_eq!(wave.value_at(0.5), 1.0);
        assert_relative_eq!(wave.value_at(2.0), 0.0);
        assert_relative_eq!(wave.value_at(0.25) + wave.value_at(0.75), 2.0 * wave.value_at(0.5));

        let eps = 1.0e-9;
        assert_relative_eq!(wave.value_at(1.0 - eps), 2.0, epsilon = 1e-6);
        assert_relative_eq!(wave.value_at(1.0 + eps), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn repeated_queries_agree() {
        let wave = pulse();
        let first = (wave.value_at(3.3e-3), wave.rate_at(3.3e-3, 2.0e-4));
        for _ in 0..10 {
            assert_eq!((wave.value_at(3.3e-3), wave.rate_at(3.3e-3, 2.0e-4)), first);
        }
    }

    #[test]
    fn constant_channel_has_zero_rate() {
        let wave = SampledWaveform::new(vec![0.0, 1.0, 2.0], vec![5.0e5; 3]).unwrap();
        for (t, dt) in [(-1.0, 0.5), (0.0, 2.0e-4), (1.0, 1.0), (3.0, 1.0e-6)] {
            assert_eq!(wave.rate_at(t, dt), 0.0);
        }
    }

    #[test]
    fn stencil_matches_step_change_on_ramp() {
        // 1e6 / 4e-3 per second on the rising edge
        let slope = 2.5e8;
        let dt = 2.0e-4;
        assert_relative_eq!(pulse().rate_at(1.0e-3, dt), slope * dt, max_relative = 1e-9);
        assert_relative_eq!(pulse().rate_at(5.0e-3, dt), -slope * dt, max_relative = 1e-9);
    }

    #[test]
    fn rejects_empty_channel() {
        assert!(matches!(
            SampledWaveform::new(vec![], vec![]),
            Err(Error::EmptyChannel)
        ));
    }

    #[test]
    fn rejects_non_monotonic_times() {
        assert!(matches!(
            SampledWaveform::new(vec![0.0, 2.0, 1.0], vec![0.0; 3]),
            Err(Error::NonMonotonicSamples { index: 2, .. })
        ));
        assert!(matches!(
            SampledWaveform::new(vec![0.0, 1.0, 1.0], vec![0.0; 3]),
            Err(Error::NonMonotonicSamples { index: 2, .. })
        ));
    }

    #[test]
    fn rejects_non_finite_times() {
        assert!(matches!(
            SampledWaveform::new(vec![0.0, f64::NAN], vec![0.0; 2]),
            Err(Error::NonFiniteSampleTime { index: 1, .. })
        ));
        match SampledWaveform::new(vec![f64::NEG_INFINITY, 0.0], vec![0.0; 2]) {
            Err(Error::NonFiniteSampleTime { index, time }) => {
                assert_eq!(index, 0);
                assert_eq!(time, f64::NEG_INFINITY);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn rejects_mismatched_lengths() {
        assert!(matches!(
            SampledWaveform::new(vec![0.0, 1.0], vec![0.0]),
            Err(Error::LengthMismatch { times: 2, values: 1 })
        ));
    }
}
