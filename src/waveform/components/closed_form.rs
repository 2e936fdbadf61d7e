use crate::waveform::{RatePolicy, Waveform};

/// A sinusoidal coil current, `amplitude * sin(angular_frequency * t + phase)`.
#[derive(Copy, Clone, Debug)]
pub struct Sinusoid {
    pub amplitude: f64,
    /// Angular frequency in rad/s.
    pub angular_frequency: f64,
    pub phase: f64,
    pub policy: RatePolicy,
}

impl Sinusoid {
    /// A zero-phase sinusoid with frequency in Hz and an analytic rate.
    pub fn with_frequency(amplitude: f64, frequency: f64) -> Self {
        Self {
            amplitude,
            angular_frequency: 2.0 * std::f64::consts::PI * frequency,
            phase: 0.0,
            policy: RatePolicy::Analytic,
        }
    }
}

impl Waveform for Sinusoid {
    #[inline]
    fn value_at(&self, t: f64) -> f64 {
        self.amplitude * f64::sin(self.angular_frequency * t + self.phase)
    }

    #[inline]
    fn rate_at(&self, t: f64, dt: f64) -> f64 {
        self.policy.rate(
            self,
            |t| self.angular_frequency * self.amplitude * f64::cos(self.angular_frequency * t + self.phase),
            t,
            dt,
        )
    }
}

/// A coil held at a fixed current.
#[derive(Copy, Clone, Debug)]
pub struct Constant {
    pub value: f64,
    pub policy: RatePolicy,
}

impl Waveform for Constant {
    #[inline]
    fn value_at(&self, _t: f64) -> f64 {
        self.value
    }

    #[inline]
    fn rate_at(&self, t: f64, dt: f64) -> f64 {
        self.policy.rate(self, |_| 0.0, t, dt)
    }
}

/// A waveform given by a value function and its derivative.
pub struct FunctionWaveform<Fv, Fd>
where
    Fv: Fn(f64) -> f64 + Send + Sync,
    Fd: Fn(f64) -> f64 + Send + Sync,
{
    pub value_fn: Fv,
    pub derivative_fn: Fd,
    pub policy: RatePolicy,
}

impl<Fv, Fd> Waveform for FunctionWaveform<Fv, Fd>
where
    Fv: Fn(f64) -> f64 + Send + Sync,
    Fd: Fn(f64) -> f64 + Send + Sync,
{
    #[inline]
    fn value_at(&self, t: f64) -> f64 {
        (self.value_fn)(t)
    }

    #[inline]
    fn rate_at(&self, t: f64, dt: f64) -> f64 {
        self.policy.rate(self, &self.derivative_fn, t, dt)
    }
}
