pub mod components;

use serde::{Deserialize, Serialize};

use crate::Error;
use components::SampledWaveform;

/// A coil current as a function of time.
///
/// Waveforms are read-only once built, so a set of them may be evaluated from
/// several threads at once, e.g. one coil per thread within a step.
pub trait Waveform: Send + Sync {
    /// The value of the waveform at time `t`.
    fn value_at(&self, t: f64) -> f64;

    /// The change of the waveform over a step of length `dt` starting at `t`.
    ///
    /// Defaults to the four-point stencil built on `value_at`.
    fn rate_at(&self, t: f64, dt: f64) -> f64 {
        four_point_rate(self, t, dt)
    }
}

impl<W: Waveform + ?Sized> Waveform for Box<W> {
    #[inline]
    fn value_at(&self, t: f64) -> f64 {
        (**self).value_at(t)
    }
    #[inline]
    fn rate_at(&self, t: f64, dt: f64) -> f64 {
        (**self).rate_at(t, dt)
    }
}

/// How a closed-form waveform reports its rate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatePolicy {
    /// Sample the waveform with the four-point stencil, as for sampled channels.
    FourPointStencil,
    /// Multiply the exact derivative at `t` by the step length.
    #[default]
    Analytic,
}

impl RatePolicy {
    /// Computes the rate of `waveform` under this policy.
    #[inline]
    pub fn rate<W, Fd>(self, waveform: &W, derivative: Fd, t: f64, dt: f64) -> f64
    where
        W: Waveform + ?Sized,
        Fd: FnOnce(f64) -> f64,
    {
        match self {
            RatePolicy::FourPointStencil => four_point_rate(waveform, t, dt),
            RatePolicy::Analytic => derivative(t) * dt,
        }
    }
}

/// The step-scaled derivative used by Crank–Nicolson coil forcing.
///
/// Averages the derivative at both ends of the step `[t, t + dt]`, each taken as a
/// central difference over `dt / 2`. Tap positions and summation order are fixed
/// so results match the consuming integrator exactly.
#[inline]
pub fn four_point_rate<W: Waveform + ?Sized>(waveform: &W, t: f64, dt: f64) -> f64 {
    let start = waveform.value_at(t + dt / 4.0) - waveform.value_at(t - dt / 4.0);
    let end = waveform.value_at(t + dt * 5.0 / 4.0) - waveform.value_at(t + dt * 3.0 / 4.0);
    start + end
}

/// The waveforms of every driven coil, indexed by coil.
#[derive(Default)]
pub struct WaveformSet {
    channels: Vec<Box<dyn Waveform>>,
}

impl WaveformSet {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds sampled channels sharing a time axis.
    ///
    /// Row 0 of `table` holds the sample times and each further row the values of
    /// one coil, so coil `k` is read from row `k + 1`.
    pub fn from_table(table: ndarray::ArrayView2<f64>) -> Result<Self, Error> {
        let mut set = Self::new();
        if table.nrows() == 0 {
            return Ok(set);
        }

        let times = table.row(0).to_vec();
        for row in table.rows().into_iter().skip(1) {
            set.push_samples(times.clone(), row.to_vec())?;
        }

        Ok(set)
    }

    /// Adds a waveform as the next coil and returns its index.
    pub fn push<W: Waveform + 'static>(&mut self, waveform: W) -> usize {
        self.channels.push(Box::new(waveform));
        self.channels.len() - 1
    }

    /// Validates and adds a sampled channel as the next coil.
    pub fn push_samples(&mut self, times: Vec<f64>, values: Vec<f64>) -> Result<usize, Error> {
        let channel = self.channels.len();
        let waveform = SampledWaveform::new(times, values)
            .map_err(|e| e.in_channel(channel))?;
        Ok(self.push(waveform))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// The waveform of coil `channel`, if present.
    #[inline]
    pub fn get(&self, channel: usize) -> Option<&dyn Waveform> {
        self.channels.get(channel).map(|w| w.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Waveform> {
        self.channels.iter().map(|w| w.as_ref())
    }

    /// Writes every coil's value at `t` into `out`.
    ///
    /// # Panics
    ///
    /// If `out` does not hold exactly one entry per coil.
    pub fn values_at(&self, t: f64, mut out: ndarray::ArrayViewMut1<f64>) {
        self.check_output(out.len());
        ndarray::Zip::from(&mut out)
            .and(&self.channels)
            .for_each(|value, waveform| *value = waveform.value_at(t));
    }

    /// Writes every coil's rate over the step `[t, t + dt]` into `out`.
    ///
    /// # Panics
    ///
    /// If `out` does not hold exactly one entry per coil.
    pub fn rates_at(&self, t: f64, dt: f64, mut out: ndarray::ArrayViewMut1<f64>) {
        self.check_output(out.len());
        ndarray::Zip::from(&mut out)
            .and(&self.channels)
            .for_each(|rate, waveform| *rate = waveform.rate_at(t, dt));
    }

    #[inline]
    fn check_output(&self, len: usize) {
        assert_eq!(
            len,
            self.channels.len(),
            "output length does not match the number of coils"
        );
    }
}

impl std::fmt::Debug for WaveformSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaveformSet")
            .field("channels", &self.channels.len())
            .finish()
    }
}
