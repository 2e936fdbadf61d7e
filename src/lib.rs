//! Coil current waveforms for driving time-domain eddy-current solvers.
//!
//! Waveforms are sampled or closed-form functions of time. On every step a
//! [`Simulation`] evaluates each coil's value and step-scaled rate and hands both
//! to a [`Stepper`], which may be the in-crate [`circuit::PassiveLoops`] or the
//! external ThinCurr library behind [`thincurr`].
//!
//! To get started, refer to the `demos` directory in the main repository.

mod simulation;

pub mod circuit;
pub mod prelude;
pub mod schedule;
pub mod thincurr;
pub mod waveform;

pub use simulation::{
    RunDescriptor, SaveSettings, Simulation, SimulationDescriptor, SimulationParameters,
    SimulationState,
};

/// Represents an error in the simulation.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Channel has no samples")]
    EmptyChannel,
    #[error("Sample times are not strictly increasing \
        ( sample {index} at time {time} follows time {previous} )")]
    NonMonotonicSamples {
        index: usize,
        previous: f64,
        time: f64,
    },
    #[error("Sample time {time} at index {index} is not finite")]
    NonFiniteSampleTime {
        index: usize,
        time: f64,
    },
    #[error("Sample arrays differ in length \
        ( times length: {times}, values length: {values} )")]
    LengthMismatch {
        times: usize,
        values: usize,
    },
    #[error("Invalid waveform for channel {channel}")]
    Channel {
        channel: usize,
        #[source]
        source: Box<Error>,
    },
    #[error("Coil count does not match the stepper \
        ( expected: {expected}, actual: {actual} )")]
    CoilCountMismatch {
        expected: usize,
        actual: usize,
    },
    #[error("Init {array_name} array does not have expected length \
        ( {array_name} array length: {input_length}, \
        expected length: {expected_length} )")]
    BadInit {
        array_name: String,
        input_length: usize,
        expected_length: usize,
    },
    #[error("Solver call `{call}` failed: {message}")]
    Solver {
        call: &'static str,
        message: String,
    },
    #[error(transparent)]
    Library(#[from] libloading::Error),
    #[error(transparent)]
    InvalidString(#[from] std::ffi::NulError),
    #[error(transparent)]
    H5Error(#[from] hdf5::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Schedule(#[from] serde_yaml::Error),
}

impl Error {
    /// Attaches a channel index to a waveform construction error.
    pub(crate) fn in_channel(self, channel: usize) -> Self {
        Error::Channel { channel, source: Box::new(self) }
    }
}

/// Advances the state of a driven system by one time step.
///
/// Implementors receive the coil currents and their step-scaled rates for the
/// step being taken, in coil index order.
pub trait Stepper {
    /// Number of driven coils the stepper expects per step.
    fn ncoils(&self) -> usize;

    /// Advances one time step using the given forcing values.
    fn advance(&mut self, desc: StepDescriptor) -> Result<(), Error>;

    /// Number of state values reported by `observe`.
    fn nobservables(&self) -> usize {
        0
    }

    /// Writes the observable state after the last step into `out`.
    fn observe(&self, _out: ndarray::ArrayViewMut1<f64>) {}
}

/// Forcing values for a single step of a `Stepper`.
pub struct StepDescriptor<'a> {
    /// Index of the step since the start of the simulation.
    pub step: usize,
    /// The time at the start of the step.
    pub time: f64,
    pub delta_t: f64,
    /// Coil currents at `time`.
    pub currents: ndarray::ArrayView1<'a, f64>,
    /// Coil current change over the step, as given by each coil's rate policy.
    pub rates: ndarray::ArrayView1<'a, f64>,
    /// Whether the stepper should write plot output for this step.
    pub save_plot: bool,
}

impl StepDescriptor<'_> {
    /// Checks that both forcing arrays hold one entry per coil.
    ///
    /// The error reports the length of whichever array is wrong, currents first.
    pub fn check_coils(&self, ncoils: usize) -> Result<(), Error> {
        for len in [self.currents.len(), self.rates.len()] {
            if len != ncoils {
                return Err(Error::CoilCountMismatch { expected: ncoils, actual: len });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor<'a>(
        currents: &'a ndarray::Array1<f64>,
        rates: &'a ndarray::Array1<f64>,
    ) -> StepDescriptor<'a> {
        StepDescriptor {
            step: 0,
            time: 0.0,
            delta_t: 1.0,
            currents: currents.view(),
            rates: rates.view(),
            save_plot: false,
        }
    }

    #[test]
    fn coil_check_accepts_matching_forcing() {
        let forcing = ndarray::arr1(&[1.0, 2.0]);
        assert!(descriptor(&forcing, &forcing).check_coils(2).is_ok());
    }

    #[test]
    fn coil_check_reports_the_wrong_array() {
        let one = ndarray::arr1(&[1.0]);
        let two = ndarray::arr1(&[1.0, 2.0]);
        assert!(matches!(
            descriptor(&one, &two).check_coils(1),
            Err(Error::CoilCountMismatch { expected: 1, actual: 2 })
        ));
        assert!(matches!(
            descriptor(&two, &one).check_coils(1),
            Err(Error::CoilCountMismatch { expected: 1, actual: 2 })
        ));
        assert!(matches!(
            descriptor(&one, &one).check_coils(3),
            Err(Error::CoilCountMismatch { expected: 3, actual: 1 })
        ));
    }
}
