//! Includes commonly used library components.

pub use crate::{
    RunDescriptor,
    SaveSettings,
    Simulation,
    SimulationDescriptor,
    SimulationParameters,
    SimulationState,
    StepDescriptor,
    Stepper,
};
pub use crate::waveform::{RatePolicy, Waveform, WaveformSet};
