//! Coil waveforms.

mod closed_form;
mod sampled;

pub use closed_form::{Constant, FunctionWaveform, Sinusoid};
pub use sampled::SampledWaveform;
