//! Coil current schedules read from configuration.
//!
//! ```yaml
//! times: [0.0, 4.0e-3, 8.0e-3, 1.0]
//! coils:
//!   - kind: sampled
//!     values: [1.0e6, 1.0e6, 0.0, 0.0]
//!   - kind: sinusoid
//!     amplitude: 0.5e6
//!     frequency: 62.5
//!     policy: four_point_stencil
//!   - kind: constant
//!     value: 0.5e6
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::waveform::components::{Constant, Sinusoid};
use crate::waveform::{RatePolicy, WaveformSet};

/// The waveforms of every coil, in coil order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoilSchedule {
    /// Sample times shared by sampled coils that give none of their own.
    #[serde(default)]
    pub times: Vec<f64>,
    pub coils: Vec<CoilEntry>,
}

/// The waveform of one coil.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CoilEntry {
    Sampled {
        #[serde(default)]
        times: Option<Vec<f64>>,
        values: Vec<f64>,
    },
    Sinusoid {
        amplitude: f64,
        /// Frequency in Hz.
        frequency: f64,
        #[serde(default)]
        phase: f64,
        #[serde(default)]
        policy: RatePolicy,
    },
    Constant {
        value: f64,
        #[serde(default)]
        policy: RatePolicy,
    },
}

impl CoilSchedule {
    pub fn from_yaml_str(contents: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        log::debug!("loading coil schedule from {}", path.as_ref().display());
        Self::from_yaml_str(&contents)
    }

    /// Validates every coil and builds the waveform set.
    pub fn into_waveform_set(self) -> Result<WaveformSet, Error> {
        let mut set = WaveformSet::new();

        for coil in self.coils {
            match coil {
                CoilEntry::Sampled { times, values } => {
                    let times = times.unwrap_or_else(|| self.times.clone());
                    set.push_samples(times, values)?;
                }
                CoilEntry::Sinusoid { amplitude, frequency, phase, policy } => {
                    set.push(Sinusoid {
                        phase,
                        policy,
                        ..Sinusoid::with_frequency(amplitude, frequency)
                    });
                }
                CoilEntry::Constant { value, policy } => {
                    set.push(Constant { value, policy });
                }
            }
        }

        Ok(set)
    }
}
