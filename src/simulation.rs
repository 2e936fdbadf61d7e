use std::cmp::min;
use std::path::Path;

use crate::waveform::WaveformSet;
use crate::{Error, StepDescriptor, Stepper};

/// Simulation specific parameters.
#[derive(Copy, Clone, Debug)]
pub struct SimulationParameters {
    /// The length of each temporal step in the simulation.
    pub delta_t: f64,
    /// Every `plot_freq`-th step is flagged for plot output. Never if `None`.
    pub plot_freq: Option<usize>,
}

/// Describes the driven system's position in time.
#[derive(Copy, Clone, Debug, Default)]
pub struct SimulationState {
    /// Number of steps taken so far.
    pub step: usize,
    /// The time at the start of the next step.
    pub time: f64,
}

/// Describes a simulation.
pub struct SimulationDescriptor<S: Stepper> {
    /// The `Stepper` advanced by the simulation.
    pub stepper: S,
    /// The waveform of each coil driving the stepper.
    pub waveforms: WaveformSet,
    /// The parameters for the simulation.
    pub sim_params: SimulationParameters,
    /// The state that the simulation starts in.
    pub init_state: Option<SimulationState>,
}

/// Describes a simulation run.
pub struct RunDescriptor<P: AsRef<Path>> {
    /// How many time steps to take.
    pub nsteps: usize,
    /// Whether or not to show a progress bar.
    pub verbose: bool,
    /// What, if any, information to save to file.
    pub save_settings: Option<SaveSettings<P>>,
}

/// How run history should be saved to file.
#[derive(Debug)]
pub struct SaveSettings<P: AsRef<Path>> {
    /// The path to the save file.
    pub filename: P,
    /// Whether or not to overwrite any possible saved data.
    pub overwrite: bool,
}

/// Forcing values and observed state for a block of steps.
struct History {
    /// Number of steps actually taken.
    len: usize,
    times: ndarray::Array1<f64>,
    currents: ndarray::Array2<f64>,
    rates: ndarray::Array2<f64>,
    observables: ndarray::Array2<f64>,
}

/// The main `struct` of the framework.
pub struct Simulation<S: Stepper> {
    stepper: S,
    waveforms: WaveformSet,
    sim_params: SimulationParameters,
    state: SimulationState,
}

impl<S: Stepper> Simulation<S> {
    /// Creates a new `Simulation` instance.
    #[inline]
    pub fn new(desc: SimulationDescriptor<S>) -> Result<Self, Error> {
        if desc.waveforms.len() != desc.stepper.ncoils() {
            return Err(Error::CoilCountMismatch {
                expected: desc.stepper.ncoils(),
                actual: desc.waveforms.len(),
            })
        }

        Ok(Self {
            state: desc.init_state.unwrap_or_default(),
            stepper: desc.stepper,
            waveforms: desc.waveforms,
            sim_params: desc.sim_params,
        })
    }

    #[inline]
    pub fn state(&self) -> SimulationState {
        self.state
    }

    #[inline]
    pub fn stepper(&self) -> &S {
        &self.stepper
    }

    #[inline]
    pub fn waveforms(&self) -> &WaveformSet {
        &self.waveforms
    }

    /// Consumes the simulation, handing back its stepper.
    #[inline]
    pub fn into_stepper(self) -> S {
        self.stepper
    }

    /// Does a computational run.
    pub fn run<P: AsRef<Path>>(
        &mut self,
        desc: RunDescriptor<P>,
    ) -> Result<(), Error> {
        let nsteps = desc.nsteps;
        if nsteps == 0 {
            return Ok(());
        }
        let ncoils = self.waveforms.len();
        let nobs = self.stepper.nobservables();
        let width = 1 + 2*ncoils + nobs;
        let store_size = min(nsteps, (100_000_000 / width).max(1));
        let mut offset = 0;

        log::info!(
            "running {} steps from t = {:e} s (dt = {:e} s, {} coils)",
            nsteps,
            self.state.time,
            self.sim_params.delta_t,
            ncoils,
        );

        // optionally create file
        if let Some(SaveSettings { ref filename, overwrite }) = desc.save_settings {
            let filename = filename.as_ref();
            if filename.exists() && !overwrite {
                let file = hdf5::File::append(filename)?;

                let previous_size = file.dataset("time")?.shape()[0];
                offset = previous_size;
                log::debug!("appending to {} after {} steps", filename.display(), previous_size);

                resize_history(&file, previous_size + nsteps, ncoils, nobs)?;

                file.close()?;
            } else {
                let file = hdf5::File::create(filename)?;

                file.new_dataset::<f64>()
                    .shape(hdf5::Extent::resizable(nsteps))
                    .create("time")?;
                let coil_group = file.create_group("coils")?;
                coil_group.new_dataset::<f64>()
                    .shape((hdf5::Extent::resizable(nsteps), ncoils))
                    .create("currents")?;
                coil_group.new_dataset::<f64>()
                    .shape((hdf5::Extent::resizable(nsteps), ncoils))
                    .create("rates")?;
                if nobs > 0 {
                    file.new_dataset::<f64>()
                        .shape((hdf5::Extent::resizable(nsteps), nobs))
                        .create("observables")?;
                }

                // save time step as file attribute
                let dt_attr = file.new_attr::<f64>()
                    .shape(hdf5::Extents::Scalar)
                    .create("time_step");
                if let Ok(attr) = dt_attr {
                    attr.write_scalar(&self.sim_params.delta_t)?;
                }

                file.close()?;
            }
        }

        let bar = if desc.verbose {
            Some(indicatif::ProgressBar::new(nsteps as u64))
        } else {
            None
        };

        // separate calculations into blocks of time steps
        let nloops = ((nsteps-1) / store_size) + 1;
        for i in 0..nloops {
            let start_index = store_size * i;
            let end_index = min(store_size*(i+1), nsteps);
            let niters = end_index - start_index;

            let (history, outcome) = self.advance_block(niters, &bar);
            let taken = history.len;

            // optionally write history to file
            if let Some(SaveSettings { ref filename, .. }) = desc.save_settings {
                let file = hdf5::File::open_rw(filename)?;
                let rows = (start_index+offset)..(start_index+offset+taken);

                if taken > 0 {
                    file.dataset("time")?.write_slice(
                        history.times.slice(ndarray::s![..taken]),
                        ndarray::s![rows.clone()],
                    )?;
                    file.dataset("coils/currents")?.write_slice(
                        history.currents.slice(ndarray::s![..taken, ..]),
                        ndarray::s![rows.clone(), ..],
                    )?;
                    file.dataset("coils/rates")?.write_slice(
                        history.rates.slice(ndarray::s![..taken, ..]),
                        ndarray::s![rows.clone(), ..],
                    )?;
                    if nobs > 0 {
                        file.dataset("observables")?.write_slice(
                            history.observables.slice(ndarray::s![..taken, ..]),
                            ndarray::s![rows.clone(), ..],
                        )?;
                    }
                }
                // drop rows reserved for steps that were never taken
                if outcome.is_err() {
                    resize_history(&file, rows.end, ncoils, nobs)?;
                }

                file.close()?;
            }

            if let Err(e) = outcome {
                if let Some(ref bar) = bar {
                    bar.abandon();
                }
                log::warn!("run stopped at step {}: {}", self.state.step, e);
                return Err(e);
            }
        }

        if let Some(ref bar) = bar {
            bar.finish();
        }
        log::info!("finished at step {} (t = {:e} s)", self.state.step, self.state.time);

        Ok(())
    }

    /// Takes up to `niters` steps, recording the forcing and observed state of each.
    ///
    /// State advances with every step the stepper accepts. On failure the history
    /// holds only the steps taken before it, alongside the error.
    fn advance_block(
        &mut self,
        niters: usize,
        bar: &Option<indicatif::ProgressBar>,
    ) -> (History, Result<(), Error>) {
        let ncoils = self.waveforms.len();
        let nobs = self.stepper.nobservables();
        let delta_t = self.sim_params.delta_t;
        let start_time = self.state.time;

        let mut history = History {
            len: 0,
            times: ndarray::Array1::<f64>::zeros(niters),
            currents: ndarray::Array2::<f64>::zeros((niters, ncoils)),
            rates: ndarray::Array2::<f64>::zeros((niters, ncoils)),
            observables: ndarray::Array2::<f64>::zeros((niters, nobs)),
        };

        for t_index in 0..niters {
            let step = self.state.step;
            let t = (t_index as f64)*delta_t + start_time;
            history.times[t_index] = t;

            self.waveforms.values_at(t, history.currents.row_mut(t_index));
            self.waveforms.rates_at(t, delta_t, history.rates.row_mut(t_index));

            let save_plot = self.sim_params.plot_freq
                .map_or(false, |freq| freq > 0 && (step + 1) % freq == 0);

            let advanced = self.stepper.advance(StepDescriptor {
                step,
                time: t,
                delta_t,
                currents: history.currents.row(t_index),
                rates: history.rates.row(t_index),
                save_plot,
            });
            if let Err(e) = advanced {
                return (history, Err(e));
            }
            self.stepper.observe(history.observables.row_mut(t_index));

            // update state
            history.len += 1;
            self.state.step += 1;
            self.state.time = ((t_index + 1) as f64)*delta_t + start_time;

            if let Some(ref bar) = bar {
                bar.inc(1)
            }
        }

        (history, Ok(()))
    }
}

/// Sets the number of recorded steps in a history file.
fn resize_history(file: &hdf5::File, rows: usize, ncoils: usize, nobs: usize) -> Result<(), Error> {
    file.dataset("time")?.resize(rows)?;
    file.dataset("coils/currents")?.resize((rows, ncoils))?;
    file.dataset("coils/rates")?.resize((rows, ncoils))?;
    if nobs > 0 {
        file.dataset("observables")?.resize((rows, nobs))?;
    }
    Ok(())
}
