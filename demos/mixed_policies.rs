use coilwave::prelude::*;
use coilwave::circuit::{PassiveLoops, PassiveLoopsDescriptor};
use coilwave::waveform::components::{Constant, Sinusoid};

fn run(policy: RatePolicy) -> f64 {
    let mut waveforms = WaveformSet::new();
    // coil 1 oscillates at 62.5 Hz, coil 2 holds steady
    waveforms.push(Sinusoid { policy, ..Sinusoid::with_frequency(1.0e6, 1.0e3 / 16.0) });
    waveforms.push(Constant { value: 0.5e6, policy });

    let mut simulation = Simulation::new(SimulationDescriptor {
        stepper: PassiveLoops::new(PassiveLoopsDescriptor {
            inductance: ndarray::arr1(&[2.5e-6]),
            resistance: ndarray::arr1(&[1.0e-3]),
            coupling: ndarray::arr2(&[[1.0e-8, 5.0e-9]]),
            init_currents: None,
        }).unwrap(),
        waveforms,
        sim_params: SimulationParameters { delta_t: 2.0e-4, plot_freq: None },
        init_state: None,
    }).unwrap();

    simulation.run(RunDescriptor::<&str> {
        nsteps: 200,
        verbose: false,
        save_settings: None,
    })
    .unwrap();

    simulation.stepper().currents()[0]
}

fn main() {
    env_logger::init();

    let analytic = run(RatePolicy::Analytic);
    let stencil = run(RatePolicy::FourPointStencil);

    println!(
        "\n-- Loop current after 200 steps --\n\
        analytic rate:  {:<12.5e} A\n\
        stencil rate:   {:<12.5e} A\n\
        difference:     {:<12.5e} A\n",
        analytic,
        stencil,
        analytic - stencil,
    );
}
