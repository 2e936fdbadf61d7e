use coilwave::prelude::*;
use coilwave::circuit::{PassiveLoops, PassiveLoopsDescriptor};

use std::f64::consts::PI;

/// Self inductance of a thin circular loop of wire.
fn loop_inductance(radius: f64, wire_radius: f64) -> f64 {
    physical_constants::VACUUM_MAG_PERMEABILITY * radius * ((8.0 * radius / wire_radius).ln() - 2.0)
}

/// Mutual inductance of two coaxial loops far apart compared to their radii.
fn far_mutual_inductance(r1: f64, r2: f64, distance: f64) -> f64 {
    physical_constants::VACUUM_MAG_PERMEABILITY * PI * (r1 * r2).powi(2) / (2.0 * distance.powi(3))
}

fn main() {
    env_logger::init();

    let radius = 0.5; // [m]
    let wire_radius: f64 = 5e-3; // [m]
    let resistivity = 1.7e-8; // [Ω m]
    let resistance = resistivity * 2.0 * PI * radius / (PI * wire_radius.powi(2));

    // coil 1 pulses to 1 MA and back, coil 2 holds 0.5 MA
    let table = ndarray::arr2(&[
        [0.0, 4.0e-3, 8.0e-3, 1.0], // [s]
        [0.0, 1.0e6, 0.0, 0.0], // [A]
        [0.5e6, 0.5e6, 0.5e6, 0.5e6], // [A]
    ]);
    let waveforms = WaveformSet::from_table(table.view()).unwrap();

    let loops = PassiveLoops::new(PassiveLoopsDescriptor {
        inductance: ndarray::arr1(&[loop_inductance(radius, wire_radius); 2]),
        resistance: ndarray::arr1(&[resistance; 2]),
        coupling: ndarray::arr2(&[
            [far_mutual_inductance(radius, 1.0, 3.0), far_mutual_inductance(radius, 1.0, 5.0)],
            [far_mutual_inductance(radius, 1.0, 5.0), far_mutual_inductance(radius, 1.0, 3.0)],
        ]),
        init_currents: None,
    }).unwrap();

    let sim_params = SimulationParameters {
        delta_t: 2.0e-4, // [s]
        plot_freq: Some(10),
    };

    let mut simulation = Simulation::new(SimulationDescriptor {
        stepper: loops,
        waveforms,
        sim_params,
        init_state: None,
    }).unwrap();

    println!(
        "\n-- General Simulation Info --\n\
        # of coils:   {}\n\
        Δt:           {:<9.2e} s\n",
        simulation.waveforms().len(),
        sim_params.delta_t,
    );

    std::fs::create_dir_all("data").unwrap();

    println!("-- Run Part 1 --");
    // drive through the pulse and save the history
    simulation.run(RunDescriptor {
        nsteps: 100,
        verbose: true,
        save_settings: Some(SaveSettings {
            filename: "data/sampled_coils.h5",
            overwrite: true,
        }),
    })
    .unwrap();

    println!("-- Run Part 2 --");
    // let the induced currents decay
    simulation.run(RunDescriptor {
        nsteps: 100,
        verbose: true,
        save_settings: Some(SaveSettings {
            filename: "data/sampled_coils.h5",
            overwrite: false,
        }),
    })
    .unwrap();

    println!("loop currents: {}", simulation.stepper().currents());
}
