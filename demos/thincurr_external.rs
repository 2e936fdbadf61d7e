use coilwave::prelude::*;
use coilwave::schedule::CoilSchedule;
use coilwave::thincurr::{Environment, Model, TdDescriptor, TdSession, ThinCurrLibrary};

use std::path::Path;

// Usage: thincurr_external <libthincurr> <mesh.h5> <schedule.yaml>
fn main() -> Result<(), coilwave::Error> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        eprintln!("usage: {} <libthincurr> <mesh.h5> <schedule.yaml>", args[0]);
        std::process::exit(2);
    }

    let lib = unsafe { ThinCurrLibrary::load(&args[1])? };
    let env = Environment::init(lib, 4, "oftcppin", "oft_in.xml")?;

    let model = Model::setup(&env, &args[2])?;
    model.setup_io("")?;
    let _mcoil = model.coupling_matrix(None)?;
    let lmat = model.inductance_matrix(true, Some(Path::new("DATA_HOLDR_L.save")))?;
    model.resistance_matrix()?;

    let waveforms = CoilSchedule::from_path(&args[3])?.into_waveform_set()?;

    let td_desc = TdDescriptor::default();
    let sim_params = SimulationParameters {
        delta_t: td_desc.delta_t,
        plot_freq: Some(td_desc.plot_freq as usize),
    };
    let session = TdSession::init(&model, &lmat, td_desc)?;

    let mut simulation = Simulation::new(SimulationDescriptor {
        stepper: session,
        waveforms,
        sim_params,
        init_state: None,
    })?;

    simulation.run(RunDescriptor {
        nsteps: 200,
        verbose: true,
        save_settings: Some(SaveSettings {
            filename: "coil_history.h5",
            overwrite: true,
        }),
    })?;

    let final_currents = simulation.into_stepper().finalize()?;
    println!(
        "final element current range: [{:e}, {:e}] A",
        final_currents.fold(f64::INFINITY, |a, &b| a.min(b)),
        final_currents.fold(f64::NEG_INFINITY, |a, &b| a.max(b)),
    );

    Ok(())
}
