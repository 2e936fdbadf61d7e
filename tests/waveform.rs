use approx::assert_relative_eq;

use coilwave::prelude::*;
use coilwave::waveform::components::{SampledWaveform, Sinusoid};
use coilwave::waveform::four_point_rate;
use coilwave::Error;

fn coil_pulse() -> SampledWaveform {
    SampledWaveform::new(
        vec![0.0, 0.004, 0.008, 1.0],
        vec![0.0, 1.0e6, 0.0, 0.0],
    ).unwrap()
}

#[test]
fn pulse_midpoint() {
    assert_eq!(coil_pulse().value_at(0.002), 5.0e5);
}

#[test]
fn pulse_clamps_both_ends() {
    let wave = coil_pulse();
    assert_eq!(wave.value_at(-1.0), 0.0);
    assert_eq!(wave.value_at(2.0), 0.0);
}

#[test]
fn clamping_law_holds_beyond_range() {
    let wave = SampledWaveform::new(vec![-1.0, 0.0, 3.0], vec![4.0, -2.0, 9.0]).unwrap();
    for k in 0..50 {
        let delta = 0.37 * k as f64;
        assert_eq!(wave.value_at(-1.0 - delta), 4.0);
        assert_eq!(wave.value_at(3.0 + delta), 9.0);
    }
}

#[test]
fn piecewise_linear_between_knots() {
    let wave = coil_pulse();
    let dt = 2.0e-4;
    for i in 1..20 {
        let t = i as f64 * dt;
        let expected = if t <= 0.004 {
            t / 0.004 * 1.0e6
        } else {
            (0.008 - t) / 0.004 * 1.0e6
        };
        assert_relative_eq!(wave.value_at(t), expected, epsilon = 1e-6);
    }
}

#[test]
fn stencil_rate_of_constant_channel_is_zero() {
    let wave = SampledWaveform::new(vec![0.0, 0.5, 1.0, 4.0], vec![0.5e6; 4]).unwrap();
    for t in [-5.0, 0.0, 0.25, 0.5, 0.999, 4.0, 10.0] {
        for dt in [1.0e-6, 2.0e-4, 0.3, 7.0] {
            assert_eq!(wave.rate_at(t, dt), 0.0);
        }
    }
}

#[test]
fn stencil_tap_positions() {
    // cubic, so every tap contributes a distinct value
    struct Cubic;
    impl Waveform for Cubic {
        fn value_at(&self, t: f64) -> f64 {
            t * t * t
        }
    }
    let (t, dt) = (0.3, 0.2);
    let expected = (Cubic.value_at(t + dt / 4.0) - Cubic.value_at(t - dt / 4.0))
        + (Cubic.value_at(t + dt * 5.0 / 4.0) - Cubic.value_at(t + dt * 3.0 / 4.0));
    assert_eq!(four_point_rate(&Cubic, t, dt), expected);
    assert_eq!(Cubic.rate_at(t, dt), expected);
}

#[test]
fn analytic_sinusoid_rate() {
    let amplitude = 1.0e6;
    let omega = 2.0 * std::f64::consts::PI * 62.5;
    let wave = Sinusoid {
        amplitude,
        angular_frequency: omega,
        phase: 0.0,
        policy: RatePolicy::Analytic,
    };
    for (t, dt) in [(0.0, 2.0e-4), (1.3e-3, 2.0e-4), (0.01, 1.0e-5), (0.5, 1.0e-3)] {
        assert_relative_eq!(
            wave.rate_at(t, dt),
            omega * amplitude * f64::cos(omega * t) * dt,
            max_relative = 1e-12
        );
    }
}

#[test]
fn construction_rejects_bad_channels() {
    let mut set = WaveformSet::new();
    set.push_samples(vec![0.0], vec![1.0]).unwrap();

    match set.push_samples(vec![], vec![]) {
        Err(Error::Channel { channel: 1, source }) => {
            assert!(matches!(*source, Error::EmptyChannel))
        }
        other => panic!("unexpected result: {:?}", other),
    }
    match set.push_samples(vec![0.0, 0.5, 0.25], vec![0.0; 3]) {
        Err(Error::Channel { channel: 1, source }) => {
            assert!(matches!(*source, Error::NonMonotonicSamples { index: 2, .. }))
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(set.len(), 1);
}

#[test]
fn channels_evaluate_in_parallel() {
    let mut set = WaveformSet::new();
    for k in 0..8 {
        set.push_samples(vec![0.0, 1.0], vec![0.0, k as f64]).unwrap();
    }
    let set = std::sync::Arc::new(set);

    let handles: Vec<_> = (0..set.len())
        .map(|k| {
            let set = std::sync::Arc::clone(&set);
            std::thread::spawn(move || set.get(k).map(|w| w.value_at(0.5)))
        })
        .collect();

    for (k, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), Some(k as f64 / 2.0));
    }
}
