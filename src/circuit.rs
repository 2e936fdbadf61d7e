//! Passive conducting loops driven inductively by coils.

use crate::{Error, StepDescriptor, Stepper};

/// Describes the composition of a `PassiveLoops` stepper.
pub struct PassiveLoopsDescriptor {
    /// Self inductance of each loop [H].
    pub inductance: ndarray::Array1<f64>,
    /// Resistance of each loop [Ω].
    pub resistance: ndarray::Array1<f64>,
    /// Mutual inductance between loop `k` (row) and coil `j` (column) [H].
    pub coupling: ndarray::Array2<f64>,
    /// Loop currents before the first step. Zero if not given.
    pub init_currents: Option<ndarray::Array1<f64>>,
}

/// Uncoupled resistive loops integrated with Crank–Nicolson.
///
/// Each loop obeys `L dI/dt + R I = -M · dI_coil/dt`. The coil rates handed to
/// `advance` are the coil current change over the step, so they enter as
/// `M · rate / dt`.
pub struct PassiveLoops {
    ind: ndarray::Array1<f64>,
    res: ndarray::Array1<f64>,
    coupling: ndarray::Array2<f64>,
    currents: ndarray::Array1<f64>,
}

impl PassiveLoops {
    /// Creates a new `PassiveLoops` instance.
    pub fn new(desc: PassiveLoopsDescriptor) -> Result<Self, Error> {
        let nloops = desc.inductance.len();

        if desc.resistance.len() != nloops {
            return Err(Error::BadInit {
                array_name: "Resistance".to_string(),
                input_length: desc.resistance.len(),
                expected_length: nloops,
            })
        }
        if desc.coupling.nrows() != nloops {
            return Err(Error::BadInit {
                array_name: "Coupling".to_string(),
                input_length: desc.coupling.nrows(),
                expected_length: nloops,
            })
        }
        let currents = desc.init_currents
            .unwrap_or_else(|| ndarray::Array1::<f64>::zeros(nloops));
        if currents.len() != nloops {
            return Err(Error::BadInit {
                array_name: "Current".to_string(),
                input_length: currents.len(),
                expected_length: nloops,
            })
        }

        Ok(Self {
            ind: desc.inductance,
            res: desc.resistance,
            coupling: desc.coupling,
            currents,
        })
    }

    #[inline]
    pub fn nloops(&self) -> usize {
        self.ind.len()
    }

    /// The loop currents after the last step.
    #[inline]
    pub fn currents(&self) -> ndarray::ArrayView1<f64> {
        self.currents.view()
    }
}

impl Stepper for PassiveLoops {
    #[inline]
    fn ncoils(&self) -> usize {
        self.coupling.ncols()
    }

    fn advance(&mut self, desc: StepDescriptor) -> Result<(), Error> {
        desc.check_coils(self.ncoils())?;

        let d_ratio = desc.delta_t.recip();
        let drive = self.coupling.dot(&desc.rates) * d_ratio;

        ndarray::Zip::from(&mut self.currents)
            .and(&self.ind)
            .and(&self.res)
            .and(&drive)
            .for_each(|curr, &ind, &res, &emf| {
                *curr = (d_ratio*ind + res/2.0).recip()
                    * ( (d_ratio*ind - res/2.0) * *curr - emf );
            });

        Ok(())
    }

    #[inline]
    fn nobservables(&self) -> usize {
        self.nloops()
    }

    #[inline]
    fn observe(&self, mut out: ndarray::ArrayViewMut1<f64>) {
        out.assign(&self.currents);
    }
}
