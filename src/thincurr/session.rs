use std::ffi::{c_char, c_void, CString};
use std::marker::PhantomData;
use std::path::Path;
use std::ptr;
use std::sync::Arc;

use super::{ThinCurrLibrary, OFT_ERROR_SLEN};
use crate::{Error, StepDescriptor, Stepper};

type ErrorBuffer = [c_char; OFT_ERROR_SLEN];

/// Turns a solver error string into a `Result`. Empty means success.
fn check(call: &'static str, buffer: &ErrorBuffer) -> Result<(), Error> {
    let bytes: Vec<u8> = buffer.iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    let message = String::from_utf8_lossy(&bytes).trim().to_string();

    if message.is_empty() {
        Ok(())
    } else {
        log::error!("{} failed: {}", call, message);
        Err(Error::Solver { call, message })
    }
}

fn c_path<P: AsRef<Path>>(path: P) -> Result<CString, Error> {
    Ok(CString::new(path.as_ref().to_string_lossy().into_owned())?)
}

/// The solver's runtime environment and parsed XML input.
pub struct Environment {
    lib: Arc<ThinCurrLibrary>,
    xml: *mut c_void,
}

impl Environment {
    /// Initializes the solver runtime and loads its XML settings.
    ///
    /// `oftin` is the solver's namelist input file.
    pub fn init<P: AsRef<Path>, Q: AsRef<Path>>(
        lib: Arc<ThinCurrLibrary>,
        nthreads: i32,
        oftin: P,
        xml_file: Q,
    ) -> Result<Self, Error> {
        let oftin = c_path(oftin)?;
        let xml_file = c_path(xml_file)?;
        let mut slens = [0i32; 4];
        let mut xml = ptr::null_mut();

        log::info!("initializing solver runtime with {} threads", nthreads);
        unsafe {
            (lib.oftpy_init)(nthreads, oftin.as_ptr(), slens.as_mut_ptr(), ptr::null_mut());
            (lib.oftpy_load_xml)(xml_file.as_ptr(), &mut xml);
        }

        Ok(Self { lib, xml })
    }
}

/// A thin-wall model built from a mesh file.
pub struct Model<'env> {
    lib: Arc<ThinCurrLibrary>,
    tw: *mut c_void,
    nelems: usize,
    ncoils: usize,
    _env: PhantomData<&'env Environment>,
}

/// The model's coil-to-element mutual inductance matrix.
pub struct CouplingMatrix<'m> {
    #[allow(dead_code)]
    ptr: *mut c_void,
    _model: PhantomData<&'m ()>,
}

/// The model's element inductance matrix.
pub struct InductanceMatrix<'m> {
    ptr: *mut c_void,
    hodlr: bool,
    _model: PhantomData<&'m ()>,
}

impl<'env> Model<'env> {
    /// Reads the mesh and sets up the model.
    pub fn setup<P: AsRef<Path>>(env: &'env Environment, mesh_file: P) -> Result<Self, Error> {
        let mesh_file = c_path(mesh_file)?;
        let mut tw = ptr::null_mut();
        let mut sizes = [0i32; 9];
        let mut error: ErrorBuffer = [0; OFT_ERROR_SLEN];

        unsafe {
            (env.lib.setup)(
                mesh_file.as_ptr(), -1, ptr::null_mut(), -1, ptr::null_mut(),
                ptr::null_mut(), ptr::null_mut(), 0,
                &mut tw, sizes.as_mut_ptr(), error.as_mut_ptr(), env.xml,
            );
        }
        check("thincurr_setup", &error)?;

        let nelems = usize::try_from(sizes[7]).unwrap_or(0);
        let ncoils = usize::try_from(sizes[8]).unwrap_or(0);
        log::info!("model setup: {} elements, {} coils", nelems, ncoils);

        Ok(Self {
            lib: Arc::clone(&env.lib),
            tw,
            nelems,
            ncoils,
            _env: PhantomData,
        })
    }

    #[inline]
    pub fn nelems(&self) -> usize {
        self.nelems
    }

    /// Number of current-driven coils in the model.
    #[inline]
    pub fn ncoils(&self) -> usize {
        self.ncoils
    }

    /// Sets up output files under `basepath`.
    pub fn setup_io<P: AsRef<Path>>(&self, basepath: P) -> Result<(), Error> {
        let basepath = c_path(basepath)?;
        let mut error: ErrorBuffer = [0; OFT_ERROR_SLEN];
        unsafe {
            (self.lib.setup_io)(self.tw, basepath.as_ptr(), false, false, error.as_mut_ptr());
        }
        check("thincurr_setup_io", &error)
    }

    /// Computes the coil coupling matrix, reusing `cache_file` if given.
    pub fn coupling_matrix(&self, cache_file: Option<&Path>) -> Result<CouplingMatrix<'_>, Error> {
        let cache_file = c_path(cache_file.unwrap_or(Path::new("")))?;
        let mut ptr = ptr::null_mut();
        let mut error: ErrorBuffer = [0; OFT_ERROR_SLEN];
        unsafe {
            (self.lib.mcoil)(self.tw, &mut ptr, cache_file.as_ptr(), error.as_mut_ptr());
        }
        check("thincurr_Mcoil", &error)?;

        Ok(CouplingMatrix { ptr, _model: PhantomData })
    }

    /// Computes the inductance matrix, optionally HODLR-compressed.
    pub fn inductance_matrix(
        &self,
        hodlr: bool,
        cache_file: Option<&Path>,
    ) -> Result<InductanceMatrix<'_>, Error> {
        let cache_file = c_path(cache_file.unwrap_or(Path::new("")))?;
        let mut ptr = ptr::null_mut();
        let mut error: ErrorBuffer = [0; OFT_ERROR_SLEN];
        unsafe {
            (self.lib.lmat)(self.tw, hodlr, &mut ptr, cache_file.as_ptr(), error.as_mut_ptr());
        }
        check("thincurr_Lmat", &error)?;

        Ok(InductanceMatrix { ptr, hodlr, _model: PhantomData })
    }

    /// Computes the resistance matrix inside the model.
    pub fn resistance_matrix(&self) -> Result<(), Error> {
        let mut error: ErrorBuffer = [0; OFT_ERROR_SLEN];
        unsafe {
            (self.lib.rmat)(self.tw, false, ptr::null_mut(), error.as_mut_ptr());
        }
        check("thincurr_Rmat", &error)
    }
}

/// Describes how a `TdSession` should integrate.
#[derive(Clone, Debug)]
pub struct TdDescriptor {
    pub delta_t: f64,
    /// Tolerance of the iterative linear solver.
    pub lin_tol: f64,
    /// Use a direct linear solver instead of an iterative one.
    pub direct: bool,
    /// Crank–Nicolson rather than backward Euler time stepping.
    pub timestep_cn: bool,
    pub status_freq: i32,
    pub plot_freq: i32,
    /// Element currents at the start. Zero if not given.
    pub init_currents: Option<ndarray::Array1<f64>>,
}

impl Default for TdDescriptor {
    fn default() -> Self {
        Self {
            delta_t: 2.0e-4,
            lin_tol: 1.0e-6,
            direct: false,
            timestep_cn: true,
            status_freq: 10,
            plot_freq: 10,
            init_currents: None,
        }
    }
}

/// The solver's stateful time-domain integrator.
///
/// Finalized on drop if `finalize` was not called.
pub struct TdSession<'m> {
    lib: Arc<ThinCurrLibrary>,
    state: *mut c_void,
    nelems: usize,
    ncoils: usize,
    _model: PhantomData<&'m ()>,
}

impl<'m> TdSession<'m> {
    /// Starts time-domain integration on a model.
    pub fn init<'env>(
        model: &'m Model<'env>,
        lmat: &'m InductanceMatrix<'m>,
        desc: TdDescriptor,
    ) -> Result<Self, Error> {
        let mut vec_ic = desc.init_currents
            .unwrap_or_else(|| ndarray::Array1::<f64>::zeros(model.nelems));
        if vec_ic.len() != model.nelems {
            return Err(Error::BadInit {
                array_name: "Element current".to_string(),
                input_length: vec_ic.len(),
                expected_length: model.nelems,
            })
        }

        let hodlr = if lmat.hodlr { lmat.ptr } else { ptr::null_mut() };
        let mut state = ptr::null_mut();
        let mut error: ErrorBuffer = [0; OFT_ERROR_SLEN];
        unsafe {
            (model.lib.td_init)(
                model.tw, desc.direct, desc.delta_t, desc.lin_tol, desc.timestep_cn,
                desc.status_freq, desc.plot_freq, vec_ic.as_mut_ptr() as *mut c_void,
                false, &mut state, ptr::null_mut(), hodlr, error.as_mut_ptr(),
            );
        }
        check("thincurr_td_init", &error)?;
        log::debug!("time-domain session started (dt = {:e} s)", desc.delta_t);

        Ok(Self {
            lib: Arc::clone(&model.lib),
            state,
            nelems: model.nelems,
            ncoils: model.ncoils,
            _model: PhantomData,
        })
    }

    /// Ends integration and returns the final element currents.
    pub fn finalize(mut self) -> Result<ndarray::Array1<f64>, Error> {
        self.finish()
    }

    fn finish(&mut self) -> Result<ndarray::Array1<f64>, Error> {
        let mut vec_out = ndarray::Array1::<f64>::zeros(self.nelems);
        let mut error: ErrorBuffer = [0; OFT_ERROR_SLEN];
        unsafe {
            (self.lib.td_finalize)(
                self.state, vec_out.as_mut_ptr() as *mut c_void, error.as_mut_ptr(),
            );
        }
        self.state = ptr::null_mut();
        check("thincurr_td_finalize", &error)?;

        Ok(vec_out)
    }
}

impl Stepper for TdSession<'_> {
    #[inline]
    fn ncoils(&self) -> usize {
        self.ncoils
    }

    fn advance(&mut self, desc: StepDescriptor) -> Result<(), Error> {
        desc.check_coils(self.ncoils)?;

        let currents = desc.currents.as_standard_layout();
        let rates = desc.rates.as_standard_layout();
        let mut error: ErrorBuffer = [0; OFT_ERROR_SLEN];
        unsafe {
            (self.lib.td_step)(
                self.state, self.ncoils as i32, currents.as_ptr(), rates.as_ptr(),
                0, ptr::null(), false, ptr::null_mut(), error.as_mut_ptr(),
            );
        }
        check("thincurr_td_step", &error)
    }
}

impl Drop for TdSession<'_> {
    fn drop(&mut self) {
        if !self.state.is_null() {
            if let Err(e) = self.finish() {
                log::warn!("error finalizing time-domain session: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str) -> ErrorBuffer {
        let mut buffer: ErrorBuffer = [0; OFT_ERROR_SLEN];
        for (slot, byte) in buffer.iter_mut().zip(text.bytes()) {
            *slot = byte as c_char;
        }
        buffer
    }

    #[test]
    fn empty_buffer_is_success() {
        assert!(check("thincurr_setup", &buffer("")).is_ok());
    }

    #[test]
    fn blank_padding_is_success() {
        // space-padded up to a trailing terminator
        let mut padded: ErrorBuffer = [b' ' as c_char; OFT_ERROR_SLEN];
        padded[OFT_ERROR_SLEN - 1] = 0;
        assert!(check("thincurr_setup", &padded).is_ok());

        // no terminator at all
        let unterminated: ErrorBuffer = [b' ' as c_char; OFT_ERROR_SLEN];
        assert!(check("thincurr_setup", &unterminated).is_ok());
    }

    #[test]
    fn message_becomes_solver_error() {
        match check("thincurr_setup", &buffer("bad mesh   ")) {
            Err(Error::Solver { call, message }) => {
                assert_eq!(call, "thincurr_setup");
                assert_eq!(message, "bad mesh");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn text_after_terminator_is_ignored() {
        let mut stale = buffer("old failure");
        stale[0] = 0;
        assert!(check("thincurr_td_step", &stale).is_ok());
    }
}
