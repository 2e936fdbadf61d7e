use std::ffi::{c_char, c_void};
use std::path::Path;
use std::sync::Arc;

use libloading::Library;

use crate::Error;

/// `void oftpy_init(int32_t nthreads, const char* ifile, int32_t* slens, void* abort_callback)`
pub type OftpyInitFn = unsafe extern "C" fn(
    nthreads: i32,
    ifile: *const c_char,
    slens: *mut i32,
    abort_callback: *mut c_void,
);

/// `void oftpy_load_xml(const char* xml_file, void** oft_node_ptr)`
pub type OftpyLoadXmlFn = unsafe extern "C" fn(
    xml_file: *const c_char,
    oft_node_ptr: *mut *mut c_void,
);

pub type ThincurrSetupFn = unsafe extern "C" fn(
    mesh_file: *const c_char,
    np: i32,
    r_loc: *mut c_void,
    nc: i32,
    lc_loc: *mut c_void,
    reg_loc: *mut c_void,
    pmap_loc: *mut c_void,
    jumper_start_in: i32,
    tw_ptr: *mut *mut c_void,
    sizes: *mut i32,
    error_str: *mut c_char,
    xml_ptr: *mut c_void,
);

pub type ThincurrSetupIoFn = unsafe extern "C" fn(
    tw_ptr: *mut c_void,
    basepath: *const c_char,
    save_debug: bool,
    legacy_hdf5: bool,
    error_str: *mut c_char,
);

pub type ThincurrMcoilFn = unsafe extern "C" fn(
    tw_ptr: *mut c_void,
    mc_ptr: *mut *mut c_void,
    cache_file: *const c_char,
    error_str: *mut c_char,
);

pub type ThincurrLmatFn = unsafe extern "C" fn(
    tw_ptr: *mut c_void,
    use_hodlr: bool,
    lmat_ptr: *mut *mut c_void,
    cache_file: *const c_char,
    error_str: *mut c_char,
);

pub type ThincurrRmatFn = unsafe extern "C" fn(
    tw_ptr: *mut c_void,
    copy_out: bool,
    rmat: *mut c_void,
    error_str: *mut c_char,
);

pub type ThincurrTdInitFn = unsafe extern "C" fn(
    tw_ptr: *mut c_void,
    direct: bool,
    dt: f64,
    lin_tol: f64,
    timestep_cn: bool,
    status_freq: i32,
    plot_freq: i32,
    vec_ic: *mut c_void,
    volt_full: bool,
    td_state_ptr: *mut *mut c_void,
    sensor_ptr: *mut c_void,
    hodlr_ptr: *mut c_void,
    error_str: *mut c_char,
);

pub type ThincurrTdStepFn = unsafe extern "C" fn(
    td_state_ptr: *mut c_void,
    ncurr: i32,
    icoil_curr: *const f64,
    icoil_dcurr: *const f64,
    nvolt: i32,
    pcoil_volt: *const f64,
    volt_full: bool,
    sensor_vals_ptr: *mut c_void,
    error_str: *mut c_char,
);

pub type ThincurrTdFinalizeFn = unsafe extern "C" fn(
    td_state_ptr: *mut c_void,
    vec_out: *mut c_void,
    error_str: *mut c_char,
);

/// Loaded ThinCurr library with extracted function pointers.
pub struct ThinCurrLibrary {
    // keeps the function pointers below valid
    #[allow(dead_code)]
    library: Library,
    pub path: String,
    pub(crate) oftpy_init: OftpyInitFn,
    pub(crate) oftpy_load_xml: OftpyLoadXmlFn,
    pub(crate) setup: ThincurrSetupFn,
    pub(crate) setup_io: ThincurrSetupIoFn,
    pub(crate) mcoil: ThincurrMcoilFn,
    pub(crate) lmat: ThincurrLmatFn,
    pub(crate) rmat: ThincurrRmatFn,
    pub(crate) td_init: ThincurrTdInitFn,
    pub(crate) td_step: ThincurrTdStepFn,
    pub(crate) td_finalize: ThincurrTdFinalizeFn,
}

impl ThinCurrLibrary {
    /// Loads the solver from a shared library file.
    ///
    /// # Safety
    ///
    /// The library's exported symbols must have the signatures declared in this
    /// module. Loading a library runs its initialization routines.
    pub unsafe fn load<P: AsRef<Path>>(path: P) -> Result<Arc<Self>, Error> {
        let path = path.as_ref();
        let library = Library::new(path)?;

        let oftpy_init = *library.get::<OftpyInitFn>(b"oftpy_init\0")?;
        let oftpy_load_xml = *library.get::<OftpyLoadXmlFn>(b"oftpy_load_xml\0")?;
        let setup = *library.get::<ThincurrSetupFn>(b"thincurr_setup\0")?;
        let setup_io = *library.get::<ThincurrSetupIoFn>(b"thincurr_setup_io\0")?;
        let mcoil = *library.get::<ThincurrMcoilFn>(b"thincurr_Mcoil\0")?;
        let lmat = *library.get::<ThincurrLmatFn>(b"thincurr_Lmat\0")?;
        let rmat = *library.get::<ThincurrRmatFn>(b"thincurr_Rmat\0")?;
        let td_init = *library.get::<ThincurrTdInitFn>(b"thincurr_td_init\0")?;
        let td_step = *library.get::<ThincurrTdStepFn>(b"thincurr_td_step\0")?;
        let td_finalize = *library.get::<ThincurrTdFinalizeFn>(b"thincurr_td_finalize\0")?;

        log::info!("loaded ThinCurr library from {}", path.display());

        Ok(Arc::new(Self {
            library,
            path: path.display().to_string(),
            oftpy_init,
            oftpy_load_xml,
            setup,
            setup_io,
            mcoil,
            lmat,
            rmat,
            td_init,
            td_step,
            td_finalize,
        }))
    }
}
