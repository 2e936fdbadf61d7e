//! Bindings to the ThinCurr eddy-current solver's C API.
//!
//! The solver is loaded from a shared library at runtime. Its opaque pointers are
//! wrapped in owned handles whose lifetimes tie each handle to the model it came
//! from, and a [`TdSession`] finalizes the solver's time-domain state when dropped.
//! A `TdSession` is a [`Stepper`](crate::Stepper), so it can be driven by a
//! [`Simulation`](crate::Simulation) like any other.

mod library;
mod session;

pub use library::ThinCurrLibrary;
pub use session::{
    CouplingMatrix, Environment, InductanceMatrix, Model, TdDescriptor, TdSession,
};

/// Length of the solver's error string buffers.
pub const OFT_ERROR_SLEN: usize = 512;
