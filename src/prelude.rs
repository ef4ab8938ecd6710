//! To ease access to most frequently items
//!


pub use crate::io::csv::*;

pub use crate::kernel::*;

pub use crate::gkernel::error::KernelError;
pub use crate::gkernel::params::*;
pub use crate::gkernel::pgraph::{validate_dataset, AttributedGraph};
pub use crate::gkernel::pwl::PwlKernel;
