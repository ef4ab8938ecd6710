//! Kernel parameters
//!
//! All parameters are checked once by [PwlParams::validate] before any computation.

use std::str::FromStr;

use super::error::KernelError;

/// default number of graphs aggregated in a row block of the kernel matrix
pub const DEFAULT_BLOCK_SIZE: usize = 1000;

/// Selects which persistence values go into the feature vector of a graph.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KernelMode {
    /// only node persistence, feature dimension is the number of labels
    NodeOnly,
    /// node persistence and cycle persistence, feature dimension is twice the number of labels
    NodeCycle,
} // end of KernelMode


impl KernelMode {
    /// returns true if cycle closing edges contribute to the features
    pub fn has_cycles(&self) -> bool {
        matches!(self, KernelMode::NodeCycle)
    }
}

impl FromStr for KernelMode {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pwl" | "node-only" => Ok(KernelMode::NodeOnly),
            "pwlc" | "node+cycle" => Ok(KernelMode::NodeCycle),
            _ => Err(KernelError::config(format!(
                "unknown mode {:?}, expecting pwl (node-only) or pwlc (node+cycle)",
                s
            ))),
        }
    }
} // end of impl FromStr for KernelMode


#[derive(Debug, Copy, Clone)]
pub struct PwlParams {
    /// number of labelling rounds H. Round 0 is the initial labelling, so H-1 refinements are done.
    pub nb_rounds: usize,
    /// exponent of the L^p distance between neighbourhoods, also used to aggregate persistence values
    pub p: f64,
    /// weight of an edge joining two nodes with the same label
    pub tau: f64,
    /// node-only or node+cycle
    pub mode: KernelMode,
    /// number of graphs aggregated in a dense block before sparsification
    pub block_size: usize,
    /// parallel mode
    pub parallel: bool,
} // end of PwlParams


impl PwlParams {
    pub fn new(nb_rounds: usize, p: f64, tau: f64, mode: KernelMode) -> Self {
        PwlParams {
            nb_rounds,
            p,
            tau,
            mode,
            block_size: DEFAULT_BLOCK_SIZE,
            parallel: false,
        }
    }

    ///
    pub fn get_nb_rounds(&self) -> usize {
        self.nb_rounds
    }

    ///
    pub fn get_p(&self) -> f64 {
        self.p
    }

    ///
    pub fn get_tau(&self) -> f64 {
        self.tau
    }

    ///
    pub fn get_mode(&self) -> KernelMode {
        self.mode
    }

    /// number of rows of a dense aggregation block
    pub fn get_block_size(&self) -> usize {
        self.block_size
    }

    ///
    pub fn get_parallel(&self) -> bool {
        self.parallel
    }

    /// block size has no effect on the result, only on peak memory : one dense block of
    /// block_size x nb columns f64 is alive at a time, also in parallel mode.
    pub fn set_block_size(&mut self, block_size: usize) {
        self.block_size = block_size
    }

    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel
    }

    /// checks domains of all parameters
    pub fn validate(&self) -> Result<(), KernelError> {
        if self.nb_rounds == 0 {
            return Err(KernelError::config("number of rounds must be at least 1"));
        }
        if !(self.p.is_finite() && self.p > 0.) {
            return Err(KernelError::config(format!("exponent p must be a positive real, got {}", self.p)));
        }
        if !(self.tau.is_finite() && self.tau > 0.) {
            return Err(KernelError::config(format!("tau must be a positive real, got {}", self.tau)));
        }
        if self.block_size == 0 {
            return Err(KernelError::config("block size must be at least 1"));
        }
        Ok(())
    } // end of validate
} // end of impl PwlParams


impl Default for PwlParams {
    fn default() -> Self {
        PwlParams::new(2, 2., 1., KernelMode::NodeOnly)
    }
}


// end of mod tests
