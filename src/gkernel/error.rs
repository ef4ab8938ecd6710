//! Errors raised by the kernel computation.
//!
//! All errors are fatal: configuration is checked before any computation starts and
//! the dataset is checked before the first round. No partial result is returned.

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum KernelError {
    /// a parameter is out of its domain (rounds, exponent, tau, block size, mode)
    #[error("configuration error : {0}")]
    Configuration(String),
    /// the dataset does not have the expected shape
    #[error("input shape error in graph {graph} : {msg}")]
    InputShape {
        /// rank of the first offending graph in the dataset
        graph: usize,
        msg: String,
    },
    /// a single graph cannot be built from its attribute rows
    #[error("malformed graph : {0}")]
    MalformedGraph(String),
    /// a row selection asks for a graph the kernel does not have
    #[error("row index {index} out of range, kernel has {nb_rows} rows")]
    RowIndex { index: usize, nb_rows: usize },
    /// an allocation for the feature matrix could not be satisfied
    #[error("resource exhaustion : {0}")]
    ResourceExhaustion(String),
} // end of KernelError


impl KernelError {
    pub(crate) fn config<S: Into<String>>(msg: S) -> Self {
        KernelError::Configuration(msg.into())
    }

    pub(crate) fn shape<S: Into<String>>(graph: usize, msg: S) -> Self {
        KernelError::InputShape { graph, msg: msg.into() }
    }
} // end of impl KernelError
