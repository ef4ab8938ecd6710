//! Describes the kernel computed on a collection of graphs.
//!
//! The kernel is a sparse matrix stored in compressed row storage (crate sprs), one row per graph in input order.
//! All graphs share the same dimension, so rows can be selected by index set (train, validation, test)
//! and given to a classifier.
//!
//! The trait [GraphKernelT] is satisfied by something transforming a collection of graphs into a [KernelMatrix].

use ndarray::Array1;
use sprs::{CsMatI, TriMatI};

use crate::gkernel::error::KernelError;
use crate::gkernel::params::KernelMode;
use crate::gkernel::pgraph::AttributedGraph;

/// The feature matrix of a collection of graphs
#[derive(Clone, Debug)]
pub struct KernelMatrix {
    /// csr matrix (nb graphs, dimension)
    matrix: CsMatI<f64, usize>,
    /// number of labels at the end of each round
    round_dims: Vec<usize>,
    /// mode used to compute the matrix
    mode: KernelMode,
} // end of KernelMatrix


impl KernelMatrix {
    pub(crate) fn new(matrix: CsMatI<f64, usize>, round_dims: Vec<usize>, mode: KernelMode) -> Self {
        assert!(matrix.is_csr());
        KernelMatrix { matrix, round_dims, mode }
    }

    /// the sparse matrix
    pub fn get_matrix(&self) -> &CsMatI<f64, usize> {
        &self.matrix
    }

    /// consumes self and returns the matrix
    pub fn into_matrix(self) -> CsMatI<f64, usize> {
        self.matrix
    }

    /// number of rows
    pub fn get_nb_graphs(&self) -> usize {
        self.matrix.rows()
    }

    /// number of columns, twice the number of labels in node+cycle mode
    pub fn get_dimension(&self) -> usize {
        self.matrix.cols()
    }

    /// total number of distinct labels produced
    pub fn get_nb_labels(&self) -> usize {
        self.round_dims.iter().copied().max().unwrap_or(0)
    }

    /// number of labels allocated at the end of each round
    pub fn get_round_dims(&self) -> &[usize] {
        &self.round_dims
    }

    pub fn get_mode(&self) -> KernelMode {
        self.mode
    }

    /// number of non null entries
    pub fn get_nnz(&self) -> usize {
        self.matrix.nnz()
    }

    /// dense copy of the row of a graph
    pub fn get_graph_vector(&self, graph: usize) -> Option<Array1<f64>> {
        let row = self.matrix.outer_view(graph)?;
        let mut dense = Array1::<f64>::zeros(self.get_dimension());
        for (j, v) in row.iter() {
            dense[j] = *v;
        }
        Some(dense)
    }

    /// Returns the rows given by indices, in the order of indices. Indices can be repeated.
    /// An index not less than the number of graphs gives a [KernelError::RowIndex].
    pub fn select_rows(&self, indices: &[usize]) -> Result<CsMatI<f64, usize>, KernelError> {
        let (mut rows, mut cols, mut values) = (Vec::<usize>::new(), Vec::<usize>::new(), Vec::<f64>::new());
        for (i, &graph) in indices.iter().enumerate() {
            let row = self.matrix.outer_view(graph).ok_or(KernelError::RowIndex {
                index: graph,
                nb_rows: self.get_nb_graphs(),
            })?;
            for (j, v) in row.iter() {
                rows.push(i);
                cols.push(j);
                values.push(*v);
            }
        }
        let trimat = TriMatI::<f64, usize>::from_triplets((indices.len(), self.get_dimension()), rows, cols, values);
        Ok(trimat.to_csr())
    } // end of select_rows
} // end of impl KernelMatrix


/// Something computing a kernel vector for each graph of a collection.
pub trait GraphKernelT {
    ///
    fn transform(&mut self, graphs: &[AttributedGraph]) -> Result<KernelMatrix, KernelError>;
} // end of trait GraphKernelT


// end of mod tests
