//! Aggregation of persistence values into the kernel matrix.
//!
//! The row of a graph sums, over rounds and nodes, persistence^p in the column given by the round label of the node.
//! In node+cycle mode the weight of a cycle closing edge (src,dst) adds persistence^p to column dim + label(src).
//!
//! Rows are computed in dense blocks of block_size graphs, each block is sparsified before the next one is allocated
//! then blocks are stacked. In parallel mode the rows of a block are filled concurrently, so peak memory stays
//! at one dense block of block_size x nb columns.
//! The block size only bounds memory, the matrix does not depend on it.

use ndarray::parallel::prelude::*;
use ndarray::{Array2, ArrayViewMut1, Axis};
use sprs::{CsMatI, TriMatI};

use super::error::KernelError;
use super::params::PwlParams;
use super::persistence::RoundPersistence;
use super::pgraph::AttributedGraph;
use super::refine::RefinedRound;

/// number of labels over all rounds. Columns of the kernel are twice this in node+cycle mode.
pub fn get_label_dimension(rounds: &[RefinedRound]) -> usize {
    rounds.iter().map(|r| r.get_nb_labels()).max().unwrap_or(0)
}

// dense zeroed block, reporting allocation failure instead of aborting
fn allocate_block(nb_rows: usize, nb_cols: usize) -> Result<Array2<f64>, KernelError> {
    let size = nb_rows.checked_mul(nb_cols).ok_or_else(|| {
        KernelError::ResourceExhaustion(format!("block of {} x {} overflows", nb_rows, nb_cols))
    })?;
    let mut data = Vec::<f64>::new();
    data.try_reserve_exact(size).map_err(|e| {
        KernelError::ResourceExhaustion(format!("cannot allocate block of {} x {} : {}", nb_rows, nb_cols, e))
    })?;
    data.resize(size, 0.);
    Array2::from_shape_vec((nb_rows, nb_cols), data).map_err(|e| KernelError::ResourceExhaustion(format!("{}", e)))
} // end of allocate_block


// adds the contributions of graph of rank g to its row
fn fill_row(
    mut row: ArrayViewMut1<f64>,
    g: usize,
    graph: &AttributedGraph,
    rounds: &[RefinedRound],
    persistence: &[RoundPersistence],
    dim: usize,
    p: f64,
    cycles: bool,
) {
    for (round, r_persistence) in rounds.iter().zip(persistence) {
        let labels = round.get_labels(g);
        let g_persistence = r_persistence.get_graph(g);
        let nodes = g_persistence.get_node_persistence();
        for (node, label) in labels.iter().enumerate() {
            if let Some(w) = nodes.get(&node) {
                row[*label] += w.powf(p);
            }
        }
        if cycles {
            // one contribution per occurrence of the edge in the edge list, column given by the source label
            let cycle_map = g_persistence.get_cycle_persistence();
            for edge in graph.get_edges() {
                if let Some(w) = cycle_map.get(edge) {
                    row[dim + labels[edge.0]] += w.powf(p);
                }
            }
        }
    }
} // end of fill_row


// rows first..last of the kernel
fn aggregate_block(
    first: usize,
    last: usize,
    graphs: &[AttributedGraph],
    rounds: &[RefinedRound],
    persistence: &[RoundPersistence],
    dim: usize,
    params: &PwlParams,
) -> Result<CsMatI<f64, usize>, KernelError> {
    let p = params.get_p();
    let cycles = params.get_mode().has_cycles();
    let nb_cols = if cycles { 2 * dim } else { dim };
    let mut block = allocate_block(last - first, nb_cols)?;
    if params.get_parallel() {
        block
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(i, row)| fill_row(row, first + i, &graphs[first + i], rounds, persistence, dim, p, cycles));
    } else {
        for (i, row) in block.axis_iter_mut(Axis(0)).enumerate() {
            fill_row(row, first + i, &graphs[first + i], rounds, persistence, dim, p, cycles);
        }
    }
    // sparsify
    let (mut rows, mut cols, mut values) = (Vec::<usize>::new(), Vec::<usize>::new(), Vec::<f64>::new());
    for ((i, j), v) in block.indexed_iter() {
        if *v != 0. {
            rows.push(i);
            cols.push(j);
            values.push(*v);
        }
    }
    log::trace!("aggregate_block rows {}..{} nnz {}", first, last, values.len());
    let trimat = TriMatI::<f64, usize>::from_triplets((last - first, nb_cols), rows, cols, values);
    Ok(trimat.to_csr())
} // end of aggregate_block


/// Computes the kernel matrix, one row per graph in input order.
/// rounds and persistence must have been computed on graphs.
pub fn aggregate(
    graphs: &[AttributedGraph],
    rounds: &[RefinedRound],
    persistence: &[RoundPersistence],
    params: &PwlParams,
) -> Result<CsMatI<f64, usize>, KernelError> {
    assert_eq!(rounds.len(), persistence.len());
    let dim = get_label_dimension(rounds);
    let nb_cols = if params.get_mode().has_cycles() { 2 * dim } else { dim };
    let nb_graphs = graphs.len();
    if nb_graphs == 0 {
        return Ok(CsMatI::<f64, usize>::zero((0, nb_cols)));
    }
    let block_size = params.get_block_size();
    let nb_blocks = (nb_graphs + block_size - 1) / block_size;
    log::debug!("aggregate : nb graphs {}, nb columns {}, nb blocks {}", nb_graphs, nb_cols, nb_blocks);
    let mut blocks = Vec::<CsMatI<f64, usize>>::with_capacity(nb_blocks);
    for b in 0..nb_blocks {
        let first = b * block_size;
        let last = nb_graphs.min(first + block_size);
        blocks.push(aggregate_block(first, last, graphs, rounds, persistence, dim, params)?);
    }
    let views: Vec<_> = blocks.iter().map(|b| b.view()).collect();
    let kernel = sprs::vstack(&views);
    log::debug!("aggregate : kernel shape {:?}, nnz {}", kernel.shape(), kernel.nnz());
    Ok(kernel)
} // end of aggregate


// end of mod tests
