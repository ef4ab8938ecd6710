//! This module describes the graphs we compute a kernel vector for.
//!
//! A graph has nodes indexed from 0, each node carrying a fixed length vector of real attributes,
//! and a list of directed edges. An undirected edge must be present in both directions, as (u,v) and (v,u).
//! The order of edges matters: it breaks ties in the persistence sweep.
//!
//! A graph can be built from rows of attributes, from an ndarray or from a petgraph Graph
//! whose node weight is the attribute vector.

use ndarray::Array2;

use petgraph::graph::{Graph, IndexType};
use petgraph::visit::EdgeRef;
use petgraph::EdgeType;

use super::error::KernelError;

#[derive(Clone, Debug)]
pub struct AttributedGraph {
    /// one row per node
    attributes: Array2<f64>,
    /// directed edges (src, dst)
    edges: Vec<(usize, usize)>,
} // end of AttributedGraph


impl AttributedGraph {
    /// edges are not checked here, see [validate_dataset]
    pub fn new(attributes: Array2<f64>, edges: Vec<(usize, usize)>) -> Self {
        AttributedGraph { attributes, edges }
    }

    /// builds a graph from attribute rows. All rows must have the same length,
    /// otherwise a [KernelError::MalformedGraph] is returned.
    pub fn from_rows(rows: &[Vec<f64>], edges: Vec<(usize, usize)>) -> Result<Self, KernelError> {
        let arity = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::<f64>::with_capacity(rows.len() * arity);
        for (node, row) in rows.iter().enumerate() {
            if row.len() != arity {
                return Err(KernelError::MalformedGraph(format!(
                    "node {} has {} attributes, expected {}",
                    node,
                    row.len(),
                    arity
                )));
            }
            data.extend_from_slice(row);
        }
        let attributes = Array2::from_shape_vec((rows.len(), arity), data)
            .map_err(|e| KernelError::MalformedGraph(format!("{}", e)))?;
        Ok(AttributedGraph { attributes, edges })
    } // end of from_rows

    /// Converts a petgraph Graph whose node weight is the attribute vector.
    /// For an undirected graph each edge gives (u,v) and then (v,u), a directed graph gives its edges as they are.
    pub fn from_petgraph<E, Ty, Ix>(graph: &Graph<Vec<f64>, E, Ty, Ix>) -> Result<Self, KernelError>
    where
        Ty: EdgeType,
        Ix: IndexType,
    {
        let rows: Vec<Vec<f64>> = graph.raw_nodes().iter().map(|n| n.weight.clone()).collect();
        let nb_directed = if graph.is_directed() { graph.edge_count() } else { 2 * graph.edge_count() };
        let mut edges = Vec::<(usize, usize)>::with_capacity(nb_directed);
        for e in graph.edge_references() {
            let (src, dst) = (e.source().index(), e.target().index());
            edges.push((src, dst));
            if !graph.is_directed() {
                edges.push((dst, src));
            }
        }
        AttributedGraph::from_rows(&rows, edges)
    } // end of from_petgraph

    /// number of nodes
    pub fn get_nb_nodes(&self) -> usize {
        self.attributes.nrows()
    }

    /// number of directed edges
    pub fn get_nb_edges(&self) -> usize {
        self.edges.len()
    }

    /// length of attribute vectors
    pub fn get_arity(&self) -> usize {
        self.attributes.ncols()
    }

    pub fn get_edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn get_attributes(&self) -> &Array2<f64> {
        &self.attributes
    }

    /// copy of the attributes of a node
    pub fn get_node_attributes(&self, node: usize) -> Vec<f64> {
        self.attributes.row(node).to_vec()
    }

    /// For each node the labels of nodes having an edge directed into it, in edge order.
    pub(crate) fn incoming_labels(&self, labels: &[usize]) -> Vec<Vec<usize>> {
        let mut messages: Vec<Vec<usize>> = (0..self.get_nb_nodes()).map(|_| Vec::new()).collect();
        for &(src, dst) in &self.edges {
            messages[dst].push(labels[src]);
        }
        messages
    }
} // end of impl AttributedGraph


/// Checks all graphs before computation : same arity for all nodes of all graphs,
/// edge extremities in node range.
/// Graphs without nodes do not constrain arity.
/// Returns the arity of attributes.
pub fn validate_dataset(graphs: &[AttributedGraph]) -> Result<usize, KernelError> {
    let mut arity: Option<usize> = None;
    for (rank, graph) in graphs.iter().enumerate() {
        let nb_nodes = graph.get_nb_nodes();
        if nb_nodes > 0 {
            match arity {
                None => arity = Some(graph.get_arity()),
                Some(a) if a != graph.get_arity() => {
                    return Err(KernelError::shape(
                        rank,
                        format!("attributes have arity {}, expected {}", graph.get_arity(), a),
                    ));
                }
                _ => {}
            }
        }
        if let Some((e, &(src, dst))) = graph
            .get_edges()
            .iter()
            .enumerate()
            .find(|(_, edge)| edge.0 >= nb_nodes || edge.1 >= nb_nodes)
        {
            return Err(KernelError::shape(
                rank,
                format!("edge {} ({},{}) out of node range, nb nodes {}", e, src, dst, nb_nodes),
            ));
        }
    }
    log::debug!("validate_dataset : {} graphs, arity {:?}", graphs.len(), arity);
    Ok(arity.unwrap_or(0))
} // end of validate_dataset


// end of mod tests
