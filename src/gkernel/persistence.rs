//! Edge weight filtration.
//!
//! Edges of a graph are swept by increasing weight (ties broken by edge order).
//! The first edge touching a node gives the birth weight of this node.
//! An edge whose extremities were both already touched, and whose reverse edge did not give a birth, is a cycle closing edge
//! and its weight is recorded.
//!
//! No union-find is done : an edge joining two touched nodes of different components is also recorded as cycle closing.

use indexmap::{IndexMap, IndexSet};

use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

use super::pgraph::AttributedGraph;
use super::refine::RefinedRound;

/// node -> birth weight
pub type PersistenceMap = IndexMap<usize, f64, ahash::RandomState>;

/// cycle closing edge (src, dst) -> weight
pub type CyclePersistenceMap = IndexMap<(usize, usize), f64, ahash::RandomState>;

/// persistence of one graph at one round
#[derive(Clone, Debug, Default)]
pub struct GraphPersistence {
    nodes: PersistenceMap,
    cycles: CyclePersistenceMap,
} // end of GraphPersistence


impl GraphPersistence {
    /// birth weight of nodes
    pub fn get_node_persistence(&self) -> &PersistenceMap {
        &self.nodes
    }

    /// weight of cycle closing edges
    pub fn get_cycle_persistence(&self) -> &CyclePersistenceMap {
        &self.cycles
    }
} // end of impl GraphPersistence


/// Sweeps edges by increasing weight. weights\[e\] is the weight of edges\[e\].
pub fn extract_persistence(nb_nodes: usize, edges: &[(usize, usize)], weights: &[f64]) -> GraphPersistence {
    assert_eq!(edges.len(), weights.len());
    // sort_by is stable, ties keep edge order
    let mut order: Vec<usize> = (0..edges.len()).collect();
    order.sort_by(|&i, &j| weights[i].total_cmp(&weights[j]));
    //
    let mut persistence = GraphPersistence::default();
    let mut visited = vec![false; nb_nodes];
    let mut spanning = IndexSet::<(usize, usize), ahash::RandomState>::default();
    for e in order {
        let (src, dst) = edges[e];
        let w = weights[e];
        let (src_seen, dst_seen) = (visited[src], visited[dst]);
        if !dst_seen {
            persistence.nodes.entry(dst).or_insert(w);
            spanning.insert((src, dst));
        }
        if !src_seen {
            persistence.nodes.entry(src).or_insert(w);
            spanning.insert((src, dst));
        }
        if src_seen && dst_seen && !spanning.contains(&(dst, src)) {
            log::trace!("cycle closing edge ({},{}) weight {:.3e}", src, dst, w);
            persistence.cycles.insert((src, dst), w);
        }
        visited[src] = true;
        visited[dst] = true;
    }
    persistence
} // end of extract_persistence


/// persistence of all graphs at one round
#[derive(Clone, Debug)]
pub struct RoundPersistence {
    graphs: Vec<GraphPersistence>,
} // end of RoundPersistence


impl RoundPersistence {
    pub fn get_graph(&self, graph: usize) -> &GraphPersistence {
        &self.graphs[graph]
    }

    pub fn get_nb_graphs(&self) -> usize {
        self.graphs.len()
    }
} // end of impl RoundPersistence


/// Persistence of all graphs for a round. Graphs are independent, parallel mode uses rayon.
pub fn round_persistence(graphs: &[AttributedGraph], round: &RefinedRound, parallel: bool) -> RoundPersistence {
    assert_eq!(graphs.len(), round.get_nb_graphs());
    let treat_graph = |(rank, graph): (usize, &AttributedGraph)| {
        extract_persistence(graph.get_nb_nodes(), graph.get_edges(), round.get_weights(rank))
    };
    let graphs = if parallel {
        graphs.par_iter().enumerate().map(treat_graph).collect()
    } else {
        graphs.iter().enumerate().map(treat_graph).collect()
    };
    RoundPersistence { graphs }
} // end of round_persistence


// end of mod tests
