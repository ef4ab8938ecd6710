//! Label refinement rounds.
//!
//! Round 0 labels nodes by their attributes, an edge gets weight tau between equal labels and 1+tau otherwise.
//! Each following round relabels a node by its previous label and the sorted multiset of labels of its
//! incoming neighbours (Weisfeiler-Lehman relabelling) and weights an edge by the distance between the neighbourhoods
//! of its extremities, see [d_l].
//!
//! Rounds are sequential, graphs inside a round are independent. In parallel mode the keys and weights of
//! graphs are computed with rayon, then keys are interned sequentially in graph and node order,
//! so labels do not depend on the parallel mode.

use indexmap::IndexMap;

use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

use super::idmap::{LabelDictionary, LabelKey, NodeLabel};
use super::params::PwlParams;
use super::pgraph::AttributedGraph;

/// The result of a labelling round for all graphs.
#[derive(Clone, Debug)]
pub struct RefinedRound {
    /// for each graph, label of each node
    labels: Vec<Vec<NodeLabel>>,
    /// for each graph, weight of each directed edge, in edge order
    weights: Vec<Vec<f64>>,
    /// number of labels allocated in the dictionary at the end of the round
    nb_labels: usize,
} // end of RefinedRound


impl RefinedRound {
    /// labels of nodes of graph of rank graph
    pub fn get_labels(&self, graph: usize) -> &[NodeLabel] {
        &self.labels[graph]
    }

    /// edge weights of graph of rank graph
    pub fn get_weights(&self, graph: usize) -> &[f64] {
        &self.weights[graph]
    }

    /// number of graphs
    pub fn get_nb_graphs(&self) -> usize {
        self.labels.len()
    }

    /// number of labels allocated up to the end of this round
    pub fn get_nb_labels(&self) -> usize {
        self.nb_labels
    }
} // end of impl RefinedRound


#[cfg_attr(doc, katexit::katexit)]
/// Distance between the labelled neighbourhoods of two nodes.
///
/// A signed multiplicity is attached to labels : +1 for $a$ and -1 for $b$ if $a \ne b$,
/// +1 for each occurrence of a label in $S$, -1 for each occurrence in $T$.
/// The distance is the $L^p$ norm of multiplicities $$ d_M = (\sum_l |m_l|^p)^{1/p} $$
/// Equal labels with equal multisets give exactly 0.
pub fn d_m(a: NodeLabel, b: NodeLabel, s: &[NodeLabel], t: &[NodeLabel], p: f64) -> f64 {
    // insertion order fixes the order of the floating point sum
    let mut diff = IndexMap::<NodeLabel, i64, ahash::RandomState>::default();
    if a != b {
        diff.insert(a, 1);
        diff.insert(b, -1);
    }
    for l in s {
        *diff.entry(*l).or_insert(0) += 1;
    }
    for l in t {
        *diff.entry(*l).or_insert(0) -= 1;
    }
    let distance: f64 = diff.values().map(|m| (m.unsigned_abs() as f64).powf(p)).sum();
    distance.powf(1. / p)
} // end of d_m


/// Weight of edge (a,b) : d_m + tau if labels are equal, 1 + d_m + tau otherwise.
pub fn d_l(a: NodeLabel, b: NodeLabel, s: &[NodeLabel], t: &[NodeLabel], p: f64, tau: f64) -> f64 {
    if a == b {
        d_m(a, b, s, t, p) + tau
    } else {
        1. + d_m(a, b, s, t, p) + tau
    }
} // end of d_l


/// Round 0. Labels come from attributes, an edge weighs tau if its extremities have the same label, 1+tau otherwise.
/// Graphs must have been validated.
pub fn initial_labeling(graphs: &[AttributedGraph], dictionary: &mut LabelDictionary, params: &PwlParams) -> RefinedRound {
    let tau = params.get_tau();
    let mut labels = Vec::<Vec<NodeLabel>>::with_capacity(graphs.len());
    let mut weights = Vec::<Vec<f64>>::with_capacity(graphs.len());
    for graph in graphs {
        let g_labels: Vec<NodeLabel> = graph
            .get_attributes()
            .rows()
            .into_iter()
            .map(|row| dictionary.intern_raw(row.iter()))
            .collect();
        let g_weights: Vec<f64> = graph
            .get_edges()
            .iter()
            .map(|&(src, dst)| if g_labels[src] == g_labels[dst] { tau } else { 1. + tau })
            .collect();
        labels.push(g_labels);
        weights.push(g_weights);
    }
    log::debug!("initial_labeling : nb labels {}", dictionary.get_nb_labels());
    RefinedRound {
        labels,
        weights,
        nb_labels: dictionary.get_nb_labels(),
    }
} // end of initial_labeling


// keys and weights of one graph, computed without touching the dictionary
fn refine_graph(graph: &AttributedGraph, labels: &[NodeLabel], p: f64, tau: f64) -> (Vec<LabelKey>, Vec<f64>) {
    let mut messages = graph.incoming_labels(labels);
    // weights use neighbourhoods in edge order, before sorting
    let weights = graph
        .get_edges()
        .iter()
        .map(|&(src, dst)| d_l(labels[src], labels[dst], &messages[src], &messages[dst], p, tau))
        .collect();
    let keys = messages
        .iter_mut()
        .zip(labels)
        .map(|(message, &label)| {
            message.sort_unstable();
            LabelKey::refined(label, std::mem::take(message))
        })
        .collect();
    log::trace!("refine_graph nb nodes {} nb edges {}", graph.get_nb_nodes(), graph.get_nb_edges());
    (keys, weights)
} // end of refine_graph


/// One refinement round from previous round labels.
pub fn refine(
    graphs: &[AttributedGraph],
    previous: &RefinedRound,
    dictionary: &mut LabelDictionary,
    params: &PwlParams,
) -> RefinedRound {
    assert_eq!(graphs.len(), previous.get_nb_graphs());
    let (p, tau) = (params.get_p(), params.get_tau());
    let keyed: Vec<(Vec<LabelKey>, Vec<f64>)> = if params.get_parallel() {
        graphs
            .par_iter()
            .zip(previous.labels.par_iter())
            .map(|(graph, labels)| refine_graph(graph, labels, p, tau))
            .collect()
    } else {
        graphs
            .iter()
            .zip(previous.labels.iter())
            .map(|(graph, labels)| refine_graph(graph, labels, p, tau))
            .collect()
    };
    // single writer phase
    let mut labels = Vec::<Vec<NodeLabel>>::with_capacity(graphs.len());
    let mut weights = Vec::<Vec<f64>>::with_capacity(graphs.len());
    for (keys, g_weights) in keyed {
        labels.push(keys.into_iter().map(|key| dictionary.intern(key)).collect());
        weights.push(g_weights);
    }
    log::debug!("refine : nb labels {}", dictionary.get_nb_labels());
    RefinedRound {
        labels,
        weights,
        nb_labels: dictionary.get_nb_labels(),
    }
} // end of refine


#[cfg(test)]
mod tests {

    use super::*;

    use crate::gkernel::params::KernelMode;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    // a triangle of label A nodes with a pendant node of label B attached to node 0
    fn triangle_with_tail() -> AttributedGraph {
        let rows = vec![vec![1.], vec![1.], vec![1.], vec![2.]];
        let edges = vec![(0, 1), (1, 0), (1, 2), (2, 1), (2, 0), (0, 2), (0, 3), (3, 0)];
        AttributedGraph::from_rows(&rows, edges).unwrap()
    }

    #[test]
    fn test_d_m_cancellation() {
        log_init_test();
        //
        for p in [0.5, 1., 2., 3.7] {
            assert_eq!(d_m(4, 4, &[1, 2, 2, 7], &[2, 7, 1, 2], p), 0.);
            assert_eq!(d_m(0, 0, &[], &[], p), 0.);
        }
    } // end of test_d_m_cancellation

    #[test]
    fn test_d_m_values() {
        log_init_test();
        // a != b, no neighbours : multiplicities +1, -1
        assert!((d_m(0, 1, &[], &[], 2.) - 2f64.sqrt()).abs() < 1.0e-12);
        assert!((d_m(0, 1, &[], &[], 1.) - 2.).abs() < 1.0e-12);
        // neighbours cancel own labels
        assert_eq!(d_m(0, 1, &[1], &[0], 2.), 0.);
        // multiplicities 3 and -1 with p = 1
        assert!((d_m(5, 5, &[1, 1, 1], &[2], 1.) - 4.).abs() < 1.0e-12);
        // multiplicities 2 and -2 with p = 2
        assert!((d_m(5, 5, &[1, 1], &[2, 2], 2.) - 8f64.sqrt()).abs() < 1.0e-12);
    } // end of test_d_m_values

    #[test]
    fn test_d_l() {
        log_init_test();
        //
        assert_eq!(d_l(3, 3, &[1], &[1], 2., 0.5), 0.5);
        assert_eq!(d_l(0, 1, &[1], &[0], 2., 1.), 2.);
        let d = d_l(0, 1, &[], &[], 2., 1.);
        assert!((d - (2. + 2f64.sqrt())).abs() < 1.0e-12);
    } // end of test_d_l

    #[test]
    fn test_initial_weights() {
        log_init_test();
        //
        let params = PwlParams::new(2, 2., 0.25, KernelMode::NodeOnly);
        let graphs = vec![triangle_with_tail()];
        let mut dict = LabelDictionary::new();
        let round = initial_labeling(&graphs, &mut dict, &params);
        assert_eq!(round.get_labels(0), &[0, 0, 0, 1]);
        assert_eq!(round.get_nb_labels(), 2);
        let edges = graphs[0].get_edges();
        for (e, &(src, dst)) in edges.iter().enumerate() {
            let w = round.get_weights(0)[e];
            if round.get_labels(0)[src] == round.get_labels(0)[dst] {
                assert_eq!(w, 0.25);
            } else {
                assert_eq!(w, 1.25);
            }
        }
    } // end of test_initial_weights

    #[test]
    fn test_refine_triangle() {
        log_init_test();
        //
        let params = PwlParams::new(2, 1., 1., KernelMode::NodeOnly);
        let graphs = vec![triangle_with_tail()];
        let mut dict = LabelDictionary::new();
        let round0 = initial_labeling(&graphs, &mut dict, &params);
        let round1 = refine(&graphs, &round0, &mut dict, &params);
        // node 0 : (0, [0,0,1]), nodes 1 and 2 : (0, [0,0]), node 3 : (1, [0])
        let labels = round1.get_labels(0);
        assert_eq!(labels[1], labels[2]);
        assert_ne!(labels[0], labels[1]);
        assert_ne!(labels[3], labels[0]);
        assert!(labels.iter().all(|&l| l >= 2 && l < round1.get_nb_labels()));
        assert_eq!(round1.get_nb_labels(), 5);
        // edge (1,2) : same label, neighbourhoods [0,0] and [0,0] -> tau
        assert_eq!(round1.get_weights(0)[2], 1.);
        // edge (0,1) : same label 0, S = [0,0,1] T = [0,0], multiplicity of 1 is 1, p = 1 -> 1 + tau
        assert_eq!(round1.get_weights(0)[0], 2.);
        // edge (0,3) : labels 0,1 -> (+1 on 0, -1 on 1), S = [0,0,1] T = [0] -> {0: 2, 1: 0}, d_m = 2 -> 1 + 2 + 1
        assert_eq!(round1.get_weights(0)[6], 4.);
    } // end of test_refine_triangle

    #[test]
    fn test_isolated_node_keeps_label() {
        log_init_test();
        //
        let params = PwlParams::default();
        let g0 = AttributedGraph::from_rows(&[vec![1.], vec![2.]], vec![(0, 1), (1, 0)]).unwrap();
        let g1 = AttributedGraph::from_rows(&[vec![3.]], vec![]).unwrap();
        let graphs = vec![g0, g1];
        let mut dict = LabelDictionary::new();
        let round0 = initial_labeling(&graphs, &mut dict, &params);
        assert_eq!(round0.get_labels(1), &[2]);
        let round1 = refine(&graphs, &round0, &mut dict, &params);
        assert_eq!(round1.get_labels(1), &[2]);
        assert_eq!(round1.get_labels(0), &[3, 4]);
        assert_eq!(round1.get_nb_labels(), 5);
    } // end of test_isolated_node_keeps_label

    #[test]
    fn test_parallel_same_labels() {
        log_init_test();
        //
        let mut params = PwlParams::new(3, 2., 1., KernelMode::NodeOnly);
        let graphs: Vec<AttributedGraph> = (0..20)
            .map(|i| {
                let rows: Vec<Vec<f64>> = (0..5).map(|n| vec![((n * i) % 3) as f64]).collect();
                let mut edges = Vec::new();
                for n in 0..4 {
                    edges.push((n, n + 1));
                    edges.push((n + 1, n));
                }
                AttributedGraph::from_rows(&rows, edges).unwrap()
            })
            .collect();
        let run = |params: &PwlParams| {
            let mut dict = LabelDictionary::new();
            let round0 = initial_labeling(&graphs, &mut dict, params);
            let round1 = refine(&graphs, &round0, &mut dict, params);
            refine(&graphs, &round1, &mut dict, params)
        };
        let sequential = run(&params);
        params.set_parallel(true);
        let parallel = run(&params);
        assert_eq!(sequential.get_nb_labels(), parallel.get_nb_labels());
        for g in 0..graphs.len() {
            assert_eq!(sequential.get_labels(g), parallel.get_labels(g));
            assert_eq!(sequential.get_weights(g), parallel.get_weights(g));
        }
    } // end of test_parallel_same_labels
} // end of mod tests
