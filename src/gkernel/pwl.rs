//! Persistent Weisfeiler-Lehman kernel.
//!
//! The computation chains :
//! 1. validation of parameters and dataset
//! 2. initial labelling and nb_rounds - 1 refinement rounds, see [refine](super::refine)
//! 3. persistence extraction for each round and graph, see [persistence](super::persistence)
//! 4. blocked aggregation into a sparse matrix, see [aggregate](super::aggregate)
//!
//! All rounds are computed before aggregation so the dimension of the matrix is known once.
//!
//! The method is described in :
//! Rieck, Bock, Borgwardt. A Persistent Weisfeiler-Lehman Procedure for Graph Classification. ICML 2019

use std::time::SystemTime;

use cpu_time::ProcessTime;

use super::aggregate::aggregate;
use super::error::KernelError;
use super::idmap::LabelDictionary;
use super::params::PwlParams;
use super::persistence::{round_persistence, RoundPersistence};
use super::pgraph::{validate_dataset, AttributedGraph};
use super::refine::{initial_labeling, refine, RefinedRound};

use crate::kernel::{GraphKernelT, KernelMatrix};

pub struct PwlKernel {
    params: PwlParams,
    /// label dictionary, grows along rounds. Kept after a transform for diagnostics.
    dictionary: LabelDictionary,
} // end of PwlKernel


impl PwlKernel {
    /// parameters are validated here.
    pub fn new(params: PwlParams) -> Result<Self, KernelError> {
        params.validate()?;
        Ok(PwlKernel {
            params,
            dictionary: LabelDictionary::new(),
        })
    }

    pub fn get_params(&self) -> &PwlParams {
        &self.params
    }

    /// dictionary as left by the last computation
    pub fn get_dictionary(&self) -> &LabelDictionary {
        &self.dictionary
    }

    /// Computes all labelling rounds. Each call starts from an empty dictionary.
    pub fn compute_rounds(&mut self, graphs: &[AttributedGraph]) -> Result<Vec<RefinedRound>, KernelError> {
        validate_dataset(graphs)?;
        self.dictionary = LabelDictionary::new();
        let nb_rounds = self.params.get_nb_rounds();
        let mut rounds = Vec::<RefinedRound>::with_capacity(nb_rounds);
        rounds.push(initial_labeling(graphs, &mut self.dictionary, &self.params));
        for h in 1..nb_rounds {
            let next = refine(graphs, &rounds[h - 1], &mut self.dictionary, &self.params);
            log::debug!("round {} nb labels {}", h, next.get_nb_labels());
            rounds.push(next);
        }
        Ok(rounds)
    } // end of compute_rounds

    /// the whole computation
    pub fn compute_kernel(&mut self, graphs: &[AttributedGraph]) -> Result<KernelMatrix, KernelError> {
        log::info!(
            "PwlKernel compute_kernel nb graphs {}, nb rounds {}, p {}, tau {}, mode {:?}",
            graphs.len(),
            self.params.get_nb_rounds(),
            self.params.get_p(),
            self.params.get_tau(),
            self.params.get_mode()
        );
        let cpu_start = ProcessTime::now();
        let sys_start = SystemTime::now();
        //
        let rounds = self.compute_rounds(graphs)?;
        log::info!(
            "labelling done, nb labels {}, sys time(ms) {:?} cpu time(ms) {:?}",
            self.dictionary.get_nb_labels(),
            sys_start.elapsed().unwrap_or_default().as_millis(),
            cpu_start.elapsed().as_millis()
        );
        let parallel = self.params.get_parallel();
        let persistence: Vec<RoundPersistence> =
            rounds.iter().map(|round| round_persistence(graphs, round, parallel)).collect();
        let matrix = aggregate(graphs, &rounds, &persistence, &self.params)?;
        log::info!(
            "kernel done, shape {:?} nnz {}, sys time(ms) {:?} cpu time(ms) {:?}",
            matrix.shape(),
            matrix.nnz(),
            sys_start.elapsed().unwrap_or_default().as_millis(),
            cpu_start.elapsed().as_millis()
        );
        let round_dims = rounds.iter().map(|r| r.get_nb_labels()).collect();
        Ok(KernelMatrix::new(matrix, round_dims, self.params.get_mode()))
    } // end of compute_kernel
} // end of impl PwlKernel


impl GraphKernelT for PwlKernel {
    fn transform(&mut self, graphs: &[AttributedGraph]) -> Result<KernelMatrix, KernelError> {
        self.compute_kernel(graphs)
    }
} // end of impl GraphKernelT for PwlKernel


#[cfg(test)]
mod tests {

    use super::*;

    use crate::gkernel::params::KernelMode;

    use rand::distributions::{Distribution, Uniform};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    // random undirected graphs with few distinct attributes
    fn random_graphs(nb_graphs: usize, seed: u64) -> Vec<AttributedGraph> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let nb_nodes_law = Uniform::<usize>::new(1, 12);
        let attr_law = Uniform::<usize>::new(0, 3);
        let unif = Uniform::<f64>::new(0., 1.);
        (0..nb_graphs)
            .map(|_| {
                let nb_nodes = nb_nodes_law.sample(&mut rng);
                let rows: Vec<Vec<f64>> = (0..nb_nodes)
                    .map(|_| vec![attr_law.sample(&mut rng) as f64, attr_law.sample(&mut rng) as f64])
                    .collect();
                let mut edges = Vec::new();
                for u in 0..nb_nodes {
                    for v in (u + 1)..nb_nodes {
                        if unif.sample(&mut rng) < 0.3 {
                            edges.push((u, v));
                            edges.push((v, u));
                        }
                    }
                }
                AttributedGraph::from_rows(&rows, edges).unwrap()
            })
            .collect()
    }

    fn two_nodes() -> AttributedGraph {
        AttributedGraph::from_rows(&[vec![1., 0.], vec![0., 1.]], vec![(0, 1), (1, 0)]).unwrap()
    }

    #[test]
    fn test_two_nodes_scenario() {
        log_init_test();
        //
        let params = PwlParams::new(2, 2., 1., KernelMode::NodeOnly);
        let mut pwl = PwlKernel::new(params).unwrap();
        let graphs = vec![two_nodes()];
        let rounds = pwl.compute_rounds(&graphs).unwrap();
        assert_eq!(rounds[0].get_labels(0), &[0, 1]);
        assert_eq!(rounds[0].get_weights(0), &[2., 2.]);
        assert_eq!(rounds[0].get_nb_labels(), 2);
        // round 1 : keys (0,[1]) and (1,[0]), own labels cancel neighbours so weights are 1 + 0 + tau
        assert_eq!(rounds[1].get_labels(0), &[2, 3]);
        assert_eq!(rounds[1].get_weights(0), &[2., 2.]);
        //
        let kernel = pwl.compute_kernel(&graphs).unwrap();
        assert_eq!(kernel.get_nb_graphs(), 1);
        assert_eq!(kernel.get_dimension(), 4);
        assert_eq!(kernel.get_nb_labels(), 4);
        assert_eq!(kernel.get_round_dims(), &[2, 4]);
        assert_eq!(kernel.get_graph_vector(0).unwrap().to_vec(), vec![4., 4., 4., 4.]);
        // no cycle : cycle half is empty
        let mut pwlc = PwlKernel::new(PwlParams::new(2, 2., 1., KernelMode::NodeCycle)).unwrap();
        let kernel = pwlc.transform(&graphs).unwrap();
        assert_eq!(kernel.get_dimension(), 8);
        assert_eq!(kernel.get_graph_vector(0).unwrap().to_vec(), vec![4., 4., 4., 4., 0., 0., 0., 0.]);
    } // end of test_two_nodes_scenario

    #[test]
    fn test_single_round() {
        log_init_test();
        //
        let mut pwl = PwlKernel::new(PwlParams::new(1, 2., 1., KernelMode::NodeOnly)).unwrap();
        let kernel = pwl.transform(&[two_nodes()]).unwrap();
        assert_eq!(kernel.get_graph_vector(0).unwrap().to_vec(), vec![4., 4.]);
    } // end of test_single_round

    #[test]
    fn test_shape_and_non_negativity() {
        log_init_test();
        //
        let graphs = random_graphs(50, 4664397);
        for mode in [KernelMode::NodeOnly, KernelMode::NodeCycle] {
            let mut pwl = PwlKernel::new(PwlParams::new(3, 1.5, 0.5, mode)).unwrap();
            let rounds = pwl.compute_rounds(&graphs).unwrap();
            // label monotonicity
            for h in 0..rounds.len() {
                if h > 0 {
                    assert!(rounds[h].get_nb_labels() >= rounds[h - 1].get_nb_labels());
                }
                for g in 0..graphs.len() {
                    assert!(rounds[h].get_labels(g).iter().all(|&l| l < rounds[h].get_nb_labels()));
                    assert_eq!(rounds[h].get_labels(g).len(), graphs[g].get_nb_nodes());
                    assert_eq!(rounds[h].get_weights(g).len(), graphs[g].get_nb_edges());
                }
            }
            let kernel = pwl.transform(&graphs).unwrap();
            let nb_labels = pwl.get_dictionary().get_nb_labels();
            let expected_dim = if mode.has_cycles() { 2 * nb_labels } else { nb_labels };
            assert_eq!(kernel.get_nb_graphs(), graphs.len());
            assert_eq!(kernel.get_dimension(), expected_dim);
            assert!(kernel.get_matrix().iter().all(|(v, _)| *v >= 0.));
        }
    } // end of test_shape_and_non_negativity

    #[test]
    fn test_determinism() {
        log_init_test();
        //
        let graphs = random_graphs(40, 977);
        let mut params = PwlParams::new(4, 2., 1., KernelMode::NodeCycle);
        params.set_block_size(7);
        let run = |params: PwlParams| {
            let mut pwl = PwlKernel::new(params).unwrap();
            let rounds = pwl.compute_rounds(&graphs).unwrap();
            let labels: Vec<Vec<usize>> = rounds
                .iter()
                .flat_map(|r| (0..graphs.len()).map(move |g| r.get_labels(g).to_vec()))
                .collect();
            let kernel = pwl.transform(&graphs).unwrap();
            let entries: Vec<(usize, usize, u64)> =
                kernel.get_matrix().iter().map(|(v, (i, j))| (i, j, v.to_bits())).collect();
            (labels, entries)
        };
        let first = run(params);
        let second = run(params);
        assert_eq!(first, second);
        // parallel mode gives the same result
        params.set_parallel(true);
        let parallel = run(params);
        assert_eq!(first, parallel);
    } // end of test_determinism

    #[test]
    fn test_errors() {
        log_init_test();
        //
        let res = PwlKernel::new(PwlParams::new(2, -1., 1., KernelMode::NodeOnly));
        assert!(matches!(res, Err(KernelError::Configuration(_))));
        //
        let mut pwl = PwlKernel::new(PwlParams::default()).unwrap();
        let bad = AttributedGraph::from_rows(&[vec![1.]], vec![(0, 4)]).unwrap();
        let res = pwl.transform(&[two_nodes(), bad]);
        assert!(matches!(res, Err(KernelError::InputShape { graph: 1, .. })));
        let other_arity = AttributedGraph::from_rows(&[vec![1.]], vec![]).unwrap();
        let res = pwl.transform(&[two_nodes(), other_arity]);
        assert!(matches!(res, Err(KernelError::InputShape { graph: 1, .. })));
    } // end of test_errors
} // end of mod tests
