//! This module implements a persistent Weisfeiler-Lehman kernel for graphs with attributes attached to nodes.
//!
//! Nodes are relabelled along rounds as in the Weisfeiler-Lehman algorithm, each round also weights edges by the
//! distance between labelled neighbourhoods of their extremities. Sweeping edges by increasing weight gives a birth
//! weight to each node and flags cycle closing edges. These persistence values, summed by label, make the
//! feature vector of a graph.
//!
//!
//! Some References on Graph Kernels are :
//!
//! - Graph Kernels : A survey. Nikolentzos-Siglidis-Vazirgiannis 2021
//!
//! - Shervashidze-Borgwardt Weisfeiler-Lehman Graph Kernels 2011
//!
//! - A Persistent Weisfeiler-Lehman Procedure for Graph Classification. Rieck-Bock-Borgwardt ICML 2019
//!
// Core Weisfeiler-Lehman gives a feature vector for each node and the whole graph,
// the persistent variant replaces counts of labels by sums of persistence values.

/// Errors of the kernel computation
pub mod error;

/// Defines kernel parameters.
pub mod params;

/// Defines graphs with node attributes.
pub mod pgraph;

/// Label dictionary.
pub mod idmap;

/// Labelling rounds.
pub mod refine;

/// Edge weight filtration.
pub mod persistence;

/// Blocked sparse aggregation.
pub mod aggregate;

/// The kernel pipeline.
pub mod pwl;
