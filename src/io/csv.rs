//! Construct a collection of graphs from csv files.
//!
//! We read the raw layout of graph property prediction datasets of the Open Graph Benchmark
//! (for example ogbg-molhiv, files must be uncompressed), all files without header :
//! - num-node-list.csv : number of nodes of each graph, one per line
//! - num-edge-list.csv : number of (undirected) edges of each graph, one per line
//! - edge.csv : one line "u,v" per edge, nodes indexed from 0 inside their graph, graphs one after the other
//! - node-feat.csv : one line of attributes per node, graphs one after the other. If absent all nodes have an empty attribute vector.
//! - graph-label.csv : optional, one label per graph
//!
//! Each edge u,v of the file gives the directed edges (u,v) and (v,u).

use std::fs::OpenOptions;
use std::path::Path;
use std::str::FromStr;

use anyhow::anyhow;

use csv::{ReaderBuilder, Trim};

use crate::gkernel::pgraph::AttributedGraph;

pub const NUM_NODE_FILE: &str = "num-node-list.csv";
pub const NUM_EDGE_FILE: &str = "num-edge-list.csv";
pub const EDGE_FILE: &str = "edge.csv";
pub const NODE_FEAT_FILE: &str = "node-feat.csv";
pub const GRAPH_LABEL_FILE: &str = "graph-label.csv";

/// graphs and their labels if any
pub struct GraphDataset {
    graphs: Vec<AttributedGraph>,
    labels: Option<Vec<f64>>,
} // end of GraphDataset


impl GraphDataset {
    pub fn get_graphs(&self) -> &[AttributedGraph] {
        &self.graphs
    }

    /// graph labels, to be used by a classifier
    pub fn get_labels(&self) -> Option<&[f64]> {
        self.labels.as_deref()
    }

    pub fn get_nb_graphs(&self) -> usize {
        self.graphs.len()
    }
} // end of impl GraphDataset


// reads all records of a headerless csv file, each field parsed as T
fn read_records<T>(filepath: &Path) -> anyhow::Result<Vec<Vec<T>>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let file = OpenOptions::new().read(true).open(filepath).map_err(|e| {
        log::error!("read_records could not open file {:?}", filepath.as_os_str());
        anyhow!("could not open file {:?} : {}", filepath, e)
    })?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(false)
        .trim(Trim::All)
        .from_reader(file);
    let mut records = Vec::<Vec<T>>::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        let mut fields = Vec::<T>::with_capacity(record.len());
        for field in record.iter() {
            let value = field
                .parse::<T>()
                .map_err(|e| anyhow!("file {:?} line {} : cannot parse {:?} : {}", filepath, line + 1, field, e))?;
            fields.push(value);
        }
        records.push(fields);
    }
    log::debug!("read {} records from {:?}", records.len(), filepath);
    Ok(records)
} // end of read_records


// a file with one value per line
fn read_column<T>(filepath: &Path) -> anyhow::Result<Vec<T>>
where
    T: FromStr + Copy,
    T::Err: std::fmt::Display,
{
    let records = read_records::<T>(filepath)?;
    records
        .iter()
        .enumerate()
        .map(|(line, r)| match r.as_slice() {
            [v] => Ok(*v),
            _ => Err(anyhow!("file {:?} line {} : expecting one value, got {}", filepath, line + 1, r.len())),
        })
        .collect()
} // end of read_column


/// Loads a dataset directory in the raw layout described in the module documentation.
pub fn load_ogb_raw_dir(dir: &Path) -> anyhow::Result<GraphDataset> {
    log::info!("load_ogb_raw_dir, loading directory {:?}", dir);
    let nb_nodes = read_column::<usize>(&dir.join(NUM_NODE_FILE))?;
    let nb_edges = read_column::<usize>(&dir.join(NUM_EDGE_FILE))?;
    if nb_nodes.len() != nb_edges.len() {
        return Err(anyhow!(
            "{} gives {} graphs, {} gives {}",
            NUM_NODE_FILE,
            nb_nodes.len(),
            NUM_EDGE_FILE,
            nb_edges.len()
        ));
    }
    let edges = read_records::<usize>(&dir.join(EDGE_FILE))?;
    let total_edges: usize = nb_edges.iter().sum();
    if edges.len() != total_edges {
        return Err(anyhow!("{} has {} edges, expected {}", EDGE_FILE, edges.len(), total_edges));
    }
    let total_nodes: usize = nb_nodes.iter().sum();
    let feat_path = dir.join(NODE_FEAT_FILE);
    let features = if feat_path.exists() {
        read_records::<f64>(&feat_path)?
    } else {
        log::info!("no {} file, nodes get empty attributes", NODE_FEAT_FILE);
        vec![Vec::new(); total_nodes]
    };
    if features.len() != total_nodes {
        return Err(anyhow!("{} has {} rows, expected {}", NODE_FEAT_FILE, features.len(), total_nodes));
    }
    //
    let mut graphs = Vec::<AttributedGraph>::with_capacity(nb_nodes.len());
    let (mut node_offset, mut edge_offset) = (0usize, 0usize);
    for (rank, (&n, &m)) in nb_nodes.iter().zip(nb_edges.iter()).enumerate() {
        let mut g_edges = Vec::<(usize, usize)>::with_capacity(2 * m);
        for record in &edges[edge_offset..edge_offset + m] {
            match record.as_slice() {
                [u, v] => {
                    g_edges.push((*u, *v));
                    g_edges.push((*v, *u));
                }
                _ => return Err(anyhow!("graph {} : edge record with {} fields", rank, record.len())),
            }
        }
        let graph = AttributedGraph::from_rows(&features[node_offset..node_offset + n], g_edges)
            .map_err(|e| anyhow!("graph {} : {}", rank, e))?;
        graphs.push(graph);
        node_offset += n;
        edge_offset += m;
    }
    //
    let label_path = dir.join(GRAPH_LABEL_FILE);
    let labels = if label_path.exists() {
        let labels = read_column::<f64>(&label_path)?;
        if labels.len() != graphs.len() {
            return Err(anyhow!("{} has {} labels, expected {}", GRAPH_LABEL_FILE, labels.len(), graphs.len()));
        }
        Some(labels)
    } else {
        None
    };
    log::info!("load_ogb_raw_dir : {} graphs, {} nodes, {} edges", graphs.len(), total_nodes, total_edges);
    Ok(GraphDataset { graphs, labels })
} // end of load_ogb_raw_dir


/// reads a split file (train, valid or test) : one graph index per line
pub fn split_indices(filepath: &Path) -> anyhow::Result<Vec<usize>> {
    read_column::<usize>(filepath)
}


// end of mod tests
