//! Loading of graph datasets.

pub mod csv;
