//! Computes the persistent Weisfeiler-Lehman kernel of a dataset stored in the raw csv layout
//! described in [pwlkernel::io::csv].
//!
//! example : pwl --dir /data/ogbg_molhiv/raw --mode pwlc --rounds 3 -p 2 --tau 1 --parallel --split /data/ogbg_molhiv/split/scaffold/train.csv
//!
//! Without --split the whole kernel is summarized, with --split only rows of the listed graphs.

use std::path::Path;

use anyhow::anyhow;

use clap::{Arg, ArgMatches, Command};

use pwlkernel::prelude::*;

// parses an optional argument, default value if absent
fn parse_value<T>(matches: &ArgMatches, name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match matches.value_of(name) {
        Some(str) => str
            .parse::<T>()
            .map_err(|e| anyhow!("could not parse argument {} : {:?}, {}", name, str, e)),
        None => Ok(default),
    }
} // end of parse_value


fn parse_params(matches: &ArgMatches) -> anyhow::Result<PwlParams> {
    log::debug!("in parse_params");
    let default = PwlParams::default();
    let mode = parse_value::<KernelMode>(matches, "mode", default.get_mode())?;
    let nb_rounds = parse_value::<usize>(matches, "rounds", default.get_nb_rounds())?;
    let p = parse_value::<f64>(matches, "p", default.get_p())?;
    let tau = parse_value::<f64>(matches, "tau", default.get_tau())?;
    let mut params = PwlParams::new(nb_rounds, p, tau, mode);
    params.set_block_size(parse_value::<usize>(matches, "block", default.get_block_size())?);
    params.set_parallel(matches.is_present("parallel"));
    params.validate()?;
    Ok(params)
} // end of parse_params


fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let params = parse_params(matches)?;
    let nb_threads = parse_value::<usize>(matches, "nbthreads", num_cpus::get())?;
    if params.get_parallel() {
        rayon::ThreadPoolBuilder::new().num_threads(nb_threads).build_global()?;
        log::info!("parallel mode, nb threads : {}", nb_threads);
    }
    //
    let dir = matches.value_of("dir").ok_or_else(|| anyhow!("--dir is required"))?;
    let dataset = load_ogb_raw_dir(Path::new(dir))?;
    let nb_arity = validate_dataset(dataset.get_graphs())?;
    log::info!("dataset : {} graphs, attribute arity {}", dataset.get_nb_graphs(), nb_arity);
    //
    let mut pwl = PwlKernel::new(params)?;
    let kernel = pwl.transform(dataset.get_graphs())?;
    println!(
        "kernel : mode {:?}, nb graphs {}, dimension {}, nnz {}, nb labels {}, labels by round {:?}",
        kernel.get_mode(),
        kernel.get_nb_graphs(),
        kernel.get_dimension(),
        kernel.get_nnz(),
        kernel.get_nb_labels(),
        kernel.get_round_dims()
    );
    //
    if let Some(split) = matches.value_of("split") {
        let indices = split_indices(Path::new(split))?;
        let selected = kernel.select_rows(&indices)?;
        println!(
            "split {} : nb rows {}, dimension {}, nnz {}",
            split,
            selected.rows(),
            selected.cols(),
            selected.nnz()
        );
        if let Some(labels) = dataset.get_labels() {
            let nb_positive = indices.iter().filter(|&&i| labels[i] > 0.).count();
            println!("split {} : {} graphs with positive label", split, nb_positive);
        }
    }
    Ok(())
} // end of run


pub fn main() {
    //
    pwlkernel::ensure_logger();
    log::info!("logger initialized");
    //
    let matches = Command::new("pwl")
        .arg_required_else_help(true)
        .arg(
            Arg::new("dir")
                .long("dir")
                .takes_value(true)
                .required(true)
                .help("directory with num-node-list.csv, num-edge-list.csv, edge.csv, node-feat.csv"),
        )
        .arg(
            Arg::new("mode")
                .long("mode")
                .takes_value(true)
                .required(false)
                .help("pwl (node-only) or pwlc (node+cycle), default pwl"),
        )
        .arg(
            Arg::new("rounds")
                .long("rounds")
                .takes_value(true)
                .required(false)
                .help("number of labelling rounds, default 2"),
        )
        .arg(
            Arg::new("p")
                .short('p')
                .takes_value(true)
                .required(false)
                .help("exponent of distances and persistence, default 2."),
        )
        .arg(
            Arg::new("tau")
                .long("tau")
                .takes_value(true)
                .required(false)
                .help("offset added to edge weights, default 1."),
        )
        .arg(
            Arg::new("block")
                .long("block")
                .takes_value(true)
                .required(false)
                .help("number of graphs aggregated in a dense block, default 1000"),
        )
        .arg(Arg::new("parallel").long("parallel").help("run graphs in parallel"))
        .arg(
            Arg::new("nbthreads")
                .long("nbthreads")
                .takes_value(true)
                .required(false)
                .help("number of threads in parallel mode, default number of cpus"),
        )
        .arg(
            Arg::new("split")
                .long("split")
                .takes_value(true)
                .required(false)
                .help("file of graph indices, one per line, to select rows"),
        )
        .get_matches();
    //
    if let Err(e) = run(&matches) {
        log::error!("pwl failed : {:?}", e);
        eprintln!("error : {:#}", e);
        std::process::exit(1);
    }
} // end of main
