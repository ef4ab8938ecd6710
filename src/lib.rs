//! lib target


use env_logger::Builder;

#[macro_use]
extern crate lazy_static;

lazy_static! {
    static ref LOG: u64 = init_log();
}

// install a logger facility
fn init_log() -> u64 {
    let _ = Builder::from_default_env().try_init();
    log::info!("\n ************** initializing logger *****************\n");
    1
}

/// To be called by an application embedding the library without installing its own logger.
/// Has no effect if a logger is already installed.
pub fn ensure_logger() {
    lazy_static::initialize(&LOG);
}

pub mod io;

pub mod gkernel;

pub mod kernel;

pub mod prelude;
