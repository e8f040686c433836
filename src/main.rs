mod rsa;

pub use crate::rsa::*;

use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;

fn main() -> ExitCode {
    let rsa = RSA::parse();
    let level = if rsa.silent { LevelFilter::Warn } else { LevelFilter::Info };
    env_logger::builder()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .parse_default_env()
        .init();
    match rsa.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}: {}", err.kind(), err);
            ExitCode::FAILURE
        }
    }
}
