use crate::cli::run;

pub mod cli;
pub mod config;
pub mod domain;
pub mod http;
pub mod service;
pub mod storage;

fn main() -> anyhow::Result<()> {
    run()
}
