use clap::Parser;
use std::io;

use coi_serve::args::Args;
use coi_serve::logging::setup_logging;
use coi_serve::server::start_server;

fn main() -> io::Result<()> {
    setup_logging();
    let args = Args::parse();
    start_server(args)
}
