use clap::Parser;
use techind::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
