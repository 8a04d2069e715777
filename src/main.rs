use clap::Parser;
use investiq::cli::{init_logging, run, Cli};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging();
    run(cli)
}
