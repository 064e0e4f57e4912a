use clap::Parser;
use scalptrader::cli::{run, Cli};
use scalptrader::logging::init_logging;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli)
}
