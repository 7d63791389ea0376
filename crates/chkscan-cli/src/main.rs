use chkscan_core::logging;
use chkscan_core::pipeline::EXIT_USAGE;

mod cli;

use crate::cli::Cli;

fn main() {
    // Initialize logging as early as possible.
    if let Err(err) = logging::init_logging() {
        eprintln!("chkscan: {:#}", err);
    }

    let code = match Cli::parse_args().run() {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{:#}", err);
            EXIT_USAGE
        }
    };
    std::process::exit(code);
}
