use homesort::cli::run_cli;
use homesort::logging::init_logging;
use homesort::output::OutputFormatter;

fn main() {
    init_logging();

    // Per-file failures are already reported; only a broken setup lands here.
    if let Err(e) = run_cli() {
        OutputFormatter::error(&format!("Error: {}", e));
    }
}
