use lumen::cli;
use std::process;

fn main() {
    env_logger::init();
    if let Err(code) = cli::run_main() {
        process::exit(code);
    }
}
