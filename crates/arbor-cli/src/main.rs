#![forbid(unsafe_code)]

fn main() {
    arbor_cli::logging::init();
    if let Err(error) = arbor_cli::run_from_env() {
        eprintln!("arbor: {error}");
        std::process::exit(error.exit_code());
    }
}
