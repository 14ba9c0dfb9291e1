use clap::Parser;

mod cli;
pub mod exit_codes;

use cli::args::Cli;
use cli::commands::dispatch;

fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "warn");
    }
    env_logger::init();
    let cli = Cli::parse();
    let code = match dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if let Some(commit_err) = exit_codes::commit_error(&e) {
                for failure in commit_err.rollback_failures() {
                    eprintln!("  needs manual recovery: {failure}");
                }
            }
            exit_codes::classify(&e)
        }
    };
    std::process::exit(code);
}
