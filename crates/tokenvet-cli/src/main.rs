use clap::Parser;

mod args;
mod check;
mod exit_codes;
mod report;

use args::{Cli, Command};

fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let cli = Cli::parse();
    let code = match dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:?}");
            exit_codes::INTERNAL_ERROR
        }
    };
    std::process::exit(code);
}

fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Command::Check { assets_dir, format } => check::run_check(&assets_dir, format),
        Command::CheckFile { path, format } => check::run_check_file(&path, format),
    }
}
