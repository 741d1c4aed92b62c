use clap::Parser;
use std::process::ExitCode;
use steady_cli::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = steady_cli::logging::init(&cli.log_level, cli.log_format) {
        eprintln!("error: {err:#}");
        return ExitCode::from(2);
    }

    let mut stdout = std::io::stdout().lock();
    match steady_cli::run(&cli, &mut stdout) {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::from(1),
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
