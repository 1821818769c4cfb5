use jackc::{cli::Cli, driver};

use clap::Parser as ClapParser;

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .init();

    let failures = driver::run(&args.path, &args.options())?;
    if failures.is_empty() {
        return Ok(());
    }

    for failure in &failures {
        let filename = failure.path.display().to_string();
        failure.error.report(&filename, &failure.src)?;
    }
    eprintln!("{} file(s) failed to compile", failures.len());
    std::process::exit(1);
}
