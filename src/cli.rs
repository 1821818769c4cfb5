use crate::driver::Options;
use clap::{ArgAction, Parser, ValueHint};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "jackc",
    version,
    about = "Compile Jack classes to stack VM code",
    long_about = None,
    color = clap::ColorChoice::Auto
)]
pub struct Cli {
    #[arg(help = "a source file, or a directory of source files", value_hint = ValueHint::AnyPath)]
    pub path: PathBuf,
    #[arg(short, long, default_value_t = String::from("jack"), help = "source file extension")]
    pub extension: String,
    #[arg(short, long, default_value_t = false, help = "also write NameT.xml token dumps")]
    pub tokens: bool,
    #[arg(long, default_value_t = false, help = "print VM code instead of writing .vm files")]
    pub stdout: bool,
    #[arg(short, long, action = ArgAction::Count, help = "log more, repeat for more detail")]
    pub verbose: u8,
}

impl Cli {
    pub fn options(&self) -> Options {
        Options::default()
            .extension(self.extension.clone())
            .tokens(self.tokens)
            .stdout(self.stdout)
    }

    /// Log filter for the requested verbosity.
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["jackc", "Square"]).unwrap();
        assert_eq!(cli.path, PathBuf::from("Square"));
        assert_eq!(cli.options(), Options::default());
        assert_eq!(cli.log_level(), log::LevelFilter::Warn);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from(["jackc", "-t", "--stdout", "-e", "jk", "-vv", "Main.jk"])
            .unwrap();
        assert_eq!(
            cli.options(),
            Options::default().extension("jk").tokens(true).stdout(true)
        );
        assert_eq!(cli.log_level(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_path_required() {
        assert!(Cli::try_parse_from(["jackc"]).is_err());
    }

    #[test]
    fn test_command_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
