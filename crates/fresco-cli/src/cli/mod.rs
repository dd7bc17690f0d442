mod commands;
mod helpers;

use clap::Parser;
use fresco_core::domain::{EngineError, EngineErrorCategory};
use std::path::PathBuf;

const PROGRAM_NAME: &str = "fresco-namelist";

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{}", error.diagnostic_line());
            if let Some(summary_line) = error.fatal_exit_line() {
                eprintln!("{}", summary_line);
            }
            error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once(PROGRAM_NAME.to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            helpers::init_logging(cli.verbose, cli.quiet);
            let config = helpers::load_config(cli.config.as_deref())?;
            dispatch_parsed(cli.command, &config)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "fresco-namelist",
    version,
    about = "Parse, categorize and regenerate FRESCO namelist inputs"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable logging
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Engine config JSON path
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Show the structured model of a namelist file
    Inspect(commands::InspectArgs),
    /// Report the detected calculation type of one or more files
    Detect(commands::DetectArgs),
    /// Regenerate a file in canonical form
    Format(commands::FormatArgs),
    /// Show the general/advanced parameter split
    Params(commands::ParamsArgs),
    /// Apply validated edits and write the regenerated file
    Set(commands::SetArgs),
    /// Parse every matching file under a directory
    Scan(commands::ScanArgs),
}

fn dispatch_parsed(
    command: CliCommand,
    config: &fresco_core::EngineConfig,
) -> Result<i32, CliError> {
    match command {
        CliCommand::Inspect(args) => commands::run_inspect_command(args, config),
        CliCommand::Detect(args) => commands::run_detect_command(args, config),
        CliCommand::Format(args) => commands::run_format_command(args, config),
        CliCommand::Params(args) => commands::run_params_command(args, config),
        CliCommand::Set(args) => commands::run_set_command(args, config),
        CliCommand::Scan(args) => commands::run_scan_command(args, config),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Engine(EngineError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn category(&self) -> EngineErrorCategory {
        match self {
            Self::Usage(_) => EngineErrorCategory::InputValidationError,
            Self::Engine(error) => error.category(),
            Self::Internal(_) => EngineErrorCategory::IoSystemError,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        match self {
            Self::Usage(message) => format!("ERROR: [INPUT.CLI_USAGE] {}", message.trim_end()),
            Self::Engine(error) => error.diagnostic_line(),
            Self::Internal(error) => format!("ERROR: [IO.CLI] {error:#}"),
        }
    }

    pub fn fatal_exit_line(&self) -> Option<String> {
        self.category()
            .is_fatal()
            .then(|| format!("FATAL EXIT CODE: {}", self.exit_code()))
    }
}

#[cfg(test)]
mod tests {
    use super::{CliError, run};
    use fresco_core::domain::EngineError;

    #[test]
    fn help_and_version_exit_cleanly() {
        assert_eq!(run(["--help"]).expect("help should succeed"), 0);
        assert_eq!(run(["--version"]).expect("version should succeed"), 0);
    }

    #[test]
    fn unknown_subcommands_are_usage_errors() {
        let error = run(["frobnicate"]).expect_err("unknown command should fail");
        assert!(matches!(error, CliError::Usage(_)));
        assert_eq!(error.exit_code(), 2);
        assert!(error.diagnostic_line().starts_with("ERROR: [INPUT.CLI_USAGE]"));
        assert_eq!(
            error.fatal_exit_line().as_deref(),
            Some("FATAL EXIT CODE: 2")
        );
    }

    #[test]
    fn engine_and_internal_errors_keep_their_codes() {
        let engine = CliError::Engine(EngineError::malformed(3, "unterminated block"));
        assert_eq!(engine.exit_code(), 2);
        assert!(
            engine
                .diagnostic_line()
                .starts_with("ERROR: [INPUT.MALFORMED_NAMELIST]")
        );

        let internal = CliError::from(anyhow::anyhow!("disk on fire"));
        assert_eq!(internal.exit_code(), 3);
        assert_eq!(internal.diagnostic_line(), "ERROR: [IO.CLI] disk on fire");
    }
}
