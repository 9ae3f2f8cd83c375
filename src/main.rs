// brackit: bracket-block language interpreter with memory inspection

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use brackit::config::InterpreterConfig;
use brackit::interpreter::engine::Interpreter;
use brackit::interpreter::errors::RuntimeError;
use brackit::ui::App;

#[derive(Parser, Debug)]
#[command(name = "brackit")]
#[command(about = "Run a bracket-block program on simulated bit-level memory")]
#[command(after_help = "Set RUST_LOG=debug to trace interpreter internals on stderr.")]
struct Cli {
    /// Path to the program source
    file: PathBuf,
    /// Record execution history and open the inspector
    #[arg(long)]
    inspect: bool,
    /// Size of the simulated memory in bits
    #[arg(long, value_name = "N")]
    memory_bits: Option<usize>,
    /// Maximum nested method calls
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,
}

impl Cli {
    fn config(&self) -> InterpreterConfig {
        let defaults = InterpreterConfig::default();
        InterpreterConfig {
            memory_bits: self.memory_bits.unwrap_or(defaults.memory_bits),
            max_call_depth: self.max_depth.unwrap_or(defaults.max_call_depth),
            record_history: self.inspect,
            echo_output: !self.inspect,
            ..defaults
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Only initialize if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn report(err: &RuntimeError) {
    // Located errors already end with "at line N"
    eprintln!("Error: {}", err);
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    let source = match fs::read_to_string(&cli.file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", cli.file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let mut interpreter = match Interpreter::new(&source, cli.config()) {
        Ok(interpreter) => interpreter,
        Err(e) => {
            report(&e);
            return ExitCode::FAILURE;
        }
    };

    let outcome = interpreter.run();

    if !cli.inspect {
        return match outcome {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                report(&e);
                ExitCode::FAILURE
            }
        };
    }

    match &outcome {
        Ok(()) => {
            eprintln!("Execution completed successfully.");
            eprintln!("Total snapshots: {}", interpreter.total_snapshots());
        }
        Err(e) => {
            report(e);
            eprintln!("Entering inspector with partial execution history...");
        }
    }

    if let Err(e) = interpreter.rewind_to_start() {
        eprintln!("Warning: {}", e);
    }

    let error = outcome.err();
    if let Err(e) = run_inspector(interpreter, source, error.clone()) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    if error.is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run_inspector(
    interpreter: Interpreter,
    source: String,
    error: Option<RuntimeError>,
) -> io::Result<()> {
    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(interpreter, source, error);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "brackit",
            "--inspect",
            "--memory-bits",
            "256",
            "--max-depth",
            "7",
            "prog.bk",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(cli.file, PathBuf::from("prog.bk"));
        assert_eq!(config.memory_bits, 256);
        assert_eq!(config.max_call_depth, 7);
        assert!(config.record_history);
        assert!(!config.echo_output);
    }

    #[test]
    fn test_plain_run_echoes_output() {
        let config = Cli::try_parse_from(["brackit", "prog.bk"]).unwrap().config();
        assert_eq!(
            config,
            InterpreterConfig {
                echo_output: true,
                ..InterpreterConfig::default()
            }
        );
    }

    #[test]
    fn test_rejects_bad_arguments() {
        assert!(Cli::try_parse_from(["brackit"]).is_err());
        assert!(Cli::try_parse_from(["brackit", "--memory-bits", "lots", "prog.bk"]).is_err());
        assert!(Cli::try_parse_from(["brackit", "--verbose", "prog.bk"]).is_err());
    }
}
