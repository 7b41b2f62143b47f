//! # formtree CLI entry point
//!
//! Parses command-line arguments, resolves the form configuration, and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use formtree_cli::resolve_config;
use formtree_cli::template::{run_template, TemplateArgs};
use formtree_cli::transcode::{run_deepen, run_flatten, DeepenArgs, FlattenArgs};
use formtree_cli::validate::{run_validate, ValidateArgs};

/// formtree: validate nested data and transcode form submissions.
///
/// Schemas are JSON or YAML documents built from string, integer, boolean,
/// tuple, list, and dict nodes.
#[derive(Parser, Debug)]
#[command(name = "formtree", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Form configuration file (JSON or YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Separator between flat key segments.
    #[arg(long, global = true)]
    delimiter: Option<String>,

    /// Form prefix for prefixed flat keys. Pass "" to disable.
    #[arg(long, global = true)]
    prefix: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a document and print its data and errors.
    Validate(ValidateArgs),

    /// Validate a document and print its flat mapping.
    Flatten(FlattenArgs),

    /// Rebuild a nested document from a flat mapping or query string.
    Deepen(DeepenArgs),

    /// Print the blank form: default value and field slots.
    Template(TemplateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("formtree CLI starting");

    let config = match resolve_config(
        cli.config.as_deref(),
        cli.delimiter.as_deref(),
        cli.prefix.as_deref(),
    ) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, &config),
        Commands::Flatten(args) => run_flatten(&args, &config),
        Commands::Deepen(args) => run_deepen(&args, &config),
        Commands::Template(args) => run_template(&args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_validate() {
        let cli = Cli::try_parse_from(["formtree", "validate", "--schema", "s.yaml", "in.json"]).unwrap();
        if let Commands::Validate(args) = cli.command {
            assert_eq!(args.schema, PathBuf::from("s.yaml"));
            assert_eq!(args.input, PathBuf::from("in.json"));
            assert!(!args.strict);
        } else {
            panic!("expected validate");
        }
    }

    #[test]
    fn cli_parse_validate_strict() {
        let cli = Cli::try_parse_from([
            "formtree", "validate", "--schema", "s.yaml", "in.json", "--strict",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Validate(ref a) if a.strict));
    }

    #[test]
    fn cli_parse_flatten_flags() {
        let cli = Cli::try_parse_from([
            "formtree", "flatten", "--schema", "s.json", "in.json", "--form", "--query",
        ])
        .unwrap();
        if let Commands::Flatten(args) = cli.command {
            assert!(args.form);
            assert!(args.query);
        } else {
            panic!("expected flatten");
        }
    }

    #[test]
    fn cli_parse_deepen_file_or_query() {
        let cli = Cli::try_parse_from(["formtree", "deepen", "--schema", "s.json", "flat.json"]).unwrap();
        if let Commands::Deepen(args) = cli.command {
            assert_eq!(args.flat, Some(PathBuf::from("flat.json")));
            assert!(args.query.is_none());
        } else {
            panic!("expected deepen");
        }

        let cli = Cli::try_parse_from([
            "formtree", "deepen", "--schema", "s.json", "--query", "a=1", "--validate",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Deepen(ref a) if a.validate && a.flat.is_none()));
    }

    #[test]
    fn cli_parse_deepen_requires_input() {
        assert!(Cli::try_parse_from(["formtree", "deepen", "--schema", "s.json"]).is_err());
        assert!(Cli::try_parse_from([
            "formtree", "deepen", "--schema", "s.json", "flat.json", "--query", "a=1",
        ])
        .is_err());
    }

    #[test]
    fn cli_parse_template() {
        let cli = Cli::try_parse_from(["formtree", "template", "--schema", "s.json"]).unwrap();
        assert!(matches!(cli.command, Commands::Template(_)));
    }

    #[test]
    fn cli_parse_global_options() {
        let cli = Cli::try_parse_from([
            "formtree",
            "-vv",
            "--config",
            "form.yaml",
            "--delimiter",
            ".",
            "--prefix",
            "",
            "template",
            "--schema",
            "s.json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("form.yaml")));
        assert_eq!(cli.delimiter.as_deref(), Some("."));
        assert_eq!(cli.prefix.as_deref(), Some(""));
    }

    #[test]
    fn cli_parse_no_subcommand_errors() {
        assert!(Cli::try_parse_from(["formtree"]).is_err());
        assert!(Cli::try_parse_from(["formtree", "nonexistent"]).is_err());
    }
}
