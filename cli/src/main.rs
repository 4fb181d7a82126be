use clap::{builder::PossibleValuesParser, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use ccl::decode_to_json;
use ccl_compiler::{generate, load_definition, plan_definition, read_source, CclError, GenerateOptions, BACKENDS};

#[derive(Parser)]
#[command(name = "ccl-gen")]
#[command(about = "Generate binary codecs for CCL model schemas", long_about = None)]
struct Cli {
    /// Log every pipeline phase (overrides CCL_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate source files for one target language from a `.ccl` schema
    Generate {
        /// Input `.ccl` schema file
        #[arg(short, long)]
        source: PathBuf,

        /// Target language
        #[arg(short, long, value_parser = PossibleValuesParser::new(BACKENDS))]
        language: String,

        /// Directory the generated files are written to
        #[arg(short, long)]
        output: PathBuf,

        /// Package name (defaults to the schema's `package`, then the output directory name)
        #[arg(short, long)]
        package: Option<String>,
    },

    /// Print the version of this tool
    Version,

    /// Print the per-field codec plan of every model as JSON
    Plan {
        /// Input `.ccl` schema file
        #[arg(short, long)]
        source: PathBuf,
    },

    /// Decode a binary message to JSON (printed to stdout)
    Decode {
        /// Input `.ccl` schema file
        #[arg(short, long)]
        source: PathBuf,

        /// Name of the model the message encodes
        #[arg(short, long)]
        model: String,

        /// File holding the binary message
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_env("CCL_LOG")
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<(), CclError> {
    match command {
        Commands::Generate { source, language, output, package } => {
            let options = GenerateOptions {
                package_name: package,
                output_dir: output,
                backend: language,
            };
            tracing::debug!(source = %source.display(), ?options, "generating");
            let written = generate(&source, &options)?;
            for path in &written {
                println!("{}", path.display());
            }
            Ok(())
        }

        Commands::Version => {
            println!(
                "ccl version {} {}/{}",
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS,
                std::env::consts::ARCH
            );
            Ok(())
        }

        Commands::Plan { source } => {
            let definition = load_definition(&source)?;
            let plans = plan_definition(&definition)?;
            println!("{}", serde_json::to_string_pretty(&plans).unwrap_or_default());
            Ok(())
        }

        Commands::Decode { source, model, input } => {
            let text = read_source(&source)?;
            let data = fs::read(&input).map_err(|e| CclError::source_io(input.clone(), e))?;
            println!("{}", decode_to_json(&text, &model, &data)?);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_accepts_known_backends() {
        for language in BACKENDS {
            let cli = Cli::try_parse_from(["ccl-gen", "generate", "-s", "a.ccl", "-l", language, "-o", "out"]).unwrap();
            match cli.command {
                Commands::Generate { language: parsed, .. } => assert_eq!(parsed, language),
                _ => panic!("expected the generate command"),
            }
        }
    }

    #[test]
    fn test_language_rejects_unknown_backend() {
        let err = Cli::try_parse_from(["ccl-gen", "generate", "-s", "a.ccl", "-l", "cobol", "-o", "out"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
        assert!(err.to_string().contains("[possible values: go, rust]"), "{}", err);
    }
}
