mod config;
mod names;
mod test_runner;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::diagnostic::Diagnostic;
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use controllers::{FileBuffer, GenerateError, GeneratorConfig};
use kv2::document::Document;

use crate::config::{ConfigFile, default_output_path};

#[derive(Parser)]
#[command(
    name = "flexgen",
    version,
    about = "Controller generator for keyvalues2 combination operators"
)]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    /// Raise log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a controller document from an ID source
    Generate(GenerateArgs),

    /// Deformation target name utilities
    #[command(subcommand)]
    Names(NamesCommand),

    /// Run .test.dmx fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Controller document listing the model's controls and their ids
    id_source: Option<PathBuf>,

    /// Document with grouped combination controls to carry over
    #[arg(short, long)]
    combinations: Option<PathBuf>,

    /// Destination document (default: <id source>-new.dmx)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML project file with [generator] and [paths] tables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the generated document instead of writing the destination
    #[arg(long)]
    stdout: bool,

    /// Generate and report counts without writing anything
    #[arg(long)]
    check: bool,
}

#[derive(Subcommand)]
enum NamesCommand {
    /// Strip Crowbar's `+` stereo suffixes from target names
    Clean {
        /// Names to clean (read from stdin when omitted)
        names: Vec<String>,
    },

    /// Print scale key names for bones or objects
    Scale {
        /// Bone or object names
        #[arg(required = true)]
        bases: Vec<String>,

        /// Axes to generate keys for
        #[arg(long, default_value = "XYZ")]
        axes: String,
    },

    /// Print the names from stdin that are scale keys of the given bases
    Filter {
        /// Bone or object names
        #[arg(required = true)]
        bases: Vec<String>,
    },
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.dmx file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Generate(args) => do_generate(args, cli.no_color),
        Command::Names(command) => do_names(command),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn do_generate(args: GenerateArgs, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let writer = StandardStream::stderr(color_choice);
    let term_config = term::Config::default();

    let file_config = match &args.config {
        Some(path) => match ConfigFile::load(path) {
            Ok(c) => {
                debug!(path = %path.display(), "loaded config file");
                c
            }
            Err(e) => {
                eprintln!("error: {}", e);
                process::exit(1);
            }
        },
        None => ConfigFile::default(),
    };
    let generator_config: GeneratorConfig = file_config.generator;

    // Flags win over the config file
    let id_source_path = args.id_source.or(file_config.paths.id_source);
    let combinations_path = args.combinations.or(file_config.paths.combinations);
    let output_path = args.output.or(file_config.paths.output);

    // Set up codespan file database
    let mut files = SimpleFiles::new();
    let id_source = id_source_path
        .as_deref()
        .map(|path| load_document(&mut files, path));
    let combinations = combinations_path
        .as_deref()
        .map(|path| load_document(&mut files, path));

    let result = if args.stdout || args.check {
        controllers::generate(id_source.as_ref(), combinations.as_ref(), &generator_config)
    } else {
        let output_path = match (output_path, id_source_path.as_deref()) {
            (Some(path), _) => path,
            (None, Some(source)) => default_output_path(source),
            (None, None) => {
                emit_generate_error(&writer, &term_config, &files, &GenerateError::MissingIdSource);
                process::exit(1);
            }
        };
        let mut destination = FileBuffer::new(output_path);
        controllers::generate_into(
            &mut destination,
            id_source.as_ref(),
            combinations.as_ref(),
            &generator_config,
        )
        .inspect(|_| eprintln!("wrote {}", destination.path().display()))
    };

    match result {
        Ok(generation) => {
            for warning in &generation.warnings {
                emit(&writer, &term_config, &files, &warning.to_diagnostic());
            }
            if args.stdout {
                print!("{}", generation.text());
            }
            eprintln!("{}", generation.summary());
        }
        Err(error) => {
            emit_generate_error(&writer, &term_config, &files, &error);
            process::exit(1);
        }
    }
}

fn load_document(files: &mut SimpleFiles<String, String>, path: &Path) -> Document {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", path.display(), e);
            process::exit(1);
        }
    };
    let file_id = files.add(path.display().to_string(), source.clone());
    Document::from_source(&source, file_id)
}

fn do_names(command: NamesCommand) {
    let output = match command {
        NamesCommand::Clean { names: targets } => read_names(&targets).map(|n| names::clean(&n)),
        NamesCommand::Scale { bases, axes } => names::scale(&bases, &axes),
        NamesCommand::Filter { bases } => {
            read_names(&[]).map(|n| names::filter(&n, &bases))
        }
    };
    match output {
        Ok(names) => {
            for name in names {
                println!("{}", name);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn read_names(args: &[String]) -> Result<Vec<String>, String> {
    names::collect_names(args).map_err(|e| format!("cannot read names: {}", e))
}

fn emit_generate_error(
    writer: &StandardStream,
    config: &term::Config,
    files: &SimpleFiles<String, String>,
    error: &GenerateError,
) {
    match error.to_diagnostic() {
        Some(diagnostic) => emit(writer, config, files, &diagnostic),
        None => eprintln!("error: {}", error),
    }
}

fn emit(
    writer: &StandardStream,
    config: &term::Config,
    files: &SimpleFiles<String, String>,
    diagnostic: &Diagnostic<usize>,
) {
    let _ = term::emit_to_write_style(&mut writer.lock(), config, files, diagnostic);
}
