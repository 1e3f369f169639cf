/**
 * Natural Expression CLI - nexpr
 *
 * Evaluates templates, extracts binding keys and prints parse trees
 */
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use natural_expr::{Dialect, ParseOptions};
use natural_expr_cli::{commands, CliConfig, DataSource};
use tracing_subscriber::EnvFilter;

fn template_arg() -> Arg {
    Arg::new("template")
        .required(true)
        .value_name("TEMPLATE")
        .help("Template text, e.g. 'Hello {name}'")
}

fn parse_flags() -> [Arg; 4] {
    [
        Arg::new("config")
            .long("config")
            .value_name("FILE")
            .value_parser(clap::value_parser!(PathBuf))
            .help("Path to nexpr.json (defaults to ./nexpr.json when present)"),
        Arg::new("dialect")
            .long("dialect")
            .value_name("DIALECT")
            .value_parser(["classic", "extended"])
            .help("Grammar dialect"),
        Arg::new("no-memo")
            .long("no-memo")
            .action(ArgAction::SetTrue)
            .help("Disable packrat memoization"),
        Arg::new("source")
            .long("source")
            .value_name("NAME")
            .help("Source name reported in syntax errors"),
    ]
}

fn cli() -> Command {
    Command::new("nexpr")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Brace-delimited template expressions")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("eval")
                .about("Evaluate a template against a data object")
                .arg(template_arg())
                .arg(
                    Arg::new("data")
                        .long("data")
                        .value_name("JSON")
                        .conflicts_with("context")
                        .help("Inline JSON data object"),
                )
                .arg(
                    Arg::new("context")
                        .long("context")
                        .value_name("FILE")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("File containing the JSON data object"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the raw value as JSON"),
                )
                .args(parse_flags()),
        )
        .subcommand(
            Command::new("keys")
                .about("Print the data keys a template depends on")
                .arg(template_arg()),
        )
        .subcommand(
            Command::new("ast")
                .about("Print the canonical form of each template segment")
                .arg(template_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the full tree as JSON"),
                )
                .args(parse_flags()),
        )
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<CliConfig> {
    let path = match matches.get_one::<PathBuf>("config") {
        Some(path) => Some(path.clone()),
        None => std::env::current_dir()
            .ok()
            .and_then(|dir| CliConfig::discover(&dir)),
    };
    match path {
        Some(path) => CliConfig::load(&path),
        None => Ok(CliConfig::default()),
    }
}

/// Config file options overridden by command line flags
fn parse_options(matches: &ArgMatches, config: &CliConfig) -> anyhow::Result<ParseOptions> {
    let mut options = config.options.clone();
    if let Some(dialect) = matches.get_one::<String>("dialect") {
        let dialect: Dialect = dialect.parse().map_err(anyhow::Error::msg)?;
        options = options.with_dialect(dialect);
    }
    if matches.get_flag("no-memo") {
        options = options.with_memoize(false);
    }
    if let Some(source) = matches.get_one::<String>("source") {
        options = options.with_source_name(source.as_str());
    }
    Ok(options)
}

fn run(matches: &ArgMatches) -> anyhow::Result<String> {
    match matches.subcommand() {
        Some(("eval", sub)) => {
            let config = load_config(sub)?;
            let options = parse_options(sub, &config)?;
            let template = sub
                .get_one::<String>("template")
                .context("missing template")?;
            let data = match (
                sub.get_one::<String>("data"),
                sub.get_one::<PathBuf>("context"),
            ) {
                (Some(inline), _) => DataSource::Inline(inline),
                (None, Some(path)) => DataSource::File(Path::new(path)),
                (None, None) => DataSource::Empty,
            };
            commands::eval(template, &data, &config, &options, sub.get_flag("json"))
        }
        Some(("keys", sub)) => {
            let template = sub
                .get_one::<String>("template")
                .context("missing template")?;
            commands::keys(template)
        }
        Some(("ast", sub)) => {
            let config = load_config(sub)?;
            let options = parse_options(sub, &config)?;
            let template = sub
                .get_one::<String>("template")
                .context("missing template")?;
            commands::ast(template, &options, sub.get_flag("json"))
        }
        _ => unreachable!("subcommand is required"),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    match run(&matches) {
        Ok(output) => println!("{}", output),
        Err(err) => {
            eprintln!("error: {:#}", err);
            process::exit(1);
        }
    }
}
