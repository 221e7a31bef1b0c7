//! Command-line interface for passview
//!
//! Usage:
//!   passview view `<result-file>`                      - Browse a saved pipeline result
//!   passview run `<input>` --pass `<id>`...              - Run passes with the configured tool, then browse
//!   passview highlight `<file>` [--html] [--style `<s>`] - Print a highlighted file
//!   passview styles [--rules]                          - List highlight styles (or tokenizer rules)

mod viewer;

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use passview::config::{ConfigError, Loader, PassviewConfig};
use passview::{
    tokenize, HtmlRenderer, Palette, PipelineFailure, PipelineRunner, RenderStyle, Renderer,
    Session, SessionId, StageStore, StoreError, TerminalRenderer,
};
use ratatui::style::{Color, Modifier};
use ratatui::text::Text;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "PASSVIEW_LOG";

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Pipeline(#[from] PipelineFailure),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("cannot encode pipeline result: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot encode pipeline result: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn view_args() -> [Arg; 5] {
    [
        Arg::new("tab")
            .long("tab")
            .help("Tab to open: sequential, single, double or edit"),
        Arg::new("pass")
            .long("select")
            .help("Stage label for the first pane, e.g. '--cse' or '[2/5] cse'"),
        Arg::new("pass2")
            .long("select2")
            .help("Stage label for the right pane of the double tab"),
        Arg::new("style")
            .long("style")
            .help("Highlight style (see `passview styles`)"),
        Arg::new("no-line-numbers")
            .long("no-line-numbers")
            .help("Start with line numbers hidden")
            .action(ArgAction::SetTrue),
    ]
}

fn cli() -> Command {
    Command::new("passview")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Explore how a program changes across a pipeline of optimizer passes")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Configuration file layered over the built-in defaults")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .global(true)
                .help(format!("Write logs to this file (filter with {LOG_ENV})"))
                .value_hint(ValueHint::FilePath),
        )
        .subcommand(
            Command::new("view")
                .about("Browse a saved pipeline result (JSON or YAML)")
                .arg(
                    Arg::new("path")
                        .help("Pipeline result file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .args(view_args()),
        )
        .subcommand(
            Command::new("run")
                .about("Run passes over an input file, then browse the stages")
                .arg(
                    Arg::new("path")
                        .help("Input program")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("passes")
                        .long("pass")
                        .short('p')
                        .help("Pass identifier; repeat for each pass, in order")
                        .action(ArgAction::Append)
                        .allow_hyphen_values(true),
                )
                .arg(
                    Arg::new("program")
                        .long("program")
                        .help("Optimizer to run each pass with (default from config)"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Save the pipeline result instead of opening the viewer")
                        .value_hint(ValueHint::FilePath),
                )
                .args(view_args()),
        )
        .subcommand(
            Command::new("highlight")
                .about("Print a highlighted file")
                .arg(
                    Arg::new("path")
                        .help("File to highlight")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("html")
                        .long("html")
                        .help("Emit HTML instead of terminal colours")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("embedded")
                        .long("embedded")
                        .help("With --html, inline all styles instead of emitting a stylesheet")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("tokens")
                        .long("tokens")
                        .help("Print the token stream as JSON")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("html"),
                )
                .args(view_args().into_iter().skip(3)),
        )
        .subcommand(
            Command::new("styles")
                .about("List the available highlight styles")
                .arg(
                    Arg::new("rules")
                        .long("rules")
                        .help("List the tokenizer rules instead")
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn main() {
    let matches = cli().get_matches();

    if let Err(err) = init_logging(matches.get_one::<String>("log-file")) {
        eprintln!("Error: cannot open log file: {err}");
        std::process::exit(1);
    }

    let result = match matches.subcommand() {
        Some(("view", sub)) => handle_view_command(sub),
        Some(("run", sub)) => handle_run_command(sub),
        Some(("highlight", sub)) => handle_highlight_command(sub),
        Some(("styles", sub)) => {
            handle_styles_command(sub.get_flag("rules"));
            Ok(())
        }
        _ => unreachable!("clap requires a subcommand"),
    };

    if let Err(err) = result {
        tracing::warn!("{err}");
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

/// Install a file logger; without `--log-file` events are discarded, since
/// the viewer owns the terminal.
fn init_logging(log_file: Option<&String>) -> io::Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

/// Defaults, then `--config`, then the command-line view options
fn load_config(matches: &ArgMatches) -> Result<PassviewConfig, ConfigError> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    for (arg, key) in [
        ("tab", "view.tab"),
        ("pass", "view.pass"),
        ("pass2", "view.pass2"),
        ("style", "view.highlight_style"),
        ("program", "runner.program"),
    ] {
        if let Ok(Some(value)) = matches.try_get_one::<String>(arg) {
            loader = loader.set_override(key, value.as_str())?;
        }
    }
    if matches!(matches.try_get_one::<bool>("no-line-numbers"), Ok(Some(true))) {
        loader = loader.set_override("view.line_numbers", false)?;
    }
    loader.build()
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("unknown")
        .to_string()
}

fn open_viewer(
    store: StageStore,
    config: &PassviewConfig,
    runner: Box<dyn PipelineRunner>,
    path: &str,
) -> Result<(), CliError> {
    let session = Session::from_config(store, &config.view)?;
    viewer::viewer_main::run_viewer(session, runner, &file_name(path))?;
    Ok(())
}

fn handle_view_command(matches: &ArgMatches) -> Result<(), CliError> {
    let config = load_config(matches)?;
    let path = matches
        .get_one::<String>("path")
        .expect("path is required");
    let store = StageStore::load(path)?;
    tracing::info!(path = %path, passes = store.pass_count(), "loaded pipeline result");
    open_viewer(store, &config, Box::new(config.runner.runner()), path)
}

fn handle_run_command(matches: &ArgMatches) -> Result<(), CliError> {
    let config = load_config(matches)?;
    let path = matches
        .get_one::<String>("path")
        .expect("path is required");
    let passes: Vec<String> = matches
        .get_many::<String>("passes")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let input = std::fs::read(path)?;
    let mut runner = config.runner.runner();
    tracing::info!(program = runner.program(), passes = passes.len(), "running pipeline");
    let store = runner.run(&input, &passes)?;

    match matches.get_one::<String>("output") {
        Some(output) => save_result(&store, output),
        None => open_viewer(store, &config, Box::new(runner), path),
    }
}

fn save_result(store: &StageStore, output: &str) -> Result<(), CliError> {
    let result = store.to_result();
    let encoded = match Path::new(output).extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::to_string(&result)?,
        _ => serde_json::to_string_pretty(&result)?,
    };
    std::fs::write(output, encoded)?;
    println!("Wrote {} stages to {output}", store.stage_count());
    Ok(())
}

fn handle_highlight_command(matches: &ArgMatches) -> Result<(), CliError> {
    let config = load_config(matches)?;
    let path = matches
        .get_one::<String>("path")
        .expect("path is required");
    let source = std::fs::read_to_string(path)?;
    let tokens = tokenize(&source);

    if matches.get_flag("tokens") {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
        return Ok(());
    }

    let style = RenderStyle {
        highlight_style: config.view.highlight_style.clone(),
        show_line_numbers: config.view.line_numbers,
        embedded: matches.get_flag("embedded"),
    };

    if matches.get_flag("html") {
        let renderer = HtmlRenderer::new(SessionId::generate());
        if !style.embedded {
            println!("<style>\n{}</style>", renderer.style_defs(style.palette()));
        }
        println!("{}", renderer.render(&tokens, &style));
        return Ok(());
    }

    print_ansi(&TerminalRenderer.render(&tokens, &style))?;
    Ok(())
}

/// Write styled text to stdout with ANSI escapes
fn print_ansi(text: &Text<'_>) -> io::Result<()> {
    use crossterm::style::{Attribute, Color as TermColor, Print, SetAttribute, SetForegroundColor};
    use crossterm::QueueableCommand;

    let mut out = io::stdout().lock();
    for line in &text.lines {
        for span in &line.spans {
            let style = text.style.patch(line.style).patch(span.style);
            if let Some(Color::Rgb(r, g, b)) = style.fg {
                out.queue(SetForegroundColor(TermColor::Rgb { r, g, b }))?;
            }
            if style.add_modifier.contains(Modifier::BOLD) {
                out.queue(SetAttribute(Attribute::Bold))?;
            }
            if style.add_modifier.contains(Modifier::ITALIC) {
                out.queue(SetAttribute(Attribute::Italic))?;
            }
            out.queue(Print(span.content.as_ref()))?;
            out.queue(SetAttribute(Attribute::Reset))?;
        }
        out.queue(Print("\n"))?;
    }
    out.flush()
}

fn handle_styles_command(rules: bool) {
    if rules {
        for (index, (kind, pattern)) in passview::tokenizer::rule_table().enumerate() {
            println!("{index:>3}  {:<12} {pattern}", kind.to_string());
        }
        return;
    }

    let default = Palette::default_palette().name;
    for name in Palette::names() {
        if name == default {
            println!("  {name} (default)");
        } else {
            println!("  {name}");
        }
    }
}
