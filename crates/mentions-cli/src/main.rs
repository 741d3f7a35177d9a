use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Serialize;

use mentions_core::{
    AutoCompleter, Candidate, EventOutcome, InputEvent, Key, Mention, MentionSet, MentionsConfig,
    MentionsInput, PlainSurface, QueryState, RequestMode, Responder, TextSurface, parse_syntax,
    render,
};

mod script;

use script::Step;

#[derive(Parser)]
#[command(version, about = "Mention-aware text input engine", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render raw text and mentions to syntax text and highlight markup
    Render {
        /// Raw text
        #[arg(long)]
        text: String,

        /// Mention as `type:id:value` (repeatable, in insertion order)
        #[arg(long = "mention", value_name = "TYPE:ID:VALUE")]
        mentions: Vec<String>,
    },
    /// Decode a syntax-encoded message into plain text and mentions
    Parse {
        message: String,
    },
    /// Replay a keystroke script against a mentions input
    Replay {
        /// JSON array of candidates served by the data source
        #[arg(long)]
        candidates: PathBuf,

        /// JSON widget configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Keystrokes; see `{left}`, `{enter}`, `{bs}` and friends
        script: String,
    },
}

fn main() -> Result<()> {
    init_miette();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render { text, mentions } => {
            let mentions = mentions
                .iter()
                .map(|spec| parse_mention_arg(spec))
                .collect::<Result<MentionSet>>()?;
            print_json(&render(&text, &mentions, &()))?;
        }
        Commands::Parse { message } => {
            print_json(&parse_syntax(&message))?;
        }
        Commands::Replay {
            candidates,
            config,
            script,
        } => {
            let report = replay(&candidates, config.as_deref(), &script)?;
            print_json(&report)?;
        }
    }

    Ok(())
}

fn parse_mention_arg(spec: &str) -> Result<Mention> {
    let mut parts = spec.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(kind), Some(id), Some(value)) if !value.is_empty() => {
            Ok(Mention::new(id, kind, value))
        }
        _ => Err(miette::miette!(
            help = "expected `type:id:value`, e.g. `contact:7:John Smith`",
            "invalid mention `{spec}`"
        )),
    }
}

#[derive(Serialize)]
struct ReplayReport {
    text: String,
    caret: usize,
    value: String,
    mentions: MentionSet,
    highlight: String,
    query: Option<String>,
    suppressed: bool,
    dropdown: Vec<DropdownRow>,
}

#[derive(Serialize)]
struct DropdownRow {
    id: Option<String>,
    label_html: String,
    active: bool,
}

fn replay(candidates: &Path, config: Option<&Path>, script: &str) -> Result<ReplayReport> {
    let json = std::fs::read_to_string(candidates)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading {}", candidates.display()))?;
    let directory: Vec<Candidate> = serde_json::from_str(&json)
        .into_diagnostic()
        .wrap_err("candidates must be a JSON array")?;

    let config = match config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("reading {}", path.display()))?;
            MentionsConfig::from_json(&json)?
        }
        None => MentionsConfig::default(),
    };

    let mut input = MentionsInput::builder(PlainSurface::new())
        .config(config)
        .data_source(move |_: RequestMode, query: &str, responder: Responder| {
            let needle = query.to_lowercase();
            let hits = directory
                .iter()
                .filter(|c| {
                    c.name
                        .as_deref()
                        .is_some_and(|name| name.to_lowercase().contains(&needle))
                })
                .cloned()
                .collect();
            responder.respond(hits);
        })
        .build()?;

    for step in script::parse(script)? {
        tracing::trace!(?step, "replaying");
        apply_step(&mut input, step)?;
    }
    input.flush();

    let state = input.query_state();
    let list = input.autocompleter();
    Ok(ReplayReport {
        text: input.surface().text(),
        caret: input.surface().caret(),
        value: input.value(),
        mentions: input.mentions().clone(),
        highlight: input.rendered().highlight.clone(),
        query: state.query().map(str::to_string),
        suppressed: *state == QueryState::Suppressed,
        dropdown: if list.is_visible() {
            list.items()
                .iter()
                .enumerate()
                .map(|(i, item)| DropdownRow {
                    id: item.candidate.id.as_ref().map(|id| id.to_string()),
                    label_html: item.label_html.clone(),
                    active: list.active_index() == Some(i),
                })
                .collect()
        } else {
            Vec::new()
        },
    })
}

fn apply_step(input: &mut MentionsInput<PlainSurface>, step: Step) -> Result<()> {
    match step {
        Step::Type(c) => type_char(input, c)?,
        Step::Enter => {
            if input.handle_event(InputEvent::KeyDown(Key::Return))? == EventOutcome::Continue {
                input.handle_event(InputEvent::KeyPress('\n'))?;
                input.surface_mut().type_str("\n");
                input.handle_event(InputEvent::Input)?;
            }
        }
        Step::Backspace => {
            input.handle_event(InputEvent::KeyDown(Key::Backspace))?;
            if input.surface_mut().backspace() {
                input.handle_event(InputEvent::Input)?;
            }
        }
        Step::Left => move_caret(input, Key::ArrowLeft, |s| s.move_caret(-1))?,
        Step::Right => move_caret(input, Key::ArrowRight, |s| s.move_caret(1))?,
        Step::Home => move_caret(input, Key::Home, |s| s.move_caret(isize::MIN))?,
        Step::End => move_caret(input, Key::End, |s| s.move_caret(isize::MAX))?,
        Step::Up => {
            input.handle_event(InputEvent::KeyDown(Key::ArrowUp))?;
        }
        Step::Down => {
            input.handle_event(InputEvent::KeyDown(Key::ArrowDown))?;
        }
        Step::Tab => {
            input.handle_event(InputEvent::KeyDown(Key::Tab))?;
        }
        Step::Escape => {
            input.handle_event(InputEvent::KeyDown(Key::Escape))?;
        }
        Step::Click => {
            input.handle_event(InputEvent::Click)?;
        }
        Step::Blur => {
            input.surface_mut().blur();
            input.handle_event(InputEvent::Blur)?;
        }
    }
    Ok(())
}

fn type_char(input: &mut MentionsInput<PlainSurface>, c: char) -> Result<()> {
    let key = if c == ' ' { Key::Space } else { Key::Other };
    input.handle_event(InputEvent::KeyDown(key))?;
    input.handle_event(InputEvent::KeyPress(c))?;
    input.surface_mut().type_str(&c.to_string());
    input.handle_event(InputEvent::Input)?;
    Ok(())
}

fn move_caret(
    input: &mut MentionsInput<PlainSurface>,
    key: Key,
    apply: impl FnOnce(&mut PlainSurface),
) -> Result<()> {
    input.handle_event(InputEvent::KeyDown(key))?;
    apply(input.surface_mut());
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{json}");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}
