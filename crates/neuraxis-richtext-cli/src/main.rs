use anyhow::{Context, Result};
use neuraxis_richtext_config::Config;
use neuraxis_richtext_engine::editing::{Cmd, Document, Key, Patch};
use neuraxis_richtext_engine::{io, snapshot};
use serde::Deserialize;
use std::io::{BufRead, BufReader, Write};
use std::{env, fs, path::PathBuf, process};

/// One line of a replay script.
///
/// ```text
/// {"type": "hello @ma"}
/// {"key": "arrow_down"}
/// {"key": {"chord": "mod+b"}}
/// {"click": 0}
/// {"cmd": "insert_break"}
/// ```
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Event {
    Key { key: Key },
    Type { r#type: String },
    Click { click: usize },
    Cmd(Cmd),
}

#[derive(Debug, Default)]
struct Options {
    document: PathBuf,
    script: Option<PathBuf>,
    outline: bool,
    save: Option<PathBuf>,
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} <document.json> [script.jsonl] [--outline] [--save <path>]");
    eprintln!("Reads the script from stdin when no script path is given.");
    process::exit(1);
}

fn program_name(args: &[String]) -> &str {
    args.first().map_or("neuraxis-richtext-cli", String::as_str)
}

fn parse_args(args: &[String]) -> Option<Options> {
    let mut options = Options::default();
    let mut positional = Vec::new();
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--outline" => options.outline = true,
            "--save" => options.save = Some(PathBuf::from(rest.next()?)),
            flag if flag.starts_with("--") => return None,
            path => positional.push(PathBuf::from(path)),
        }
    }
    let mut positional = positional.into_iter();
    options.document = positional.next()?;
    options.script = positional.next();
    if positional.next().is_some() {
        return None;
    }
    Some(options)
}

/// Feed every script line to `doc`. Rejected edits are reported and skipped.
fn replay(doc: &mut Document, script: impl BufRead) -> Result<usize> {
    let mut applied = 0;
    for (number, line) in script.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        let event: Event = serde_json::from_str(line)
            .with_context(|| format!("Invalid event on line {}: {line}", number + 1))?;
        log::debug!("line {}: {event:?}", number + 1);

        let changed = |patch: Option<Patch>| patch.is_some_and(|p| !p.is_empty());
        let outcome = match event {
            Event::Key { key } => doc.handle_key(&key).map(changed),
            Event::Type { r#type } => r#type.chars().try_fold(false, |any, c| {
                doc.handle_key(&Key::Char(c)).map(|p| changed(p) || any)
            }),
            Event::Click { click } => doc.commit_candidate(click).map(|p| changed(Some(p))),
            Event::Cmd(cmd) => doc.apply(cmd).map(|p| changed(Some(p))),
        };
        match outcome {
            Ok(true) => applied += 1,
            Ok(false) => {}
            Err(e) => log::warn!("line {} rejected: {e}", number + 1),
        }
    }
    Ok(applied)
}

fn report(doc: &Document, outline: bool, out: &mut impl Write) -> Result<()> {
    if outline {
        write!(out, "{}", snapshot::outline(doc.value()))?;
    } else {
        writeln!(out, "{}", io::to_json(doc.value())?)?;
    }
    match doc.overlay() {
        Some(overlay) => {
            writeln!(out, "-- mentions (version {})", doc.version())?;
            for (index, candidate) in overlay.candidates.iter().enumerate() {
                let marker = if index == overlay.active_index { ">" } else { " " };
                writeln!(out, "{marker} {candidate}")?;
            }
        }
        None => writeln!(out, "-- no mentions (version {})", doc.version())?,
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    let Some(options) = parse_args(&args) else {
        usage(program_name(&args));
    };

    let config = match Config::load() {
        Ok(Some(config)) => config,
        Ok(None) => {
            log::info!(
                "No config at {}, using defaults",
                Config::config_path().display()
            );
            Config::default()
        }
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let value = io::load_value(&options.document)
        .with_context(|| format!("Failed to load '{}'", options.document.display()))?;
    let mut doc = Document::new(value, config.schema())?
        .with_mentions(config.mention_engine()?)
        .with_hotkeys(config.hotkeys.clone());

    let applied = match &options.script {
        Some(path) => {
            let file = fs::File::open(path)
                .with_context(|| format!("Failed to open script '{}'", path.display()))?;
            replay(&mut doc, BufReader::new(file))?
        }
        None => replay(&mut doc, std::io::stdin().lock())?,
    };
    log::info!("{applied} events changed the document");

    if let Some(path) = &options.save {
        io::save_value(path, doc.value())?;
        log::info!("Saved to {}", path.display());
    }

    report(&doc, options.outline, &mut std::io::stdout().lock())
}
