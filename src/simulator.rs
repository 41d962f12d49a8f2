use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt as _, BufReader};

use crate::cli::{InjectArgs, SimulateArgs};
use crate::mraid::frame::{DirFrame, FrameContext, RecordingFrame, ShimFrame};
use crate::mraid::harness::{Harness, HttpCreativeFetcher, LoadResult};
use crate::mraid::shim::MraidState;

pub async fn inject(args: InjectArgs) -> anyhow::Result<()> {
    let fetcher = Arc::new(HttpCreativeFetcher::new()?);
    let mut harness = Harness::new(fetcher, RecordingFrame::new());
    let result = harness.load_playable(&args.url).await?;

    let out = PathBuf::from(&args.out);
    let document = harness
        .frame()
        .document()
        .ok_or_else(|| anyhow::anyhow!("frame has no document"))?;
    std::fs::write(&out, document).with_context(|| format!("write: {}", out.display()))?;
    eprint!("{}", harness.log().text());

    if result == LoadResult::Failed {
        anyhow::bail!("failed to load playable: {}", args.url);
    }
    Ok(())
}

/// One line of the interactive control panel.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    Volume(u8),
    State(MraidState),
    Event { name: String, args: Vec<Value> },
    Reload,
    Log,
    ClearLog,
    Quit,
}

pub fn parse_command(line: &str) -> anyhow::Result<Option<ControlCommand>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "volume" => {
            let percent: u8 = rest
                .trim_end_matches('%')
                .parse()
                .with_context(|| format!("volume expects 0-100, got {rest:?}"))?;
            if percent > 100 {
                anyhow::bail!("volume expects 0-100, got {percent}");
            }
            ControlCommand::Volume(percent)
        }
        "state" => ControlCommand::State(rest.parse()?),
        "event" => {
            let (name, raw_args) = match rest.split_once(char::is_whitespace) {
                Some((name, raw)) => (name, raw.trim()),
                None => (rest, ""),
            };
            if name.is_empty() {
                anyhow::bail!("event expects a name");
            }
            let args = if raw_args.is_empty() {
                Vec::new()
            } else {
                match serde_json::from_str::<Value>(raw_args).context("parse event args json")? {
                    Value::Array(values) => values,
                    other => vec![other],
                }
            };
            ControlCommand::Event {
                name: name.to_string(),
                args,
            }
        }
        "reload" => ControlCommand::Reload,
        "log" => ControlCommand::Log,
        "clear-log" | "clear" => ControlCommand::ClearLog,
        "quit" | "exit" => ControlCommand::Quit,
        other => anyhow::bail!("unknown command: {other}"),
    };
    Ok(Some(command))
}

/// Applies one command; returns `false` when the session should end.
pub async fn apply_command<C: FrameContext>(
    harness: &mut Harness<C>,
    command: ControlCommand,
) -> anyhow::Result<bool> {
    match command {
        ControlCommand::Volume(percent) => {
            harness.set_volume(percent);
            println!("{}", harness.volume_label());
        }
        ControlCommand::State(state) => {
            harness.set_state(state);
            println!("{}", harness.state_label());
        }
        ControlCommand::Event { name, args } => {
            harness.send_event_to_ad(&name, args);
        }
        ControlCommand::Reload => {
            harness.reload_current_ad().await?;
        }
        ControlCommand::Log => print!("{}", harness.log().text()),
        ControlCommand::ClearLog => harness.clear_log(),
        ControlCommand::Quit => return Ok(false),
    }
    Ok(true)
}

pub async fn simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let dir_frame = DirFrame::new(&args.out)?;
    let document_path = dir_frame.document_path();
    let fetcher = Arc::new(HttpCreativeFetcher::new()?);
    let mut harness = Harness::new(fetcher, ShimFrame::new(dir_frame));

    harness.load_playable(&args.url).await?;
    println!("frame document: {}", document_path.display());
    print_observed(harness.frame());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("read control command")? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("{err:#}");
                continue;
            }
        };
        let keep_going = apply_command(&mut harness, command).await?;
        print_observed(harness.frame());
        if !keep_going {
            break;
        }
    }
    Ok(())
}

/// Prints what the creative's listeners received since the last call.
fn print_observed<F: FrameContext>(frame: &ShimFrame<F>) {
    for observed in frame.take_observed() {
        println!("creative saw: {} {}", observed.event, Value::Array(observed.args));
    }
}
