//! Line-oriented terminal front end for a running routine.

use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::models::{Routine, Segment, SegmentGroup, SegmentId};
use crate::persistence::RoutineStore;
use crate::timer::{RoutineSnapshot, SegmentState, SegmentView, TimerController, TimerStatus};
use crate::utils::duration::{format_ms, parse_duration};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

const HELP: &str = "commands: <enter>/c confirm | p play/pause | r reset | s save | l list \
| open NAME | del NAME | add time NAME DURATION | add manual NAME | add repeat NAME CYCLES \
| end [before|after INDEX] | ins before|after INDEX time NAME DURATION | ins before|after INDEX manual NAME \
| edit INDEX name|time|repeats VALUE | rm INDEX | q quit";

/// A leaf typed on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewSegment {
    Time { name: String, total_ms: u64 },
    Manual { name: String },
}

impl NewSegment {
    fn parse(words: &[&str]) -> Result<Self> {
        let segment = match words {
            ["time", name @ .., duration] if !name.is_empty() => NewSegment::Time {
                name: name.join(" "),
                total_ms: parse_duration(duration)
                    .ok_or_else(|| anyhow!("'{duration}' is not a duration (try 90s or 1m30s)"))?,
            },
            ["manual", name @ ..] if !name.is_empty() => NewSegment::Manual {
                name: name.join(" "),
            },
            _ => bail!("expected 'time NAME DURATION' or 'manual NAME'"),
        };
        Ok(segment)
    }

    fn build(self) -> Segment {
        match self {
            NewSegment::Time { name, total_ms } => Segment::time(name, total_ms),
            NewSegment::Manual { name } => Segment::manual(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Before,
    After,
}

impl FromStr for Side {
    type Err = anyhow::Error;

    fn from_str(word: &str) -> Result<Self> {
        match word {
            "before" => Ok(Side::Before),
            "after" => Ok(Side::After),
            _ => bail!("expected 'before' or 'after', got '{word}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentEdit {
    Name(String),
    TotalTime(u64),
    Repeats(u32),
}

impl SegmentEdit {
    fn apply(self, segment: &mut Segment) -> Result<()> {
        match self {
            SegmentEdit::Name(name) => segment.set_name(name),
            SegmentEdit::TotalTime(total_ms) => {
                let name = segment.name().to_string();
                segment
                    .as_time_mut()
                    .ok_or_else(|| anyhow!("'{name}' is not a time segment"))?
                    .set_total_time(total_ms)
            }
            SegmentEdit::Repeats(cycles) => {
                let name = segment.name().to_string();
                segment
                    .as_repeat_mut()
                    .ok_or_else(|| anyhow!("'{name}' is not a repeat"))?
                    .set_new_repeats(cycles)?
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Confirm,
    PlayPause,
    Reset,
    Save,
    List,
    Open(String),
    Delete(String),
    Add(NewSegment),
    /// Opens a repeat; following adds go into it until `end`.
    BeginRepeat { name: String, cycles: u32 },
    /// Closes the innermost open repeat, appending it or placing it next to a segment.
    EndRepeat(Option<(Side, usize)>),
    Insert {
        side: Side,
        anchor: usize,
        segment: NewSegment,
    },
    Edit { index: usize, edit: SegmentEdit },
    Remove(usize),
    Help,
    Quit,
}

fn parse_index(word: &str) -> Result<usize> {
    word.parse()
        .with_context(|| format!("'{word}' is not a segment index"))
}

fn parse_cycles(word: &str) -> Result<u32> {
    match word.parse() {
        Ok(cycles) if cycles > 0 => Ok(cycles),
        _ => bail!("'{word}' is not a positive cycle count"),
    }
}

impl FromStr for ShellCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let command = match words.as_slice() {
            [] | ["c"] => ShellCommand::Confirm,
            ["p"] => ShellCommand::PlayPause,
            ["r"] => ShellCommand::Reset,
            ["s"] => ShellCommand::Save,
            ["l"] => ShellCommand::List,
            ["q"] => ShellCommand::Quit,
            ["h"] | ["?"] | ["help"] => ShellCommand::Help,
            ["open", name @ ..] if !name.is_empty() => ShellCommand::Open(name.join(" ")),
            ["del", name @ ..] if !name.is_empty() => ShellCommand::Delete(name.join(" ")),
            ["add", "repeat", name @ .., cycles] if !name.is_empty() => ShellCommand::BeginRepeat {
                name: name.join(" "),
                cycles: parse_cycles(cycles)?,
            },
            ["add", rest @ ..] => ShellCommand::Add(NewSegment::parse(rest)?),
            ["end"] => ShellCommand::EndRepeat(None),
            ["end", side, anchor] => {
                ShellCommand::EndRepeat(Some((side.parse()?, parse_index(anchor)?)))
            }
            ["ins", side, anchor, rest @ ..] => ShellCommand::Insert {
                side: side.parse()?,
                anchor: parse_index(anchor)?,
                segment: NewSegment::parse(rest)?,
            },
            ["edit", index, field, value @ ..] if !value.is_empty() => {
                let edit = match (*field, value) {
                    ("name", name) => SegmentEdit::Name(name.join(" ")),
                    ("time", [duration]) => SegmentEdit::TotalTime(
                        parse_duration(duration)
                            .ok_or_else(|| anyhow!("'{duration}' is not a duration"))?,
                    ),
                    ("repeats", [cycles]) => SegmentEdit::Repeats(parse_cycles(cycles)?),
                    _ => bail!("expected 'edit INDEX name|time|repeats VALUE'"),
                };
                ShellCommand::Edit {
                    index: parse_index(index)?,
                    edit,
                }
            }
            ["rm", index] => ShellCommand::Remove(parse_index(index)?),
            _ => bail!("unknown command '{}'", line.trim()),
        };
        Ok(command)
    }
}

/// A repeat being typed in; it joins the routine once closed with `end`.
#[derive(Debug)]
struct RepeatDraft {
    name: String,
    cycles: u32,
    children: Vec<Segment>,
}

/// Reads commands from stdin until `q` or end of input, then stops the timer and
/// returns the routine.
pub async fn run_shell(controller: TimerController, store: RoutineStore) -> Result<Routine> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut snapshots = controller.subscribe();
    let mut last_status = String::new();
    let mut drafts: Vec<RepeatDraft> = Vec::new();

    println!("{HELP}");
    print_routine(&controller.snapshot());

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read from stdin")? else { break };
                match line.parse::<ShellCommand>() {
                    Ok(ShellCommand::Quit) => break,
                    Ok(command) => {
                        log_debug!("shell command {:?}", command);
                        if let Err(err) = execute(&controller, &store, &mut drafts, command).await {
                            log_warn!("command failed: {err:#}");
                            println!("error: {err:#}");
                        }
                    }
                    Err(err) => println!("{err}"),
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = status_line(&snapshots.borrow_and_update());
                if status != last_status {
                    println!("{status}");
                    last_status = status;
                }
            }
        }
    }

    if !drafts.is_empty() {
        log_warn!("discarding {} unfinished repeat(s)", drafts.len());
    }
    controller.shutdown().await
}

fn segment_id_at(routine: &Routine, index: usize) -> Result<SegmentId> {
    routine
        .segment_at(index)
        .map(Segment::id)
        .ok_or_else(|| anyhow!("no segment at index {index}"))
}

/// Places `segment` at the end of the routine or next to the segment at a flat index.
async fn place(
    controller: &TimerController,
    segment: Segment,
    at: Option<(Side, usize)>,
) -> Result<()> {
    controller
        .execute(move |routine| -> Result<()> {
            match at {
                None => routine.add(segment),
                Some((Side::Before, index)) => {
                    let anchor = segment_id_at(routine, index)?;
                    routine.insert_before(segment, anchor)?
                }
                Some((Side::After, index)) => {
                    let anchor = segment_id_at(routine, index)?;
                    routine.insert_after(segment, anchor)?
                }
            }
            Ok(())
        })
        .await??;
    print_routine(&controller.snapshot());
    Ok(())
}

async fn execute(
    controller: &TimerController,
    store: &RoutineStore,
    drafts: &mut Vec<RepeatDraft>,
    command: ShellCommand,
) -> Result<()> {
    match command {
        ShellCommand::Confirm => controller.confirm()?,
        ShellCommand::PlayPause => controller.toggle()?,
        ShellCommand::Reset => controller.reset()?,
        ShellCommand::Save => {
            let routine = controller.execute(|routine| routine.clone()).await?;
            let path = store.save(&routine)?;
            println!("saved to {}", path.display());
        }
        ShellCommand::List => {
            let names = store.list()?;
            if names.is_empty() {
                println!("no saved routines in {}", store.root().display());
            }
            for name in names {
                println!("  {name}");
            }
        }
        ShellCommand::Open(name) => {
            let routine = store
                .load(&name)
                .with_context(|| format!("failed to load routine '{name}'"))?;
            drafts.clear();
            controller.load(routine)?;
            // Round trip so the snapshot below already shows the new routine.
            controller.execute(|_| ()).await?;
            print_routine(&controller.snapshot());
        }
        ShellCommand::Delete(name) => {
            store.delete(&name)?;
            println!("deleted '{name}'");
        }
        ShellCommand::Add(segment) => match drafts.last_mut() {
            Some(draft) => {
                println!("  + {} (in '{}')", segment_label(&segment), draft.name);
                draft.children.push(segment.build());
            }
            None => place(controller, segment.build(), None).await?,
        },
        ShellCommand::BeginRepeat { name, cycles } => {
            println!("building repeat '{name}' x{cycles}; add segments, then 'end'");
            drafts.push(RepeatDraft {
                name,
                cycles,
                children: Vec::new(),
            });
        }
        ShellCommand::EndRepeat(at) => {
            match drafts.as_slice() {
                [] => bail!("no repeat is open"),
                [.., draft] if draft.children.is_empty() => {
                    bail!("repeat '{}' has no segments yet", draft.name)
                }
                [_, _, ..] if at.is_some() => {
                    bail!("a nested repeat always ends up inside its parent")
                }
                _ => {}
            }
            let Some(draft) = drafts.pop() else {
                bail!("no repeat is open")
            };
            let repeat = Segment::repeat(draft.name, draft.cycles, draft.children)?;
            match drafts.last_mut() {
                Some(parent) => parent.children.push(repeat),
                None => place(controller, repeat, at).await?,
            }
        }
        ShellCommand::Insert {
            side,
            anchor,
            segment,
        } => place(controller, segment.build(), Some((side, anchor))).await?,
        ShellCommand::Edit { index, edit } => {
            controller
                .execute(move |routine| -> Result<()> {
                    let id = segment_id_at(routine, index)?;
                    routine.edit_segment(id, |segment| edit.apply(segment))?
                })
                .await??;
            print_routine(&controller.snapshot());
        }
        ShellCommand::Remove(index) => {
            let removed = controller
                .execute(move |routine| {
                    let id = segment_id_at(routine, index)?;
                    routine.remove(id).map_err(anyhow::Error::from)
                })
                .await??;
            println!("removed '{}'", removed.name());
            print_routine(&controller.snapshot());
        }
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Quit => {}
    }
    Ok(())
}

fn segment_label(segment: &NewSegment) -> String {
    match segment {
        NewSegment::Time { name, total_ms } => format!("{name} {}", format_ms(*total_ms, false)),
        NewSegment::Manual { name } => name.clone(),
    }
}

/// One line per second of progress at most; centiseconds are left out on purpose.
pub fn status_line(snapshot: &RoutineSnapshot) -> String {
    let status = match snapshot.timer.status {
        TimerStatus::Idle => "idle",
        TimerStatus::Running => "running",
        TimerStatus::Paused => "paused",
        TimerStatus::Finished => "finished",
    };

    match snapshot.current_segment() {
        Some(SegmentView {
            name,
            time_ms: Some((elapsed, total)),
            ..
        }) => format!(
            "[{status}] {name} {}/{} ({})",
            format_ms(*elapsed, false),
            format_ms(*total, false),
            format_ms(snapshot.timer.elapsed_ms, false)
        ),
        Some(view) => format!("[{status}] {} - press enter to confirm", view.name),
        None => format!("[{status}] {}", snapshot.name),
    }
}

fn print_routine(snapshot: &RoutineSnapshot) {
    println!("{}", snapshot.name);
    for view in &snapshot.segments {
        let marker = match view.state {
            SegmentState::Complete => "x",
            SegmentState::Current => ">",
            SegmentState::Pending => " ",
        };
        println!(
            "{:>3} {marker} {}{} [{}] {}",
            view.index,
            "  ".repeat(view.depth),
            view.name,
            view.kind.as_str(),
            view.detail
        );
    }
}
