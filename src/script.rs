use anyhow::{bail, Context, Result};
use scorehud_core::SimTick;
use serde::Deserialize;
use std::{
    collections::{BTreeMap, VecDeque},
    fs,
    path::Path,
};

/// Script used when no `--script` is given.
pub const DEMO_SCRIPT: &str = r#"{
    "tokens": {"Alice": 12},
    "steps": [
        {"tick": 1, "event": "balance Alice 1500"},
        {"tick": 1, "event": "join Alice"},
        {"tick": 5, "event": "release"},
        {"tick": 30, "event": "join Bob"},
        {"tick": 45, "event": "health Alice 13.5"},
        {"tick": 50, "event": "activity Alice"},
        {"tick": 55, "event": "release"},
        {"tick": 70, "event": "cmd Bob toggle"},
        {"tick": 90, "event": "console reload"},
        {"tick": 110, "event": "cmd Bob toggle"},
        {"tick": 130, "event": "tps 18.25"},
        {"tick": 160, "event": "quit Bob"}
    ]
}"#;

#[derive(Debug, Deserialize)]
struct EventScriptFile {
    #[serde(default)]
    tokens: BTreeMap<String, i64>,
    steps: Vec<EventScriptStepDef>,
}

#[derive(Debug, Clone, Deserialize)]
struct EventScriptStepDef {
    tick: u64,
    event: String,
}

/// Something that happens to the fake server during a headless run.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptEvent {
    Join(String),
    Quit(String),
    Health(String, f32),
    Balance(String, i64),
    /// Answer every outstanding economy request.
    Release,
    Activity(String),
    Tps(f32),
    /// `/scorehud` typed by a subject, or by the console when `sender` is `None`.
    Command {
        sender: Option<String>,
        args: Vec<String>,
    },
}

impl ScriptEvent {
    pub fn parse(line: &str) -> Result<Self> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let event = match words.as_slice() {
            ["join", name] => Self::Join(name.to_string()),
            ["quit", name] => Self::Quit(name.to_string()),
            ["health", name, value] => Self::Health(
                name.to_string(),
                value.parse().with_context(|| format!("bad health in `{line}`"))?,
            ),
            ["balance", name, value] => Self::Balance(
                name.to_string(),
                value.parse().with_context(|| format!("bad balance in `{line}`"))?,
            ),
            ["release"] => Self::Release,
            ["activity", name] => Self::Activity(name.to_string()),
            ["tps", value] => Self::Tps(
                value
                    .parse()
                    .with_context(|| format!("bad tps in `{line}`"))?,
            ),
            ["cmd", name, args @ ..] => Self::Command {
                sender: Some(name.to_string()),
                args: args.iter().map(|a| a.to_string()).collect(),
            },
            ["console", args @ ..] => Self::Command {
                sender: None,
                args: args.iter().map(|a| a.to_string()).collect(),
            },
            _ => bail!("unrecognised script event `{line}`"),
        };
        Ok(event)
    }
}

/// Deterministic event script runner.
///
/// Scripts are a list of `{tick, event}` steps, executed in file order, plus
/// an optional token table for the fake token plugin.
#[derive(Debug)]
pub struct EventScript {
    tokens: BTreeMap<String, i64>,
    pending: VecDeque<(SimTick, ScriptEvent)>,
}

impl EventScript {
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        Self::from_str(&contents)
    }

    pub fn from_str(contents: &str) -> Result<Self> {
        let file: EventScriptFile = serde_json::from_str(contents)?;
        if file.steps.is_empty() {
            bail!("event script contains no steps");
        }

        let mut pending = VecDeque::with_capacity(file.steps.len());
        let mut last_tick: Option<u64> = None;
        for step in file.steps {
            if let Some(prev) = last_tick {
                if step.tick < prev {
                    bail!("event script steps must be sorted by tick");
                }
            }
            last_tick = Some(step.tick);
            pending.push_back((SimTick(step.tick), ScriptEvent::parse(step.event.trim())?));
        }

        Ok(Self {
            tokens: file.tokens,
            pending,
        })
    }

    pub fn tokens(&self) -> &BTreeMap<String, i64> {
        &self.tokens
    }

    /// Drain and return all events scheduled for ticks `<= tick`.
    pub fn drain_ready(&mut self, tick: SimTick) -> Vec<ScriptEvent> {
        let mut ready = Vec::new();
        while self.pending.front().is_some_and(|(at, _)| *at <= tick) {
            if let Some((_, event)) = self.pending.pop_front() {
                ready.push(event);
            }
        }
        ready
    }

    pub fn is_finished(&self) -> bool {
        self.pending.is_empty()
    }
}
