use crate::config::{ScoreHudConfig, TomlConfigSource};
use crate::script::{EventScript, ScriptEvent, DEMO_SCRIPT};
use anyhow::{bail, Context, Result};
use scorehud_core::{DisplaySink, Rank, RenderedState, SubjectId};
use scorehud_net::{MemoryTransport, PacketSink, SortOrder};
use scorehud_server::{CommandSender, Collaborators, HudPlugin};
use scorehud_testkit::{
    FakeHost, FixedTokens, HudRunMetrics, JsonlTranscript, ManualEconomy, RecordingSink, SinkEvent,
};
use std::path::PathBuf;
use tracing::{info, warn};

pub struct HeadlessConfig {
    pub config_path: PathBuf,
    pub script: Option<PathBuf>,
    pub ticks: u64,
    pub transcript: Option<PathBuf>,
    pub metrics: Option<PathBuf>,
}

/// Records every sink call and also encodes it as wire packets.
pub struct MirrorSink {
    recorder: RecordingSink,
    packets: PacketSink<MemoryTransport>,
}

impl MirrorSink {
    pub fn new(sort_order: SortOrder) -> Self {
        Self {
            recorder: RecordingSink::new(),
            packets: PacketSink::new(MemoryTransport::new(), sort_order),
        }
    }

    pub fn drain(&mut self) -> Vec<SinkEvent> {
        self.recorder.drain()
    }

    pub fn frames(&self) -> usize {
        self.packets.transport().frames()
    }
}

impl DisplaySink for MirrorSink {
    fn create_display(&mut self, subject: &SubjectId, title: &str) -> Result<()> {
        self.recorder.create_display(subject, title)?;
        self.packets.create_display(subject, title)
    }

    fn remove_entries(&mut self, subject: &SubjectId, ranks: &[Rank]) -> Result<()> {
        self.recorder.remove_entries(subject, ranks)?;
        self.packets.remove_entries(subject, ranks)
    }

    fn set_entries(&mut self, subject: &SubjectId, state: &RenderedState) -> Result<()> {
        self.recorder.set_entries(subject, state)?;
        self.packets.set_entries(subject, state)
    }

    fn remove_display(&mut self, subject: &SubjectId) -> Result<()> {
        self.recorder.remove_display(subject)?;
        self.packets.remove_display(subject)
    }
}

struct ScriptSender(Option<SubjectId>);

impl CommandSender for ScriptSender {
    fn has_permission(&self, _permission: &str) -> bool {
        true
    }

    fn subject(&self) -> Option<&SubjectId> {
        self.0.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub firings: u64,
    pub active: usize,
    pub frames: usize,
    pub metrics: HudRunMetrics,
}

type Plugin = HudPlugin<MirrorSink, TomlConfigSource>;

pub fn run(cfg: HeadlessConfig) -> Result<RunSummary> {
    ScoreHudConfig::write_default(&cfg.config_path)?;
    let startup = ScoreHudConfig::load_from_path(&cfg.config_path)?;

    let mut script = match &cfg.script {
        Some(path) => EventScript::from_path(path)?,
        None => EventScript::from_str(DEMO_SCRIPT).context("built-in demo script")?,
    };

    let mut host = FakeHost::new();
    let economy = ManualEconomy::new();
    let tokens = script
        .tokens()
        .iter()
        .fold(FixedTokens::new(), |ledger, (name, count)| ledger.with(name, *count));

    let mut plugin: Plugin = HudPlugin::start(
        MirrorSink::new(startup.sort_order),
        TomlConfigSource::new(&cfg.config_path),
        Collaborators {
            economy: Some(Box::new(economy.clone())),
            tokens: Some(Box::new(tokens)),
        },
        &host,
    );
    if !plugin.is_enabled() {
        bail!("ScoreHud failed to enable; see log for details");
    }

    let mut transcript = cfg
        .transcript
        .as_ref()
        .map(JsonlTranscript::create)
        .transpose()?;
    let mut metrics = HudRunMetrics::new("headless");
    let mut firings = 0;

    for _ in 0..cfg.ticks {
        let tick = host.advance();
        for event in script.drain_ready(tick) {
            apply(&mut plugin, &mut host, &economy, event);
        }
        if plugin.on_server_tick(&host).is_some() {
            firings += 1;
        }

        let Some(hud) = plugin.hud_mut() else {
            break;
        };
        let events = hud.engine_mut().sink_mut().drain();
        metrics.record(&events);
        if let Some(transcript) = transcript.as_mut() {
            for event in &events {
                transcript.write(tick, event)?;
            }
        }
    }
    if !script.is_finished() {
        warn!("run ended before the script finished");
    }

    metrics.ticks = cfg.ticks;
    metrics.firings = firings;
    if let Some(path) = &cfg.metrics {
        metrics.write_to(path)?;
    }

    let (active, frames) = plugin
        .hud()
        .map(|hud| (hud.engine().active_count(), hud.engine().sink().frames()))
        .unwrap_or_default();
    info!(
        ticks = cfg.ticks,
        firings, active, frames, pushes = metrics.pushes, "headless run complete"
    );
    Ok(RunSummary {
        ticks: cfg.ticks,
        firings,
        active,
        frames,
        metrics,
    })
}

fn apply(plugin: &mut Plugin, host: &mut FakeHost, economy: &ManualEconomy, event: ScriptEvent) {
    match event {
        ScriptEvent::Join(name) => {
            let id = host.join_named(&name);
            plugin.on_join(host, &id);
        }
        ScriptEvent::Quit(name) => {
            let id = SubjectId::new(name);
            host.quit(&id);
            plugin.on_quit(&id);
        }
        ScriptEvent::Health(name, health) => {
            host.update(&SubjectId::new(name), |subject| subject.health = health);
        }
        ScriptEvent::Balance(name, balance) => {
            economy.set_balance(&SubjectId::new(name), balance);
        }
        ScriptEvent::Release => {
            let released = economy.release_all_on_thread();
            info!(released, "economy replies released");
        }
        ScriptEvent::Activity(name) => {
            plugin.on_activity(host, &SubjectId::new(name));
        }
        ScriptEvent::Tps(tps) => host.set_ticks_per_second(tps),
        ScriptEvent::Command { sender, args } => {
            let sender = ScriptSender(sender.map(SubjectId::new));
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            if let Some(output) = plugin.on_command(&sender, host, &args) {
                for line in output.lines {
                    info!(sender = ?sender.0, "{line}");
                }
            }
        }
    }
}
