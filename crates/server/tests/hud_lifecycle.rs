//! End-to-end plugin lifecycle against the testkit fakes.

use anyhow::{bail, Result};
use scorehud_core::{Rank, SessionHost, SubjectId};
use scorehud_server::{
    CommandSender, Collaborators, ConfigSource, HudSettings, ScoreHud, RELOAD_PERMISSION,
    TOGGLE_PERMISSION,
};
use scorehud_testkit::{FakeHost, FixedTokens, ManualEconomy, RecordingSink, SinkEvent};
use std::cell::RefCell;
use std::rc::Rc;

/// Settings a test can swap (or break) between reloads.
#[derive(Clone, Default)]
struct SharedConfig(Rc<RefCell<Option<HudSettings>>>);

impl SharedConfig {
    fn new(settings: HudSettings) -> Self {
        Self(Rc::new(RefCell::new(Some(settings))))
    }

    fn set(&self, settings: Option<HudSettings>) {
        *self.0.borrow_mut() = settings;
    }
}

impl ConfigSource for SharedConfig {
    fn load(&self) -> Result<HudSettings> {
        match self.0.borrow().as_ref() {
            Some(settings) => Ok(settings.clone()),
            None => bail!("scorehud.toml: unreadable"),
        }
    }
}

struct Player(SubjectId);

impl CommandSender for Player {
    fn has_permission(&self, permission: &str) -> bool {
        permission == RELOAD_PERMISSION || permission == TOGGLE_PERMISSION
    }

    fn subject(&self) -> Option<&SubjectId> {
        Some(&self.0)
    }
}

fn settings() -> HudSettings {
    HudSettings {
        title: "§lHUD".to_string(),
        lines: scorehud_core::LineTemplate::new(["{name}", "Coins: {money}", "Tokens: {tokens}"]),
        update_interval: 20,
        economy_refresh_every: 300,
        activity_cooldown: 100,
    }
}

fn start(
    host: &FakeHost,
    economy: &ManualEconomy,
    config: &SharedConfig,
) -> ScoreHud<RecordingSink, SharedConfig> {
    ScoreHud::enable(
        RecordingSink::new(),
        config.clone(),
        Collaborators {
            economy: Some(Box::new(economy.clone())),
            tokens: Some(Box::new(FixedTokens::new().with("Alice", 7))),
        },
        host,
    )
    .expect("enable")
}

fn line(hud: &ScoreHud<RecordingSink, SharedConfig>, id: &SubjectId, rank: u32) -> String {
    hud.engine()
        .rendered(id)
        .and_then(|state| state.get(Rank(rank)))
        .unwrap_or_default()
        .to_string()
}

fn run_ticks(hud: &mut ScoreHud<RecordingSink, SharedConfig>, host: &mut FakeHost, ticks: u32) {
    for _ in 0..ticks {
        host.advance();
        hud.on_server_tick(host);
    }
}

#[test]
fn balance_fills_in_after_the_scheduler_fires() {
    let mut host = FakeHost::new();
    let alice = host.join_named("Alice");
    let economy = ManualEconomy::new();
    economy.set_balance(&alice, 1500);
    let config = SharedConfig::new(settings());
    let mut hud = start(&host, &economy, &config);

    assert_eq!(line(&hud, &alice, 3), "Alice");
    assert_eq!(line(&hud, &alice, 2), "Coins: Loading...");
    assert_eq!(line(&hud, &alice, 1), "Tokens: 7");

    economy.release_all_on_thread();
    run_ticks(&mut hud, &mut host, 19);
    assert_eq!(line(&hud, &alice, 2), "Coins: Loading...");
    run_ticks(&mut hud, &mut host, 1);
    assert_eq!(line(&hud, &alice, 2), "Coins: 1,500");
}

#[test]
fn join_and_quit_create_and_remove_displays() {
    let mut host = FakeHost::new();
    let economy = ManualEconomy::new();
    let config = SharedConfig::new(settings());
    let mut hud = start(&host, &economy, &config);
    assert_eq!(hud.engine().active_count(), 0);

    let bob = host.join_named("Bob");
    hud.on_join(&host, &bob);
    assert!(hud.engine().is_active(&bob));
    // Bob is not in the token ledger.
    assert_eq!(line(&hud, &bob, 1), "Tokens: {tokens}");

    hud.engine_mut().sink_mut().drain();
    host.quit(&bob);
    hud.on_quit(&bob);
    assert_eq!(
        hud.engine().sink().events(),
        &[SinkEvent::RemoveDisplay {
            subject: "Bob".into()
        }]
    );
}

#[test]
fn activity_refresh_is_throttled() {
    let mut host = FakeHost::new();
    let alice = host.join_named("Alice");
    let economy = ManualEconomy::new();
    let config = SharedConfig::new(settings());
    let mut hud = start(&host, &economy, &config);
    economy.release_all();
    hud.engine_mut().pump_completions(&host);
    assert_eq!(economy.requests(), 1);

    hud.on_activity(&host, &alice);
    hud.on_activity(&host, &alice);
    assert_eq!(economy.requests(), 2);

    for _ in 0..100 {
        host.advance();
    }
    hud.on_activity(&host, &alice);
    assert_eq!(economy.requests(), 3);
}

#[test]
fn reload_retitles_and_force_pushes() {
    let mut host = FakeHost::new();
    let alice = host.join_named("Alice");
    let economy = ManualEconomy::new();
    let config = SharedConfig::new(settings());
    let mut hud = start(&host, &economy, &config);
    hud.engine_mut().sink_mut().drain();

    let mut next = settings();
    next.title = "§6Fresh".to_string();
    next.lines = scorehud_core::LineTemplate::new(["{name}"]);
    config.set(Some(next));

    let out = hud.on_command(&Player(alice.clone()), &host, &["reload"]);
    assert_eq!(out.lines, vec!["§aScoreHud configuration reloaded!"]);
    assert_eq!(
        hud.engine().sink().events(),
        &[
            SinkEvent::CreateDisplay {
                subject: "Alice".into(),
                title: "§6Fresh".into(),
            },
            SinkEvent::RemoveEntries {
                subject: "Alice".into(),
                ranks: vec![1],
            },
            SinkEvent::SetEntries {
                subject: "Alice".into(),
                entries: vec![(1, "Alice".into())],
            },
        ]
    );
}

#[test]
fn scheduler_firing_picks_up_edited_lines() {
    let mut host = FakeHost::new();
    let alice = host.join_named("Alice");
    let economy = ManualEconomy::new();
    let config = SharedConfig::new(settings());
    let mut hud = start(&host, &economy, &config);

    let mut edited = settings();
    edited.title = "§6Ignored until reload".to_string();
    edited.lines = scorehud_core::LineTemplate::new(["EDITED {name}", "x", "y"]);
    config.set(Some(edited.clone()));

    run_ticks(&mut hud, &mut host, 19);
    assert_eq!(line(&hud, &alice, 3), "Alice");
    run_ticks(&mut hud, &mut host, 1);
    assert_eq!(line(&hud, &alice, 3), "EDITED Alice");
    assert_eq!(hud.settings().lines, edited.lines);
    // Only the lines are re-read; the title waits for `/scorehud reload`.
    assert_eq!(hud.settings().title, "§lHUD");

    // A broken file keeps the last good lines.
    config.set(None);
    run_ticks(&mut hud, &mut host, 20);
    assert_eq!(line(&hud, &alice, 3), "EDITED Alice");
}

#[test]
fn failed_reload_keeps_previous_settings() {
    let mut host = FakeHost::new();
    let alice = host.join_named("Alice");
    let economy = ManualEconomy::new();
    let config = SharedConfig::new(settings());
    let mut hud = start(&host, &economy, &config);
    hud.engine_mut().sink_mut().drain();

    config.set(None);
    let out = hud.on_command(&Player(alice.clone()), &host, &["reload"]);
    assert_eq!(
        out.lines,
        vec!["§cFailed to reload configuration: scorehud.toml: unreadable"]
    );
    assert_eq!(hud.settings(), &settings());
    assert!(hud.engine().sink().events().is_empty());
}

#[test]
fn toggle_hides_and_restores_own_display() {
    let mut host = FakeHost::new();
    let alice = host.join_named("Alice");
    let bob = host.join_named("Bob");
    let economy = ManualEconomy::new();
    let config = SharedConfig::new(settings());
    let mut hud = start(&host, &economy, &config);

    let out = hud.on_command(&Player(alice.clone()), &host, &["toggle"]);
    assert_eq!(out.lines, vec!["§aScoreboard turned off."]);
    assert!(!hud.engine().is_active(&alice));
    assert!(hud.engine().is_active(&bob));

    // Hidden subjects stay hidden through scheduler firings.
    run_ticks(&mut hud, &mut host, 40);
    assert!(!hud.engine().is_active(&alice));

    let out = hud.on_command(&Player(alice.clone()), &host, &["toggle"]);
    assert_eq!(out.lines, vec!["§aScoreboard turned on."]);
    assert_eq!(line(&hud, &alice, 3), "Alice");
    assert_eq!(host.online_subjects().len(), 2);
}
