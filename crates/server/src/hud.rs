//! Plugin lifecycle: enable, event hooks, reload, disable.

use crate::commands::{handle_command, CommandOutput, CommandSender, HudControl};
use crate::engine::{EngineError, ScoreboardEngine};
use crate::scheduler::{
    FireReport, UpdateScheduler, DEFAULT_EXTERNAL_REFRESH_EVERY, DEFAULT_UPDATE_INTERVAL,
};
use scorehud_core::{DisplaySink, LineTemplate, SessionHost, SubjectId};
use scorehud_placeholder::{
    DefaultProvider, EconomyProvider, EconomyService, ProviderRegistry, TokenLedger,
    TokenProvider,
};
use thiserror::Error;
use tracing::{error, info, warn};

/// Default sidebar title.
pub const DEFAULT_TITLE: &str = "§e§lScoreHud";

/// Default throttle, in ticks, for activity-triggered balance refreshes.
pub const DEFAULT_ACTIVITY_COOLDOWN: u64 = 100;

/// Validated runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct HudSettings {
    /// Sidebar title.
    pub title: String,
    /// Lines rendered for every subject, top to bottom.
    pub lines: LineTemplate,
    /// Ticks between scheduler firings.
    pub update_interval: u64,
    /// Firings between bulk economy refreshes.
    pub economy_refresh_every: u32,
    /// Minimum ticks between activity-triggered refreshes per subject.
    pub activity_cooldown: u64,
}

impl Default for HudSettings {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            lines: LineTemplate::new(["{name}", "HP: {health}/{max_health}", "Coins: {money}"]),
            update_interval: DEFAULT_UPDATE_INTERVAL,
            economy_refresh_every: DEFAULT_EXTERNAL_REFRESH_EVERY,
            activity_cooldown: DEFAULT_ACTIVITY_COOLDOWN,
        }
    }
}

impl HudSettings {
    /// Reject settings the scheduler cannot run with.
    pub fn validate(&self) -> Result<(), EnableError> {
        if self.update_interval == 0 {
            return Err(EnableError::Invalid(
                "update_interval must be greater than zero".to_string(),
            ));
        }
        if self.economy_refresh_every == 0 {
            return Err(EnableError::Invalid(
                "economy_refresh_every must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where settings come from. Called once on enable and again on reload.
pub trait ConfigSource {
    /// Read and parse the current settings.
    fn load(&self) -> anyhow::Result<HudSettings>;
}

impl ConfigSource for HudSettings {
    fn load(&self) -> anyhow::Result<HudSettings> {
        Ok(self.clone())
    }
}

/// Optional third-party plugins found at enable time.
#[derive(Default)]
pub struct Collaborators {
    /// Economy adapter, if an economy plugin is installed.
    pub economy: Option<Box<dyn EconomyService>>,
    /// Token adapter, if a token plugin is installed.
    pub tokens: Option<Box<dyn TokenLedger>>,
}

/// Fatal enable failures.
#[derive(Debug, Error)]
pub enum EnableError {
    /// The configuration could not be read.
    #[error("failed to load configuration: {0:#}")]
    Config(anyhow::Error),

    /// The configuration was read but is unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Build the provider chain: `Default`, then `Economy` and `Tokens` when
/// their plugins are present.
pub fn build_registry(collaborators: Collaborators, activity_cooldown: u64) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register(Box::new(DefaultProvider));

    if let Some(service) = collaborators.economy {
        match EconomyProvider::new(service, activity_cooldown) {
            Ok(provider) => {
                registry.register(Box::new(provider));
                info!("economy plugin found; {{money}} enabled");
            }
            Err(err) => error!("economy placeholders disabled: {err}"),
        }
    }
    if let Some(ledger) = collaborators.tokens {
        registry.register(Box::new(TokenProvider::new(ledger)));
        info!("token plugin found; {{tokens}} enabled");
    }
    registry
}

/// A running HUD.
pub struct ScoreHud<S, C> {
    engine: ScoreboardEngine<S>,
    scheduler: UpdateScheduler,
    settings: HudSettings,
    config: C,
}

impl<S: DisplaySink, C: ConfigSource> ScoreHud<S, C> {
    /// Load settings, build the provider chain, and show a display to every
    /// subject already online.
    pub fn enable(
        sink: S,
        config: C,
        collaborators: Collaborators,
        host: &dyn SessionHost,
    ) -> Result<Self, EnableError> {
        let settings = config.load().map_err(EnableError::Config)?;
        settings.validate()?;

        let registry = build_registry(collaborators, settings.activity_cooldown);
        let mut engine = ScoreboardEngine::new(
            sink,
            registry,
            settings.lines.clone(),
            settings.title.clone(),
        );
        for id in host.online_subjects() {
            if let Err(err) = engine.activate(host, &id) {
                warn!("error creating scoreboard: {err}");
            }
        }

        let scheduler =
            UpdateScheduler::new(settings.update_interval, settings.economy_refresh_every);
        info!(
            providers = engine.registry().len(),
            lines = settings.lines.len(),
            active = engine.active_count(),
            "ScoreHud enabled"
        );
        Ok(Self {
            engine,
            scheduler,
            settings,
            config,
        })
    }

    /// Subject connected.
    pub fn on_join(&mut self, host: &dyn SessionHost, id: &SubjectId) {
        if let Err(err) = self.engine.activate(host, id) {
            error!("error creating scoreboard: {err}");
        }
    }

    /// Subject disconnected.
    pub fn on_quit(&mut self, id: &SubjectId) {
        self.engine.deactivate(id);
    }

    /// Subject did something that may have changed external data.
    pub fn on_activity(&mut self, host: &dyn SessionHost, id: &SubjectId) {
        self.engine.note_activity(host, id);
    }

    /// Advance one server tick. A firing re-reads the line template first,
    /// so edits to the configured lines show up without a reload.
    pub fn on_server_tick(&mut self, host: &dyn SessionHost) -> Option<FireReport> {
        if self.scheduler.is_due() {
            self.refresh_lines();
        }
        self.scheduler
            .on_server_tick(&mut self.engine, host, &self.settings.lines)
    }

    fn refresh_lines(&mut self) {
        match self.config.load() {
            Ok(settings) => self.settings.lines = settings.lines,
            Err(err) => warn!("keeping previous lines, failed to re-read configuration: {err:#}"),
        }
    }

    /// Run `/scorehud <args>`.
    pub fn on_command(
        &mut self,
        sender: &dyn CommandSender,
        host: &dyn SessionHost,
        args: &[&str],
    ) -> CommandOutput {
        handle_command(self, sender, host, args)
    }

    /// Re-read settings and force-refresh every display. On failure the
    /// previous settings stay in effect.
    pub fn reload(&mut self, host: &dyn SessionHost) -> anyhow::Result<()> {
        let settings = self.config.load()?;
        settings.validate()?;

        self.engine.set_title(&settings.title);
        self.engine.set_template(settings.lines.clone());
        if settings.update_interval != self.settings.update_interval
            || settings.economy_refresh_every != self.settings.economy_refresh_every
        {
            self.scheduler =
                UpdateScheduler::new(settings.update_interval, settings.economy_refresh_every);
        }
        self.settings = settings;

        let pushed = self.engine.update_all(host, true);
        info!(pushed, "configuration reloaded");
        Ok(())
    }

    /// Remove every display.
    pub fn disable(mut self) -> S {
        for id in self.engine.active_subjects() {
            self.engine.deactivate(&id);
        }
        info!("ScoreHud disabled");
        self.engine.into_sink()
    }

    /// Settings in effect.
    pub fn settings(&self) -> &HudSettings {
        &self.settings
    }

    /// The engine.
    pub fn engine(&self) -> &ScoreboardEngine<S> {
        &self.engine
    }

    /// Mutable engine.
    pub fn engine_mut(&mut self) -> &mut ScoreboardEngine<S> {
        &mut self.engine
    }
}

impl<S: DisplaySink, C: ConfigSource> HudControl for ScoreHud<S, C> {
    fn reload(&mut self, host: &dyn SessionHost) -> anyhow::Result<()> {
        ScoreHud::reload(self, host)
    }

    fn is_shown(&self, id: &SubjectId) -> bool {
        self.engine.is_active(id)
    }

    fn show(&mut self, host: &dyn SessionHost, id: &SubjectId) -> Result<(), EngineError> {
        self.engine.activate(host, id).map(|_| ())
    }

    fn hide(&mut self, id: &SubjectId) -> bool {
        self.engine.deactivate(id)
    }
}

/// Plugin slot as seen by the host: either running or disabled after a
/// fatal enable failure.
pub enum HudPlugin<S, C> {
    /// Enabled and handling events.
    Enabled(ScoreHud<S, C>),
    /// Enable failed; every event is ignored.
    Disabled,
}

impl<S: DisplaySink, C: ConfigSource> HudPlugin<S, C> {
    /// Enable, logging and disabling on failure.
    pub fn start(
        sink: S,
        config: C,
        collaborators: Collaborators,
        host: &dyn SessionHost,
    ) -> Self {
        match ScoreHud::enable(sink, config, collaborators, host) {
            Ok(hud) => Self::Enabled(hud),
            Err(err) => {
                error!("failed to enable ScoreHud: {err}");
                Self::Disabled
            }
        }
    }

    /// True if enable succeeded.
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }

    /// The running HUD, if any.
    pub fn hud(&self) -> Option<&ScoreHud<S, C>> {
        match self {
            Self::Enabled(hud) => Some(hud),
            Self::Disabled => None,
        }
    }

    /// Mutable running HUD, if any.
    pub fn hud_mut(&mut self) -> Option<&mut ScoreHud<S, C>> {
        match self {
            Self::Enabled(hud) => Some(hud),
            Self::Disabled => None,
        }
    }

    /// See [`ScoreHud::on_join`].
    pub fn on_join(&mut self, host: &dyn SessionHost, id: &SubjectId) {
        if let Some(hud) = self.hud_mut() {
            hud.on_join(host, id);
        }
    }

    /// See [`ScoreHud::on_quit`].
    pub fn on_quit(&mut self, id: &SubjectId) {
        if let Some(hud) = self.hud_mut() {
            hud.on_quit(id);
        }
    }

    /// See [`ScoreHud::on_activity`].
    pub fn on_activity(&mut self, host: &dyn SessionHost, id: &SubjectId) {
        if let Some(hud) = self.hud_mut() {
            hud.on_activity(host, id);
        }
    }

    /// See [`ScoreHud::on_server_tick`].
    pub fn on_server_tick(&mut self, host: &dyn SessionHost) -> Option<FireReport> {
        self.hud_mut()?.on_server_tick(host)
    }

    /// See [`ScoreHud::on_command`]. A disabled plugin has no commands.
    pub fn on_command(
        &mut self,
        sender: &dyn CommandSender,
        host: &dyn SessionHost,
        args: &[&str],
    ) -> Option<CommandOutput> {
        self.hud_mut().map(|hud| hud.on_command(sender, host, args))
    }
}
