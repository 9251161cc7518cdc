#![warn(missing_docs)]
//! ScoreHud server side: the diff-and-push engine, its update timer, the
//! `/scorehud` command, and the plugin lifecycle that wires them together.

pub mod commands;
pub mod engine;
pub mod hud;
pub mod renderer;
pub mod scheduler;

pub use commands::{
    execute_command, handle_command, parse_command, CommandError, CommandOutput, CommandSender,
    HudCommand, HudControl, RELOAD_PERMISSION, TOGGLE_PERMISSION,
};
pub use engine::{EngineError, ScoreboardEngine};
pub use hud::{
    build_registry, Collaborators, ConfigSource, EnableError, HudPlugin, HudSettings, ScoreHud,
    DEFAULT_ACTIVITY_COOLDOWN, DEFAULT_TITLE,
};
pub use renderer::render_lines;
pub use scheduler::{
    FireReport, UpdateScheduler, DEFAULT_EXTERNAL_REFRESH_EVERY, DEFAULT_UPDATE_INTERVAL,
};
