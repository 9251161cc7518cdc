//! `/scorehud` subcommands.

use crate::engine::EngineError;
use scorehud_core::{SessionHost, SubjectId};
use std::fmt;

/// Permission required for `/scorehud reload`.
pub const RELOAD_PERMISSION: &str = "scorehud.command.reload";
/// Permission required for `/scorehud toggle`.
pub const TOGGLE_PERMISSION: &str = "scorehud.command.toggle";

/// A command line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    /// Error carrying the message shown to the sender.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CommandError {}

/// Parsed `/scorehud` subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudCommand {
    /// Print usage.
    Help,
    /// Re-read configuration.
    Reload,
    /// Show or hide the sender's own display.
    Toggle,
}

impl HudCommand {
    /// Permission the sender must hold, if any.
    pub fn permission(self) -> Option<&'static str> {
        match self {
            Self::Help => None,
            Self::Reload => Some(RELOAD_PERMISSION),
            Self::Toggle => Some(TOGGLE_PERMISSION),
        }
    }
}

/// Messages sent back to the invoker.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Lines in send order.
    pub lines: Vec<String>,
}

impl CommandOutput {
    fn line(message: impl Into<String>) -> Self {
        Self {
            lines: vec![message.into()],
        }
    }
}

/// Whoever typed the command.
pub trait CommandSender {
    /// True if the sender holds `permission`.
    fn has_permission(&self, permission: &str) -> bool;

    /// The sender's subject, or `None` for the console.
    fn subject(&self) -> Option<&SubjectId>;
}

/// Operations the commands drive.
pub trait HudControl {
    /// Re-read configuration and force-refresh every display.
    fn reload(&mut self, host: &dyn SessionHost) -> anyhow::Result<()>;

    /// True if `id` currently has a display.
    fn is_shown(&self, id: &SubjectId) -> bool;

    /// Give `id` a display.
    fn show(&mut self, host: &dyn SessionHost, id: &SubjectId) -> Result<(), EngineError>;

    /// Take `id`'s display away.
    fn hide(&mut self, id: &SubjectId) -> bool;
}

/// Parse the arguments that follow `/scorehud`.
pub fn parse_command(args: &[&str]) -> Result<HudCommand, CommandError> {
    let Some(sub) = args.first() else {
        return Ok(HudCommand::Help);
    };
    match sub.trim().to_ascii_lowercase().as_str() {
        "" | "help" | "?" => Ok(HudCommand::Help),
        "reload" => Ok(HudCommand::Reload),
        "toggle" => Ok(HudCommand::Toggle),
        _ => Err(CommandError::new(
            "§cUnknown subcommand. Use /scorehud for help.",
        )),
    }
}

/// Run an already parsed command on behalf of `sender`.
pub fn execute_command(
    hud: &mut impl HudControl,
    sender: &dyn CommandSender,
    host: &dyn SessionHost,
    cmd: HudCommand,
) -> CommandOutput {
    if let Some(permission) = cmd.permission() {
        if !sender.has_permission(permission) {
            return CommandOutput::line("§cYou don't have permission to use this command.");
        }
    }

    match cmd {
        HudCommand::Help => CommandOutput {
            lines: help_lines(),
        },
        HudCommand::Reload => match hud.reload(host) {
            Ok(()) => CommandOutput::line("§aScoreHud configuration reloaded!"),
            Err(err) => CommandOutput::line(format!("§cFailed to reload configuration: {err:#}")),
        },
        HudCommand::Toggle => {
            let Some(id) = sender.subject() else {
                return CommandOutput::line("§cThis command can only be used in-game.");
            };
            if hud.is_shown(id) {
                hud.hide(id);
                CommandOutput::line("§aScoreboard turned off.")
            } else {
                match hud.show(host, id) {
                    Ok(()) => CommandOutput::line("§aScoreboard turned on."),
                    Err(err) => CommandOutput::line(format!("§cCould not show scoreboard: {err}")),
                }
            }
        }
    }
}

/// Parse and execute in one go; parse errors become the output.
pub fn handle_command(
    hud: &mut impl HudControl,
    sender: &dyn CommandSender,
    host: &dyn SessionHost,
    args: &[&str],
) -> CommandOutput {
    match parse_command(args) {
        Ok(cmd) => execute_command(hud, sender, host, cmd),
        Err(err) => CommandOutput::line(err.to_string()),
    }
}

fn help_lines() -> Vec<String> {
    vec![
        "§e--- ScoreHud Commands ---".to_string(),
        "§e/scorehud reload §f- Reload the configuration".to_string(),
        "§e/scorehud toggle §f- Toggle your scoreboard on/off".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use scorehud_testkit::FakeHost;
    use std::collections::BTreeSet;

    #[derive(Default)]
    struct FakeHud {
        shown: BTreeSet<SubjectId>,
        reloads: usize,
        reload_fails: bool,
    }

    impl HudControl for FakeHud {
        fn reload(&mut self, _host: &dyn SessionHost) -> anyhow::Result<()> {
            if self.reload_fails {
                bail!("config/scorehud.toml: missing");
            }
            self.reloads += 1;
            Ok(())
        }

        fn is_shown(&self, id: &SubjectId) -> bool {
            self.shown.contains(id)
        }

        fn show(&mut self, _host: &dyn SessionHost, id: &SubjectId) -> Result<(), EngineError> {
            self.shown.insert(id.clone());
            Ok(())
        }

        fn hide(&mut self, id: &SubjectId) -> bool {
            self.shown.remove(id)
        }
    }

    struct Sender {
        subject: Option<SubjectId>,
        permissions: Vec<&'static str>,
    }

    impl CommandSender for Sender {
        fn has_permission(&self, permission: &str) -> bool {
            self.permissions.contains(&permission)
        }

        fn subject(&self) -> Option<&SubjectId> {
            self.subject.as_ref()
        }
    }

    fn player(name: &str) -> Sender {
        Sender {
            subject: Some(SubjectId::new(name)),
            permissions: vec![RELOAD_PERMISSION, TOGGLE_PERMISSION],
        }
    }

    #[test]
    fn parses_subcommands_case_insensitively() {
        assert_eq!(parse_command(&[]), Ok(HudCommand::Help));
        assert_eq!(parse_command(&["RELOAD"]), Ok(HudCommand::Reload));
        assert_eq!(parse_command(&["toggle", "extra"]), Ok(HudCommand::Toggle));
        assert!(parse_command(&["explode"]).is_err());
    }

    #[test]
    fn toggle_flips_display() {
        let host = FakeHost::new();
        let mut hud = FakeHud::default();
        let alice = player("Alice");

        let out = handle_command(&mut hud, &alice, &host, &["toggle"]);
        assert_eq!(out.lines, vec!["§aScoreboard turned on."]);
        let out = handle_command(&mut hud, &alice, &host, &["toggle"]);
        assert_eq!(out.lines, vec!["§aScoreboard turned off."]);
        assert!(hud.shown.is_empty());
    }

    #[test]
    fn missing_permission_changes_nothing() {
        let host = FakeHost::new();
        let mut hud = FakeHud::default();
        let sender = Sender {
            subject: Some(SubjectId::new("Mallory")),
            permissions: vec![],
        };

        for args in [["reload"], ["toggle"]] {
            let out = handle_command(&mut hud, &sender, &host, &args);
            assert_eq!(
                out.lines,
                vec!["§cYou don't have permission to use this command."]
            );
        }
        assert_eq!(hud.reloads, 0);
        assert!(hud.shown.is_empty());
    }

    #[test]
    fn console_cannot_toggle() {
        let host = FakeHost::new();
        let mut hud = FakeHud::default();
        let console = Sender {
            subject: None,
            permissions: vec![RELOAD_PERMISSION, TOGGLE_PERMISSION],
        };
        let out = handle_command(&mut hud, &console, &host, &["toggle"]);
        assert_eq!(out.lines, vec!["§cThis command can only be used in-game."]);
    }

    #[test]
    fn reload_reports_failure() {
        let host = FakeHost::new();
        let mut hud = FakeHud {
            reload_fails: true,
            ..FakeHud::default()
        };
        let out = handle_command(&mut hud, &player("Alice"), &host, &["reload"]);
        assert_eq!(
            out.lines,
            vec!["§cFailed to reload configuration: config/scorehud.toml: missing"]
        );
    }

    #[test]
    fn golden_help_and_unknown_outputs_are_stable() {
        let host = FakeHost::new();
        let mut hud = FakeHud::default();
        let alice = player("Alice");

        let mut transcript = Vec::new();
        for args in [&[][..], &["nope"][..], &["reload"][..]] {
            transcript.extend(handle_command(&mut hud, &alice, &host, args).lines);
        }
        assert_eq!(
            transcript,
            vec![
                "§e--- ScoreHud Commands ---".to_string(),
                "§e/scorehud reload §f- Reload the configuration".to_string(),
                "§e/scorehud toggle §f- Toggle your scoreboard on/off".to_string(),
                "§cUnknown subcommand. Use /scorehud for help.".to_string(),
                "§aScoreHud configuration reloaded!".to_string(),
            ]
        );
    }
}
