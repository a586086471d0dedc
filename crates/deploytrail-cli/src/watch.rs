//! Interactive commands accepted on stdin while watching.

use deploytrail_core::DeploymentId;

pub const HELP: &str = "commands: <app> or f <app> focus/unfocus app | d <id> delete deployment | c clear focus | q quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchCommand {
    Redraw,
    Quit,
    Help,
    ClearFocus,
    ToggleApp(String),
    Delete(DeploymentId),
    Invalid(String),
}

impl WatchCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return WatchCommand::Redraw;
        }
        let (first, rest) = match line.split_once(char::is_whitespace) {
            Some((first, rest)) => (first, rest.trim()),
            None => (line, ""),
        };

        match (first, rest) {
            // Everything after `f` is the app name, verbatim.
            ("f" | "focus", "") => WatchCommand::Invalid("usage: f <app>".to_string()),
            ("f" | "focus", app) => WatchCommand::ToggleApp(app.to_string()),
            ("q" | "quit" | "exit", "") => WatchCommand::Quit,
            ("?" | "h" | "help", "") => WatchCommand::Help,
            ("c" | "clear", "") => WatchCommand::ClearFocus,
            ("d" | "delete", id) if !id.is_empty() && !id.contains(char::is_whitespace) => {
                WatchCommand::Delete(DeploymentId::parse(id))
            }
            ("d" | "delete", _) => WatchCommand::Invalid("usage: d <id>".to_string()),
            (app, "") => WatchCommand::ToggleApp(app.to_string()),
            _ => WatchCommand::Invalid(format!("unrecognised input: {}", line)),
        }
    }
}
