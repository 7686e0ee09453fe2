//! Line protocol and status rendering for the interactive picker

use ippan_handle_resolver::{HandleStatus, ResolverSnapshot};

/// One line read from stdin
#[derive(Debug, PartialEq, Eq)]
pub enum PromptLine<'a> {
    Commit,
    Quit,
    Input(&'a str),
}

impl<'a> PromptLine<'a> {
    pub fn parse(line: &'a str) -> Self {
        match line.trim() {
            ":commit" => PromptLine::Commit,
            ":quit" | ":q" => PromptLine::Quit,
            _ => PromptLine::Input(line),
        }
    }
}

pub fn render(snapshot: &ResolverSnapshot) -> String {
    let name = snapshot
        .candidate
        .as_ref()
        .map(|handle| handle.to_string())
        .unwrap_or_default();
    match snapshot.status {
        HandleStatus::Empty => "type a handle".to_string(),
        HandleStatus::Checking => format!("{name}: checking..."),
        HandleStatus::Available => format!("{name}: available (:commit to claim)"),
        HandleStatus::Invalid => format!(
            "{name}: {}",
            snapshot.reason.as_deref().unwrap_or("invalid")
        ),
        HandleStatus::Taken => snapshot
            .reason
            .clone()
            .unwrap_or_else(|| format!("{name} is taken")),
    }
}
