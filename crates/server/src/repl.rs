//! # Interactive Drafting
//!
//! Terminal surface for a drafting session. Each input line is one
//! command; session events are rendered after every command.

use pokedraft_core::{DraftEvent, DraftEventKind, DraftSession};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

const HELP: &str = "\
Commands:
  <text> | search <text>   suggest names containing <text>
  pick <n>                 use the n-th suggestion as the pending name
  add [name]               add <name>, or the pending name, to the team
  team                     show the team so far
  finish                   submit the team
  help                     show this message
  quit                     leave without submitting";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Search(String),
    Pick(usize),
    Add(Option<String>),
    Team,
    Finish,
    Help,
    Quit,
    Invalid(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word {
            "search" => Self::Search(rest.to_string()),
            "pick" => match rest.parse::<usize>() {
                Ok(n) if n > 0 => Self::Pick(n),
                _ => Self::Invalid(format!("pick expects a positive number, got '{}'", rest)),
            },
            "add" if rest.is_empty() => Self::Add(None),
            "add" => Self::Add(Some(rest.to_string())),
            "team" if rest.is_empty() => Self::Team,
            "finish" if rest.is_empty() => Self::Finish,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => Self::Search(line.to_string()),
        }
    }
}

/// Drives one session from a line-oriented reader
pub struct Repl<W: Write> {
    session: DraftSession,
    events: mpsc::Receiver<DraftEvent>,
    out: W,
    /// Name filled in by `pick`, consumed by a bare `add`
    pending: String,
}

impl<W: Write> Repl<W> {
    pub fn new(session: DraftSession, events: mpsc::Receiver<DraftEvent>, out: W) -> Self {
        Self {
            session,
            events,
            out,
            pending: String::new(),
        }
    }

    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> anyhow::Result<()> {
        if let Err(e) = self.session.start().await {
            self.render_events()?;
            return Err(e.into());
        }
        self.render_events()?;
        writeln!(self.out, "{}", HELP)?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            if !self.handle(ReplCommand::parse(&line)).await? {
                break;
            }
        }
        Ok(())
    }

    /// Returns `false` once the session should end
    async fn handle(&mut self, command: ReplCommand) -> anyhow::Result<bool> {
        match command {
            ReplCommand::Search(query) => {
                self.pending = query.clone();
                self.session.search(&query).await;
            }
            ReplCommand::Pick(n) => match self.session.select_position(n - 1).await {
                Some(name) => {
                    writeln!(self.out, "→ {}", name)?;
                    self.pending = name;
                }
                None => writeln!(self.out, "No suggestion #{}", n)?,
            },
            ReplCommand::Add(name) => {
                let name = name.unwrap_or_else(|| self.pending.clone());
                // a failed add keeps the pending name for retry
                if self.session.add(&name).await.is_ok() {
                    self.pending.clear();
                }
            }
            ReplCommand::Team => {
                let team = self.session.team().await;
                if team.is_empty() {
                    writeln!(self.out, "Team is empty")?;
                }
                for (i, slot) in team.slots().iter().enumerate() {
                    writeln!(self.out, "  {}. {}  {}", i + 1, slot.name, slot.image)?;
                }
            }
            ReplCommand::Finish => {
                let _ = self.session.finish().await;
            }
            ReplCommand::Help => writeln!(self.out, "{}", HELP)?,
            ReplCommand::Quit => return Ok(false),
            ReplCommand::Invalid(message) => writeln!(self.out, "{}", message)?,
        }
        self.render_events()?;
        Ok(true)
    }

    fn render_events(&mut self) -> std::io::Result<()> {
        while let Ok(event) = self.events.try_recv() {
            render_event(&mut self.out, &event)?;
        }
        self.out.flush()
    }
}

fn render_event(out: &mut impl Write, event: &DraftEvent) -> std::io::Result<()> {
    let data = event.data.as_ref();
    match event.kind {
        DraftEventKind::IndexLoaded => {
            let entries = data.and_then(|d| d["entries"].as_u64()).unwrap_or(0);
            writeln!(out, "📚 Loaded {} Pokemon", entries)
        }
        DraftEventKind::SuggestionsShown => {
            let names = data.and_then(|d| d["names"].as_array());
            for (i, name) in names.into_iter().flatten().enumerate() {
                writeln!(out, "  {}. {}", i + 1, name.as_str().unwrap_or_default())?;
            }
            Ok(())
        }
        DraftEventKind::SuggestionsCleared => Ok(()),
        DraftEventKind::CardRendered => {
            let field = |key: &str| {
                data.and_then(|d| d[key].as_str())
                    .unwrap_or_default()
                    .to_string()
            };
            let position = data.and_then(|d| d["position"].as_u64()).unwrap_or(0);
            writeln!(
                out,
                "[#{}] {}  {}",
                position + 1,
                field("name"),
                field("image")
            )
        }
        DraftEventKind::Alert => writeln!(out, "⚠️  {}", event.message().unwrap_or_default()),
        DraftEventKind::TeamSubmitted => writeln!(out, "✅ Team submitted"),
        DraftEventKind::SessionReset => writeln!(out, "Starting a new team"),
    }
}
