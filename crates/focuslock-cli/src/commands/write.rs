//! Interactive writing session.
//!
//! Every line typed is appended to the document. Lines starting with `:`
//! are commands (`:save`, `:exit`, `:status`, `:show`); write `::` to start
//! a line with a literal colon. Ctrl-C and Ctrl-D open the exit challenge
//! instead of quitting.
//!
//! SIGHUP, SIGTERM and the end of piped input end the session without the
//! challenge: pending edits are flushed and network access is restored.

use std::io::IsTerminal;
use std::sync::mpsc;

use anyhow::{Context, Result, anyhow, bail};
use colored::Colorize;
use focuslock_application::SessionController;
use focuslock_core::document::Document;
use focuslock_core::session::{ExitOutcome, SessionSnapshot};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::oneshot;

const INPUT_CLOSED: &str = "Input closed before the exit challenge was passed; session ended";

pub enum Target {
    New(String),
    Existing(String),
}

/// How a command run ended.
#[derive(Debug, PartialEq, Eq)]
pub enum SessionEnd {
    /// Finished normally; for a writing session, the exit challenge was
    /// passed.
    Finished,
    /// A termination signal arrived and the session was shut down. The
    /// caller should exit the process.
    Terminated(&'static str),
}

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Text(&'a str),
    Save,
    Exit,
    Status,
    Show,
    Unknown(&'a str),
}

fn parse_line(line: &str) -> Input<'_> {
    if line.starts_with("::") {
        // Keep one colon: "::foo" is the text ":foo".
        return Input::Text(&line[1..]);
    }
    match line.strip_prefix(':') {
        None => Input::Text(line),
        Some(command) => match command.trim() {
            "save" | "w" => Input::Save,
            "exit" | "quit" | "q" => Input::Exit,
            "status" => Input::Status,
            "show" => Input::Show,
            other => Input::Unknown(other),
        },
    }
}

/// Result of one prompt.
#[derive(Debug, PartialEq, Eq)]
enum Read {
    Line(String),
    /// Ctrl-C, or Ctrl-D on a terminal.
    Break,
    /// Piped input is exhausted; no further answer can ever arrive.
    Closed,
    Terminated(&'static str),
}

fn classify_read(line: rustyline::Result<String>, interactive: bool) -> Result<Read> {
    match line {
        Ok(line) => Ok(Read::Line(line)),
        Err(ReadlineError::Interrupted) => Ok(Read::Break),
        Err(ReadlineError::Eof) if interactive => Ok(Read::Break),
        Err(ReadlineError::Eof) => Ok(Read::Closed),
        Err(e) => Err(e.into()),
    }
}

#[cfg(unix)]
struct TerminationSignals {
    hangup: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl TerminationSignals {
    fn install() -> Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};
        Ok(Self {
            hangup: signal(SignalKind::hangup()).context("Failed to listen for SIGHUP")?,
            terminate: signal(SignalKind::terminate()).context("Failed to listen for SIGTERM")?,
        })
    }

    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.hangup.recv() => "SIGHUP",
            _ = self.terminate.recv() => "SIGTERM",
        }
    }
}

#[cfg(not(unix))]
struct TerminationSignals;

#[cfg(not(unix))]
impl TerminationSignals {
    fn install() -> Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> &'static str {
        std::future::pending().await
    }
}

type PromptRequest = (String, oneshot::Sender<Result<Read>>);

/// Line editor on its own thread, so blocking reads can race against
/// termination signals.
struct Terminal {
    prompts: mpsc::Sender<PromptRequest>,
    signals: TerminationSignals,
}

impl Terminal {
    fn new() -> Result<Self> {
        // False when stdin is a pipe or file; end of input is then final.
        let interactive = std::io::stdin().is_terminal();
        let (prompts, requests) = mpsc::channel::<PromptRequest>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<()>>();

        std::thread::Builder::new()
            .name("line-editor".to_string())
            .spawn(move || {
                let mut editor = match DefaultEditor::new() {
                    Ok(editor) => editor,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.into()));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                for (prompt, reply) in requests {
                    let _ = reply.send(classify_read(editor.readline(&prompt), interactive));
                }
            })
            .context("Failed to start line editor thread")?;
        ready_rx.recv().context("Line editor thread exited")??;

        Ok(Self {
            prompts,
            signals: TerminationSignals::install()?,
        })
    }

    async fn read_line(&mut self, prompt: String) -> Result<Read> {
        let (reply, answer) = oneshot::channel();
        self.prompts
            .send((prompt, reply))
            .map_err(|_| anyhow!("Line editor stopped"))?;

        tokio::select! {
            read = answer => read.context("Line editor stopped")?,
            signal = self.signals.recv() => Ok(Read::Terminated(signal)),
        }
    }
}

pub async fn run(mut controller: SessionController, target: Target) -> Result<SessionEnd> {
    // Listen for termination signals before the network is cut.
    let mut terminal = Terminal::new()?;

    let snapshot = match target {
        Target::New(title) => {
            let document = controller.new_document(&title).await?;
            controller.open_session(document).await?
        }
        Target::Existing(id) => controller.open_document(&id).await?,
    };

    // Registering a handler replaces the default SIGINT behaviour, so Ctrl-C
    // outside of readline cannot kill the session either.
    let sigint = tokio::spawn(async {
        while tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("[Session] Ignoring Ctrl-C during a locked session");
        }
    });

    print_banner(&snapshot);
    let result = session_loop(&mut controller, &mut terminal, snapshot.document.content).await;
    sigint.abort();

    if controller.is_active() {
        match &result {
            Ok(SessionEnd::Terminated(signal)) => {
                tracing::warn!("[Session] Received {}, shutting the session down", signal);
            }
            Ok(SessionEnd::Finished) => {}
            Err(e) => tracing::warn!("[Session] Session ended abnormally: {}", e),
        }
        controller.shutdown().await;
    }
    result
}

async fn session_loop(
    controller: &mut SessionController,
    terminal: &mut Terminal,
    mut content: String,
) -> Result<SessionEnd> {
    loop {
        let prompt = writing_prompt(&controller.snapshot().await?);
        let line = match terminal.read_line(prompt).await? {
            Read::Line(line) => line,
            Read::Break => {
                if let Some(end) = exit_challenge(controller, terminal).await? {
                    return Ok(end);
                }
                continue;
            }
            Read::Closed => bail!(INPUT_CLOSED),
            Read::Terminated(signal) => return Ok(SessionEnd::Terminated(signal)),
        };

        match parse_line(&line) {
            Input::Text(text) => {
                content.push_str(text);
                content.push('\n');
                controller.edit(content.clone()).await?;
            }
            Input::Save => match controller.explicit_save().await {
                Ok(()) => println!("{}", "Saved.".green()),
                Err(e) => println!("{} {}", "Save failed:".red(), e),
            },
            Input::Exit => {
                if let Some(end) = exit_challenge(controller, terminal).await? {
                    return Ok(end);
                }
            }
            Input::Status => print_status(&controller.snapshot().await?),
            Input::Show => print!("{}", content),
            Input::Unknown(command) => {
                println!(
                    "{} :{} (try :save, :exit, :status, :show)",
                    "Unknown command".yellow(),
                    command
                );
            }
        }
    }
}

/// Runs the passphrase prompts. Returns `None` when the user goes back to
/// writing.
async fn exit_challenge(
    controller: &mut SessionController,
    terminal: &mut Terminal,
) -> Result<Option<SessionEnd>> {
    controller.request_exit()?;
    let total = controller.exit_stage_count().unwrap_or_default();

    loop {
        let stage = controller.snapshot().await?.exit_stage;
        let prompt = format!(
            "{} {}/{} (empty line to keep writing): ",
            "passphrase".bright_magenta(),
            stage + 1,
            total
        );
        let candidate = match terminal.read_line(prompt).await? {
            Read::Line(candidate) => candidate,
            Read::Break => String::new(),
            Read::Closed => bail!(INPUT_CLOSED),
            Read::Terminated(signal) => return Ok(Some(SessionEnd::Terminated(signal))),
        };

        if candidate.is_empty() {
            controller.cancel_exit_attempt()?;
            println!("{}", "Back to writing.".dimmed());
            return Ok(None);
        }

        match controller.attempt_exit(&candidate).await? {
            ExitOutcome::Denied { stage: next } if next > stage => {
                println!("{}", "Accepted.".green());
            }
            ExitOutcome::Denied { .. } => {
                println!("{}", "Wrong passphrase.".red());
            }
            ExitOutcome::Granted {
                document,
                flush_error,
            } => {
                println!("{}", "Session released. Network access restored.".green());
                if let Some(e) = flush_error {
                    return retry_final_save(controller, terminal, &document, e.to_string())
                        .await
                        .map(Some);
                }
                return Ok(Some(SessionEnd::Finished));
            }
        }
    }
}

/// Offers to retry a final save that failed. Declining, closing the input
/// or interrupting prints the unsaved text instead.
async fn retry_final_save(
    controller: &SessionController,
    terminal: &mut Terminal,
    document: &Document,
    mut error: String,
) -> Result<SessionEnd> {
    loop {
        println!("{} {}", "Final save failed:".red(), error);
        let retry = match terminal.read_line("Retry? [Y/n] ".to_string()).await? {
            Read::Line(answer) => !answer.trim().eq_ignore_ascii_case("n"),
            Read::Break | Read::Closed => false,
            Read::Terminated(signal) => {
                tracing::warn!(
                    "[Session] Received {} with unsaved text in document {}",
                    signal,
                    document.id
                );
                return Ok(SessionEnd::Terminated(signal));
            }
        };
        if !retry {
            println!("{}", "Unsaved text follows:".yellow());
            print!("{}", document.content);
            return Ok(SessionEnd::Finished);
        }
        match controller.save_document(document).await {
            Ok(_) => {
                println!("{}", "Saved.".green());
                return Ok(SessionEnd::Finished);
            }
            Err(e) => error = e.to_string(),
        }
    }
}

fn writing_prompt(snapshot: &SessionSnapshot) -> String {
    let status = if snapshot.dirty {
        "unsaved".yellow().to_string()
    } else if snapshot.saved_indicator {
        "saved".green().to_string()
    } else {
        String::new()
    };
    format!("{} [{}] > ", snapshot.document.title.bold(), status)
}

fn print_banner(snapshot: &SessionSnapshot) {
    println!(
        "{} {}",
        "Writing".bright_cyan().bold(),
        snapshot.document.title.bold()
    );
    println!(
        "{}",
        "Network access is off until you pass the exit challenge. :save saves, :exit leaves."
            .dimmed()
    );
    if !snapshot.document.content.is_empty() {
        print!("{}", snapshot.document.content);
    }
}

fn print_status(snapshot: &SessionSnapshot) {
    let saved = snapshot
        .last_saved_at
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());
    println!(
        "dirty: {}  last saved: {}  network: {}  exit stage: {}",
        snapshot.dirty,
        saved,
        if snapshot.network_disabled { "off" } else { "on" },
        snapshot.exit_stage
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text() {
        assert_eq!(parse_line("Once upon a time"), Input::Text("Once upon a time"));
        assert_eq!(parse_line(""), Input::Text(""));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_line(":save"), Input::Save);
        assert_eq!(parse_line(":w"), Input::Save);
        assert_eq!(parse_line(":exit "), Input::Exit);
        assert_eq!(parse_line(":q"), Input::Exit);
        assert_eq!(parse_line(":status"), Input::Status);
        assert_eq!(parse_line(":show"), Input::Show);
        assert_eq!(parse_line(":bogus"), Input::Unknown("bogus"));
    }

    #[test]
    fn test_parse_escaped_colon() {
        assert_eq!(parse_line("::save"), Input::Text(":save"));
        assert_eq!(parse_line("::"), Input::Text(":"));
    }

    #[test]
    fn test_interrupt_is_a_break_everywhere() {
        for interactive in [true, false] {
            let read = classify_read(Err(ReadlineError::Interrupted), interactive).unwrap();
            assert_eq!(read, Read::Break);
        }
    }

    #[test]
    fn test_end_of_piped_input_is_final() {
        assert_eq!(
            classify_read(Err(ReadlineError::Eof), false).unwrap(),
            Read::Closed
        );
        assert_eq!(
            classify_read(Err(ReadlineError::Eof), true).unwrap(),
            Read::Break
        );
        assert_eq!(
            classify_read(Ok("hi".to_string()), false).unwrap(),
            Read::Line("hi".to_string())
        );
    }
}
