use super::command::{Command, Setting};
use super::session_controller::{Session, SessionError};
use crate::config::{PREF_SHOW_LINE_NUMBERS, PreferenceChange};
use crate::instance::Mailbox;
use crate::view::{DocumentViewModel, View};
use std::io::{self, BufRead, Write};
use std::sync::mpsc::Receiver;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Line-oriented command loop: reads one [`Command`] per line from `input`
/// and writes status lines and rendered text to `output`.
pub struct Editor<R, W> {
    session: Session,
    view: View,
    preference_changes: Receiver<PreferenceChange>,
    mailbox: Option<Mailbox>,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Editor<R, W> {
    pub fn new(mut session: Session, mut view: View, input: R, output: W) -> Self {
        let preference_changes = session.preferences_mut().subscribe();
        view.set_line_numbers(session.show_line_numbers());
        Self {
            session,
            view,
            preference_changes,
            mailbox: None,
            input,
            output,
        }
    }

    /// Checks `mailbox` for open requests before every command.
    pub fn with_mailbox(mut self, mailbox: Mailbox) -> Self {
        self.mailbox = Some(mailbox);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn run(&mut self) -> io::Result<()> {
        let mut line = String::new();
        loop {
            self.poll_mailbox()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                if !self.session.can_close() {
                    tracing::warn!("input ended with unsaved changes");
                    self.report("Input ended; unsaved changes discarded")?;
                }
                break;
            }

            let command = line.trim_end_matches(['\n', '\r']);
            if self.execute_line(command)? == Flow::Quit {
                break;
            }
            self.autosave()?;
        }

        if let Err(err) = self.session.shutdown() {
            tracing::warn!(error = %err, "could not save preferences");
        }
        Ok(())
    }

    /// Runs one line of input; blank lines and `#` comments are skipped.
    pub fn execute_line(&mut self, line: &str) -> io::Result<Flow> {
        if line.trim().is_empty() || line.starts_with('#') {
            return Ok(Flow::Continue);
        }

        let flow = match line.parse::<Command>() {
            Ok(command) => self.execute(command)?,
            Err(err) => {
                self.report(&format!("Error: {err}"))?;
                Flow::Continue
            }
        };
        self.apply_preference_changes();
        Ok(flow)
    }

    fn execute(&mut self, command: Command) -> io::Result<Flow> {
        tracing::debug!(?command, "execute");

        let outcome = match command {
            Command::PrintVisible => {
                self.render()?;
                Ok(None)
            }
            Command::PrintRaw => {
                self.print_raw()?;
                Ok(None)
            }
            Command::Recent => {
                self.print_recent()?;
                Ok(None)
            }
            Command::Quit { force } => {
                if force || self.session.can_close() {
                    return Ok(Flow::Quit);
                }
                Err(SessionError::Unsaved)
            }
            Command::Search(query) => match self.session.document_mut().search(&query) {
                Ok(()) => Ok(Some(self.filter_status())),
                Err(err) => Err(err.into()),
            },
            Command::Insert { offset, text } => self
                .session
                .document_mut()
                .insert(offset, &text)
                .map(|()| None)
                .map_err(SessionError::from),
            Command::Remove { offset, length } => self
                .session
                .document_mut()
                .remove(offset, length)
                .map(|()| None)
                .map_err(SessionError::from),
            Command::Undo => Ok((!self.session.document_mut().undo())
                .then(|| "Already at oldest change".to_string())),
            Command::Redo => Ok((!self.session.document_mut().redo())
                .then(|| "Already at newest change".to_string())),
            Command::Write(path) => self.session.save(path).map(Some),
            Command::Edit { path, force } => self.session.open(&path, force).map(Some),
            Command::New { force } => self.session.new_document(force).map(Some),
            Command::Set(Setting::LineNumbers(show)) => {
                self.session.set_line_numbers(show).map(|()| None)
            }
            Command::Set(Setting::AutoSave(enabled)) => {
                self.session.set_auto_save(enabled).map(|()| None)
            }
        };

        match outcome {
            Ok(Some(message)) => self.report(&message)?,
            Ok(None) => {}
            Err(err) => self.report(&format!("Error: {err}"))?,
        }
        Ok(Flow::Continue)
    }

    fn filter_status(&self) -> String {
        let document = self.session.document();
        if document.current_search().is_empty() {
            return "Filter cleared".to_string();
        }
        let lines = document.visible_text().lines().count();
        format!("/{}: {} matching lines", document.current_search(), lines)
    }

    fn render(&mut self) -> io::Result<()> {
        let model = DocumentViewModel::new(self.session.document());
        self.view.render(&mut self.output, &model)
    }

    fn print_raw(&mut self) -> io::Result<()> {
        let text = self.session.document().text();
        write!(self.output, "{}", text)?;
        if !text.ends_with('\n') {
            writeln!(self.output)?;
        }
        Ok(())
    }

    fn print_recent(&mut self) -> io::Result<()> {
        if self.session.recent_files().is_empty() {
            return self.report("No recent files");
        }
        for (index, path) in self.session.recent_files().iter().enumerate() {
            writeln!(self.output, "{:>2} {}", index + 1, path.display())?;
        }
        Ok(())
    }

    fn report(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{}", message)
    }

    fn poll_mailbox(&mut self) -> io::Result<()> {
        let Some(mailbox) = &self.mailbox else {
            return Ok(());
        };
        let files = match mailbox.take() {
            Ok(Some(files)) => files,
            Ok(None) => return Ok(()),
            Err(err) => {
                tracing::warn!(path = %mailbox.path().display(), error = %err, "could not read open request");
                return Ok(());
            }
        };

        let mut files = files.into_iter();
        let Some(first) = files.next() else {
            return Ok(());
        };
        for ignored in files {
            tracing::warn!(path = %ignored.display(), "one document at a time; ignoring");
        }

        match self.session.open(&first, false) {
            Ok(message) => self.report(&message),
            Err(err) => self.report(&format!("Cannot open {}: {err}", first.display())),
        }
    }

    fn apply_preference_changes(&mut self) {
        // Changes stay queued until the session has loaded its document
        if !self.session.is_initialized() {
            return;
        }
        for change in self.preference_changes.try_iter() {
            if change.key == PREF_SHOW_LINE_NUMBERS {
                self.view.set_line_numbers(self.session.show_line_numbers());
            }
        }
    }

    fn autosave(&mut self) -> io::Result<()> {
        match self.session.autosave_tick(Instant::now()) {
            Some(Ok(bytes)) => {
                let message = format!(
                    "\"{}\" {}B written (auto-save)",
                    self.session.document().display_name(),
                    bytes
                );
                self.report(&message)
            }
            Some(Err(err)) => self.report(&format!("Auto-save failed: {err}")),
            None => Ok(()),
        }
    }
}
