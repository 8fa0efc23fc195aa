//! Single-instance support: a lock file marks the running instance and a
//! mailbox file carries "open these files" requests from later launches.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstanceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenRequest {
    files: Vec<PathBuf>,
}

fn user_name() -> String {
    env::var("USER")
        .or_else(|_| env::var("USERNAME"))
        .unwrap_or_else(|_| "default".to_string())
}

/// A one-slot mailbox. A request is visible only once it has been written in
/// full, and a new request can be posted only after the previous one was
/// taken.
#[derive(Debug, Clone)]
pub struct Mailbox {
    path: PathBuf,
}

impl Mailbox {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn for_user(app_name: &str) -> Self {
        Self::new(env::temp_dir().join(format!("{}-{}.mailbox", app_name, user_name())))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_pending(&self) -> bool {
        self.path.exists()
    }

    /// Delivers `files` unless an earlier request is still waiting; returns
    /// whether it was delivered.
    pub fn post(&self, files: &[PathBuf]) -> Result<bool, InstanceError> {
        if self.is_pending() {
            return Ok(false);
        }

        let staging = self.path.with_extension(format!("{}.tmp", process::id()));
        let payload = serde_json::to_vec(&OpenRequest {
            files: files.to_vec(),
        })?;
        fs::write(&staging, payload)?;

        // Linking fails if another request got there first
        let delivered = match fs::hard_link(&staging, &self.path) {
            Ok(()) => true,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => false,
            Err(err) => {
                let _ = fs::remove_file(&staging);
                return Err(err.into());
            }
        };
        fs::remove_file(&staging)?;

        tracing::debug!(delivered, count = files.len(), "posted open request");
        Ok(delivered)
    }

    /// Takes the waiting request, if any, leaving the slot empty.
    pub fn take(&self) -> Result<Option<Vec<PathBuf>>, InstanceError> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        fs::remove_file(&self.path)?;

        let request: OpenRequest = serde_json::from_slice(&content)?;
        Ok(Some(request.files))
    }
}

/// What a launch does after trying to take the instance lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handoff {
    /// This launch holds the lock and runs the editor.
    Run,
    /// Another instance is running and the files were left in its mailbox.
    Delivered,
    /// Another instance is running but has not taken its previous request.
    Busy,
}

/// A launch without the lock hands all of its files to the running instance
/// and opens nothing itself.
pub fn hand_off(
    lock: Option<&InstanceLock>,
    mailbox: &Mailbox,
    files: &[PathBuf],
) -> Result<Handoff, InstanceError> {
    if lock.is_some() {
        return Ok(Handoff::Run);
    }
    if mailbox.post(files)? {
        Ok(Handoff::Delivered)
    } else {
        Ok(Handoff::Busy)
    }
}

/// Held by the running instance; removes its lock file when dropped.
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
}

impl InstanceLock {
    pub fn path_for_user(app_name: &str) -> PathBuf {
        env::temp_dir().join(format!("{}-{}.lock", app_name, user_name()))
    }

    /// Returns `None` when another instance already holds the lock.
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Option<Self>, InstanceError> {
        let path = path.into();
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                writeln!(file, "{}", process::id())?;
                Ok(Some(Self { path }))
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Removes a lock left behind by an instance that did not exit cleanly.
    pub fn break_stale(path: &Path) -> Result<(), InstanceError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %err, "could not remove lock file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_post_then_take() {
        let dir = tempdir().unwrap();
        let mailbox = Mailbox::new(dir.path().join("notecomb.mailbox"));
        assert_eq!(mailbox.take().unwrap(), None);

        let files = vec![PathBuf::from("/notes/a.txt"), PathBuf::from("b.txt")];
        assert!(mailbox.post(&files).unwrap());
        assert!(mailbox.is_pending());

        assert_eq!(mailbox.take().unwrap(), Some(files));
        assert!(!mailbox.is_pending());
        assert_eq!(mailbox.take().unwrap(), None);
    }

    #[test]
    fn test_second_post_waits_for_take() {
        let dir = tempdir().unwrap();
        let mailbox = Mailbox::new(dir.path().join("notecomb.mailbox"));

        assert!(mailbox.post(&[PathBuf::from("first.txt")]).unwrap());
        assert!(!mailbox.post(&[PathBuf::from("second.txt")]).unwrap());
        assert_eq!(
            mailbox.take().unwrap(),
            Some(vec![PathBuf::from("first.txt")])
        );
        assert!(mailbox.post(&[PathBuf::from("second.txt")]).unwrap());
    }

    #[test]
    fn test_hand_off_without_lock_sends_every_file() {
        let dir = tempdir().unwrap();
        let mailbox = Mailbox::new(dir.path().join("notecomb.mailbox"));
        let files = vec![PathBuf::from("a.txt")];

        assert_eq!(hand_off(None, &mailbox, &files).unwrap(), Handoff::Delivered);
        assert_eq!(mailbox.take().unwrap(), Some(files.clone()));

        mailbox.post(&[PathBuf::from("pending.txt")]).unwrap();
        assert_eq!(hand_off(None, &mailbox, &files).unwrap(), Handoff::Busy);
    }

    #[test]
    fn test_hand_off_with_lock_runs_here() {
        let dir = tempdir().unwrap();
        let lock = InstanceLock::acquire(dir.path().join("notecomb.lock"))
            .unwrap()
            .unwrap();
        let mailbox = Mailbox::new(dir.path().join("notecomb.mailbox"));

        let files = [PathBuf::from("a.txt"), PathBuf::from("b.txt")];
        assert_eq!(hand_off(Some(&lock), &mailbox, &files).unwrap(), Handoff::Run);
        assert!(!mailbox.is_pending());
    }

    #[test]
    fn test_lock_is_exclusive_and_released_on_drop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notecomb.lock");

        let lock = InstanceLock::acquire(&path).unwrap();
        assert!(lock.is_some());
        assert!(InstanceLock::acquire(&path).unwrap().is_none());

        drop(lock);
        assert!(!path.exists());
        assert!(InstanceLock::acquire(&path).unwrap().is_some());
    }

    #[test]
    fn test_break_stale_lock() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notecomb.lock");
        fs::write(&path, "12345\n").unwrap();

        assert!(InstanceLock::acquire(&path).unwrap().is_none());
        InstanceLock::break_stale(&path).unwrap();
        InstanceLock::break_stale(&path).unwrap();
        assert!(InstanceLock::acquire(&path).unwrap().is_some());
    }
}
