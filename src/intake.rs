//! File intake: the extension gate and the background decode workers
//!
//! Intakes run independently on their own threads and report through a
//! shared channel, so a second file can be opened while the first is
//! still loading. Completed documents append in whatever order the
//! decodes finish. There is no cancellation of an in-flight intake.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::decode::{DecodeError, TableDecoder};
use crate::document::Document;

/// Accepted file formats, matched on the lower-cased extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Mdb,
    Accdb,
}

impl FileKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "mdb" => Some(FileKind::Mdb),
            "accdb" => Some(FileKind::Accdb),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("unsupported file format (expected .mdb or .accdb)")]
    UnsupportedFormat,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

pub enum IntakeEvent {
    Loaded(Document),
    Failed {
        file_name: String,
        error: IntakeError,
    },
}

pub struct Intake {
    decoder: Arc<dyn TableDecoder>,
    tx: Sender<IntakeEvent>,
    rx: Receiver<IntakeEvent>,
    pending: usize,
}

impl Intake {
    pub fn new(decoder: Arc<dyn TableDecoder>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            decoder,
            tx,
            rx,
            pending: 0,
        }
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Gate on the extension, then hand the file to a worker thread.
    /// Rejection happens synchronously, before any state changes, so
    /// the caller can alert exactly once and move on.
    pub fn begin(&mut self, path: PathBuf) -> Result<(), IntakeError> {
        if FileKind::from_path(&path).is_none() {
            return Err(IntakeError::UnsupportedFormat);
        }

        let decoder = Arc::clone(&self.decoder);
        let tx = self.tx.clone();
        self.pending += 1;
        debug!(path = %path.display(), "starting intake");

        thread::spawn(move || {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            let event = match load_document(&path, &file_name, decoder.as_ref()) {
                Ok(document) => IntakeEvent::Loaded(document),
                Err(error) => {
                    error!(file = %file_name, %error, "intake failed");
                    IntakeEvent::Failed { file_name, error }
                }
            };
            // The receiver only goes away on shutdown
            let _ = tx.send(event);
        });

        Ok(())
    }

    /// Drain one completed intake, if any. Called from the event loop.
    pub fn poll(&mut self) -> Option<IntakeEvent> {
        match self.rx.try_recv() {
            Ok(event) => {
                self.pending = self.pending.saturating_sub(1);
                Some(event)
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

fn load_document(
    path: &Path,
    file_name: &str,
    decoder: &dyn TableDecoder,
) -> Result<Document, IntakeError> {
    let metadata = fs::metadata(path)?;
    let bytes = fs::read(path)?;
    let tables = decoder.decode(&bytes)?;
    info!(file = %file_name, tables = tables.len(), size = metadata.len(), "decoded document");

    Ok(Document::new(
        file_name,
        metadata.len(),
        metadata.modified().ok(),
        tables,
    ))
}
