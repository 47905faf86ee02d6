//! Shared task store.
//!
//! One async mutex guards the in-memory document, the dequeue order, and the
//! write-through to disk, so concurrent workers never interleave a
//! read-modify-write of `pending`/`completed`.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use super::document;
use super::types::{Task, TaskDocument, TaskRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("read task document {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse task document {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("serialize task document: {0}")]
    Serialize(#[source] serde_yaml::Error),
    /// The document could not be written back. Fatal to the scheduler run.
    #[error("persist task document {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("task is not pending: {0}")]
    NotPending(String),
}

struct State {
    doc: TaskDocument,
    /// Tasks not yet handed to a worker, in document order.
    queue: VecDeque<Task>,
}

/// Handle to the shared document. Clones share the same state.
///
/// A task stays in `pending` (in memory and on disk) while it runs; it moves
/// to `completed` only in `complete`, in the same critical section that
/// persists the document.
#[derive(Clone)]
pub struct TaskStore {
    path: PathBuf,
    state: Arc<Mutex<State>>,
}

impl TaskStore {
    /// Load the document at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let doc = document::load(path)?;
        Ok(Self::from_document(path, doc))
    }

    /// Wrap an already loaded document that persists to `path`.
    pub fn from_document(path: &Path, doc: TaskDocument) -> Self {
        let queue = doc.pending.iter().cloned().collect();
        Self {
            path: path.to_path_buf(),
            state: Arc::new(Mutex::new(State { doc, queue })),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of tasks not yet handed out.
    pub async fn queued(&self) -> usize {
        self.state.lock().await.queue.len()
    }

    /// Hand out the next task, or None once every task has been taken.
    pub async fn take_one(&self) -> Option<Task> {
        self.state.lock().await.queue.pop_front()
    }

    /// Move `record.task` from `pending` to `completed` and persist.
    ///
    /// On a persistence failure the in-memory move is kept and the error is
    /// returned; the caller must stop the run.
    pub async fn complete(&self, record: TaskRecord) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let pos = state
            .doc
            .pending
            .iter()
            .position(|t| *t == record.task)
            .ok_or_else(|| StoreError::NotPending(record.task.describe()))?;
        state.doc.pending.remove(pos);
        state.doc.completed.push(record);

        let snapshot = state.doc.clone();
        let path = self.path.clone();
        // Lock is held across the write so saves land in completion order.
        let saved = tokio::task::spawn_blocking(move || document::save(&path, &snapshot)).await;
        match saved {
            Ok(res) => res,
            Err(e) => Err(StoreError::Persistence {
                path: self.path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
            }),
        }
    }

    /// Copy of the current in-memory document.
    pub async fn snapshot(&self) -> TaskDocument {
        self.state.lock().await.doc.clone()
    }
}
