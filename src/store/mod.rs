//! Document store for users, quizzes, test history and uploaded documents.
//!
//! Everything lives in memory. When opened with a path, the whole store is
//! written back as a JSON snapshot on every [`Store::flush`].

mod snapshot;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::models::{Creator, PdfDocument, Quiz, TestHistory, User};

pub use snapshot::StoreError;
use snapshot::Snapshot;

#[derive(Debug, Default)]
pub struct Store {
    users: HashMap<Uuid, User>,
    quizzes: HashMap<Uuid, Quiz>,
    history: HashMap<Uuid, TestHistory>,
    pdfs: HashMap<Uuid, PdfDocument>,
    path: Option<PathBuf>,
}

impl Store {
    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a store backed by a snapshot file. A missing file starts empty.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let snapshot = snapshot::load(path)?.unwrap_or_default();

        let mut store = Self {
            path: Some(path.to_path_buf()),
            ..Self::default()
        };
        store.restore(snapshot);

        tracing::info!(
            path = %path.display(),
            users = store.users.len(),
            quizzes = store.quizzes.len(),
            results = store.history.len(),
            "store opened"
        );
        Ok(store)
    }

    /// Persist the current contents, if the store is file backed.
    pub fn flush(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        snapshot::save(path, &self.snapshot())
    }

    /// Apply `change` and persist it. If the change fails or the snapshot
    /// cannot be written, the store is put back as it was.
    pub fn transaction<T, E>(&mut self, change: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        if self.path.is_none() {
            return change(self);
        }

        let before = self.snapshot();
        let result = match change(self) {
            Ok(value) => self.flush().map(|()| value).map_err(E::from),
            Err(err) => Err(err),
        };
        if result.is_err() {
            self.restore(before);
        }
        result
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            users: self.users.values().cloned().collect(),
            quizzes: self.quizzes.values().cloned().collect(),
            history: self.history.values().cloned().collect(),
            pdfs: self.pdfs.values().cloned().collect(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.users = snapshot.users.into_iter().map(|u| (u.id, u)).collect();
        self.quizzes = snapshot.quizzes.into_iter().map(|q| (q.id, q)).collect();
        self.history = snapshot.history.into_iter().map(|h| (h.id, h)).collect();
        self.pdfs = snapshot.pdfs.into_iter().map(|p| (p.id, p)).collect();
    }

    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    pub fn user(&self, id: Uuid) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn user_mut(&mut self, id: Uuid) -> Option<&mut User> {
        self.users.get_mut(&id)
    }

    pub fn user_by_username(&self, username: &str) -> Option<&User> {
        self.users.values().find(|u| u.username == username)
    }

    /// Find a user other than `except` that already holds `username` or `email`.
    pub fn conflicting_user(&self, username: &str, email: &str, except: Option<Uuid>) -> Option<&User> {
        self.users.values().find(|u| {
            Some(u.id) != except && (u.username == username || u.email == email)
        })
    }

    pub fn creator(&self, user_id: Uuid) -> Option<Creator> {
        self.user(user_id).map(User::creator)
    }

    pub fn insert_quiz(&mut self, quiz: Quiz) {
        self.quizzes.insert(quiz.id, quiz);
    }

    pub fn quiz(&self, id: Uuid) -> Option<&Quiz> {
        self.quizzes.get(&id)
    }

    /// The owner's quiz, only while it is still active.
    pub fn active_quiz_owned_mut(&mut self, id: Uuid, owner: Uuid) -> Option<&mut Quiz> {
        self.quizzes
            .get_mut(&id)
            .filter(|q| q.created_by == owner && q.is_active)
    }

    /// Remove a quiz if `owner` created it.
    pub fn remove_quiz_owned(&mut self, id: Uuid, owner: Uuid) -> Option<Quiz> {
        if self.quizzes.get(&id)?.created_by != owner {
            return None;
        }
        self.quizzes.remove(&id)
    }

    /// Active quizzes, newest first, optionally limited to one author.
    pub fn active_quizzes(&self, created_by: Option<Uuid>) -> Vec<&Quiz> {
        let mut quizzes: Vec<&Quiz> = self
            .quizzes
            .values()
            .filter(|q| q.is_active && created_by.is_none_or(|id| q.created_by == id))
            .collect();
        quizzes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        quizzes
    }

    pub fn insert_history(&mut self, entry: TestHistory) {
        self.history.insert(entry.id, entry);
    }

    /// A user's results, newest first.
    pub fn history_for(&self, user: Uuid) -> Vec<&TestHistory> {
        let mut results: Vec<&TestHistory> =
            self.history.values().filter(|h| h.user == user).collect();
        results.sort_by(|a, b| b.date.cmp(&a.date));
        results
    }

    pub fn remove_history_owned(&mut self, id: Uuid, user: Uuid) -> Option<TestHistory> {
        if self.history.get(&id)?.user != user {
            return None;
        }
        self.history.remove(&id)
    }

    pub fn insert_pdf(&mut self, document: PdfDocument) {
        self.pdfs.insert(document.id, document);
    }

    pub fn pdf(&self, id: Uuid) -> Option<&PdfDocument> {
        self.pdfs.get(&id)
    }
}
