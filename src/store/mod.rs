//! In-memory store for users, sessions and notes.
//!
//! Nothing survives a restart. Users live behind one mutex; notes and
//! sessions share a second one, so a note deletion sees a consistent view of
//! the session that authorizes it.

pub mod types;

pub use types::{Note, Session, User, NO_USER};

use crate::error::StoreError;
use std::sync::{Mutex, MutexGuard};

/// Notes and the sessions that authorize access to them
#[derive(Debug, Default)]
struct Notebook {
    notes: Vec<Note>,
    sessions: Vec<Session>,
}

impl Notebook {
    fn session_owner(&self, session_id: &str) -> Option<u32> {
        self.sessions
            .iter()
            .find(|s| s.id == session_id)
            .map(|s| s.user_id)
    }
}

/// Thread-safe store shared by all request handlers.
///
/// Ids are `collection length + 1` at insertion time. Sessions and users are
/// never removed so their ids stay unique; note ids can repeat once a note
/// has been deleted.
#[derive(Debug, Default)]
pub struct Store {
    users: Mutex<Vec<User>>,
    notebook: Mutex<Notebook>,
}

/// Id for the next record in a collection of `len` entries
fn next_id(len: usize, collection: &'static str) -> Result<u32, StoreError> {
    len.checked_add(1)
        .and_then(|id| u32::try_from(id).ok())
        .ok_or(StoreError::IdsExhausted(collection))
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    fn users(&self) -> MutexGuard<'_, Vec<User>> {
        self.users.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn notebook(&self) -> MutexGuard<'_, Notebook> {
        self.notebook.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Register a new account and return its id.
    ///
    /// Rejected only when name, email and password are all empty; any single
    /// non-empty field is enough. Duplicate emails are accepted.
    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<u32, StoreError> {
        if name.is_empty() && email.is_empty() && password.is_empty() {
            return Err(StoreError::EmptyCredentials);
        }

        let mut users = self.users();
        let id = next_id(users.len(), "users")?;
        users.push(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        });

        tracing::debug!("Created user {}", id);
        Ok(id)
    }

    /// First user whose email and password both match exactly
    pub fn find_user_by_credentials(&self, email: &str, password: &str) -> Option<User> {
        self.users()
            .iter()
            .find(|u| u.email == email && u.password == password)
            .filter(|u| u.id != NO_USER)
            .cloned()
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Issue a session for `user_id`. The token is the decimal session count.
    pub fn create_session(&self, user_id: u32) -> String {
        let mut notebook = self.notebook();
        let id = (notebook.sessions.len() + 1).to_string();
        notebook.sessions.push(Session {
            id: id.clone(),
            user_id,
            logged_in: true,
        });

        tracing::debug!("Issued session {} for user {}", id, user_id);
        id
    }

    /// Resolve a session token to its owning user id
    pub fn find_session(&self, session_id: &str) -> Option<u32> {
        self.notebook().session_owner(session_id)
    }

    // ========================================================================
    // Notes
    // ========================================================================

    /// All notes owned by `user_id`, in insertion order
    pub fn list_notes(&self, user_id: u32) -> Vec<Note> {
        self.notebook()
            .notes
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Store a note for `user_id` and return its id (global, not per user)
    pub fn create_note(&self, user_id: u32, text: &str) -> Result<u32, StoreError> {
        let mut notebook = self.notebook();
        let id = next_id(notebook.notes.len(), "notes")?;
        notebook.notes.push(Note {
            id,
            note: text.to_string(),
            user_id,
        });

        tracing::debug!("Created note {} for user {}", id, user_id);
        Ok(id)
    }

    /// Delete a note through the session that owns it.
    ///
    /// An unknown session fails before any note is touched. A missing or
    /// foreign-owned note is not an error.
    pub fn delete_note(&self, session_id: &str, note_id: u32) -> Result<(), StoreError> {
        let mut notebook = self.notebook();
        let user_id = notebook
            .session_owner(session_id)
            .ok_or(StoreError::Unauthorized)?;

        if let Some(pos) = notebook
            .notes
            .iter()
            .position(|n| n.id == note_id && n.user_id == user_id)
        {
            notebook.notes.remove(pos);
            tracing::debug!("Deleted note {} for user {}", note_id, user_id);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_assigns_sequential_ids() {
        let store = Store::new();
        assert_eq!(store.create_user("a", "a@x.com", "p").unwrap(), 1);
        assert_eq!(store.create_user("b", "b@x.com", "q").unwrap(), 2);
    }

    #[test]
    fn test_create_user_accepts_any_single_field() {
        let store = Store::new();
        assert!(store.create_user("a", "", "").is_ok());
        assert!(store.create_user("", "a@x.com", "").is_ok());
        assert!(store.create_user("", "", "p").is_ok());
    }

    #[test]
    fn test_create_user_rejects_all_empty() {
        let store = Store::new();
        assert_eq!(
            store.create_user("", "", ""),
            Err(StoreError::EmptyCredentials)
        );
        assert!(store.find_user_by_credentials("", "").is_none());
    }

    #[test]
    fn test_duplicate_email_first_match_wins() {
        let store = Store::new();
        store.create_user("first", "a@x.com", "p").unwrap();
        store.create_user("second", "a@x.com", "p").unwrap();

        let user = store.find_user_by_credentials("a@x.com", "p").unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.name, "first");
    }

    #[test]
    fn test_find_user_requires_exact_match() {
        let store = Store::new();
        store.create_user("a", "a@x.com", "p").unwrap();

        assert!(store.find_user_by_credentials("a@x.com", "P").is_none());
        assert!(store.find_user_by_credentials("A@x.com", "p").is_none());
        assert!(store.find_user_by_credentials("a@x.com", "p").is_some());
    }

    #[test]
    fn test_find_user_on_empty_store() {
        let store = Store::new();
        assert!(store.find_user_by_credentials("a@x.com", "p").is_none());
    }

    #[test]
    fn test_sessions_are_decimal_counters() {
        let store = Store::new();
        assert_eq!(store.create_session(7), "1");
        assert_eq!(store.create_session(7), "2");
        assert_eq!(store.create_session(3), "3");

        assert_eq!(store.find_session("1"), Some(7));
        assert_eq!(store.find_session("3"), Some(3));
        assert_eq!(store.find_session("4"), None);
        assert_eq!(store.find_session(""), None);
    }

    #[test]
    fn test_list_notes_filters_by_owner_in_order() {
        let store = Store::new();
        store.create_note(1, "one").unwrap();
        store.create_note(2, "other").unwrap();
        store.create_note(1, "two").unwrap();

        let notes = store.list_notes(1);
        let texts: Vec<&str> = notes.iter().map(|n| n.note.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert_eq!(notes[1].id, 3);
        assert!(store.list_notes(9).is_empty());
    }

    #[test]
    fn test_delete_note_unknown_session() {
        let store = Store::new();
        store.create_note(1, "keep").unwrap();

        assert_eq!(store.delete_note("1", 1), Err(StoreError::Unauthorized));
        assert_eq!(store.list_notes(1).len(), 1);
    }

    #[test]
    fn test_delete_foreign_note_is_silent_noop() {
        let store = Store::new();
        let owner_sid = store.create_session(1);
        let other_sid = store.create_session(2);
        let id = store.create_note(1, "mine").unwrap();

        assert_eq!(store.delete_note(&other_sid, id), Ok(()));
        assert_eq!(store.list_notes(1).len(), 1);

        assert_eq!(store.delete_note(&owner_sid, 99), Ok(()));
        assert_eq!(store.delete_note(&owner_sid, id), Ok(()));
        assert!(store.list_notes(1).is_empty());
    }

    #[test]
    fn test_note_id_reused_after_delete() {
        // Ids are length-based, so a delete followed by a create repeats
        // the id of the newest surviving note.
        let store = Store::new();
        let sid = store.create_session(1);
        let first = store.create_note(1, "first").unwrap();
        let second = store.create_note(1, "second").unwrap();
        store.delete_note(&sid, first).unwrap();

        let third = store.create_note(1, "third").unwrap();
        assert_eq!(third, second);

        let ids: Vec<u32> = store.list_notes(1).iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 2]);
    }

    #[test]
    fn test_next_id_rejects_u32_overflow() {
        assert_eq!(next_id(0, "notes"), Ok(1));
        assert_eq!(next_id(u32::MAX as usize - 1, "notes"), Ok(u32::MAX));
        assert_eq!(
            next_id(u32::MAX as usize, "notes"),
            Err(StoreError::IdsExhausted("notes"))
        );
        assert_eq!(
            next_id(usize::MAX, "users"),
            Err(StoreError::IdsExhausted("users"))
        );
    }

    #[test]
    fn test_concurrent_creates_get_distinct_ids() {
        let store = std::sync::Arc::new(Store::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || store.create_note(i, "x").unwrap())
            })
            .collect();

        let mut ids: Vec<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=8).collect::<Vec<u32>>());
    }
}
