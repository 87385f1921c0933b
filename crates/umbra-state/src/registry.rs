//! Registry of outstanding confidential notes.
//!
//! An in-memory map `(token, commitment) -> note`. Lookup and
//! consumption of notes during a transfer go through here.
//!
//! Requirements:
//! - at most one note per `(token, commitment)` key
//! - individual operations are linearizable under concurrent callers
//! - composite check-then-consume sequences are NOT atomic at this
//!   layer; the transfer handler validates first and mutates after,
//!   under host-serialized dispatch

use std::sync::{PoisonError, RwLock};

use hashbrown::HashMap;
use log::debug;

use umbra_core::{Commitment, Note, TokenId};

/// In-memory registry of outstanding notes.
#[derive(Debug, Default)]
pub struct CommitmentRegistry {
    store: RwLock<HashMap<TokenId, HashMap<Commitment, Note>>>,
}

impl CommitmentRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a note, overwriting any note stored under the same
    /// `(token, commitment)` key.
    pub fn put(&self, note: Note) {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        debug!(
            "stored commitment {} for token {} owner {}",
            note.commitment(),
            note.token_id(),
            note.owner()
        );
        store
            .entry(note.token_id())
            .or_default()
            .insert(note.commitment().clone(), note);
    }

    /// Returns the note stored under `(token_id, commitment)`, if any.
    pub fn get(&self, token_id: &TokenId, commitment: &Commitment) -> Option<Note> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store.get(token_id)?.get(commitment).cloned()
    }

    /// Removes and returns the note stored under `(token_id,
    /// commitment)`, if any. The token's inner map is dropped once it
    /// empties.
    pub fn remove(&self, token_id: &TokenId, commitment: &Commitment) -> Option<Note> {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        let notes = store.get_mut(token_id)?;
        let removed = notes.remove(commitment);
        if notes.is_empty() {
            store.remove(token_id);
        }
        if removed.is_some() {
            debug!("removed commitment {commitment} for token {token_id}");
        }
        removed
    }

    /// Removes all notes. Intended for test isolation.
    pub fn clear(&self) {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        store.clear();
    }

    /// Number of outstanding notes across all tokens.
    pub fn len(&self) -> usize {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store.values().map(HashMap::len).sum()
    }

    /// Whether no notes are outstanding.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use umbra_core::AccountId;

    fn note(token: u64, owner: u64, commitment: &[u8]) -> Note {
        Note::external(
            TokenId::from_num(token),
            AccountId::from_num(owner),
            Commitment::from_slice(commitment),
        )
    }

    #[test]
    fn put_then_get_returns_the_note() {
        let registry = CommitmentRegistry::new();
        let stored = note(9090, 1001, &[0x01]);
        registry.put(stored.clone());

        let found = registry
            .get(&TokenId::from_num(9090), &Commitment::from_slice(&[0x01]))
            .unwrap();
        assert_eq!(found, stored);
    }

    #[test]
    fn put_overwrites_same_key() {
        let registry = CommitmentRegistry::new();
        registry.put(note(9090, 1001, &[0x01]));
        registry.put(note(9090, 2002, &[0x01]));

        let found = registry
            .get(&TokenId::from_num(9090), &Commitment::from_slice(&[0x01]))
            .unwrap();
        assert_eq!(found.owner(), AccountId::from_num(2002));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_consumes_the_entry() {
        let registry = CommitmentRegistry::new();
        registry.put(note(9090, 1001, &[0x01]));

        let token = TokenId::from_num(9090);
        let commitment = Commitment::from_slice(&[0x01]);
        assert!(registry.remove(&token, &commitment).is_some());
        assert!(registry.remove(&token, &commitment).is_none());
        assert!(registry.get(&token, &commitment).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn tokens_are_kept_apart() {
        let registry = CommitmentRegistry::new();
        registry.put(note(1, 1001, &[0x01]));
        registry.put(note(2, 1001, &[0x01]));

        let commitment = Commitment::from_slice(&[0x01]);
        assert!(registry.remove(&TokenId::from_num(1), &commitment).is_some());
        assert!(registry.get(&TokenId::from_num(2), &commitment).is_some());
    }

    #[test]
    fn clear_empties_everything() {
        let registry = CommitmentRegistry::new();
        registry.put(note(1, 1001, &[0x01]));
        registry.put(note(2, 1001, &[0x02]));
        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn concurrent_removers_consume_each_note_once() {
        let registry = Arc::new(CommitmentRegistry::new());
        for i in 0..64u8 {
            registry.put(note(9090, 1001, &[i]));
        }

        let mut handles = Vec::new();
        for _ in 0..4 {
            let registry = Arc::clone(&registry);
            handles.push(std::thread::spawn(move || {
                let token = TokenId::from_num(9090);
                let mut removed = 0usize;
                for i in 0..64u8 {
                    if registry.remove(&token, &Commitment::from_slice(&[i])).is_some() {
                        removed += 1;
                    }
                }
                removed
            }));
        }

        let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 64);
        assert!(registry.is_empty());
    }
}
