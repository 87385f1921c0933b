//! Seams to the host framework's stores and record stream.
//!
//! The token and token-relation stores are owned by the surrounding
//! framework; the handler only reads them through these traits. The
//! in-memory implementations back the integration tests and match the
//! prototype's in-memory posture.

use hashbrown::HashMap;

use umbra_core::{AccountId, Token, TokenId, TokenRelation, TokenType};

/// Read access to token records.
pub trait TokenStore {
    /// Returns the token when it exists and is usable.
    fn get_if_usable(&self, token_id: &TokenId) -> Option<Token>;
}

/// Read access to account-token associations.
pub trait TokenRelationStore {
    /// Returns the relation when the account is associated with the
    /// token and the association is usable.
    fn get_if_usable(&self, account_id: &AccountId, token_id: &TokenId) -> Option<TokenRelation>;
}

/// The host's record-stream builder for the transaction being handled.
pub trait TransferRecordBuilder {
    /// Tags the emitted record with the token type involved.
    fn token_type(&mut self, token_type: TokenType);
}

/// In-memory token store.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    tokens: HashMap<TokenId, Token>,
}

impl InMemoryTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            tokens: HashMap::new(),
        }
    }

    /// Inserts or replaces a token record.
    pub fn put(&mut self, token: Token) {
        self.tokens.insert(token.token_id, token);
    }
}

impl TokenStore for InMemoryTokenStore {
    fn get_if_usable(&self, token_id: &TokenId) -> Option<Token> {
        self.tokens.get(token_id).cloned()
    }
}

/// In-memory token-relation store.
#[derive(Debug, Default)]
pub struct InMemoryRelationStore {
    relations: HashMap<(AccountId, TokenId), TokenRelation>,
}

impl InMemoryRelationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            relations: HashMap::new(),
        }
    }

    /// Inserts or replaces a relation record.
    pub fn put(&mut self, relation: TokenRelation) {
        self.relations
            .insert((relation.account_id, relation.token_id), relation);
    }
}

impl TokenRelationStore for InMemoryRelationStore {
    fn get_if_usable(&self, account_id: &AccountId, token_id: &TokenId) -> Option<TokenRelation> {
        self.relations.get(&(*account_id, *token_id)).copied()
    }
}
