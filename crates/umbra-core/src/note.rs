//! The note descriptor.
//!
//! A note associates a commitment with an owner. The registry stores
//! notes; the transfer handler consumes and emits them. Notes are never
//! mutated in place.

use borsh::{BorshDeserialize, BorshSerialize};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::{AccountId, Blinding, Commitment, TokenId};

/// What the local node knows about a note's hidden contents.
#[derive(Clone, PartialEq, Eq, Debug, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NoteOpening {
    /// Opening values held by the minter.
    Known {
        /// The blinding scalar used when committing.
        blinding: Blinding,
        /// The committed amount.
        value: u64,
    },
    /// Adopted from an incoming transaction; only the sender knows the
    /// opening.
    External,
}

/// An outstanding confidential note.
#[derive(Clone, PartialEq, Eq, Debug, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Note {
    token_id: TokenId,
    owner: AccountId,
    commitment: Commitment,
    opening: NoteOpening,
}

impl Note {
    /// Constructs a note whose opening values are held locally, as
    /// produced by treasury minting.
    pub fn known(
        token_id: TokenId,
        owner: AccountId,
        commitment: Commitment,
        blinding: Blinding,
        value: u64,
    ) -> Self {
        Self {
            token_id,
            owner,
            commitment,
            opening: NoteOpening::Known { blinding, value },
        }
    }

    /// Constructs a note adopted from a validated transfer output.
    pub fn external(token_id: TokenId, owner: AccountId, commitment: Commitment) -> Self {
        Self {
            token_id,
            owner,
            commitment,
            opening: NoteOpening::External,
        }
    }

    /// The token this note belongs to.
    pub fn token_id(&self) -> TokenId {
        self.token_id
    }

    /// The account that may consume this note.
    pub fn owner(&self) -> AccountId {
        self.owner
    }

    /// The commitment bytes identifying this note.
    pub fn commitment(&self) -> &Commitment {
        &self.commitment
    }

    /// What is known locally about the note's contents.
    pub fn opening(&self) -> &NoteOpening {
        &self.opening
    }

    /// Whether the committed amount is known locally.
    pub fn value_known(&self) -> bool {
        matches!(self.opening, NoteOpening::Known { .. })
    }

    /// The committed amount, when known.
    pub fn value(&self) -> Option<u64> {
        match &self.opening {
            NoteOpening::Known { value, .. } => Some(*value),
            NoteOpening::External => None,
        }
    }

    /// The blinding scalar, when known.
    pub fn blinding(&self) -> Option<&Blinding> {
        match &self.opening {
            NoteOpening::Known { blinding, .. } => Some(blinding),
            NoteOpening::External => None,
        }
    }
}
