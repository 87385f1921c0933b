//! Private-transfer transaction handling.
//!
//! The handler exposes the three hooks the host framework drives:
//! stateless `pure_checks`, signature gathering in `pre_handle`, and the
//! validating `handle`. All validation happens before any registry
//! mutation; the consume-then-emit tail runs only once every check has
//! passed.

use log::{debug, info};

use umbra_core::{
    AccountId, Commitment, ConservationCheck, Note, Token, TokenType, TransactionBody,
};

use crate::error::HandleError;
use crate::registry::CommitmentRegistry;
use crate::stores::{TokenRelationStore, TokenStore, TransferRecordBuilder};

/// Context for [`PrivateTransferHandler::pre_handle`].
#[derive(Debug)]
pub struct PreHandleContext<'a> {
    /// The paying account.
    pub payer: AccountId,
    /// The transaction body under consideration.
    pub body: &'a TransactionBody,
}

/// Context for [`PrivateTransferHandler::handle`].
pub struct HandleContext<'a, T, R, B>
where
    T: TokenStore,
    R: TokenRelationStore,
    B: TransferRecordBuilder,
{
    /// The paying account, already authenticated by the host.
    pub payer: AccountId,
    /// The transaction body being handled.
    pub body: &'a TransactionBody,
    /// The host's token store.
    pub tokens: &'a T,
    /// The host's token-relation store.
    pub relations: &'a R,
    /// The note registry.
    pub registry: &'a CommitmentRegistry,
    /// The record-stream builder for this transaction.
    pub record: &'a mut B,
}

/// Handler for private fungible-token transfers.
#[derive(Debug)]
pub struct PrivateTransferHandler<C: ConservationCheck> {
    conservation: C,
}

impl<C: ConservationCheck> PrivateTransferHandler<C> {
    /// Creates a handler verifying conservation through `conservation`.
    pub fn new(conservation: C) -> Self {
        Self { conservation }
    }

    /// Stateless validation of the transaction body.
    pub fn pure_checks(&self, body: &TransactionBody) -> Result<(), HandleError> {
        let op = body
            .private_token_transfer
            .as_ref()
            .ok_or(HandleError::InvalidTransactionBody(
                "missing private token transfer payload",
            ))?;
        if op.inputs.is_empty() {
            return Err(HandleError::InvalidTransactionBody("transfer has no inputs"));
        }
        if op.outputs.is_empty() {
            return Err(HandleError::InvalidTransactionBody(
                "transfer has no outputs",
            ));
        }
        Ok(())
    }

    /// Collects required signatures.
    ///
    /// No keys beyond the payer are required yet.
    pub fn pre_handle(&self, _context: &PreHandleContext<'_>) -> Result<(), HandleError> {
        Ok(())
    }

    /// Validates and applies a private transfer.
    ///
    /// On success the input notes have been consumed, the output notes
    /// stored, and the record tagged with
    /// [`TokenType::FungiblePrivate`]. On any error the registry is
    /// untouched; the host is expected to serialize `handle` calls so
    /// that the read phase and the consume phase see the same registry
    /// state.
    pub fn handle<T, R, B>(
        &self,
        context: &mut HandleContext<'_, T, R, B>,
    ) -> Result<(), HandleError>
    where
        T: TokenStore,
        R: TokenRelationStore,
        B: TransferRecordBuilder,
    {
        let op = context
            .body
            .private_token_transfer
            .as_ref()
            .ok_or(HandleError::InvalidTransactionBody(
                "missing private token transfer payload",
            ))?;
        let token_id = op.token;

        let token = context
            .tokens
            .get_if_usable(&token_id)
            .ok_or(HandleError::InvalidTokenId)?;
        if token.token_type != TokenType::FungiblePrivate {
            return Err(HandleError::NotSupported);
        }

        if op.inputs.is_empty() {
            return Err(HandleError::InvalidTransactionBody("transfer has no inputs"));
        }
        if op.outputs.is_empty() {
            return Err(HandleError::InvalidTransactionBody(
                "transfer has no outputs",
            ));
        }

        let payer = context.payer;
        let mut input_notes = Vec::with_capacity(op.inputs.len());
        for commitment in &op.inputs {
            if commitment.is_empty() {
                return Err(HandleError::InvalidTransactionBody(
                    "empty input commitment",
                ));
            }
            let note = context.registry.get(&token_id, commitment).ok_or(
                HandleError::InvalidTransactionBody("unknown input commitment"),
            )?;
            if note.owner() != payer {
                return Err(HandleError::Unauthorized);
            }
            ensure_association(&token, &note.owner(), context.relations)?;
            input_notes.push(note);
        }

        let mut emitted = Vec::with_capacity(op.outputs.len());
        for output in &op.outputs {
            let owner = output
                .owner
                .ok_or(HandleError::InvalidTransactionBody("output missing owner"))?;
            if output.commitment.is_empty() {
                return Err(HandleError::InvalidTransactionBody(
                    "empty output commitment",
                ));
            }
            ensure_association(&token, &owner, context.relations)?;
            emitted.push(Note::external(token_id, owner, output.commitment.clone()));
        }

        let input_commitments: Vec<Commitment> = input_notes
            .iter()
            .map(|note| note.commitment().clone())
            .collect();
        let output_commitments: Vec<Commitment> = op
            .outputs
            .iter()
            .map(|output| output.commitment.clone())
            .collect();
        let balanced = self
            .conservation
            .sums_match(&input_commitments, &output_commitments)
            .map_err(|_| HandleError::InvalidTransactionBody("undecodable commitment"))?;
        if !balanced {
            return Err(HandleError::InvalidTransactionBody(
                "commitment sums do not balance",
            ));
        }

        // All verification completed, consume the inputs. A failed
        // remove means another actor consumed the note since the read
        // phase above.
        for note in &input_notes {
            if context.registry.remove(&token_id, note.commitment()).is_none() {
                return Err(HandleError::InvalidTransactionBody(
                    "input commitment already consumed",
                ));
            }
        }

        for note in emitted {
            context.registry.put(note);
        }

        if !op.zk_proof.is_empty() {
            debug!(
                "received zk proof blob ({} bytes) for token {token_id}",
                op.zk_proof.len()
            );
        }
        info!(
            "processed private token transfer for token {token_id} with {} inputs and {} outputs",
            input_notes.len(),
            op.outputs.len()
        );

        context.record.token_type(TokenType::FungiblePrivate);
        Ok(())
    }
}

fn ensure_association<R: TokenRelationStore>(
    token: &Token,
    owner: &AccountId,
    relations: &R,
) -> Result<(), HandleError> {
    let relation = relations
        .get_if_usable(owner, &token.token_id)
        .ok_or(HandleError::TokenNotAssociatedToAccount)?;
    if token.has_kyc_key() && !relation.kyc_granted {
        return Err(HandleError::AccountKycNotGrantedForToken);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_core::{CoreError, OutputCommitment, PrivateTokenTransferBody, TokenId};

    struct FixedVerdict(bool);

    impl ConservationCheck for FixedVerdict {
        fn sums_match(
            &self,
            _inputs: &[Commitment],
            _outputs: &[Commitment],
        ) -> Result<bool, CoreError> {
            Ok(self.0)
        }
    }

    fn body_with(inputs: Vec<Commitment>, outputs: Vec<OutputCommitment>) -> TransactionBody {
        TransactionBody {
            private_token_transfer: Some(PrivateTokenTransferBody {
                token: TokenId::from_num(9090),
                inputs,
                outputs,
                zk_proof: Vec::new(),
            }),
        }
    }

    fn output_to(owner: u64, commitment: &[u8]) -> OutputCommitment {
        OutputCommitment {
            owner: Some(AccountId::from_num(owner)),
            commitment: Commitment::from_slice(commitment),
        }
    }

    #[test]
    fn pure_checks_require_a_payload() {
        let handler = PrivateTransferHandler::new(FixedVerdict(true));
        let err = handler.pure_checks(&TransactionBody::default()).unwrap_err();
        assert!(matches!(err, HandleError::InvalidTransactionBody(_)));
    }

    #[test]
    fn pure_checks_require_inputs() {
        let handler = PrivateTransferHandler::new(FixedVerdict(true));
        let body = body_with(Vec::new(), vec![output_to(1002, &[0x02])]);
        let err = handler.pure_checks(&body).unwrap_err();
        assert!(matches!(err, HandleError::InvalidTransactionBody(_)));
    }

    #[test]
    fn pure_checks_require_outputs() {
        let handler = PrivateTransferHandler::new(FixedVerdict(true));
        let body = body_with(vec![Commitment::from_slice(&[0x01])], Vec::new());
        let err = handler.pure_checks(&body).unwrap_err();
        assert!(matches!(err, HandleError::InvalidTransactionBody(_)));
    }

    #[test]
    fn pure_checks_accept_a_populated_transfer() {
        let handler = PrivateTransferHandler::new(FixedVerdict(true));
        let body = body_with(
            vec![Commitment::from_slice(&[0x01])],
            vec![output_to(1002, &[0x02])],
        );
        assert!(handler.pure_checks(&body).is_ok());
    }

    #[test]
    fn pre_handle_needs_nothing_beyond_the_payer() {
        let handler = PrivateTransferHandler::new(FixedVerdict(true));
        let body = body_with(
            vec![Commitment::from_slice(&[0x01])],
            vec![output_to(1002, &[0x02])],
        );
        let context = PreHandleContext {
            payer: AccountId::from_num(1001),
            body: &body,
        };
        assert!(handler.pre_handle(&context).is_ok());
    }
}
