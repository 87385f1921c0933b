//! Transfer validation errors.

use thiserror::Error;

/// Typed rejection raised by the private-transfer handler.
///
/// Each variant corresponds to the response code the host reports for
/// the transaction. No registry mutation has occurred when one of these
/// is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandleError {
    /// The transaction body is structurally unusable: missing payload,
    /// empty inputs or outputs, empty commitment bytes, an unknown
    /// input note, unbalanced sums, or a missing output owner.
    #[error("invalid transaction body: {0}")]
    InvalidTransactionBody(&'static str),

    /// The referenced token does not exist or is not usable.
    #[error("token does not exist or is not usable")]
    InvalidTokenId,

    /// The token is not of the private fungible type.
    #[error("operation not supported for this token type")]
    NotSupported,

    /// The payer does not own an input note it tried to consume.
    #[error("payer is not authorized to consume an input note")]
    Unauthorized,

    /// A participating account has no association with the token.
    #[error("token is not associated to the account")]
    TokenNotAssociatedToAccount,

    /// The token requires KYC and the association has not been granted.
    #[error("kyc has not been granted for the token")]
    AccountKycNotGrantedForToken,
}
