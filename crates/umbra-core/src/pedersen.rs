//! Pedersen commitment arithmetic over secp256k1.
//!
//! A commitment is `C = v*G + r*H`, where `G` is the standard secp256k1
//! generator, `H` is an auxiliary generator derived at startup, `v` is
//! the hidden amount, and `r` is a uniformly random non-zero blinding
//! scalar. Commitments are homomorphic: a transfer conserves value
//! exactly when the sum of its input points equals the sum of its
//! output points.

use k256::elliptic_curve::ops::{MulByGenerator, Reduce};
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::elliptic_curve::{Field, PrimeField};
use k256::{AffinePoint, EncodedPoint, NonZeroScalar, ProjectivePoint, Scalar, U256};
use log::info;
use rand_core::OsRng;
use sha2::{Digest, Sha256};

use crate::constants::COMMITMENT_LEN;
use crate::note::Note;
use crate::types::{AccountId, Blinding, Commitment, CoreError, TokenId};

/// Verifies that input and output commitments conserve the hidden total.
///
/// The transfer handler is generic over this seam so tests can
/// substitute a deterministic verdict.
pub trait ConservationCheck {
    /// Returns whether the two sides sum to the same curve point.
    fn sums_match(
        &self,
        inputs: &[Commitment],
        outputs: &[Commitment],
    ) -> Result<bool, CoreError>;
}

/// Curve context holding the derived auxiliary generator `H`.
///
/// `H = s*G` with `s = SHA-256(G_compressed) mod n` (and `s = 1` if the
/// reduction yields zero). The discrete log of `H` is therefore public,
/// which breaks the binding property of the scheme; this is acceptable
/// for the in-memory prototype only. A production deployment must derive
/// `H` with a nothing-up-my-sleeve hash-to-curve.
#[derive(Clone, Debug)]
pub struct PedersenContext {
    h: ProjectivePoint,
}

impl PedersenContext {
    /// Creates a context, deriving `H` from the standard generator.
    pub fn new() -> Self {
        Self {
            h: derive_generator_h(),
        }
    }

    /// The auxiliary generator.
    pub fn generator_h(&self) -> &ProjectivePoint {
        &self.h
    }

    /// Commits to `value` under the given blinding scalar.
    ///
    /// Blinding bytes that are zero or not a canonical scalar below the
    /// group order are rejected.
    pub fn commit(&self, value: u64, blinding: &Blinding) -> Result<Commitment, CoreError> {
        let scalar = Option::<Scalar>::from(Scalar::from_repr((*blinding.as_bytes()).into()))
            .ok_or(CoreError::InvalidBlinding("not a canonical scalar"))?;
        if bool::from(scalar.is_zero()) {
            return Err(CoreError::InvalidBlinding("blinding must be non-zero"));
        }
        Ok(encode_point(&self.commit_point(value, &scalar)))
    }

    /// Mints a fresh treasury note for `value` units of `token_id`,
    /// owned by `owner`.
    ///
    /// The blinding scalar is drawn uniformly from `[1, n-1]` by
    /// rejection sampling; the returned note carries the full opening.
    pub fn mint_treasury_note(&self, token_id: TokenId, owner: AccountId, value: u64) -> Note {
        let scalar: Scalar = *NonZeroScalar::random(&mut OsRng).as_ref();
        let commitment = encode_point(&self.commit_point(value, &scalar));
        let blinding = Blinding(scalar.to_bytes().into());
        info!("minted treasury commitment {commitment} for token {token_id} owner {owner} value {value}");
        Note::known(token_id, owner, commitment, blinding, value)
    }

    /// Returns whether the input and output commitments sum to the same
    /// point.
    ///
    /// Every commitment on either side must decode to a curve point. An
    /// empty side sums to the identity, so two empty sides match.
    pub fn sums_match(
        &self,
        inputs: &[Commitment],
        outputs: &[Commitment],
    ) -> Result<bool, CoreError> {
        let left = sum_points(inputs)?;
        let right = sum_points(outputs)?;
        Ok(left == right)
    }

    fn commit_point(&self, value: u64, blinding: &Scalar) -> ProjectivePoint {
        ProjectivePoint::mul_by_generator(&Scalar::from(value)) + self.h * blinding
    }
}

impl Default for PedersenContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ConservationCheck for PedersenContext {
    fn sums_match(
        &self,
        inputs: &[Commitment],
        outputs: &[Commitment],
    ) -> Result<bool, CoreError> {
        PedersenContext::sums_match(self, inputs, outputs)
    }
}

/// Decodes commitment bytes into a curve point.
///
/// Fails for anything but the 33-byte compressed encoding of a point on
/// the curve.
pub fn decode_commitment(commitment: &Commitment) -> Result<AffinePoint, CoreError> {
    if commitment.len() != COMMITMENT_LEN {
        return Err(CoreError::InvalidCommitment(
            "expected 33-byte compressed point",
        ));
    }
    let encoded = EncodedPoint::from_bytes(commitment.as_bytes())
        .map_err(|_| CoreError::InvalidCommitment("malformed point encoding"))?;
    Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
        .ok_or(CoreError::InvalidCommitment("point is not on the curve"))
}

/// Encodes a curve point as compressed commitment bytes.
pub fn encode_point(point: &ProjectivePoint) -> Commitment {
    Commitment::from_slice(point.to_affine().to_encoded_point(true).as_bytes())
}

fn sum_points(commitments: &[Commitment]) -> Result<ProjectivePoint, CoreError> {
    let mut sum = ProjectivePoint::IDENTITY;
    for commitment in commitments {
        sum += ProjectivePoint::from(decode_commitment(commitment)?);
    }
    Ok(sum)
}

fn derive_generator_h() -> ProjectivePoint {
    let generator = ProjectivePoint::GENERATOR.to_affine().to_encoded_point(true);
    let digest = Sha256::digest(generator.as_bytes());
    let mut scalar = <Scalar as Reduce<U256>>::reduce(U256::from_be_slice(digest.as_slice()));
    if bool::from(scalar.is_zero()) {
        scalar = Scalar::ONE;
    }
    ProjectivePoint::mul_by_generator(&scalar)
}
