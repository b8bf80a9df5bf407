use crate::claim::{Claim, ClaimId, ClaimStatus, ClaimUpdate, NewClaim};

use super::DatabaseError;

/// Claim record storage used by the classification pipeline.
///
/// `update` must be an idempotent overwrite: applying the same update
/// twice leaves the claim exactly as applying it once.
pub trait ClaimStore: Send + Sync {
    /// Persists a new claim in `Pending` state.
    fn create_pending_claim(&self, claim: &NewClaim) -> Result<Claim, DatabaseError>;

    fn find_by_id(&self, id: ClaimId) -> Result<Option<Claim>, DatabaseError>;

    fn find_all_by_status(&self, status: ClaimStatus) -> Result<Vec<Claim>, DatabaseError>;

    fn find_all(&self) -> Result<Vec<Claim>, DatabaseError>;

    /// Fails with [`DatabaseError::NotFound`] when no claim has this id.
    fn update(&self, id: ClaimId, update: &ClaimUpdate) -> Result<(), DatabaseError>;
}
