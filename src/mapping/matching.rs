//! Equivalence between a desired mapping and a stored record.

use super::types::{DesiredMapping, IdentityMappingRecord};

/// Group lists are equivalent when they have the same length and every
/// desired group appears in the existing list. Order is irrelevant.
pub fn groups_equivalent(desired: &[String], existing: &[String]) -> bool {
    desired.len() == existing.len() && desired.iter().all(|group| existing.contains(group))
}

/// Whether `record` already grants exactly what `desired` asks for.
pub fn record_matches<M: DesiredMapping>(desired: &M, record: &IdentityMappingRecord) -> bool {
    desired.principal_arn() == record.spec.arn
        && desired.username() == record.spec.username
        && groups_equivalent(desired.groups(), &record.spec.groups)
}
