//! Batch admission: duplicate filtering plus count and total-size ceilings.

use crate::common::{ValidationError, ValidationWarning};
use crate::intake::CandidateFile;
use serde::Serialize;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Ceilings applied to the projected accepted set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Limits {
    pub max_files: usize,
    pub max_total_size_mb: u64,
}

/// Files to append and the warning to show, if any.
#[derive(Debug)]
pub struct Admission {
    pub admitted: Vec<CandidateFile>,
    pub warning: Option<ValidationWarning>,
}

/// Validates one intake batch against what is already accepted.
///
/// Duplicates are matched only against `accepted`, never within `candidates`.
/// The count ceiling is checked before the size ceiling; either rejection
/// admits nothing from the batch.
pub fn validate<'a>(
    candidates: Vec<CandidateFile>,
    accepted: impl IntoIterator<Item = &'a CandidateFile> + Clone,
    limits: &Limits,
) -> Result<Admission, ValidationError> {
    let incoming = candidates.len();
    let admitted: Vec<CandidateFile> = candidates
        .into_iter()
        .filter(|candidate| {
            !accepted
                .clone()
                .into_iter()
                .any(|existing| existing.same_identity(candidate))
        })
        .collect();

    let warning = (admitted.len() < incoming).then_some(ValidationWarning::DuplicatesSkipped);
    if warning.is_some() {
        tracing::debug!(skipped = incoming - admitted.len(), "Duplicate files skipped");
    }

    let (accepted_count, accepted_bytes) = accepted
        .into_iter()
        .fold((0usize, 0u64), |(count, bytes), f| (count + 1, bytes + f.size()));

    let projected_count = accepted_count + admitted.len();
    if projected_count > limits.max_files {
        return Err(ValidationError::TooManyFiles {
            limit: limits.max_files,
        });
    }

    let projected_bytes = accepted_bytes + admitted.iter().map(CandidateFile::size).sum::<u64>();
    if projected_bytes > limits.max_total_size_mb.saturating_mul(BYTES_PER_MB) {
        return Err(ValidationError::TooLarge {
            limit_mb: limits.max_total_size_mb,
        });
    }

    Ok(Admission { admitted, warning })
}
