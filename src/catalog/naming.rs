//! Sequence-to-primary-key naming conventions.
//!
//! Whether a sequence backs a table's primary key is not recorded as a
//! relational fact in every schema; it has to be recovered from naming
//! conventions. The [`SequenceNaming`] trait keeps that heuristic pluggable
//! so alternate conventions can supply their own matching rule without
//! touching the election algorithm.

use once_cell::sync::Lazy;
use regex::Regex;

/// Decides whether a sequence backs a primary-key constraint, by name.
pub trait SequenceNaming: Send + Sync {
    /// Whether `sequence_name` is the sequence generating values for the
    /// primary key behind `constraint_name`.
    fn binds(&self, constraint_name: &str, sequence_name: &str) -> bool;
}

static PK_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(_id)?_pk(ey)?").unwrap());
static SEQ_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(_id)?_seq").unwrap());

/// The conventional PostgreSQL naming rule.
///
/// Both names are normalized by stripping their conventional suffixes
/// (`_id`, `_pk`/`_pkey` from the constraint, `_id`, `_seq` from the
/// sequence) and removing underscores, then compared for equality. Under
/// this rule `rhn_channel_id_pk` and `rhn_channel_id_seq` both normalize
/// to `rhnchannel` and match.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConventionalNaming;

impl ConventionalNaming {
    fn normalize_constraint(name: &str) -> String {
        PK_SUFFIX.replace_all(name, "").replace('_', "")
    }

    fn normalize_sequence(name: &str) -> String {
        SEQ_SUFFIX.replace_all(name, "").replace('_', "")
    }
}

impl SequenceNaming for ConventionalNaming {
    fn binds(&self, constraint_name: &str, sequence_name: &str) -> bool {
        Self::normalize_constraint(constraint_name) == Self::normalize_sequence(sequence_name)
    }
}
