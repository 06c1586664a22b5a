//! Company record types.
//!
//! A [`Company`] is the live, canonical snapshot of one registry entity.
//! There is at most one live record per registry id, and the current name
//! is unique across live records. [`CompanySnapshot`] is the immutable
//! pre-change copy written whenever a refresh detects changed content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fingerprint::{self, FingerprintError};

/// Business attributes of a company as reported by the registry.
///
/// Opaque to the reconcile engine except for fingerprinting: every field
/// here participates in the content fingerprint. Timestamps use
/// `Option<DateTime<Utc>>`; the registry encodes "absent" as a zero
/// millisecond epoch, which decodes to `None` at ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Registration status (e.g. in business, revoked).
    pub reg_status: String,
    /// Registration number.
    pub reg_number: String,
    /// Unified social credit code.
    pub credit_code: String,
    /// Taxpayer identification number.
    pub tax_number: String,
    /// Organization code.
    pub org_number: String,
    /// Legal representative name.
    pub legal_rep_name: String,
    /// Legal representative kind: 1 = person, 2 = company.
    pub legal_rep_kind: i64,
    /// Registered capital, as reported (free text with currency).
    pub reg_capital: String,
    /// Paid-in capital, as reported.
    pub paid_capital: String,
    /// Registered capital currency.
    pub reg_capital_currency: String,
    /// Paid-in capital currency.
    pub paid_capital_currency: String,
    /// Company organization type.
    pub org_type: String,
    /// Industry name.
    pub industry: String,
    /// National industry classification, level 1 (flattened from the
    /// registry's nested classification object).
    pub industry_l1: String,
    /// National industry classification, level 2.
    pub industry_l2: String,
    /// National industry classification, level 3.
    pub industry_l3: String,
    /// National industry classification, level 4.
    pub industry_l4: String,
    /// Staff-size range.
    pub staff_range: String,
    /// Number of employees covered by social insurance.
    pub insured_count: i64,
    /// Registry score, out of ten thousand.
    pub score: i64,
    /// Whether the registry classifies this as a micro enterprise.
    pub is_micro: bool,
    /// Date of incorporation.
    pub founded_at: Option<DateTime<Utc>>,
    /// Date of registration approval.
    pub approved_at: Option<DateTime<Utc>>,
    /// Start of the approved business term.
    pub term_start: Option<DateTime<Utc>>,
    /// End of the approved business term.
    pub term_end: Option<DateTime<Utc>>,
    /// Date the license was revoked, if any.
    pub revoked_at: Option<DateTime<Utc>>,
    /// Reason the license was revoked.
    pub revoke_reason: String,
    /// Date of deregistration, if any.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Reason for deregistration.
    pub cancel_reason: String,
    /// Approved business scope.
    pub business_scope: String,
    /// Registered address.
    pub reg_location: String,
    /// Province abbreviation.
    pub province: String,
    /// Registering authority.
    pub reg_institute: String,
    /// English name.
    pub name_en: String,
    /// Short name / alias.
    pub short_name: String,
    /// Former names, as reported by the registry.
    pub former_names: String,
    /// Registry tags.
    pub tags: String,
    /// Listed security name, if the company is listed.
    pub bond_name: String,
    /// Listed security number.
    pub bond_num: String,
    /// Listed security type.
    pub bond_type: String,
    /// Former listed security name.
    pub former_bond_name: String,
}

/// A parsed lookup result from the registry: identity, current name, and
/// business attributes, before any bookkeeping is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    /// Stable identifier assigned by the registry.
    pub registry_id: i64,
    /// Current display name.
    pub name: String,
    /// Business attributes.
    pub profile: CompanyProfile,
}

/// The live, canonical record for one registry entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Stable identifier assigned by the registry; primary key.
    pub registry_id: i64,
    /// Current display name; unique among live records.
    pub name: String,
    /// Business attributes.
    pub profile: CompanyProfile,
    /// Digest over `registry_id`, `name`, and `profile`; decides
    /// Archive-vs-TouchOnly on refresh. Bookkeeping fields are excluded.
    pub fingerprint: String,
    /// When the record last passed a freshness check against the registry.
    /// Refreshed on every successful check, not only on content change.
    pub checked_at: DateTime<Utc>,
}

impl Company {
    /// Builds a live record from a registry lookup result, stamping the
    /// check time and computing the content fingerprint.
    ///
    /// # Errors
    ///
    /// Returns an error if the fingerprint fields cannot be serialized.
    pub fn from_source(
        record: SourceRecord,
        checked_at: DateTime<Utc>,
    ) -> Result<Self, FingerprintError> {
        let fingerprint = fingerprint::compute(record.registry_id, &record.name, &record.profile)?;
        Ok(Self {
            registry_id: record.registry_id,
            name: record.name,
            profile: record.profile,
            fingerprint,
            checked_at,
        })
    }

    /// Copies this record into an immutable history snapshot.
    ///
    /// The mapping is explicit: everything except the fingerprint is
    /// carried over, and the snapshot gets its own id and archive time.
    #[must_use]
    pub fn to_snapshot(&self, archived_at: DateTime<Utc>) -> CompanySnapshot {
        CompanySnapshot {
            snapshot_id: uuid::Uuid::new_v4().to_string(),
            archived_at,
            registry_id: self.registry_id,
            name: self.name.clone(),
            profile: self.profile.clone(),
            checked_at: self.checked_at,
        }
    }
}

/// An immutable copy of a live record taken immediately before an
/// overwrite. Append-only; never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanySnapshot {
    /// Unique snapshot id (UUID v4).
    pub snapshot_id: String,
    /// When the snapshot was written.
    pub archived_at: DateTime<Utc>,
    /// Registry id of the archived record.
    pub registry_id: i64,
    /// Name the record held when archived.
    pub name: String,
    /// Business attributes as they were before the change.
    pub profile: CompanyProfile,
    /// The archived record's last check time.
    pub checked_at: DateTime<Utc>,
}

/// A name known to resolve to a registry id, current or historical.
///
/// A given pair is stored at most once; a name maps to one registry id at
/// a time, enforced by the reconcile workflow rather than the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsedName {
    /// The name, exactly as once carried by the company.
    pub name: String,
    /// The registry id it resolves to.
    pub registry_id: i64,
}
