//! Audit columns shared by catalog records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit values carried by a record about to be written
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFields {
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AuditFields {
    /// Fields stamped for a new record
    pub fn created(acting_user_id: i64, now: DateTime<Utc>) -> Self {
        let mut audit = Self::default();
        stamp_audit(&mut audit, acting_user_id, true, now);
        audit
    }

    /// Fields stamped for a change to an existing record
    pub fn updated(acting_user_id: i64, now: DateTime<Utc>) -> Self {
        let mut audit = Self::default();
        stamp_audit(&mut audit, acting_user_id, false, now);
        audit
    }
}

/// Stamp the acting user onto a record.
///
/// Creation sets both authorship and modification columns; an update only
/// touches `updated_by` / `updated_at` and leaves whatever creation values
/// the record already carries.
pub fn stamp_audit(audit: &mut AuditFields, acting_user_id: i64, is_create: bool, now: DateTime<Utc>) {
    if is_create {
        audit.created_by = Some(acting_user_id);
        audit.created_at = Some(now);
    }
    audit.updated_by = Some(acting_user_id);
    audit.updated_at = Some(now);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_create_stamps_all_columns() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let audit = AuditFields::created(7, now);

        assert_eq!(audit.created_by, Some(7));
        assert_eq!(audit.updated_by, Some(7));
        assert_eq!(audit.created_at, Some(now));
        assert_eq!(audit.updated_at, Some(now));
    }

    #[test]
    fn test_update_keeps_creation_columns() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        let mut audit = AuditFields::created(1, created);
        stamp_audit(&mut audit, 2, false, later);

        assert_eq!(audit.created_by, Some(1));
        assert_eq!(audit.created_at, Some(created));
        assert_eq!(audit.updated_by, Some(2));
        assert_eq!(audit.updated_at, Some(later));
    }

    #[test]
    fn test_updated_leaves_creation_empty() {
        let now = Utc::now();
        let audit = AuditFields::updated(3, now);
        assert_eq!(audit.created_by, None);
        assert_eq!(audit.updated_by, Some(3));
    }
}
