//! Shared key generation for storage backends.
//!
//! Committed documents live under `tenders/`, uploads awaiting their record commit under
//! `.staging/`. Both use the same stored name so promotion is a plain rename.

use chrono::{DateTime, Utc};
use tenderbox_core::validation::file_extension;
use uuid::Uuid;

pub const TENDERS_PREFIX: &str = "tenders";
pub const STAGING_PREFIX: &str = ".staging";

/// Form field name, reused as the stored file name prefix
const NAME_PREFIX: &str = "tenderDocument";

/// `tenderDocument-{unix_millis}-{8 hex}.{ext}`; the extension is taken from the original name,
/// lowercased, and omitted when there is none.
pub fn generate_file_name(original_filename: &str, now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    let stem = format!("{}-{}-{}", NAME_PREFIX, now.timestamp_millis(), &suffix[..8]);
    match file_extension(original_filename) {
        Some(ext) if ext.chars().all(|c| c.is_ascii_alphanumeric()) => format!("{}.{}", stem, ext),
        _ => stem,
    }
}

pub fn final_key(stored_name: &str) -> String {
    format!("{}/{}", TENDERS_PREFIX, stored_name)
}

pub fn staging_key(stored_name: &str) -> String {
    format!("{}/{}", STAGING_PREFIX, stored_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generate_file_name_layout() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let name = generate_file_name("Lift AMC.PDF", now);

        assert!(name.starts_with("tenderDocument-1700000000123-"));
        assert!(name.ends_with(".pdf"));
        let hex = name
            .trim_start_matches("tenderDocument-1700000000123-")
            .trim_end_matches(".pdf");
        assert_eq!(hex.len(), 8);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_file_name_is_unique_within_a_millisecond() {
        let now = Utc::now();
        assert_ne!(
            generate_file_name("a.pdf", now),
            generate_file_name("a.pdf", now)
        );
    }

    #[test]
    fn test_generate_file_name_drops_unsafe_extension() {
        let name = generate_file_name("report.p/df", Utc::now());
        assert!(!name.contains('/'));
        assert!(!name.contains('.'));
    }

    #[test]
    fn test_keys_share_stored_name() {
        assert_eq!(final_key("x.pdf"), "tenders/x.pdf");
        assert_eq!(staging_key("x.pdf"), ".staging/x.pdf");
    }
}
