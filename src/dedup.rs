//! Cross-source deduplication.
//!
//! Two listings are the same auction when they share an address and a sale
//! date. Records arrive in source concatenation order, so the first
//! occurrence (and therefore the earlier source) wins.

use crate::records::CanonicalRecord;
use std::collections::HashSet;
use tracing::info;

/// Drop all-blank records, then every repeat of an (address, date) pair.
///
/// Order-preserving and idempotent.
pub fn dedupe(records: Vec<CanonicalRecord>) -> Vec<CanonicalRecord> {
    let total = records.len();
    let mut blank = 0usize;
    let mut seen: HashSet<(String, String)> = HashSet::with_capacity(total);

    let kept: Vec<CanonicalRecord> = records
        .into_iter()
        .filter(|r| {
            if r.is_blank() {
                blank += 1;
                return false;
            }
            seen.insert((r.address.clone(), r.date.clone()))
        })
        .collect();

    let duplicates = total - blank - kept.len();
    if blank > 0 || duplicates > 0 {
        info!(total, blank, duplicates, kept = kept.len(), "deduplicated records");
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(source: &str, address: &str, date: &str) -> CanonicalRecord {
        CanonicalRecord {
            source: source.into(),
            address: address.into(),
            date: date.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_occurrence_wins() {
        let out = dedupe(vec![
            rec("clearrecon", "456 Oak Ave", "07/04/2025"),
            rec("wilson", "456 Oak Ave", "07/04/2025"),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source, "clearrecon");
    }

    #[test]
    fn test_same_address_different_date_kept() {
        let out = dedupe(vec![
            rec("a", "456 Oak Ave", "07/04/2025"),
            rec("b", "456 Oak Ave", "08/04/2025"),
        ]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_blank_rows_dropped() {
        let out = dedupe(vec![CanonicalRecord::default(), rec("a", "1 A St", "")]);
        assert_eq!(out, vec![rec("a", "1 A St", "")]);
    }

    #[test]
    fn test_order_preserved_and_idempotent() {
        let input = vec![
            rec("a", "3 C St", "07/01/2025"),
            rec("b", "1 A St", "07/02/2025"),
            rec("c", "3 C St", "07/01/2025"),
            rec("d", "2 B St", "07/03/2025"),
        ];
        let once = dedupe(input);
        let sources: Vec<_> = once.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(sources, ["a", "b", "d"]);

        let twice = dedupe(once.clone());
        assert_eq!(once, twice);
    }
}
