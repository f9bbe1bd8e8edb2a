//! Pure derivations over an ordered record set.
//!
//! Nothing here is cached: views call these against the current store
//! contents every time they render.

use std::collections::BTreeSet;

use serde::Serialize;

use synctime_core::types::filter::{StatusFilter, TypeFilter};
use synctime_core::types::id::NotificationId;
use synctime_entity::NotificationRecord;

/// Inbox counters for one type facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Counts {
    /// Records matching the type facet.
    pub total: usize,
    /// Matching records not yet read.
    pub unread: usize,
    /// Matching records already read.
    pub read: usize,
}

/// Count records passing `type_filter`.
pub fn counts<'a, I>(records: I, type_filter: &TypeFilter) -> Counts
where
    I: IntoIterator<Item = &'a NotificationRecord>,
{
    records
        .into_iter()
        .filter(|r| type_filter.matches(&r.entity))
        .fold(Counts::default(), |mut acc, r| {
            acc.total += 1;
            if r.read {
                acc.read += 1;
            } else {
                acc.unread += 1;
            }
            acc
        })
}

/// Records passing both facets, in input order.
pub fn filtered<'a, I>(
    records: I,
    status: StatusFilter,
    type_filter: &TypeFilter,
) -> Vec<NotificationRecord>
where
    I: IntoIterator<Item = &'a NotificationRecord>,
{
    records
        .into_iter()
        .filter(|r| status.matches(r.read) && type_filter.matches(&r.entity))
        .cloned()
        .collect()
}

/// Ids a "clear read" action removes: read records under the type facet.
///
/// The status facet is deliberately not an input.
pub fn clearable_ids<'a, I>(records: I, type_filter: &TypeFilter) -> Vec<NotificationId>
where
    I: IntoIterator<Item = &'a NotificationRecord>,
{
    records
        .into_iter()
        .filter(|r| r.read && type_filter.matches(&r.entity))
        .map(|r| r.id.clone())
        .collect()
}

/// Type-filter options: `All`, then every distinct non-blank entity sorted.
pub fn type_facets<'a, I>(records: I) -> Vec<TypeFilter>
where
    I: IntoIterator<Item = &'a NotificationRecord>,
{
    let distinct: BTreeSet<&str> = records
        .into_iter()
        .map(|r| r.entity.as_str())
        .filter(|e| !e.trim().is_empty())
        .collect();

    std::iter::once(TypeFilter::All)
        .chain(distinct.into_iter().map(TypeFilter::entity))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn record(id: u64, read: bool, entity: &str) -> NotificationRecord {
        NotificationRecord {
            id: NotificationId::from(id),
            text: format!("n{id}"),
            created_at: Utc::now(),
            read,
            entity: entity.to_string(),
            id_entity: None,
            link: None,
            type_of_action: None,
        }
    }

    fn ids(records: &[NotificationRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_scenario_counts_and_unread_order() {
        let records = vec![
            record(1, false, "Nota"),
            record(2, true, "Nota"),
            record(3, false, "Conta"),
        ];

        assert_eq!(
            counts(&records, &TypeFilter::All),
            Counts {
                total: 3,
                unread: 2,
                read: 1
            }
        );
        let unread = filtered(&records, StatusFilter::Unread, &TypeFilter::All);
        assert_eq!(ids(&unread), vec!["1", "3"]);
    }

    #[test]
    fn test_total_is_unread_plus_read_for_every_facet() {
        let records = vec![
            record(1, false, "Nota"),
            record(2, true, "Nota"),
            record(3, false, "Conta"),
            record(4, true, "Report"),
            record(5, true, ""),
        ];

        for facet in type_facets(&records) {
            let c = counts(&records, &facet);
            assert_eq!(c.total, c.unread + c.read, "facet {facet}");
        }
    }

    #[test]
    fn test_unread_and_read_partition_all() {
        let records = vec![
            record(1, false, "Nota"),
            record(2, true, "Conta"),
            record(3, true, "Nota"),
            record(4, false, "Conta"),
        ];

        for facet in type_facets(&records) {
            let all: BTreeSet<String> = filtered(&records, StatusFilter::All, &facet)
                .into_iter()
                .map(|r| r.id.0)
                .collect();
            let mut union: BTreeSet<String> = filtered(&records, StatusFilter::Unread, &facet)
                .into_iter()
                .map(|r| r.id.0)
                .collect();
            union.extend(
                filtered(&records, StatusFilter::Read, &facet)
                    .into_iter()
                    .map(|r| r.id.0),
            );
            assert_eq!(union, all, "facet {facet}");
        }
    }

    #[test]
    fn test_clearable_respects_type_but_not_status() {
        let records = vec![record(1, true, "Conta"), record(2, true, "Nota")];
        let cleared = clearable_ids(&records, &TypeFilter::entity("Conta"));
        assert_eq!(cleared, vec![NotificationId::from(1u64)]);
    }

    #[test]
    fn test_facets_sorted_with_all_first() {
        let records = vec![
            record(1, false, "Report"),
            record(2, false, "Conta"),
            record(3, false, "Nota"),
            record(4, false, "Conta"),
            record(5, false, " "),
        ];

        assert_eq!(
            type_facets(&records),
            vec![
                TypeFilter::All,
                TypeFilter::entity("Conta"),
                TypeFilter::entity("Nota"),
                TypeFilter::entity("Report"),
            ]
        );
        assert_eq!(
            type_facets(&Vec::<NotificationRecord>::new()),
            vec![TypeFilter::All]
        );
    }
}
