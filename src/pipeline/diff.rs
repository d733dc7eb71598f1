//! Snapshot diffing for seat availability.
//!
//! Compares the stored snapshot of an event against the freshly
//! scraped one and classifies every slot as added, missing, or
//! changed for notification dispatch.
//!
//! > The watcher compares the **previous** and **current** seat
//! > listings. If anything moved, a change summary is mailed out.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::TicketItem;

/// A seat-count change for one slot, carrying both observations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatChange {
    /// The slot as last stored
    pub previous: TicketItem,
    /// The slot as freshly scraped
    pub current: TicketItem,
}

/// Classified differences between two snapshots of one event.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeReport {
    /// Slots present only in the current snapshot
    pub add: Vec<TicketItem>,
    /// Slots present only in the previous snapshot
    pub miss: Vec<TicketItem>,
    /// Slots present in both with a different seats value
    pub diff: Vec<SeatChange>,
    /// Total entries across the three buckets
    pub sum: usize,
}

impl ChangeReport {
    /// Check if there is anything worth notifying about.
    pub fn has_changes(&self) -> bool {
        self.sum > 0
    }
}

/// Detector comparing previous and current snapshots of one event.
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    /// Minimum numeric seat delta for a changed slot to be reported
    free_seats_threshold: u32,
}

impl ChangeDetector {
    /// Create a detector that reports every change.
    pub fn new() -> Self {
        Self {
            free_seats_threshold: 0,
        }
    }

    /// Create a detector that drops seat changes smaller than the
    /// given delta. Added and missing slots are always reported.
    pub fn with_threshold(free_seats_threshold: u32) -> Self {
        Self {
            free_seats_threshold,
        }
    }

    /// Compare two snapshots and classify the differences.
    ///
    /// Slots are matched by their identity key (whitespace-stripped
    /// date plus time); duplicate keys within one snapshot collapse
    /// to the last occurrence. Bucket order follows the input order
    /// of the snapshot each bucket is drawn from, so the result is
    /// deterministic for a given pair of inputs.
    pub fn detect(&self, previous: &[TicketItem], current: &[TicketItem]) -> ChangeReport {
        let prev_map: HashMap<String, &TicketItem> =
            previous.iter().map(|item| (item.slot_key(), item)).collect();

        let curr_map: HashMap<String, &TicketItem> =
            current.iter().map(|item| (item.slot_key(), item)).collect();

        // Missing: in previous but not in current, previous order.
        let miss: Vec<TicketItem> = previous
            .iter()
            .filter(|item| !curr_map.contains_key(&item.slot_key()))
            .cloned()
            .collect();

        // Added and changed both walk the current snapshot, so both
        // keep current order. Seats are compared as opaque strings.
        let mut add = Vec::new();
        let mut diff = Vec::new();
        for item in current {
            match prev_map.get(&item.slot_key()) {
                None => add.push(item.clone()),
                Some(prev) if prev.seats != item.seats => {
                    if self.keeps(prev, item) {
                        diff.push(SeatChange {
                            previous: (*prev).clone(),
                            current: item.clone(),
                        });
                    }
                }
                Some(_) => {}
            }
        }

        let sum = add.len() + miss.len() + diff.len();

        ChangeReport {
            add,
            miss,
            diff,
            sum,
        }
    }

    /// Threshold filter for the changed bucket.
    ///
    /// A change passes when the seat counts on both sides parse and
    /// their delta reaches the threshold. Unparseable counts always
    /// pass so a formatting change on the site never hides a change.
    fn keeps(&self, previous: &TicketItem, current: &TicketItem) -> bool {
        if self.free_seats_threshold == 0 {
            return true;
        }
        match (previous.seat_count(), current.seat_count()) {
            (Some(before), Some(after)) => before.abs_diff(after) >= self.free_seats_threshold,
            _ => true,
        }
    }
}

/// Convenience function comparing two snapshots with no threshold.
pub fn detect_changes(previous: &[TicketItem], current: &[TicketItem]) -> ChangeReport {
    ChangeDetector::new().detect(previous, current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(date: &str, time: &str, seats: &str) -> TicketItem {
        TicketItem {
            date: date.to_string(),
            time: time.to_string(),
            seats: seats.to_string(),
            link: String::new(),
        }
    }

    fn slot_with_link(date: &str, time: &str, seats: &str, link: &str) -> TicketItem {
        TicketItem {
            link: link.to_string(),
            ..slot(date, time, seats)
        }
    }

    #[test]
    fn test_equal_snapshots_report_nothing() {
        let prev = vec![
            slot("24/05/2023", "Godz. 13:00", "Liczba miejsc: 4"),
            slot("26/05/2023", "Godz. 11:00", "Liczba miejsc: 0"),
        ];
        let curr = prev.clone();

        let report = detect_changes(&prev, &curr);
        assert!(!report.has_changes());
        assert_eq!(report.sum, 0);
        assert!(report.add.is_empty());
        assert!(report.miss.is_empty());
        assert!(report.diff.is_empty());
    }

    #[test]
    fn test_sum_counts_all_buckets() {
        let prev = vec![
            slot("01/06/2023", "Godz. 18:00", "2"),
            slot("02/06/2023", "Godz. 18:00", "2"),
            slot("03/06/2023", "Godz. 18:00", "2"),
        ];
        let curr = vec![
            slot("01/06/2023", "Godz. 18:00", "5"),
            slot("03/06/2023", "Godz. 18:00", "2"),
            slot("04/06/2023", "Godz. 18:00", "1"),
        ];

        let report = detect_changes(&prev, &curr);
        assert_eq!(
            report.sum,
            report.add.len() + report.miss.len() + report.diff.len()
        );
        assert_eq!(report.sum, 3);
    }

    #[test]
    fn test_seats_change_carries_both_values() {
        let prev = vec![slot("28/05/2023", "Godz. 12:00", "0")];
        let curr = vec![slot("28/05/2023", "Godz. 12:00", "1")];

        let report = detect_changes(&prev, &curr);
        assert!(report.add.is_empty());
        assert!(report.miss.is_empty());
        assert_eq!(report.diff.len(), 1);
        assert_eq!(report.diff[0].previous.seats, "0");
        assert_eq!(report.diff[0].current.seats, "1");
    }

    #[test]
    fn test_new_slot_is_added_only() {
        let prev = vec![slot("26/05/2023", "Godz. 11:00", "0")];
        let curr = vec![
            slot("26/05/2023", "Godz. 11:00", "0"),
            slot("27/05/2023", "Godz. 19:30", "12"),
        ];

        let report = detect_changes(&prev, &curr);
        assert_eq!(report.add.len(), 1);
        assert_eq!(report.add[0].date, "27/05/2023");
        assert!(report.miss.is_empty());
        assert!(report.diff.is_empty());
    }

    #[test]
    fn test_dropped_slot_is_missing_only() {
        let prev = vec![
            slot("26/05/2023", "Godz. 11:00", "0"),
            slot("27/05/2023", "Godz. 19:30", "12"),
        ];
        let curr = vec![slot("26/05/2023", "Godz. 11:00", "0")];

        let report = detect_changes(&prev, &curr);
        assert!(report.add.is_empty());
        assert_eq!(report.miss.len(), 1);
        assert_eq!(report.miss[0].date, "27/05/2023");
        assert!(report.diff.is_empty());
    }

    #[test]
    fn test_shifted_listing_with_seat_change() {
        let prev = vec![
            slot("24/05/2023", "Godz. 13:00", "Liczba miejsc: 0"),
            slot("26/05/2023", "Godz. 11:00", "Liczba miejsc: 0"),
            slot("28/05/2023", "Godz. 12:00", "Liczba miejsc: 0"),
        ];
        let curr = vec![
            slot("23/05/2023", "Godz. 13:00", "Liczba miejsc: 0"),
            slot("26/05/2023", "Godz. 11:00", "Liczba miejsc: 0"),
            slot_with_link(
                "28/05/2023",
                "Godz. 12:00",
                "Liczba miejsc: 1",
                "https://address.com",
            ),
        ];

        let report = detect_changes(&prev, &curr);
        assert_eq!(report.sum, 3);

        assert_eq!(report.miss.len(), 1);
        assert_eq!(report.miss[0].date, "24/05/2023");

        assert_eq!(report.add.len(), 1);
        assert_eq!(report.add[0].date, "23/05/2023");

        assert_eq!(report.diff.len(), 1);
        assert_eq!(report.diff[0].previous.seats, "Liczba miejsc: 0");
        assert_eq!(report.diff[0].current.seats, "Liczba miejsc: 1");
        assert_eq!(report.diff[0].current.link, "https://address.com");
    }

    #[test]
    fn test_empty_to_full() {
        let prev: Vec<TicketItem> = vec![];
        let curr = vec![
            slot("01/09/2023", "Godz. 17:00", "8"),
            slot("02/09/2023", "Godz. 17:00", "8"),
        ];

        let report = detect_changes(&prev, &curr);
        assert_eq!(report.add.len(), 2);
        assert!(report.miss.is_empty());
        assert!(report.diff.is_empty());
        assert_eq!(report.sum, 2);
    }

    #[test]
    fn test_full_to_empty() {
        let prev = vec![slot("01/09/2023", "Godz. 17:00", "8")];
        let curr: Vec<TicketItem> = vec![];

        let report = detect_changes(&prev, &curr);
        assert!(report.add.is_empty());
        assert_eq!(report.miss.len(), 1);
        assert_eq!(report.sum, 1);
    }

    #[test]
    fn test_bucket_order_follows_input_order() {
        let prev = vec![
            slot("10/05/2023", "Godz. 10:00", "1"),
            slot("11/05/2023", "Godz. 10:00", "1"),
        ];
        let curr = vec![
            slot("12/05/2023", "Godz. 10:00", "1"),
            slot("13/05/2023", "Godz. 10:00", "1"),
        ];

        let report = detect_changes(&prev, &curr);
        assert_eq!(report.miss[0].date, "10/05/2023");
        assert_eq!(report.miss[1].date, "11/05/2023");
        assert_eq!(report.add[0].date, "12/05/2023");
        assert_eq!(report.add[1].date, "13/05/2023");
    }

    #[test]
    fn test_duplicate_keys_collapse_to_last() {
        let prev = vec![
            slot("20/05/2023", "Godz. 20:00", "2"),
            slot("20/05/2023", "Godz. 20:00", "5"),
        ];

        // Current matches the later duplicate, so nothing changed.
        let same = vec![slot("20/05/2023", "Godz. 20:00", "5")];
        let report = detect_changes(&prev, &same);
        assert_eq!(report.sum, 0);

        // Current matches the earlier duplicate, so the change pairs
        // against the surviving later one.
        let other = vec![slot("20/05/2023", "Godz. 20:00", "2")];
        let report = detect_changes(&prev, &other);
        assert_eq!(report.diff.len(), 1);
        assert_eq!(report.diff[0].previous.seats, "5");
        assert_eq!(report.diff[0].current.seats, "2");
    }

    #[test]
    fn test_date_whitespace_ignored_for_identity() {
        let prev = vec![slot("24 / 05 / 2023", "Godz. 13:00", "0")];
        let curr = vec![slot("24/05/2023", "Godz. 13:00", "0")];

        let report = detect_changes(&prev, &curr);
        assert_eq!(report.sum, 0);
    }

    #[test]
    fn test_threshold_drops_small_delta() {
        let prev = vec![slot("24/05/2023", "Godz. 13:00", "Liczba miejsc: 3")];
        let curr = vec![slot("24/05/2023", "Godz. 13:00", "Liczba miejsc: 5")];

        let report = ChangeDetector::with_threshold(5).detect(&prev, &curr);
        assert_eq!(report.sum, 0);

        let report = ChangeDetector::with_threshold(2).detect(&prev, &curr);
        assert_eq!(report.diff.len(), 1);
    }

    #[test]
    fn test_threshold_keeps_unparseable_seats() {
        let prev = vec![slot("24/05/2023", "Godz. 13:00", "brak miejsc")];
        let curr = vec![slot("24/05/2023", "Godz. 13:00", "Liczba miejsc: 4")];

        let report = ChangeDetector::with_threshold(10).detect(&prev, &curr);
        assert_eq!(report.diff.len(), 1);
    }

    #[test]
    fn test_threshold_never_filters_add_or_miss() {
        let prev = vec![slot("24/05/2023", "Godz. 13:00", "1")];
        let curr = vec![slot("25/05/2023", "Godz. 13:00", "2")];

        let report = ChangeDetector::with_threshold(100).detect(&prev, &curr);
        assert_eq!(report.add.len(), 1);
        assert_eq!(report.miss.len(), 1);
        assert_eq!(report.sum, 2);
    }

    #[test]
    fn test_zero_threshold_matches_plain_detection() {
        let prev = vec![slot("24/05/2023", "Godz. 13:00", "3")];
        let curr = vec![slot("24/05/2023", "Godz. 13:00", "4")];

        let plain = detect_changes(&prev, &curr);
        let zero = ChangeDetector::with_threshold(0).detect(&prev, &curr);
        assert_eq!(plain, zero);
    }
}
