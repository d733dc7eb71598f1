//! Message composition for notifications.
//!
//! Output depends only on the given reports, never on the clock or
//! the environment, so repeated runs over the same input produce
//! byte-identical text.

use crate::models::EventRecord;
use crate::pipeline::ChangeReport;

const SIGNATURE: &str = "Best regards,\nTicket Blaster Team";

/// Compose the notification body for a set of per-event change reports.
///
/// Events appear in the given order. Within an event the sections are
/// fixed: missing slots, added slots, then seat changes.
pub fn compose_change_message(reports: &[(String, ChangeReport)]) -> String {
    let blocks: Vec<String> = reports
        .iter()
        .map(|(event, report)| compose_event_block(event, report))
        .collect();

    format!("Detected changes:\n\n{}\n\n{SIGNATURE}", blocks.join("\n\n"))
}

fn compose_event_block(event: &str, report: &ChangeReport) -> String {
    let mut lines = vec![format!("{event}:")];

    for item in &report.miss {
        lines.push(format!("+ Missing seats for {} {}", item.date, item.time));
        lines.push(format!("Link: {}", item.link));
    }

    for item in &report.add {
        lines.push(format!("+ Additional seats for {} {}", item.date, item.time));
        lines.push(format!("Link: {}", item.link));
    }

    if !report.diff.is_empty() {
        lines.push("+ Seats changes:".to_string());
        for change in &report.diff {
            lines.push(format!("> {} {}", change.current.date, change.current.time));
            lines.push(format!("Previous - {}", change.previous.seats));
            lines.push(format!("Current - {}", change.current.seats));
            if !change.current.link.is_empty() {
                lines.push(format!("Link: {}", change.current.link));
            }
        }
    }

    lines.join("\n")
}

/// Compose the daily status digest listing all stored events and
/// which of them are activated for watching.
pub fn compose_daily_status(events: &[EventRecord]) -> String {
    let available: Vec<&str> = events.iter().map(|e| e.name.as_str()).collect();
    let activated: Vec<&str> = events
        .iter()
        .filter(|e| e.activated)
        .map(|e| e.name.as_str())
        .collect();

    format!(
        "The following events are available:\n{}\nThe following events are activated:\n{}\n{SIGNATURE}",
        available.join(",\n"),
        activated.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TicketItem;
    use crate::pipeline::detect_changes;
    use chrono::Utc;

    fn slot(date: &str, time: &str, seats: &str, link: &str) -> TicketItem {
        TicketItem {
            date: date.to_string(),
            time: time.to_string(),
            seats: seats.to_string(),
            link: link.to_string(),
        }
    }

    #[test]
    fn test_change_message_full_layout() {
        let prev = vec![
            slot("24/05/2023", "Godz. 13:00", "Liczba miejsc: 0", ""),
            slot("26/05/2023", "Godz. 11:00", "Liczba miejsc: 0", ""),
            slot("28/05/2023", "Godz. 12:00", "Liczba miejsc: 0", ""),
        ];
        let curr = vec![
            slot("23/05/2023", "Godz. 13:00", "Liczba miejsc: 0", ""),
            slot("26/05/2023", "Godz. 11:00", "Liczba miejsc: 0", ""),
            slot(
                "28/05/2023",
                "Godz. 12:00",
                "Liczba miejsc: 1",
                "https://address.com",
            ),
        ];

        let report = detect_changes(&prev, &curr);
        let message = compose_change_message(&[("Hamlet".to_string(), report)]);

        let expected = "Detected changes:\n\n\
            Hamlet:\n\
            + Missing seats for 24/05/2023 Godz. 13:00\n\
            Link: \n\
            + Additional seats for 23/05/2023 Godz. 13:00\n\
            Link: \n\
            + Seats changes:\n\
            > 28/05/2023 Godz. 12:00\n\
            Previous - Liczba miejsc: 0\n\
            Current - Liczba miejsc: 1\n\
            Link: https://address.com\n\n\
            Best regards,\nTicket Blaster Team";
        assert_eq!(message, expected);
    }

    #[test]
    fn test_change_message_omits_empty_diff_link() {
        let prev = vec![slot("24/05/2023", "Godz. 13:00", "0", "")];
        let curr = vec![slot("24/05/2023", "Godz. 13:00", "2", "")];

        let report = detect_changes(&prev, &curr);
        let message = compose_change_message(&[("Hamlet".to_string(), report)]);

        assert!(message.contains("Previous - 0\nCurrent - 2\n\n"));
        assert!(!message.contains("Current - 2\nLink:"));
    }

    #[test]
    fn test_change_message_joins_events_in_order() {
        let report_a = detect_changes(&[], &[slot("01/06/2023", "Godz. 19:00", "5", "")]);
        let report_b = detect_changes(&[], &[slot("02/06/2023", "Godz. 20:00", "3", "")]);

        let message = compose_change_message(&[
            ("Carmen".to_string(), report_a),
            ("Hamlet".to_string(), report_b),
        ]);

        let carmen = message.find("Carmen:").unwrap();
        let hamlet = message.find("Hamlet:").unwrap();
        assert!(carmen < hamlet);
        assert!(message.contains("Godz. 19:00\nLink: \n\nHamlet:"));
    }

    #[test]
    fn test_change_message_is_stable() {
        let prev = vec![slot("24/05/2023", "Godz. 13:00", "0", "")];
        let curr = vec![slot("25/05/2023", "Godz. 13:00", "1", "")];

        let reports = vec![("Wesele".to_string(), detect_changes(&prev, &curr))];
        let first = compose_change_message(&reports);
        let second = compose_change_message(&reports);
        assert_eq!(first, second);
    }

    #[test]
    fn test_daily_status_layout() {
        let now = Utc::now();
        let mut hamlet = EventRecord::new("Hamlet", "https://example.com/hamlet", now);
        hamlet.activated = true;
        let carmen = EventRecord::new("Carmen", "https://example.com/carmen", now);
        let mut wesele = EventRecord::new("Wesele", "https://example.com/wesele", now);
        wesele.activated = true;

        let message = compose_daily_status(&[hamlet, carmen, wesele]);

        let expected = "The following events are available:\n\
            Hamlet,\n\
            Carmen,\n\
            Wesele\n\
            The following events are activated:\n\
            Hamlet, Wesele\n\
            Best regards,\nTicket Blaster Team";
        assert_eq!(message, expected);
    }

    #[test]
    fn test_daily_status_without_events() {
        let message = compose_daily_status(&[]);
        assert_eq!(
            message,
            "The following events are available:\n\n\
             The following events are activated:\n\n\
             Best regards,\nTicket Blaster Team"
        );
    }
}
