//! AWS DynamoDB storage implementation.
//!
//! Single-table layout shared by events and seat snapshots:
//!
//! | type    | event        | payload                                |
//! |---------|--------------|----------------------------------------|
//! | `EVENT` | event name   | link, activated, includedDates, stamps |
//! | `SEATS` | event name   | items (list of slot maps), createdAt   |
//!
//! Batch writes and reads are chunked to the DynamoDB request limit.

use std::collections::HashMap;

use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{
    AttributeValue, DeleteRequest, KeysAndAttributes, PutRequest, WriteRequest,
};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::models::{EventRecord, SeatSnapshot, TicketItem};
use crate::storage::TicketStore;

const TYPE_EVENT: &str = "EVENT";
const TYPE_SEATS: &str = "SEATS";

/// DynamoDB caps batch write and delete requests at 25 items.
const DYNAMO_MAX_BATCH_ITEMS: usize = 25;

/// DynamoDB-based storage for events and seat snapshots.
pub struct DynamoStore {
    client: Client,
    table_name: String,
}

impl DynamoStore {
    /// Create a new DynamoDB store against the given table.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Create a DynamoDB store from environment configuration.
    pub async fn from_env() -> Result<Self> {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = Client::new(&config);

        let table_name = std::env::var("TABLE_NAME")
            .map_err(|_| AppError::config("TABLE_NAME environment variable not set"))?;

        Ok(Self::new(client, table_name))
    }

    async fn write_batch(&self, requests: Vec<WriteRequest>) -> Result<()> {
        let output = self
            .client
            .batch_write_item()
            .request_items(&self.table_name, requests)
            .send()
            .await
            .map_err(|e| AppError::storage(e.into_service_error()))?;

        if let Some(unprocessed) = output.unprocessed_items() {
            let leftover: usize = unprocessed.values().map(Vec::len).sum();
            if leftover > 0 {
                warn!("batch write left {leftover} unprocessed items");
            }
        }
        Ok(())
    }

    /// Primary key for a row of the given kind.
    fn key_for(kind: &str, event: &str) -> HashMap<String, AttributeValue> {
        HashMap::from([
            ("type".to_string(), AttributeValue::S(kind.to_string())),
            ("event".to_string(), AttributeValue::S(event.to_string())),
        ])
    }

    fn attr_s(item: &HashMap<String, AttributeValue>, key: &str) -> Result<String> {
        item.get(key)
            .and_then(|v| v.as_s().ok())
            .cloned()
            .ok_or_else(|| AppError::storage(format!("missing string attribute '{key}'")))
    }

    fn attr_s_or_default(item: &HashMap<String, AttributeValue>, key: &str) -> String {
        item.get(key)
            .and_then(|v| v.as_s().ok())
            .cloned()
            .unwrap_or_default()
    }

    fn attr_time(item: &HashMap<String, AttributeValue>, key: &str) -> Result<DateTime<Utc>> {
        let raw = Self::attr_s(item, key)?;
        raw.parse::<DateTime<Utc>>()
            .map_err(|e| AppError::storage(format!("bad timestamp in '{key}': {e}")))
    }

    fn event_to_item(event: &EventRecord) -> HashMap<String, AttributeValue> {
        let dates = event
            .included_dates
            .iter()
            .cloned()
            .map(AttributeValue::S)
            .collect();

        let mut item = Self::key_for(TYPE_EVENT, &event.name);
        item.insert("link".to_string(), AttributeValue::S(event.link.clone()));
        item.insert(
            "activated".to_string(),
            AttributeValue::Bool(event.activated),
        );
        item.insert("includedDates".to_string(), AttributeValue::L(dates));
        item.insert(
            "createdAt".to_string(),
            AttributeValue::S(event.created_at.to_rfc3339()),
        );
        item.insert(
            "updatedAt".to_string(),
            AttributeValue::S(event.updated_at.to_rfc3339()),
        );
        item
    }

    fn event_from_item(item: &HashMap<String, AttributeValue>) -> Result<EventRecord> {
        let included_dates = item
            .get("includedDates")
            .and_then(|v| v.as_l().ok())
            .map(|list| {
                list.iter()
                    .filter_map(|v| v.as_s().ok())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(EventRecord {
            name: Self::attr_s(item, "event")?,
            link: Self::attr_s_or_default(item, "link"),
            activated: item
                .get("activated")
                .and_then(|v| v.as_bool().ok())
                .copied()
                .unwrap_or(false),
            included_dates,
            created_at: Self::attr_time(item, "createdAt")?,
            updated_at: Self::attr_time(item, "updatedAt")?,
        })
    }

    fn snapshot_to_item(snapshot: &SeatSnapshot) -> HashMap<String, AttributeValue> {
        let items = snapshot
            .items
            .iter()
            .map(|ticket| {
                let entry = HashMap::from([
                    ("date".to_string(), AttributeValue::S(ticket.date.clone())),
                    ("time".to_string(), AttributeValue::S(ticket.time.clone())),
                    ("seats".to_string(), AttributeValue::S(ticket.seats.clone())),
                    ("link".to_string(), AttributeValue::S(ticket.link.clone())),
                ]);
                AttributeValue::M(entry)
            })
            .collect();

        let mut item = Self::key_for(TYPE_SEATS, &snapshot.event);
        item.insert("items".to_string(), AttributeValue::L(items));
        item.insert(
            "createdAt".to_string(),
            AttributeValue::S(snapshot.created_at.to_rfc3339()),
        );
        item
    }

    fn snapshot_from_item(item: &HashMap<String, AttributeValue>) -> Result<SeatSnapshot> {
        let items = item
            .get("items")
            .and_then(|v| v.as_l().ok())
            .map(|list| {
                list.iter()
                    .filter_map(|v| v.as_m().ok())
                    .map(|entry| TicketItem {
                        date: Self::attr_s_or_default(entry, "date"),
                        time: Self::attr_s_or_default(entry, "time"),
                        seats: Self::attr_s_or_default(entry, "seats"),
                        link: Self::attr_s_or_default(entry, "link"),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(SeatSnapshot {
            event: Self::attr_s(item, "event")?,
            items,
            created_at: Self::attr_time(item, "createdAt")?,
        })
    }
}

#[async_trait::async_trait]
impl TicketStore for DynamoStore {
    async fn list_events(&self) -> Result<Vec<EventRecord>> {
        let mut events = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let output = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("#kind = :kind")
                .expression_attribute_names("#kind", "type")
                .expression_attribute_values(":kind", AttributeValue::S(TYPE_EVENT.to_string()))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| AppError::storage(e.into_service_error()))?;

            for item in output.items() {
                events.push(Self::event_from_item(item)?);
            }

            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        debug!("loaded {} events from {}", events.len(), self.table_name);
        Ok(events)
    }

    async fn put_events(&self, events: &[EventRecord]) -> Result<()> {
        for chunk in events.chunks(DYNAMO_MAX_BATCH_ITEMS) {
            let mut requests = Vec::with_capacity(chunk.len());
            for event in chunk {
                let put = PutRequest::builder()
                    .set_item(Some(Self::event_to_item(event)))
                    .build()
                    .map_err(AppError::storage)?;
                requests.push(WriteRequest::builder().put_request(put).build());
            }
            self.write_batch(requests).await?;
        }
        Ok(())
    }

    async fn delete_events(&self, names: &[String]) -> Result<()> {
        for chunk in names.chunks(DYNAMO_MAX_BATCH_ITEMS) {
            let mut requests = Vec::with_capacity(chunk.len());
            for name in chunk {
                let delete = DeleteRequest::builder()
                    .set_key(Some(Self::key_for(TYPE_EVENT, name)))
                    .build()
                    .map_err(AppError::storage)?;
                requests.push(WriteRequest::builder().delete_request(delete).build());
            }
            self.write_batch(requests).await?;
        }
        Ok(())
    }

    async fn load_snapshots(&self, events: &[String]) -> Result<Vec<SeatSnapshot>> {
        let mut snapshots = Vec::new();

        for chunk in events.chunks(DYNAMO_MAX_BATCH_ITEMS) {
            let keys: Vec<_> = chunk
                .iter()
                .map(|name| Self::key_for(TYPE_SEATS, name))
                .collect();
            let requested = KeysAndAttributes::builder()
                .set_keys(Some(keys))
                .build()
                .map_err(AppError::storage)?;

            let output = self
                .client
                .batch_get_item()
                .request_items(&self.table_name, requested)
                .send()
                .await
                .map_err(|e| AppError::storage(e.into_service_error()))?;

            if let Some(items) = output.responses().and_then(|r| r.get(&self.table_name)) {
                for item in items {
                    snapshots.push(Self::snapshot_from_item(item)?);
                }
            }

            if let Some(unprocessed) = output.unprocessed_keys() {
                if !unprocessed.is_empty() {
                    warn!("batch get left {} tables with unprocessed keys", unprocessed.len());
                }
            }
        }

        Ok(snapshots)
    }

    async fn save_snapshots(&self, snapshots: &[SeatSnapshot]) -> Result<()> {
        for chunk in snapshots.chunks(DYNAMO_MAX_BATCH_ITEMS) {
            let mut requests = Vec::with_capacity(chunk.len());
            for snapshot in chunk {
                let put = PutRequest::builder()
                    .set_item(Some(Self::snapshot_to_item(snapshot)))
                    .build()
                    .map_err(AppError::storage)?;
                requests.push(WriteRequest::builder().put_request(put).build());
            }
            self.write_batch(requests).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> EventRecord {
        EventRecord {
            name: "Hamlet".to_string(),
            link: "https://bilety.muzyczny.org/spektakl/hamlet".to_string(),
            activated: true,
            included_dates: vec!["24/05/2023".to_string(), "26/05/2023".to_string()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_event_item_roundtrip() {
        let event = sample_event();
        let item = DynamoStore::event_to_item(&event);
        let parsed = DynamoStore::event_from_item(&item).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_event_from_item_defaults() {
        let mut item = DynamoStore::key_for(TYPE_EVENT, "Carmen");
        let now = Utc::now().to_rfc3339();
        item.insert("createdAt".to_string(), AttributeValue::S(now.clone()));
        item.insert("updatedAt".to_string(), AttributeValue::S(now));

        let parsed = DynamoStore::event_from_item(&item).unwrap();
        assert_eq!(parsed.name, "Carmen");
        assert_eq!(parsed.link, "");
        assert!(!parsed.activated);
        assert!(parsed.included_dates.is_empty());
    }

    #[test]
    fn test_event_from_item_missing_name() {
        let item = HashMap::from([(
            "type".to_string(),
            AttributeValue::S(TYPE_EVENT.to_string()),
        )]);
        assert!(DynamoStore::event_from_item(&item).is_err());
    }

    #[test]
    fn test_snapshot_item_roundtrip() {
        let snapshot = SeatSnapshot::new(
            "Hamlet",
            vec![
                TicketItem {
                    date: "24/05/2023".to_string(),
                    time: "Godz. 13:00".to_string(),
                    seats: "Liczba miejsc: 4".to_string(),
                    link: "https://bilety.muzyczny.org/kup/123".to_string(),
                },
                TicketItem {
                    date: "26/05/2023".to_string(),
                    time: "Godz. 11:00".to_string(),
                    seats: "Liczba miejsc: 0".to_string(),
                    link: String::new(),
                },
            ],
            Utc::now(),
        );

        let item = DynamoStore::snapshot_to_item(&snapshot);
        let parsed = DynamoStore::snapshot_from_item(&item).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn test_snapshot_from_item_without_items() {
        let mut item = DynamoStore::key_for(TYPE_SEATS, "Hamlet");
        item.insert(
            "createdAt".to_string(),
            AttributeValue::S(Utc::now().to_rfc3339()),
        );

        let parsed = DynamoStore::snapshot_from_item(&item).unwrap();
        assert!(parsed.items.is_empty());
    }
}
