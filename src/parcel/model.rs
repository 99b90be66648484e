use std::collections::HashMap;

use aws_sdk_dynamodb::types::{AttributeValue, PutRequest, WriteRequest};
use serde::{Deserialize, Serialize};
use serde_dynamo::{from_items, to_item};

use super::PARCEL_PK;
use crate::utils::time::DateRange;
use crate::{AResult, AppState};

/// Parcel lifecycle state. Values written by other systems that are not one
/// of the known states are kept verbatim in `Other`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParcelStatus {
    #[default]
    Received,
    Assigned,
    Delivered,
    Closed,
    Other(String),
}

impl From<String> for ParcelStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "received" => ParcelStatus::Received,
            "assigned" => ParcelStatus::Assigned,
            "delivered" => ParcelStatus::Delivered,
            "closed" => ParcelStatus::Closed,
            _ => ParcelStatus::Other(raw),
        }
    }
}

impl From<ParcelStatus> for String {
    fn from(status: ParcelStatus) -> Self {
        match status {
            ParcelStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl ParcelStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ParcelStatus::Received => "received",
            ParcelStatus::Assigned => "assigned",
            ParcelStatus::Delivered => "delivered",
            ParcelStatus::Closed => "closed",
            ParcelStatus::Other(raw) => raw,
        }
    }

    /// Capitalized form used as chart label, e.g. "in_transit" -> "In_transit".
    pub fn label(&self) -> String {
        let mut chars = self.as_str().chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ParcelStatus::Received | ParcelStatus::Assigned)
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, ParcelStatus::Delivered | ParcelStatus::Closed)
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parcel {
    pub pk: String, // always "Parcel"
    pub sk: String, // "<created_at padded to 12 digits>::<parcel_id>", e.g. "001704067200::PCL-00001"
    pub parcel_id: String,
    pub status: ParcelStatus,
    pub courier_company: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>, // staff id, e.g. "staff-001"

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_name: Option<String>, // e.g. "Anna Kowalska"

    pub created_at: i64, // unix seconds
    pub updated_at: i64, // unix seconds
}

impl Parcel {
    pub fn new(
        parcel_id: impl Into<String>,
        status: ParcelStatus,
        courier_company: impl Into<String>,
        created_at: i64,
        updated_at: i64,
    ) -> Self {
        let parcel_id = parcel_id.into();
        Self {
            pk: String::from(PARCEL_PK),
            sk: sort_key(created_at, &parcel_id),
            parcel_id,
            status,
            courier_company: courier_company.into(),
            assigned_to: None,
            assigned_to_name: None,
            created_at,
            updated_at,
        }
    }

    pub fn assigned(mut self, staff_id: impl Into<String>, staff_name: Option<&str>) -> Self {
        self.assigned_to = Some(staff_id.into());
        self.assigned_to_name = staff_name.map(String::from);
        self
    }

    /// Staff id this parcel counts towards, ignoring blank ids.
    pub fn staff_id(&self) -> Option<&str> {
        self.assigned_to.as_deref().filter(|id| !id.is_empty())
    }

    /// Seconds between creation and last update, never negative.
    pub fn delivery_seconds(&self) -> i64 {
        (self.updated_at - self.created_at).max(0)
    }
}

pub fn sort_key(created_at: i64, parcel_id: &str) -> String {
    format!("{:012}::{}", created_at.max(0), parcel_id)
}

// BatchWriteItem accepts at most 25 requests
const BATCH_WRITE_LIMIT: usize = 25;
const BATCH_WRITE_ATTEMPTS: usize = 5;

// ';' sorts right after ':', so every "<to>::<id>" key falls below this bound
fn range_keys(range: &DateRange) -> (String, String) {
    (
        format!("{:012}", range.from.max(0)),
        format!("{:012};", range.to.max(0)),
    )
}

// DynamoDB handlers
impl Parcel {
    pub async fn ddb_query_by_date_range(
        state: &AppState,
        range: &DateRange,
    ) -> AResult<Vec<Parcel>> {
        let (from, to) = range_keys(range);

        let items = state
            .dynamodb_client
            .query()
            .table_name(&state.table_name)
            .key_condition_expression("pk = :pk AND sk BETWEEN :from AND :to")
            .expression_attribute_values(":pk", AttributeValue::S(String::from(PARCEL_PK)))
            .expression_attribute_values(":from", AttributeValue::S(from))
            .expression_attribute_values(":to", AttributeValue::S(to))
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        let parcels: Vec<Parcel> = from_items(items)?;
        Ok(parcels)
    }

    /// Writes parcels with `BatchWriteItem`, retrying unprocessed items a
    /// bounded number of times.
    pub async fn ddb_batch_put(state: &AppState, parcels: &[Parcel]) -> AResult<()> {
        for requests in batch_write_requests(parcels)? {
            let mut pending = HashMap::from([(state.table_name.clone(), requests)]);
            let mut attempts = 0;
            while !pending.is_empty() {
                if attempts == BATCH_WRITE_ATTEMPTS {
                    return Err(anyhow::Error::msg(
                        "DynamoDB left Parcel writes unprocessed after retries",
                    )
                    .into());
                }
                attempts += 1;

                let res = state
                    .dynamodb_client
                    .batch_write_item()
                    .set_request_items(Some(pending))
                    .send()
                    .await?;
                pending = res.unprocessed_items.unwrap_or_default();
                pending.retain(|_, requests| !requests.is_empty());
            }
        }
        Ok(())
    }
}

/// Put requests grouped into batches of at most `BATCH_WRITE_LIMIT`.
fn batch_write_requests(parcels: &[Parcel]) -> AResult<Vec<Vec<WriteRequest>>> {
    let mut batches = Vec::new();
    for chunk in parcels.chunks(BATCH_WRITE_LIMIT) {
        let mut requests = Vec::with_capacity(chunk.len());
        for parcel in chunk {
            if parcel.pk != PARCEL_PK {
                return Err(anyhow::Error::msg("Invalid Parcel primary key").into());
            }
            let put = PutRequest::builder().set_item(Some(to_item(parcel)?)).build()?;
            requests.push(WriteRequest::builder().put_request(put).build());
        }
        batches.push(requests);
    }
    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_keys_order_by_creation() {
        let early = Parcel::new("PCL-9", ParcelStatus::Received, "DHL", 99, 99);
        let late = Parcel::new("PCL-1", ParcelStatus::Received, "DHL", 100, 100);
        assert_eq!(early.sk, "000000000099::PCL-9");
        assert!(early.sk < late.sk);
    }

    #[test]
    fn test_range_keys_bracket_parcels() {
        let range = DateRange { from: 100, to: 200 };
        let (from, to) = range_keys(&range);

        let first = sort_key(100, "PCL-00001");
        let last = sort_key(200, "zzz");
        let outside = sort_key(201, "PCL-00001");

        assert!(from <= first);
        assert!(last <= to);
        assert!(outside > to);
    }

    #[test]
    fn test_batch_write_requests() {
        let parcels: Vec<Parcel> = (0..40)
            .map(|i| Parcel::new(format!("PCL-{}", i), ParcelStatus::Received, "DHL", i, i))
            .collect();

        let batches = batch_write_requests(&parcels).unwrap();
        let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![25, 15]);

        let item = batches[1][0].put_request().unwrap().item();
        assert_eq!(
            item.get("parcelId"),
            Some(&AttributeValue::S("PCL-25".to_string()))
        );
        assert_eq!(item.get("status"), Some(&AttributeValue::S("received".to_string())));

        assert!(batch_write_requests(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_batch_write_rejects_foreign_key() {
        let mut parcel = Parcel::new("PCL-1", ParcelStatus::Received, "DHL", 0, 0);
        parcel.pk = String::from("Task::Workout");
        assert!(batch_write_requests(&[parcel]).is_err());
    }

    #[test]
    fn test_status_groups() {
        assert!(ParcelStatus::Received.is_pending());
        assert!(ParcelStatus::Assigned.is_pending());
        assert!(ParcelStatus::Delivered.is_delivered());
        assert!(ParcelStatus::Closed.is_delivered());
        assert!(!ParcelStatus::Closed.is_pending());
        assert_eq!(ParcelStatus::Assigned.label(), "Assigned");
    }

    #[test]
    fn test_unknown_status_is_kept() {
        let parcels: Vec<Parcel> = serde_json::from_str(
            r#"[{"pk":"Parcel","sk":"a","parcelId":"PCL-1","status":"in_transit",
                 "courierCompany":"DHL","createdAt":0,"updatedAt":10},
                {"pk":"Parcel","sk":"b","parcelId":"PCL-2","status":"delivered",
                 "courierCompany":"DHL","createdAt":0,"updatedAt":3600}]"#,
        )
        .unwrap();

        assert_eq!(parcels.len(), 2);
        let status = &parcels[0].status;
        assert_eq!(status, &ParcelStatus::Other("in_transit".to_string()));
        assert!(!status.is_pending());
        assert!(!status.is_delivered());
        assert_eq!(status.label(), "In_transit");
        assert_eq!(parcels[1].status, ParcelStatus::Delivered);

        let value = serde_json::to_value(&parcels[0]).unwrap();
        assert_eq!(value["status"], "in_transit");
    }

    #[test]
    fn test_json_shape() {
        let parcel = Parcel::new("PCL-1", ParcelStatus::Delivered, "InPost", 0, 3600)
            .assigned("staff-001", Some("Anna"));
        let value = serde_json::to_value(&parcel).unwrap();
        assert_eq!(value["parcelId"], "PCL-1");
        assert_eq!(value["status"], "delivered");
        assert_eq!(value["assignedToName"], "Anna");
        assert_eq!(value["updatedAt"], 3600);

        let unassigned: Parcel = serde_json::from_str(
            r#"{"pk":"Parcel","sk":"x","parcelId":"PCL-2","status":"received",
                "courierCompany":"DPD","createdAt":5,"updatedAt":5}"#,
        )
        .unwrap();
        assert_eq!(unassigned.staff_id(), None);
    }

    #[test]
    fn test_blank_staff_id_is_unassigned() {
        let parcel = Parcel::new("PCL-1", ParcelStatus::Assigned, "UPS", 0, 0).assigned("", None);
        assert_eq!(parcel.staff_id(), None);
    }
}
