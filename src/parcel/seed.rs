use chrono::Utc;
use lambda_http::tracing;

use super::{Parcel, ParcelStatus};
use crate::{AResult, AppState};

pub const SEED_PARCEL_COUNT: usize = 40;

const SPAN_SECONDS: i64 = 30 * 24 * 3600;

const STAFF: [(&str, Option<&str>); 4] = [
    ("staff-001", Some("Anna Kowalska")),
    ("staff-002", Some("Piotr Nowak")),
    ("staff-003", Some("Marta Wiśniewska")),
    ("staff-004", None),
];

const COURIERS: [&str; 4] = ["DHL", "InPost", "DPD", "UPS"];

const STATUSES: [ParcelStatus; 4] = [
    ParcelStatus::Received,
    ParcelStatus::Assigned,
    ParcelStatus::Delivered,
    ParcelStatus::Closed,
];

/// Deterministic demo parcels created during the 30 days before `now`.
pub fn demo_parcels(now: i64, count: usize) -> Vec<Parcel> {
    (0..count)
        .map(|i| {
            let n = i as i64;
            let created_at = now - (n * 64_937) % SPAN_SECONDS;
            let status = STATUSES[i % STATUSES.len()].clone();
            let received = status == ParcelStatus::Received;

            let updated_at = if received {
                created_at
            } else {
                (created_at + ((n * 37) % 48 + 1) * 3600).min(now)
            };

            let parcel = Parcel::new(
                format!("PCL-{:05}", i + 1),
                status,
                COURIERS[i % COURIERS.len()],
                created_at,
                updated_at,
            );

            if received {
                parcel
            } else {
                let (staff_id, staff_name) = STAFF[(i / 2) % STAFF.len()];
                parcel.assigned(staff_id, staff_name)
            }
        })
        .collect()
}

pub async fn seed_database(state: &AppState) -> AResult<usize> {
    let parcels = demo_parcels(Utc::now().timestamp(), SEED_PARCEL_COUNT);
    let count = parcels.len();

    Parcel::ddb_batch_put(state, &parcels).await?;

    tracing::info!(count, table = %state.table_name, "seeded demo parcels");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_demo_parcels_are_deterministic() {
        let a = demo_parcels(NOW, SEED_PARCEL_COUNT);
        let b = demo_parcels(NOW, SEED_PARCEL_COUNT);
        let ids = |v: &[Parcel]| v.iter().map(|p| p.sk.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&a), ids(&b));
    }

    #[test]
    fn test_demo_parcels_shape() {
        let parcels = demo_parcels(NOW, SEED_PARCEL_COUNT);
        assert_eq!(parcels.len(), SEED_PARCEL_COUNT);

        let unique: HashSet<&str> = parcels.iter().map(|p| p.parcel_id.as_str()).collect();
        assert_eq!(unique.len(), SEED_PARCEL_COUNT);

        for parcel in &parcels {
            assert!(parcel.updated_at >= parcel.created_at);
            assert!(parcel.created_at > NOW - SPAN_SECONDS);
            assert!(parcel.updated_at <= NOW);
            assert_eq!(
                parcel.assigned_to.is_none(),
                parcel.status == ParcelStatus::Received
            );
        }

        // at least one assignee without a display name
        assert!(parcels
            .iter()
            .any(|p| p.assigned_to.is_some() && p.assigned_to_name.is_none()));
    }
}
