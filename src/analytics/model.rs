use std::collections::HashMap;

use serde::Serialize;

use crate::parcel::{Parcel, ParcelStatus};

pub const UNKNOWN_STAFF: &str = "Unknown Staff";

const SECONDS_PER_HOUR: f64 = 3600.0;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total: usize,
    pub pending: usize,
    pub delivered: usize,
    pub delivered_today: usize,
    pub avg_delivery_time_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusChartEntry {
    pub name: String, // capitalized status, e.g. "Delivered"
    pub value: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub dashboard_metrics: DashboardMetrics,
    pub status_chart_data: Vec<StatusChartEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMetric {
    pub staff_id: String,
    pub staff_name: String,
    pub total_assigned: usize,
    pub delivered: usize,
    pub pending: usize,
    pub avg_delivery_hours: f64,
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Mean delivery duration in hours, 0 for an empty set.
fn average_delivery_hours<'a>(delivered: impl IntoIterator<Item = &'a Parcel>, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let total_seconds: i64 = delivered.into_iter().map(Parcel::delivery_seconds).sum();
    round_one_decimal(total_seconds as f64 / count as f64 / SECONDS_PER_HOUR)
}

/// Dashboard cards and status chart for one snapshot of parcels.
///
/// `today_start` is the unix timestamp of local midnight, resolved once by the
/// caller so every parcel is compared against the same boundary.
pub fn compute_analytics(parcels: &[Parcel], today_start: i64) -> Analytics {
    let pending = parcels.iter().filter(|p| p.status.is_pending()).count();
    let delivered: Vec<&Parcel> = parcels.iter().filter(|p| p.status.is_delivered()).collect();

    let delivered_today = delivered
        .iter()
        .filter(|p| p.updated_at >= today_start)
        .count();

    let mut status_counts: Vec<(ParcelStatus, usize)> = Vec::new();
    for parcel in parcels {
        match status_counts.iter_mut().find(|(s, _)| *s == parcel.status) {
            Some((_, count)) => *count += 1,
            None => status_counts.push((parcel.status.clone(), 1)),
        }
    }

    Analytics {
        dashboard_metrics: DashboardMetrics {
            total: parcels.len(),
            pending,
            delivered: delivered.len(),
            delivered_today,
            avg_delivery_time_hours: average_delivery_hours(
                delivered.iter().copied(),
                delivered.len(),
            ),
        },
        status_chart_data: status_counts
            .into_iter()
            .map(|(status, value)| StatusChartEntry {
                name: status.label(),
                value,
            })
            .collect(),
    }
}

/// Per-staff workload, in order of each staff member's first parcel.
/// Parcels without an assignee are skipped.
pub fn compute_staff_metrics(parcels: &[Parcel]) -> Vec<StaffMetric> {
    let mut metrics: Vec<StaffMetric> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for parcel in parcels {
        let Some(staff_id) = parcel.staff_id() else {
            continue;
        };

        let i = *index.entry(staff_id).or_insert_with(|| {
            metrics.push(StaffMetric {
                staff_id: staff_id.to_string(),
                staff_name: String::new(),
                total_assigned: 0,
                delivered: 0,
                pending: 0,
                avg_delivery_hours: 0.0,
            });
            metrics.len() - 1
        });
        let metric = &mut metrics[i];

        if metric.staff_name.is_empty() {
            if let Some(name) = parcel.assigned_to_name.as_deref().filter(|n| !n.is_empty()) {
                metric.staff_name = name.to_string();
            }
        }

        metric.total_assigned += 1;
        if parcel.status.is_delivered() {
            metric.delivered += 1;
        } else {
            metric.pending += 1;
        }
    }

    for metric in metrics.iter_mut() {
        if metric.staff_name.is_empty() {
            metric.staff_name = UNKNOWN_STAFF.to_string();
        }
        let staff_delivered = parcels
            .iter()
            .filter(|p| p.status.is_delivered() && p.staff_id() == Some(metric.staff_id.as_str()));
        metric.avg_delivery_hours = average_delivery_hours(staff_delivered, metric.delivered);
    }

    metrics
}
