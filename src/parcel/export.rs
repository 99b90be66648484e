use chrono_tz::Tz;

use super::Parcel;
use crate::utils::time::format_local;
use crate::AResult;

const HEADERS: [&str; 9] = [
    "parcelId",
    "status",
    "courierCompany",
    "assignedTo",
    "assignedToName",
    "createdAt",
    "updatedAt",
    "createdAtLocal",
    "updatedAtLocal",
];

/// Renders parcels as CSV, header row first. Local columns use `tz`.
pub fn export_to_csv(parcels: &[Parcel], tz: Tz) -> AResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(HEADERS)?;
    for parcel in parcels {
        writer.write_record([
            parcel.parcel_id.clone(),
            parcel.status.as_str().to_string(),
            parcel.courier_company.clone(),
            parcel.assigned_to.clone().unwrap_or_default(),
            parcel.assigned_to_name.clone().unwrap_or_default(),
            parcel.created_at.to_string(),
            parcel.updated_at.to_string(),
            format_local(parcel.created_at, tz),
            format_local(parcel.updated_at, tz),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::Error::msg(format!("Error flushing CSV export: {}", e)))?;
    Ok(String::from_utf8(bytes)?)
}
