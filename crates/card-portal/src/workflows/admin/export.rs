use std::io::Write;

use super::domain::ApplicationSummary;

const HEADER: [&str; 9] = [
    "id",
    "card_type",
    "first_name",
    "last_name",
    "emirates_id",
    "email",
    "phone",
    "status",
    "created_at",
];

/// Write the applications table as CSV, one row per application.
pub fn export_applications_csv<W: Write>(
    writer: W,
    applications: &[ApplicationSummary],
) -> Result<(), csv::Error> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(HEADER)?;

    for application in applications {
        let id = application.id.to_string();
        let created_at = application
            .created_at
            .map(|timestamp| timestamp.to_rfc3339())
            .unwrap_or_default();
        csv.write_record([
            id.as_str(),
            application
                .card_type
                .map(|card_type| card_type.resource())
                .unwrap_or_default(),
            application.first_name.as_str(),
            application.last_name.as_str(),
            application.emirates_id.as_str(),
            application.email.as_str(),
            application.phone.as_str(),
            application.status.label(),
            created_at.as_str(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}
