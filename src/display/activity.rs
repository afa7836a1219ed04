//! Audit trail display formatting

use tabled::Tabled;

use crate::audit::{generate_detailed_diff, AuditRecord};
use crate::models::FieldMap;

use super::{render_table, truncate};

#[derive(Tabled)]
struct ActivityRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Log")]
    log: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Subject")]
    subject: String,
    #[tabled(rename = "By")]
    causer: String,
    #[tabled(rename = "Changes")]
    changes: String,
}

/// One row per record, oldest first
pub fn format_activity_list(records: &[AuditRecord]) -> String {
    let rows = records
        .iter()
        .map(|r| ActivityRow {
            id: r.id.to_string(),
            when: r.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            log: r.log_name.clone(),
            description: r.description.clone(),
            subject: r.subject().to_string(),
            causer: r
                .causer()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "system".to_string()),
            changes: r
                .diff_summary()
                .map(|d| truncate(&d, 60))
                .unwrap_or_default(),
        })
        .collect();
    render_table(rows, "No activity recorded.")
}

/// Full view of one record, with every changed field on its own line
pub fn format_activity_details(record: &AuditRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Activity {}\n", record.id));
    output.push_str(&format!("  Description: {}\n", record.description));
    output.push_str(&format!("  Log:         {}\n", record.log_name));
    output.push_str(&format!("  Event:       {}\n", record.event));
    output.push_str(&format!(
        "  Subject:     {} {}\n",
        record.subject_type, record.subject_id
    ));
    match record.causer() {
        Some(causer) => output.push_str(&format!(
            "  Causer:      {} {}\n",
            causer.kind, causer.key
        )),
        None => output.push_str("  Causer:      system\n"),
    }
    output.push_str(&format!(
        "  Recorded:    {}\n",
        record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    let empty = FieldMap::new();
    let old = record.properties.old.as_ref().unwrap_or(&empty);
    let new = record.properties.attributes.as_ref().unwrap_or(&empty);
    let lines = generate_detailed_diff(old, new);
    if !lines.is_empty() {
        output.push_str("\n  Changes:\n");
        for line in lines {
            output.push_str(&format!("    {}\n", line));
        }
    }

    output
}
