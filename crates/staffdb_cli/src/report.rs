//! Console rendering of step reports.

use staffdb_core::{SeedSummary, StepOutput, StepReport, UserRow};
use std::fmt::Display;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    /// One JSON document per line.
    Json,
}

pub fn write_seed_summary<W: Write>(
    out: &mut W,
    summary: &SeedSummary,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => writeln!(
            out,
            "Seeded: positions={} roles={} departments={} projects={} users={}",
            summary.positions, summary.roles, summary.departments, summary.projects, summary.users
        ),
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, &serde_json::json!({ "seeded": summary }))?;
            writeln!(out)
        }
    }
}

/// Writes one step report and flushes, so finished steps stay visible
/// when a later step fails.
pub fn write_report<W: Write>(
    out: &mut W,
    report: &StepReport,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => write_text(out, report)?,
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, report)?;
            writeln!(out)?;
        }
    }
    out.flush()
}

fn write_text<W: Write>(out: &mut W, report: &StepReport) -> io::Result<()> {
    writeln!(out, "[{}] {}", report.step, report.title)?;
    match &report.output {
        StepOutput::Rows { rows } => write_rows(out, rows)?,
        StepOutput::Updated { count, rows } => {
            writeln!(out, "  updated: {count}")?;
            write_rows(out, rows)?;
        }
        StepOutput::Deleted { count } => writeln!(out, "  deleted: {count}")?,
    }
    Ok(())
}

fn write_rows<W: Write>(out: &mut W, rows: &[UserRow]) -> io::Result<()> {
    if rows.is_empty() {
        return writeln!(out, "  (no rows)");
    }
    for row in rows {
        writeln!(out, "  {}", row_line(row))?;
    }
    Ok(())
}

/// `{ id: 3, name: Алексей Козлов, role: Пользователь }`, fields in
/// declaration order.
fn row_line(row: &UserRow) -> String {
    let mut parts = vec![format!("id: {}", row.id)];
    push_field(&mut parts, "name", row.name.as_deref());
    push_field(&mut parts, "email", row.email.as_deref());
    push_field(&mut parts, "role_id", row.role_id);
    push_field(&mut parts, "position_id", row.position_id);
    push_field(&mut parts, "department_id", row.department_id);
    push_field(&mut parts, "role", row.role.as_deref());
    push_field(&mut parts, "position", row.position.as_deref());
    push_field(&mut parts, "department", row.department.as_deref());
    format!("{{ {} }}", parts.join(", "))
}

fn push_field<T: Display>(parts: &mut Vec<String>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        parts.push(format!("{key}: {value}"));
    }
}
