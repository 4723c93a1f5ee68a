use crate::error::{RecordsError, Result};
use crate::model::{AttendanceRecord, AttendanceStatus, Cohort, Student};
use crate::store;
use crate::validate::parse_iso_date;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{info, warn};

pub const MSG_DATE_REQUIRED: &str = "Please select a date";
pub const MSG_EXPORT_FILTERS: &str = "Please select a course and date to export";
pub const MSG_EXPORT_EMPTY: &str = "No attendance records found for selected filters";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterRow {
    pub student_id: String,
    pub student_name: String,
    pub course: String,
    pub status: AttendanceStatus,
    pub recorded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub rate: u32,
}

/// Filtered, name-sorted records ready for the spreadsheet writer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceReport {
    pub course: Option<String>,
    pub date: Option<String>,
    pub records: Vec<AttendanceRecord>,
    pub summary: ReportSummary,
    pub filename: String,
}

fn require_date(date: &str) -> Result<String> {
    let trimmed = date.trim();
    if trimmed.is_empty() {
        return Err(RecordsError::validation(MSG_DATE_REQUIRED));
    }
    let Some(parsed) = parse_iso_date(trimmed) else {
        return Err(RecordsError::validation(format!(
            "Invalid date: {} (expected YYYY-MM-DD)",
            trimmed
        )));
    };
    Ok(parsed.format("%Y-%m-%d").to_string())
}

fn cohort_students(students: Vec<Student>, cohort: &Cohort) -> Vec<Student> {
    students.into_iter().filter(|s| cohort.includes(s)).collect()
}

/// Present/absent per cohort student for `date`, defaulting to present.
pub fn roster(conn: &Connection, cohort: &Cohort, date: &str) -> Result<Vec<RosterRow>> {
    let date = require_date(date)?;
    let students = cohort_students(store::load_students(conn)?, cohort);
    let recorded: BTreeMap<String, AttendanceStatus> = store::load_attendance(conn)?
        .into_iter()
        .filter(|r| r.date == date)
        .map(|r| (r.student_id, r.status))
        .collect();

    Ok(students
        .into_iter()
        .map(|s| {
            let existing = recorded.get(&s.id).copied();
            RosterRow {
                status: existing.unwrap_or(AttendanceStatus::Present),
                recorded: existing.is_some(),
                student_id: s.id,
                student_name: s.name,
                course: s.course,
            }
        })
        .collect())
}

/// Records one status per cohort student for `date`.
///
/// Every stored record for `date` (within the cohort's course, when one is
/// set) is dropped before the batch is appended, along with any record whose
/// `(date, studentId)` key is in the batch. Repeating the call leaves the
/// collection unchanged.
pub fn mark_attendance(
    conn: &Connection,
    date: &str,
    cohort: &Cohort,
    statuses: &BTreeMap<String, AttendanceStatus>,
) -> Result<Vec<AttendanceRecord>> {
    let date = require_date(date)?;
    let students = cohort_students(store::load_students(conn)?, cohort);

    let cohort_ids: HashSet<&str> = students.iter().map(|s| s.id.as_str()).collect();
    if let Some(stray) = statuses.keys().find(|id| !cohort_ids.contains(id.as_str())) {
        return Err(RecordsError::validation(format!(
            "Student {} is not in the selected cohort",
            stray
        )));
    }

    let batch: Vec<AttendanceRecord> = students
        .iter()
        .map(|s| AttendanceRecord {
            date: date.clone(),
            student_id: s.id.clone(),
            student_name: s.name.clone(),
            course: s.course.clone(),
            status: statuses
                .get(&s.id)
                .copied()
                .unwrap_or(AttendanceStatus::Present),
        })
        .collect();

    let mut records = store::load_attendance(conn)?;
    let before = records.len();
    records.retain(|r| {
        r.date != date
            || !(cohort_ids.contains(r.student_id.as_str())
                || cohort.course().map_or(true, |c| r.course == c))
    });
    let replaced = before - records.len();
    records.extend(batch.iter().cloned());
    store::save_attendance(conn, &records)?;

    info!(
        date = %date,
        course = cohort.course().unwrap_or("all"),
        count = batch.len(),
        replaced,
        "attendance marked"
    );
    Ok(batch)
}

fn matches_filters(r: &AttendanceRecord, course: Option<&str>, date: Option<&str>) -> bool {
    course.map_or(true, |c| r.course == c) && date.map_or(true, |d| r.date == d)
}

fn blank_to_none(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

/// Records matching every supplied filter, newest date first.
pub fn query_attendance(
    conn: &Connection,
    course: Option<&str>,
    date: Option<&str>,
) -> Result<Vec<AttendanceRecord>> {
    let course = blank_to_none(course);
    let date = blank_to_none(date);
    let mut records: Vec<AttendanceRecord> = store::load_attendance(conn)?
        .into_iter()
        .filter(|r| matches_filters(r, course, date))
        .collect();
    // ISO dates order lexically; sort_by is stable so ties keep stored order.
    records.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(records)
}

/// Empties the history. The returned count is `None` when the stored
/// collection could not be decoded, which does not block the clear.
pub fn clear_attendance(conn: &Connection) -> Result<Option<usize>> {
    let cleared = match store::load_attendance(conn) {
        Ok(records) => Some(records.len()),
        Err(e @ RecordsError::StorageCorrupt { .. }) => {
            warn!(error = %e, "clearing unreadable attendance history");
            None
        }
        Err(e) => return Err(e),
    };
    store::save_attendance(conn, &[])?;
    info!(cleared = ?cleared, "attendance history cleared");
    Ok(cleared)
}

pub fn rate_percent(present: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * present as f64 / total as f64).round() as u32
}

/// Collapses whitespace runs to `_` and replaces anything that is not safe in
/// a file name with `-`.
fn filename_part(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

pub fn report_filename(course: Option<&str>, date: Option<&str>) -> String {
    let date_part = date
        .map(|d| format!("_{}", filename_part(d)))
        .unwrap_or_default();
    let course_part = course
        .map(|c| format!("_{}", filename_part(c)))
        .unwrap_or_default();
    format!("attendance_report{}{}.xlsx", date_part, course_part)
}

pub fn export_report(
    conn: &Connection,
    course: Option<&str>,
    date: Option<&str>,
) -> Result<AttendanceReport> {
    let course = blank_to_none(course);
    let date = blank_to_none(date);
    if course.is_none() && date.is_none() {
        return Err(RecordsError::validation(MSG_EXPORT_FILTERS));
    }

    let mut records: Vec<AttendanceRecord> = store::load_attendance(conn)?
        .into_iter()
        .filter(|r| matches_filters(r, course, date))
        .collect();
    if records.is_empty() {
        return Err(RecordsError::validation(MSG_EXPORT_EMPTY));
    }
    records.sort_by_cached_key(|r| (r.student_name.to_lowercase(), r.student_name.clone()));

    let total = records.len();
    let present = records
        .iter()
        .filter(|r| r.status == AttendanceStatus::Present)
        .count();
    Ok(AttendanceReport {
        course: course.map(str::to_string),
        date: date.map(str::to_string),
        summary: ReportSummary {
            total,
            present,
            absent: total - present,
            rate: rate_percent(present, total),
        },
        filename: report_filename(course, date),
        records,
    })
}
