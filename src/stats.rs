use crate::attendance::rate_percent;
use crate::error::{RecordsError, Result};
use crate::model::{AttendanceRecord, AttendanceStatus, MarksRecord, Student};
use crate::store;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeMap;

pub const TREND_MONTHS: [&str; 6] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun"];
pub const TREND_VALUES: [u32; 6] = [85, 88, 92, 87, 90, 93];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub month: &'static str,
    pub percent: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    /// Always true: the series is fixed sample data, not derived from history.
    pub placeholder: bool,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_students: usize,
    pub attendance_rate: u32,
    pub present: usize,
    pub absent: usize,
    pub course_distribution: BTreeMap<String, usize>,
    pub gender_distribution: BTreeMap<String, usize>,
    pub region_distribution: BTreeMap<String, usize>,
    pub monthly_trend: MonthlyTrend,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub student: Student,
    pub marks: MarksRecord,
    pub total_marks: u32,
    pub average_mark: f64,
    pub present: usize,
    pub absent: usize,
    pub total_classes: usize,
    pub attendance_rate: u32,
    pub absent_rate: u32,
}

/// Text after the last comma of an address, trimmed.
pub fn region_of(address: &str) -> Option<&str> {
    let region = address.rsplit(',').next().unwrap_or("").trim();
    if region.is_empty() {
        None
    } else {
        Some(region)
    }
}

fn count_by<'a, I>(keys: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = BTreeMap::new();
    for k in keys {
        *out.entry(k.to_string()).or_insert(0) += 1;
    }
    out
}

pub fn course_distribution(students: &[Student]) -> BTreeMap<String, usize> {
    count_by(students.iter().map(|s| s.course.as_str()))
}

pub fn gender_distribution(students: &[Student]) -> BTreeMap<String, usize> {
    count_by(students.iter().map(|s| s.gender.as_str()))
}

pub fn region_distribution(students: &[Student]) -> BTreeMap<String, usize> {
    count_by(students.iter().filter_map(|s| region_of(&s.address)))
}

fn present_count(records: &[AttendanceRecord]) -> usize {
    records
        .iter()
        .filter(|r| r.status == AttendanceStatus::Present)
        .count()
}

pub fn monthly_trend() -> MonthlyTrend {
    MonthlyTrend {
        placeholder: true,
        points: TREND_MONTHS
            .into_iter()
            .zip(TREND_VALUES)
            .map(|(month, percent)| TrendPoint { month, percent })
            .collect(),
    }
}

/// Totals over the whole attendance collection, regardless of any filter.
pub fn dashboard_stats(students: &[Student], attendance: &[AttendanceRecord]) -> DashboardStats {
    let present = present_count(attendance);
    DashboardStats {
        total_students: students.len(),
        attendance_rate: rate_percent(present, attendance.len()),
        present,
        absent: attendance.len() - present,
        course_distribution: course_distribution(students),
        gender_distribution: gender_distribution(students),
        region_distribution: region_distribution(students),
        monthly_trend: monthly_trend(),
    }
}

pub fn load_dashboard(conn: &Connection) -> Result<DashboardStats> {
    let students = store::load_students(conn)?;
    let attendance = store::load_attendance(conn)?;
    Ok(dashboard_stats(&students, &attendance))
}

pub fn profile_summary(conn: &Connection, student_id: &str) -> Result<ProfileSummary> {
    let student = store::load_students(conn)?
        .into_iter()
        .find(|s| s.id == student_id)
        .ok_or_else(|| RecordsError::NotFound(student_id.to_string()))?;
    let marks = store::load_marks(conn)?
        .get(student_id)
        .copied()
        .unwrap_or_default();
    let own: Vec<AttendanceRecord> = store::load_attendance(conn)?
        .into_iter()
        .filter(|r| r.student_id == student_id)
        .collect();

    let present = present_count(&own);
    let total_classes = own.len();
    let attendance_rate = rate_percent(present, total_classes);
    Ok(ProfileSummary {
        student,
        total_marks: marks.total(),
        average_mark: marks.average(),
        marks,
        present,
        absent: total_classes - present,
        total_classes,
        attendance_rate,
        absent_rate: if total_classes == 0 {
            0
        } else {
            100 - attendance_rate
        },
    })
}
