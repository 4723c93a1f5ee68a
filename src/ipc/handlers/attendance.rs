use crate::attendance;
use crate::error::RecordsError;
use crate::export;
use crate::ipc::helpers::{
    get_json_or_default, get_optional_str, to_json, today, with_conn, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{AttendanceStatus, Cohort};
use crate::stats;
use rusqlite::Connection;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::PathBuf;

fn attendance_roster(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let cohort = Cohort::from_filter(get_optional_str(params, "course").as_deref());
    let date = get_optional_str(params, "date")
        .unwrap_or_else(|| today().format("%Y-%m-%d").to_string());
    let rows = attendance::roster(conn, &cohort, &date)?;
    Ok(json!({
        "date": date,
        "course": cohort.course(),
        "rows": to_json(&rows)?,
    }))
}

fn attendance_mark(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let date = get_optional_str(params, "date").unwrap_or_default();
    let cohort = Cohort::from_filter(get_optional_str(params, "course").as_deref());
    let statuses: BTreeMap<String, AttendanceStatus> = get_json_or_default(params, "statuses")?;
    let batch = attendance::mark_attendance(conn, &date, &cohort, &statuses)?;
    Ok(json!({
        "recorded": batch.len(),
        "records": to_json(&batch)?,
        "dashboard": to_json(&stats::load_dashboard(conn)?)?,
    }))
}

fn attendance_list(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let course = get_optional_str(params, "course");
    let date = get_optional_str(params, "date");
    let records = attendance::query_attendance(conn, course.as_deref(), date.as_deref())?;
    Ok(json!({ "records": to_json(&records)? }))
}

fn attendance_clear(conn: &Connection) -> Result<serde_json::Value, HandlerErr> {
    let cleared = attendance::clear_attendance(conn)?;
    Ok(json!({
        "cleared": cleared,
        "dashboard": to_json(&stats::load_dashboard(conn)?)?,
    }))
}

fn attendance_export(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let out_dir = get_optional_str(params, "outDir")
        .map(PathBuf::from)
        .ok_or_else(|| HandlerErr::bad_params("missing outDir"))?;
    let course = get_optional_str(params, "course");
    let date = get_optional_str(params, "date");

    let report = attendance::export_report(conn, course.as_deref(), date.as_deref())?;
    let path = export::write_attendance_xlsx(&report, &out_dir)
        .map_err(|e| RecordsError::Export(format!("{e:#}")))?;

    Ok(json!({
        "path": path.to_string_lossy(),
        "filename": report.filename,
        "recordCount": report.records.len(),
        "summary": to_json(&report.summary)?,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.roster" => Some(with_conn(state, req, attendance_roster)),
        "attendance.mark" => Some(with_conn(state, req, attendance_mark)),
        "attendance.list" => Some(with_conn(state, req, attendance_list)),
        "attendance.clear" => Some(with_conn(state, req, |conn, _| attendance_clear(conn))),
        "attendance.export" => Some(with_conn(state, req, attendance_export)),
        _ => None,
    }
}
