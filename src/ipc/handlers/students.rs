use crate::ipc::helpers::{
    get_json_or_default, get_required_str, to_json, today, with_conn, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{MarksCandidate, StudentCandidate};
use crate::stats;
use crate::students;
use rusqlite::Connection;
use serde_json::json;

fn parse_candidate(params: &serde_json::Value) -> Result<StudentCandidate, HandlerErr> {
    let Some(raw) = params.get("student") else {
        return Err(HandlerErr::bad_params("missing student"));
    };
    serde_json::from_value(raw.clone())
        .map_err(|e| HandlerErr::bad_params(format!("invalid student: {}", e)))
}

fn students_list(conn: &Connection) -> Result<serde_json::Value, HandlerErr> {
    let list = students::list_students(conn)?;
    Ok(json!({ "students": to_json(&list)? }))
}

fn students_get(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_str(params, "studentId")?;
    let (student, marks) = students::get_student_with_marks(conn, id.trim())?;
    Ok(json!({
        "student": to_json(&student)?,
        "marks": to_json(&marks)?,
    }))
}

fn students_create(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let candidate = parse_candidate(params)?;
    let marks: MarksCandidate = get_json_or_default(params, "marks")?;
    let student = students::add_student(conn, &candidate, &marks, today())?;
    Ok(json!({
        "studentId": student.id,
        "student": to_json(&student)?,
        "dashboard": to_json(&stats::load_dashboard(conn)?)?,
    }))
}

fn students_update(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let original_id = get_required_str(params, "originalId")?;
    let candidate = parse_candidate(params)?;
    let marks: MarksCandidate = get_json_or_default(params, "marks")?;
    let student =
        students::update_student(conn, original_id.trim(), &candidate, &marks, today())?;
    Ok(json!({
        "studentId": student.id,
        "student": to_json(&student)?,
        "dashboard": to_json(&stats::load_dashboard(conn)?)?,
    }))
}

fn students_delete(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_str(params, "studentId")?;
    let deleted = students::delete_student(conn, id.trim())?;
    Ok(json!({
        "deleted": deleted,
        "dashboard": to_json(&stats::load_dashboard(conn)?)?,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(with_conn(state, req, |conn, _| students_list(conn))),
        "students.get" => Some(with_conn(state, req, students_get)),
        "students.create" => Some(with_conn(state, req, students_create)),
        "students.update" => Some(with_conn(state, req, students_update)),
        "students.delete" => Some(with_conn(state, req, students_delete)),
        _ => None,
    }
}
