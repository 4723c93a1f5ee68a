use crate::error::{RecordsError, Result};
use crate::model::{MarksCandidate, MarksRecord, Student, StudentCandidate};
use crate::store;
use crate::validate;
use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::{debug, info};

pub fn list_students(conn: &Connection) -> Result<Vec<Student>> {
    store::load_students(conn)
}

pub fn find_student(conn: &Connection, id: &str) -> Result<Option<Student>> {
    Ok(store::load_students(conn)?.into_iter().find(|s| s.id == id))
}

/// The student plus their marks; marks default to zeros when none are stored.
pub fn get_student_with_marks(conn: &Connection, id: &str) -> Result<(Student, MarksRecord)> {
    let student =
        find_student(conn, id)?.ok_or_else(|| RecordsError::NotFound(id.to_string()))?;
    let marks = store::load_marks(conn)?
        .get(id)
        .copied()
        .unwrap_or_default();
    Ok((student, marks))
}

pub fn add_student(
    conn: &Connection,
    candidate: &StudentCandidate,
    marks: &MarksCandidate,
    today: NaiveDate,
) -> Result<Student> {
    let student = validate::validate_student(candidate, today)?;
    let marks = validate::validate_marks(marks)?;

    let mut students = store::load_students(conn)?;
    let mut book = store::load_marks(conn)?;
    if students.iter().any(|s| s.id == student.id) {
        return Err(RecordsError::DuplicateId(student.id));
    }

    students.push(student.clone());
    book.insert(student.id.clone(), marks);
    store::save_students_and_marks(conn, &students, &book)?;

    info!(student_id = %student.id, total = students.len(), "student added");
    Ok(student)
}

pub fn update_student(
    conn: &Connection,
    original_id: &str,
    candidate: &StudentCandidate,
    marks: &MarksCandidate,
    today: NaiveDate,
) -> Result<Student> {
    let student = validate::validate_student(candidate, today)?;
    let marks = validate::validate_marks(marks)?;

    let mut students = store::load_students(conn)?;
    let mut book = store::load_marks(conn)?;

    let Some(idx) = students.iter().position(|s| s.id == original_id) else {
        return Err(RecordsError::NotFound(original_id.to_string()));
    };
    if student.id != original_id && students.iter().any(|s| s.id == student.id) {
        return Err(RecordsError::DuplicateId(student.id));
    }

    students[idx] = student.clone();
    book.remove(original_id);
    book.insert(student.id.clone(), marks);
    store::save_students_and_marks(conn, &students, &book)?;

    if student.id != original_id {
        info!(from = %original_id, to = %student.id, "student id changed");
    } else {
        debug!(student_id = %student.id, "student updated");
    }
    Ok(student)
}

/// Removes the student and their marks. Returns false when the id is unknown.
pub fn delete_student(conn: &Connection, id: &str) -> Result<bool> {
    let mut students = store::load_students(conn)?;
    let mut book = store::load_marks(conn)?;

    let before = students.len();
    students.retain(|s| s.id != id);
    let removed = students.len() != before;
    let had_marks = book.remove(id).is_some();
    if !removed && !had_marks {
        return Ok(false);
    }

    store::save_students_and_marks(conn, &students, &book)?;
    info!(student_id = %id, removed, "student deleted");
    Ok(removed)
}
