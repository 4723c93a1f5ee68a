//! Typed access to the three persisted collections.
//!
//! Each collection is one JSON document under a fixed key in `kv_store`,
//! rewritten in full on every save.

use crate::db;
use crate::error::{RecordsError, Result};
use crate::model::{AttendanceRecord, MarksRecord, Student};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

pub type MarksBook = BTreeMap<String, MarksRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Students,
    Attendance,
    Marks,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Self::Students, Self::Attendance, Self::Marks];

    pub fn key(self) -> &'static str {
        match self {
            Self::Students => "epr_students",
            Self::Attendance => "epr_attendance",
            Self::Marks => "epr_marks",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Attendance => "attendance",
            Self::Marks => "marks",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(raw.trim()))
    }

    fn empty_value(self) -> &'static str {
        match self {
            Self::Students | Self::Attendance => "[]",
            Self::Marks => "{}",
        }
    }
}

fn load<T>(conn: &Connection, collection: Collection) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(text) = db::kv_get(conn, collection.key())? else {
        return Ok(T::default());
    };
    serde_json::from_str(&text).map_err(|source| RecordsError::StorageCorrupt {
        collection: collection.name(),
        source,
    })
}

fn save<T>(conn: &Connection, collection: Collection, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let text = serde_json::to_string(value).map_err(|source| RecordsError::Encode {
        collection: collection.name(),
        source,
    })?;
    db::kv_set(conn, collection.key(), &text)?;
    Ok(())
}

pub fn load_students(conn: &Connection) -> Result<Vec<Student>> {
    load(conn, Collection::Students)
}

pub fn save_students(conn: &Connection, students: &[Student]) -> Result<()> {
    save(conn, Collection::Students, students)
}

pub fn load_attendance(conn: &Connection) -> Result<Vec<AttendanceRecord>> {
    load(conn, Collection::Attendance)
}

pub fn save_attendance(conn: &Connection, records: &[AttendanceRecord]) -> Result<()> {
    save(conn, Collection::Attendance, records)
}

pub fn load_marks(conn: &Connection) -> Result<MarksBook> {
    load(conn, Collection::Marks)
}

pub fn save_marks(conn: &Connection, marks: &MarksBook) -> Result<()> {
    save(conn, Collection::Marks, marks)
}

/// Saves students and marks together so the two never disagree on disk.
pub fn save_students_and_marks(
    conn: &Connection,
    students: &[Student],
    marks: &MarksBook,
) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    save_students(&tx, students)?;
    save_marks(&tx, marks)?;
    tx.commit()?;
    Ok(())
}

/// Overwrites a collection with its empty value, discarding whatever was stored.
pub fn reset(conn: &Connection, collection: Collection) -> Result<()> {
    db::kv_set(conn, collection.key(), collection.empty_value())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttendanceStatus, Mark};

    fn mem_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("mem");
        db::init_schema(&conn).expect("schema");
        conn
    }

    #[test]
    fn absent_collections_load_as_empty() {
        let conn = mem_conn();
        assert!(load_students(&conn).expect("students").is_empty());
        assert!(load_attendance(&conn).expect("attendance").is_empty());
        assert!(load_marks(&conn).expect("marks").is_empty());
    }

    #[test]
    fn corrupt_text_is_reported_with_collection_name() {
        let conn = mem_conn();
        db::kv_set(&conn, Collection::Attendance.key(), "[{not json").expect("set");
        let err = load_attendance(&conn).expect_err("corrupt");
        assert_eq!(err.code(), "storage_corrupt");
        assert!(matches!(
            err,
            RecordsError::StorageCorrupt {
                collection: "attendance",
                ..
            }
        ));

        reset(&conn, Collection::Attendance).expect("reset");
        assert!(load_attendance(&conn).expect("attendance").is_empty());
    }

    #[test]
    fn legacy_string_marks_load() {
        let conn = mem_conn();
        db::kv_set(
            &conn,
            Collection::Marks.key(),
            r#"{"2023001":{"assignment1":"20","assignment2":"22","midsem1":"19","midsem2":"21"}}"#,
        )
        .expect("set");
        let marks = load_marks(&conn).expect("marks");
        assert_eq!(marks["2023001"].total(), 82);
    }

    #[test]
    fn one_out_of_range_mark_does_not_block_the_book() {
        let conn = mem_conn();
        db::kv_set(
            &conn,
            Collection::Marks.key(),
            r#"{"2023001":{"assignment1":"26","assignment2":20,"midsem1":20,"midsem2":20},
                "2023002":{"assignment1":21,"assignment2":22,"midsem1":23,"midsem2":24}}"#,
        )
        .expect("set");
        let marks = load_marks(&conn).expect("marks");
        assert_eq!(marks["2023001"].assignment1.value(), 25);
        assert_eq!(marks["2023001"].total(), 85);
        assert_eq!(marks["2023002"].total(), 90);
    }

    #[test]
    fn save_round_trips_attendance() {
        let conn = mem_conn();
        let rec = AttendanceRecord {
            date: "2024-03-01".into(),
            student_id: "2023001".into(),
            student_name: "Simran Kaur".into(),
            course: "Computer Science".into(),
            status: AttendanceStatus::Absent,
        };
        save_attendance(&conn, std::slice::from_ref(&rec)).expect("save");
        let raw = db::kv_get(&conn, Collection::Attendance.key())
            .expect("get")
            .expect("present");
        assert!(raw.contains("\"studentId\":\"2023001\""));
        assert!(raw.contains("\"status\":\"absent\""));
        assert_eq!(load_attendance(&conn).expect("load"), vec![rec]);

        let mut book = MarksBook::new();
        book.insert(
            "2023001".into(),
            MarksRecord {
                assignment1: Mark::new(25).expect("mark"),
                ..MarksRecord::default()
            },
        );
        save_students_and_marks(&conn, &[], &book).expect("save both");
        assert_eq!(load_marks(&conn).expect("marks"), book);
    }

    #[test]
    fn collection_names_parse() {
        assert_eq!(Collection::parse("Students"), Some(Collection::Students));
        assert_eq!(Collection::parse("marks"), Some(Collection::Marks));
        assert_eq!(Collection::parse("grades"), None);
    }
}
