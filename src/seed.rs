//! Sample data for a fresh workspace.

use crate::error::Result;
use crate::model::{AttendanceRecord, AttendanceStatus, Mark, MarksRecord, Student};
use crate::store::{self, MarksBook};
use chrono::{Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::Connection;
use tracing::info;

pub const SAMPLE_STUDENT_COUNT: u32 = 50;
pub const SAMPLE_ATTENDANCE_DAYS: i64 = 5;
pub const SAMPLE_PRESENT_PROBABILITY: f64 = 0.8;

pub const COURSES: [&str; 3] = [
    "Computer Science",
    "Electrical Engineering",
    "Mechanical Engineering",
];
const GENDERS: [&str; 2] = ["male", "female"];
const MALE_FIRST_NAMES: [&str; 5] = ["Harpreet", "Gurpreet", "Manpreet", "Jaspreet", "Sukhpreet"];
const FEMALE_FIRST_NAMES: [&str; 5] = ["Simran", "Harleen", "Navpreet", "Jasmeet", "Kiranpreet"];
const LAST_NAMES: [&str; 5] = ["Singh", "Kaur", "Sharma", "Kumar", "Verma"];

const PUNJAB_STREETS: [&str; 5] = [
    "Mall Road, Amritsar",
    "Lawrence Road, Amritsar",
    "GT Road, Amritsar",
    "Queens Road, Amritsar",
    "Hall Bazaar, Amritsar",
];
const BIHAR_CITIES: [&str; 5] = ["Patna", "Gaya", "Muzaffarpur", "Bhagalpur", "Darbhanga"];
const OTHER_STATES: [&str; 5] = [
    "Delhi",
    "Mumbai, Maharashtra",
    "Bangalore, Karnataka",
    "Chennai, Tamil Nadu",
    "Kolkata, West Bengal",
];

#[derive(Debug, Clone)]
pub struct SampleData {
    pub students: Vec<Student>,
    pub marks: MarksBook,
    pub attendance: Vec<AttendanceRecord>,
}

fn pick<'a, R: Rng + ?Sized>(pool: &[&'a str], rng: &mut R) -> &'a str {
    pool.choose(rng).copied().unwrap_or_default()
}

/// Address banded on the last three characters of the id: 1-20 Punjab,
/// 21-35 Bihar, everything else (including non-numeric ids) another state.
pub fn generate_address<R: Rng + ?Sized>(student_id: &str, rng: &mut R) -> String {
    let suffix: String = {
        let chars: Vec<char> = student_id.chars().collect();
        chars[chars.len().saturating_sub(3)..].iter().collect()
    };
    let house: u32 = rng.gen_range(1..=100);
    match suffix.parse::<u32>().ok() {
        Some(n) if n <= 20 => format!("{}, {}, Punjab", house, pick(&PUNJAB_STREETS, rng)),
        Some(n) if n <= 35 => format!("{}, {}, Bihar", house, pick(&BIHAR_CITIES, rng)),
        _ => format!("{}, {}", house, pick(&OTHER_STATES, rng)),
    }
}

pub fn sample_students<R: Rng + ?Sized>(rng: &mut R) -> Vec<Student> {
    let mut out = Vec::with_capacity(SAMPLE_STUDENT_COUNT as usize);
    for i in 1..=SAMPLE_STUDENT_COUNT {
        let id = format!("2023{:03}", i);
        let course = pick(&COURSES, rng);
        let gender = pick(&GENDERS, rng);
        let first = if gender == "male" {
            pick(&MALE_FIRST_NAMES, rng)
        } else {
            pick(&FEMALE_FIRST_NAMES, rng)
        };
        let last = pick(&LAST_NAMES, rng);
        let phone: u64 = rng.gen_range(1_000_000_000..=9_999_999_999);
        let dob = format!(
            "200{}-{:02}-{:02}",
            rng.gen_range(0..5),
            rng.gen_range(1..=12),
            rng.gen_range(1..=28)
        );
        let address = generate_address(&id, rng);
        out.push(Student {
            email: format!("{}.{}@example.com", first, last).to_lowercase(),
            name: format!("{} {}", first, last),
            contact: format!("+91{}", phone),
            course: course.to_string(),
            gender: gender.to_string(),
            dob,
            address,
            id,
        });
    }
    out
}

fn sample_mark<R: Rng + ?Sized>(rng: &mut R) -> Mark {
    Mark::new(rng.gen_range(20..=25)).unwrap_or_default()
}

pub fn sample_marks<R: Rng + ?Sized>(students: &[Student], rng: &mut R) -> MarksBook {
    let mut book = MarksBook::new();
    for s in students {
        let rec = MarksRecord {
            assignment1: sample_mark(rng),
            assignment2: sample_mark(rng),
            midsem1: sample_mark(rng),
            midsem2: sample_mark(rng),
        };
        book.insert(s.id.clone(), rec);
    }
    book
}

/// One record per student for `today` and each of the previous four days.
pub fn sample_attendance<R: Rng + ?Sized>(
    students: &[Student],
    today: NaiveDate,
    rng: &mut R,
) -> Vec<AttendanceRecord> {
    let mut out = Vec::with_capacity(students.len() * SAMPLE_ATTENDANCE_DAYS as usize);
    for back in 0..SAMPLE_ATTENDANCE_DAYS {
        let date = (today - Duration::days(back)).format("%Y-%m-%d").to_string();
        for s in students {
            let status = if rng.gen_bool(SAMPLE_PRESENT_PROBABILITY) {
                AttendanceStatus::Present
            } else {
                AttendanceStatus::Absent
            };
            out.push(AttendanceRecord {
                date: date.clone(),
                student_id: s.id.clone(),
                student_name: s.name.clone(),
                course: s.course.clone(),
                status,
            });
        }
    }
    out
}

pub fn generate<R: Rng + ?Sized>(today: NaiveDate, rng: &mut R) -> SampleData {
    let students = sample_students(rng);
    let marks = sample_marks(&students, rng);
    let attendance = sample_attendance(&students, today, rng);
    SampleData {
        students,
        marks,
        attendance,
    }
}

/// Writes sample data when the Students collection is empty.
/// Returns whether anything was written.
pub fn seed_if_empty<R: Rng + ?Sized>(
    conn: &Connection,
    today: NaiveDate,
    rng: &mut R,
) -> Result<bool> {
    if !store::load_students(conn)?.is_empty() {
        return Ok(false);
    }
    let data = generate(today, rng);
    let tx = conn.unchecked_transaction()?;
    store::save_students(&tx, &data.students)?;
    store::save_marks(&tx, &data.marks)?;
    store::save_attendance(&tx, &data.attendance)?;
    tx.commit()?;
    info!(
        students = data.students.len(),
        attendance = data.attendance.len(),
        "seeded empty workspace with sample data"
    );
    Ok(true)
}
