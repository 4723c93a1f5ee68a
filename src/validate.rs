use crate::error::{RecordsError, Result};
use crate::model::{Mark, MarksCandidate, MarksRecord, Student, StudentCandidate};
use crate::seed;
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

pub const MSG_REQUIRED: &str = "Please fill all required fields";
pub const MSG_CONTACT: &str = "Please enter a valid 10-digit contact number";
pub const MSG_EMAIL: &str = "Please enter a valid email address";
pub const MSG_DOB: &str = "Please enter a valid date of birth";
pub const MSG_MARKS: &str = "Marks must be whole numbers between 0 and 25";

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex");
}

pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Canonicalises a phone number to `+91XXXXXXXXXX` when it has the right
/// number of digits; anything else comes back as bare digits.
pub fn format_phone_number(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 12 && digits.starts_with("91") {
        return format!("+{}", digits);
    }
    if digits.len() == 10 {
        return format!("+91{}", digits);
    }
    digits
}

fn contact_digits(contact: &str) -> usize {
    contact
        .strip_prefix("+91")
        .unwrap_or(contact)
        .chars()
        .filter(|c| c.is_ascii_digit())
        .count()
}

/// Checks a submitted student and returns the canonical record.
///
/// Rules run in order and the first failure is reported: required fields,
/// contact digits, email shape, birth date strictly before `today`.
pub fn validate_student(candidate: &StudentCandidate, today: NaiveDate) -> Result<Student> {
    let id = candidate.id.trim().to_string();
    let address = match candidate.address.trim() {
        "" if !id.is_empty() => seed::generate_address(&id, &mut rand::thread_rng()),
        a => a.to_string(),
    };
    let student = Student {
        id,
        name: candidate.name.trim().to_string(),
        email: candidate.email.trim().to_string(),
        contact: format_phone_number(candidate.contact.trim()),
        course: candidate.course.trim().to_string(),
        gender: candidate.gender.trim().to_string(),
        dob: candidate.dob.trim().to_string(),
        address,
    };

    let required = [
        &student.id,
        &student.name,
        &student.email,
        &student.contact,
        &student.course,
        &student.gender,
        &student.dob,
        &student.address,
    ];
    if required.iter().any(|f| f.is_empty()) {
        return Err(RecordsError::validation(MSG_REQUIRED));
    }

    if contact_digits(&student.contact) != 10 {
        return Err(RecordsError::validation(MSG_CONTACT));
    }

    if !EMAIL_RE.is_match(&student.email) {
        return Err(RecordsError::validation(MSG_EMAIL));
    }

    match parse_iso_date(&student.dob) {
        Some(dob) if dob < today => {}
        _ => return Err(RecordsError::validation(MSG_DOB)),
    }

    Ok(student)
}

fn parse_mark(raw: Option<&serde_json::Value>) -> Result<Mark> {
    let value = match raw {
        None | Some(serde_json::Value::Null) => return Ok(Mark::default()),
        Some(serde_json::Value::Number(n)) => match n.as_i64() {
            Some(v) => v,
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 => f as i64,
                _ => return Err(RecordsError::validation(MSG_MARKS)),
            },
        },
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => return Ok(Mark::default()),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| RecordsError::validation(MSG_MARKS))?,
        Some(_) => return Err(RecordsError::validation(MSG_MARKS)),
    };
    Mark::new(value).ok_or_else(|| RecordsError::validation(MSG_MARKS))
}

/// Blank marks default to 0; anything else must be a whole number in range.
pub fn validate_marks(candidate: &MarksCandidate) -> Result<MarksRecord> {
    Ok(MarksRecord {
        assignment1: parse_mark(candidate.assignment1.as_ref())?,
        assignment2: parse_mark(candidate.assignment2.as_ref())?,
        midsem1: parse_mark(candidate.midsem1.as_ref())?,
        midsem2: parse_mark(candidate.midsem2.as_ref())?,
    })
}
