use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub contact: String,
    pub course: String,
    pub gender: String,
    /// ISO calendar date, `YYYY-MM-DD`.
    pub dob: String,
    pub address: String,
}

/// Unvalidated student fields as submitted by the UI form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentCandidate {
    pub id: String,
    pub name: String,
    pub email: String,
    pub contact: String,
    pub course: String,
    pub gender: String,
    pub dob: String,
    pub address: String,
}

/// A single assessment score, always within `0..=Mark::MAX`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Mark(u8);

impl Mark {
    pub const MAX: u8 = 25;

    pub fn new(value: i64) -> Option<Self> {
        if (0..=i64::from(Self::MAX)).contains(&value) {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    /// Nearest valid mark, for values read back from storage.
    pub fn clamped(value: i64) -> Self {
        let clamped = value.clamp(0, i64::from(Self::MAX));
        if clamped != value {
            warn!(stored = value, used = clamped, "stored mark out of range");
        }
        Self(clamped as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredMark {
    Int(i64),
    Float(f64),
    Text(String),
}

// Older stores kept marks as numeric strings without range checks; blanks and
// junk read as 0, out-of-range values are clamped so one bad entry does not
// make the whole book unreadable.
impl<'de> Deserialize<'de> for Mark {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = match Option::<StoredMark>::deserialize(deserializer)? {
            None => return Ok(Mark::default()),
            Some(v) => v,
        };
        let value = match raw {
            StoredMark::Int(v) => v,
            StoredMark::Float(v) if v.is_finite() => v.round() as i64,
            StoredMark::Float(_) => 0,
            StoredMark::Text(s) => s.trim().parse::<i64>().unwrap_or(0),
        };
        Ok(Mark::clamped(value))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarksRecord {
    pub assignment1: Mark,
    pub assignment2: Mark,
    pub midsem1: Mark,
    pub midsem2: Mark,
}

impl MarksRecord {
    pub fn values(&self) -> [Mark; 4] {
        [self.assignment1, self.assignment2, self.midsem1, self.midsem2]
    }

    pub fn total(&self) -> u32 {
        self.values().iter().map(|m| u32::from(m.value())).sum()
    }

    pub fn average(&self) -> f64 {
        f64::from(self.total()) / self.values().len() as f64
    }
}

/// Raw mark inputs; each field may be missing, null, a number, or a string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarksCandidate {
    pub assignment1: Option<serde_json::Value>,
    pub assignment2: Option<serde_json::Value>,
    pub midsem1: Option<serde_json::Value>,
    pub midsem2: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub date: String,
    pub student_id: String,
    pub student_name: String,
    pub course: String,
    pub status: AttendanceStatus,
}

/// The students targeted by one attendance-marking action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cohort {
    All,
    Course(String),
}

impl Cohort {
    pub fn from_filter(course: Option<&str>) -> Self {
        match course.map(str::trim) {
            Some(c) if !c.is_empty() => Self::Course(c.to_string()),
            _ => Self::All,
        }
    }

    pub fn includes(&self, student: &Student) -> bool {
        match self {
            Self::All => true,
            Self::Course(c) => student.course == *c,
        }
    }

    pub fn course(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Course(c) => Some(c.as_str()),
        }
    }
}
