use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_recordbookd");
    let mut child = Command::new(exe)
        .env_remove("RECORDBOOK_WORKSPACE")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn recordbookd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn error_code(value: &serde_json::Value) -> Option<String> {
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn as_array(value: &serde_json::Value, key: &str) -> Vec<serde_json::Value> {
    value
        .get(key)
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default()
}

#[test]
fn empty_workspace_is_seeded_once() {
    let workspace = temp_dir("recordbook-seed");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy(), "seedIfEmpty": true }),
    );
    assert_eq!(opened.get("seeded").and_then(|v| v.as_bool()), Some(true));

    let students = request_ok(&mut stdin, &mut reader, "2", "students.list", json!({}));
    let students = as_array(&students, "students");
    assert_eq!(students.len(), 50);
    for s in &students {
        let contact = s.get("contact").and_then(|v| v.as_str()).unwrap_or("");
        assert!(contact.starts_with("+91") && contact.len() == 13, "{}", contact);
    }

    let attendance = request_ok(&mut stdin, &mut reader, "3", "attendance.list", json!({}));
    assert_eq!(as_array(&attendance, "records").len(), 250);

    let dash = request_ok(&mut stdin, &mut reader, "4", "dashboard.get", json!({}));
    assert_eq!(dash.get("totalStudents").and_then(|v| v.as_u64()), Some(50));
    let present = dash.get("present").and_then(|v| v.as_u64()).unwrap_or(0);
    let absent = dash.get("absent").and_then(|v| v.as_u64()).unwrap_or(0);
    assert_eq!(present + absent, 250);
    let course_total: u64 = dash
        .get("courseDistribution")
        .and_then(|v| v.as_object())
        .map(|m| m.values().filter_map(|v| v.as_u64()).sum())
        .unwrap_or(0);
    assert_eq!(course_total, 50);
    assert_eq!(
        dash.get("monthlyTrend")
            .and_then(|t| t.get("placeholder"))
            .and_then(|v| v.as_bool()),
        Some(true)
    );

    drop(stdin);
    let _ = child.wait();

    // Reopening a populated workspace leaves it alone.
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let reopened = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy(), "seedIfEmpty": true }),
    );
    assert_eq!(reopened.get("seeded").and_then(|v| v.as_bool()), Some(false));
    let students = request_ok(&mut stdin, &mut reader, "6", "students.list", json!({}));
    assert_eq!(as_array(&students, "students").len(), 50);

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn profile_summarises_marks_and_attendance() {
    let workspace = temp_dir("recordbook-profile");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy(), "seedIfEmpty": false }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        json!({
            "student": {
                "id": "P1",
                "name": "Harleen Kaur",
                "email": "harleen.kaur@example.com",
                "contact": "+91 98140 12345",
                "course": "Computer Science",
                "gender": "female",
                "dob": "2004-01-30",
                "address": ""
            },
            "marks": { "assignment1": 20, "assignment2": 21, "midsem1": 22, "midsem2": 23 }
        }),
    );
    for (i, (date, status)) in [
        ("2024-03-01", "present"),
        ("2024-03-02", "absent"),
        ("2024-03-03", "present"),
        ("2024-03-04", "present"),
    ]
    .iter()
    .enumerate()
    {
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            &format!("mark-{}", i),
            "attendance.mark",
            json!({ "date": date, "statuses": { "P1": status } }),
        );
    }

    let profile = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "profile.get",
        json!({ "studentId": "P1" }),
    );
    assert_eq!(profile.get("totalMarks").and_then(|v| v.as_u64()), Some(86));
    assert_eq!(profile.get("averageMark").and_then(|v| v.as_f64()), Some(21.5));
    assert_eq!(profile.get("totalClasses").and_then(|v| v.as_u64()), Some(4));
    assert_eq!(profile.get("present").and_then(|v| v.as_u64()), Some(3));
    assert_eq!(profile.get("attendanceRate").and_then(|v| v.as_u64()), Some(75));
    assert_eq!(profile.get("absentRate").and_then(|v| v.as_u64()), Some(25));
    let address = profile
        .get("student")
        .and_then(|s| s.get("address"))
        .and_then(|v| v.as_str())
        .unwrap_or("");
    assert!(!address.is_empty());

    let missing = request(
        &mut stdin,
        &mut reader,
        "4",
        "profile.get",
        json!({ "studentId": "NOPE" }),
    );
    assert_eq!(error_code(&missing).as_deref(), Some("not_found"));

    let blank = request(&mut stdin, &mut reader, "5", "profile.get", json!({ "studentId": " " }));
    assert_eq!(error_code(&blank).as_deref(), Some("bad_params"));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
