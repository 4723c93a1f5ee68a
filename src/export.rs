use crate::attendance::AttendanceReport;
use crate::validate::parse_iso_date;
use anyhow::Context;
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};

const SHEET_NAME: &str = "Attendance Report";
const COLUMN_WIDTHS: [f64; 5] = [12.0, 25.0, 20.0, 10.0, 12.0];

/// `YYYY-MM-DD` as `dd/mm/yyyy`; unparsable input is shown unchanged.
pub fn display_date(iso: &str) -> String {
    parse_iso_date(iso)
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| iso.to_string())
}

/// Writes the report into `out_dir` under its own filename and returns the path.
pub fn write_attendance_xlsx(report: &AttendanceReport, out_dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create directory {}", out_dir.to_string_lossy()))?;
    let out_path = out_dir.join(&report.filename);

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }

    let course_label = report.course.as_deref().unwrap_or("All Courses");
    let date_label = report
        .date
        .as_deref()
        .map(display_date)
        .unwrap_or_else(|| "All Dates".to_string());

    sheet.write_string_with_format(0, 0, SHEET_NAME, &bold)?;
    sheet.write_string(1, 0, &format!("Course: {}", course_label))?;
    sheet.write_string(2, 0, &format!("Date: {}", date_label))?;

    let headers = ["Student ID", "Student Name", "Course", "Status", "Date"];
    for (col, h) in headers.iter().enumerate() {
        sheet.write_string_with_format(4, col as u16, *h, &bold)?;
    }

    let mut row: u32 = 5;
    for rec in &report.records {
        sheet.write_string(row, 0, &rec.student_id)?;
        sheet.write_string(row, 1, &rec.student_name)?;
        sheet.write_string(row, 2, &rec.course)?;
        sheet.write_string(row, 3, rec.status.label())?;
        sheet.write_string(row, 4, &display_date(&rec.date))?;
        row += 1;
    }

    row += 1;
    let s = &report.summary;
    sheet.write_string_with_format(row, 0, "Summary", &bold)?;
    sheet.write_string(row + 1, 0, "Total Students")?;
    sheet.write_number(row + 1, 1, s.total as f64)?;
    sheet.write_string(row + 2, 0, "Present")?;
    sheet.write_number(row + 2, 1, s.present as f64)?;
    sheet.write_string(row + 3, 0, "Absent")?;
    sheet.write_number(row + 3, 1, s.absent as f64)?;
    sheet.write_string(row + 4, 0, "Attendance Rate")?;
    sheet.write_string(row + 4, 1, &format!("{}%", s.rate))?;

    workbook
        .save(&out_path)
        .with_context(|| format!("failed to write {}", out_path.to_string_lossy()))?;
    Ok(out_path)
}
