//! Results-sheet import.
//!
//! The sheet layout is fixed: rows 0-2 are decoration, row 3 names the
//! institution, row 4 the class, row 5 carries subject headers from column 5
//! up to the column before the general average, and every following row
//! except the last describes one student.

use std::path::Path;

use chrono::{Datelike, NaiveDate};
use log::{debug, info};

use crate::error::ImportError;
use crate::grid::{self, serial_to_iso_date, Cell};
use crate::models::{AcademicRecord, ImportMode, ImportOutcome, ImportedStudent, SubjectResult};
use crate::statistics::round2;

pub const MIN_ROWS: usize = 8;

const INSTITUTION_ROW: usize = 3;
const CLASS_ROW: usize = 4;
const SUBJECT_HEADER_ROW: usize = 5;
const FIRST_STUDENT_ROW: usize = 6;

const NAME_COL: usize = 1;
const DOB_COL: usize = 2;
const GENDER_COL: usize = 3;
const REPEATER_COL: usize = 4;
const FIRST_SUBJECT_COL: usize = 5;

/// Tokens of boilerplate that precede the class name in the class row.
const CLASS_PREFIX_TOKENS: usize = 5;

pub const DEFAULT_INSTITUTION: &str = "مؤسسة غير محددة";
pub const DEFAULT_CLASS: &str = "قسم غير محدد";
pub const CURRENT_TERM_LABEL: &str = "الفصل الحالي";
pub const ANNUAL_TERM_LABEL: &str = "المعدل السنوي";

const REPEATER_MARKERS: [&str; 2] = ["نعم", "معيد"];

pub fn record_labels(mode: ImportMode, today: NaiveDate) -> (String, &'static str) {
    match mode {
        ImportMode::Current => (today.year().to_string(), CURRENT_TERM_LABEL),
        ImportMode::Previous => ((today.year() - 1).to_string(), ANNUAL_TERM_LABEL),
    }
}

pub fn parse_grid(
    rows: &[Vec<Cell>],
    mode: ImportMode,
    today: NaiveDate,
) -> Result<ImportOutcome, ImportError> {
    if rows.len() < MIN_ROWS {
        return Err(ImportError::MalformedInput {
            rows: rows.len(),
            required: MIN_ROWS,
        });
    }

    let institution_name = extract_institution(rows.get(INSTITUTION_ROW));
    let class_name = extract_class_name(rows.get(CLASS_ROW));
    let subjects = extract_subjects(&rows[SUBJECT_HEADER_ROW]);
    let (year, term) = record_labels(mode, today);

    let mut students = Vec::new();
    for (index, row) in rows
        .iter()
        .enumerate()
        .take(rows.len() - 1)
        .skip(FIRST_STUDENT_ROW)
    {
        let Some(name) = row
            .get(NAME_COL)
            .filter(|cell| cell.is_present())
            .map(|cell| cell.as_text().trim().to_string())
            .filter(|name| !name.is_empty())
        else {
            debug!("skipping row {index}: no student name");
            continue;
        };

        students.push(ImportedStudent {
            name,
            grade: class_name.clone(),
            gender: row
                .get(GENDER_COL)
                .filter(|cell| cell.is_present())
                .map(|cell| cell.as_text().trim().to_string()),
            is_repeater: is_repeater(row.get(REPEATER_COL)),
            date_of_birth: date_of_birth(row.get(DOB_COL)),
            record: AcademicRecord {
                year: year.clone(),
                term: term.to_string(),
                subjects: subject_scores(row, &subjects),
                average: general_average(row),
            },
        });
    }

    info!(
        "parsed {} students for {} / {}",
        students.len(),
        institution_name,
        class_name
    );

    Ok(ImportOutcome {
        students,
        institution_name,
        class_name,
    })
}

pub fn import_csv_file(
    path: &Path,
    mode: ImportMode,
    today: NaiveDate,
) -> Result<ImportOutcome, ImportError> {
    let rows = grid::read_csv_grid(path)?;
    parse_grid(&rows, mode, today)
}

fn extract_institution(row: Option<&Vec<Cell>>) -> String {
    let Some(row) = row else {
        return DEFAULT_INSTITUTION.to_string();
    };
    row.iter()
        .find(|cell| cell.is_present() && cell.as_text().chars().count() > 3)
        .or_else(|| row.first().filter(|cell| cell.is_present()))
        .map(|cell| cell.as_text().trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_INSTITUTION.to_string())
}

fn extract_class_name(row: Option<&Vec<Cell>>) -> String {
    let raw = row
        .map(|row| {
            row.iter()
                .filter(|cell| cell.is_present())
                .map(Cell::as_text)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();
    let raw = raw.trim();

    let words: Vec<&str> = raw.split_whitespace().collect();
    if words.len() > CLASS_PREFIX_TOKENS {
        words[CLASS_PREFIX_TOKENS..].join(" ")
    } else if !raw.is_empty() {
        raw.to_string()
    } else {
        DEFAULT_CLASS.to_string()
    }
}

fn extract_subjects(header: &[Cell]) -> Vec<String> {
    let last_col = header.len().saturating_sub(1);
    header
        .iter()
        .take(last_col)
        .skip(FIRST_SUBJECT_COL)
        .filter(|cell| cell.is_present())
        .map(|cell| cell.as_text().trim().to_string())
        .collect()
}

fn date_of_birth(cell: Option<&Cell>) -> Option<String> {
    match cell.filter(|cell| cell.is_present())? {
        Cell::Number(serial) => {
            serial_to_iso_date(*serial).or_else(|| Some(Cell::Number(*serial).as_text()))
        }
        other => Some(other.as_text()),
    }
}

fn is_repeater(cell: Option<&Cell>) -> bool {
    let text = cell
        .filter(|cell| cell.is_present())
        .map(|cell| cell.as_text().trim().to_string())
        .unwrap_or_default();
    REPEATER_MARKERS.iter().any(|marker| text.contains(marker))
}

fn general_average(row: &[Cell]) -> f64 {
    row.last()
        .and_then(Cell::parse_float_prefix)
        .filter(|value| value.is_finite())
        .map_or(0.0, round2)
}

// Subject `i` always lives in column `5 + i`, even when the header row had
// gaps before it.
fn subject_scores(row: &[Cell], subjects: &[String]) -> Vec<SubjectResult> {
    subjects
        .iter()
        .enumerate()
        .filter_map(|(offset, subject)| {
            let score = row.get(FIRST_SUBJECT_COL + offset)?.as_number()?;
            Some(SubjectResult {
                subject: subject.clone(),
                score,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn text(value: &str) -> Cell {
        Cell::text(value)
    }

    fn num(value: f64) -> Cell {
        Cell::Number(value)
    }

    fn sample_grid() -> Vec<Vec<Cell>> {
        vec![
            vec![text("الجمهورية")],
            vec![],
            vec![],
            vec![Cell::Empty, text("ثا"), text("ثانوية ابن خلدون")],
            vec![text("كشف النقاط للفصل الأول القسم"), text("1 ع ت 2")],
            vec![
                text("الرقم"),
                text("اللقب والاسم"),
                text("تاريخ الميلاد"),
                text("الجنس"),
                text("الإعادة"),
                text("رياضيات"),
                text(" لغة عربية "),
                text("المعدل"),
            ],
            vec![
                num(1.0),
                text("  أحمد بن علي "),
                num(40179.0),
                text("ذكر"),
                text("لا"),
                num(12.0),
                num(8.5),
                num(10.256),
            ],
            vec![num(2.0), Cell::Empty, text("2010-01-01"), text("أنثى")],
            vec![
                num(3.0),
                text("سارة"),
                text("2009-05-04"),
                text("أنثى"),
                text("معيدة"),
                text("غائبة"),
                num(17.0),
                text("ممتاز"),
            ],
            vec![text("المجموع"), text("لا يحتسب"), num(1.0)],
        ]
    }

    #[test]
    fn rejects_short_sheets() {
        let rows = vec![vec![Cell::Empty]; 7];
        let err = parse_grid(&rows, ImportMode::Current, today()).unwrap_err();
        assert!(err.is_layout_problem());
    }

    #[test]
    fn reads_header_block() {
        let outcome = parse_grid(&sample_grid(), ImportMode::Current, today()).unwrap();
        assert_eq!(outcome.institution_name, "ثانوية ابن خلدون");
        assert_eq!(outcome.class_name, "1 ع ت 2");
    }

    #[test]
    fn skips_unnamed_rows_and_ignores_last_row() {
        let outcome = parse_grid(&sample_grid(), ImportMode::Current, today()).unwrap();
        let names: Vec<&str> = outcome.students.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["أحمد بن علي", "سارة"]);
    }

    #[test]
    fn parses_student_fields() {
        let outcome = parse_grid(&sample_grid(), ImportMode::Current, today()).unwrap();
        let first = &outcome.students[0];
        assert_eq!(first.date_of_birth.as_deref(), Some("2010-01-01"));
        assert_eq!(first.gender.as_deref(), Some("ذكر"));
        assert!(!first.is_repeater);
        assert_eq!(first.grade, "1 ع ت 2");
        assert_eq!(first.record.average, 10.26);
        assert_eq!(first.record.year, "2025");
        assert_eq!(first.record.term, CURRENT_TERM_LABEL);
        assert_eq!(
            first.record.subjects,
            vec![
                SubjectResult { subject: "رياضيات".into(), score: 12.0 },
                SubjectResult { subject: "لغة عربية".into(), score: 8.5 },
            ]
        );
    }

    #[test]
    fn tolerates_bad_scores_and_average() {
        let outcome = parse_grid(&sample_grid(), ImportMode::Previous, today()).unwrap();
        let second = &outcome.students[1];
        assert!(second.is_repeater);
        assert_eq!(second.date_of_birth.as_deref(), Some("2009-05-04"));
        assert_eq!(second.record.average, 0.0);
        assert_eq!(second.record.subjects.len(), 1);
        assert_eq!(second.record.subjects[0].subject, "لغة عربية");
        assert_eq!(second.record.year, "2024");
        assert_eq!(second.record.term, ANNUAL_TERM_LABEL);
    }

    #[test]
    fn falls_back_to_placeholders() {
        let mut rows = sample_grid();
        rows[3] = vec![];
        rows[4] = vec![Cell::Empty];
        let outcome = parse_grid(&rows, ImportMode::Current, today()).unwrap();
        assert_eq!(outcome.institution_name, DEFAULT_INSTITUTION);
        assert_eq!(outcome.class_name, DEFAULT_CLASS);
    }

    #[test]
    fn short_institution_row_uses_first_cell() {
        let mut rows = sample_grid();
        rows[3] = vec![text("ثا"), text("ب")];
        let outcome = parse_grid(&rows, ImportMode::Current, today()).unwrap();
        assert_eq!(outcome.institution_name, "ثا");
    }

    #[test]
    fn short_class_row_is_used_whole() {
        let mut rows = sample_grid();
        rows[4] = vec![text(" 3 متوسط 1 ")];
        let outcome = parse_grid(&rows, ImportMode::Current, today()).unwrap();
        assert_eq!(outcome.class_name, "3 متوسط 1");
    }

    #[test]
    fn subject_header_gaps_shift_columns() {
        let mut rows = sample_grid();
        rows[5][5] = Cell::Empty;
        let outcome = parse_grid(&rows, ImportMode::Current, today()).unwrap();
        let first = &outcome.students[0];
        assert_eq!(
            first.record.subjects,
            vec![SubjectResult { subject: "لغة عربية".into(), score: 12.0 }]
        );
    }

    #[test]
    fn averages_keep_their_stored_cents() {
        let mut rows = sample_grid();
        rows[6][7] = num(11.995);
        rows[8][7] = text("14.995");
        let outcome = parse_grid(&rows, ImportMode::Current, today()).unwrap();
        assert_eq!(outcome.students[0].record.average, 11.99);
        assert_eq!(outcome.students[1].record.average, 14.99);
    }
}
