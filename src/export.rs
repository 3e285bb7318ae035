//! Spreadsheet export: one CSV file per sheet.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use log::info;
use serde::Serialize;

use crate::models::{AnalysisSnapshot, SubjectAnalysis};
use crate::report::{EXEMPT_LABEL, NOT_COMPUTED};
use crate::statistics::to_fixed;

pub const SUMMARY_SHEET: &str = "summary.csv";
pub const SUBJECTS_SHEET: &str = "subjects.csv";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectRow {
    #[serde(rename = "المادة")]
    pub subject: String,
    #[serde(rename = "المعدل (المتوسط)")]
    pub average: String,
    #[serde(rename = "معدل الذكور")]
    pub male_average: String,
    #[serde(rename = "معدل الإناث")]
    pub female_average: String,
    #[serde(rename = "نسبة النجاح")]
    pub pass_rate: String,
    #[serde(rename = "الانحراف المعياري")]
    pub std_dev: String,
    #[serde(rename = "معامل التشتت")]
    pub coefficient_of_variation: String,
    #[serde(rename = "المقارنة")]
    pub comparison: String,
    #[serde(rename = "أكثر من 15")]
    pub above15: String,
    #[serde(rename = "10-15")]
    pub between10and15: String,
    #[serde(rename = "8-10")]
    pub between8and10: String,
    #[serde(rename = "أقل من 8")]
    pub below8: String,
}

impl From<&SubjectAnalysis> for SubjectRow {
    fn from(subject: &SubjectAnalysis) -> Self {
        let Some(s) = subject.computed() else {
            let dash = || NOT_COMPUTED.to_string();
            return SubjectRow {
                subject: subject.subject.clone(),
                average: EXEMPT_LABEL.to_string(),
                male_average: dash(),
                female_average: dash(),
                pass_rate: dash(),
                std_dev: dash(),
                coefficient_of_variation: dash(),
                comparison: EXEMPT_LABEL.to_string(),
                above15: dash(),
                between10and15: dash(),
                between8and10: dash(),
                below8: dash(),
            };
        };

        SubjectRow {
            subject: s.subject.clone(),
            average: to_fixed(s.average, 2),
            male_average: to_fixed(s.male_average, 2),
            female_average: to_fixed(s.female_average, 2),
            pass_rate: format!("{}%", to_fixed(s.pass_rate, 1)),
            std_dev: to_fixed(s.std_dev, 2),
            coefficient_of_variation: format!("{}%", to_fixed(s.coefficient_of_variation, 2)),
            comparison: s.comparison.label().to_string(),
            above15: s.above15.to_string(),
            between10and15: s.between10and15.to_string(),
            between8and10: s.between8and10.to_string(),
            below8: s.below8.to_string(),
        }
    }
}

pub fn subject_rows(snapshot: &AnalysisSnapshot) -> Vec<SubjectRow> {
    snapshot.subjects.iter().map(SubjectRow::from).collect()
}

/// Key/value rows of the summary sheet; blank rows separate sections.
pub fn summary_rows(snapshot: &AnalysisSnapshot, today: NaiveDate) -> Vec<Vec<String>> {
    let row = |cells: &[&str]| cells.iter().map(|c| c.to_string()).collect::<Vec<_>>();
    let gender_row = |label: &str, group: &crate::models::GenderBreakdown| {
        vec![
            label.to_string(),
            group.total.to_string(),
            to_fixed(group.average_gpa, 2),
            format!("{}%", to_fixed(group.pass_rate, 2)),
        ]
    };

    vec![
        row(&["تقرير تحليل النتائج المدرسية"]),
        vec!["تاريخ الاستخراج".to_string(), today.to_string()],
        vec![],
        row(&["الإحصائيات العامة"]),
        vec!["عدد التلاميذ".to_string(), snapshot.total_students.to_string()],
        vec![
            "نسبة النجاح العامة".to_string(),
            format!("{}%", to_fixed(snapshot.overall_pass_rate, 2)),
        ],
        vec!["معدل القسم العام".to_string(), to_fixed(snapshot.average_gpa, 2)],
        vec![],
        row(&["تحليل حسب الجنس", "العدد", "المعدل", "نسبة النجاح"]),
        gender_row("إناث", &snapshot.females),
        gender_row("ذكور", &snapshot.males),
    ]
}

pub fn write_workbook(
    dir: &Path,
    snapshot: &AnalysisSnapshot,
    today: NaiveDate,
) -> anyhow::Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;

    let summary_path = dir.join(SUMMARY_SHEET);
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(&summary_path)
        .with_context(|| format!("failed to open {}", summary_path.display()))?;
    for row in summary_rows(snapshot, today) {
        writer.write_record(&row)?;
    }
    writer.flush()?;

    let subjects_path = dir.join(SUBJECTS_SHEET);
    let mut writer = csv::Writer::from_path(&subjects_path)
        .with_context(|| format!("failed to open {}", subjects_path.display()))?;
    for row in subject_rows(snapshot) {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(
        "exported {} subjects to {}",
        snapshot.subjects.len(),
        dir.display()
    );
    Ok((summary_path, subjects_path))
}
