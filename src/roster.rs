use std::path::Path;

use anyhow::{bail, Context};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    AcademicRecord, AttendanceRecord, AttendanceStatus, BehaviorLog, ImportOutcome,
    InstitutionSettings, InterviewRecord, InterviewType, Severity, StudentRecord, SubjectResult,
};

/// Everything the counselor keeps: the same layout as the JSON backup file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Roster {
    pub students: Vec<StudentRecord>,
    pub logs: Vec<BehaviorLog>,
    pub settings: InstitutionSettings,
    pub export_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub created: usize,
    pub updated: usize,
}

impl Roster {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            debug!("no roster at {}, starting empty", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read roster {}", path.display()))?;
        let roster: Roster = serde_json::from_str(&raw)
            .with_context(|| format!("roster {} is not valid JSON", path.display()))?;
        debug!(
            "loaded {} students and {} logs from {}",
            roster.students.len(),
            roster.logs.len(),
            path.display()
        );
        Ok(roster)
    }

    pub fn save(&mut self, path: &Path) -> anyhow::Result<()> {
        self.export_date = Some(Utc::now().naive_utc());
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write roster {}", path.display()))?;
        info!("roster saved to {}", path.display());
        Ok(())
    }

    pub fn find_student(&self, name: &str) -> Option<&StudentRecord> {
        self.students.iter().find(|s| s.name == name)
    }

    fn student_mut(&mut self, name: &str) -> anyhow::Result<&mut StudentRecord> {
        match self.students.iter_mut().find(|s| s.name == name) {
            Some(student) => Ok(student),
            None => bail!("no student named {name:?} in the roster"),
        }
    }

    /// Folds an import into the roster. Students are matched by name and
    /// class; a match gets the imported record prepended so that
    /// `academic_records[0]` stays the newest.
    pub fn merge_import(&mut self, outcome: ImportOutcome) -> MergeSummary {
        let mut summary = MergeSummary::default();

        if self.settings.institution_name.is_empty() {
            self.settings.institution_name = outcome.institution_name.clone();
        }

        for imported in outcome.students {
            let existing = self
                .students
                .iter_mut()
                .find(|s| s.name == imported.name && s.grade == imported.grade);

            match existing {
                Some(student) => {
                    student.academic_records.insert(0, imported.record);
                    if imported.gender.is_some() {
                        student.gender = imported.gender;
                    }
                    if imported.date_of_birth.is_some() {
                        student.date_of_birth = imported.date_of_birth;
                    }
                    student.is_repeater = imported.is_repeater;
                    summary.updated += 1;
                }
                None => {
                    let mut student = StudentRecord::new(imported.name, imported.grade);
                    student.gender = imported.gender;
                    student.date_of_birth = imported.date_of_birth;
                    student.is_repeater = imported.is_repeater;
                    student.academic_records.push(imported.record);
                    self.students.push(student);
                    summary.created += 1;
                }
            }
        }

        info!(
            "merged import for {}: {} created, {} updated",
            outcome.class_name, summary.created, summary.updated
        );
        summary
    }

    pub fn add_log(
        &mut self,
        student_name: &str,
        points: i32,
        description: &str,
        severity: Option<Severity>,
        timestamp: NaiveDateTime,
    ) -> anyhow::Result<&BehaviorLog> {
        let student = self.student_mut(student_name)?;
        student.total_points += points;
        let student_id = student.id;

        self.logs.push(BehaviorLog {
            id: Uuid::new_v4(),
            student_id,
            points,
            description: description.to_string(),
            timestamp,
            severity,
        });
        self.logs.last().context("log vanished after push")
    }

    pub fn add_interview(
        &mut self,
        student_name: &str,
        interview: InterviewRecord,
    ) -> anyhow::Result<()> {
        self.student_mut(student_name)?.interviews.push(interview);
        Ok(())
    }

    pub fn add_attendance(
        &mut self,
        student_name: &str,
        record: AttendanceRecord,
    ) -> anyhow::Result<()> {
        self.student_mut(student_name)?
            .attendance_records
            .push(record);
        Ok(())
    }

    /// Rebuilds every running point total from the log history.
    pub fn recompute_points(&mut self) {
        for student in &mut self.students {
            student.total_points = self
                .logs
                .iter()
                .filter(|log| log.student_id == student.id)
                .map(|log| log.points)
                .sum();
        }
    }
}

pub fn seed(today: NaiveDate) -> anyhow::Result<Roster> {
    let year = today.format("%Y").to_string();
    let record = |average: f64, scores: &[(&str, f64)]| AcademicRecord {
        year: year.clone(),
        term: "الفصل الحالي".to_string(),
        subjects: scores
            .iter()
            .map(|(subject, score)| SubjectResult {
                subject: subject.to_string(),
                score: *score,
            })
            .collect(),
        average,
    };

    let students = vec![
        (
            "أمين بوزيد",
            "ذكر",
            record(
                9.12,
                &[("رياضيات", 7.5), ("لغة عربية", 11.0), ("فيزياء", 8.25), ("تربية موسيقية", 0.0)],
            ),
        ),
        (
            "ياسمين حداد",
            "أنثى",
            record(
                16.4,
                &[("رياضيات", 17.0), ("لغة عربية", 15.5), ("فيزياء", 16.75), ("تربية موسيقية", 0.0)],
            ),
        ),
        (
            "رياض مزياني",
            "ذكر",
            record(
                12.3,
                &[("رياضيات", 12.0), ("لغة عربية", 13.5), ("فيزياء", 11.0), ("تربية موسيقية", 0.0)],
            ),
        ),
    ];

    let mut roster = Roster {
        settings: InstitutionSettings {
            institution_name: "ثانوية الأمير عبد القادر".to_string(),
            counselor_name: "مستشار التوجيه".to_string(),
            counselor_role: "مستشار التوجيه والإرشاد المدرسي".to_string(),
            logo_url: None,
        },
        ..Roster::default()
    };

    for (name, gender, academic) in students {
        let mut student = StudentRecord::new(name, "1 ج م ع ت 2");
        student.gender = Some(gender.to_string());
        student.academic_records.push(academic);
        roster.students.push(student);
    }

    let at = |days_ago: i64| -> anyhow::Result<NaiveDateTime> {
        (today - chrono::Duration::days(days_ago))
            .and_hms_opt(10, 0, 0)
            .context("invalid seed time")
    };
    roster.add_log("أمين بوزيد", -4, "شجار في الساحة", Some(Severity::High), at(12)?)?;
    roster.add_log("أمين بوزيد", -3, "تأخر متكرر", Some(Severity::Low), at(3)?)?;
    roster.add_log("ياسمين حداد", 5, "مشاركة في مسابقة علمية", None, at(7)?)?;
    roster.add_log("رياض مزياني", 2, "مساعدة الزملاء", None, at(2)?)?;

    roster.add_interview(
        "أمين بوزيد",
        InterviewRecord {
            id: Uuid::new_v4(),
            date: today - chrono::Duration::days(5),
            interview_type: InterviewType::Student,
            title: "قلق من الامتحانات".to_string(),
            proceedings: "حوار فردي حول ضغط الامتحانات".to_string(),
            assessment: "توتر ملحوظ قبل الفروض".to_string(),
            actions: "تمارين تنظيم الوقت".to_string(),
            recommendations: "متابعة أسبوعية".to_string(),
            conclusion: String::new(),
        },
    )?;
    roster.add_attendance(
        "أمين بوزيد",
        AttendanceRecord {
            date: today - chrono::Duration::days(4),
            status: AttendanceStatus::Absent,
            note: "غياب غير مبرر".to_string(),
        },
    )?;

    Ok(roster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImportedStudent;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn imported(name: &str, average: f64) -> ImportedStudent {
        ImportedStudent {
            name: name.to_string(),
            grade: "1AS1".to_string(),
            gender: Some("F".to_string()),
            is_repeater: false,
            date_of_birth: None,
            record: AcademicRecord {
                year: "2025".to_string(),
                term: "الفصل الحالي".to_string(),
                subjects: vec![],
                average,
            },
        }
    }

    fn outcome(students: Vec<ImportedStudent>) -> ImportOutcome {
        ImportOutcome {
            students,
            institution_name: "ثانوية".to_string(),
            class_name: "1AS1".to_string(),
        }
    }

    #[test]
    fn merge_prepends_newest_record() {
        let mut roster = Roster::default();
        let first = roster.merge_import(outcome(vec![imported("Lina", 9.0)]));
        assert_eq!(first, MergeSummary { created: 1, updated: 0 });
        assert_eq!(roster.settings.institution_name, "ثانوية");

        let second =
            roster.merge_import(outcome(vec![imported("Lina", 12.5), imported("Omar", 8.0)]));
        assert_eq!(second, MergeSummary { created: 1, updated: 1 });

        let lina = roster.find_student("Lina").unwrap();
        assert_eq!(lina.academic_records.len(), 2);
        assert_eq!(lina.gpa(), 12.5);
        assert_eq!(lina.academic_records[1].average, 9.0);
    }

    #[test]
    fn logs_update_running_points() {
        let mut roster = Roster::default();
        roster.merge_import(outcome(vec![imported("Lina", 9.0)]));
        let now = today().and_hms_opt(9, 0, 0).unwrap();
        roster.add_log("Lina", -3, "late", None, now).unwrap();
        roster.add_log("Lina", 1, "helped", None, now).unwrap();
        assert_eq!(roster.find_student("Lina").unwrap().total_points, -2);

        roster.students[0].total_points = 99;
        roster.recompute_points();
        assert_eq!(roster.students[0].total_points, -2);
    }

    #[test]
    fn unknown_student_is_an_error() {
        let mut roster = Roster::default();
        let now = today().and_hms_opt(9, 0, 0).unwrap();
        assert!(roster.add_log("ghost", 1, "", None, now).is_err());
    }

    #[test]
    fn seed_is_consistent() {
        let roster = seed(today()).unwrap();
        assert_eq!(roster.students.len(), 3);
        assert_eq!(roster.find_student("أمين بوزيد").unwrap().total_points, -7);
        assert_eq!(roster.logs.len(), 4);
    }

    #[test]
    fn roster_survives_json() {
        let mut roster = seed(today()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.json");
        roster.save(&path).unwrap();
        let loaded = Roster::load(&path).unwrap();
        assert_eq!(loaded.students.len(), roster.students.len());
        assert_eq!(loaded.settings, roster.settings);
        assert!(loaded.export_date.is_some());
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let roster = Roster::load(&dir.path().join("absent.json")).unwrap();
        assert!(roster.students.is_empty());
    }
}
