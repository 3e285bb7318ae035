use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: Uuid,
    pub name: String,
    pub grade: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub is_repeater: bool,
    #[serde(default)]
    pub enrollment_date: Option<NaiveDate>,
    /// Newest record first; importers prepend.
    #[serde(default)]
    pub academic_records: Vec<AcademicRecord>,
    #[serde(default)]
    pub total_points: i32,
    #[serde(default)]
    pub interviews: Vec<InterviewRecord>,
    #[serde(default)]
    pub attendance_records: Vec<AttendanceRecord>,
}

impl StudentRecord {
    pub fn new(name: impl Into<String>, grade: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            grade: grade.into(),
            gender: None,
            date_of_birth: None,
            is_repeater: false,
            enrollment_date: None,
            academic_records: Vec::new(),
            total_points: 0,
            interviews: Vec::new(),
            attendance_records: Vec::new(),
        }
    }

    pub fn active_record(&self) -> Option<&AcademicRecord> {
        self.academic_records.first()
    }

    /// General average of the active record, 0 for students without grades.
    pub fn gpa(&self) -> f64 {
        self.active_record().map_or(0.0, |record| record.average)
    }

    pub fn has_results(&self) -> bool {
        !self.academic_records.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicRecord {
    pub year: String,
    pub term: String,
    pub subjects: Vec<SubjectResult>,
    pub average: f64,
}

impl AcademicRecord {
    /// First entry recorded under `subject`; later duplicates are ignored.
    pub fn score_for(&self, subject: &str) -> Option<f64> {
        self.subjects
            .iter()
            .find(|result| result.subject == subject)
            .map(|result| result.score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectResult {
    pub subject: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorLog {
    pub id: Uuid,
    pub student_id: Uuid,
    pub points: i32,
    pub description: String,
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub severity: Option<Severity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InterviewType {
    Student,
    Parent,
    Admin,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewRecord {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub interview_type: InterviewType,
    pub title: String,
    #[serde(default)]
    pub proceedings: String,
    #[serde(default)]
    pub assessment: String,
    #[serde(default)]
    pub actions: String,
    #[serde(default)]
    pub recommendations: String,
    #[serde(default)]
    pub conclusion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstitutionSettings {
    pub institution_name: String,
    pub counselor_name: String,
    pub counselor_role: String,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    Current,
    Previous,
}

/// One student row produced by the tabular import, before it is merged
/// into a roster.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedStudent {
    pub name: String,
    pub grade: String,
    pub gender: Option<String>,
    pub is_repeater: bool,
    pub date_of_birth: Option<String>,
    pub record: AcademicRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    pub students: Vec<ImportedStudent>,
    pub institution_name: String,
    pub class_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Comparison {
    Above,
    Below,
    Equal,
}

impl Comparison {
    pub fn label(self) -> &'static str {
        match self {
            Comparison::Above => "أعلى من المعدل العام",
            Comparison::Below => "أقل من المعدل العام",
            Comparison::Equal => "مساوي للمعدل العام",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectAnalysis {
    pub subject: String,
    pub count: usize,
    pub average: f64,
    pub male_average: f64,
    pub female_average: f64,
    pub std_dev: f64,
    pub coefficient_of_variation: f64,
    pub comparison: Comparison,
    pub above15: usize,
    pub between10and15: usize,
    pub between8and10: usize,
    pub below8: usize,
    pub passed_count: usize,
    pub pass_rate: f64,
    pub max_score: f64,
    pub min_score: f64,
    pub is_exempt: bool,
}

impl SubjectAnalysis {
    /// `None` for exempt subjects, whose statistics must not be displayed.
    pub fn computed(&self) -> Option<&Self> {
        (!self.is_exempt).then_some(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GpaDistribution {
    pub excellent: usize,
    pub very_good: usize,
    pub good: usize,
    pub close_to_good: usize,
    pub acceptable: usize,
    pub fail: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenderBreakdown {
    pub total: usize,
    pub passed: usize,
    pub pass_rate: f64,
    pub average_gpa: f64,
    pub distribution: GpaDistribution,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisSnapshot {
    pub total_students: usize,
    pub passed_students: usize,
    pub overall_pass_rate: f64,
    pub average_gpa: f64,
    pub subjects: Vec<SubjectAnalysis>,
    pub females: GenderBreakdown,
    pub males: GenderBreakdown,
}

#[derive(Debug, Clone)]
pub struct HonorEntry<'a> {
    pub student: &'a StudentRecord,
    pub period_points: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceSummary {
    pub school_days: u32,
    pub present: u32,
    pub absent: u32,
    pub late: u32,
    pub excused: u32,
    pub rate: u32,
}
