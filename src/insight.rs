use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{BehaviorLog, HonorEntry, StudentRecord};

pub const TOP_PERFORMER_GPA: f64 = 15.0;
pub const STRUGGLING_GPA: f64 = 8.0;
pub const PASSING_GPA: f64 = 10.0;
pub const BEHAVIORAL_POINTS: i32 = -5;

/// Students at or above this GPA are "distinguished" and never critical.
pub const DISTINGUISHED_GPA: f64 = 12.0;
/// Critical needs strictly fewer points than this.
pub const CRITICAL_POINTS: i32 = -5;

pub const PSYCHOLOGICAL_KEYWORDS: [&str; 4] = ["قلق", "خوف", "انطواء", "نفسي"];
pub const SPECIAL_CASE_KEYWORDS: [&str; 5] = ["صحة", "إعاقة", "طيف", "توحد", "حركة"];

#[derive(Debug, Clone, Default)]
pub struct Categories<'a> {
    pub top_performers: Vec<&'a StudentRecord>,
    pub struggling: Vec<&'a StudentRecord>,
    pub learning_difficulties: Vec<&'a StudentRecord>,
    pub behavioral_disorders: Vec<&'a StudentRecord>,
    pub psychological: Vec<&'a StudentRecord>,
    pub special_cases: Vec<&'a StudentRecord>,
}

impl<'a> Categories<'a> {
    pub fn named(&self) -> [(Category, &[&'a StudentRecord]); 6] {
        [
            (Category::TopPerformers, &self.top_performers),
            (Category::Struggling, &self.struggling),
            (Category::LearningDifficulties, &self.learning_difficulties),
            (Category::BehavioralDisorders, &self.behavioral_disorders),
            (Category::Psychological, &self.psychological),
            (Category::SpecialCases, &self.special_cases),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    TopPerformers,
    Struggling,
    LearningDifficulties,
    BehavioralDisorders,
    Psychological,
    SpecialCases,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::TopPerformers => "المتفوقون",
            Category::Struggling => "المتعثرون",
            Category::LearningDifficulties => "صعوبات التعلم",
            Category::BehavioralDisorders => "اضطرابات سلوكية",
            Category::Psychological => "حالات نفسية",
            Category::SpecialCases => "حالات خاصة",
        }
    }
}

pub fn contains_any_keyword(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

fn has_interview_keyword(student: &StudentRecord, keywords: &[&str]) -> bool {
    student
        .interviews
        .iter()
        .any(|interview| contains_any_keyword(&interview.title, keywords))
}

pub fn categorize(students: &[StudentRecord]) -> Categories<'_> {
    let mut categories = Categories::default();

    for student in students.iter().filter(|s| s.has_results()) {
        let gpa = student.gpa();
        if gpa >= TOP_PERFORMER_GPA {
            categories.top_performers.push(student);
        }
        if (STRUGGLING_GPA..PASSING_GPA).contains(&gpa) {
            categories.struggling.push(student);
        }
        if gpa < STRUGGLING_GPA {
            categories.learning_difficulties.push(student);
        }
        if student.total_points <= BEHAVIORAL_POINTS {
            categories.behavioral_disorders.push(student);
        }
        if has_interview_keyword(student, &PSYCHOLOGICAL_KEYWORDS) {
            categories.psychological.push(student);
        }
        if has_interview_keyword(student, &SPECIAL_CASE_KEYWORDS) {
            categories.special_cases.push(student);
        }
    }

    categories
}

pub fn is_distinguished(student: &StudentRecord) -> bool {
    student.gpa() >= DISTINGUISHED_GPA
}

pub fn needs_intervention(student: &StudentRecord) -> bool {
    let gpa = student.gpa();
    if gpa >= DISTINGUISHED_GPA {
        return false;
    }
    student.total_points < CRITICAL_POINTS || (gpa > 0.0 && gpa < PASSING_GPA)
}

pub fn critical_students(students: &[StudentRecord]) -> Vec<&StudentRecord> {
    students.iter().filter(|s| needs_intervention(s)).collect()
}

pub fn exited_students(students: &[StudentRecord]) -> Vec<&StudentRecord> {
    students.iter().filter(|s| is_distinguished(s)).collect()
}

pub fn interview_students(students: &[StudentRecord]) -> Vec<&StudentRecord> {
    students.iter().filter(|s| !s.interviews.is_empty()).collect()
}

/// Points earned inside `[from, to]` (inclusive, `from = None` is unbounded),
/// positive totals only, highest first.
pub fn honor_board<'a>(
    students: &'a [StudentRecord],
    logs: &[BehaviorLog],
    from: Option<NaiveDate>,
    to: NaiveDate,
) -> Vec<HonorEntry<'a>> {
    let mut period_points: HashMap<Uuid, i32> = HashMap::new();
    for log in logs {
        let day = log.timestamp.date();
        if from.is_some_and(|start| day < start) || day > to {
            continue;
        }
        *period_points.entry(log.student_id).or_insert(0) += log.points;
    }

    let mut entries: Vec<HonorEntry> = students
        .iter()
        .filter_map(|student| {
            let points = period_points.get(&student.id).copied().unwrap_or(0);
            (points > 0).then_some(HonorEntry {
                student,
                period_points: points,
            })
        })
        .collect();
    entries.sort_by(|a, b| b.period_points.cmp(&a.period_points));
    entries
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insight {
    ModelStudent,
    BehaviorDespiteExcellence,
    StrugglingDespiteDiscipline,
    DoubleRisk,
    NeedsAcademicSupport,
    NeedsBehavioralCorrection,
    Stable,
}

impl Insight {
    pub fn label(self) -> &'static str {
        match self {
            Insight::ModelStudent => "نموذج مثالي",
            Insight::BehaviorDespiteExcellence => "مشاكل سلوكية رغم التفوق",
            Insight::StrugglingDespiteDiscipline => "تعثر دراسي رغم الانضباط",
            Insight::DoubleRisk => "خطر مزدوج (دراسي وسلوكي)",
            Insight::NeedsAcademicSupport => "يحتاج دعم دراسي",
            Insight::NeedsBehavioralCorrection => "يحتاج تقويم سلوكي",
            Insight::Stable => "وضع مستقر",
        }
    }
}

pub fn comprehensive_insight(student: &StudentRecord) -> Insight {
    let gpa = student.gpa();
    let points = student.total_points;

    if gpa >= 15.0 && points >= 10 {
        Insight::ModelStudent
    } else if gpa >= DISTINGUISHED_GPA && points < CRITICAL_POINTS {
        Insight::BehaviorDespiteExcellence
    } else if gpa < 9.0 && points >= 5 {
        Insight::StrugglingDespiteDiscipline
    } else if gpa < PASSING_GPA && points < CRITICAL_POINTS {
        Insight::DoubleRisk
    } else if gpa < PASSING_GPA {
        Insight::NeedsAcademicSupport
    } else if points < CRITICAL_POINTS {
        Insight::NeedsBehavioralCorrection
    } else {
        Insight::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::student;
    use crate::models::{InterviewRecord, InterviewType};
    use chrono::NaiveDateTime;

    fn with_points(mut record: StudentRecord, points: i32) -> StudentRecord {
        record.total_points = points;
        record
    }

    fn with_interview(mut record: StudentRecord, title: &str) -> StudentRecord {
        record.interviews.push(InterviewRecord {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2025, 1, 12).unwrap(),
            interview_type: InterviewType::Student,
            title: title.to_string(),
            proceedings: String::new(),
            assessment: String::new(),
            actions: String::new(),
            recommendations: String::new(),
            conclusion: String::new(),
        });
        record
    }

    fn names<'a>(list: &[&'a StudentRecord]) -> Vec<&'a str> {
        list.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn keyword_match_is_plain_substring() {
        assert!(contains_any_keyword("مقابلة بسبب القلق", &PSYCHOLOGICAL_KEYWORDS));
        assert!(contains_any_keyword("متابعة نفسية", &PSYCHOLOGICAL_KEYWORDS));
        assert!(!contains_any_keyword("متابعة دراسية", &PSYCHOLOGICAL_KEYWORDS));
        assert!(contains_any_keyword("فرط الحركة", &SPECIAL_CASE_KEYWORDS));
        assert!(!contains_any_keyword("", &SPECIAL_CASE_KEYWORDS));
    }

    #[test]
    fn scenario_only_b_is_top_performer() {
        let students = vec![
            student("A", None, 10.0, &[("Math", 12.0), ("Arabic", 8.0)]),
            student("B", Some("أنثى"), 17.0, &[("Math", 16.0), ("Arabic", 18.0)]),
        ];
        let categories = categorize(&students);
        assert_eq!(names(&categories.top_performers), vec!["B"]);
        assert!(categories.struggling.is_empty());
        assert!(categories.learning_difficulties.is_empty());
    }

    #[test]
    fn categories_may_overlap() {
        let students = vec![
            with_interview(with_points(student("A", None, 9.0, &[]), -5), "حالة قلق"),
            with_interview(student("B", None, 7.5, &[]), "إعاقة حركية"),
            with_points(StudentRecord::new("no grades", "1AS1"), -20),
        ];
        let categories = categorize(&students);
        assert_eq!(names(&categories.struggling), vec!["A"]);
        assert_eq!(names(&categories.behavioral_disorders), vec!["A"]);
        assert_eq!(names(&categories.psychological), vec!["A"]);
        assert_eq!(names(&categories.learning_difficulties), vec!["B"]);
        assert_eq!(names(&categories.special_cases), vec!["B"]);
    }

    #[test]
    fn distinguished_students_are_never_critical() {
        let students = vec![
            with_points(student("excellent but rowdy", None, 12.0, &[]), -40),
            with_points(student("rowdy", None, 11.0, &[]), -6),
            student("failing", None, 9.99, &[]),
            with_points(student("edge points", None, 11.0, &[]), -5),
            StudentRecord::new("no grades", "1AS1"),
            with_points(StudentRecord::new("no grades rowdy", "1AS1"), -6),
        ];
        let critical = critical_students(&students);
        assert_eq!(names(&critical), vec!["rowdy", "failing", "no grades rowdy"]);
        let exited = exited_students(&students);
        assert_eq!(names(&exited), vec!["excellent but rowdy"]);
        assert!(critical.iter().all(|s| s.gpa() < DISTINGUISHED_GPA));
    }

    #[test]
    fn honor_board_uses_period_points() {
        let students = vec![
            student("A", None, 12.0, &[]),
            student("B", None, 12.0, &[]),
            student("C", None, 12.0, &[]),
        ];
        let at = |day: u32| -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2025, 2, day)
                .unwrap()
                .and_hms_opt(23, 30, 0)
                .unwrap()
        };
        let log = |student: &StudentRecord, points: i32, day: u32| BehaviorLog {
            id: Uuid::new_v4(),
            student_id: student.id,
            points,
            description: String::new(),
            timestamp: at(day),
            severity: None,
        };
        let logs = vec![
            log(&students[0], 3, 10),
            log(&students[1], 5, 10),
            log(&students[1], 4, 1),
            log(&students[2], 2, 12),
            log(&students[2], -4, 12),
            log(&students[0], 1, 20),
        ];
        let from = NaiveDate::from_ymd_opt(2025, 2, 5);
        let to = NaiveDate::from_ymd_opt(2025, 2, 20).unwrap();
        let board = honor_board(&students, &logs, from, to);
        let ranked: Vec<(&str, i32)> = board
            .iter()
            .map(|e| (e.student.name.as_str(), e.period_points))
            .collect();
        assert_eq!(ranked, vec![("B", 5), ("A", 4)]);
    }

    #[test]
    fn insight_labels_follow_priority() {
        let cases = [
            (15.0, 10, Insight::ModelStudent),
            (13.0, -6, Insight::BehaviorDespiteExcellence),
            (8.0, 5, Insight::StrugglingDespiteDiscipline),
            (9.5, -6, Insight::DoubleRisk),
            (9.5, 0, Insight::NeedsAcademicSupport),
            (11.0, -6, Insight::NeedsBehavioralCorrection),
            (11.0, 0, Insight::Stable),
        ];
        for (gpa, points, expected) in cases {
            let record = with_points(student("x", None, gpa, &[]), points);
            assert_eq!(comprehensive_insight(&record), expected, "gpa {gpa} points {points}");
        }
    }
}
