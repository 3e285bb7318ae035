use std::collections::HashSet;

use log::debug;

use crate::models::{
    AnalysisSnapshot, Comparison, GenderBreakdown, GpaDistribution, StudentRecord,
    SubjectAnalysis,
};
use crate::statistics::{self, mean, population_std_dev, rate};

pub const PASS_MARK: f64 = 10.0;

/// Gender values that put a student in the female bucket; anything else,
/// including a missing value, counts as male.
pub const FEMALE_MARKERS: [&str; 2] = ["أنثى", "F"];

const BAND_HIGH: f64 = 15.0;
const BAND_LOW: f64 = 8.0;

pub fn is_female(student: &StudentRecord) -> bool {
    student
        .gender
        .as_deref()
        .is_some_and(|gender| FEMALE_MARKERS.contains(&gender))
}

pub fn eligible_students(students: &[StudentRecord]) -> Vec<&StudentRecord> {
    students.iter().filter(|s| s.has_results()).collect()
}

pub fn compute_snapshot(students: &[StudentRecord]) -> AnalysisSnapshot {
    let eligible = eligible_students(students);

    let total_students = eligible.len();
    let passed_students = eligible.iter().filter(|s| s.gpa() >= PASS_MARK).count();
    let average_gpa = mean(eligible.iter().map(|s| s.gpa()));

    let subjects = subject_universe(&eligible)
        .into_iter()
        .filter_map(|subject| analyze_subject(&eligible, subject, average_gpa))
        .collect::<Vec<_>>();

    let (females, males): (Vec<&StudentRecord>, Vec<&StudentRecord>) =
        eligible.iter().copied().partition(|s| is_female(s));

    debug!(
        "snapshot over {} students, {} subjects",
        total_students,
        subjects.len()
    );

    AnalysisSnapshot {
        total_students,
        passed_students,
        overall_pass_rate: rate(passed_students, total_students),
        average_gpa,
        subjects,
        females: gender_breakdown(&females),
        males: gender_breakdown(&males),
    }
}

/// Every subject name of the active records, once each, in first-seen order.
fn subject_universe<'a>(eligible: &[&'a StudentRecord]) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    let mut subjects = Vec::new();
    for record in eligible.iter().filter_map(|s| s.active_record()) {
        for result in &record.subjects {
            if seen.insert(result.subject.as_str()) {
                subjects.push(result.subject.as_str());
            }
        }
    }
    subjects
}

fn score_of(student: &StudentRecord, subject: &str) -> Option<f64> {
    student.active_record()?.score_for(subject)
}

fn analyze_subject(
    eligible: &[&StudentRecord],
    subject: &str,
    average_gpa: f64,
) -> Option<SubjectAnalysis> {
    let mut scores = Vec::new();
    let mut female_scores = Vec::new();
    let mut male_scores = Vec::new();
    for student in eligible {
        let Some(score) = score_of(student, subject) else {
            continue;
        };
        scores.push(score);
        if is_female(student) {
            female_scores.push(score);
        } else {
            male_scores.push(score);
        }
    }

    let max_score = statistics::max(scores.iter().copied())?;
    let min_score = statistics::min(scores.iter().copied()).unwrap_or(max_score);

    let count = scores.len();
    let average = mean(scores.iter().copied());
    let std_dev = population_std_dev(average, scores.iter().copied());
    let coefficient_of_variation = if average > 0.0 {
        std_dev / average * 100.0
    } else {
        0.0
    };
    let comparison = if average > average_gpa {
        Comparison::Above
    } else if average < average_gpa {
        Comparison::Below
    } else {
        Comparison::Equal
    };
    let passed_count = scores.iter().filter(|&&s| s >= PASS_MARK).count();

    Some(SubjectAnalysis {
        subject: subject.to_string(),
        count,
        average,
        male_average: mean(male_scores),
        female_average: mean(female_scores),
        std_dev,
        coefficient_of_variation,
        comparison,
        above15: scores.iter().filter(|&&s| s >= BAND_HIGH).count(),
        between10and15: scores
            .iter()
            .filter(|&&s| (PASS_MARK..BAND_HIGH).contains(&s))
            .count(),
        between8and10: scores
            .iter()
            .filter(|&&s| (BAND_LOW..PASS_MARK).contains(&s))
            .count(),
        below8: scores.iter().filter(|&&s| s < BAND_LOW).count(),
        passed_count,
        pass_rate: rate(passed_count, count),
        max_score,
        min_score,
        is_exempt: max_score == 0.0,
    })
}

fn gender_breakdown(group: &[&StudentRecord]) -> GenderBreakdown {
    let averages: Vec<f64> = group.iter().map(|s| s.gpa()).collect();
    let total = averages.len();
    let passed = averages.iter().filter(|&&a| a >= PASS_MARK).count();

    let mut distribution = GpaDistribution::default();
    for &average in &averages {
        match average {
            a if a >= 18.0 => distribution.excellent += 1,
            a if a >= 16.0 => distribution.very_good += 1,
            a if a >= 14.0 => distribution.good += 1,
            a if a >= 12.0 => distribution.close_to_good += 1,
            a if a >= PASS_MARK => distribution.acceptable += 1,
            _ => distribution.fail += 1,
        }
    }

    GenderBreakdown {
        total,
        passed,
        pass_rate: rate(passed, total),
        average_gpa: mean(averages),
        distribution,
    }
}

/// Students holding a score in `subject`, best score first.
pub fn subject_ranking<'a>(
    students: &'a [StudentRecord],
    subject: &str,
) -> Vec<(&'a StudentRecord, f64)> {
    let mut ranked: Vec<(&StudentRecord, f64)> = eligible_students(students)
        .into_iter()
        .filter_map(|s| score_of(s, subject).map(|score| (s, score)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{AcademicRecord, SubjectResult};

    pub(crate) fn student(
        name: &str,
        gender: Option<&str>,
        average: f64,
        subjects: &[(&str, f64)],
    ) -> StudentRecord {
        let mut record = StudentRecord::new(name, "1AS1");
        record.gender = gender.map(str::to_string);
        record.academic_records.push(AcademicRecord {
            year: "2025".to_string(),
            term: "الفصل الحالي".to_string(),
            subjects: subjects
                .iter()
                .map(|(subject, score)| SubjectResult {
                    subject: subject.to_string(),
                    score: *score,
                })
                .collect(),
            average,
        });
        record
    }

    fn subject<'a>(snapshot: &'a AnalysisSnapshot, name: &str) -> &'a SubjectAnalysis {
        snapshot
            .subjects
            .iter()
            .find(|s| s.subject == name)
            .unwrap()
    }

    #[test]
    fn two_student_scenario() {
        let students = vec![
            student("A", None, 10.0, &[("Math", 12.0), ("Arabic", 8.0)]),
            student("B", Some("أنثى"), 17.0, &[("Math", 16.0), ("Arabic", 18.0)]),
        ];
        let snapshot = compute_snapshot(&students);

        assert_eq!(snapshot.total_students, 2);
        assert_eq!(snapshot.passed_students, 2);
        assert_eq!(snapshot.overall_pass_rate, 100.0);
        assert_eq!(snapshot.average_gpa, 13.5);

        let math = subject(&snapshot, "Math");
        assert_eq!(math.average, 14.0);
        assert_eq!(math.male_average, 12.0);
        assert_eq!(math.female_average, 16.0);
        assert_eq!(math.comparison, Comparison::Above);
        assert_eq!(math.std_dev, 2.0);

        let arabic = subject(&snapshot, "Arabic");
        assert_eq!(arabic.average, 13.0);
        assert_eq!(arabic.male_average, 8.0);
        assert_eq!(arabic.female_average, 18.0);
        assert_eq!(arabic.comparison, Comparison::Below);
        assert_eq!(arabic.between8and10, 1);
        assert_eq!(arabic.above15, 1);
        assert_eq!(arabic.pass_rate, 50.0);
    }

    #[test]
    fn empty_cohort_is_all_zero() {
        let students = vec![StudentRecord::new("no grades", "1AS1")];
        let snapshot = compute_snapshot(&students);
        assert_eq!(snapshot.total_students, 0);
        assert_eq!(snapshot.overall_pass_rate, 0.0);
        assert_eq!(snapshot.average_gpa, 0.0);
        assert!(snapshot.subjects.is_empty());
        assert_eq!(snapshot.females.pass_rate, 0.0);
        assert_eq!(snapshot.males.average_gpa, 0.0);
    }

    #[test]
    fn snapshot_is_deterministic() {
        let students = vec![
            student("A", Some("F"), 11.37, &[("Physics", 9.5), ("Math", 14.0)]),
            student("B", Some("ذكر"), 7.2, &[("Math", 6.0)]),
            student("C", None, 15.0, &[("Physics", 15.0), ("Art", 0.0)]),
        ];
        assert_eq!(compute_snapshot(&students), compute_snapshot(&students));
    }

    #[test]
    fn all_zero_subject_is_exempt() {
        let students = vec![
            student("A", None, 12.0, &[("Music", 0.0), ("Math", 12.0)]),
            student("B", None, 9.0, &[("Music", 0.0), ("Math", 9.0)]),
        ];
        let snapshot = compute_snapshot(&students);
        let music = subject(&snapshot, "Music");
        assert!(music.is_exempt);
        assert!(music.computed().is_none());
        assert!(!subject(&snapshot, "Math").is_exempt);
    }

    #[test]
    fn missing_scores_are_excluded_not_zeroed() {
        let students = vec![
            student("A", None, 12.0, &[("Math", 12.0), ("Latin", 18.0)]),
            student("B", None, 9.0, &[("Math", 9.0)]),
        ];
        let snapshot = compute_snapshot(&students);
        let latin = subject(&snapshot, "Latin");
        assert_eq!(latin.count, 1);
        assert_eq!(latin.average, 18.0);
        assert_eq!(latin.min_score, 18.0);
    }

    #[test]
    fn differently_spelled_subjects_stay_distinct() {
        let students = vec![
            student("A", None, 12.0, &[("Math", 12.0)]),
            student("B", None, 9.0, &[("math ", 9.0)]),
        ];
        let snapshot = compute_snapshot(&students);
        assert_eq!(snapshot.subjects.len(), 2);
    }

    #[test]
    fn unknown_gender_joins_male_bucket() {
        let students = vec![
            student("A", None, 18.5, &[]),
            student("B", Some("X"), 9.0, &[]),
            student("C", Some("F"), 14.0, &[]),
        ];
        let snapshot = compute_snapshot(&students);
        assert_eq!(snapshot.males.total, 2);
        assert_eq!(snapshot.males.passed, 1);
        assert_eq!(snapshot.males.distribution.excellent, 1);
        assert_eq!(snapshot.males.distribution.fail, 1);
        assert_eq!(snapshot.females.total, 1);
        assert_eq!(snapshot.females.distribution.good, 1);
    }

    #[test]
    fn ranking_orders_by_score() {
        let students = vec![
            student("A", None, 12.0, &[("Math", 12.0)]),
            student("B", None, 9.0, &[("Math", 17.0)]),
            student("C", None, 9.0, &[]),
        ];
        let ranked = subject_ranking(&students, "Math");
        let names: Vec<&str> = ranked.iter().map(|(s, _)| s.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }
}
