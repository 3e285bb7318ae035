use std::fmt::Write;

use chrono::NaiveDate;

use crate::insight::{self, Categories};
use crate::models::{AnalysisSnapshot, BehaviorLog, GenderBreakdown, InstitutionSettings, StudentRecord};
use crate::statistics::to_fixed;
use crate::transcript::{Observation, Transcript};

pub const EXEMPT_LABEL: &str = "معفاة";
pub const NOT_COMPUTED: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ListKind {
    General,
    Critical,
    Exited,
    Honor,
    Interviews,
    Comprehensive,
}

impl ListKind {
    pub fn title(self) -> &'static str {
        match self {
            ListKind::General => "القائمة العامة",
            ListKind::Critical => "الحالات الحرجة",
            ListKind::Exited => "المتخرجون من النظام",
            ListKind::Honor => "لوحة الشرف",
            ListKind::Interviews => "سجل المقابلات",
            ListKind::Comprehensive => "تقرير الأداء والسلوك",
        }
    }
}

fn signed(points: i32) -> String {
    if points > 0 {
        format!("+{points}")
    } else {
        points.to_string()
    }
}

/// Escapes pipes so a name cannot split a markdown table cell.
pub fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn institution_label(settings: &InstitutionSettings) -> &str {
    if settings.institution_name.is_empty() {
        "المؤسسة"
    } else {
        &settings.institution_name
    }
}

fn write_gender_line(output: &mut String, label: &str, group: &GenderBreakdown) {
    let _ = writeln!(
        output,
        "- {}: {} students, average {}, pass rate {}%",
        label,
        group.total,
        to_fixed(group.average_gpa, 2),
        to_fixed(group.pass_rate, 1)
    );
    let dist = &group.distribution;
    let _ = writeln!(
        output,
        "  - 18-20: {} | 16-18: {} | 14-16: {} | 12-14: {} | 10-12: {} | <10: {}",
        dist.excellent, dist.very_good, dist.good, dist.close_to_good, dist.acceptable, dist.fail
    );
}

pub fn build_analysis_report(
    snapshot: &AnalysisSnapshot,
    categories: &Categories<'_>,
    settings: &InstitutionSettings,
    today: NaiveDate,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# تقرير تحليل النتائج المدرسية");
    let _ = writeln!(
        output,
        "Generated for {} on {}",
        institution_label(settings),
        today
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## General Statistics");

    if snapshot.total_students == 0 {
        let _ = writeln!(output, "No imported results yet.");
        return output;
    }

    let _ = writeln!(output, "- Students: {}", snapshot.total_students);
    let _ = writeln!(
        output,
        "- Passed: {} ({}%)",
        snapshot.passed_students,
        to_fixed(snapshot.overall_pass_rate, 2)
    );
    let _ = writeln!(output, "- Class average: {}", to_fixed(snapshot.average_gpa, 2));

    let _ = writeln!(output);
    let _ = writeln!(output, "## By Gender");
    write_gender_line(&mut output, "إناث", &snapshot.females);
    write_gender_line(&mut output, "ذكور", &snapshot.males);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Subjects");
    let _ = writeln!(
        output,
        "| Subject | Average | Male | Female | Comparison | Std dev | CV | >=15 | 10-15 | 8-10 | <8 | Pass rate |"
    );
    let _ = writeln!(output, "|---|---|---|---|---|---|---|---|---|---|---|---|");
    for subject in &snapshot.subjects {
        match subject.computed() {
            Some(s) => {
                let _ = writeln!(
                    output,
                    "| {} | {} | {} | {} | {} | {} | {}% | {} | {} | {} | {} | {}% |",
                    escape_cell(&s.subject),
                    to_fixed(s.average, 2),
                    to_fixed(s.male_average, 2),
                    to_fixed(s.female_average, 2),
                    s.comparison.label(),
                    to_fixed(s.std_dev, 2),
                    to_fixed(s.coefficient_of_variation, 1),
                    s.above15,
                    s.between10and15,
                    s.between8and10,
                    s.below8,
                    to_fixed(s.pass_rate, 1)
                );
            }
            None => {
                let _ = writeln!(
                    output,
                    "| {} | {EXEMPT_LABEL} | - | - | {EXEMPT_LABEL} | - | - | - | - | - | - | - |",
                    escape_cell(&subject.subject)
                );
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Intervention Lists");
    for (category, members) in categories.named() {
        let names: Vec<&str> = members.iter().map(|s| s.name.as_str()).collect();
        if names.is_empty() {
            let _ = writeln!(output, "- {}: none", category.label());
        } else {
            let _ = writeln!(
                output,
                "- {} ({}): {}",
                category.label(),
                names.len(),
                names.join("، ")
            );
        }
    }

    output
}

fn student_line(student: &StudentRecord) -> String {
    format!(
        "{} ({}) average {}, points {}",
        student.name,
        student.grade,
        to_fixed(student.gpa(), 2),
        signed(student.total_points)
    )
}

pub fn build_list_report(
    kind: ListKind,
    students: &[StudentRecord],
    logs: &[BehaviorLog],
    from: Option<NaiveDate>,
    to: NaiveDate,
) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# {}", kind.title());
    match from {
        Some(start) => {
            let _ = writeln!(output, "Period {} to {}", start, to);
        }
        None => {
            let _ = writeln!(output, "Up to {}", to);
        }
    }
    let _ = writeln!(output);

    let lines: Vec<String> = match kind {
        ListKind::General => students.iter().map(student_line).collect(),
        ListKind::Critical => insight::critical_students(students)
            .into_iter()
            .map(student_line)
            .collect(),
        ListKind::Exited => insight::exited_students(students)
            .into_iter()
            .map(student_line)
            .collect(),
        ListKind::Honor => insight::honor_board(students, logs, from, to)
            .into_iter()
            .map(|entry| {
                format!(
                    "{} ({}) {} points this period",
                    entry.student.name,
                    entry.student.grade,
                    signed(entry.period_points)
                )
            })
            .collect(),
        ListKind::Interviews => insight::interview_students(students)
            .into_iter()
            .map(|student| {
                let titles: Vec<&str> =
                    student.interviews.iter().map(|i| i.title.as_str()).collect();
                format!(
                    "{} ({}) {} interviews: {}",
                    student.name,
                    student.grade,
                    titles.len(),
                    titles.join("، ")
                )
            })
            .collect(),
        ListKind::Comprehensive => students
            .iter()
            .map(|student| {
                format!(
                    "{}: {}",
                    student_line(student),
                    insight::comprehensive_insight(student).label()
                )
            })
            .collect(),
    };

    if lines.is_empty() {
        let _ = writeln!(output, "No students in this list.");
    } else {
        for line in lines {
            let _ = writeln!(output, "- {line}");
        }
    }

    output
}

pub fn build_transcript(transcript: &Transcript<'_>) -> String {
    let mut output = String::new();
    let student = transcript.student;
    let record = transcript.record;

    let _ = writeln!(output, "# كشف نقاط - {}", student.name);
    let _ = writeln!(
        output,
        "{} | {} {} | average {}",
        student.grade,
        record.year,
        record.term,
        to_fixed(record.average, 2)
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "| Subject | Score | Observation |");
    let _ = writeln!(output, "|---|---|---|");
    for result in &record.subjects {
        let _ = writeln!(
            output,
            "| {} | {} | {} |",
            escape_cell(&result.subject),
            result.score,
            Observation::for_score(result.score).label()
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Strengths");
    if transcript.strengths.is_empty() {
        let _ = writeln!(output, "None above the strength mark.");
    }
    for result in &transcript.strengths {
        let _ = writeln!(output, "- {} ({})", result.subject, result.score);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Weaknesses");
    if transcript.weaknesses.is_empty() {
        let _ = writeln!(output, "No subject below the pass mark.");
    }
    for result in &transcript.weaknesses {
        let _ = writeln!(output, "- {} ({})", result.subject, result.score);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recommendation");
    let _ = writeln!(output, "{}", transcript.recommendation.text());

    output
}
