use crate::models::{AcademicRecord, StudentRecord, SubjectResult};

/// Scores at or above this are listed as strengths on a transcript.
pub const STRENGTH_SCORE: f64 = 13.0;
pub const WEAKNESS_SCORE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    Excellent,
    VeryGood,
    Good,
    CloseToGood,
    Average,
    Weak,
}

impl Observation {
    pub fn for_score(score: f64) -> Self {
        match score {
            s if s >= 18.0 => Observation::Excellent,
            s if s >= 16.0 => Observation::VeryGood,
            s if s >= 14.0 => Observation::Good,
            s if s >= 12.0 => Observation::CloseToGood,
            s if s >= 10.0 => Observation::Average,
            _ => Observation::Weak,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Observation::Excellent => "ممتاز",
            Observation::VeryGood => "جيد جداً",
            Observation::Good => "جيد",
            Observation::CloseToGood => "قريب من الجيد",
            Observation::Average => "متوسط",
            Observation::Weak => "ضعيف",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    KeepPace,
    BuildConfidence,
    FocusOnWeaknesses,
    IntensiveReview,
    AcademicWarning,
}

impl Recommendation {
    pub fn for_gpa(gpa: f64) -> Self {
        match gpa {
            g if g >= 16.0 => Recommendation::KeepPace,
            g if g >= 14.0 => Recommendation::BuildConfidence,
            g if g >= 12.0 => Recommendation::FocusOnWeaknesses,
            g if g >= 10.0 => Recommendation::IntensiveReview,
            _ => Recommendation::AcademicWarning,
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Recommendation::KeepPace => "نتائج ممتازة. ينصح بالحفاظ على وتيرة العمل وتشجيع التلميذ على المشاركة في المسابقات العلمية.",
            Recommendation::BuildConfidence => "نتائج جيدة جداً. التلميذ يملك قدرات عالية، يحتاج فقط لتعزيز الثقة في المواد التي تقل علامته فيها عن 14.",
            Recommendation::FocusOnWeaknesses => "مستوى جيد. يجب التركيز على نقاط الضعف المحددة أدناه لرفع المعدل العام.",
            Recommendation::IntensiveReview => "مستوى متوسط. التلميذ يحتاج إلى مراجعة مكثفة وتنظيم وقت الدراسة لتجنب التراجع.",
            Recommendation::AcademicWarning => "مستوى ضعيف (إنذار أكاديمي). يتطلب تدخلاً عاجلاً ودروس دعم في المواد الأساسية وتواصل فوري مع الولي.",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Transcript<'a> {
    pub student: &'a StudentRecord,
    pub record: &'a AcademicRecord,
    pub strengths: Vec<&'a SubjectResult>,
    pub weaknesses: Vec<&'a SubjectResult>,
    pub best_subject: Option<&'a SubjectResult>,
    pub weakest_subject: Option<&'a SubjectResult>,
    pub recommendation: Recommendation,
}

/// Reads the newest academic record of `student`; `None` without grades.
pub fn analyze_transcript(student: &StudentRecord) -> Option<Transcript<'_>> {
    let record = student.active_record()?;

    let mut strengths: Vec<&SubjectResult> = record
        .subjects
        .iter()
        .filter(|s| s.score >= STRENGTH_SCORE)
        .collect();
    strengths.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut weaknesses: Vec<&SubjectResult> = record
        .subjects
        .iter()
        .filter(|s| s.score < WEAKNESS_SCORE)
        .collect();
    weaknesses.sort_by(|a, b| a.score.total_cmp(&b.score));

    // Ties go to the later subject.
    let best_subject = record
        .subjects
        .iter()
        .reduce(|best, s| if best.score > s.score { best } else { s });
    let weakest_subject = record
        .subjects
        .iter()
        .reduce(|worst, s| if worst.score < s.score { worst } else { s });

    Some(Transcript {
        student,
        record,
        strengths,
        weaknesses,
        best_subject,
        weakest_subject,
        recommendation: Recommendation::for_gpa(record.average),
    })
}
