//! Printable HTML for the analysis view. The document is self-contained and
//! opens the print dialog as soon as it loads.

use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{AnalysisSnapshot, InstitutionSettings, SubjectAnalysis};
use crate::report::{EXEMPT_LABEL, NOT_COMPUTED};
use crate::statistics::to_fixed;

const STYLE: &str = r#"
      body { font-family: 'Tajawal', sans-serif; padding: 20px; color: #1f2937; }
      .header { text-align: center; margin-bottom: 30px; border-bottom: 2px solid #eee; padding-bottom: 20px; }
      .title { font-size: 24px; font-weight: bold; margin-bottom: 5px; }
      .subtitle { font-size: 14px; color: #6b7280; }
      .grid-stats { display: grid; grid-template-columns: repeat(3, 1fr); gap: 15px; margin-bottom: 30px; }
      .stat-box { border: 1px solid #e5e7eb; padding: 15px; border-radius: 8px; text-align: center; background: #f9fafb; }
      .stat-val { font-size: 20px; font-weight: bold; color: #111827; }
      .stat-label { font-size: 12px; color: #6b7280; margin-bottom: 5px; }
      table { width: 100%; border-collapse: collapse; margin-top: 20px; font-size: 12px; }
      th, td { border: 1px solid #cbd5e1; padding: 8px; text-align: right; }
      th { background-color: #1e293b; color: white; font-weight: bold; text-align: center; }
      tr:nth-child(even) { background-color: #f8fafc; }
      tr.exempt { background-color: #f3f4f6; color: #6b7280; }
      td.num { text-align: center; }
"#;

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn subject_row(output: &mut String, subject: &SubjectAnalysis) {
    let name = escape_html(&subject.subject);
    let Some(s) = subject.computed() else {
        let _ = write!(
            output,
            "<tr class=\"exempt\"><td>{name}</td><td class=\"num\"><b>{EXEMPT_LABEL}</b></td>"
        );
        let _ = write!(
            output,
            "<td class=\"num\">{NOT_COMPUTED}</td><td class=\"num\">{NOT_COMPUTED}</td><td class=\"num\">{EXEMPT_LABEL}</td>"
        );
        for _ in 0..7 {
            let _ = write!(output, "<td class=\"num\">{NOT_COMPUTED}</td>");
        }
        let _ = writeln!(output, "</tr>");
        return;
    };

    let _ = writeln!(
        output,
        "<tr><td>{name}</td><td class=\"num\"><b>{}</b></td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}%</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\"><b>{}%</b></td></tr>",
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

fn stat_box(output: &mut String, label: &str, value: &str) {
    let _ = writeln!(
        output,
        "<div class=\"stat-box\"><div class=\"stat-label\">{label}</div><div class=\"stat-val\">{value}</div></div>"
    );
}

pub fn render_analysis_html(
    snapshot: &AnalysisSnapshot,
    settings: &InstitutionSettings,
    today: NaiveDate,
) -> String {
    let mut html = String::new();
    let title = "تقرير تحليل النتائج المدرسية";

    let _ = writeln!(html, "<!DOCTYPE html>");
    let _ = writeln!(html, "<html lang=\"ar\" dir=\"rtl\">");
    let _ = writeln!(html, "<head>");
    let _ = writeln!(html, "<meta charset=\"UTF-8\">");
    let _ = writeln!(html, "<title>{title}</title>");
    let _ = writeln!(html, "<style>{STYLE}</style>");
    let _ = writeln!(html, "</head>");
    let _ = writeln!(html, "<body>");

    let _ = writeln!(html, "<div class=\"header\">");
    if let Some(logo) = settings.logo_url.as_deref().filter(|url| !url.is_empty()) {
        let _ = writeln!(
            html,
            "<img src=\"{}\" style=\"max-height: 80px; display: block; margin: 0 auto 10px;\" />",
            escape_html(logo)
        );
    }
    if !settings.institution_name.is_empty() {
        let _ = writeln!(
            html,
            "<div class=\"subtitle\">{}</div>",
            escape_html(&settings.institution_name)
        );
    }
    let _ = writeln!(html, "<div class=\"title\">{title}</div>");
    let _ = writeln!(html, "<div class=\"subtitle\">تاريخ الاستخراج: {today}</div>");
    let _ = writeln!(html, "</div>");

    let _ = writeln!(html, "<h3>أولاً: الإحصائيات العامة</h3>");
    let _ = writeln!(html, "<div class=\"grid-stats\">");
    stat_box(&mut html, "عدد التلاميذ", &snapshot.total_students.to_string());
    stat_box(
        &mut html,
        "نسبة النجاح العامة",
        &format!("{}%", to_fixed(snapshot.overall_pass_rate, 2)),
    );
    stat_box(
        &mut html,
        "المعدل العام للقسم",
        &to_fixed(snapshot.average_gpa, 2),
    );
    let _ = writeln!(html, "</div>");

    let _ = writeln!(html, "<div class=\"grid-stats\">");
    for (label, group) in [("الإناث", &snapshot.females), ("الذكور", &snapshot.males)] {
        stat_box(
            &mut html,
            &format!("معدل {label}"),
            &format!(
                "{} (نسبة النجاح: {}%)",
                to_fixed(group.average_gpa, 2),
                to_fixed(group.pass_rate, 1)
            ),
        );
    }
    let _ = writeln!(html, "</div>");

    let _ = writeln!(html, "<h3>ثانياً: التحليل التفصيلي للمواد</h3>");
    let _ = writeln!(html, "<table>");
    let _ = writeln!(
        html,
        "<thead><tr><th rowspan=\"2\">المادة</th><th rowspan=\"2\">المعدل العام</th><th colspan=\"2\">حسب الجنس</th><th rowspan=\"2\">المقارنة</th><th rowspan=\"2\">الانحراف</th><th rowspan=\"2\">التشتت</th><th colspan=\"4\">توزيع العلامات</th><th rowspan=\"2\">النجاح</th></tr>"
    );
    let _ = writeln!(
        html,
        "<tr><th>ذكور</th><th>إناث</th><th>&ge;15</th><th>10-15</th><th>8-10</th><th>&lt;8</th></tr></thead>"
    );
    let _ = writeln!(html, "<tbody>");
    for subject in &snapshot.subjects {
        subject_row(&mut html, subject);
    }
    let _ = writeln!(html, "</tbody>");
    let _ = writeln!(html, "</table>");

    let _ = writeln!(html, "<script>window.onload = function() {{ window.print(); }}</script>");
    let _ = writeln!(html, "</body>");
    let _ = writeln!(html, "</html>");
    html
}
