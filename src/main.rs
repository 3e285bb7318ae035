use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use log::warn;

use counseling_analytics::attendance::summarize_attendance;
use counseling_analytics::config::Config;
use counseling_analytics::models::{ImportMode, Severity};
use counseling_analytics::report::ListKind;
use counseling_analytics::roster::{self, Roster};
use counseling_analytics::transcript::analyze_transcript;
use counseling_analytics::{analysis, export, import, insight, print, report};

#[derive(Parser)]
#[command(name = "counseling-analytics")]
#[command(about = "Academic results analysis for school counseling offices", long_about = None)]
struct Cli {
    /// Roster JSON file (defaults to $COUNSELING_ROSTER, then roster.json)
    #[arg(long, global = true)]
    roster: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SeverityArg {
    Low,
    Medium,
    High,
}

impl From<SeverityArg> for Severity {
    fn from(value: SeverityArg) -> Self {
        match value {
            SeverityArg::Low => Severity::Low,
            SeverityArg::Medium => Severity::Medium,
            SeverityArg::High => Severity::High,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty roster file
    Init,
    /// Replace the roster with realistic demo data
    Seed,
    /// Import a results sheet saved as CSV
    Import {
        #[arg(long)]
        file: PathBuf,
        /// Stamp the records as last year's annual averages
        #[arg(long)]
        previous: bool,
    },
    /// Record a behavior log entry
    Log {
        #[arg(long)]
        student: String,
        #[arg(long, allow_hyphen_values = true)]
        points: i32,
        #[arg(long)]
        description: String,
        #[arg(long, value_enum)]
        severity: Option<SeverityArg>,
    },
    /// Print the class analysis as markdown
    Analyze {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Export the analysis as summary and subject sheets
    Export {
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Write a printable HTML analysis
    Print {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate one of the student lists
    Report {
        #[arg(long, value_enum, default_value_t = ListKind::Critical)]
        kind: ListKind,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show a student's latest transcript with observations
    Transcript {
        #[arg(long)]
        student: String,
    },
    /// Summarize a student's attendance for the current school year
    Attendance {
        #[arg(long)]
        student: String,
    },
}

fn emit(text: &str, out: Option<PathBuf>) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(&path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Report written to {}.", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("counseling_analytics=info"),
    )
    .init();

    let cli = Cli::parse();
    let out_dir_flag = match &cli.command {
        Commands::Export { out_dir } => out_dir.clone(),
        _ => None,
    };
    let config = Config::resolve(cli.roster, out_dir_flag);
    let today = Local::now().date_naive();

    match cli.command {
        Commands::Init => {
            if config.roster_path.exists() {
                warn!("{} already exists, leaving it untouched", config.roster_path.display());
            } else {
                Roster::default().save(&config.roster_path)?;
            }
            println!("Roster ready at {}.", config.roster_path.display());
        }
        Commands::Seed => {
            let mut roster = roster::seed(today)?;
            roster.save(&config.roster_path)?;
            println!("Seed data written to {}.", config.roster_path.display());
        }
        Commands::Import { file, previous } => {
            let mode = if previous {
                ImportMode::Previous
            } else {
                ImportMode::Current
            };
            let outcome = import::import_csv_file(&file, mode, today)
                .with_context(|| format!("could not import {}", file.display()))?;
            let imported = outcome.students.len();
            let school = outcome.institution_name.clone();
            let class_name = outcome.class_name.clone();

            let mut roster = Roster::load(&config.roster_path)?;
            let summary = roster.merge_import(outcome);
            roster.save(&config.roster_path)?;
            println!(
                "Imported {imported} students for {school} / {class_name} ({} new, {} updated).",
                summary.created, summary.updated
            );
        }
        Commands::Log {
            student,
            points,
            description,
            severity,
        } => {
            let mut roster = Roster::load(&config.roster_path)?;
            let timestamp = Local::now().naive_local();
            roster.add_log(&student, points, &description, severity.map(Severity::from), timestamp)?;
            let total = roster
                .find_student(&student)
                .map(|s| s.total_points)
                .unwrap_or_default();
            roster.save(&config.roster_path)?;
            println!("Logged {points} points for {student}; balance {total}.");
        }
        Commands::Analyze { out } => {
            let roster = Roster::load(&config.roster_path)?;
            let snapshot = analysis::compute_snapshot(&roster.students);
            let categories = insight::categorize(&roster.students);
            let text = report::build_analysis_report(&snapshot, &categories, &roster.settings, today);
            emit(&text, out)?;
        }
        Commands::Export { .. } => {
            let roster = Roster::load(&config.roster_path)?;
            let snapshot = analysis::compute_snapshot(&roster.students);
            let (summary, subjects) = export::write_workbook(&config.out_dir, &snapshot, today)?;
            println!(
                "Exported {} and {}.",
                summary.display(),
                subjects.display()
            );
        }
        Commands::Print { out } => {
            let roster = Roster::load(&config.roster_path)?;
            let snapshot = analysis::compute_snapshot(&roster.students);
            let html = print::render_analysis_html(&snapshot, &roster.settings, today);
            let path = out.unwrap_or_else(|| config.out_path("analysis.html"));
            std::fs::write(&path, html)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Printable analysis written to {}.", path.display());
        }
        Commands::Report {
            kind,
            from,
            to,
            out,
        } => {
            let roster = Roster::load(&config.roster_path)?;
            let text = report::build_list_report(
                kind,
                &roster.students,
                &roster.logs,
                from,
                to.unwrap_or(today),
            );
            emit(&text, out)?;
        }
        Commands::Transcript { student } => {
            let roster = Roster::load(&config.roster_path)?;
            let record = roster
                .find_student(&student)
                .with_context(|| format!("no student named {student:?}"))?;
            match analyze_transcript(record) {
                Some(transcript) => print!("{}", report::build_transcript(&transcript)),
                None => println!("{student} has no imported results yet."),
            }
        }
        Commands::Attendance { student } => {
            let roster = Roster::load(&config.roster_path)?;
            let record = roster
                .find_student(&student)
                .with_context(|| format!("no student named {student:?}"))?;
            let summary =
                summarize_attendance(&record.attendance_records, record.enrollment_date, today);
            println!(
                "{}: {} school days, {} present, {} absent, {} excused, {} late, rate {}%",
                record.name,
                summary.school_days,
                summary.present,
                summary.absent,
                summary.excused,
                summary.late,
                summary.rate
            );
        }
    }

    Ok(())
}
