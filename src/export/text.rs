//! Plain-text reports.

use std::fmt::{self, Write as _};

use crate::{
    prelude::*,
    stats::{mark_passes, report::AnalysisReport},
};

use super::{ReportSection, Sections, display_mark};

/// Width of the name column in tables.
const NAME_WIDTH: usize = 24;

/// Width of a numeric column in tables.
const NUM_WIDTH: usize = 10;

/// Render a readable report, one block per selected section.
pub fn render_text(report: &AnalysisReport, sections: &Sections) -> Result<String> {
    let mut out = String::new();
    write_text(&mut out, report, sections).context("failed to format text report")?;
    Ok(out)
}

/// Render the report as aligned tables, flagging marks below the pass
/// threshold with `*`.
pub fn render_tables(report: &AnalysisReport, sections: &Sections) -> Result<String> {
    let mut out = String::new();
    write_tables(&mut out, report, sections).context("failed to format table report")?;
    Ok(out)
}

fn write_text(out: &mut String, report: &AnalysisReport, sections: &Sections) -> fmt::Result {
    write_summary(out, report, sections)?;

    if sections.includes(ReportSection::Toppers) {
        writeln!(out, "\nTop students")?;
        for ranked in &report.toppers {
            writeln!(
                out,
                "  {:>3}. {} ({} marks, {}%)",
                ranked.rank, ranked.stats.name, ranked.stats.total, ranked.stats.percentage
            )?;
        }
    }

    if sections.includes(ReportSection::Averages) {
        writeln!(out, "\nAll students")?;
        for (idx, stats) in report.students.iter().enumerate() {
            writeln!(
                out,
                "  {:>3}. {} ({} marks, {}%)",
                idx + 1,
                stats.name,
                stats.total,
                stats.percentage
            )?;
        }

        writeln!(out, "\nSubject averages")?;
        for avg in &report.subject_averages {
            writeln!(out, "  {}: {} ({}%)", avg.subject, avg.average, avg.percentage)?;
        }
    }

    if sections.includes(ReportSection::SubjectToppers) {
        writeln!(out, "\nSubject toppers")?;
        for topper in &report.subject_toppers {
            writeln!(
                out,
                "  {}: {} ({} marks, {}%)",
                topper.subject, topper.topper_name, topper.marks, topper.percentage
            )?;
        }
    }
    Ok(())
}

fn write_tables(
    out: &mut String,
    report: &AnalysisReport,
    sections: &Sections,
) -> fmt::Result {
    let roster = &report.roster;
    write_summary(out, report, sections)?;
    writeln!(out)?;

    write!(out, "{:<NAME_WIDTH$}", "Name")?;
    for subject in roster.subjects() {
        write!(out, "{subject:>NUM_WIDTH$}")?;
    }
    writeln!(
        out,
        "{:>NUM_WIDTH$}{:>NUM_WIDTH$}{:>NUM_WIDTH$}",
        "Total", "Percent", "Result"
    )?;

    for (student, stats) in roster.students().iter().zip(&report.students) {
        write!(out, "{:<NAME_WIDTH$}", student.name)?;
        for subject in roster.subjects() {
            let mut cell = display_mark(student, subject);
            if student.has_mark(subject)
                && !mark_passes(student.mark(subject), &report.config)
            {
                cell.push('*');
            }
            write!(out, "{cell:>NUM_WIDTH$}")?;
        }
        let result = if stats.passing { "Pass" } else { "Fail" };
        writeln!(
            out,
            "{:>NUM_WIDTH$}{:>NUM_WIDTH$}{result:>NUM_WIDTH$}",
            stats.total,
            format!("{}%", stats.percentage),
        )?;
    }
    writeln!(out, "* below the pass threshold")?;

    if sections.includes(ReportSection::Toppers) {
        writeln!(
            out,
            "\n{:>4}  {:<NAME_WIDTH$}{:>NUM_WIDTH$}{:>NUM_WIDTH$}",
            "Rank", "Topper", "Total", "Percent"
        )?;
        for ranked in &report.toppers {
            writeln!(
                out,
                "{:>4}  {:<NAME_WIDTH$}{:>NUM_WIDTH$}{:>NUM_WIDTH$}",
                ranked.rank,
                ranked.stats.name,
                ranked.stats.total,
                format!("{}%", ranked.stats.percentage),
            )?;
        }
    }

    if sections.includes(ReportSection::SubjectToppers) {
        writeln!(
            out,
            "\n{:<NAME_WIDTH$}{:<NAME_WIDTH$}{:>NUM_WIDTH$}{:>NUM_WIDTH$}",
            "Subject", "Topper", "Marks", "Percent"
        )?;
        for topper in &report.subject_toppers {
            writeln!(
                out,
                "{:<NAME_WIDTH$}{:<NAME_WIDTH$}{:>NUM_WIDTH$}{:>NUM_WIDTH$}",
                topper.subject,
                topper.topper_name,
                topper.marks,
                format!("{}%", topper.percentage),
            )?;
        }
    }

    if sections.includes(ReportSection::Averages) {
        writeln!(
            out,
            "\n{:<NAME_WIDTH$}{:>NUM_WIDTH$}{:>NUM_WIDTH$}",
            "Subject", "Average", "Percent"
        )?;
        for avg in &report.subject_averages {
            writeln!(
                out,
                "{:<NAME_WIDTH$}{:>NUM_WIDTH$}{:>NUM_WIDTH$}",
                avg.subject,
                avg.average,
                format!("{}%", avg.percentage),
            )?;
        }
    }
    Ok(())
}

/// The class-wide numbers shared by both reports.
fn write_summary(
    out: &mut String,
    report: &AnalysisReport,
    sections: &Sections,
) -> fmt::Result {
    let roster = &report.roster;
    writeln!(
        out,
        "Students: {}    Subjects: {}",
        roster.students().len(),
        roster.subjects().len()
    )?;
    writeln!(out, "Class average: {}", roster.class_average())?;
    if sections.includes(ReportSection::Averages) {
        writeln!(
            out,
            "Overall average: {} ({}%)",
            report.overall_average.average, report.overall_average.percentage
        )?;
    }
    writeln!(
        out,
        "Mark-level pass rate (marks ≥ 20): {}%",
        roster.cell_pass_percentage()
    )?;
    if sections.includes(ReportSection::PassFail) {
        let split = &report.pass_fail;
        writeln!(
            out,
            "Students passing (≥ {}%): {} of {} ({}%), failing: {} ({}%)",
            split.threshold,
            split.passed,
            split.passed + split.failed,
            split.pass_percentage,
            split.failed,
            split.fail_percentage
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        roster::{Roster, Student},
        stats::AnalysisConfig,
    };

    fn report() -> AnalysisReport {
        let roster = Roster::new(
            vec!["math".to_owned(), "sci".to_owned()],
            vec![
                Student::new("Sam", [("math", 10.0)]),
                Student::new("Avery", [("math", 45.0), ("sci", 32.5)]),
            ],
        );
        AnalysisReport::build(Arc::new(roster), AnalysisConfig::default())
    }

    #[test]
    fn text_report_lists_every_view() -> Result<()> {
        let text = render_text(&report(), &Sections::all())?;
        assert!(text.contains("Class average: 21.9"));
        assert!(text.contains("Mark-level pass rate (marks ≥ 20): 50%"));
        assert!(text.contains("Students passing (≥ 40%): 1 of 2 (50%), failing: 1 (50%)"));
        assert!(text.contains("Top students\n    1. Avery (77.5 marks, 77.5%)"));
        assert!(text.contains("    2. Sam (10 marks, 10%)"));
        assert!(text.contains("All students\n    1. Sam (10 marks, 10%)\n    2. Avery"));
        assert!(text.contains("  math: Avery (45 marks, 90%)"));
        assert!(text.contains("  sci: 16.25 (32.5%)"));
        Ok(())
    }

    #[test]
    fn text_report_writes_only_selected_sections() -> Result<()> {
        let sections = Sections::from_selected(&[ReportSection::Toppers]);
        let text = render_text(&report(), &sections)?;
        assert!(text.contains("Class average: 21.9"));
        assert!(text.contains("Mark-level pass rate"));
        assert!(text.contains("Top students"));
        assert!(!text.contains("All students"));
        assert!(!text.contains("Subject averages"));
        assert!(!text.contains("Subject toppers"));
        assert!(!text.contains("Students passing"));
        assert!(!text.contains("Overall average"));
        Ok(())
    }

    #[test]
    fn table_flags_failing_marks_and_absent_ones() -> Result<()> {
        let table = render_tables(&report(), &Sections::all())?;
        let sam = table
            .lines()
            .find(|line| line.starts_with("Sam"))
            .expect("row for Sam");
        assert!(sam.contains("10*"));
        assert!(sam.contains(" -"));
        assert!(sam.ends_with("Fail"));
        let avery = table
            .lines()
            .find(|line| line.starts_with("Avery"))
            .expect("row for Avery");
        assert!(!avery.contains('*'));
        assert!(avery.ends_with("Pass"));
        Ok(())
    }

    #[test]
    fn table_writes_only_selected_sections() -> Result<()> {
        let sections = Sections::from_selected(&[ReportSection::SubjectToppers]);
        let table = render_tables(&report(), &sections)?;
        assert!(table.lines().any(|line| line.starts_with("Sam")));
        assert!(table.lines().any(|line| line.starts_with("Subject") && line.contains("Topper")));
        assert!(!table.contains("Rank"));
        assert!(!table.contains("Average"));
        assert!(!table.contains("Students passing"));
        Ok(())
    }
}
