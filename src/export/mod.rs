//! Output formats for an [`AnalysisReport`].
//!
//! Exporters only format what the report already contains. They never compute
//! statistics of their own.

use std::collections::BTreeSet;

use clap::ValueEnum;

use crate::{
    prelude::*,
    roster::{Roster, Student},
    stats::{
        AnalysisConfig, OverallAverage, PassFailSplit, RankedStudent, StudentStats,
        SubjectAverage, SubjectTopper, report::AnalysisReport,
    },
};

pub mod csv;
pub mod text;

/// The output formats we support.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// The full report as pretty-printed JSON.
    #[default]
    Json,
    /// A spreadsheet-friendly table of students.
    Csv,
    /// A plain-text report.
    Text,
    /// A plain-text report laid out as tables.
    Table,
}

/// Optional parts of a report.
///
/// The class summary and the per-student marks are always written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum ReportSection {
    /// Students ranked by total.
    Toppers,
    /// Every student's total and percentage, plus subject and overall
    /// averages.
    Averages,
    /// The best student in each subject.
    SubjectToppers,
    /// How many students passed at the configured threshold.
    PassFail,
}

/// The set of [`ReportSection`]s to write. Always written in a fixed order,
/// whatever order they were asked for in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sections(BTreeSet<ReportSection>);

impl Sections {
    /// Every section.
    pub fn all() -> Self {
        Self(ReportSection::value_variants().iter().copied().collect())
    }

    /// The sections in `selected`, or every section if nothing was selected.
    pub fn from_selected(selected: &[ReportSection]) -> Self {
        if selected.is_empty() {
            Self::all()
        } else {
            Self(selected.iter().copied().collect())
        }
    }

    /// Should we write `section`?
    pub fn includes(&self, section: ReportSection) -> bool {
        self.0.contains(&section)
    }
}

/// The JSON form of a report, leaving out unselected sections.
#[derive(Serialize)]
struct SelectedReport<'a> {
    config: &'a AnalysisConfig,
    roster: &'a Roster,
    #[serde(skip_serializing_if = "Option::is_none")]
    students: Option<&'a [StudentStats]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    toppers: Option<&'a [RankedStudent]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject_toppers: Option<&'a [SubjectTopper]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject_averages: Option<&'a [SubjectAverage]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    overall_average: Option<&'a OverallAverage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pass_fail: Option<&'a PassFailSplit>,
}

impl<'a> SelectedReport<'a> {
    fn new(report: &'a AnalysisReport, sections: &Sections) -> Self {
        let averages = sections.includes(ReportSection::Averages);
        Self {
            config: &report.config,
            roster: &report.roster,
            students: averages.then_some(report.students.as_slice()),
            toppers: sections
                .includes(ReportSection::Toppers)
                .then_some(report.toppers.as_slice()),
            subject_toppers: sections
                .includes(ReportSection::SubjectToppers)
                .then_some(report.subject_toppers.as_slice()),
            subject_averages: averages.then_some(report.subject_averages.as_slice()),
            overall_average: averages.then_some(&report.overall_average),
            pass_fail: sections
                .includes(ReportSection::PassFail)
                .then_some(&report.pass_fail),
        }
    }
}

/// Render the selected `sections` of `report` in `format`.
pub fn render(
    report: &AnalysisReport,
    format: ExportFormat,
    sections: &Sections,
) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Json => {
            let mut json =
                serde_json::to_vec_pretty(&SelectedReport::new(report, sections))
                    .context("failed to serialize report")?;
            json.push(b'\n');
            Ok(json)
        }
        ExportFormat::Csv => csv::render_csv(report, sections),
        ExportFormat::Text => Ok(text::render_text(report, sections)?.into_bytes()),
        ExportFormat::Table => Ok(text::render_tables(report, sections)?.into_bytes()),
    }
}

/// Format a mark for display, showing absent marks as `-`.
fn display_mark(student: &Student, subject: &str) -> String {
    if student.has_mark(subject) {
        student.mark(subject).to_string()
    } else {
        "-".to_owned()
    }
}
