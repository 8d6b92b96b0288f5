//! Our roster data types.
//!
//! A [`Roster`] is what we get from analyzing one or more mark sheets. It is
//! built once by [`Roster::new`] and never mutated afterwards.

use std::collections::BTreeMap;

use schemars::JsonSchema;

use crate::{prelude::*, stats::rounding::round_to};

/// The raw mark at or above which a single mark counts toward
/// [`Roster::cell_pass_percentage`].
///
/// This is unrelated to [`crate::stats::AnalysisConfig::pass_threshold`],
/// which classifies whole students by percentage.
pub const CELL_PASS_MARK: f64 = 20.0;

/// A single row of a mark sheet.
#[derive(Clone, Debug, JsonSchema, PartialEq, Serialize)]
pub struct Student {
    /// The student's name, as printed on the sheet. Not necessarily unique.
    pub name: String,

    /// Marks by subject name. `None` means the sheet had no mark for this
    /// subject.
    pub marks: BTreeMap<String, Option<f64>>,
}

impl Student {
    /// Create a new student from `(subject, mark)` pairs.
    pub fn new<S, I>(name: impl Into<String>, marks: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, f64)>,
    {
        Self {
            name: name.into(),
            marks: marks
                .into_iter()
                .map(|(subject, mark)| (subject.into(), Some(mark)))
                .collect(),
        }
    }

    /// The mark for `subject`, treating absent and non-finite marks as 0.
    pub fn mark(&self, subject: &str) -> f64 {
        match self.marks.get(subject) {
            Some(Some(mark)) if mark.is_finite() => *mark,
            _ => 0.0,
        }
    }

    /// Does this student have a usable mark for `subject`?
    pub fn has_mark(&self, subject: &str) -> bool {
        matches!(self.marks.get(subject), Some(Some(mark)) if mark.is_finite())
    }
}

/// The analysis of one or more mark sheets.
///
/// There is deliberately no `Deserialize` impl, because that would bypass
/// [`Roster::new`].
#[derive(Clone, Debug, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    /// Subject names, in display order.
    subjects: Vec<String>,

    /// Students, in sheet order.
    students: Vec<Student>,

    /// Mean of every mark on the roster, to one decimal.
    class_average: f64,

    /// Percentage of marks that are at least [`CELL_PASS_MARK`], to one
    /// decimal.
    #[serde(rename = "passPercentage")]
    cell_pass_percentage: f64,
}

impl Roster {
    /// Build a roster, computing its summary fields.
    ///
    /// Every student ends up with exactly one entry per subject: missing
    /// subjects are recorded as absent, and marks for subjects not in
    /// `subjects` are dropped.
    pub fn new(subjects: Vec<String>, students: Vec<Student>) -> Self {
        let students = students
            .into_iter()
            .map(|student| normalize_student(&subjects, student))
            .collect::<Vec<_>>();

        let mut total_marks = 0.0;
        let mut passing_cells = 0usize;
        let mut cell_count = 0usize;
        for student in &students {
            for subject in &subjects {
                let mark = student.mark(subject);
                total_marks += mark;
                cell_count += 1;
                if mark >= CELL_PASS_MARK {
                    passing_cells += 1;
                }
            }
        }

        let (class_average, cell_pass_percentage) = if cell_count == 0 {
            (0.0, 0.0)
        } else {
            (
                round_to(total_marks / cell_count as f64, 1),
                round_to(passing_cells as f64 / cell_count as f64 * 100.0, 1),
            )
        };

        Self {
            subjects,
            students,
            class_average,
            cell_pass_percentage,
        }
    }

    /// Our subject list.
    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    /// Our students.
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// Mean mark across every student and subject.
    pub fn class_average(&self) -> f64 {
        self.class_average
    }

    /// Share of individual marks at or above [`CELL_PASS_MARK`].
    pub fn cell_pass_percentage(&self) -> f64 {
        self.cell_pass_percentage
    }
}

/// Make `student.marks` line up with `subjects`.
fn normalize_student(subjects: &[String], mut student: Student) -> Student {
    let mut marks = BTreeMap::new();
    for subject in subjects {
        let mark = student.marks.remove(subject).flatten();
        marks.insert(subject.clone(), mark);
    }
    if !student.marks.is_empty() {
        debug!(
            student = %student.name,
            dropped = ?student.marks.keys().collect::<Vec<_>>(),
            "Dropping marks for subjects not on the roster"
        );
    }
    student.marks = marks;
    student
}
