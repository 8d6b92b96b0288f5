//! Combining rosters from several mark sheets.

use clap::ValueEnum;
use schemars::JsonSchema;

use crate::{
    error::AnalysisError,
    prelude::*,
    roster::{Roster, Student},
};

/// What to record when a student's sheet lacks a subject that another sheet
/// has.
///
/// Either way the mark counts as 0 in totals and percentages. The difference
/// is whether the gap stays visible to reports.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum MissingSubjectPolicy {
    /// Record an explicit mark of 0.
    #[default]
    Zero,

    /// Leave the mark absent, so reports can show it as missing and
    /// [`StudentStats::missing_subjects`](crate::stats::StudentStats) counts
    /// it.
    Absent,
}

/// Merge rosters into one.
///
/// Students are concatenated in input order and never deduplicated. Subjects
/// are unioned in the order they're first seen. A single roster is returned
/// as-is, and an empty list is an error.
#[instrument(level = "debug", skip_all, fields(rosters = rosters.len()))]
pub fn merge(
    rosters: &[Arc<Roster>],
    missing: MissingSubjectPolicy,
) -> Result<Arc<Roster>, AnalysisError> {
    match rosters {
        [] => Err(AnalysisError::EmptyMergeInput),
        [roster] => Ok(roster.clone()),
        _ => {
            let mut subjects: Vec<String> = vec![];
            for roster in rosters {
                for subject in roster.subjects() {
                    if !subjects.contains(subject) {
                        subjects.push(subject.clone());
                    }
                }
            }

            let students = rosters
                .iter()
                .flat_map(|roster| roster.students())
                .map(|student| fill_missing(student, &subjects, missing))
                .collect();

            Ok(Arc::new(Roster::new(subjects, students)))
        }
    }
}

/// Copy `student`, adding entries for any of `subjects` it lacks.
fn fill_missing(
    student: &Student,
    subjects: &[String],
    missing: MissingSubjectPolicy,
) -> Student {
    let mut student = student.clone();
    for subject in subjects {
        student
            .marks
            .entry(subject.clone())
            .or_insert_with(|| match missing {
                MissingSubjectPolicy::Zero => Some(0.0),
                MissingSubjectPolicy::Absent => None,
            });
    }
    student
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        extraction::generator::generate,
        stats::{AnalysisConfig, all_student_stats},
    };

    fn roster(subjects: &[&str], students: Vec<Student>) -> Arc<Roster> {
        Arc::new(Roster::new(
            subjects.iter().map(|s| s.to_string()).collect(),
            students,
        ))
    }

    #[test]
    fn merging_nothing_is_an_error() {
        let err = merge(&[], MissingSubjectPolicy::Zero).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyMergeInput));
    }

    #[test]
    fn merging_one_roster_returns_it() {
        let r = Arc::new(generate(3));
        let merged = merge(&[r.clone()], MissingSubjectPolicy::Zero).unwrap();
        assert!(Arc::ptr_eq(&merged, &r));
    }

    #[test]
    fn merging_concatenates_students_in_order() {
        let a = Arc::new(generate(10));
        let b = Arc::new(generate(11));
        let merged = merge(&[a.clone(), b.clone()], MissingSubjectPolicy::Zero).unwrap();
        assert_eq!(
            merged.students().len(),
            a.students().len() + b.students().len()
        );
        assert_eq!(merged.students()[0], a.students()[0]);
        assert_eq!(merged.students()[a.students().len()], b.students()[0]);
        assert_eq!(merged.subjects(), a.subjects());
    }

    #[test]
    fn duplicate_names_are_kept() {
        let a = roster(&["math"], vec![Student::new("J. Smith", [("math", 40.0)])]);
        let b = roster(&["math"], vec![Student::new("J. Smith", [("math", 20.0)])]);
        let merged = merge(&[a, b], MissingSubjectPolicy::Zero).unwrap();
        assert_eq!(merged.students().len(), 2);
        assert_eq!(merged.class_average(), 30.0);
        assert_eq!(merged.cell_pass_percentage(), 100.0);
    }

    #[test]
    fn subjects_are_unioned_in_first_seen_order() {
        let a = roster(&["math", "sci"], vec![Student::new("A", [("math", 40.0), ("sci", 30.0)])]);
        let b = roster(&["art", "math"], vec![Student::new("B", [("art", 50.0), ("math", 10.0)])]);
        let merged = merge(&[a, b], MissingSubjectPolicy::Zero).unwrap();
        assert_eq!(merged.subjects(), ["math", "sci", "art"]);
        assert_eq!(merged.students()[0].marks["art"], Some(0.0));
        assert_eq!(merged.students()[1].marks["sci"], Some(0.0));
        // (40 + 30 + 0 + 10 + 0 + 50) / 6
        assert_eq!(merged.class_average(), 21.7);
    }

    #[test]
    fn absent_policy_leaves_gaps_visible() {
        let a = roster(&["math"], vec![Student::new("A", [("math", 40.0)])]);
        let b = roster(&["sci"], vec![Student::new("B", [("sci", 30.0)])]);
        let merged = merge(&[a, b], MissingSubjectPolicy::Absent).unwrap();
        assert_eq!(merged.students()[0].marks["sci"], None);

        let stats = all_student_stats(&merged, &AnalysisConfig::default());
        assert_eq!(stats[0].missing_subjects, 1);
        assert_eq!(stats[0].total, 40.0);
        assert_eq!(stats[0].percentage, 40.0);
    }
}
