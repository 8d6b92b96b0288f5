//! Views computed from a [`Roster`].
//!
//! Everything here is a pure function of a roster plus an [`AnalysisConfig`].
//! Nothing is cached and the roster is never modified. A zero divisor (no
//! students, no subjects, or zero max marks) gives a 0 result instead of an
//! error, because an empty roster is a perfectly ordinary thing to display.

use schemars::JsonSchema;
use toml_span::{DeserError, de_helpers::TableHelper};

use crate::{
    prelude::*,
    roster::{Roster, Student},
    toml_utils::TomlNumber,
};

use self::rounding::{round_to, safe_div};

pub mod report;
pub mod rounding;

/// Default maximum mark for a single subject.
pub const DEFAULT_MAX_MARKS_PER_SUBJECT: u32 = 50;

/// Default minimum percentage for a student to pass.
pub const DEFAULT_PASS_THRESHOLD: f64 = 40.0;

/// Settings supplied with each analysis request.
#[derive(Clone, Copy, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// The highest mark available in each subject.
    pub max_marks_per_subject: u32,

    /// The minimum overall percentage (0–100, inclusive) needed to pass.
    pub pass_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_marks_per_subject: DEFAULT_MAX_MARKS_PER_SUBJECT,
            pass_threshold: DEFAULT_PASS_THRESHOLD,
        }
    }
}

impl AnalysisConfig {
    /// Check that our settings make sense.
    pub fn validate(&self) -> Result<()> {
        if self.max_marks_per_subject == 0 {
            return Err(anyhow!("max marks per subject must be at least 1"));
        }
        if !(0.0..=100.0).contains(&self.pass_threshold) {
            return Err(anyhow!(
                "pass threshold must be between 0 and 100, not {}",
                self.pass_threshold
            ));
        }
        Ok(())
    }

    fn max_marks(&self) -> f64 {
        f64::from(self.max_marks_per_subject)
    }
}

impl<'de> toml_span::Deserialize<'de> for AnalysisConfig {
    fn deserialize(value: &mut toml_span::Value<'de>) -> Result<Self, DeserError> {
        let defaults = Self::default();
        let mut th = TableHelper::new(value)?;
        let max_marks_per_subject = th
            .optional("max_marks_per_subject")
            .unwrap_or(defaults.max_marks_per_subject);
        let pass_threshold = th
            .optional::<TomlNumber>("pass_threshold")
            .map(TomlNumber::into_f64)
            .unwrap_or(defaults.pass_threshold);
        th.finalize(None)?;
        Ok(Self {
            max_marks_per_subject,
            pass_threshold,
        })
    }
}

/// Totals and percentage for a single student.
#[derive(Clone, Debug, JsonSchema, PartialEq, Serialize)]
pub struct StudentStats {
    /// The student's name.
    pub name: String,

    /// Sum of all marks.
    pub total: f64,

    /// Mean mark per subject, to two decimals.
    pub average: f64,

    /// `total` as a percentage of the maximum possible, to one decimal.
    pub percentage: f64,

    /// Is `percentage` at least the pass threshold?
    pub passing: bool,

    /// How many subjects had no mark on this student's sheet. These were
    /// counted as 0.
    pub missing_subjects: usize,
}

/// Compute [`StudentStats`] for one student of `roster`.
pub fn student_stats(
    roster: &Roster,
    student: &Student,
    config: &AnalysisConfig,
) -> StudentStats {
    let subjects = roster.subjects();
    let total: f64 = subjects.iter().map(|s| student.mark(s)).sum();
    let missing_subjects = subjects.iter().filter(|s| !student.has_mark(s)).count();
    let subject_count = subjects.len() as f64;
    let percentage = round_to(
        safe_div(total, subject_count * config.max_marks()) * 100.0,
        1,
    );
    StudentStats {
        name: student.name.clone(),
        total,
        average: round_to(safe_div(total, subject_count), 2),
        percentage,
        passing: percentage >= config.pass_threshold,
        missing_subjects,
    }
}

/// Stats for every student, in roster order.
pub fn all_student_stats(roster: &Roster, config: &AnalysisConfig) -> Vec<StudentStats> {
    roster
        .students()
        .iter()
        .map(|student| student_stats(roster, student, config))
        .collect()
}

/// A student's place in the topper list.
#[derive(Clone, Debug, JsonSchema, PartialEq, Serialize)]
pub struct RankedStudent {
    /// 1-based position in the list. Tied students get consecutive ranks.
    pub rank: usize,

    #[serde(flatten)]
    pub stats: StudentStats,
}

/// Every student, highest total first.
///
/// Students with equal totals stay in roster order.
pub fn topper_list(roster: &Roster, config: &AnalysisConfig) -> Vec<RankedStudent> {
    let mut stats = all_student_stats(roster, config);
    // `sort_by` is stable, which gives us our tie-break for free.
    stats.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    stats
        .into_iter()
        .enumerate()
        .map(|(idx, stats)| RankedStudent {
            rank: idx + 1,
            stats,
        })
        .collect()
}

/// The best student in a subject.
#[derive(Clone, Debug, JsonSchema, PartialEq, Serialize)]
pub struct SubjectTopper {
    pub subject: String,
    pub topper_name: String,
    pub marks: f64,
    /// `marks` as a percentage of the subject maximum, to one decimal.
    pub percentage: f64,
}

/// The top student in each subject. The first student with the highest mark
/// wins. Returns nothing for a roster without students.
pub fn subject_toppers(roster: &Roster, config: &AnalysisConfig) -> Vec<SubjectTopper> {
    let mut toppers = vec![];
    for subject in roster.subjects() {
        let mut best: Option<&Student> = None;
        for student in roster.students() {
            match best {
                Some(current) if student.mark(subject) <= current.mark(subject) => {}
                _ => best = Some(student),
            }
        }
        if let Some(student) = best {
            let marks = student.mark(subject);
            toppers.push(SubjectTopper {
                subject: subject.clone(),
                topper_name: student.name.clone(),
                marks,
                percentage: round_to(safe_div(marks, config.max_marks()) * 100.0, 1),
            });
        }
    }
    toppers
}

/// The class average for one subject.
#[derive(Clone, Debug, JsonSchema, PartialEq, Serialize)]
pub struct SubjectAverage {
    pub subject: String,
    /// Mean mark, to two decimals.
    pub average: f64,
    /// The rounded `average` as a percentage of the subject maximum, to one
    /// decimal.
    pub percentage: f64,
}

/// Mean marks per subject.
pub fn subject_averages(roster: &Roster, config: &AnalysisConfig) -> Vec<SubjectAverage> {
    let student_count = roster.students().len() as f64;
    roster
        .subjects()
        .iter()
        .map(|subject| {
            let total: f64 = roster.students().iter().map(|s| s.mark(subject)).sum();
            let average = round_to(safe_div(total, student_count), 2);
            SubjectAverage {
                subject: subject.clone(),
                average,
                percentage: round_to(safe_div(average, config.max_marks()) * 100.0, 1),
            }
        })
        .collect()
}

/// The class average across all subjects.
#[derive(Clone, Debug, JsonSchema, PartialEq, Serialize)]
pub struct OverallAverage {
    /// Mean of every mark, to two decimals.
    pub average: f64,
    /// The rounded `average` as a percentage of the subject maximum, to one
    /// decimal.
    pub percentage: f64,
}

/// Mean mark over every student and subject.
pub fn overall_average(roster: &Roster, config: &AnalysisConfig) -> OverallAverage {
    let cell_count = (roster.students().len() * roster.subjects().len()) as f64;
    let total: f64 = roster
        .students()
        .iter()
        .flat_map(|student| roster.subjects().iter().map(|s| student.mark(s)))
        .sum();
    let average = round_to(safe_div(total, cell_count), 2);
    OverallAverage {
        average,
        percentage: round_to(safe_div(average, config.max_marks()) * 100.0, 1),
    }
}

/// How many students passed, using [`AnalysisConfig::pass_threshold`].
///
/// Not to be confused with [`Roster::cell_pass_percentage`], which counts
/// individual marks against a fixed raw mark.
#[derive(Clone, Debug, JsonSchema, PartialEq, Serialize)]
pub struct PassFailSplit {
    /// The threshold used.
    pub threshold: f64,
    pub passed: usize,
    pub failed: usize,
    /// Share of students passing, to one decimal.
    pub pass_percentage: f64,
    /// Share of students failing, to one decimal.
    pub fail_percentage: f64,
}

/// Count passing and failing students.
pub fn pass_fail_split(roster: &Roster, config: &AnalysisConfig) -> PassFailSplit {
    let stats = all_student_stats(roster, config);
    let passed = stats.iter().filter(|s| s.passing).count();
    let failed = stats.len() - passed;
    let student_count = stats.len() as f64;
    PassFailSplit {
        threshold: config.pass_threshold,
        passed,
        failed,
        pass_percentage: round_to(safe_div(passed as f64, student_count) * 100.0, 1),
        fail_percentage: round_to(safe_div(failed as f64, student_count) * 100.0, 1),
    }
}

/// Does a single subject mark meet the pass threshold on its own?
pub fn mark_passes(mark: f64, config: &AnalysisConfig) -> bool {
    safe_div(mark, config.max_marks()) * 100.0 >= config.pass_threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(subjects: &[&str], students: Vec<Student>) -> Roster {
        Roster::new(subjects.iter().map(|s| s.to_string()).collect(), students)
    }

    fn config(max_marks_per_subject: u32, pass_threshold: f64) -> AnalysisConfig {
        AnalysisConfig {
            max_marks_per_subject,
            pass_threshold,
        }
    }

    fn a_and_b() -> Roster {
        roster(
            &["math", "sci"],
            vec![
                Student::new("A", [("math", 90.0), ("sci", 80.0)]),
                Student::new("B", [("math", 95.0), ("sci", 85.0)]),
            ],
        )
    }

    #[test]
    fn topper_list_ranks_by_total() {
        let toppers = topper_list(&a_and_b(), &config(100, 40.0));
        assert_eq!(toppers.len(), 2);
        assert_eq!(toppers[0].rank, 1);
        assert_eq!(toppers[0].stats.name, "B");
        assert_eq!(toppers[0].stats.total, 180.0);
        assert_eq!(toppers[0].stats.percentage, 90.0);
        assert_eq!(toppers[1].stats.name, "A");
        assert_eq!(toppers[1].stats.total, 170.0);
        assert_eq!(toppers[1].stats.percentage, 85.0);
        assert_eq!(toppers[1].stats.average, 85.0);
    }

    #[test]
    fn topper_list_keeps_roster_order_for_ties() {
        let r = roster(
            &["math"],
            vec![
                Student::new("first", [("math", 30.0)]),
                Student::new("top", [("math", 45.0)]),
                Student::new("second", [("math", 30.0)]),
            ],
        );
        let names = topper_list(&r, &AnalysisConfig::default())
            .into_iter()
            .map(|t| t.stats.name)
            .collect::<Vec<_>>();
        assert_eq!(names, ["top", "first", "second"]);
    }

    #[test]
    fn percentages_are_not_clamped() {
        // Marks above the maximum are reported as-is.
        let toppers = topper_list(&a_and_b(), &config(50, 40.0));
        assert_eq!(toppers[1].stats.percentage, 170.0);
    }

    #[test]
    fn pass_threshold_is_inclusive() {
        // 20 / 50 = exactly 40%.
        let r = roster(&["math"], vec![Student::new("A", [("math", 20.0)])]);
        let stats = all_student_stats(&r, &config(50, 40.0));
        assert_eq!(stats[0].percentage, 40.0);
        assert!(stats[0].passing);
        assert!(mark_passes(20.0, &config(50, 40.0)));
        assert!(!mark_passes(19.9, &config(50, 40.0)));
    }

    #[test]
    fn empty_roster_gives_empty_views() {
        let r = roster(&["math", "sci"], vec![]);
        let cfg = AnalysisConfig::default();
        assert!(topper_list(&r, &cfg).is_empty());
        assert!(subject_toppers(&r, &cfg).is_empty());
        let averages = subject_averages(&r, &cfg);
        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0].average, 0.0);
        let split = pass_fail_split(&r, &cfg);
        assert_eq!((split.passed, split.failed), (0, 0));
        assert_eq!(split.pass_percentage, 0.0);
        assert_eq!(split.fail_percentage, 0.0);
        assert_eq!(overall_average(&r, &cfg).average, 0.0);
    }

    #[test]
    fn no_subjects_or_zero_max_marks_give_zero() {
        let r = roster(&[], vec![Student::new("A", [("math", 20.0)])]);
        let stats = all_student_stats(&r, &AnalysisConfig::default());
        assert_eq!(stats[0].total, 0.0);
        assert_eq!(stats[0].average, 0.0);
        assert_eq!(stats[0].percentage, 0.0);

        let r = roster(&["math"], vec![Student::new("A", [("math", 20.0)])]);
        let stats = all_student_stats(&r, &config(0, 40.0));
        assert_eq!(stats[0].percentage, 0.0);
        assert!(!stats[0].passing);
    }

    #[test]
    fn subject_topper_ties_go_to_earlier_student() {
        let r = roster(
            &["math", "sci"],
            vec![
                Student::new("A", [("math", 40.0), ("sci", 10.0)]),
                Student::new("B", [("math", 40.0), ("sci", 35.0)]),
            ],
        );
        let toppers = subject_toppers(&r, &AnalysisConfig::default());
        assert_eq!(toppers[0].subject, "math");
        assert_eq!(toppers[0].topper_name, "A");
        assert_eq!(toppers[0].percentage, 80.0);
        assert_eq!(toppers[1].topper_name, "B");
        assert_eq!(toppers[1].marks, 35.0);
    }

    #[test]
    fn subject_and_overall_averages_round() {
        let r = roster(
            &["math"],
            vec![
                Student::new("A", [("math", 10.0)]),
                Student::new("B", [("math", 10.0)]),
                Student::new("C", [("math", 11.0)]),
            ],
        );
        let averages = subject_averages(&r, &AnalysisConfig::default());
        assert_eq!(averages[0].average, 10.33);
        assert_eq!(averages[0].percentage, 20.7);
        let overall = overall_average(&r, &AnalysisConfig::default());
        assert_eq!(overall.average, 10.33);
    }

    #[test]
    fn pass_fail_split_counts_students() {
        let r = roster(
            &["math"],
            vec![
                Student::new("A", [("math", 45.0)]),
                Student::new("B", [("math", 10.0)]),
                Student::new("C", [("math", 30.0)]),
            ],
        );
        let split = pass_fail_split(&r, &AnalysisConfig::default());
        assert_eq!(split.passed, 2);
        assert_eq!(split.failed, 1);
        assert_eq!(split.pass_percentage, 66.7);
        assert_eq!(split.fail_percentage, 33.3);
    }

    #[test]
    fn missing_subjects_are_counted() {
        let r = roster(&["math", "sci"], vec![Student::new("A", [("math", 45.0)])]);
        let stats = all_student_stats(&r, &AnalysisConfig::default());
        assert_eq!(stats[0].missing_subjects, 1);
        assert_eq!(stats[0].total, 45.0);
        assert_eq!(stats[0].percentage, 45.0);
    }

    #[test]
    fn validate_rejects_bad_settings() {
        assert!(AnalysisConfig::default().validate().is_ok());
        assert!(config(0, 40.0).validate().is_err());
        assert!(config(50, 120.0).validate().is_err());
        assert!(config(50, -1.0).validate().is_err());
    }

    #[test]
    fn config_parses_from_toml() {
        let cfg: AnalysisConfig = crate::toml_utils::from_toml_str(
            "max_marks_per_subject = 100\npass_threshold = 35\n",
        )
        .unwrap();
        assert_eq!(cfg, config(100, 35.0));

        let cfg: AnalysisConfig =
            crate::toml_utils::from_toml_str("pass_threshold = 32.5\n").unwrap();
        assert_eq!(cfg, config(50, 32.5));

        assert!(
            crate::toml_utils::from_toml_str::<AnalysisConfig>("bogus = 1\n").is_err()
        );
    }

    #[test]
    fn config_parses_from_json_with_defaults() {
        let cfg: AnalysisConfig =
            serde_json::from_str(r#"{ "max_marks_per_subject": 100 }"#).unwrap();
        assert_eq!(cfg, config(100, 40.0));
    }
}
