//! Every view of a roster, bundled for exporters.

use schemars::JsonSchema;

use crate::{prelude::*, roster::Roster};

use super::{
    AnalysisConfig, OverallAverage, PassFailSplit, RankedStudent, StudentStats,
    SubjectAverage, SubjectTopper, all_student_stats, overall_average,
    pass_fail_split, subject_averages, subject_toppers, topper_list,
};

/// A roster together with all the statistics we know how to compute.
///
/// Exporters format this and nothing else, so they never need to do their own
/// arithmetic.
#[derive(Clone, Debug, JsonSchema, Serialize)]
pub struct AnalysisReport {
    /// The settings the views were computed with.
    pub config: AnalysisConfig,

    /// The underlying roster.
    pub roster: Arc<Roster>,

    /// Per-student stats in roster order.
    pub students: Vec<StudentStats>,

    /// Students ranked by total.
    pub toppers: Vec<RankedStudent>,

    /// Best student per subject.
    pub subject_toppers: Vec<SubjectTopper>,

    /// Mean mark per subject.
    pub subject_averages: Vec<SubjectAverage>,

    /// Mean mark across all subjects.
    pub overall_average: OverallAverage,

    /// Students passing and failing at `config.pass_threshold`.
    pub pass_fail: PassFailSplit,
}

impl AnalysisReport {
    /// Compute every view of `roster`.
    #[instrument(level = "debug", skip_all, fields(students = roster.students().len()))]
    pub fn build(roster: Arc<Roster>, config: AnalysisConfig) -> Self {
        Self {
            config,
            students: all_student_stats(&roster, &config),
            toppers: topper_list(&roster, &config),
            subject_toppers: subject_toppers(&roster, &config),
            subject_averages: subject_averages(&roster, &config),
            overall_average: overall_average(&roster, &config),
            pass_fail: pass_fail_split(&roster, &config),
            roster,
        }
    }
}
