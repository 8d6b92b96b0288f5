//! Deterministic synthetic rosters.
//!
//! This is a fixture generator, not a recognizer: it never looks at the image.
//! A seed picks how many students appear, in what order, and how far each mark
//! moves from a fixed baseline, so different images give different but stable
//! results.

use crate::{
    roster::{Roster, Student},
    stats::rounding::round_to,
};

/// The highest mark the generator will produce.
pub const GENERATED_MAX_MARK: f64 = 50.0;

/// Subjects on every generated sheet.
pub const SUBJECTS: [&str; 4] = ["ODYC", "E.CHE", "EDC", "BEE"];

/// Candidate students and their baseline marks, in [`SUBJECTS`] order.
const CANDIDATES: [(&str, [f64; 4]); 15] = [
    ("ALA VAMSHIKA", [35.0, 32.5, 28.0, 33.0]),
    ("AMANAGANTI SHIVA", [15.0, 26.0, 8.0, 24.0]),
    ("AMBATI DINEKAR", [9.0, 13.5, 9.0, 22.0]),
    ("APPAM VISHNUVARDHAN", [30.0, 24.5, 22.0, 31.0]),
    ("B BALAKRISHNA", [34.5, 31.0, 21.0, 26.0]),
    ("B SHIVA KUMAR", [33.5, 32.5, 25.0, 32.0]),
    ("BADRI SHIVA MANI", [31.0, 34.5, 28.0, 29.5]),
    ("BEKKAM JESHWANTH", [34.5, 30.0, 20.0, 19.0]),
    ("BELLALA USHASRI", [35.0, 29.5, 25.0, 32.0]),
    ("BUDUGA MEGHRAJ", [35.0, 34.5, 32.0, 33.0]),
    ("BURRAVENI HARSHA VARDHAN", [31.0, 32.0, 24.0, 29.0]),
    ("CHAKALI SAI SHILPA", [28.5, 31.0, 29.0, 28.0]),
    ("CHIMEKALA TEJASWINI", [34.0, 31.5, 29.0, 28.0]),
    ("CHINNI ARAVIND", [23.5, 31.5, 16.0, 25.0]),
    ("DHARMAWAR RAMAKANTH", [34.0, 32.0, 19.0, 29.0]),
];

/// The smallest number of students on a generated sheet.
const MIN_STUDENTS: u64 = 15;

/// Generated sheets have `MIN_STUDENTS + (seed % STUDENT_COUNT_SPREAD)`
/// students.
const STUDENT_COUNT_SPREAD: u64 = 6;

/// Generate the roster for `seed`. Same seed, same roster.
pub fn generate(seed: u32) -> Roster {
    let seed = u64::from(seed);
    let student_count = (MIN_STUDENTS + seed % STUDENT_COUNT_SPREAD) as usize;

    // Stable sort, so colliding sort keys keep candidate order.
    let mut order = (0..CANDIDATES.len()).collect::<Vec<_>>();
    order.sort_by_key(|&idx| (idx as u64 * seed) % 100);

    let students = (0..student_count)
        .map(|i| {
            let (name, baseline) = CANDIDATES[order[i % order.len()]];
            let marks = SUBJECTS.iter().zip(baseline).enumerate().map(
                |(subject_idx, (subject, base))| {
                    (*subject, perturb(base, seed, i as u64, subject_idx as u64))
                },
            );
            Student::new(name, marks)
        })
        .collect();

    Roster::new(SUBJECTS.iter().map(|s| s.to_string()).collect(), students)
}

/// Move `base` by a seed-dependent amount in `-5..=5`, keeping it on the
/// sheet's scale.
fn perturb(base: f64, seed: u64, student_idx: u64, subject_idx: u64) -> f64 {
    let delta = ((seed + student_idx * (subject_idx + 1)) % 11) as f64 - 5.0;
    round_to((base + delta).clamp(0.0, GENERATED_MAX_MARK), 1)
}
