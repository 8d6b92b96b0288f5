//! CSV output.

use crate::{prelude::*, stats::report::AnalysisReport};

use super::{ReportSection, Sections, display_mark};

/// Render the class summary, a row per student, and a block per selected
/// section.
///
/// The summary comes first as `key,value` rows, followed by a blank line and
/// the student table, so the file opens sensibly in a spreadsheet. Each
/// section after that is preceded by a blank line and has its own header.
pub fn render_csv(report: &AnalysisReport, sections: &Sections) -> Result<Vec<u8>> {
    let roster = &report.roster;
    let mut wtr = ::csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(vec![]);

    let class_average = roster.class_average().to_string();
    let cell_pass_rate = format!("{}%", roster.cell_pass_percentage());
    wtr.write_record(["Class Average", class_average.as_str()])?;
    wtr.write_record(["Mark-level Pass Rate", cell_pass_rate.as_str()])?;
    if sections.includes(ReportSection::PassFail) {
        let students_passing = format!(
            "{}/{} ({}%)",
            report.pass_fail.passed,
            report.students.len(),
            report.pass_fail.pass_percentage
        );
        wtr.write_record(["Students Passing", students_passing.as_str()])?;
    }
    if sections.includes(ReportSection::Averages) {
        let overall = format!(
            "{} ({}%)",
            report.overall_average.average, report.overall_average.percentage
        );
        wtr.write_record(["Overall Average", overall.as_str()])?;
    }
    wtr.write_record([""])?;

    let mut header = vec!["Name".to_owned()];
    header.extend(roster.subjects().iter().cloned());
    header.extend(["Total", "Percentage", "Result"].map(String::from));
    wtr.write_record(&header)?;

    for (student, stats) in roster.students().iter().zip(&report.students) {
        let mut row = vec![student.name.clone()];
        row.extend(roster.subjects().iter().map(|s| display_mark(student, s)));
        row.push(stats.total.to_string());
        row.push(format!("{}%", stats.percentage));
        row.push(if stats.passing { "Pass" } else { "Fail" }.to_owned());
        wtr.write_record(&row)?;
    }

    if sections.includes(ReportSection::Toppers) {
        wtr.write_record([""])?;
        wtr.write_record(["Rank", "Name", "Total", "Percentage"])?;
        for ranked in &report.toppers {
            wtr.write_record([
                ranked.rank.to_string(),
                ranked.stats.name.clone(),
                ranked.stats.total.to_string(),
                format!("{}%", ranked.stats.percentage),
            ])?;
        }
    }

    if sections.includes(ReportSection::SubjectToppers) {
        wtr.write_record([""])?;
        wtr.write_record(["Subject", "Topper", "Marks", "Percentage"])?;
        for topper in &report.subject_toppers {
            wtr.write_record([
                topper.subject.clone(),
                topper.topper_name.clone(),
                topper.marks.to_string(),
                format!("{}%", topper.percentage),
            ])?;
        }
    }

    if sections.includes(ReportSection::Averages) {
        wtr.write_record([""])?;
        wtr.write_record(["Subject", "Average", "Percentage"])?;
        for avg in &report.subject_averages {
            wtr.write_record([
                avg.subject.clone(),
                avg.average.to_string(),
                format!("{}%", avg.percentage),
            ])?;
        }
    }

    wtr.into_inner()
        .map_err(|err| anyhow!("failed to finish CSV output: {}", err.error()))
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
                Student::new("Avery, Lee", [("math", 45.0), ("sci", 32.5)]),
                Student::new("Sam", [("math", 10.0)]),
            ],
        );
        AnalysisReport::build(Arc::new(roster), AnalysisConfig::default())
    }

    #[test]
    fn renders_summary_and_students() -> Result<()> {
        let csv = String::from_utf8(render_csv(&report(), &Sections::all())?)?;
        let lines = csv.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "Class Average,21.9");
        assert_eq!(lines[1], "Mark-level Pass Rate,50%");
        assert_eq!(lines[2], "Students Passing,1/2 (50%)");
        assert_eq!(lines[3], "Overall Average,21.88 (43.8%)");
        assert_eq!(lines[5], "Name,math,sci,Total,Percentage,Result");
        assert_eq!(lines[6], "\"Avery, Lee\",45,32.5,77.5,77.5%,Pass");
        assert_eq!(lines[7], "Sam,10,-,10,10%,Fail");
        assert!(lines.contains(&"Rank,Name,Total,Percentage"));
        assert!(lines.contains(&"1,\"Avery, Lee\",77.5,77.5%"));
        assert!(lines.contains(&"math,\"Avery, Lee\",45,90%"));
        assert!(lines.contains(&"sci,16.25,32.5%"));
        Ok(())
    }

    #[test]
    fn renders_only_selected_sections() -> Result<()> {
        let sections = Sections::from_selected(&[ReportSection::Toppers]);
        let csv = String::from_utf8(render_csv(&report(), &sections)?)?;
        let lines = csv.lines().collect::<Vec<_>>();
        assert_eq!(lines[3], "Name,math,sci,Total,Percentage,Result");
        assert!(lines.contains(&"Rank,Name,Total,Percentage"));
        assert!(!csv.contains("Students Passing"));
        assert!(!csv.contains("Overall Average"));
        assert!(!csv.contains("Topper"));
        assert!(!csv.contains("Average,Percentage"));
        Ok(())
    }
}
