use std::fmt::Write;

use crate::cohort::Cohort;

pub fn build_report(label: Option<&str>, cohort: &Cohort) -> String {
    let mut output = String::new();
    let cohort_label = label.unwrap_or("all students");

    let _ = writeln!(output, "# C2 Proficiency Progress Report");
    match cohort.most_recent_exam {
        Some(date) => {
            let _ = writeln!(
                output,
                "Generated for {} (most recent exam {})",
                cohort_label, date
            );
        }
        None => {
            let _ = writeln!(output, "Generated for {} (no exams logged)", cohort_label);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");
    let _ = writeln!(output, "- Students: {}", cohort.students.len());
    let exams: usize = cohort.students.iter().map(|s| s.scores.len()).sum();
    let _ = writeln!(output, "- Exams logged: {}", exams);
    match cohort.average_overall() {
        Some(average) => {
            let _ = writeln!(output, "- Average latest overall: {}", average);
        }
        None => {
            let _ = writeln!(output, "- Average latest overall: n/a");
        }
    }
    match cohort.average_completion() {
        Some(average) => {
            let _ = writeln!(output, "- Average completion: {:.1} of 5 skills", average);
        }
        None => {
            let _ = writeln!(output, "- Average completion: n/a");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Band Distribution");
    for band in cohort.band_distribution() {
        let _ = writeln!(output, "- {}: {}", band.label, band.count);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Skill Averages");
    let averages = cohort.skill_averages();
    if averages.is_empty() {
        let _ = writeln!(output, "No skills reported yet.");
    } else {
        for average in averages.iter() {
            let _ = writeln!(
                output,
                "- {}: {} across {} students",
                average.label, average.average, average.students
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Skill Spotlight");
    let spotlights: Vec<_> = cohort
        .students
        .iter()
        .filter_map(|student| Some((student, student.skill_spotlight()?)))
        .collect();
    if spotlights.is_empty() {
        let _ = writeln!(output, "No skills reported yet.");
    } else {
        for (student, spotlight) in spotlights.iter() {
            let _ = writeln!(
                output,
                "- {}: strongest {} ({}), weakest {} ({})",
                student.student_name,
                spotlight.strongest.label(),
                spotlight.strongest_score,
                spotlight.weakest.label(),
                spotlight.weakest_score
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Needs Attention");
    let flagged = cohort.flagged();
    if flagged.is_empty() {
        let _ = writeln!(output, "Every student is on track.");
    } else {
        for student in flagged.iter() {
            let _ = writeln!(
                output,
                "- {} [{}] {}",
                student.student_name,
                student.flag.reason.label(),
                student.flag.detail
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Progress");
    if cohort.students.is_empty() {
        let _ = writeln!(output, "No exams recorded.");
    } else {
        for student in cohort.students.iter() {
            let Some(latest) = student.latest() else {
                continue;
            };
            let delta = match student.delta() {
                Some(delta) => format!("{:+}", delta),
                None => "first exam".to_string(),
            };
            let _ = writeln!(
                output,
                "- {} on {}: {} ({}, {}/5 skills, {})",
                student.student_name,
                latest.exam_date,
                latest.overall.overall,
                latest.band.label,
                latest.overall.included_count,
                delta
            );
        }
    }

    output
}
