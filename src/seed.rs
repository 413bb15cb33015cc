use std::path::Path;

use serde::Serialize;

use crate::error::Result;

#[derive(Serialize)]
struct SeedRow<'a> {
    student_id: &'a str,
    student_name: &'a str,
    exam_date: &'a str,
    reading: Option<f64>,
    use_of_english: Option<f64>,
    writing: Option<f64>,
    listening: Option<f64>,
    speaking: Option<f64>,
    notes: &'a str,
}

/// Writes a small fixed cohort that exercises every attention rule.
pub fn write_seed_csv(path: &Path) -> Result<usize> {
    let rows = vec![
        (
            "stu-avery",
            "Avery Lee",
            "2026-01-12",
            [Some(30.0), Some(18.0), Some(26.0), Some(19.0), Some(48.0)],
            "Diagnostic",
        ),
        (
            "stu-avery",
            "Avery Lee",
            "2026-02-09",
            [Some(33.0), Some(20.0), Some(29.0), Some(21.0), Some(54.5)],
            "",
        ),
        (
            "stu-avery",
            "Avery Lee",
            "2026-03-09",
            [Some(35.0), Some(21.0), Some(31.0), Some(22.0), Some(58.0)],
            "Full mock",
        ),
        (
            "stu-jules",
            "Jules Moreno",
            "2026-01-19",
            [Some(34.0), Some(21.0), Some(30.0), Some(22.0), Some(60.0)],
            "",
        ),
        (
            "stu-jules",
            "Jules Moreno",
            "2026-03-02",
            [Some(27.0), Some(16.0), Some(23.0), Some(17.0), Some(44.0)],
            "Unwell on the day",
        ),
        (
            "stu-kiara",
            "Kiara Patel",
            "2026-02-02",
            [Some(21.0), Some(12.0), Some(15.0), Some(13.0), Some(29.0)],
            "",
        ),
        (
            "stu-kiara",
            "Kiara Patel",
            "2026-03-02",
            [Some(22.0), Some(13.0), Some(16.0), Some(14.0), Some(30.5)],
            "",
        ),
        (
            "stu-noor",
            "Noor Haddad",
            "2026-01-05",
            [Some(31.0), Some(19.0), Some(27.0), Some(20.0), Some(51.0)],
            "",
        ),
        (
            "stu-noor",
            "Noor Haddad",
            "2026-01-26",
            [Some(32.0), Some(19.0), Some(28.0), Some(20.0), Some(52.0)],
            "",
        ),
        (
            "stu-sam",
            "Sam Okafor",
            "2026-02-23",
            [Some(29.0), None, None, None, None],
            "Reading only",
        ),
        (
            "stu-sam",
            "Sam Okafor",
            "2026-03-06",
            [None, None, None, Some(19.0), Some(47.5)],
            "Listening and speaking",
        ),
        (
            "stu-tess",
            "Tess Moller",
            "2026-02-16",
            [Some(38.0), Some(23.0), Some(35.0), Some(25.0), Some(67.0)],
            "",
        ),
        (
            "stu-tess",
            "Tess Moller",
            "2026-03-09",
            [Some(39.0), Some(24.0), Some(36.0), Some(26.0), Some(69.5)],
            "Exam ready",
        ),
    ];

    let mut writer = csv::Writer::from_path(path)?;
    let mut written = 0usize;

    for (student_id, student_name, exam_date, marks, notes) in rows {
        let [reading, use_of_english, writing, listening, speaking] = marks;
        writer.serialize(SeedRow {
            student_id,
            student_name,
            exam_date,
            reading,
            use_of_english,
            writing,
            listening,
            speaking,
            notes,
        })?;
        written += 1;
    }

    writer.flush()?;
    Ok(written)
}
