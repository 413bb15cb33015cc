use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Result, TrackerError};
use crate::models::{EnrichedScore, RawScoreEntry};
use crate::scoring::{
    calculate_overall_score, get_overall_band, scale_scores, RawMarks, SkillComponent,
};
use crate::validation::{validate_note, validate_raw_mark};

#[derive(Debug, Deserialize)]
struct CsvRow {
    student_id: String,
    student_name: String,
    exam_date: NaiveDate,
    reading: Option<f64>,
    use_of_english: Option<f64>,
    writing: Option<f64>,
    listening: Option<f64>,
    speaking: Option<f64>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    entry_id: Option<Uuid>,
}

impl CsvRow {
    fn marks(&self) -> [(SkillComponent, Option<f64>); 5] {
        [
            (SkillComponent::Reading, self.reading),
            (SkillComponent::UseOfEnglish, self.use_of_english),
            (SkillComponent::Writing, self.writing),
            (SkillComponent::Listening, self.listening),
            (SkillComponent::Speaking, self.speaking),
        ]
    }

    fn into_entry(self, row: usize) -> Result<RawScoreEntry> {
        let row_error = |message: String| TrackerError::InvalidRow { row, message };

        if self.student_id.trim().is_empty() {
            return Err(row_error("student_id is empty".to_string()));
        }

        let mut raw_marks = RawMarks::new();
        for (component, value) in self.marks() {
            if let Some(value) = value {
                let value = validate_raw_mark(component, value)
                    .map_err(|err| row_error(err.to_string()))?;
                raw_marks.insert(component, value);
            }
        }

        let notes = self
            .notes
            .map(|note| note.trim().to_string())
            .filter(|note| !note.is_empty());
        if let Some(note) = notes.as_deref() {
            validate_note(note).map_err(|err| row_error(err.to_string()))?;
        }

        Ok(RawScoreEntry {
            id: self.entry_id.unwrap_or_else(Uuid::new_v4),
            student_name: if self.student_name.trim().is_empty() {
                "Unnamed".to_string()
            } else {
                self.student_name.trim().to_string()
            },
            student_id: self.student_id.trim().to_string(),
            exam_date: self.exam_date,
            raw_marks,
            notes,
        })
    }
}

pub fn load_entries(csv_path: &Path) -> Result<Vec<RawScoreEntry>> {
    let file = std::fs::File::open(csv_path)?;
    let entries = read_entries(file)?;
    info!(path = %csv_path.display(), entries = entries.len(), "loaded score entries");
    Ok(entries)
}

/// Parses and validates score rows. The first bad row aborts the load.
pub fn read_entries<R: Read>(reader: R) -> Result<Vec<RawScoreEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut entries = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        // Header is line 1.
        let row = index + 2;
        let record = result.map_err(|err| TrackerError::InvalidRow {
            row,
            message: err.to_string(),
        })?;
        let entry = record.into_entry(row)?;
        debug!(row, student = %entry.student_id, taken = entry.raw_marks.len(), "parsed entry");
        entries.push(entry);
    }

    Ok(entries)
}

pub fn enrich(entry: &RawScoreEntry) -> EnrichedScore {
    let scale_scores = scale_scores(&entry.raw_marks);
    let overall = calculate_overall_score(&scale_scores);
    let band = get_overall_band(overall.overall);

    EnrichedScore {
        id: entry.id,
        student_id: entry.student_id.clone(),
        student_name: entry.student_name.clone(),
        exam_date: entry.exam_date,
        raw_marks: entry.raw_marks.clone(),
        scale_scores,
        overall,
        band,
        notes: entry.notes.clone(),
    }
}

pub fn enrich_all(entries: &[RawScoreEntry]) -> Vec<EnrichedScore> {
    entries.iter().map(enrich).collect()
}
