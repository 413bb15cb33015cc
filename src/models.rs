use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::attention::{AttentionFlag, HistoryPoint, ScoreHistory};
use crate::scoring::{Band, OverallResult, RawMarks, ScaleScoreMap, SkillComponent};

#[derive(Debug, Clone, PartialEq)]
pub struct RawScoreEntry {
    pub id: Uuid,
    pub student_id: String,
    pub student_name: String,
    pub exam_date: NaiveDate,
    pub raw_marks: RawMarks,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrichedScore {
    pub id: Uuid,
    pub student_id: String,
    pub student_name: String,
    pub exam_date: NaiveDate,
    pub raw_marks: RawMarks,
    pub scale_scores: ScaleScoreMap,
    pub overall: OverallResult,
    pub band: &'static Band,
    pub notes: Option<String>,
}

impl EnrichedScore {
    pub fn history_point(&self) -> HistoryPoint {
        HistoryPoint {
            overall: self.overall.overall,
            included_count: self.overall.included_count,
            exam_date: self.exam_date,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StudentProgress {
    pub student_id: String,
    pub student_name: String,
    /// Oldest first.
    pub scores: Vec<EnrichedScore>,
    pub history: ScoreHistory,
    pub attention: Option<AttentionFlag>,
}

impl StudentProgress {
    pub fn latest(&self) -> Option<&EnrichedScore> {
        self.scores.last()
    }

    pub fn previous(&self) -> Option<&EnrichedScore> {
        self.scores.iter().rev().nth(1)
    }

    /// Strongest and weakest skill of the latest exam. Ties go to the
    /// earlier component for strongest and the later one for weakest.
    pub fn skill_spotlight(&self) -> Option<SkillSpotlight> {
        let latest = self.latest()?;
        let mut scores = latest.scale_scores.iter();
        let (first, first_score) = scores.next()?;
        let mut spotlight = SkillSpotlight {
            strongest: *first,
            strongest_score: *first_score,
            weakest: *first,
            weakest_score: *first_score,
        };
        for (component, score) in scores {
            if *score > spotlight.strongest_score {
                spotlight.strongest = *component;
                spotlight.strongest_score = *score;
            }
            if *score <= spotlight.weakest_score {
                spotlight.weakest = *component;
                spotlight.weakest_score = *score;
            }
        }
        Some(spotlight)
    }

    /// Change in overall since the previous exam.
    pub fn delta(&self) -> Option<i32> {
        let latest = self.latest()?;
        let previous = self.previous()?;
        Some(i32::from(latest.overall.overall) - i32::from(previous.overall.overall))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkillSpotlight {
    pub strongest: SkillComponent,
    pub strongest_score: u16,
    pub weakest: SkillComponent,
    pub weakest_score: u16,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlaggedStudent {
    pub student_id: String,
    pub student_name: String,
    pub latest_overall: u16,
    pub latest_exam: NaiveDate,
    pub flag: AttentionFlag,
}

#[derive(Debug, Clone, Serialize)]
pub struct BandCount {
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillAverage {
    pub component: &'static str,
    pub label: &'static str,
    pub average: u16,
    pub students: usize,
}
