use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::attention::{determine_attention, ScoreHistory};
use crate::models::{BandCount, EnrichedScore, FlaggedStudent, SkillAverage, StudentProgress};
use crate::scoring::{SkillComponent, NOT_REPORTED, OVERALL_BANDS};

#[derive(Debug, Clone, Default)]
pub struct Cohort {
    pub students: Vec<StudentProgress>,
    pub most_recent_exam: Option<NaiveDate>,
}

pub fn cohort_most_recent_date(scores: &[EnrichedScore]) -> Option<NaiveDate> {
    scores.iter().map(|score| score.exam_date).max()
}

fn rounded_mean(total: u32, count: usize) -> u16 {
    if count == 0 {
        return 0;
    }
    let count = count as u32;
    ((2 * total + count) / (2 * count)) as u16
}

/// Groups enriched scores per student and classifies each one.
pub fn build_cohort(scores: Vec<EnrichedScore>) -> Cohort {
    let Some(most_recent) = cohort_most_recent_date(&scores) else {
        return Cohort::default();
    };

    let mut by_student: HashMap<String, Vec<EnrichedScore>> = HashMap::new();
    for score in scores {
        by_student
            .entry(score.student_id.clone())
            .or_default()
            .push(score);
    }

    let mut students: Vec<StudentProgress> = by_student
        .into_iter()
        .map(|(student_id, mut scores)| {
            scores.sort_by_key(|score| score.exam_date);
            let history =
                ScoreHistory::new(scores.iter().map(EnrichedScore::history_point).collect());
            let attention = determine_attention(&history, most_recent);
            let student_name = scores
                .last()
                .map(|score| score.student_name.clone())
                .unwrap_or_default();
            if scores.iter().any(|score| score.student_name != student_name) {
                warn!(
                    student = %student_id,
                    name = %student_name,
                    "rows carry differing student names, using the latest"
                );
            }

            if let Some(flag) = &attention {
                debug!(student = %student_id, reason = %flag.reason, "student flagged");
            }

            StudentProgress {
                student_id,
                student_name,
                scores,
                history,
                attention,
            }
        })
        .collect();

    students.sort_by(|a, b| {
        a.student_name
            .cmp(&b.student_name)
            .then_with(|| a.student_id.cmp(&b.student_id))
    });

    Cohort {
        students,
        most_recent_exam: Some(most_recent),
    }
}

impl Cohort {
    /// Students needing attention, most severe reason first.
    pub fn flagged(&self) -> Vec<FlaggedStudent> {
        let mut flagged: Vec<FlaggedStudent> = self
            .students
            .iter()
            .filter_map(|student| {
                let flag = student.attention.clone()?;
                let latest = student.latest()?;
                Some(FlaggedStudent {
                    student_id: student.student_id.clone(),
                    student_name: student.student_name.clone(),
                    latest_overall: latest.overall.overall,
                    latest_exam: latest.exam_date,
                    flag,
                })
            })
            .collect();

        flagged.sort_by(|a, b| {
            a.flag
                .reason
                .priority()
                .cmp(&b.flag.reason.priority())
                .then_with(|| a.student_name.cmp(&b.student_name))
        });
        flagged
    }

    pub fn band_distribution(&self) -> Vec<BandCount> {
        OVERALL_BANDS
            .iter()
            .chain(std::iter::once(&NOT_REPORTED))
            .map(|band| BandCount {
                label: band.label,
                count: self
                    .students
                    .iter()
                    .filter_map(StudentProgress::latest)
                    .filter(|score| score.band.label == band.label)
                    .count(),
            })
            .collect()
    }

    pub fn skill_averages(&self) -> Vec<SkillAverage> {
        SkillComponent::ALL
            .iter()
            .filter_map(|component| {
                let values: Vec<u16> = self
                    .students
                    .iter()
                    .filter_map(StudentProgress::latest)
                    .filter_map(|score| score.scale_scores.get(component).copied())
                    .collect();
                if values.is_empty() {
                    return None;
                }
                let total: u32 = values.iter().map(|value| u32::from(*value)).sum();
                Some(SkillAverage {
                    component: component.key(),
                    label: component.label(),
                    average: rounded_mean(total, values.len()),
                    students: values.len(),
                })
            })
            .collect()
    }

    /// Mean number of skills taken in each student's latest exam.
    pub fn average_completion(&self) -> Option<f64> {
        let counts: Vec<usize> = self
            .students
            .iter()
            .filter_map(StudentProgress::latest)
            .map(|score| score.overall.included_count)
            .collect();
        if counts.is_empty() {
            return None;
        }
        Some(counts.iter().sum::<usize>() as f64 / counts.len() as f64)
    }

    /// Mean latest overall over students with at least one reported skill.
    pub fn average_overall(&self) -> Option<u16> {
        let values: Vec<u16> = self
            .students
            .iter()
            .filter_map(StudentProgress::latest)
            .map(|score| score.overall.overall)
            .filter(|overall| *overall > 0)
            .collect();
        if values.is_empty() {
            return None;
        }
        let total: u32 = values.iter().map(|value| u32::from(*value)).sum();
        Some(rounded_mean(total, values.len()))
    }
}
