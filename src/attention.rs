use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

pub const PASS_MARK: u16 = 200;
pub const REGRESSION_DROP: i32 = 10;
pub const INACTIVE_AFTER_DAYS: i64 = 28;
pub const MIN_SKILLS_FOR_COMPLETE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentionReason {
    Regressing,
    BelowPass,
    Inactive,
    Incomplete,
}

impl AttentionReason {
    /// Severity rank, lowest first. Cohort lists are sorted by this.
    pub fn priority(self) -> u8 {
        match self {
            AttentionReason::Regressing => 0,
            AttentionReason::BelowPass => 1,
            AttentionReason::Inactive => 2,
            AttentionReason::Incomplete => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AttentionReason::Regressing => "Regressing",
            AttentionReason::BelowPass => "Below Pass",
            AttentionReason::Inactive => "Inactive 4w",
            AttentionReason::Incomplete => "Incomplete",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            AttentionReason::Regressing => "regressing",
            AttentionReason::BelowPass => "below_pass",
            AttentionReason::Inactive => "inactive",
            AttentionReason::Incomplete => "incomplete",
        }
    }
}

impl fmt::Display for AttentionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttentionFlag {
    pub reason: AttentionReason,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryPoint {
    pub overall: u16,
    pub included_count: usize,
    pub exam_date: NaiveDate,
}

/// One student's scores, held oldest first.
///
/// Entries sharing an exam date keep their insertion order, so the later
/// one counts as more recent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreHistory {
    points: Vec<HistoryPoint>,
}

impl ScoreHistory {
    pub fn new(mut points: Vec<HistoryPoint>) -> Self {
        points.sort_by_key(|point| point.exam_date);
        Self { points }
    }

    pub fn from_most_recent_first(mut points: Vec<HistoryPoint>) -> Self {
        points.reverse();
        Self::new(points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[HistoryPoint] {
        &self.points
    }

    pub fn latest(&self) -> Option<&HistoryPoint> {
        self.points.last()
    }

    pub fn previous(&self) -> Option<&HistoryPoint> {
        self.points.iter().rev().nth(1)
    }

    pub fn most_recent_first(&self) -> impl Iterator<Item = &HistoryPoint> {
        self.points.iter().rev()
    }

    fn two_most_recent_all(&self, predicate: impl Fn(&HistoryPoint) -> bool) -> bool {
        self.len() >= 2 && self.most_recent_first().take(2).all(predicate)
    }
}

/// Picks the single most pressing concern for a student, if any.
///
/// Rules run in fixed priority order and the first match wins. Inactivity is
/// measured against the cohort's most recent exam date rather than today.
pub fn determine_attention(
    history: &ScoreHistory,
    cohort_most_recent: NaiveDate,
) -> Option<AttentionFlag> {
    let latest = history.latest()?;

    if let Some(previous) = history.previous() {
        let delta = i32::from(latest.overall) - i32::from(previous.overall);
        if delta <= -REGRESSION_DROP {
            return Some(AttentionFlag {
                reason: AttentionReason::Regressing,
                detail: format!("Latest: {} - dropped {} pts", latest.overall, delta.abs()),
            });
        }
    }

    if latest.overall > 0
        && latest.overall < PASS_MARK
        && history.two_most_recent_all(|point| point.overall < PASS_MARK)
    {
        return Some(AttentionFlag {
            reason: AttentionReason::BelowPass,
            detail: format!(
                "Latest: {} - below C2 pass mark ({})",
                latest.overall, PASS_MARK
            ),
        });
    }

    let inactive_before = cohort_most_recent - Duration::days(INACTIVE_AFTER_DAYS);
    if latest.exam_date < inactive_before {
        return Some(AttentionFlag {
            reason: AttentionReason::Inactive,
            detail: "No scores logged in 4+ weeks".to_string(),
        });
    }

    if history.two_most_recent_all(|point| point.included_count < MIN_SKILLS_FOR_COMPLETE) {
        return Some(AttentionFlag {
            reason: AttentionReason::Incomplete,
            detail: format!(
                "Only {} of 5 skills in recent exams",
                latest.included_count
            ),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).unwrap()
    }

    fn point(overall: u16, included_count: usize, exam_date: NaiveDate) -> HistoryPoint {
        HistoryPoint {
            overall,
            included_count,
            exam_date,
        }
    }

    #[test]
    fn empty_history_is_never_flagged() {
        assert_eq!(determine_attention(&ScoreHistory::default(), date(3, 1)), None);
    }

    #[test]
    fn regression_wins_over_every_other_rule() {
        // Dropped 15 points, both exams below pass, both incomplete, and
        // silent for well over four weeks.
        let history = ScoreHistory::new(vec![
            point(195, 2, date(1, 1)),
            point(180, 2, date(1, 10)),
        ]);
        let flag = determine_attention(&history, date(4, 1)).unwrap();
        assert_eq!(flag.reason, AttentionReason::Regressing);
        assert_eq!(flag.detail, "Latest: 180 - dropped 15 pts");
    }

    #[test]
    fn drop_of_exactly_ten_regresses() {
        let history = ScoreHistory::new(vec![
            point(215, 5, date(2, 1)),
            point(205, 5, date(2, 20)),
        ]);
        let flag = determine_attention(&history, date(2, 20)).unwrap();
        assert_eq!(flag.reason, AttentionReason::Regressing);

        let history = ScoreHistory::new(vec![
            point(214, 5, date(2, 1)),
            point(205, 5, date(2, 20)),
        ]);
        assert_eq!(determine_attention(&history, date(2, 20)), None);
    }

    #[test]
    fn below_pass_needs_a_streak_of_two() {
        let single = ScoreHistory::new(vec![point(170, 5, date(2, 1))]);
        assert_eq!(determine_attention(&single, date(2, 1)), None);

        let streak = ScoreHistory::new(vec![
            point(210, 5, date(1, 1)),
            point(190, 5, date(1, 20)),
            point(185, 5, date(2, 1)),
        ]);
        let flag = determine_attention(&streak, date(2, 1)).unwrap();
        assert_eq!(flag.reason, AttentionReason::BelowPass);
        assert_eq!(flag.detail, "Latest: 185 - below C2 pass mark (200)");
    }

    #[test]
    fn recovery_above_pass_clears_below_pass() {
        let history = ScoreHistory::new(vec![
            point(190, 5, date(1, 20)),
            point(201, 5, date(2, 1)),
        ]);
        assert_eq!(determine_attention(&history, date(2, 1)), None);
    }

    #[test]
    fn zero_overall_is_not_below_pass() {
        let history = ScoreHistory::new(vec![
            point(0, 0, date(1, 20)),
            point(0, 0, date(2, 1)),
        ]);
        let flag = determine_attention(&history, date(2, 1)).unwrap();
        assert_eq!(flag.reason, AttentionReason::Incomplete);
        assert_eq!(flag.detail, "Only 0 of 5 skills in recent exams");
    }

    #[test]
    fn inactivity_uses_strict_28_day_cutoff() {
        let cohort_latest = date(3, 1);

        let exactly = ScoreHistory::new(vec![point(210, 5, cohort_latest - Duration::days(28))]);
        assert_eq!(determine_attention(&exactly, cohort_latest), None);

        let overdue = ScoreHistory::new(vec![point(210, 5, cohort_latest - Duration::days(29))]);
        let flag = determine_attention(&overdue, cohort_latest).unwrap();
        assert_eq!(flag.reason, AttentionReason::Inactive);
        assert_eq!(flag.detail, "No scores logged in 4+ weeks");
    }

    #[test]
    fn inactivity_fires_regardless_of_score() {
        let history = ScoreHistory::new(vec![
            point(225, 5, date(1, 1)),
            point(228, 5, date(1, 5)),
        ]);
        let flag = determine_attention(&history, date(3, 1)).unwrap();
        assert_eq!(flag.reason, AttentionReason::Inactive);
    }

    #[test]
    fn incomplete_needs_two_sparse_exams() {
        let one_sparse = ScoreHistory::new(vec![
            point(205, 5, date(1, 20)),
            point(205, 2, date(2, 1)),
        ]);
        assert_eq!(determine_attention(&one_sparse, date(2, 1)), None);

        let two_sparse = ScoreHistory::new(vec![
            point(205, 1, date(1, 20)),
            point(206, 2, date(2, 1)),
        ]);
        let flag = determine_attention(&two_sparse, date(2, 1)).unwrap();
        assert_eq!(flag.reason, AttentionReason::Incomplete);
        assert_eq!(flag.detail, "Only 2 of 5 skills in recent exams");

        let single_sparse = ScoreHistory::new(vec![point(205, 1, date(2, 1))]);
        assert_eq!(determine_attention(&single_sparse, date(2, 1)), None);
    }

    #[test]
    fn below_pass_outranks_inactive() {
        // Two exams under 200, the latest well over four weeks before the cohort's.
        let history = ScoreHistory::new(vec![
            point(190, 5, date(1, 1)),
            point(185, 5, date(1, 10)),
        ]);
        let flag = determine_attention(&history, date(3, 1)).unwrap();
        assert_eq!(flag.reason, AttentionReason::BelowPass);
    }

    #[test]
    fn inactive_outranks_incomplete() {
        // Two sparse exams that are also stale.
        let history = ScoreHistory::new(vec![
            point(205, 1, date(1, 1)),
            point(206, 2, date(1, 10)),
        ]);
        let flag = determine_attention(&history, date(3, 1)).unwrap();
        assert_eq!(flag.reason, AttentionReason::Inactive);
    }

    #[test]
    fn history_order_is_normalised() {
        let descending = vec![
            point(200, 5, date(2, 1)),
            point(220, 5, date(1, 1)),
        ];
        let from_desc = ScoreHistory::from_most_recent_first(descending.clone());
        let shuffled = ScoreHistory::new(descending);
        assert_eq!(from_desc, shuffled);
        assert_eq!(from_desc.latest().map(|p| p.overall), Some(200));
        assert_eq!(from_desc.previous().map(|p| p.overall), Some(220));

        let flag = determine_attention(&from_desc, date(2, 1)).unwrap();
        assert_eq!(flag.detail, "Latest: 200 - dropped 20 pts");
    }

    #[test]
    fn reasons_sort_by_severity() {
        let mut reasons = vec![
            AttentionReason::Incomplete,
            AttentionReason::Inactive,
            AttentionReason::Regressing,
            AttentionReason::BelowPass,
        ];
        reasons.sort_by_key(|reason| reason.priority());
        assert_eq!(
            reasons,
            vec![
                AttentionReason::Regressing,
                AttentionReason::BelowPass,
                AttentionReason::Inactive,
                AttentionReason::Incomplete,
            ]
        );
        assert_eq!(AttentionReason::BelowPass.to_string(), "below_pass");
    }
}
