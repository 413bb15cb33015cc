//! Raw mark to scale score conversion, overall aggregation and band lookup.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

pub const MIN_REPORTED_SCORE: u16 = 162;
pub const MAX_SCALE_SCORE: u16 = 230;
pub const COMPONENT_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkillComponent {
    Reading,
    UseOfEnglish,
    Writing,
    Listening,
    Speaking,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorPoint {
    pub raw: f64,
    pub scale: u16,
}

#[derive(Debug)]
pub struct ComponentDefinition {
    pub label: &'static str,
    pub max_raw: f64,
    pub anchors: &'static [AnchorPoint],
}

const fn anchor(raw: f64, scale: u16) -> AnchorPoint {
    AnchorPoint { raw, scale }
}

static READING: ComponentDefinition = ComponentDefinition {
    label: "Reading",
    max_raw: 44.0,
    anchors: &[
        anchor(36.0, 220),
        anchor(28.0, 200),
        anchor(22.0, 180),
        anchor(14.0, 162),
    ],
};

static USE_OF_ENGLISH: ComponentDefinition = ComponentDefinition {
    label: "Use of English",
    max_raw: 28.0,
    anchors: &[
        anchor(22.0, 220),
        anchor(17.0, 200),
        anchor(13.0, 180),
        anchor(9.0, 162),
    ],
};

static WRITING: ComponentDefinition = ComponentDefinition {
    label: "Writing",
    max_raw: 40.0,
    anchors: &[
        anchor(34.0, 220),
        anchor(24.0, 200),
        anchor(16.0, 180),
        anchor(10.0, 162),
    ],
};

static LISTENING: ComponentDefinition = ComponentDefinition {
    label: "Listening",
    max_raw: 30.0,
    anchors: &[
        anchor(24.0, 220),
        anchor(18.0, 200),
        anchor(14.0, 180),
        anchor(10.0, 162),
    ],
};

static SPEAKING: ComponentDefinition = ComponentDefinition {
    label: "Speaking",
    max_raw: 75.0,
    anchors: &[
        anchor(66.0, 220),
        anchor(45.0, 200),
        anchor(30.0, 180),
        anchor(17.0, 162),
    ],
};

impl SkillComponent {
    pub const ALL: [SkillComponent; COMPONENT_COUNT] = [
        SkillComponent::Reading,
        SkillComponent::UseOfEnglish,
        SkillComponent::Writing,
        SkillComponent::Listening,
        SkillComponent::Speaking,
    ];

    pub fn definition(self) -> &'static ComponentDefinition {
        match self {
            SkillComponent::Reading => &READING,
            SkillComponent::UseOfEnglish => &USE_OF_ENGLISH,
            SkillComponent::Writing => &WRITING,
            SkillComponent::Listening => &LISTENING,
            SkillComponent::Speaking => &SPEAKING,
        }
    }

    pub fn label(self) -> &'static str {
        self.definition().label
    }

    /// Identifier used in CSV headers and JSON output.
    pub fn key(self) -> &'static str {
        match self {
            SkillComponent::Reading => "reading",
            SkillComponent::UseOfEnglish => "useOfEnglish",
            SkillComponent::Writing => "writing",
            SkillComponent::Listening => "listening",
            SkillComponent::Speaking => "speaking",
        }
    }

    /// Speaking is marked in half points; every other paper in whole marks.
    pub fn allows_half_marks(self) -> bool {
        matches!(self, SkillComponent::Speaking)
    }
}

impl fmt::Display for SkillComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SkillComponent {
    type Err = TrackerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "reading" => Ok(SkillComponent::Reading),
            "useofenglish" | "uoe" => Ok(SkillComponent::UseOfEnglish),
            "writing" => Ok(SkillComponent::Writing),
            "listening" => Ok(SkillComponent::Listening),
            "speaking" => Ok(SkillComponent::Speaking),
            _ => Err(TrackerError::UnknownComponent(value.to_string())),
        }
    }
}

pub type RawMarks = BTreeMap<SkillComponent, f64>;
pub type ScaleScoreMap = BTreeMap<SkillComponent, u16>;

fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

fn clamp_scale(value: f64) -> u16 {
    let rounded = round_half_up(value);
    if rounded.is_nan() || rounded <= MIN_REPORTED_SCORE as f64 {
        MIN_REPORTED_SCORE
    } else if rounded >= MAX_SCALE_SCORE as f64 {
        MAX_SCALE_SCORE
    } else {
        rounded as u16
    }
}

fn interpolate(raw: f64, a: AnchorPoint, b: AnchorPoint) -> f64 {
    if a.raw == b.raw {
        return a.scale as f64;
    }
    let slope = (b.scale as f64 - a.scale as f64) / (b.raw - a.raw);
    a.scale as f64 + (raw - a.raw) * slope
}

pub fn estimate_scale_score(component: SkillComponent, raw: f64) -> u16 {
    scale_from_anchors(component.definition().anchors, raw)
}

/// Piecewise linear conversion over an arbitrary anchor list.
///
/// Anchors may arrive in any order. Marks at or below the lowest anchor
/// report the floor; marks at or above the highest anchor extend the slope
/// of the top two anchors and are capped at the ceiling.
pub fn scale_from_anchors(anchors: &[AnchorPoint], raw: f64) -> u16 {
    let mut ordered = anchors.to_vec();
    ordered.sort_by(|a, b| b.raw.total_cmp(&a.raw));

    let (top, bottom) = match (ordered.first(), ordered.last()) {
        (Some(top), Some(bottom)) => (*top, *bottom),
        _ => return MIN_REPORTED_SCORE,
    };
    let next = ordered.get(1).copied().unwrap_or(top);

    if raw <= bottom.raw {
        return MIN_REPORTED_SCORE;
    }

    if raw >= top.raw {
        return clamp_scale(interpolate(raw, top, next));
    }

    ordered
        .windows(2)
        .find(|pair| raw <= pair[0].raw && raw >= pair[1].raw)
        .map(|pair| clamp_scale(interpolate(raw, pair[0], pair[1])))
        .unwrap_or(MIN_REPORTED_SCORE)
}

/// Converts every taken component of an exam; absent components stay absent.
pub fn scale_scores(raw_marks: &RawMarks) -> ScaleScoreMap {
    raw_marks
        .iter()
        .map(|(component, raw)| (*component, estimate_scale_score(*component, *raw)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverallResult {
    pub overall: u16,
    pub included_count: usize,
    pub is_complete: bool,
}

pub fn calculate_overall_score(scores: &ScaleScoreMap) -> OverallResult {
    let included_count = scores.len();
    if included_count == 0 {
        return OverallResult {
            overall: 0,
            included_count: 0,
            is_complete: false,
        };
    }

    let total: u32 = scores.values().map(|value| u32::from(*value)).sum();
    let overall = round_half_up(total as f64 / included_count as f64) as u16;

    OverallResult {
        overall,
        included_count,
        is_complete: included_count == COMPONENT_COUNT,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Band {
    pub label: &'static str,
    pub cefr: &'static str,
    pub certificate_awarded: bool,
    pub range: Option<(u16, u16)>,
}

impl Band {
    pub fn contains(&self, overall: u16) -> bool {
        self.range
            .map(|(low, high)| overall >= low && overall <= high)
            .unwrap_or(false)
    }
}

pub static OVERALL_BANDS: [Band; 5] = [
    Band {
        label: "Grade A",
        cefr: "C2",
        certificate_awarded: true,
        range: Some((220, 230)),
    },
    Band {
        label: "Grade B",
        cefr: "C2",
        certificate_awarded: true,
        range: Some((213, 219)),
    },
    Band {
        label: "Grade C",
        cefr: "C2",
        certificate_awarded: true,
        range: Some((200, 212)),
    },
    Band {
        label: "Level C1",
        cefr: "C1",
        certificate_awarded: true,
        range: Some((180, 199)),
    },
    Band {
        label: "No certificate",
        cefr: "Below C1",
        certificate_awarded: false,
        range: Some((162, 179)),
    },
];

pub static NOT_REPORTED: Band = Band {
    label: "Not reported",
    cefr: "Below 162",
    certificate_awarded: false,
    range: None,
};

pub fn get_overall_band(overall: u16) -> &'static Band {
    OVERALL_BANDS
        .iter()
        .find(|band| band.contains(overall))
        .unwrap_or(&NOT_REPORTED)
}
