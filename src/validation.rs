use crate::error::{Result, TrackerError};
use crate::scoring::SkillComponent;

pub const MAX_NOTE_CHARS: usize = 500;

fn invalid(component: SkillComponent, value: f64, reason: impl Into<String>) -> TrackerError {
    TrackerError::InvalidRawMark {
        component,
        value,
        reason: reason.into(),
    }
}

/// Checks a raw paper mark before it reaches the conversion engine.
pub fn validate_raw_mark(component: SkillComponent, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(invalid(component, value, "mark must be a number"));
    }
    if value < 0.0 {
        return Err(invalid(component, value, "mark cannot be negative"));
    }

    let max_raw = component.definition().max_raw;
    if value > max_raw {
        return Err(invalid(
            component,
            value,
            format!("maximum for {} is {}", component.label(), max_raw),
        ));
    }

    if component.allows_half_marks() {
        if (value * 2.0).fract() != 0.0 {
            return Err(invalid(component, value, "half marks only"));
        }
    } else if value.fract() != 0.0 {
        return Err(invalid(component, value, "whole marks only"));
    }

    Ok(value)
}

pub fn validate_note(note: &str) -> Result<()> {
    let length = note.chars().count();
    if length > MAX_NOTE_CHARS {
        return Err(TrackerError::NoteTooLong(length));
    }
    Ok(())
}
