//! Calibration report formatting and serialization
//!
//! Turns a calibration outcome into human-readable text or a JSON record
//! for downstream tooling. The serialized types carry plain floats; the
//! geometry types stay internal.

use serde::{Deserialize, Serialize};

use crate::core::{CalibrationOutcome, StopReason};

/// Serializable anchor position record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorRecord {
    pub index: usize,
    pub x: f64,
    pub y: f64,
}

/// Serializable summary of one refinement pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassRecord {
    pub generations: usize,
    pub reason: String,
}

/// Serializable calibration report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub success: bool,
    pub fitness: f64,
    pub anchors: Vec<AnchorRecord>,
    pub passes: Vec<PassRecord>,
}

/// Formatter for calibration outcomes
pub struct CalibrationFormatter {
    /// Decimal places used for coordinates and fitness
    pub precision: usize,
}

impl Default for CalibrationFormatter {
    fn default() -> Self {
        Self { precision: 2 }
    }
}

impl CalibrationFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the decimal precision for floating-point values
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Build the serializable report record
    pub fn report(&self, outcome: &CalibrationOutcome) -> CalibrationReport {
        CalibrationReport {
            success: outcome.success,
            fitness: self.round(outcome.fitness),
            anchors: outcome
                .layout
                .anchors
                .iter()
                .enumerate()
                .map(|(index, anchor)| AnchorRecord {
                    index,
                    x: self.round(anchor.x),
                    y: self.round(anchor.y),
                })
                .collect(),
            passes: outcome
                .passes
                .iter()
                .map(|pass| PassRecord {
                    generations: pass.generations,
                    reason: reason_label(pass.reason).to_string(),
                })
                .collect(),
        }
    }

    /// Render the outcome as human-readable text
    pub fn format_text(&self, outcome: &CalibrationOutcome) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Final fitness: {:.prec$}\n",
            outcome.fitness,
            prec = self.precision
        ));
        for (index, anchor) in outcome.layout.anchors.iter().enumerate() {
            out.push_str(&format!(
                "Anchor {}: x={:.prec$}, y={:.prec$}\n",
                index,
                anchor.x,
                anchor.y,
                prec = self.precision
            ));
        }
        for (i, pass) in outcome.passes.iter().enumerate() {
            out.push_str(&format!(
                "Pass {}: {} generations, {}\n",
                i + 1,
                pass.generations,
                reason_label(pass.reason)
            ));
        }
        if outcome.success {
            out.push_str("Calibration success\n");
        } else {
            out.push_str("Calibration failure: bad measurements\n");
        }
        out
    }

    /// Render the outcome as a JSON report
    pub fn format_json(&self, outcome: &CalibrationOutcome) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.report(outcome))
    }

    fn round(&self, value: f64) -> f64 {
        let scale = 10f64.powi(self.precision as i32);
        (value * scale).round() / scale
    }
}

fn reason_label(reason: StopReason) -> &'static str {
    match reason {
        StopReason::TargetReached => "target reached",
        StopReason::GenerationBudget => "generation budget exhausted",
    }
}
