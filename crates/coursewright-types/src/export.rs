//! Export and summary types.
//!
//! The service renders exports server-side. The client only picks a
//! format, receives either a binary file or a structured summary, and
//! tracks the status of each request in an [`ExportRequestState`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Export file formats offered by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Csv,
    Json,
}

impl ExportFormat {
    /// Structured formats are displayed, not downloaded.
    pub fn is_structured(&self) -> bool {
        matches!(self, ExportFormat::Json)
    }

    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("invalid export format: '{other}'")),
        }
    }
}

/// Status of the latest export or summary request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStatus {
    #[default]
    Idle,
    InFlight,
    Success,
    Error,
}

impl fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportStatus::Idle => write!(f, "idle"),
            ExportStatus::InFlight => write!(f, "in_flight"),
            ExportStatus::Success => write!(f, "success"),
            ExportStatus::Error => write!(f, "error"),
        }
    }
}

/// Observable state of the export panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportRequestState {
    pub status: ExportStatus,
    /// Human-readable outcome, empty while idle or in flight.
    pub message: String,
    /// Most recent structured summary, if any was fetched.
    pub payload: Option<ExportSummary>,
}

impl ExportRequestState {
    pub fn is_in_flight(&self) -> bool {
        self.status == ExportStatus::InFlight
    }
}

/// What the export endpoint returned.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportResponse {
    /// A file to save, with the filename hint from `Content-Disposition`.
    Download {
        bytes: Vec<u8>,
        suggested_filename: Option<String>,
    },
    /// A structured summary to display.
    Summary(ExportSummary),
}

/// Course design summary returned by the structured export.
///
/// Every section is optional; unknown top-level keys are preserved in
/// `extra` so the raw JSON view shows everything the service sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_design: Option<CourseDesign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_metrics: Option<QualityMetrics>,
    /// Framework area name to whether it has been covered.
    #[serde(deserialize_with = "crate::serde_util::null_as_default")]
    pub framework_analysis: BTreeMap<String, bool>,
    #[serde(deserialize_with = "crate::serde_util::null_as_default")]
    pub key_insights: Vec<String>,
    #[serde(deserialize_with = "crate::serde_util::null_as_default")]
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_metadata: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExportSummary {
    /// Framework areas marked as covered, in name order.
    pub fn covered_areas(&self) -> Vec<&str> {
        self.framework_analysis
            .iter()
            .filter(|(_, covered)| **covered)
            .map(|(area, _)| area.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseDesign {
    pub title: Option<String>,
    pub target_audience: Option<String>,
    pub educational_level: Option<String>,
    pub duration: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressSummary {
    #[serde(deserialize_with = "crate::serde_util::null_as_default")]
    pub completion_percentage: f64,
    #[serde(deserialize_with = "crate::serde_util::null_as_default")]
    pub current_step: u32,
    #[serde(deserialize_with = "crate::serde_util::null_as_default")]
    pub total_steps: u32,
    pub status: Option<String>,
}

impl ProgressSummary {
    pub fn is_completed(&self) -> bool {
        self.status.as_deref() == Some("completed")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityMetrics {
    #[serde(deserialize_with = "crate::serde_util::null_as_default")]
    pub total_messages: u32,
    /// Percentage in [0, 100].
    #[serde(deserialize_with = "crate::serde_util::null_as_default")]
    pub completeness_score: f64,
    /// Fraction in [0, 1].
    #[serde(deserialize_with = "crate::serde_util::null_as_default")]
    pub average_confidence: f64,
}

/// Coarse completion bucket used for coloring progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionBand {
    Low,
    Medium,
    High,
}

impl CompletionBand {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            CompletionBand::High
        } else if percentage >= 50.0 {
            CompletionBand::Medium
        } else {
            CompletionBand::Low
        }
    }
}
