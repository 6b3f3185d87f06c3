//! Academic markers: CGPA / percentage extraction from education text.
//!
//! Regex patterns run first. When they find nothing, the education scorer may
//! consult an injected `AcademicMarkerExtractor`; the default backend asks the
//! hosted model, tests substitute deterministic stubs.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::llm_client::LlmClient;
use crate::scoring::prompts::{academic_marker_system, ACADEMIC_MARKER_PROMPT_TEMPLATE};

/// How an academic value is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerKind {
    #[serde(rename = "CGPA", alias = "GPA", alias = "cgpa")]
    Cgpa,
    #[serde(alias = "percentage")]
    Percentage,
}

impl std::fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkerKind::Cgpa => f.write_str("CGPA"),
            MarkerKind::Percentage => f.write_str("Percentage"),
        }
    }
}

/// A raw academic value as written in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcademicMarker {
    pub value: f64,
    pub kind: MarkerKind,
}

impl AcademicMarker {
    /// Rejects values no real transcript would carry. Grade points above the
    /// 10-point scale are kept and clamped later.
    pub fn is_plausible(&self) -> bool {
        self.value.is_finite()
            && self.value > 0.0
            && (self.kind == MarkerKind::Cgpa || self.value <= 100.0)
    }
}

const NUM: &str = r"(\d+(?:\.\d+)?)";

/// Ordered: the first pattern that yields a plausible value wins.
static MARKER_PATTERNS: Lazy<Vec<(Regex, MarkerKind)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(&format!(r"(?i)\bc\.?g\.?p\.?a\.?\s*(?:of|is)?\s*[:\-=]?\s*{NUM}")).unwrap(),
            MarkerKind::Cgpa,
        ),
        (
            Regex::new(&format!(r"(?i)\bg\.?p\.?a\.?\s*(?:of|is)?\s*[:\-=]?\s*{NUM}")).unwrap(),
            MarkerKind::Cgpa,
        ),
        (
            Regex::new(r"(\d{2,3}(?:\.\d+)?)\s*%").unwrap(),
            MarkerKind::Percentage,
        ),
        (
            Regex::new(r"(?i)\b(?:marks|aggregate|overall|percentage)\s*(?:of|is)?\s*[:\-=]?\s*(\d{2,3}(?:\.\d+)?)")
                .unwrap(),
            MarkerKind::Percentage,
        ),
    ]
});

/// Runs the ordered regex patterns over `text`.
pub fn find_academic_marker(text: &str) -> Option<AcademicMarker> {
    MARKER_PATTERNS.iter().find_map(|(re, kind)| {
        re.captures_iter(text)
            .filter_map(|caps| caps[1].parse::<f64>().ok())
            .map(|value| AcademicMarker { value, kind: *kind })
            .find(AcademicMarker::is_plausible)
    })
}

/// Fallback strategy for education text the regex patterns cannot read.
///
/// Implementations must not fail: any error is reported as `None`.
#[async_trait]
pub trait AcademicMarkerExtractor: Send + Sync {
    async fn extract(&self, education_text: &str) -> Option<AcademicMarker>;

    /// Backend label for logs.
    fn backend(&self) -> &'static str;
}

/// Extractor used when no hosted model is configured.
pub struct NoMarkerExtractor;

#[async_trait]
impl AcademicMarkerExtractor for NoMarkerExtractor {
    async fn extract(&self, _education_text: &str) -> Option<AcademicMarker> {
        None
    }

    fn backend(&self) -> &'static str {
        "none"
    }
}

#[derive(Debug, Deserialize)]
struct MarkerReply {
    value: Option<f64>,
    kind: Option<MarkerKind>,
}

/// Asks the hosted model for the academic result.
pub struct LlmMarkerExtractor(pub LlmClient);

#[async_trait]
impl AcademicMarkerExtractor for LlmMarkerExtractor {
    async fn extract(&self, education_text: &str) -> Option<AcademicMarker> {
        let prompt = ACADEMIC_MARKER_PROMPT_TEMPLATE.replace("{education_text}", education_text);
        let reply = match self
            .0
            .call_json::<MarkerReply>(&prompt, &academic_marker_system())
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(component = "education", "academic marker fallback failed: {e}");
                return None;
            }
        };

        let marker = match (reply.value, reply.kind) {
            (Some(value), Some(kind)) => AcademicMarker { value, kind },
            _ => {
                debug!(component = "education", "model found no academic marker");
                return None;
            }
        };

        if marker.is_plausible() {
            Some(marker)
        } else {
            warn!(
                component = "education",
                "discarding implausible model marker {} {}", marker.kind, marker.value
            );
            None
        }
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}
