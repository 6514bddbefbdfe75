use serde::Serialize;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Clean,
    Inconclusive,
    ManipulationDetected,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub file_name: String,
    pub size_bytes: usize,
    pub verdict: Verdict,
    pub confidence: f64,
    pub findings: Vec<String>,
}

/// Media analysis port. The platform itself performs no real forensics;
/// implementations only have to accept a file and return a report shape.
#[allow(async_fn_in_trait)]
pub trait Analyzer {
    async fn analyze(&self, file_name: &str, content: &[u8]) -> Result<AnalysisReport, Error>;
}
