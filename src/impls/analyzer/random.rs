use rand::{thread_rng, Rng};

use crate::core::ports::analyzer::{AnalysisReport, Analyzer, Verdict};
use crate::error::Error;

/// Stand-in analyzer: picks a verdict at random and attaches canned findings.
#[derive(Debug, Clone, Default)]
pub struct RandomAnalyzer {}

impl Analyzer for RandomAnalyzer {
    async fn analyze(&self, file_name: &str, content: &[u8]) -> Result<AnalysisReport, Error> {
        let (verdict, confidence) = {
            let mut rng = thread_rng();
            let verdict = match rng.gen_range(0..3) {
                0 => Verdict::Clean,
                1 => Verdict::Inconclusive,
                _ => Verdict::ManipulationDetected,
            };
            (verdict, rng.gen_range(0.55..0.99))
        };
        let findings = match verdict {
            Verdict::Clean => vec!["no traces of editing software in metadata".to_owned()],
            Verdict::Inconclusive => vec![
                "metadata partially stripped".to_owned(),
                "compression artifacts prevent block level comparison".to_owned(),
            ],
            Verdict::ManipulationDetected => vec![
                "error level analysis shows inconsistent regions".to_owned(),
                "embedded thumbnail does not match primary image".to_owned(),
            ],
        };
        Ok(AnalysisReport {
            file_name: file_name.to_owned(),
            size_bytes: content.len(),
            verdict,
            confidence,
            findings,
        })
    }
}
