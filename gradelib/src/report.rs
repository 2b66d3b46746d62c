use std::io::{self, Write};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use crate::config::{GradingConfig, CSIM_KEY};
use crate::error::GradeError;
use crate::parser::TestResult;
use crate::score::compute_miss_score;

/// Miss count the transpose tester reports when it couldn't take a measurement (2^31 - 1)
pub const INVALID_MISSES: u64 = i32::MAX as u64;

/// The outcome of a grading pass. Can be rendered as the console summary or the autoresult string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradeReport {
    pub csim_score: u64,
    pub csim_max: u32,
    /// Product of every run's correctness flag, so 1 only when all runs were correct
    pub trans_correctness: u64,
    pub runs: Vec<TransRunReport>,
    pub total: f64,
    pub total_max: u32,
}

/// Score for a single transpose run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransRunReport {
    pub id: String,
    pub dimensions: String,
    pub correctness: u64,
    pub misses: u64,
    /// Score from the miss count alone
    pub perf_score: f64,
    /// `perf_score` gated by correctness, this is what counts towards the total
    pub score: f64,
    pub max_score: u32,
}

impl TransRunReport {
    /// The misses column: the count, or `invalid` for the sentinel
    pub fn misses_display(&self) -> String {
        if self.misses == INVALID_MISSES {
            "invalid".to_string()
        } else {
            self.misses.to_string()
        }
    }
}

impl GradeReport {
    /// Scores the parsed tester results against `config`.
    ///
    /// `trans` must hold one result per configured run, in the same order. Results with fewer
    /// fields than needed fail with [`GradeError::MissingField`]
    ///
    /// # Arguments
    ///
    /// * `config`: Thresholds and point values
    /// * `csim`: Parsed `TEST_CSIM_RESULTS` line, first field is the correctness points
    /// * `trans`: Parsed `TEST_TRANS_RESULTS` lines, each `[correctness, misses, ..]`
    ///
    /// returns: Result<GradeReport, GradeError>
    pub fn build(config: &GradingConfig, csim: &TestResult, trans: &[TestResult]) -> Result<Self, GradeError> {
        let table = config.score_table();
        let csim_score = csim.field(0)?;

        let mut runs = Vec::with_capacity(config.trans.runs.len());
        let mut trans_correctness: u64 = 1;
        for (run, result) in config.trans.runs.iter().zip(trans) {
            let correctness = result.field(0)?;
            let misses = result.field(1)?;
            let max_score = table.max(&run.id).unwrap_or(run.max_score);
            let perf_score = compute_miss_score(misses, run.lower, run.upper, max_score as f64);
            let score = perf_score * correctness as f64;
            if misses == INVALID_MISSES {
                warn!("{} reported an invalid miss count", run.dimensions());
            }
            info!("Trans {}: correctness {correctness}, misses {misses}, score {score:.1}", run.dimensions());
            trans_correctness = trans_correctness
                .checked_mul(correctness)
                .ok_or_else(|| GradeError::CorrectnessOverflow { tag: config.trans.tag.clone() })?;
            runs.push(TransRunReport {
                id: run.id.clone(),
                dimensions: run.dimensions(),
                correctness,
                misses,
                perf_score,
                score,
                max_score,
            });
        }

        let total = csim_score as f64 + runs.iter().map(|r| r.score).sum::<f64>();
        Ok(Self {
            csim_score,
            csim_max: table.max(CSIM_KEY).unwrap_or(config.csim.max_score),
            trans_correctness,
            runs,
            total,
            total_max: table.total(),
        })
    }

    /// Writes the fixed-width summary table
    pub fn write_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "\nCache Lab summary:")?;
        writeln!(out, "{:<22}{:>8}{:>10}{:>12}", "", "Points", "Max pts", "Misses")?;
        writeln!(out, "{:<22}{:>8.1}{:>10}", "Csim correctness", self.csim_score as f64, self.csim_max)?;
        for run in &self.runs {
            writeln!(
                out,
                "{:<22}{:>8.1}{:>10}{:>12}",
                format!("Trans perf {}", run.dimensions),
                run.score,
                run.max_score,
                run.misses_display()
            )?;
        }
        writeln!(out, "{:>22}{:>8.1}{:>10}", "Total points", self.total, self.total_max)
    }

    /// `<total>:<misses>:..` with one miss count per run, as consumed by the autograder
    pub fn autoresult_string(&self) -> String {
        let mut out = format!("{:.1}", self.total);
        for run in &self.runs {
            out.push_str(&format!(":{}", run.misses));
        }
        out
    }

    /// Writes the `AUTORESULT_STRING=` line, preceded by a blank line
    pub fn write_autoresult<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "\nAUTORESULT_STRING={}", self.autoresult_string())
    }
}
