use std::io::{self, Write};
use std::path::Path;
use tracing::debug;
use crate::config::GradingConfig;
use crate::error::GradeError;
use crate::parser::{parse_result_line, TestResult};
use crate::report::GradeReport;
use crate::runner::CommandRunner;

/// Runs the testers one after another and turns their output into a [`GradeReport`].
///
/// Progress and the simulator tester's own output are written to the console as the pass goes;
/// the summary is written once everything has been scored. There are no retries, the first
/// failure ends the pass
pub struct Driver<'a, R: CommandRunner> {
    config: &'a GradingConfig,
    runner: R,
}

impl<'a, R: CommandRunner> Driver<'a, R> {
    pub fn new(config: &'a GradingConfig, runner: R) -> Self {
        Self { config, runner }
    }

    /// Grades both parts and writes the summary to `out`.
    ///
    /// # Arguments
    ///
    /// * `out`: Console to write progress, pass-through lines and the summary to
    ///
    /// returns: Result<GradeReport, GradeError>
    pub fn grade<W: Write>(&mut self, out: &mut W) -> Result<GradeReport, GradeError> {
        let csim = self.test_csim(out)?;
        let trans = self.test_trans(out)?;
        let report = GradeReport::build(self.config, &csim, &trans)?;
        report.write_summary(out)?;
        Ok(report)
    }

    /// Part A: one run of the simulator tester. Every line other than the result line is echoed
    fn test_csim<W: Write>(&mut self, out: &mut W) -> Result<TestResult, GradeError> {
        let csim = &self.config.csim;
        writeln!(out, "Part A: Testing cache simulator")?;
        writeln!(out, "Running {}", csim.command.join(" "))?;
        out.flush()?;

        let mut echo_err: Option<io::Error> = None;
        let text = self.runner.run(&csim.command, &mut |line: &str| {
            if echo_err.is_none() && !line.starts_with(&csim.tag) {
                if let Err(e) = writeln!(out, "{line}") {
                    echo_err = Some(e);
                }
            }
        })?;
        if let Some(e) = echo_err {
            return Err(e.into());
        }

        let result = parse_result_line(&text, &csim.tag)?;
        debug!("{} values: {:?}", csim.tag, result.values());
        if result.is_empty() {
            return Err(GradeError::MissingResults {
                tag: csim.tag.clone(),
                program: program_name(&csim.command),
                outputs: vec![(format!("{} output", program_name(&csim.command)), text)],
            });
        }
        Ok(result)
    }

    /// Part B: one run of the transpose tester per configured shape. All shapes run before any
    /// missing result line is reported, so the failure shows every output
    fn test_trans<W: Write>(&mut self, out: &mut W) -> Result<Vec<TestResult>, GradeError> {
        let trans = &self.config.trans;
        writeln!(out, "Part B: Testing transpose function")?;

        let mut outputs = Vec::with_capacity(trans.runs.len());
        let mut results = Vec::with_capacity(trans.runs.len());
        for run in &trans.runs {
            let mut argv = trans.command.clone();
            argv.extend(run.args());
            writeln!(out, "Running {}", argv.join(" "))?;
            out.flush()?;

            let text = self.runner.run(&argv, &mut |_: &str| {})?;
            let result = parse_result_line(&text, &trans.tag)?;
            debug!("{} values for {}: {:?}", trans.tag, run.dimensions(), result.values());
            outputs.push((format!("{} output", run.dimensions()), text));
            results.push(result);
        }

        if results.iter().any(TestResult::is_empty) {
            return Err(GradeError::MissingResults {
                tag: trans.tag.clone(),
                program: program_name(&trans.command),
                outputs,
            });
        }
        Ok(results)
    }
}

/// `./test-trans` becomes `test-trans`
fn program_name(command: &[String]) -> String {
    command
        .first()
        .map(|p| {
            Path::new(p)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.clone())
        })
        .unwrap_or_default()
}
