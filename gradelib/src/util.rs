use std::collections::VecDeque;
use crate::error::GradeError;
use crate::runner::CommandRunner;

/// A runner that replays canned tester output instead of spawning processes.
///
/// Each call to `run` pops the next scripted output and records the argv it was given, so tests
/// can check both what was run and how its output was graded
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    outputs: VecDeque<String>,
    calls: Vec<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new<I, S>(outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            outputs: outputs.into_iter().map(Into::into).collect(),
            calls: Vec::new(),
        }
    }

    /// Every argv passed to `run`, in call order
    pub fn calls(&self) -> &[Vec<String>] {
        &self.calls
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&mut self, argv: &[String], on_line: &mut dyn FnMut(&str)) -> Result<String, GradeError> {
        self.calls.push(argv.to_vec());
        let text = self.outputs.pop_front().unwrap_or_default();
        for line in text.lines() {
            on_line(line);
        }
        Ok(text)
    }
}

/// Canned `test-csim` output with the given correctness points
pub fn csim_output(points: u64) -> String {
    format!("Testing cache simulator\nRunning s=1 E=1 b=1\nTEST_CSIM_RESULTS={points}\n")
}

/// Canned `test-trans` output for one run
pub fn trans_output(correct: u64, misses: u64) -> String {
    format!("Function 0 (1 total)\nStep 1: Validating and generating memory traces\nTEST_TRANS_RESULTS={correct}:{misses}\n")
}
