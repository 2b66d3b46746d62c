use std::io::{self, Write};
use thiserror::Error;

/// Everything that can stop a grading pass. None of these are retried, the driver prints the
/// message plus any captured output and exits with status 1
#[derive(Debug, Error)]
pub enum GradeError {
    #[error("Couldn't run {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// One or more runs never printed their tagged result line. `outputs` holds the raw text of
    /// every run in the step, labelled, so the operator can see what the tester printed instead
    #[error("Failed to parse {tag} from {program} output.")]
    MissingResults {
        tag: String,
        program: String,
        outputs: Vec<(String, String)>,
    },

    #[error("{tag} line has no field {index}: {line:?}")]
    MissingField {
        tag: String,
        index: usize,
        line: String,
    },

    #[error("Number {digits} in result line doesn't fit in 64 bits")]
    IntegerOverflow { digits: String },

    #[error("Correctness flags from {tag} multiply past 64 bits")]
    CorrectnessOverflow { tag: String },

    #[error("Couldn't write to the console: {0}")]
    Console(#[from] io::Error),
}

impl GradeError {
    /// Writes the message followed by each captured output under its label
    pub fn write_diagnostics<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{self}")?;
        for (label, text) in self.captured_outputs() {
            writeln!(out, "{label}:\n{text}")?;
        }
        out.flush()
    }

    /// The raw collaborator output attached to this error, if any, as `(label, text)` pairs
    pub fn captured_outputs(&self) -> &[(String, String)] {
        match self {
            GradeError::MissingResults { outputs, .. } => outputs,
            _ => &[],
        }
    }
}
