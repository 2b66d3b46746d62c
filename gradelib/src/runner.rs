use std::io::{self, BufRead, BufReader};
use std::process::Command;
use tracing::{debug, warn};
use crate::error::GradeError;

/// A way of running a tester and collecting what it prints.
///
/// The driver only ever talks to testers through this trait, which lets the grading steps be
/// exercised against canned output as well as real processes
pub trait CommandRunner {
    /// Runs `argv[0]` with the remaining elements as arguments and returns stdout and stderr as
    /// one text, in the order the child wrote them.
    ///
    /// Each line is handed to `on_line` as soon as it is read, without its line terminator. The
    /// exit status of the child is never an error; callers judge success by the output alone
    ///
    /// # Arguments
    ///
    /// * `argv`: Program followed by its arguments, must not be empty
    /// * `on_line`: Called once per line while the child is still running
    ///
    /// returns: Result<String, GradeError>
    fn run(&mut self, argv: &[String], on_line: &mut dyn FnMut(&str)) -> Result<String, GradeError>;
}

/// Runs testers as child processes, blocking until each one exits. No timeout is applied
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&mut self, argv: &[String], on_line: &mut dyn FnMut(&str)) -> Result<String, GradeError> {
        let program = argv.first().cloned().unwrap_or_default();
        let launch_err = |source: io::Error| GradeError::Launch { program: program.clone(), source };
        debug!("Spawning {argv:?}");

        let (reader, writer) = io::pipe().map_err(launch_err)?;
        let mut child = {
            // Both streams go to the same pipe. The command is dropped at the end of this block so
            // the parent's copies of the write end close and the reader sees EOF when the child exits
            let mut command = Command::new(&program);
            command
                .args(&argv[argv.len().min(1)..])
                .stdout(writer.try_clone().map_err(launch_err)?)
                .stderr(writer);
            command.spawn().map_err(launch_err)?
        };

        let mut output = String::new();
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = reader.read_until(b'\n', &mut buf).map_err(launch_err)?;
            if read == 0 {
                break;
            }
            let text = String::from_utf8_lossy(&buf);
            on_line(text.trim_end_matches(['\n', '\r']));
            output.push_str(&text);
        }

        let status = child.wait().map_err(launch_err)?;
        if status.success() {
            debug!("{program} exited with {status}");
        } else {
            warn!("{program} exited with {status}, grading on its output anyway");
        }
        Ok(output)
    }
}

/// Convenience wrapper for callers that don't need the output line by line
pub fn run_cmd<R: CommandRunner + ?Sized>(runner: &mut R, argv: &[String]) -> Result<String, GradeError> {
    runner.run(argv, &mut |_: &str| {})
}

impl<R: CommandRunner + ?Sized> CommandRunner for &mut R {
    fn run(&mut self, argv: &[String], on_line: &mut dyn FnMut(&str)) -> Result<String, GradeError> {
        (**self).run(argv, on_line)
    }
}
