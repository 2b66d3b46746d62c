//! # GradeLib
//!
//! Gradelib grades the cache lab: it runs the pre-built cache simulator and transpose testers,
//! picks their tagged result lines out of the captured output, and turns correctness flags and
//! miss counts into a weighted score
//!
//! The testers themselves are external programs. Everything here is about invoking them, reading
//! what they print, and reporting the result either as a table or as a single autograder line

/// Contains the error type shared by every grading step
pub mod error;

/// Contains the grading configuration: tester commands, result tags, thresholds and point values
pub mod config;

/// Contains the miss count to score mapping
pub mod score;

/// Contains the runner trait used to invoke testers, and the process backed implementation
pub mod runner;

/// Contains the result line scanner
pub mod parser;

/// Contains the scored report and its console and autograder renderings
pub mod report;

/// Contains the driver which sequences the testers and builds the report
pub mod driver;

#[cfg(test)]
mod test;

/// Contains utilities for running tests and benchmarks.
pub mod util;
