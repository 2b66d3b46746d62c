use std::io::{self, Write};
use std::process::ExitCode;
use clap::Parser;
use gradelib::config::GradingConfig;
use gradelib::driver::Driver;
use gradelib::error::GradeError;
use gradelib::runner::ProcessRunner;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = String::from("Test correctness of cache simulator and correctness/perf of transpose"))]
struct Args {
    /// Emit the autoresult string for Autolab
    #[arg(short = 'A', long)]
    autograde: bool,
}

fn main() -> ExitCode {
    // Diagnostics go to stderr so stdout stays exactly the summary the autograder reads
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();
    let config = GradingConfig::default();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = Driver::new(&config, ProcessRunner)
        .grade(&mut out)
        .and_then(|report| {
            if args.autograde {
                report.write_autoresult(&mut out)?;
            }
            Ok(())
        });
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_failure(&mut out, &e);
            ExitCode::FAILURE
        }
    }
}

/// Prints the error and whatever the testers printed, so the operator can see why grading stopped
fn report_failure<W: Write>(out: &mut W, error: &GradeError) {
    error!("{error}");
    if let Err(e) = error.write_diagnostics(out) {
        error!("Couldn't print diagnostics: {e}");
    }
}
