use std::error::Error;
use regex::Regex;
use crate::config::{GradingConfig, TRANS_CORRECTNESS_KEY};
use crate::driver::Driver;
use crate::error::GradeError;
use crate::parser::{extract_integers, parse_result_line};
use crate::report::{GradeReport, TransRunReport, INVALID_MISSES};
use crate::score::compute_miss_score;
use crate::util::{csim_output, trans_output, ScriptedRunner};

fn grade(outputs: Vec<String>) -> (Result<GradeReport, GradeError>, String, ScriptedRunner) {
    let config = GradingConfig::default();
    let mut console = Vec::new();
    let mut runner = ScriptedRunner::new(outputs);
    let result = Driver::new(&config, &mut runner).grade(&mut console);
    (result, String::from_utf8(console).unwrap(), runner)
}

#[test]
fn miss_score_boundaries() {
    for miss in [0, 1, 299, 300] {
        assert_eq!(compute_miss_score(miss, 300, 600, 8.0), 8.0);
    }
    for miss in [600, 601, 5000, INVALID_MISSES] {
        assert_eq!(compute_miss_score(miss, 300, 600, 8.0), 0.0);
    }
    // Equal bounds never reach the division
    assert_eq!(compute_miss_score(300, 300, 300, 8.0), 8.0);
    assert_eq!(compute_miss_score(301, 300, 300, 8.0), 0.0);
}

#[test]
fn miss_score_interpolates_and_rounds() {
    assert_eq!(compute_miss_score(450, 300, 600, 8.0), 4.0);
    assert_eq!(compute_miss_score(1650, 1300, 2000, 8.0), 4.0);
    assert_eq!(compute_miss_score(2500, 2000, 3000, 10.0), 5.0);
    assert_eq!(compute_miss_score(1500, 1300, 2000, 8.0), 5.7);

    let mut previous = f64::MAX;
    for miss in 1300..=2000 {
        let score = compute_miss_score(miss, 1300, 2000, 8.0);
        assert!(score <= previous, "score rose at {miss}");
        assert_eq!(format!("{score:.1}").parse::<f64>().unwrap(), score);
        previous = score;
    }
}

#[test]
fn miss_score_rounds_stored_value_not_scaled_tie() {
    // 9.95, 9.85 and 7.55 are stored just below the tie and must round down
    assert_eq!(compute_miss_score(2005, 2000, 3000, 10.0), 9.9);
    assert_eq!(compute_miss_score(2015, 2000, 3000, 10.0), 9.8);
    assert_eq!(compute_miss_score(2245, 2000, 3000, 10.0), 7.5);
    assert_eq!(compute_miss_score(2055, 2000, 3000, 10.0), 9.4);
}

#[test]
fn digit_runs_are_extracted_in_order() -> Result<(), Box<dyn Error>> {
    assert_eq!(extract_integers("TEST_CSIM_RESULTS=27")?, vec![27]);
    assert_eq!(extract_integers("a12b3 c 0045 -7.5")?, vec![12, 3, 45, 7, 5]);
    assert!(extract_integers("no numbers here")?.is_empty());
    assert!(extract_integers("")?.is_empty());
    Ok(())
}

#[test]
fn digit_run_overflow_is_an_error() {
    let err = extract_integers("TAG 99999999999999999999999").unwrap_err();
    assert!(matches!(err, GradeError::IntegerOverflow { ref digits } if digits == "99999999999999999999999"));
}

#[test]
fn first_tagged_line_wins() -> Result<(), Box<dyn Error>> {
    let text = "noise 5\nTEST_TRANS_RESULTS=1:450\nTEST_TRANS_RESULTS=0:9999\n";
    let result = parse_result_line(text, "TEST_TRANS_RESULTS")?;
    assert_eq!(result.values(), &[1, 450]);

    // Prefix match only, and case sensitive
    let text = "  TEST_TRANS_RESULTS=1:1\ntest_trans_results=1:2\n";
    assert!(parse_result_line(text, "TEST_TRANS_RESULTS")?.is_empty());
    Ok(())
}

#[test]
fn short_result_line_names_the_missing_field() -> Result<(), Box<dyn Error>> {
    let result = parse_result_line("TEST_TRANS_RESULTS=1\n", "TEST_TRANS_RESULTS")?;
    assert_eq!(result.field(0)?, 1);
    match result.field(1) {
        Err(GradeError::MissingField { tag, index, line }) => {
            assert_eq!(tag, "TEST_TRANS_RESULTS");
            assert_eq!(index, 1);
            assert_eq!(line, "TEST_TRANS_RESULTS=1");
        }
        other => panic!("expected a missing field error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn full_marks_match_expected_report() -> Result<(), Box<dyn Error>> {
    let expected: GradeReport = serde_json::from_str(include_str!("fixtures/full_marks.json"))?;
    let (result, _, runner) = grade(vec![
        csim_output(27),
        trans_output(1, 287),
        trans_output(1, 1200),
        trans_output(1, 1950),
    ]);
    assert_eq!(result?, expected);

    let calls: Vec<String> = runner.calls().iter().map(|c| c.join(" ")).collect();
    assert_eq!(calls, vec![
        "./test-csim",
        "./test-trans -M 32 -N 32",
        "./test-trans -M 64 -N 64",
        "./test-trans -M 61 -N 67",
    ]);
    Ok(())
}

#[test]
fn summary_table_layout() -> Result<(), Box<dyn Error>> {
    let (result, console, _) = grade(vec![
        csim_output(27),
        trans_output(1, 450),
        trans_output(1, 1500),
        trans_output(1, INVALID_MISSES),
    ]);
    let report = result?;
    assert_eq!(report.csim_score, 27);
    assert_eq!(report.runs[0].score, 4.0);
    assert_eq!(report.runs[2].misses_display(), "invalid");
    assert_eq!(report.runs[2].score, 0.0);

    let expected = [
        "",
        "Cache Lab summary:",
        "                        Points   Max pts      Misses",
        "Csim correctness          27.0        27",
        "Trans perf 32x32           4.0         8         450",
        "Trans perf 64x64           5.7         8        1500",
        "Trans perf 61x67           0.0        10     invalid",
        "          Total points    36.7        53",
    ].join("\n") + "\n";
    assert!(console.ends_with(&expected), "unexpected summary:\n{console}");
    Ok(())
}

#[test]
fn incorrect_run_earns_no_perf_credit() -> Result<(), Box<dyn Error>> {
    let (result, _, _) = grade(vec![
        csim_output(27),
        trans_output(1, 287),
        trans_output(0, 100),
        trans_output(1, 1950),
    ]);
    let report = result?;
    assert_eq!(report.runs[1].perf_score, 8.0);
    assert_eq!(report.runs[1].score, 0.0);
    assert_eq!(report.trans_correctness, 0);
    assert_eq!(report.total, 45.0);
    Ok(())
}

#[test]
fn csim_output_is_passed_through_without_result_line() -> Result<(), Box<dyn Error>> {
    let (result, console, _) = grade(vec![
        csim_output(20),
        trans_output(1, 287),
        trans_output(1, 1200),
        trans_output(1, 1950),
    ]);
    assert_eq!(result?.csim_score, 20);
    assert!(console.starts_with("Part A: Testing cache simulator\nRunning ./test-csim\nTesting cache simulator\nRunning s=1 E=1 b=1\nPart B: Testing transpose function\n"));
    assert!(!console.contains("TEST_CSIM_RESULTS"));
    Ok(())
}

#[test]
fn missing_csim_results_stop_before_transpose() {
    let (result, _, runner) = grade(vec!["segmentation fault\n".to_string()]);
    match result {
        Err(err @ GradeError::MissingResults { .. }) => {
            assert_eq!(err.to_string(), "Failed to parse TEST_CSIM_RESULTS from test-csim output.");
            assert_eq!(err.captured_outputs(), &[("test-csim output".to_string(), "segmentation fault\n".to_string())]);
        }
        other => panic!("expected missing results, got {other:?}"),
    }
    assert_eq!(runner.calls().len(), 1);
}

#[test]
fn missing_trans_results_report_every_run() {
    let (result, _, runner) = grade(vec![
        csim_output(27),
        trans_output(1, 287),
        "Error: transpose crashed\n".to_string(),
        trans_output(1, 1950),
    ]);
    let err = result.unwrap_err();
    let labels: Vec<&str> = err.captured_outputs().iter().map(|(l, _)| l.as_str()).collect();
    assert_eq!(labels, vec!["32x32 output", "64x64 output", "61x67 output"]);
    assert_eq!(err.captured_outputs()[1].1, "Error: transpose crashed\n");
    assert_eq!(runner.calls().len(), 4);
}

#[test]
fn huge_correctness_flags_fail_instead_of_wrapping() {
    let big = || trans_output(4_294_967_296, 450);
    let (result, _, _) = grade(vec![csim_output(27), big(), big(), big()]);
    match result {
        Err(GradeError::CorrectnessOverflow { tag }) => assert_eq!(tag, "TEST_TRANS_RESULTS"),
        other => panic!("expected a correctness overflow, got {other:?}"),
    }
}

#[test]
fn failure_diagnostics_show_every_labelled_output() -> Result<(), Box<dyn Error>> {
    let (result, _, _) = grade(vec![
        csim_output(27),
        trans_output(1, 287),
        "Error: transpose crashed\n".to_string(),
        trans_output(1, 1950),
    ]);
    let mut out = Vec::new();
    result.unwrap_err().write_diagnostics(&mut out)?;
    let expected = [
        "Failed to parse TEST_TRANS_RESULTS from test-trans output.".to_string(),
        format!("32x32 output:\n{}", trans_output(1, 287)),
        "64x64 output:\nError: transpose crashed\n".to_string(),
        format!("61x67 output:\n{}", trans_output(1, 1950)),
    ].join("\n") + "\n";
    assert_eq!(String::from_utf8(out)?, expected);

    // Errors without captured output print just the message
    let mut out = Vec::new();
    GradeError::IntegerOverflow { digits: "1".repeat(30) }.write_diagnostics(&mut out)?;
    assert_eq!(String::from_utf8(out)?.lines().count(), 1);
    Ok(())
}

#[test]
fn autoresult_line_format() {
    let run = |id: &str, misses| TransRunReport {
        id: id.to_string(),
        dimensions: String::new(),
        correctness: 1,
        misses,
        perf_score: 0.0,
        score: 0.0,
        max_score: 0,
    };
    let report = GradeReport {
        csim_score: 27,
        csim_max: 27,
        trans_correctness: 1,
        runs: vec![run("trans32", 450), run("trans64", 1500), run("trans61", 2500)],
        total: 39.0,
        total_max: 53,
    };
    let mut out = Vec::new();
    report.write_autoresult(&mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "\nAUTORESULT_STRING=39.0:450:1500:2500\n");

    let shape = Regex::new(r"^\d+\.\d:\d+:\d+:\d+$").unwrap();
    assert!(shape.is_match(&report.autoresult_string()));
}

#[test]
fn config_defaults_and_aliases() -> Result<(), Box<dyn Error>> {
    let config = GradingConfig::default();
    let table = config.score_table();
    assert_eq!(table.max("csim"), Some(27));
    assert_eq!(table.max(TRANS_CORRECTNESS_KEY), Some(1));
    assert_eq!(table.max("trans61"), Some(10));
    assert_eq!(table.total(), 53);

    let config = GradingConfig::from_json(r#"{
        "csim": {"cmd": ["/opt/lab/test-csim"], "max": 30},
        "trans": {"runs": [{"id": "trans32", "M": 32, "N": 32, "lower": 250, "upper": 500, "max": 9}]}
    }"#)?;
    assert_eq!(config.csim.command, vec!["/opt/lab/test-csim"]);
    assert_eq!(config.csim.tag, "TEST_CSIM_RESULTS");
    assert_eq!(config.trans.command, vec!["./test-trans"]);
    assert_eq!(config.trans.runs.len(), 1);
    assert_eq!(config.trans.runs[0].args(), ["-M", "32", "-N", "32"]);
    assert_eq!(config.score_table().total(), 39);
    Ok(())
}

#[cfg(unix)]
mod process {
    use super::*;
    use crate::runner::{run_cmd, CommandRunner, ProcessRunner};

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn stderr_is_merged_in_write_order() -> Result<(), Box<dyn Error>> {
        let mut lines = Vec::new();
        let text = ProcessRunner.run(
            &argv(&["sh", "-c", "echo one; echo two 1>&2; echo TEST_CSIM_RESULTS 27"]),
            &mut |line: &str| lines.push(line.to_string()),
        )?;
        assert_eq!(text, "one\ntwo\nTEST_CSIM_RESULTS 27\n");
        assert_eq!(lines, vec!["one", "two", "TEST_CSIM_RESULTS 27"]);
        Ok(())
    }

    #[test]
    fn exit_status_is_not_an_error() -> Result<(), Box<dyn Error>> {
        let text = run_cmd(&mut ProcessRunner, &argv(&["sh", "-c", "echo TEST_TRANS_RESULTS 1 450; exit 3"]))?;
        assert_eq!(parse_result_line(&text, "TEST_TRANS_RESULTS")?.values(), &[1, 450]);
        Ok(())
    }

    #[test]
    fn missing_program_fails_to_launch() {
        let err = run_cmd(&mut ProcessRunner, &argv(&["./definitely-not-a-tester"])).unwrap_err();
        assert!(matches!(err, GradeError::Launch { ref program, .. } if program == "./definitely-not-a-tester"));
        assert!(matches!(run_cmd(&mut ProcessRunner, &[]), Err(GradeError::Launch { .. })));
    }
}
