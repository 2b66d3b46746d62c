use serde::{Deserialize, Serialize};
use crate::error::GradeError;

/// The integers pulled out of one tagged result line, in the order they appeared.
///
/// What each position means depends on the tester: for `test-csim` the first value is the
/// correctness points, for `test-trans` it is the correctness flag followed by the miss count
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct TestResult {
    tag: String,
    line: String,
    values: Vec<u64>,
}

impl TestResult {
    pub fn new(tag: &str, line: &str, values: Vec<u64>) -> Self {
        Self {
            tag: tag.to_string(),
            line: line.to_string(),
            values,
        }
    }

    /// True when no line carried the tag
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    /// Gets the value at `index`, failing with the offending line when the tester printed fewer
    /// fields than expected
    pub fn field(&self, index: usize) -> Result<u64, GradeError> {
        self.values.get(index).copied().ok_or_else(|| GradeError::MissingField {
            tag: self.tag.clone(),
            index,
            line: self.line.clone(),
        })
    }
}

/// Finds the first line of `text` starting with `tag`. Later lines with the same tag are ignored
pub fn find_tagged_line<'a>(text: &'a str, tag: &str) -> Option<&'a str> {
    text.lines().find(|line| line.starts_with(tag))
}

/// Scans the first line starting with `tag` and returns its integers.
///
/// An absent tag gives an empty result rather than an error; callers decide whether that is fatal
///
/// # Arguments
///
/// * `text`: Captured output of a tester
/// * `tag`: Exact, case sensitive line prefix
///
/// returns: Result<TestResult, GradeError>
pub fn parse_result_line(text: &str, tag: &str) -> Result<TestResult, GradeError> {
    match find_tagged_line(text, tag) {
        Some(line) => Ok(TestResult::new(tag, line, extract_integers(line)?)),
        None => Ok(TestResult::new(tag, "", Vec::new())),
    }
}

/// Returns every maximal run of ASCII digits in `line` as an integer, left to right.
///
/// Digits glued to letters count too, so `x86y` yields `86`. Signs and decimal points are not
/// understood: `-3.5` yields `3` and `5`
///
/// # Examples
///
/// ```
/// use gradelib::parser::extract_integers;
/// let values = extract_integers("TEST_TRANS_RESULTS=1:287").unwrap();
/// assert_eq!(values, vec![1, 287]);
/// ```
pub fn extract_integers(line: &str) -> Result<Vec<u64>, GradeError> {
    let bytes = line.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        let mut value: u64 = 0;
        let mut overflowed = false;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            let digit = (bytes[i] - b'0') as u64;
            match value.checked_mul(10).and_then(|v| v.checked_add(digit)) {
                Some(v) => value = v,
                None => overflowed = true,
            }
            i += 1;
        }
        if overflowed {
            // Run is ASCII, so slicing on these byte offsets stays on char boundaries
            return Err(GradeError::IntegerOverflow { digits: line[start..i].to_string() });
        }
        out.push(value);
    }
    Ok(out)
}
