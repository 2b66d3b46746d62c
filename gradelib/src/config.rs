use std::collections::BTreeMap;
use serde::Deserialize;

/// Everything the driver needs to know about the lab: which testers to run, how to recognise their
/// results, and how many points each part is worth. Defaults match the cache lab
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct GradingConfig {
    pub csim: CsimConfig,
    pub trans: TransConfig,
}

/// The cache simulator tester
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CsimConfig {
    #[serde(alias = "cmd")]
    pub command: Vec<String>,
    pub tag: String,
    #[serde(alias = "max")]
    pub max_score: u32,
}

/// The transpose tester, run once for each entry in `runs`, in order
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransConfig {
    #[serde(alias = "cmd")]
    pub command: Vec<String>,
    pub tag: String,
    /// Points for getting every run correct, tracked separately from the perf scores
    #[serde(alias = "correctness_max")]
    pub correctness_max_score: u32,
    pub runs: Vec<TransRunConfig>,
}

/// One matrix shape and the miss thresholds it is scored against
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TransRunConfig {
    /// Key in the score table, e.g. `trans32`
    pub id: String,
    #[serde(alias = "M", alias = "m")]
    pub rows: u32,
    #[serde(alias = "N", alias = "n")]
    pub cols: u32,
    pub lower: u64,
    pub upper: u64,
    #[serde(alias = "max")]
    pub max_score: u32,
}

impl TransRunConfig {
    fn new(id: &str, rows: u32, cols: u32, lower: u64, upper: u64, max_score: u32) -> Self {
        Self {
            id: id.to_string(),
            rows,
            cols,
            lower,
            upper,
            max_score,
        }
    }

    /// Shape as printed in the summary, e.g. `61x67`
    pub fn dimensions(&self) -> String {
        format!("{}x{}", self.rows, self.cols)
    }

    /// Extra arguments handed to the transpose tester for this run
    pub fn args(&self) -> [String; 4] {
        ["-M".to_string(), self.rows.to_string(), "-N".to_string(), self.cols.to_string()]
    }
}

impl Default for CsimConfig {
    fn default() -> Self {
        Self {
            command: vec!["./test-csim".to_string()],
            tag: "TEST_CSIM_RESULTS".to_string(),
            max_score: 27,
        }
    }
}

impl Default for TransConfig {
    fn default() -> Self {
        Self {
            command: vec!["./test-trans".to_string()],
            tag: "TEST_TRANS_RESULTS".to_string(),
            correctness_max_score: 1,
            runs: vec![
                TransRunConfig::new("trans32", 32, 32, 300, 600, 8),
                TransRunConfig::new("trans64", 64, 64, 1300, 2000, 8),
                TransRunConfig::new("trans61", 61, 67, 2000, 3000, 10),
            ],
        }
    }
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            csim: CsimConfig::default(),
            trans: TransConfig::default(),
        }
    }
}

impl GradingConfig {
    /// Parses a JSON configuration. Missing sections fall back to the cache lab defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn score_table(&self) -> ScoreTable {
        let mut points = BTreeMap::new();
        points.insert(CSIM_KEY.to_string(), self.csim.max_score);
        points.insert(TRANS_CORRECTNESS_KEY.to_string(), self.trans.correctness_max_score);
        for run in &self.trans.runs {
            points.insert(run.id.clone(), run.max_score);
        }
        ScoreTable {
            points,
            perf_keys: self.trans.runs.iter().map(|r| r.id.clone()).collect(),
        }
    }
}

pub const CSIM_KEY: &str = "csim";
pub const TRANS_CORRECTNESS_KEY: &str = "transc";

/// Maximum points per test id, fixed for the whole grading pass
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreTable {
    points: BTreeMap<String, u32>,
    perf_keys: Vec<String>,
}

impl ScoreTable {
    pub fn max(&self, id: &str) -> Option<u32> {
        self.points.get(id).copied()
    }

    /// Points available in the summary total: the simulator plus every perf run. Transpose
    /// correctness is reported but not part of the total
    pub fn total(&self) -> u32 {
        let perf: u32 = self.perf_keys.iter().filter_map(|k| self.max(k)).sum();
        self.max(CSIM_KEY).unwrap_or(0) + perf
    }
}
