//! Per-stage kernel timings of one denoise call

use std::fmt;
use std::time::Duration;

/// Backend-reported execution time of each pipeline stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DenoiseProfile {
    pub forward_rows: Duration,
    pub transpose: Duration,
    pub forward_columns: Duration,
    pub threshold: Duration,
    pub inverse_columns: Duration,
    pub transpose_back: Duration,
    pub inverse_rows: Duration,
}

impl DenoiseProfile {
    /// Stages in pipeline order
    pub fn stages(&self) -> [(&'static str, Duration); 7] {
        [
            ("forward rows", self.forward_rows),
            ("transpose", self.transpose),
            ("forward columns", self.forward_columns),
            ("threshold", self.threshold),
            ("inverse columns", self.inverse_columns),
            ("transpose back", self.transpose_back),
            ("inverse rows", self.inverse_rows),
        ]
    }

    /// Sum over all stages
    pub fn total(&self) -> Duration {
        self.stages().iter().map(|(_, d)| *d).sum()
    }
}

impl fmt::Display for DenoiseProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, duration) in self.stages() {
            writeln!(f, "{:>16}: {:>10.3} ms", name, duration.as_secs_f64() * 1000.0)?;
        }
        write!(f, "{:>16}: {:>10.3} ms", "total", self.total().as_secs_f64() * 1000.0)
    }
}
