use crate::error::Stage;
use serde::Serialize;
use std::time::Instant;

/// Wall time spent in one loop stage, summed over all iterations.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

impl StageTiming {
    pub fn new(label: impl Into<String>, elapsed_ms: f64) -> Self {
        Self {
            label: label.into(),
            elapsed_ms,
        }
    }
}

/// Aggregated timing trace for one estimator run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    pub fn with_total(total_ms: f64) -> Self {
        Self {
            total_ms,
            stages: Vec::new(),
        }
    }

    /// Add `elapsed_ms` to the entry of `stage`, creating it on first use.
    /// Entries keep the order in which stages first ran.
    pub fn add(&mut self, stage: Stage, elapsed_ms: f64) {
        let label = stage.to_string();
        match self.stages.iter_mut().find(|s| s.label == label) {
            Some(entry) => entry.elapsed_ms += elapsed_ms,
            None => self.stages.push(StageTiming::new(label, elapsed_ms)),
        }
    }

    /// Time `f` and book it under `stage`.
    pub fn time<T>(&mut self, stage: Stage, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.add(stage, elapsed_ms(start));
        out
    }

    pub fn stage_ms(&self, stage: Stage) -> Option<f64> {
        let label = stage.to_string();
        self.stages
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.elapsed_ms)
    }
}

pub(crate) fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_stages_accumulate_in_first_seen_order() {
        let mut t = TimingBreakdown::default();
        t.add(Stage::Fit, 1.0);
        t.add(Stage::Quality, 2.0);
        t.add(Stage::Fit, 0.5);
        assert_eq!(t.stages.len(), 2);
        assert_eq!(t.stages[0].label, "fit");
        assert_eq!(t.stage_ms(Stage::Fit), Some(1.5));
        assert_eq!(t.stage_ms(Stage::Smooth), None);
    }

    #[test]
    fn time_returns_closure_output() {
        let mut t = TimingBreakdown::with_total(0.0);
        let v = t.time(Stage::Mediate, || 42);
        assert_eq!(v, 42);
        assert!(t.stage_ms(Stage::Mediate).unwrap() >= 0.0);
    }
}
