//! JSON summaries written alongside figures.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use walkbench_analysis::{ExtrapolatedRuntime, RuntimeAnalysis, SignalAnalysis};

#[derive(Debug, Serialize)]
pub struct RuntimeSummary<'a> {
    pub figure: &'a Path,
    pub max_speedup: Option<ExtrapolatedRuntime>,
    #[serde(flatten)]
    pub analysis: &'a RuntimeAnalysis,
}

impl<'a> RuntimeSummary<'a> {
    pub fn new(analysis: &'a RuntimeAnalysis, figure: &'a Path) -> Self {
        Self {
            figure,
            max_speedup: analysis.max_speedup(),
            analysis,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignalSummary<'a> {
    pub figure: &'a Path,
    pub walkers: u64,
    #[serde(flatten)]
    pub analysis: &'a SignalAnalysis,
}

/// Write `value` as pretty-printed JSON, creating parent directories.
pub fn write<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), "wrote summary");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use walkbench_analysis::RuntimeComparison;

    #[test]
    fn runtime_summary_flattens_analysis() {
        let analysis = RuntimeComparison::new(
            vec![1, 10, 100],
            vec![1.0, 1.0, 2.0],
            vec![1.0, 10.0],
        )
        .unwrap()
        .analyze()
        .unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/runtime.json");
        let figure = Path::new("figures/runtime_comparison.png");
        write(&path, &RuntimeSummary::new(&analysis, figure)).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["figure"], "figures/runtime_comparison.png");
        assert_eq!(json["max_speedup"]["walkers"], 100);
        assert_eq!(json["walkers"].as_array().unwrap().len(), 3);
        assert!(json["slope"].as_f64().unwrap() > 0.0);
    }
}
