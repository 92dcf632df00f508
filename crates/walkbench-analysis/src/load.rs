//! Result file loading.
//!
//! Disimpy results are plain text, one number per whitespace-separated
//! field. Camino writes raw float32 streams, big-endian unless it was
//! asked for little-endian output.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use tracing::debug;

use crate::error::{AnalysisError, AnalysisResult};

/// Simulator that produced a result file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Simulator {
    Disimpy,
    Camino,
}

impl Simulator {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Disimpy => "disimpy",
            Self::Camino => "camino",
        }
    }
}

impl fmt::Display for Simulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte order of a raw float32 stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Endianness {
    #[default]
    Big,
    Little,
}

/// File naming convention of a results directory.
#[derive(Debug, Clone)]
pub struct ResultPaths {
    dir: PathBuf,
}

impl ResultPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Wall-clock runtime of one simulation, in seconds.
    #[must_use]
    pub fn runtime(&self, simulator: Simulator, walkers: u64, steps: u64) -> PathBuf {
        self.dir
            .join(format!("{simulator}_runtime_w{walkers}_t{steps}.txt"))
    }

    /// Disimpy signal sums, one per b-value.
    #[must_use]
    pub fn disimpy_signals(&self, walkers: u64, steps: u64) -> PathBuf {
        self.dir
            .join(format!("disimpy_signals_w{walkers}_t{steps}.txt"))
    }

    /// Camino signal sums as a big-endian float32 stream.
    #[must_use]
    pub fn camino_signals(&self, walkers: u64, steps: u64) -> PathBuf {
        self.dir
            .join(format!("camino_signals_w{walkers}_t{steps}.bfloat"))
    }
}

fn read_text(path: &Path) -> AnalysisResult<String> {
    fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))
}

/// Parse whitespace-separated numbers, skipping `#` comments.
fn parse_numbers(text: &str, path: &Path) -> AnalysisResult<Vec<f64>> {
    let mut values = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let content = line.split_once('#').map_or(line, |(before, _)| before);
        for field in content.split_whitespace() {
            let value = field.parse::<f64>().map_err(|_| AnalysisError::Parse {
                path: path.to_path_buf(),
                line: idx + 1,
                value: field.to_owned(),
            })?;
            values.push(value);
        }
    }
    Ok(values)
}

/// Read a text file holding exactly one number.
pub fn read_scalar(path: &Path) -> AnalysisResult<f64> {
    let values = parse_numbers(&read_text(path)?, path)?;
    match values.as_slice() {
        [value] => Ok(*value),
        _ => Err(AnalysisError::ExpectedScalar {
            path: path.to_path_buf(),
            found: values.len(),
        }),
    }
}

/// Read a text file of whitespace-separated numbers.
pub fn read_series(path: &Path) -> AnalysisResult<Vec<f64>> {
    let values = parse_numbers(&read_text(path)?, path)?;
    debug!(path = %path.display(), values = values.len(), "read text series");
    Ok(values)
}

/// Read a raw float32 stream.
pub fn read_raw_f32(path: &Path, endianness: Endianness) -> AnalysisResult<Vec<f64>> {
    let bytes = fs::read(path).map_err(|e| AnalysisError::io(path, e))?;
    if bytes.len() % 4 != 0 {
        return Err(AnalysisError::TruncatedFloats {
            path: path.to_path_buf(),
            len: bytes.len(),
        });
    }

    let mut values = vec![0f32; bytes.len() / 4];
    match endianness {
        Endianness::Big => BigEndian::read_f32_into(&bytes, &mut values),
        Endianness::Little => LittleEndian::read_f32_into(&bytes, &mut values),
    }
    debug!(path = %path.display(), values = values.len(), ?endianness, "read float32 stream");
    Ok(values.into_iter().map(f64::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn paths_follow_naming_convention() {
        let paths = ResultPaths::new("results");
        assert_eq!(
            paths.runtime(Simulator::Camino, 1000, 10_000),
            Path::new("results/camino_runtime_w1000_t10000.txt")
        );
        assert_eq!(
            paths.disimpy_signals(10_000, 10_000),
            Path::new("results/disimpy_signals_w10000_t10000.txt")
        );
        assert_eq!(
            paths.camino_signals(10_000, 10_000),
            Path::new("results/camino_signals_w10000_t10000.bfloat")
        );
    }

    #[test]
    fn reads_scalar_in_numpy_notation() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "runtime.txt", "1.234500000000000000e+01\n");
        assert!((read_scalar(&path).unwrap() - 12.345).abs() < 1e-12);
    }

    #[test]
    fn scalar_file_with_several_values_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "runtime.txt", "1.0\n2.0\n");
        assert!(matches!(
            read_scalar(&path),
            Err(AnalysisError::ExpectedScalar { found: 2, .. })
        ));
    }

    #[test]
    fn series_skips_comments_and_reports_bad_fields() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "signals.txt", "# header\n1.0 2.0\n3.0 # trailing\n\n4e3\n");
        assert_eq!(read_series(&path).unwrap(), vec![1.0, 2.0, 3.0, 4000.0]);

        let bad = write(&dir, "bad.txt", "1.0\n2.0\nthree\n");
        let err = read_series(&bad).unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { line: 3, .. }), "{err}");
    }

    #[test]
    fn reads_big_and_little_endian_floats() {
        let dir = TempDir::new().unwrap();
        let big = write(
            &dir,
            "signals.bfloat",
            [0x3F_u8, 0x80, 0x00, 0x00, 0xC0, 0x20, 0x00, 0x00],
        );
        assert_eq!(read_raw_f32(&big, Endianness::Big).unwrap(), vec![1.0, -2.5]);

        let little = write(&dir, "signals.lfloat", [0x00_u8, 0x00, 0x80, 0x3F]);
        assert_eq!(
            read_raw_f32(&little, Endianness::Little).unwrap(),
            vec![1.0]
        );
    }

    #[test]
    fn truncated_float_stream_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "short.bfloat", [0x3F_u8, 0x80, 0x00]);
        assert!(matches!(
            read_raw_f32(&path, Endianness::Big),
            Err(AnalysisError::TruncatedFloats { len: 3, .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = read_scalar(&dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, AnalysisError::Io { .. }));
    }
}
