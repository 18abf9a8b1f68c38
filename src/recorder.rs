use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::BenchError,
    observation::{Layout, Observation},
    sink::ObservationSink,
    Result,
};

/// When the header line is written relative to the data rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPolicy {
    /// Header on the first labels trigger, fired at the start of a run, then
    /// every row as it arrives. A row that comes before any trigger still gets
    /// the header written above it.
    #[default]
    Streaming,
    /// Rows are held back until the labels trigger, which writes the header
    /// followed by everything collected so far.
    Deferred,
}

/// Writes observations as CSV rows in a fixed [`Layout`].
///
/// The header appears exactly once, whichever order labels and rows arrive in.
pub struct CsvRecorder<W: Write> {
    writer: W,
    layout: Layout,
    policy: LabelPolicy,
    /// File being written, for error reporting
    path: Option<PathBuf>,
    labels_added: bool,
    pending: Vec<String>,
    rows_written: usize,
}

impl CsvRecorder<BufWriter<File>> {
    /// Create (or truncate) the file at `path`.
    pub fn create(path: impl AsRef<Path>, layout: Layout, policy: LabelPolicy) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| BenchError::io(path, e))?;
        debug!(path = %path.display(), ?layout, ?policy, "recording observations");

        let mut recorder = CsvRecorder::new(BufWriter::new(file), layout, policy);
        recorder.path = Some(path.to_path_buf());
        Ok(recorder)
    }
}

impl<W: Write> CsvRecorder<W> {
    pub fn new(writer: W, layout: Layout, policy: LabelPolicy) -> Self {
        CsvRecorder {
            writer,
            layout,
            policy,
            path: None,
            labels_added: false,
            pending: vec![],
            rows_written: 0,
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn labels_added(&self) -> bool {
        self.labels_added
    }

    /// Data rows that have reached the writer, header excluded.
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Rows held back until the labels trigger.
    pub fn pending_rows(&self) -> usize {
        self.pending.len()
    }

    /// Flush and hand back the underlying writer. Rows still waiting for the
    /// labels trigger are dropped.
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush().map_err(|e| self.io_error(e))?;
        Ok(self.writer)
    }

    fn io_error(&self, e: std::io::Error) -> BenchError {
        match &self.path {
            Some(path) => BenchError::io(path, e),
            None => BenchError::Write(e),
        }
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{}", line).map_err(|e| self.io_error(e))
    }

    fn write_header(&mut self) -> Result<()> {
        let header = self.layout.header();
        self.write_line(&header)?;
        self.labels_added = true;

        for row in std::mem::take(&mut self.pending) {
            self.write_line(&row)?;
            self.rows_written += 1;
        }
        Ok(())
    }
}

impl<W: Write> ObservationSink for CsvRecorder<W> {
    fn add_labels(&mut self) -> Result<()> {
        if !self.labels_added {
            self.write_header()?;
        }
        self.writer.flush().map_err(|e| self.io_error(e))
    }

    fn add_observation(&mut self, observation: &Observation) -> Result<()> {
        let row = self.layout.row(observation)?;

        match (self.labels_added, self.policy) {
            (true, _) => {}
            (false, LabelPolicy::Streaming) => self.write_header()?,
            (false, LabelPolicy::Deferred) => {
                self.pending.push(row);
                return Ok(());
            }
        }

        self.write_line(&row)?;
        self.rows_written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod recorder_tests {
    use na::vector;

    use super::*;
    use crate::rigid_body::BodyState;

    fn observation(t: f64, y: f32) -> Observation {
        Observation::new(t, BodyState::at_rest()).with_force(vector![0.0, y, 0.0])
    }

    fn output(recorder: CsvRecorder<Vec<u8>>) -> Vec<String> {
        let bytes = recorder.into_inner().unwrap();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    #[test]
    fn streaming_writes_header_before_first_row() {
        // Arrange
        let mut recorder = CsvRecorder::new(vec![], Layout::ForceLog, LabelPolicy::Streaming);

        // Act
        recorder.add_observation(&observation(0.001, 1.0)).unwrap();
        recorder.add_observation(&observation(0.002, 2.0)).unwrap();
        recorder.add_labels().unwrap();

        // Assert
        assert_eq!(recorder.rows_written(), 2);
        let lines = output(recorder);
        assert_eq!(
            lines,
            vec![
                "sim_time, applied_force_x, applied_force_y, applied_force_z",
                "0.001,0,1,0",
                "0.002,0,2,0",
            ]
        );
    }

    #[test]
    fn deferred_puts_header_above_buffered_rows() {
        let mut recorder = CsvRecorder::new(vec![], Layout::Velocity, LabelPolicy::Deferred);

        recorder.add_observation(&observation(0.1, 0.0)).unwrap();
        recorder.add_observation(&observation(0.2, 0.0)).unwrap();
        assert_eq!(recorder.rows_written(), 0);
        assert_eq!(recorder.pending_rows(), 2);

        recorder.add_labels().unwrap();
        recorder.add_observation(&observation(0.3, 0.0)).unwrap();

        let lines = output(recorder);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Time,X Velocity,Y Velocity,Z Velocity");
        assert_eq!(lines[1], "0.1,0,0,0");
        assert_eq!(lines[3], "0.3,0,0,0");
    }

    #[test]
    fn repeated_labels_trigger_writes_header_once() {
        for policy in [LabelPolicy::Streaming, LabelPolicy::Deferred] {
            let mut recorder = CsvRecorder::new(vec![], Layout::Kinematics, policy);

            recorder.add_labels().unwrap();
            recorder.add_observation(&observation(0.5, 0.0)).unwrap();
            recorder.add_labels().unwrap();
            recorder.add_labels().unwrap();

            let header = Layout::Kinematics.header();
            let lines = output(recorder);
            assert_eq!(lines.iter().filter(|l| **l == header).count(), 1, "{:?}", policy);
            assert_eq!(lines.len(), 2);
        }
    }

    #[test]
    fn unwritable_path_reports_path() {
        let err = CsvRecorder::create(
            "/nonexistent-dir/observations.csv",
            Layout::ForceLog,
            LabelPolicy::Streaming,
        )
        .err()
        .unwrap();

        assert!(err.to_string().contains("/nonexistent-dir/observations.csv"));
    }
}
