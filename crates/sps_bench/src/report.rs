//! Presentation of stage results: a boxed console printout and a file of
//! LaTeX macros for papers.

use crate::orchestrator::{Measurement, StageResult};
use crate::stage::BenchmarkMode;
use bilinear::{BucketCounts, Substructure};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const CONSOLE_WIDTH: usize = 120;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("TeX command names may only contain letters, got `{0}`")]
    InvalidTexName(String),
    #[error("failed to write {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// What a sink needs to know about the run besides the stage results.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunHeader<'a> {
    pub scheme: &'a str,
    pub tex_name: String,
    pub mode: BenchmarkMode,
    pub substrate: String,
    pub prewarm_iterations: usize,
    pub run_iterations: usize,
    pub payload_size: usize,
}

impl RunHeader<'_> {
    pub fn summary(&self) -> String {
        format!(
            "{} iterations :: messageLength {} :: {} pre-warm",
            self.run_iterations, self.payload_size, self.prewarm_iterations
        )
    }
}

pub trait ReportSink {
    fn begin(&mut self, header: &RunHeader<'_>) -> Result<(), ReportError>;

    fn stage(
        &mut self,
        header: &RunHeader<'_>,
        result: &StageResult,
    ) -> Result<(), ReportError>;

    fn finish(&mut self, header: &RunHeader<'_>) -> Result<(), ReportError>;
}

/// Feeds one complete run to `sink`.
pub fn publish<S: ReportSink + ?Sized>(
    sink: &mut S,
    header: &RunHeader<'_>,
    results: &[StageResult],
) -> Result<(), ReportError> {
    sink.begin(header)?;
    for result in results {
        sink.stage(header, result)?;
    }
    sink.finish(header)
}

pub fn pad_line(text: &str) -> String {
    format!("* {:<width$}*", text, width = CONSOLE_WIDTH - 3)
}

pub fn separator() -> String {
    pad_line("").replace(' ', "-")
}

/// Milliseconds with two decimals and `,` between thousands.
pub fn format_millis(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (integer, fraction) =
        fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}

pub struct ConsoleReport<W: Write> {
    out: W,
}

impl ConsoleReport<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) -> Result<(), ReportError> {
        writeln!(self.out, "{}", pad_line(text))?;
        Ok(())
    }

    fn separator(&mut self) -> Result<(), ReportError> {
        writeln!(self.out, "{}", separator())?;
        Ok(())
    }

    fn counts(&mut self, counts: &BucketCounts) -> Result<(), ReportError> {
        for structure in [Substructure::G1, Substructure::G2, Substructure::Gt]
        {
            if let Some(ops) = counts.group(structure) {
                self.line(&format!(
                    "*** {structure} :: {} ops | {} inv | {} exp | {} total",
                    ops.group_ops,
                    ops.inversions,
                    ops.exponentiations,
                    ops.total()
                ))?;
            }
        }
        self.line(&format!("*** {} :: {} pairings", Substructure::Pairing, counts.pairings))
    }
}

impl<W: Write> ReportSink for ConsoleReport<W> {
    fn begin(&mut self, header: &RunHeader<'_>) -> Result<(), ReportError> {
        self.separator()?;
        self.line(&format!(
            "Running {} benchmark with config... ",
            header.mode.console_tag()
        ))?;
        self.line(&header.substrate)?;
        self.line(&header.summary())?;
        self.separator()
    }

    fn stage(
        &mut self,
        header: &RunHeader<'_>,
        result: &StageResult,
    ) -> Result<(), ReportError> {
        self.line(&format!(
            "[DONE]{} {} [{}]",
            header.mode.console_tag(),
            result.stage.title(),
            header.scheme
        ))?;
        match &result.measurement {
            Measurement::Times {
                times,
                peak_heap_bytes,
            } => {
                self.line(&format!(
                    "*** Times measured :: avg: {} ms | min: {} ms | max: {} ms | total: {} ms",
                    format_millis(times.avg_millis()),
                    format_millis(times.min_millis()),
                    format_millis(times.max_millis()),
                    format_millis(times.sum_millis()),
                ))?;
                self.line(&format!(
                    "*** Peak heap :: {peak_heap_bytes} bytes"
                ))?;
            }
            Measurement::Counts(counts) => self.counts(counts)?,
        }
        if let Some(tally) = result.verification {
            self.line(&format!(
                "*** Verified :: {} accepted | {} rejected",
                tally.accepted, tally.rejected
            ))?;
            if tally.rejected > 0 {
                self.line("!!! Some signatures were rejected; results are anomalous")?;
            }
        }
        self.separator()
    }

    fn finish(&mut self, _header: &RunHeader<'_>) -> Result<(), ReportError> {
        self.out.flush()?;
        Ok(())
    }
}

/// Collects `\newcommand` definitions for one run and writes them to
/// `<dir>/<mode>_<scheme>_results.tex` on finish.
pub struct TexExport {
    export_dir: PathBuf,
    commands: Vec<String>,
    written: Vec<PathBuf>,
}

impl TexExport {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
            commands: Vec::new(),
            written: Vec::new(),
        }
    }

    pub fn file_name(header: &RunHeader<'_>) -> String {
        format!("{}_{}_results.tex", header.mode, header.scheme).to_lowercase()
    }

    /// Files written so far, in run order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    fn push(&mut self, segments: &[&str], value: String) -> Result<(), ReportError> {
        self.commands.push(tex_command(segments, &value)?);
        Ok(())
    }
}

pub fn tex_command(segments: &[&str], value: &str) -> Result<String, ReportError> {
    if let Some(bad) = segments
        .iter()
        .find(|s| s.is_empty() || !s.chars().all(|c| c.is_ascii_alphabetic()))
    {
        return Err(ReportError::InvalidTexName((*bad).to_owned()));
    }
    Ok(format!("\\newcommand{{\\{}}}{{{value}}}", segments.concat()))
}

impl ReportSink for TexExport {
    fn begin(&mut self, header: &RunHeader<'_>) -> Result<(), ReportError> {
        self.commands.clear();
        let sps = header.tex_name.as_str();
        let mode = header.mode.as_str();
        for (name, value) in [
            ("Iterations", header.run_iterations),
            ("MessageLength", header.payload_size),
            ("PrewarmIterations", header.prewarm_iterations),
        ] {
            self.push(&[sps, mode, "Config", name], value.to_string())?;
        }
        Ok(())
    }

    fn stage(
        &mut self,
        header: &RunHeader<'_>,
        result: &StageResult,
    ) -> Result<(), ReportError> {
        let sps = header.tex_name.as_str();
        let op = result.stage.title();
        match &result.measurement {
            Measurement::Times { times, .. } => {
                for (name, millis) in [
                    ("Avg", times.avg_millis()),
                    ("Min", times.min_millis()),
                    ("Max", times.max_millis()),
                    ("Sum", times.sum_millis()),
                ] {
                    self.push(&[sps, "Time", op, name], format_millis(millis))?;
                }
            }
            Measurement::Counts(counts) => {
                for (name, structure) in [
                    ("G", Substructure::G1),
                    ("H", Substructure::G2),
                    ("T", Substructure::Gt),
                ] {
                    self.push(
                        &[sps, "Count", op, name],
                        counts.count(structure).to_string(),
                    )?;
                }
            }
        }
        Ok(())
    }

    fn finish(&mut self, header: &RunHeader<'_>) -> Result<(), ReportError> {
        let path = self.export_dir.join(Self::file_name(header));
        write_commands(&self.export_dir, &path, &self.commands)?;
        info!(path = %path.display(), "benchmark file created");
        self.written.push(path);
        Ok(())
    }
}

fn write_commands(
    dir: &Path,
    path: &Path,
    commands: &[String],
) -> Result<(), ReportError> {
    let export_error = |source| ReportError::Export {
        path: path.to_path_buf(),
        source,
    };
    fs::create_dir_all(dir).map_err(export_error)?;
    let mut contents = commands.join("\n");
    contents.push('\n');
    fs::write(path, contents).map_err(export_error)
}
