//! Pipeline runners
//!
//! A [`PipelineRunner`] turns an initial text and an ordered list of pass
//! identifiers into a fresh [`StageStore`]. The viewer never runs passes
//! itself; it hands the edit buffer to a runner and displays whatever comes
//! back, after [`check_contract`] confirms the result lines up with the
//! request.
//!
//! [`ProcessRunner`] delegates every pass to an external optimizer binary
//! (`mlir-opt` by default): the previous stage goes in on stdin, the next
//! stage comes out on stdout. Any closure with the right signature is a
//! runner too, which is what the tests use.

use crate::labels::PASS_MARKER;
use crate::stages::StageStore;
use std::io::Write;
use std::process::{Command, Stdio};
use thiserror::Error;

/// Why a pipeline run produced no result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineFailure {
    #[error("input is not valid UTF-8: {0}")]
    MalformedInput(String),
    #[error("unknown pass '{0}'")]
    UnknownPass(String),
    #[error("pass '{pass}' failed ({status}): {stderr}")]
    PassFailed {
        pass: String,
        status: String,
        stderr: String,
    },
    #[error("cannot start '{program}': {message}")]
    Spawn { program: String, message: String },
    #[error("pipeline returned an inconsistent result: {0}")]
    ContractViolation(String),
    #[error("pipeline error: {0}")]
    Internal(String),
}

/// Runs an ordered list of passes over an initial text
pub trait PipelineRunner {
    fn run(&mut self, initial_text: &[u8], passes: &[String])
        -> Result<StageStore, PipelineFailure>;
}

impl<F> PipelineRunner for F
where
    F: FnMut(&[u8], &[String]) -> Result<StageStore, PipelineFailure>,
{
    fn run(
        &mut self,
        initial_text: &[u8],
        passes: &[String],
    ) -> Result<StageStore, PipelineFailure> {
        self(initial_text, passes)
    }
}

/// A runner that refuses every request, for read-only sessions
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRunner;

impl PipelineRunner for NoRunner {
    fn run(&mut self, _: &[u8], _: &[String]) -> Result<StageStore, PipelineFailure> {
        Err(PipelineFailure::Internal(
            "no pipeline runner is configured".to_string(),
        ))
    }
}

/// Verify a runner's result against the request that produced it.
pub fn check_contract(
    initial_text: &[u8],
    passes: &[String],
    store: &StageStore,
) -> Result<(), PipelineFailure> {
    if store.stage_count() != passes.len() + 1 {
        return Err(PipelineFailure::ContractViolation(format!(
            "{} stages for {} passes",
            store.stage_count(),
            passes.len()
        )));
    }
    if store.initial_text().as_bytes() != initial_text {
        return Err(PipelineFailure::ContractViolation(
            "first stage differs from the submitted text".to_string(),
        ));
    }
    for (descriptor, requested) in store.passes().iter().zip(passes) {
        if descriptor.raw_name != *requested {
            return Err(PipelineFailure::ContractViolation(format!(
                "pass {} is '{}', expected '{}'",
                descriptor.ordinal, descriptor.raw_name, requested
            )));
        }
    }
    Ok(())
}

/// Runs each pass as a separate invocation of an external tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRunner {
    program: String,
    args: Vec<String>,
}

impl ProcessRunner {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        ProcessRunner {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Command-line flag selecting `pass`: identifiers are given the pass
    /// marker unless they already look like a flag.
    pub fn pass_flag(pass: &str) -> String {
        if pass.starts_with('-') {
            pass.to_string()
        } else {
            format!("{PASS_MARKER}{pass}")
        }
    }

    fn run_pass(&self, pass: &str, input: &str) -> Result<String, PipelineFailure> {
        let spawn_failure = |err: std::io::Error| PipelineFailure::Spawn {
            program: self.program.clone(),
            message: err.to_string(),
        };

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(Self::pass_flag(pass))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_failure)?;

        // Feed stdin from a helper thread so a large stage cannot deadlock
        // against a full stdout pipe.
        let feeder = child.stdin.take().map(|mut stdin| {
            let input = input.to_string();
            std::thread::spawn(move || stdin.write_all(input.as_bytes()))
        });
        let output = child.wait_with_output().map_err(spawn_failure)?;
        if let Some(handle) = feeder {
            // A tool that exits without reading stdin closes the pipe early;
            // its exit status below is what matters.
            let _ = handle.join();
        }

        if !output.status.success() {
            return Err(PipelineFailure::PassFailed {
                pass: pass.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|err| PipelineFailure::PassFailed {
            pass: pass.to_string(),
            status: output.status.to_string(),
            stderr: format!("output is not valid UTF-8: {err}"),
        })
    }
}

impl PipelineRunner for ProcessRunner {
    fn run(
        &mut self,
        initial_text: &[u8],
        passes: &[String],
    ) -> Result<StageStore, PipelineFailure> {
        let initial = std::str::from_utf8(initial_text)
            .map_err(|err| PipelineFailure::MalformedInput(err.to_string()))?;

        let mut stages = Vec::with_capacity(passes.len() + 1);
        stages.push(initial.to_string());
        for pass in passes {
            tracing::debug!(program = %self.program, %pass, "running pass");
            let previous = stages.last().map(String::as_str).unwrap_or_default();
            let next = self.run_pass(pass, previous)?;
            stages.push(next);
        }

        StageStore::new(stages, passes.to_vec())
            .map_err(|err| PipelineFailure::Internal(err.to_string()))
    }
}
