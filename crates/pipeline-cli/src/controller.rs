use std::io::{BufRead, Write};
use std::sync::Arc;

use pipeline_stage::{is_sentinel, Stage, Transform, SENTINEL};
use tracing::{error, warn};

/// Maximum accepted input line length, in bytes, before CR/LF stripping.
const MAX_LINE_LEN: usize = 8 * 1024;

const COMPLETION_MESSAGE: &str = "Pipeline shutdown complete";

/// The three exit codes the driver can terminate with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Ran to completion.
    Success,
    /// A module name failed to resolve. Usage text should be shown alongside.
    ArgumentError,
    /// A stage failed to initialize, attach, or otherwise broke internally.
    InternalError,
}

impl ExitOutcome {
    pub fn code(self) -> i32 {
        match self {
            ExitOutcome::Success => 0,
            ExitOutcome::ArgumentError => 1,
            ExitOutcome::InternalError => 2,
        }
    }
}

/// Brings a chain of stages up, feeds it from an input stream, drains it, and
/// tears it down, in the strict order spelled out for the pipeline
/// controller: resolve, initialize, attach, feed, drain, teardown, complete.
pub struct Controller;

impl Controller {
    /// Resolves each stage name to a transform and wraps it in a fresh
    /// `Stage`. Does not initialize anything yet, so a resolution failure for
    /// name k leaves nothing to unwind for names 0..k.
    fn resolve_stages<F>(names: &[String], resolve: F) -> Result<Vec<Stage>, String>
    where
        F: Fn(&str) -> Option<Arc<dyn Transform>>,
    {
        let mut stages = Vec::with_capacity(names.len());
        for name in names {
            match resolve(name) {
                Some(transform) => stages.push(Stage::new(transform)),
                None => return Err(format!("unknown module: {name}")),
            }
        }
        Ok(stages)
    }

    fn init_all(stages: &[Stage], capacity: usize) -> Result<(), String> {
        for (i, stage) in stages.iter().enumerate() {
            if let Err(e) = stage.init(capacity) {
                Self::finalize_upto(stages, i);
                return Err(format!("init failed in stage '{}': {e}", stage.get_name()));
            }
        }
        Ok(())
    }

    fn attach_all(stages: &[Stage]) -> Result<(), String> {
        let n = stages.len();
        for (i, stage) in stages.iter().enumerate() {
            let next = if i + 1 < n { Some(&stages[i + 1]) } else { None };
            if let Err(e) = stage.attach(next) {
                return Err(format!("attach failed in stage '{}': {e}", stage.get_name()));
            }
        }
        Ok(())
    }

    /// Finalizes `stages[..count]` in reverse order, logging (never
    /// propagating) any individual failure so teardown always runs to
    /// completion.
    fn finalize_upto(stages: &[Stage], count: usize) {
        for stage in stages[..count].iter().rev() {
            if let Err(e) = stage.finalize() {
                warn!(stage = %stage.get_name(), error = %e, "finalize failed during teardown");
            }
        }
    }

    /// Reads lines from `input` and forwards each to the first stage.
    /// Stops as soon as the sentinel is read and forwarded (or EOF is
    /// reached, whichever comes first); lines after the sentinel are never
    /// read. A `place_work` failure on a payload line is logged and feeding
    /// continues; a `place_work` failure on the sentinel is logged and
    /// feeding still stops.
    fn feed<R: BufRead>(first: &Stage, input: R) {
        for line in input.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "error reading input line, stopping feed");
                    return;
                }
            };
            let line = line.strip_suffix('\r').map(str::to_string).unwrap_or(line);

            if line.len() > MAX_LINE_LEN {
                warn!(len = line.len(), max = MAX_LINE_LEN, "input line too long, dropping it");
                continue;
            }

            if is_sentinel(&line) {
                if let Err(e) = first.place_work(SENTINEL) {
                    warn!(stage = %first.get_name(), error = %e, "place_work failed forwarding sentinel");
                }
                return;
            }

            if let Err(e) = first.place_work(&line) {
                warn!(stage = %first.get_name(), error = %e, "place_work failed");
            }
        }
    }

    /// Runs one full pipeline lifecycle: resolve, init, attach, feed, drain,
    /// teardown, complete. Returns the exit outcome; never panics on
    /// expected failure paths.
    ///
    /// Resolves stage names through the real [`pipeline_transforms::resolve`]
    /// registry. Use [`Self::run_with_resolver`] to substitute a different
    /// resolver, e.g. one that wires `Logger` to a captured sink for tests.
    pub fn run<R: BufRead, W: Write>(names: &[String], capacity: usize, input: R, output: W) -> ExitOutcome {
        Self::run_with_resolver(names, capacity, input, output, pipeline_transforms::resolve)
    }

    /// Same lifecycle as [`Self::run`], but stage names are resolved through
    /// `resolve` instead of the static registry.
    pub fn run_with_resolver<R, W, F>(names: &[String], capacity: usize, input: R, mut output: W, resolve: F) -> ExitOutcome
    where
        R: BufRead,
        W: Write,
        F: Fn(&str) -> Option<Arc<dyn Transform>>,
    {
        let stages = match Self::resolve_stages(names, resolve) {
            Ok(stages) => stages,
            Err(e) => {
                error!("{e}");
                return ExitOutcome::ArgumentError;
            }
        };

        if let Err(e) = Self::init_all(&stages, capacity) {
            error!("{e}");
            return ExitOutcome::InternalError;
        }

        if let Err(e) = Self::attach_all(&stages) {
            error!("{e}");
            Self::finalize_upto(&stages, stages.len());
            return ExitOutcome::InternalError;
        }

        Self::feed(&stages[0], input);

        for stage in &stages {
            if let Err(e) = stage.wait_finished() {
                warn!(stage = %stage.get_name(), error = %e, "wait_finished failed");
            }
        }

        Self::finalize_upto(&stages, stages.len());

        let _ = writeln!(output, "{COMPLETION_MESSAGE}");
        ExitOutcome::Success
    }
}
