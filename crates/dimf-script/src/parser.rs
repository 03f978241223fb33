//! Line-oriented interpreter for the batch configuration script.
//!
//! The parser keeps exactly one record "in progress". Commands mutate it in
//! place; `new_task` snapshots it into the output list and the record keeps
//! accumulating, so lines after a `new_task` describe deltas against the
//! previous task rather than a fresh default. A trailing in-progress record
//! with no `new_task` after it is discarded.

use dimf_types::{BatchOptimizationParams, PhaseSteps, SampleLoader, ScriptError};
use tracing::{debug, info};

use crate::registry::FieldRegistry;

/// Script interpreter producing an ordered list of task records.
pub struct ScriptParser<'a> {
    loader: &'a dyn SampleLoader,
}

impl<'a> ScriptParser<'a> {
    pub fn new(loader: &'a dyn SampleLoader) -> Self {
        Self { loader }
    }

    /// Interpret a whole script. Stops at the first error, wrapping it with
    /// the 1-based line number and the literal line text.
    pub fn parse(&self, input: &str) -> Result<Vec<BatchOptimizationParams>, ScriptError> {
        let mut record = BatchOptimizationParams::default();
        let mut tasks = Vec::new();

        for (index, line) in input.lines().enumerate() {
            let snapshot =
                self.run_line(&mut record, line)
                    .map_err(|source| ScriptError::Line {
                        number: index + 1,
                        text: line.to_string(),
                        source: Box::new(source),
                    })?;
            if snapshot {
                debug!(task = tasks.len(), "snapshotting task record");
                tasks.push(record.clone());
            }
        }

        info!(tasks = tasks.len(), "script parsed");
        Ok(tasks)
    }

    /// Execute one line. Returns true when the current record should be
    /// snapshotted into the output.
    fn run_line(
        &self,
        record: &mut BatchOptimizationParams,
        line: &str,
    ) -> Result<bool, ScriptError> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }

        let (command, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim_start()),
            None => (trimmed, ""),
        };

        match command {
            "set" => {
                let (name, value) = match rest.split_once(char::is_whitespace) {
                    Some((name, value)) => (name, value),
                    None if rest.is_empty() => {
                        return Err(ScriptError::MissingArgument {
                            what: "field name".to_string(),
                        })
                    }
                    None => (rest, ""),
                };
                FieldRegistry::set(record, name, value)?;
                Ok(false)
            }
            "load_samples" => {
                let path = single_token(rest, "file path")?;
                let samples =
                    self.loader
                        .load_samples(path)
                        .map_err(|e| ScriptError::LoadSamples {
                            path: path.to_string(),
                            message: e.to_string(),
                        })?;
                debug!(path, samples = samples.len(), "samples loaded");
                record.params.set_samples(samples);
                Ok(false)
            }
            "add_preprocessing_step" => {
                append_step(&mut record.params.preprocessing, rest)?;
                Ok(false)
            }
            "add_interprocessing_step" => {
                append_step(&mut record.params.interprocessing, rest)?;
                Ok(false)
            }
            "clear_preprocessing_steps" => {
                no_arguments(rest)?;
                record.params.preprocessing.clear();
                Ok(false)
            }
            "clear_interprocessing_steps" => {
                no_arguments(rest)?;
                record.params.interprocessing.clear();
                Ok(false)
            }
            "add_imf_optimization" => {
                let (index, steps) = rest.split_once(char::is_whitespace).ok_or_else(|| {
                    ScriptError::MissingArgument {
                        what: "IMF index and step count".to_string(),
                    }
                })?;
                record.imf_optimizations.push(PhaseSteps {
                    imf_index: parse_value("imf index", index.trim())?,
                    steps: parse_value("step count", single_token(steps, "step count")?)?,
                });
                Ok(false)
            }
            "new_task" => {
                no_arguments(rest)?;
                Ok(true)
            }
            _ => Err(ScriptError::UnknownCommand {
                command: command.to_string(),
            }),
        }
    }
}

/// Append one newline-terminated processing-step line.
fn append_step(script: &mut String, step: &str) -> Result<(), ScriptError> {
    if step.trim().is_empty() {
        return Err(ScriptError::MissingArgument {
            what: "processing step text".to_string(),
        });
    }
    script.push_str(step.trim_end());
    script.push('\n');
    Ok(())
}

fn no_arguments(rest: &str) -> Result<(), ScriptError> {
    if rest.trim().is_empty() {
        Ok(())
    } else {
        Err(ScriptError::TrailingTokens {
            rest: rest.trim().to_string(),
        })
    }
}

fn single_token<'a>(rest: &'a str, what: &str) -> Result<&'a str, ScriptError> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Err(ScriptError::MissingArgument {
            what: what.to_string(),
        });
    }
    match rest.split_once(char::is_whitespace) {
        Some((_, trailing)) if !trailing.trim().is_empty() => Err(ScriptError::TrailingTokens {
            rest: trailing.trim().to_string(),
        }),
        Some((token, _)) => Ok(token),
        None => Ok(rest),
    }
}

fn parse_value<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ScriptError> {
    value.parse().map_err(|_| ScriptError::MalformedValue {
        name: name.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimf_types::Initializer;

    /// Loader returning a fixed ramp whose length is derived from the path,
    /// so tests can tell loads apart.
    struct FakeLoader;

    impl SampleLoader for FakeLoader {
        fn load_samples(
            &self,
            path: &str,
        ) -> Result<Vec<f64>, Box<dyn std::error::Error + Send + Sync>> {
            if path.contains("missing") {
                return Err("no such file".into());
            }
            let n = path.len();
            Ok((0..n).map(|i| i as f64).collect())
        }
    }

    fn parse(script: &str) -> Result<Vec<BatchOptimizationParams>, ScriptError> {
        ScriptParser::new(&FakeLoader).parse(script)
    }

    #[test]
    fn record_count_equals_new_task_count() {
        let script = "set swarmSize 10\nnew_task\nset swarmSize 20\nnew_task\n";
        let tasks = parse(script).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].params.swarm_size, 10);
        assert_eq!(tasks[1].params.swarm_size, 20);
    }

    #[test]
    fn no_new_task_yields_no_records() {
        let tasks = parse("set swarmSize 10\nset diffWeight 0.6\n").unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn trailing_in_progress_record_is_dropped() {
        let script = "new_task\nset swarmSize 99\n";
        let tasks = parse(script).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].params.swarm_size, 0);
    }

    #[test]
    fn records_accumulate_across_new_task() {
        let script = "\
set swarmSize 200
set diffWeight 0.6
new_task
set swarmSize 300
new_task
";
        let tasks = parse(script).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].params.swarm_size, 200);
        assert_eq!(tasks[1].params.swarm_size, 300);
        // Unrelated fields carry forward, not reset.
        assert_eq!(tasks[1].params.diff_weight, 0.6);
    }

    #[test]
    fn typo_in_field_name_suggests_correction() {
        let err = parse("set sarmSize 200\n").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("line 1"), "{message}");
        assert!(message.contains("set sarmSize 200"), "{message}");
        assert!(message.contains("swarmSize"), "{message}");
    }

    #[test]
    fn load_samples_sets_derived_width() {
        let script = "load_samples abcdefgh\nnew_task\n";
        let tasks = parse(script).unwrap();
        assert_eq!(tasks[0].params.samples.len(), 8);
        assert_eq!(tasks[0].params.x_interval_width, 8);
    }

    #[test]
    fn load_samples_failure_carries_path_and_line() {
        let err = parse("load_samples missing.asc\n").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("missing.asc"), "{message}");
        assert!(message.contains("line 1"), "{message}");
    }

    #[test]
    fn load_samples_requires_path() {
        let err = parse("load_samples\n").unwrap_err();
        assert!(err.to_string().contains("missing file path"));
    }

    #[test]
    fn processing_steps_accumulate_and_clear() {
        let script = "\
add_preprocessing_step low_pass 2
add_preprocessing_step clip 512 768
add_interprocessing_step zero_moments 2
new_task
clear_preprocessing_steps
new_task
";
        let tasks = parse(script).unwrap();
        assert_eq!(tasks[0].params.preprocessing, "low_pass 2\nclip 512 768\n");
        assert_eq!(tasks[0].params.interprocessing, "zero_moments 2\n");
        assert_eq!(tasks[1].params.preprocessing, "");
        // Interprocessing untouched by clearing the other field.
        assert_eq!(tasks[1].params.interprocessing, "zero_moments 2\n");
    }

    #[test]
    fn clear_rejects_trailing_tokens() {
        let err = parse("clear_preprocessing_steps now\n").unwrap_err();
        assert!(matches!(
            err,
            ScriptError::Line { number: 1, .. }
        ));
        assert!(err.to_string().contains("trailing"));
    }

    #[test]
    fn new_task_rejects_trailing_tokens() {
        let err = parse("new_task please\n").unwrap_err();
        assert!(err.to_string().contains("trailing"));
    }

    #[test]
    fn imf_optimizations_accumulate() {
        let script = "\
add_imf_optimization 0 10
add_imf_optimization 1 15
new_task
";
        let tasks = parse(script).unwrap();
        assert_eq!(
            tasks[0].imf_optimizations,
            vec![
                PhaseSteps { imf_index: 0, steps: 10 },
                PhaseSteps { imf_index: 1, steps: 15 },
            ]
        );
    }

    #[test]
    fn imf_optimization_rejects_bad_integers() {
        assert!(parse("add_imf_optimization -1 10\n").is_err());
        assert!(parse("add_imf_optimization 0 lots\n").is_err());
        assert!(parse("add_imf_optimization 0\n").is_err());
    }

    #[test]
    fn unknown_command_fails_with_line_number() {
        let err = parse("set swarmSize 10\nfly_to_the_moon\n").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("line 2"), "{message}");
        assert!(message.contains("fly_to_the_moon"), "{message}");
    }

    #[test]
    fn parse_stops_at_first_error() {
        // The new_task after the bad line must not produce a record.
        let err = parse("set bogus 1\nnew_task\n").unwrap_err();
        assert!(matches!(err, ScriptError::Line { number: 1, .. }));
    }

    #[test]
    fn empty_and_whitespace_lines_are_ignored() {
        let tasks = parse("\n   \nset swarmSize 5\n\nnew_task\n").unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].params.swarm_size, 5);
    }

    #[test]
    fn initializer_can_be_switched_per_task() {
        let script = "\
set initializer zero
new_task
set initializer fourier_component
new_task
";
        let tasks = parse(script).unwrap();
        assert_eq!(tasks[0].params.initializer, Initializer::Zero);
        assert_eq!(tasks[1].params.initializer, Initializer::FourierComponent);
    }
}
