//! Field registry mapping script names to typed setters.
//!
//! The table is written out by hand instead of being derived from the
//! record's members, so the set of user-settable fields is fixed at compile
//! time. The raw `samples` sequence and the derived `xIntervalWidth` are
//! deliberately absent: samples only enter through `load_samples`, and the
//! interval width is always computed from them.

use dimf_types::{BatchOptimizationParams, Initializer, ScriptError};

use crate::distance;

/// User-settable fields, keyed by their camelCase script names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    SwarmSize,
    AngleDevDegs,
    AmplitudeDev,
    CrossOverProb,
    DiffWeight,
    NParams,
    InitSigmaUnits,
    InitTauUnits,
    NodeDevUnits,
    SigmaDevUnits,
    TauDevUnits,
    StepLimit,
    InitializerSelector,
}

const FIELDS: &[(&str, Field)] = &[
    ("swarmSize", Field::SwarmSize),
    ("angleDevDegs", Field::AngleDevDegs),
    ("amplitudeDev", Field::AmplitudeDev),
    ("crossOverProb", Field::CrossOverProb),
    ("diffWeight", Field::DiffWeight),
    ("nParams", Field::NParams),
    ("initSigmaUnits", Field::InitSigmaUnits),
    ("initTauUnits", Field::InitTauUnits),
    ("nodeDevUnits", Field::NodeDevUnits),
    ("sigmaDevUnits", Field::SigmaDevUnits),
    ("tauDevUnits", Field::TauDevUnits),
    ("stepLimit", Field::StepLimit),
    ("initializer", Field::InitializerSelector),
];

/// Name-to-setter lookup for `set` commands.
pub struct FieldRegistry;

impl FieldRegistry {
    /// All registered script names.
    pub fn names() -> impl Iterator<Item = &'static str> {
        FIELDS.iter().map(|&(name, _)| name)
    }

    /// Parse `raw` and store it into the field called `name`.
    ///
    /// `raw` is the rest of the `set` line after the field name; scalar
    /// fields expect exactly one token and reject anything after it. An
    /// unknown name fails with the closest registered name as a suggestion
    /// when one is plausible.
    pub fn set(
        record: &mut BatchOptimizationParams,
        name: &str,
        raw: &str,
    ) -> Result<(), ScriptError> {
        let field = FIELDS
            .iter()
            .find(|&&(candidate, _)| candidate == name)
            .map(|&(_, field)| field)
            .ok_or_else(|| ScriptError::UnknownField {
                name: name.to_string(),
                suggestion: distance::suggest(name, Self::names()).map(str::to_string),
            })?;

        let value = single_token(name, raw)?;
        let params = &mut record.params;
        match field {
            Field::SwarmSize => params.swarm_size = parse_scalar(name, value)?,
            Field::AngleDevDegs => params.angle_dev_degs = parse_scalar(name, value)?,
            Field::AmplitudeDev => params.amplitude_dev = parse_scalar(name, value)?,
            Field::CrossOverProb => params.cross_over_prob = parse_scalar(name, value)?,
            Field::DiffWeight => params.diff_weight = parse_scalar(name, value)?,
            Field::NParams => params.n_params = parse_scalar(name, value)?,
            Field::InitSigmaUnits => params.init_sigma_units = parse_scalar(name, value)?,
            Field::InitTauUnits => params.init_tau_units = parse_scalar(name, value)?,
            Field::NodeDevUnits => params.node_dev_units = parse_scalar(name, value)?,
            Field::SigmaDevUnits => params.sigma_dev_units = parse_scalar(name, value)?,
            Field::TauDevUnits => params.tau_dev_units = parse_scalar(name, value)?,
            Field::StepLimit => record.step_limit = Some(parse_scalar(name, value)?),
            Field::InitializerSelector => {
                params.initializer = Initializer::from_token(value).ok_or_else(|| {
                    ScriptError::UnknownInitializer {
                        token: value.to_string(),
                    }
                })?;
            }
        }
        Ok(())
    }
}

/// Split off exactly one value token; trailing tokens fail the line.
fn single_token<'a>(name: &str, raw: &'a str) -> Result<&'a str, ScriptError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ScriptError::MissingArgument {
            what: format!("value for field '{name}'"),
        });
    }
    match raw.split_once(char::is_whitespace) {
        Some((_, rest)) if !rest.trim().is_empty() => Err(ScriptError::TrailingTokens {
            rest: rest.trim().to_string(),
        }),
        Some((value, _)) => Ok(value),
        None => Ok(raw),
    }
}

fn parse_scalar<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ScriptError> {
    value
        .parse()
        .map_err(|_| ScriptError::MalformedValue {
            name: name.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_numeric_fields() {
        let mut record = BatchOptimizationParams::default();
        FieldRegistry::set(&mut record, "swarmSize", "200").unwrap();
        FieldRegistry::set(&mut record, "angleDevDegs", "120").unwrap();
        FieldRegistry::set(&mut record, "amplitudeDev", "0.5").unwrap();
        FieldRegistry::set(&mut record, "stepLimit", "100000").unwrap();

        assert_eq!(record.params.swarm_size, 200);
        assert_eq!(record.params.angle_dev_degs, 120.0);
        assert_eq!(record.params.amplitude_dev, 0.5);
        assert_eq!(record.step_limit, Some(100_000));
    }

    #[test]
    fn sets_initializer_from_closed_token_set() {
        let mut record = BatchOptimizationParams::default();
        FieldRegistry::set(&mut record, "initializer", "zero").unwrap();
        assert_eq!(record.params.initializer, Initializer::Zero);

        FieldRegistry::set(&mut record, "initializer", "fourier_component").unwrap();
        assert_eq!(record.params.initializer, Initializer::FourierComponent);

        let err = FieldRegistry::set(&mut record, "initializer", "sine").unwrap_err();
        assert!(matches!(err, ScriptError::UnknownInitializer { .. }));
    }

    #[test]
    fn unknown_name_gets_suggestion() {
        let mut record = BatchOptimizationParams::default();
        let err = FieldRegistry::set(&mut record, "sarmSize", "200").unwrap_err();
        match err {
            ScriptError::UnknownField { name, suggestion } => {
                assert_eq!(name, "sarmSize");
                assert_eq!(suggestion.as_deref(), Some("swarmSize"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn derived_and_raw_fields_are_not_settable() {
        let mut record = BatchOptimizationParams::default();
        for name in ["xIntervalWidth", "samples"] {
            let err = FieldRegistry::set(&mut record, name, "3").unwrap_err();
            assert!(matches!(err, ScriptError::UnknownField { .. }), "{name}");
        }
    }

    #[test]
    fn malformed_value_is_rejected() {
        let mut record = BatchOptimizationParams::default();
        let err = FieldRegistry::set(&mut record, "swarmSize", "many").unwrap_err();
        assert!(matches!(err, ScriptError::MalformedValue { .. }));

        // A negative count does not fit an unsigned field.
        let err = FieldRegistry::set(&mut record, "nParams", "-3").unwrap_err();
        assert!(matches!(err, ScriptError::MalformedValue { .. }));
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        let mut record = BatchOptimizationParams::default();
        let err = FieldRegistry::set(&mut record, "diffWeight", "0.6 extra").unwrap_err();
        assert!(matches!(err, ScriptError::TrailingTokens { .. }));
    }

    #[test]
    fn missing_value_is_rejected() {
        let mut record = BatchOptimizationParams::default();
        let err = FieldRegistry::set(&mut record, "diffWeight", "  ").unwrap_err();
        assert!(matches!(err, ScriptError::MissingArgument { .. }));
    }
}
