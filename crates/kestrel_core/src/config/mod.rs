use std::collections::HashMap;
use std::sync::LazyLock;

use kestrel_error::{DbError, Result};

use crate::arrays::scalar::ScalarValue;

pub const DEFAULT_BATCH_SIZE: usize = 2048;
pub const DEFAULT_MAX_FUNCTION_DEPTH: usize = 64;

const MIN_BATCH_SIZE: usize = 1;
const MAX_BATCH_SIZE: usize = 1 << 20;

/// Knobs controlling evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum number of rows in chunks produced by the engine itself.
    pub batch_size: usize,
    /// How deep user function calls may nest before failing.
    pub max_function_depth: usize,
    /// Check every chunk against its operator's schema.
    pub verify_chunks: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            batch_size: DEFAULT_BATCH_SIZE,
            max_function_depth: DEFAULT_MAX_FUNCTION_DEPTH,
            verify_chunks: false,
        }
    }
}

impl EngineConfig {
    pub fn set_from_scalar(&mut self, name: &str, value: &ScalarValue) -> Result<()> {
        let func = lookup_setting(name)?;
        (func.set)(value, self)
    }

    pub fn get_as_scalar(&self, name: &str) -> Result<ScalarValue> {
        let func = lookup_setting(name)?;
        Ok((func.get)(self))
    }

    pub fn reset(&mut self, name: &str) -> Result<()> {
        let func = lookup_setting(name)?;
        let default = (func.get)(&EngineConfig::default());
        (func.set)(&default, self)
    }

    /// Names and descriptions of all settings, sorted by name.
    pub fn settings() -> Vec<(&'static str, &'static str)> {
        let mut settings: Vec<_> = GET_SET_FUNCTIONS
            .iter()
            .map(|(name, funcs)| (*name, funcs.description))
            .collect();
        settings.sort_unstable();
        settings
    }
}

fn lookup_setting(name: &str) -> Result<&'static SettingFunctions> {
    GET_SET_FUNCTIONS.get(name).ok_or_else(|| {
        let mut err = DbError::new(format!("Missing setting for '{name}'"));
        let suggestions = similar_settings(name);
        if !suggestions.is_empty() {
            err = err.with_field("did you mean", suggestions.join(", "));
        }
        err
    })
}

fn similar_settings(name: &str) -> Vec<&'static str> {
    let mut scored: Vec<_> = GET_SET_FUNCTIONS
        .keys()
        .map(|candidate| (strsim::jaro_winkler(name, candidate), *candidate))
        .filter(|(score, _)| *score > 0.8)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(b.1)));
    scored.into_iter().map(|(_, name)| name).collect()
}

struct SettingFunctions {
    description: &'static str,
    set: fn(scalar: &ScalarValue, conf: &mut EngineConfig) -> Result<()>,
    get: fn(conf: &EngineConfig) -> ScalarValue,
}

impl SettingFunctions {
    const fn new<S: EngineSetting>() -> Self {
        SettingFunctions {
            description: S::DESCRIPTION,
            set: S::set_from_scalar as _,
            get: S::get_as_scalar as _,
        }
    }
}

fn insert_setting<S: EngineSetting>(map: &mut HashMap<&'static str, SettingFunctions>) {
    if map.insert(S::NAME, SettingFunctions::new::<S>()).is_some() {
        panic!("Duplicate settings names: {}", S::NAME);
    }
}

static GET_SET_FUNCTIONS: LazyLock<HashMap<&'static str, SettingFunctions>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    insert_setting::<BatchSize>(&mut map);
    insert_setting::<MaxFunctionDepth>(&mut map);
    insert_setting::<VerifyChunks>(&mut map);

    map
});

pub trait EngineSetting: Sync + Send + 'static {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    fn set_from_scalar(scalar: &ScalarValue, conf: &mut EngineConfig) -> Result<()>;
    fn get_as_scalar(conf: &EngineConfig) -> ScalarValue;
}

pub struct BatchSize;

impl BatchSize {
    pub fn validate_value(val: usize) -> Result<()> {
        if val < MIN_BATCH_SIZE {
            return Err(DbError::new(format!(
                "Batch size cannot be less than {MIN_BATCH_SIZE}"
            )));
        }

        if val > MAX_BATCH_SIZE {
            return Err(DbError::new(format!(
                "Batch size cannot be greater than {MAX_BATCH_SIZE}"
            )));
        }

        Ok(())
    }
}

impl EngineSetting for BatchSize {
    const NAME: &'static str = "batch_size";
    const DESCRIPTION: &'static str = "Maximum number of rows in chunks produced by the engine";

    fn set_from_scalar(scalar: &ScalarValue, conf: &mut EngineConfig) -> Result<()> {
        let val = scalar.try_as_usize()?;
        Self::validate_value(val)?;
        conf.batch_size = val;
        Ok(())
    }

    fn get_as_scalar(conf: &EngineConfig) -> ScalarValue {
        (conf.batch_size as i64).into()
    }
}

pub struct MaxFunctionDepth;

impl EngineSetting for MaxFunctionDepth {
    const NAME: &'static str = "max_function_depth";
    const DESCRIPTION: &'static str = "How deep user function calls may nest";

    fn set_from_scalar(scalar: &ScalarValue, conf: &mut EngineConfig) -> Result<()> {
        let val = scalar.try_as_usize()?;
        if val == 0 {
            return Err(DbError::new("Function depth must be at least 1"));
        }
        conf.max_function_depth = val;
        Ok(())
    }

    fn get_as_scalar(conf: &EngineConfig) -> ScalarValue {
        (conf.max_function_depth as i64).into()
    }
}

pub struct VerifyChunks;

impl EngineSetting for VerifyChunks {
    const NAME: &'static str = "verify_chunks";
    const DESCRIPTION: &'static str = "Check every chunk against the schema of the operator producing it";

    fn set_from_scalar(scalar: &ScalarValue, conf: &mut EngineConfig) -> Result<()> {
        conf.verify_chunks = scalar
            .try_as_bool()?
            .ok_or_else(|| DbError::type_mismatch("Expected a non-null bool"))?;
        Ok(())
    }

    fn get_as_scalar(conf: &EngineConfig) -> ScalarValue {
        conf.verify_chunks.into()
    }
}
