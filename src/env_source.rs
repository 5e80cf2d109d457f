//! Environment variable provider with prefix stripping and key nesting.
//!
//! Variable names are matched against a prefix, the prefix is stripped,
//! the remainder lowercased, and the configured split pattern (default
//! `_`) turns the key into nested dictionary paths: `PREFIX_G_H` with
//! prefix `PREFIX_` becomes the nested key `g.h`. Values containing commas
//! are interpreted as arrays unless they look like structured data
//! (starting with `[`, `{` or a quote), matching the list hook's default
//! delimiter.

use figment::providers::Env;
use figment::{
    Profile, Provider,
    error::Error,
    util::nest,
    value::{Dict, Map, Value},
};
use uncased::Uncased;

/// Environment provider feeding the configuration loader.
#[derive(Clone)]
pub struct EnvSource {
    inner: Env,
    split: String,
}

impl EnvSource {
    /// Create a provider that only reads variables starting with `prefix`
    /// (strip it) and nests keys at `_`.
    #[must_use]
    pub fn prefixed(prefix: &str) -> Self {
        Self {
            inner: Env::prefixed(prefix),
            split: "_".to_owned(),
        }
    }

    /// Nest keys at `pattern` instead of the default `_`.
    #[must_use]
    pub fn split(mut self, pattern: &str) -> Self {
        self.split = pattern.to_owned();
        self
    }

    fn iter(&self) -> impl Iterator<Item = (Uncased<'static>, String)> + '_ {
        self.inner.iter()
    }
}

/// Determine if a value should be parsed as comma-separated rather than
/// structured data.
fn looks_like_list(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.contains(',') && !matches!(trimmed.chars().next(), Some('[' | '{' | '"' | '\''))
}

/// Parse an environment-style value: comma-separated values become arrays,
/// everything else parses as a figment value with a string fallback.
pub(crate) fn parse_env_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if looks_like_list(trimmed) {
        trimmed
            .split(',')
            .map(|part| Value::from(part.trim().to_owned()))
            .collect::<Vec<_>>()
            .into()
    } else {
        trimmed
            .parse()
            .unwrap_or_else(|_| Value::from(trimmed.to_owned()))
    }
}

impl Provider for EnvSource {
    fn metadata(&self) -> figment::Metadata {
        self.inner.metadata()
    }

    fn profile(&self) -> Option<Profile> {
        Some(self.inner.profile.clone())
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();
        for (key, value) in self.iter() {
            // One replace per key; the same transform the dotenv provider
            // applies, so both providers agree on every split pattern.
            let nested_key = key.as_str().replace(&self.split, ".");
            let value = parse_env_value(&value);
            let Some(nested) = nest(&nested_key, value).into_dict() else {
                return Err(Error::from(format!(
                    "environment key `{key}` produced a non-object value"
                )));
            };
            merge_nested(&mut dict, nested);
        }
        Ok(self.inner.profile.collect(dict))
    }
}

/// Deep-merge `incoming` into `target` so sibling variables nesting under
/// the same parent key (`PREFIX_DB_HOST`, `PREFIX_DB_PORT`) both survive.
pub(crate) fn merge_nested(target: &mut Dict, incoming: Dict) {
    for (key, value) in incoming {
        match (target.get_mut(&key), value) {
            (Some(Value::Dict(_, existing)), Value::Dict(_, nested)) => {
                merge_nested(existing, nested);
            }
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}
