//! Layered configuration loading.
//!
//! A [`ConfigLoader`] fills a destination struct from, lowest to highest
//! precedence: schema-registered defaults (written only into zero-valued
//! fields), the destination's explicit in-struct values, environment
//! variables, and a dotenv file. The final decode runs once over the
//! merged layers. Builders are plain mutable values; the built loader is
//! immutable and safe to share.

use std::path::PathBuf;
use std::sync::Arc;

use figment::{Figment, Profile, Provider, providers::Serialized, value::Dict};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::binder::json_shape;
use crate::dotenv::DotEnv;
use crate::engine::{fill_defaults, typed_defaults};
use crate::env_source::EnvSource;
use crate::error::{LeafError, LeafResult};
use crate::hooks::{Hook, HookChain};
use crate::schema::Schema;

/// Mutable accumulator for a [`ConfigLoader`].
#[derive(Debug)]
pub struct ConfigLoaderBuilder {
    data: ConfigLoader,
}

impl ConfigLoaderBuilder {
    /// Start from the defaults: no prefix, `_` nesting, `.env` dotenv file,
    /// the standard hook chain and no schema.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: ConfigLoader {
                env_prefix: String::new(),
                env_split: "_".to_owned(),
                dotenv_file: PathBuf::from(".env"),
                schema: None,
                hooks: HookChain::standard(),
            },
        }
    }

    /// Prefix stripped from environment variable names; variables without
    /// it are ignored.
    #[must_use]
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.data.env_prefix = prefix.into();
        self
    }

    /// Pattern at which environment keys nest (default `_`).
    #[must_use]
    pub fn env_split(mut self, pattern: impl Into<String>) -> Self {
        self.data.env_split = pattern.into();
        self
    }

    /// Path of the optional dotenv file (default `.env`).
    #[must_use]
    pub fn dotenv_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data.dotenv_file = path.into();
        self
    }

    /// Schema supplying registered defaults for the destination type.
    #[must_use]
    pub fn schema(mut self, schema: Arc<Schema>) -> Self {
        self.data.schema = Some(schema);
        self
    }

    /// Replace the hook chain.
    #[must_use]
    pub fn hooks(mut self, hooks: HookChain) -> Self {
        self.data.hooks = hooks;
        self
    }

    /// Append a hook to the chain.
    #[must_use]
    pub fn append_hook(mut self, hook: Hook) -> Self {
        self.data.hooks.push(hook);
        self
    }

    /// Freeze the loader.
    #[must_use]
    pub fn build(self) -> ConfigLoader {
        self.data
    }
}

impl Default for ConfigLoaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable, shareable configuration loader.
#[derive(Debug)]
pub struct ConfigLoader {
    env_prefix: String,
    env_split: String,
    dotenv_file: PathBuf,
    schema: Option<Arc<Schema>>,
    hooks: HookChain,
}

impl ConfigLoader {
    /// Start building a loader.
    #[must_use]
    pub fn builder() -> ConfigLoaderBuilder {
        ConfigLoaderBuilder::new()
    }

    /// Load configuration into `dest`.
    ///
    /// # Errors
    ///
    /// Returns a [`LeafError`] naming the failing phase: default
    /// application, environment load, dotenv file load, or the final
    /// decode. A missing dotenv file is not an error.
    pub fn load<T>(&self, dest: &mut T) -> LeafResult<()>
    where
        T: Serialize + DeserializeOwned,
    {
        let mut base = serde_json::to_value(&*dest)?;
        if !base.is_object() {
            return Err(LeafError::InvalidDestination {
                found: json_shape(&base),
            });
        }
        if let Some(schema) = &self.schema
            && let Some(defaults) = typed_defaults(schema, &self.hooks)?
        {
            fill_defaults(&mut base, &defaults);
        }
        tracing::debug!(phase = "defaults", "applied registered defaults");

        let env = EnvSource::prefixed(&self.env_prefix).split(&self.env_split);
        let env_dict = collect(&env, "environment variables")?;
        tracing::debug!(phase = "environment", keys = env_dict.len(), "loaded environment variables");

        let dotenv = DotEnv::file(&self.dotenv_file, &self.env_prefix, &self.env_split);
        let dotenv_dict = match collect(&dotenv, "dotenv file") {
            Ok(dict) => dict,
            Err(LeafError::Gathering { source, .. }) => {
                return Err(LeafError::file(&self.dotenv_file, source));
            }
            Err(other) => return Err(other),
        };
        tracing::debug!(
            phase = "dotenv",
            path = %self.dotenv_file.display(),
            keys = dotenv_dict.len(),
            "loaded dotenv file"
        );

        *dest = Figment::from(Serialized::defaults(base))
            .merge(Serialized::defaults(env_dict))
            .merge(Serialized::defaults(dotenv_dict))
            .extract()
            .map_err(|e| LeafError::gathering("merged configuration", e))?;
        tracing::debug!(phase = "decode", "configuration loaded");
        Ok(())
    }
}

/// Evaluate a provider eagerly so failures carry the phase they occurred in.
fn collect(provider: &impl Provider, phase: &'static str) -> LeafResult<Dict> {
    let mut data = provider
        .data()
        .map_err(|e| LeafError::gathering(phase, e))?;
    Ok(data.remove(&Profile::Default).unwrap_or_default())
}
