//! Binders apply a source of values to an already-constructed destination.
//!
//! External frameworks bind their own sources (path, header, query, body)
//! first; [`DefaultBinder`] then fills whatever those sources left at its
//! zero value from the schema's registered defaults. Binders compose: a
//! composed binder runs its parts in order and aborts on the first
//! failure, naming the failing part.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::engine::{fill_defaults, typed_defaults};
use crate::error::{LeafError, LeafResult};
use crate::hooks::HookChain;
use crate::schema::Schema;

/// A named binding step over a destination of type `T`.
pub trait Bind<T> {
    /// The binder's name, used in composed names and failure context.
    fn name(&self) -> &str;

    /// Apply this binder's source to `dest`.
    ///
    /// # Errors
    ///
    /// Returns a [`LeafError`] when the source cannot be applied.
    fn bind(&self, dest: &mut T) -> LeafResult<()>;
}

/// Compose binders into one that runs them in order.
///
/// # Panics
///
/// Panics when `binders` is empty; at least one binder is required.
#[must_use]
pub fn compose_binders<T>(binders: Vec<Box<dyn Bind<T>>>) -> ComposedBinder<T> {
    assert!(!binders.is_empty(), "at least one binder is required");
    let mut name = String::from("compose");
    for binder in &binders {
        name.push('_');
        name.push_str(binder.name());
    }
    ComposedBinder { name, binders }
}

/// A binder built from an ordered list of sub-binders.
pub struct ComposedBinder<T> {
    name: String,
    binders: Vec<Box<dyn Bind<T>>>,
}

impl<T> Bind<T> for ComposedBinder<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn bind(&self, dest: &mut T) -> LeafResult<()> {
        for binder in &self.binders {
            binder.bind(dest).map_err(|source| LeafError::Bind {
                binder: format!("{}:{}", self.name, binder.name()),
                source: Box::new(source),
            })?;
        }
        Ok(())
    }
}

/// Applies schema-registered defaults to fields no other source touched.
#[derive(Debug)]
pub struct DefaultBinder {
    name: String,
    schema: Arc<Schema>,
    hooks: HookChain,
}

impl DefaultBinder {
    /// Start building a binder for `schema`.
    #[must_use]
    pub fn builder(schema: Arc<Schema>) -> DefaultBinderBuilder {
        DefaultBinderBuilder {
            name: "default".to_owned(),
            schema,
            hooks: HookChain::standard(),
        }
    }

    /// Fill zero-valued fields of `dest` from the schema's defaults.
    ///
    /// The destination is serialized, unset fields are overlaid with their
    /// converted defaults, and the result is decoded back in place. Fields
    /// already carrying a value keep it; applying the binder twice is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns [`LeafError::InvalidDestination`] when `dest` does not
    /// serialize to a map, [`LeafError::Default`] for an unparseable
    /// literal, or [`LeafError::Decode`] when the filled tree no longer
    /// decodes into `T`.
    pub fn apply<T>(&self, dest: &mut T) -> LeafResult<()>
    where
        T: Serialize + DeserializeOwned,
    {
        let Some(defaults) = typed_defaults(&self.schema, &self.hooks)? else {
            return Ok(());
        };
        let mut current = serde_json::to_value(&*dest)?;
        if !current.is_object() {
            return Err(LeafError::InvalidDestination {
                found: json_shape(&current),
            });
        }
        fill_defaults(&mut current, &defaults);
        *dest = serde_json::from_value(current)?;
        Ok(())
    }
}

impl<T> Bind<T> for DefaultBinder
where
    T: Serialize + DeserializeOwned,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn bind(&self, dest: &mut T) -> LeafResult<()> {
        self.apply(dest)
    }
}

/// Mutable accumulator for a [`DefaultBinder`].
#[derive(Debug)]
pub struct DefaultBinderBuilder {
    name: String,
    schema: Arc<Schema>,
    hooks: HookChain,
}

impl DefaultBinderBuilder {
    /// Override the binder's name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replace the hook chain.
    #[must_use]
    pub fn hooks(mut self, hooks: HookChain) -> Self {
        self.hooks = hooks;
        self
    }

    /// Append a hook to the chain.
    #[must_use]
    pub fn append_hook(mut self, hook: crate::hooks::Hook) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Freeze the binder.
    #[must_use]
    pub fn build(self) -> DefaultBinder {
        DefaultBinder {
            name: self.name,
            schema: self.schema,
            hooks: self.hooks,
        }
    }
}

pub(crate) fn json_shape(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "a map",
    }
}
