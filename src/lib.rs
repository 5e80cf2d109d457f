//! Schema-driven default values, conversion hook chains, and layered
//! configuration loading.
//!
//! `leafbind` bridges request binding and configuration loading to one
//! shared mechanism: a [`Schema`] registered per destination type maps
//! field keys to target kinds and default literals, a recursive walker
//! derives a default-value tree from it, and a composable [`HookChain`]
//! converts each literal towards its field's type. The typed tree is then
//! handed to the generic serde decode engine — [`DefaultBinder`] fills the
//! fields other binding sources left untouched, and [`ConfigLoader`]
//! layers defaults, environment variables and a dotenv file into one
//! decoded struct.

mod binder;
mod dotenv;
mod engine;
mod env_source;
mod error;
pub mod hooks;
mod loader;
mod schema;
mod value;
mod walker;

pub use binder::{Bind, ComposedBinder, DefaultBinder, DefaultBinderBuilder, compose_binders};
pub use dotenv::DotEnv;
pub use engine::{fill_defaults, typed_defaults};
pub use env_source::EnvSource;
pub use error::{ConvertError, LeafError, LeafResult};
pub use hooks::{Conversion, Hook, HookChain, TimeLayout, compose, or_group};
pub use loader::{ConfigLoader, ConfigLoaderBuilder};
pub use schema::{FieldKind, FieldSpec, Schema, SchemaBuilder, TargetKind};
pub use value::{Decoded, RawValue};
pub use walker::default_tree;
