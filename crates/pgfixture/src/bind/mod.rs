//! Binding of fixture values to prepared-statement parameters.
//!
//! - A [`Binder`] writes one [`Value`] into one parameter slot.
//! - A [`BinderConfiguration`] picks the binder for a parameter, usually from the
//!   [`ParameterMetadata`] reported by the server when the statement was prepared.
//!
//! Inserts resolve one binder per column: an explicit binder registered with
//! `with_binder` wins, otherwise the configuration is asked.

pub mod binders;
pub mod config;
pub mod param;

pub use binders::{
    StandardBinder, date_binder, decimal_binder, default_binder, integer_binder, string_binder,
    time_binder, timestamp_binder,
};
pub use config::{DefaultBinderConfiguration, DisabledBinderConfiguration};
pub use param::{Parameters, SqlParam};

use crate::error::{SetupError, SetupResult};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;
use tokio_postgres::types::Type;

/// Writes a value into a statement parameter.
///
/// Binders are stateless; `Debug` output identifies a binder when inserts are
/// compared or rendered.
pub trait Binder: fmt::Debug + Send + Sync {
    /// Bind `value` at the 1-based parameter `index`.
    fn bind(&self, params: &mut Parameters, index: usize, value: &Value) -> SetupResult<()>;
}

impl<B: Binder + ?Sized> Binder for Arc<B> {
    fn bind(&self, params: &mut Parameters, index: usize, value: &Value) -> SetupResult<()> {
        (**self).bind(params, index, value)
    }
}

/// Chooses the binder of a statement parameter.
pub trait BinderConfiguration: fmt::Debug + Send + Sync {
    /// Binder for the 1-based parameter `param`. `metadata` is `None` when metadata
    /// is disabled or could not be obtained.
    fn binder(
        &self,
        metadata: Option<&ParameterMetadata>,
        param: usize,
    ) -> SetupResult<Arc<dyn Binder>>;

    /// Whether inserts may ask the server for parameter metadata.
    fn is_metadata_enabled(&self) -> bool {
        true
    }
}

/// Parameter types of a prepared statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterMetadata {
    types: Vec<Type>,
}

impl ParameterMetadata {
    pub fn new(types: Vec<Type>) -> Self {
        Self { types }
    }

    pub fn parameter_count(&self) -> usize {
        self.types.len()
    }

    /// Type of the 1-based parameter `param`.
    pub fn parameter_type(&self, param: usize) -> SetupResult<&Type> {
        param
            .checked_sub(1)
            .and_then(|i| self.types.get(i))
            .ok_or_else(|| {
                SetupError::bind(
                    param,
                    format!("statement has {} parameter(s)", self.types.len()),
                )
            })
    }
}
