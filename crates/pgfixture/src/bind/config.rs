//! Binder configurations: which binder serves a parameter of a given type.

use super::binders::StandardBinder;
use super::{Binder, BinderConfiguration, ParameterMetadata};
use crate::error::{SetupError, SetupResult};
use std::sync::Arc;
use tokio_postgres::types::Type;

/// Chooses a standard binder from the parameter type reported by the server.
///
/// | Parameter type                        | Binder      |
/// |---------------------------------------|-------------|
/// | `date`                                | date        |
/// | `time`                                | time        |
/// | `timestamp`, `timestamptz`            | timestamp   |
/// | `int2`, `int4`, `int8`                | integer     |
/// | `numeric`, `float4`, `float8`         | decimal     |
/// | `text`, `varchar`, `bpchar`, `name`   | string      |
/// | anything else, or no metadata         | default     |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DefaultBinderConfiguration;

impl DefaultBinderConfiguration {
    pub fn new() -> Self {
        Self
    }

    /// Standard binder for a parameter type.
    pub fn binder_for_type(ty: &Type) -> StandardBinder {
        match *ty {
            Type::DATE => StandardBinder::Date,
            Type::TIME => StandardBinder::Time,
            Type::TIMESTAMP | Type::TIMESTAMPTZ => StandardBinder::Timestamp,
            Type::INT2 | Type::INT4 | Type::INT8 => StandardBinder::Integer,
            Type::NUMERIC | Type::FLOAT4 | Type::FLOAT8 => StandardBinder::Decimal,
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => StandardBinder::String,
            _ => StandardBinder::Default,
        }
    }
}

impl BinderConfiguration for DefaultBinderConfiguration {
    fn binder(
        &self,
        metadata: Option<&ParameterMetadata>,
        param: usize,
    ) -> SetupResult<Arc<dyn Binder>> {
        let binder = match metadata.map(|m| m.parameter_type(param)) {
            Some(Ok(ty)) => Self::binder_for_type(ty),
            // unknown parameter: same as having no metadata at all
            Some(Err(_)) | None => StandardBinder::Default,
        };
        Ok(binder.shared())
    }
}

/// A configuration that never provides binders.
///
/// Use it when every inserted column carries an explicit binder and the server
/// must not be asked for parameter metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DisabledBinderConfiguration;

impl BinderConfiguration for DisabledBinderConfiguration {
    fn binder(
        &self,
        _metadata: Option<&ParameterMetadata>,
        param: usize,
    ) -> SetupResult<Arc<dyn Binder>> {
        Err(SetupError::Unsupported(format!(
            "binder configuration is disabled (no binder for parameter {param})"
        )))
    }

    fn is_metadata_enabled(&self) -> bool {
        false
    }
}
