//! Convenient imports for typical `pgfixture` usage.
//!
//! ```ignore
//! use pgfixture::prelude::*;
//! ```

pub use crate::generator::{constant, date_sequence, sequence, string_sequence};
pub use crate::operations::*;
pub use crate::{
    CalendarField, ClientDestination, DbSetup, DbSetupTracker, Destination, Operation,
    SetupError, SetupResult, SqlEnum, UrlDestination, Value,
};

#[cfg(feature = "pool")]
pub use crate::PoolDestination;
