//! # pgfixture
//!
//! Database fixtures for Postgres integration tests.
//!
//! ## Features
//!
//! - **Declarative**: describe the rows a test needs as a sequence of operations
//! - **Transactional**: a launch runs everything in one transaction, rolled back on failure
//! - **Type-aware binding**: values are bound according to the parameter types the server reports
//! - **Generated values**: sequences, padded codes and dates for columns rows don't supply
//! - **Skippable**: a tracker avoids relaunching an unchanged fixture after read-only tests
//!
//! ## Example
//!
//! ```ignore
//! use pgfixture::operations::*;
//! use pgfixture::generator::string_sequence;
//! use pgfixture::{DbSetup, UrlDestination};
//!
//! let operation = sequence_of([
//!     delete_all_from_tables(["vendor"]),
//!     insert_into("vendor")
//!         .columns(["id", "name"])?
//!         .values((1_i64, "Amazon"))?
//!         .values((2_i64, "PMI"))?
//!         .with_generated_value("code", string_sequence("V").with_left_padding(3)?)?
//!         .build()?
//!         .into(),
//! ]);
//!
//! DbSetup::new(UrlDestination::from_env()?, operation)
//!     .launch()
//!     .await?;
//! ```
//!
//! ## Logging
//!
//! Events are emitted with `tracing` under the targets `pgfixture.sql` (statements)
//! and `pgfixture.setup` (launches, commits, rollbacks, skipped launches).

// lets `#[derive(SqlEnum)]` output refer to `::pgfixture` inside this crate too
extern crate self as pgfixture;

pub mod bind;
pub mod connection;
pub mod destination;
pub mod error;
pub mod generator;
pub mod operation;
pub mod operations;
pub mod prelude;
pub mod setup;
pub mod tracker;
pub mod value;

mod temporal;

#[cfg(test)]
pub(crate) mod testing;

pub use bind::{
    Binder, BinderConfiguration, DefaultBinderConfiguration, DisabledBinderConfiguration,
    ParameterMetadata, Parameters, SqlParam, StandardBinder,
};
pub use connection::{Connection, PreparedStatement};
pub use destination::{ClientDestination, Destination, UrlDestination};
pub use error::{SetupError, SetupResult};
pub use generator::{CalendarField, ValueGenerator};
pub use operation::{
    Delete, DeleteAll, Insert, InsertBuilder, Operation, RowBuilder, RowRepeater, SqlOperation,
    Truncate,
};
pub use setup::DbSetup;
pub use tracker::DbSetupTracker;
pub use value::{IntoValues, SqlEnum, Value};

#[cfg(feature = "pool")]
pub use destination::PoolDestination;

#[cfg(feature = "derive")]
pub use pgfixture_derive::SqlEnum;
