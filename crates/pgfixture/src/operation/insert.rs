//! Insert operation and its builder.

use crate::bind::{Binder, BinderConfiguration, ParameterMetadata, Parameters};
use crate::connection::{Connection, PreparedStatement};
use crate::error::{SetupError, SetupResult};
use crate::generator::{ValueGenerator, constant};
use crate::value::{IntoValues, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Inserts rows into one table with a single prepared statement executed once per row.
///
/// Built with [`Insert::builder`] (or [`insert_into`](crate::operations::insert_into)).
/// A built insert is immutable: generated values were computed when it was built,
/// so executing it again replays the same rows.
///
/// ```ignore
/// let insert = Insert::builder("vendor")
///     .columns(["id", "code", "name"])?
///     .values((1, "AMA", "Amazon"))?
///     .values((2, "PMI", "PMI"))?
///     .with_generated_value("created_at", date_sequence())?
///     .build()?;
///
/// assert_eq!(
///     insert.sql(),
///     "insert into vendor (id, code, name, created_at) values ($1, $2, $3, $4)"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Insert {
    table: String,
    columns: Vec<String>,
    generated_values: Vec<(String, Vec<Value>)>,
    rows: Vec<Vec<Value>>,
    binders: BTreeMap<String, Arc<dyn Binder>>,
    metadata_used: bool,
}

impl Insert {
    /// Start building an insert into `table`.
    pub fn builder(table: impl Into<String>) -> InsertBuilder {
        InsertBuilder::new(table.into())
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Explicit columns, in the order rows supply their values.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Generated columns with one value per row, in registration order.
    pub fn generated_values(&self) -> &[(String, Vec<Value>)] {
        &self.generated_values
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Explicit binder registered for `column`, if any.
    pub fn binder(&self, column: &str) -> Option<&Arc<dyn Binder>> {
        self.binders.get(column)
    }

    pub fn metadata_used(&self) -> bool {
        self.metadata_used
    }

    /// Explicit columns followed by generated columns.
    pub fn all_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .chain(self.generated_values.iter().map(|(name, _)| name))
            .map(String::as_str)
    }

    /// The statement executed for every row.
    pub fn sql(&self) -> String {
        let columns: Vec<&str> = self.all_columns().collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${i}")).collect();
        format!(
            "insert into {} ({}) values ({})",
            self.table,
            columns.join(", "),
            placeholders.join(", ")
        )
    }

    /// Prepare the statement once, then bind and execute it for every row.
    pub(crate) async fn execute<C: Connection>(
        &self,
        connection: &C,
        configuration: &dyn BinderConfiguration,
    ) -> SetupResult<()> {
        let sql = self.sql();
        let statement = connection.prepare(&sql).await?;

        let metadata = if self.metadata_used && configuration.is_metadata_enabled() {
            match statement.parameter_metadata() {
                Ok(metadata) => Some(metadata),
                Err(err) => {
                    tracing::debug!(
                        target: "pgfixture.sql",
                        table = %self.table,
                        error = %err,
                        "parameter metadata unavailable; using configuration without it"
                    );
                    None
                }
            }
        } else {
            None
        };
        let binders = self.resolve_binders(metadata.as_ref(), configuration)?;

        let mut params = Parameters::with_count(binders.len());
        for (row_index, row) in self.rows.iter().enumerate() {
            params.clear();
            let generated = self
                .generated_values
                .iter()
                .map(|(_, values)| &values[row_index]);
            for (i, (value, binder)) in row.iter().chain(generated).zip(&binders).enumerate() {
                binder.bind(&mut params, i + 1, value)?;
            }
            connection.execute_prepared(&statement, &params).await?;
        }

        tracing::debug!(
            target: "pgfixture.sql",
            sql = %sql,
            param_count = binders.len(),
            row_count = self.rows.len(),
            "insert executed"
        );
        Ok(())
    }

    /// One binder per parameter: explicit binder first, configuration otherwise.
    fn resolve_binders(
        &self,
        metadata: Option<&ParameterMetadata>,
        configuration: &dyn BinderConfiguration,
    ) -> SetupResult<Vec<Arc<dyn Binder>>> {
        self.all_columns()
            .enumerate()
            .map(|(i, column)| match self.binders.get(column) {
                Some(binder) => Ok(Arc::clone(binder)),
                None => configuration.binder(metadata, i + 1),
            })
            .collect()
    }
}

impl PartialEq for Insert {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table
            && self.columns == other.columns
            && self.generated_values == other.generated_values
            && self.rows == other.rows
            && self.metadata_used == other.metadata_used
            && self.binders.len() == other.binders.len()
            && self
                .binders
                .iter()
                .zip(&other.binders)
                .all(|((a_col, a), (b_col, b))| a_col == b_col && same_binder(a, b))
    }
}

impl Eq for Insert {}

impl Hash for Insert {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.table.hash(state);
        self.columns.hash(state);
        self.generated_values.hash(state);
        self.rows.hash(state);
        self.metadata_used.hash(state);
        for (column, binder) in &self.binders {
            column.hash(state);
            format!("{binder:?}").hash(state);
        }
    }
}

// Binders are stateless, so two binders with the same rendering behave the same.
fn same_binder(a: &Arc<dyn Binder>, b: &Arc<dyn Binder>) -> bool {
    Arc::ptr_eq(a, b) || format!("{a:?}") == format!("{b:?}")
}

impl fmt::Display for Insert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "insert into {} [columns=[{}]", self.table, self.columns.join(", "))?;
        f.write_str(", generatedValues={")?;
        for (i, (column, values)) in self.generated_values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{column}=")?;
            write_values(f, values)?;
        }
        f.write_str("}, rows=[")?;
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write_values(f, row)?;
        }
        write!(f, "], metadataUsed={}, binders={{", self.metadata_used)?;
        for (i, (column, binder)) in self.binders.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{column}={binder:?}")?;
        }
        f.write_str("}]")
    }
}

fn write_values(f: &mut fmt::Formatter<'_>, values: &[Value]) -> fmt::Result {
    f.write_str("[")?;
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{value}")?;
    }
    f.write_str("]")
}

// ─── Builder ────────────────────────────────────────────────────────────────

/// Type-erased generator stored by the builder until it is materialized.
trait AnyGenerator: fmt::Debug + Send {
    fn next_any(&mut self) -> Value;
}

impl<G: ValueGenerator> AnyGenerator for G {
    fn next_any(&mut self) -> Value {
        self.next_value().into()
    }
}

/// Accumulates the description of an [`Insert`].
///
/// Every method consumes the builder and hands it back, failing with
/// [`SetupError::IllegalState`] or [`SetupError::InvalidArgument`] when a
/// contract is broken. A failed call leaves nothing half-applied: the builder
/// is simply gone with the error.
#[derive(Debug)]
pub struct InsertBuilder {
    table: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    generators: Vec<(String, Box<dyn AnyGenerator>)>,
    binders: BTreeMap<String, Arc<dyn Binder>>,
    metadata_used: bool,
}

impl InsertBuilder {
    fn new(table: String) -> Self {
        Self {
            table,
            columns: Vec::new(),
            rows: Vec::new(),
            generators: Vec::new(),
            binders: BTreeMap::new(),
            metadata_used: true,
        }
    }

    /// Set the explicit columns. Allowed once.
    pub fn columns<I, S>(mut self, names: I) -> SetupResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.columns.is_empty() {
            return Err(SetupError::illegal_state("columns have already been specified"));
        }
        let mut columns: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if self.is_generated(&name) {
                return Err(SetupError::invalid_argument(format!(
                    "column {name} has already been specified as generated value column"
                )));
            }
            if columns.contains(&name) {
                return Err(SetupError::invalid_argument(format!(
                    "column {name} is listed twice"
                )));
            }
            columns.push(name);
        }
        self.columns = columns;
        Ok(self)
    }

    /// Add a row of values, one per explicit column.
    pub fn values(self, row: impl IntoValues) -> SetupResult<Self> {
        self.add_positional(row.into_values(), 1)
    }

    /// Prepare a row to be added several times with [`RowRepeater::times`].
    pub fn repeating_values(self, row: impl IntoValues) -> SetupResult<RowRepeater> {
        let row = row.into_values();
        self.check_row_len(&row)?;
        Ok(RowRepeater {
            builder: self,
            row: PendingRow::Positional(row),
        })
    }

    /// Add a row given as `(column, value)` pairs.
    ///
    /// The first named row defines the columns (in pair order) when none were set.
    /// Later rows may use any subset of the columns; missing ones are null.
    pub fn named_values<I, K, V>(self, pairs: I) -> SetupResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.add_named(collect_pairs(pairs), 1)
    }

    /// Named form of [`repeating_values`](Self::repeating_values).
    pub fn repeating_named_values<I, K, V>(self, pairs: I) -> SetupResult<RowRepeater>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Ok(RowRepeater {
            builder: self,
            row: PendingRow::Named(collect_pairs(pairs)),
        })
    }

    /// Start a named row built column by column.
    pub fn row(self) -> RowBuilder {
        RowBuilder {
            builder: self,
            row: Vec::new(),
        }
    }

    /// Use `binder` for the given columns, which must already be registered
    /// (explicit or generated).
    pub fn with_binder<B, I, S>(mut self, binder: B, columns: I) -> SetupResult<Self>
    where
        B: Binder + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let binder: Arc<dyn Binder> = Arc::new(binder);
        for column in columns {
            let column = column.into();
            if !self.columns.contains(&column) && !self.is_generated(&column) {
                return Err(SetupError::invalid_argument(format!(
                    "column {column} is not one of the registered column names"
                )));
            }
            self.binders.insert(column, Arc::clone(&binder));
        }
        Ok(self)
    }

    /// Give every row the same value for `column`.
    pub fn with_default_value(
        self,
        column: impl Into<String>,
        value: impl Into<Value>,
    ) -> SetupResult<Self> {
        self.with_generated_value(column, constant(value.into()))
    }

    /// Fill `column` with one value of `generator` per row, in row order.
    ///
    /// Registering a column again replaces its generator and keeps its position.
    pub fn with_generated_value<G>(
        mut self,
        column: impl Into<String>,
        generator: G,
    ) -> SetupResult<Self>
    where
        G: ValueGenerator + 'static,
    {
        let column = column.into();
        if self.columns.contains(&column) {
            return Err(SetupError::invalid_argument(format!(
                "column {column} is already listed in the list of column names"
            )));
        }
        let generator: Box<dyn AnyGenerator> = Box::new(generator);
        match self.generators.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = generator,
            None => self.generators.push((column, generator)),
        }
        Ok(self)
    }

    /// Whether the built insert asks the server for parameter types (default `true`).
    pub fn use_metadata(mut self, use_metadata: bool) -> Self {
        self.metadata_used = use_metadata;
        self
    }

    /// Materialize generated values and freeze the insert.
    pub fn build(self) -> SetupResult<Insert> {
        if self.columns.is_empty() && self.generators.is_empty() {
            return Err(SetupError::illegal_state(
                "no column and no generated value column has been specified",
            ));
        }
        let row_count = self.rows.len();
        let generated_values = self
            .generators
            .into_iter()
            .map(|(column, mut generator)| {
                let values = (0..row_count).map(|_| generator.next_any()).collect();
                (column, values)
            })
            .collect();
        Ok(Insert {
            table: self.table,
            columns: self.columns,
            generated_values,
            rows: self.rows,
            binders: self.binders,
            metadata_used: self.metadata_used,
        })
    }

    fn is_generated(&self, column: &str) -> bool {
        self.generators.iter().any(|(name, _)| name == column)
    }

    fn check_row_len(&self, row: &[Value]) -> SetupResult<()> {
        if row.len() != self.columns.len() {
            return Err(SetupError::invalid_argument(format!(
                "the number of values ({}) doesn't match the number of columns ({})",
                row.len(),
                self.columns.len()
            )));
        }
        Ok(())
    }

    fn add_positional(mut self, row: Vec<Value>, times: usize) -> SetupResult<Self> {
        self.check_row_len(&row)?;
        self.rows.extend(std::iter::repeat_n(row, times));
        Ok(self)
    }

    fn add_named(mut self, pairs: Vec<(String, Value)>, times: usize) -> SetupResult<Self> {
        if self.rows.is_empty() && self.columns.is_empty() {
            let names: Vec<String> = pairs.iter().map(|(name, _)| name.clone()).collect();
            self = self.columns(names)?;
        } else {
            let unknown: Vec<&str> = pairs
                .iter()
                .map(|(name, _)| name.as_str())
                .filter(|name| !self.columns.iter().any(|c| c == name))
                .collect();
            if !unknown.is_empty() {
                return Err(SetupError::invalid_argument(format!(
                    "the following columns of the row don't match with any column name: [{}]",
                    unknown.join(", ")
                )));
            }
        }

        let row: Vec<Value> = self
            .columns
            .iter()
            .map(|column| {
                pairs
                    .iter()
                    .find(|(name, _)| name == column)
                    .map(|(_, value)| value.clone())
                    .unwrap_or_default()
            })
            .collect();
        self.rows.extend(std::iter::repeat_n(row, times));
        Ok(self)
    }
}

/// Pairs in first-seen order; a repeated name keeps its position and takes the last value.
fn collect_pairs<I, K, V>(pairs: I) -> Vec<(String, Value)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    let mut row: Vec<(String, Value)> = Vec::new();
    for (name, value) in pairs {
        push_pair(&mut row, name.into(), value.into());
    }
    row
}

fn push_pair(row: &mut Vec<(String, Value)>, name: String, value: Value) {
    match row.iter_mut().find(|(existing, _)| *existing == name) {
        Some((_, slot)) => *slot = value,
        None => row.push((name, value)),
    }
}

/// Builds one named row, column by column.
///
/// ```ignore
/// insert_into("client")
///     .row()
///     .column("id", 1)?
///     .column("name", "John")?
///     .end()?
///     .row()
///     .column("name", "Jack")?
///     .times(3)?
///     .build()?;
/// ```
#[derive(Debug)]
pub struct RowBuilder {
    builder: InsertBuilder,
    row: Vec<(String, Value)>,
}

impl RowBuilder {
    /// Set the value of a column. Setting a column twice keeps the last value.
    ///
    /// Fails right away if the insert already has columns and `name` is not one of them.
    pub fn column(mut self, name: impl Into<String>, value: impl Into<Value>) -> SetupResult<Self> {
        let name = name.into();
        let columns = &self.builder.columns;
        if !columns.is_empty() && !columns.contains(&name) {
            return Err(SetupError::invalid_argument(format!(
                "column {name} is not one of the registered column names"
            )));
        }
        push_pair(&mut self.row, name, value.into());
        Ok(self)
    }

    /// Add the row once.
    pub fn end(self) -> SetupResult<InsertBuilder> {
        self.builder.add_named(self.row, 1)
    }

    /// Add the row `times` times (0 adds nothing).
    pub fn times(self, times: usize) -> SetupResult<InsertBuilder> {
        self.builder.add_named(self.row, times)
    }
}

#[derive(Debug)]
enum PendingRow {
    Positional(Vec<Value>),
    Named(Vec<(String, Value)>),
}

/// A row waiting to be added a number of times.
#[derive(Debug)]
pub struct RowRepeater {
    builder: InsertBuilder,
    row: PendingRow,
}

impl RowRepeater {
    /// Add the row `times` times (0 adds nothing).
    pub fn times(self, times: usize) -> SetupResult<InsertBuilder> {
        match self.row {
            PendingRow::Positional(row) => self.builder.add_positional(row, times),
            PendingRow::Named(pairs) => self.builder.add_named(pairs, times),
        }
    }
}
