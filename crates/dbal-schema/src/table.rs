//! The table blueprint.
//!
//! A [`Table`] is both a snapshot (columns, indexes, primary key) and a
//! log of the changes made to it. Every structural call appends a
//! [`Command`]; `Schema::create_table` consumes the column, index and
//! primary commands, `Schema::alter_table` replays all of them in order.

use std::collections::HashMap;

use dbal_core::{Error, Result, SchemaErrorKind, Value};
use serde_json::json;

use crate::column::{Column, ColumnType, DefaultValue};
use crate::command::{Command, CommandKind};
use crate::index::{Index, IndexType, Primary};

/// Options for CREATE TABLE.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTableOptions {
    pub temporary: bool,
    pub engine: Option<String>,
    pub charset: Option<String>,
    pub collation: Option<String>,
}

impl CreateTableOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temporary(mut self, temporary: bool) -> Self {
        self.temporary = temporary;
        self
    }

    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }
}

#[derive(Debug, Default)]
pub struct Table {
    name: String,
    schema_name: Option<String>,
    columns: Vec<Column>,
    column_map: HashMap<String, usize>,
    indexes: Vec<Index>,
    index_map: HashMap<String, usize>,
    primary: Option<Primary>,
    commands: Vec<Command>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Rebuild a table from catalog listings.
    ///
    /// The primary index (or, failing that, the columns the catalog flags
    /// as primary) becomes [`Table::primary`] and leaves the index list.
    pub fn from_catalog(
        name: impl Into<String>,
        schema_name: Option<String>,
        columns: Vec<Column>,
        indexes: Vec<Index>,
    ) -> Result<Self> {
        let mut table = Table::new(name);
        table.schema_name = schema_name;
        for column in columns {
            table.push_column(column);
        }
        for index in indexes {
            if let Some(missing) = index.columns.iter().find(|c| !table.column_map.contains_key(*c)) {
                return Err(Error::schema(
                    SchemaErrorKind::ColumnNotFound,
                    format!("the column {} does not exists", missing),
                ));
            }
            if index.index_type == IndexType::Primary {
                table.primary = Some(Primary {
                    name: index.name,
                    table_name: table.name.clone(),
                    columns: index.columns,
                });
            } else {
                table.push_index(index);
            }
        }
        if table.primary.is_none() {
            let flagged: Vec<String> = table
                .columns
                .iter()
                .filter(|c| c.primary)
                .map(|c| c.name.clone())
                .collect();
            if !flagged.is_empty() {
                table.primary = Some(Primary::new(table.name.clone(), flagged));
            }
        }
        let primary_columns = table.primary.as_ref().map(|p| p.columns.clone()).unwrap_or_default();
        for name in &primary_columns {
            if let Some(column) = table.column_mut(name) {
                column.primary = true;
            }
        }
        Ok(table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema_name(&self) -> Option<&str> {
        self.schema_name.as_deref()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    pub fn primary(&self) -> Option<&Primary> {
        self.primary.as_ref()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Drain the command log.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_map.get(name).map(|&i| &self.columns[i])
    }

    fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.column_map.get(name).map(|&i| &mut self.columns[i])
    }

    pub fn index(&self, name: &str) -> Option<&Index> {
        self.index_map.get(name).map(|&i| &self.indexes[i])
    }

    /// True when every named column exists.
    pub fn has_column(&self, names: &[&str]) -> bool {
        names.iter().all(|n| self.column_map.contains_key(*n))
    }

    /// True when every named index exists.
    pub fn has_index(&self, names: &[&str]) -> bool {
        names.iter().all(|n| self.index_map.contains_key(*n))
    }

    fn push_column(&mut self, mut column: Column) {
        column.table_name.clone_from(&self.name);
        if column.position == 0 {
            column.position = self.columns.len() + 1;
        }
        self.column_map.insert(column.name.clone(), self.columns.len());
        self.columns.push(column);
    }

    fn push_index(&mut self, index: Index) {
        if let Some(&i) = self.index_map.get(&index.name) {
            self.indexes[i] = index;
            return;
        }
        self.index_map.insert(index.name.clone(), self.indexes.len());
        self.indexes.push(index);
    }

    fn reindex(&mut self) {
        self.column_map = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        self.index_map = self
            .indexes
            .iter()
            .enumerate()
            .map(|(i, x)| (x.name.clone(), i))
            .collect();
    }

    fn record(&mut self, kind: CommandKind) -> usize {
        self.commands.push(Command::new(kind));
        self.commands.len() - 1
    }

    // ==================== structural commands ====================

    /// Add a column; a column that already exists is modified instead.
    pub fn add_column(&mut self, mut column: Column) -> ColumnDef<'_> {
        column.table_name.clone_from(&self.name);
        let name = column.name.clone();
        let command = if let Some(&i) = self.column_map.get(&name) {
            column.position = self.columns[i].position;
            self.columns[i] = column.clone();
            self.record(CommandKind::ModifyColumn(column))
        } else {
            self.push_column(column);
            let column = self.columns[self.columns.len() - 1].clone();
            self.record(CommandKind::AddColumn(column))
        };
        ColumnDef {
            table: self,
            name,
            command,
        }
    }

    /// Replace the definition of an existing column.
    pub fn change_column(&mut self, mut column: Column) -> ColumnDef<'_> {
        column.table_name.clone_from(&self.name);
        let name = column.name.clone();
        match self.column_map.get(&name) {
            Some(&i) => {
                column.position = self.columns[i].position;
                self.columns[i] = column.clone();
            }
            None => self.push_column(column.clone()),
        }
        let command = self.record(CommandKind::ModifyColumn(column));
        ColumnDef {
            table: self,
            name,
            command,
        }
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> &mut Self {
        self.record(CommandKind::RenameColumn {
            from: from.to_string(),
            to: to.to_string(),
        });
        if let Some(column) = self.column_mut(from) {
            column.name = to.to_string();
            let rename = |names: &mut Vec<String>| {
                for n in names.iter_mut().filter(|n| *n == from) {
                    *n = to.to_string();
                }
            };
            for index in &mut self.indexes {
                rename(&mut index.columns);
            }
            if let Some(primary) = &mut self.primary {
                rename(&mut primary.columns);
            }
            self.reindex();
        }
        self
    }

    pub fn drop_column(&mut self, names: &[&str]) -> &mut Self {
        for name in names {
            self.record(CommandKind::DropColumn((*name).to_string()));
            self.columns.retain(|c| c.name != *name);
        }
        self.reindex();
        self
    }

    pub fn create_index(&mut self, key: &str, columns: &[&str]) -> &mut Self {
        self.add_index(key, IndexType::Index, columns)
    }

    pub fn create_unique(&mut self, key: &str, columns: &[&str]) -> &mut Self {
        self.add_index(key, IndexType::Unique, columns)
    }

    fn add_index(&mut self, key: &str, index_type: IndexType, columns: &[&str]) -> &mut Self {
        let index = Index::new(
            key,
            self.name.clone(),
            index_type,
            columns.iter().map(|c| (*c).to_string()).collect(),
        );
        self.push_index(index.clone());
        self.record(CommandKind::CreateIndex(index));
        self
    }

    pub fn drop_index(&mut self, keys: &[&str]) -> &mut Self {
        for key in keys {
            self.record(CommandKind::DropIndex((*key).to_string()));
            self.indexes.retain(|x| x.name != *key);
        }
        self.reindex();
        self
    }

    pub fn rename_index(&mut self, from: &str, to: &str) -> &mut Self {
        self.record(CommandKind::RenameIndex {
            from: from.to_string(),
            to: to.to_string(),
        });
        if let Some(&i) = self.index_map.get(from) {
            self.indexes[i].name = to.to_string();
            self.reindex();
        }
        self
    }

    pub fn create_primary(&mut self, columns: &[&str]) -> &mut Self {
        let primary = Primary::new(
            self.name.clone(),
            columns.iter().map(|c| (*c).to_string()).collect(),
        );
        for name in columns {
            if let Some(column) = self.column_mut(name) {
                column.primary = true;
            }
        }
        self.primary = Some(primary.clone());
        self.record(CommandKind::CreatePrimary(primary));
        self
    }

    /// Drop the primary key. Without a tracked key the constraint is
    /// addressed as `<table>_primary`.
    pub fn drop_primary(&mut self) -> &mut Self {
        let name = match self.primary.take() {
            Some(primary) => {
                for name in &primary.columns {
                    if let Some(column) = self.column_mut(name) {
                        column.primary = false;
                    }
                }
                primary.name
            }
            None => format!("{}_primary", self.name),
        };
        self.record(CommandKind::DropPrimary(name));
        self
    }

    /// Attach a completion callback to the most recent command.
    pub fn on_complete(&mut self, callback: impl FnMut(Option<&Error>) + Send + 'static) -> &mut Self {
        if let Some(command) = self.commands.last_mut() {
            command.set_callback(Box::new(callback));
        }
        self
    }

    // ==================== column helpers ====================

    fn typed(&mut self, name: &str, column_type: ColumnType) -> ColumnDef<'_> {
        self.add_column(Column::new(name, column_type))
    }

    pub fn string(&mut self, name: &str, length: u32) -> ColumnDef<'_> {
        self.typed(name, ColumnType::String).length(length)
    }

    pub fn char(&mut self, name: &str, length: u32) -> ColumnDef<'_> {
        self.typed(name, ColumnType::Char).length(length)
    }

    pub fn text(&mut self, name: &str) -> ColumnDef<'_> {
        self.typed(name, ColumnType::Text)
    }

    pub fn medium_text(&mut self, name: &str) -> ColumnDef<'_> {
        self.typed(name, ColumnType::MediumText)
    }

    pub fn long_text(&mut self, name: &str) -> ColumnDef<'_> {
        self.typed(name, ColumnType::LongText)
    }

    pub fn tiny_integer(&mut self, name: &str) -> ColumnDef<'_> {
        self.typed(name, ColumnType::TinyInteger)
    }

    pub fn small_integer(&mut self, name: &str) -> ColumnDef<'_> {
        self.typed(name, ColumnType::SmallInteger)
    }

    pub fn integer(&mut self, name: &str) -> ColumnDef<'_> {
        self.typed(name, ColumnType::Integer)
    }

    pub fn big_integer(&mut self, name: &str) -> ColumnDef<'_> {
        self.typed(name, ColumnType::BigInteger)
    }

    pub fn unsigned_big_integer(&mut self, name: &str) -> ColumnDef<'_> {
        self.big_integer(name).unsigned()
    }

    /// Auto-incrementing unsigned big integer.
    pub fn big_increments(&mut self, name: &str) -> ColumnDef<'_> {
        self.unsigned_big_integer(name).auto_increment()
    }

    /// Auto-incrementing unsigned integer.
    pub fn increments(&mut self, name: &str) -> ColumnDef<'_> {
        self.integer(name).unsigned().auto_increment()
    }

    /// `big_increments` plus primary key.
    pub fn id(&mut self, name: &str) -> ColumnDef<'_> {
        self.big_increments(name).primary()
    }

    pub fn decimal(&mut self, name: &str, precision: u32, scale: u32) -> ColumnDef<'_> {
        self.typed(name, ColumnType::Decimal).precision(precision, scale)
    }

    pub fn float(&mut self, name: &str, precision: u32, scale: u32) -> ColumnDef<'_> {
        self.typed(name, ColumnType::Float).precision(precision, scale)
    }

    pub fn double(&mut self, name: &str, precision: u32, scale: u32) -> ColumnDef<'_> {
        self.typed(name, ColumnType::Double).precision(precision, scale)
    }

    pub fn boolean(&mut self, name: &str) -> ColumnDef<'_> {
        self.typed(name, ColumnType::Boolean)
    }

    pub fn date(&mut self, name: &str) -> ColumnDef<'_> {
        self.typed(name, ColumnType::Date)
    }

    pub fn date_time(&mut self, name: &str) -> ColumnDef<'_> {
        self.typed(name, ColumnType::DateTime)
    }

    pub fn date_time_tz(&mut self, name: &str) -> ColumnDef<'_> {
        self.typed(name, ColumnType::DateTimeTz)
    }

    pub fn time(&mut self, name: &str) -> ColumnDef<'_> {
        self.typed(name, ColumnType::Time)
    }

    pub fn time_tz(&mut self, name: &str) -> ColumnDef<'_> {
        self.typed(name, ColumnType::TimeTz)
    }

    pub fn timestamp(&mut self, name: &str) -> ColumnDef<'_> {
        self.typed(name, ColumnType::Timestamp)
    }

    pub fn timestamp_tz(&mut self, name: &str) -> ColumnDef<'_> {
        self.typed(name, ColumnType::TimestampTz)
    }

    /// Nullable `created_at` and `updated_at` timestamps.
    pub fn timestamps(&mut self) -> &mut Self {
        self.timestamp("created_at").nullable();
        self.timestamp("updated_at").nullable();
        self
    }

    /// Nullable `deleted_at` timestamp.
    pub fn soft_deletes(&mut self) -> ColumnDef<'_> {
        self.timestamp("deleted_at").nullable()
    }

    pub fn year(&mut self, name: &str) -> ColumnDef<'_> {
        self.typed(name, ColumnType::Year)
    }

    pub fn binary(&mut self, name: &str) -> ColumnDef<'_> {
        self.typed(name, ColumnType::Binary)
    }

    pub fn json(&mut self, name: &str) -> ColumnDef<'_> {
        self.typed(name, ColumnType::Json)
    }

    pub fn jsonb(&mut self, name: &str) -> ColumnDef<'_> {
        self.typed(name, ColumnType::Jsonb)
    }

    pub fn uuid(&mut self, name: &str) -> ColumnDef<'_> {
        self.typed(name, ColumnType::Uuid)
    }

    pub fn ip_address(&mut self, name: &str) -> ColumnDef<'_> {
        self.typed(name, ColumnType::IpAddress)
    }

    pub fn mac_address(&mut self, name: &str) -> ColumnDef<'_> {
        self.typed(name, ColumnType::MacAddress)
    }

    /// Embedding of `dimensions` floats.
    pub fn vector(&mut self, name: &str, dimensions: u32) -> ColumnDef<'_> {
        self.typed(name, ColumnType::Vector).length(dimensions)
    }

    pub fn vecf16(&mut self, name: &str, dimensions: u32) -> ColumnDef<'_> {
        self.typed(name, ColumnType::VectorF16).length(dimensions)
    }

    pub fn halfvec(&mut self, name: &str, dimensions: u32) -> ColumnDef<'_> {
        self.typed(name, ColumnType::HalfVector).length(dimensions)
    }

    pub fn enum_(&mut self, name: &str, options: &[&str]) -> ColumnDef<'_> {
        let options: Vec<String> = options.iter().map(|o| (*o).to_string()).collect();
        self.typed(name, ColumnType::Enum)
            .apply(move |c| c.options.clone_from(&options))
    }

    /// JSON snapshot of the table structure.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "name": self.name,
            "schema": self.schema_name,
            "columns": self.columns,
            "indexes": self.indexes,
            "primary": self.primary,
        })
    }
}

/// Modifier handle returned by the column helpers.
///
/// Changes land both on the blueprint's column and on the command that
/// recorded it.
pub struct ColumnDef<'a> {
    table: &'a mut Table,
    name: String,
    command: usize,
}

impl ColumnDef<'_> {
    fn apply(self, f: impl Fn(&mut Column)) -> Self {
        if let Some(column) = self.table.column_mut(&self.name) {
            f(column);
        }
        if let Some(command) = self.table.commands.get_mut(self.command) {
            if let CommandKind::AddColumn(column) | CommandKind::ModifyColumn(column) =
                &mut command.kind
            {
                f(column);
            }
        }
        self
    }

    pub fn column(&self) -> Option<&Column> {
        self.table.column(&self.name)
    }

    pub fn nullable(self) -> Self {
        self.apply(|c| c.nullable = true)
    }

    pub fn not_null(self) -> Self {
        self.apply(|c| c.nullable = false)
    }

    pub fn default(self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.apply(move |c| c.default = Some(DefaultValue::Value(value.clone())))
    }

    /// Verbatim default expression, e.g. `CURRENT_TIMESTAMP`.
    pub fn default_raw(self, sql: impl Into<String>) -> Self {
        let sql = sql.into();
        self.apply(move |c| c.default = Some(DefaultValue::Raw(sql.clone())))
    }

    pub fn comment(self, comment: impl Into<String>) -> Self {
        let comment = comment.into();
        self.apply(move |c| c.comment = Some(comment.clone()))
    }

    pub fn collation(self, collation: impl Into<String>) -> Self {
        let collation = collation.into();
        self.apply(move |c| c.collation = Some(collation.clone()))
    }

    pub fn charset(self, charset: impl Into<String>) -> Self {
        let charset = charset.into();
        self.apply(move |c| c.charset = Some(charset.clone()))
    }

    pub fn unsigned(self) -> Self {
        self.apply(|c| c.unsigned = true)
    }

    pub fn auto_increment(self) -> Self {
        self.apply(|c| c.auto_increment = true)
    }

    pub fn length(self, length: u32) -> Self {
        self.apply(|c| c.length = Some(length))
    }

    pub fn precision(self, precision: u32, scale: u32) -> Self {
        self.apply(|c| {
            c.precision = Some(precision);
            c.scale = Some(scale);
        })
    }

    /// Fractional-seconds precision of a temporal column.
    pub fn datetime_precision(self, precision: u32) -> Self {
        self.apply(|c| c.datetime_precision = Some(precision))
    }

    /// Make this column the primary key.
    pub fn primary(self) -> Self {
        let name = self.name.clone();
        self.table.create_primary(&[name.as_str()]);
        self.apply(|c| c.primary = true)
    }

    /// Add a unique index named after the column.
    pub fn unique(self) -> Self {
        let name = self.name.clone();
        self.table.create_unique(&name, &[name.as_str()]);
        self
    }

    /// Add a plain index named after the column.
    pub fn index(self) -> Self {
        let name = self.name.clone();
        self.table.create_index(&name, &[name.as_str()]);
        self
    }
}
