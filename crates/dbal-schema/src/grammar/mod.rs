//! Schema grammars.
//!
//! [`SchemaGrammar`] extends the query [`Grammar`] with DDL compilation,
//! the CREATE / ALTER execution paths and catalog reflection. The
//! provided methods describe ANSI-flavoured SQL; the impls for
//! [`MySql`](dbal_query::MySql), [`Postgres`](dbal_query::Postgres),
//! [`Sqlite`](dbal_query::Sqlite), [`Hana`](dbal_query::Hana) and the
//! generic [`Sql`](dbal_query::Sql) grammar override the divergent parts.

mod hana;
mod mysql;
mod postgres;
mod sql;
mod sqlite;

use dbal_core::{
    CommandFailure, Config, Connection, Error, Result, Row, SchemaErrorKind, Value, Version,
};
use dbal_query::Grammar;

use crate::column::{Column, ColumnType, DefaultValue};
use crate::command::CommandKind;
use crate::index::{Index, IndexType, Primary};
use crate::reflect::{self, NativeType};
use crate::table::{CreateTableOptions, Table};

pub(crate) fn join_parts(parts: impl IntoIterator<Item = String>) -> String {
    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn unsupported(dialect: &str, operation: &str) -> Error {
    Error::schema(
        SchemaErrorKind::Unsupported,
        format!("{} does not support {}", dialect, operation),
    )
}

/// A rename is only replayed when the blueprint knows the column under
/// its new name.
pub(crate) fn ensure_renamed(table: &Table, from: &str, to: &str) -> Result<()> {
    if table.column(to).is_none() {
        return Err(Error::schema(
            SchemaErrorKind::ColumnNotFound,
            format!("the column {} not exists", from),
        ));
    }
    Ok(())
}

/// DDL compilation, execution and reflection for one dialect.
pub trait SchemaGrammar: Grammar {
    /// Native type of a column type; `None` falls back to `VARCHAR`.
    fn type_name(&self, column_type: &ColumnType) -> Option<&'static str>;

    /// Catalog type names that do not map back through [`type_name`](Self::type_name).
    fn flip_overrides(&self) -> &[(&'static str, ColumnType)] {
        &[]
    }

    /// Schema searched when a table name is not qualified.
    fn default_schema(&self, config: &Config) -> String {
        config.schema.clone().unwrap_or_else(|| "public".to_string())
    }

    // ==================== types ====================

    /// Map a catalog type name back to a column type.
    fn flip_type(&self, native: &str) -> Option<ColumnType> {
        let native = native.trim().to_ascii_uppercase();
        if let Some((_, t)) = self.flip_overrides().iter().find(|(n, _)| *n == native) {
            return Some(t.clone());
        }
        ColumnType::ALL
            .into_iter()
            .find(|t| self.type_name(t).is_some_and(|n| n.eq_ignore_ascii_case(&native)))
    }

    /// Whether the native type takes `(precision,scale)`.
    fn takes_scale(&self, column_type: &ColumnType) -> bool {
        *column_type == ColumnType::Decimal
    }

    /// Whether temporal types take a fractional-seconds precision.
    fn fractional_seconds(&self) -> bool {
        true
    }

    /// Native type of an enum column.
    fn enum_type(&self, column: &Column) -> String {
        let longest = column.options.iter().map(String::len).max().unwrap_or(1);
        let length = column
            .length
            .unwrap_or_else(|| u32::try_from(longest).unwrap_or(u32::MAX));
        format!(
            "{}({})",
            self.type_name(&ColumnType::String).unwrap_or("VARCHAR"),
            length
        )
    }

    /// Full native type of a column, with length or precision applied.
    fn column_type(&self, column: &Column) -> String {
        if column.column_type == ColumnType::Enum {
            return self.enum_type(column);
        }
        let base = self.type_name(&column.column_type).unwrap_or("VARCHAR");
        match (column.precision, column.scale, column.length) {
            (Some(p), Some(s), _) if self.takes_scale(&column.column_type) => {
                format!("{}({},{})", base, p, s)
            }
            _ if base.contains('(') => base.to_string(),
            _ if column.column_type.is_temporal() && self.fractional_seconds() => {
                match column.datetime_precision {
                    Some(p) => format!("{}({})", base, p),
                    None => base.to_string(),
                }
            }
            (_, _, Some(length)) => format!("{}({})", base, length),
            _ => base.to_string(),
        }
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "true" } else { "false" }
    }

    /// Inline literal for a DEFAULT clause.
    fn literal(&self, value: &Value) -> String {
        match value {
            Value::Null | Value::Default => "NULL".to_string(),
            Value::Bool(b) => self.bool_literal(*b).to_string(),
            Value::Text(s) => self.dialect().quote_string(s),
            Value::Json(j) => self.dialect().quote_string(&j.to_string()),
            Value::Bytes(b) => {
                let hex: String = b.iter().map(|byte| format!("{:02X}", byte)).collect();
                format!("X'{}'", hex)
            }
            other => other.to_text().unwrap_or_else(|| "NULL".to_string()),
        }
    }

    fn sql_default(&self, column: &Column) -> String {
        match &column.default {
            None => String::new(),
            Some(DefaultValue::Raw(sql)) => format!("DEFAULT {}", sql),
            Some(DefaultValue::Value(value)) => format!("DEFAULT {}", self.literal(value)),
        }
    }

    fn sql_nullable(&self, column: &Column) -> String {
        if column.nullable { "NULL" } else { "NOT NULL" }.to_string()
    }

    /// `CHECK ("c" IN ('a','b'))` for enum columns on dialects without a
    /// native enum.
    fn sql_enum_check(&self, column: &Column) -> String {
        if column.column_type != ColumnType::Enum || column.options.is_empty() {
            return String::new();
        }
        let options: Vec<String> = column
            .options
            .iter()
            .map(|o| self.dialect().quote_string(o))
            .collect();
        format!("CHECK ({} IN ({}))", self.wrap_value(&column.name), options.join(","))
    }

    // ==================== fragments ====================

    /// Column definition used by CREATE TABLE and ADD COLUMN.
    fn sql_add_column(&self, column: &Column) -> String {
        join_parts([
            self.wrap_value(&column.name),
            self.column_type(column),
            self.sql_nullable(column),
            self.sql_default(column),
            if column.auto_increment {
                "GENERATED BY DEFAULT AS IDENTITY".to_string()
            } else {
                String::new()
            },
            column
                .collation
                .as_ref()
                .map(|c| format!("COLLATE {}", c))
                .unwrap_or_default(),
            self.sql_enum_check(column),
        ])
    }

    /// Column definition used when modifying a column.
    fn sql_alter_column(&self, column: &Column) -> String {
        self.sql_add_column(column)
    }

    /// Separate comment statement, for dialects without inline comments.
    fn sql_add_comment(&self, column: &Column) -> Option<String> {
        let comment = column.comment.as_deref().filter(|c| !c.is_empty())?;
        Some(format!(
            "COMMENT ON COLUMN {}.{} IS {}",
            self.wrap_table(&column.table_name),
            self.wrap_value(&column.name),
            self.dialect().quote_string(comment)
        ))
    }

    fn index_type_name(&self, index_type: IndexType) -> &'static str {
        match index_type {
            IndexType::Index => "INDEX",
            IndexType::Unique => "UNIQUE INDEX",
            IndexType::Primary => "PRIMARY KEY",
        }
    }

    /// Stored index name; schema-global by default, so qualified by table.
    fn index_name(&self, table: &str, index: &str) -> String {
        format!("{}{}_{}", self.prefix(), table, index)
    }

    fn sql_index_columns(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|c| self.wrap_value(c))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Standalone `CREATE INDEX`; `None` when nothing should be created.
    fn sql_add_index(&self, table: &Table, index: &Index) -> Option<String> {
        if index.index_type == IndexType::Primary {
            return None;
        }
        Some(format!(
            "CREATE {} {} ON {} ({})",
            self.index_type_name(index.index_type),
            self.wrap_value(&self.index_name(table.name(), &index.name)),
            self.wrap_table(table.name()),
            self.sql_index_columns(&index.columns)
        ))
    }

    /// Index clause inside CREATE TABLE, for dialects that support one.
    fn sql_inline_index(&self, _index: &Index) -> Option<String> {
        None
    }

    fn sql_add_primary(&self, primary: &Primary) -> String {
        format!("PRIMARY KEY ({})", self.sql_index_columns(&primary.columns))
    }

    /// Primary key clause inside CREATE TABLE.
    fn sql_table_primary(&self, _table: &Table, primary: &Primary) -> Option<String> {
        Some(self.sql_add_primary(primary))
    }

    /// Statements creating user-defined types the columns rely on.
    fn sql_create_types(&self, _columns: &[&Column]) -> Vec<String> {
        Vec::new()
    }

    fn temporary_table_keyword(&self) -> &'static str {
        "CREATE TEMPORARY TABLE"
    }

    /// Trailing table options (engine, charset, ...).
    fn create_table_options(&self, _options: &CreateTableOptions) -> String {
        String::new()
    }

    // ==================== create ====================

    /// Every statement CREATE TABLE needs, in execution order: type
    /// definitions, the table itself, standalone indexes, comments.
    fn compile_create_table(&self, table: &Table, options: &CreateTableOptions) -> Vec<String> {
        let mut columns = Vec::new();
        let mut indexes = Vec::new();
        let mut primary = None;
        for command in table.commands() {
            match &command.kind {
                CommandKind::AddColumn(c) => columns.push(c),
                CommandKind::CreateIndex(i) => indexes.push(i),
                CommandKind::CreatePrimary(p) => primary = Some(p),
                _ => {}
            }
        }

        let mut statements = self.sql_create_types(&columns);
        let mut body: Vec<String> = columns.iter().map(|c| self.sql_add_column(c)).collect();
        let mut trailing = Vec::new();
        for index in indexes {
            match self.sql_inline_index(index) {
                Some(sql) => body.push(sql),
                None => trailing.extend(self.sql_add_index(table, index)),
            }
        }
        if let Some(sql) = primary.and_then(|p| self.sql_table_primary(table, p)) {
            body.push(sql);
        }

        let head = if options.temporary {
            self.temporary_table_keyword()
        } else {
            "CREATE TABLE"
        };
        let mut sql = format!(
            "{} {} (\n  {}\n)",
            head,
            self.wrap_table(table.name()),
            body.join(",\n  ")
        );
        let tail = self.create_table_options(options);
        if !tail.is_empty() {
            sql.push(' ');
            sql.push_str(&tail);
        }
        tracing::trace!(driver = self.driver(), table = table.name(), sql = %sql, "Compiled CREATE TABLE");
        statements.push(sql);
        statements.extend(trailing);
        statements.extend(columns.iter().filter_map(|c| self.sql_add_comment(c)));
        statements
    }

    /// Run CREATE TABLE and report the outcome to the consumed commands.
    fn create_table(
        &self,
        conn: &dyn Connection,
        table: &mut Table,
        options: &CreateTableOptions,
    ) -> Result<()> {
        let statements = self.compile_create_table(table, options);
        let outcome = statements.iter().try_for_each(|sql| {
            tracing::debug!(driver = self.driver(), table = table.name(), sql = %sql, "Executing DDL");
            conn.execute(sql, &[]).map(|_| ())
        });
        for mut command in table.take_commands() {
            if command.kind.is_create() {
                command.complete(outcome.as_ref().err());
            } else {
                tracing::debug!(command = command.name(), "Skipping command outside CREATE TABLE");
            }
        }
        outcome
    }

    // ==================== alter ====================

    fn alter_prefix(&self, table: &Table) -> String {
        format!("ALTER TABLE {}", self.wrap_table(table.name()))
    }

    /// Replay the command log. Each command's statements run immediately;
    /// a failure is reported to its callback and collected, and the loop
    /// moves on. Commands that already ran stay applied.
    fn alter_table(&self, conn: &dyn Connection, table: &mut Table) -> Result<()> {
        let mut failures = Vec::new();
        for mut command in table.take_commands() {
            let outcome = self.alter_command(table, &command.kind).and_then(|statements| {
                statements.iter().try_for_each(|sql| {
                    tracing::debug!(driver = self.driver(), table = table.name(), sql = %sql, "Executing DDL");
                    conn.execute(sql, &[]).map(|_| ())
                })
            });
            command.complete(outcome.as_ref().err());
            if let Err(error) = outcome {
                tracing::warn!(
                    driver = self.driver(),
                    table = table.name(),
                    command = command.name(),
                    error = %error,
                    "ALTER command failed"
                );
                failures.push(CommandFailure {
                    command: command.name().to_string(),
                    error,
                });
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::composite(failures))
        }
    }

    /// Statements for one command.
    fn alter_command(&self, table: &Table, kind: &CommandKind) -> Result<Vec<String>> {
        match kind {
            CommandKind::AddColumn(column) => self.alter_add_column(table, column),
            CommandKind::ModifyColumn(column) => self.alter_modify_column(table, column),
            CommandKind::RenameColumn { from, to } => self.alter_rename_column(table, from, to),
            CommandKind::DropColumn(name) => self.alter_drop_column(table, name),
            CommandKind::CreateIndex(index) => self.alter_create_index(table, index),
            CommandKind::DropIndex(name) => self.alter_drop_index(table, name),
            CommandKind::RenameIndex { from, to } => self.alter_rename_index(table, from, to),
            CommandKind::CreatePrimary(primary) => self.alter_create_primary(table, primary),
            CommandKind::DropPrimary(name) => self.alter_drop_primary(table, name),
        }
    }

    fn alter_add_column(&self, table: &Table, column: &Column) -> Result<Vec<String>> {
        let mut statements = self.sql_create_types(&[column]);
        statements.push(format!(
            "{} ADD COLUMN {}",
            self.alter_prefix(table),
            self.sql_add_column(column)
        ));
        statements.extend(self.sql_add_comment(column));
        Ok(statements)
    }

    fn alter_modify_column(&self, table: &Table, column: &Column) -> Result<Vec<String>> {
        let mut statements = vec![format!(
            "{} ALTER COLUMN {} SET DATA TYPE {}",
            self.alter_prefix(table),
            self.wrap_value(&column.name),
            self.column_type(column)
        )];
        statements.extend(self.sql_add_comment(column));
        Ok(statements)
    }

    fn alter_rename_column(&self, table: &Table, from: &str, to: &str) -> Result<Vec<String>> {
        ensure_renamed(table, from, to)?;
        Ok(vec![format!(
            "{} RENAME COLUMN {} TO {}",
            self.alter_prefix(table),
            self.wrap_value(from),
            self.wrap_value(to)
        )])
    }

    fn alter_drop_column(&self, table: &Table, name: &str) -> Result<Vec<String>> {
        Ok(vec![format!(
            "{} DROP COLUMN {}",
            self.alter_prefix(table),
            self.wrap_value(name)
        )])
    }

    fn alter_create_index(&self, table: &Table, index: &Index) -> Result<Vec<String>> {
        Ok(self.sql_add_index(table, index).into_iter().collect())
    }

    fn alter_drop_index(&self, table: &Table, name: &str) -> Result<Vec<String>> {
        Ok(vec![format!(
            "DROP INDEX {}",
            self.wrap_value(&self.index_name(table.name(), name))
        )])
    }

    fn alter_rename_index(&self, table: &Table, from: &str, to: &str) -> Result<Vec<String>> {
        Ok(vec![format!(
            "ALTER INDEX {} RENAME TO {}",
            self.wrap_value(&self.index_name(table.name(), from)),
            self.wrap_value(&self.index_name(table.name(), to))
        )])
    }

    fn alter_create_primary(&self, table: &Table, primary: &Primary) -> Result<Vec<String>> {
        Ok(vec![format!(
            "{} ADD {}",
            self.alter_prefix(table),
            self.sql_add_primary(primary)
        )])
    }

    fn alter_drop_primary(&self, table: &Table, name: &str) -> Result<Vec<String>> {
        Ok(vec![format!(
            "{} DROP CONSTRAINT {}",
            self.alter_prefix(table),
            self.wrap_value(name)
        )])
    }

    // ==================== table statements ====================

    fn compile_drop_table(&self, name: &str) -> String {
        format!("DROP TABLE {}", self.wrap_table(name))
    }

    fn compile_drop_table_if_exists(&self, name: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", self.wrap_table(name))
    }

    fn compile_rename_table(&self, from: &str, to: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME TO {}",
            self.wrap_table(from),
            self.wrap_table(to)
        )
    }

    fn drop_table(&self, conn: &dyn Connection, name: &str) -> Result<()> {
        let sql = self.compile_drop_table(name);
        tracing::debug!(driver = self.driver(), sql = %sql, "Executing DDL");
        conn.execute(&sql, &[]).map(|_| ())
    }

    fn drop_table_if_exists(&self, conn: &dyn Connection, _schema: &str, name: &str) -> Result<()> {
        let sql = self.compile_drop_table_if_exists(name);
        tracing::debug!(driver = self.driver(), sql = %sql, "Executing DDL");
        conn.execute(&sql, &[]).map(|_| ())
    }

    fn rename_table(&self, conn: &dyn Connection, from: &str, to: &str) -> Result<()> {
        let sql = self.compile_rename_table(from, to);
        tracing::debug!(driver = self.driver(), sql = %sql, "Executing DDL");
        conn.execute(&sql, &[]).map(|_| ())
    }

    // ==================== catalog ====================

    /// Resolve `schema.table` or a bare table name to the catalog's
    /// `(schema, stored table name)`.
    fn split_name(&self, schema: &str, name: &str) -> (String, String) {
        match name.split_once('.') {
            Some((s, t)) => (s.to_string(), format!("{}{}", self.prefix(), t)),
            None => (schema.to_string(), format!("{}{}", self.prefix(), name)),
        }
    }

    fn compile_table_exists(&self, schema: &str, name: &str) -> (String, Vec<Value>) {
        let (schema, table) = self.split_name(schema, name);
        let d = self.dialect();
        (
            format!(
                "SELECT table_name AS name FROM information_schema.tables WHERE table_schema = {} AND table_name = {}",
                d.placeholder(1),
                d.placeholder(2)
            ),
            vec![Value::Text(schema), Value::Text(table)],
        )
    }

    fn compile_get_tables(&self, schema: &str) -> (String, Vec<Value>) {
        (
            format!(
                "SELECT table_name AS name FROM information_schema.tables WHERE table_schema = {} AND table_type = 'BASE TABLE' ORDER BY table_name",
                self.dialect().placeholder(1)
            ),
            vec![Value::Text(schema.to_string())],
        )
    }

    fn compile_version(&self) -> String {
        "SELECT VERSION() AS version".to_string()
    }

    fn parse_version(&self, raw: &str) -> Result<Version> {
        Version::parse(self.driver(), raw)
    }

    /// Column listing aliased to the shared reader vocabulary.
    fn compile_column_listing(&self, schema: &str, name: &str) -> (String, Vec<Value>) {
        let (schema, table) = self.split_name(schema, name);
        let d = self.dialect();
        let sql = format!(
            "SELECT column_name AS column_name, ordinal_position AS ordinal, \
             column_default AS column_default, is_nullable AS is_nullable, \
             UPPER(data_type) AS data_type, UPPER(data_type) AS type_name, \
             character_maximum_length AS max_length, numeric_precision AS numeric_precision, \
             numeric_scale AS numeric_scale, datetime_precision AS datetime_precision, \
             character_set_name AS charset_name, collation_name AS collation_name \
             FROM information_schema.columns \
             WHERE table_schema = {} AND table_name = {} ORDER BY ordinal_position",
            d.placeholder(1),
            d.placeholder(2)
        );
        (sql, vec![Value::Text(schema), Value::Text(table)])
    }

    /// Index listing, one row per indexed column in key order.
    fn compile_index_listing(&self, schema: &str, name: &str) -> (String, Vec<Value>) {
        let (schema, table) = self.split_name(schema, name);
        let d = self.dialect();
        let sql = format!(
            "SELECT tc.constraint_name AS index_name, kcu.column_name AS column_name, 1 AS is_unique, \
             CASE WHEN tc.constraint_type = 'PRIMARY KEY' THEN 1 ELSE 0 END AS is_primary, \
             kcu.ordinal_position AS seq_in_index \
             FROM information_schema.table_constraints tc \
             JOIN information_schema.key_column_usage kcu \
             ON kcu.constraint_name = tc.constraint_name AND kcu.table_schema = tc.table_schema \
             AND kcu.table_name = tc.table_name \
             WHERE tc.table_schema = {} AND tc.table_name = {} \
             AND tc.constraint_type IN ('PRIMARY KEY', 'UNIQUE') \
             ORDER BY tc.constraint_name, kcu.ordinal_position",
            d.placeholder(1),
            d.placeholder(2)
        );
        (sql, vec![Value::Text(schema), Value::Text(table)])
    }

    /// Rebuild one column from a listing row.
    fn read_column(&self, row: &Row, table: &str) -> Column {
        let data_type = reflect::text(row, "data_type").unwrap_or_default();
        let type_name = reflect::text(row, "type_name").unwrap_or_else(|| data_type.clone());
        let native = NativeType::parse(&type_name);
        let column_type = self
            .flip_type(&type_name)
            .or_else(|| self.flip_type(&native.base))
            .or_else(|| self.flip_type(&data_type))
            .unwrap_or_else(|| ColumnType::Other(data_type.to_ascii_lowercase()));

        let mut column = Column::new(reflect::text(row, "column_name").unwrap_or_default(), column_type);
        column.table_name = table.to_string();
        column.nullable = reflect::flag(row, "is_nullable");
        column.default = reflect::text(row, "column_default").map(DefaultValue::Raw);
        column.position = reflect::number(row, "ordinal").map_or(0, |p| p as usize);
        column.unsigned = native.unsigned || reflect::flag(row, "is_unsigned");
        column.primary = reflect::flag(row, "is_primary");
        column.auto_increment = reflect::text(row, "extra").is_some_and(|e| {
            let e = e.to_ascii_lowercase();
            e.contains("auto_increment") || e.contains("identity")
        });
        if column.auto_increment {
            column.default = None;
        }
        column.charset = reflect::text(row, "charset_name");
        column.collation = reflect::text(row, "collation_name");
        column.datetime_precision = reflect::number(row, "datetime_precision");

        if column.column_type.is_decimal() {
            column.precision = reflect::number(row, "numeric_precision").or_else(|| native.arg(0));
            column.scale = reflect::number(row, "numeric_scale").or_else(|| native.arg(1));
        } else if column.column_type == ColumnType::Enum {
            column.options = native.args.clone();
        } else if !column.column_type.is_integer() {
            column.length = reflect::number(row, "max_length").or_else(|| native.arg(0));
        }

        if let Some(comment) = reflect::text(row, "column_comment") {
            match Column::type_from_comment(&comment) {
                Some((marked, rest)) => {
                    column.column_type = marked;
                    column.comment = rest;
                }
                None => column.comment = Some(comment),
            }
        }
        column.type_name = Some(type_name);
        column
    }

    /// Post-process reflected columns (user-defined types and the like).
    fn finish_columns(&self, _conn: &dyn Connection, _schema: &str, _columns: &mut [Column]) -> Result<()> {
        Ok(())
    }

    fn table_exists(&self, conn: &dyn Connection, schema: &str, name: &str) -> Result<bool> {
        let (sql, bindings) = self.compile_table_exists(schema, name);
        let (_, table) = self.split_name(schema, name);
        tracing::debug!(driver = self.driver(), sql = %sql, "Checking table");
        let rows = conn.query(&sql, &bindings)?;
        Ok(rows.iter().any(|row| {
            row.get(0)
                .and_then(Value::to_text)
                .is_some_and(|found| found == table)
        }))
    }

    fn get_tables(&self, conn: &dyn Connection, schema: &str) -> Result<Vec<String>> {
        let (sql, bindings) = self.compile_get_tables(schema);
        tracing::debug!(driver = self.driver(), sql = %sql, "Listing tables");
        let rows = conn.query(&sql, &bindings)?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get(0).and_then(Value::to_text))
            .collect())
    }

    fn get_version(&self, conn: &dyn Connection) -> Result<Version> {
        let sql = self.compile_version();
        let raw = conn
            .query_one(&sql, &[])?
            .and_then(|row| row.get(0).and_then(Value::to_text))
            .ok_or_else(|| Error::schema(SchemaErrorKind::Invalid, "Can't get the version"))?;
        self.parse_version(&raw)
    }

    fn get_column_listing(&self, conn: &dyn Connection, schema: &str, name: &str) -> Result<Vec<Column>> {
        let (sql, bindings) = self.compile_column_listing(schema, name);
        tracing::debug!(driver = self.driver(), sql = %sql, "Listing columns");
        let table = name.rsplit('.').next().unwrap_or(name);
        let mut columns: Vec<Column> = conn
            .query(&sql, &bindings)?
            .iter()
            .map(|row| self.read_column(row, table))
            .collect();
        let (schema, _) = self.split_name(schema, name);
        self.finish_columns(conn, &schema, &mut columns)?;
        Ok(columns)
    }

    fn get_index_listing(&self, conn: &dyn Connection, schema: &str, name: &str) -> Result<Vec<Index>> {
        let (sql, bindings) = self.compile_index_listing(schema, name);
        tracing::debug!(driver = self.driver(), sql = %sql, "Listing indexes");
        let table = name.rsplit('.').next().unwrap_or(name);
        let rows = conn.query(&sql, &bindings)?;
        Ok(reflect::group_indexes(&rows, table, &self.index_name(table, "")))
    }

    /// Reflect a table: existence check, column listing, index listing,
    /// then rebuild.
    fn get_table(&self, conn: &dyn Connection, schema: &str, name: &str) -> Result<Table> {
        if !self.table_exists(conn, schema, name)? {
            return Err(Error::schema(
                SchemaErrorKind::TableNotFound,
                format!("the table {} does not exists", name),
            ));
        }
        let columns = self.get_column_listing(conn, schema, name)?;
        let indexes = self.get_index_listing(conn, schema, name)?;
        let (schema, _) = self.split_name(schema, name);
        let table = name.rsplit('.').next().unwrap_or(name);
        Table::from_catalog(table, Some(schema), columns, indexes)
    }
}
