//! MySQL DDL: inline comments and keys, `ENUM(...)`, `MODIFY COLUMN`.

use dbal_core::{Config, Result, Value};
use dbal_query::{Grammar, MySql};

use super::{SchemaGrammar, join_parts};
use crate::column::{Column, ColumnType};
use crate::index::{Index, IndexType};
use crate::table::{CreateTableOptions, Table};

fn schema_filter(schema: &str) -> (String, Vec<Value>) {
    if schema.is_empty() {
        ("DATABASE()".to_string(), Vec::new())
    } else {
        ("?".to_string(), vec![Value::Text(schema.to_string())])
    }
}

impl SchemaGrammar for MySql {
    fn type_name(&self, column_type: &ColumnType) -> Option<&'static str> {
        Some(match column_type {
            ColumnType::String => "VARCHAR",
            ColumnType::Char => "CHAR",
            ColumnType::Text => "TEXT",
            ColumnType::MediumText => "MEDIUMTEXT",
            ColumnType::LongText => "LONGTEXT",
            ColumnType::TinyInteger => "TINYINT",
            ColumnType::SmallInteger => "SMALLINT",
            ColumnType::Integer => "INT",
            ColumnType::BigInteger => "BIGINT",
            ColumnType::Decimal => "DECIMAL",
            ColumnType::Float => "FLOAT",
            ColumnType::Double => "DOUBLE",
            ColumnType::Boolean => "TINYINT(1)",
            ColumnType::Date => "DATE",
            ColumnType::DateTime | ColumnType::DateTimeTz => "DATETIME",
            ColumnType::Time | ColumnType::TimeTz => "TIME",
            ColumnType::Timestamp | ColumnType::TimestampTz => "TIMESTAMP",
            ColumnType::Year => "YEAR",
            ColumnType::Binary => "BLOB",
            ColumnType::Json | ColumnType::Jsonb => "JSON",
            ColumnType::Uuid => "CHAR(36)",
            ColumnType::IpAddress => "VARCHAR(45)",
            ColumnType::MacAddress => "VARCHAR(17)",
            ColumnType::Enum => "ENUM",
            ColumnType::Vector | ColumnType::VectorF16 | ColumnType::HalfVector | ColumnType::Other(_) => {
                return None;
            }
        })
    }

    fn default_schema(&self, config: &Config) -> String {
        config.database.clone().unwrap_or_default()
    }

    fn takes_scale(&self, column_type: &ColumnType) -> bool {
        column_type.is_decimal()
    }

    fn enum_type(&self, column: &Column) -> String {
        let options: Vec<String> = column
            .options
            .iter()
            .map(|o| self.dialect().quote_string(o))
            .collect();
        format!("ENUM({})", options.join(","))
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }

    fn sql_add_column(&self, column: &Column) -> String {
        let numeric = column.column_type.is_integer() || column.column_type.is_decimal();
        join_parts([
            self.wrap_value(&column.name),
            self.column_type(column),
            if column.unsigned && numeric {
                "UNSIGNED".to_string()
            } else {
                String::new()
            },
            column
                .charset
                .as_ref()
                .map(|c| format!("CHARACTER SET {}", c))
                .unwrap_or_default(),
            self.sql_nullable(column),
            self.sql_default(column),
            if column.auto_increment {
                "AUTO_INCREMENT".to_string()
            } else {
                String::new()
            },
            column
                .comment
                .as_deref()
                .map(|c| format!("COMMENT {}", self.dialect().quote_string(c)))
                .unwrap_or_default(),
            column
                .collation
                .as_ref()
                .map(|c| format!("COLLATE {}", c))
                .unwrap_or_default(),
        ])
    }

    fn sql_add_comment(&self, _column: &Column) -> Option<String> {
        None
    }

    fn index_name(&self, _table: &str, index: &str) -> String {
        index.to_string()
    }

    fn sql_inline_index(&self, index: &Index) -> Option<String> {
        let keyword = match index.index_type {
            IndexType::Unique => "UNIQUE KEY",
            IndexType::Index => "KEY",
            IndexType::Primary => return None,
        };
        Some(format!(
            "{} {} ({})",
            keyword,
            self.wrap_value(&index.name),
            self.sql_index_columns(&index.columns)
        ))
    }

    fn create_table_options(&self, options: &CreateTableOptions) -> String {
        join_parts([
            options
                .engine
                .as_ref()
                .map(|e| format!("ENGINE {}", e))
                .unwrap_or_default(),
            options
                .charset
                .as_ref()
                .map(|c| format!("DEFAULT CHARSET {}", c))
                .unwrap_or_default(),
            options
                .collation
                .as_ref()
                .map(|c| format!("COLLATE={}", c))
                .unwrap_or_default(),
        ])
    }

    fn alter_modify_column(&self, table: &Table, column: &Column) -> Result<Vec<String>> {
        Ok(vec![format!(
            "{} MODIFY COLUMN {}",
            self.alter_prefix(table),
            self.sql_alter_column(column)
        )])
    }

    fn alter_drop_index(&self, table: &Table, name: &str) -> Result<Vec<String>> {
        Ok(vec![format!(
            "DROP INDEX {} ON {}",
            self.wrap_value(name),
            self.wrap_table(table.name())
        )])
    }

    fn alter_rename_index(&self, table: &Table, from: &str, to: &str) -> Result<Vec<String>> {
        Ok(vec![format!(
            "{} RENAME INDEX {} TO {}",
            self.alter_prefix(table),
            self.wrap_value(from),
            self.wrap_value(to)
        )])
    }

    fn alter_drop_primary(&self, table: &Table, _name: &str) -> Result<Vec<String>> {
        Ok(vec![format!("{} DROP PRIMARY KEY", self.alter_prefix(table))])
    }

    fn compile_rename_table(&self, from: &str, to: &str) -> String {
        format!(
            "RENAME TABLE {} TO {}",
            self.wrap_table(from),
            self.wrap_table(to)
        )
    }

    fn compile_table_exists(&self, schema: &str, name: &str) -> (String, Vec<Value>) {
        let (schema, table) = self.split_name(schema, name);
        let (filter, mut bindings) = schema_filter(&schema);
        bindings.push(Value::Text(table));
        (
            format!(
                "SELECT TABLE_NAME AS name FROM information_schema.TABLES WHERE TABLE_SCHEMA = {} AND TABLE_NAME = ?",
                filter
            ),
            bindings,
        )
    }

    fn compile_get_tables(&self, schema: &str) -> (String, Vec<Value>) {
        let (filter, bindings) = schema_filter(schema);
        (
            format!(
                "SELECT TABLE_NAME AS name FROM information_schema.TABLES WHERE TABLE_SCHEMA = {} AND TABLE_TYPE = 'BASE TABLE' ORDER BY TABLE_NAME",
                filter
            ),
            bindings,
        )
    }

    fn compile_column_listing(&self, schema: &str, name: &str) -> (String, Vec<Value>) {
        let (schema, table) = self.split_name(schema, name);
        let (filter, mut bindings) = schema_filter(&schema);
        bindings.push(Value::Text(table));
        let sql = format!(
            "SELECT COLUMN_NAME AS column_name, ORDINAL_POSITION AS ordinal, \
             COLUMN_DEFAULT AS column_default, IS_NULLABLE AS is_nullable, \
             UPPER(DATA_TYPE) AS data_type, COLUMN_TYPE AS type_name, \
             CHARACTER_MAXIMUM_LENGTH AS max_length, NUMERIC_PRECISION AS numeric_precision, \
             NUMERIC_SCALE AS numeric_scale, DATETIME_PRECISION AS datetime_precision, \
             CHARACTER_SET_NAME AS charset_name, COLLATION_NAME AS collation_name, \
             COLUMN_COMMENT AS column_comment, EXTRA AS extra, \
             CASE WHEN COLUMN_KEY = 'PRI' THEN 1 ELSE 0 END AS is_primary \
             FROM information_schema.COLUMNS \
             WHERE TABLE_SCHEMA = {} AND TABLE_NAME = ? ORDER BY ORDINAL_POSITION",
            filter
        );
        (sql, bindings)
    }

    fn compile_index_listing(&self, schema: &str, name: &str) -> (String, Vec<Value>) {
        let (schema, table) = self.split_name(schema, name);
        let (filter, mut bindings) = schema_filter(&schema);
        bindings.push(Value::Text(table));
        let sql = format!(
            "SELECT INDEX_NAME AS index_name, COLUMN_NAME AS column_name, \
             CASE WHEN NON_UNIQUE = 0 THEN 1 ELSE 0 END AS is_unique, \
             CASE WHEN INDEX_NAME = 'PRIMARY' THEN 1 ELSE 0 END AS is_primary, \
             SEQ_IN_INDEX AS seq_in_index, INDEX_COMMENT AS index_comment \
             FROM information_schema.STATISTICS \
             WHERE TABLE_SCHEMA = {} AND TABLE_NAME = ? ORDER BY INDEX_NAME, SEQ_IN_INDEX",
            filter
        );
        (sql, bindings)
    }
}
