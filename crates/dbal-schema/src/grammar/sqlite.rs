//! SQLite DDL.
//!
//! SQLite cannot alter a column, rename an index or change the primary
//! key in place; those commands fail with `Unsupported`.

use dbal_core::{Config, Result, Value};
use dbal_query::{Grammar, Sqlite};

use super::{SchemaGrammar, join_parts, unsupported};
use crate::column::{Column, ColumnType};
use crate::index::Primary;
use crate::table::Table;

impl SchemaGrammar for Sqlite {
    fn type_name(&self, column_type: &ColumnType) -> Option<&'static str> {
        Some(match column_type {
            ColumnType::String => "VARCHAR",
            ColumnType::Char => "CHAR",
            ColumnType::Text
            | ColumnType::MediumText
            | ColumnType::LongText
            | ColumnType::Json
            | ColumnType::Jsonb
            | ColumnType::Enum => "TEXT",
            ColumnType::TinyInteger => "TINYINT",
            ColumnType::SmallInteger => "SMALLINT",
            ColumnType::Integer | ColumnType::Year => "INTEGER",
            ColumnType::BigInteger => "BIGINT",
            ColumnType::Decimal => "DECIMAL",
            ColumnType::Float => "FLOAT",
            ColumnType::Double => "DOUBLE",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Date => "DATE",
            ColumnType::DateTime | ColumnType::DateTimeTz => "DATETIME",
            ColumnType::Time | ColumnType::TimeTz => "TIME",
            ColumnType::Timestamp | ColumnType::TimestampTz => "TIMESTAMP",
            ColumnType::Binary => "BLOB",
            ColumnType::Uuid => "CHAR(36)",
            ColumnType::IpAddress => "VARCHAR(45)",
            ColumnType::MacAddress => "VARCHAR(17)",
            ColumnType::Vector | ColumnType::VectorF16 | ColumnType::HalfVector | ColumnType::Other(_) => {
                return None;
            }
        })
    }

    fn default_schema(&self, _config: &Config) -> String {
        "main".to_string()
    }

    fn enum_type(&self, _column: &Column) -> String {
        "TEXT".to_string()
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }

    fn sql_add_column(&self, column: &Column) -> String {
        if column.auto_increment {
            return format!(
                "{} INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL",
                self.wrap_value(&column.name)
            );
        }
        join_parts([
            self.wrap_value(&column.name),
            self.column_type(column),
            self.sql_nullable(column),
            self.sql_default(column),
            column
                .collation
                .as_ref()
                .map(|c| format!("COLLATE {}", c))
                .unwrap_or_default(),
            self.sql_enum_check(column),
        ])
    }

    fn sql_add_comment(&self, _column: &Column) -> Option<String> {
        None
    }

    /// The key is already declared inline on a lone auto-increment column.
    fn sql_table_primary(&self, table: &Table, primary: &Primary) -> Option<String> {
        if let [only] = primary.columns.as_slice() {
            if table.column(only).is_some_and(|c| c.auto_increment) {
                return None;
            }
        }
        Some(self.sql_add_primary(primary))
    }

    fn alter_modify_column(&self, _table: &Table, _column: &Column) -> Result<Vec<String>> {
        Err(unsupported("sqlite3", "modifying columns"))
    }

    fn alter_rename_index(&self, _table: &Table, _from: &str, _to: &str) -> Result<Vec<String>> {
        Err(unsupported("sqlite3", "renaming indexes"))
    }

    fn alter_create_primary(&self, _table: &Table, _primary: &Primary) -> Result<Vec<String>> {
        Err(unsupported("sqlite3", "adding a primary key"))
    }

    fn alter_drop_primary(&self, _table: &Table, _name: &str) -> Result<Vec<String>> {
        Err(unsupported("sqlite3", "dropping the primary key"))
    }

    fn compile_table_exists(&self, schema: &str, name: &str) -> (String, Vec<Value>) {
        let (_, table) = self.split_name(schema, name);
        (
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?".to_string(),
            vec![Value::Text(table)],
        )
    }

    fn compile_get_tables(&self, _schema: &str) -> (String, Vec<Value>) {
        (
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name"
                .to_string(),
            Vec::new(),
        )
    }

    fn compile_version(&self) -> String {
        "SELECT sqlite_version() AS version".to_string()
    }

    fn compile_column_listing(&self, schema: &str, name: &str) -> (String, Vec<Value>) {
        let (_, table) = self.split_name(schema, name);
        let sql = "SELECT name AS column_name, cid + 1 AS ordinal, dflt_value AS column_default, \
             CASE WHEN \"notnull\" = 0 THEN 'YES' ELSE 'NO' END AS is_nullable, \
             UPPER(type) AS data_type, UPPER(type) AS type_name, pk AS is_primary, \
             CASE WHEN pk > 0 AND (SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?) \
             LIKE '%AUTOINCREMENT%' THEN 'auto_increment' ELSE '' END AS extra \
             FROM pragma_table_info(?) ORDER BY cid"
            .to_string();
        (sql, vec![Value::Text(table.clone()), Value::Text(table)])
    }

    fn compile_index_listing(&self, schema: &str, name: &str) -> (String, Vec<Value>) {
        let (_, table) = self.split_name(schema, name);
        let sql = "SELECT il.name AS index_name, ii.name AS column_name, il.\"unique\" AS is_unique, \
             CASE WHEN il.origin = 'pk' THEN 1 ELSE 0 END AS is_primary, ii.seqno AS seq_in_index \
             FROM pragma_index_list(?) AS il JOIN pragma_index_info(il.name) AS ii \
             ORDER BY il.seq, ii.seqno"
            .to_string();
        (sql, vec![Value::Text(table)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::testing::{Recorder, row};
    use crate::table::CreateTableOptions;
    use dbal_core::{Dialect, SchemaErrorKind};

    // ==================== create ====================

    #[test]
    fn test_create_table_inlines_autoincrement() {
        let mut t = Table::new("tags");
        t.id("id");
        t.string("label", 32).unique();
        t.boolean("pinned").default(true);
        t.enum_("kind", &["topic", "person"]).nullable();
        let statements = Sqlite::default().compile_create_table(&t, &CreateTableOptions::default());
        assert_eq!(
            statements,
            vec![
                "CREATE TABLE `tags` (\n  \
                 `id` INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,\n  \
                 `label` VARCHAR(32) NOT NULL,\n  \
                 `pinned` BOOLEAN NOT NULL DEFAULT 1,\n  \
                 `kind` TEXT NULL CHECK (`kind` IN ('topic','person'))\n)",
                "CREATE UNIQUE INDEX `tags_label` ON `tags` (`label`)",
            ]
        );
    }

    #[test]
    fn test_composite_primary_is_kept() {
        let mut t = Table::new("post_tag");
        t.integer("post_id");
        t.integer("tag_id");
        t.create_primary(&["post_id", "tag_id"]);
        let statements = Sqlite::default().compile_create_table(&t, &CreateTableOptions::default());
        assert!(statements[0].ends_with("PRIMARY KEY (`post_id`,`tag_id`)\n)"));
    }

    // ==================== alter ====================

    #[test]
    fn test_unsupported_commands_fail_individually() {
        let mut t = Table::new("tags");
        t.string("label", 64);
        t.take_commands();
        t.string("label", 128);
        t.text("notes").nullable();
        let conn = Recorder::new(Dialect::Sqlite);
        let err = Sqlite::default().alter_table(&conn, &mut t).unwrap_err();
        assert_eq!(err.schema_kind(), Some(SchemaErrorKind::Composite));
        assert!(err.to_string().contains("does not support modifying columns"));
        assert_eq!(
            conn.statements(),
            vec!["ALTER TABLE `tags` ADD COLUMN `notes` TEXT NULL"]
        );
    }

    // ==================== catalog ====================

    #[test]
    fn test_reflect_autoincrement_primary() {
        let conn = Recorder::new(Dialect::Sqlite)
            .answer("SELECT name FROM sqlite_master", vec![row(&[("name", Value::from("tags"))])])
            .answer(
                "pragma_table_info",
                vec![
                    row(&[
                        ("column_name", Value::from("id")),
                        ("ordinal", Value::Int(1)),
                        ("is_nullable", Value::from("NO")),
                        ("data_type", Value::from("INTEGER")),
                        ("type_name", Value::from("INTEGER")),
                        ("is_primary", Value::Int(1)),
                        ("extra", Value::from("auto_increment")),
                    ]),
                    row(&[
                        ("column_name", Value::from("label")),
                        ("ordinal", Value::Int(2)),
                        ("is_nullable", Value::from("NO")),
                        ("data_type", Value::from("VARCHAR(32)")),
                        ("type_name", Value::from("VARCHAR(32)")),
                        ("is_primary", Value::Int(0)),
                    ]),
                ],
            )
            .answer(
                "pragma_index_list",
                vec![row(&[
                    ("index_name", Value::from("tags_label")),
                    ("column_name", Value::from("label")),
                    ("is_unique", Value::Int(1)),
                    ("is_primary", Value::Int(0)),
                ])],
            );

        let t = Sqlite::default().get_table(&conn, "main", "tags").unwrap();
        assert_eq!(t.primary().unwrap().columns, vec!["id"]);
        assert!(t.column("id").unwrap().auto_increment);
        assert_eq!(t.column("label").unwrap().length, Some(32));
        assert!(t.has_index(&["label"]));
    }

    #[test]
    fn test_version_query() {
        assert_eq!(Sqlite::default().compile_version(), "SELECT sqlite_version() AS version");
    }
}
