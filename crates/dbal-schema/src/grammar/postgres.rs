//! PostgreSQL DDL.
//!
//! Enums become named types (`enum__<a>_eopt_<b>`) created idempotently
//! before the table; auto-increment columns use the `SERIAL` family.
//! Types Postgres has no counterpart for (`year`, `ipAddress`) are stored
//! as integers with a `T:<type>|` marker in the column comment, which
//! reflection reads back; `vector` columns carry the marker too.
//! Vector indexes use the pgvecto.rs `vectors` method (pgvector `hnsw` for
//! `halfvec`) with cosine operator classes.

use dbal_core::{Config, Connection, Result, Value};
use dbal_query::{Grammar, Postgres};

use super::{SchemaGrammar, join_parts};
use crate::column::{Column, ColumnType};
use crate::index::{Index, IndexType};
use crate::table::Table;

const ENUM_PREFIX: &str = "enum__";
const ENUM_SEPARATOR: &str = "_eopt_";

/// HNSW build options for the pgvecto.rs `vectors` index method.
const VECTORS_HNSW: &str = "[indexing.hnsw]\nm = 16\nef_construction = 200";

const FLIP: &[(&str, ColumnType)] = &[
    ("SMALLINT", ColumnType::SmallInteger),
    ("INT2", ColumnType::SmallInteger),
    ("INT4", ColumnType::Integer),
    ("INT8", ColumnType::BigInteger),
    ("FLOAT4", ColumnType::Float),
    ("FLOAT8", ColumnType::Double),
    ("NUMERIC", ColumnType::Decimal),
    ("BOOL", ColumnType::Boolean),
    ("TIMESTAMP", ColumnType::Timestamp),
    ("TIMESTAMPTZ", ColumnType::TimestampTz),
    ("TIMETZ", ColumnType::TimeTz),
    ("BPCHAR", ColumnType::Char),
    ("CHARACTER VARYING", ColumnType::String),
];

fn enum_name(column: &Column) -> String {
    format!("{}{}", ENUM_PREFIX, column.options.join(ENUM_SEPARATOR))
}

fn serial_type(column: &Column) -> &'static str {
    match column.column_type {
        ColumnType::BigInteger => "BIGSERIAL",
        ColumnType::TinyInteger | ColumnType::SmallInteger => "SMALLSERIAL",
        _ => "SERIAL",
    }
}

/// Comment text including the type marker for emulated types.
fn stored_comment(column: &Column) -> Option<String> {
    match column.column_type {
        ColumnType::Year | ColumnType::IpAddress | ColumnType::Vector => Some(format!(
            "T:{}|{}",
            column.column_type,
            column.comment.as_deref().unwrap_or_default()
        )),
        _ => column.comment.clone().filter(|c| !c.is_empty()),
    }
}

/// Parse `{a,b,"c d"}` as returned by `enum_range(...)::text`.
fn parse_enum_range(raw: &str) -> Vec<String> {
    raw.trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .split(',')
        .map(|o| o.trim().trim_matches('"').to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

/// Cosine-distance ANN index on one embedding column.
fn vector_index(grammar: &Postgres, table: &Table, index: &Index, column: &Column) -> String {
    let (method, ops) = match column.column_type {
        ColumnType::VectorF16 => ("vectors", "vecf16_cos_ops"),
        ColumnType::HalfVector => ("hnsw", "halfvec_cosine_ops"),
        _ => ("vectors", "vector_cos_ops"),
    };
    let mut sql = format!(
        "CREATE INDEX {} ON {} USING {} ({} {})",
        grammar.wrap_value(&grammar.index_name(table.name(), &index.name)),
        grammar.wrap_table(table.name()),
        method,
        grammar.wrap_value(&column.name),
        ops
    );
    if method == "vectors" {
        sql.push_str(&format!(
            " WITH (options={})",
            grammar.dialect().quote_string(VECTORS_HNSW)
        ));
    }
    sql
}

impl SchemaGrammar for Postgres {
    fn type_name(&self, column_type: &ColumnType) -> Option<&'static str> {
        Some(match column_type {
            ColumnType::String => "VARCHAR",
            ColumnType::Char => "CHAR",
            ColumnType::Text | ColumnType::MediumText | ColumnType::LongText => "TEXT",
            ColumnType::TinyInteger | ColumnType::SmallInteger | ColumnType::Year => "SMALLINT",
            ColumnType::Integer | ColumnType::IpAddress => "INTEGER",
            ColumnType::BigInteger => "BIGINT",
            ColumnType::Decimal => "DECIMAL",
            ColumnType::Float => "REAL",
            ColumnType::Double => "DOUBLE PRECISION",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Date => "DATE",
            ColumnType::DateTime | ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::DateTimeTz | ColumnType::TimestampTz => "TIMESTAMPTZ",
            ColumnType::Time => "TIME",
            ColumnType::TimeTz => "TIMETZ",
            ColumnType::Binary => "BYTEA",
            ColumnType::Json => "JSON",
            ColumnType::Jsonb => "JSONB",
            ColumnType::Uuid => "UUID",
            ColumnType::MacAddress => "MACADDR",
            ColumnType::Vector => "VECTOR",
            ColumnType::VectorF16 => "VECF16",
            ColumnType::HalfVector => "HALFVEC",
            ColumnType::Enum | ColumnType::Other(_) => return None,
        })
    }

    fn flip_overrides(&self) -> &[(&'static str, ColumnType)] {
        FLIP
    }

    fn default_schema(&self, config: &Config) -> String {
        config.schema.clone().unwrap_or_else(|| "public".to_string())
    }

    fn enum_type(&self, column: &Column) -> String {
        enum_name(column)
    }

    fn sql_enum_check(&self, _column: &Column) -> String {
        String::new()
    }

    fn sql_add_column(&self, column: &Column) -> String {
        if column.auto_increment {
            return join_parts([
                self.wrap_value(&column.name),
                serial_type(column).to_string(),
            ]);
        }
        join_parts([
            self.wrap_value(&column.name),
            self.column_type(column),
            self.sql_nullable(column),
            self.sql_default(column),
            column
                .collation
                .as_ref()
                .map(|c| format!("COLLATE {}", self.wrap_value(c)))
                .unwrap_or_default(),
        ])
    }

    fn sql_add_comment(&self, column: &Column) -> Option<String> {
        let comment = stored_comment(column)?;
        Some(format!(
            "COMMENT ON COLUMN {}.{} IS {}",
            self.wrap_table(&column.table_name),
            self.wrap_value(&column.name),
            self.dialect().quote_string(&comment)
        ))
    }

    /// JSON columns have no default btree operator class; such indexes are skipped.
    fn sql_add_index(&self, table: &Table, index: &Index) -> Option<String> {
        if index.index_type == IndexType::Primary {
            return None;
        }
        let has_json = index
            .columns
            .iter()
            .filter_map(|c| table.column(c))
            .any(|c| c.column_type.is_json());
        if has_json {
            tracing::debug!(table = table.name(), index = %index.name, "Skipping index on JSON column");
            return None;
        }
        let mut vectors = index
            .columns
            .iter()
            .filter_map(|c| table.column(c))
            .filter(|c| c.column_type.is_vector());
        if let Some(column) = vectors.next() {
            if vectors.next().is_some() {
                tracing::warn!(table = table.name(), index = %index.name, "Vector index covers only its first vector column");
            }
            return Some(vector_index(self, table, index, column));
        }
        Some(format!(
            "CREATE {} {} ON {} ({})",
            self.index_type_name(index.index_type),
            self.wrap_value(&self.index_name(table.name(), &index.name)),
            self.wrap_table(table.name()),
            self.sql_index_columns(&index.columns)
        ))
    }

    fn sql_create_types(&self, columns: &[&Column]) -> Vec<String> {
        columns
            .iter()
            .filter(|c| c.column_type == ColumnType::Enum && !c.options.is_empty())
            .map(|c| {
                let options: Vec<String> = c
                    .options
                    .iter()
                    .map(|o| self.dialect().quote_string(o))
                    .collect();
                format!(
                    "DO $$ BEGIN CREATE TYPE {} AS ENUM ({}); EXCEPTION WHEN duplicate_object THEN null; END $$;",
                    enum_name(c),
                    options.join(",")
                )
            })
            .collect()
    }

    fn alter_modify_column(&self, table: &Table, column: &Column) -> Result<Vec<String>> {
        let alter = format!(
            "{} ALTER COLUMN {}",
            self.alter_prefix(table),
            self.wrap_value(&column.name)
        );
        let typ = self.column_type(column);
        let mut statements = self.sql_create_types(&[column]);
        statements.push(format!(
            "{} TYPE {} USING ({}::{})",
            alter,
            typ,
            self.wrap_value(&column.name),
            typ
        ));
        statements.push(if column.nullable {
            format!("{} DROP NOT NULL", alter)
        } else {
            format!("{} SET NOT NULL", alter)
        });
        let default = self.sql_default(column);
        statements.push(if default.is_empty() {
            format!("{} DROP DEFAULT", alter)
        } else {
            format!("{} SET {}", alter, default)
        });
        statements.extend(self.sql_add_comment(column));
        Ok(statements)
    }

    fn alter_drop_primary(&self, table: &Table, name: &str) -> Result<Vec<String>> {
        let name = if name == "PRIMARY" {
            format!("{}{}_pkey", self.prefix(), table.name())
        } else {
            name.to_string()
        };
        Ok(vec![format!(
            "{} DROP CONSTRAINT {}",
            self.alter_prefix(table),
            self.wrap_value(&name)
        )])
    }

    fn compile_version(&self) -> String {
        "SHOW server_version".to_string()
    }

    fn compile_column_listing(&self, schema: &str, name: &str) -> (String, Vec<Value>) {
        let (schema, table) = self.split_name(schema, name);
        let sql = "SELECT c.column_name AS column_name, c.ordinal_position AS ordinal, \
             c.column_default AS column_default, c.is_nullable AS is_nullable, \
             UPPER(c.data_type) AS data_type, \
             UPPER(CASE WHEN c.udt_name IN ('vector', 'vecf16', 'halfvec') \
             THEN format_type(a.atttypid, a.atttypmod) ELSE c.udt_name END) AS type_name, \
             c.character_maximum_length AS max_length, c.numeric_precision AS numeric_precision, \
             c.numeric_scale AS numeric_scale, c.datetime_precision AS datetime_precision, \
             c.collation_name AS collation_name, \
             col_description((quote_ident(c.table_schema) || '.' || quote_ident(c.table_name))::regclass::oid, c.ordinal_position) AS column_comment, \
             CASE WHEN c.column_default LIKE 'nextval(%' THEN 'auto_increment' ELSE '' END AS extra \
             FROM information_schema.columns c \
             JOIN pg_attribute a ON a.attrelid = (quote_ident(c.table_schema) || '.' || quote_ident(c.table_name))::regclass \
             AND a.attname = c.column_name \
             WHERE c.table_schema = $1 AND c.table_name = $2 ORDER BY c.ordinal_position"
            .to_string();
        (sql, vec![Value::Text(schema), Value::Text(table)])
    }

    fn compile_index_listing(&self, schema: &str, name: &str) -> (String, Vec<Value>) {
        let (schema, table) = self.split_name(schema, name);
        let sql = "SELECT ic.relname AS index_name, a.attname AS column_name, \
             ix.indisunique AS is_unique, ix.indisprimary AS is_primary, k.ord AS seq_in_index \
             FROM pg_index ix \
             JOIN pg_class tc ON tc.oid = ix.indrelid \
             JOIN pg_namespace n ON n.oid = tc.relnamespace \
             JOIN pg_class ic ON ic.oid = ix.indexrelid \
             CROSS JOIN LATERAL unnest(ix.indkey) WITH ORDINALITY AS k(attnum, ord) \
             JOIN pg_attribute a ON a.attrelid = tc.oid AND a.attnum = k.attnum \
             WHERE n.nspname = $1 AND tc.relname = $2 \
             ORDER BY ic.relname, k.ord"
            .to_string();
        (sql, vec![Value::Text(schema), Value::Text(table)])
    }

    /// Resolve `enum__*` user-defined columns to enums with their labels.
    fn finish_columns(&self, conn: &dyn Connection, schema: &str, columns: &mut [Column]) -> Result<()> {
        for column in columns.iter_mut() {
            let Some(type_name) = column.type_name.clone() else {
                continue;
            };
            if !type_name.to_ascii_lowercase().starts_with(ENUM_PREFIX) {
                continue;
            }
            let sql = format!(
                "SELECT enum_range(NULL::{}.{})::text AS options",
                self.wrap_value(schema),
                self.wrap_value(&type_name.to_ascii_lowercase())
            );
            tracing::debug!(column = %column.name, sql = %sql, "Reading enum labels");
            let raw = conn
                .query_one(&sql, &[])?
                .and_then(|row| row.get(0).and_then(Value::to_text))
                .unwrap_or_default();
            column.column_type = ColumnType::Enum;
            column.options = parse_enum_range(&raw);
            column.length = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::testing::{Recorder, row};
    use crate::table::CreateTableOptions;
    use dbal_core::{Dialect, SchemaErrorKind};

    fn orders() -> Table {
        let mut t = Table::new("orders");
        t.id("id");
        t.enum_("status", &["open", "paid"]).default("open");
        t.jsonb("payload").nullable();
        t.year("fiscal_year").comment("booking year");
        t.create_index("payload", &["payload"]);
        t.create_index("status_year", &["status", "fiscal_year"]);
        t
    }

    // ==================== create ====================

    #[test]
    fn test_create_table() {
        let statements = Postgres::with_prefix("shop_").compile_create_table(&orders(), &CreateTableOptions::default());
        assert_eq!(
            statements,
            vec![
                "DO $$ BEGIN CREATE TYPE enum__open_eopt_paid AS ENUM ('open','paid'); EXCEPTION WHEN duplicate_object THEN null; END $$;",
                "CREATE TABLE \"shop_orders\" (\n  \
                 \"id\" BIGSERIAL,\n  \
                 \"status\" enum__open_eopt_paid NOT NULL DEFAULT 'open',\n  \
                 \"payload\" JSONB NULL,\n  \
                 \"fiscal_year\" SMALLINT NOT NULL,\n  \
                 PRIMARY KEY (\"id\")\n)",
                "CREATE INDEX \"shop_orders_status_year\" ON \"shop_orders\" (\"status\",\"fiscal_year\")",
                "COMMENT ON COLUMN \"shop_orders\".\"fiscal_year\" IS 'T:year|booking year'",
            ]
        );
    }

    // ==================== alter ====================

    #[test]
    fn test_modify_column() {
        let mut t = orders();
        t.take_commands();
        t.string("status", 20).default("open");
        let conn = Recorder::new(Dialect::Postgres);
        Postgres::default().alter_table(&conn, &mut t).unwrap();
        assert_eq!(
            conn.statements(),
            vec![
                "ALTER TABLE \"orders\" ALTER COLUMN \"status\" TYPE VARCHAR(20) USING (\"status\"::VARCHAR(20))",
                "ALTER TABLE \"orders\" ALTER COLUMN \"status\" SET NOT NULL",
                "ALTER TABLE \"orders\" ALTER COLUMN \"status\" SET DEFAULT 'open'",
            ]
        );
    }

    #[test]
    fn test_primary_and_index_changes() {
        let mut t = orders();
        t.take_commands();
        t.drop_primary();
        t.rename_index("status_year", "by_status");
        t.drop_index(&["by_status"]);
        let conn = Recorder::new(Dialect::Postgres);
        Postgres::default().alter_table(&conn, &mut t).unwrap();
        assert_eq!(
            conn.statements(),
            vec![
                "ALTER TABLE \"orders\" DROP CONSTRAINT \"orders_pkey\"",
                "ALTER INDEX \"orders_status_year\" RENAME TO \"orders_by_status\"",
                "DROP INDEX \"orders_by_status\"",
            ]
        );
    }

    // ==================== reflection ====================

    #[test]
    fn test_parse_enum_range() {
        assert_eq!(parse_enum_range("{open,paid,\"on hold\"}"), vec!["open", "paid", "on hold"]);
        assert!(parse_enum_range("{}").is_empty());
    }

    #[test]
    fn test_reflect_table() {
        let conn = Recorder::new(Dialect::Postgres)
            .answer("information_schema.tables", vec![row(&[("name", Value::from("orders"))])])
            .answer(
                "information_schema.columns",
                vec![
                    row(&[
                        ("column_name", Value::from("id")),
                        ("ordinal", Value::Int(1)),
                        ("column_default", Value::from("nextval('orders_id_seq'::regclass)")),
                        ("is_nullable", Value::from("NO")),
                        ("data_type", Value::from("BIGINT")),
                        ("type_name", Value::from("INT8")),
                        ("extra", Value::from("auto_increment")),
                    ]),
                    row(&[
                        ("column_name", Value::from("status")),
                        ("ordinal", Value::Int(2)),
                        ("is_nullable", Value::from("NO")),
                        ("data_type", Value::from("USER-DEFINED")),
                        ("type_name", Value::from("ENUM__OPEN_EOPT_PAID")),
                    ]),
                    row(&[
                        ("column_name", Value::from("fiscal_year")),
                        ("ordinal", Value::Int(3)),
                        ("is_nullable", Value::from("NO")),
                        ("data_type", Value::from("SMALLINT")),
                        ("type_name", Value::from("INT2")),
                        ("column_comment", Value::from("T:year|booking year")),
                    ]),
                ],
            )
            .answer("enum_range", vec![row(&[("options", Value::from("{open,paid}"))])])
            .answer(
                "pg_index",
                vec![row(&[
                    ("index_name", Value::from("orders_pkey")),
                    ("column_name", Value::from("id")),
                    ("is_unique", Value::Bool(true)),
                    ("is_primary", Value::Bool(true)),
                ])],
            );

        let t = Postgres::default().get_table(&conn, "public", "orders").unwrap();
        let id = t.column("id").unwrap();
        assert_eq!(id.column_type, ColumnType::BigInteger);
        assert!(id.auto_increment && id.primary);
        assert_eq!(id.default, None);

        let status = t.column("status").unwrap();
        assert_eq!(status.column_type, ColumnType::Enum);
        assert_eq!(status.options, vec!["open", "paid"]);

        let year = t.column("fiscal_year").unwrap();
        assert_eq!(year.column_type, ColumnType::Year);
        assert_eq!(year.comment.as_deref(), Some("booking year"));

        assert_eq!(t.primary().unwrap().name, "orders_pkey");
    }

    // ==================== vectors ====================

    fn documents() -> Table {
        let mut t = Table::new("documents");
        t.id("id");
        t.vector("embedding", 1536).comment("openai");
        t.vecf16("sketch", 256).nullable();
        t.halfvec("summary", 768).nullable();
        t.create_index("embedding", &["embedding"]);
        t.create_index("sketch", &["sketch"]);
        t.create_index("summary", &["summary"]);
        t
    }

    #[test]
    fn test_create_vector_columns_and_indexes() {
        let statements = Postgres::default().compile_create_table(&documents(), &CreateTableOptions::default());
        assert_eq!(
            statements,
            vec![
                "CREATE TABLE \"documents\" (\n  \
                 \"id\" BIGSERIAL,\n  \
                 \"embedding\" VECTOR(1536) NOT NULL,\n  \
                 \"sketch\" VECF16(256) NULL,\n  \
                 \"summary\" HALFVEC(768) NULL,\n  \
                 PRIMARY KEY (\"id\")\n)",
                "CREATE INDEX \"documents_embedding\" ON \"documents\" USING vectors (\"embedding\" vector_cos_ops) \
                 WITH (options='[indexing.hnsw]\nm = 16\nef_construction = 200')",
                "CREATE INDEX \"documents_sketch\" ON \"documents\" USING vectors (\"sketch\" vecf16_cos_ops) \
                 WITH (options='[indexing.hnsw]\nm = 16\nef_construction = 200')",
                "CREATE INDEX \"documents_summary\" ON \"documents\" USING hnsw (\"summary\" halfvec_cosine_ops)",
                "COMMENT ON COLUMN \"documents\".\"embedding\" IS 'T:vector|openai'",
            ]
        );
    }

    #[test]
    fn test_reflect_vector_columns() {
        let conn = Recorder::new(Dialect::Postgres)
            .answer("information_schema.tables", vec![row(&[("name", Value::from("documents"))])])
            .answer(
                "information_schema.columns",
                vec![
                    row(&[
                        ("column_name", Value::from("embedding")),
                        ("ordinal", Value::Int(1)),
                        ("is_nullable", Value::from("NO")),
                        ("data_type", Value::from("USER-DEFINED")),
                        ("type_name", Value::from("VECTOR(1536)")),
                        ("column_comment", Value::from("T:vector|openai")),
                    ]),
                    row(&[
                        ("column_name", Value::from("summary")),
                        ("ordinal", Value::Int(2)),
                        ("is_nullable", Value::from("YES")),
                        ("data_type", Value::from("USER-DEFINED")),
                        ("type_name", Value::from("HALFVEC(768)")),
                    ]),
                ],
            );

        let t = Postgres::default().get_table(&conn, "public", "documents").unwrap();
        let embedding = t.column("embedding").unwrap();
        assert_eq!(embedding.column_type, ColumnType::Vector);
        assert_eq!(embedding.length, Some(1536));
        assert_eq!(embedding.comment.as_deref(), Some("openai"));
        let summary = t.column("summary").unwrap();
        assert_eq!((summary.column_type.clone(), summary.length), (ColumnType::HalfVector, Some(768)));
        assert!(summary.nullable);
        assert_eq!(Postgres::default().column_type(summary), "HALFVEC(768)");
    }

    #[test]
    fn test_version_failure() {
        let conn = Recorder::new(Dialect::Postgres);
        let err = Postgres::default().get_version(&conn).unwrap_err();
        assert_eq!(err.schema_kind(), Some(SchemaErrorKind::Invalid));

        let conn = Recorder::new(Dialect::Postgres)
            .answer("server_version", vec![row(&[("server_version", Value::from("14.2 (Debian 14.2-1.pgdg110+1)"))])]);
        let version = Postgres::default().get_version(&conn).unwrap();
        assert_eq!((version.major, version.minor), (14, 2));
    }
}
