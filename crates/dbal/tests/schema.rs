//! Schema changes through a `Db` handle.

mod common;

use common::{Recorder, db, db_with, row};
use dbal::{ColumnType, Config, CreateTableOptions, Dialect, SchemaErrorKind, Value};

fn tags_listing(conn: Recorder) -> Recorder {
    conn.answer("information_schema.TABLES", vec![row(&[("name", Value::from("tags"))])])
        .answer(
            "information_schema.COLUMNS",
            vec![
                row(&[
                    ("column_name", Value::from("id")),
                    ("ordinal", Value::Int(1)),
                    ("is_nullable", Value::from("NO")),
                    ("data_type", Value::from("INT")),
                    ("type_name", Value::from("int unsigned")),
                    ("extra", Value::from("auto_increment")),
                ]),
                row(&[
                    ("column_name", Value::from("label")),
                    ("ordinal", Value::Int(2)),
                    ("is_nullable", Value::from("NO")),
                    ("data_type", Value::from("VARCHAR")),
                    ("type_name", Value::from("varchar(32)")),
                    ("max_length", Value::Int(32)),
                ]),
            ],
        )
        .answer(
            "information_schema.STATISTICS",
            vec![row(&[
                ("index_name", Value::from("PRIMARY")),
                ("column_name", Value::from("id")),
                ("is_unique", Value::Int(1)),
                ("is_primary", Value::Int(1)),
            ])],
        )
}

// ==================== Create ====================

#[test]
fn test_create_table_with_options() {
    let (my, conn) = db_with(
        Config::new("mysql", "test").database("blog"),
        Recorder::new(Dialect::MySql),
    );
    let schema = my.schema();
    assert_eq!(schema.schema_name(), "blog");
    schema
        .create_table_with(
            "tags",
            &CreateTableOptions::new().engine("InnoDB").charset("utf8mb4"),
            |t| {
                t.increments("id").primary();
                t.string("label", 32);
            },
        )
        .unwrap();
    assert_eq!(
        conn.statements(),
        vec![
            "CREATE TABLE `tags` (\n  \
             `id` INT UNSIGNED NOT NULL AUTO_INCREMENT,\n  \
             `label` VARCHAR(32) NOT NULL,\n  \
             PRIMARY KEY (`id`)\n) ENGINE InnoDB DEFAULT CHARSET utf8mb4"
        ]
    );
}

#[test]
fn test_create_table_sqlite() {
    let (lite, conn) = db("sqlite3", Recorder::new(Dialect::Sqlite));
    lite.schema()
        .create_table("tags", |t| {
            t.id("id");
            t.string("label", 32).unique();
            t.boolean("pinned").default(true);
        })
        .unwrap();
    assert_eq!(
        conn.statements(),
        vec![
            "CREATE TABLE `tags` (\n  \
             `id` INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,\n  \
             `label` VARCHAR(32) NOT NULL,\n  \
             `pinned` BOOLEAN NOT NULL DEFAULT 1\n)",
            "CREATE UNIQUE INDEX `tags_label` ON `tags` (`label`)",
        ]
    );
}

// ==================== Reflect / Alter ====================

#[test]
fn test_get_table_reflects_structure() {
    let (my, _) = db_with(
        Config::new("mysql", "test").database("blog"),
        tags_listing(Recorder::new(Dialect::MySql)),
    );
    let table = my.schema().get_table("tags").unwrap();
    let id = table.column("id").unwrap();
    assert!(id.auto_increment && id.primary);
    assert_eq!(table.column("label").unwrap().column_type, ColumnType::String);
    assert_eq!(table.column("label").unwrap().length, Some(32));
    assert_eq!(table.primary().unwrap().columns, vec!["id"]);
}

#[test]
fn test_alter_table_replays_commands() {
    let (my, conn) = db_with(
        Config::new("mysql", "test").database("blog"),
        tags_listing(Recorder::new(Dialect::MySql)),
    );
    my.schema()
        .alter_table("tags", |t| {
            t.string("label", 64);
            t.text("notes").nullable();
            t.rename_column("label", "title");
        })
        .unwrap();
    assert_eq!(
        conn.statements(),
        vec![
            "ALTER TABLE `tags` MODIFY COLUMN `label` VARCHAR(64) NOT NULL",
            "ALTER TABLE `tags` ADD COLUMN `notes` TEXT NULL",
            "ALTER TABLE `tags` RENAME COLUMN `label` TO `title`",
        ]
    );
}

#[test]
fn test_alter_collects_failures() {
    let (my, conn) = db_with(
        Config::new("mysql", "test").database("blog"),
        tags_listing(Recorder::new(Dialect::MySql)).reject("notes"),
    );
    let err = my
        .schema()
        .alter_table("tags", |t| {
            t.text("notes").nullable();
            t.string("slug", 40).nullable();
        })
        .unwrap_err();
    assert_eq!(err.schema_kind(), Some(SchemaErrorKind::Composite));
    assert!(err.to_string().contains("statement rejected"));
    assert_eq!(
        conn.statements(),
        vec!["ALTER TABLE `tags` ADD COLUMN `slug` VARCHAR(40) NULL"]
    );
}

#[test]
fn test_alter_missing_table() {
    let (pg, conn) = db("postgres", Recorder::new(Dialect::Postgres));
    let err = pg
        .schema()
        .alter_table("ghost", |t| {
            t.text("body");
        })
        .unwrap_err();
    assert_eq!(err.schema_kind(), Some(SchemaErrorKind::TableNotFound));
    assert!(conn.statements().is_empty());
}

// ==================== Catalog ====================

#[test]
fn test_hana_catalog_helpers() {
    let conn = Recorder::new(Dialect::Hana)
        .answer("public.tables", vec![row(&[("name", Value::from("events"))])])
        .answer(
            "M_DATABASE",
            vec![row(&[("VERSION", Value::from("2.00.048.00.1591276203"))])],
        );
    let (hana, conn) = db_with(Config::new("hdb", "test").schema("APP"), conn);
    let schema = hana.schema();
    assert_eq!(schema.schema_name(), "APP");
    assert_eq!(schema.get_tables().unwrap(), vec!["events"]);
    assert_eq!(schema.get_version().unwrap().major, 2);

    schema.drop_table_if_exists("events").unwrap();
    schema.rename_table("logs", "audit").unwrap();
    assert_eq!(
        conn.statements(),
        vec![
            "DROP TABLE \"events\" CASCADE",
            "RENAME TABLE \"logs\" TO \"audit\"",
        ]
    );
}
