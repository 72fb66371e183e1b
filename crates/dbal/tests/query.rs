//! Query building and execution through a `Db` handle.

mod common;

use common::{Recorder, db, db_with, row};
use dbal::{Builder, Config, Db, Dialect, Record, Value};
use serde_json::json;

fn email_and_group(db: &Db) -> Builder {
    let mut q = db.table("table_test_where");
    q.where_("email", "like", "%@yao.run").where_group(|q| {
        q.where_("score", ">", 64.56).where_eq("vote", 10);
    });
    q
}

fn nested_groups(db: &Db, or: bool) -> Builder {
    let mut q = db.table("table_test_where");
    q.where_("email", "like", "%@yao.run");
    let group = |q: &mut Builder| {
        q.where_("vote", ">", 10).where_eq("name", "Ken").where_group(|q| {
            q.where_("created_at", ">", "2021-03-25 08:00:00")
                .where_("created_at", "<", "2021-03-25 19:00:00");
        });
    };
    if or {
        q.or_where_group(group);
    } else {
        q.where_group(group);
    }
    q.where_("score", ">", 5.0);
    q
}

// ==================== Where ====================

#[test]
fn test_where_group_per_dialect() {
    let (pg, _) = db("postgres", Recorder::new(Dialect::Postgres));
    assert_eq!(
        email_and_group(&pg).to_sql(),
        r#"select * from "table_test_where" where "email" like $1 and ("score" > $2 and "vote" = $3)"#
    );

    let (my, _) = db("mysql", Recorder::new(Dialect::MySql));
    let q = email_and_group(&my);
    assert_eq!(
        q.to_sql(),
        "select * from `table_test_where` where `email` like ? and (`score` > ? and `vote` = ?)"
    );
    assert_eq!(
        q.bindings(),
        vec![Value::from("%@yao.run"), Value::Double(64.56), Value::Int(10)]
    );
}

#[test]
fn test_nested_groups() {
    let (generic, _) = db("sql", Recorder::new(Dialect::Sql));
    let q = nested_groups(&generic, false);
    assert_eq!(
        q.to_sql(),
        r#"select * from "table_test_where" where "email" like ? and ("vote" > ? and "name" = ? and ("created_at" > ? and "created_at" < ?)) and "score" > ?"#
    );
    assert_eq!(q.bindings().len(), 6);
    assert_eq!(q.bindings()[3], Value::from("2021-03-25 08:00:00"));

    let (pg, _) = db("pgsql", Recorder::new(Dialect::Postgres));
    assert_eq!(
        nested_groups(&pg, true).to_sql(),
        r#"select * from "table_test_where" where "email" like $1 or ("vote" > $2 and "name" = $3 and ("created_at" > $4 and "created_at" < $5)) and "score" > $6"#
    );
}

#[test]
fn test_sub_query_conditions() {
    let (my, _) = db("mysql", Recorder::new(Dialect::MySql));
    let mut q = my.table("table_test_where");
    q.where_("email", "like", "%@yao.run")
        .where_sub_column(
            |sub| {
                sub.table("table_test_where")
                    .select_raw("AVG(score) as score", vec![])
                    .where_("score", ">", 49.15);
            },
            "<",
            90.15,
        )
        .where_("score", ">", 97.15);
    assert_eq!(
        q.to_sql(),
        "select * from `table_test_where` where `email` like ? and (select AVG(score) as score from `table_test_where` where `score` > ?) < ? and `score` > ?"
    );
    assert_eq!(
        q.bindings(),
        vec![
            Value::from("%@yao.run"),
            Value::Double(49.15),
            Value::Double(90.15),
            Value::Double(97.15)
        ]
    );

    let (pg, _) = db("postgres", Recorder::new(Dialect::Postgres));
    let mut q = pg.table("table_test_where");
    q.where_("email", "like", "%@yao.run").where_sub("vote", ">", |sub| {
        sub.table("table_test_where")
            .select_raw("MIN(vote) as vote", vec![])
            .where_("score", ">", 90.0);
    });
    assert_eq!(
        q.to_sql(),
        r#"select * from "table_test_where" where "email" like $1 and "vote" > (select MIN(vote) as vote from "table_test_where" where "score" > $2)"#
    );
}

// ==================== Select ====================

#[test]
fn test_select_aliases_with_prefix() {
    let (my, _) = db_with(
        Config::new("mysql", "test").prefix("xun_"),
        Recorder::new(Dialect::MySql),
    );
    let mut q = my.query();
    q.table("users as u").distinct().select(["u.email"]);
    assert_eq!(q.to_sql(), "select distinct `xun_u`.`email` from `xun_users` as `xun_u`");
}

#[test]
fn test_paging_per_dialect() {
    let (generic, _) = db("sql", Recorder::new(Dialect::Sql));
    let mut q = generic.table("t");
    q.order_by("id", "asc").for_page(3, 15);
    assert_eq!(
        q.to_sql(),
        r#"select * from "t" order by "id" asc offset 30 rows fetch next 15 rows only"#
    );

    let (lite, _) = db("sqlite3", Recorder::new(Dialect::Sqlite));
    let mut q = lite.table("t");
    q.skip(10);
    assert_eq!(q.to_sql(), "select * from `t` limit -1 offset 10");
}

// ==================== Execution ====================

#[test]
fn test_get_passes_bindings_to_connection() {
    let conn = Recorder::new(Dialect::Postgres).answer(
        "from \"users\"",
        vec![row(&[("id", Value::BigInt(1)), ("email", Value::from("john@yao.run"))])],
    );
    let (pg, conn) = db("postgres", conn);
    let rows = pg.table("users").where_in("id", [1, 2]).get().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_named::<String>("email").unwrap(), "john@yao.run");
    assert_eq!(
        conn.queries(),
        vec![r#"select * from "users" where "id" in ($1,$2)"#]
    );
    assert_eq!(conn.query_bindings(0), vec![Value::Int(1), Value::Int(2)]);
    assert!(conn.statements().is_empty());
}

#[test]
fn test_count_and_insert_json() {
    let conn = Recorder::new(Dialect::Postgres)
        .answer("count(*)", vec![row(&[("aggregate", Value::BigInt(4))])]);
    let (pg, conn) = db("postgres", conn);

    let mut q = pg.table("users");
    q.where_("vote", ">", 1);
    assert_eq!(q.count().unwrap(), 4);

    let meta = json!({"tags": ["admin"], "level": 3});
    pg.table("users")
        .insert(&[Record::new()
            .set("email", "ken@yao.run")
            .set("meta", Value::from(meta.clone()))])
        .unwrap();

    assert_eq!(
        conn.queries(),
        vec![r#"select count(*) as aggregate from "users" where "vote" > $1"#]
    );
    assert_eq!(
        conn.statements(),
        vec![r#"insert into "users" ("email", "meta") values ($1,$2)"#]
    );
    assert_eq!(conn.statement_bindings(0)[1], Value::Json(meta));
}

#[test]
fn test_update_and_delete() {
    let (my, conn) = db("mysql", Recorder::new(Dialect::MySql));
    let mut q = my.table("users");
    q.join("teams", "teams.id", "=", "users.team_id")
        .where_eq("teams.name", "core");
    assert_eq!(q.update(&Record::new().set("users.vote", 5)).unwrap(), 1);

    let mut q = my.table("logs");
    q.where_("level", "<", 3);
    q.delete().unwrap();

    assert_eq!(
        conn.statements(),
        vec![
            "update `users` inner join `teams` on `teams`.`id` = `users`.`team_id` set `users`.`vote` = ? where `teams`.`name` = ?",
            "delete from `logs` where `level` < ?",
        ]
    );
}

#[test]
fn test_aliased_writes_keep_alias() {
    let (lite, conn) = db("sqlite", Recorder::new(Dialect::Sqlite));
    let mut q = lite.table("users as u");
    q.where_eq("u.team", "core");
    q.update(&Record::new().set("vote", 1)).unwrap();
    let mut q = lite.table("users as u");
    q.where_("u.vote", "<", 0);
    q.delete().unwrap();

    assert_eq!(
        conn.statements(),
        vec![
            "update `users` as `u` set `vote` = ? where `u`.`team` = ?",
            "delete from `users` as `u` where `u`.`vote` < ?",
        ]
    );
    assert_eq!(conn.statement_bindings(0), vec![Value::Int(1), Value::from("core")]);
}

#[test]
fn test_grouped_delete_binds_filter_only() {
    let (pg, conn) = db("postgres", Recorder::new(Dialect::Postgres));
    let mut q = pg.table("logs");
    q.where_("level", "<", 3)
        .group_by(["host"])
        .having("count", ">", 100);
    q.delete().unwrap();

    assert_eq!(conn.statements(), vec![r#"delete from "logs" where "level" < $1"#]);
    assert_eq!(conn.statement_bindings(0), vec![Value::Int(3)]);
}

#[test]
fn test_driver_error_propagates() {
    let (lite, _) = db("sqlite", Recorder::new(Dialect::Sqlite).reject("insert"));
    let err = lite
        .table("users")
        .insert(&[Record::new().set("email", "a@x")])
        .unwrap_err();
    assert!(err.to_string().contains("statement rejected"));
}
