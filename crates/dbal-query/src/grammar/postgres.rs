//! PostgreSQL grammar.

use dbal_core::{Config, Connection, Dialect, Error, Result, Value};

use super::{Grammar, needs_row_id, on_conflict_update, plain_delete, plain_update};
use crate::clause::DatePart;
use crate::expr::Operand;
use crate::query::Query;
use crate::record::UpsertUpdate;

const ROW_ID: &str = "ctid";

#[derive(Debug, Clone, Default)]
pub struct Postgres {
    prefix: String,
}

impl Postgres {
    pub fn new(config: &Config) -> Self {
        Self {
            prefix: config.prefix.clone(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Grammar for Postgres {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn driver(&self) -> &str {
        "postgres"
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn where_date_part(&self, part: DatePart, column: &str, operator: &str, value: &str) -> String {
        match part {
            DatePart::Date | DatePart::Time => {
                format!("{}::{} {}{}", column, part.as_str(), operator, value)
            }
            DatePart::Year | DatePart::Month | DatePart::Day => {
                format!("extract({} from {}){}{}", part.as_str(), column, operator, value)
            }
        }
    }

    fn compile_insert_or_ignore(
        &self,
        query: &Query,
        columns: &[String],
        rows: &[Vec<Operand>],
    ) -> (String, Vec<Value>) {
        let (sql, bindings) = self.compile_insert(query, columns, rows);
        (format!("{sql} on conflict do nothing"), bindings)
    }

    fn compile_insert_get_id(
        &self,
        query: &Query,
        columns: &[String],
        row: &[Operand],
        sequence: Option<&str>,
    ) -> (String, Vec<Value>) {
        let (sql, bindings) = self.compile_insert(query, columns, &[row.to_vec()]);
        let sql = format!("{} returning {}", sql, self.wrap(sequence.unwrap_or("id")));
        (sql, bindings)
    }

    fn process_insert_get_id(
        &self,
        conn: &dyn Connection,
        sql: &str,
        bindings: &[Value],
        _sequence: Option<&str>,
    ) -> Result<i64> {
        let row = conn
            .query_one(sql, bindings)?
            .ok_or_else(|| Error::query("insert returned no id", sql))?;
        row.get(0)
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::query("returned id is not an integer", sql))
    }

    /// Joins and paging go through the row-id rewrite.
    fn unsupported_write(&self, _query: &Query) -> Option<String> {
        None
    }

    fn compile_update(&self, query: &Query, values: &[(String, Operand)]) -> (String, Vec<Value>) {
        if needs_row_id(query) {
            return self.compile_update_by_row_id(query, values, ROW_ID);
        }
        plain_update(self, query, values)
    }

    fn compile_delete(&self, query: &Query) -> (String, Vec<Value>) {
        if needs_row_id(query) {
            return self.compile_delete_by_row_id(query, ROW_ID);
        }
        plain_delete(self, query, false)
    }

    fn compile_truncate(&self, query: &Query) -> Vec<(String, Vec<Value>)> {
        vec![(
            format!("truncate {} restart identity cascade", self.write_table(query)),
            Vec::new(),
        )]
    }

    fn compile_upsert(
        &self,
        query: &Query,
        columns: &[String],
        rows: &[Vec<Operand>],
        unique_by: &[String],
        update: &UpsertUpdate,
    ) -> (String, Vec<Value>) {
        let insert = self.compile_insert(query, columns, rows);
        on_conflict_update(self, insert, unique_by, update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use crate::expr::raw;
    use crate::record::Record;
    use std::sync::Arc;

    fn qb() -> Builder {
        Builder::new(Arc::new(Postgres::default()))
    }

    // ==================== Placeholders ====================

    #[test]
    fn test_numbered_placeholders_through_sub_queries() {
        let mut q = qb();
        q.table("table_test_where")
            .where_("email", "like", "%@yao.run")
            .where_sub_column(
                |sub| {
                    sub.table("table_test_where")
                        .select_raw("AVG(score) as score", vec![])
                        .where_("score", ">", 64.56);
                },
                "<",
                81,
            )
            .where_eq("vote", 10);
        assert_eq!(
            q.to_sql(),
            r#"select * from "table_test_where" where "email" like $1 and (select AVG(score) as score from "table_test_where" where "score" > $2) < $3 and "vote" = $4"#
        );
        assert_eq!(q.bindings().len(), 4);
    }

    #[test]
    fn test_raw_fragment_renumbered() {
        let mut q = qb();
        q.table("t")
            .where_eq("a", 1)
            .where_raw("b > ? and c < ?", vec![Value::Int(2), Value::Int(3)]);
        assert_eq!(
            q.to_sql(),
            r#"select * from "t" where "a" = $1 and b > $2 and c < $3"#
        );
    }

    // ==================== Dates ====================

    #[test]
    fn test_where_date_parts() {
        let mut q = qb();
        q.table("t")
            .where_eq("id", 1)
            .where_date("created_at", ">", "2021-03-25")
            .where_year("created_at", "=", 2021);
        assert_eq!(
            q.to_sql(),
            r#"select * from "t" where "id" = $1 and "created_at"::date >$2 and extract(year from "created_at")=$3"#
        );
    }

    // ==================== Writes ====================

    #[test]
    fn test_insert_get_id_returning() {
        let mut q = qb();
        q.table("users");
        let (sql, bindings) = q.compile_insert_get_id(&Record::new().set("email", "a@x"), None);
        assert_eq!(sql, r#"insert into "users" ("email") values ($1) returning "id""#);
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn test_upsert_on_conflict() {
        let mut q = qb();
        q.table("users");
        let (sql, bindings) = q.compile_upsert(
            &[Record::new().set("email", "a@x").set("vote", 1)],
            &["email"],
            UpsertUpdate::Values(Record::new().set("vote", raw("\"users\".\"vote\" + 1")).set("note", "again")),
        );
        assert_eq!(
            sql,
            r#"insert into "users" ("email", "vote") values ($1,$2) on conflict ("email") do update set "vote" = "users"."vote" + 1, "note" = $3"#
        );
        assert_eq!(bindings.len(), 3);
    }

    #[test]
    fn test_upsert_excluded_columns() {
        let mut q = qb();
        q.table("users");
        let (sql, _) = q.compile_upsert(
            &[Record::new().set("email", "a@x").set("vote", 1)],
            &["email"],
            UpsertUpdate::columns(["vote"]),
        );
        assert!(sql.ends_with(r#"on conflict ("email") do update set "vote" = "excluded"."vote""#));
    }

    #[test]
    fn test_delete_with_join_uses_ctid() {
        let mut q = qb();
        q.table("users")
            .join("teams", "teams.id", "=", "users.team_id")
            .where_eq("teams.name", "core");
        let (sql, bindings) = q.compile_delete();
        assert_eq!(
            sql,
            r#"delete from "users" where "ctid" in (select "users"."ctid" from "users" inner join "teams" on "teams"."id" = "users"."team_id" where "teams"."name" = $1)"#
        );
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn test_update_with_limit_uses_ctid() {
        let mut q = qb();
        q.table("users").where_eq("vote", 0).limit(10);
        let (sql, bindings) = q.compile_update(&Record::new().set("vote", 1));
        assert_eq!(
            sql,
            r#"update "users" set "vote" = $1 where "ctid" in (select "ctid" from "users" where "vote" = $2 limit 10)"#
        );
        assert_eq!(bindings, vec![Value::Int(1), Value::Int(0)]);
    }

    #[test]
    fn test_update_drops_order() {
        let mut q = qb();
        q.table("users").where_eq("id", 3).order_by("id", "desc");
        let (sql, _) = q.compile_update(&Record::new().set("vote", 1));
        assert_eq!(sql, r#"update "users" set "vote" = $1 where "id" = $2"#);
    }

    #[test]
    fn test_delete_ignores_group_and_having() {
        let mut q = qb();
        q.table("t").where_eq("a", 1).group_by(["a"]).having("n", ">", 2);
        let (sql, bindings) = q.compile_delete();
        assert_eq!(sql, r#"delete from "t" where "a" = $1"#);
        assert_eq!(bindings, vec![Value::Int(1)]);
    }

    #[test]
    fn test_aliased_update_and_delete() {
        let mut q = qb();
        q.table("users as u").where_eq("u.vote", 0);
        let (sql, bindings) = q.compile_update(&Record::new().set("vote", 1));
        assert_eq!(sql, r#"update "users" as "u" set "vote" = $1 where "u"."vote" = $2"#);
        assert_eq!(bindings, vec![Value::Int(1), Value::Int(0)]);
        assert_eq!(q.compile_delete().0, r#"delete from "users" as "u" where "u"."vote" = $1"#);
    }

    #[test]
    fn test_truncate() {
        let mut q = qb();
        q.table("users");
        let statements = q.compile_truncate();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].0, r#"truncate "users" restart identity cascade"#);
    }
}
