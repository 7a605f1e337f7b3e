//! SQL `WHERE` fragments.
//!
//! [`SqlTranslator`] renders a specification as a parameterized boolean
//! expression. Values never appear in the SQL text; they are returned as
//! positional parameters in placeholder order.
//!
//! SQL comparisons against `NULL` yield `NULL`, and `NOT NULL` is still
//! `NULL`, while in-memory evaluation is two-valued (absent ⇒ false, so
//! `NOT` ⇒ true). Every comparison is therefore wrapped in
//! `COALESCE(.., FALSE)` so negation behaves identically on both sides.
//!
//! Text-list fields are stored as a native `text[]` on Postgres and as a JSON
//! array of strings on SQLite. `contains` on them is element membership, not
//! a substring search over the stored text.

use super::{Condition, QueryTranslator};
use crate::error::{SpecResult, SpecificationError};
use crate::spec::{Direction, FieldType, Operator, OrderBy, Value};
use std::fmt;

/// Target SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    /// `$1, $2, ...` placeholders, `ILIKE` available.
    Postgres,
    /// `?` placeholders, no Unicode-aware case folding.
    Sqlite,
}

impl SqlDialect {
    pub fn name(&self) -> &'static str {
        match self {
            SqlDialect::Postgres => "postgres",
            SqlDialect::Sqlite => "sqlite",
        }
    }

    fn placeholder(&self, position: usize) -> String {
        match self {
            SqlDialect::Postgres => format!("${}", position),
            SqlDialect::Sqlite => "?".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Fragment {
    Sql(String),
    Param(Value),
}

/// A rendered filter: SQL text interleaved with bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFilter {
    dialect: SqlDialect,
    fragments: Vec<Fragment>,
}

impl SqlFilter {
    fn new(dialect: SqlDialect) -> Self {
        Self {
            dialect,
            fragments: Vec::new(),
        }
    }

    fn push_sql(&mut self, sql: &str) {
        if let Some(Fragment::Sql(last)) = self.fragments.last_mut() {
            last.push_str(sql);
        } else {
            self.fragments.push(Fragment::Sql(sql.to_string()));
        }
    }

    fn push_param(&mut self, value: Value) {
        self.fragments.push(Fragment::Param(value));
    }

    fn append(&mut self, other: SqlFilter) {
        for fragment in other.fragments {
            match fragment {
                Fragment::Sql(sql) => self.push_sql(&sql),
                Fragment::Param(value) => self.push_param(value),
            }
        }
    }

    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    /// SQL text with dialect placeholders numbered left to right.
    pub fn clause(&self) -> String {
        let mut out = String::new();
        let mut position = 0;
        for fragment in &self.fragments {
            match fragment {
                Fragment::Sql(sql) => out.push_str(sql),
                Fragment::Param(_) => {
                    position += 1;
                    out.push_str(&self.dialect.placeholder(position));
                }
            }
        }
        out
    }

    /// Parameters in placeholder order.
    pub fn params(&self) -> Vec<&Value> {
        self.fragments
            .iter()
            .filter_map(|fragment| match fragment {
                Fragment::Param(value) => Some(value),
                Fragment::Sql(_) => None,
            })
            .collect()
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        let clause = self.clause();
        let params = self
            .fragments
            .into_iter()
            .filter_map(|fragment| match fragment {
                Fragment::Param(value) => Some(value),
                Fragment::Sql(_) => None,
            })
            .collect();
        (clause, params)
    }
}

impl fmt::Display for SqlFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.clause())
    }
}

/// Quote an identifier, splitting dotted paths into quoted segments.
fn quote_ident(name: &str) -> String {
    name.split('.')
        .map(|segment| format!("\"{}\"", segment.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

/// Escape `LIKE` wildcards so the needle matches literally.
fn escape_like(needle: &str) -> String {
    needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Translates specifications into [`SqlFilter`]s.
#[derive(Debug, Clone, Copy)]
pub struct SqlTranslator {
    dialect: SqlDialect,
}

impl SqlTranslator {
    pub fn new(dialect: SqlDialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    /// Render an `ORDER BY` list (without the keyword). Empty input yields an
    /// empty string.
    pub fn order_by<E>(&self, order: &[OrderBy<E>]) -> String {
        order
            .iter()
            .map(|key| {
                let direction = match key.direction() {
                    Direction::Asc => "ASC",
                    Direction::Desc => "DESC",
                };
                format!("{} {} NULLS LAST", quote_ident(key.field().name()), direction)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn like(&self, filter: &mut SqlFilter, column: &str, keyword: &str, needle: &str) {
        filter.push_sql(&format!("COALESCE({} {} ", column, keyword));
        filter.push_param(Value::Str(format!("%{}%", escape_like(needle))));
        filter.push_sql(" ESCAPE '\\', FALSE)");
    }

    fn unsupported(&self, operator: Operator) -> SpecificationError {
        SpecificationError::UnsupportedOperator {
            backend: self.backend(),
            operator,
        }
    }

    fn text_contains(&self, filter: &mut SqlFilter, column: &str, needle: &str) {
        match self.dialect {
            SqlDialect::Postgres => self.like(filter, column, "LIKE", needle),
            // SQLite LIKE ignores ASCII case; instr() does not.
            SqlDialect::Sqlite => {
                filter.push_sql(&format!("COALESCE(instr({}, ", column));
                filter.push_param(Value::Str(needle.to_string()));
                filter.push_sql(") > 0, FALSE)");
            }
        }
    }

    fn list_contains(&self, filter: &mut SqlFilter, column: &str, needle: &str) {
        match self.dialect {
            SqlDialect::Postgres => {
                filter.push_sql("COALESCE(");
                filter.push_param(Value::Str(needle.to_string()));
                filter.push_sql(&format!(" = ANY({}), FALSE)", column));
            }
            SqlDialect::Sqlite => {
                filter.push_sql(&format!(
                    "EXISTS (SELECT 1 FROM json_each({}) AS item WHERE item.value = ",
                    column
                ));
                filter.push_param(Value::Str(needle.to_string()));
                filter.push_sql(")");
            }
        }
    }

    fn join(&self, mut parts: Vec<SqlFilter>, separator: &str) -> SqlFilter {
        if parts.len() == 1 {
            if let Some(only) = parts.pop() {
                return only;
            }
        }
        let mut filter = SqlFilter::new(self.dialect);
        filter.push_sql("(");
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                filter.push_sql(separator);
            }
            filter.append(part);
        }
        filter.push_sql(")");
        filter
    }
}

impl QueryTranslator for SqlTranslator {
    type Filter = SqlFilter;

    fn backend(&self) -> &'static str {
        self.dialect.name()
    }

    fn condition(&self, condition: Condition<'_>) -> SpecResult<SqlFilter> {
        let column = quote_ident(condition.column);
        let mut filter = SqlFilter::new(self.dialect);

        match condition.operator {
            op @ (Operator::Eq
            | Operator::Ne
            | Operator::Lt
            | Operator::Lte
            | Operator::Gt
            | Operator::Gte) => {
                let symbol = if op == Operator::Ne { "<>" } else { op.as_str() };
                filter.push_sql(&format!("COALESCE({} {} ", column, symbol));
                filter.push_param(condition.value.clone());
                filter.push_sql(", FALSE)");
            }
            op @ (Operator::In | Operator::NotIn) => {
                let items = condition.value.as_list().unwrap_or(&[]);
                match (op, items.is_empty()) {
                    (Operator::In, true) => filter.push_sql("FALSE"),
                    (_, true) => filter.push_sql(&format!("({} IS NOT NULL)", column)),
                    (_, false) => {
                        filter.push_sql(&format!("COALESCE({} {} (", column, op.as_str()));
                        for (i, item) in items.iter().enumerate() {
                            if i > 0 {
                                filter.push_sql(", ");
                            }
                            filter.push_param(item.clone());
                        }
                        filter.push_sql("), FALSE)");
                    }
                }
            }
            Operator::Contains => {
                let needle = condition.value.as_str().unwrap_or_default();
                match condition.field_type {
                    FieldType::TextList => self.list_contains(&mut filter, &column, needle),
                    _ => self.text_contains(&mut filter, &column, needle),
                }
            }
            Operator::IContains => {
                let needle = condition.value.as_str().unwrap_or_default();
                match (self.dialect, condition.field_type) {
                    (SqlDialect::Postgres, FieldType::TextList) => {
                        // ILIKE without wildcards: whole-element, case-insensitive.
                        filter.push_sql(&format!(
                            "EXISTS (SELECT 1 FROM unnest({}) AS item WHERE item ILIKE ",
                            column
                        ));
                        filter.push_param(Value::Str(escape_like(needle)));
                        filter.push_sql(" ESCAPE '\\')");
                    }
                    (SqlDialect::Postgres, _) => self.like(&mut filter, &column, "ILIKE", needle),
                    (SqlDialect::Sqlite, _) => return Err(self.unsupported(Operator::IContains)),
                }
            }
            Operator::IsNull => {
                let check = match condition.value.as_bool() {
                    Some(false) => "IS NOT NULL",
                    _ => "IS NULL",
                };
                filter.push_sql(&format!("{} {}", column, check));
            }
        }

        Ok(filter)
    }

    fn all(&self, parts: Vec<SqlFilter>) -> SpecResult<SqlFilter> {
        Ok(self.join(parts, " AND "))
    }

    fn any(&self, parts: Vec<SqlFilter>) -> SpecResult<SqlFilter> {
        Ok(self.join(parts, " OR "))
    }

    fn negate(&self, part: SqlFilter) -> SpecResult<SqlFilter> {
        let mut filter = SqlFilter::new(self.dialect);
        filter.push_sql("NOT (");
        filter.append(part);
        filter.push_sql(")");
        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{AGE, COUNTRY, NAME, TAGS};

    fn postgres() -> SqlTranslator {
        SqlTranslator::new(SqlDialect::Postgres)
    }

    fn sqlite() -> SqlTranslator {
        SqlTranslator::new(SqlDialect::Sqlite)
    }

    #[test]
    fn renders_adults_in_north_america() {
        let spec = AGE.gte(18).unwrap().and(&COUNTRY.is_in(["US", "CA"]).unwrap());
        let (clause, params) = postgres().translate(&spec).unwrap().into_parts();
        assert_eq!(
            clause,
            r#"(COALESCE("age" >= $1, FALSE) AND COALESCE("country" IN ($2, $3), FALSE))"#
        );
        assert_eq!(
            params,
            vec![Value::Int(18), Value::from("US"), Value::from("CA")]
        );

        let filter = sqlite().translate(&spec).unwrap();
        assert_eq!(
            filter.clause(),
            r#"(COALESCE("age" >= ?, FALSE) AND COALESCE("country" IN (?, ?), FALSE))"#
        );
        assert_eq!(filter.params().len(), 3);
    }

    #[test]
    fn negation_and_null_checks() {
        let spec = AGE.is_null().or(&COUNTRY.ne("DE").unwrap().not());
        let filter = postgres().translate(&spec).unwrap();
        assert_eq!(
            filter.to_string(),
            r#"("age" IS NULL OR NOT (COALESCE("country" <> $1, FALSE)))"#
        );
        let filter = postgres().translate(&AGE.is_not_null()).unwrap();
        assert_eq!(filter.clause(), r#""age" IS NOT NULL"#);
    }

    #[test]
    fn empty_membership_lists() {
        let none: [&str; 0] = [];
        let filter = postgres().translate(&COUNTRY.is_in(none).unwrap()).unwrap();
        assert_eq!(filter.clause(), "FALSE");
        let filter = postgres().translate(&COUNTRY.not_in(none).unwrap()).unwrap();
        assert_eq!(filter.clause(), r#"("country" IS NOT NULL)"#);
        assert!(filter.params().is_empty());
    }

    #[test]
    fn contains_escapes_like_wildcards() {
        let filter = postgres()
            .translate(&NAME.contains("50%_off").unwrap())
            .unwrap();
        assert_eq!(filter.clause(), r#"COALESCE("name" LIKE $1 ESCAPE '\', FALSE)"#);
        assert_eq!(filter.params(), vec![&Value::from(r"%50\%\_off%")]);
    }

    #[test]
    fn sqlite_contains_is_case_sensitive_instr() {
        let filter = sqlite().translate(&NAME.contains("Ada").unwrap()).unwrap();
        assert_eq!(filter.clause(), r#"COALESCE(instr("name", ?) > 0, FALSE)"#);
        assert_eq!(filter.params(), vec![&Value::from("Ada")]);
    }

    #[test]
    fn sqlite_rejects_case_insensitive_contains() {
        let spec = AGE.gt(1).unwrap().and(&NAME.icontains("ada").unwrap());
        let err = sqlite().translate(&spec).unwrap_err();
        assert_eq!(
            err,
            SpecificationError::UnsupportedOperator {
                backend: "sqlite",
                operator: Operator::IContains,
            }
        );
        assert!(postgres().translate(&spec).is_ok());
    }

    #[test]
    fn list_contains_is_element_membership() {
        let spec = TAGS.contains("vip").unwrap();
        let filter = postgres().translate(&spec).unwrap();
        assert_eq!(filter.clause(), r#"COALESCE($1 = ANY("tags"), FALSE)"#);
        assert_eq!(filter.params(), vec![&Value::from("vip")]);

        let filter = sqlite().translate(&spec).unwrap();
        assert_eq!(
            filter.clause(),
            r#"EXISTS (SELECT 1 FROM json_each("tags") AS item WHERE item.value = ?)"#
        );
        assert_eq!(filter.params(), vec![&Value::from("vip")]);
    }

    #[test]
    fn list_icontains_matches_whole_elements() {
        let spec = TAGS.icontains("50%").unwrap();
        let filter = postgres().translate(&spec).unwrap();
        assert_eq!(
            filter.clause(),
            r#"EXISTS (SELECT 1 FROM unnest("tags") AS item WHERE item ILIKE $1 ESCAPE '\')"#
        );
        assert_eq!(filter.params(), vec![&Value::from(r"50\%")]);
        assert_eq!(
            sqlite().translate(&spec).unwrap_err(),
            SpecificationError::UnsupportedOperator {
                backend: "sqlite",
                operator: Operator::IContains,
            }
        );
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_ident("owner.country"), r#""owner"."country""#);
        assert_eq!(quote_ident(r#"we"ird"#), r#""we""ird""#);
    }

    #[test]
    fn renders_order_by() {
        assert_eq!(
            postgres().order_by(&[AGE.desc(), NAME.asc()]),
            r#""age" DESC NULLS LAST, "name" ASC NULLS LAST"#
        );
        assert_eq!(postgres().order_by::<crate::test_utils::Person>(&[]), "");
    }
}
