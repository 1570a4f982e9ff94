//! Annotation keyword handlers.
//!
//! Each keyword updates a [`FieldContext`]; [`FieldContext::finish`] then
//! resolves the column name, SQL type and nullability and rejects
//! conflicting combinations. Keywords without a handler are either a known
//! SQL type (`varchar(32)`), a quoted rename (`'user_name'`) or a bare
//! rename (`user_name`).

use std::collections::HashMap;

use once_cell::sync::Lazy;
use tracing::warn;

use crate::core::schema::{Column, IndexType, MapType, SqlType, TimeZone};
use crate::error::{MapError, Result};
use crate::names::NameMapper;
use crate::typemap::{default_sql_type, names, FieldType};

use super::descriptor::FieldDescriptor;
use super::tokenizer::Token;

/// Returns `true` when the handler consumed the following token.
type Handler = fn(&mut FieldContext<'_>, &Token, Option<&Token>) -> Result<bool>;

static HANDLERS: Lazy<HashMap<&'static str, Handler>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, Handler> = HashMap::new();
    m.insert("PK", pk);
    m.insert("AUTOINCR", autoincr);
    m.insert("NULL", null);
    m.insert("NOTNULL", notnull);
    m.insert("NOT", not);
    m.insert("CREATED", created);
    m.insert("UPDATED", updated);
    m.insert("DELETED", deleted);
    m.insert("VERSION", version);
    m.insert("JSON", json);
    m.insert("JSONB", jsonb);
    m.insert("ENUM", enum_options);
    m.insert("SET", set_options);
    m.insert("INDEX", index);
    m.insert("UNIQUE", unique);
    m.insert("CACHE", cache);
    m.insert("NOCACHE", nocache);
    m.insert("->", only_to_db);
    m.insert("<-", only_from_db);
    m.insert("UTC", utc);
    m.insert("LOCAL", local);
    m.insert("DEFAULT", default);
    m.insert("COMMENT", comment);
    m
});

/// A column built from one field.
#[derive(Debug)]
pub(crate) struct BuiltColumn {
    pub column: Column,
    /// `null`, `notnull` or `not null` was given.
    pub explicit_null: bool,
    pub cache: bool,
    pub nocache: bool,
    /// Un-annotated 64-bit integer field named `id`.
    pub implicit_id: bool,
}

/// Accumulated state for one field's annotation.
pub(crate) struct FieldContext<'a> {
    annotation: &'a str,
    field: &'a FieldDescriptor,
    name: Option<String>,
    quoted_name: bool,
    sql_type: Option<SqlType>,
    pk: bool,
    autoincr: bool,
    null: Option<bool>,
    null_conflict: bool,
    created: bool,
    updated: bool,
    deleted: bool,
    version: bool,
    json: bool,
    enum_options: Option<Vec<String>>,
    set_options: Option<Vec<String>>,
    indexes: Vec<(Option<String>, IndexType)>,
    cache: bool,
    nocache: bool,
    to_db: bool,
    from_db: bool,
    utc: bool,
    local: bool,
    default: Option<String>,
    comment: String,
}

impl<'a> FieldContext<'a> {
    pub fn new(field: &'a FieldDescriptor, annotation: &'a str) -> Self {
        Self {
            annotation,
            field,
            name: None,
            quoted_name: false,
            sql_type: None,
            pk: false,
            autoincr: false,
            null: None,
            null_conflict: false,
            created: false,
            updated: false,
            deleted: false,
            version: false,
            json: false,
            enum_options: None,
            set_options: None,
            indexes: Vec::new(),
            cache: false,
            nocache: false,
            to_db: false,
            from_db: false,
            utc: false,
            local: false,
            default: None,
            comment: String::new(),
        }
    }

    /// Apply every token in order.
    pub fn apply(&mut self, tokens: &[Token]) -> Result<()> {
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            let next = tokens.get(i + 1);
            let consumed = match HANDLERS.get(token.name.to_ascii_uppercase().as_str()) {
                Some(handler) => handler(self, token, next)?,
                None => {
                    self.other(token)?;
                    false
                }
            };
            i += if consumed { 2 } else { 1 };
        }
        Ok(())
    }

    fn malformed(&self, message: impl Into<String>) -> MapError {
        MapError::malformed(self.annotation, message)
    }

    fn conflict(&self, message: impl Into<String>) -> MapError {
        MapError::conflict(&self.field.name, message)
    }

    fn set_null(&mut self, nullable: bool) {
        if self.null.map_or(false, |n| n != nullable) {
            self.null_conflict = true;
        }
        self.null = Some(nullable);
    }

    /// SQL type, quoted rename or bare rename.
    fn other(&mut self, token: &Token) -> Result<()> {
        if token.is_quoted() {
            self.name = Some(token.name[1..token.name.len() - 1].to_string());
            self.quoted_name = true;
            return Ok(());
        }
        if names::is_known(&token.name) {
            let length = self.length_param(token, 0)?;
            let length2 = self.length_param(token, 1)?;
            self.sql_type = Some(SqlType::with_length(&token.name, length, length2));
            return Ok(());
        }
        if token.has_params() {
            return Err(self.malformed(format!("unknown keyword '{}' with parameters", token.name)));
        }
        if !self.quoted_name {
            self.name = Some(token.name.clone());
        }
        Ok(())
    }

    fn length_param(&self, token: &Token, idx: usize) -> Result<i64> {
        match token.params.get(idx) {
            Some(p) => p.parse::<i64>().map_err(|_| {
                self.malformed(format!("invalid length '{}' for {}", p, token.name))
            }),
            None => Ok(0),
        }
    }

    /// Resolve the column and check for conflicting keywords.
    pub fn finish(
        self,
        column_mapper: &dyn NameMapper,
        custom_types: &HashMap<String, SqlType>,
    ) -> Result<BuiltColumn> {
        let lifecycle = [self.created, self.updated, self.deleted, self.version]
            .iter()
            .filter(|&&b| b)
            .count();
        if lifecycle > 1 {
            return Err(self.conflict("created, updated, deleted and version are mutually exclusive"));
        }
        if self.null_conflict {
            return Err(self.conflict("null and notnull are mutually exclusive"));
        }
        if self.autoincr && self.null == Some(true) {
            return Err(self.conflict("an autoincr column cannot be null"));
        }
        if lifecycle == 1 && self.null == Some(false) {
            return Err(self.conflict("a lifecycle column cannot be notnull"));
        }
        if lifecycle == 1 && self.pk {
            return Err(self.conflict("a lifecycle column cannot be a primary key"));
        }
        if self.enum_options.is_some() && self.set_options.is_some() {
            return Err(self.conflict("enum and set are mutually exclusive"));
        }
        if self.json && (self.enum_options.is_some() || self.set_options.is_some()) {
            return Err(self.conflict("json cannot be combined with enum or set"));
        }
        if self.json && lifecycle == 1 {
            return Err(self.conflict("json cannot be combined with a lifecycle role"));
        }
        if self.to_db && self.from_db {
            return Err(self.conflict("-> and <- are mutually exclusive"));
        }
        if self.utc && self.local {
            return Err(self.conflict("utc and local are mutually exclusive"));
        }
        if (self.utc || self.local) && !self.field.field_type.is_temporal() {
            warn!(
                "Time zone on non-temporal field {} ({}) has no effect",
                self.field.name, self.field.field_type
            );
        }

        let field = self.field;
        let name = match self.name {
            Some(name) => name,
            None => column_mapper.obj_to_table(&field.name),
        };

        let sql_type = if self.enum_options.is_some() {
            SqlType::new(names::ENUM)
        } else if self.set_options.is_some() {
            SqlType::new(names::SET)
        } else if let Some(explicit) = self.sql_type {
            explicit
        } else if self.json {
            SqlType::new(names::TEXT)
        } else {
            resolve_type(&field.field_type, custom_types)
                .ok_or_else(|| MapError::unknown_type(&field.name, field.field_type.to_string()))?
        };

        let mut column = Column::new(name, &field.name, sql_type);
        column.is_primary_key = self.pk || self.autoincr;
        column.is_auto_increment = self.autoincr;
        column.is_created = self.created;
        column.is_updated = self.updated;
        column.is_deleted = self.deleted;
        column.is_version = self.version;
        column.is_json = self.json;
        column.default = self.default;
        column.comment = self.comment;
        column.nullable = if lifecycle == 1 {
            true
        } else if self.autoincr {
            false
        } else {
            self.null.unwrap_or(true)
        };
        column.map_type = if self.to_db {
            MapType::OnlyToDb
        } else if self.from_db {
            MapType::OnlyFromDb
        } else {
            MapType::Bidirectional
        };
        column.time_zone = if self.utc {
            Some(TimeZone::Utc)
        } else if self.local {
            Some(TimeZone::Local)
        } else {
            None
        };
        if let Some(options) = self.enum_options {
            column.enum_options = options.into_iter().enumerate().map(|(i, o)| (o, i)).collect();
        }
        if let Some(options) = self.set_options {
            column.set_options = options.into_iter().enumerate().map(|(i, o)| (o, i)).collect();
        }
        // unlabeled indexes take the resolved column name, not the field name
        for (label, kind) in self.indexes {
            let label = label.unwrap_or_else(|| column.name.clone());
            match column.indexes.get(&label) {
                Some(existing) if *existing != kind => {
                    return Err(MapError::conflict(
                        &field.name,
                        format!("index '{}' declared as both index and unique", label),
                    ));
                }
                _ => {
                    column.indexes.insert(label, kind);
                }
            }
        }

        Ok(BuiltColumn {
            column,
            explicit_null: self.null.is_some(),
            cache: self.cache,
            nocache: self.nocache,
            implicit_id: false,
        })
    }
}

/// Default SQL type for a value type, consulting registered custom types first.
pub(crate) fn resolve_type(
    field_type: &FieldType,
    custom_types: &HashMap<String, SqlType>,
) -> Option<SqlType> {
    match field_type.inner() {
        FieldType::Custom(name) | FieldType::Entity(name) => custom_types.get(name).cloned(),
        other => default_sql_type(other),
    }
}

/// Column for a field with no annotation.
pub(crate) fn default_column(
    field: &FieldDescriptor,
    column_mapper: &dyn NameMapper,
    custom_types: &HashMap<String, SqlType>,
) -> Result<BuiltColumn> {
    let mut built = FieldContext::new(field, "").finish(column_mapper, custom_types)?;
    built.implicit_id = field.name.eq_ignore_ascii_case("id")
        && matches!(field.field_type, FieldType::I64 | FieldType::U64);
    Ok(built)
}

fn pk(ctx: &mut FieldContext<'_>, _: &Token, _: Option<&Token>) -> Result<bool> {
    ctx.pk = true;
    Ok(false)
}

fn autoincr(ctx: &mut FieldContext<'_>, _: &Token, _: Option<&Token>) -> Result<bool> {
    ctx.autoincr = true;
    Ok(false)
}

fn null(ctx: &mut FieldContext<'_>, _: &Token, _: Option<&Token>) -> Result<bool> {
    ctx.set_null(true);
    Ok(false)
}

fn notnull(ctx: &mut FieldContext<'_>, _: &Token, _: Option<&Token>) -> Result<bool> {
    ctx.set_null(false);
    Ok(false)
}

/// `not null`
fn not(ctx: &mut FieldContext<'_>, _: &Token, next: Option<&Token>) -> Result<bool> {
    match next {
        Some(next) if next.is("null") => {
            ctx.set_null(false);
            Ok(true)
        }
        _ => Err(ctx.malformed("expected NULL after NOT")),
    }
}

fn created(ctx: &mut FieldContext<'_>, _: &Token, _: Option<&Token>) -> Result<bool> {
    ctx.created = true;
    Ok(false)
}

fn updated(ctx: &mut FieldContext<'_>, _: &Token, _: Option<&Token>) -> Result<bool> {
    ctx.updated = true;
    Ok(false)
}

fn deleted(ctx: &mut FieldContext<'_>, _: &Token, _: Option<&Token>) -> Result<bool> {
    ctx.deleted = true;
    Ok(false)
}

fn version(ctx: &mut FieldContext<'_>, _: &Token, _: Option<&Token>) -> Result<bool> {
    ctx.version = true;
    Ok(false)
}

fn json(ctx: &mut FieldContext<'_>, _: &Token, _: Option<&Token>) -> Result<bool> {
    ctx.json = true;
    Ok(false)
}

fn jsonb(ctx: &mut FieldContext<'_>, _: &Token, _: Option<&Token>) -> Result<bool> {
    ctx.json = true;
    ctx.sql_type = Some(SqlType::new(names::JSONB));
    Ok(false)
}

fn enum_options(ctx: &mut FieldContext<'_>, token: &Token, _: Option<&Token>) -> Result<bool> {
    if !token.has_params() {
        return Err(ctx.malformed("enum requires at least one option"));
    }
    ctx.enum_options = Some(token.params.clone());
    Ok(false)
}

fn set_options(ctx: &mut FieldContext<'_>, token: &Token, _: Option<&Token>) -> Result<bool> {
    if !token.has_params() {
        return Err(ctx.malformed("set requires at least one option"));
    }
    ctx.set_options = Some(token.params.clone());
    Ok(false)
}

/// `index` / `index(label)`. Without a label the index is named after the
/// column once its final name is known.
fn index(ctx: &mut FieldContext<'_>, token: &Token, _: Option<&Token>) -> Result<bool> {
    ctx.indexes.push((token.params.first().cloned(), IndexType::Plain));
    Ok(false)
}

fn unique(ctx: &mut FieldContext<'_>, token: &Token, _: Option<&Token>) -> Result<bool> {
    ctx.indexes.push((token.params.first().cloned(), IndexType::Unique));
    Ok(false)
}

fn cache(ctx: &mut FieldContext<'_>, _: &Token, _: Option<&Token>) -> Result<bool> {
    ctx.cache = true;
    Ok(false)
}

fn nocache(ctx: &mut FieldContext<'_>, _: &Token, _: Option<&Token>) -> Result<bool> {
    ctx.nocache = true;
    Ok(false)
}

fn only_to_db(ctx: &mut FieldContext<'_>, _: &Token, _: Option<&Token>) -> Result<bool> {
    ctx.to_db = true;
    Ok(false)
}

fn only_from_db(ctx: &mut FieldContext<'_>, _: &Token, _: Option<&Token>) -> Result<bool> {
    ctx.from_db = true;
    Ok(false)
}

fn utc(ctx: &mut FieldContext<'_>, _: &Token, _: Option<&Token>) -> Result<bool> {
    ctx.utc = true;
    Ok(false)
}

fn local(ctx: &mut FieldContext<'_>, _: &Token, _: Option<&Token>) -> Result<bool> {
    ctx.local = true;
    Ok(false)
}

/// `default(expr)` keeps the raw text; `default <token>` takes the next token verbatim.
fn default(ctx: &mut FieldContext<'_>, token: &Token, next: Option<&Token>) -> Result<bool> {
    if token.has_params() {
        ctx.default = Some(token.raw_params.join(","));
        return Ok(false);
    }
    match next {
        Some(next) => {
            ctx.default = Some(next.name.clone());
            Ok(true)
        }
        None => Err(ctx.malformed("default requires a value")),
    }
}

fn comment(ctx: &mut FieldContext<'_>, token: &Token, next: Option<&Token>) -> Result<bool> {
    if token.has_params() {
        ctx.comment = token.params.join(",");
        return Ok(false);
    }
    match next {
        Some(next) => {
            ctx.comment = next.name.trim_matches('\'').to_string();
            Ok(true)
        }
        None => Err(ctx.malformed("comment requires a value")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::SnakeMapper;
    use crate::tags::tokenizer::split_tag;

    fn build(field_type: FieldType, annotation: &str) -> Result<BuiltColumn> {
        let field = FieldDescriptor::new("FieldName", field_type).tag("orm", annotation);
        let tokens = split_tag(annotation)?;
        let mut ctx = FieldContext::new(&field, annotation);
        ctx.apply(&tokens)?;
        ctx.finish(&SnakeMapper, &HashMap::new())
    }

    fn col(field_type: FieldType, annotation: &str) -> Column {
        build(field_type, annotation).unwrap().column
    }

    #[test]
    fn test_pk_autoincr() {
        let c = col(FieldType::I64, "pk autoincr");
        assert!(c.is_primary_key);
        assert!(c.is_auto_increment);
        assert!(!c.nullable);
        assert_eq!(c.name, "field_name");

        let c = col(FieldType::I64, "autoincr");
        assert!(c.is_primary_key);
    }

    #[test]
    fn test_names() {
        assert_eq!(col(FieldType::String, "user_name").name, "user_name");
        assert_eq!(col(FieldType::String, "'user name' notnull").name, "user name");
        assert_eq!(col(FieldType::String, "'quoted' bare").name, "quoted");
        assert_eq!(col(FieldType::String, "bare 'quoted'").name, "quoted");
    }

    #[test]
    fn test_nullability() {
        assert!(!col(FieldType::String, "notnull").nullable);
        assert!(!col(FieldType::String, "not null").nullable);
        assert!(!col(FieldType::String, "NOT NULL").nullable);
        assert!(col(FieldType::String, "null").nullable);
        assert!(col(FieldType::String, "").nullable);
        assert!(build(FieldType::String, "pk").unwrap().column.nullable);
        assert!(!build(FieldType::String, "pk").unwrap().explicit_null);
        assert!(build(FieldType::String, "pk notnull").unwrap().explicit_null);
    }

    #[test]
    fn test_sql_types() {
        let c = col(FieldType::String, "varchar(32)");
        assert_eq!(c.sql_type, SqlType::with_length("VARCHAR", 32, 0));
        let c = col(FieldType::Decimal, "numeric(10, 2) notnull");
        assert_eq!(c.sql_type, SqlType::with_length("NUMERIC", 10, 2));
        let c = col(FieldType::String, "");
        assert_eq!(c.sql_type, SqlType::with_length("VARCHAR", 255, 0));
        assert!(matches!(
            build(FieldType::String, "varchar(abc)"),
            Err(MapError::MalformedAnnotation { .. })
        ));
    }

    #[test]
    fn test_enum_set() {
        let c = col(FieldType::String, "enum('alice', 'bob')");
        assert_eq!(c.sql_type.name, "ENUM");
        assert_eq!(c.enum_options.get("alice"), Some(&0));
        assert_eq!(c.enum_options.get("bob"), Some(&1));
        assert_eq!(c.enum_options.keys().collect::<Vec<_>>(), vec!["alice", "bob"]);

        let c = col(FieldType::String, "set('a','b','c')");
        assert_eq!(c.sql_type.name, "SET");
        assert_eq!(c.set_options.get("c"), Some(&2));
    }

    #[test]
    fn test_default_and_comment() {
        let c = col(FieldType::DateTime, "default '1970-01-01 00:00:00'");
        assert_eq!(c.default.as_deref(), Some("'1970-01-01 00:00:00'"));
        let c = col(FieldType::DateTime, "default(CURRENT_TIMESTAMP)");
        assert_eq!(c.default.as_deref(), Some("CURRENT_TIMESTAMP"));
        let c = col(FieldType::String, "default('x') comment('a, b')");
        assert_eq!(c.default.as_deref(), Some("'x'"));
        assert_eq!(c.comment, "a, b");
        assert!(build(FieldType::String, "default").is_err());
    }

    #[test]
    fn test_lifecycle() {
        let c = col(FieldType::DateTime, "created");
        assert!(c.is_created && c.nullable);
        let c = col(FieldType::String, "version");
        assert!(c.is_version);
        assert_eq!(c.sql_type.name, "VARCHAR");
    }

    #[test]
    fn test_json() {
        let c = col(FieldType::List(Box::new(FieldType::String)), "json");
        assert!(c.is_json);
        assert_eq!(c.sql_type.name, "TEXT");
        let c = col(FieldType::Map, "json varchar(1024)");
        assert_eq!(c.sql_type, SqlType::with_length("VARCHAR", 1024, 0));
        let c = col(FieldType::Map, "jsonb");
        assert!(c.is_json);
        assert_eq!(c.sql_type.name, "JSONB");
    }

    #[test]
    fn test_direction_and_zone() {
        assert_eq!(col(FieldType::DateTime, "->").map_type, MapType::OnlyToDb);
        assert_eq!(col(FieldType::DateTime, "<-").map_type, MapType::OnlyFromDb);
        assert_eq!(col(FieldType::DateTime, "utc").time_zone, Some(TimeZone::Utc));
        assert_eq!(col(FieldType::DateTime, "local").time_zone, Some(TimeZone::Local));
        assert_eq!(col(FieldType::I32, "utc").time_zone, Some(TimeZone::Utc));
    }

    #[test]
    fn test_indexes() {
        let c = col(FieldType::String, "index");
        assert_eq!(c.indexes.get("field_name"), Some(&IndexType::Plain));
        let c = col(FieldType::String, "index(s) unique(u)");
        assert_eq!(c.indexes.get("s"), Some(&IndexType::Plain));
        assert_eq!(c.indexes.get("u"), Some(&IndexType::Unique));
        assert!(build(FieldType::String, "index(s) unique(s)").is_err());
    }

    #[test]
    fn test_conflicts() {
        let conflicts = [
            (FieldType::I64, "autoincr null"),
            (FieldType::String, "enum('a') set('b')"),
            (FieldType::String, "json enum('a')"),
            (FieldType::DateTime, "json created"),
            (FieldType::DateTime, "created updated"),
            (FieldType::DateTime, "deleted notnull"),
            (FieldType::DateTime, "created pk"),
            (FieldType::String, "-> <-"),
            (FieldType::DateTime, "utc local"),
            (FieldType::String, "null notnull"),
        ];
        for (field_type, annotation) in conflicts {
            assert!(
                matches!(build(field_type, annotation), Err(MapError::ConflictingAnnotation { .. })),
                "expected conflict for {:?}",
                annotation
            );
        }
    }

    #[test]
    fn test_unknown_type() {
        let err = build(FieldType::Custom("Money".into()), "").unwrap_err();
        assert!(matches!(err, MapError::UnknownSqlType { .. }));
        let c = col(FieldType::Custom("Money".into()), "decimal(12,2)");
        assert_eq!(c.sql_type, SqlType::with_length("DECIMAL", 12, 2));
    }

    #[test]
    fn test_default_column_implicit_id() {
        let mut custom = HashMap::new();
        custom.insert("Money".to_string(), SqlType::with_length("DECIMAL", 12, 2));
        let id = FieldDescriptor::new("ID", FieldType::I64);
        assert!(default_column(&id, &SnakeMapper, &custom).unwrap().implicit_id);
        let id32 = FieldDescriptor::new("Id", FieldType::I32);
        assert!(!default_column(&id32, &SnakeMapper, &custom).unwrap().implicit_id);
        let money = FieldDescriptor::new("Price", FieldType::Custom("Money".into()));
        assert_eq!(
            default_column(&money, &SnakeMapper, &custom).unwrap().column.sql_type.name,
            "DECIMAL"
        );
    }
}
