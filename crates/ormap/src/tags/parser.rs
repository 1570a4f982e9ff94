//! Entity descriptor to table schema.
//!
//! [`Parser::parse`] builds a [`Table`] from an [`EntityDescriptor`] and
//! memoizes it by type name. Fields are mapped in declaration order;
//! `extends` fields are flattened in place from registered entities.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{CacheManager, MemoryCacheManager};
use crate::core::schema::{SqlType, Table};
use crate::error::{MapError, Result};
use crate::names::{NameMapper, NamingConvention};
use crate::typemap::FieldType;

use super::descriptor::{Entity, EntityDescriptor, FieldDescriptor, DEFAULT_IDENTIFIER};
use super::handlers::{default_column, BuiltColumn, FieldContext};
use super::table_cache::TableCache;
use super::tokenizer::split_tag;

/// Table-level state collected while walking fields.
#[derive(Default)]
struct BuildState {
    /// Primary key columns whose nullability was not declared.
    implicit_null_pks: Vec<String>,
    implicit_id: Option<String>,
    cache: bool,
    nocache: bool,
}

/// Schema builder.
pub struct Parser {
    identifier: String,
    table_mapper: Arc<dyn NameMapper>,
    column_mapper: Arc<dyn NameMapper>,
    cache_manager: Arc<dyn CacheManager>,
    entities: HashMap<String, EntityDescriptor>,
    custom_types: HashMap<String, SqlType>,
    tables: TableCache,
}

impl Parser {
    pub fn new(
        identifier: impl Into<String>,
        table_mapper: Arc<dyn NameMapper>,
        column_mapper: Arc<dyn NameMapper>,
        cache_manager: Arc<dyn CacheManager>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            table_mapper,
            column_mapper,
            cache_manager,
            entities: HashMap::new(),
            custom_types: HashMap::new(),
            tables: TableCache::new(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Change the annotation identifier. Cached tables are dropped.
    pub fn set_identifier(&mut self, identifier: impl Into<String>) {
        self.identifier = identifier.into();
        self.tables.clear();
    }

    pub fn table_mapper(&self) -> &Arc<dyn NameMapper> {
        &self.table_mapper
    }

    pub fn column_mapper(&self) -> &Arc<dyn NameMapper> {
        &self.column_mapper
    }

    pub fn cache_manager(&self) -> &Arc<dyn CacheManager> {
        &self.cache_manager
    }

    pub fn table_cache(&self) -> &TableCache {
        &self.tables
    }

    /// Map a custom (or entity) value type to a SQL type.
    pub fn register_type(&mut self, type_name: impl Into<String>, sql_type: SqlType) {
        self.custom_types.insert(type_name.into(), sql_type);
        self.tables.clear();
    }

    /// Make an entity available for `extends` embedding.
    ///
    /// Replacing an already registered entity drops every memoized table,
    /// since any of them may embed it directly or through another entity.
    pub fn register_entity(&mut self, descriptor: EntityDescriptor) {
        let type_name = descriptor.type_name.clone();
        if self.entities.insert(type_name.clone(), descriptor).is_some() {
            debug!("Entity {} re-registered, clearing table cache", type_name);
            self.tables.clear();
        } else {
            self.tables.invalidate(&type_name);
        }
    }

    pub fn register<E: Entity>(&mut self) {
        self.register_entity(E::descriptor());
    }

    /// Build (or fetch the memoized) table for a descriptor.
    pub fn parse(&self, descriptor: &EntityDescriptor) -> Result<Arc<Table>> {
        self.tables
            .get_or_try_build(&descriptor.type_name, || self.parse_uncached(descriptor))
    }

    pub fn parse_entity<E: Entity>(&self) -> Result<Arc<Table>> {
        self.parse(&E::descriptor())
    }

    /// Build a table without consulting or filling the memo.
    pub fn parse_uncached(&self, descriptor: &EntityDescriptor) -> Result<Table> {
        let name = match &descriptor.table_name {
            Some(name) => name.clone(),
            None => self.table_mapper.obj_to_table(&descriptor.type_name),
        };
        let mut table = Table::new(name);
        let mut state = BuildState::default();
        let mut visited = vec![descriptor.type_name.clone()];

        self.map_fields(descriptor, "", &mut table, &mut state, &mut visited)?;
        self.resolve_keys(&mut table, &state);

        if state.nocache {
            self.cache_manager.unregister_cacher(&table.name);
        } else if state.cache {
            self.cache_manager.register_cacher(&table.name);
            table.cacheable = true;
        }

        debug!(
            "Built table '{}' for {} ({} columns, {} indexes)",
            table.name,
            descriptor.type_name,
            table.column_count(),
            table.indexes.len()
        );
        Ok(table)
    }

    fn map_fields(
        &self,
        descriptor: &EntityDescriptor,
        prefix: &str,
        table: &mut Table,
        state: &mut BuildState,
        visited: &mut Vec<String>,
    ) -> Result<()> {
        for field in descriptor.fields.iter().filter(|f| f.visible) {
            let annotation = field.annotation(&self.identifier);
            let tokens = match annotation {
                Some(annotation) => split_tag(annotation)?,
                None => Vec::new(),
            };
            if tokens.iter().any(|t| t.name == "-") {
                continue;
            }

            if tokens.iter().any(|t| t.is("extends")) {
                self.embed(field, prefix, table, state, visited)?;
                continue;
            }

            let mut built = match annotation {
                Some(annotation) => {
                    let mut ctx = FieldContext::new(field, annotation);
                    ctx.apply(&tokens)?;
                    ctx.finish(self.column_mapper.as_ref(), &self.custom_types)?
                }
                None => default_column(field, self.column_mapper.as_ref(), &self.custom_types)?,
            };
            if !prefix.is_empty() {
                built.column.field_name = format!("{}.{}", prefix, field.name);
            }
            self.add_column(table, state, built)?;
        }
        Ok(())
    }

    fn embed(
        &self,
        field: &FieldDescriptor,
        prefix: &str,
        table: &mut Table,
        state: &mut BuildState,
        visited: &mut Vec<String>,
    ) -> Result<()> {
        let type_name = match field.field_type.inner() {
            FieldType::Entity(name) => name,
            other => {
                return Err(MapError::conflict(
                    &field.name,
                    format!("extends requires an entity type, found {}", other),
                ))
            }
        };
        if visited.iter().any(|v| v == type_name) {
            return Err(MapError::CyclicEmbedding(format!(
                "{} -> {}",
                visited.join(" -> "),
                type_name
            )));
        }
        let nested = self
            .entities
            .get(type_name)
            .ok_or_else(|| MapError::UnknownEntity(type_name.clone()))?;
        if let Some(ignored) = &nested.table_name {
            warn!(
                "Table name '{}' of embedded entity {} is ignored",
                ignored, type_name
            );
        }

        let prefix = if prefix.is_empty() {
            field.name.clone()
        } else {
            format!("{}.{}", prefix, field.name)
        };
        visited.push(type_name.clone());
        self.map_fields(nested, &prefix, table, state, visited)?;
        visited.pop();
        Ok(())
    }

    fn add_column(&self, table: &mut Table, state: &mut BuildState, built: BuiltColumn) -> Result<()> {
        let BuiltColumn {
            column,
            explicit_null,
            cache,
            nocache,
            implicit_id,
        } = built;

        if table.get_column_mut(&column.name).is_some() {
            return Err(MapError::conflict(
                &column.field_name,
                format!("duplicate column '{}'", column.name),
            ));
        }
        for (label, kind) in &column.indexes {
            if let Some(existing) = table.indexes.get(label) {
                if existing.index_type != *kind {
                    return Err(MapError::conflict(
                        &column.field_name,
                        format!("index '{}' reused with a different kind", label),
                    ));
                }
            }
        }
        for (label, kind) in &column.indexes {
            table.add_index_column(label, *kind, &column.name);
        }

        if column.is_primary_key && !explicit_null && !column.is_auto_increment {
            state.implicit_null_pks.push(column.name.clone());
        }
        if implicit_id && state.implicit_id.is_none() {
            state.implicit_id = Some(column.name.clone());
        }
        state.cache |= cache;
        state.nocache |= nocache;
        table.add_column(column);
        Ok(())
    }

    /// Apply the implicit `id` key and sole-primary-key nullability.
    fn resolve_keys(&self, table: &mut Table, state: &BuildState) {
        if !table.has_pk() {
            if let Some(name) = &state.implicit_id {
                if let Some(col) = table.get_column_mut(name) {
                    col.is_primary_key = true;
                    col.is_auto_increment = true;
                    col.nullable = false;
                }
                table.primary_keys.push(name.clone());
                table.auto_increment = Some(name.clone());
            }
        }

        if table.has_single_pk() {
            for name in &state.implicit_null_pks {
                if let Some(col) = table.get_column_mut(name) {
                    col.nullable = false;
                }
            }
        }
    }
}

impl Default for Parser {
    /// `orm` identifier, snake-case mappers and an in-memory cache manager.
    fn default() -> Self {
        Self::new(
            DEFAULT_IDENTIFIER,
            NamingConvention::Snake.mapper(),
            NamingConvention::Snake.mapper(),
            Arc::new(MemoryCacheManager::new()),
        )
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("identifier", &self.identifier)
            .field("table_mapper", &self.table_mapper)
            .field("column_mapper", &self.column_mapper)
            .field("entities", &self.entities.len())
            .field("custom_types", &self.custom_types)
            .field("tables", &self.tables)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{IndexType, MapType, TimeZone};
    use crate::names::{GonicMapper, SameMapper, SnakeMapper};

    fn parser(identifier: &str, table: Arc<dyn NameMapper>, column: Arc<dyn NameMapper>) -> Parser {
        Parser::new(identifier, table, column, Arc::new(MemoryCacheManager::new()))
    }

    fn db_parser() -> Parser {
        parser("db", Arc::new(SnakeMapper), Arc::new(GonicMapper::new()))
    }

    fn field(name: &str, field_type: FieldType, annotation: &str) -> FieldDescriptor {
        FieldDescriptor::new(name, field_type).tag("db", annotation)
    }

    fn names(table: &Table) -> Vec<&str> {
        table.columns_seq()
    }

    #[test]
    fn test_table_name() {
        let p = db_parser();
        let table = p.parse(&EntityDescriptor::new("ParseTableName1")).unwrap();
        assert_eq!(table.name, "parse_table_name1");

        let desc = EntityDescriptor::new("ParseTableName2").with_table_name("p_parseTableName");
        assert_eq!(p.parse(&desc).unwrap().name, "p_parseTableName");
    }

    #[test]
    fn test_private_fields_ignored() {
        let p = parser("orm", Arc::new(SnakeMapper), Arc::new(SnakeMapper));
        let desc = EntityDescriptor::new("VanilaStruct")
            .field(FieldDescriptor::new("private", FieldType::I32).private())
            .field(FieldDescriptor::new("Public", FieldType::I32));
        let table = p.parse(&desc).unwrap();
        assert_eq!(table.name, "vanila_struct");
        assert_eq!(names(&table), vec!["public"]);

        let desc = EntityDescriptor::new("TaggedStruct")
            .field(FieldDescriptor::new("private", FieldType::I32).tag("orm", "private").private())
            .field(FieldDescriptor::new("Public", FieldType::I32).tag("orm", "-"));
        let table = p.parse(&desc).unwrap();
        assert_eq!(table.name, "tagged_struct");
        assert_eq!(table.column_count(), 0);
    }

    #[test]
    fn test_other_identifier() {
        let mut p = parser("orm", Arc::new(SameMapper), Arc::new(SnakeMapper));
        let desc = EntityDescriptor::new("StructWithDBTag")
            .field(FieldDescriptor::new("FieldFoo", FieldType::String).tag("db", "foo"));

        assert_eq!(names(&p.parse(&desc).unwrap()), vec!["field_foo"]);
        p.set_identifier("db");
        let table = p.parse(&desc).unwrap();
        assert_eq!(table.name, "StructWithDBTag");
        assert_eq!(names(&table), vec!["foo"]);
    }

    #[test]
    fn test_ignore() {
        let p = parser("db", Arc::new(SameMapper), Arc::new(SnakeMapper));
        let desc = EntityDescriptor::new("StructWithIgnoreTag")
            .field(field("FieldFoo", FieldType::String, "-"));
        assert_eq!(p.parse(&desc).unwrap().column_count(), 0);
    }

    #[test]
    fn test_implicit_id() {
        let p = db_parser();
        let desc = EntityDescriptor::new("StructWithAutoIncrement")
            .field(FieldDescriptor::new("ID", FieldType::I64));
        let table = p.parse(&desc).unwrap();
        assert_eq!(table.name, "struct_with_auto_increment");
        let id = table.get_column("id").unwrap();
        assert!(id.is_primary_key && id.is_auto_increment && !id.nullable);
        assert_eq!(table.primary_keys, vec!["id"]);
        assert_eq!(table.auto_increment.as_deref(), Some("id"));
    }

    #[test]
    fn test_implicit_id_skipped_with_explicit_pk() {
        let p = db_parser();
        let desc = EntityDescriptor::new("Keyed")
            .field(FieldDescriptor::new("ID", FieldType::I64))
            .field(field("Code", FieldType::String, "pk"));
        let table = p.parse(&desc).unwrap();
        assert_eq!(table.primary_keys, vec!["code"]);
        assert!(!table.get_column("id").unwrap().is_primary_key);
    }

    #[test]
    fn test_explicit_autoincr() {
        let p = db_parser();
        let desc = EntityDescriptor::new("StructWithAutoIncrement2")
            .field(field("ID", FieldType::I64, "pk autoincr"));
        let table = p.parse(&desc).unwrap();
        let id = table.get_column("id").unwrap();
        assert!(id.is_primary_key && id.is_auto_increment && !id.nullable);
    }

    #[test]
    fn test_nullable() {
        let p = db_parser();
        let desc = EntityDescriptor::new("StructWithNullable")
            .field(field("Name", FieldType::String, "notnull"))
            .field(field("FullName", FieldType::String, "null comment('column comment,字段注释')"));
        let table = p.parse(&desc).unwrap();
        assert_eq!(names(&table), vec!["name", "full_name"]);
        assert!(!table.get_column("name").unwrap().nullable);
        let full = table.get_column("full_name").unwrap();
        assert!(full.nullable);
        assert_eq!(full.comment, "column comment,字段注释");
    }

    #[test]
    fn test_sole_pk_not_null() {
        let p = db_parser();
        let single = EntityDescriptor::new("Single").field(field("Code", FieldType::String, "pk"));
        assert!(!p.parse(&single).unwrap().get_column("code").unwrap().nullable);

        let composite = EntityDescriptor::new("Composite")
            .field(field("A", FieldType::I64, "pk"))
            .field(field("B", FieldType::I64, "pk notnull"));
        let table = p.parse(&composite).unwrap();
        assert_eq!(table.primary_keys, vec!["a", "b"]);
        assert!(table.get_column("a").unwrap().nullable);
        assert!(!table.get_column("b").unwrap().nullable);
    }

    #[test]
    fn test_times() {
        let p = db_parser();
        let desc = EntityDescriptor::new("StructWithTimes")
            .field(field("Name", FieldType::String, "notnull"))
            .field(field("CreatedAt", FieldType::DateTime, "created"))
            .field(field("UpdatedAt", FieldType::DateTime, "updated"))
            .field(field("DeletedAt", FieldType::DateTime, "deleted"));
        let table = p.parse(&desc).unwrap();
        assert_eq!(names(&table), vec!["name", "created_at", "updated_at", "deleted_at"]);
        assert_eq!(table.created.as_deref(), Some("created_at"));
        assert_eq!(table.updated.as_deref(), Some("updated_at"));
        assert_eq!(table.deleted.as_deref(), Some("deleted_at"));
        assert!(table.columns().skip(1).all(|c| c.nullable));
    }

    fn embed_entity() -> EntityDescriptor {
        EntityDescriptor::new("StructWithEmbed")
            .field(FieldDescriptor::new("Name", FieldType::String))
            .field(field("CreatedAt", FieldType::DateTime, "created"))
            .field(field("UpdatedAt", FieldType::DateTime, "updated"))
            .field(field("DeletedAt", FieldType::DateTime, "deleted"))
    }

    #[test]
    fn test_extends() {
        let mut p = db_parser();
        p.register_entity(embed_entity());
        let desc = EntityDescriptor::new("StructWithExtends")
            .field(field("Id", FieldType::I64, "pk autoincr"))
            .field(field("SW", FieldType::Entity("StructWithEmbed".into()), "extends"))
            .field(FieldDescriptor::new("Tail", FieldType::I32));
        let table = p.parse(&desc).unwrap();
        assert_eq!(table.name, "struct_with_extends");
        assert_eq!(
            names(&table),
            vec!["id", "name", "created_at", "updated_at", "deleted_at", "tail"]
        );
        let created = table.get_column("created_at").unwrap();
        assert!(created.is_created && created.nullable);
        assert_eq!(created.field_name, "SW.CreatedAt");
        assert_eq!(table.deleted.as_deref(), Some("deleted_at"));
    }

    #[test]
    fn test_extends_nested_pk_preserved() {
        let mut p = db_parser();
        p.register_entity(
            EntityDescriptor::new("Base").field(field("Id", FieldType::I64, "pk autoincr")),
        );
        p.register_entity(
            EntityDescriptor::new("Middle")
                .field(field("B", FieldType::Entity("Base".into()), "extends"))
                .field(FieldDescriptor::new("Note", FieldType::String)),
        );
        let desc = EntityDescriptor::new("Top")
            .field(field("M", FieldType::Entity("Middle".into()), "extends"));
        let table = p.parse(&desc).unwrap();
        assert_eq!(names(&table), vec!["id", "note"]);
        assert_eq!(table.primary_keys, vec!["id"]);
        assert_eq!(table.get_column("id").unwrap().field_name, "M.B.Id");
    }

    #[test]
    fn test_cyclic_embedding() {
        let mut p = db_parser();
        p.register_entity(
            EntityDescriptor::new("A").field(field("B", FieldType::Entity("B".into()), "extends")),
        );
        p.register_entity(
            EntityDescriptor::new("B").field(field("A", FieldType::Entity("A".into()), "extends")),
        );
        let desc = EntityDescriptor::new("A")
            .field(field("B", FieldType::Entity("B".into()), "extends"));
        let err = p.parse(&desc).unwrap_err();
        assert!(matches!(err, MapError::CyclicEmbedding(ref path) if path == "A -> B -> A"));
    }

    #[test]
    fn test_extends_errors() {
        let p = db_parser();
        let unknown = EntityDescriptor::new("Outer")
            .field(field("X", FieldType::Entity("Missing".into()), "extends"));
        assert!(matches!(p.parse(&unknown), Err(MapError::UnknownEntity(_))));

        let scalar = EntityDescriptor::new("Outer2").field(field("X", FieldType::I32, "extends"));
        assert!(matches!(
            p.parse(&scalar),
            Err(MapError::ConflictingAnnotation { .. })
        ));
    }

    #[test]
    fn test_cache() {
        let p = db_parser();
        let desc = EntityDescriptor::new("StructWithCache")
            .field(field("Name", FieldType::String, "cache"));
        let table = p.parse(&desc).unwrap();
        assert!(table.cacheable);
        assert!(table.get_column("name").unwrap().nullable);
        assert!(p.cache_manager().get_cacher(&table.name).is_some());
    }

    #[test]
    fn test_nocache() {
        let p = db_parser();
        p.cache_manager().register_cacher("struct_with_no_cache");
        let desc = EntityDescriptor::new("StructWithNoCache")
            .field(field("Name", FieldType::String, "nocache"));
        let table = p.parse(&desc).unwrap();
        assert!(!table.cacheable);
        assert!(p.cache_manager().get_cacher(&table.name).is_none());

        let plain = EntityDescriptor::new("Plain").field(FieldDescriptor::new("Name", FieldType::String));
        let table = p.parse(&plain).unwrap();
        assert!(p.cache_manager().get_cacher(&table.name).is_none());
    }

    #[test]
    fn test_enum_and_set() {
        let p = db_parser();
        let desc = EntityDescriptor::new("StructWithEnum")
            .field(field("Name", FieldType::String, "enum('alice', 'bob')"))
            .field(field("Tags", FieldType::String, "set('x', 'y')"));
        let table = p.parse(&desc).unwrap();
        let name = table.get_column("name").unwrap();
        assert_eq!(name.sql_type.name, "ENUM");
        assert_eq!(name.enum_options.get("alice"), Some(&0));
        assert_eq!(name.enum_options.get("bob"), Some(&1));
        assert_eq!(table.get_column("tags").unwrap().set_options.get("y"), Some(&1));
    }

    #[test]
    fn test_indexes() {
        let p = db_parser();
        let desc = EntityDescriptor::new("StructWithIndex")
            .field(field("Name", FieldType::String, "index"))
            .field(field("Name2", FieldType::String, "index(s)"))
            .field(field("Name3", FieldType::String, "unique"))
            .field(field("Name4", FieldType::String, "index(s)"));
        let table = p.parse(&desc).unwrap();
        assert_eq!(names(&table), vec!["name", "name2", "name3", "name4"]);
        assert!(table.columns().all(|c| c.indexes.len() == 1));
        assert_eq!(table.indexes["s"].columns, vec!["name2", "name4"]);
        assert_eq!(table.indexes["name3"].index_type, IndexType::Unique);
        assert_eq!(table.indexes["name"].x_name(&table.name), "IDX_struct_with_index_name");
    }

    #[test]
    fn test_unlabeled_index_named_after_column() {
        let p = db_parser();
        let desc = EntityDescriptor::new("Member")
            .field(field("Email", FieldType::String, "'mail_addr' unique"))
            .field(field("NickName", FieldType::String, "index"))
            .field(field("UserID", FieldType::I64, "handle index"));
        let table = p.parse(&desc).unwrap();
        assert_eq!(names(&table), vec!["mail_addr", "nick_name", "handle"]);

        let keys: Vec<&str> = table.indexes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["mail_addr", "nick_name", "handle"]);
        assert_eq!(table.indexes["mail_addr"].x_name(&table.name), "UQE_member_mail_addr");
        assert_eq!(table.indexes["nick_name"].x_name(&table.name), "IDX_member_nick_name");
        assert_eq!(table.indexes["handle"].x_name(&table.name), "IDX_member_handle");
    }

    #[test]
    fn test_index_kind_conflict() {
        let p = db_parser();
        let desc = EntityDescriptor::new("Clash")
            .field(field("A", FieldType::String, "index(s)"))
            .field(field("B", FieldType::String, "unique(s)"));
        assert!(matches!(p.parse(&desc), Err(MapError::ConflictingAnnotation { .. })));
    }

    #[test]
    fn test_duplicate_column() {
        let p = db_parser();
        let desc = EntityDescriptor::new("Dup")
            .field(field("A", FieldType::String, "name"))
            .field(field("B", FieldType::String, "name"));
        assert!(matches!(p.parse(&desc), Err(MapError::ConflictingAnnotation { .. })));
    }

    #[test]
    fn test_version_and_locale() {
        let p = db_parser();
        let desc = EntityDescriptor::new("StructWithLocale")
            .field(field("UTCLocale", FieldType::DateTime, "utc"))
            .field(field("LocalLocale", FieldType::DateTime, "local"))
            .field(field("Version", FieldType::I32, "version"));
        let table = p.parse(&desc).unwrap();
        assert_eq!(names(&table), vec!["utc_locale", "local_locale", "version"]);
        assert_eq!(table.get_column("utc_locale").unwrap().time_zone, Some(TimeZone::Utc));
        assert_eq!(table.get_column("local_locale").unwrap().time_zone, Some(TimeZone::Local));
        assert!(table.get_column("version").unwrap().nullable);
        assert_eq!(table.version.as_deref(), Some("version"));
    }

    #[test]
    fn test_only_to_db_and_json() {
        let p = parser("db", Arc::new(GonicMapper::with_initialisms(["DB"])), Arc::new(SnakeMapper));
        let desc = EntityDescriptor::new("StructWithOnlyToDB")
            .field(field("Default1", FieldType::DateTime, "->"))
            .field(field("Default2", FieldType::DateTime, "<-"))
            .field(field("Default3", FieldType::List(Box::new(FieldType::String)), "json"));
        let table = p.parse(&desc).unwrap();
        assert_eq!(table.name, "struct_with_only_to_db");
        assert_eq!(table.get_column("default1").unwrap().map_type, MapType::OnlyToDb);
        assert_eq!(table.get_column("default2").unwrap().map_type, MapType::OnlyFromDb);
        assert!(table.get_column("default3").unwrap().is_json);
    }

    #[test]
    fn test_sql_type() {
        let p = db_parser();
        let desc = EntityDescriptor::new("StructWithSQLType")
            .field(field("Col1", FieldType::String, "varchar(32)"))
            .field(field("Col2", FieldType::String, "char(32)"))
            .field(field("Int", FieldType::I64, "bigint"))
            .field(field("DateTime", FieldType::DateTime, "datetime"))
            .field(field("UUID", FieldType::String, "uuid"));
        let table = p.parse(&desc).unwrap();
        assert_eq!(table.name, "struct_with_sql_type");
        assert_eq!(names(&table), vec!["col1", "col2", "int", "date_time", "uuid"]);
        let types: Vec<&str> = table.columns().map(|c| c.sql_type.name.as_str()).collect();
        assert_eq!(types, vec!["VARCHAR", "CHAR", "BIGINT", "DATETIME", "UUID"]);
        assert_eq!(table.get_column("col1").unwrap().sql_type.length, 32);
    }

    #[test]
    fn test_register_type() {
        let mut p = db_parser();
        let desc = EntityDescriptor::new("Priced")
            .field(FieldDescriptor::new("Price", FieldType::Custom("Money".into())));
        assert!(matches!(p.parse(&desc), Err(MapError::UnknownSqlType { .. })));

        p.register_type("Money", SqlType::with_length("DECIMAL", 12, 2));
        let table = p.parse(&desc).unwrap();
        assert_eq!(table.get_column("price").unwrap().sql_type.to_string(), "DECIMAL(12,2)");
    }

    #[test]
    fn test_entity_field_with_explicit_type() {
        let p = db_parser();
        let desc = EntityDescriptor::new("Userinfo")
            .field(field("Uid", FieldType::I64, "id pk not null autoincr"))
            .field(field("Detail", FieldType::Entity("Userdetail".into()), "detail_id int(11)"));
        let table = p.parse(&desc).unwrap();
        assert_eq!(names(&table), vec!["id", "detail_id"]);
        assert_eq!(table.get_column("detail_id").unwrap().sql_type.to_string(), "INT(11)");
    }

    #[test]
    fn test_parse_is_memoized() {
        let p = db_parser();
        let desc = EntityDescriptor::new("Memo").field(FieldDescriptor::new("Name", FieldType::String));
        let a = p.parse(&desc).unwrap();
        let b = p.parse(&desc).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(p.table_cache().len(), 1);
        let fresh = p.parse_uncached(&desc).unwrap();
        assert_eq!(*a, fresh);
    }

    #[test]
    fn test_reregistered_entity_refreshes_embedding_tables() {
        let mut p = db_parser();
        p.register_entity(
            EntityDescriptor::new("Audit").field(field("CreatedAt", FieldType::DateTime, "created")),
        );
        p.register_entity(
            EntityDescriptor::new("Middle")
                .field(field("A", FieldType::Entity("Audit".into()), "extends"))
                .field(FieldDescriptor::new("Note", FieldType::String)),
        );
        let top = EntityDescriptor::new("Top")
            .field(FieldDescriptor::new("Title", FieldType::String))
            .field(field("M", FieldType::Entity("Middle".into()), "extends"));
        let before = p.parse(&top).unwrap();
        assert_eq!(names(&before), vec!["title", "created_at", "note"]);

        // a new entity leaves existing tables memoized
        p.register_entity(EntityDescriptor::new("Unrelated"));
        assert!(Arc::ptr_eq(&before, &p.parse(&top).unwrap()));

        p.register_entity(
            EntityDescriptor::new("Audit")
                .field(field("CreatedAt", FieldType::DateTime, "created"))
                .field(field("DeletedAt", FieldType::DateTime, "deleted")),
        );
        let after = p.parse(&top).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(names(&after), vec!["title", "created_at", "deleted_at", "note"]);
        assert_eq!(after.deleted.as_deref(), Some("deleted_at"));
    }

    struct Account;

    impl Entity for Account {
        fn descriptor() -> EntityDescriptor {
            EntityDescriptor::new("Account")
                .field(FieldDescriptor::new("ID", FieldType::I64).tag("orm", "pk autoincr"))
                .field(FieldDescriptor::new("Email", FieldType::String).tag("orm", "varchar(128) unique"))
        }
    }

    #[test]
    fn test_entity_trait() {
        let mut p = Parser::default();
        p.register::<Account>();
        let table = p.parse_entity::<Account>().unwrap();
        assert_eq!(table.name, "account");
        assert_eq!(table.primary_keys, vec!["id"]);
        assert_eq!(table.indexes["email"].index_type, IndexType::Unique);
    }
}
