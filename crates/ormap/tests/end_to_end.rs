//! End-to-end tests: descriptor → table → dialect DDL → filtered SQL.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ormap::cache::MemoryCacheManager;
use ormap::core::{CreateTableOptions, IndexType};
use ormap::drivers::{MysqlDialect, SqliteDialect};
use ormap::names::{GonicMapper, SnakeMapper};
use ormap::{
    apply_filters, Config, Dialect, DialectRegistry, EntityDescriptor, FieldDescriptor, FieldType,
    MapError, Parser, Table,
};

fn snake_parser() -> Parser {
    Parser::new(
        "orm",
        Arc::new(SnakeMapper),
        Arc::new(SnakeMapper),
        Arc::new(MemoryCacheManager::new()),
    )
}

fn field(name: &str, field_type: FieldType, annotation: &str) -> FieldDescriptor {
    FieldDescriptor::new(name, field_type).tag("orm", annotation)
}

// =============================================================================
// Schema building
// =============================================================================

#[test]
fn test_pk_autoincr_on_id() {
    let parser = snake_parser();
    let desc = EntityDescriptor::new("User").field(field("ID", FieldType::I64, "pk autoincr"));
    let table = parser.parse(&desc).unwrap();

    let id = table.get_column("id").unwrap();
    assert_eq!(id.name, "id");
    assert!(id.is_primary_key);
    assert!(id.is_auto_increment);
    assert!(!id.nullable);
}

#[test]
fn test_explicit_varchar() {
    let parser = snake_parser();
    let desc = EntityDescriptor::new("User").field(field("Name", FieldType::String, "varchar(32)"));
    let table = parser.parse(&desc).unwrap();

    let name = table.get_column("name").unwrap();
    assert_eq!(name.sql_type.name, "VARCHAR");
    assert_eq!(name.sql_type.length, 32);
}

#[test]
fn test_descriptor_from_yaml() {
    let yaml = r#"
type_name: Product
fields:
  - name: ID
    type: i64
  - name: Sku
    type: string
    annotations:
      db: "varchar(16) notnull unique"
  - name: Price
    type: decimal
    annotations:
      db: "numeric(10,2) default(0)"
"#;
    let desc = EntityDescriptor::from_yaml(yaml).unwrap();
    let parser = Parser::new(
        "db",
        Arc::new(SnakeMapper),
        Arc::new(GonicMapper::new()),
        Arc::new(MemoryCacheManager::new()),
    );
    let table = parser.parse(&desc).unwrap();
    assert_eq!(table.name, "product");
    assert_eq!(table.columns_seq(), vec!["id", "sku", "price"]);
    assert_eq!(table.auto_increment.as_deref(), Some("id"));
    assert_eq!(table.indexes["sku"].index_type, IndexType::Unique);
    assert_eq!(table.get_column("price").unwrap().default.as_deref(), Some("0"));
}

// =============================================================================
// DDL rendering
// =============================================================================

#[test]
fn test_composite_pk_mysql() {
    let registry = DialectRegistry::with_builtins();
    let dialect = registry
        .open("mysql", "app:pw@tcp(localhost:3306)/shop?charset=utf8mb4")
        .unwrap();

    let desc = EntityDescriptor::new("OrderItem")
        .field(field("OrderID", FieldType::I64, "pk notnull"))
        .field(field("ItemID", FieldType::I64, "pk notnull"))
        .field(field("Qty", FieldType::I32, "notnull default(1)"))
        .field(field("Note", FieldType::String, "comment('gift note')"));
    let table = snake_parser().parse(&desc).unwrap();
    assert_eq!(table.primary_keys, vec!["order_id", "item_id"]);

    let opts = CreateTableOptions {
        store_engine: Some("InnoDB".into()),
        ..Default::default()
    };
    assert_eq!(
        dialect.create_table_sql(&table, &opts).sql,
        "CREATE TABLE IF NOT EXISTS `order_item` (`order_id` BIGINT(20) NOT NULL, \
         `item_id` BIGINT(20) NOT NULL, `qty` INT DEFAULT 1 NOT NULL, \
         `note` VARCHAR(255) NULL COMMENT 'gift note', PRIMARY KEY (`order_id`, `item_id`)) \
         ENGINE=InnoDB DEFAULT CHARSET utf8mb4"
    );
}

#[test]
fn test_single_pk_inline_has_no_trailing_clause() {
    let dialect = MysqlDialect::new();
    let desc = EntityDescriptor::new("Tag")
        .field(FieldDescriptor::new("ID", FieldType::I64))
        .field(field("Label", FieldType::String, "varchar(20)"));
    let table = snake_parser().parse(&desc).unwrap();
    let sql = dialect.create_table_sql(&table, &CreateTableOptions::default()).sql;

    assert_eq!(
        sql,
        "CREATE TABLE IF NOT EXISTS `tag` (`id` BIGINT(20) PRIMARY KEY AUTO_INCREMENT NOT NULL, \
         `label` VARCHAR(20) NULL)"
    );
    assert!(!sql.contains("PRIMARY KEY ("));
}

#[test]
fn test_embedded_columns_sqlite() {
    let mut parser = snake_parser();
    parser.register_entity(
        EntityDescriptor::new("Audit")
            .field(field("CreatedAt", FieldType::DateTime, "created"))
            .field(field("UpdatedAt", FieldType::DateTime, "updated")),
    );
    let desc = EntityDescriptor::new("Post")
        .field(FieldDescriptor::new("ID", FieldType::I64))
        .field(field("Title", FieldType::String, "varchar(100) notnull"))
        .field(field("Audit", FieldType::Entity("Audit".into()), "extends"))
        .field(field("Body", FieldType::String, "text"));
    let table = parser.parse(&desc).unwrap();

    let dialect = SqliteDialect::new();
    assert_eq!(
        dialect.create_table_sql(&table, &CreateTableOptions::default()).sql,
        "CREATE TABLE IF NOT EXISTS `post` (`id` INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, \
         `title` TEXT NOT NULL, `created_at` DATETIME NULL, `updated_at` DATETIME NULL, \
         `body` TEXT NULL)"
    );
}

#[test]
fn test_index_statements_across_dialects() {
    let registry = DialectRegistry::with_builtins();
    let desc = EntityDescriptor::new("Account")
        .field(field("Email", FieldType::String, "unique"))
        .field(field("First", FieldType::String, "index(full_name)"))
        .field(field("Last", FieldType::String, "index(full_name)"));
    let table = snake_parser().parse(&desc).unwrap();
    let unique = &table.indexes["email"];
    let composite = &table.indexes["full_name"];

    let mysql = registry.lookup("mysql").unwrap();
    assert_eq!(
        mysql.create_index_sql(&table.name, unique).sql,
        "CREATE UNIQUE INDEX `UQE_account_email` ON `account` (`email`)"
    );
    assert_eq!(
        mysql.create_index_sql(&table.name, composite).sql,
        "CREATE INDEX `IDX_account_full_name` ON `account` (`first`,`last`)"
    );

    let mssql = registry.lookup("sqlserver").unwrap();
    assert_eq!(
        mssql.drop_index_sql(&table.name, unique).sql,
        "DROP INDEX [UQE_account_email] ON [account]"
    );
}

#[test]
fn test_clickhouse_table_from_registry() {
    let registry = DialectRegistry::with_builtins();
    let dialect = registry
        .open("clickhouse", "tcp://localhost:9000?username=app&database=clicks&read_timeout=10")
        .unwrap();
    assert_eq!(dialect.uri().database, "clicks");

    let desc = EntityDescriptor::new("PageView")
        .field(FieldDescriptor::new("ID", FieldType::I64))
        .field(field("Path", FieldType::String, "varchar(255) notnull index"))
        .field(field("Referrer", FieldType::String, "varchar(255)"));
    let table = snake_parser().parse(&desc).unwrap();

    assert_eq!(
        dialect.create_table_sql(&table, &CreateTableOptions::default()).sql,
        "CREATE TABLE IF NOT EXISTS `page_view` (`id` Int64, `path` String, \
         `referrer` Nullable(String)) ENGINE = MergeTree() ORDER BY (`id`)"
    );
    assert_eq!(
        dialect.create_index_sql(&table.name, &table.indexes["path"]).sql,
        "ALTER TABLE `page_view` ADD INDEX `IDX_page_view_path` (`path`) TYPE minmax GRANULARITY 1"
    );
    let sql = "SELECT 1 WHERE (id) = ?";
    assert_eq!(apply_filters(dialect.as_ref(), Some(&table), sql), sql);
}

// =============================================================================
// Filters
// =============================================================================

#[test]
fn test_postgres_filter_pipeline() {
    let registry = DialectRegistry::with_builtins();
    let dialect = registry.open("postgres", "postgres://app@localhost/shop").unwrap();
    let desc = EntityDescriptor::new("User")
        .field(FieldDescriptor::new("ID", FieldType::I64))
        .field(FieldDescriptor::new("Name", FieldType::String))
        .field(FieldDescriptor::new("Note", FieldType::String));
    let table = snake_parser().parse(&desc).unwrap();

    let sql = "SELECT `name` FROM `user` WHERE (id) = ? AND note = 'why `?`' AND name = ?";
    assert_eq!(
        apply_filters(dialect.as_ref(), Some(&table), sql),
        "SELECT \"name\" FROM \"user\" WHERE \"id\" = $1 AND note = 'why `?`' AND name = $2"
    );
}

#[test]
fn test_mysql_keeps_placeholders() {
    let dialect = MysqlDialect::new();
    let sql = "UPDATE `user` SET `name` = ? WHERE `id` = ?";
    assert_eq!(apply_filters(&dialect, None, sql), sql);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_drives_dialect_and_parser() {
    let config = Config::from_yaml(
        r#"
database:
  dialect: postgresql
  connection: "host=localhost port=5432 user=app dbname=shop search_path=sales"
  quote_policy: reserved
mapping:
  identifier: db
  column_mapper: gonic
"#,
    )
    .unwrap();
    let dialect = config.open_dialect(&DialectRegistry::with_builtins()).unwrap();
    let parser = config.build_parser(Arc::new(MemoryCacheManager::new()));

    let desc = EntityDescriptor::new("User")
        .field(FieldDescriptor::new("UserID", FieldType::I64).tag("db", "pk"))
        .field(FieldDescriptor::new("Order", FieldType::I32));
    let table = parser.parse(&desc).unwrap();
    assert_eq!(table.columns_seq(), vec!["user_id", "order"]);
    assert_eq!(
        dialect.create_table_sql(&table, &config.create_table_options()).sql,
        "CREATE TABLE IF NOT EXISTS sales.\"user\" (user_id BIGINT PRIMARY KEY NOT NULL, \"order\" INTEGER NULL)"
    );
}

#[test]
fn test_unknown_dialect_in_config() {
    let config = Config::from_yaml("database:\n  dialect: oracle\n  connection: x\n").unwrap();
    let err = config.open_dialect(&DialectRegistry::with_builtins()).unwrap_err();
    assert!(matches!(err, MapError::UnknownDialect(_)));
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_concurrent_first_parse_builds_once() {
    let parser = snake_parser();
    let desc = EntityDescriptor::new("Shared")
        .field(field("ID", FieldType::I64, "pk autoincr"))
        .field(field("Name", FieldType::String, "varchar(64) index"))
        .field(field("Kind", FieldType::String, "enum('a','b','c')"));

    let tables: Vec<Arc<Table>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..16)
            .map(|_| s.spawn(|| parser.parse(&desc).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(tables.iter().all(|t| Arc::ptr_eq(t, &tables[0])));
    assert_eq!(tables[0].columns_seq(), vec!["id", "name", "kind"]);
    assert_eq!(parser.table_cache().len(), 1);
}

#[test]
fn test_concurrent_builds_of_distinct_types() {
    let parser = snake_parser();
    let builds = AtomicUsize::new(0);
    std::thread::scope(|s| {
        for i in 0..8 {
            let parser = &parser;
            let builds = &builds;
            s.spawn(move || {
                let desc = EntityDescriptor::new(format!("Entity{}", i))
                    .field(field("Value", FieldType::I32, "notnull"));
                let table = parser.parse(&desc).unwrap();
                assert_eq!(table.name, format!("entity{}", i));
                builds.fetch_add(1, Ordering::SeqCst);
            });
        }
    });
    assert_eq!(builds.load(Ordering::SeqCst), 8);
    assert_eq!(parser.table_cache().len(), 8);
}
