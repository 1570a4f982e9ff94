//! Annotation-driven schema building.
//!
//! - [`tokenizer`]: splits one annotation string into [`Token`]s
//! - [`descriptor`]: entity and field descriptors
//! - [`parser`]: builds and memoizes [`Table`](crate::core::Table)s
//!
//! # Annotation grammar
//!
//! Keywords are matched case-insensitively:
//!
//! | Keyword | Effect |
//! |---|---|
//! | `pk`, `autoincr` | primary key, auto increment (implies pk and not null) |
//! | `null`, `notnull`, `not null` | nullability |
//! | `created`, `updated`, `deleted`, `version` | lifecycle columns |
//! | `index`, `index(label)`, `unique`, `unique(label)` | indexes |
//! | `enum(a,b)`, `set(a,b)` | ordered option lists |
//! | `json`, `jsonb` | serialized value |
//! | `default(expr)`, `default <token>`, `comment('text')` | column attributes |
//! | `->`, `<-` | write-only, read-only |
//! | `utc`, `local` | time zone |
//! | `cache`, `nocache` | table cacher registration |
//! | `extends` | flatten an embedded entity |
//! | `-` | skip the field |
//! | `varchar(32)`, `numeric(10,2)`, ... | explicit SQL type |
//! | `'name'` or `name` | column name |
//!
//! An unlabeled `index` or `unique` is labeled with the final column name,
//! after any rename and the column name mapper, never the field name. Its
//! DDL name is then `IDX_<table>_<label>` or `UQE_<table>_<label>` (see
//! [`Index::x_name`](crate::core::Index::x_name)).

pub mod descriptor;
mod handlers;
pub mod parser;
pub mod table_cache;
pub mod tokenizer;

pub use descriptor::{Entity, EntityDescriptor, FieldDescriptor, DEFAULT_IDENTIFIER};
pub use parser::Parser;
pub use table_cache::TableCache;
pub use tokenizer::{split_tag, Token};
