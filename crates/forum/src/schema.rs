//! Table schemas derived from entity fields, and the DDL they render to.
//!
//! Statements are built with sea-query and rendered for a specific
//! [`DatabaseBackend`]. The only hand-written SQL is the SQLite table rebuild
//! in [`rebuild_with_foreign_key_sql`].

use std::collections::HashSet;

use sea_query::{
    Alias, ColumnDef as SeaColumnDef, ForeignKey as SeaForeignKey, ForeignKeyAction,
    ForeignKeyCreateStatement, PostgresQueryBuilder, SchemaStatementBuilder, SqliteQueryBuilder,
    Table, TableCreateStatement,
};

/// Database backend for SQL generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    Postgres,
    Sqlite,
}

fn build_schema_statement<T: SchemaStatementBuilder>(stmt: &T, backend: DatabaseBackend) -> String {
    match backend {
        DatabaseBackend::Postgres => stmt.to_string(PostgresQueryBuilder),
        DatabaseBackend::Sqlite => stmt.to_string(SqliteQueryBuilder),
    }
}

/// Column types the forum schema needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Auto-incrementing 64-bit primary key.
    Id,
    BigInt,
    Varchar(u32),
    Text,
    Timestamp,
}

impl ColumnType {
    fn apply(&self, col: &mut SeaColumnDef, backend: DatabaseBackend) {
        match self {
            // SQLite only autoincrements an INTEGER PRIMARY KEY, which is 64-bit there
            ColumnType::Id => {
                match backend {
                    DatabaseBackend::Postgres => col.big_integer(),
                    DatabaseBackend::Sqlite => col.integer(),
                };
                col.not_null().auto_increment().primary_key();
            }
            ColumnType::BigInt => {
                col.big_integer();
            }
            ColumnType::Varchar(len) => {
                col.string_len(*len);
            }
            ColumnType::Text => {
                col.text();
            }
            ColumnType::Timestamp => {
                col.timestamp_with_time_zone();
            }
        }
    }

    /// Type used when the column is added to an existing table, where a
    /// primary key can no longer be declared.
    fn apply_added(&self, col: &mut SeaColumnDef, backend: DatabaseBackend) {
        match self {
            ColumnType::Id => ColumnType::BigInt.apply(col, backend),
            other => other.apply(col, backend),
        }
    }
}

/// A single declared column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
    pub unique: bool,
}

impl ColumnDef {
    /// Creates a nullable, non-unique column.
    pub const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            nullable: true,
            unique: false,
        }
    }

    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    fn to_sea(&self, backend: DatabaseBackend) -> SeaColumnDef {
        let mut col = SeaColumnDef::new(Alias::new(self.name));
        self.ty.apply(&mut col, backend);
        if self.ty != ColumnType::Id {
            if !self.nullable {
                col.not_null();
            }
            if self.unique {
                col.unique_key();
            }
        }
        col
    }
}

/// Table definition: a name and its ordered columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    pub fn new(name: &'static str, columns: Vec<ColumnDef>) -> Self {
        Self { name, columns }
    }

    /// `CREATE TABLE IF NOT EXISTS` for this table.
    pub fn create_sql(&self, backend: DatabaseBackend) -> String {
        let stmt = self.create_statement(backend, self.name).if_not_exists().to_owned();
        build_schema_statement(&stmt, backend)
    }

    /// `CREATE TABLE` under another name, with foreign keys declared inline.
    pub fn create_sql_as(
        &self,
        backend: DatabaseBackend,
        name: &str,
        foreign_keys: &[ForeignKey],
    ) -> String {
        let mut stmt = self.create_statement(backend, name);
        for fk in foreign_keys {
            stmt.foreign_key(&mut fk.create_statement());
        }
        build_schema_statement(&stmt, backend)
    }

    /// `ALTER TABLE ... ADD COLUMN` for a column of this table. The added
    /// column only carries its type, so it can be applied to populated tables.
    pub fn add_column_sql(&self, backend: DatabaseBackend, column: &ColumnDef) -> String {
        let mut col = SeaColumnDef::new(Alias::new(column.name));
        column.ty.apply_added(&mut col, backend);

        let stmt = Table::alter()
            .table(Alias::new(self.name))
            .add_column(&mut col)
            .to_owned();
        build_schema_statement(&stmt, backend)
    }

    /// Declared columns that are absent from `existing`.
    pub fn missing_columns(&self, existing: &HashSet<String>) -> Vec<&ColumnDef> {
        self.columns
            .iter()
            .filter(|c| !existing.contains(c.name))
            .collect()
    }

    /// Comma-separated, quoted column names.
    pub fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| quote_ident(c.name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn create_statement(&self, backend: DatabaseBackend, name: &str) -> TableCreateStatement {
        let mut stmt = Table::create();
        stmt.table(Alias::new(name));
        for column in &self.columns {
            stmt.col(&mut column.to_sea(backend));
        }
        stmt
    }
}

/// What a foreign key does when the referenced row changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceAction {
    Cascade,
    SetNull,
    Restrict,
    NoAction,
}

impl ReferenceAction {
    fn to_sea(self) -> ForeignKeyAction {
        match self {
            ReferenceAction::Cascade => ForeignKeyAction::Cascade,
            ReferenceAction::SetNull => ForeignKeyAction::SetNull,
            ReferenceAction::Restrict => ForeignKeyAction::Restrict,
            ReferenceAction::NoAction => ForeignKeyAction::NoAction,
        }
    }
}

/// Single-column foreign key from `table.column` to `ref_table.ref_column`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: &'static str,
    pub column: &'static str,
    pub ref_table: &'static str,
    pub ref_column: &'static str,
    pub on_delete: ReferenceAction,
    pub on_update: ReferenceAction,
}

impl ForeignKey {
    /// Constraint name, e.g. `posts_author_id_users_id_foreign`.
    pub fn name(&self) -> String {
        format!(
            "{}_{}_{}_{}_foreign",
            self.table, self.column, self.ref_table, self.ref_column
        )
    }

    /// `ALTER TABLE ... ADD CONSTRAINT`. Postgres only; SQLite has to rebuild
    /// the table, see [`rebuild_with_foreign_key_sql`].
    pub fn add_sql(&self) -> String {
        build_schema_statement(&self.create_statement(), DatabaseBackend::Postgres)
    }

    fn create_statement(&self) -> ForeignKeyCreateStatement {
        SeaForeignKey::create()
            .name(self.name())
            .from(Alias::new(self.table), Alias::new(self.column))
            .to(Alias::new(self.ref_table), Alias::new(self.ref_column))
            .on_delete(self.on_delete.to_sea())
            .on_update(self.on_update.to_sea())
            .to_owned()
    }
}

/// `DROP TABLE IF EXISTS`. Postgres also drops constraints other tables hold
/// on this one.
pub fn drop_table_sql(backend: DatabaseBackend, table: &str) -> String {
    let mut stmt = Table::drop();
    stmt.table(Alias::new(table)).if_exists();
    if backend == DatabaseBackend::Postgres {
        stmt.cascade();
    }
    build_schema_statement(&stmt, backend)
}

/// Statements that recreate `table` on SQLite with `fk` declared, keeping
/// its rows. Meant to run inside one transaction.
///
/// SQLite has no `ALTER TABLE ... ADD CONSTRAINT`, so only the new table's
/// `CREATE` goes through the builder.
pub fn rebuild_with_foreign_key_sql(table: &TableSchema, fk: &ForeignKey) -> Vec<String> {
    let rebuilt = format!("{}__rebuild", table.name);
    let columns = table.column_list();

    vec![
        table.create_sql_as(DatabaseBackend::Sqlite, &rebuilt, std::slice::from_ref(fk)),
        format!(
            "INSERT INTO {} ({columns}) SELECT {columns} FROM {}",
            quote_ident(&rebuilt),
            quote_ident(table.name)
        ),
        format!("DROP TABLE {}", quote_ident(table.name)),
        format!(
            "ALTER TABLE {} RENAME TO {}",
            quote_ident(&rebuilt),
            quote_ident(table.name)
        ),
    ]
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// A type persisted in (or at least owning) a table.
pub trait Entity {
    const TABLE: &'static str;
}

/// An entity whose table can be created from its declared fields.
pub trait Migratable: Entity {
    fn schema() -> TableSchema;
}
