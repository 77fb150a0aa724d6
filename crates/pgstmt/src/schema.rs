//! Table and field descriptors.
//!
//! Entities describe their table once through a [`TableBuilder`] and cache the
//! result in a static [`TableCell`]:
//!
//! ```ignore
//! static USERS: TableCell = TableCell::new();
//!
//! impl Entity for User {
//!     fn table() -> StmtResult<&'static Table> {
//!         USERS.get_or_init(|| {
//!             Table::builder("User", "users")
//!                 .alias("u")
//!                 .field(Field::new("id", ScanKind::Int).pk())
//!                 .field(Field::new("name", ScanKind::Text))
//!                 .field(Field::new("deleted_at", ScanKind::Timestamp).soft_delete())
//!                 .build()
//!         })
//!     }
//!     // ...
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error::{StmtError, StmtResult};
use crate::fmt::{Formatter, QueryBuf};
use crate::scan::{ScanKind, ScannerFn};
use crate::value::Value;

/// A mapped column.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    sql_name: String,
    kind: ScanKind,
    is_pk: bool,
    nullable: bool,
    soft_delete: bool,
    json: bool,
    decoder: Option<ScannerFn>,
}

impl Field {
    /// A field whose column name equals `name`.
    pub fn new(name: impl Into<String>, kind: ScanKind) -> Self {
        let name = name.into();
        Self {
            sql_name: name.clone(),
            name,
            kind,
            is_pk: false,
            nullable: false,
            soft_delete: false,
            json: false,
            decoder: None,
        }
    }

    pub fn column(mut self, sql_name: impl Into<String>) -> Self {
        self.sql_name = sql_name.into();
        self
    }

    pub fn pk(mut self) -> Self {
        self.is_pk = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Marks the soft-delete column. Implies `nullable`.
    pub fn soft_delete(mut self) -> Self {
        self.soft_delete = true;
        self.nullable = true;
        self
    }

    /// Decode the column as JSON regardless of its kind.
    pub fn json(mut self) -> Self {
        self.json = true;
        self
    }

    /// Custom decoder, takes priority over every other scanner.
    pub fn decoder(mut self, decoder: ScannerFn) -> Self {
        self.decoder = Some(decoder);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sql_name(&self) -> &str {
        &self.sql_name
    }

    pub fn kind(&self) -> ScanKind {
        self.kind
    }

    pub fn is_pk(&self) -> bool {
        self.is_pk
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_soft_delete(&self) -> bool {
        self.soft_delete
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    pub fn custom_decoder(&self) -> Option<ScannerFn> {
        self.decoder
    }

    /// Render the entity's value for this field.
    pub fn append_value(&self, fmter: &Formatter<'_>, buf: &mut QueryBuf, entity: &dyn Entity) {
        fmter.append_value(buf, &entity.field_value(self));
    }
}

/// Descriptor of an entity's table.
#[derive(Debug)]
pub struct Table {
    type_name: &'static str,
    sql_name: String,
    alias: String,
    fields: Vec<Arc<Field>>,
    pks: Vec<Arc<Field>>,
    data_fields: Vec<Arc<Field>>,
    soft_delete_field: Option<Arc<Field>>,
    field_map: HashMap<String, Arc<Field>>,
}

impl Table {
    pub fn builder(type_name: &'static str, sql_name: impl Into<String>) -> TableBuilder {
        TableBuilder {
            type_name,
            sql_name: sql_name.into(),
            alias: None,
            fields: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn sql_name(&self) -> &str {
        &self.sql_name
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// All fields, in declaration order.
    pub fn fields(&self) -> &[Arc<Field>] {
        &self.fields
    }

    pub fn pks(&self) -> &[Arc<Field>] {
        &self.pks
    }

    /// Fields that are not part of the primary key.
    pub fn data_fields(&self) -> &[Arc<Field>] {
        &self.data_fields
    }

    pub fn soft_delete_field(&self) -> Option<&Arc<Field>> {
        self.soft_delete_field.as_ref()
    }

    pub fn has_field(&self, sql_name: &str) -> bool {
        self.field_map.contains_key(sql_name)
    }

    /// Look up a field by column name.
    pub fn field(&self, sql_name: &str) -> StmtResult<&Arc<Field>> {
        self.field_map
            .get(sql_name)
            .ok_or_else(|| StmtError::unknown_column(self.type_name, sql_name))
    }

    pub fn check_pks(&self) -> StmtResult<()> {
        if self.pks.is_empty() {
            return Err(StmtError::NoPrimaryKey(self.type_name.to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

/// Builder for [`Table`].
#[derive(Debug)]
pub struct TableBuilder {
    type_name: &'static str,
    sql_name: String,
    alias: Option<String>,
    fields: Vec<Field>,
}

impl TableBuilder {
    /// Alias used to qualify columns. Defaults to the table name.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn build(self) -> StmtResult<Table> {
        if self.sql_name.is_empty() {
            return Err(StmtError::Model(format!(
                "{} has an empty table name",
                self.type_name
            )));
        }

        let mut table = Table {
            type_name: self.type_name,
            alias: self.alias.unwrap_or_else(|| self.sql_name.clone()),
            sql_name: self.sql_name,
            fields: Vec::with_capacity(self.fields.len()),
            pks: Vec::new(),
            data_fields: Vec::new(),
            soft_delete_field: None,
            field_map: HashMap::with_capacity(self.fields.len()),
        };

        for field in self.fields {
            let field = Arc::new(field);
            if table.field_map.contains_key(field.sql_name()) {
                return Err(StmtError::Model(format!(
                    "{} has duplicate column={:?}",
                    table.type_name,
                    field.sql_name()
                )));
            }
            if field.is_soft_delete() {
                if table.soft_delete_field.is_some() {
                    return Err(StmtError::Model(format!(
                        "{} has more than one soft delete field",
                        table.type_name
                    )));
                }
                table.soft_delete_field = Some(Arc::clone(&field));
            }
            if field.is_pk() {
                table.pks.push(Arc::clone(&field));
            } else {
                table.data_fields.push(Arc::clone(&field));
            }
            table
                .field_map
                .insert(field.sql_name().to_string(), Arc::clone(&field));
            table.fields.push(field);
        }

        Ok(table)
    }
}

/// Lazily built, process-wide table descriptor.
#[derive(Debug)]
pub struct TableCell(OnceLock<Result<Table, String>>);

impl TableCell {
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Build the table on first use. A failed build is cached and reported on every call.
    pub fn get_or_init(
        &'static self,
        init: impl FnOnce() -> StmtResult<Table>,
    ) -> StmtResult<&'static Table> {
        let cached = self.0.get_or_init(|| {
            init().map_err(|err| match err {
                StmtError::Model(msg) => msg,
                other => other.to_string(),
            })
        });
        match cached {
            Ok(table) => Ok(table),
            Err(msg) => Err(StmtError::Model(msg.clone())),
        }
    }
}

impl Default for TableCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Field-level reflection over a mapped type.
pub trait Entity: Send + Sync {
    fn table() -> StmtResult<&'static Table>
    where
        Self: Sized;

    /// Current value of `field`.
    fn field_value(&self, field: &Field) -> Value;

    /// Assign a scanned value to `field`.
    fn set_field_value(&mut self, field: &Field, value: Value) -> StmtResult<()>;
}
