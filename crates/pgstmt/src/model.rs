//! Binding of entity values to a statement.

use std::marker::PhantomData;

use crate::error::StmtResult;
use crate::schema::{Entity, Table};

/// What a statement was bound to.
#[derive(Clone)]
pub enum Model<'a> {
    /// Only the table; no row data.
    Type(&'static Table),
    /// A single entity.
    Struct {
        table: &'static Table,
        entity: &'a dyn Entity,
    },
    /// A collection of entities.
    Slice {
        table: &'static Table,
        rows: Vec<&'a dyn Entity>,
    },
}

impl<'a> Model<'a> {
    pub fn table(&self) -> &'static Table {
        match self {
            Model::Type(table) => *table,
            Model::Struct { table, .. } | Model::Slice { table, .. } => *table,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Model::Type(_) => "type model",
            Model::Struct { .. } => "struct model",
            Model::Slice { .. } => "slice model",
        }
    }

    /// Entities carried by the model, in order.
    pub fn rows(&self) -> Vec<&'a dyn Entity> {
        match self {
            Model::Type(_) => Vec::new(),
            Model::Struct { entity, .. } => vec![*entity],
            Model::Slice { rows, .. } => rows.clone(),
        }
    }
}

impl std::fmt::Debug for Model<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Model::Slice { table, rows } => write!(f, "{}({}, {} rows)", self.kind_name(), table, rows.len()),
            _ => write!(f, "{}({})", self.kind_name(), self.table()),
        }
    }
}

/// Conversion of a caller value into a [`Model`].
pub trait IntoModel<'a> {
    fn into_model(self) -> StmtResult<Model<'a>>;
}

impl<'a, T: Entity> IntoModel<'a> for &'a T {
    fn into_model(self) -> StmtResult<Model<'a>> {
        Ok(Model::Struct {
            table: T::table()?,
            entity: self,
        })
    }
}

/// A collection of entities. Wraps a slice so it can't be confused with a single entity.
#[derive(Debug)]
pub struct Rows<'a, T>(pub &'a [T]);

impl<'a, T: Entity> IntoModel<'a> for Rows<'a, T> {
    fn into_model(self) -> StmtResult<Model<'a>> {
        Ok(Model::Slice {
            table: T::table()?,
            rows: self.0.iter().map(|row| row as &dyn Entity).collect(),
        })
    }
}

/// Table-only binding for an entity type.
pub struct TypeOf<T>(PhantomData<fn() -> T>);

/// Bind a statement to `T`'s table without any row data.
pub fn type_of<T: Entity>() -> TypeOf<T> {
    TypeOf(PhantomData)
}

impl<'a, T: Entity> IntoModel<'a> for TypeOf<T> {
    fn into_model(self) -> StmtResult<Model<'a>> {
        Ok(Model::Type(T::table()?))
    }
}

/// Wrap a slice of entities as a collection model.
pub fn rows<T: Entity>(rows: &[T]) -> Rows<'_, T> {
    Rows(rows)
}
