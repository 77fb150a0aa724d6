/// Generate the model/table/column/CTE builder methods for a statement whose
/// [`BaseQuery`](crate::query::BaseQuery) lives at `self.<path>`.
///
/// Usage:
/// ```ignore
/// impl<'a> SelectQuery<'a> {
///     impl_base_builder!(q.base);
/// }
/// ```
macro_rules! impl_base_builder {
    ($($base:ident).+) => {
        /// Bind an entity, a collection ([`rows`](crate::model::rows)) or a type
        /// ([`type_of`](crate::model::type_of)).
        pub fn model<M: $crate::model::IntoModel<'a>>(mut self, model: M) -> Self {
            self.$($base).+.set_model(model);
            self
        }

        /// Add a table by name.
        pub fn table(mut self, table: &str) -> Self {
            self.$($base).+.add_table($crate::fragment::QueryWithArgs::ident(table));
            self
        }

        /// Add a table expression, e.g. `"users AS u"`.
        pub fn table_expr(mut self, query: &str, args: Vec<$crate::value::Arg>) -> Self {
            self.$($base).+.add_table($crate::fragment::QueryWithArgs::safe(query, args));
            self
        }

        /// Replace the model's table name with an expression.
        pub fn model_table_expr(mut self, query: &str, args: Vec<$crate::value::Arg>) -> Self {
            self.$($base).+.set_model_table($crate::fragment::QueryWithArgs::safe(query, args));
            self
        }

        pub fn column(mut self, column: &str) -> Self {
            self.$($base).+.add_column($crate::fragment::QueryWithArgs::ident(column));
            self
        }

        pub fn columns(mut self, columns: &[&str]) -> Self {
            for column in columns {
                self.$($base).+.add_column($crate::fragment::QueryWithArgs::ident(*column));
            }
            self
        }

        pub fn column_expr(mut self, query: &str, args: Vec<$crate::value::Arg>) -> Self {
            self.$($base).+.add_column($crate::fragment::QueryWithArgs::safe(query, args));
            self
        }

        pub fn exclude_column(mut self, columns: &[&str]) -> Self {
            self.$($base).+.exclude_column(columns);
            self
        }

        /// Attach a CTE.
        pub fn with(
            mut self,
            name: &str,
            query: impl $crate::fmt::QueryAppender + Send + Sync + 'a,
        ) -> Self {
            self.$($base).+.add_with(name, query);
            self
        }

        /// The first builder error, if any.
        pub fn err(&self) -> Option<&$crate::error::StmtError> {
            self.$($base).+.err()
        }
    };
}

/// Generate the WHERE builder methods for a statement whose
/// [`WhereBaseQuery`](crate::query::WhereBaseQuery) lives at `self.<path>`.
macro_rules! impl_where_builder {
    ($($q:ident).+) => {
        pub fn and_where(mut self, query: &str, args: Vec<$crate::value::Arg>) -> Self {
            self.$($q).+.where_q.and_where(query, args);
            self
        }

        pub fn or_where(mut self, query: &str, args: Vec<$crate::value::Arg>) -> Self {
            self.$($q).+.where_q.or_where(query, args);
            self
        }

        pub fn where_group(
            mut self,
            sep: &str,
            f: impl FnOnce(&mut $crate::query::WhereQuery),
        ) -> Self {
            self.$($q).+.where_q.where_group(sep, f);
            self
        }

        /// Match the bound model's rows by primary key.
        pub fn where_pk(mut self) -> Self {
            self.$($q).+.base.mark_where_pk();
            self
        }

        /// Only soft-deleted rows.
        pub fn where_deleted(mut self) -> Self {
            self.$($q).+.base.where_deleted();
            self
        }

        /// Include soft-deleted rows.
        pub fn where_all_with_deleted(mut self) -> Self {
            self.$($q).+.base.where_all_with_deleted();
            self
        }
    };
}
