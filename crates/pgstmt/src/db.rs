//! Statement execution.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

use crate::client::GenericClient;
use crate::config::DbConfig;
use crate::error::{StmtError, StmtResult};
use crate::fmt::{BuiltQuery, PgDialect};
use crate::hook::{QueryEvent, QueryHook};
use crate::query::{
    CreateIndexQuery, DeleteQuery, InsertQuery, Operation, SelectQuery, Statement, UpdateQuery,
};
use crate::scan::scan_entity;
use crate::schema::Entity;
use crate::value::Value;

/// Result of [`Db::exec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOutcome {
    pub rows_affected: u64,
}

/// Renders statements for PostgreSQL and runs them on a client.
///
/// ```ignore
/// let db = Db::new(client).with_config(DbConfig::new().with_query_timeout(Duration::from_secs(5)));
///
/// let user: User = db
///     .scan_one(&db.new_select().model(type_of::<User>()).and_where("id = ?", args![1]))
///     .await?;
/// ```
pub struct Db<C: GenericClient> {
    client: C,
    dialect: PgDialect,
    config: DbConfig,
    hooks: Vec<Arc<dyn QueryHook>>,
}

fn params_of(args: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    args.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

impl<C: GenericClient> Db<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            dialect: PgDialect,
            config: DbConfig::default(),
            hooks: Vec::new(),
        }
    }

    /// Apply `config`. With `log_sql` set, a [`TracingHook`](crate::hook::TracingHook) is added.
    pub fn with_config(mut self, config: DbConfig) -> Self {
        #[cfg(feature = "tracing")]
        if config.log_sql {
            let mut hook = crate::hook::TracingHook::new();
            hook.max_sql_length = config.max_sql_length;
            self.hooks.push(Arc::new(hook));
        }
        self.config = config;
        self
    }

    pub fn with_hook(mut self, hook: impl QueryHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    pub fn dialect(&self) -> &PgDialect {
        &self.dialect
    }

    pub fn into_client(self) -> C {
        self.client
    }

    pub fn new_select<'a>(&self) -> SelectQuery<'a> {
        SelectQuery::new()
    }

    pub fn new_insert<'a>(&self) -> InsertQuery<'a> {
        InsertQuery::new()
    }

    pub fn new_update<'a>(&self) -> UpdateQuery<'a> {
        UpdateQuery::new()
    }

    pub fn new_delete<'a>(&self) -> DeleteQuery<'a> {
        DeleteQuery::new()
    }

    pub fn new_create_index<'a>(&self) -> CreateIndexQuery<'a> {
        CreateIndexQuery::new()
    }

    /// Execute `query`, returning the affected row count.
    pub async fn exec<Q: Statement + ?Sized>(&self, query: &Q) -> StmtResult<QueryOutcome> {
        let built = query.build(&self.dialect)?;
        let params = params_of(&built.args);

        let mut event = self.before_query(query.operation(), &built);
        let start = Instant::now();
        let result = self
            .execute_with_timeout(self.client.execute(&built.sql, &params))
            .await;
        self.after_query(&mut event, start.elapsed(), result.as_ref().map(|n| *n));

        result.map(|rows_affected| QueryOutcome { rows_affected })
    }

    /// Execute `query` and return the raw rows.
    pub async fn query<Q: Statement + ?Sized>(&self, query: &Q) -> StmtResult<Vec<Row>> {
        let built = query.build(&self.dialect)?;
        let params = params_of(&built.args);

        let mut event = self.before_query(query.operation(), &built);
        let start = Instant::now();
        let result = self
            .execute_with_timeout(self.client.query(&built.sql, &params))
            .await;
        self.after_query(
            &mut event,
            start.elapsed(),
            result.as_ref().map(|rows| rows.len() as u64),
        );

        result
    }

    /// Execute `query` and decode the first row. No rows is [`StmtError::NotFound`].
    pub async fn scan_one<T, Q>(&self, query: &Q) -> StmtResult<T>
    where
        T: Entity + Default,
        Q: Statement + ?Sized,
    {
        let rows = self.query(query).await?;
        match rows.first() {
            Some(row) => scan_entity(row),
            None => Err(StmtError::not_found(format!(
                "{} returned no rows",
                query.operation()
            ))),
        }
    }

    /// Execute `query` and decode every row.
    pub async fn scan_all<T, Q>(&self, query: &Q) -> StmtResult<Vec<T>>
    where
        T: Entity + Default,
        Q: Statement + ?Sized,
    {
        let rows = self.query(query).await?;
        rows.iter().map(scan_entity::<T>).collect()
    }

    async fn execute_with_timeout<T, F>(&self, future: F) -> StmtResult<T>
    where
        F: std::future::Future<Output = StmtResult<T>> + Send,
    {
        match self.config.query_timeout {
            Some(timeout) => {
                tokio::pin!(future);
                tokio::select! {
                    result = &mut future => result,
                    _ = tokio::time::sleep(timeout) => {
                        if let Some(cancel_token) = self.client.cancel_token() {
                            tokio::spawn(async move {
                                let _ = cancel_token.cancel_query(tokio_postgres::NoTls).await;
                            });
                        }
                        Err(StmtError::Timeout(timeout))
                    }
                }
            }
            None => future.await,
        }
    }

    fn before_query(&self, operation: Operation, built: &BuiltQuery) -> QueryEvent {
        let event = QueryEvent::new(operation, built.sql.clone(), built.args.len());
        for hook in &self.hooks {
            hook.before_query(&event);
        }
        event
    }

    fn after_query(&self, event: &mut QueryEvent, elapsed: Duration, result: Result<u64, &StmtError>) {
        event.elapsed = Some(elapsed);
        match result {
            Ok(rows) => event.rows = Some(rows),
            Err(err) => event.error = Some(err.to_string()),
        }

        #[cfg(feature = "tracing")]
        if let Some(threshold) = self.config.slow_query_threshold
            && elapsed > threshold
        {
            tracing::warn!(
                target: "pgstmt.sql",
                operation = %event.operation,
                elapsed_ms = elapsed.as_millis() as u64,
                threshold_ms = threshold.as_millis() as u64,
                sql = %crate::hook::truncate_sql_bytes(&event.sql, self.config.max_sql_length.unwrap_or(usize::MAX)),
                "slow query"
            );
        }

        for hook in &self.hooks {
            hook.after_query(event);
        }
    }
}
