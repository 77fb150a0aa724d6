//! Query lifecycle hooks.

use std::time::Duration;

use crate::query::Operation;

/// What a hook sees about one statement execution.
#[derive(Debug, Clone)]
pub struct QueryEvent {
    pub operation: Operation,
    /// Rendered SQL (bind mode).
    pub sql: String,
    pub param_count: usize,
    /// Set for `after_query`.
    pub elapsed: Option<Duration>,
    /// Rows returned or affected; set for a successful `after_query`.
    pub rows: Option<u64>,
    /// Set for a failed `after_query`.
    pub error: Option<String>,
}

impl QueryEvent {
    pub fn new(operation: Operation, sql: impl Into<String>, param_count: usize) -> Self {
        Self {
            operation,
            sql: sql.into(),
            param_count,
            elapsed: None,
            rows: None,
            error: None,
        }
    }
}

/// Observer called around every statement a [`Db`](crate::Db) executes.
pub trait QueryHook: Send + Sync {
    fn before_query(&self, _event: &QueryEvent) {}

    fn after_query(&self, _event: &QueryEvent) {}
}

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

#[cfg(feature = "tracing")]
pub use tracing_hook::TracingHook;

#[cfg(feature = "tracing")]
mod tracing_hook {
    use super::{QueryEvent, QueryHook, truncate_sql_bytes};
    use tracing::Level;

    /// Logs statements through `tracing` under the `pgstmt.sql` target.
    ///
    /// The SQL is logged before execution; timing, row count and error after it.
    #[derive(Debug, Clone)]
    pub struct TracingHook {
        /// Tracing event level to emit at.
        pub level: Level,
        /// Truncate long SQL strings (in bytes). `None` means no truncation.
        pub max_sql_length: Option<usize>,
    }

    impl Default for TracingHook {
        fn default() -> Self {
            Self {
                level: Level::DEBUG,
                max_sql_length: Some(200),
            }
        }
    }

    impl TracingHook {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        pub fn max_sql_length(mut self, len: usize) -> Self {
            self.max_sql_length = Some(len);
            self
        }

        pub fn no_truncate(mut self) -> Self {
            self.max_sql_length = None;
            self
        }

        pub(crate) fn truncate_sql(&self, sql: &str) -> String {
            match self.max_sql_length {
                Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
                _ => sql.to_string(),
            }
        }
    }

    /// Dispatch a tracing event at a runtime-determined level.
    macro_rules! emit_at_level {
        ($level:expr, $($field:tt)*) => {
            match $level {
                Level::ERROR => tracing::error!($($field)*),
                Level::WARN  => tracing::warn!($($field)*),
                Level::INFO  => tracing::info!($($field)*),
                Level::DEBUG => tracing::debug!($($field)*),
                Level::TRACE => tracing::trace!($($field)*),
            }
        };
    }

    impl QueryHook for TracingHook {
        fn before_query(&self, event: &QueryEvent) {
            let sql = self.truncate_sql(&event.sql);
            emit_at_level!(
                self.level,
                target: "pgstmt.sql",
                operation = %event.operation,
                param_count = event.param_count,
                sql = %sql,
            );
        }

        fn after_query(&self, event: &QueryEvent) {
            let elapsed_ms = event.elapsed.map_or(0, |d| d.as_millis() as u64);
            match &event.error {
                Some(error) => emit_at_level!(
                    self.level,
                    target: "pgstmt.sql",
                    operation = %event.operation,
                    elapsed_ms,
                    error = %error,
                    "query failed"
                ),
                None => emit_at_level!(
                    self.level,
                    target: "pgstmt.sql",
                    operation = %event.operation,
                    elapsed_ms,
                    rows = event.rows.unwrap_or(0),
                    "query finished"
                ),
            }
        }
    }
}
