use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use pgstmt::prelude::*;
use pgstmt::{Operation, QueryEvent, QueryHook};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

#[derive(Debug, Default, Clone, PartialEq)]
struct Account {
    id: i64,
    tenant: String,
    email: String,
    deleted_at: Option<DateTime<Utc>>,
}

static ACCOUNTS: TableCell = TableCell::new();

impl Entity for Account {
    fn table() -> StmtResult<&'static Table> {
        ACCOUNTS.get_or_init(|| {
            Table::builder("Account", "pgstmt_accounts")
                .alias("a")
                .field(Field::new("id", ScanKind::Int).pk())
                .field(Field::new("tenant", ScanKind::Text).pk())
                .field(Field::new("email", ScanKind::Text))
                .field(Field::new("deleted_at", ScanKind::Timestamp).soft_delete())
                .build()
        })
    }

    fn field_value(&self, field: &Field) -> Value {
        match field.name() {
            "id" => self.id.into(),
            "tenant" => self.tenant.as_str().into(),
            "email" => self.email.as_str().into(),
            "deleted_at" => self.deleted_at.into(),
            _ => Value::Null,
        }
    }

    fn set_field_value(&mut self, field: &Field, value: Value) -> StmtResult<()> {
        match field.name() {
            "id" => self.id = FromValue::from_value(value)?,
            "tenant" => self.tenant = FromValue::from_value(value)?,
            "email" => self.email = FromValue::from_value(value)?,
            "deleted_at" => self.deleted_at = FromValue::from_value(value)?,
            other => return Err(StmtError::unknown_column("Account", other)),
        }
        Ok(())
    }
}

fn account(id: i64, tenant: &str) -> Account {
    Account {
        id,
        tenant: tenant.to_string(),
        email: format!("{id}@{tenant}.io"),
        deleted_at: None,
    }
}

/// Records statements instead of sending them anywhere.
#[derive(Default)]
struct FakeClient {
    statements: Mutex<Vec<(String, usize)>>,
    delay: Option<Duration>,
}

impl FakeClient {
    fn record(&self, sql: &str, params: usize) {
        self.statements
            .lock()
            .unwrap()
            .push((sql.to_string(), params));
    }
}

impl GenericClient for FakeClient {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> StmtResult<Vec<Row>> {
        self.record(sql, params.len());
        Ok(Vec::new())
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> StmtResult<u64> {
        self.record(sql, params.len());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(1)
    }
}

#[derive(Clone, Default)]
struct RecordingHook {
    events: Arc<Mutex<Vec<QueryEvent>>>,
}

impl QueryHook for RecordingHook {
    fn after_query(&self, event: &QueryEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

#[tokio::test]
async fn exec_sends_bind_sql_and_notifies_hooks() {
    let hook = RecordingHook::default();
    let db = Db::new(FakeClient::default()).with_hook(hook.clone());

    let a = account(1, "acme");
    let outcome = db.exec(&db.new_delete().model(&a).where_pk()).await.unwrap();
    assert_eq!(outcome.rows_affected, 1);

    let statements = db.client().statements.lock().unwrap().clone();
    assert_eq!(
        statements,
        vec![(
            "UPDATE pgstmt_accounts AS a SET deleted_at = $1 \
             WHERE a.deleted_at IS NULL AND (a.id = $2 AND a.tenant = $3)"
                .to_string(),
            3
        )]
    );

    let events = hook.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].operation, Operation::Delete);
    assert_eq!(events[0].rows, Some(1));
    assert!(events[0].elapsed.is_some());
}

#[tokio::test]
async fn builder_errors_never_reach_the_client() {
    let db = Db::new(FakeClient::default());
    let err = db
        .exec(&db.new_update().table("pgstmt_accounts").set("email = ?", args!["x"]))
        .await
        .unwrap_err();
    assert!(matches!(err, StmtError::MissingWhere));
    assert!(db.client().statements.lock().unwrap().is_empty());
}

#[tokio::test]
async fn scan_one_without_rows_is_not_found() {
    let db = Db::new(FakeClient::default());
    let err = db
        .scan_one::<Account, _>(&db.new_select().model(type_of::<Account>()))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn slow_statements_time_out() {
    let client = FakeClient {
        delay: Some(Duration::from_millis(500)),
        ..FakeClient::default()
    };
    let hook = RecordingHook::default();
    let db = Db::new(client)
        .with_config(DbConfig::new().with_query_timeout(Duration::from_millis(20)))
        .with_hook(hook.clone());

    let err = db
        .exec(&db.new_delete().table("t").and_where("id = ?", args![1]))
        .await
        .unwrap_err();
    assert!(err.is_timeout());

    let events = hook.events.lock().unwrap();
    assert!(events[0].error.as_deref().unwrap().contains("timeout"));
}

async fn try_connect() -> Option<tokio_postgres::Client> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").ok()?;
    let (client, connection) = tokio_postgres::connect(&database_url, tokio_postgres::NoTls)
        .await
        .expect("Failed to connect to DATABASE_URL with NoTls");
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("tokio-postgres connection error: {e}");
        }
    });
    Some(client)
}

#[tokio::test]
async fn soft_delete_round_trip() {
    let Some(client) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    client
        .batch_execute(
            "CREATE TEMP TABLE pgstmt_accounts (
                id bigint NOT NULL,
                tenant text NOT NULL,
                email text NOT NULL,
                deleted_at timestamptz,
                PRIMARY KEY (id, tenant)
            )",
        )
        .await
        .unwrap();

    let db = Db::new(client).with_config(DbConfig::new().with_log_sql(true));

    let accounts = vec![account(1, "acme"), account(2, "acme")];
    let outcome = db
        .exec(&db.new_insert().model(rows(&accounts)))
        .await
        .unwrap();
    assert_eq!(outcome.rows_affected, 2);

    let found: Account = db
        .scan_one(&db.new_select().model(&accounts[0]).where_pk())
        .await
        .unwrap();
    assert_eq!(found, accounts[0]);

    db.exec(&db.new_delete().model(&accounts[0]).where_pk())
        .await
        .unwrap();

    let live: Vec<Account> = db
        .scan_all(&db.new_select().model(type_of::<Account>()).order("id"))
        .await
        .unwrap();
    assert_eq!(live, vec![accounts[1].clone()]);

    let deleted: Vec<Account> = db
        .scan_all(&db.new_select().model(type_of::<Account>()).where_deleted())
        .await
        .unwrap();
    assert_eq!(deleted.len(), 1);
    assert!(deleted[0].deleted_at.is_some());

    db.exec(
        &db.new_delete()
            .model(type_of::<Account>())
            .force_delete()
            .where_all_with_deleted()
            .and_where("a.tenant = ?", args!["acme"]),
    )
    .await
    .unwrap();

    let all: Vec<Account> = db
        .scan_all(&db.new_select().model(type_of::<Account>()).where_all_with_deleted())
        .await
        .unwrap();
    assert!(all.is_empty());
}
