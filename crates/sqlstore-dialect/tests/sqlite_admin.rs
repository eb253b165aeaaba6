//! Generated SQL and admin operations run against a real SQLite database.

mod common;

use common::{count_rows, sqlite_session};
use sqlstore_dialect::prelude::*;

fn dashboard_acl() -> Table {
    Table::new("dashboard_acl")
        .column(
            Column::new("id", ColumnType::BigInt)
                .primary_key()
                .auto_increment(),
        )
        .column(Column::new("org_id", ColumnType::BigInt).not_null())
        .column(Column::new("dashboard_id", ColumnType::BigInt).not_null())
        .column(Column::new("role", ColumnType::Varchar).length(20))
}

fn star() -> Table {
    Table::new("star")
        .column(
            Column::new("id", ColumnType::BigInt)
                .primary_key()
                .auto_increment(),
        )
        .column(Column::new("user_id", ColumnType::BigInt).not_null())
        .column(Column::new("dashboard_id", ColumnType::BigInt).not_null())
}

async fn setup(session: &SqliteSession, dialect: &SqliteDialect) {
    for table in [dashboard_acl(), star()] {
        session
            .execute(&dialect.create_table_sql(&table), &[])
            .await
            .unwrap();
    }
    session
        .execute(
            &dialect.create_index_sql("star", &Index::new(["user_id", "dashboard_id"]).unique()),
            &[],
        )
        .await
        .unwrap();

    for (org_id, dashboard_id, role) in [(-1, -1, "Viewer"), (-1, -1, "Editor"), (1, 7, "Admin")] {
        session
            .execute(
                "INSERT INTO dashboard_acl (org_id, dashboard_id, role) VALUES (?, ?, ?)",
                &[SqlArg::Int(org_id), SqlArg::Int(dashboard_id), role.into()],
            )
            .await
            .unwrap();
    }
    session
        .execute(
            "INSERT INTO star (user_id, dashboard_id) VALUES (1, 7), (2, 7)",
            &[],
        )
        .await
        .unwrap();
}

async fn exists(session: &SqliteSession, query: Option<Query>) -> bool {
    let (sql, args) = query.expect("SQLite has catalog checks");
    let mut q = sqlx::query(&sql);
    for arg in args {
        q = match arg {
            SqlArg::Text(value) => q.bind(value),
            SqlArg::Int(value) => q.bind(value),
        };
    }
    q.fetch_optional(session.pool()).await.unwrap().is_some()
}

async fn table_names(session: &SqliteSession) -> Vec<String> {
    let mut names: Vec<String> = session
        .list_tables()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn truncate_keeps_default_acl_rows() {
    let session = sqlite_session().await;
    let dialect = SqliteDialect::default();
    setup(&session, &dialect).await;

    let count = truncate_db_tables(&dialect, &session).await.unwrap();
    assert_eq!(count, 2);

    assert_eq!(count_rows(&session, "star").await, 0);
    assert_eq!(count_rows(&session, "dashboard_acl").await, 2);

    let remaining: Vec<(i64, i64)> =
        sqlx::query_as("SELECT org_id, dashboard_id FROM dashboard_acl ORDER BY id")
            .fetch_all(session.pool())
            .await
            .unwrap();
    assert_eq!(remaining, vec![(-1, -1), (-1, -1)]);

    // The counter restarts right after the default rows.
    session
        .execute(
            "INSERT INTO dashboard_acl (org_id, dashboard_id) VALUES (2, 9)",
            &[],
        )
        .await
        .unwrap();
    let (id,): (i64,) = sqlx::query_as("SELECT id FROM dashboard_acl WHERE org_id = 2")
        .fetch_one(session.pool())
        .await
        .unwrap();
    assert_eq!(id, 3);
}

#[tokio::test]
async fn clean_drops_every_table() {
    let session = sqlite_session().await;
    let dialect = SqliteDialect::default();
    setup(&session, &dialect).await;

    let dropped = clean_db(&dialect, &session).await.unwrap();
    assert_eq!(dropped, 2);
    assert!(session.list_tables().await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_insert_is_a_unique_violation() {
    let session = sqlite_session().await;
    let dialect = SqliteDialect::default();
    setup(&session, &dialect).await;

    let err = session
        .execute(
            "INSERT INTO star (user_id, dashboard_id) VALUES (1, 7)",
            &[],
        )
        .await
        .unwrap_err();

    let class = classify(&dialect, &err);
    assert!(class.is_unique_violation);
    assert!(!class.is_deadlock);
    assert!(class.message.contains("UNIQUE constraint failed"), "{}", class.message);
}

#[tokio::test]
async fn catalog_checks_find_created_objects() {
    let session = sqlite_session().await;
    let dialect = SqliteDialect::default();
    setup(&session, &dialect).await;

    let index = Index::new(["user_id", "dashboard_id"]).unique();
    let name = index.name_for("star");
    assert!(exists(&session, dialect.index_check_sql("star", &name)).await);
    assert!(!exists(&session, dialect.index_check_sql("star", "IDX_star_missing")).await);

    assert!(exists(&session, dialect.column_check_sql("star", "user_id")).await);
    assert!(!exists(&session, dialect.column_check_sql("star", "missing")).await);

    session
        .execute(&dialect.drop_index_sql("star", &index), &[])
        .await
        .unwrap();
    assert!(!exists(&session, dialect.index_check_sql("star", &name)).await);
}

#[tokio::test]
async fn upsert_updates_existing_rows() {
    let session = sqlite_session().await;
    let dialect = SqliteDialect::default();
    let kv = Table::new("kv_store")
        .column(Column::new("key", ColumnType::Varchar).length(100).not_null())
        .column(Column::new("value", ColumnType::Text))
        .primary_key(["key"]);
    session
        .execute(&dialect.create_table_sql(&kv), &[])
        .await
        .unwrap();

    let sql = dialect.upsert_sql(
        "kv_store",
        &["key".to_string()],
        &["key".to_string(), "value".to_string()],
    );
    for value in ["first", "second"] {
        session
            .execute(&sql, &["theme".into(), value.into()])
            .await
            .unwrap();
    }

    let rows: Vec<(String, String)> = sqlx::query_as("SELECT `key`, `value` FROM kv_store")
        .fetch_all(session.pool())
        .await
        .unwrap();
    assert_eq!(rows, vec![("theme".to_string(), "second".to_string())]);
}

#[tokio::test]
async fn add_and_rename_column() {
    let session = sqlite_session().await;
    let dialect = SqliteDialect::default();
    setup(&session, &dialect).await;

    let column = Column::new("created", ColumnType::DateTime);
    session
        .execute(&dialect.add_column_sql("star", &column), &[])
        .await
        .unwrap();
    session
        .execute(&dialect.rename_column_sql("star", &column, "created_at"), &[])
        .await
        .unwrap();

    assert!(exists(&session, dialect.column_check_sql("star", "created_at")).await);
    assert!(!exists(&session, dialect.column_check_sql("star", "created")).await);
}

#[tokio::test]
async fn rename_copy_and_drop_table() {
    let session = sqlite_session().await;
    let dialect = SqliteDialect::default();
    setup(&session, &dialect).await;

    session
        .execute(&dialect.rename_table_sql("star", "star_old"), &[])
        .await
        .unwrap();
    assert_eq!(table_names(&session).await, vec!["dashboard_acl", "star_old"]);

    session
        .execute(&dialect.create_table_sql(&star()), &[])
        .await
        .unwrap();
    let columns: Vec<String> = ["id", "user_id", "dashboard_id"]
        .into_iter()
        .map(String::from)
        .collect();
    session
        .execute(
            &dialect.copy_table_data_sql("star_old", "star", &columns, &columns),
            &[],
        )
        .await
        .unwrap();
    assert_eq!(count_rows(&session, "star").await, 2);

    session
        .execute(&dialect.drop_table_sql("star_old"), &[])
        .await
        .unwrap();
    assert_eq!(table_names(&session).await, vec!["dashboard_acl", "star"]);

    // Dropping a missing table is not an error.
    session
        .execute(&dialect.drop_table_sql("star_old"), &[])
        .await
        .unwrap();
}
