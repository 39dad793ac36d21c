//! Launches against a live server. Skipped unless `DATABASE_URL` is set.

use chrono::{NaiveDate, NaiveDateTime};
use pgfixture::generator::{date_sequence, string_sequence};
use pgfixture::operations::*;
use pgfixture::{
    CalendarField, ClientDestination, DbSetup, DbSetupTracker, Operation, UrlDestination, Value,
};
use std::sync::Arc;

async fn try_connect() -> Option<Arc<tokio_postgres::Client>> {
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
    Some(Arc::new(client))
}

async fn count(client: &tokio_postgres::Client, table: &str) -> i64 {
    client
        .query_one(&format!("select count(*) from {table}"), &[])
        .await
        .unwrap()
        .get(0)
}

#[tokio::test]
async fn launch_inserts_rows_with_metadata_driven_binding() {
    let Some(client) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    client
        .batch_execute(
            "drop table if exists pgfixture_it_vendor;
             create table pgfixture_it_vendor (
                 id bigint primary key,
                 code varchar(10) not null,
                 name varchar(50),
                 rank int,
                 since date,
                 audited timestamp
             )",
        )
        .await
        .unwrap();

    let gold = Value::Enum {
        name: "GOLD".into(),
        ordinal: 1,
    };
    let operation = sequence_of([
        Operation::from(delete_all_from("pgfixture_it_vendor")),
        insert_into("pgfixture_it_vendor")
            .columns(["id", "name", "rank", "since"])
            .unwrap()
            .values((1_i64, "Amazon", gold.clone(), "2024-01-15"))
            .unwrap()
            .values((2_i64, Value::Null, gold, "2024-02-01"))
            .unwrap()
            .with_generated_value("code", string_sequence("V").with_left_padding(3).unwrap())
            .unwrap()
            .with_generated_value(
                "audited",
                date_sequence()
                    .starting_at_str("2024-01-31 10:00:00")
                    .unwrap()
                    .incrementing_by(1, CalendarField::Month),
            )
            .unwrap()
            .build()
            .unwrap()
            .into(),
    ]);

    DbSetup::new(ClientDestination::new(client.clone()), operation)
        .launch()
        .await
        .unwrap();

    let rows = client
        .query(
            "select id, code, name, rank, since, audited from pgfixture_it_vendor order by id",
            &[],
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get::<_, i64>(0), 1);
    assert_eq!(rows[0].get::<_, String>(1), "V001");
    assert_eq!(rows[0].get::<_, Option<String>>(2).as_deref(), Some("Amazon"));
    assert_eq!(rows[0].get::<_, i32>(3), 1);
    assert_eq!(
        rows[0].get::<_, NaiveDate>(4),
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    );
    assert_eq!(
        rows[0].get::<_, NaiveDateTime>(5),
        NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    );
    assert_eq!(rows[1].get::<_, String>(1), "V002");
    assert_eq!(rows[1].get::<_, Option<String>>(2), None);
    assert_eq!(
        rows[1].get::<_, NaiveDateTime>(5),
        NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    );
}

#[tokio::test]
async fn failed_launch_leaves_the_database_untouched() {
    let Some(client) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    client
        .batch_execute(
            "drop table if exists pgfixture_it_rollback;
             create table pgfixture_it_rollback (id bigint primary key);
             insert into pgfixture_it_rollback (id) values (42)",
        )
        .await
        .unwrap();

    let operation = sequence_of([
        Operation::from(delete_all_from("pgfixture_it_rollback")),
        insert_into("pgfixture_it_rollback")
            .columns(["id"])
            .unwrap()
            .values((1_i64,))
            .unwrap()
            .values((1_i64,))
            .unwrap()
            .values((2_i64,))
            .unwrap()
            .build()
            .unwrap()
            .into(),
    ]);

    let err = DbSetup::new(ClientDestination::new(client.clone()), operation)
        .launch()
        .await
        .unwrap_err();
    assert!(err.is_database_error());
    assert_eq!(err.sql_state(), Some("23505"));

    let ids: Vec<i64> = client
        .query("select id from pgfixture_it_rollback", &[])
        .await
        .unwrap()
        .iter()
        .map(|row| row.get(0))
        .collect();
    assert_eq!(ids, vec![42]);
}

#[tokio::test]
async fn tracker_skips_an_unchanged_setup_once() {
    let Some(client) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    client
        .batch_execute(
            "drop table if exists pgfixture_it_tracker;
             create table pgfixture_it_tracker (id bigint)",
        )
        .await
        .unwrap();

    let destination = ClientDestination::new(client.clone());
    let fixture = || -> DbSetup<ClientDestination> {
        let operation = sequence_of([
            Operation::from(truncate("pgfixture_it_tracker")),
            sql("insert into pgfixture_it_tracker (id) values (1), (2)").into(),
        ]);
        DbSetup::new(destination.clone(), operation)
    };
    let mut tracker = DbSetupTracker::new();

    tracker.launch_if_necessary(fixture()).await.unwrap();
    assert_eq!(count(&client, "pgfixture_it_tracker").await, 2);

    client
        .batch_execute("insert into pgfixture_it_tracker (id) values (99)")
        .await
        .unwrap();
    tracker.skip_next_launch();
    tracker.launch_if_necessary(fixture()).await.unwrap();
    assert_eq!(count(&client, "pgfixture_it_tracker").await, 3);

    tracker.launch_if_necessary(fixture()).await.unwrap();
    assert_eq!(count(&client, "pgfixture_it_tracker").await, 2);
}

#[tokio::test]
async fn url_destination_opens_its_own_connection() {
    let Some(client) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    client
        .batch_execute(
            "drop table if exists pgfixture_it_url;
             create table pgfixture_it_url (id bigint, label text)",
        )
        .await
        .unwrap();

    let operation = insert_into("pgfixture_it_url")
        .row()
        .column("id", 7_i64)
        .unwrap()
        .column("label", "seven")
        .unwrap()
        .end()
        .unwrap()
        .build()
        .unwrap();
    DbSetup::new(UrlDestination::from_env().unwrap(), operation)
        .launch()
        .await
        .unwrap();

    let row = client
        .query_one("select id, label from pgfixture_it_url", &[])
        .await
        .unwrap();
    assert_eq!(row.get::<_, i64>(0), 7);
    assert_eq!(row.get::<_, String>(1), "seven");
}

#[cfg(feature = "pool")]
#[tokio::test]
async fn pool_destination_reuses_pooled_connections() {
    use pgfixture::PoolDestination;

    let Some(client) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    client
        .batch_execute(
            "drop table if exists pgfixture_it_pool;
             create table pgfixture_it_pool (id bigint)",
        )
        .await
        .unwrap();

    let url = std::env::var("DATABASE_URL").unwrap();
    let destination = PoolDestination::from_url(&url, 1).unwrap();
    let setup = DbSetup::new(
        destination,
        sequence_of([
            Operation::from(delete_all_from("pgfixture_it_pool")),
            insert_into("pgfixture_it_pool")
                .columns(["id"])
                .unwrap()
                .values((1_i64,))
                .unwrap()
                .build()
                .unwrap()
                .into(),
        ]),
    );

    setup.launch().await.unwrap();
    setup.launch().await.unwrap();
    assert_eq!(count(&client, "pgfixture_it_pool").await, 1);
}

#[cfg(feature = "pool")]
#[tokio::test]
async fn pooled_launch_sees_a_recreated_table() {
    use pgfixture::PoolDestination;

    let Some(client) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    client
        .batch_execute(
            "drop table if exists pgfixture_it_pool_retyped;
             create table pgfixture_it_pool_retyped (a int)",
        )
        .await
        .unwrap();

    let url = std::env::var("DATABASE_URL").unwrap();
    let destination = PoolDestination::from_url(&url, 1).unwrap();
    let setup = |value: &str| {
        DbSetup::new(
            destination.clone(),
            insert_into("pgfixture_it_pool_retyped")
                .columns(["a"])
                .unwrap()
                .values((value.to_owned(),))
                .unwrap()
                .build()
                .unwrap(),
        )
    };

    setup("7").launch().await.unwrap();
    let first: i32 = client
        .query_one("select a from pgfixture_it_pool_retyped", &[])
        .await
        .unwrap()
        .get(0);
    assert_eq!(first, 7);

    client
        .batch_execute(
            "drop table pgfixture_it_pool_retyped;
             create table pgfixture_it_pool_retyped (a text)",
        )
        .await
        .unwrap();

    setup("x1").launch().await.unwrap();
    let second: String = client
        .query_one("select a from pgfixture_it_pool_retyped", &[])
        .await
        .unwrap()
        .get(0);
    assert_eq!(second, "x1");
}
