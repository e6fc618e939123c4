//! The engine against the SQLite adapter.

mod common;

use std::sync::Arc;

use lunch_core::{MenuType, NewReservation, PersistenceGateway, ReservationStatus};
use lunch_db::{Database, DbConfig};
use lunch_engine::{CommitReport, MemoryIdentity};

use common::*;

async fn database() -> Arc<Database> {
    Arc::new(Database::new(DbConfig::in_memory()).await.unwrap())
}

#[tokio::test]
async fn confirm_mixed_batch() {
    let db = database().await;
    let identity = MemoryIdentity::new();
    let client = client_with(&identity, db.clone(), clock_before(date(2025, 6, 10), 96));
    let _binding = client.start().await;
    let owner = sign_in(&client, &identity).await;

    db.insert_reservations(&[
        NewReservation {
            status: ReservationStatus::Cancelled,
            ..NewReservation::confirmed(owner.as_str(), date(2025, 6, 10), MenuType::Normal)
        },
        NewReservation::confirmed(owner.as_str(), date(2025, 6, 11), MenuType::Normal),
    ])
    .await
    .unwrap();

    client.select_date(date(2025, 6, 10), MenuType::Hipocaloric).unwrap();
    client.select_date(date(2025, 6, 11), MenuType::Hipocaloric).unwrap();
    client.select_date(date(2025, 6, 12), MenuType::Normal).unwrap();

    let report = client.confirm().await.unwrap();
    assert_eq!(
        report,
        CommitReport {
            committed: 2,
            reactivated: 1,
            inserted: 1,
            already_confirmed: 1,
            duplicates_skipped: 2,
        }
    );

    let rows = db.select_reservations(&owner).await.unwrap();
    assert_eq!(
        rows.iter()
            .map(|r| (r.date, r.menu_type, r.status))
            .collect::<Vec<_>>(),
        vec![
            (date(2025, 6, 10), MenuType::Hipocaloric, ReservationStatus::Confirmed),
            (date(2025, 6, 11), MenuType::Normal, ReservationStatus::Confirmed),
            (date(2025, 6, 12), MenuType::Normal, ReservationStatus::Confirmed),
        ]
    );
    assert_eq!(client.reservations().snapshot(), rows);
    assert!(client.pending().is_empty());
}

#[tokio::test]
async fn cancel_and_rebook() {
    let db = database().await;
    let identity = MemoryIdentity::new();
    let client = client_with(&identity, db.clone(), clock_before(date(2025, 6, 10), 96));
    let _binding = client.start().await;
    let owner = sign_in(&client, &identity).await;

    client.select_date(date(2025, 6, 10), MenuType::Normal).unwrap();
    client.confirm().await.unwrap();
    let id = client.reservations().find_by_date(date(2025, 6, 10)).unwrap().id;

    client.cancel_reservation(&id).await.unwrap();
    assert_eq!(client.active_count(), 0);
    assert_eq!(
        client.reservations().get(&id).map(|r| r.status),
        Some(ReservationStatus::Cancelled)
    );

    client.select_date(date(2025, 6, 10), MenuType::Hipocaloric).unwrap();
    let report = client.confirm().await.unwrap();
    assert_eq!(report.reactivated, 1);

    let rows = db.select_reservations(&owner).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, id);
    assert_eq!(rows[0].menu_type, MenuType::Hipocaloric);
    assert!(rows[0].is_confirmed());
}

#[tokio::test]
async fn sign_up_profile_is_stored() {
    let db = database().await;
    let identity = MemoryIdentity::new();
    let client = client_with(&identity, db.clone(), clock_before(date(2025, 6, 10), 96));

    let session = client
        .auth()
        .sign_up(&lunch_engine::SignUpRequest {
            email: "marta@example.com".into(),
            password: "secret1".into(),
            attributes: lunch_core::ProfileAttributes {
                full_name: "Marta Gil".into(),
                employee_id: "EMP007".into(),
                department: Some("Compras".into()),
                role: None,
            },
        })
        .await
        .unwrap();

    let profile = db.select_profile(&session.user_id).await.unwrap().unwrap();
    assert_eq!(profile.email, "marta@example.com");
    assert_eq!(profile.department.as_deref(), Some("Compras"));
    assert_eq!(profile.role, "employee");
}
