//! Shared fixtures for the scenario tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Local, NaiveDate};
use lunch_core::dates::anchor;
use lunch_core::PersistenceGateway;
use lunch_engine::{
    Credentials, EngineConfig, LunchClient, ManualClock, MemoryIdentity, SessionState,
};
use tokio::sync::watch;

pub const EMAIL: &str = "ana@example.com";
pub const PASSWORD: &str = "secret1";

const WAIT: StdDuration = StdDuration::from_secs(2);

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A clock `hours` before midday (local) of `date`.
pub fn clock_before(date: NaiveDate, hours: i64) -> Arc<ManualClock> {
    Arc::new(ManualClock::new(anchor(date, &Local) - Duration::hours(hours)))
}

pub fn client_with(
    identity: &MemoryIdentity,
    gateway: Arc<dyn PersistenceGateway>,
    clock: Arc<ManualClock>,
) -> LunchClient {
    LunchClient::new(
        Arc::new(identity.clone()),
        gateway,
        clock,
        &EngineConfig::default(),
    )
}

/// Waits until `rx` holds a value satisfying `done`, failing after a few
/// seconds.
pub async fn wait_until<T>(rx: &mut watch::Receiver<T>, done: impl FnMut(&T) -> bool) {
    tokio::time::timeout(WAIT, rx.wait_for(done))
        .await
        .expect("timed out waiting for state")
        .expect("sender dropped");
}

/// Registers the test account, signs in through the client and waits for
/// the session binder to load the owner's reservations. Returns the owner id.
pub async fn sign_in(client: &LunchClient, identity: &MemoryIdentity) -> String {
    let user_id = identity.add_account(EMAIL, PASSWORD);
    client
        .auth()
        .sign_in(&Credentials {
            email: EMAIL.into(),
            password: PASSWORD.into(),
        })
        .await
        .unwrap();

    let mut view = client.reservations().subscribe();
    let expected = user_id.clone();
    wait_until(&mut view, |v| v.loaded && v.owner_id.as_deref() == Some(expected.as_str())).await;
    user_id
}

pub async fn wait_anonymous(client: &LunchClient) {
    let mut state = client.session().subscribe();
    wait_until(&mut state, |s| *s == SessionState::Anonymous).await;
}
