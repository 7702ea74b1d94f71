//! Session persistence through the flash-backed store

use geotrack::communication::lorawan::{
    ConnectivityConfig, ConnectivityManager, PollOutcome, SessionSnapshot,
};
use geotrack::core::storage::FlashKvStore;
use geotrack::geotrack_core::credentials::Credentials;
use geotrack::geotrack_core::traits::{MockRadio, MockTime, RadioError};
use geotrack::platform::mock::MockFlash;

fn credentials() -> Credentials {
    Credentials::from_hex(
        "58EC3C43CA480000",
        "0000000000000000",
        "CE8A96F54327D1CB20078F78D4746517",
    )
    .unwrap()
}

fn config() -> ConnectivityConfig {
    ConnectivityConfig {
        tx_interval_ms: 0,
        ..ConnectivityConfig::default()
    }
}

#[test]
fn session_survives_power_cycle() {
    let time = MockTime::new();
    let mut radio = MockRadio::new();
    radio.accept_join();

    let store = FlashKvStore::new(MockFlash::new());
    let mut mgr = ConnectivityManager::new(radio, store, &time, credentials(), config());
    mgr.activate().unwrap();
    assert_eq!(mgr.poll_activation(), PollOutcome::Joined);

    mgr.radio_mut().script_send(Err(RadioError::TxTimeout));
    let _ = mgr.transmit(&[0x01], 1);
    mgr.transmit(&[0x02], 1).unwrap();
    let before = mgr.statistics();

    // Only the flash contents survive
    let (_, store, _) = mgr.into_parts();
    let flash = store.into_flash();

    let restarted = ConnectivityManager::new(
        MockRadio::new(),
        FlashKvStore::new(flash),
        &time,
        credentials(),
        config(),
    );

    assert!(restarted.is_joined());
    assert_eq!(restarted.tx_counter(), 1);
    assert_eq!(restarted.statistics().total_tx, before.total_tx);
    assert_eq!(restarted.statistics().success_tx, before.success_tx);
    assert_eq!(restarted.statistics().failed_tx, before.failed_tx);
}

#[test]
fn interrupted_commit_keeps_previous_session() {
    let snapshot = SessionSnapshot {
        joined: true,
        tx_counter: 4,
        total_tx: 5,
        success_tx: 4,
        failed_tx: 1,
    };

    let mut store = FlashKvStore::new(MockFlash::new());
    snapshot.save(&mut store).unwrap();

    let newer = SessionSnapshot {
        tx_counter: 5,
        total_tx: 6,
        success_tx: 5,
        ..snapshot
    };
    store.flash_mut().simulate_power_loss();
    let _ = newer.save(&mut store);

    let mut restarted = FlashKvStore::new(store.into_flash());
    assert_eq!(SessionSnapshot::load(&mut restarted), Ok(snapshot));
}
