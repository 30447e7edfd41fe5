#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use allowance_core::{
    core::{
        services::{LedgerServices, MonthLabels},
        time::FixedClock,
    },
    domain::owner::OwnerId,
    storage::SqliteStore,
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub struct TestEnv {
    pub base: PathBuf,
    pub store: SqliteStore,
    pub clock: FixedClock,
    pub services: LedgerServices,
    pub owner: OwnerId,
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Opens a file-backed ledger in a unique directory with the clock fixed on [`today`].
pub fn setup_test_env() -> TestEnv {
    let base = temp_base();
    let store = SqliteStore::open(&base.join("ledger.sqlite3")).expect("open ledger database");
    let clock = FixedClock::on(today());
    let services = LedgerServices::new(store.clone(), Arc::new(clock.clone()), MonthLabels::Indonesian);
    TestEnv {
        base,
        store,
        clock,
        services,
        owner: OwnerId::random(),
    }
}
