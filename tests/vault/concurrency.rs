//! Overlapping writers are serialized by the vault.

use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use luxe_archive::{NoticeTone, PrimaryStore};

use crate::support::{brand, ids, vault, FaultyKv, FaultyPrimary};

#[test]
fn concurrent_saves_do_not_clobber_each_other() {
    let primary = FaultyPrimary::new();
    let vault = Arc::new(vault(&primary, &FaultyKv::new()));
    vault.initialize();
    primary.faults(|f| f.upsert_delay = Some(Duration::from_millis(20)));

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let vault = Arc::clone(&vault);
            thread::spawn(move || vault.save_current(brand(&format!("b{i}")), Vec::new()))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().tone, NoticeTone::Success);
    }

    // Every save is visible; none was lost to a slower writer finishing last.
    let mut in_memory = ids(&vault.records());
    in_memory.sort();
    assert_eq!(in_memory, vec!["b0", "b1", "b2", "b3", "b4", "b5"]);
    assert_eq!(vault.records(), primary.inner().get_all().unwrap());
}

#[test]
fn repeated_saves_of_one_brand_keep_the_last_issued() {
    let primary = FaultyPrimary::new();
    let vault = Arc::new(vault(&primary, &FaultyKv::new()));
    vault.initialize();
    primary.faults(|f| f.upsert_delay = Some(Duration::from_millis(30)));

    let slow = {
        let vault = Arc::clone(&vault);
        thread::spawn(move || {
            let mut first = brand("a");
            first.name = "First draft".into();
            vault.save_current(first, Vec::new())
        })
    };
    // Let the first save take its turn before the second arrives.
    while primary.upsert_calls() == 0 {
        thread::yield_now();
    }
    let mut second = brand("a");
    second.name = "Final".into();
    vault.save_current(second, Vec::new());
    slow.join().unwrap();

    assert_eq!(vault.records().len(), 1);
    assert_eq!(vault.records()[0].name, "Final");
    assert_eq!(primary.inner().get_all().unwrap()[0].name, "Final");
}

#[test]
fn readers_do_not_wait_for_writers() {
    let primary = FaultyPrimary::new();
    let vault = Arc::new(vault(&primary, &FaultyKv::new()));
    vault.initialize();
    primary.faults(|f| f.upsert_delay = Some(Duration::from_millis(300)));

    let writer = {
        let vault = Arc::clone(&vault);
        thread::spawn(move || vault.save_current(brand("slow"), Vec::new()))
    };
    while primary.upsert_calls() == 0 {
        thread::yield_now();
    }

    let (tx, rx) = mpsc::channel();
    let reader = {
        let vault = Arc::clone(&vault);
        thread::spawn(move || {
            tx.send(vault.records().len()).unwrap();
        })
    };
    // Unconfirmed writes are not visible.
    assert_eq!(rx.recv_timeout(Duration::from_millis(200)).unwrap(), 0);
    reader.join().unwrap();
    writer.join().unwrap();
    assert_eq!(vault.records().len(), 1);
}

#[cfg(feature = "emitter")]
#[test]
fn notices_are_broadcast_to_subscribers() {
    let primary = FaultyPrimary::new();
    let vault = vault(&primary, &FaultyKv::new());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let (tx, rx) = mpsc::channel();
    let tx = Mutex::new(tx);
    {
        let seen = Arc::clone(&seen);
        vault.on_notice(move |notice| {
            seen.lock().unwrap().push(notice.message.clone());
            let _ = tx.lock().unwrap().send(());
        });
    }
    vault.initialize();
    vault.save_current(brand("a"), Vec::new());

    rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec!["Legacy secured in archive.".to_string()]);
    assert_eq!(vault.notice().unwrap().message, "Legacy secured in archive.");
}
