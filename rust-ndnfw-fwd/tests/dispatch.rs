mod common;

use common::*;
use rust_ndnfw_common::{FaceId, FwToken, L3Packet};
use rust_ndnfw_fwd::strategy::Multicast;
use rust_ndnfw_fwd::{DispatchError, Dispatcher, FaceTable, Fib, FwdConfig};
use std::sync::Arc;
use std::time::Duration;

async fn wait_for(faces: &RecordingFaces, n: usize) {
    for _ in 0..200 {
        if faces.len() >= n {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {} packets, have {}", n, faces.len());
}

fn start(cfg: &FwdConfig) -> (Dispatcher, Arc<RecordingFaces>) {
    init_logger();
    let fib = Arc::new(Fib::new(cfg.n_workers));
    fib.insert(name("/a"), &[FaceId(1)], Arc::new(Multicast)).unwrap();
    let faces = Arc::new(RecordingFaces::default());
    let table: Arc<dyn FaceTable> = faces.clone();
    let dispatcher = Dispatcher::start(cfg, fib, table).unwrap();
    (dispatcher, faces)
}

#[tokio::test]
async fn test_round_trip_through_workers() {
    let (dispatcher, faces) = start(&FwdConfig::default());
    assert_eq!(dispatcher.n_workers(), 2);

    let pkt = rx_interest(10, 0xA, interest("/a/b", 1));
    let expected = (name("/a/b").compute_hash() % 2) as usize;
    assert_eq!(dispatcher.worker_for(&pkt), Some(expected));
    assert_eq!(dispatcher.dispatch(pkt), Ok(expected));

    wait_for(&faces, 1).await;
    let (face, up) = faces.take().pop().unwrap();
    assert_eq!(face, FaceId(1));
    assert_eq!(FwToken(up.token).worker() as usize, expected);

    assert_eq!(dispatcher.dispatch(rx_data(1, up.token, "/a/b")), Ok(expected));
    wait_for(&faces, 1).await;
    let (face, down) = faces.take().pop().unwrap();
    assert_eq!(face, FaceId(10));
    assert_eq!(down.token, 0xA);
    assert!(matches!(down.l3, L3Packet::Data(_)));
    assert_eq!(dispatcher.counters()[expected].n_rx_data.value(), 1);

    let forwarders = dispatcher.shutdown().await;
    assert_eq!(forwarders.len(), 2);
    assert!(forwarders.iter().all(|fwd| fwd.pit().is_empty()));
}

#[tokio::test]
async fn test_bad_token_is_refused() {
    let (dispatcher, faces) = start(&FwdConfig::default());
    let token = FwToken::new(7, 1).0;
    assert_eq!(
        dispatcher.dispatch(rx_data(1, token, "/a")),
        Err(DispatchError::BadToken)
    );
    assert_eq!(dispatcher.n_bad_token(), 1);
    dispatcher.shutdown().await;
    assert_eq!(faces.len(), 0);
}

#[tokio::test]
async fn test_full_queue_drops() {
    let cfg = FwdConfig {
        n_workers: 1,
        queue_capacity: 1,
        ..FwdConfig::default()
    };
    let (dispatcher, _faces) = start(&cfg);
    // workers cannot run before this task yields
    assert_eq!(dispatcher.dispatch(rx_interest(10, 1, interest("/a/1", 1))), Ok(0));
    assert_eq!(
        dispatcher.dispatch(rx_interest(10, 2, interest("/a/2", 2))),
        Err(DispatchError::QueueFull)
    );
    assert_eq!(dispatcher.n_queue_drops(), 1);

    let forwarders = dispatcher.shutdown().await;
    assert_eq!(forwarders[0].counters().n_rx_interests.value(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_workers_sweep_expired_entries() {
    let (dispatcher, faces) = start(&FwdConfig::default());
    dispatcher
        .dispatch(rx_interest(10, 1, interest("/a/b", 1)))
        .unwrap();
    wait_for(&faces, 1).await;

    tokio::time::sleep(Duration::from_millis(1500)).await;
    let expired: u64 = dispatcher
        .counters()
        .iter()
        .map(|c| c.n_expired.value())
        .sum();
    assert_eq!(expired, 1);
    dispatcher.shutdown().await;
}

#[test]
fn test_start_needs_runtime() {
    let fib = Arc::new(Fib::new(1));
    let faces: Arc<dyn FaceTable> = Arc::new(RecordingFaces::default());
    assert!(Dispatcher::start(&FwdConfig::default(), fib, faces).is_err());
}
