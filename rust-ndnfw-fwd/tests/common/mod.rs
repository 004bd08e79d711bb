//! Helpers shared by the integration tests.
#![allow(dead_code)]

use rust_ndnfw_common::packet::RxPacket;
use rust_ndnfw_common::{Data, FaceId, Interest, L3Packet, Name, Nack, NackReason, OutPacket};
use rust_ndnfw_fwd::strategy::Strategy;
use rust_ndnfw_fwd::{FaceTable, Fib, Forwarder, FwdConfig};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Face table that records every transmitted packet.
#[derive(Default)]
pub struct RecordingFaces {
    sent: Mutex<Vec<(FaceId, OutPacket)>>,
    down: Mutex<HashSet<FaceId>>,
}

impl RecordingFaces {
    pub fn set_down(&self, face: u16, down: bool) {
        let mut set = self.down.lock().unwrap();
        if down {
            set.insert(FaceId(face));
        } else {
            set.remove(&FaceId(face));
        }
    }

    pub fn len(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Remove and return everything sent so far.
    pub fn take(&self) -> Vec<(FaceId, OutPacket)> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }
}

impl FaceTable for RecordingFaces {
    fn is_down(&self, face: FaceId) -> bool {
        self.down.lock().unwrap().contains(&face)
    }

    fn transmit(&self, face: FaceId, pkt: OutPacket) {
        self.sent.lock().unwrap().push((face, pkt));
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn name(uri: &str) -> Name {
    Name::from_uri(uri).unwrap()
}

pub fn interest(uri: &str, nonce: u32) -> Interest {
    Interest::new(name(uri))
        .with_nonce(nonce)
        .with_lifetime(Duration::from_millis(1000))
}

pub fn rx_interest(face: u16, token: u64, interest: Interest) -> RxPacket {
    RxPacket::new(FaceId(face), token, L3Packet::Interest(interest))
}

pub fn rx_data(face: u16, token: u64, uri: &str) -> RxPacket {
    RxPacket::new(FaceId(face), token, L3Packet::Data(Data::new(name(uri), &b"hello"[..])))
}

/// A Nack answering an Interest the forwarder sent out.
pub fn rx_nack(face: u16, sent: &OutPacket, reason: NackReason) -> RxPacket {
    let L3Packet::Interest(interest) = &sent.l3 else {
        panic!("not an Interest: {:?}", sent.l3);
    };
    RxPacket::new(
        FaceId(face),
        sent.token,
        L3Packet::Nack(Nack::from_interest(interest.clone(), reason)),
    )
}

pub fn as_interest(pkt: &OutPacket) -> &Interest {
    match &pkt.l3 {
        L3Packet::Interest(interest) => interest,
        other => panic!("expected Interest, got {:?}", other),
    }
}

pub fn as_nack(pkt: &OutPacket) -> &Nack {
    match &pkt.l3 {
        L3Packet::Nack(nack) => nack,
        other => panic!("expected Nack, got {:?}", other),
    }
}

pub struct Setup {
    pub fwd: Forwarder,
    pub faces: Arc<RecordingFaces>,
    pub fib: Arc<Fib>,
}

pub fn setup_with(cfg: FwdConfig, prefix: &str, nexthops: &[u16], strategy: Arc<dyn Strategy>) -> Setup {
    init_logger();
    let fib = Arc::new(Fib::new(1));
    let nexthops: Vec<FaceId> = nexthops.iter().copied().map(FaceId).collect();
    fib.insert(name(prefix), &nexthops, strategy).unwrap();
    let faces = Arc::new(RecordingFaces::default());
    let fwd = Forwarder::new(0, &cfg, Arc::clone(&fib), faces.clone());
    Setup { fwd, faces, fib }
}

pub fn setup(prefix: &str, nexthops: &[u16], strategy: Arc<dyn Strategy>) -> Setup {
    setup_with(FwdConfig::default(), prefix, nexthops, strategy)
}
