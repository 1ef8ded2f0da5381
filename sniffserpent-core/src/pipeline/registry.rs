//! Indexed store of accepted packets.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::frame::Frame;
use crate::packet::{PacketRecord, ProtocolTag};

/// Records by sequence id, plus the next id to assign.
///
/// Both live under one lock so ids stay gap-free across threads.
#[derive(Debug, Default)]
pub struct PacketRegistry {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    records: BTreeMap<u64, Arc<PacketRecord>>,
    next_id: u64,
}

impl PacketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `frame` under the next id and return the new record.
    pub fn insert(&self, tag: ProtocolTag, frame: Frame) -> Arc<PacketRecord> {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;
        let record = Arc::new(PacketRecord::new(id, tag, frame));
        inner.records.insert(id, Arc::clone(&record));
        record
    }

    pub fn get(&self, id: u64) -> Option<Arc<PacketRecord>> {
        self.inner.read().records.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }

    /// Id the next accepted packet will get.
    pub fn next_id(&self) -> u64 {
        self.inner.read().next_id
    }

    /// Snapshot of every record in id order.
    pub fn records(&self) -> Vec<Arc<PacketRecord>> {
        self.inner.read().records.values().cloned().collect()
    }

    /// Drop every record and restart ids at 0.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.records.clear();
        inner.next_id = 0;
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::protocol::test_utils::*;

    fn arp_frame() -> Frame {
        decode_frame(build_arp_packet(1, [10, 0, 0, 1], [10, 0, 0, 2]))
    }

    #[test]
    fn test_ids_are_sequential() {
        let registry = PacketRegistry::new();
        let ids: Vec<_> = (0..3)
            .map(|_| registry.insert(ProtocolTag::Arp, arp_frame()).id())
            .collect();

        assert_eq!(ids, [0, 1, 2]);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get(1).map(|r| r.tag()), Some(ProtocolTag::Arp));
        assert!(registry.get(3).is_none());
    }

    #[test]
    fn test_clear_resets_counter() {
        let registry = PacketRegistry::new();
        registry.insert(ProtocolTag::Arp, arp_frame());
        registry.insert(ProtocolTag::Arp, arp_frame());
        registry.clear();

        assert!(registry.is_empty());
        assert_eq!(registry.next_id(), 0);
        assert_eq!(registry.insert(ProtocolTag::Arp, arp_frame()).id(), 0);
    }

    #[test]
    fn test_concurrent_inserts_have_no_gaps() {
        let registry = Arc::new(PacketRegistry::new());
        let frame = arp_frame();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let frame = frame.clone();
                thread::spawn(move || {
                    for _ in 0..250 {
                        registry.insert(ProtocolTag::Arp, frame.clone());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let ids: Vec<_> = registry.records().iter().map(|r| r.id()).collect();
        assert_eq!(ids, (0..1000).collect::<Vec<_>>());
    }
}
