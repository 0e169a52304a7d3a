//! Tests for traced loads and stores, address mapping and trace export

use rayon::prelude::*;
use regtrace::{
    AccessEvent, AccessKind, Error, MemoryCell, Register, Session, SessionConfig, SlotId,
    ELEMENT_SIZE,
};

const K: u64 = ELEMENT_SIZE as u64;

// ====================
// Loads and stores
// ====================

#[test]
fn test_literal_store_through_offset_pointer() {
    let session = Session::new();
    let a = session.allocate_buffer(8).unwrap();
    let p = session.pointer(a).unwrap();

    (&p + 3).unwrap().deref().unwrap().store(42).unwrap();

    assert_eq!(session.snapshot(), vec![AccessEvent::write(a + 3 * K, None)]);
    assert_eq!(session.read_buffer(a + 3 * K, 1), vec![42]);
}

#[test]
fn test_load_into_fresh_register() {
    let session = Session::new();
    let a = session.load_buffer(&[5, 6, 7, 8]).unwrap();
    let p = session.pointer(a).unwrap();

    let r = Register::load(&(&p + 3).unwrap().deref().unwrap()).unwrap();
    assert_eq!(r.value().unwrap(), 8);
    assert_eq!(
        session.snapshot(),
        vec![AccessEvent::read(a + 3 * K, r.slot().unwrap())]
    );
}

#[test]
fn test_load_into_existing_register() {
    let session = Session::new();
    let a = session.load_buffer(&[1, 2]).unwrap();
    let p = session.pointer(a).unwrap();
    let mut r = session.register(0).unwrap();

    r.load_from(&p.index(1).unwrap()).unwrap();
    assert_eq!(r.value().unwrap(), 2);
    let events = session.snapshot();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, AccessKind::Read);
    assert_eq!(events[0].slot, Some(r.slot().unwrap()));
}

#[test]
fn test_register_store_carries_slot() {
    let session = Session::new();
    let a = session.allocate_buffer(2).unwrap();
    let p = session.pointer(a).unwrap();
    let r = session.register(-3).unwrap();
    let stored = p.index(1).unwrap().store(&r).unwrap();
    assert_eq!(stored, -3);
    assert_eq!(
        session.snapshot(),
        vec![AccessEvent::write(a + K, Some(r.slot().unwrap()))]
    );
}

#[test]
fn test_cell_to_cell_copy_forbidden() {
    let session = Session::new();
    let a = session.load_buffer(&[1, 2, 3]).unwrap();
    let p1 = session.pointer(a).unwrap();
    let p2 = session.pointer(a + 2 * K).unwrap();

    let dst = p1.deref().unwrap();
    let src = p2.deref().unwrap();
    assert_eq!(dst.store(&src), Err(Error::DirectMemoryCopyForbidden));
    assert_eq!(session.read_buffer(a, 3), vec![1, 2, 3]);
    assert!(session.snapshot().is_empty());

    // the explicit route logs two events
    let via = src.load().unwrap();
    dst.store(&via).unwrap();
    let kinds: Vec<AccessKind> = session.snapshot().iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![AccessKind::Read, AccessKind::Write]);
    assert_eq!(session.read_buffer(a, 3), vec![3, 2, 3]);
}

#[test]
fn test_log_order_follows_program_order() {
    let session = Session::new();
    let a = session.load_buffer(&[3, 1, 2]).unwrap();
    let p = session.pointer(a).unwrap();

    // bubble the first element to the end
    for i in 0..2 {
        let x = p.index(i).unwrap().load().unwrap();
        let y = p.index(i + 1).unwrap().load().unwrap();
        if x.gt(&y).unwrap() {
            p.index(i).unwrap().store(&y).unwrap();
            p.index(i + 1).unwrap().store(&x).unwrap();
        }
    }

    assert_eq!(session.read_buffer(a, 3), vec![1, 2, 3]);
    let addresses: Vec<u64> = session.snapshot().iter().map(|e| e.address - a).collect();
    assert_eq!(
        addresses,
        vec![0, K, 0, K, K, 2 * K, K, 2 * K]
    );
}

#[test]
fn test_register_driven_pointer_walk() {
    let session = Session::new();
    let a = session.load_buffer(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
    let mut p = session.pointer(a).unwrap();
    let step = session.register(3).unwrap();
    let back = session.register(1).unwrap();

    p.advance(&step).unwrap();
    let r = p.index(&back).unwrap().load().unwrap();
    assert_eq!(r.value().unwrap(), 5);
    p.retreat(&back).unwrap();
    let q = p.offset_back(&back).unwrap();
    q.deref().unwrap().store(&r).unwrap();

    assert_eq!(session.read_buffer(a, 3), vec![1, 5, 3]);
    assert_eq!(
        session.snapshot(),
        vec![
            AccessEvent::read(a + 4 * K, r.slot().unwrap()),
            AccessEvent::write(a + K, Some(r.slot().unwrap())),
        ]
    );

    let mut moved = session.register(0).unwrap();
    let _kept = moved.take().unwrap();
    assert!(matches!(p.index(&moved), Err(Error::InvalidHandleUse { .. })));
    assert!(matches!(p.retreat(&moved), Err(Error::InvalidHandleUse { .. })));
    assert_eq!(p.address().unwrap(), a + 2 * K);
}

#[test]
fn test_unwritten_memory_reads_zero() {
    let session = Session::new();
    let p = session.pointer(0xdead_beef_0000).unwrap();
    let r = p.deref().unwrap().load().unwrap();
    assert_eq!(r.value().unwrap(), 0);
    assert_eq!(session.event_count(), 1);
}

// ====================
// Address mapping and trace lines
// ====================

#[test]
fn test_pointer_renders_virtual_address() {
    let session = Session::new();
    let a = session.allocate_buffer(16).unwrap();
    session.set_address_mapping(a, 0x1000).unwrap();
    let p = session.pointer(a).unwrap();
    let q = (&p + 3).unwrap();
    assert_eq!(q.to_string(), format!("{:#x}", 0x1000 + 3 * K));
}

#[test]
fn test_trace_lines() {
    let session = Session::new();
    let a = session.allocate_buffer(16).unwrap();
    session.set_address_mapping(a, 0x1000).unwrap();
    let p = session.pointer(a).unwrap();

    p.index(3).unwrap().store(1).unwrap();
    let r = p.index(3).unwrap().load().unwrap();
    p.index(4).unwrap().store(&r).unwrap();

    let slot = r.slot().unwrap();
    assert_eq!(
        session.trace_lines(),
        vec![
            "S 100c,4 -1".to_string(),
            format!("L 100c,4 {}", slot),
            format!("S 1010,4 {}", slot),
        ]
    );

    let mut out = Vec::new();
    session.write_trace(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 3);
    assert!(text.ends_with('\n'));
}

#[test]
fn test_runs_at_different_addresses_give_same_trace() {
    let run = |memory_base: u64| {
        let session = Session::with_config(SessionConfig {
            memory_base,
            base_address: None,
            base_offset: 0x4000,
        });
        let a = session.load_buffer(&[1, 2, 3, 4]).unwrap();
        let p = session.pointer(a).unwrap();
        for i in 0..4 {
            let x = p.index(i).unwrap().load().unwrap();
            p.index(3 - i).unwrap().store(&x).unwrap();
        }
        session.trace_lines()
    };
    assert_eq!(run(0x1_0000), run(0x7fff_0000));
}

#[test]
fn test_mapping_locked_after_first_pointer() {
    let session = Session::new();
    let a = session.allocate_buffer(1).unwrap();
    session.set_address_mapping(a, 0).unwrap();
    session.set_address_mapping(a, 0x2000).unwrap();
    let _p = session.pointer(a).unwrap();
    assert_eq!(
        session.set_address_mapping(a, 0),
        Err(Error::AddressMappingLocked)
    );
    assert_eq!(session.address_mapping().base_offset, 0x2000);
}

// ====================
// External recording and export
// ====================

#[test]
fn test_external_read_write_event() {
    let session = Session::new();
    let event = AccessEvent::from_raw(3, 0x20, Some(SlotId::new(2))).unwrap();
    session.record(event);
    session.set_address_mapping(0, 0).unwrap();
    assert_eq!(session.trace_lines(), vec!["M 20,4 2".to_string()]);

    assert_eq!(
        AccessEvent::from_raw(0, 0x20, None),
        Err(Error::UnknownAccessKind { tag: 0 })
    );
}

#[test]
fn test_events_json_roundtrip() {
    let session = Session::new();
    let a = session.allocate_buffer(2).unwrap();
    let p = session.pointer(a).unwrap();
    p.deref().unwrap().store(9).unwrap();
    let _r = p.deref().unwrap().load().unwrap();

    let json = session.events_json().unwrap();
    let parsed: Vec<AccessEvent> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, session.snapshot());
    assert!(json.contains("\"kind\":2"));
}

#[test]
fn test_cell_display_does_not_trace() {
    let session = Session::new();
    let a = session.load_buffer(&[123]).unwrap();
    let p = session.pointer(a).unwrap();
    let cell: MemoryCell = p.deref().unwrap();
    assert_eq!(format!("{}", cell), "123");
    assert_eq!(session.event_count(), 0);
}

// ====================
// Parallel sessions
// ====================

#[test]
fn test_parallel_sessions_do_not_interfere() {
    let traces: Vec<(usize, Vec<String>)> = (0..8)
        .into_par_iter()
        .map(|n| {
            let session = Session::new();
            let a = session.load_buffer(&vec![1; 8]).unwrap();
            let p = session.pointer(a).unwrap();
            let mut acc = session.register(0).unwrap();
            for i in 0..=n as i32 {
                let x = p.index(i % 8).unwrap().load().unwrap();
                acc.update(regtrace::ArithOp::Add, &x).unwrap();
            }
            assert_eq!(acc.value().unwrap(), n as i32 + 1);
            (session.peak_register_count(), session.trace_lines())
        })
        .collect();

    for (n, (peak, lines)) in traces.iter().enumerate() {
        assert_eq!(*peak, 3);
        assert_eq!(lines.len(), n + 1);
    }
}
