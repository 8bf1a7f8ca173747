use super::*;

#[test]
fn wrap_law_holds_for_any_index() {
    let mut s = Sequencer::new(TimerTarget::Playlist);
    for len in 1..6 {
        for i in 0..20 {
            s.set_index(i, len);
            assert_eq!(s.current(len), Some(i % len));
        }
    }
    assert_eq!(s.current(0), None);
}

#[test]
fn advance_consumes_only_its_own_timer() {
    let mut q = TimerQueue::new();
    let mut s = Sequencer::new(TimerTarget::Playlist);
    s.arm_at(&mut q, Millis(10));
    let stranger = q.arm_at(Millis(5), TimerTarget::Playlist);

    let first = q.pop_due(Millis(10)).unwrap();
    assert_eq!(first.id, stranger);
    assert_eq!(s.advance(&first, 3), None);
    assert_eq!(s.index(), 0);

    let mine = q.pop_due(Millis(10)).unwrap();
    assert_eq!(s.advance(&mine, 3), Some(1));
    assert!(s.pending().is_none());
}

#[test]
fn advance_wraps_to_start() {
    let mut q = TimerQueue::new();
    let mut s = Sequencer::new(TimerTarget::Playlist);
    let mut seen = Vec::new();
    for t in 1..=4 {
        s.arm_at(&mut q, Millis(t));
        let f = q.pop_due(Millis(t)).unwrap();
        seen.push(s.advance(&f, 3).unwrap());
    }
    assert_eq!(seen, vec![1, 2, 0, 1]);
}

#[test]
fn rearming_replaces_pending_timer() {
    let mut q = TimerQueue::new();
    let mut s = Sequencer::new(TimerTarget::Playlist);
    s.arm_at(&mut q, Millis(10));
    s.arm_at(&mut q, Millis(20));
    assert_eq!(q.len(), 1);
    s.reset(&mut q);
    assert!(q.is_empty());
}

#[test]
fn retarget_keeps_deadline() {
    use crate::schedule::timer::ZoneSlot;
    let mut q = TimerQueue::new();
    let mut s = Sequencer::new(TimerTarget::Zone(ZoneSlot::Index(3)));
    s.arm_at(&mut q, Millis(40));
    s.retarget(&mut q, TimerTarget::Zone(ZoneSlot::Index(1)));
    let f = q.pop_due(Millis(40)).unwrap();
    assert_eq!(f.target, TimerTarget::Zone(ZoneSlot::Index(1)));
    assert_eq!(s.advance(&f, 2), Some(1));
}
