use super::*;
use crate::model::layout::TimelineItem;

fn timeline(durations: &[u32]) -> Vec<TimelineItem> {
    durations.iter().map(|d| TimelineItem::file("f", *d)).collect()
}

fn run(
    z: &mut ZoneScheduler,
    q: &mut TimerQueue,
    tl: &[TimelineItem],
    until: u64,
) -> Vec<(u64, usize)> {
    let mut out = Vec::new();
    while let Some(f) = q.pop_due(Millis(until)) {
        if let Some(i) = z.on_fire(q, &f, tl) {
            out.push((f.deadline.0, i));
        }
    }
    out
}

#[test]
fn dwells_and_wraps() {
    let mut q = TimerQueue::new();
    let mut z = ZoneScheduler::new(ZoneSlot::Index(0));
    let tl = timeline(&[2, 3]);
    z.start(&mut q, Millis(0), &tl);
    assert_eq!(z.state(tl.len()), ZoneState::Index(0));
    assert_eq!(
        run(&mut z, &mut q, &tl, 12_000),
        vec![(2_000, 1), (5_000, 0), (7_000, 1), (10_000, 0), (12_000, 1)]
    );
}

#[test]
fn zero_duration_dwells_ten_seconds() {
    let mut q = TimerQueue::new();
    let mut z = ZoneScheduler::new(ZoneSlot::Global);
    let tl = timeline(&[0]);
    z.start(&mut q, Millis(0), &tl);
    assert_eq!(q.next_deadline(), Some(Millis(10_000)));
}

#[test]
fn empty_timeline_is_idle_without_timer() {
    let mut q = TimerQueue::new();
    let mut z = ZoneScheduler::new(ZoneSlot::Index(0));
    z.start::<TimelineItem>(&mut q, Millis(0), &[]);
    assert_eq!(z.state(0), ZoneState::Idle);
    assert!(q.is_empty());
}

#[test]
fn duration_edit_applies_from_next_advance() {
    let mut q = TimerQueue::new();
    let mut z = ZoneScheduler::new(ZoneSlot::Index(0));
    let mut tl = timeline(&[5, 5]);
    z.start(&mut q, Millis(0), &tl);
    tl[0].duration = 1;
    tl[1].duration = 1;
    z.sync(&mut q, Millis(100), &tl);
    assert_eq!(q.next_deadline(), Some(Millis(5_000)));
    assert_eq!(run(&mut z, &mut q, &tl, 6_000), vec![(5_000, 1), (6_000, 0)]);
}

#[test]
fn sync_handles_shrink_grow_and_empty() {
    let mut q = TimerQueue::new();
    let mut z = ZoneScheduler::new(ZoneSlot::Index(0));
    let tl = timeline(&[1, 1, 1]);
    z.start(&mut q, Millis(0), &tl);
    run(&mut z, &mut q, &tl, 2_000);
    assert_eq!(z.current(3), Some(2));

    let shrunk = timeline(&[1, 1]);
    z.sync(&mut q, Millis(2_500), &shrunk);
    assert_eq!(z.current(2), Some(0));

    z.sync::<TimelineItem>(&mut q, Millis(2_600), &[]);
    assert_eq!(z.state(0), ZoneState::Idle);
    assert!(q.is_empty());

    z.sync(&mut q, Millis(4_000), &shrunk);
    assert_eq!(z.current(2), Some(0));
    assert_eq!(q.next_deadline(), Some(Millis(5_000)));
}

#[test]
fn stopped_zone_never_fires() {
    let mut q = TimerQueue::new();
    let mut z = ZoneScheduler::new(ZoneSlot::Index(0));
    let tl = timeline(&[1]);
    z.start(&mut q, Millis(0), &tl);
    z.stop(&mut q);
    assert!(q.pop_due(Millis(60_000)).is_none());
}
