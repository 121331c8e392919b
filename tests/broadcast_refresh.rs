use std::cell::Cell;
use std::rc::Rc;

use chrono::NaiveDate;
use hotel_desk::backend::{Backend, MemoryBackend, Seed};
use hotel_desk::booking::ReservationDraft;
use hotel_desk::broadcast::{Channel, DataChanged, RefreshFlag, UpdateChannel};
use hotel_desk::context::AppContext;
use hotel_desk::dashboard::DashboardSummary;
use hotel_desk::storage::MemoryStorage;

fn counter(channel: &UpdateChannel) -> (Rc<Cell<u32>>, hotel_desk::broadcast::Subscription) {
    let hits = Rc::new(Cell::new(0));
    let seen = hits.clone();
    let sub = channel.subscribe(move |_| seen.set(seen.get() + 1));
    (hits, sub)
}

#[test]
fn two_handlers_then_one_after_unsubscribe() {
    let channel = UpdateChannel::new();
    let (first, first_sub) = counter(&channel);
    let (second, _second_sub) = counter(&channel);

    channel.emit(DataChanged);
    assert_eq!((first.get(), second.get()), (1, 1));

    assert!(first_sub.unsubscribe());
    channel.emit(DataChanged);
    assert_eq!((first.get(), second.get()), (1, 2));
    assert_eq!(channel.subscriber_count(), 1);
}

#[test]
fn n_subscribers_each_run_once_per_emit() {
    let channel: Channel<u8> = Channel::new();
    let hits = Rc::new(Cell::new(0u32));
    let subs: Vec<_> = (0..7)
        .map(|_| {
            let hits = hits.clone();
            channel.subscribe(move |_| hits.set(hits.get() + 1))
        })
        .collect();
    channel.emit(1);
    assert_eq!(hits.get(), 7);
    drop(subs);
    channel.emit(2);
    assert_eq!(hits.get(), 7);
    assert_eq!(channel.subscriber_count(), 0);
}

#[test]
fn dropped_listener_is_never_marked() {
    let channel = UpdateChannel::new();
    let flag = RefreshFlag::new();
    let sub = flag.listen(&channel);
    drop(sub);
    channel.emit(DataChanged);
    assert!(!flag.is_dirty());
}

#[test]
fn booking_marks_every_live_listener_and_totals_follow() {
    let backend = Rc::new(MemoryBackend::new(Seed::demo().unwrap()));
    let mut ctx = AppContext::new(backend.clone(), Rc::new(MemoryStorage::new()));
    ctx.login("demo@hotel.test", "demo").unwrap();
    let deps = ctx.deps().clone();

    let dashboard = RefreshFlag::new();
    let rooms = RefreshFlag::new();
    let _dash_sub = dashboard.listen(&deps.channel);
    let _rooms_sub = rooms.listen(&deps.channel);

    let cart = deps.cart().unwrap();
    let before = DashboardSummary::load(backend.as_ref(), &cart).unwrap();

    let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
    let draft = ReservationDraft {
        room_id: Some(1),
        check_in: "2026-12-01".into(),
        check_out: "2026-12-04".into(),
    };
    deps.desk().create(1, &draft, today).unwrap();
    assert!(dashboard.take());
    assert!(rooms.take());
    assert!(!dashboard.is_dirty());

    let service = backend.services().unwrap().remove(0);
    let price = service.price;
    cart.add(service).unwrap();
    assert!(dashboard.take());

    let after = DashboardSummary::load(backend.as_ref(), &cart).unwrap();
    assert_eq!(after.stays.len(), before.stays.len() + 1);
    assert_eq!(after.services.len(), 1);
    assert!(after.total >= before.total + price);
}
