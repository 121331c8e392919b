//! Reservation workflow: form validation and the writes that follow it.

use std::rc::Rc;

use chrono::NaiveDate;

use crate::backend::Backend;
use crate::broadcast::{DataChanged, UpdateChannel};
use crate::error::{DeskError, Result};
use crate::model::{NewReservation, Reservation, ReservationStatus};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw reservation form input, as typed by the guest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationDraft {
    pub room_id: Option<u64>,
    pub check_in: String,
    pub check_out: String,
}

impl ReservationDraft {
    pub fn for_room(room_id: u64) -> Self {
        Self {
            room_id: Some(room_id),
            ..Self::default()
        }
    }

    pub fn from_reservation(reservation: &Reservation) -> Self {
        Self {
            room_id: Some(reservation.room_id),
            check_in: reservation.check_in.format(DATE_FORMAT).to_string(),
            check_out: reservation.check_out.format(DATE_FORMAT).to_string(),
        }
    }

    /// Check the dates against `today` and return the parsed stay.
    pub fn validate(&self, today: NaiveDate) -> Result<(u64, NaiveDate, NaiveDate)> {
        let check_in = parse_date(&self.check_in, "check-in")?;
        let check_out = parse_date(&self.check_out, "check-out")?;
        if check_in < today {
            return Err(DeskError::invalid("check-in cannot be before today"));
        }
        if check_out <= check_in {
            return Err(DeskError::invalid("check-out must be after check-in"));
        }
        let room_id = self
            .room_id
            .filter(|id| *id != 0)
            .ok_or_else(|| DeskError::invalid("please pick a room"))?;
        Ok((room_id, check_in, check_out))
    }
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| DeskError::invalid(format!("{field} date must look like YYYY-MM-DD")))
}

/// Reservation writes. Each successful write broadcasts [`DataChanged`]
/// exactly once; failed writes broadcast nothing.
#[derive(Clone)]
pub struct ReservationDesk {
    backend: Rc<dyn Backend>,
    channel: UpdateChannel,
}

impl ReservationDesk {
    pub fn new(backend: Rc<dyn Backend>, channel: UpdateChannel) -> Self {
        Self { backend, channel }
    }

    pub fn create(
        &self,
        user_id: u64,
        draft: &ReservationDraft,
        today: NaiveDate,
    ) -> Result<Reservation> {
        let (room_id, check_in, check_out) = draft.validate(today)?;
        let created = self.backend.create_reservation(NewReservation {
            user_id,
            room_id,
            check_in,
            check_out,
            status: ReservationStatus::Pending,
        })?;
        self.channel.emit(DataChanged);
        Ok(created)
    }

    /// Replace room and dates of an existing reservation, keeping its status.
    pub fn update(
        &self,
        existing: &Reservation,
        draft: &ReservationDraft,
        today: NaiveDate,
    ) -> Result<Reservation> {
        let (room_id, check_in, check_out) = draft.validate(today)?;
        let updated = self.backend.update_reservation(
            existing.id,
            Reservation {
                room_id,
                check_in,
                check_out,
                ..existing.clone()
            },
        )?;
        self.channel.emit(DataChanged);
        Ok(updated)
    }

    pub fn cancel(&self, existing: &Reservation) -> Result<Reservation> {
        let cancelled = self.backend.update_reservation(
            existing.id,
            Reservation {
                status: ReservationStatus::Cancelled,
                ..existing.clone()
            },
        )?;
        self.channel.emit(DataChanged);
        Ok(cancelled)
    }

    pub fn delete(&self, id: u64) -> Result<()> {
        self.backend.delete_reservation(id)?;
        self.channel.emit(DataChanged);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryBackend, Seed};
    use std::cell::Cell;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn draft(room: u64, check_in: &str, check_out: &str) -> ReservationDraft {
        ReservationDraft {
            room_id: Some(room),
            check_in: check_in.into(),
            check_out: check_out.into(),
        }
    }

    fn desk() -> (ReservationDesk, Rc<Cell<usize>>, crate::broadcast::Subscription) {
        let backend: Rc<dyn Backend> = Rc::new(MemoryBackend::new(Seed::demo().unwrap()));
        let channel = UpdateChannel::new();
        let emits = Rc::new(Cell::new(0));
        let seen = Rc::clone(&emits);
        let sub = channel.subscribe(move |_| seen.set(seen.get() + 1));
        (ReservationDesk::new(backend, channel), emits, sub)
    }

    #[test]
    fn validation_rules() {
        let t = today();
        assert!(draft(1, "2026-10-16", "2026-10-17").validate(t).is_ok());
        let past = draft(1, "2026-10-15", "2026-10-17").validate(t).unwrap_err();
        assert_eq!(past.to_string(), "check-in cannot be before today");
        let same_day = draft(1, "2026-10-20", "2026-10-20").validate(t).unwrap_err();
        assert_eq!(same_day.to_string(), "check-out must be after check-in");
        let no_room = ReservationDraft {
            room_id: None,
            ..draft(0, "2026-10-20", "2026-10-21")
        };
        assert_eq!(no_room.validate(t).unwrap_err().to_string(), "please pick a room");
        assert!(draft(1, "20/10/2026", "2026-10-21").validate(t).is_err());
    }

    #[test]
    fn create_broadcasts_once() {
        let (desk, emits, _sub) = desk();
        let r = desk.create(1, &draft(5, "2026-11-01", "2026-11-03"), today()).unwrap();
        assert_eq!(r.status, ReservationStatus::Pending);
        assert_eq!(emits.get(), 1);
    }

    #[test]
    fn failed_write_does_not_broadcast() {
        let (desk, emits, _sub) = desk();
        assert!(desk.create(1, &draft(5, "2026-01-01", "2026-01-03"), today()).is_err());
        assert!(desk.delete(4040).is_err());
        assert_eq!(emits.get(), 0);
    }

    #[test]
    fn update_cancel_delete_each_broadcast() {
        let (desk, emits, _sub) = desk();
        let r = desk.create(1, &draft(1, "2026-11-01", "2026-11-03"), today()).unwrap();
        let moved = desk.update(&r, &draft(2, "2026-11-02", "2026-11-06"), today()).unwrap();
        assert_eq!((moved.id, moved.room_id, moved.nights()), (r.id, 2, 4));
        let cancelled = desk.cancel(&moved).unwrap();
        assert!(cancelled.is_cancelled());
        desk.delete(r.id).unwrap();
        assert_eq!(emits.get(), 4);
    }

    #[test]
    fn draft_from_reservation_round_trips_dates() {
        let (desk, _emits, _sub) = desk();
        let r = desk.create(1, &draft(1, "2026-11-01", "2026-11-03"), today()).unwrap();
        assert_eq!(ReservationDraft::from_reservation(&r), draft(1, "2026-11-01", "2026-11-03"));
    }
}
