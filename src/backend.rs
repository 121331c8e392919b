//! Booking backend.
//!
//! [`Backend`] is the boundary the panes talk to; it mirrors the REST
//! resources of the booking service (rooms, reservations, services, reviews,
//! users, contact messages). [`MemoryBackend`] is the mock implementation used
//! by the client: an in-memory store seeded from a JSON [`Seed`] document.

use std::cell::RefCell;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DeskError, Result};
use crate::model::{
    ContactMessage, MAX_RATING, MIN_RATING, NewReservation, NewReview, NewUser, Reservation,
    Review, Room, RoomStatus, Service, User, CLIENT_ROLE,
};

const DEMO_SEED: &str = include_str!("../assets/db.json");

pub trait Backend {
    fn rooms(&self) -> Result<Vec<Room>>;
    fn room(&self, id: u64) -> Result<Room>;

    /// Rooms that can currently be booked.
    fn available_rooms(&self) -> Result<Vec<Room>> {
        Ok(self
            .rooms()?
            .into_iter()
            .filter(|r| r.status == RoomStatus::Available)
            .collect())
    }

    fn reservations_for_user(&self, user_id: u64) -> Result<Vec<Reservation>>;
    fn create_reservation(&self, reservation: NewReservation) -> Result<Reservation>;
    fn update_reservation(&self, id: u64, reservation: Reservation) -> Result<Reservation>;
    fn delete_reservation(&self, id: u64) -> Result<()>;

    fn services(&self) -> Result<Vec<Service>>;

    fn reviews(&self) -> Result<Vec<Review>>;
    fn add_review(&self, review: NewReview) -> Result<Review>;

    fn users(&self) -> Result<Vec<User>>;
    fn register_user(&self, user: NewUser) -> Result<User>;

    fn send_contact(&self, message: ContactMessage) -> Result<ContactMessage>;
}

/// Full contents of the mock backend, as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub rooms: Vec<Room>,
    pub reservations: Vec<Reservation>,
    pub services: Vec<Service>,
    pub reviews: Vec<Review>,
    pub users: Vec<User>,
    pub contacts: Vec<ContactMessage>,
}

impl Seed {
    /// The demo data set shipped with the binary.
    pub fn demo() -> Result<Self> {
        Self::from_json(DEMO_SEED)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }
}

fn next_id<T>(items: &[T], id: impl Fn(&T) -> u64) -> u64 {
    items.iter().map(id).max().unwrap_or(0) + 1
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    data: RefCell<Seed>,
}

impl MemoryBackend {
    pub fn new(seed: Seed) -> Self {
        Self {
            data: RefCell::new(seed),
        }
    }

    pub fn snapshot(&self) -> Seed {
        self.data.borrow().clone()
    }
}

impl Backend for MemoryBackend {
    fn rooms(&self) -> Result<Vec<Room>> {
        Ok(self.data.borrow().rooms.clone())
    }

    fn room(&self, id: u64) -> Result<Room> {
        self.data
            .borrow()
            .rooms
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| DeskError::not_found("room", id))
    }

    fn reservations_for_user(&self, user_id: u64) -> Result<Vec<Reservation>> {
        Ok(self
            .data
            .borrow()
            .reservations
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    fn create_reservation(&self, reservation: NewReservation) -> Result<Reservation> {
        let mut data = self.data.borrow_mut();
        if !data.rooms.iter().any(|r| r.id == reservation.room_id) {
            return Err(DeskError::not_found("room", reservation.room_id));
        }
        let id = next_id(&data.reservations, |r| r.id);
        let created = reservation.with_id(id);
        data.reservations.push(created.clone());
        tracing::info!(id, room = created.room_id, "reservation created");
        Ok(created)
    }

    fn update_reservation(&self, id: u64, reservation: Reservation) -> Result<Reservation> {
        let mut data = self.data.borrow_mut();
        let slot = data
            .reservations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| DeskError::not_found("reservation", id))?;
        *slot = Reservation { id, ..reservation };
        tracing::info!(id, status = %slot.status, "reservation updated");
        Ok(slot.clone())
    }

    fn delete_reservation(&self, id: u64) -> Result<()> {
        let mut data = self.data.borrow_mut();
        let before = data.reservations.len();
        data.reservations.retain(|r| r.id != id);
        if data.reservations.len() == before {
            return Err(DeskError::not_found("reservation", id));
        }
        tracing::info!(id, "reservation deleted");
        Ok(())
    }

    fn services(&self) -> Result<Vec<Service>> {
        Ok(self.data.borrow().services.clone())
    }

    fn reviews(&self) -> Result<Vec<Review>> {
        Ok(self.data.borrow().reviews.clone())
    }

    fn add_review(&self, review: NewReview) -> Result<Review> {
        if !(MIN_RATING..=MAX_RATING).contains(&review.rating) {
            return Err(DeskError::invalid(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }
        if review.comment.trim().is_empty() {
            return Err(DeskError::invalid("a review needs a comment"));
        }
        let mut data = self.data.borrow_mut();
        let created = Review {
            id: next_id(&data.reviews, |r| r.id),
            user_id: review.user_id,
            comment: review.comment.trim().to_string(),
            rating: review.rating,
        };
        data.reviews.push(created.clone());
        tracing::info!(id = created.id, "review added");
        Ok(created)
    }

    fn users(&self) -> Result<Vec<User>> {
        Ok(self.data.borrow().users.clone())
    }

    fn register_user(&self, user: NewUser) -> Result<User> {
        let mut data = self.data.borrow_mut();
        if data
            .users
            .iter()
            .any(|u| u.name == user.name || u.email == user.email)
        {
            return Err(DeskError::Conflict(
                "that user name or email is already in use".to_string(),
            ));
        }
        let created = User {
            id: next_id(&data.users, |u| u.id),
            name: user.name,
            email: user.email,
            password: user.password,
            role: CLIENT_ROLE.to_string(),
        };
        data.users.push(created.clone());
        tracing::info!(id = created.id, "user registered");
        Ok(created)
    }

    fn send_contact(&self, message: ContactMessage) -> Result<ContactMessage> {
        if message.message.trim().is_empty() {
            return Err(DeskError::invalid("the message is empty"));
        }
        self.data.borrow_mut().contacts.push(message.clone());
        tracing::info!(from = %message.email, "contact message received");
        Ok(message)
    }
}
