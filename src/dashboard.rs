use crate::backend::Backend;
use crate::error::Result;
use crate::model::{Reservation, Room, Service};
use crate::storage::ServiceCart;

/// A reservation together with its room, when the room could be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookedStay {
    pub reservation: Reservation,
    pub room: Option<Room>,
}

/// Everything the guest summary shows, loaded in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    pub stays: Vec<BookedStay>,
    pub services: Vec<Service>,
    pub total: u64,
}

impl DashboardSummary {
    /// Load the active (non-cancelled) reservations of the cart's user, the
    /// services in the cart, and the grand total. Each reservation counts the
    /// room price once; a room that cannot be fetched contributes nothing.
    pub fn load(backend: &dyn Backend, cart: &ServiceCart) -> Result<Self> {
        let user_id = cart.user_id();
        let mut stays = Vec::new();
        let mut rooms_total = 0;
        for reservation in backend
            .reservations_for_user(user_id)?
            .into_iter()
            .filter(|r| !r.is_cancelled())
        {
            let room = match backend.room(reservation.room_id) {
                Ok(room) => {
                    rooms_total += room.price;
                    Some(room)
                }
                Err(err) => {
                    tracing::warn!(
                        reservation = reservation.id,
                        room = reservation.room_id,
                        %err,
                        "room details unavailable"
                    );
                    None
                }
            };
            stays.push(BookedStay { reservation, room });
        }
        let services = cart.selected()?;
        let services_total: u64 = services.iter().map(|s| s.price).sum();
        Ok(Self {
            stays,
            services,
            total: rooms_total + services_total,
        })
    }
}
