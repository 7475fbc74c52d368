pub mod booking;
pub mod desk;
pub mod room;
pub mod user;

pub use booking::{Booking, BookingCreate, BookingUpdate};
pub use desk::{Desk, DeskCreate, DeskUpdate};
pub use room::{Room, RoomCreate, RoomUpdate};
pub use user::{User, UserCreate, UserUpdate};
