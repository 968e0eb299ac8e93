pub mod domain;

pub use domain::booking::{
    Block, BlockId, Currency, Hotel, HotelError, HotelEvent, HotelId, Price, Reservation,
    ReservationId, RoomId,
};
