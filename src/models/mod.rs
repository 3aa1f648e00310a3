pub mod user;
pub mod destination;
pub mod booking;
pub mod review;
pub mod payment;

pub use user::{NewUser, Permission, Role, User};
pub use destination::{Destination, RoomType};
pub use booking::{Booking, NewBooking};
pub use review::{NewReview, RatingSummary, Review};
pub use payment::{NewPayment, Payment, PaymentIntent};
