pub mod accounts;
pub mod booking;
pub mod catalog;
pub mod chat;
pub mod payment;
pub mod receipt;
pub mod reviews;
