//! eventcard-server - registration API with generated social cards
//!
//! Visitors render and upload their card, then submit the registration with
//! the card's URL; a confirmation email follows. Organizers list, filter and
//! export registrations as CSV.

pub mod cards;
pub mod config;
pub mod csv;
pub mod email;
pub mod error;
pub mod routes;
pub mod state;
pub mod store;
pub mod upload;
