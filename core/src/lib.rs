//! Core of the bouldering tracker client.
//!
//! Holds the domain model, the location proximity ranker, the grip
//! annotation editor, camera acquisition over a platform trait, and the
//! data-gateway contract with the view-state containers built on it.

pub mod camera;
pub mod gateway;
pub mod grips;
pub mod interface;
pub mod math;
pub mod model;
pub mod prelude;
pub mod proximity;
pub mod telemetry;
pub mod view;

pub use gateway::{DataGateway, Session, SessionStore};
pub use prelude::{Coordinate, GatewayError, GatewayResult};
