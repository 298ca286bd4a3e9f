//! Slot availability: pure rules (`engine`) over a per-day snapshot read
//! through a repository (`repository`, `seaorm`), wrapped by `AvailabilityService`.

pub mod domain;
pub mod engine;
pub mod repository;
pub mod seaorm;
pub mod service;

pub use domain::{BlockReason, DaySnapshot, Slot, SlotRules};
pub use seaorm::SeaOrmAvailabilityRepository;
pub use service::AvailabilityService;
