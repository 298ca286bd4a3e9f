pub mod errors;
pub mod db;
pub mod validate;
pub mod catalog;
pub mod staff;
pub mod staff_service;
pub mod client;
pub mod booking;
pub mod business_hours;
pub mod staff_schedule;
pub mod closure;
pub mod staff_leave;
pub mod session;
pub mod session_enrollment;
pub mod class_package;
pub mod intake_profile;
pub mod intake_disclaimer;

#[cfg(test)]
mod tests;
