//! Request gates shared by the intake routes

pub mod auth;
