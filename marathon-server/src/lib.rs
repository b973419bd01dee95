//! Movie marathon planner server.
//!
//! A web application that answers: "Given these movies and the theaters
//! near me, how do I see as many of them as possible in one day?"

pub mod cache;
pub mod calendar;
pub mod catalog;
pub mod domain;
pub mod drive;
pub mod explorer;
pub mod planner;
pub mod theaters;
pub mod web;
