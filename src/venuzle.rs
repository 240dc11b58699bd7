//! Client for the AJAX timetable of a Venuzle booking site

pub mod api;
pub mod dto;
pub mod model;
