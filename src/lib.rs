//! Scrapes venue availability from the Stadt Linz Venuzle booking site and
//! publishes it as a static JSON calendar.

pub mod calendar;
pub mod config;
pub mod output;
pub mod runner;
pub mod tracing;
pub mod venuzle;
