//! Trip summary server.
//!
//! Answers "how do I get from here to there?" by running a round of
//! concurrent journey plan searches against an OpenTripPlanner
//! backend, one per travel mode variant, and merging the results into
//! a single pageable summary with live vehicle tracking.

pub mod analytics;
pub mod cache;
pub mod config;
pub mod domain;
pub mod otp;
pub mod params;
pub mod realtime;
pub mod summary;
pub mod weather;
pub mod web;
