//! Parkchase Engine - headless driver for the Parkchase simulation.
//!
//! This crate provides configuration loading, scene descriptions, fixed
//! timestep pacing and the scripted run loop used by the `parkchase` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod app;
pub mod config;
pub mod scene;
pub mod timing;
