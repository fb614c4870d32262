//! vrp-instance
//!
//! Compiles warehouse records (windows, loads, pairwise travel data) into a
//! solver-ready routing model over virtual visits, hands the model to an
//! external route-search engine, and explains the visits a plan leaves out.

pub mod error;
pub mod records;
pub mod windows;
pub mod visits;
pub mod matrix;
pub mod instance;
pub mod traits;
pub mod model;
pub mod assignment;
pub mod diagnose;
pub mod report;
pub mod osrm;
pub mod haversine;

pub use error::{Error, Result};
