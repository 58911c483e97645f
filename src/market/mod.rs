//! Marketplace domain: records, form rules and the derived views the
//! pages are built from

pub mod analytics;
pub mod catalog;
pub mod certificate;
pub mod forms;
pub mod image;
pub mod indicators;
pub mod model;
