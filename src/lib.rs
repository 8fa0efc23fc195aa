//! Plain-text notes viewed through a live line filter.
//!
//! A [`document_model::Document`] keeps the full text and the list of regions
//! that match the current search; edits made against the filtered view are
//! applied to the full text.

pub mod config;
pub mod controller;
pub mod document_model;
pub mod instance;
pub mod view;
