//! HSC Tutor - math and physics tutor backend with an admin-taught knowledge base.

pub mod ai;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod tutor;
pub mod web;
