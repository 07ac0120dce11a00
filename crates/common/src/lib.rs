//! Common functionality for the floating ad overlay.
//!
//! This crate turns a stored ad settings record into a dismissible,
//! fixed-position overlay for a single page request. The pipeline runs
//! settings sanitizing, device classification, the display gate, content
//! generation and overlay assembly, in that order.
//!
//! # Modules
//!
//! - [`ad_settings`]: The ad settings record and its sanitizer
//! - [`assembler`]: Wraps content into the positioned, dismissible overlay
//! - [`assets`]: Lottie player loading policy
//! - [`config_store`]: Storage for the ad settings record
//! - [`constants`]: Element IDs, cookie names and dimension limits
//! - [`content`]: Content fragments for each ad type
//! - [`device`]: User-agent based device classification
//! - [`dismissal`]: The client-side dismissal cookie
//! - [`error`]: Error types and error handling utilities
//! - [`filters`]: URL and HTML filtering
//! - [`gate`]: The display decision
//! - [`render`]: Per-request rendering and page injection
//! - [`settings`]: Service configuration and validation
//! - [`templates`]: Handlebars template handling
//! - [`test_support`]: Testing utilities

pub mod ad_settings;
pub mod assembler;
pub mod assets;
pub mod config_store;
pub mod constants;
pub mod content;
pub mod device;
pub mod dismissal;
pub mod error;
pub mod filters;
pub mod gate;
pub mod http_wrapper;
pub mod logging;
pub mod render;
pub mod settings;
pub mod templates;
