//! Core of the camlabel photo annotator: photo catalog, label schema,
//! scanner, annotation store, sliding-window cursor and the controller
//! tying them together. The terminal front end lives in the binary.

pub mod annotations;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod cursor;
pub mod error;
pub mod logging;
pub mod scanner;
pub mod schema;
pub mod session;
