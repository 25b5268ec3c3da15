//! Boards for Broadside.
//!
//! A match never touches ship placement or hit accounting itself. It talks
//! to a [`BoardService`], which owns one board per player and answers
//! queries and shots against it.
//!
//! # Key types
//!
//! - [`BoardService`]: the contract a match consumes
//! - [`BoardHandle`]: what `create` hands back, including the board's
//!   liveness so the match can notice if the board dies
//! - [`MemoryBoardService`]: in-process boards with random or fixed fleets
//! - [`BoardConfig`]: grid size, fleet, and placement strategy

mod config;
mod error;
mod memory;
mod service;

pub use config::{BoardConfig, Placement};
pub use error::BoardError;
pub use memory::MemoryBoardService;
pub use service::{BoardHandle, BoardService};
