//! Host-side transform operations for wavelet denoising
//!
//! This crate implements the normalized Haar transform (the reference form every
//! device program must reproduce), the level schedules that split a transform
//! across bounded-capacity dispatches, tiled matrix transpose, coefficient
//! thresholding, and buffer comparison helpers.

pub mod compare;
pub mod haar;
pub mod schedule;
pub mod threshold;
pub mod transpose;

pub use compare::*;
pub use haar::*;
pub use schedule::*;
pub use threshold::*;
pub use transpose::*;
