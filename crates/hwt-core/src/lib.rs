//! Core types and utilities for Haar wavelet denoising
//!
//! This crate provides the fundamental data structures shared by the transform,
//! compute and engine crates: dimensions, threshold parameters, compute program
//! identifiers, decomposition level bookkeeping, and the error types.

pub mod consts;
pub mod error;
pub mod image;
pub mod levels;
pub mod types;

pub use error::{ComputeError, ComputeResult, HwtError, HwtResult};
pub use image::*;
pub use levels::*;
pub use types::*;
