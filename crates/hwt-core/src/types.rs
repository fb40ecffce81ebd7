//! Core types for wavelet denoising

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Image or matrix dimensions (row-major, `width` samples per row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Dimensions after swapping rows and columns
    pub fn transposed(&self) -> Self {
        Self::new(self.height, self.width)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Coefficient shrinkage rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ThresholdMode {
    /// Keep coefficients whose magnitude exceeds the cutoff, zero the rest
    Hard,
    /// Shrink every coefficient towards zero by the cutoff
    #[default]
    Soft,
}

impl ThresholdMode {
    pub fn from_soft_flag(soft: bool) -> Self {
        if soft {
            ThresholdMode::Soft
        } else {
            ThresholdMode::Hard
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ThresholdMode::Hard => "hard",
            ThresholdMode::Soft => "soft",
        }
    }
}

/// Threshold cutoff plus the shrinkage rule, supplied per denoise call
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThresholdParams {
    pub cutoff: f32,
    pub mode: ThresholdMode,
}

impl ThresholdParams {
    pub fn new(cutoff: f32, mode: ThresholdMode) -> Self {
        Self { cutoff, mode }
    }

    pub fn hard(cutoff: f32) -> Self {
        Self::new(cutoff, ThresholdMode::Hard)
    }

    pub fn soft(cutoff: f32) -> Self {
        Self::new(cutoff, ThresholdMode::Soft)
    }

    /// Program that applies this rule on a compute backend
    pub fn program(&self) -> Program {
        match self.mode {
            ThresholdMode::Hard => Program::HardThreshold,
            ThresholdMode::Soft => Program::SoftThreshold,
        }
    }
}

/// The compute programs a backend must provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Program {
    /// Several forward Haar levels inside one synchronized group
    ForwardStep,
    /// Several inverse Haar levels inside one synchronized group
    InverseStep,
    /// Tiled matrix transpose
    Transpose,
    /// Elementwise hard threshold
    HardThreshold,
    /// Elementwise soft threshold
    SoftThreshold,
}

impl Program {
    pub const ALL: [Program; 5] = [
        Program::ForwardStep,
        Program::InverseStep,
        Program::Transpose,
        Program::HardThreshold,
        Program::SoftThreshold,
    ];

    /// Kernel entry point name
    pub fn name(&self) -> &'static str {
        match self {
            Program::ForwardStep => "fwt_step",
            Program::InverseStep => "iwt_step",
            Program::Transpose => "mat_transpose",
            Program::HardThreshold => "mat_hard_threshold",
            Program::SoftThreshold => "mat_soft_threshold",
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
