//! Image and fixture I/O for the denoiser
//!
//! Images are 8-bit grayscale files in any format the `image` crate was built
//! with. Fixtures are plain-text float vectors used to pin transform output.

pub mod fixture;
pub mod gray;

pub use fixture::{read_fixture, read_fixture_file, write_fixture, write_fixture_file};
pub use gray::{load_gray8, load_gray8_converting, save_gray8};
