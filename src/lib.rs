//! # lsb_planes 库
//!
//! 本库包含位平面隐写工具的核心逻辑：单平面与多平面两种编解码变体，
//! 以及命令行工具所需的图像 I/O 与报告逻辑。

// 声明库包含的所有模块。

pub mod cli;
pub mod constants;
pub mod error;
pub mod handler;
pub mod pixel;
pub mod sniff;
pub mod steganography;

pub use error::StegError;
pub use pixel::PixelBuffer;
pub use steganography::{CapacityReport, Decoded, Variant, capacity, decode, encode, probe};
