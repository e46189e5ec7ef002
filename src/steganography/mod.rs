//! # 隐写核心模块
//!
//! 对外只暴露四个操作：[`capacity`]、[`encode`]、[`decode`] 和 [`probe`]，
//! 外加基于 [`capacity`] 的 [`CapacityReport`]。
//! 两个变体共享 64 位长度前缀的帧结构，但位平面的使用方式完全不同，
//! 用一个变体写入的缓冲区不能用另一个变体读取。

pub mod bits;
pub mod cursor;
pub mod multi_plane;
pub mod plane_zero;

pub use multi_plane::MultiPlaneCodec;
pub use plane_zero::PlaneZeroCodec;

use crate::constants::{BITS_PER_BYTE, LENGTH_FIELD_BITS, LENGTH_FIELD_BYTES};
use crate::error::StegError;
use crate::pixel::PixelBuffer;
use std::fmt;

/// 编解码变体。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Variant {
    /// 只使用最低有效位 (位平面 0)。
    #[default]
    #[value(name = "plane0")]
    PlaneZero,
    /// 依次使用位平面 0 到 7。
    MultiPlane,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::PlaneZero => write!(f, "plane0"),
            Variant::MultiPlane => write!(f, "multi-plane"),
        }
    }
}

/// 解码结果：要么是隐藏的载荷，要么表示载体中没有隐藏数据。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Payload(Vec<u8>),
    Empty,
}

impl Decoded {
    pub fn is_empty(&self) -> bool {
        match self {
            Decoded::Payload(bytes) => bytes.is_empty(),
            Decoded::Empty => true,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Decoded::Payload(bytes) => bytes,
            Decoded::Empty => &[],
        }
    }

    /// 取出载荷字节，[`Decoded::Empty`] 变为空向量。
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Decoded::Payload(bytes) => bytes,
            Decoded::Empty => Vec::new(),
        }
    }
}

/// 仅读取长度字段得到的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    /// 长度字段的原始值；缓冲区连长度字段都放不下时为 `None`。
    pub declared_len: Option<u64>,
    /// 该变体下可容纳的最大载荷字节数。
    pub capacity: u64,
}

impl Probe {
    /// 长度字段是否落在 `1..=capacity` 内。
    pub fn has_hidden_data(&self) -> bool {
        self.declared_len
            .is_some_and(|len| len > 0 && len <= self.capacity)
    }
}

/// 载体对某个待隐藏载荷的容量分析。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityReport {
    pub variant: Variant,
    /// 该变体下可容纳的最大载荷字节数。
    pub capacity: u64,
    /// 待隐藏载荷的字节数；只查询容量时为 `None`。
    pub payload_len: Option<u64>,
}

impl CapacityReport {
    pub fn new(
        width: usize,
        height: usize,
        channels: usize,
        variant: Variant,
        payload_len: Option<u64>,
    ) -> Self {
        Self {
            variant,
            capacity: capacity(width, height, channels, variant),
            payload_len,
        }
    }

    /// 载荷能否放进载体。未指定载荷时为 `true`。
    pub fn fits(&self) -> bool {
        self.payload_len.is_none_or(|len| len <= self.capacity)
    }

    /// 隐藏载荷后仍然空闲的字节数；放不下时为 0。
    pub fn bytes_available(&self) -> u64 {
        self.capacity
            .saturating_sub(self.payload_len.unwrap_or_default())
    }

    /// 还差多少字节才能放下载荷。
    pub fn shortfall(&self) -> u64 {
        self.payload_len
            .unwrap_or_default()
            .saturating_sub(self.capacity)
    }

    /// 载荷占容量的百分比。容量为 0 时为 0。
    pub fn usage_percent(&self) -> f64 {
        match self.payload_len {
            Some(len) if self.capacity > 0 => len as f64 / self.capacity as f64 * 100.0,
            _ => 0.0,
        }
    }
}

/// 在 `width x height x channels` 的载体上，给定变体可容纳的载荷字节数。
///
/// 纯算术，不需要缓冲区。结果为负时取 0。
///
/// * 单平面：`floor(w * h * c / 8) - 8`
/// * 多平面：`(w * h * c * 8 - 64) / 8`，即 `w * h * c - 8`
pub fn capacity(width: usize, height: usize, channels: usize, variant: Variant) -> u64 {
    let flat_len = (width as u64)
        .saturating_mul(height as u64)
        .saturating_mul(channels as u64);

    match variant {
        Variant::PlaneZero => {
            (flat_len / u64::from(BITS_PER_BYTE)).saturating_sub(LENGTH_FIELD_BYTES)
        }
        Variant::MultiPlane => flat_len
            .saturating_mul(u64::from(BITS_PER_BYTE))
            .saturating_sub(u64::from(LENGTH_FIELD_BITS))
            / u64::from(BITS_PER_BYTE),
    }
}

/// 按变体把载荷写入缓冲区。
///
/// 缓冲区被消耗：成功时返回修改后的缓冲区；失败时部分写入的缓冲区被丢弃，
/// 调用方如需保留原始载体，应在调用前自行克隆。
pub fn encode(
    buffer: PixelBuffer,
    payload: &[u8],
    variant: Variant,
) -> Result<PixelBuffer, StegError> {
    match variant {
        Variant::PlaneZero => PlaneZeroCodec::new(buffer)?.encode(payload),
        Variant::MultiPlane => MultiPlaneCodec::new(buffer).encode(payload),
    }
}

/// 按变体读取隐藏的载荷，不修改缓冲区。
///
/// 没有隐藏数据时返回 [`Decoded::Empty`] 而不是错误。
pub fn decode(buffer: &PixelBuffer, variant: Variant) -> Result<Decoded, StegError> {
    match variant {
        Variant::PlaneZero => {
            match u64::try_from(plane_zero::max_payload_bytes(buffer.flat_len() as u64)) {
                Ok(max_payload_bytes) => Ok(plane_zero::extract(buffer, max_payload_bytes)),
                Err(_) => Ok(Decoded::Empty),
            }
        }
        Variant::MultiPlane => multi_plane::extract(buffer),
    }
}

/// 只读取长度字段，报告载体是否像是藏有数据。
pub fn probe(buffer: &PixelBuffer, variant: Variant) -> Probe {
    let capacity = capacity(buffer.width(), buffer.height(), buffer.channels(), variant);

    let declared_len = match variant {
        Variant::PlaneZero => (plane_zero::max_payload_bytes(buffer.flat_len() as u64) >= 0)
            .then(|| plane_zero::read_length(buffer)),
        Variant::MultiPlane => multi_plane::PlaneReader::new(buffer)
            .read_bits(LENGTH_FIELD_BITS)
            .ok(),
    };

    Probe {
        declared_len,
        capacity,
    }
}
