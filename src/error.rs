//! # 错误类型模块
//!
//! 隐写编解码器的所有失败情形都汇集在 [`StegError`] 中。
//! 应用层 (`handler`) 再通过 `anyhow` 为其附加上下文。

use thiserror::Error;

/// 编解码过程中可能出现的错误。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StegError {
    /// 载体在写入开始前就被判定为空间不足。
    #[error("carrier image not big enough: {required_bits} bit slots required, {available_bits} available")]
    Capacity {
        required_bits: u64,
        available_bits: u64,
    },

    /// 多平面游标在写入或读取途中越过了最后一个位平面。
    #[error("no available slot remaining (every bit-plane of the image is filled)")]
    CapacityExhausted,

    /// 数值的自然位宽超过了固定字段宽度。
    #[error("value {value} does not fit in a {width}-bit field")]
    Format { value: u128, width: u32 },

    /// 像素数据长度与声明的尺寸不符，或某个维度为零。
    #[error("pixel data holds {actual} bytes, expected {expected} for {height}x{width}x{channels}")]
    Shape {
        height: usize,
        width: usize,
        channels: usize,
        expected: usize,
        actual: usize,
    },

    /// 通道数无法对应到任何可保存的图像格式。
    #[error("cannot build an image from a buffer with {0} channels")]
    UnsupportedChannels(usize),
}
