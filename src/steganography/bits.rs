//! 定宽位串与帧结构。
//!
//! 所有多位字段都按高位在前 (MSB-first) 的顺序展开，每个元素是 `0` 或 `1`。
//! 一帧由 64 位长度字段和随后的载荷位组成，两个编解码变体共用这一结构。

use crate::constants::{BITS_PER_BYTE, LENGTH_FIELD_BITS};
use crate::error::StegError;

/// 将 `value` 展开为 `width` 位的位串，左侧补零。
///
/// # Errors
///
/// `value` 的自然位宽超过 `width` 时返回 [`StegError::Format`]，不做截断。
pub fn fixed_width_bits(value: u64, width: u32) -> Result<Vec<u8>, StegError> {
    if width > u64::BITS || (width < u64::BITS && value >> width != 0) {
        return Err(StegError::Format {
            value: value as u128,
            width,
        });
    }

    Ok((0..width)
        .rev()
        .map(|shift| ((value >> shift) & 1) as u8)
        .collect())
}

/// 单个字节的 8 位位串。
pub fn byte_bits(byte: u8) -> [u8; 8] {
    let mut bits = [0u8; 8];
    for (i, bit) in bits.iter_mut().enumerate() {
        *bit = (byte >> (7 - i)) & 1;
    }
    bits
}

/// 载荷长度的 64 位位串。
pub fn length_bits(len: usize) -> Result<Vec<u8>, StegError> {
    let value = u64::try_from(len).map_err(|_| StegError::Format {
        value: len as u128,
        width: LENGTH_FIELD_BITS,
    })?;
    fixed_width_bits(value, LENGTH_FIELD_BITS)
}

/// 构造完整的帧位序列：长度字段在前，随后是每个载荷字节的位。
pub fn frame_bits(payload: &[u8]) -> Result<Vec<u8>, StegError> {
    let mut bits = length_bits(payload.len())?;
    bits.reserve(payload.len() * BITS_PER_BYTE as usize);
    bits.extend(payload.iter().flat_map(|&byte| byte_bits(byte)));
    Ok(bits)
}

/// 把高位在前的位序列拼成无符号整数。超过 64 位时只保留最后 64 位。
pub fn bits_to_value<I>(bits: I) -> u64
where
    I: IntoIterator<Item = u8>,
{
    bits.into_iter()
        .fold(0u64, |acc, bit| (acc << 1) | u64::from(bit & 1))
}

/// 每 8 位打包成一个字节，高位在前。不足 8 位的尾部被丢弃。
pub fn pack_bytes(bits: &[u8]) -> Vec<u8> {
    bits.chunks_exact(BITS_PER_BYTE as usize)
        .map(|chunk| bits_to_value(chunk.iter().copied()) as u8)
        .collect()
}
