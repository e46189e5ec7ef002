//! 单平面编解码器：每个通道字节的第 0 位承载一个载荷位。
//!
//! 缓冲区被视为扁平的通道字节序列，帧位依次写入偏移 `0..n`，其余字节不动。

use super::Decoded;
use super::bits::{bits_to_value, frame_bits, pack_bytes};
use crate::constants::{BITS_PER_BYTE, LENGTH_FIELD_BITS, LENGTH_FIELD_BYTES};
use crate::error::StegError;
use crate::pixel::PixelBuffer;
use log::debug;

/// 扁平长度为 `flat_len` 时可容纳的载荷字节数，即 `floor(flat_len / 8) - 8`。
/// 连长度字段都放不下时为负。
pub fn max_payload_bytes(flat_len: u64) -> i64 {
    (flat_len / u64::from(BITS_PER_BYTE)) as i64 - LENGTH_FIELD_BYTES as i64
}

#[derive(Debug)]
pub struct PlaneZeroCodec {
    buffer: PixelBuffer,
    max_payload_bytes: u64,
}

impl PlaneZeroCodec {
    /// 接管一个像素缓冲区。
    ///
    /// # Errors
    ///
    /// 缓冲区连 64 位长度字段都容纳不下时返回 [`StegError::Capacity`]。
    pub fn new(buffer: PixelBuffer) -> Result<Self, StegError> {
        let flat_len = buffer.flat_len() as u64;
        let max_payload_bytes =
            u64::try_from(max_payload_bytes(flat_len)).map_err(|_| StegError::Capacity {
                required_bits: u64::from(LENGTH_FIELD_BITS),
                available_bits: flat_len,
            })?;

        Ok(Self {
            buffer,
            max_payload_bytes,
        })
    }

    pub fn max_payload_bytes(&self) -> u64 {
        self.max_payload_bytes
    }

    /// 归还缓冲区。
    pub fn into_inner(self) -> PixelBuffer {
        self.buffer
    }

    /// 把载荷写入缓冲区的最低位，并返回修改后的缓冲区。
    ///
    /// # Errors
    ///
    /// * 需要的槽位 `64 + 8 * len` 超过通道字节数时返回 [`StegError::Capacity`]，
    ///   此时缓冲区尚未被修改。
    /// * 长度无法表示为 64 位时返回 [`StegError::Format`]。
    pub fn encode(mut self, payload: &[u8]) -> Result<PixelBuffer, StegError> {
        if payload.len() as u64 > self.max_payload_bytes {
            return Err(StegError::Capacity {
                required_bits: u64::from(LENGTH_FIELD_BITS)
                    + payload.len() as u64 * u64::from(BITS_PER_BYTE),
                available_bits: self.buffer.flat_len() as u64,
            });
        }

        let bits = frame_bits(payload)?;
        debug!(
            "Embedding {} payload bytes into bit-plane 0 ({} of {} channel bytes).",
            payload.len(),
            bits.len(),
            self.buffer.flat_len()
        );

        self.buffer
            .as_flat_mut()
            .iter_mut()
            .zip(bits)
            .for_each(|(byte, bit)| *byte = (*byte & 0xFE) | bit);

        Ok(self.buffer)
    }

    /// 读取隐藏的载荷。
    ///
    /// 长度为 0 或超过 [`max_payload_bytes`](Self::max_payload_bytes) 时视为没有隐藏数据。
    pub fn decode(&self) -> Decoded {
        extract(&self.buffer, self.max_payload_bytes)
    }

    /// 长度字段的原始值。
    pub fn read_length(&self) -> u64 {
        read_length(&self.buffer)
    }
}

/// 读取扁平偏移 `0..64` 的最低位，拼成长度字段。
///
/// 调用方需保证缓冲区至少有 64 个通道字节。
pub fn read_length(buffer: &PixelBuffer) -> u64 {
    bits_to_value(
        buffer.as_flat()[..LENGTH_FIELD_BITS as usize]
            .iter()
            .map(|byte| byte & 1),
    )
}

/// 只读地提取载荷，`max_payload_bytes` 为该缓冲区的容量上限。
pub fn extract(buffer: &PixelBuffer, max_payload_bytes: u64) -> Decoded {
    let len = read_length(buffer);
    if len == 0 || len > max_payload_bytes {
        debug!(
            "Declared length {} is outside 1..={}; treating carrier as empty.",
            len, max_payload_bytes
        );
        return Decoded::Empty;
    }

    let start = LENGTH_FIELD_BITS as usize;
    let end = start + len as usize * BITS_PER_BYTE as usize;
    let bits: Vec<u8> = buffer.as_flat()[start..end]
        .iter()
        .map(|byte| byte & 1)
        .collect();

    debug!("Recovered {} payload bytes from bit-plane 0.", len);
    Decoded::Payload(pack_bytes(&bits))
}
