//! 多平面编解码器。
//!
//! 每个通道字节每次只承载一个位；整幅图像的所有通道字节在当前位平面都用过一次后，
//! 游标才切换到更高的位平面。因此容量是单平面的 8 倍，但写入高位平面的位会带来更大的失真。

use super::Decoded;
use super::bits::{bits_to_value, byte_bits, length_bits};
use super::cursor::Cursor;
use crate::constants::{BITS_PER_BYTE, LENGTH_FIELD_BITS};
use crate::error::StegError;
use crate::pixel::PixelBuffer;
use log::debug;

/// 逐位写入器，独占一个可变缓冲区。
pub struct PlaneWriter<'a> {
    buffer: &'a mut PixelBuffer,
    cursor: Cursor,
}

impl<'a> PlaneWriter<'a> {
    pub fn new(buffer: &'a mut PixelBuffer) -> Self {
        let cursor = Cursor::new(buffer.height(), buffer.width(), buffer.channels());
        Self { buffer, cursor }
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// 依次写入每个位，每写一位游标前进一格。
    ///
    /// # Errors
    ///
    /// 游标在写完之前进入终止状态时返回 [`StegError::CapacityExhausted`]，
    /// 已写入的位不会回滚。
    pub fn put_bits(&mut self, bits: &[u8]) -> Result<(), StegError> {
        for &bit in bits {
            let slot = self.cursor.slot()?;
            let byte = self.buffer.get_mut(slot.row, slot.col, slot.channel);
            *byte = if bit != 0 {
                *byte | self.cursor.mask_one()
            } else {
                *byte & self.cursor.mask_zero()
            };
            self.cursor.advance()?;
        }
        Ok(())
    }
}

/// 逐位读取器，只读借用缓冲区，自带独立的游标。
pub struct PlaneReader<'a> {
    buffer: &'a PixelBuffer,
    cursor: Cursor,
}

impl<'a> PlaneReader<'a> {
    pub fn new(buffer: &'a PixelBuffer) -> Self {
        let cursor = Cursor::new(buffer.height(), buffer.width(), buffer.channels());
        Self { buffer, cursor }
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn read_bit(&mut self) -> Result<u8, StegError> {
        let slot = self.cursor.slot()?;
        let value = self.buffer.get(slot.row, slot.col, slot.channel) & self.cursor.mask_one();
        self.cursor.advance()?;
        Ok(u8::from(value != 0))
    }

    /// 读取 `n` 位，高位在前拼成整数。`n` 超过 64 时只保留最后 64 位。
    pub fn read_bits(&mut self, n: u32) -> Result<u64, StegError> {
        let bits = (0..n)
            .map(|_| self.read_bit())
            .collect::<Result<Vec<u8>, StegError>>()?;
        Ok(bits_to_value(bits))
    }

    pub fn read_byte(&mut self) -> Result<u8, StegError> {
        Ok(self.read_bits(BITS_PER_BYTE)? as u8)
    }
}

#[derive(Debug)]
pub struct MultiPlaneCodec {
    buffer: PixelBuffer,
}

impl MultiPlaneCodec {
    pub fn new(buffer: PixelBuffer) -> Self {
        Self { buffer }
    }

    pub fn into_inner(self) -> PixelBuffer {
        self.buffer
    }

    /// 全部 8 个位平面的槽位总数。
    pub fn total_slots(&self) -> u64 {
        self.buffer.flat_len() as u64 * u64::from(BITS_PER_BYTE)
    }

    /// 写入长度字段和载荷，返回修改后的缓冲区。
    ///
    /// # Errors
    ///
    /// * 载荷字节数超过通道字节数时，写入前即返回 [`StegError::Capacity`]。
    ///   这只是粗略检查，精确的边界由游标负责。
    /// * 游标中途耗尽时返回 [`StegError::CapacityExhausted`]，缓冲区随之丢弃。
    pub fn encode(mut self, payload: &[u8]) -> Result<PixelBuffer, StegError> {
        let payload_bits = payload.len() as u64 * u64::from(BITS_PER_BYTE);
        if payload_bits > self.total_slots() {
            return Err(StegError::Capacity {
                required_bits: payload_bits + u64::from(LENGTH_FIELD_BITS),
                available_bits: self.total_slots(),
            });
        }

        debug!(
            "Embedding {} payload bytes across up to 8 bit-planes ({} slots).",
            payload.len(),
            self.total_slots()
        );

        let mut writer = PlaneWriter::new(&mut self.buffer);
        writer.put_bits(&length_bits(payload.len())?)?;
        for &byte in payload {
            writer.put_bits(&byte_bits(byte))?;
        }
        debug!(
            "Embedding finished on bit-plane {}.",
            writer.cursor().plane()
        );

        Ok(self.buffer)
    }

    /// 读取隐藏的载荷，见 [`extract`]。
    pub fn decode(&self) -> Result<Decoded, StegError> {
        extract(&self.buffer)
    }

    /// 长度字段的原始值。缓冲区不足 64 个槽位时返回错误。
    pub fn read_length(&self) -> Result<u64, StegError> {
        PlaneReader::new(&self.buffer).read_bits(LENGTH_FIELD_BITS)
    }
}

/// 只读地提取载荷。
///
/// 长度字段为 0，或超过读完长度字段后剩余槽位所能容纳的字节数时，
/// 视为没有隐藏数据。
pub fn extract(buffer: &PixelBuffer) -> Result<Decoded, StegError> {
    if (buffer.flat_len() as u64) * u64::from(BITS_PER_BYTE) < u64::from(LENGTH_FIELD_BITS) {
        return Ok(Decoded::Empty);
    }

    let mut reader = PlaneReader::new(buffer);
    let len = reader.read_bits(LENGTH_FIELD_BITS)?;
    let room = reader.cursor().remaining() / u64::from(BITS_PER_BYTE);

    if len == 0 || len > room {
        debug!(
            "Declared length {} is outside 1..={}; treating carrier as empty.",
            len, room
        );
        return Ok(Decoded::Empty);
    }

    let payload = (0..len)
        .map(|_| reader.read_byte())
        .collect::<Result<Vec<u8>, StegError>>()?;
    debug!("Recovered {} payload bytes.", payload.len());
    Ok(Decoded::Payload(payload))
}
