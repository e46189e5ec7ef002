//! 多平面游标。
//!
//! 游标在一个位平面内按 (通道, 列, 行) 的嵌套顺序单调前进，通道最快、行最慢；
//! 扫完整幅图像后回到原点并切换到下一个位平面。扫完平面 7 后进入终止状态，
//! 此后任何读写都会得到 [`StegError::CapacityExhausted`]。

use crate::constants::{LAST_PLANE, PLANE_MASKS};
use crate::error::StegError;
use log::trace;

/// 游标当前指向的通道字节。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub row: usize,
    pub col: usize,
    pub channel: usize,
    pub plane: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    height: usize,
    width: usize,
    channels: usize,
    row: usize,
    col: usize,
    channel: usize,
    plane: usize,
    exhausted: bool,
}

impl Cursor {
    /// 在给定尺寸上创建一个位于原点、平面 0 的游标。
    pub fn new(height: usize, width: usize, channels: usize) -> Self {
        Self {
            height,
            width,
            channels,
            row: 0,
            col: 0,
            channel: 0,
            plane: 0,
            exhausted: height == 0 || width == 0 || channels == 0,
        }
    }

    /// 回到原点和平面 0。
    pub fn reset(&mut self) {
        *self = Self::new(self.height, self.width, self.channels);
    }

    /// 当前槽位。
    ///
    /// # Errors
    ///
    /// 游标已处于终止状态时返回 [`StegError::CapacityExhausted`]。
    pub fn slot(&self) -> Result<Slot, StegError> {
        if self.exhausted {
            return Err(StegError::CapacityExhausted);
        }
        Ok(Slot {
            row: self.row,
            col: self.col,
            channel: self.channel,
            plane: self.plane,
        })
    }

    pub fn plane(&self) -> usize {
        self.plane
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// 置位掩码 (OR)。
    pub fn mask_one(&self) -> u8 {
        PLANE_MASKS[self.plane]
    }

    /// 清位掩码 (AND)，即 `!mask_one`。
    pub fn mask_zero(&self) -> u8 {
        !self.mask_one()
    }

    /// 前进一个槽位。
    ///
    /// # Errors
    ///
    /// 已处于终止状态时再次前进会返回 [`StegError::CapacityExhausted`]。
    pub fn advance(&mut self) -> Result<(), StegError> {
        if self.exhausted {
            return Err(StegError::CapacityExhausted);
        }

        if self.channel < self.channels - 1 {
            self.channel += 1;
            return Ok(());
        }
        self.channel = 0;

        if self.col < self.width - 1 {
            self.col += 1;
            return Ok(());
        }
        self.col = 0;

        if self.row < self.height - 1 {
            self.row += 1;
            return Ok(());
        }
        self.row = 0;

        if self.plane == LAST_PLANE {
            trace!("Cursor swept the last bit-plane; no slots remain.");
            self.exhausted = true;
        } else {
            self.plane += 1;
            trace!("Cursor moved to bit-plane {}.", self.plane);
        }
        Ok(())
    }

    /// 剩余可用的槽位数，包括当前槽位。
    pub fn remaining(&self) -> u64 {
        if self.exhausted {
            return 0;
        }
        let per_plane = (self.height * self.width * self.channels) as u64;
        let consumed_in_plane =
            ((self.row * self.width + self.col) * self.channels + self.channel) as u64;
        let planes_after = (LAST_PLANE - self.plane) as u64;
        planes_after * per_plane + (per_plane - consumed_in_plane)
    }
}
