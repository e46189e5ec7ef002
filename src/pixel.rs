//! # 像素缓冲区模块
//!
//! [`PixelBuffer`] 是编解码器操作的对象：按 `[row][col][channel]` 排列的 8 位数据，
//! 高、宽、通道数在构造时固定。与 `image` crate 之间的转换也放在这里，
//! 编解码器本身从不接触图像文件格式。

use crate::error::StegError;
use image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};
use log::warn;

/// 一个三维像素缓冲区，内部以行优先的扁平数组存储。
///
/// 扁平偏移为 `(row * width + col) * channels + channel`，
/// 因此通道变化最快，行变化最慢，与多平面游标的遍历顺序一致。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    height: usize,
    width: usize,
    channels: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// 用现有数据构造缓冲区。
    ///
    /// # Errors
    ///
    /// 任一维度为零，或 `data.len()` 不等于 `height * width * channels` 时，
    /// 返回 [`StegError::Shape`]。
    pub fn new(
        height: usize,
        width: usize,
        channels: usize,
        data: Vec<u8>,
    ) -> Result<Self, StegError> {
        let expected = height
            .checked_mul(width)
            .and_then(|n| n.checked_mul(channels))
            .unwrap_or(usize::MAX);

        if height == 0 || width == 0 || channels == 0 || data.len() != expected {
            return Err(StegError::Shape {
                height,
                width,
                channels,
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            height,
            width,
            channels,
            data,
        })
    }

    /// 构造一个全零的缓冲区。
    pub fn zeroed(height: usize, width: usize, channels: usize) -> Result<Self, StegError> {
        let len = height
            .checked_mul(width)
            .and_then(|n| n.checked_mul(channels))
            .unwrap_or(0);
        Self::new(height, width, channels, vec![0; len])
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// 通道字节总数，即 `height * width * channels`。
    pub fn flat_len(&self) -> usize {
        self.data.len()
    }

    pub fn as_flat(&self) -> &[u8] {
        &self.data
    }

    pub fn as_flat_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn offset(&self, row: usize, col: usize, channel: usize) -> usize {
        (row * self.width + col) * self.channels + channel
    }

    /// 读取 `[row][col][channel]` 处的通道字节。
    ///
    /// 坐标越界时 panic，与切片索引的约定相同。
    pub fn get(&self, row: usize, col: usize, channel: usize) -> u8 {
        self.data[self.offset(row, col, channel)]
    }

    pub fn get_mut(&mut self, row: usize, col: usize, channel: usize) -> &mut u8 {
        let offset = self.offset(row, col, channel);
        &mut self.data[offset]
    }

    /// 取出底层的扁平数据。
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// 从解码后的图像构造缓冲区。
    ///
    /// 带 Alpha 通道的图像变为 4 通道，其余变为 3 通道。
    /// 高位深图像会被降为 8 位。
    pub fn from_image(image: DynamicImage) -> Result<Self, StegError> {
        if image.color().bytes_per_pixel() > image.color().channel_count() {
            warn!(
                "Carrier uses {:?}; samples are reduced to 8 bits before embedding.",
                image.color()
            );
        }

        let (width, height) = (image.width() as usize, image.height() as usize);
        if image.color().has_alpha() {
            Self::new(height, width, 4, image.into_rgba8().into_raw())
        } else {
            Self::new(height, width, 3, image.into_rgb8().into_raw())
        }
    }

    /// 将缓冲区重新包装为图像，通道数决定颜色类型。
    pub fn into_image(self) -> Result<DynamicImage, StegError> {
        let Self {
            height,
            width,
            channels,
            data,
        } = self;
        let actual = data.len();
        let (w, h) = (width as u32, height as u32);

        let image = match channels {
            1 => GrayImage::from_raw(w, h, data).map(DynamicImage::ImageLuma8),
            2 => GrayAlphaImage::from_raw(w, h, data).map(DynamicImage::ImageLumaA8),
            3 => RgbImage::from_raw(w, h, data).map(DynamicImage::ImageRgb8),
            4 => RgbaImage::from_raw(w, h, data).map(DynamicImage::ImageRgba8),
            n => return Err(StegError::UnsupportedChannels(n)),
        };

        image.ok_or(StegError::Shape {
            height,
            width,
            channels,
            expected: height * width * channels,
            actual,
        })
    }
}
