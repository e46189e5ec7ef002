//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use crate::steganography::Variant;
use clap::{ArgAction, Parser, ValueEnum};
use image::ImageFormat;
use std::path::PathBuf;

/// 一款基于位平面隐写术的命令行工具，用于在无损格式图像 (如 PNG, BMP) 中隐藏或恢复任意文件。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于位平面隐写术的命令行工具，用于在无损格式图像 (如 PNG, BMP) 中隐藏或恢复任意文件。\n\
                  plane0 变体只改动最低有效位；multi-plane 变体依次使用 8 个位平面，容量更大但失真更明显。"
)]
pub struct Cli {
    /// 提高日志详细程度 (-v, -vv, -vvv)。`RUST_LOG` 环境变量优先。
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 在无损格式图像中隐藏一个文件。
    Hide(HideArgs),

    /// 从经过隐写的图像中恢复隐藏的文件。
    Recover(RecoverArgs),

    /// 报告图像在两种变体下可容纳的载荷大小。
    Capacity(CapacityArgs),

    /// 检查图像是否像是藏有数据。
    Check(CheckArgs),
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct HideArgs {
    /// 用于隐写的输入图像文件路径 (如 PNG, BMP)。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的文件路径 (文本、图像、压缩包等)。
    #[arg(short, long)]
    pub payload: PathBuf,

    /// 结果图像的输出路径。缺省为输入图像旁的 `doctored_<name>.png`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 编解码变体。
    #[arg(long, value_enum, default_value_t = Variant::PlaneZero)]
    pub variant: Variant,

    /// 输出文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'recover' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct RecoverArgs {
    /// 已隐藏数据的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 恢复出的文件的保存路径。缺省为 `recovered_<name>.<ext>`，扩展名按内容推断。
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 编解码变体，必须与隐藏时使用的一致。
    #[arg(long, value_enum, default_value_t = Variant::PlaneZero)]
    pub variant: Variant,

    /// 把恢复出的载荷当作图像解码，并以指定的无损格式重新保存。
    #[arg(long, value_enum)]
    pub as_image: Option<ImageOutput>,

    /// 输出文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 恢复图像载荷时可选的无损输出格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImageOutput {
    Png,
    Bmp,
    Tiff,
    Webp,
    Qoi,
}

impl ImageOutput {
    pub fn format(self) -> ImageFormat {
        match self {
            ImageOutput::Png => ImageFormat::Png,
            ImageOutput::Bmp => ImageFormat::Bmp,
            ImageOutput::Tiff => ImageFormat::Tiff,
            ImageOutput::Webp => ImageFormat::WebP,
            ImageOutput::Qoi => ImageFormat::Qoi,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageOutput::Png => "png",
            ImageOutput::Bmp => "bmp",
            ImageOutput::Tiff => "tiff",
            ImageOutput::Webp => "webp",
            ImageOutput::Qoi => "qoi",
        }
    }
}

/// 'capacity' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct CapacityArgs {
    /// 载体图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 待隐藏的文件。指定后会报告能否放下、占用比例以及缺少的字节数。
    #[arg(short, long)]
    pub payload: Option<PathBuf>,
}

/// 'check' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// 待检查的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 编解码变体。
    #[arg(long, value_enum, default_value_t = Variant::PlaneZero)]
    pub variant: Variant,
}
