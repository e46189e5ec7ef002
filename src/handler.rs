//! # 命令处理逻辑模块
//!
//! 包含处理各子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、图像容器的解码与编码、调用核心隐写算法以及向用户报告结果。

use crate::cli::{CapacityArgs, CheckArgs, HideArgs, ImageOutput, RecoverArgs};
use crate::pixel::PixelBuffer;
use crate::sniff::PayloadKind;
use crate::steganography::{self, CapacityReport, Decoded, Probe, Variant};
use anyhow::{Context, Result};
use colored::Colorize;
use image::DynamicImage;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// 读取并解码载体图像。
fn load_carrier(path: &Path) -> Result<PixelBuffer> {
    let image = image::open(path).with_context(|| {
        format!(
            "Unable to read image file: {}",
            path.to_string_lossy().red().bold()
        )
    })?;

    PixelBuffer::from_image(image).with_context(|| {
        format!(
            "Unsupported pixel layout in: {}",
            path.to_string_lossy().red().bold()
        )
    })
}

/// 目标文件已存在且未指定 `--force` 时拒绝继续。
fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

/// 在 `image` 旁边生成 `<prefix><stem>.<extension>` 形式的路径。
fn sibling_path(image: &Path, prefix: &str, extension: &str) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    image.with_file_name(format!("{prefix}{stem}.{extension}"))
}

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取载体图像和载荷文件、检查隐写空间是否足够、调用编解码器写入载荷，
/// 最后以无损格式保存结果图像。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径与变体的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像或载荷文件。
/// * 输出文件已存在且未指定 `--force`。
/// * 图像没有足够的空间来隐藏载荷。
/// * 编解码器在执行过程中失败。
/// * 无法写入到目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let dest = args
        .dest
        .clone()
        .unwrap_or_else(|| sibling_path(&args.image, "doctored_", "png"));
    ensure_writable(&dest, args.force)?;

    let carrier = load_carrier(&args.image)?;

    let payload = fs::read(&args.payload).with_context(|| {
        format!(
            "Unable to read payload file: {}",
            args.payload.to_string_lossy().red().bold()
        )
    })?;

    let available_space = steganography::capacity(
        carrier.width(),
        carrier.height(),
        carrier.channels(),
        args.variant,
    );
    let required_space = payload.len() as u64;

    anyhow::ensure!(
        available_space >= required_space,
        "Not enough space in the image to hide the payload. \nRequired: {} bytes, Available: {} bytes ({} variant)",
        required_space.to_string().red().bold(),
        available_space.to_string().green().bold(),
        args.variant
    );

    info!(
        "Hiding {} bytes in a {}x{}x{} carrier using the {} variant.",
        payload.len(),
        carrier.width(),
        carrier.height(),
        carrier.channels(),
        args.variant
    );

    let doctored = steganography::encode(carrier, &payload, args.variant).with_context(|| {
        "Failed to hide the payload in the image. \nThe image might not have enough capacity."
    })?;

    doctored
        .into_image()
        .context("Failed to rebuild the image from the modified pixels.")?
        .save(&dest)
        .with_context(|| {
            format!(
                "Unable to write to target image file: {}",
                dest.to_string_lossy().red().bold()
            )
        })?;

    println!(
        "The payload has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像、调用编解码器提取载荷，
/// 按内容推断类型并把载荷写入目标文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径与变体的 `RecoverArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像文件。
/// * 图像中没有隐藏数据。
/// * 输出文件已存在且未指定 `--force`。
/// * 无法写入到目标文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let carrier = load_carrier(&args.image)?;

    let decoded = steganography::decode(&carrier, args.variant).with_context(|| {
        format!(
            "Failed to recover the payload from '{}'. \nThe image may be corrupted.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let payload = match decoded {
        Decoded::Payload(bytes) => bytes,
        Decoded::Empty => anyhow::bail!(
            "No hidden data found in image: {} ({} variant)",
            args.image.to_string_lossy().red().bold(),
            args.variant
        ),
    };

    if let Some(format) = args.as_image {
        return save_payload_image(&args, &payload, format);
    }

    let kind = PayloadKind::detect(&payload);
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| sibling_path(&args.image, "recovered_", kind.extension()));
    ensure_writable(&output, args.force)?;

    fs::write(&output, &payload).with_context(|| {
        format!(
            "Unable to write to target file: {}",
            output.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The payload ({} bytes, {}) has been successfully recovered and saved: {}",
        payload.len().to_string().green(),
        kind.mime_type(),
        output.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 把恢复出的载荷当作图像解码，并以 `format` 重新保存。
fn save_payload_image(args: &RecoverArgs, payload: &[u8], format: ImageOutput) -> Result<()> {
    let hidden = image::load_from_memory(payload).with_context(|| {
        format!(
            "Hidden data found in '{}' but could not be decoded as an image. \nThe hidden data might not be an image or may be corrupted.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| sibling_path(&args.image, "recovered_", format.extension()));
    ensure_writable(&output, args.force)?;

    // 部分无损编码器只接受 8 位 RGB/RGBA。
    let hidden = if hidden.color().has_alpha() {
        DynamicImage::ImageRgba8(hidden.into_rgba8())
    } else {
        DynamicImage::ImageRgb8(hidden.into_rgb8())
    };

    hidden
        .save_with_format(&output, format.format())
        .with_context(|| {
            format!(
                "Unable to write the recovered image: {}",
                output.to_string_lossy().red().bold()
            )
        })?;

    println!(
        "The hidden image ({}x{}) has been successfully recovered and saved: {}",
        hidden.width(),
        hidden.height(),
        output.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Capacity' 命令：报告两种变体下的可用载荷字节数。
///
/// 指定了载荷文件时，还会报告能否放下、占用比例以及缺少的字节数。
/// 返回每个变体的 [`CapacityReport`]。
pub fn handle_capacity(args: CapacityArgs) -> Result<Vec<CapacityReport>> {
    let carrier = load_carrier(&args.image)?;

    let payload_len = args
        .payload
        .as_ref()
        .map(|path| {
            fs::metadata(path).map(|meta| meta.len()).with_context(|| {
                format!(
                    "Unable to read payload file: {}",
                    path.to_string_lossy().red().bold()
                )
            })
        })
        .transpose()?;

    println!(
        "Image: {} ({}x{}, {} channels)",
        args.image.to_string_lossy().bold(),
        carrier.width(),
        carrier.height(),
        carrier.channels()
    );
    if let Some(len) = payload_len {
        println!("Payload: {} bytes ({:.2} KB)", len, len as f64 / 1024.0);
    }

    let reports: Vec<CapacityReport> = [Variant::PlaneZero, Variant::MultiPlane]
        .into_iter()
        .map(|variant| {
            CapacityReport::new(
                carrier.width(),
                carrier.height(),
                carrier.channels(),
                variant,
                payload_len,
            )
        })
        .collect();

    for report in &reports {
        println!(
            "  {:<12} {} bytes ({:.2} KB)",
            report.variant.to_string(),
            report.capacity.to_string().green().bold(),
            report.capacity as f64 / 1024.0
        );

        if report.payload_len.is_none() {
            continue;
        }
        if report.fits() {
            println!(
                "               fits: {:.2}% used, {} bytes left",
                report.usage_percent(),
                report.bytes_available().to_string().green()
            );
        } else {
            println!(
                "               {}: need {} more bytes of capacity",
                "does not fit".red().bold(),
                report.shortfall().to_string().red().bold()
            );
        }
    }

    Ok(reports)
}

/// 处理 'Check' 命令：只读取长度字段，判断图像是否像是藏有数据。
pub fn handle_check(args: CheckArgs) -> Result<Probe> {
    let carrier = load_carrier(&args.image)?;
    let probe = steganography::probe(&carrier, args.variant);

    if probe.has_hidden_data() {
        println!(
            "Hidden data found ({} variant): {} bytes of {} available.",
            args.variant,
            probe.declared_len.unwrap_or_default().to_string().green().bold(),
            probe.capacity
        );
    } else {
        println!(
            "No hidden data found ({} variant). Capacity: {} bytes.",
            args.variant,
            probe.capacity.to_string().yellow().bold()
        );
    }

    Ok(probe)
}
