use lsb_planes::steganography::{MultiPlaneCodec, PlaneZeroCodec};
use lsb_planes::{Decoded, PixelBuffer, StegError, Variant, capacity, decode, encode, probe};
use rand::{Rng, RngCore};

/// 一个辅助函数，用于创建一个填满随机字节的缓冲区
fn random_buffer(height: usize, width: usize, channels: usize) -> PixelBuffer {
    let mut data = vec![0u8; height * width * channels];
    rand::rng().fill_bytes(&mut data);
    PixelBuffer::new(height, width, channels, data).expect("valid dimensions")
}

fn random_payload(len: usize) -> Vec<u8> {
    let mut payload = vec![0u8; len];
    rand::rng().fill_bytes(&mut payload);
    payload
}

/// 100x100 RGB 载体上用单平面变体隐藏 "Hello"
#[test]
fn test_plane_zero_hello_round_trip() -> anyhow::Result<()> {
    let buffer = random_buffer(100, 100, 3);
    let encoded = encode(buffer, b"Hello", Variant::PlaneZero)?;

    assert_eq!(decode(&encoded, Variant::PlaneZero)?, Decoded::Payload(b"Hello".to_vec()));
    Ok(())
}

/// 两种变体各自的随机往返
#[test]
fn test_round_trip_both_variants() -> anyhow::Result<()> {
    let mut rng = rand::rng();
    for variant in [Variant::PlaneZero, Variant::MultiPlane] {
        let limit = capacity(16, 12, 4, variant) as usize;
        for _ in 0..20 {
            let payload = random_payload(rng.random_range(1..=limit));
            let encoded = encode(random_buffer(12, 16, 4), &payload, variant)?;
            assert_eq!(decode(&encoded, variant)?.into_bytes(), payload, "{variant}");
        }
    }
    Ok(())
}

/// 单平面变体：恰好等于容量的载荷成功，多一个字节则报 Capacity
#[test]
fn test_plane_zero_capacity_boundary() -> anyhow::Result<()> {
    // 10x10x3 = 300 个通道字节，floor(300 / 8) - 8 = 29
    assert_eq!(capacity(10, 10, 3, Variant::PlaneZero), 29);

    let payload = random_payload(29);
    let encoded = encode(random_buffer(10, 10, 3), &payload, Variant::PlaneZero)?;
    assert_eq!(decode(&encoded, Variant::PlaneZero)?.as_bytes(), &payload[..]);

    let result = encode(random_buffer(10, 10, 3), &random_payload(30), Variant::PlaneZero);
    assert_eq!(
        result,
        Err(StegError::Capacity {
            required_bits: 64 + 30 * 8,
            available_bits: 300,
        })
    );
    Ok(())
}

/// 多平面变体：恰好等于容量的载荷成功，多一个字节则在写入途中耗尽
#[test]
fn test_multi_plane_capacity_boundary() -> anyhow::Result<()> {
    // 2x2x3 = 12 个通道字节，12 * 8 - 64 = 32 bits = 4 字节
    assert_eq!(capacity(2, 2, 3, Variant::MultiPlane), 4);

    let encoded = encode(random_buffer(2, 2, 3), b"full", Variant::MultiPlane)?;
    assert_eq!(decode(&encoded, Variant::MultiPlane)?, Decoded::Payload(b"full".to_vec()));

    let result = encode(random_buffer(2, 2, 3), b"full!", Variant::MultiPlane);
    assert_eq!(result, Err(StegError::CapacityExhausted));
    Ok(())
}

/// 多平面变体的粗略预检查：载荷字节数超过通道字节数时直接拒绝
#[test]
fn test_multi_plane_precheck() {
    let result = encode(random_buffer(2, 2, 3), &random_payload(13), Variant::MultiPlane);
    assert!(matches!(result, Err(StegError::Capacity { .. })));
}

/// 连长度字段都写不下的多平面载体在写入途中耗尽
#[test]
fn test_multi_plane_too_small_for_header() {
    let result = MultiPlaneCodec::new(random_buffer(1, 1, 1)).encode(&[]);
    assert_eq!(result, Err(StegError::CapacityExhausted));
    assert_eq!(decode(&random_buffer(1, 1, 1), Variant::MultiPlane), Ok(Decoded::Empty));
}

/// 4x4 RGB 载体对单平面变体来说太小
#[test]
fn test_plane_zero_tiny_carrier() {
    assert_eq!(capacity(4, 4, 3, Variant::PlaneZero), 0);

    let codec = PlaneZeroCodec::new(random_buffer(4, 4, 3));
    assert!(matches!(codec, Err(StegError::Capacity { .. })));

    let result = encode(random_buffer(4, 4, 3), b"x", Variant::PlaneZero);
    assert!(matches!(result, Err(StegError::Capacity { .. })));

    assert_eq!(decode(&random_buffer(4, 4, 3), Variant::PlaneZero), Ok(Decoded::Empty));
}

/// 全零载体读出的长度为 0，两种变体都返回空结果
#[test]
fn test_zeroed_carrier_decodes_empty() -> anyhow::Result<()> {
    let buffer = PixelBuffer::zeroed(32, 32, 3)?;
    for variant in [Variant::PlaneZero, Variant::MultiPlane] {
        let decoded = decode(&buffer, variant)?;
        assert_eq!(decoded, Decoded::Empty);
        assert!(decoded.is_empty());

        let report = probe(&buffer, variant);
        assert_eq!(report.declared_len, Some(0));
        assert!(!report.has_hidden_data());
    }
    Ok(())
}

/// 多平面变体：只占用平面 0 的载荷不会改动任何字节的平面 1 至 7
#[test]
fn test_multi_plane_bit_plane_isolation() -> anyhow::Result<()> {
    let original = random_buffer(20, 20, 3);
    let payload = random_payload(50);
    let encoded = encode(original.clone(), &payload, Variant::MultiPlane)?;

    let used = 64 + payload.len() * 8;
    for (i, (&before, &after)) in original.as_flat().iter().zip(encoded.as_flat()).enumerate() {
        assert_eq!((before ^ after) & 0xFE, 0, "higher plane touched at offset {i}");
        if i >= used {
            assert_eq!(before, after, "untouched byte changed at offset {i}");
        }
    }
    Ok(())
}

/// 多平面变体在溢出到更高平面后，单平面变体读不出同一数据
#[test]
fn test_variants_are_not_interchangeable() -> anyhow::Result<()> {
    let original = random_buffer(10, 10, 3);
    let payload = random_payload(100);
    let encoded = encode(original.clone(), &payload, Variant::MultiPlane)?;

    assert_eq!(decode(&encoded, Variant::MultiPlane)?.into_bytes(), payload);
    assert_eq!(decode(&encoded, Variant::PlaneZero)?, Decoded::Empty);

    // 100 字节 + 长度字段 = 864 bits，需要用到平面 0、1、2
    let touched_plane_two = original
        .as_flat()
        .iter()
        .zip(encoded.as_flat())
        .any(|(&before, &after)| (before ^ after) & 0b100 != 0);
    let touched_plane_three = original
        .as_flat()
        .iter()
        .zip(encoded.as_flat())
        .any(|(&before, &after)| (before ^ after) & 0xF8 != 0);
    assert!(touched_plane_two);
    assert!(!touched_plane_three);
    Ok(())
}

/// 长度字段为垃圾值时，多平面变体也返回空结果而不是越界读取
#[test]
fn test_multi_plane_garbage_length_is_empty() -> anyhow::Result<()> {
    let buffer = PixelBuffer::new(8, 8, 3, vec![0xFF; 192])?;
    assert_eq!(decode(&buffer, Variant::MultiPlane)?, Decoded::Empty);
    assert_eq!(MultiPlaneCodec::new(buffer).read_length()?, u64::MAX);
    Ok(())
}

/// 容量查询是纯函数
#[test]
fn test_capacity_is_pure() {
    for variant in [Variant::PlaneZero, Variant::MultiPlane] {
        assert_eq!(capacity(100, 100, 3, variant), capacity(100, 100, 3, variant));
    }
    assert_eq!(capacity(100, 100, 3, Variant::PlaneZero), 3_742);
    assert_eq!(capacity(100, 100, 3, Variant::MultiPlane), 29_992);
    assert_eq!(capacity(1, 1, 1, Variant::MultiPlane), 0);
}

/// 解码不修改缓冲区
#[test]
fn test_decode_is_read_only() -> anyhow::Result<()> {
    for variant in [Variant::PlaneZero, Variant::MultiPlane] {
        let encoded = encode(random_buffer(30, 30, 4), b"read only", variant)?;
        let snapshot = encoded.clone();
        decode(&encoded, variant)?;
        probe(&encoded, variant);
        assert_eq!(encoded, snapshot);
    }
    Ok(())
}

/// 直接使用编解码器结构体
#[test]
fn test_codec_structs() -> anyhow::Result<()> {
    let codec = PlaneZeroCodec::new(random_buffer(10, 10, 3))?;
    assert_eq!(codec.max_payload_bytes(), 29);
    let encoded = codec.encode(b"abc")?;

    let codec = PlaneZeroCodec::new(encoded)?;
    assert_eq!(codec.read_length(), 3);
    assert_eq!(codec.decode(), Decoded::Payload(b"abc".to_vec()));
    let buffer = codec.into_inner();

    let report = probe(&buffer, Variant::PlaneZero);
    assert_eq!(report.declared_len, Some(3));
    assert!(report.has_hidden_data());

    let codec = MultiPlaneCodec::new(random_buffer(3, 3, 3));
    assert_eq!(codec.total_slots(), 216);
    let codec = MultiPlaneCodec::new(codec.encode(b"xyz")?);
    assert_eq!(codec.read_length()?, 3);
    assert_eq!(codec.decode()?.as_bytes(), b"xyz");
    assert_eq!(codec.into_inner().flat_len(), 27);
    Ok(())
}
