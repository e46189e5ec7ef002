/// 长度字段的位宽 (bits)。
/// 载荷长度以 `u64` 存储，高位在前，固定占用嵌入序列的前 64 个槽位。
pub const LENGTH_FIELD_BITS: u32 = 64;

/// 长度字段占用的字节数，即 64 / 8 = 8。
pub const LENGTH_FIELD_BYTES: u64 = 8;

/// 每个载荷字节的位宽。
pub const BITS_PER_BYTE: u32 = 8;

/// 位平面掩码表，按平面序号索引 (平面 0 为最低有效位)。
pub const PLANE_MASKS: [u8; 8] = [1, 2, 4, 8, 16, 32, 64, 128];

/// 最后一个位平面的序号。
pub const LAST_PLANE: usize = PLANE_MASKS.len() - 1;

/// 判断载荷是否为纯文本时检查的前缀长度。
pub const TEXT_SNIFF_LEN: usize = 100;
