//! # 载荷类型识别
//!
//! 根据恢复出的字节的前缀猜测文件类型，仅用于给输出文件选择扩展名和向用户报告。

use crate::constants::TEXT_SNIFF_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Png,
    Jpeg,
    Zip,
    Text,
    Binary,
}

impl PayloadKind {
    /// 按魔数和可打印字符判断载荷类型。
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(b"\x89PNG") {
            PayloadKind::Png
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            PayloadKind::Jpeg
        } else if bytes.starts_with(b"PK") {
            PayloadKind::Zip
        } else if is_text(bytes) {
            PayloadKind::Text
        } else {
            PayloadKind::Binary
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            PayloadKind::Png => "png",
            PayloadKind::Jpeg => "jpg",
            PayloadKind::Zip => "zip",
            PayloadKind::Text => "txt",
            PayloadKind::Binary => "bin",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            PayloadKind::Png => "image/png",
            PayloadKind::Jpeg => "image/jpeg",
            PayloadKind::Zip => "application/zip",
            PayloadKind::Text => "text/plain",
            PayloadKind::Binary => "application/octet-stream",
        }
    }
}

/// 前 100 个字节是不含控制字符 (制表符和换行除外) 的 UTF-8 文本时视为文本。
///
/// 截断处可能切开一个多字节字符，这种不完整的尾部不算错误。
fn is_text(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(TEXT_SNIFF_LEN)];
    let text = match std::str::from_utf8(head) {
        Ok(text) => text,
        Err(e) if e.error_len().is_none() => {
            // valid_up_to 之前的部分已校验为合法 UTF-8
            match std::str::from_utf8(&head[..e.valid_up_to()]) {
                Ok(text) => text,
                Err(_) => return false,
            }
        }
        Err(_) => return false,
    };

    !text
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\t' | '\n' | '\r'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_magic_numbers() {
        assert_eq!(PayloadKind::detect(b"\x89PNG\r\n\x1a\n"), PayloadKind::Png);
        assert_eq!(PayloadKind::detect(&[0xFF, 0xD8, 0xFF, 0xE0]), PayloadKind::Jpeg);
        assert_eq!(PayloadKind::detect(b"PK\x03\x04"), PayloadKind::Zip);
    }

    #[test]
    fn detects_text_and_binary() {
        assert_eq!(PayloadKind::detect(b"hello\nworld"), PayloadKind::Text);
        assert_eq!(PayloadKind::detect("你好，世界".as_bytes()), PayloadKind::Text);
        assert_eq!(PayloadKind::detect(&[0, 1, 2, 3]), PayloadKind::Binary);
        assert_eq!(PayloadKind::Binary.extension(), "bin");
    }

    #[test]
    fn only_the_head_decides_text() {
        // 100 字节的 ASCII 之后是非法字节
        let mut bytes = vec![b'a'; TEXT_SNIFF_LEN];
        bytes.extend_from_slice(&[0xFF, 0x00, 0xFE]);
        assert_eq!(PayloadKind::detect(&bytes), PayloadKind::Text);

        // 前 100 字节中含控制字符
        let mut bytes = vec![b'a'; 10];
        bytes.push(0x07);
        bytes.extend(std::iter::repeat_n(b'a', 200));
        assert_eq!(PayloadKind::detect(&bytes), PayloadKind::Binary);
    }

    #[test]
    fn multibyte_char_cut_at_the_head_boundary_is_text() {
        // 99 个 ASCII 字节后接一个 3 字节的 "你"，截断落在字符中间
        let mut bytes = vec![b'a'; TEXT_SNIFF_LEN - 1];
        bytes.extend_from_slice("你好".as_bytes());
        assert_eq!(PayloadKind::detect(&bytes), PayloadKind::Text);

        // 真正的非法序列不因截断而被放过
        let mut bytes = vec![b'a'; TEXT_SNIFF_LEN - 2];
        bytes.extend_from_slice(&[0xE4, 0x41, 0x41]);
        assert_eq!(PayloadKind::detect(&bytes), PayloadKind::Binary);
    }
}
