// Wire framing for the legacy sentence protocol.
//
// Every word on the wire is prefixed with a variable-length big-endian
// length. A sentence is a run of words terminated by a zero-length word.
// The encoding mirrors the device's published scheme:
//
//   len < 0x80        -> 1 byte
//   len < 0x4000      -> 2 bytes, ORed with 0x8000
//   len < 0x20_0000   -> 3 bytes, ORed with 0xC0_0000
//   len < 0x1000_0000 -> 4 bytes, ORed with 0xE000_0000
//   otherwise         -> 0xF0 marker byte + u32 BE

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::Error;

/// Upper bound on a single word. Device replies never approach this;
/// anything larger indicates a desynchronized stream.
const MAX_WORD_LEN: u32 = 0x100_0000;

/// Encode a word length into its wire prefix.
pub fn encode_length(len: u32) -> Vec<u8> {
    if len < 0x80 {
        vec![u8::try_from(len).unwrap_or(0)]
    } else if len < 0x4000 {
        let v = len | 0x8000;
        vec![(v >> 8) as u8, v as u8]
    } else if len < 0x20_0000 {
        let v = len | 0xC0_0000;
        vec![(v >> 16) as u8, (v >> 8) as u8, v as u8]
    } else if len < 0x1000_0000 {
        let v = len | 0xE000_0000;
        vec![(v >> 24) as u8, (v >> 16) as u8, (v >> 8) as u8, v as u8]
    } else {
        vec![
            0xF0,
            (len >> 24) as u8,
            (len >> 16) as u8,
            (len >> 8) as u8,
            len as u8,
        ]
    }
}

/// Read a word length prefix from the stream.
pub async fn read_length<R: AsyncRead + Unpin>(reader: &mut R) -> Result<u32, Error> {
    let first = reader.read_u8().await?;

    let len = if first & 0x80 == 0 {
        u32::from(first)
    } else if first & 0xC0 == 0x80 {
        let b = reader.read_u8().await?;
        (u32::from(first & 0x3F) << 8) | u32::from(b)
    } else if first & 0xE0 == 0xC0 {
        let mut rest = [0u8; 2];
        reader.read_exact(&mut rest).await?;
        (u32::from(first & 0x1F) << 16) | (u32::from(rest[0]) << 8) | u32::from(rest[1])
    } else if first & 0xF0 == 0xE0 {
        let mut rest = [0u8; 3];
        reader.read_exact(&mut rest).await?;
        (u32::from(first & 0x0F) << 24)
            | (u32::from(rest[0]) << 16)
            | (u32::from(rest[1]) << 8)
            | u32::from(rest[2])
    } else if first == 0xF0 {
        reader.read_u32().await?
    } else {
        // 0xF8..0xFF are reserved control bytes the device never sends.
        return Err(Error::Frame(format!("invalid length prefix 0x{first:02x}")));
    };

    if len > MAX_WORD_LEN {
        return Err(Error::Frame(format!("oversized word ({len} bytes)")));
    }
    Ok(len)
}

/// Read one word (length prefix + UTF-8 payload).
pub async fn read_word<R: AsyncRead + Unpin>(reader: &mut R) -> Result<String, Error> {
    let len = read_length(reader).await?;
    if len == 0 {
        return Ok(String::new());
    }
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf).await?;
    String::from_utf8(buf).map_err(|e| Error::Frame(format!("non-UTF-8 word: {e}")))
}

/// Write one word (length prefix + payload). Does not flush.
pub async fn write_word<W: AsyncWrite + Unpin>(writer: &mut W, word: &str) -> Result<(), Error> {
    let bytes = word.as_bytes();
    let len = u32::try_from(bytes.len())
        .map_err(|_| Error::Frame(format!("word too long ({} bytes)", bytes.len())))?;
    writer.write_all(&encode_length(len)).await?;
    writer.write_all(bytes).await?;
    Ok(())
}

/// Write a full sentence (all words + the zero-length terminator) and flush.
pub async fn write_sentence<W: AsyncWrite + Unpin>(
    writer: &mut W,
    words: &[String],
) -> Result<(), Error> {
    for word in words {
        write_word(writer, word).await?;
    }
    writer.write_all(&[0]).await?;
    writer.flush().await?;
    Ok(())
}

/// Read a full sentence: words up to (excluding) the zero-length terminator.
pub async fn read_sentence<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<String>, Error> {
    let mut words = Vec::new();
    loop {
        let word = read_word(reader).await?;
        if word.is_empty() {
            return Ok(words);
        }
        words.push(word);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    /// Round-trip a length through encode + read.
    async fn roundtrip(len: u32) -> u32 {
        let encoded = encode_length(len);
        let mut cursor = std::io::Cursor::new(encoded);
        read_length(&mut cursor).await.unwrap()
    }

    #[tokio::test]
    async fn length_boundaries_roundtrip() {
        for len in [
            0, 1, 0x7F, 0x80, 0x3FFF, 0x4000, 0x1F_FFFF, 0x20_0000, 0xFF_FFFF,
        ] {
            assert_eq!(roundtrip(len).await, len, "len=0x{len:x}");
        }
    }

    #[test]
    fn single_byte_encoding() {
        assert_eq!(encode_length(0), vec![0x00]);
        assert_eq!(encode_length(0x7F), vec![0x7F]);
    }

    #[test]
    fn two_byte_encoding() {
        assert_eq!(encode_length(0x80), vec![0x80, 0x80]);
        assert_eq!(encode_length(0x3FFF), vec![0xBF, 0xFF]);
    }

    #[test]
    fn three_byte_encoding() {
        assert_eq!(encode_length(0x4000), vec![0xC0, 0x40, 0x00]);
        assert_eq!(encode_length(0x1F_FFFF), vec![0xDF, 0xFF, 0xFF]);
    }

    #[test]
    fn four_byte_encoding() {
        assert_eq!(encode_length(0x20_0000), vec![0xE0, 0x20, 0x00, 0x00]);
    }

    #[tokio::test]
    async fn reserved_prefix_rejected() {
        let mut cursor = std::io::Cursor::new(vec![0xF8u8]);
        let err = read_length(&mut cursor).await.unwrap_err();
        assert!(matches!(err, Error::Frame(_)));
    }

    #[tokio::test]
    async fn sentence_roundtrip() {
        let words = vec![
            "/ip/firewall/address-list/print".to_owned(),
            "?list=authorized".to_owned(),
        ];
        let mut buf = std::io::Cursor::new(Vec::new());
        write_sentence(&mut buf, &words).await.unwrap();

        let mut cursor = std::io::Cursor::new(buf.into_inner());
        let decoded = read_sentence(&mut cursor).await.unwrap();
        assert_eq!(decoded, words);
    }
}
