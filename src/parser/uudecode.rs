//! Decoder for uuencoded attachments.
//!
//! SEC submissions embed binary files (images, spreadsheets, PDFs) as
//! `begin <mode> <name>` ... `end` envelopes. Each body line starts with a
//! length character followed by groups of four characters that encode three
//! bytes each.

use thiserror::Error;

/// Reasons a uuencode envelope cannot be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UuDecodeError {
    /// No `begin ...` header line.
    #[error("missing \"begin\" line")]
    MissingBegin,

    /// The body ended before an `end` line.
    #[error("truncated input data")]
    Truncated,

    /// A character outside the uuencode alphabet.
    #[error("illegal character {ch:?} on line {line}")]
    IllegalCharacter {
        /// 1-based line number inside the envelope
        line: usize,
        /// Offending character
        ch: char,
    },
}

/// Locate the `begin ... end` envelope inside a document segment.
///
/// The span runs from the first `begin ` to the last `end` line, inclusive.
pub fn find_envelope(segment: &str) -> Option<&str> {
    let start = segment.find("begin ")?;
    let body = &segment[start..];

    let mut end = None;
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        if line.trim_end() == "end" {
            end = Some(offset + line.len());
        }
        offset += line.len();
    }

    end.map(|end| &body[..end])
}

/// Decode a uuencoded envelope.
pub fn decode(envelope: &str) -> Result<Vec<u8>, UuDecodeError> {
    let mut lines = envelope.split('\n').map(|l| l.trim_end_matches('\r'));

    if !lines.by_ref().any(|line| line.starts_with("begin ")) {
        return Err(UuDecodeError::MissingBegin);
    }

    let mut out = Vec::with_capacity(envelope.len() * 3 / 4);
    for (line_no, line) in lines.enumerate() {
        if line.trim_end() == "end" {
            return Ok(out);
        }
        decode_line(line, line_no + 2, &mut out)?;
    }

    Err(UuDecodeError::Truncated)
}

fn decode_line(line: &str, line_no: usize, out: &mut Vec<u8>) -> Result<(), UuDecodeError> {
    let bytes = line.as_bytes();
    let Some(&len_char) = bytes.first() else {
        return Ok(());
    };

    let count = sextet(len_char, line_no)? as usize;
    if count == 0 {
        return Ok(());
    }

    // Characters past the end of a short line decode as zero.
    let needed = count.div_ceil(3) * 4;
    let mut values = Vec::with_capacity(needed);
    for i in 0..needed {
        let value = match bytes.get(1 + i) {
            Some(&c) if c == b'\n' || c == b'\r' => 0,
            Some(&c) => sextet(c, line_no)?,
            None => 0,
        };
        values.push(value);
    }

    let start = out.len();
    for group in values.chunks(4) {
        out.push((group[0] << 2) | (group[1] >> 4));
        out.push(((group[1] & 0x0F) << 4) | (group[2] >> 2));
        out.push(((group[2] & 0x03) << 6) | group[3]);
    }
    out.truncate(start + count);

    Ok(())
}

fn sextet(c: u8, line: usize) -> Result<u8, UuDecodeError> {
    if !(0x20..=0x60).contains(&c) {
        return Err(UuDecodeError::IllegalCharacter {
            line,
            ch: c as char,
        });
    }
    Ok((c - 0x20) & 0x3F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_cat() {
        // "Cat" encodes as #0V%T
        let envelope = "begin 644 cat.txt\n#0V%T\n`\nend\n";
        assert_eq!(decode(envelope).unwrap(), b"Cat".to_vec());
    }

    #[test]
    fn test_decode_multiple_lines() {
        // "Hello, World" split over two lines of 6 bytes each
        let envelope = "begin 644 hello.txt\n&2&5L;&\\L\n&(%=O<FQD\n`\nend\n";
        assert_eq!(decode(envelope).unwrap(), b"Hello, World".to_vec());
    }

    #[test]
    fn test_decode_crlf() {
        let envelope = "begin 644 cat.txt\r\n#0V%T\r\n`\r\nend\r\n";
        assert_eq!(decode(envelope).unwrap(), b"Cat".to_vec());
    }

    #[test]
    fn test_decode_short_line_is_padded() {
        // Length says 3 bytes but only the first two characters survive
        let envelope = "begin 644 cat.txt\n#0V\nend\n";
        let decoded = decode(envelope).unwrap();
        assert_eq!(decoded.len(), 3);
        assert_eq!(&decoded[..1], b"C");
    }

    #[test]
    fn test_missing_begin() {
        assert_eq!(decode("#0V%T\nend\n"), Err(UuDecodeError::MissingBegin));
    }

    #[test]
    fn test_truncated() {
        assert_eq!(
            decode("begin 644 cat.txt\n#0V%T\n"),
            Err(UuDecodeError::Truncated)
        );
    }

    #[test]
    fn test_illegal_character() {
        let result = decode("begin 644 x\n#0v%T\nend\n");
        assert!(matches!(
            result,
            Err(UuDecodeError::IllegalCharacter { ch: 'v', .. })
        ));
    }

    #[test]
    fn test_find_envelope() {
        let segment = "\n<TYPE>GRAPHIC\n<FILENAME>cat.txt\n<TEXT>\nbegin 644 cat.txt\n#0V%T\n`\nend\n</TEXT>\n";
        let envelope = find_envelope(segment).unwrap();
        assert!(envelope.starts_with("begin 644"));
        assert!(envelope.ends_with("end\n"));
        assert!(find_envelope("<TEXT>\nno payload\n</TEXT>").is_none());
    }
}
