use anyhow::{Context, Result};
use std::io::BufRead;

use crate::store::Sequence;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub id: String,
    pub seq: Vec<u8>,
}

/// 读取第一条记录；之后的记录忽略。没有任何 header 时返回 `None`。
pub fn read_first_record<R: BufRead>(mut reader: R) -> Result<Option<FastaRecord>> {
    let mut line = String::new();

    // Find header line
    let id = loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if let Some(header) = line.strip_prefix('>') {
            break header.split_whitespace().next().unwrap_or("").to_string();
        }
    };

    let mut seq = Vec::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 || line.starts_with('>') {
            break;
        }
        seq.extend(
            line.bytes()
                .filter(|b| !b.is_ascii_whitespace())
                .map(|b| b.to_ascii_uppercase()),
        );
    }

    Ok(Some(FastaRecord { id, seq }))
}

/// 从 FASTA 文件加载第一条序列。
pub fn load_sequence(path: &str) -> Result<Sequence> {
    let fh = std::fs::File::open(path).with_context(|| format!("cannot open FASTA '{}'", path))?;
    let rec = read_first_record(std::io::BufReader::new(fh))?
        .with_context(|| format!("FASTA file '{}' contains no sequences", path))?;
    let name = if rec.id.is_empty() { path.to_string() } else { rec.id };
    Ok(Sequence::new(name, &rec.seq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_first_record_only() {
        let data = b">chr1 first\nACgTNN\n>chr2\nAAA\n";
        let rec = read_first_record(Cursor::new(&data[..])).unwrap().unwrap();
        assert_eq!(rec.id, "chr1");
        assert_eq!(rec.seq, b"ACGTNN");
    }

    #[test]
    fn strips_crlf_and_inner_whitespace() {
        let data = b">chr1 desc\r\nAC g t n\r\n acgt\r\n";
        let rec = read_first_record(Cursor::new(&data[..])).unwrap().unwrap();
        assert_eq!(rec.seq, b"ACGTNACGT");
    }

    #[test]
    fn skips_leading_empty_lines() {
        let data = b"\n\n>s\nACGT\n";
        let rec = read_first_record(Cursor::new(&data[..])).unwrap().unwrap();
        assert_eq!(rec.id, "s");
        assert_eq!(rec.seq, b"ACGT");
    }

    #[test]
    fn no_header_means_no_record() {
        assert!(read_first_record(Cursor::new(&b"ACGT\n"[..])).unwrap().is_none());
        assert!(read_first_record(Cursor::new(&b""[..])).unwrap().is_none());
    }

    #[test]
    fn load_sequence_from_file() {
        let path = std::env::temp_dir().join(format!("wavefront-sw-{}.fa", std::process::id()));
        std::fs::write(&path, ">query\nGATTACA\nGATTACA\n").unwrap();
        let seq = load_sequence(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(seq.name, "query");
        assert_eq!(seq.symbols(), b"GATTACAGATTACA");
        assert!(load_sequence("/nonexistent/wavefront-sw.fa").is_err());
    }
}
