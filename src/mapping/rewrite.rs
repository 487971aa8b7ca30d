use super::correspondence::CorrespondenceMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Line counts from one rewrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    /// Non-blank lines seen.
    pub records: usize,
    /// Lines whose leading label was replaced.
    pub renamed: usize,
}

/// Splits a line into leading whitespace, first token and the rest.
fn split_leading_label(line: &str) -> (&str, &str, &str) {
    let indent = line.len() - line.trim_start().len();
    let rest = &line[indent..];
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    (&line[..indent], &rest[..end], &rest[end..])
}

/// Copies `reader` to `writer` line by line, replacing the first token
/// of each line with its mapped label.
///
/// Unmapped labels and blank lines pass through untouched; everything
/// after the first token, including separators and line endings, is
/// written back byte for byte.
pub fn rewrite_labels(
    map: &CorrespondenceMap,
    mut reader: impl BufRead,
    mut writer: impl Write,
) -> std::io::Result<RewriteStats> {
    let mut stats = RewriteStats::default();
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            writer.write_all(line.as_bytes())?;
            continue;
        }

        stats.records += 1;
        let (indent, label, payload) = split_leading_label(&line);
        match map.get(label) {
            Some(mapped) if mapped.as_ref() != label => {
                stats.renamed += 1;
                writer.write_all(indent.as_bytes())?;
                writer.write_all(mapped.as_bytes())?;
                writer.write_all(payload.as_bytes())?;
            }
            _ => writer.write_all(line.as_bytes())?,
        }
    }

    writer.flush()?;
    Ok(stats)
}

/// [`rewrite_labels`] from one file into another.
pub fn rewrite_file(
    map: &CorrespondenceMap,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> std::io::Result<RewriteStats> {
    let (input, output) = (input.as_ref(), output.as_ref());
    let reader = BufReader::new(File::open(input)?);
    let writer = BufWriter::new(File::create(output)?);
    let stats = rewrite_labels(map, reader, writer)?;
    info!("Rewritten records written to: {}", output.display());
    info!("Lines processed: {}, renamed: {}", stats.records, stats.renamed);
    Ok(stats)
}
