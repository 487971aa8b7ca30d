use super::correspondence::{CorrespondenceMap, CorrespondenceRow};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Header names of the first two report columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportColumns {
    pub target: String,
    pub source: String,
}

impl Default for ReportColumns {
    fn default() -> Self {
        Self { target: "target_node".to_string(), source: "source_node".to_string() }
    }
}

impl ReportColumns {
    pub fn iqtree() -> Self {
        Self { target: "iqtree_node".to_string(), source: "raxml_node".to_string() }
    }

    pub fn paml() -> Self {
        Self { target: "paml_node".to_string(), source: "raxml_node".to_string() }
    }
}

fn is_numeric(label: &str) -> bool {
    !label.is_empty() && label.bytes().all(|b| b.is_ascii_digit())
}

/// Orders purely numeric labels first, by value, then all other labels
/// lexicographically.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    match (is_numeric(a), is_numeric(b)) {
        (true, true) => {
            let a_digits = a.trim_start_matches('0');
            let b_digits = b.trim_start_matches('0');
            a_digits
                .len()
                .cmp(&b_digits.len())
                .then_with(|| a_digits.cmp(b_digits))
                .then_with(|| a.cmp(b))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.cmp(b),
    }
}

/// Report rows sorted by source label with [`compare_labels`].
pub fn sorted_rows(map: &CorrespondenceMap) -> Vec<&CorrespondenceRow> {
    let mut rows: Vec<&CorrespondenceRow> = map.rows().iter().collect();
    rows.sort_by(|a, b| compare_labels(&a.source, &b.source));
    rows
}

/// Writes the tab-separated correspondence table: one row per source
/// candidate with its partner (empty when unmapped), clade size and
/// status. Candidates that lost their clade to another node of the source
/// tree are listed as unmapped.
pub fn write_report(
    map: &CorrespondenceMap,
    columns: &ReportColumns,
    mut writer: impl Write,
) -> std::io::Result<()> {
    writeln!(writer, "{}\t{}\tn_tips\tstatus", columns.target, columns.source)?;
    for row in sorted_rows(map) {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            row.target.as_deref().unwrap_or_default(),
            row.source,
            row.clade_size,
            row.status()
        )?;
    }
    writer.flush()
}

pub fn write_report_file(
    map: &CorrespondenceMap,
    columns: &ReportColumns,
    path: impl AsRef<Path>,
) -> std::io::Result<()> {
    let path = path.as_ref();
    info!("Writing node mapping table to: {}", path.display());
    let writer = BufWriter::new(File::create(path)?);
    write_report(map, columns, writer)
}
