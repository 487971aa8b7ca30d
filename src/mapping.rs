mod correspondence;
mod report;
mod rewrite;

pub use correspondence::{CorrespondenceMap, CorrespondenceRow, MatchStatus};
pub use report::{
    ReportColumns, compare_labels, sorted_rows, write_report, write_report_file,
};
pub use rewrite::{RewriteStats, rewrite_file, rewrite_labels};
