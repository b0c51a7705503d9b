//! Result filtering and formatting.
//!
//! Turns search documents into the text block handed back to the model:
//! documents below the reranker threshold are dropped, the rest are
//! numbered from 1 in service order.

use std::fmt::Write as FmtWrite;

use super::search::SearchDocument;

/// Width of the separator line closing each block.
pub const SEPARATOR_WIDTH: usize = 50;

/// Marker printed when a document carries no relevance score.
const MISSING_SCORE: &str = "N/A";

/// Counters describing one formatting pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatStats {
    /// Documents that cleared the threshold.
    pub kept: usize,
    /// Documents with no reranker score (treated as 0).
    pub missing_reranker: usize,
    /// Kept documents with no content field (rendered empty).
    pub missing_content: usize,
}

/// Formatted output plus the counters gathered while producing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Formatted {
    /// Concatenated source blocks; empty when nothing qualified.
    pub text: String,
    /// Counters for this pass.
    pub stats: FormatStats,
}

/// Renders a score the way the model has always seen it: integral values
/// keep one decimal place (`2.0`), others use the shortest exact form.
/// Magnitudes below `1e-4` or from `1e16` up switch to exponent notation with
/// a signed, two-digit exponent (`1e-05`, `1.5e+16`).
#[must_use]
pub fn format_score(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return value.to_string();
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        return exponent_form(value);
    }
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// Rewrites Rust's `1e-5` exponent text as `1e-05`.
fn exponent_form(value: f64) -> String {
    let raw = format!("{value:e}");
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return raw;
    };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
}

/// Filters `documents` by reranker score and formats the survivors.
#[must_use]
pub fn format_results(documents: &[SearchDocument], content_field: &str, threshold: f64) -> Formatted {
    let separator = "-".repeat(SEPARATOR_WIDTH);
    let mut text = String::new();
    let mut stats = FormatStats::default();

    for doc in documents {
        let reranker_score = doc.reranker_score.unwrap_or_else(|| {
            stats.missing_reranker += 1;
            0.0
        });
        if reranker_score < threshold {
            continue;
        }

        stats.kept += 1;
        let content = doc.field_text(content_field).unwrap_or_else(|| {
            stats.missing_content += 1;
            String::new()
        });
        let score = doc
            .score
            .map_or_else(|| MISSING_SCORE.to_string(), format_score);

        let _ = write!(
            text,
            "Source {}\nContent: {}\n@search.score: {}\n@search.reranker_score: {}\n{}\n\n",
            stats.kept,
            content,
            score,
            format_score(reranker_score),
            separator,
        );
    }

    Formatted { text, stats }
}
