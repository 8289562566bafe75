//! 报告模块：比较两次运行的指标并渲染纯文本表格。
//!
//! # Reports
//!
//! | Item | Description |
//! |------|-------------|
//! | [`percentage_delta`] | Relative change of a score |
//! | [`compare`] | Verdict for one metric across two runs |
//! | [`render_metrics_table`] | Name / score / details table |
//! | [`render_comparison`] | Side-by-side scores with bar chart |
//! | [`check_word_count`] | Response length against a limit |

use crate::types::MetricSet;
use std::fmt;

/// Cells in a comparison bar.
pub const BAR_WIDTH: usize = 20;
/// Longest explanation shown in a metrics table before truncation.
pub const DETAILS_WIDTH: usize = 50;

const FILLED: char = '█';
const EMPTY: char = '░';

/// `(improved - baseline) / baseline * 100`, or infinity for a non-positive baseline.
pub fn percentage_delta(baseline: f64, improved: f64) -> f64 {
    if baseline > 0.0 {
        (improved - baseline) / baseline * 100.0
    } else {
        f64::INFINITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Improved,
    Unchanged,
    Regressed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub metric: String,
    pub original: f64,
    pub improved: f64,
    pub delta: f64,
    pub verdict: Verdict,
}

impl Comparison {
    pub fn new(metric: impl Into<String>, original: f64, improved: f64) -> Self {
        let verdict = if improved > original {
            Verdict::Improved
        } else if improved < original {
            Verdict::Regressed
        } else {
            Verdict::Unchanged
        };
        Self {
            metric: metric.into(),
            original,
            improved,
            delta: percentage_delta(original, improved),
            verdict,
        }
    }

    /// One-line outcome, e.g. `Improvement: +12.50%`.
    pub fn summary(&self) -> String {
        match self.verdict {
            Verdict::Improved => format!("Improvement: +{:.2}%", self.delta),
            Verdict::Unchanged => format!("No change in {}.", human_name(&self.metric)),
            Verdict::Regressed => format!("Decrease: {:.2}%", self.delta),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_comparison(self))
    }
}

/// Compare one metric across two runs; `None` when either score is missing.
pub fn compare(original: &MetricSet, improved: &MetricSet, metric: &str) -> Option<Comparison> {
    Some(Comparison::new(
        metric,
        original.score(metric)?,
        improved.score(metric)?,
    ))
}

/// `instruction_adherence` -> `Instruction Adherence`.
pub fn title_case(metric: &str) -> String {
    metric
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn human_name(metric: &str) -> String {
    metric.replace('_', " ")
}

/// Bar of [`BAR_WIDTH`] cells filled in proportion to `value / max`.
pub fn bar(value: f64, max: f64) -> String {
    let filled = if max > 0.0 && value > 0.0 {
        ((value / max) * BAR_WIDTH as f64).floor().min(BAR_WIDTH as f64) as usize
    } else {
        0
    };
    let mut out = String::with_capacity(BAR_WIDTH * 3);
    out.extend(std::iter::repeat(FILLED).take(filled));
    out.extend(std::iter::repeat(EMPTY).take(BAR_WIDTH - filled));
    out
}

fn truncate_details(text: &str) -> String {
    if text.chars().count() > DETAILS_WIDTH {
        let head: String = text.chars().take(DETAILS_WIDTH).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) => format!("{:.4}", s),
        None => "N/A".to_string(),
    }
}

fn render_table(title: &str, header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    let rule = format!(
        "|{}|",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("|")
    );

    let mut out = format!("{}\n", title);
    out.push_str(&render_row(header.iter().copied(), &widths));
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(row.iter().map(String::as_str), &widths));
        out.push('\n');
    }
    out
}

fn render_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(c, w)| format!("{}{}", c, " ".repeat(w.saturating_sub(c.chars().count()))))
        .collect();
    format!("| {} |", padded.join(" | "))
}

/// Metrics as a plain-text table, or a notice when there are none.
pub fn render_metrics_table(metrics: &MetricSet) -> String {
    if metrics.is_empty() {
        return "No metrics found\n".to_string();
    }
    let rows: Vec<Vec<String>> = metrics
        .iter()
        .map(|m| {
            vec![
                m.name.clone(),
                format_score(m.score),
                truncate_details(&m.explanation),
            ]
        })
        .collect();
    render_table("Metrics", &["Metric Name", "Score", "Details"], &rows)
}

pub fn render_comparison(cmp: &Comparison) -> String {
    let max = cmp.original.max(cmp.improved);
    let rows = vec![
        vec![
            "Original".to_string(),
            format!("{:.4}", cmp.original),
            bar(cmp.original, max),
        ],
        vec![
            "Improved".to_string(),
            format!("{:.4}", cmp.improved),
            bar(cmp.improved, max),
        ],
    ];
    let mut out = render_table(
        &format!("{} Comparison", title_case(&cmp.metric)),
        &["Version", "Score", "Bar Chart"],
        &rows,
    );
    out.push_str(&cmp.summary());
    out.push('\n');
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordCheck {
    pub count: usize,
    pub limit: Option<usize>,
}

impl WordCheck {
    /// `true` when there is no limit or the count is within it.
    pub fn within_limit(&self) -> bool {
        self.limit.map_or(true, |limit| self.count <= limit)
    }
}

impl fmt::Display for WordCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.limit {
            None => write!(f, "Word Count: {}", self.count),
            Some(limit) if self.within_limit() => write!(
                f,
                "Response contains {} words (within the {}-word limit)",
                self.count, limit
            ),
            Some(limit) => write!(
                f,
                "Response contains {} words (exceeds the {}-word limit)",
                self.count, limit
            ),
        }
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn check_word_count(text: &str, limit: Option<usize>) -> WordCheck {
    WordCheck {
        count: word_count(text),
        limit,
    }
}
