//! One-line run summaries.

use crate::pipeline::{PipelineOutput, RuleMatch};

/// `classes=2 groups=5 components=3 rows=14 unmatched=1 types: d0-1=2 s1=4`
pub fn pipeline_summary(output: &PipelineOutput) -> String {
    let histogram = output.bf_types.histogram();
    let types = if histogram.is_empty() {
        "none".to_string()
    } else {
        histogram
            .iter()
            .map(|(label, n)| format!("{}={}", label, n))
            .collect::<Vec<_>>()
            .join(" ")
    };
    format!(
        "classes={} groups={} components={} rows={} unmatched={} types: {}",
        output.bf_types.rows.len(),
        output.aggregate.rows.len(),
        output.aggregate.components.len(),
        output.classified.rows.len(),
        output.merge_stats.unmatched,
        types
    )
}

/// `h=0.3 c=0 s=0.9 -> d1-< (rule 7)`
pub fn rule_match_summary(m: &RuleMatch) -> String {
    format!(
        "h={} c={} s={} -> {} (rule {})",
        m.triple.origin, m.triple.current, m.triple.aspiration, m.label, m.rule
    )
}
