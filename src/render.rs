//! Markdown rendering of the dashboard, paper cards, and AI summary card.

use crate::model::Publication;
use crate::query::aggregate::{CategoryCount, Dashboard};
use crate::ranking::Ranking;
use crate::source::Origin;

const ABSTRACT_PREVIEW_CHARS: usize = 280;

pub fn format_dashboard(dashboard: &Dashboard, origin: Origin) -> String {
    let mut out = String::from("# Space Biology Research Dashboard\n\n");
    if origin == Origin::Sample {
        out.push_str("> Note: publication source unavailable. Showing sample data.\n\n");
    }

    format_summary(dashboard, &mut out);
    format_category_table("Research by Organism Type", "Organism", &dashboard.by_organism, &mut out);
    format_timeline(dashboard, &mut out);
    format_category_table("Research by Mission", "Mission", &dashboard.by_mission, &mut out);
    format_category_table(
        "Research by Experiment Type",
        "Experiment",
        &dashboard.by_experiment,
        &mut out,
    );
    format_impact(dashboard, &mut out);

    out
}

fn format_summary(dashboard: &Dashboard, out: &mut String) {
    let s = &dashboard.summary;
    out.push_str("| Metric | Value |\n|--------|-------|\n");
    out.push_str(&format!("| Total Papers | {} |\n", s.total_papers));
    out.push_str(&format!("| Total Citations | {} |\n", s.total_citations));
    out.push_str(&format!("| Avg Impact | {} |\n", s.average_impact_display()));
    out.push_str(&format!("| Unique Missions | {} |\n\n", s.unique_missions));
}

fn format_category_table(title: &str, label: &str, counts: &[CategoryCount], out: &mut String) {
    if counts.is_empty() {
        return;
    }
    out.push_str(&format!("## {title}\n\n| {label} | Papers |\n|---|---|\n"));
    for c in counts {
        out.push_str(&format!("| {} | {} |\n", table_cell(&c.name), c.value));
    }
    out.push('\n');
}

fn format_timeline(dashboard: &Dashboard, out: &mut String) {
    if dashboard.timeline.is_empty() {
        return;
    }
    out.push_str("## Research Timeline\n\n| Year | Papers |\n|------|--------|\n");
    for y in &dashboard.timeline {
        out.push_str(&format!("| {} | {} |\n", y.year, y.count));
    }
    out.push('\n');
}

fn format_impact(dashboard: &Dashboard, out: &mut String) {
    if dashboard.top_impact.is_empty() {
        return;
    }
    out.push_str("## High Impact Research\n\n");
    for (i, entry) in dashboard.top_impact.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} (impact: {}, {} citations)\n",
            i + 1,
            one_line(&entry.title),
            entry.impact,
            entry.citations
        ));
    }
    out.push('\n');
}

/// Paper cards for the first `limit` publications of a view.
pub fn format_cards(view: &[&Publication], limit: usize) -> String {
    if view.is_empty() {
        return "No publications match the current filters.\n".to_string();
    }

    let mut out = format!("## Research Papers ({} matching)\n\n", view.len());
    for p in view.iter().take(limit) {
        format_card(p, &mut out);
    }
    if view.len() > limit {
        out.push_str(&format!("... and {} more\n", view.len() - limit));
    }
    out
}

fn format_card(p: &Publication, out: &mut String) {
    out.push_str(&format!("### {}\n\n", one_line(&p.title)));
    if !p.authors.is_empty() {
        out.push_str(&format!("{}\n\n", p.authors.join(", ")));
    }
    out.push_str(&format!(
        "{} · {} · {} · {}\n",
        p.year, p.organism_type, p.mission, p.experiment_type
    ));
    out.push_str(&format!(
        "Citations: {} · Impact: {}\n\n",
        p.citations, p.impact
    ));

    if !p.r#abstract.is_empty() {
        let preview: String = p.r#abstract.chars().take(ABSTRACT_PREVIEW_CHARS).collect();
        out.push_str(&preview);
        if p.r#abstract.chars().count() > ABSTRACT_PREVIEW_CHARS {
            out.push_str("...");
        }
        out.push_str("\n\n");
    }
    if !p.keywords.is_empty() {
        out.push_str(&format!("Keywords: {}\n\n", p.keywords.join(", ")));
    }
    if let Some(link) = &p.pubmed_link {
        out.push_str(&format!("[PubMed Central]({})\n\n", link_target(link)));
    }
}

pub fn format_ai_summary(query: &str, ranking: &Ranking) -> String {
    let mut out = format!("## AI Search: {}\n\n", one_line(query));

    if ranking.no_results {
        out.push_str("> No direct results found. Showing related research.\n\n");
    }
    if let Some(summary) = ranking.summary.as_deref().filter(|s| !s.is_empty()) {
        out.push_str(summary);
        out.push_str("\n\n");
    }
    if !ranking.explanation.is_empty() {
        out.push_str(&format!("*{}*\n\n", ranking.explanation.trim()));
    }

    let f = &ranking.suggested_filters;
    if !f.is_empty() {
        out.push_str("**Suggested filters:**\n");
        for (label, values) in [
            ("Organism", &f.organism_type),
            ("Experiment", &f.experiment_type),
            ("Mission", &f.mission),
        ] {
            if !values.is_empty() {
                out.push_str(&format!("- {label}: {}\n", values.join(", ")));
            }
        }
        out.push('\n');
    }

    out
}

/// Flatten line breaks so free text cannot end a heading or list item early.
fn one_line(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}

fn table_cell(s: &str) -> String {
    one_line(s).replace('|', "\\|")
}

/// Backslash-escape brackets and parentheses inside a link target.
fn link_target(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        if matches!(c, '[' | ']' | '(' | ')') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::types::SuggestedFilters;
    use crate::source::sample::sample_publications;

    #[test]
    fn dashboard_includes_sections() {
        let records = sample_publications();
        let view: Vec<&Publication> = records.iter().collect();
        let text = format_dashboard(&Dashboard::build(&view, 10), Origin::Source);

        assert!(text.contains("| Total Papers | 6 |"));
        assert!(text.contains("| Avg Impact | 8.2 |"));
        assert!(text.contains("## Research Timeline"));
        assert!(text.contains("| 2022 | 1 |"));
        assert!(text.contains("1. Tardigrade Survivability in De... (impact: 9.1, 67 citations)"));
        assert!(!text.contains("sample data"));
    }

    #[test]
    fn empty_dashboard_shows_zero_stats_and_sample_note() {
        let text = format_dashboard(&Dashboard::build(&[], 10), Origin::Sample);
        assert!(text.contains("Showing sample data"));
        assert!(text.contains("| Avg Impact | 0 |"));
        assert!(!text.contains("## Research Timeline"));
        assert!(!text.contains("## High Impact Research"));
    }

    #[test]
    fn cards_are_limited_with_remainder_note() {
        let records = sample_publications();
        let view: Vec<&Publication> = records.iter().collect();
        let text = format_cards(&view, 2);

        assert!(text.contains("## Research Papers (6 matching)"));
        assert!(text.contains("### Microgravity Effects on Arabidopsis Growth Patterns"));
        assert!(text.contains("2024 · Animal · Artemis Lunar Gateway · Radiation Resistance"));
        assert!(!text.contains("Bacterial Biofilm"));
        assert!(text.contains("... and 4 more"));
    }

    #[test]
    fn free_text_is_flattened_and_escaped() {
        assert_eq!(one_line("a\r\nb\nc"), "a  b c");
        assert_eq!(table_cell("ISS | Expedition\n68"), r"ISS \| Expedition 68");
        assert_eq!(link_target("plain"), "plain");
    }

    #[test]
    fn empty_view_renders_notice() {
        assert!(format_cards(&[], 6).contains("No publications match"));
    }

    #[test]
    fn card_escapes_link() {
        let mut records = sample_publications();
        records[0].pubmed_link = Some("https://example.org/a(b)".into());
        let view = vec![&records[0]];
        assert!(format_cards(&view, 1).contains(r"[PubMed Central](https://example.org/a\(b\))"));
    }

    #[test]
    fn ai_summary_shows_no_results_and_suggestions() {
        let ranking = Ranking {
            paper_ids: vec!["6".into()],
            summary: Some("No direct results found for your query.".into()),
            explanation: "Related extremophile work".into(),
            no_results: true,
            suggested_filters: SuggestedFilters {
                organism_type: vec!["Microbe".into()],
                ..SuggestedFilters::default()
            },
        };

        let text = format_ai_summary("venus\nclouds", &ranking);
        assert!(text.starts_with("## AI Search: venus clouds"));
        assert!(text.contains("No direct results found. Showing related research."));
        assert!(text.contains("*Related extremophile work*"));
        assert!(text.contains("- Organism: Microbe"));
        assert!(!text.contains("- Mission:"));
    }
}
