use crate::model::Publication;

pub const SYSTEM_PROMPT: &str = r#"You are an AI assistant specialized in NASA space biology research, helping researchers explore how humans, plants, and biological systems respond to space environments.

Analyze the research papers provided and return intelligent search results:

1. Understand the user's intent (organisms, missions, experiments, authors, topics, or general concepts)
2. Identify the most relevant papers based on scientific relevance and impact
3. Provide a clear summary that explains what was found and why it matters
4. If no exact matches exist, find related research and explain the connection
5. Suggest useful filters to help users explore further

Return ONLY a JSON object with this structure:
{
  "paperIds": ["id1", "id2", "id3"],
  "summary": "A clear 2-3 sentence summary of what was found and key insights from the research",
  "explanation": "Brief explanation of why these papers match the query",
  "suggestedFilters": {
    "organismType": ["Plant", "Animal"],
    "experimentType": ["Plant Growth Study"],
    "mission": ["ISS Expedition 68"]
  },
  "noResults": false
}

List paperIds from most to least relevant. If no relevant papers are found, set "noResults": true and "paperIds": [] (or loosely related papers), and write a "summary" such as "No direct results found for your query, but here's what we found related to [topic]..." suggesting broader search terms or related topics."#;

pub fn build_user_prompt(query: &str, records: &[Publication]) -> String {
    let papers = records
        .iter()
        .map(describe_paper)
        .collect::<Vec<_>>()
        .join("\n---\n");

    format!(
        "Search Query: \"{query}\"\n\nAvailable Papers:\n{papers}\n\nFind the most relevant papers for this query and explain why."
    )
}

fn describe_paper(p: &Publication) -> String {
    format!(
        "ID: {}\nTitle: {}\nAuthors: {}\nYear: {}\nMission: {}\nExperiment Type: {}\nOrganism Type: {}\nAbstract: {}\nKeywords: {}\nCitations: {}\nImpact: {}\n",
        p.id,
        p.title,
        p.authors.join(", "),
        p.year,
        p.mission,
        p.experiment_type,
        p.organism_type,
        p.r#abstract,
        p.keywords.join(", "),
        p.citations,
        p.impact,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::sample::sample_publications;

    #[test]
    fn user_prompt_lists_every_paper() {
        let records = sample_publications();
        let prompt = build_user_prompt("radiation", &records);

        assert!(prompt.starts_with("Search Query: \"radiation\""));
        for p in &records {
            assert!(prompt.contains(&format!("ID: {}\nTitle: {}", p.id, p.title)));
        }
        assert_eq!(prompt.matches("\n---\n").count(), records.len() - 1);
        assert!(prompt.contains("Authors: Dr. James Wilson, Dr. Elena Kowalski"));
        assert!(prompt.contains("Organism Type: Microbe"));
    }
}
