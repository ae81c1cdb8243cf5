use crate::model::{OrganismType, Publication};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Built-in records served when no data source is reachable.
pub fn sample_publications() -> Vec<Publication> {
    vec![
        Publication {
            id: "1".into(),
            title: "Microgravity Effects on Arabidopsis Growth Patterns".into(),
            authors: strings(&["Dr. Sarah Chen", "Dr. Michael Rodriguez", "Dr. Lisa Thompson"]),
            year: 2023,
            mission: "ISS Expedition 68".into(),
            experiment_type: "Plant Growth Study".into(),
            organism_type: OrganismType::Plant,
            r#abstract: "Investigation of how microgravity affects the cellular development and root growth patterns in Arabidopsis thaliana specimens during extended spaceflight conditions.".into(),
            citations: 45,
            impact: 8.2,
            keywords: strings(&["microgravity", "plant biology", "root development", "ISS"]),
            pubmed_link: None,
        },
        Publication {
            id: "2".into(),
            title: "Tardigrade Survivability in Deep Space Radiation".into(),
            authors: strings(&["Dr. James Wilson", "Dr. Elena Kowalski"]),
            year: 2024,
            mission: "Artemis Lunar Gateway".into(),
            experiment_type: "Radiation Resistance".into(),
            organism_type: OrganismType::Animal,
            r#abstract: "Comprehensive analysis of tardigrade molecular mechanisms enabling survival in extreme radiation environments encountered during lunar missions.".into(),
            citations: 67,
            impact: 9.1,
            keywords: strings(&["tardigrades", "radiation", "extremophiles", "lunar research"]),
            pubmed_link: None,
        },
        Publication {
            id: "3".into(),
            title: "Bacterial Biofilm Formation in Simulated Mars Atmosphere".into(),
            authors: strings(&["Dr. Robert Kim", "Dr. Anna Petrov", "Dr. Carlos Mendez"]),
            year: 2023,
            mission: "Mars Analog Research".into(),
            experiment_type: "Microbial Ecology".into(),
            organism_type: OrganismType::Microbe,
            r#abstract: "Study of bacterial biofilm development under Mars-like atmospheric conditions and its implications for potential life detection missions.".into(),
            citations: 32,
            impact: 7.5,
            keywords: strings(&["biofilms", "Mars simulation", "astrobiology", "bacteria"]),
            pubmed_link: None,
        },
        Publication {
            id: "4".into(),
            title: "Zebrafish Cardiovascular Adaptation to Zero Gravity".into(),
            authors: strings(&["Dr. Maria Garcia", "Dr. Thomas Anderson"]),
            year: 2022,
            mission: "SpaceX Dragon CRS-25".into(),
            experiment_type: "Physiological Study".into(),
            organism_type: OrganismType::Animal,
            r#abstract: "Examination of cardiovascular system adaptations in zebrafish exposed to microgravity conditions over extended periods.".into(),
            citations: 58,
            impact: 8.7,
            keywords: strings(&["zebrafish", "cardiovascular", "microgravity", "adaptation"]),
            pubmed_link: None,
        },
        Publication {
            id: "5".into(),
            title: "Moss Spore Germination Under Cosmic Radiation".into(),
            authors: strings(&["Dr. Jennifer Liu", "Dr. David Nakamura"]),
            year: 2024,
            mission: "ISS Expedition 70".into(),
            experiment_type: "Reproductive Biology".into(),
            organism_type: OrganismType::Plant,
            r#abstract: "Investigation of moss reproductive cycles and spore viability when exposed to cosmic radiation during long-duration spaceflight.".into(),
            citations: 23,
            impact: 6.8,
            keywords: strings(&["moss", "reproduction", "cosmic radiation", "spores"]),
            pubmed_link: None,
        },
        Publication {
            id: "6".into(),
            title: "Extremophile Metabolic Pathways in Vacuum Conditions".into(),
            authors: strings(&["Dr. Ahmed Hassan", "Dr. Sophie Laurent"]),
            year: 2023,
            mission: "ESA Columbus Laboratory".into(),
            experiment_type: "Biochemical Analysis".into(),
            organism_type: OrganismType::Microbe,
            r#abstract: "Detailed analysis of metabolic pathway modifications in extremophile bacteria when subjected to vacuum conditions similar to outer space.".into(),
            citations: 41,
            impact: 8.9,
            keywords: strings(&["extremophiles", "metabolism", "vacuum", "biochemistry"]),
            pubmed_link: None,
        },
    ]
}
