use serde::{Deserialize, Serialize};

/// A radio brand (station)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<String>,
}

/// An editorial theme of a brand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A show ("emission") as returned by `showByUrl`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Show {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stand_first: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub podcast: Option<PodcastLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxonomies_connection: Option<Connection<TaxonomyEdge>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personalities_connection: Option<Connection<PersonalityEdge>>,
}

impl Show {
    /// Taxonomy edges, empty when the connection is absent
    pub fn taxonomies(&self) -> &[TaxonomyEdge] {
        self.taxonomies_connection
            .as_ref()
            .map_or(&[], |c| c.edges.as_slice())
    }

    /// Personality edges, empty when the connection is absent
    pub fn personalities(&self) -> &[PersonalityEdge] {
        self.personalities_connection
            .as_ref()
            .map_or(&[], |c| c.edges.as_slice())
    }
}

/// Podcast subscription links of a show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodcastLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub itunes: Option<String>,
}

/// Relay-style connection wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection<E> {
    pub edges: Vec<E>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyEdge {
    #[serde(default)]
    pub relation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    pub node: TaxonomyNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stand_first: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityEdge {
    #[serde(default)]
    pub relation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    pub node: PersonalityNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityNode {
    pub id: String,
    pub name: String,
}

/// One broadcast of a show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffusionEdge {
    pub cursor: String,
    pub node: DiffusionNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffusionNode {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Unix epoch seconds, as text
    #[serde(default, rename = "published_date")]
    pub published_date: Option<String>,
    #[serde(default)]
    pub podcast_episode: Option<PodcastEpisode>,
}

/// Audio attached to a diffusion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodcastEpisode {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub player_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}
