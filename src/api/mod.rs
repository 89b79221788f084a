mod client;
mod model;

pub use client::{GraphqlClient, ShowSource};
pub use model::{
    Brand, Connection, DiffusionEdge, DiffusionNode, PersonalityEdge, PersonalityNode,
    PodcastEpisode, PodcastLinks, Show, TaxonomyEdge, TaxonomyNode, Theme,
};
