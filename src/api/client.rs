// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::http::HttpClient;

use super::model::{Brand, Connection, DiffusionEdge, Show, Theme};

const BRANDS_QUERY: &str = r#"
  query GetBrands {
    brands {
      id
      title
      baseline
    }
  }
"#;

const THEMES_QUERY: &str = r#"
  query GetThemes($brandId: ID!) {
    brand(id: $brandId) {
      themes {
        id
        title
        description
      }
    }
  }
"#;

const SHOW_BY_URL_QUERY: &str = r#"
  query GetShowByUrl($url: String!) {
    showByUrl(url: $url) {
      id
      title
      url
      standFirst
      podcast {
        rss
        itunes
      }
      taxonomiesConnection {
        edges {
          relation
          info
          node {
            id
            type
            title
            standFirst
          }
        }
      }
      personalitiesConnection {
        edges {
          relation
          info
          node {
            id
            name
          }
        }
      }
    }
  }
"#;

const DIFFUSIONS_BY_URL_QUERY: &str = r#"
  query GetDiffusionsByUrl($url: String!, $first: Int!) {
    diffusionsOfShowByUrl(url: $url, first: $first) {
      edges {
        cursor
        node {
          id
          title
          url
          published_date
          podcastEpisode {
            url
            playerUrl
            title
          }
        }
      }
    }
  }
"#;

/// Read access to the show catalog.
///
/// The presentation layers and the batch downloader only depend on this
/// trait, so they can be exercised without a live API.
#[async_trait]
pub trait ShowSource: Send + Sync {
    /// List all brands (stations)
    async fn brands(&self) -> Result<Vec<Brand>, ApiError>;

    /// List the themes of a brand; unknown brands yield an empty list
    async fn themes(&self, brand_id: &str) -> Result<Vec<Theme>, ApiError>;

    /// Look up a show by its public page URL
    async fn get_show(&self, url: &str) -> Result<Option<Show>, ApiError>;

    /// List the most recent diffusions of a show, newest first
    async fn list_episodes(&self, url: &str, limit: usize) -> Result<Vec<DiffusionEdge>, ApiError>;
}

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlErrorMessage>,
}

#[derive(Deserialize)]
struct GraphqlErrorMessage {
    message: String,
}

#[derive(Deserialize)]
struct BrandsData {
    brands: Vec<Brand>,
}

#[derive(Deserialize)]
struct ThemesData {
    brand: Option<BrandThemes>,
}

#[derive(Deserialize)]
struct BrandThemes {
    #[serde(default)]
    themes: Vec<Theme>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShowData {
    show_by_url: Option<Show>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiffusionsData {
    diffusions_of_show_by_url: Connection<DiffusionEdge>,
}

/// GraphQL client for the show catalog
pub struct GraphqlClient<C> {
    http: C,
    config: ApiConfig,
}

impl<C: HttpClient> GraphqlClient<C> {
    pub fn new(http: C, config: ApiConfig) -> Self {
        Self { http, config }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ApiError> {
        let url = self.config.endpoint.as_str();
        let body = serde_json::to_vec(&GraphqlRequest { query, variables })
            .map_err(ApiError::EncodeFailed)?;

        let mut headers = Vec::new();
        if let Some(token) = &self.config.token {
            headers.push(("x-token", token.as_str()));
        }

        debug!(operation, endpoint = url, "sending GraphQL request");

        let response = self
            .http
            .post_json(url, &headers, body)
            .await
            .map_err(|e| ApiError::RequestFailed {
                url: url.to_string(),
                source: e,
            })?;

        if !(200..300).contains(&response.status) {
            return Err(ApiError::HttpStatus {
                url: url.to_string(),
                status: response.status,
            });
        }

        let envelope: GraphqlResponse<T> =
            serde_json::from_slice(&response.body).map_err(|e| ApiError::InvalidResponse {
                url: url.to_string(),
                source: e,
            })?;

        if !envelope.errors.is_empty() {
            let messages: Vec<_> = envelope.errors.into_iter().map(|e| e.message).collect();
            return Err(ApiError::Graphql(messages.join("; ")));
        }

        envelope.data.ok_or(ApiError::MissingData { operation })
    }
}

#[async_trait]
impl<C: HttpClient> ShowSource for GraphqlClient<C> {
    async fn brands(&self) -> Result<Vec<Brand>, ApiError> {
        let data: BrandsData = self.request("brands", BRANDS_QUERY, json!({})).await?;
        Ok(data.brands)
    }

    async fn themes(&self, brand_id: &str) -> Result<Vec<Theme>, ApiError> {
        let data: ThemesData = self
            .request("themes", THEMES_QUERY, json!({ "brandId": brand_id }))
            .await?;
        Ok(data.brand.map(|b| b.themes).unwrap_or_default())
    }

    async fn get_show(&self, url: &str) -> Result<Option<Show>, ApiError> {
        let data: ShowData = self
            .request("showByUrl", SHOW_BY_URL_QUERY, json!({ "url": url }))
            .await?;
        Ok(data.show_by_url)
    }

    async fn list_episodes(&self, url: &str, limit: usize) -> Result<Vec<DiffusionEdge>, ApiError> {
        let data: DiffusionsData = self
            .request(
                "diffusionsOfShowByUrl",
                DIFFUSIONS_BY_URL_QUERY,
                json!({ "url": url, "first": limit }),
            )
            .await?;
        Ok(data.diffusions_of_show_by_url.edges)
    }
}
