//! The API client: per-resource sub-clients over a shared request
//! orchestrator.

mod api_client;
mod common;
mod configurations;
mod events;
mod sub_client;

pub use api_client::ApiClient;
pub use common::{
  check_and_handle_error, classify_body, deserialize_array, deserialize_created,
  deserialize_paginated, deserialize_resource, response_body_or_error, CreatedResource,
  DeserializedArray, DeserializedResource, PaginatedResources,
};
pub use configurations::ConfigurationClient;
pub use events::{CreateEventBody, EventClient};
pub use sub_client::{RequestOptions, SubClient};
