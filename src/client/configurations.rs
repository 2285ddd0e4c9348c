//! The configurations sub-client.

use crate::error::ApiClientError;
use crate::resource::ConfigurationResource;
use crate::response::ResponseShape;

use super::common::{deserialize_resource, DeserializedResource};
use super::sub_client::{RequestOptions, SubClient};

pub struct ConfigurationClient {
  sub_client: SubClient,
}

impl ConfigurationClient {
  pub(crate) fn new(sub_client: SubClient) -> Self {
    Self { sub_client }
  }

  /// Get the active configuration entry for a key.
  pub async fn get_configuration(
    &self,
    key: &str,
  ) -> Result<DeserializedResource<ConfigurationResource>, ApiClientError> {
    let response = self
      .sub_client
      .make_request(RequestOptions {
        path: Some(String::from(key)),
        expect: ResponseShape::Singular,
        ..Default::default()
      })
      .await?;
    deserialize_resource(response)
  }
}
