//! Precondition validation
//!
//! Read-only checks that run before any mutation. Ambiguity is never
//! resolved by picking a match: zero matches, multiple matches, and a
//! non-external network are three distinct fatal errors.

use crate::error::Result;
use lakeflow_cloud::{CloudError, CloudProvider, ImageInfo, NetworkInfo};

/// Resolved preconditions, handed to the provisioning stages
#[derive(Debug, Clone)]
pub struct Validated {
    pub external_network: NetworkInfo,
    pub image: ImageInfo,
}

/// Verify the external network is unique and external, and the image exists
pub async fn validate(
    provider: &dyn CloudProvider,
    external_network: &str,
    image: &str,
) -> Result<Validated> {
    let mut networks = provider.list_networks(external_network).await?;
    let network = match networks.len() {
        0 => {
            return Err(CloudError::ResourceNotFound {
                kind: "external network",
                name: external_network.to_string(),
            }
            .into());
        }
        1 => networks.remove(0),
        count => {
            return Err(CloudError::AmbiguousResource {
                kind: "external network",
                name: external_network.to_string(),
                count,
            }
            .into());
        }
    };
    if !network.is_external {
        return Err(CloudError::NotExternal(external_network.to_string()).into());
    }

    let images = provider.list_images(image).await?;
    let Some(first) = images.into_iter().next() else {
        return Err(CloudError::ResourceNotFound {
            kind: "image",
            name: image.to_string(),
        }
        .into());
    };

    tracing::debug!(
        external_network = %network.name,
        image = %first.name,
        "Preconditions hold"
    );

    Ok(Validated {
        external_network: network,
        image: first,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lakeflow_cloud::mock::MockCloud;

    #[tokio::test]
    async fn missing_external_network_fails() {
        let mock = MockCloud::new().with_image("CentOS-8-GenericCloud");
        let err = validate(&mock, "ext-net", "CentOS-8-GenericCloud")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No external network named 'ext-net'"));
        assert!(mock.mutations().is_empty());
    }

    #[tokio::test]
    async fn ambiguous_external_network_fails() {
        let mock = MockCloud::new()
            .with_external_network("ext-net")
            .with_external_network("ext-net")
            .with_image("CentOS-8-GenericCloud");
        let err = validate(&mock, "ext-net", "CentOS-8-GenericCloud")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("expected exactly one"));
        assert!(mock.mutations().is_empty());
    }

    #[tokio::test]
    async fn non_external_network_fails() {
        let mock = MockCloud::new()
            .with_network("ext-net")
            .with_image("CentOS-8-GenericCloud");
        let err = validate(&mock, "ext-net", "CentOS-8-GenericCloud")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not flagged as external"));
    }

    #[tokio::test]
    async fn missing_image_fails() {
        let mock = MockCloud::new().with_external_network("ext-net");
        let err = validate(&mock, "ext-net", "CentOS-8-GenericCloud")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No image named"));
    }

    #[tokio::test]
    async fn valid_preconditions_pass() {
        let mock = MockCloud::new()
            .with_external_network("ext-net")
            .with_image("CentOS-8-GenericCloud");
        let validated = validate(&mock, "ext-net", "CentOS-8-GenericCloud")
            .await
            .unwrap();
        assert!(validated.external_network.is_external);
        assert_eq!(validated.image.name, "CentOS-8-GenericCloud");
        assert!(mock.mutations().is_empty());
    }
}
