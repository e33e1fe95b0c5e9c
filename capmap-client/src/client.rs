use crate::error::{ClientError, Result};
use crate::model::{ApplicationMap, CapabilityData, CapabilityNode, GraphqlResponse};
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// One capability with its direct children and linked applications. The
/// `edges { node { .. } }` nesting mirrors the Pathfinder schema.
pub const BUSINESS_CAPABILITY_QUERY: &str = r#"
query($bcId: ID!) {
  businessCapability(id: $bcId) {
    id
    name
    children {
      id
      name
    }
    applications {
      edges {
        node {
          id
          name
          lifecyclePhase
        }
      }
    }
  }
}
"#;

/// What to do when two distinct capabilities share a display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// The capability visited last replaces the earlier entry.
    #[default]
    Overwrite,
    /// Abort with [`ClientError::NameCollision`].
    Fail,
}

pub fn endpoint_for_tenant(tenant: &str) -> Result<Url> {
    let tenant = tenant.trim();
    if tenant.is_empty() {
        return Err(ClientError::InvalidTenant("tenant must not be empty".to_string()));
    }
    Url::parse(&format!(
        "https://{}.leanix.net/services/pathfinder/v1/graphql",
        tenant
    ))
    .map_err(|e| ClientError::InvalidTenant(format!("{}: {}", tenant, e)))
}

pub struct CapabilityClient {
    client: Client,
    endpoint: Url,
    headers: HeaderMap,
    timeout: Option<Duration>,
    collision_policy: CollisionPolicy,
    progress_callback: Option<ProgressCallback>,
}

impl CapabilityClient {
    pub fn new(tenant: &str, token: &str) -> Result<Self> {
        let endpoint = endpoint_for_tenant(tenant)?;
        let headers = Self::auth_headers(token)?;
        let client = Self::build_http_client(&headers, None)?;

        Ok(Self {
            client,
            endpoint,
            headers,
            timeout: None,
            collision_policy: CollisionPolicy::default(),
            progress_callback: None,
        })
    }

    /// Headers sent with every request, built once per client.
    fn auth_headers(token: &str) -> Result<HeaderMap> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ClientError::InvalidToken("token must not be empty".to_string()));
        }

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ClientError::InvalidToken("token contains invalid characters".to_string()))?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn build_http_client(headers: &HeaderMap, timeout: Option<Duration>) -> Result<Client> {
        let mut builder = Client::builder()
            .user_agent(concat!("capmap/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers.clone());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }

    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Without a timeout the transport default applies.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Self::build_http_client(&self.headers, Some(timeout))?;
        self.timeout = Some(timeout);
        Ok(self)
    }

    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn collision_policy(&self) -> CollisionPolicy {
        self.collision_policy
    }

    /// Fetch a single capability. `Ok(None)` means the id does not exist.
    pub async fn fetch_node(&self, node_id: &str) -> Result<Option<CapabilityNode>> {
        debug!("Fetching business capability {}", node_id);

        let body = json!({
            "query": BUSINESS_CAPABILITY_QUERY,
            "variables": { "bcId": node_id },
        });

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        // `data` stays untyped until `errors` is ruled out: partial data next
        // to errors may carry nulls the typed shape rejects.
        let payload: GraphqlResponse<Value> = response.json().await?;

        if let Some(errors) = payload.errors {
            return Err(ClientError::Query(errors));
        }

        let data = payload.data.ok_or_else(|| {
            ClientError::MalformedResponse(format!(
                "response for {} has neither data nor errors",
                node_id
            ))
        })?;

        let data: CapabilityData = serde_json::from_value(data).map_err(|e| {
            ClientError::MalformedResponse(format!(
                "unexpected data shape for {}: {}",
                node_id, e
            ))
        })?;

        Ok(data.business_capability.map(CapabilityNode::from))
    }

    /// Depth-first walk from `root_id`, returning nodes in visit order.
    ///
    /// Every id is fetched at most once. Ids that resolve to nothing are
    /// skipped. The first error aborts the walk and nothing is returned.
    pub async fn collect_subtree(&self, root_id: &str) -> Result<Vec<CapabilityNode>> {
        info!("Starting capability walk from {}", root_id);

        let mut stack: Vec<String> = vec![root_id.to_string()];
        let mut visited: HashSet<String> = HashSet::new();
        let mut nodes = Vec::new();

        while let Some(current_id) = stack.pop() {
            if !visited.insert(current_id.clone()) {
                debug!("Already visited {}, skipping", current_id);
                continue;
            }

            if let Some(ref callback) = self.progress_callback {
                callback(visited.len(), current_id.clone());
            }

            let Some(node) = self.fetch_node(&current_id).await? else {
                debug!("Capability {} not found, skipping", current_id);
                continue;
            };

            for child_id in node.child_ids() {
                debug!("Queuing child {} of {}", child_id, node.id);
                stack.push(child_id.to_string());
            }
            nodes.push(node);
        }

        info!(
            "Capability walk complete. Fetched {} nodes ({} ids visited)",
            nodes.len(),
            visited.len()
        );
        Ok(nodes)
    }

    /// Walk the tree under `root_id` and map each capability name to its
    /// applications.
    pub async fn build_application_map(&self, root_id: &str) -> Result<ApplicationMap> {
        let nodes = self.collect_subtree(root_id).await?;
        aggregate_applications(nodes, self.collision_policy)
    }
}

/// Fold visited nodes into a name-keyed map, honoring `policy` when two
/// nodes share a name.
pub fn aggregate_applications(
    nodes: Vec<CapabilityNode>,
    policy: CollisionPolicy,
) -> Result<ApplicationMap> {
    let mut apps_map = ApplicationMap::new();
    let mut owners: HashMap<String, String> = HashMap::new();

    for node in nodes {
        if let Some(previous_id) = owners.get(&node.name)
            && *previous_id != node.id
        {
            match policy {
                CollisionPolicy::Fail => {
                    return Err(ClientError::NameCollision {
                        name: node.name,
                        first_id: previous_id.clone(),
                        second_id: node.id,
                    });
                }
                CollisionPolicy::Overwrite => {
                    warn!(
                        "Capability name '{}' shared by {} and {}; keeping the latter",
                        node.name, previous_id, node.id
                    );
                }
            }
        }

        owners.insert(node.name.clone(), node.id);
        apps_map.insert(node.name, node.applications);
    }

    Ok(apps_map)
}
