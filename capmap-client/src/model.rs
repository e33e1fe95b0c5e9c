use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Capability name to the applications linked to it, in the order names were
/// first visited. Re-inserting a name replaces its value in place.
pub type ApplicationMap = IndexMap<String, Vec<Application>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub lifecycle_phase: Option<String>,
}

impl Application {
    pub fn new(id: &str, name: &str, lifecycle_phase: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            lifecycle_phase: lifecycle_phase.map(str::to_string),
        }
    }

    pub fn phase_or_unknown(&self) -> &str {
        self.lifecycle_phase.as_deref().unwrap_or("unknown")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityNode {
    pub id: String,
    pub name: String,
    pub children: Vec<CapabilityRef>,
    pub applications: Vec<Application>,
}

impl CapabilityNode {
    pub fn child_ids(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|c| c.id.as_str())
    }
}

// Wire shapes of the Pathfinder response. Lists the API sends as `null` or
// leaves out decode as empty.

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CapabilityData {
    #[serde(default)]
    pub business_capability: Option<RawCapability>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawCapability {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub children: Option<Vec<CapabilityRef>>,
    #[serde(default)]
    pub applications: Option<Connection<Application>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Connection<T> {
    pub edges: Option<Vec<Edge<T>>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Edge<T> {
    pub node: T,
}

impl From<RawCapability> for CapabilityNode {
    fn from(raw: RawCapability) -> Self {
        let applications = raw
            .applications
            .and_then(|conn| conn.edges)
            .unwrap_or_default()
            .into_iter()
            .map(|edge| edge.node)
            .collect();

        Self {
            id: raw.id,
            name: raw.name,
            children: raw.children.unwrap_or_default(),
            applications,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> GraphqlResponse<CapabilityData> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_decode_full_capability() {
        let response = decode(json!({
            "data": {
                "businessCapability": {
                    "id": "bc-1",
                    "name": "Payments",
                    "children": [{"id": "bc-2", "name": "Billing"}],
                    "applications": {
                        "edges": [
                            {"node": {"id": "app-1", "name": "Ledger", "lifecyclePhase": "active"}},
                            {"node": {"id": "app-2", "name": "Mainframe", "lifecyclePhase": "endOfLife"}}
                        ]
                    }
                }
            }
        }));

        assert!(response.errors.is_none());
        let raw = response.data.unwrap().business_capability.unwrap();
        let node = CapabilityNode::from(raw);

        assert_eq!(node.id, "bc-1");
        assert_eq!(node.name, "Payments");
        assert_eq!(node.child_ids().collect::<Vec<_>>(), vec!["bc-2"]);
        assert_eq!(node.applications.len(), 2);
        assert_eq!(node.applications[0].name, "Ledger");
        assert_eq!(node.applications[1].phase_or_unknown(), "endOfLife");
    }

    #[test]
    fn test_decode_null_lists_as_empty() {
        let response = decode(json!({
            "data": {
                "businessCapability": {
                    "id": "bc-1",
                    "name": "Leaf",
                    "children": null,
                    "applications": {"edges": null}
                }
            }
        }));

        let node = CapabilityNode::from(response.data.unwrap().business_capability.unwrap());
        assert!(node.children.is_empty());
        assert!(node.applications.is_empty());
    }

    #[test]
    fn test_decode_missing_lists_as_empty() {
        let response = decode(json!({
            "data": {"businessCapability": {"id": "bc-1", "name": "Bare"}}
        }));

        let node = CapabilityNode::from(response.data.unwrap().business_capability.unwrap());
        assert!(node.children.is_empty());
        assert!(node.applications.is_empty());
    }

    #[test]
    fn test_decode_connection_without_edges() {
        let response = decode(json!({
            "data": {
                "businessCapability": {"id": "bc-1", "name": "Hollow", "applications": {}}
            }
        }));

        let node = CapabilityNode::from(response.data.unwrap().business_capability.unwrap());
        assert!(node.applications.is_empty());
    }

    #[test]
    fn test_decode_child_without_name() {
        let response = decode(json!({
            "data": {
                "businessCapability": {
                    "id": "bc-1",
                    "name": "Parent",
                    "children": [{"id": "bc-2", "name": null}, {"id": "bc-3"}]
                }
            }
        }));

        let node = CapabilityNode::from(response.data.unwrap().business_capability.unwrap());
        assert_eq!(node.child_ids().collect::<Vec<_>>(), vec!["bc-2", "bc-3"]);
        assert!(node.children.iter().all(|c| c.name.is_none()));
    }

    #[test]
    fn test_decode_absent_capability() {
        let response = decode(json!({"data": {"businessCapability": null}}));
        assert!(response.data.unwrap().business_capability.is_none());
    }

    #[test]
    fn test_missing_lifecycle_phase() {
        let app: Application =
            serde_json::from_value(json!({"id": "app-9", "name": "Shadow IT"})).unwrap();
        assert_eq!(app.lifecycle_phase, None);
        assert_eq!(app.phase_or_unknown(), "unknown");
    }

    #[test]
    fn test_application_serializes_remote_field_names() {
        let app = Application::new("1", "App1", Some("active"));
        let value = serde_json::to_value(&app).unwrap();
        assert_eq!(value, json!({"id": "1", "name": "App1", "lifecyclePhase": "active"}));
    }
}
