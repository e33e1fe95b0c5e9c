use capmap_client::client::aggregate_applications;
use capmap_client::error::Result;
use capmap_client::{ApplicationMap, CapabilityClient, CapabilityNode, CollisionPolicy};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

/// Options for configuring a capability walk
pub struct WalkOptions {
    pub root_id: String,
    pub collision: CollisionPolicy,
    pub show_progress: bool,
}

impl WalkOptions {
    pub fn new(root_id: impl Into<String>) -> Self {
        Self {
            root_id: root_id.into(),
            collision: CollisionPolicy::Overwrite,
            show_progress: false,
        }
    }
}

/// Everything a finished walk produced
#[derive(Debug, Clone)]
pub struct WalkOutcome {
    pub root_id: String,
    pub nodes_fetched: usize,
    pub applications: ApplicationMap,
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Starting walk...");
    pb
}

/// Hook a spinner into the client's per-visit callback, if asked to
fn attach_progress(
    client: CapabilityClient,
    show_progress: bool,
) -> (CapabilityClient, Option<Arc<ProgressBar>>) {
    if !show_progress {
        return (client, None);
    }

    let pb = Arc::new(spinner());
    let pb_clone = pb.clone();
    let client = client.with_progress_callback(Arc::new(move |count: usize, id: String| {
        pb_clone.set_message(format!("Walking... {} capabilities visited ({})", count, id));
    }));
    (client, Some(pb))
}

async fn walk_nodes(
    client: CapabilityClient,
    root_id: &str,
    show_progress: bool,
) -> Result<Vec<CapabilityNode>> {
    let (client, progress_bar) = attach_progress(client, show_progress);

    let nodes = client.collect_subtree(root_id).await;

    if let Some(ref pb) = progress_bar {
        match nodes {
            Ok(ref nodes) => {
                pb.finish_with_message(format!("Walk complete! {} capabilities fetched", nodes.len()))
            }
            Err(_) => pb.finish_and_clear(),
        }
    }

    nodes
}

/// Walk the tree under `options.root_id` and build the application map.
/// Any fetch failure aborts the walk; no partial map is returned.
pub async fn execute_walk(client: CapabilityClient, options: WalkOptions) -> Result<WalkOutcome> {
    let WalkOptions {
        root_id,
        collision,
        show_progress,
    } = options;

    let nodes = walk_nodes(client, &root_id, show_progress).await?;
    let nodes_fetched = nodes.len();
    let applications = aggregate_applications(nodes, collision)?;

    Ok(WalkOutcome {
        root_id,
        nodes_fetched,
        applications,
    })
}

/// Walk the tree under `root_id` and return the nodes in visit order
pub async fn execute_tree(
    client: CapabilityClient,
    root_id: &str,
    show_progress: bool,
) -> Result<Vec<CapabilityNode>> {
    walk_nodes(client, root_id, show_progress).await
}
