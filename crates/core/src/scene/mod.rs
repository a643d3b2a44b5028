//! Scene/template host model.
//!
//! The binding registry never talks to a live editor directly; it works
//! against this small model of the host's data:
//! - `TemplateAsset`: the reusable node hierarchy (one YAML file per asset).
//! - `LiveInstance`: an instantiated copy whose nodes remember which template
//!   node they came from.
//! - `TemplateStore`: lookup of template assets by identity.
//!
//! Identity resolution on top of these types lives in [`identity`].

pub mod identity;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use identity::{
    refresh_after_structural_change, resolve_path_relative, resolve_stable_id, IdentityError,
    ResolvedIdentity, StaleEntry,
};

/// Sentinel stored in a binding's relative path when the target *is* the
/// binding set's root node.
pub const ROOT_SENTINEL: &str = "[ROOT]";

/// Durable identifier of a node within a template asset.
///
/// Display names collide and nodes move; this is the value that survives
/// both. It maps to the host's per-node file id and is the only field the
/// registry trusts as identity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct StableId(pub u64);

impl fmt::Display for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a template asset, stable across instances of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct TemplateAssetId(pub String);

impl TemplateAssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateAssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TemplateAssetId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One node in a template asset's hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateNode {
    pub stable_id: StableId,
    pub name: String,
    /// Qualified type names of the capabilities attached to this node.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TemplateNode>,
    /// Set when this node is itself an instance of another template asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_template: Option<TemplateAssetId>,
}

impl TemplateNode {
    pub fn new(stable_id: StableId, name: impl Into<String>) -> Self {
        Self {
            stable_id,
            name: name.into(),
            capabilities: Vec::new(),
            children: Vec::new(),
            nested_template: None,
        }
    }

    /// Builder-style helper to attach a capability qualified name.
    pub fn with_capability(mut self, qualified: impl Into<String>) -> Self {
        self.capabilities.push(qualified.into());
        self
    }

    /// Builder-style helper to append a child node.
    pub fn with_child(mut self, child: TemplateNode) -> Self {
        self.children.push(child);
        self
    }

    /// Whether a capability with the given qualified name is attached here.
    pub fn has_capability(&self, qualified: &str) -> bool {
        self.capabilities.iter().any(|c| c == qualified)
    }

    /// Walk a `/`-separated display-name path below this node.
    ///
    /// An empty path or the ROOT sentinel returns this node itself.
    pub fn find_by_path(&self, path: &str) -> Option<&TemplateNode> {
        if path.is_empty() || path == ROOT_SENTINEL {
            return Some(self);
        }
        let mut current = self;
        for segment in path.split('/') {
            current = current.children.iter().find(|c| c.name == segment)?;
        }
        Some(current)
    }
}

/// A reusable template asset: an identity plus a node hierarchy.
///
/// On disk this is one YAML document per asset (see
/// [`TemplateAsset::from_yaml`]); in the editor host it corresponds to the
/// prefab-like source the live instances are kept in sync with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateAsset {
    pub id: TemplateAssetId,
    pub root: TemplateNode,
}

impl TemplateAsset {
    pub fn new(id: impl Into<TemplateAssetId>, root: TemplateNode) -> Self {
        Self { id: id.into(), root }
    }

    /// Parse a template asset from its YAML representation.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Serialize the asset back to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// All nodes in preorder, root first.
    pub fn nodes(&self) -> Vec<&TemplateNode> {
        let mut out = Vec::new();
        collect_nodes(&self.root, &mut out);
        out
    }

    /// Look up a node anywhere in the hierarchy by its durable identifier.
    pub fn node(&self, id: StableId) -> Option<&TemplateNode> {
        self.nodes().into_iter().find(|n| n.stable_id == id)
    }

    pub fn contains(&self, id: StableId) -> bool {
        self.node(id).is_some()
    }

    /// Stable ids that appear more than once in the hierarchy.
    ///
    /// A well-formed asset has none; authored YAML is checked with this
    /// before registration.
    pub fn duplicate_stable_ids(&self) -> Vec<StableId> {
        let mut seen = HashMap::new();
        for node in self.nodes() {
            *seen.entry(node.stable_id).or_insert(0u32) += 1;
        }
        let mut dupes: Vec<StableId> =
            seen.into_iter().filter(|(_, count)| *count > 1).map(|(id, _)| id).collect();
        dupes.sort();
        dupes
    }

    /// Display-name path from (and including) the asset root down to `target`.
    pub fn absolute_path(&self, target: StableId) -> Option<String> {
        let mut trail = Vec::new();
        if find_trail(&self.root, target, &mut trail) {
            Some(trail.join("/"))
        } else {
            None
        }
    }

    /// Display-name path from the node at `root` down to `target`, excluding
    /// the root's own name. Returns the ROOT sentinel when the two coincide,
    /// and `None` when either id is unknown or `target` is not below `root`.
    pub fn relative_path(&self, root: StableId, target: StableId) -> Option<String> {
        if root == target {
            return self.contains(root).then(|| ROOT_SENTINEL.to_string());
        }
        let start = self.node(root)?;
        let mut trail = Vec::new();
        if find_trail(start, target, &mut trail) {
            // The trail includes the starting node's own name; drop it.
            Some(trail[1..].join("/"))
        } else {
            None
        }
    }
}

fn collect_nodes<'a>(node: &'a TemplateNode, out: &mut Vec<&'a TemplateNode>) {
    out.push(node);
    for child in &node.children {
        collect_nodes(child, out);
    }
}

fn find_trail(node: &TemplateNode, target: StableId, trail: &mut Vec<String>) -> bool {
    trail.push(node.name.clone());
    if node.stable_id == target {
        return true;
    }
    for child in &node.children {
        if find_trail(child, target, trail) {
            return true;
        }
    }
    trail.pop();
    false
}

/// One node of a live, instantiated copy of a template.
///
/// `name` is the instance-local display name and may drift from the template;
/// `source_id` is the correspondence back to the template node and never
/// changes while the instance stays connected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<StableId>,
    /// Which template asset `source_id` belongs to, when this subtree wraps a
    /// nested template instance. `None` means the owning instance's template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_template: Option<TemplateAssetId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LiveNode>,
}

impl LiveNode {
    /// Depth-first search for the live node corresponding to a stable id.
    pub fn find_by_source(&self, id: StableId) -> Option<&LiveNode> {
        if self.source_id == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_source(id))
    }

    /// Mutable lookup by correspondence, used by hosts applying local edits.
    pub fn find_by_source_mut(&mut self, id: StableId) -> Option<&mut LiveNode> {
        if self.source_id == Some(id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_by_source_mut(id))
    }
}

/// A live instance of a template asset, positioned somewhere in a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveInstance {
    pub template: TemplateAssetId,
    /// Full display-name path from the scene root to the instance root.
    pub path_in_scene: String,
    pub root: LiveNode,
}

impl LiveInstance {
    /// Create a pristine instance mirroring the asset's structure one-to-one.
    pub fn instantiate(asset: &TemplateAsset, path_in_scene: impl Into<String>) -> Self {
        Self {
            template: asset.id.clone(),
            path_in_scene: path_in_scene.into(),
            root: mirror_node(&asset.root),
        }
    }
}

fn mirror_node(node: &TemplateNode) -> LiveNode {
    LiveNode {
        name: node.name.clone(),
        source_id: Some(node.stable_id),
        source_template: node.nested_template.clone(),
        children: node.children.iter().map(mirror_node).collect(),
    }
}

/// Lookup of template assets by identity.
///
/// The editor host backs this with its asset database; tests and the CLI use
/// [`InMemoryTemplateStore`] filled from YAML files.
pub trait TemplateStore {
    fn template(&self, id: &TemplateAssetId) -> Option<&TemplateAsset>;

    fn template_ids(&self) -> Vec<TemplateAssetId>;
}

/// Simple map-backed template store.
#[derive(Debug, Default)]
pub struct InMemoryTemplateStore {
    templates: HashMap<TemplateAssetId, TemplateAsset>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an asset, replacing any previous asset with the same id.
    pub fn insert(&mut self, asset: TemplateAsset) {
        self.templates.insert(asset.id.clone(), asset);
    }
}

impl TemplateStore for InMemoryTemplateStore {
    fn template(&self, id: &TemplateAssetId) -> Option<&TemplateAsset> {
        self.templates.get(id)
    }

    fn template_ids(&self) -> Vec<TemplateAssetId> {
        let mut ids: Vec<TemplateAssetId> = self.templates.keys().cloned().collect();
        ids.sort_by(|a, b| a.0.cmp(&b.0));
        ids
    }
}
