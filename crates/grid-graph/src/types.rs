//! Derived spatial types. None of these are stored; they are recomputed
//! from the primitive set and cached by `primitiveRevision`.

use grid_geom::{Aabb, Category, Vec2Xz};
use serde::{Deserialize, Serialize};

/// Tally of how many primitives in a cluster fall into each non-`mixed`
/// category. Linear-scan backed: there are only five categories that a
/// single primitive can carry (`mixed` is a cluster-level summary, never a
/// per-primitive one), so a `Vec` beats a hash map here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryCounts(pub Vec<(Category, u32)>);

impl CategoryCounts {
    /// Increments the count for `category`.
    pub fn increment(&mut self, category: Category) {
        if let Some(entry) = self.0.iter_mut().find(|(c, _)| *c == category) {
            entry.1 += 1;
        } else {
            self.0.push((category, 1));
        }
    }

    /// Total primitives tallied.
    pub fn total(&self) -> u32 {
        self.0.iter().map(|(_, n)| n).sum()
    }

    /// The category with a plurality share, if it holds at least 35% of
    /// the total; otherwise [`Category::Mixed`].
    pub fn dominant(&self) -> Category {
        let total = self.total();
        if total == 0 {
            return Category::Mixed;
        }
        self.0
            .iter()
            .max_by_key(|(_, n)| *n)
            .filter(|(_, n)| f64::from(*n) / f64::from(total) >= 0.35)
            .map_or(Category::Mixed, |(c, _)| *c)
    }

    /// Categories from the fixed five-category universe that never
    /// appeared in this tally.
    pub fn missing(&self) -> Vec<Category> {
        const UNIVERSE: [Category; 5] = [
            Category::Architecture,
            Category::Infrastructure,
            Category::Technology,
            Category::Art,
            Category::Nature,
        ];
        UNIVERSE
            .into_iter()
            .filter(|c| !self.0.iter().any(|(seen, _)| seen == c))
            .collect()
    }
}

/// A connected component of non-connector primitives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    /// Position of this structure within the summary's `structures` list;
    /// stable within one `analyze` call, used by [`super::NodeEdge`]/
    /// settlement clustering to refer back without copying geometry.
    pub index: u32,
    /// Equal-weight centroid of member primitives.
    pub centroid: Vec2Xz,
    /// Max over members of (centroid-to-primitive distance + primitive XZ
    /// radius).
    pub radius: f64,
    /// Count of member primitives.
    pub primitive_count: u32,
    /// Axis-aligned bounding box of every member.
    pub bbox: Aabb,
    /// XZ footprint area of `bbox`.
    pub footprint_area: f64,
    /// Agent ids that own at least one member primitive.
    pub builders: Vec<String>,
    /// Per-category tallies.
    pub categories: CategoryCounts,
    /// Dominant category, or `mixed`.
    pub dominant_category: Category,
    /// Indices into the primitive slice passed to `analyze`.
    pub primitive_indices: Vec<u32>,
}

/// Density tier of a settlement node, by structure count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    /// `< 6` structures.
    Settlement,
    /// `6..15` structures.
    Server,
    /// `15..25` structures.
    Forest,
    /// `25..50` structures.
    City,
    /// `50..100` structures.
    Metropolis,
    /// `>= 100` structures.
    Megaopolis,
}

impl Tier {
    /// Classifies a structure count using the `{6, 15, 25, 50, 100}`
    /// breakpoints.
    pub fn from_structure_count(count: u32) -> Self {
        match count {
            0..=5 => Tier::Settlement,
            6..=14 => Tier::Server,
            15..=24 => Tier::Forest,
            25..=49 => Tier::City,
            50..=99 => Tier::Metropolis,
            _ => Tier::Megaopolis,
        }
    }

    /// Label used in generated node names (`"<direction>-<label>-<n>"`).
    pub fn label(self) -> &'static str {
        match self {
            Tier::Settlement => "settlement",
            Tier::Server => "server",
            Tier::Forest => "forest",
            Tier::City => "city",
            Tier::Metropolis => "metropolis",
            Tier::Megaopolis => "megaopolis",
        }
    }

    /// Rank used to sort nodes most-developed first before assigning
    /// per-direction sequence numbers, so naming is stable under small
    /// perturbations.
    pub fn rank(self) -> u8 {
        self as u8
    }
}

/// A cluster of structures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementNode {
    /// Position within the summary's `nodes` list.
    pub index: u32,
    /// Deterministic generated name (compass direction + tier + sequence).
    pub name: String,
    /// Density tier.
    pub tier: Tier,
    /// Primitive-weighted centroid.
    pub centroid: Vec2Xz,
    /// Node radius (derived from member structures).
    pub radius: f64,
    /// Count of member structures.
    pub structure_count: u32,
    /// Dominant category across member structures' primitives.
    pub dominant_category: Category,
    /// Categories never observed in this node.
    pub missing_categories: Vec<Category>,
    /// Agent ids that own at least one primitive in this node.
    pub builders: Vec<String>,
    /// Indices into the summary's `structures` list.
    pub structure_indices: Vec<u32>,
    /// Indices of connected nodes, capped to the 5 nearest.
    pub connections: Vec<u32>,
}

/// An edge between two settlement nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeEdge {
    /// First node (lower index).
    pub a: u32,
    /// Second node (higher index).
    pub b: u32,
    /// Whether a connector primitive was detected along the segment.
    pub has_connector: bool,
    /// Center-to-center distance.
    pub distance: f64,
}

/// Classification of a sampled open area by distance to the nearest
/// primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OpenAreaKind {
    /// `12 <= nearestBuild < 34`.
    Growth,
    /// `34 <= nearestBuild < FRONTIER_MIN`.
    Connector,
    /// `FRONTIER_MIN <= nearestBuild <= min(FRONTIER_MAX, SETTLEMENT_MAX - 1)`.
    Frontier,
}

/// A sampled expansion candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenArea {
    /// Sample X coordinate.
    pub x: f64,
    /// Sample Z coordinate.
    pub z: f64,
    /// Distance to the nearest existing primitive.
    pub nearest_build: f64,
    /// Classification.
    pub kind: OpenAreaKind,
    /// Index of the nearest settlement node, if any exist yet.
    pub nearest_node_index: Option<u32>,
    /// Name of the nearest settlement node.
    pub nearest_node_name: Option<String>,
    /// Tier of the nearest settlement node.
    pub nearest_node_tier: Option<Tier>,
}

/// Full derived spatial summary for one `primitiveRevision`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpatialSummary {
    /// Primitive revision this summary was computed from.
    pub primitive_revision: u64,
    /// Connected components of non-connector primitives.
    pub structures: Vec<Structure>,
    /// Clusters of structures.
    pub nodes: Vec<SettlementNode>,
    /// Node-to-node edges.
    pub edges: Vec<NodeEdge>,
    /// Sampled expansion candidates.
    pub open_areas: Vec<OpenArea>,
}
