//! The blueprint catalog: named recipes of relatively-positioned primitives,
//! resolved to absolute coordinates against an anchor at `START`.

use grid_geom::{Shape, Vec3};
use grid_world::{BlueprintPhase, ResolvedPrimitive};

/// One primitive within a recipe, positioned relative to the anchor.
struct RecipePiece {
    dx: f64,
    dy: f64,
    dz: f64,
    shape: Shape,
    scale: Vec3,
    color: &'static str,
}

/// A named build recipe: an ordered list of pieces grouped into phases.
pub struct Recipe {
    /// Recipe name, matched case-sensitively against `BUILD_BLUEPRINT_START`.
    pub name: &'static str,
    phases: &'static [(&'static str, usize)],
    pieces: &'static [RecipePiece],
}

const BRIDGE_PIECES: [RecipePiece; 11] = [
    piece(0.0, 0.5, 0.0),
    piece(1.0, 0.5, 0.0),
    piece(2.0, 0.5, 0.0),
    piece(3.0, 0.5, 0.0),
    piece(4.0, 0.5, 0.0),
    piece(5.0, 0.5, 0.0),
    piece(0.0, 1.0, 0.0),
    piece(1.0, 1.0, 0.0),
    piece(2.0, 1.0, 0.0),
    piece(3.0, 1.0, 0.0),
    piece(4.0, 1.0, 0.0),
];

const fn piece(dx: f64, dy: f64, dz: f64) -> RecipePiece {
    RecipePiece {
        dx,
        dy,
        dz,
        shape: Shape::Box,
        scale: Vec3 { x: 1.0, y: 1.0, z: 1.0 },
        color: "#8a6d3b",
    }
}

const BRIDGE: Recipe = Recipe {
    name: "BRIDGE",
    phases: &[("deck", 6), ("rails", 5)],
    pieces: &BRIDGE_PIECES,
};

const WATCHTOWER_PIECES: [RecipePiece; 5] = [
    piece(0.0, 0.5, 0.0),
    piece(0.0, 1.5, 0.0),
    piece(0.0, 2.5, 0.0),
    piece(0.0, 3.5, 0.0),
    piece(0.0, 4.5, 0.0),
];

const WATCHTOWER: Recipe = Recipe {
    name: "WATCHTOWER",
    phases: &[("shaft", 5)],
    pieces: &WATCHTOWER_PIECES,
};

const CATALOG: [&Recipe; 2] = [&BRIDGE, &WATCHTOWER];

/// Looks up a recipe by name.
pub fn find(name: &str) -> Option<&'static Recipe> {
    CATALOG.iter().find(|r| r.name == name).copied()
}

impl Recipe {
    /// Total primitive count across every phase.
    pub fn total_primitives(&self) -> usize {
        self.pieces.len()
    }

    /// Resolves every piece against `anchor`, producing absolute positions.
    pub fn resolve(&self, anchor_x: f64, anchor_z: f64) -> Vec<ResolvedPrimitive> {
        self.pieces
            .iter()
            .map(|p| ResolvedPrimitive {
                shape: p.shape,
                position: Vec3::new(anchor_x + p.dx, p.dy, anchor_z + p.dz),
                rotation: Vec3::ZERO,
                scale: p.scale,
                color: p.color.to_string(),
            })
            .collect()
    }

    /// The phase breakdown, as owned values for the response payload.
    pub fn phases(&self) -> Vec<BlueprintPhase> {
        self.phases
            .iter()
            .map(|(name, count)| BlueprintPhase {
                name: (*name).to_string(),
                count: *count,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_recipe_matches_the_happy_path_scenario() {
        let recipe = find("BRIDGE").expect("BRIDGE is in the catalog");
        assert_eq!(recipe.total_primitives(), 11);
        assert_eq!(recipe.phases().iter().map(|p| p.count).sum::<usize>(), 11);
    }

    #[test]
    fn resolve_offsets_every_piece_from_the_anchor() {
        let recipe = find("BRIDGE").expect("BRIDGE is in the catalog");
        let resolved = recipe.resolve(120.0, 120.0);
        assert_eq!(resolved[0].position, Vec3::new(120.0, 0.5, 120.0));
        assert_eq!(resolved.len(), 11);
    }

    #[test]
    fn unknown_names_are_not_found() {
        assert!(find("NOT_A_RECIPE").is_none());
    }
}
