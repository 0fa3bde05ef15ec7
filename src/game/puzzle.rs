//! Puzzle generation
//!
//! Pure with respect to the supplied RNG: the same seed and catalog always
//! produce the same puzzle.

use rand::Rng;
use rand::seq::{SliceRandom, index};

use crate::catalog::{Asset, AssetId, Catalog, PuzzleKind, PuzzleSchema};
use crate::consts::OPTION_COUNT;
use crate::error::{GameError, Result};

/// One cell of the sudoku grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Icon(String),
    /// The cell the child has to fill
    Unknown,
}

/// Type-specific display data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleMeta {
    None,
    /// 2x2 grid in reading order, exactly one cell unknown
    Grid([Cell; 4]),
}

/// A fully specified round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleInstance {
    pub schema: PuzzleSchema,
    pub target: Asset,
    /// Answer buttons in display order; contains `target` exactly once
    pub options: Vec<Asset>,
    pub meta: PuzzleMeta,
}

impl PuzzleInstance {
    pub fn kind(&self) -> &PuzzleKind {
        &self.schema.kind
    }

    pub fn is_correct(&self, id: &AssetId) -> bool {
        self.target.id == *id
    }

    pub fn option(&self, id: &AssetId) -> Option<&Asset> {
        self.options.iter().find(|a| a.id == *id)
    }
}

/// Build a random puzzle from the catalog
pub fn generate<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> Result<PuzzleInstance> {
    catalog.check()?;

    let schema = catalog.schemas[rng.random_range(0..catalog.schemas.len())].clone();

    let puzzle = match schema.kind {
        PuzzleKind::Sudoku => sudoku(schema, catalog, rng),
        PuzzleKind::Symmetry => {
            let pool: Vec<&Asset> = catalog.other_assets().collect();
            if pool.is_empty() {
                return Err(GameError::InsufficientCatalog(
                    "symmetry puzzle needs a non-color asset".to_string(),
                ));
            }
            let target = pool[rng.random_range(0..pool.len())].clone();
            pick_the_target(schema, target, catalog, rng)
        }
        PuzzleKind::Shadow | PuzzleKind::Other(_) => {
            let target = catalog.assets[rng.random_range(0..catalog.assets.len())].clone();
            pick_the_target(schema, target, catalog, rng)
        }
    };

    log::debug!(
        "Generated {} puzzle, target {}",
        puzzle.schema.kind.as_str(),
        puzzle.target.id
    );
    Ok(puzzle)
}

/// Grid `[A, B, B, ?]`: the missing cell is A
fn sudoku<R: Rng + ?Sized>(schema: PuzzleSchema, catalog: &Catalog, rng: &mut R) -> PuzzleInstance {
    let colors: Vec<&Asset> = catalog.color_assets().collect();
    let picked = index::sample(rng, colors.len(), 2);
    let a = colors[picked.index(0)].clone();
    let b = colors[picked.index(1)].clone();

    let meta = PuzzleMeta::Grid([
        Cell::Icon(a.icon.clone()),
        Cell::Icon(b.icon.clone()),
        Cell::Icon(b.icon.clone()),
        Cell::Unknown,
    ]);

    let mut options = vec![a.clone(), b];
    options.shuffle(rng);

    PuzzleInstance {
        schema,
        target: a,
        options,
        meta,
    }
}

/// Target plus two distinct distractors from the rest of the catalog
fn pick_the_target<R: Rng + ?Sized>(
    schema: PuzzleSchema,
    target: Asset,
    catalog: &Catalog,
    rng: &mut R,
) -> PuzzleInstance {
    let rest: Vec<&Asset> = catalog.assets.iter().filter(|a| a.id != target.id).collect();

    let mut options = Vec::with_capacity(OPTION_COUNT);
    options.push(target.clone());
    options.extend(
        index::sample(rng, rest.len(), OPTION_COUNT - 1)
            .into_iter()
            .map(|i| rest[i].clone()),
    );
    options.shuffle(rng);

    PuzzleInstance {
        schema,
        target,
        options,
        meta: PuzzleMeta::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::collections::HashSet;

    fn asset(id: &str, kind: &str, icon: &str) -> Asset {
        Asset {
            id: id.into(),
            kind: kind.to_string(),
            icon: icon.to_string(),
        }
    }

    fn schema(kind: PuzzleKind) -> PuzzleSchema {
        PuzzleSchema {
            kind,
            instruction: "Ayo pilih!".to_string(),
        }
    }

    fn catalog_with(kinds: Vec<PuzzleKind>) -> Catalog {
        Catalog {
            schemas: kinds.into_iter().map(schema).collect(),
            assets: vec![
                asset("red", "color", "🟥"),
                asset("blue", "color", "🟦"),
                asset("green", "color", "🟩"),
                asset("cat", "animal", "🐱"),
                asset("dog", "animal", "🐶"),
                asset("tree", "nature", "🌳"),
            ],
        }
    }

    fn assert_pick_the_target(puzzle: &PuzzleInstance) {
        assert_eq!(puzzle.options.len(), 3);
        let ids: HashSet<_> = puzzle.options.iter().map(|a| a.id.clone()).collect();
        assert_eq!(ids.len(), 3, "duplicate option ids");
        let hits = puzzle
            .options
            .iter()
            .filter(|a| a.id == puzzle.target.id)
            .count();
        assert_eq!(hits, 1);
        assert_eq!(puzzle.meta, PuzzleMeta::None);
    }

    #[test]
    fn test_generic_puzzles_have_three_distinct_options() {
        let catalog = catalog_with(vec![PuzzleKind::Other("phi_match".to_string())]);
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..500 {
            let puzzle = generate(&catalog, &mut rng).unwrap();
            assert_pick_the_target(&puzzle);
        }
    }

    #[test]
    fn test_symmetry_target_is_never_a_color() {
        let catalog = catalog_with(vec![PuzzleKind::Symmetry]);
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..500 {
            let puzzle = generate(&catalog, &mut rng).unwrap();
            assert!(!puzzle.target.is_color());
            assert_pick_the_target(&puzzle);
        }
    }

    #[test]
    fn test_sudoku_grid_and_options() {
        let catalog = catalog_with(vec![PuzzleKind::Sudoku]);
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..500 {
            let puzzle = generate(&catalog, &mut rng).unwrap();
            assert_eq!(puzzle.options.len(), 2);
            assert!(puzzle.options.iter().all(|a| a.is_color()));

            let other = puzzle
                .options
                .iter()
                .find(|a| a.id != puzzle.target.id)
                .unwrap();
            assert_eq!(
                puzzle.meta,
                PuzzleMeta::Grid([
                    Cell::Icon(puzzle.target.icon.clone()),
                    Cell::Icon(other.icon.clone()),
                    Cell::Icon(other.icon.clone()),
                    Cell::Unknown,
                ])
            );
        }
    }

    #[test]
    fn test_same_seed_same_puzzle() {
        let catalog = catalog_with(vec![
            PuzzleKind::Sudoku,
            PuzzleKind::Symmetry,
            PuzzleKind::Shadow,
        ]);
        let mut a = Pcg32::seed_from_u64(99);
        let mut b = Pcg32::seed_from_u64(99);
        for _ in 0..50 {
            assert_eq!(
                generate(&catalog, &mut a).unwrap(),
                generate(&catalog, &mut b).unwrap()
            );
        }
    }

    #[test]
    fn test_every_schema_gets_picked() {
        let catalog = catalog_with(vec![
            PuzzleKind::Sudoku,
            PuzzleKind::Symmetry,
            PuzzleKind::Shadow,
        ]);
        let mut rng = Pcg32::seed_from_u64(5);
        let kinds: HashSet<String> = (0..300)
            .map(|_| generate(&catalog, &mut rng).unwrap().kind().as_str().to_string())
            .collect();
        assert_eq!(kinds.len(), 3);
    }

    #[test]
    fn test_target_position_is_uniform() {
        // Exactly three assets: every option set is the whole catalog, so only
        // the shuffle decides where the target lands.
        let catalog = Catalog {
            schemas: vec![schema(PuzzleKind::Other("phi_match".to_string()))],
            assets: vec![
                asset("red", "color", "🟥"),
                asset("blue", "color", "🟦"),
                asset("cat", "animal", "🐱"),
            ],
        };
        let mut rng = Pcg32::seed_from_u64(2024);
        let mut slots = [0u32; 3];
        for _ in 0..3000 {
            let puzzle = generate(&catalog, &mut rng).unwrap();
            let pos = puzzle
                .options
                .iter()
                .position(|a| a.id == puzzle.target.id)
                .unwrap();
            slots[pos] += 1;
        }
        for count in slots {
            assert!((800..1200).contains(&count), "skewed shuffle: {:?}", slots);
        }
    }

    #[test]
    fn test_insufficient_catalog() {
        let mut catalog = catalog_with(vec![PuzzleKind::Sudoku]);
        catalog.assets.retain(|a| !a.is_color() || a.id.as_str() == "red");
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(matches!(
            generate(&catalog, &mut rng),
            Err(GameError::InsufficientCatalog(_))
        ));
    }

    #[test]
    fn test_symmetry_without_pictures_fails() {
        let mut catalog = catalog_with(vec![PuzzleKind::Symmetry]);
        catalog.assets.retain(|a| a.is_color());
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(matches!(
            generate(&catalog, &mut rng),
            Err(GameError::InsufficientCatalog(_))
        ));
    }

    #[test]
    fn test_answer_lookup() {
        let catalog = catalog_with(vec![PuzzleKind::Shadow]);
        let mut rng = Pcg32::seed_from_u64(8);
        let puzzle = generate(&catalog, &mut rng).unwrap();
        assert!(puzzle.is_correct(&puzzle.target.id));
        assert!(puzzle.option(&puzzle.target.id).is_some());
        assert!(puzzle.option(&AssetId::from("nope")).is_none());
    }

    proptest! {
        #[test]
        fn prop_any_seed_yields_valid_puzzle(seed in any::<u64>()) {
            let catalog = catalog_with(vec![
                PuzzleKind::Sudoku,
                PuzzleKind::Symmetry,
                PuzzleKind::Other("phi_match".to_string()),
            ]);
            let mut rng = Pcg32::seed_from_u64(seed);
            let puzzle = generate(&catalog, &mut rng).unwrap();
            let expected = if puzzle.schema.kind == PuzzleKind::Sudoku { 2 } else { 3 };
            prop_assert_eq!(puzzle.options.len(), expected);
            let ids: HashSet<_> = puzzle.options.iter().map(|a| a.id.clone()).collect();
            prop_assert_eq!(ids.len(), expected);
            prop_assert!(puzzle.option(&puzzle.target.id).is_some());
        }
    }
}
