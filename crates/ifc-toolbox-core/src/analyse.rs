// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Required-product closures for partial extraction
//!
//! Copying only the selected spatial elements would leave an orphaned
//! fragment: the hierarchy and the project would be missing. The resolver
//! here turns a selection into the set of products an extraction must
//! carry.
//!
//! Two closures are offered:
//!
//! - **Downward** ([`ProductAnalyse::required_products`]): spatial seeds are
//!   replaced by everything contained in their aggregation subtree; other
//!   products are taken verbatim.
//! - **Ancestor chain** ([`ProductAnalyse::required_products_by_global_ids`]):
//!   spatial seeds are kept together with every product on their path to
//!   the root. [`AncestorMode::Compatible`] runs the downward closure
//!   instead, which is what older toolbox releases did for this entry point.

use crate::ProductSet;
use ifc_toolbox_model::{
    EntityGraph, EntityGraphExt, EntityId, ObjectDefinition, ObjectKind, Result,
};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Traversal used by the global-id closure
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AncestorMode {
    /// Keep the seed and follow parent links up to the root
    #[default]
    ParentChain,
    /// Expand the seed downward, like the label-based closure
    Compatible,
}

/// Reference to a seed entity
///
/// Text references are parsed as labels; text that is not a label is
/// dropped during resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SeedRef {
    /// Entity label
    Label(EntityId),
    /// Label in text form, e.g. "42" or "#42"
    Text(String),
}

impl SeedRef {
    /// Resolve to a label, if possible
    pub fn label(&self) -> Option<EntityId> {
        match self {
            SeedRef::Label(id) => Some(*id),
            SeedRef::Text(text) => EntityId::parse_label(text),
        }
    }
}

impl From<EntityId> for SeedRef {
    fn from(id: EntityId) -> Self {
        SeedRef::Label(id)
    }
}

impl From<u32> for SeedRef {
    fn from(id: u32) -> Self {
        SeedRef::Label(EntityId(id))
    }
}

impl From<&str> for SeedRef {
    fn from(text: &str) -> Self {
        SeedRef::Text(text.to_string())
    }
}

impl From<String> for SeedRef {
    fn from(text: String) -> Self {
        SeedRef::Text(text)
    }
}

impl From<&ObjectDefinition> for SeedRef {
    fn from(object: &ObjectDefinition) -> Self {
        SeedRef::Label(object.id)
    }
}

impl From<&Arc<ObjectDefinition>> for SeedRef {
    fn from(object: &Arc<ObjectDefinition>) -> Self {
        SeedRef::Label(object.id)
    }
}

/// Required-product resolver settings
///
/// # Example
///
/// ```ignore
/// use ifc_toolbox_core::{AncestorMode, ProductAnalyse};
///
/// let analyse = ProductAnalyse::new().with_ancestor_mode(AncestorMode::Compatible);
/// let products = analyse.required_products(&graph, ["412", "#518"]);
/// println!("{} products to copy", products.len());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductAnalyse {
    /// Traversal used by the global-id closure
    pub ancestor_mode: AncestorMode,
    /// Log per-seed summaries at info level instead of debug
    pub log_detail: bool,
}

impl ProductAnalyse {
    /// Create a resolver with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the global-id traversal
    pub fn with_ancestor_mode(mut self, mode: AncestorMode) -> Self {
        self.ancestor_mode = mode;
        self
    }

    /// Set whether per-seed summaries are logged at info level
    pub fn with_log_detail(mut self, enabled: bool) -> Self {
        self.log_detail = enabled;
        self
    }

    /// Downward closure of a seed selection
    ///
    /// Non-spatial products are taken as they are. A spatial seed
    /// contributes every product contained by it or by any object in its
    /// aggregation subtree, but not itself. Seeds that resolve to nothing,
    /// or to a non-product such as the project, are ignored.
    pub fn required_products<G, I, S>(&self, model: &G, seeds: I) -> ProductSet
    where
        G: EntityGraph + ?Sized,
        I: IntoIterator<Item = S>,
        S: Into<SeedRef>,
    {
        let mut closure = Closure::new(model);
        let mut seen = FxHashSet::default();

        for seed in seeds {
            let seed = seed.into();
            let Some(id) = seed.label() else {
                log::debug!("Dropping seed {:?}: not an entity label", seed);
                continue;
            };
            if !seen.insert(id) {
                continue;
            }
            let Some(object) = model.object(id) else {
                log::debug!("Dropping seed {}: no such entity", id);
                continue;
            };

            let added = match object.kind {
                ObjectKind::Spatial(_) => closure.expand_downward(id),
                ObjectKind::Element => usize::from(closure.products.insert(object.clone())),
                ObjectKind::Context => {
                    log::debug!("Dropping seed {}: {} is not a product", id, object.ifc_type);
                    continue;
                }
            };
            self.log_seed(&object, added);
        }

        log::debug!(
            "Downward closure: {} products from {} seeds",
            closure.products.len(),
            seen.len()
        );
        closure.products
    }

    /// Closure of the spatial products carrying the given global ids
    ///
    /// Every product with a matching global id that is a spatial structure
    /// element is resolved according to [`AncestorMode`]. Non-spatial
    /// matches and unknown ids contribute nothing.
    pub fn required_products_by_global_ids<G, I, S>(&self, model: &G, global_ids: I) -> ProductSet
    where
        G: EntityGraph + ?Sized,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut closure = Closure::new(model);
        let mut seen: FxHashSet<String> = FxHashSet::default();

        for global_id in global_ids {
            let global_id = global_id.as_ref();
            if !seen.insert(global_id.to_string()) {
                continue;
            }

            for product in model.products_by_global_id(global_id) {
                let added = match (product.kind, self.ancestor_mode) {
                    (ObjectKind::Spatial(_), AncestorMode::ParentChain) => {
                        closure.walk_ancestors(&product)
                    }
                    (ObjectKind::Spatial(_), AncestorMode::Compatible) => {
                        closure.expand_downward(product.id)
                    }
                    (ObjectKind::Element | ObjectKind::Context, _) => {
                        log::trace!("Skipping {}: not a spatial structure", product.id);
                        continue;
                    }
                };
                self.log_seed(&product, added);
            }
        }

        log::debug!(
            "{:?} closure: {} products from {} global ids",
            self.ancestor_mode,
            closure.products.len(),
            seen.len()
        );
        closure.products
    }

    fn log_seed(&self, seed: &ObjectDefinition, added: usize) {
        let level = if self.log_detail {
            log::Level::Info
        } else {
            log::Level::Debug
        };
        log::log!(
            level,
            "Seed {} ({} '{}') added {} products",
            seed.id,
            seed.ifc_type,
            seed.display_name(),
            added
        );
    }
}

/// Downward closure with default settings
pub fn required_products<G, I, S>(model: &G, seeds: I) -> ProductSet
where
    G: EntityGraph + ?Sized,
    I: IntoIterator<Item = S>,
    S: Into<SeedRef>,
{
    ProductAnalyse::new().required_products(model, seeds)
}

/// Global-id closure with default settings
pub fn required_products_by_global_ids<G, I, S>(model: &G, global_ids: I) -> ProductSet
where
    G: EntityGraph + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ProductAnalyse::new().required_products_by_global_ids(model, global_ids)
}

/// Accumulator for one resolver call
struct Closure<'a, G: ?Sized> {
    model: &'a G,
    products: ProductSet,
    /// Aggregation nodes already expanded downward
    expanded: FxHashSet<EntityId>,
}

impl<'a, G: EntityGraph + ?Sized> Closure<'a, G> {
    fn new(model: &'a G) -> Self {
        Self {
            model,
            products: ProductSet::new(),
            expanded: FxHashSet::default(),
        }
    }

    /// Collect contained products below `root`, returning how many were new
    fn expand_downward(&mut self, root: EntityId) -> usize {
        let mut added = 0;
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            if !self.expanded.insert(id) {
                log::trace!("{} already expanded", id);
                continue;
            }
            let Some(object) = self.model.object(id) else {
                continue;
            };

            match object.kind {
                ObjectKind::Spatial(_) => {
                    for element in self.model.contained_elements(id) {
                        if let Some(product) = self.model.product(element) {
                            added += usize::from(self.products.insert(product));
                        }
                    }
                }
                ObjectKind::Element | ObjectKind::Context => {}
            }

            // Reverse so children are visited in their declared order
            stack.extend(self.model.decomposed_by(id).into_iter().rev());
        }
        added
    }

    /// Add `seed` and every product above it, returning how many were new
    fn walk_ancestors(&mut self, seed: &Arc<ObjectDefinition>) -> usize {
        let mut added = usize::from(self.products.insert(seed.clone()));
        let mut visited = FxHashSet::default();
        visited.insert(seed.id);

        let mut current = seed.id;
        while let Some(parent) = self.model.decomposes(current) {
            if !visited.insert(parent) {
                log::warn!("Aggregation cycle above {} at {}", seed.id, parent);
                break;
            }
            if let Some(product) = self.model.product(parent) {
                added += usize::from(self.products.insert(product));
            }
            current = parent;
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_toolbox_graph::{ModelGraph, ModelGraphBuilder};
    use ifc_toolbox_model::{AttributeValue, DecodedEntity, IfcType, ToolboxError};

    fn object(id: u32, guid: &str, ifc_type: IfcType, name: &str) -> ObjectDefinition {
        ObjectDefinition::new(EntityId(id), guid, ifc_type).with_name(name)
    }

    fn ids(set: &ProductSet) -> Vec<u32> {
        set.ids().into_iter().map(|id| id.0).collect()
    }

    /// Project(1) → Site(2) → Building(3) → Storey(4) → Space(5)
    ///
    /// Storey 4 contains Wall-A(10) and aggregates Stair(30) → Flight(31);
    /// Space 5 contains Door-B(11); Storey 6 under the building is empty;
    /// Column 20 is contained nowhere.
    fn sample_graph() -> ModelGraph {
        let mut builder = ModelGraphBuilder::new();
        builder
            .add_object(object(1, "project", IfcType::IfcProject, "Project"))
            .add_object(object(2, "site", IfcType::IfcSite, "Site"))
            .add_object(object(3, "building", IfcType::IfcBuilding, "Building"))
            .add_object(object(4, "storey", IfcType::IfcBuildingStorey, "Level 0"))
            .add_object(object(5, "space", IfcType::IfcSpace, "Room"))
            .add_object(object(6, "empty", IfcType::IfcBuildingStorey, "Roof level"))
            .add_object(object(10, "wall-a", IfcType::IfcWall, "Wall-A"))
            .add_object(object(11, "door-b", IfcType::IfcDoor, "Door-B"))
            .add_object(object(20, "column", IfcType::IfcColumn, "Column"))
            .add_object(object(30, "stair", IfcType::IfcStair, "Stair"))
            .add_object(object(31, "flight", IfcType::IfcStairFlight, "Flight"))
            .aggregate(EntityId(1), [EntityId(2)])
            .aggregate(EntityId(2), [EntityId(3)])
            .aggregate(EntityId(3), [EntityId(4), EntityId(6)])
            .aggregate(EntityId(4), [EntityId(5), EntityId(30)])
            .aggregate(EntityId(30), [EntityId(31)])
            .contain(EntityId(4), [EntityId(10)])
            .contain(EntityId(5), [EntityId(11)]);
        builder.build()
    }

    /// Site(1) and Building(2) decompose into each other
    fn cyclic_graph() -> ModelGraph {
        let mut builder = ModelGraphBuilder::new();
        builder
            .add_object(object(1, "a", IfcType::IfcSite, "A"))
            .add_object(object(2, "b", IfcType::IfcBuilding, "B"))
            .add_object(object(10, "wall", IfcType::IfcWall, "Wall"))
            .add_object(object(11, "slab", IfcType::IfcSlab, "Slab"))
            .aggregate(EntityId(1), [EntityId(2)])
            .aggregate(EntityId(2), [EntityId(1)])
            .contain(EntityId(1), [EntityId(10)])
            .contain(EntityId(2), [EntityId(11)]);
        builder.build()
    }

    /// Decoded rows of a small marine model
    ///
    /// ```text
    /// #1=IFCPROJECT(...);
    /// #2=IFCMARINEFACILITY(...);          aggregated by #1
    /// #3=IFCTUNNELPART(...);              aggregated by #2, contains #11
    /// #10=IFCWALL(...);                   contained in #2
    /// #11=IFCCHIMNEY(...);
    /// #7=IFCDISTRIBUTIONPORT(...);        #8=IFCELEMENTASSEMBLY(...);
    /// #9=IFCSHADINGDEVICE(...);           unreferenced
    /// ```
    fn decoded_graph() -> ModelGraph {
        let text = |value: &str| AttributeValue::String(value.to_string());
        let reference = |id: u32| AttributeValue::EntityRef(EntityId(id));
        let list = |ids: &[u32]| {
            AttributeValue::List(ids.iter().map(|id| reference(*id)).collect())
        };
        let row = |id: u32, type_name: &str, guid: &str, name: &str| {
            DecodedEntity::new(
                id,
                IfcType::parse(type_name),
                vec![
                    text(guid),
                    reference(40),
                    text(name),
                    AttributeValue::Null,
                    AttributeValue::Null,
                    reference(50),
                    AttributeValue::Null,
                ],
            )
        };
        let rel = |id: u32, type_name: &str, fourth: AttributeValue, fifth: AttributeValue| {
            DecodedEntity::new(
                id,
                IfcType::parse(type_name),
                vec![
                    text("rel"),
                    reference(40),
                    AttributeValue::Null,
                    AttributeValue::Null,
                    fourth,
                    fifth,
                ],
            )
        };

        let entities = vec![
            row(1, "IFCPROJECT", "0YvctVUKr0kugbFTf53O9L", "Harbour"),
            row(2, "IFCMARINEFACILITY", "2O2Fr$t4X7Zf8NOew3FLOH", "Quay"),
            row(3, "IFCTUNNELPART", "0K7w7JN4n2RvbiERRZMGi_", "Culvert"),
            row(7, "IFCDISTRIBUTIONPORT", "3vB2YO$MX4xv5uCqZZG05x", "Port"),
            row(8, "IFCELEMENTASSEMBLY", "1hOSvn6df7F8_7GcBWlR72", "Fender"),
            row(9, "IFCSHADINGDEVICE", "0$WU4A9R19$vKWO$AdOnKA", "Canopy"),
            row(10, "IFCWALL", "2fH1q8GJ5Cx9kL0pQrStUv", "Quay wall"),
            row(11, "IFCCHIMNEY", "1Ab2Cd3Ef4Gh5Ij6Kl7Mn8", "Vent"),
            rel(20, "IFCRELAGGREGATES", reference(1), list(&[2])),
            rel(21, "IFCRELAGGREGATES", reference(2), list(&[3])),
            rel(22, "IFCRELCONTAINEDINSPATIALSTRUCTURE", list(&[10]), reference(2)),
            rel(23, "IFCRELCONTAINEDINSPATIALSTRUCTURE", list(&[11]), reference(3)),
        ];
        ModelGraph::from_entities(entities).unwrap()
    }

    #[test]
    fn test_decoded_model_downward_closure() {
        let graph = decoded_graph();

        assert_eq!(ids(&required_products(&graph, [2u32])), vec![10, 11]);
        assert_eq!(ids(&required_products(&graph, [3u32])), vec![11]);
        assert_eq!(ids(&required_products(&graph, [7u32, 8, 9])), vec![7, 8, 9]);
    }

    #[test]
    fn test_decoded_model_parent_chain() {
        let graph = decoded_graph();
        let products = required_products_by_global_ids(&graph, ["0K7w7JN4n2RvbiERRZMGi_"]);
        assert_eq!(ids(&products), vec![2, 3]);
    }

    #[test]
    fn test_transitive_containment() {
        let graph = sample_graph();
        let products = required_products(&graph, [2u32]);
        assert_eq!(ids(&products), vec![10, 11]);
    }

    #[test]
    fn test_spatial_seed_is_excluded() {
        let graph = sample_graph();

        assert!(required_products(&graph, [6u32]).is_empty());
        assert!(!required_products(&graph, [4u32]).contains(EntityId(4)));
    }

    #[test]
    fn test_non_spatial_seed_taken_verbatim() {
        let graph = sample_graph();

        // The stair aggregates a flight, but elements are never expanded
        assert_eq!(ids(&required_products(&graph, [30u32])), vec![30]);
        assert_eq!(ids(&required_products(&graph, [20u32])), vec![20]);
    }

    #[test]
    fn test_aggregated_elements_need_containment() {
        let graph = sample_graph();

        // Stair 30 and flight 31 are aggregated below the storey, not contained
        let products = required_products(&graph, [4u32]);
        assert_eq!(ids(&products), vec![10, 11]);
    }

    #[test]
    fn test_duplicate_collapse() {
        let graph = sample_graph();
        let products = required_products(&graph, [4u32, 10, 4]);
        assert_eq!(ids(&products), vec![10, 11]);
    }

    #[test]
    fn test_unknown_seed_tolerance() {
        let graph = sample_graph();
        let products = required_products(&graph, [999u32, 20]);
        assert_eq!(ids(&products), vec![20]);
    }

    #[test]
    fn test_empty_and_non_product_seeds() {
        let graph = sample_graph();

        assert!(required_products(&graph, Vec::<u32>::new()).is_empty());
        // The project is an object definition, not a product
        assert!(required_products(&graph, [1u32]).is_empty());
    }

    #[test]
    fn test_string_seeds() {
        let graph = sample_graph();
        let products = required_products(&graph, ["5", " #20 ", "wall", "", "-4"]);
        assert_eq!(ids(&products), vec![11, 20]);
    }

    #[test]
    fn test_mixed_seed_refs() {
        let graph = sample_graph();
        let column = graph.object(EntityId(20)).unwrap();
        let seeds = vec![
            SeedRef::from(EntityId(5)),
            SeedRef::from(&column),
            SeedRef::from(String::from("10")),
        ];
        assert_eq!(ids(&required_products(&graph, seeds)), vec![10, 11, 20]);
    }

    #[test]
    fn test_idempotence() {
        let graph = sample_graph();
        let seeds = [2u32, 20, 999];

        let first = required_products(&graph, seeds);
        let second = required_products(&graph, seeds);
        assert_eq!(first, second);
    }

    #[test]
    fn test_cycle_safety() {
        let graph = cyclic_graph();

        let products = required_products(&graph, [1u32]);
        assert_eq!(ids(&products), vec![10, 11]);
        let products = required_products(&graph, [2u32, 1]);
        assert_eq!(ids(&products), vec![10, 11]);
    }

    #[test]
    fn test_self_containing_structure() {
        let mut builder = ModelGraphBuilder::new();
        builder
            .add_object(object(1, "site", IfcType::IfcSite, "Site"))
            .aggregate(EntityId(1), [EntityId(1)])
            .contain(EntityId(1), [EntityId(1)]);
        let graph = builder.build();

        assert_eq!(ids(&required_products(&graph, [1u32])), vec![1]);
    }

    #[test]
    fn test_parent_chain_by_global_id() {
        let graph = sample_graph();
        let products = required_products_by_global_ids(&graph, ["space"]);

        // Project is walked through but is not a product
        assert_eq!(ids(&products), vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_parent_chain_ignores_elements_and_unknown_ids() {
        let graph = sample_graph();

        assert!(required_products_by_global_ids(&graph, ["wall-a"]).is_empty());
        assert!(required_products_by_global_ids(&graph, ["project"]).is_empty());
        assert!(required_products_by_global_ids(&graph, ["nope"]).is_empty());
        assert!(required_products_by_global_ids(&graph, Vec::<String>::new()).is_empty());
    }

    #[test]
    fn test_parent_chain_merges_seeds() {
        let graph = sample_graph();
        let products =
            required_products_by_global_ids(&graph, ["storey", "empty", "storey", "site"]);
        assert_eq!(ids(&products), vec![2, 3, 4, 6]);
    }

    #[test]
    fn test_parent_chain_shared_global_id() {
        let mut builder = ModelGraphBuilder::new();
        builder
            .add_object(object(1, "site", IfcType::IfcSite, "Site"))
            .add_object(object(2, "dup", IfcType::IfcBuilding, "North"))
            .add_object(object(3, "dup", IfcType::IfcBuilding, "South"))
            .add_object(object(4, "dup", IfcType::IfcWall, "Wall"))
            .aggregate(EntityId(1), [EntityId(2), EntityId(3)]);
        let graph = builder.build();

        let products = required_products_by_global_ids(&graph, ["dup"]);
        assert_eq!(ids(&products), vec![1, 2, 3]);
    }

    #[test]
    fn test_parent_chain_cycle_safety() {
        let graph = cyclic_graph();
        let products = required_products_by_global_ids(&graph, ["a"]);
        assert_eq!(ids(&products), vec![1, 2]);
    }

    #[test]
    fn test_compatible_mode_matches_downward_closure() {
        let graph = sample_graph();
        let analyse = ProductAnalyse::new().with_ancestor_mode(AncestorMode::Compatible);

        let by_global_id = analyse.required_products_by_global_ids(&graph, ["site"]);
        let by_label = analyse.required_products(&graph, [2u32]);
        assert_eq!(by_global_id, by_label);
        assert_eq!(ids(&by_global_id), vec![10, 11]);

        // Non-spatial matches are still ignored
        assert!(analyse
            .required_products_by_global_ids(&graph, ["column"])
            .is_empty());
    }

    #[test]
    fn test_works_through_trait_object() {
        let graph = sample_graph();
        let model: &dyn EntityGraph = &graph;
        assert_eq!(ids(&required_products(model, [3u32])), vec![10, 11]);
    }

    #[test]
    fn test_concurrent_resolution() {
        use std::thread;

        let graph = Arc::new(sample_graph());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let graph = Arc::clone(&graph);
                thread::spawn(move || ids(&required_products(&*graph, [1u32, 2, 20])))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), vec![10, 11, 20]);
        }
    }

    #[test]
    fn test_settings_from_json() {
        let analyse =
            ProductAnalyse::from_json(r#"{"ancestor_mode":"compatible","log_detail":true}"#)
                .unwrap();
        assert_eq!(analyse.ancestor_mode, AncestorMode::Compatible);
        assert!(analyse.log_detail);

        assert_eq!(ProductAnalyse::from_json("{}").unwrap(), ProductAnalyse::new());
        assert!(matches!(
            ProductAnalyse::from_json(r#"{"ancestor_mode":"sideways"}"#),
            Err(ToolboxError::Serialization(_))
        ));
    }
}
