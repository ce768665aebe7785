// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hierarchy reader implementation over any EntityGraph

use ifc_toolbox_model::{
    EntityGraph, EntityId, HierarchyNode, HierarchyReader, IfcType, ObjectDefinition, ObjectKind,
    Result, ToolboxError,
};
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;

/// Default hierarchy-reading collaborator
///
/// Stateless; every call walks the graph afresh.
#[derive(Clone, Copy, Debug, Default)]
pub struct HierarchyReaderImpl;

impl HierarchyReader for HierarchyReaderImpl {
    fn full_hierarchy(&self, model: &dyn EntityGraph) -> Result<HierarchyNode> {
        let roots: Vec<_> = model
            .all_ids()
            .into_iter()
            .filter(|id| model.decomposes(*id).is_none())
            .filter_map(|id| model.object(id))
            .collect();

        // Project first, otherwise every top-level spatial structure
        if let Some(project) = roots.iter().find(|o| o.kind == ObjectKind::Context) {
            let mut visited = FxHashSet::default();
            visited.insert(project.id);
            return Ok(build_node(model, project, &mut visited));
        }

        let mut root = HierarchyNode::group("Model", "");
        for object in roots.iter().filter(|o| o.is_spatial()) {
            let mut visited = FxHashSet::default();
            visited.insert(object.id);
            root.add_child(build_node(model, object, &mut visited));
        }
        log::debug!("No project found, {} top-level structures", root.children.len());
        Ok(root)
    }

    fn typed_hierarchy(&self, model: &dyn EntityGraph) -> Result<HierarchyNode> {
        let mut groups: BTreeMap<String, Vec<HierarchyNode>> = BTreeMap::new();
        for id in model.all_ids() {
            let Some(object) = model.object(id) else {
                continue;
            };
            if object.kind != ObjectKind::Element {
                continue;
            }
            groups
                .entry(object.ifc_type.name().to_string())
                .or_default()
                .push(HierarchyNode::from_object(&object));
        }

        let mut root = HierarchyNode::group("Types", "");
        for (type_name, members) in groups {
            let mut group = HierarchyNode::group(type_name.clone(), type_name);
            group.children = members;
            root.add_child(group);
        }
        Ok(root)
    }

    fn spatial_hierarchy(
        &self,
        model: &dyn EntityGraph,
        type_name: &str,
    ) -> Result<HierarchyNode> {
        let ifc_type = IfcType::parse(type_name);
        if !ifc_type.is_spatial() {
            return Err(ToolboxError::invalid_argument(format!(
                "{} is not a spatial structure type",
                type_name
            )));
        }

        let mut objects = model.objects_by_type(&ifc_type);
        objects.sort_by_key(|o| o.id);

        let mut root = HierarchyNode::group(type_name, ifc_type.name());
        for object in &objects {
            let mut visited = FxHashSet::default();
            visited.insert(object.id);
            root.add_child(build_node(model, object, &mut visited));
        }
        Ok(root)
    }
}

/// Node under construction with the labels still to place below it
type OpenNode = (HierarchyNode, std::vec::IntoIter<EntityId>);

/// Build the subtree below an object
///
/// Aggregation children come first, in order, followed by contained
/// elements. Objects already placed in this tree are skipped. Depth is
/// bounded by the heap, not the call stack.
fn build_node(
    model: &dyn EntityGraph,
    object: &ObjectDefinition,
    visited: &mut FxHashSet<EntityId>,
) -> HierarchyNode {
    let mut ancestors: Vec<OpenNode> = Vec::new();
    let mut current = open_node(model, object);

    loop {
        match current.1.next() {
            Some(id) => {
                if !visited.insert(id) {
                    log::trace!("{} already placed below {:?}", id, current.0.id);
                    continue;
                }
                if let Some(child) = model.object(id) {
                    let parent = std::mem::replace(&mut current, open_node(model, &child));
                    ancestors.push(parent);
                }
            }
            None => match ancestors.pop() {
                Some(mut parent) => {
                    parent.0.add_child(current.0);
                    current = parent;
                }
                None => return current.0,
            },
        }
    }
}

fn open_node(model: &dyn EntityGraph, object: &ObjectDefinition) -> OpenNode {
    let mut below = model.decomposed_by(object.id);
    if object.is_spatial() {
        below.extend(model.contained_elements(object.id));
    }
    (HierarchyNode::from_object(object), below.into_iter())
}
