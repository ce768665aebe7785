// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for IFC object graphs
//!
//! This module defines the identifiers, schema types and object kinds used
//! throughout the extraction toolbox.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type-safe entity label
///
/// Wraps the raw STEP instance number (e.g., #123 becomes EntityId(123)).
/// Labels are assigned at load time and are unique within one model.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize, Default,
)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Parse a label from text such as `"42"` or `"#42"`
    ///
    /// Surrounding whitespace is ignored. Returns `None` for anything that is
    /// not a non-negative integer fitting in a `u32`.
    pub fn parse_label(text: &str) -> Option<Self> {
        let text = text.trim();
        let digits = text.strip_prefix('#').unwrap_or(text);
        let digits = digits.strip_prefix('+').unwrap_or(digits);
        digits.parse::<u32>().ok().map(EntityId)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        EntityId(id)
    }
}

impl From<EntityId> for u32 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// IFC GlobalId
///
/// Stable across model versions. Not guaranteed unique within a single load,
/// so lookups by global id may yield several objects.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct GlobalId(pub String);

impl GlobalId {
    /// Create a global id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        GlobalId(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check for the 22-character base-64 encoding IFC uses for GlobalIds
    pub fn is_compressed(text: &str) -> bool {
        text.len() == 22
            && text
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$')
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GlobalId {
    fn from(id: &str) -> Self {
        GlobalId(id.to_string())
    }
}

impl From<String> for GlobalId {
    fn from(id: String) -> Self {
        GlobalId(id)
    }
}

/// IFC entity type enumeration
///
/// Covers the object and relationship types that take part in the spatial
/// decomposition and containment graphs. Other types are captured with their
/// original string representation.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IfcType {
    // ========================================================================
    // Context
    // ========================================================================
    IfcProject,

    // ========================================================================
    // Spatial Structure
    // ========================================================================
    IfcSite,
    IfcBuilding,
    IfcBuildingStorey,
    IfcSpace,
    IfcFacility,
    IfcFacilityPart,
    IfcRoad,
    IfcRoadPart,
    IfcBridge,
    IfcBridgePart,
    IfcRailway,
    IfcRailwayPart,
    IfcMarineFacility,
    IfcMarinePart,

    // ========================================================================
    // Building Elements
    // ========================================================================
    IfcWall,
    IfcWallStandardCase,
    IfcCurtainWall,
    IfcSlab,
    IfcRoof,
    IfcBeam,
    IfcColumn,
    IfcDoor,
    IfcWindow,
    IfcStair,
    IfcStairFlight,
    IfcRamp,
    IfcRampFlight,
    IfcRailing,
    IfcCovering,
    IfcPlate,
    IfcMember,
    IfcFooting,
    IfcPile,
    IfcBuildingElementProxy,
    IfcElementAssembly,

    // ========================================================================
    // Distribution Elements (MEP)
    // ========================================================================
    IfcDistributionElement,
    IfcDistributionFlowElement,
    IfcFlowTerminal,
    IfcFlowSegment,
    IfcFlowFitting,
    IfcFlowController,
    IfcEnergyConversionDevice,
    IfcDistributionControlElement,
    IfcDistributionPort,

    // ========================================================================
    // Furnishing, Openings and Annotations
    // ========================================================================
    IfcFurnishingElement,
    IfcFurniture,
    IfcOpeningElement,
    IfcAnnotation,
    IfcGrid,

    // ========================================================================
    // Relationships
    // ========================================================================
    IfcRelAggregates,
    IfcRelContainedInSpatialStructure,

    /// Unknown type - stores the original type name string
    Unknown(String),
}

/// Known types paired with their STEP names
static TYPE_NAMES: &[(IfcType, &str)] = &[
    (IfcType::IfcProject, "IFCPROJECT"),
    (IfcType::IfcSite, "IFCSITE"),
    (IfcType::IfcBuilding, "IFCBUILDING"),
    (IfcType::IfcBuildingStorey, "IFCBUILDINGSTOREY"),
    (IfcType::IfcSpace, "IFCSPACE"),
    (IfcType::IfcFacility, "IFCFACILITY"),
    (IfcType::IfcFacilityPart, "IFCFACILITYPART"),
    (IfcType::IfcRoad, "IFCROAD"),
    (IfcType::IfcRoadPart, "IFCROADPART"),
    (IfcType::IfcBridge, "IFCBRIDGE"),
    (IfcType::IfcBridgePart, "IFCBRIDGEPART"),
    (IfcType::IfcRailway, "IFCRAILWAY"),
    (IfcType::IfcRailwayPart, "IFCRAILWAYPART"),
    (IfcType::IfcMarineFacility, "IFCMARINEFACILITY"),
    (IfcType::IfcMarinePart, "IFCMARINEPART"),
    (IfcType::IfcWall, "IFCWALL"),
    (IfcType::IfcWallStandardCase, "IFCWALLSTANDARDCASE"),
    (IfcType::IfcCurtainWall, "IFCCURTAINWALL"),
    (IfcType::IfcSlab, "IFCSLAB"),
    (IfcType::IfcRoof, "IFCROOF"),
    (IfcType::IfcBeam, "IFCBEAM"),
    (IfcType::IfcColumn, "IFCCOLUMN"),
    (IfcType::IfcDoor, "IFCDOOR"),
    (IfcType::IfcWindow, "IFCWINDOW"),
    (IfcType::IfcStair, "IFCSTAIR"),
    (IfcType::IfcStairFlight, "IFCSTAIRFLIGHT"),
    (IfcType::IfcRamp, "IFCRAMP"),
    (IfcType::IfcRampFlight, "IFCRAMPFLIGHT"),
    (IfcType::IfcRailing, "IFCRAILING"),
    (IfcType::IfcCovering, "IFCCOVERING"),
    (IfcType::IfcPlate, "IFCPLATE"),
    (IfcType::IfcMember, "IFCMEMBER"),
    (IfcType::IfcFooting, "IFCFOOTING"),
    (IfcType::IfcPile, "IFCPILE"),
    (IfcType::IfcBuildingElementProxy, "IFCBUILDINGELEMENTPROXY"),
    (IfcType::IfcElementAssembly, "IFCELEMENTASSEMBLY"),
    (IfcType::IfcDistributionElement, "IFCDISTRIBUTIONELEMENT"),
    (IfcType::IfcDistributionFlowElement, "IFCDISTRIBUTIONFLOWELEMENT"),
    (IfcType::IfcFlowTerminal, "IFCFLOWTERMINAL"),
    (IfcType::IfcFlowSegment, "IFCFLOWSEGMENT"),
    (IfcType::IfcFlowFitting, "IFCFLOWFITTING"),
    (IfcType::IfcFlowController, "IFCFLOWCONTROLLER"),
    (IfcType::IfcEnergyConversionDevice, "IFCENERGYCONVERSIONDEVICE"),
    (IfcType::IfcDistributionControlElement, "IFCDISTRIBUTIONCONTROLELEMENT"),
    (IfcType::IfcDistributionPort, "IFCDISTRIBUTIONPORT"),
    (IfcType::IfcFurnishingElement, "IFCFURNISHINGELEMENT"),
    (IfcType::IfcFurniture, "IFCFURNITURE"),
    (IfcType::IfcOpeningElement, "IFCOPENINGELEMENT"),
    (IfcType::IfcAnnotation, "IFCANNOTATION"),
    (IfcType::IfcGrid, "IFCGRID"),
    (IfcType::IfcRelAggregates, "IFCRELAGGREGATES"),
    (
        IfcType::IfcRelContainedInSpatialStructure,
        "IFCRELCONTAINEDINSPATIALSTRUCTURE",
    ),
];

impl IfcType {
    /// Parse a type name string into an IfcType (case-insensitive)
    pub fn parse(s: &str) -> Self {
        let upper = s.trim().to_uppercase();
        TYPE_NAMES
            .iter()
            .find(|(_, name)| *name == upper)
            .map(|(ifc_type, _)| ifc_type.clone())
            .unwrap_or_else(|| IfcType::Unknown(upper))
    }

    /// Get the STEP type name (upper case)
    pub fn name(&self) -> &str {
        match self {
            IfcType::Unknown(s) => s,
            known => TYPE_NAMES
                .iter()
                .find(|(ifc_type, _)| ifc_type == known)
                .map(|(_, name)| *name)
                .unwrap_or("UNKNOWN"),
        }
    }

    /// Spatial kind of this type, if it is a spatial structure element
    pub fn spatial_kind(&self) -> Option<SpatialKind> {
        match self {
            IfcType::IfcSite => Some(SpatialKind::Site),
            IfcType::IfcBuilding => Some(SpatialKind::Building),
            IfcType::IfcBuildingStorey => Some(SpatialKind::Storey),
            IfcType::IfcSpace => Some(SpatialKind::Space),
            IfcType::IfcFacility
            | IfcType::IfcRoad
            | IfcType::IfcBridge
            | IfcType::IfcRailway
            | IfcType::IfcMarineFacility => Some(SpatialKind::Facility),
            IfcType::IfcFacilityPart
            | IfcType::IfcRoadPart
            | IfcType::IfcBridgePart
            | IfcType::IfcRailwayPart
            | IfcType::IfcMarinePart => Some(SpatialKind::FacilityPart),
            _ => None,
        }
    }

    /// Check if this type is a spatial structure element
    pub fn is_spatial(&self) -> bool {
        self.spatial_kind().is_some()
    }

    /// Check if this type is one of the relationship types
    pub fn is_relationship(&self) -> bool {
        match self {
            IfcType::IfcRelAggregates | IfcType::IfcRelContainedInSpatialStructure => true,
            IfcType::Unknown(name) => name.starts_with("IFCREL"),
            _ => false,
        }
    }

    /// Check if an unknown type names a rooted entity that is never a product
    ///
    /// Covers type objects, property and quantity definitions, groups and
    /// systems, and process, control and resource objects. Listed types
    /// always return `false`.
    pub fn is_non_product_root(&self) -> bool {
        let IfcType::Unknown(name) = self else {
            return false;
        };
        NON_PRODUCT_NAMES.contains(&name.as_str())
            || NON_PRODUCT_PREFIXES.iter().any(|p| name.starts_with(p))
            || NON_PRODUCT_SUFFIXES.iter().any(|s| name.ends_with(s))
    }

    /// Object kind for types that are object definitions
    ///
    /// Returns `None` for relationships and for unknown types; the graph
    /// builder classifies those from how they are used.
    pub fn object_kind(&self) -> Option<ObjectKind> {
        match self {
            IfcType::IfcProject => Some(ObjectKind::Context),
            IfcType::IfcRelAggregates
            | IfcType::IfcRelContainedInSpatialStructure
            | IfcType::Unknown(_) => None,
            other => Some(
                other
                    .spatial_kind()
                    .map(ObjectKind::Spatial)
                    .unwrap_or(ObjectKind::Element),
            ),
        }
    }
}

/// Rooted non-product entities by exact name
const NON_PRODUCT_NAMES: &[&str] = &[
    "IFCZONE",
    "IFCINVENTORY",
    "IFCASSET",
    "IFCTASK",
    "IFCPROCEDURE",
    "IFCEVENT",
    "IFCACTIONREQUEST",
    "IFCPERMIT",
    "IFCPROJECTORDER",
    "IFCPERFORMANCEHISTORY",
    "IFCACTOR",
    "IFCOCCUPANT",
    "IFCDISTRIBUTIONCIRCUIT",
    "IFCPROJECTLIBRARY",
];

/// Rooted non-product entity families by name prefix
const NON_PRODUCT_PREFIXES: &[&str] = &[
    "IFCPROPERTY",
    "IFCQUANTITY",
    "IFCELEMENTQUANTITY",
    "IFCSTRUCTURALLOAD",
    "IFCSTRUCTURALANALYSIS",
    "IFCWORK",
    "IFCCOST",
];

/// Rooted non-product entity families by name suffix
const NON_PRODUCT_SUFFIXES: &[&str] = &[
    "TYPE", "STYLE", "TEMPLATE", "RESOURCE", "SCHEDULE", "SYSTEM", "GROUP",
];

impl Default for IfcType {
    fn default() -> Self {
        IfcType::Unknown(String::new())
    }
}

impl fmt::Display for IfcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Kind of spatial structure element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpatialKind {
    /// IfcSite - geographic site
    Site,
    /// IfcBuilding - a building structure
    Building,
    /// IfcBuildingStorey - a floor/level
    Storey,
    /// IfcSpace - a room or area
    Space,
    /// IFC4x3 Facility (road, bridge, etc.)
    Facility,
    /// IFC4x3 Facility part
    FacilityPart,
    /// Spatial structure of an unlisted type, known only from containing elements
    Other,
}

/// Closed classification of object definitions
///
/// Aggregation nodes are either a non-product context (the project), a
/// spatial structure element, or a physical element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Non-product object definition (e.g. IfcProject)
    Context,
    /// Spatial structure element that can aggregate and contain
    Spatial(SpatialKind),
    /// Physical or otherwise non-spatial product
    Element,
}

impl ObjectKind {
    /// Products are everything except contexts
    pub fn is_product(&self) -> bool {
        !matches!(self, ObjectKind::Context)
    }

    /// Check for a spatial structure element
    pub fn is_spatial(&self) -> bool {
        matches!(self, ObjectKind::Spatial(_))
    }
}

/// Object definition - a node of the aggregation graph
///
/// Products are object definitions whose kind is not [`ObjectKind::Context`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDefinition {
    /// Entity label
    pub id: EntityId,
    /// IFC GlobalId
    pub global_id: GlobalId,
    /// Entity type
    pub ifc_type: IfcType,
    /// Name attribute, when set
    pub name: Option<String>,
    /// Classification used by traversals
    pub kind: ObjectKind,
}

impl ObjectDefinition {
    /// Create an object definition, classifying it from its type
    ///
    /// Types without a known classification become elements.
    pub fn new(id: EntityId, global_id: impl Into<GlobalId>, ifc_type: IfcType) -> Self {
        let kind = ifc_type.object_kind().unwrap_or(ObjectKind::Element);
        Self {
            id,
            global_id: global_id.into(),
            ifc_type,
            name: None,
            kind,
        }
    }

    /// Set name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Override the classification
    pub fn with_kind(mut self, kind: ObjectKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check if this object is a product
    pub fn is_product(&self) -> bool {
        self.kind.is_product()
    }

    /// Check if this object is a spatial structure element
    pub fn is_spatial(&self) -> bool {
        self.kind.is_spatial()
    }

    /// Name, or the type name when unnamed
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.ifc_type.name())
    }
}

/// Decoded attribute value
///
/// Represents any value that can appear in an IFC entity's attribute list.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum AttributeValue {
    /// Null value ($)
    #[default]
    Null,
    /// Derived value (*)
    Derived,
    /// Entity reference (#123)
    EntityRef(EntityId),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// Enumeration value (.VALUE.)
    Enum(String),
    /// List of values
    List(Vec<AttributeValue>),
    /// Typed value like IFCLABEL('text')
    TypedValue(String, Vec<AttributeValue>),
}

impl AttributeValue {
    /// Try to get as entity reference
    pub fn as_entity_ref(&self) -> Option<EntityId> {
        match self {
            AttributeValue::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    /// Try to get as string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            AttributeValue::TypedValue(_, args) if !args.is_empty() => args[0].as_string(),
            _ => None,
        }
    }

    /// Try to get as list
    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(list) => Some(list),
            _ => None,
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

/// Decoded IFC entity
///
/// An entity as produced by a STEP decoder: its label, type and attribute
/// values in schema order.
#[derive(Clone, Debug)]
pub struct DecodedEntity {
    /// Entity ID
    pub id: EntityId,
    /// Entity type
    pub ifc_type: IfcType,
    /// Attribute values in order
    pub attributes: Vec<AttributeValue>,
}

impl DecodedEntity {
    /// Create a decoded entity
    pub fn new(
        id: impl Into<EntityId>,
        ifc_type: IfcType,
        attributes: Vec<AttributeValue>,
    ) -> Self {
        Self {
            id: id.into(),
            ifc_type,
            attributes,
        }
    }

    /// Get attribute at index
    pub fn get(&self, index: usize) -> Option<&AttributeValue> {
        self.attributes.get(index)
    }

    /// Get entity reference at index
    pub fn get_ref(&self, index: usize) -> Option<EntityId> {
        self.get(index).and_then(|v| v.as_entity_ref())
    }

    /// Get string at index
    pub fn get_string(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(|v| v.as_string())
    }

    /// Get list of entity references at index
    pub fn get_refs(&self, index: usize) -> Option<Vec<EntityId>> {
        self.get(index)
            .and_then(|v| v.as_list())
            .map(|list| list.iter().filter_map(|v| v.as_entity_ref()).collect())
    }
}
