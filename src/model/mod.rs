//! Typed element tree of an Android layout
//!
//! Elements live in an arena owned by [`LayoutTree`]; children and parents
//! refer to each other by [`ElementId`], so the parent link never owns
//! anything.

mod element;
mod inherit;

pub use element::{
    AndroidLayout, AndroidObject, Button, Element, ElementAttrs, LayoutKind, Orientation,
    UnknownObject,
};
pub use inherit::{resolve_inherited, resolve_strict, Detached, Inherited, LayoutParent, NotInheritable};

use crate::device::DeviceError;
use crate::parser::xml::XmlError;
use crate::resources::ResourceError;
use crate::units::{Dip, UnitError};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;
use thiserror::Error;

/// Errors produced while building or querying a layout tree
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error(transparent)]
    Unit(#[from] UnitError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error(transparent)]
    NotInheritable(#[from] NotInheritable),
    #[error(transparent)]
    Xml(#[from] XmlError),
    #[error("<{tag}> is not supported")]
    NotSupported { tag: String },
    #[error("all children of a TableLayout must be TableRow instances")]
    TableChild,
    #[error("layout {0} has zero area")]
    ZeroArea(ElementId),
    #[error("geometry of {0} is unresolved")]
    UnresolvedGeometry(ElementId),
    #[error("{0} is not a layout")]
    NotALayout(ElementId),
}

impl LayoutError {
    /// Unsupported layouts are skipped by callers rather than reported
    pub fn is_not_supported(&self) -> bool {
        matches!(self, LayoutError::NotSupported { .. })
    }
}

/// Index of an element in its [`LayoutTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl ElementId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Elements of one layout document; the first element pushed is the root
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayoutTree {
    elements: Vec<Element>,
}

impl LayoutTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element. Its `parent` must already be in the tree.
    pub fn push(&mut self, element: Element) -> ElementId {
        self.elements.push(element);
        ElementId(self.elements.len() - 1)
    }

    pub fn root(&self) -> Option<ElementId> {
        (!self.elements.is_empty()).then_some(ElementId(0))
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All elements in document order
    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements
            .iter()
            .enumerate()
            .map(|(index, element)| (ElementId(index), element))
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.get(id).map(Element::children).unwrap_or(&[])
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.get(id)?.parent()
    }

    /// Parent chain from the direct parent up to the root
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    /// Depth below the root (the root is 0)
    pub fn depth(&self, id: ElementId) -> usize {
        self.ancestors(id).count()
    }

    /// Replace the children of a layout and point them back at it.
    ///
    /// A `TableLayout` only accepts `TableRow` children.
    pub fn set_children(&mut self, id: ElementId, children: Vec<ElementId>) -> Result<(), LayoutError> {
        let kind = self
            .get(id)
            .and_then(Element::as_layout)
            .map(|layout| layout.kind)
            .ok_or(LayoutError::NotALayout(id))?;

        if kind == LayoutKind::Table
            && !children
                .iter()
                .all(|child| self.get(*child).is_some_and(|e| e.is_kind(LayoutKind::TableRow)))
        {
            return Err(LayoutError::TableChild);
        }

        for child in &children {
            if let Some(element) = self.get_mut(*child) {
                element.attrs_mut().parent = Some(id);
            }
        }
        if let Some(Element::Layout(layout)) = self.get_mut(id) {
            layout.children = children;
        }

        Ok(())
    }

    /// `height × width` of an element
    pub fn area(&self, id: ElementId) -> Option<i64> {
        self.get(id)?.area()
    }

    /// Share of a layout's area covered by its direct `Button` children
    pub fn button_ratio(&self, id: ElementId) -> Result<f64, LayoutError> {
        let element = self.get(id).ok_or(LayoutError::NotALayout(id))?;
        element.as_layout().ok_or(LayoutError::NotALayout(id))?;

        let area = element.area().ok_or(LayoutError::UnresolvedGeometry(id))?;
        if area == 0 {
            return Err(LayoutError::ZeroArea(id));
        }

        // Each area fits i64, their sum may not
        let button_area: f64 = self
            .children(id)
            .iter()
            .filter_map(|child| self.get(*child))
            .filter(|child| child.is_button())
            .filter_map(Element::area)
            .map(|area| area as f64)
            .sum();

        Ok(button_area / area as f64)
    }

    /// Sum of the children's widths
    pub fn taken_width(&self, id: ElementId) -> Result<Dip, UnitError> {
        self.sum_children(id, Element::width)
    }

    /// Sum of the children's heights
    pub fn taken_height(&self, id: ElementId) -> Result<Dip, UnitError> {
        self.sum_children(id, Element::height)
    }

    fn sum_children(&self, id: ElementId, dimension: fn(&Element) -> Option<Dip>) -> Result<Dip, UnitError> {
        let total: i64 = self
            .children(id)
            .iter()
            .filter_map(|child| self.get(*child))
            .filter_map(dimension)
            .map(|length| i64::from(length.value()))
            .sum();
        i32::try_from(total)
            .map(Dip)
            .map_err(|_| UnitError::OutOfRange(format!("{}dp", total)))
    }

    /// Largest child dimension
    pub(crate) fn max_child(&self, id: ElementId, dimension: fn(&Element) -> Option<Dip>) -> Dip {
        self.children(id)
            .iter()
            .filter_map(|child| self.get(*child))
            .filter_map(dimension)
            .max()
            .unwrap_or(Dip::ZERO)
    }

    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.elements.iter().filter_map(Element::as_button)
    }

    pub fn button_count(&self) -> usize {
        self.buttons().count()
    }

    /// Modelled elements per tag name
    pub fn tag_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for element in &self.elements {
            *counts.entry(element.tag_name()).or_insert(0) += 1;
        }
        counts
    }
}

impl Index<ElementId> for LayoutTree {
    type Output = Element;

    fn index(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }
}
