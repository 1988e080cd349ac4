use super::{XmlDocument, XmlElement};
use crate::device::{AndroidDevice, Font};
use crate::model::{
    resolve_inherited, resolve_strict, AndroidLayout, AndroidObject, Button, Detached, Element,
    ElementAttrs, ElementId, Inherited, LayoutError, LayoutKind, LayoutParent, LayoutTree,
    Orientation, UnknownObject,
};
use crate::resources::ResourceResolver;
use crate::units::{parse_length, Dip, UnitError, WRAP_CONTENT};
use std::path::Path;
use tracing::{debug, trace};

const ID: &str = "android:id";
const LAYOUT_WIDTH: &str = "android:layout_width";
const LAYOUT_HEIGHT: &str = "android:layout_height";
const LAYOUT_GRAVITY: &str = "android:layout_gravity";
const GRAVITY: &str = "android:gravity";
const ORIENTATION: &str = "android:orientation";
const TEXT: &str = "android:text";
const TEXT_SIZE: &str = "android:textSize";
const TYPEFACE: &str = "android:typeface";

/// Android's default button text size, 14sp
const DEFAULT_TEXT_SIZE: Dip = Dip(14);

/// Parser for Android layout XML files
pub struct LayoutParser<'a> {
    resources: &'a ResourceResolver,
    device: Option<&'a AndroidDevice>,
}

impl<'a> LayoutParser<'a> {
    /// Without a device, `wrap_content` widgets are left unsized
    pub fn new(resources: &'a ResourceResolver, device: Option<&'a AndroidDevice>) -> Self {
        Self { resources, device }
    }

    /// Parse a layout XML file into an element tree
    pub fn parse(&self, path: &Path, contents: &str) -> Result<LayoutTree, LayoutError> {
        let document = XmlDocument::parse(contents)?;
        let tree = self.parse_document(&document)?;

        debug!("Parsed layout {}: {} elements", path.display(), tree.len());

        Ok(tree)
    }

    pub fn parse_file(&self, path: &Path) -> Result<LayoutTree, LayoutError> {
        let document = XmlDocument::read(path)?;
        self.parse_document(&document)
    }

    /// Build the element tree of an already parsed document
    pub fn parse_document(&self, document: &XmlDocument) -> Result<LayoutTree, LayoutError> {
        let mut builder = TreeBuilder {
            parser: self,
            tree: LayoutTree::new(),
        };
        builder.dispatch(None, &document.root)?;
        Ok(builder.tree)
    }
}

/// A layout dimension before children are known
enum LayoutLength {
    Fixed(Option<Dip>),
    WrapContent,
}

struct TreeBuilder<'p, 'a> {
    parser: &'p LayoutParser<'a>,
    tree: LayoutTree,
}

impl TreeBuilder<'_, '_> {
    fn dispatch(&mut self, parent: Option<ElementId>, node: &XmlElement) -> Result<ElementId, LayoutError> {
        if node.name.ends_with("Layout") {
            self.dispatch_layout(parent, node)
        } else {
            self.dispatch_object(parent, node)
        }
    }

    fn dispatch_layout(&mut self, parent: Option<ElementId>, node: &XmlElement) -> Result<ElementId, LayoutError> {
        match LayoutKind::from_tag(&node.name) {
            Some(LayoutKind::Linear) => self.linear_layout(parent, node),
            _ => Err(LayoutError::NotSupported {
                tag: node.name.clone(),
            }),
        }
    }

    fn dispatch_object(&mut self, parent: Option<ElementId>, node: &XmlElement) -> Result<ElementId, LayoutError> {
        match node.name.as_str() {
            "Button" => self.button(parent, node),
            _ => Ok(self.unknown_object(parent, node)),
        }
    }

    /// The element a node inherits from: its layout, else the screen
    fn parent_ref(&self, parent: Option<ElementId>) -> &dyn LayoutParent {
        match (parent, self.parser.device) {
            (Some(id), _) => &self.tree[id] as &dyn LayoutParent,
            (None, Some(device)) => device,
            (None, None) => &Detached,
        }
    }

    fn linear_layout(&mut self, parent: Option<ElementId>, node: &XmlElement) -> Result<ElementId, LayoutError> {
        let raw_width = node.attr(LAYOUT_WIDTH).map(str::to_string);
        let raw_height = node.attr(LAYOUT_HEIGHT).map(str::to_string);

        let orientation = match node.attr(ORIENTATION) {
            Some(value) => {
                let value = resolve_strict(ORIENTATION, value)?;
                Orientation::parse(value).unwrap_or_else(|| {
                    debug!("Unknown orientation {:?}, assuming horizontal", value);
                    Orientation::default()
                })
            }
            None => Orientation::default(),
        };
        let child_gravity = node
            .attr(GRAVITY)
            .map(|value| resolve_strict(GRAVITY, value).map(str::to_string))
            .transpose()?;

        let parent_ref = self.parent_ref(parent);
        let width = layout_length(raw_width.as_deref(), parent_ref, |p| p.layout_width())?;
        let height = layout_length(raw_height.as_deref(), parent_ref, |p| p.layout_height())?;

        let mut layout = AndroidLayout::new(LayoutKind::Linear);
        layout.attrs = ElementAttrs {
            id: id_attr(node)?,
            width: fixed(&width),
            height: fixed(&height),
            parent,
            gravity: own_gravity(node, parent_ref),
        };
        layout.orientation = orientation;
        layout.child_gravity = child_gravity;
        layout.raw_width = raw_width;
        layout.raw_height = raw_height;

        let id = self.tree.push(Element::Layout(layout));

        // Text, comments and the like never reach here; only elements are children
        let children = node
            .elements()
            .map(|child| self.dispatch(Some(id), child))
            .collect::<Result<Vec<_>, _>>()?;
        self.tree.set_children(id, children)?;

        // wrap_content is resolved once the children are sized
        let (along_width, along_height) = match orientation {
            Orientation::Horizontal => (true, false),
            Orientation::Vertical => (false, true),
        };
        if matches!(width, LayoutLength::WrapContent) {
            let content = if along_width {
                self.tree.taken_width(id)?
            } else {
                self.tree.max_child(id, Element::width)
            };
            set_dimension(&mut self.tree, id, |attrs| attrs.width = Some(content));
        }
        if matches!(height, LayoutLength::WrapContent) {
            let content = if along_height {
                self.tree.taken_height(id)?
            } else {
                self.tree.max_child(id, Element::height)
            };
            set_dimension(&mut self.tree, id, |attrs| attrs.height = Some(content));
        }

        Ok(id)
    }

    fn button(&mut self, parent: Option<ElementId>, node: &XmlElement) -> Result<ElementId, LayoutError> {
        let resources = self.parser.resources;

        let text = resources.resolve(node.attr(TEXT))?;
        let text_size = node.attr(TEXT_SIZE).map_or(DEFAULT_TEXT_SIZE, |value| {
            parse_text_size(resources, value).unwrap_or_else(|e| {
                trace!("<{}> {}: {}; using {}", node.name, TEXT_SIZE, e, DEFAULT_TEXT_SIZE);
                DEFAULT_TEXT_SIZE
            })
        });
        let font = node.attr(TYPEFACE).map(Font::from_typeface).unwrap_or_default();

        let raw_width = node.attr(LAYOUT_WIDTH);
        let raw_height = node.attr(LAYOUT_HEIGHT);
        let natural = if raw_width == Some(WRAP_CONTENT) || raw_height == Some(WRAP_CONTENT) {
            self.natural_size(text.as_deref().unwrap_or_default(), text_size, font)?
        } else {
            None
        };

        let parent_ref = self.parent_ref(parent);
        let width = widget_length(raw_width, parent_ref, |p| p.layout_width(), natural.map(|n| n.0))?;
        let height = widget_length(raw_height, parent_ref, |p| p.layout_height(), natural.map(|n| n.1))?;

        let attrs = ElementAttrs {
            id: id_attr(node)?,
            width,
            height,
            parent,
            gravity: own_gravity(node, parent_ref),
        };

        Ok(self.tree.push(Element::Object(AndroidObject::Button(Button {
            attrs,
            text,
            text_size,
            font,
        }))))
    }

    /// Box of a text widget sized to its content, as `(width, height)`.
    ///
    /// One blank line above and below the text gives three line heights;
    /// half a line height of padding on each side is added to the width.
    /// `None` without a device to measure on.
    fn natural_size(&self, text: &str, size: Dip, font: Font) -> Result<Option<(Dip, Dip)>, LayoutError> {
        let Some(device) = self.parser.device else {
            return Ok(None);
        };

        let (text_width, text_height) = device.text_dimensions(text, size, font)?;
        let overflow = || UnitError::OutOfRange(format!("{:?} at {}", text, size));
        let width = device.to_dip(text_width.checked_add(text_height).ok_or_else(overflow)?)?;
        let height = device.to_dip(text_height.checked_mul(3).ok_or_else(overflow)?)?;

        Ok(Some((width, height)))
    }

    /// Widgets we know nothing about keep whatever geometry can be read
    fn unknown_object(&mut self, parent: Option<ElementId>, node: &XmlElement) -> ElementId {
        let parent_ref = self.parent_ref(parent);

        let best_effort = |attribute: &str, result: Result<Option<Dip>, LayoutError>| {
            result.unwrap_or_else(|e| {
                trace!("<{}> {}: {}", node.name, attribute, e);
                None
            })
        };
        let width = best_effort(
            LAYOUT_WIDTH,
            widget_length(node.attr(LAYOUT_WIDTH), parent_ref, |p| p.layout_width(), None),
        );
        let height = best_effort(
            LAYOUT_HEIGHT,
            widget_length(node.attr(LAYOUT_HEIGHT), parent_ref, |p| p.layout_height(), None),
        );

        let attrs = ElementAttrs {
            id: id_attr(node).ok().flatten(),
            width,
            height,
            parent,
            gravity: own_gravity(node, parent_ref),
        };

        self.tree.push(Element::Object(AndroidObject::Unknown(UnknownObject {
            tag: node.name.clone(),
            attrs,
        })))
    }
}

/// `android:textSize`, which may itself be a resource reference
fn parse_text_size(resources: &ResourceResolver, value: &str) -> Result<Dip, LayoutError> {
    Ok(parse_length(&resources.resolve_value(value)?)?)
}

fn id_attr(node: &XmlElement) -> Result<Option<String>, LayoutError> {
    Ok(node
        .attr(ID)
        .map(|value| resolve_strict(ID, value).map(str::to_string))
        .transpose()?)
}

/// `android:layout_gravity`; absent or a parent sentinel means the container's child gravity
fn own_gravity<P: LayoutParent + ?Sized>(node: &XmlElement, parent: &P) -> Option<String> {
    let inherit = |p: &P| p.child_gravity().map(str::to_string);
    match node.attr(LAYOUT_GRAVITY) {
        None => inherit(parent),
        Some(value) => match resolve_inherited(value, parent, inherit) {
            Inherited::Applied(gravity) => gravity,
            Inherited::NotApplicable(literal) => Some(literal.to_string()),
        },
    }
}

fn layout_length<P: LayoutParent + ?Sized>(
    raw: Option<&str>,
    parent: &P,
    accessor: impl FnOnce(&P) -> Option<Dip>,
) -> Result<LayoutLength, LayoutError> {
    let Some(raw) = raw else {
        return Ok(LayoutLength::Fixed(None));
    };
    Ok(match resolve_inherited(raw, parent, accessor) {
        Inherited::Applied(inherited) => LayoutLength::Fixed(inherited),
        Inherited::NotApplicable(WRAP_CONTENT) => LayoutLength::WrapContent,
        Inherited::NotApplicable(own) => LayoutLength::Fixed(Some(parse_length(own)?)),
    })
}

fn widget_length<P: LayoutParent + ?Sized>(
    raw: Option<&str>,
    parent: &P,
    accessor: impl FnOnce(&P) -> Option<Dip>,
    natural: Option<Dip>,
) -> Result<Option<Dip>, LayoutError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    Ok(match resolve_inherited(raw, parent, accessor) {
        Inherited::Applied(inherited) => inherited,
        Inherited::NotApplicable(WRAP_CONTENT) => natural,
        Inherited::NotApplicable(own) => Some(parse_length(own)?),
    })
}

fn fixed(length: &LayoutLength) -> Option<Dip> {
    match length {
        LayoutLength::Fixed(value) => *value,
        LayoutLength::WrapContent => None,
    }
}

fn set_dimension(tree: &mut LayoutTree, id: ElementId, apply: impl FnOnce(&mut ElementAttrs)) {
    if let Some(element) = tree.get_mut(id) {
        apply(element.attrs_mut());
    }
}
