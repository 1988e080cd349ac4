use super::inherit::LayoutParent;
use super::ElementId;
use crate::device::Font;
use crate::units::Dip;

/// Attributes shared by every element
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementAttrs {
    pub id: Option<String>,
    pub width: Option<Dip>,
    pub height: Option<Dip>,
    /// Containing layout; `None` for the root
    pub parent: Option<ElementId>,
    /// The element's own gravity (`android:layout_gravity`), as opposed to
    /// [`AndroidLayout::child_gravity`]
    pub gravity: Option<String>,
}

impl ElementAttrs {
    /// `height × width`, if both are known
    pub fn area(&self) -> Option<i64> {
        Some(i64::from(self.height?.value()) * i64::from(self.width?.value()))
    }
}

/// Layout containers known by tag name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    Linear,
    Frame,
    Table,
    TableRow,
    Relative,
}

impl LayoutKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "LinearLayout" => Some(LayoutKind::Linear),
            "FrameLayout" => Some(LayoutKind::Frame),
            "TableLayout" => Some(LayoutKind::Table),
            "TableRow" => Some(LayoutKind::TableRow),
            "RelativeLayout" => Some(LayoutKind::Relative),
            _ => None,
        }
    }

    pub fn tag_name(&self) -> &'static str {
        match self {
            LayoutKind::Linear => "LinearLayout",
            LayoutKind::Frame => "FrameLayout",
            LayoutKind::Table => "TableLayout",
            LayoutKind::TableRow => "TableRow",
            LayoutKind::Relative => "RelativeLayout",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "horizontal" => Some(Orientation::Horizontal),
            "vertical" => Some(Orientation::Vertical),
            _ => None,
        }
    }
}

/// A container of other elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidLayout {
    pub kind: LayoutKind,
    pub attrs: ElementAttrs,
    pub orientation: Orientation,
    /// Default gravity of the children (`android:gravity`)
    pub child_gravity: Option<String>,
    /// `android:layout_width` as written
    pub raw_width: Option<String>,
    /// `android:layout_height` as written
    pub raw_height: Option<String>,
    pub children: Vec<ElementId>,
}

impl AndroidLayout {
    pub fn new(kind: LayoutKind) -> Self {
        Self {
            kind,
            attrs: ElementAttrs::default(),
            orientation: Orientation::default(),
            child_gravity: None,
            raw_width: None,
            raw_height: None,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub attrs: ElementAttrs,
    pub text: Option<String>,
    pub text_size: Dip,
    pub font: Font,
}

/// A widget we only know the box of
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownObject {
    pub tag: String,
    pub attrs: ElementAttrs,
}

/// A leaf widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AndroidObject {
    Button(Button),
    Unknown(UnknownObject),
}

/// A node of a [`LayoutTree`](super::LayoutTree)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Layout(AndroidLayout),
    Object(AndroidObject),
}

impl Element {
    pub fn attrs(&self) -> &ElementAttrs {
        match self {
            Element::Layout(layout) => &layout.attrs,
            Element::Object(AndroidObject::Button(button)) => &button.attrs,
            Element::Object(AndroidObject::Unknown(unknown)) => &unknown.attrs,
        }
    }

    pub fn attrs_mut(&mut self) -> &mut ElementAttrs {
        match self {
            Element::Layout(layout) => &mut layout.attrs,
            Element::Object(AndroidObject::Button(button)) => &mut button.attrs,
            Element::Object(AndroidObject::Unknown(unknown)) => &mut unknown.attrs,
        }
    }

    /// XML tag this element was built from
    pub fn tag_name(&self) -> &str {
        match self {
            Element::Layout(layout) => layout.kind.tag_name(),
            Element::Object(AndroidObject::Button(_)) => "Button",
            Element::Object(AndroidObject::Unknown(unknown)) => &unknown.tag,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.attrs().id.as_deref()
    }

    pub fn width(&self) -> Option<Dip> {
        self.attrs().width
    }

    pub fn height(&self) -> Option<Dip> {
        self.attrs().height
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.attrs().parent
    }

    pub fn area(&self) -> Option<i64> {
        self.attrs().area()
    }

    pub fn as_layout(&self) -> Option<&AndroidLayout> {
        match self {
            Element::Layout(layout) => Some(layout),
            Element::Object(_) => None,
        }
    }

    pub fn as_button(&self) -> Option<&Button> {
        match self {
            Element::Object(AndroidObject::Button(button)) => Some(button),
            _ => None,
        }
    }

    pub fn is_button(&self) -> bool {
        self.as_button().is_some()
    }

    pub fn is_kind(&self, kind: LayoutKind) -> bool {
        self.as_layout().is_some_and(|layout| layout.kind == kind)
    }

    pub fn children(&self) -> &[ElementId] {
        match self {
            Element::Layout(layout) => &layout.children,
            Element::Object(_) => &[],
        }
    }
}

impl LayoutParent for Element {
    fn layout_width(&self) -> Option<Dip> {
        self.width()
    }

    fn layout_height(&self) -> Option<Dip> {
        self.height()
    }

    fn child_gravity(&self) -> Option<&str> {
        self.as_layout()?.child_gravity.as_deref()
    }
}
