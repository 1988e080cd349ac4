use crate::device::AndroidDevice;
use crate::units::{is_parent_sentinel, Dip};
use thiserror::Error;
use tracing::debug;

/// An inheritance sentinel appeared on an attribute that cannot inherit
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{attribute} is not inheritable but was given {value:?}")]
pub struct NotInheritable {
    pub attribute: String,
    pub value: String,
}

/// Something an element can inherit attribute values from
pub trait LayoutParent {
    fn layout_width(&self) -> Option<Dip>;
    fn layout_height(&self) -> Option<Dip>;
    /// Default gravity this parent gives its children (`android:gravity`)
    fn child_gravity(&self) -> Option<&str>;
}

/// Stand-in parent for a root element when no device is simulated
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl LayoutParent for Detached {
    fn layout_width(&self) -> Option<Dip> {
        None
    }

    fn layout_height(&self) -> Option<Dip> {
        None
    }

    fn child_gravity(&self) -> Option<&str> {
        None
    }
}

/// The screen is the parent of a root layout
impl LayoutParent for AndroidDevice {
    fn layout_width(&self) -> Option<Dip> {
        self.width()
            .map_err(|e| debug!("{}: no screen width to inherit: {}", self.name(), e))
            .ok()
    }

    fn layout_height(&self) -> Option<Dip> {
        self.height()
            .map_err(|e| debug!("{}: no screen height to inherit: {}", self.name(), e))
            .ok()
    }

    fn child_gravity(&self) -> Option<&str> {
        None
    }
}

/// Outcome of [`resolve_inherited`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inherited<'v, T> {
    /// The value was a parent sentinel; this is what the parent holds
    Applied(Option<T>),
    /// The value is the element's own and still needs converting
    NotApplicable(&'v str),
}

/// Resolve `match_parent` / `fill_parent` against `parent` through `accessor`
pub fn resolve_inherited<'v, P, T, F>(value: &'v str, parent: &P, accessor: F) -> Inherited<'v, T>
where
    P: ?Sized,
    F: FnOnce(&P) -> Option<T>,
{
    if is_parent_sentinel(value) {
        Inherited::Applied(accessor(parent))
    } else {
        Inherited::NotApplicable(value)
    }
}

/// Pass `value` through, rejecting inheritance sentinels on `attribute`
pub fn resolve_strict<'v>(attribute: &str, value: &'v str) -> Result<&'v str, NotInheritable> {
    if is_parent_sentinel(value) {
        return Err(NotInheritable {
            attribute: attribute.to_string(),
            value: value.to_string(),
        });
    }
    Ok(value)
}
