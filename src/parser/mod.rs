pub mod xml;

pub use xml::{LayoutParser, XmlDocument, XmlElement, XmlError, XmlNode};
