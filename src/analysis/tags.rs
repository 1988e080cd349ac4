use crate::parser::XmlDocument;
use std::collections::BTreeMap;

/// Prefix of tag-count columns
pub const TAG_PREFIX: &str = "tag_";

/// Frequency of each tag in one layout document, keyed `tag_<name>`.
///
/// App-defined tags (names containing `.`) are skipped unless `custom`.
pub fn count_tags(document: &XmlDocument, custom: bool) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for element in document.root.descendants() {
        if !custom && element.name.contains('.') {
            continue;
        }
        *counts.entry(format!("{}{}", TAG_PREFIX, element.name)).or_insert(0) += 1;
    }
    counts
}

/// Number of `Button` elements in a layout document
pub fn count_layout_buttons(document: &XmlDocument) -> usize {
    document
        .root
        .descendants()
        .filter(|element| element.name == "Button")
        .count()
}

/// Combined tag frequencies of all of an app's layout documents
pub fn count_app_tags<'a, I>(documents: I, custom: bool) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a XmlDocument>,
{
    let mut totals = BTreeMap::new();
    for document in documents {
        merge_counts(&mut totals, count_tags(document, custom));
    }
    totals
}

pub(crate) fn merge_counts(totals: &mut BTreeMap<String, usize>, counts: BTreeMap<String, usize>) {
    for (tag, count) in counts {
        *totals.entry(tag).or_insert(0) += count;
    }
}
