//! Build target reference pruning
//!
//! Pure transform over a [`Document`]: the input is never modified, a pruned
//! copy is built by filtering. Which nodes are looked at follows the scheme
//! layout:
//!
//! - `BuildAction/BuildActionEntries/BuildActionEntry/BuildableReference`
//!   (every entry of the first entry list)
//! - `{Test,Launch,Profile}Action/BuildableProductRunnable/BuildableReference`
//!   (first runnable only)
//!
//! Each section is the first child of the root with that tag. Anything that
//! is missing is skipped.

use std::fmt;

use crate::domain::document::{Document, Element, Node};
use crate::domain::scheme::{
    Section, BLUEPRINT_IDENTIFIER, BLUEPRINT_NAME, BUILDABLE_NAME, BUILDABLE_PRODUCT_RUNNABLE,
    BUILDABLE_REFERENCE, BUILD_ACTION_ENTRIES, BUILD_ACTION_ENTRY,
};

/// A wrapper node removed from a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub section: Section,
    /// `BuildActionEntry` or `BuildableProductRunnable`
    pub wrapper: &'static str,
    pub blueprint_name: String,
    pub buildable_name: Option<String>,
}

impl Removal {
    fn from_reference(section: Section, reference: &Element) -> Self {
        Self {
            section,
            wrapper: section.wrapper(),
            blueprint_name: reference.attribute(BLUEPRINT_NAME).unwrap_or_default(),
            buildable_name: reference.attribute(BUILDABLE_NAME),
        }
    }
}

impl fmt::Display for Removal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}: {}", self.section, self.wrapper, self.blueprint_name)?;
        if let Some(buildable) = &self.buildable_name {
            write!(f, " ({buildable})")?;
        }
        Ok(())
    }
}

/// Result of pruning: the new document and what was taken out of it.
#[derive(Debug, Clone)]
pub struct Pruned {
    pub document: Document,
    pub removals: Vec<Removal>,
}

impl Pruned {
    pub fn is_changed(&self) -> bool {
        !self.removals.is_empty()
    }
}

/// A build target reference found in one of the scheme sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceListing {
    pub section: Section,
    pub blueprint_name: Option<String>,
    pub buildable_name: Option<String>,
    pub blueprint_identifier: Option<String>,
}

/// Remove every reference to `target` from the scheme sections.
pub fn prune(document: &Document, target: &str) -> Document {
    prune_with_report(document, target).document
}

/// Like [`prune`], also reporting each removed node.
///
/// Removals are grouped by section in [`Section::ALL`] order, and follow
/// document order within a section.
pub fn prune_with_report(document: &Document, target: &str) -> Pruned {
    let mut removals = Vec::new();
    let mut root = document.root().clone();

    for section in Section::ALL {
        let Some(index) = root.position(section.tag()) else {
            continue;
        };
        let Some(action) = root.children().get(index).and_then(Node::as_element) else {
            continue;
        };
        let pruned = if section.is_list() {
            prune_entries(action, target, &mut removals)
        } else {
            prune_runnable(section, action, target, &mut removals)
        };
        root = root.with_replaced_child(index, pruned);
    }

    Pruned {
        document: document.with_root(root),
        removals,
    }
}

fn prune_entries(action: &Element, target: &str, removals: &mut Vec<Removal>) -> Element {
    let Some(index) = action.position(BUILD_ACTION_ENTRIES) else {
        return action.clone();
    };
    let Some(entries) = action.children().get(index).and_then(Node::as_element) else {
        return action.clone();
    };

    let kept = entries.retain_elements(|_, entry| {
        if entry.name() != BUILD_ACTION_ENTRY {
            return true;
        }
        match matching_reference(entry, target) {
            Some(reference) => {
                removals.push(Removal::from_reference(Section::Build, reference));
                false
            }
            None => true,
        }
    });
    action.with_replaced_child(index, kept)
}

fn prune_runnable(
    section: Section,
    action: &Element,
    target: &str,
    removals: &mut Vec<Removal>,
) -> Element {
    let Some(index) = action.position(BUILDABLE_PRODUCT_RUNNABLE) else {
        return action.clone();
    };
    let Some(reference) = action
        .children()
        .get(index)
        .and_then(Node::as_element)
        .and_then(|runnable| matching_reference(runnable, target))
    else {
        return action.clone();
    };

    removals.push(Removal::from_reference(section, reference));
    action.retain_elements(|i, _| i != index)
}

fn matching_reference<'a>(wrapper: &'a Element, target: &str) -> Option<&'a Element> {
    wrapper
        .find(BUILDABLE_REFERENCE)
        .filter(|reference| reference.attribute(BLUEPRINT_NAME).as_deref() == Some(target))
}

/// All references in the positions [`prune`] looks at, in document order.
pub fn references(document: &Document) -> Vec<ReferenceListing> {
    let root = document.root();
    let mut listings = Vec::new();

    for section in Section::ALL {
        let Some(action) = root.find(section.tag()) else {
            continue;
        };
        let wrappers: Vec<&Element> = if section.is_list() {
            action
                .find(BUILD_ACTION_ENTRIES)
                .map(|entries| {
                    entries
                        .child_elements()
                        .filter(|entry| entry.name() == BUILD_ACTION_ENTRY)
                        .collect()
                })
                .unwrap_or_default()
        } else {
            action.find(BUILDABLE_PRODUCT_RUNNABLE).into_iter().collect()
        };

        listings.extend(
            wrappers
                .into_iter()
                .filter_map(|wrapper| wrapper.find(BUILDABLE_REFERENCE))
                .map(|reference| ReferenceListing {
                    section,
                    blueprint_name: reference.attribute(BLUEPRINT_NAME),
                    buildable_name: reference.attribute(BUILDABLE_NAME),
                    blueprint_identifier: reference.attribute(BLUEPRINT_IDENTIFIER),
                }),
        );
    }
    listings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(name: &str) -> Element {
        Element::new(BUILDABLE_REFERENCE)
            .with_attribute("BuildableIdentifier", "primary")
            .with_attribute(BLUEPRINT_NAME, name)
    }

    fn entry(name: &str) -> Element {
        Element::new(BUILD_ACTION_ENTRY).with_child(reference(name))
    }

    fn runnable_action(tag: &str, name: &str) -> Element {
        Element::new(tag).with_child(Element::new(BUILDABLE_PRODUCT_RUNNABLE).with_child(reference(name)))
    }

    fn entry_names(document: &Document) -> Vec<String> {
        references(document)
            .into_iter()
            .filter(|listing| listing.section == Section::Build)
            .filter_map(|listing| listing.blueprint_name)
            .collect()
    }

    #[test]
    fn given_entries_a_b_a_when_pruning_a_then_only_b_remains() {
        let entries = Element::new(BUILD_ACTION_ENTRIES)
            .with_child(entry("A"))
            .with_child(entry("B"))
            .with_child(entry("A"));
        let document = Document::new(
            Element::new("Scheme").with_child(Element::new("BuildAction").with_child(entries)),
        );

        let pruned = prune_with_report(&document, "A");

        assert_eq!(entry_names(&pruned.document), vec!["B"]);
        assert_eq!(pruned.removals.len(), 2);
        assert!(pruned.removals.iter().all(|r| r.wrapper == BUILD_ACTION_ENTRY));
    }

    #[test]
    fn given_runnable_referencing_target_when_pruning_then_wrapper_is_removed() {
        let document = Document::new(
            Element::new("Scheme").with_child(runnable_action("LaunchAction", "A")),
        );

        let pruned = prune(&document, "A");

        let launch = pruned.root().find("LaunchAction").expect("section kept");
        assert!(launch.find(BUILDABLE_PRODUCT_RUNNABLE).is_none());
    }

    #[test]
    fn given_runnable_referencing_other_target_when_pruning_then_unchanged() {
        let document = Document::new(
            Element::new("Scheme")
                .with_child(runnable_action("TestAction", "B"))
                .with_child(runnable_action("ProfileAction", "B")),
        );
        assert_eq!(prune(&document, "A"), document);
    }

    #[test]
    fn given_absent_sections_when_pruning_then_none_are_created() {
        let document = Document::new(Element::new("Scheme").with_child(Element::new("AnalyzeAction")));
        let pruned = prune(&document, "A");
        for section in Section::ALL {
            assert!(pruned.root().find(section.tag()).is_none());
        }
        assert_eq!(pruned, document);
    }

    #[test]
    fn given_sections_without_wrappers_when_pruning_then_skips_silently() {
        let document = Document::new(
            Element::new("Scheme")
                .with_child(Element::new("BuildAction"))
                .with_child(Element::new("LaunchAction").with_child(Element::new(BUILDABLE_PRODUCT_RUNNABLE))),
        );
        assert_eq!(prune(&document, "A"), document);
    }

    #[test]
    fn given_second_runnable_when_pruning_then_only_first_is_considered() {
        let action = Element::new("LaunchAction")
            .with_child(Element::new(BUILDABLE_PRODUCT_RUNNABLE).with_child(reference("B")))
            .with_child(Element::new(BUILDABLE_PRODUCT_RUNNABLE).with_child(reference("A")));
        let document = Document::new(Element::new("Scheme").with_child(action));

        let pruned = prune_with_report(&document, "A");

        assert!(!pruned.is_changed());
    }

    #[test]
    fn given_target_case_differs_when_pruning_then_no_match() {
        let document = Document::new(
            Element::new("Scheme").with_child(runnable_action("LaunchAction", "HRVSpark")),
        );
        assert!(!prune_with_report(&document, "hrvspark").is_changed());
    }

    #[test]
    fn given_removal_when_displayed_then_names_section_and_target() {
        let removal = Removal {
            section: Section::Launch,
            wrapper: BUILDABLE_PRODUCT_RUNNABLE,
            blueprint_name: "App".into(),
            buildable_name: Some("App.app".into()),
        };
        assert_eq!(
            removal.to_string(),
            "LaunchAction/BuildableProductRunnable: App (App.app)"
        );
    }
}
