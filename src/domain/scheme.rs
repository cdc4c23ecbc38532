//! Xcode scheme vocabulary

use std::fmt;

pub const BUILD_ACTION_ENTRIES: &str = "BuildActionEntries";
pub const BUILD_ACTION_ENTRY: &str = "BuildActionEntry";
pub const BUILDABLE_PRODUCT_RUNNABLE: &str = "BuildableProductRunnable";
pub const BUILDABLE_REFERENCE: &str = "BuildableReference";

pub const BLUEPRINT_NAME: &str = "BlueprintName";
pub const BUILDABLE_NAME: &str = "BuildableName";
pub const BLUEPRINT_IDENTIFIER: &str = "BlueprintIdentifier";

/// File extension of scheme files.
pub const SCHEME_EXTENSION: &str = "xcscheme";

/// The scheme actions that can reference a build target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    Build,
    Test,
    Launch,
    Profile,
}

impl Section {
    /// All sections, in the order they are processed.
    pub const ALL: [Section; 4] = [
        Section::Build,
        Section::Test,
        Section::Launch,
        Section::Profile,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Section::Build => "BuildAction",
            Section::Test => "TestAction",
            Section::Launch => "LaunchAction",
            Section::Profile => "ProfileAction",
        }
    }

    /// `BuildAction` lists its targets as entries; the others hold one runnable.
    pub fn is_list(self) -> bool {
        self == Section::Build
    }

    /// Tag of the node that wraps a reference in this section.
    pub fn wrapper(self) -> &'static str {
        if self.is_list() {
            BUILD_ACTION_ENTRY
        } else {
            BUILDABLE_PRODUCT_RUNNABLE
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
