use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::attributes::{AttributeContainer, StyleOverride};

/// Maps an inline attribute spec (the `{...}` part of `[text]{...}`) to
/// style overrides on top of the inherited attributes.
pub trait AttributeResolver: Send + Sync {
    fn resolve(&self, spec: &str, inherited: &AttributeContainer) -> AttributeContainer;
}

impl<F> AttributeResolver for F
where
    F: Fn(&str, &AttributeContainer) -> AttributeContainer + Send + Sync,
{
    fn resolve(&self, spec: &str, inherited: &AttributeContainer) -> AttributeContainer {
        self(spec, inherited)
    }
}

/// Ignores the spec and keeps the inherited attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl AttributeResolver for IdentityResolver {
    fn resolve(&self, _spec: &str, inherited: &AttributeContainer) -> AttributeContainer {
        inherited.clone()
    }
}

/// Resolves class names in a spec against a table of configured styles.
///
/// Both `.name` tokens and `class: "a b"` entries are recognised. Classes are
/// applied in the order they appear; unknown classes are ignored.
#[derive(Debug, Clone, Default)]
pub struct ClassResolver {
    classes: BTreeMap<String, StyleOverride>,
}

impl ClassResolver {
    pub fn new(classes: impl IntoIterator<Item = (String, StyleOverride)>) -> Self {
        Self {
            classes: classes.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Class names mentioned in `spec`, in order of appearance.
    pub fn class_names(spec: &str) -> Vec<&str> {
        static CLASS_REGEX: OnceLock<Regex> = OnceLock::new();
        let class_regex = CLASS_REGEX.get_or_init(|| {
            Regex::new(r#"\.([A-Za-z_][\w-]*)|class\s*:\s*"([^"]*)""#)
                .expect("Invalid class regex")
        });

        let mut names = Vec::new();
        for caps in class_regex.captures_iter(spec) {
            if let Some(dotted) = caps.get(1) {
                names.push(dotted.as_str());
            } else if let Some(list) = caps.get(2) {
                names.extend(list.as_str().split_whitespace());
            }
        }
        names
    }
}

impl AttributeResolver for ClassResolver {
    fn resolve(&self, spec: &str, inherited: &AttributeContainer) -> AttributeContainer {
        let mut container = inherited.clone();
        for name in Self::class_names(spec) {
            match self.classes.get(name) {
                Some(style) => container = style.apply(&container),
                None => log::debug!("No style configured for inline class `{name}`"),
            }
        }
        container
    }
}
