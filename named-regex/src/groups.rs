//! Name registry for capture groups
//!
//! This module tracks every capture group discovered while scanning a
//! pattern. Unnamed groups only consume an index; named groups are also
//! recorded under their name. A name may be declared more than once, in
//! which case each declaration is kept, in order, and addressed by an
//! instance ordinal.

use std::collections::HashMap;

use crate::error::{RegexError, Result};

/// Information about one named capture group
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupInfo {
    /// The group name as written in the pattern
    pub name: String,
    /// Character offset of the group's opening `(` in the named pattern
    pub pos: usize,
    /// The native group index (1-based, matching `\1`, `\2`, ...)
    pub group_index: usize,
}

/// Registry mapping group names to their declarations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameRegistry {
    /// Map from name to every group carrying it, in declaration order
    groups: HashMap<String, Vec<GroupInfo>>,
    /// Distinct names in first-occurrence order
    names: Vec<String>,
    /// Total capture groups seen, named or not
    group_count: usize,
}

impl NameRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an unnamed capture group, returning its index
    pub fn register_unnamed(&mut self) -> usize {
        self.group_count += 1;
        self.group_count
    }

    /// Register a named capture group opened at character offset `pos`
    ///
    /// Duplicate names are appended after earlier declarations of the same
    /// name rather than rejected.
    pub fn register_named(&mut self, name: &str, pos: usize) -> usize {
        self.group_count += 1;
        let info = GroupInfo {
            name: name.to_string(),
            pos,
            group_index: self.group_count,
        };
        match self.groups.get_mut(name) {
            Some(infos) => infos.push(info),
            None => {
                self.names.push(name.to_string());
                self.groups.insert(name.to_string(), vec![info]);
            }
        }
        self.group_count
    }

    /// Index of the first group declared with `name`
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.groups
            .get(name)
            .and_then(|infos| infos.first())
            .map(|info| info.group_index)
    }

    /// Index of the `instance`-th group declared with `name`
    ///
    /// Returns `Ok(None)` for an unknown name, and an error when the name is
    /// known but has fewer than `instance + 1` declarations.
    pub fn index_of_instance(&self, name: &str, instance: usize) -> Result<Option<usize>> {
        let Some(infos) = self.groups.get(name) else {
            return Ok(None);
        };
        infos
            .get(instance)
            .map(|info| Some(info.group_index))
            .ok_or_else(|| RegexError::InstanceOutOfRange {
                name: name.to_string(),
                instance,
                count: infos.len(),
            })
    }

    /// Resolve `name` and `instance` to an index, failing for unknown names
    pub fn resolve(&self, name: &str, instance: usize) -> Result<usize> {
        self.index_of_instance(name, instance)?
            .ok_or_else(|| RegexError::NoSuchGroup(name.to_string()))
    }

    /// Every declaration of `name`
    pub fn get(&self, name: &str) -> Option<&[GroupInfo]> {
        self.groups.get(name).map(Vec::as_slice)
    }

    /// Check if a group name exists
    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// Distinct names in first-occurrence order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The full name to declarations map
    pub fn group_info(&self) -> &HashMap<String, Vec<GroupInfo>> {
        &self.groups
    }

    /// Get the total number of capture groups, named and unnamed
    pub fn group_count(&self) -> usize {
        self.group_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_unnamed_group() {
        let mut registry = NameRegistry::new();
        assert_eq!(registry.register_unnamed(), 1);
        assert_eq!(registry.group_count(), 1);
        assert!(registry.names().is_empty());
    }

    #[test]
    fn test_register_named_group() {
        let mut registry = NameRegistry::new();
        let index = registry.register_named("name", 0);
        assert_eq!(index, 1);
        assert!(registry.contains("name"));
        assert_eq!(registry.index_of("name"), Some(1));
    }

    #[test]
    fn test_register_multiple_groups() {
        let mut registry = NameRegistry::new();
        let idx1 = registry.register_named("first", 0);
        let idx2 = registry.register_unnamed();
        let idx3 = registry.register_named("third", 12);

        assert_eq!((idx1, idx2, idx3), (1, 2, 3));
        assert_eq!(registry.group_count(), 3);
        assert_eq!(registry.names(), ["first", "third"]);
    }

    #[test]
    fn test_duplicate_names_keep_declaration_order() {
        let mut registry = NameRegistry::new();
        registry.register_unnamed();
        registry.register_named("named", 3);
        registry.register_unnamed();
        registry.register_named("named", 20);

        let infos = registry.get("named").unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].group_index, 2);
        assert_eq!(infos[1].group_index, 4);
        assert_eq!(infos[1].pos, 20);
        assert_eq!(registry.names(), ["named"]);
    }

    #[test]
    fn test_index_of_instance() {
        let mut registry = NameRegistry::new();
        registry.register_named("dup", 0);
        registry.register_named("dup", 5);

        assert_eq!(registry.index_of_instance("dup", 0).unwrap(), Some(1));
        assert_eq!(registry.index_of_instance("dup", 1).unwrap(), Some(2));
        assert_eq!(registry.index_of_instance("missing", 0).unwrap(), None);
        assert!(matches!(
            registry.index_of_instance("dup", 2),
            Err(RegexError::InstanceOutOfRange { instance: 2, count: 2, .. })
        ));
    }

    #[test]
    fn test_resolve_unknown_name() {
        let registry = NameRegistry::new();
        assert_eq!(
            registry.resolve("nope", 0),
            Err(RegexError::NoSuchGroup("nope".to_string()))
        );
    }
}
