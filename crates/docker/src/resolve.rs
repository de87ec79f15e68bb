//! Identity resolution over already-fetched entity collections.
//!
//! Nothing here talks to the engine. The façade lists a collection first and
//! then applies these matchers, so every function is pure and preserves input
//! order. When several entities match, the first one in input order wins;
//! duplicates are never removed.

use std::collections::{BTreeSet, HashMap};

use crate::entity::{ContainerSummary, Labels, NetworkSummary, VolumeSummary};

/// Entities addressable by a single ID or a single name.
pub trait NamedEntity {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

/// Entities carrying a label map.
pub trait Labeled {
    fn labels(&self) -> &Labels;
}

impl NamedEntity for NetworkSummary {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl NamedEntity for VolumeSummary {
    // a volume is identified by its name
    fn id(&self) -> &str {
        &self.name
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Labeled for ContainerSummary {
    fn labels(&self) -> &Labels {
        &self.labels
    }
}

impl Labeled for NetworkSummary {
    fn labels(&self) -> &Labels {
        &self.labels
    }
}

impl Labeled for VolumeSummary {
    fn labels(&self) -> &Labels {
        &self.labels
    }
}

/// Finds a container whose ID equals `key` or one of whose names matches it.
///
/// Engine names carry a leading `/`; `key` may be given with or without it.
pub fn find_container_by_name_or_id<'a>(
    containers: &'a [ContainerSummary],
    key: &str,
) -> Option<&'a ContainerSummary> {
    if key.is_empty() {
        return None;
    }
    let wanted = format!("/{}", key.trim_start_matches('/'));
    containers
        .iter()
        .find(|c| c.id == key || c.names.iter().any(|n| *n == wanted))
}

/// Finds a network or volume by exact ID or name.
pub fn find_by_name_or_id<'a, T: NamedEntity>(entities: &'a [T], key: &str) -> Option<&'a T> {
    if key.is_empty() {
        return None;
    }
    entities.iter().find(|e| e.id() == key || e.name() == key)
}

/// Keeps entities whose label `name` is present with exactly `value`.
///
/// An empty label name matches nothing.
pub fn filter_by_label<'a, T: Labeled>(entities: &'a [T], name: &str, value: &str) -> Vec<&'a T> {
    if name.is_empty() {
        return Vec::new();
    }
    entities
        .iter()
        .filter(|e| e.labels().get(name).is_some_and(|v| v == value))
        .collect()
}

/// Keeps containers created from exactly `image`.
pub fn filter_containers_by_image<'a>(
    containers: &'a [ContainerSummary],
    image: &str,
) -> Vec<&'a ContainerSummary> {
    containers.iter().filter(|c| c.image == image).collect()
}

/// A set of network names to match containers against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkSet {
    names: BTreeSet<String>,
}

impl NetworkSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds the set from the keys of a network-settings mapping.
    pub fn from_settings<V>(settings: &HashMap<String, V>) -> Self {
        Self::new(settings.keys().cloned())
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for NetworkSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// True when at least one attached network name is in `set`.
pub fn in_networks<'a, I>(attached: I, set: &NetworkSet) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    if set.is_empty() {
        return false;
    }
    attached.into_iter().any(|name| set.contains(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(id: &str, names: &[&str], image: &str, labels: &[(&str, &str)]) -> ContainerSummary {
        ContainerSummary {
            id: id.to_owned(),
            names: names.iter().map(|n| (*n).to_owned()).collect(),
            image: image.to_owned(),
            state: "running".to_owned(),
            labels: labels
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        }
    }

    fn network(id: &str, name: &str) -> NetworkSummary {
        NetworkSummary {
            id: id.to_owned(),
            name: name.to_owned(),
            driver: "bridge".to_owned(),
            labels: Labels::new(),
        }
    }

    fn fleet() -> Vec<ContainerSummary> {
        vec![
            container("aaa111", &["/web"], "nginx:latest", &[("tier", "front")]),
            container("bbb222", &["/db", "/db-alias"], "postgres:16", &[("tier", "back")]),
            container("ccc333", &["/worker"], "nginx:latest", &[("tier", "front")]),
        ]
    }

    #[test]
    fn container_found_by_id() {
        let list = fleet();
        assert_eq!(find_container_by_name_or_id(&list, "bbb222").unwrap().id, "bbb222");
    }

    #[test]
    fn container_found_by_name_with_or_without_slash() {
        let list = fleet();
        assert_eq!(find_container_by_name_or_id(&list, "db-alias").unwrap().id, "bbb222");
        assert_eq!(find_container_by_name_or_id(&list, "/web").unwrap().id, "aaa111");
    }

    #[test]
    fn bare_and_slashed_keys_resolve_the_same_container() {
        let list = fleet();
        let bare = find_container_by_name_or_id(&list, "web").unwrap();
        let slashed = find_container_by_name_or_id(&list, "/web").unwrap();
        assert_eq!(bare.id, "aaa111");
        assert!(std::ptr::eq(bare, slashed));
    }

    #[test]
    fn repeated_leading_slashes_collapse_to_one() {
        let list = fleet();
        assert_eq!(find_container_by_name_or_id(&list, "//web").unwrap().id, "aaa111");
        assert_eq!(find_container_by_name_or_id(&list, "///db").unwrap().id, "bbb222");
    }

    #[test]
    fn absent_container_is_none() {
        let list = fleet();
        assert!(find_container_by_name_or_id(&list, "zzz999").is_none());
        assert!(find_container_by_name_or_id(&list, "").is_none());
    }

    #[test]
    fn first_match_wins() {
        let list = vec![
            container("one", &["/dup"], "a", &[]),
            container("two", &["/dup"], "b", &[]),
        ];
        assert_eq!(find_container_by_name_or_id(&list, "dup").unwrap().id, "one");
    }

    #[test]
    fn named_entity_by_id_or_name() {
        let nets = vec![network("n1", "frontend"), network("n2", "backend")];
        assert_eq!(find_by_name_or_id(&nets, "backend").unwrap().id, "n2");
        assert_eq!(find_by_name_or_id(&nets, "n1").unwrap().name, "frontend");
        assert!(find_by_name_or_id(&nets, "missing").is_none());
    }

    #[test]
    fn volume_id_is_its_name() {
        let vols = vec![VolumeSummary {
            name: "cache".to_owned(),
            ..Default::default()
        }];
        assert_eq!(find_by_name_or_id(&vols, "cache").unwrap().id(), "cache");
    }

    #[test]
    fn label_filter_exact_match_in_order() {
        let list = fleet();
        let front: Vec<_> = filter_by_label(&list, "tier", "front")
            .into_iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(front, vec!["aaa111", "ccc333"]);
        assert!(filter_by_label(&list, "tier", "fron").is_empty());
    }

    #[test]
    fn empty_label_name_matches_nothing() {
        let list = vec![container("x", &["/x"], "a", &[("", "")])];
        assert!(filter_by_label(&list, "", "").is_empty());
    }

    #[test]
    fn image_filter_exact() {
        let list = fleet();
        assert_eq!(filter_containers_by_image(&list, "nginx:latest").len(), 2);
        assert!(filter_containers_by_image(&list, "nginx").is_empty());
    }

    #[test]
    fn network_set_from_settings_keys() {
        let mut settings = HashMap::new();
        settings.insert("frontend".to_owned(), ());
        settings.insert("backend".to_owned(), ());
        let set = NetworkSet::from_settings(&settings);
        assert_eq!(set.len(), 2);
        assert!(set.contains("backend"));
    }

    #[test]
    fn in_networks_intersects() {
        let set: NetworkSet = ["backend", "monitoring"].into_iter().collect();
        assert!(in_networks(["frontend", "backend"], &set));
        assert!(!in_networks(["frontend"], &set));
        assert!(!in_networks([], &set));
    }

    #[test]
    fn empty_network_set_matches_nothing() {
        assert!(!in_networks(["bridge"], &NetworkSet::default()));
    }
}
