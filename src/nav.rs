//! Sidebar navigation: flat records grouped into categories and sub-groups.

use serde::{Serialize, Serializer};

use crate::formats::DocumentRecord;

/// Category label for records that carry none.
pub const DEFAULT_CATEGORY: &str = "Umum";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NavigationTree<'a> {
    pub categories: Vec<NavCategory<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavCategory<'a> {
    pub label: String,
    #[serde(serialize_with = "entry_links")]
    pub flat_entries: Vec<&'a DocumentRecord>,
    pub sub_groups: Vec<SubGroup<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubGroup<'a> {
    pub label: String,
    #[serde(serialize_with = "entry_links")]
    pub entries: Vec<&'a DocumentRecord>,
}

#[derive(Serialize)]
struct EntryLink<'r> {
    slug: &'r str,
    title: &'r str,
}

// Navigation output carries links only, never document bodies.
fn entry_links<S>(entries: &[&DocumentRecord], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(entries.iter().map(|d| EntryLink {
        slug: &d.slug,
        title: &d.title,
    }))
}

impl SubGroup<'_> {
    /// Whether the group holds the active slug; such groups start expanded.
    pub fn contains(&self, slug: &str) -> bool {
        self.entries.iter().any(|d| d.slug == slug)
    }
}

impl<'a> NavigationTree<'a> {
    /// Groups `records` by category, then by parent title inside each category.
    ///
    /// Single pass and stable: categories and sub-groups appear in the order they
    /// are first seen, and records keep their input order inside each bucket.
    pub fn build(records: &'a [DocumentRecord]) -> Self {
        let mut categories: Vec<NavCategory<'a>> = Vec::new();

        for record in records {
            let label = record.category().unwrap_or(DEFAULT_CATEGORY);
            let idx = match categories.iter().position(|c| c.label == label) {
                Some(idx) => idx,
                None => {
                    categories.push(NavCategory {
                        label: label.to_owned(),
                        flat_entries: Vec::new(),
                        sub_groups: Vec::new(),
                    });
                    categories.len() - 1
                }
            };
            let category = &mut categories[idx];

            let Some(parent) = record.parent_title() else {
                category.flat_entries.push(record);
                continue;
            };
            match category.sub_groups.iter_mut().find(|g| g.label == parent) {
                Some(group) => group.entries.push(record),
                None => category.sub_groups.push(SubGroup {
                    label: parent.to_owned(),
                    entries: vec![record],
                }),
            }
        }

        Self { categories }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Every record in the tree, category by category: flat entries first, then
    /// each sub-group.
    pub fn flatten(&self) -> Vec<&'a DocumentRecord> {
        self.categories
            .iter()
            .flat_map(|c| {
                c.flat_entries
                    .iter()
                    .copied()
                    .chain(c.sub_groups.iter().flat_map(|g| g.entries.iter().copied()))
            })
            .collect()
    }
}
