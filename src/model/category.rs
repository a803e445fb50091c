use serde::{Deserialize, Serialize};

/// The name shown for a category id that does not resolve, e.g. because the category was deleted.
pub const NOT_AVAILABLE: &str = "N/A";

/// A user-defined label attached to transactions.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub(crate) id: String,
    pub(crate) name: String,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The category list. Transactions hold category ids by reference; nothing prevents an id from
/// dangling, so lookups fall back to `NOT_AVAILABLE` instead of failing.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Categories(Vec<Category>);

impl Categories {
    pub fn new(data: Vec<Category>) -> Self {
        Self(data)
    }

    /// The categories seeded on first run.
    pub fn defaults() -> Self {
        Self(vec![
            Category::new("1", "Utilities"),
            Category::new("2", "Salaries"),
            Category::new("3", "Rent"),
            Category::new("4", "Events"),
            Category::new("5", "Donations"),
            Category::new("7", "Membership Fees"),
            Category::new("6", "Other"),
        ])
    }

    pub fn data(&self) -> &[Category] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.0.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Returns the display name for `id`, or `N/A` if no category has that id.
    pub fn resolve(&self, id: &str) -> &str {
        self.get(id).map(Category::name).unwrap_or(NOT_AVAILABLE)
    }
}
