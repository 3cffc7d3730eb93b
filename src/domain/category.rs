#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
}

/// Input for creating a category. Unset fields take their defaults.
#[derive(Debug, Clone, Default)]
pub struct CategoryDraft {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Partial update: the name is always replaced, the rest only when set.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl Category {
    pub fn apply(&mut self, patch: CategoryPatch) {
        self.name = patch.name;
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(icon) = patch.icon {
            self.icon = Some(icon);
        }
        if let Some(order) = patch.display_order {
            self.display_order = order;
        }
        if let Some(active) = patch.is_active {
            self.is_active = active;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCount {
    pub category_id: i32,
    pub category_name: String,
    pub product_count: i64,
}

/// Sort key used for every category listing.
pub fn sort_by_display_order(categories: &mut [Category]) {
    categories.sort_by_key(|c| (c.display_order, c.id));
}
