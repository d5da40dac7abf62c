use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CategoryModel {
    pub id: i32,
    pub name: &'static str,
}

pub const CATEGORIES: [CategoryModel; 10] = [
    CategoryModel { id: 1, name: "Entertainment" },
    CategoryModel { id: 2, name: "Music" },
    CategoryModel { id: 3, name: "Productivity" },
    CategoryModel { id: 4, name: "Shopping" },
    CategoryModel { id: 5, name: "Utilities" },
    CategoryModel { id: 6, name: "Gaming" },
    CategoryModel { id: 7, name: "Health & Fitness" },
    CategoryModel { id: 8, name: "News & Magazines" },
    CategoryModel { id: 9, name: "Cloud Storage" },
    CategoryModel { id: 10, name: "Other" },
];

pub fn find_category(id: i32) -> Option<CategoryModel> {
    CATEGORIES.iter().copied().find(|category| category.id == id)
}
