use crate::models::Course;

/// Category value that disables the category filter.
pub const ALL_CATEGORIES: &str = "all";

/// Visible subset of `courses` for a query and a category.
///
/// A blank query matches everything; an empty or `"all"` category matches
/// everything. Both filters must pass, and the input order is kept.
/// Surrounding whitespace only decides blankness: a non-blank query is
/// matched as given.
pub fn filter_courses(courses: &[Course], query: &str, category: &str) -> Vec<Course> {
    let by_query = !query.trim().is_empty();
    let needle = query.to_lowercase();
    let by_category = is_category_filter(category);

    courses
        .iter()
        .filter(|course| !by_query || course.matches_query(&needle))
        .filter(|course| !by_category || course.in_category(category))
        .cloned()
        .collect()
}

fn is_category_filter(category: &str) -> bool {
    !category.is_empty() && category != ALL_CATEGORIES
}

/// Search state driven by the UI: the free-text query and the selected category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub query: String,
    pub category: String,
}

impl FilterState {
    pub fn apply(&self, courses: &[Course]) -> Vec<Course> {
        filter_courses(courses, &self.query, &self.category)
    }

    pub fn is_active(&self) -> bool {
        !self.query.trim().is_empty() || is_category_filter(&self.category)
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.category.clear();
    }
}
