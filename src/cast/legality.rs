//! Static cast legality table.

use crate::types::{Category, TypeDescriptor};

/// Returns whether a cast from `source` to `target` is defined at all.
///
/// Legality depends only on the two categories; parameters never make a
/// cast illegal.
#[must_use]
pub fn is_legal_cast(source: &TypeDescriptor, target: &TypeDescriptor) -> bool {
    is_legal_category_pair(source.category(), target.category())
}

/// Category-level form of [`is_legal_cast`].
#[must_use]
pub fn is_legal_category_pair(source: Category, target: Category) -> bool {
    if never_converts(source) || never_converts(target) {
        return false;
    }
    if source == target {
        // Only re-enforcing parameters makes an identity cast meaningful.
        return source.is_parameterized();
    }
    !matches!(
        (source, target),
        (Category::Binary, Category::Decimal)
            | (Category::Binary, Category::Timestamp)
            | (Category::Date, Category::Decimal)
    )
}

fn never_converts(category: Category) -> bool {
    matches!(
        category,
        Category::Void
            | Category::Unknown
            | Category::IntervalYearMonth
            | Category::IntervalDayTime
    )
}
