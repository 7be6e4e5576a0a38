use once_cell::sync::Lazy;
use uuid::Uuid;

use crate::domain::{Category, Profile, TransactionKind};

use super::{ServiceError, ServiceResult};

/// Starter catalog installed into fresh profiles.
static DEFAULT_CATEGORIES: Lazy<Vec<(&'static str, TransactionKind, &'static str)>> =
    Lazy::new(|| {
        vec![
            ("Salary", TransactionKind::Income, "💰"),
            ("Freelance", TransactionKind::Income, "💼"),
            ("Investments", TransactionKind::Income, "📈"),
            ("Other Income", TransactionKind::Income, "🪙"),
            ("Housing", TransactionKind::Expense, "🏠"),
            ("Utilities", TransactionKind::Expense, "💡"),
            ("Groceries", TransactionKind::Expense, "🛒"),
            ("Dining Out", TransactionKind::Expense, "🍽️"),
            ("Transportation", TransactionKind::Expense, "🚗"),
            ("Healthcare", TransactionKind::Expense, "🏥"),
            ("Entertainment", TransactionKind::Expense, "🎬"),
            ("Shopping", TransactionKind::Expense, "🛍️"),
            ("Subscriptions", TransactionKind::Expense, "📺"),
            ("Education", TransactionKind::Expense, "🎓"),
            ("Travel", TransactionKind::Expense, "✈️"),
            ("Miscellaneous", TransactionKind::Expense, "📦"),
        ]
    });

pub struct CategoryService;

impl CategoryService {
    pub fn add(profile: &mut Profile, category: Category) -> ServiceResult<Uuid> {
        Self::validate_name(profile, None, category.parent_id, &category.name)?;
        if let Some(parent_id) = category.parent_id {
            Self::validate_parent(profile, parent_id, None)?;
        }
        Ok(profile.add_category(category))
    }

    pub fn edit(profile: &mut Profile, id: Uuid, changes: Category) -> ServiceResult<()> {
        Self::validate_name(profile, Some(id), changes.parent_id, &changes.name)?;
        if let Some(parent_id) = changes.parent_id {
            Self::validate_parent(profile, parent_id, Some(id))?;
        }
        let category = profile
            .category_mut(id)
            .ok_or_else(|| ServiceError::NotFound(format!("category {id}")))?;
        category.name = changes.name;
        category.kind = changes.kind;
        category.parent_id = changes.parent_id;
        category.icon = changes.icon;
        category.color = changes.color;
        category.is_active = changes.is_active;
        profile.touch();
        Ok(())
    }

    pub fn remove(profile: &mut Profile, id: Uuid) -> ServiceResult<()> {
        if profile
            .categories
            .iter()
            .any(|category| category.parent_id == Some(id))
        {
            return Err(ServiceError::Invalid(
                "Category has child categories".into(),
            ));
        }
        if profile
            .transactions
            .iter()
            .any(|txn| txn.category_id == Some(id))
        {
            return Err(ServiceError::Invalid(
                "Category has linked transactions".into(),
            ));
        }
        let before = profile.categories.len();
        profile.categories.retain(|category| category.id != id);
        if profile.categories.len() == before {
            return Err(ServiceError::NotFound(format!("category {id}")));
        }
        profile.touch();
        Ok(())
    }

    pub fn list<'a>(profile: &'a Profile) -> Vec<&'a Category> {
        profile.categories.iter().collect()
    }

    pub fn subcategories<'a>(profile: &'a Profile, parent_id: Uuid) -> Vec<&'a Category> {
        profile
            .categories
            .iter()
            .filter(|category| category.parent_id == Some(parent_id))
            .collect()
    }

    /// Installs the starter catalog, skipping names that already exist.
    /// Returns the number of categories added.
    pub fn install_defaults(profile: &mut Profile) -> usize {
        let mut installed = 0;
        for (name, kind, icon) in DEFAULT_CATEGORIES.iter() {
            let exists = profile
                .categories
                .iter()
                .any(|category| category.name.eq_ignore_ascii_case(name));
            if exists {
                continue;
            }
            profile.add_category(Category::new(*name, kind.clone()).with_icon(*icon));
            installed += 1;
        }
        installed
    }

    fn validate_name(
        profile: &Profile,
        exclude: Option<Uuid>,
        parent_id: Option<Uuid>,
        candidate: &str,
    ) -> ServiceResult<()> {
        if candidate.trim().is_empty() {
            return Err(ServiceError::Invalid("Category name cannot be empty".into()));
        }
        let normalized = candidate.trim().to_lowercase();
        let duplicate = profile.categories.iter().any(|category| {
            category.parent_id == parent_id
                && category.name.trim().to_lowercase() == normalized
                && exclude.map_or(true, |id| category.id != id)
        });
        if duplicate {
            Err(ServiceError::Invalid(format!(
                "Category `{candidate}` already exists",
            )))
        } else {
            Ok(())
        }
    }

    fn validate_parent(
        profile: &Profile,
        parent_id: Uuid,
        current: Option<Uuid>,
    ) -> ServiceResult<()> {
        if Some(parent_id) == current {
            return Err(ServiceError::Invalid(
                "Category cannot be its own parent".into(),
            ));
        }
        if profile.category(parent_id).is_none() {
            return Err(ServiceError::NotFound(format!("category {parent_id}")));
        }
        // Walk up the parent chain so a reparent cannot create a cycle.
        if let Some(current) = current {
            let mut cursor = Some(parent_id);
            let mut hops = 0;
            while let Some(id) = cursor {
                if id == current {
                    return Err(ServiceError::Invalid(
                        "Category cannot be moved under its own subcategory".into(),
                    ));
                }
                cursor = profile.category(id).and_then(|category| category.parent_id);
                hops += 1;
                if hops > profile.categories.len() {
                    break;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::Transaction;
    use rust_decimal_macros::dec;

    fn base_profile() -> Profile {
        Profile::new("test")
    }

    #[test]
    fn add_rejects_duplicate_sibling_names() {
        let mut profile = base_profile();
        CategoryService::add(&mut profile, Category::new("Groceries", TransactionKind::Expense))
            .unwrap();

        let err = CategoryService::add(
            &mut profile,
            Category::new("  groceries ", TransactionKind::Expense),
        )
        .expect_err("duplicate name should be rejected");
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[test]
    fn same_name_allowed_under_different_parents() {
        let mut profile = base_profile();
        let food =
            CategoryService::add(&mut profile, Category::new("Food", TransactionKind::Expense))
                .unwrap();
        let home =
            CategoryService::add(&mut profile, Category::new("Home", TransactionKind::Expense))
                .unwrap();

        CategoryService::add(
            &mut profile,
            Category::new("Supplies", TransactionKind::Expense).with_parent(food),
        )
        .unwrap();
        CategoryService::add(
            &mut profile,
            Category::new("Supplies", TransactionKind::Expense).with_parent(home),
        )
        .unwrap();
        assert_eq!(profile.categories.len(), 4);
    }

    #[test]
    fn edit_rejects_self_parent() {
        let mut profile = base_profile();
        let id =
            CategoryService::add(&mut profile, Category::new("Food", TransactionKind::Expense))
                .unwrap();

        let mut changes = profile.category(id).unwrap().clone();
        changes.parent_id = Some(id);
        let err = CategoryService::edit(&mut profile, id, changes)
            .expect_err("self parent should be rejected");
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[test]
    fn edit_rejects_parent_cycle() {
        let mut profile = base_profile();
        let parent =
            CategoryService::add(&mut profile, Category::new("Food", TransactionKind::Expense))
                .unwrap();
        let child = CategoryService::add(
            &mut profile,
            Category::new("Groceries", TransactionKind::Expense).with_parent(parent),
        )
        .unwrap();

        let mut changes = profile.category(parent).unwrap().clone();
        changes.parent_id = Some(child);
        let err = CategoryService::edit(&mut profile, parent, changes)
            .expect_err("cycle should be rejected");
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[test]
    fn remove_blocked_by_children_and_transactions() {
        let mut profile = base_profile();
        let parent =
            CategoryService::add(&mut profile, Category::new("Food", TransactionKind::Expense))
                .unwrap();
        let child = CategoryService::add(
            &mut profile,
            Category::new("Groceries", TransactionKind::Expense).with_parent(parent),
        )
        .unwrap();

        let err =
            CategoryService::remove(&mut profile, parent).expect_err("children should block");
        assert!(matches!(err, ServiceError::Invalid(_)));

        profile.add_transaction(
            Transaction::new(
                dec!(12.50),
                NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                "Weekly shop",
                TransactionKind::Expense,
            )
            .with_category(child),
        );
        let err =
            CategoryService::remove(&mut profile, child).expect_err("transactions should block");
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[test]
    fn remove_deletes_unreferenced_category() {
        let mut profile = base_profile();
        let id =
            CategoryService::add(&mut profile, Category::new("Idle", TransactionKind::Expense))
                .unwrap();
        CategoryService::remove(&mut profile, id).unwrap();
        assert!(profile.categories.is_empty());

        let err = CategoryService::remove(&mut profile, id).expect_err("already removed");
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn install_defaults_skips_existing_names() {
        let mut profile = base_profile();
        CategoryService::add(&mut profile, Category::new("Groceries", TransactionKind::Expense))
            .unwrap();

        let installed = CategoryService::install_defaults(&mut profile);
        assert_eq!(installed, DEFAULT_CATEGORIES.len() - 1);

        // A second run changes nothing.
        assert_eq!(CategoryService::install_defaults(&mut profile), 0);
    }

    #[test]
    fn subcategories_lists_children_only() {
        let mut profile = base_profile();
        let parent =
            CategoryService::add(&mut profile, Category::new("Food", TransactionKind::Expense))
                .unwrap();
        CategoryService::add(
            &mut profile,
            Category::new("Groceries", TransactionKind::Expense).with_parent(parent),
        )
        .unwrap();
        CategoryService::add(&mut profile, Category::new("Travel", TransactionKind::Expense))
            .unwrap();

        let children = CategoryService::subcategories(&profile, parent);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "Groceries");
    }
}
