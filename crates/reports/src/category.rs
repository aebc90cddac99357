//! Report categories and the permission keys that gate them.

use serde::{Deserialize, Serialize};

use fleetdash_auth::UserProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    Vehicles,
    Costing,
    Workshop,
    Rental,
    Sla,
}

/// One row of the category table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorySpec {
    pub category: ReportCategory,
    /// Key that must be present in `UserProfile::permissions`.
    pub permission: &'static str,
    /// Tab label.
    pub label: &'static str,
    /// Stable id used in URLs and DOM ids.
    pub slug: &'static str,
}

/// Every report category, in display order.
pub static REPORT_CATEGORIES: [CategorySpec; 5] = [
    CategorySpec {
        category: ReportCategory::Vehicles,
        permission: "vehicle_expenses",
        label: "Vehicle Expenses",
        slug: "vehicles",
    },
    CategorySpec {
        category: ReportCategory::Costing,
        permission: "costing",
        label: "Costing",
        slug: "costing",
    },
    CategorySpec {
        category: ReportCategory::Workshop,
        permission: "workshop_jobs",
        label: "Workshop Jobs",
        slug: "workshop",
    },
    CategorySpec {
        category: ReportCategory::Rental,
        permission: "rental",
        label: "Rental",
        slug: "rental",
    },
    CategorySpec {
        category: ReportCategory::Sla,
        permission: "sla",
        label: "SLA",
        slug: "sla",
    },
];

impl ReportCategory {
    pub fn spec(self) -> &'static CategorySpec {
        // The table lists variants in declaration order.
        &REPORT_CATEGORIES[self as usize]
    }

    pub fn permission_key(self) -> &'static str {
        self.spec().permission
    }

    pub fn label(self) -> &'static str {
        self.spec().label
    }

    pub fn slug(self) -> &'static str {
        self.spec().slug
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        REPORT_CATEGORIES
            .iter()
            .find(|spec| spec.slug == slug)
            .map(|spec| spec.category)
    }
}

impl core::fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Categories `profile` may open, in table order. No profile, no categories.
pub fn visible_categories(profile: Option<&UserProfile>) -> Vec<ReportCategory> {
    let Some(profile) = profile else {
        return Vec::new();
    };

    REPORT_CATEGORIES
        .iter()
        .filter(|spec| profile.has_permission(spec.permission))
        .map(|spec| spec.category)
        .collect()
}
