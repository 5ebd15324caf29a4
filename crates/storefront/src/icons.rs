//! Category icons.
//!
//! One table shared by the dashboard strip, the categories grid and the
//! category detail header. Lookup order: the icon key the backend set on the
//! category, its slug, then its normalized name (English or Arabic). Anything
//! unknown gets the basket.

use crate::backend::Category;

/// A category icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Icon {
    /// Stable key, also used as a CSS modifier (`category-icon--dairy`).
    pub key: &'static str,
    /// Glyph rendered inside the icon tile.
    pub glyph: &'static str,
}

/// Icon used when nothing matches.
pub const FALLBACK: Icon = Icon {
    key: "basket",
    glyph: "🧺",
};

/// Known icons with the names that map to them.
const ICONS: &[(Icon, &[&str])] = &[
    (
        Icon { key: "vegetables", glyph: "🥦" },
        &["vegetables", "veggies", "greens", "خضروات", "خضار"],
    ),
    (
        Icon { key: "fruits", glyph: "🍎" },
        &["fruits", "fruit", "فواكه", "فاكهة"],
    ),
    (
        Icon { key: "dairy", glyph: "🥛" },
        &["dairy", "milk", "dairy-eggs", "cheese", "ألبان", "البان", "منتجات-الألبان"],
    ),
    (Icon { key: "eggs", glyph: "🥚" }, &["eggs", "بيض"]),
    (
        Icon { key: "bakery", glyph: "🍞" },
        &["bakery", "bread", "baked-goods", "مخبوزات", "خبز"],
    ),
    (
        Icon { key: "meat", glyph: "🥩" },
        &["meat", "meats", "butcher", "لحوم", "لحم"],
    ),
    (
        Icon { key: "poultry", glyph: "🍗" },
        &["poultry", "chicken", "دواجن", "فراخ"],
    ),
    (
        Icon { key: "seafood", glyph: "🐟" },
        &["seafood", "fish", "أسماك", "اسماك", "مأكولات-بحرية"],
    ),
    (
        Icon { key: "beverages", glyph: "🥤" },
        &["beverages", "drinks", "juices", "مشروبات", "عصائر"],
    ),
    (
        Icon { key: "snacks", glyph: "🍿" },
        &["snacks", "chips", "تسالي", "سناكس"],
    ),
    (
        Icon { key: "sweets", glyph: "🍬" },
        &["sweets", "candy", "chocolate", "desserts", "حلويات"],
    ),
    (
        Icon { key: "grains", glyph: "🍚" },
        &["grains", "rice", "pasta", "rice-pasta", "أرز", "ارز", "مكرونة", "بقوليات"],
    ),
    (
        Icon { key: "spices", glyph: "🌶️" },
        &["spices", "herbs", "بهارات", "توابل"],
    ),
    (
        Icon { key: "canned", glyph: "🥫" },
        &["canned", "canned-food", "pantry", "معلبات"],
    ),
    (
        Icon { key: "frozen", glyph: "🧊" },
        &["frozen", "frozen-food", "مجمدات"],
    ),
    (
        Icon { key: "household", glyph: "🧴" },
        &["household", "cleaning", "منظفات", "أدوات-منزلية"],
    ),
    (
        Icon { key: "personal-care", glyph: "🧼" },
        &["personal-care", "beauty", "hygiene", "عناية-شخصية"],
    ),
    (
        Icon { key: "baby", glyph: "🍼" },
        &["baby", "baby-care", "أطفال", "مستلزمات-أطفال"],
    ),
    (
        Icon { key: "pharmacy", glyph: "💊" },
        &["pharmacy", "health", "صيدلية"],
    ),
    (
        Icon { key: "pets", glyph: "🐾" },
        &["pets", "pet-food", "حيوانات-أليفة"],
    ),
];

/// Lowercase, trim, and join words with `-` (`"Rice & Pasta"` → `rice-pasta`).
#[must_use]
pub fn normalize(name: &str) -> String {
    name.split(|c: char| c.is_whitespace() || c == '_' || c == '-' || c == '&' || c == '/')
        .filter(|word| !word.is_empty() && *word != "and")
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn find(candidate: &str) -> Option<Icon> {
    let normalized = normalize(candidate);
    if normalized.is_empty() {
        return None;
    }
    ICONS
        .iter()
        .find(|(icon, names)| icon.key == normalized || names.contains(&normalized.as_str()))
        .map(|(icon, _)| *icon)
}

/// Resolve an icon from explicit parts.
#[must_use]
pub fn resolve(icon_key: Option<&str>, slug: Option<&str>, name: &str) -> Icon {
    icon_key
        .and_then(find)
        .or_else(|| slug.and_then(find))
        .or_else(|| find(name))
        .unwrap_or(FALLBACK)
}

/// Icon for a category.
#[must_use]
pub fn for_category(category: &Category) -> Icon {
    resolve(
        category.icon.as_deref(),
        category.slug.as_deref(),
        &category.name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Rice & Pasta "), "rice-pasta");
        assert_eq!(normalize("Personal_Care"), "personal-care");
        assert_eq!(normalize("Dairy and Eggs"), "dairy-eggs");
    }

    #[test]
    fn test_slug_wins_over_name() {
        let icon = resolve(None, Some("bakery"), "Fresh stuff");
        assert_eq!(icon.key, "bakery");
    }

    #[test]
    fn test_backend_icon_key_wins() {
        let icon = resolve(Some("seafood"), Some("bakery"), "Bread");
        assert_eq!(icon.key, "seafood");
    }

    #[test]
    fn test_name_fallback_including_arabic() {
        assert_eq!(resolve(None, None, "Vegetables").key, "vegetables");
        assert_eq!(resolve(None, None, "خضروات").key, "vegetables");
        assert_eq!(resolve(None, Some(""), "Rice & Pasta").key, "grains");
    }

    #[test]
    fn test_unknown_gets_basket() {
        assert_eq!(resolve(Some("unknown-icon"), Some("misc"), "Other"), FALLBACK);
    }
}
