use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Language / Translatable
// ---------------------------------------------------------------------------

/// A menu locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Uz,
    Ru,
    En,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uz => "uz",
            Self::Ru => "ru",
            Self::En => "en",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "uz" => Some(Self::Uz),
            "ru" => Some(Self::Ru),
            "en" => Some(Self::En),
            _ => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The same string in all three supported locales.
///
/// Lookup is a pure function: the requested locale if its field is
/// non-empty, else the designated fallback locale (`en`), else the
/// empty string. Fixed shape — never an open map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Translatable {
    #[serde(default)]
    pub uz: String,
    #[serde(default)]
    pub ru: String,
    #[serde(default)]
    pub en: String,
}

impl Translatable {
    pub fn new(uz: &str, ru: &str, en: &str) -> Self {
        Self {
            uz: uz.to_string(),
            ru: ru.to_string(),
            en: en.to_string(),
        }
    }

    /// Resolve the text for a locale, falling back to `en`.
    pub fn get(&self, lang: Language) -> &str {
        let requested = match lang {
            Language::Uz => &self.uz,
            Language::Ru => &self.ru,
            Language::En => &self.en,
        };
        if !requested.is_empty() {
            requested
        } else {
            &self.en
        }
    }

    /// Set the text for one locale, leaving the others untouched.
    pub fn set(&mut self, lang: Language, value: String) {
        match lang {
            Language::Uz => self.uz = value,
            Language::Ru => self.ru = value,
            Language::En => self.en = value,
        }
    }
}

// ---------------------------------------------------------------------------
// Menu catalog records
// ---------------------------------------------------------------------------

/// Preparation time assumed for items that do not configure one.
pub const DEFAULT_PREP_MINUTES: u32 = 15;

/// A single dish on the menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    /// Empty on creation requests; the store assigns a fresh id.
    #[serde(default)]
    pub id: String,

    pub name: Translatable,

    #[serde(default)]
    pub description: Translatable,

    /// Unit price in the restaurant's smallest currency unit.
    pub price: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Owning category id.
    pub category: String,

    #[serde(default = "default_true")]
    pub is_available: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Kitchen preparation time in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time_minutes: Option<u32>,
}

impl MenuItem {
    /// Configured preparation time, or the default when unset.
    pub fn prep_minutes(&self) -> u32 {
        self.prep_time_minutes.unwrap_or(DEFAULT_PREP_MINUTES)
    }
}

fn default_true() -> bool {
    true
}

/// A menu category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: String,
    pub name: Translatable,
}

/// Visual theme for the customer-facing menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuTheme {
    pub primary_color: String,
    pub accent_color: String,
    pub font_family: FontFamily,
    pub layout: MenuLayout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    Serif,
    Sans,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuLayout {
    List,
    Grid,
}

impl Default for MenuTheme {
    fn default() -> Self {
        Self {
            primary_color: "#4f46e5".to_string(),
            accent_color: "#f59e0b".to_string(),
            font_family: FontFamily::Sans,
            layout: MenuLayout::List,
        }
    }
}

/// The full restaurant configuration blob — one durable record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantData {
    pub name: Translatable,

    #[serde(default)]
    pub description: Translatable,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(default)]
    pub items: Vec<MenuItem>,

    #[serde(default)]
    pub categories: Vec<Category>,

    #[serde(default)]
    pub theme: MenuTheme,

    /// Table labels known to this restaurant.
    #[serde(default)]
    pub tables: Vec<String>,
}

impl RestaurantData {
    /// Look up a menu item by id.
    pub fn find_item(&self, id: &str) -> Option<&MenuItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Look up a category by id.
    pub fn find_category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Starter dataset installed on first run, and the fallback when the
    /// persisted blob cannot be interpreted.
    pub fn starter() -> Self {
        Self {
            name: Translatable::new("Lumière Bistro", "Бистро Люмьер", "Lumière Bistro"),
            description: Translatable::new(
                "Sifatli va mazali taomlar",
                "Качественная и вкусная еда",
                "Quality and delicious food",
            ),
            logo_url: None,
            address: None,
            phone: None,
            website: None,
            items: vec![MenuItem {
                id: "1".to_string(),
                name: Translatable::new(
                    "Klassik Avokado Toast",
                    "Классический тост с авокадо",
                    "Classic Avocado Toast",
                ),
                description: Translatable::new(
                    "Avokado va tuxumli mazali nonushta",
                    "Вкусный завтрак с авокадо и яйцом",
                    "Delicious breakfast with avocado and egg",
                ),
                price: 45000,
                image: None,
                category: "breakfast".to_string(),
                is_available: true,
                tags: Vec::new(),
                prep_time_minutes: Some(15),
            }],
            categories: vec![
                Category {
                    id: "breakfast".to_string(),
                    name: Translatable::new("Nonushta", "Завтрак", "Breakfast"),
                },
                Category {
                    id: "lunch".to_string(),
                    name: Translatable::new("Tushlik", "Обед", "Lunch"),
                },
            ],
            theme: MenuTheme::default(),
            tables: vec!["1".to_string(), "2".to_string(), "3".to_string()],
        }
    }
}

// ---------------------------------------------------------------------------
// API request / response types
// ---------------------------------------------------------------------------

/// Body for `POST /menu/items/{id}/@suggest`.
#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    pub language: Language,
}

/// Response for `POST /menu/items/{id}/@suggest`. An empty suggestion means
/// "no suggestion available" — existing text should be left untouched.
#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub suggestion: String,
}

/// Body for `POST /menu/tables`.
#[derive(Debug, Deserialize)]
pub struct NewTableRequest {
    pub label: String,
}
