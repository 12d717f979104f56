mod loader;

pub use loader::ContentError;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Catalog tier a lesson belongs to, derived from its storage location
/// (`<root>/<language>/<level>/...`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Basic,
    Intermediate,
    Advanced,
    Exercises,
}

impl Level {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "basic" => Some(Self::Basic),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            "exercises" => Some(Self::Exercises),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Exercises => "exercises",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title_en: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub concept: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description_en: String,
    #[serde(default)]
    pub explanation: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub explanation_en: Vec<String>,
    #[serde(default)]
    pub code: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub level: Level,
}

#[derive(Debug, Clone, Serialize)]
pub struct LessonSummary {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title_en: String,
    pub language: String,
    pub concept: String,
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description_en: String,
    pub difficulty: String,
    pub mode: String,
    pub order: i32,
    pub level: Level,
}

impl Lesson {
    pub fn to_summary(&self) -> LessonSummary {
        LessonSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            title_en: self.title_en.clone(),
            language: self.language.clone(),
            concept: self.concept.clone(),
            description: self.description.clone(),
            description_en: self.description_en.clone(),
            difficulty: self.difficulty.clone(),
            mode: self.mode.clone(),
            order: self.order,
            level: self.level,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageInfo {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub lesson_count: usize,
    #[serde(skip_serializing_if = "is_false")]
    pub soon: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

const LANGUAGE_META: &[(&str, &str, &str)] = &[
    ("go", "Go", "🐹"),
    ("python", "Python", "🐍"),
    ("javascript", "JavaScript", "🟨"),
    ("typescript", "TypeScript", "🔷"),
    ("rust", "Rust", "🦀"),
    ("java", "Java", "☕"),
    ("c", "C", "⚙️"),
    ("cpp", "C++", "⚙️"),
    ("csharp", "C#", "🟪"),
    ("ruby", "Ruby", "💎"),
    ("php", "PHP", "🐘"),
    ("swift", "Swift", "🍎"),
    ("kotlin", "Kotlin", "🟣"),
];

// Placeholder languages advertised before any lessons ship for them.
const COMING_SOON: &[&str] = &["typescript", "rust", "java"];

fn language_meta(id: &str) -> (&str, &str) {
    LANGUAGE_META
        .iter()
        .find(|(key, _, _)| *key == id)
        .map(|(_, name, icon)| (*name, *icon))
        .unwrap_or((id, "📁"))
}

#[derive(Default)]
struct Catalog {
    lessons: HashMap<String, Arc<Lesson>>,
    by_language: HashMap<String, Vec<Arc<Lesson>>>,
}

impl Catalog {
    // Rebuilds the per-language listings from the id map, so a duplicate id
    // leaves exactly one entry (last loaded wins).
    fn rebuild(&mut self) {
        self.by_language.clear();
        for lesson in self.lessons.values() {
            self.by_language
                .entry(lesson.language.clone())
                .or_default()
                .push(Arc::clone(lesson));
        }
        for lessons in self.by_language.values_mut() {
            lessons.sort_by_key(|lesson| lesson.order);
        }
    }
}

/// In-memory lesson catalog. Built once at startup from the content root and
/// read-only afterwards; readers share the lock and never block each other.
pub struct ContentIndex {
    inner: RwLock<Catalog>,
}

impl ContentIndex {
    pub fn load(root: &Path) -> Result<Self, ContentError> {
        let loaded = loader::scan(root)?;

        let mut catalog = Catalog::default();
        for lesson in loaded {
            catalog.lessons.insert(lesson.id.clone(), Arc::new(lesson));
        }
        catalog.rebuild();

        Ok(Self {
            inner: RwLock::new(catalog),
        })
    }

    pub fn get(&self, id: &str) -> Option<Arc<Lesson>> {
        self.inner.read().lessons.get(id).cloned()
    }

    pub fn list_by_language(&self, language: &str) -> Vec<Arc<Lesson>> {
        self.inner
            .read()
            .by_language
            .get(language)
            .cloned()
            .unwrap_or_default()
    }

    pub fn list_all(&self) -> Vec<Arc<Lesson>> {
        let catalog = self.inner.read();
        let mut all: Vec<Arc<Lesson>> = catalog.lessons.values().cloned().collect();
        all.sort_by(|a, b| {
            a.language
                .cmp(&b.language)
                .then_with(|| a.order.cmp(&b.order))
        });
        all
    }

    pub fn count(&self) -> usize {
        self.inner.read().lessons.len()
    }

    pub fn languages(&self) -> Vec<LanguageInfo> {
        let catalog = self.inner.read();

        let mut result: Vec<LanguageInfo> = catalog
            .by_language
            .iter()
            .map(|(id, lessons)| {
                let (name, icon) = language_meta(id);
                LanguageInfo {
                    id: id.clone(),
                    name: name.to_string(),
                    icon: icon.to_string(),
                    lesson_count: lessons.len(),
                    soon: false,
                }
            })
            .collect();

        for id in COMING_SOON {
            if catalog.by_language.contains_key(*id) {
                continue;
            }
            let (name, icon) = language_meta(id);
            result.push(LanguageInfo {
                id: id.to_string(),
                name: name.to_string(),
                icon: icon.to_string(),
                lesson_count: 0,
                soon: true,
            });
        }

        result.sort_by(|a, b| {
            a.soon
                .cmp(&b.soon)
                .then_with(|| b.lesson_count.cmp(&a.lesson_count))
                .then_with(|| a.name.cmp(&b.name))
        });

        result
    }
}
