use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{PassbookError, Result};
use crate::models::{Category, Transaction};

/// Strip provider decoration (`#`, emoji, stray symbols) from a tag.
/// Returns `None` for empty or placeholder tags.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let without_hash = raw.replace('#', "");
    let cleaned = without_hash.trim_matches(|c: char| !c.is_alphanumeric());
    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("nan") {
        return None;
    }
    Some(cleaned.to_string())
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    #[default]
    Contains,
    StartsWith,
    Regex,
}

impl MatchType {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::StartsWith => "starts_with",
            Self::Regex => "regex",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryRule {
    pattern: String,
    match_type: MatchType,
    category: Category,
    needle: String,
    regex: Option<Regex>,
}

impl CategoryRule {
    pub fn new(pattern: &str, match_type: MatchType, category: Category) -> Result<Self> {
        let regex = match match_type {
            MatchType::Regex => Some(
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| PassbookError::InvalidRule(format!("{pattern}: {e}")))?,
            ),
            _ => None,
        };
        Ok(Self {
            pattern: pattern.to_string(),
            match_type,
            category,
            needle: pattern.to_lowercase(),
            regex,
        })
    }

    pub fn contains(pattern: &str, category: Category) -> Self {
        Self {
            pattern: pattern.to_string(),
            match_type: MatchType::Contains,
            category,
            needle: pattern.to_lowercase(),
            regex: None,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn match_type(&self) -> MatchType {
        self.match_type
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn matches(&self, description: &str) -> bool {
        match (&self.regex, self.match_type) {
            (Some(re), _) => re.is_match(description),
            (None, MatchType::StartsWith) => description.to_lowercase().starts_with(&self.needle),
            (None, _) => description.to_lowercase().contains(&self.needle),
        }
    }
}

/// Provider tag keyword mapped straight to a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TagOverrideSpec")]
pub struct TagOverride {
    tag: String,
    category: Category,
    /// Normalized, lowercased `tag`; `None` when nothing is left to match.
    #[serde(skip)]
    keyword: Option<String>,
}

#[derive(Deserialize)]
struct TagOverrideSpec {
    tag: String,
    category: Category,
}

impl From<TagOverrideSpec> for TagOverride {
    fn from(spec: TagOverrideSpec) -> Self {
        Self::new(&spec.tag, spec.category)
    }
}

impl TagOverride {
    pub fn new(tag: &str, category: Category) -> Self {
        Self {
            tag: tag.to_string(),
            category,
            keyword: normalize_tag(tag).map(|t| t.to_lowercase()),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn category(&self) -> Category {
        self.category
    }

    fn matches(&self, normalized_tag_lower: &str) -> bool {
        self.keyword
            .as_deref()
            .is_some_and(|k| normalized_tag_lower.contains(k))
    }
}

const DEFAULT_RULES: &[(Category, &[&str])] = &[
    (
        Category::Food,
        &["swiggy", "zomato", "restaurant", "cafe", "dominos", "pizza", "fast food", "soul tree"],
    ),
    (Category::Transport, &["uber", "ola", "metro", "fuel", "petrol"]),
    (
        Category::Utilities,
        &["electricity", "water bill", "internet", "broadband", "telecom"],
    ),
    (Category::Salary, &["salary", "payout", "employer", "income"]),
    (Category::Shopping, &["amazon", "flipkart", "myntra", "shopping"]),
    (Category::Rent, &["rent", "house", "landlord"]),
    (Category::Transfers, &["transfer", "money sent", "money received"]),
    (Category::Groceries, &["groceries", "supermarket", "kirana"]),
    (Category::Bills, &["bill", "emi", "payment"]),
];

const DEFAULT_TAG_OVERRIDES: &[(&str, Category)] = &[
    ("shopping", Category::Shopping),
    ("food", Category::Food),
    ("groceries", Category::Groceries),
    ("transfers", Category::Transfers),
    ("income", Category::Income),
    ("bill payment", Category::Bills),
    ("travel", Category::Transport),
    ("cashback", Category::Income),
    ("recharge", Category::Utilities),
];

/// Ordered keyword rules plus the tag-override table. Never mutated once built.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<CategoryRule>,
    tag_overrides: Vec<TagOverride>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new(default_rules(), default_tag_overrides())
    }
}

fn default_rules() -> Vec<CategoryRule> {
    DEFAULT_RULES
        .iter()
        .flat_map(|(category, keywords)| {
            keywords.iter().map(move |kw| CategoryRule::contains(kw, *category))
        })
        .collect()
}

fn default_tag_overrides() -> Vec<TagOverride> {
    DEFAULT_TAG_OVERRIDES
        .iter()
        .map(|(tag, category)| TagOverride::new(tag, *category))
        .collect()
}

#[derive(Deserialize)]
struct RuleSpec {
    pattern: String,
    category: Category,
    #[serde(default)]
    match_type: MatchType,
}

#[derive(Deserialize)]
struct RuleFile {
    rules: Option<Vec<RuleSpec>>,
    tag_overrides: Option<Vec<TagOverride>>,
}

impl RuleSet {
    pub fn new(rules: Vec<CategoryRule>, tag_overrides: Vec<TagOverride>) -> Self {
        Self {
            rules,
            tag_overrides,
        }
    }

    /// Parse a rule file. A table left out of the file keeps its defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: RuleFile =
            serde_json::from_str(json).map_err(|e| PassbookError::InvalidRule(e.to_string()))?;
        let rules = match file.rules {
            Some(specs) => specs
                .iter()
                .map(|s| CategoryRule::new(&s.pattern, s.match_type, s.category))
                .collect::<Result<Vec<_>>>()?,
            None => default_rules(),
        };
        let tag_overrides = file.tag_overrides.unwrap_or_else(default_tag_overrides);
        Ok(Self::new(rules, tag_overrides))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn tag_overrides(&self) -> &[TagOverride] {
        &self.tag_overrides
    }

    pub fn tag_category(&self, tag: &str) -> Option<Category> {
        let tag = normalize_tag(tag)?.to_lowercase();
        self.tag_overrides
            .iter()
            .find(|o| o.matches(&tag))
            .map(|o| o.category)
    }

    pub fn keyword_category(&self, description: &str) -> Option<Category> {
        self.rules
            .iter()
            .find(|r| r.matches(description))
            .map(|r| r.category)
    }
}

// ---------------------------------------------------------------------------
// Categorize
// ---------------------------------------------------------------------------

/// Tag override first, then the first matching keyword rule, then the fallback.
pub fn category_for(txn: &Transaction, rules: &RuleSet) -> Category {
    txn.tag
        .as_deref()
        .and_then(|tag| rules.tag_category(tag))
        .or_else(|| rules.keyword_category(&txn.description))
        .unwrap_or(Category::Uncategorized)
}

pub struct CategorizeResult {
    pub categorized: usize,
    pub uncategorized: usize,
}

pub fn categorize_in_place(transactions: &mut [Transaction], rules: &RuleSet) -> CategorizeResult {
    let mut categorized = 0usize;
    let mut uncategorized = 0usize;
    for txn in transactions.iter_mut() {
        txn.category = category_for(txn, rules);
        if txn.category == Category::Uncategorized {
            uncategorized += 1;
        } else {
            categorized += 1;
        }
    }
    CategorizeResult {
        categorized,
        uncategorized,
    }
}

pub fn categorize(mut transactions: Vec<Transaction>, rules: &RuleSet) -> Vec<Transaction> {
    categorize_in_place(&mut transactions, rules);
    transactions
}
