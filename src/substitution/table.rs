use std::collections::HashMap;
use std::sync::LazyLock;

use crate::ingredient_parser::normalize;

/// Verified cooking substitutions, keyed by canonical ingredient name.
///
/// Declaration order matters: fuzzy lookups return the first key that matches, so "egg" must stay
/// ahead of "eggs" and "chicken" ahead of "chicken breast".
const BUILTIN_SUBSTITUTIONS: &[(&str, &str)] = &[
    // Eggs & binders
    ("egg", "1/4 cup Applesauce"),
    ("eggs", "1/2 cup Applesauce"),
    ("hard-boiled egg", "1/4 cup mashed Black Beans"),
    ("hard-boiled eggs", "1/2 cup mashed Black Beans"),
    // Dairy
    ("butter", "equal amount Coconut Oil or Olive Oil"),
    ("milk", "equal amount Water + 1 tbsp Peanut Butter (blended)"),
    ("half and half", "equal amount Milk (if available) or Water + Oil"),
    ("cream", "Coconut Milk or blended Oats + Water"),
    ("yogurt", "equal amount Applesauce"),
    ("sour cream", "equal amount Applesauce"),
    ("cheese", "Nutritional Yeast (if available) or omit"),
    ("parmigiano-reggiano cheese", "omit or use any available cheese"),
    ("parmesan cheese", "omit or use any available cheese"),
    ("blue cheese", "omit or use any available cheese"),
    ("cotija", "Parmesan Cheese or omit"),
    // Proteins
    ("bacon", "omit (add Oil for fat + Salt for flavor)"),
    ("chicken", "canned Tuna or Black Beans"),
    ("chicken breast", "canned Tuna or Black Beans"),
    ("grilled chicken breast", "canned Tuna or Black Beans"),
    ("pork", "canned Tuna or Black Beans"),
    ("pork chops", "canned Tuna or Black Beans"),
    ("pork loin blade chops", "canned Tuna or Black Beans"),
    ("tuna", "Black Beans or Chickpeas"),
    ("canned tuna", "Black Beans or Chickpeas"),
    ("ground beef", "Black Beans or Lentils"),
    // Produce
    ("avocado", "omit or add extra Oil for creaminess"),
    ("lemon", "1 tbsp Vinegar"),
    ("lemon juice", "1 tbsp Vinegar"),
    ("lime", "1 tbsp Vinegar"),
    ("lime juice", "1 tbsp Vinegar"),
    ("lemon or lime", "1 tbsp Vinegar"),
    ("fresh ginger", "1/4 tsp ground Ginger (dried spice) or omit"),
    ("ginger", "1/4 tsp ground Ginger (dried spice) or omit"),
    ("fresh basil", "1/2 tsp dried Basil or omit"),
    ("basil", "1/2 tsp dried Basil or omit"),
    ("cilantro", "omit or use dried Parsley"),
    ("green onions", "diced Onion"),
    ("scallions", "diced Onion"),
    ("tomatoes", "canned Tomato Soup or canned Tomatoes"),
    ("plum tomatoes", "canned Tomatoes or Tomato Soup"),
    ("iceberg salad", "Spinach or any available greens"),
    ("lettuce", "Spinach or any available greens"),
    ("spinach", "any available greens or omit"),
    ("cucumber", "omit or use Carrot"),
    // Condiments & sauces
    ("mayonnaise", "mashed Avocado or Yogurt (if available)"),
    ("ranch dressing", "Oil + Vinegar + Salt"),
    ("alfredo sauce", "Oil + Salt + Water (thin white sauce)"),
    ("tomato sauce", "canned Tomato Soup"),
    ("soy sauce", "Salt + Water (1 tsp salt per tbsp soy sauce)"),
    ("hot sauce", "Red Pepper Flakes or omit"),
    ("sriracha", "Red Pepper Flakes or omit"),
    ("vinegar", "Lemon Juice or Lime Juice"),
    ("sesame oil", "Olive Oil or any available Oil"),
    ("vegetable oil", "Olive Oil or any available Oil"),
    ("oil", "Olive Oil or Coconut Oil"),
    ("cooking spray", "Oil"),
    // Grains & carbs
    ("rice", "Pasta or Noodles"),
    ("pasta", "Rice or Noodles"),
    ("noodles", "Pasta or Rice"),
    ("bread", "Tortilla or Crackers"),
    ("tortilla", "Bread or flatbread"),
    ("breadcrumbs", "crushed Crackers or crushed dry Oats"),
    // Sweeteners
    ("sugar", "Honey or Maple Syrup"),
    ("honey", "Sugar (equal amount)"),
    ("maple syrup", "Honey or Sugar"),
    ("brown sugar", "white Sugar + tiny bit of Honey"),
    // Nuts
    ("peanuts", "any available Nuts or Seeds"),
    ("cashews", "Peanuts or any available Nuts"),
    ("almonds", "Peanuts or any available Nuts"),
    ("peanut butter", "any Nut Butter or Tahini"),
    // Misc
    ("coconut milk", "blended Oats + Water"),
    ("broth", "Water + Salt + Oil"),
    ("chicken broth", "Water + Salt + Oil"),
    ("vegetable broth", "Water + Salt + Oil"),
    ("cornstarch", "Flour (use 2x the amount)"),
    ("flour", "blended Oats"),
];

static BUILTIN: LazyLock<SubstitutionTable> =
    LazyLock::new(|| SubstitutionTable::new(BUILTIN_SUBSTITUTIONS.iter().copied()));

/// One row of the substitution table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionEntry {
    pub key: String,
    pub substitution: String,
}

/// Ordered, read-only substitution table with an exact-match index.
#[derive(Debug, Clone)]
pub struct SubstitutionTable {
    entries: Vec<SubstitutionEntry>,
    exact: HashMap<String, usize>,
}

impl SubstitutionTable {
    /// Builds a table from `(key, substitution)` pairs. Keys are lowercased and trimmed; if a key
    /// is repeated the first declaration wins.
    pub fn new<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut entries = Vec::new();
        let mut exact = HashMap::new();
        for (key, substitution) in pairs {
            let key = key.as_ref().trim().to_lowercase();
            if key.is_empty() || exact.contains_key(&key) {
                continue;
            }
            exact.insert(key.clone(), entries.len());
            entries.push(SubstitutionEntry {
                key,
                substitution: substitution.into(),
            });
        }
        Self { entries, exact }
    }

    /// The process-wide table of verified substitutions.
    pub fn builtin() -> &'static SubstitutionTable {
        &BUILTIN
    }

    pub fn entries(&self) -> &[SubstitutionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a raw ingredient line: exact hit on the normalized name, otherwise the first
    /// declared key contained in the name or containing it.
    pub fn lookup(&self, ingredient: &str) -> Option<&SubstitutionEntry> {
        self.lookup_canonical(&normalize(ingredient))
    }

    /// Same as [`lookup`](Self::lookup) for a name that is already canonical. Empty names never
    /// match.
    pub fn lookup_canonical(&self, canonical: &str) -> Option<&SubstitutionEntry> {
        if canonical.is_empty() {
            return None;
        }
        if let Some(&idx) = self.exact.get(canonical) {
            return self.entries.get(idx);
        }
        self.entries
            .iter()
            .find(|entry| canonical.contains(entry.key.as_str()) || entry.key.contains(canonical))
    }
}
