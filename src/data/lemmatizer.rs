// ============================================================
// Layer 4 - Noun Lemmatizer
// ============================================================
// Reduces an English word to its dictionary (noun) base form:
//   "dogs" → "dog", "supplies" → "supply", "women" → "woman"
//
// The rules are WordNet's noun morphology, applied without the
// dictionary lookup that would normally pick between candidates:
//
//   1. Irregular forms come from a small exception table
//   2. Otherwise the first matching suffix rule wins:
//        sses → ss    ies → y     xes → x     zes → z
//        ches → ch    shes → sh   men → man   s   → (nothing)
//
// WordNet also has `ses → s` and `ves → f`. Without a dictionary
// to veto them they turn "horses" into "hors" and "gloves" into
// "glof", so the words those rules exist for ("gases", "hooves")
// are listed in the exception table instead.
//
// Without a dictionary the bare rules over-strip some words
// ("glass" → "glas"), so a few guards keep words unchanged:
//   - words of 3 characters or fewer ("gas", "bus", "was")
//   - anything that is not purely alphabetic ("n't", "2010")
//   - endings that are almost never plurals: ss, us, is, ous
//
// Nouns only, like WordNet's default part of speech: "running"
// stays "running".

/// Irregular plural → lemma. Entries mapping to themselves stop the
/// suffix rules from mangling words that only look plural.
///
/// Must stay sorted by the first element (binary search).
const EXCEPTIONS: &[(&str, &str)] = &[
    ("abdomen",    "abdomen"),
    ("acumen",     "acumen"),
    ("afterwards", "afterwards"),
    ("always",     "always"),
    ("amen",       "amen"),
    ("analyses",   "analysis"),
    ("buses",      "bus"),
    ("calves",     "calf"),
    ("children",   "child"),
    ("crises",     "crisis"),
    ("criteria",   "criterion"),
    ("data",       "datum"),
    ("does",       "does"),
    ("dwarves",    "dwarf"),
    ("elves",      "elf"),
    ("feet",       "foot"),
    ("gases",      "gas"),
    ("geese",      "goose"),
    ("halves",     "half"),
    ("hooves",     "hoof"),
    ("knives",     "knife"),
    ("leaves",     "leaf"),
    ("lenses",     "lens"),
    ("lives",      "life"),
    ("loaves",     "loaf"),
    ("men",        "man"),
    ("mice",       "mouse"),
    ("movies",     "movie"),
    ("news",       "news"),
    ("omen",       "omen"),
    ("oxen",       "ox"),
    ("perhaps",    "perhaps"),
    ("phenomena",  "phenomenon"),
    ("regimen",    "regimen"),
    ("scarves",    "scarf"),
    ("selves",     "self"),
    ("series",     "series"),
    ("shelves",    "shelf"),
    ("species",    "species"),
    ("specimen",   "specimen"),
    ("stamen",     "stamen"),
    ("teeth",      "tooth"),
    ("thieves",    "thief"),
    ("towards",    "towards"),
    ("viruses",    "virus"),
    ("wharves",    "wharf"),
    ("whereas",    "whereas"),
    ("wives",      "wife"),
    ("wolves",     "wolf"),
    ("women",      "woman"),
];

/// Noun suffix rules, tried in order. First match with a long
/// enough stem wins.
const SUFFIX_RULES: &[(&str, &str)] = &[
    ("sses", "ss"),
    ("ies",  "y"),
    ("xes",  "x"),
    ("zes",  "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men",  "man"),
    ("s",    ""),
];

/// Endings left untouched by the suffix rules
const PROTECTED_ENDINGS: &[&str] = &["ss", "us", "is", "ous"];

/// Shortest stem a suffix rule may leave behind
const MIN_STEM_LEN: usize = 2;

/// Stateless noun lemmatizer. All tables are compiled in, so
/// constructing one is free and it can be copied anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lemmatizer;

impl Lemmatizer {
    pub fn new() -> Self {
        Self
    }

    /// Lemmatize a single lowercase word.
    pub fn lemmatize(&self, word: &str) -> String {
        if let Ok(i) = EXCEPTIONS.binary_search_by(|(form, _)| (*form).cmp(word)) {
            return EXCEPTIONS[i].1.to_string();
        }

        if word.chars().count() <= 3 || !word.chars().all(char::is_alphabetic) {
            return word.to_string();
        }

        if PROTECTED_ENDINGS.iter().any(|ending| word.ends_with(ending)) {
            return word.to_string();
        }

        for (suffix, replacement) in SUFFIX_RULES {
            if let Some(stem) = word.strip_suffix(suffix) {
                // Too short a stem ("ties" → "t" + "y") falls through to the
                // next rule instead ("ties" → "tie")
                if stem.chars().count() >= MIN_STEM_LEN {
                    return format!("{stem}{replacement}");
                }
            }
        }

        word.to_string()
    }
}
