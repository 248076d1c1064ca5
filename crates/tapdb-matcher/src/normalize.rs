//! Title normalization: canonicalizes free-text titles into comparable
//! token streams before any matching decision is made.
//!
//! Vendor titles for the same product differ in case, punctuation, filler
//! words, and phrasing ("floor liner" vs. "floor mats"). Normalization
//! collapses those differences so the similarity metric and the keyword
//! cascades in [`crate::extract`] see one spelling per concept.

/// Filler words removed after synonym folding.
pub(crate) const STOPWORDS: &[&str] = &[
    "for", "the", "and", "with", "set", "of", "to", "in", "on", "a", "an",
];

/// Ordered phrase-folding rules, applied left-to-right over the token
/// stream with first-match-wins semantics.
///
/// Order matters twice: longer phrases come before their sub-phrases, and
/// more specific concepts come before generic ones — "cargo liner" must
/// fold to `cargomat` before any floor rule could see the word "liner".
const SYNONYMS: &[(&[&str], &str)] = &[
    // Three-token phrases first.
    (&["paint", "protection", "film"], "ppf"),
    // Hardware generations.
    (&["pre", "refresh"], "prerefresh"),
    // Cargo coverage before floor coverage.
    (&["cargo", "liner"], "cargomat"),
    (&["cargo", "liners"], "cargomat"),
    (&["cargo", "mat"], "cargomat"),
    (&["cargo", "mats"], "cargomat"),
    (&["trunk", "mat"], "cargomat"),
    (&["trunk", "mats"], "cargomat"),
    (&["boot", "liner"], "cargomat"),
    (&["floor", "liner"], "floormat"),
    (&["floor", "liners"], "floormat"),
    (&["floor", "mat"], "floormat"),
    (&["floor", "mats"], "floormat"),
    (&["center", "console"], "centerconsole"),
    (&["centre", "console"], "centerconsole"),
    (&["screen", "protector"], "screenprotector"),
    (&["screen", "protectors"], "screenprotector"),
    // "door sill" must fold before any generic door handling downstream.
    (&["door", "sill"], "doorsill"),
    (&["door", "sills"], "doorsill"),
    (&["mud", "flap"], "mudflap"),
    (&["mud", "flaps"], "mudflap"),
    (&["splash", "guard"], "mudflap"),
    (&["splash", "guards"], "mudflap"),
    (&["sun", "shade"], "sunshade"),
    (&["sun", "shades"], "sunshade"),
    (&["wheel", "cover"], "wheelcover"),
    (&["wheel", "covers"], "wheelcover"),
    (&["hub", "cap"], "wheelcover"),
    (&["hub", "caps"], "wheelcover"),
    (&["hubcap"], "wheelcover"),
    (&["hubcaps"], "wheelcover"),
    (&["seat", "cover"], "seatcover"),
    (&["seat", "covers"], "seatcover"),
    (&["roof", "rack"], "roofrack"),
    (&["phone", "mount"], "phonemount"),
    (&["phone", "holder"], "phonemount"),
    (&["usb", "hub"], "usbhub"),
    (&["body", "kit"], "bodykit"),
    (&["ambient", "lighting"], "ambientlight"),
    (&["ambient", "lights"], "ambientlight"),
    (&["ambient", "light"], "ambientlight"),
    (&["storage", "box"], "storagebox"),
    // Coverage phrases; "set" alone is a stopword, so these must fold first.
    (&["full", "set"], "fullset"),
    (&["complete", "set"], "fullset"),
    (&["12v"], "12volt"),
    (&["12", "v"], "12volt"),
    // Vehicle models.
    (&["model", "3"], "model3"),
    (&["model", "y"], "modely"),
    (&["model", "s"], "models"),
    (&["model", "x"], "modelx"),
    (&["cyber", "truck"], "cybertruck"),
];

/// Canonicalize a free-text title.
///
/// Lowercases, strips punctuation, folds synonym phrases into single
/// tokens, removes stopwords, and collapses whitespace. Total on any
/// input; the empty string normalizes to the empty string.
#[must_use]
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let cleaned: String = lowered
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();

    fold_synonyms(&tokens)
        .into_iter()
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Apply [`SYNONYMS`] over the token stream, left to right.
///
/// At each position the rules are tried in declaration order; the first
/// phrase match consumes its tokens and emits the replacement.
fn fold_synonyms(tokens: &[&str]) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let rule = SYNONYMS.iter().find(|(phrase, _)| {
            tokens.len() - i >= phrase.len() && tokens[i..i + phrase.len()] == **phrase
        });
        match rule {
            Some((phrase, replacement)) => {
                out.push((*replacement).to_string());
                i += phrase.len();
            }
            None => {
                out.push(tokens[i].to_string());
                i += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_normalizes_to_empty() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn whitespace_only_normalizes_to_empty() {
        assert_eq!(normalize("   \t  "), "");
    }

    #[test]
    fn lowercases_and_strips_punctuation() {
        assert_eq!(normalize("TAPTES® Floor-Mat!"), "taptes floormat");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize("floor   mat    tray"), "floormat tray");
    }

    #[test]
    fn removes_stopwords() {
        assert_eq!(
            normalize("Sunshade for the Model Y with Storage Bag"),
            "sunshade modely storage bag"
        );
    }

    #[test]
    fn folds_floor_liner_and_floor_mat_to_same_token() {
        assert_eq!(normalize("Floor Liner"), normalize("Floor Mats"));
    }

    #[test]
    fn cargo_liner_folds_to_cargomat_not_floormat() {
        assert_eq!(normalize("Cargo Liner"), "cargomat");
    }

    #[test]
    fn paint_protection_film_folds_to_ppf() {
        assert_eq!(normalize("Paint Protection Film Kit"), "ppf kit");
    }

    #[test]
    fn model_spellings_fold_to_one_token() {
        assert_eq!(normalize("Model 3 Sunshade"), "model3 sunshade");
        assert_eq!(normalize("Model3 Sunshade"), "model3 sunshade");
    }

    #[test]
    fn twelve_volt_spellings_fold() {
        assert_eq!(normalize("12V Socket"), normalize("12 V Socket"));
    }

    #[test]
    fn full_set_and_complete_set_fold_before_stopword_removal() {
        assert_eq!(normalize("Full Set"), "fullset");
        assert_eq!(normalize("Complete Set"), "fullset");
    }

    #[test]
    fn pre_refresh_folds_to_single_token() {
        assert_eq!(normalize("Pre-Refresh Model S"), "prerefresh models");
    }

    #[test]
    fn door_sill_folds_before_generic_door() {
        assert_eq!(normalize("Door Sill Protector"), "doorsill protector");
    }

    #[test]
    fn non_ascii_is_tokenized_not_dropped() {
        // Unicode alphanumerics survive; symbols become separators.
        assert_eq!(normalize("Tesla™ Modèle"), "tesla modèle");
    }
}
