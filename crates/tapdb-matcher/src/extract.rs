//! Signature extraction: derives the structured fingerprint the scorer
//! and clustering engine work from.
//!
//! Every detector is an ordered rule cascade — first match wins — so the
//! precedence between overlapping keywords stays explicit and each rule is
//! independently testable. Extraction is pure and total: unknown input
//! yields the `"other"` / `Universal` / empty defaults, never an error.

use tapdb_core::{BrandRegistry, Listing, Signature, TargetModel, VariantTag};

use crate::normalize::normalize;

/// Model keyword priority. A title naming several models resolves to the
/// first entry found.
const MODEL_RULES: &[(&str, TargetModel)] = &[
    ("model3", TargetModel::Model3),
    ("modely", TargetModel::ModelY),
    ("models", TargetModel::ModelS),
    ("modelx", TargetModel::ModelX),
    ("cybertruck", TargetModel::Cybertruck),
];

/// Explicit hardware-generation keywords, most specific first.
const VARIANT_RULES: &[(&str, VariantTag)] = &[
    ("highland", VariantTag::Highland),
    ("juniper", VariantTag::Juniper),
    ("prerefresh", VariantTag::PreRefresh),
    ("plaid", VariantTag::Plaid),
    ("refresh", VariantTag::Refresh),
];

/// Product-type keyword cascade. Broad accessory families come after the
/// specific fitment-sensitive ones so e.g. a console screen protector
/// classifies as `screenprotector`, not `centerconsole`.
const TYPE_RULES: &[(&[&str], &str)] = &[
    (&["ppf"], "ppf"),
    (&["bodykit", "spoiler", "diffuser", "splitter", "skirt"], "bodykit"),
    (&["floormat"], "floormat"),
    (&["cargomat"], "cargomat"),
    (&["screenprotector"], "screenprotector"),
    (&["centerconsole"], "centerconsole"),
    (&["mudflap"], "mudflap"),
    (&["sunshade"], "sunshade"),
    (&["wheelcover"], "wheelcover"),
    (&["charger", "charging"], "charger"),
    (&["seatcover"], "seatcover"),
    (&["wrap", "vinyl"], "wrap"),
    (&["frunk"], "frunk"),
    (&["roofrack"], "roofrack"),
    (&["phonemount"], "phonemount"),
    (&["pedal", "pedals"], "pedal"),
    (&["mirror", "mirrors"], "mirror"),
    (&["ambientlight"], "ambientlight"),
    (&["organizer", "organizers", "storagebox"], "organizer"),
    (&["battery"], "battery"),
    (&["usbhub"], "usbhub"),
];

/// Low-confidence default when no type keyword fires.
const TYPE_OTHER: &str = "other";

/// Vehicle sections for `ppf` and `bodykit` subtypes, most specific
/// phrase first ("door sill" is folded to `doorsill` upstream, so the
/// generic `door` entry cannot shadow it).
const SECTION_RULES: &[(&[&str], &str)] = &[
    (&["doorsill"], "doorsill"),
    (&["headlight", "headlights"], "headlight"),
    (&["taillight", "taillights"], "taillight"),
    (&["bumper"], "bumper"),
    (&["hood"], "hood"),
    (&["fender", "fenders"], "fender"),
    (&["mirror", "mirrors"], "mirror"),
    (&["pillar", "pillars"], "pillar"),
    (&["rocker"], "rocker"),
    (&["spoiler"], "spoiler"),
    (&["diffuser"], "diffuser"),
    (&["splitter"], "splitter"),
    (&["trunk"], "trunk"),
    (&["frunk"], "frunk"),
    (&["door", "doors"], "door"),
];

/// Material keywords, first match wins. For mat-specialist brands the
/// named product lines (kagu, elegant, ...) distinguish otherwise
/// identical listings, so they live here alongside physical materials.
const MATERIAL_RULES: &[&str] = &[
    "carbon",
    "leather",
    "alcantara",
    "wood",
    "matte",
    "gloss",
    "tpe",
    "xpe",
    "rubber",
    "suede",
    "aluminum",
    "chrome",
    "kagu",
    "elegant",
];

/// Generic storefront suffixes stripped from vendor names before they are
/// accepted as brands.
const VENDOR_SUFFIXES: &[&str] = &["official store", "store", "official"];

/// Derive the [`Signature`] for one listing.
///
/// Pure and total; the signature is computed once per listing per run and
/// cached by the engine.
#[must_use]
pub fn extract(listing: &Listing, registry: &BrandRegistry) -> Signature {
    let normalized_title = normalize(&listing.title);
    let tokens: Vec<&str> = normalized_title.split_whitespace().collect();

    let target_model = detect_model(&tokens);
    let variant = detect_variant(&tokens, target_model);
    let product_type = detect_type(&tokens);
    let product_subtype = detect_subtype(product_type, &tokens);
    let material = detect_material(&tokens);
    let brand = detect_brand(listing, &normalized_title, registry);

    Signature {
        normalized_title,
        target_model,
        variant,
        product_type: product_type.to_string(),
        product_subtype: product_subtype.to_string(),
        material,
        brand,
    }
}

fn detect_model(tokens: &[&str]) -> TargetModel {
    MODEL_RULES
        .iter()
        .find(|(keyword, _)| tokens.contains(keyword))
        .map_or(TargetModel::Universal, |&(_, model)| model)
}

fn detect_variant(tokens: &[&str], model: TargetModel) -> VariantTag {
    if let Some(&(_, variant)) = VARIANT_RULES
        .iter()
        .find(|(keyword, _)| tokens.contains(keyword))
    {
        return variant;
    }
    // A bare model year in the refresh window implies the refreshed
    // generation for S/X, where the 2021 interior change broke fitment.
    if matches!(model, TargetModel::ModelS | TargetModel::ModelX)
        && tokens.iter().any(|t| is_refresh_year(t))
    {
        return VariantTag::Refresh;
    }
    VariantTag::None
}

/// Whether `token` is a bare year in 2021–2025.
fn is_refresh_year(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() == 4 && bytes.starts_with(b"202") && (b'1'..=b'5').contains(&bytes[3])
}

fn detect_type(tokens: &[&str]) -> &'static str {
    TYPE_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| tokens.contains(k)))
        .map_or(TYPE_OTHER, |&(_, ty)| ty)
}

fn detect_subtype(product_type: &str, tokens: &[&str]) -> &'static str {
    match product_type {
        "ppf" | "bodykit" => SECTION_RULES
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| tokens.contains(k)))
            .map_or("", |&(_, section)| section),
        "floormat" => detect_floormat_coverage(tokens),
        _ => "",
    }
}

/// Coverage for floor-mat listings: which part of the cabin the set spans.
fn detect_floormat_coverage(tokens: &[&str]) -> &'static str {
    if tokens.contains(&"fullset") {
        return "fullset";
    }
    if tokens.contains(&"cargomat") {
        return "cargo";
    }
    match (tokens.contains(&"front"), tokens.contains(&"rear")) {
        (true, true) => "fullset",
        (true, false) => "front",
        (false, true) => "rear",
        (false, false) => "",
    }
}

fn detect_material(tokens: &[&str]) -> String {
    MATERIAL_RULES
        .iter()
        .find(|m| tokens.contains(*m))
        .map_or_else(String::new, |m| (*m).to_string())
}

/// Brand resolution: prefer the store's vendor field, fall back to
/// scanning the title against the registry.
///
/// The vendor field is accepted only when, after cleanup, at least three
/// characters remain — shorter remnants are storefront noise, not brands.
fn detect_brand(listing: &Listing, normalized_title: &str, registry: &BrandRegistry) -> String {
    if let Some(vendor) = listing.vendor.as_deref() {
        let cleaned = clean_vendor(vendor);
        if cleaned.chars().count() >= 3 {
            return cleaned;
        }
    }
    registry
        .find_in(normalized_title)
        .map_or_else(String::new, ToString::to_string)
}

/// Normalize a raw vendor string: drop the aggregator `col-` prefix,
/// normalize like a title, and strip generic storefront suffixes.
fn clean_vendor(vendor: &str) -> String {
    let lowered = vendor.trim().to_lowercase();
    let without_prefix = lowered.strip_prefix("col-").unwrap_or(&lowered);
    let mut cleaned = normalize(without_prefix);
    for suffix in VENDOR_SUFFIXES {
        if let Some(stripped) = cleaned.strip_suffix(suffix) {
            cleaned = stripped.trim_end().to_string();
        }
    }
    cleaned
}
