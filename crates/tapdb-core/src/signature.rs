use serde::{Deserialize, Serialize};

/// The vehicle a listing targets, detected from the title.
///
/// Ordering matters: detection scans in declaration order and the
/// clustering engine uses `Ord` for deterministic bucket iteration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TargetModel {
    Model3,
    ModelY,
    ModelS,
    ModelX,
    Cybertruck,
    /// No model keyword found; the listing may fit any vehicle.
    Universal,
}

impl std::fmt::Display for TargetModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetModel::Model3 => write!(f, "model3"),
            TargetModel::ModelY => write!(f, "modely"),
            TargetModel::ModelS => write!(f, "models"),
            TargetModel::ModelX => write!(f, "modelx"),
            TargetModel::Cybertruck => write!(f, "cybertruck"),
            TargetModel::Universal => write!(f, "universal"),
        }
    }
}

/// Hardware-generation marker detected from the title.
///
/// A generation difference changes physical fit, so two listings with
/// conflicting specific variants are never the same product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantTag {
    None,
    Highland,
    Juniper,
    PreRefresh,
    Plaid,
    Refresh,
}

impl std::fmt::Display for VariantTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariantTag::None => write!(f, "none"),
            VariantTag::Highland => write!(f, "highland"),
            VariantTag::Juniper => write!(f, "juniper"),
            VariantTag::PreRefresh => write!(f, "prerefresh"),
            VariantTag::Plaid => write!(f, "plaid"),
            VariantTag::Refresh => write!(f, "refresh"),
        }
    }
}

/// Structured fingerprint derived from one [`crate::Listing`].
///
/// Built once per listing at the start of a matching run and read-only
/// thereafter. String fields use `""` as the "not detected" value;
/// `product_type == "other"` is a low-confidence sentinel that disables
/// aggressive matching for the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub normalized_title: String,
    pub target_model: TargetModel,
    pub variant: VariantTag,
    pub product_type: String,
    pub product_subtype: String,
    pub material: String,
    pub brand: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_model_display_matches_serde_names() {
        for model in [
            TargetModel::Model3,
            TargetModel::ModelY,
            TargetModel::ModelS,
            TargetModel::ModelX,
            TargetModel::Cybertruck,
            TargetModel::Universal,
        ] {
            let json = serde_json::to_string(&model).expect("serialization failed");
            assert_eq!(json, format!("\"{model}\""));
        }
    }

    #[test]
    fn variant_tag_display_matches_serde_names() {
        for variant in [
            VariantTag::None,
            VariantTag::Highland,
            VariantTag::Juniper,
            VariantTag::PreRefresh,
            VariantTag::Plaid,
            VariantTag::Refresh,
        ] {
            let json = serde_json::to_string(&variant).expect("serialization failed");
            assert_eq!(json, format!("\"{variant}\""));
        }
    }

    #[test]
    fn target_model_ordering_follows_detection_priority() {
        assert!(TargetModel::Model3 < TargetModel::ModelY);
        assert!(TargetModel::ModelY < TargetModel::ModelS);
        assert!(TargetModel::Cybertruck < TargetModel::Universal);
    }
}
