//! Location lookup contract and option derivation.

/// HTTP implementation backed by the two public geographic APIs.
pub mod http;

use async_trait::async_trait;
use hashbrown::HashSet;
use serde::Deserialize;

/// One entry from the states-by-country lookup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StateEntry {
    /// State name, as reported by the provider.
    pub name: String,
}

/// Raw post-office record from the pincode provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostOffice {
    /// Post office name.
    #[serde(rename = "Name", default)]
    pub name: String,
    /// Administrative block; the provider reports `"NA"` when unknown.
    #[serde(rename = "Block", default)]
    pub block: String,
    /// District the post office belongs to.
    #[serde(rename = "District", default)]
    pub district: String,
    /// Postal pincode.
    #[serde(rename = "Pincode")]
    pub pincode: String,
}

/// Deduplicated, display-ready pincode choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PincodeOption {
    /// Display label: `"<name> • <block-or-district> — <pincode>"`.
    pub label: String,
    /// Selected value: the bare pincode.
    pub value: String,
}

/// Uniform async contract over the three remote lookups.
///
/// Every method degrades to an empty list on transport or provider
/// failure; callers cannot distinguish "no results" from "lookup failed".
#[async_trait]
pub trait LocationClient: Send + Sync {
    /// States for `country`, in provider order.
    async fn list_states(&self, country: &str) -> Vec<StateEntry>;

    /// District names for `state` within `country`, in provider order.
    async fn list_districts(&self, country: &str, state: &str) -> Vec<String>;

    /// Raw post-office records for `district`.
    async fn list_post_offices(&self, district: &str) -> Vec<PostOffice>;
}

/// Reduces raw post-office records to unique, label-sorted pincode options.
///
/// The label joins the trimmed post-office name and block (district when
/// the block is empty or `"NA"`) with `" • "`, then appends `" — <pincode>"`;
/// with no surviving place parts the label is the bare pincode. Records
/// collapsing to the same label keep the first occurrence.
pub fn build_pincode_options(raw: &[PostOffice]) -> Vec<PincodeOption> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for po in raw {
        let block = if po.block.is_empty() || po.block == "NA" {
            po.district.as_str()
        } else {
            po.block.as_str()
        };

        let mut place = String::new();
        for part in [po.name.trim(), block.trim()] {
            if part.is_empty() {
                continue;
            }
            if !place.is_empty() {
                place.push_str(" • ");
            }
            place.push_str(part);
        }

        let label = if place.is_empty() {
            po.pincode.clone()
        } else {
            format!("{place} — {}", po.pincode)
        };

        if seen.insert(label.clone()) {
            out.push(PincodeOption {
                label,
                value: po.pincode.clone(),
            });
        }
    }

    out.sort_by(|a, b| a.label.cmp(&b.label));
    out
}
