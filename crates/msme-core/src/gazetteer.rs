//! Static location and sector gazetteers with substring tagging.
//!
//! A [`Gazetteer`] is built once at startup and shared read-only across
//! requests. Matching is plain substring containment against the lowercased
//! query, so `"bengal"` would match inside any longer word that contains it.
//! Every entry that matches is reported, in gazetteer order, with no
//! precedence between overlapping entries (a state and a city within it both
//! match).

use serde::Serialize;

/// Indian states and cities known to the location tagger.
pub const LOCATIONS: &[&str] = &[
    "tamil nadu", "chennai", "madras", "coimbatore", "salem", "tiruchirapalli",
    "maharashtra", "mumbai", "pune", "nagpur", "nashik", "aurangabad",
    "gujarat", "ahmedabad", "surat", "vadodara", "rajkot", "gandhinagar",
    "karnataka", "bangalore", "mysore", "hubli", "mangalore",
    "delhi", "new delhi", "noida", "gurgaon", "faridabad",
    "west bengal", "kolkata", "howrah", "durgapur",
    "rajasthan", "jaipur", "jodhpur", "udaipur", "kota",
    "uttar pradesh", "lucknow", "kanpur", "agra", "varanasi",
    "andhra pradesh", "hyderabad", "visakhapatnam", "vijayawada",
    "telangana", "telengana",
    "kerala", "kochi", "thiruvananthapuram", "kozhikode",
    "punjab", "chandigarh", "ludhiana", "amritsar",
    "haryana", "panipat", "rohtak", "hisar",
    "madhya pradesh", "bhopal", "indore", "gwalior", "jabalpur",
    "odisha", "bhubaneswar", "cuttack", "rourkela",
    "assam", "guwahati", "silchar", "dibrugarh",
    "jammu and kashmir", "srinagar", "jammu",
    "himachal pradesh", "shimla", "dharamshala",
    "uttarakhand", "dehradun", "haridwar", "rishikesh",
    "goa", "panaji", "margao",
    "manipur", "imphal",
    "meghalaya", "shillong",
    "mizoram", "aizawl",
    "nagaland", "kohima",
    "tripura", "agartala",
    "sikkim", "gangtok",
    "arunachal pradesh", "itanagar",
    "chhattisgarh", "raipur", "bilaspur",
    "jharkhand", "ranchi", "jamshedpur", "dhanbad",
    "bihar", "patna", "gaya", "muzaffarpur",
];

/// MSME sector terms known to the sector tagger.
pub const SECTORS: &[&str] = &[
    "manufacturing", "textile", "textiles", "chemical", "chemicals",
    "pharmaceutical", "pharma", "food processing", "food",
    "technology", "tech", "software", "it", "cybersecurity",
    "packaging", "automotive", "auto", "electronics",
    "engineering", "construction", "infrastructure",
    "healthcare", "medical", "biotech", "biotechnology",
    "agriculture", "agri", "farming", "petrochemical",
    "petrochemicals", "oil", "gas", "energy", "power",
    "renewable", "solar", "wind", "mining", "metals",
    "steel", "iron", "aluminum", "copper", "plastic",
    "rubber", "leather", "garments", "apparel", "fashion",
    "furniture", "wood", "paper", "printing", "publishing",
    "tourism", "hospitality", "retail", "wholesale",
    "logistics", "transport", "shipping", "aviation",
    "banking", "finance", "insurance", "real estate",
    "education", "training", "consulting", "services",
];

/// Location and sector signals extracted from a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryTags {
    /// Matched location entries, in gazetteer order.
    pub locations: Vec<String>,
    /// Matched sector entries, in gazetteer order.
    pub sectors: Vec<String>,
}

impl QueryTags {
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty() && self.sectors.is_empty()
    }
}

/// Read-only lists of known location and sector names (all lowercase).
#[derive(Debug, Clone)]
pub struct Gazetteer {
    locations: Vec<String>,
    sectors: Vec<String>,
}

impl Gazetteer {
    /// The built-in Indian location and MSME sector lists.
    pub fn builtin() -> Self {
        Self {
            locations: LOCATIONS.iter().map(|s| s.to_string()).collect(),
            sectors: SECTORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Extend the built-in lists with extra entries.
    ///
    /// Extra entries are lowercased and trimmed; blanks and entries already
    /// present are skipped. New entries are appended after the built-ins.
    pub fn with_extra<L, S>(mut self, locations: L, sectors: S) -> Self
    where
        L: IntoIterator,
        L::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        extend_unique(&mut self.locations, locations);
        extend_unique(&mut self.sectors, sectors);
        self
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn sectors(&self) -> &[String] {
        &self.sectors
    }

    /// Every location entry contained in the lowercased query.
    pub fn match_locations(&self, query: &str) -> Vec<String> {
        substring_matches(&self.locations, query)
    }

    /// Every sector entry contained in the lowercased query.
    pub fn match_sectors(&self, query: &str) -> Vec<String> {
        substring_matches(&self.sectors, query)
    }

    /// Run both taggers over `query`.
    pub fn tag(&self, query: &str) -> QueryTags {
        QueryTags {
            locations: self.match_locations(query),
            sectors: self.match_sectors(query),
        }
    }
}

impl Default for Gazetteer {
    fn default() -> Self {
        Self::builtin()
    }
}

fn extend_unique<I>(list: &mut Vec<String>, extra: I)
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    for entry in extra {
        let entry = entry.as_ref().trim().to_lowercase();
        if !entry.is_empty() && !list.contains(&entry) {
            list.push(entry);
        }
    }
}

fn substring_matches(entries: &[String], query: &str) -> Vec<String> {
    let query_lower = query.to_lowercase();
    entries
        .iter()
        .filter(|entry| query_lower.contains(entry.as_str()))
        .cloned()
        .collect()
}
