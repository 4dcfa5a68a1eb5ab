//! Review counts per Steam language, placed at a representative coordinate.

use crate::ingest::CategoryTotal;
use serde::{Deserialize, Serialize};

/// Steam language code → (longitude, latitude) of a representative location.
static LANGUAGE_ANCHORS: &[(&str, (f64, f64))] = &[
    ("english", (-98.35, 39.50)),
    ("french", (2.2137, 46.2276)),
    ("schinese", (104.1954, 35.8617)),
    ("koreana", (127.7669, 35.9078)),
    ("spanish", (-3.7038, 40.4168)),
    ("russian", (37.6173, 55.7558)),
    ("turkish", (35.2433, 39.9208)),
    ("german", (10.4515, 51.1657)),
    ("italian", (12.5674, 41.8719)),
    ("brazilian", (-47.9292, -15.7801)),
    ("portuguese", (-8.2245, 39.3999)),
    ("ukrainian", (30.5234, 50.4501)),
    ("norwegian", (10.7522, 59.9139)),
    ("polish", (19.1451, 51.9194)),
    ("thai", (100.9925, 15.8700)),
    ("finnish", (25.7482, 61.9241)),
    ("japanese", (138.2529, 36.2048)),
    ("czech", (14.4378, 50.0755)),
    ("danish", (12.5683, 55.6761)),
    ("hungarian", (19.0402, 47.4979)),
    ("dutch", (4.9041, 52.3676)),
    ("latam", (-99.1332, 19.4326)),
    ("swedish", (18.0632, 59.3346)),
    ("vietnamese", (106.6602, 10.7626)),
    ("indonesian", (106.8456, -6.2088)),
    ("greek", (23.7275, 37.9838)),
    ("bulgarian", (23.3219, 42.6977)),
];

/// A language bubble on the world map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguagePoint {
    pub language: String,
    pub count: u64,
    pub longitude: f64,
    pub latitude: f64,
}

/// Looks up the anchor coordinate for a Steam language code.
pub fn language_anchor(language: &str) -> Option<(f64, f64)> {
    LANGUAGE_ANCHORS
        .iter()
        .find(|(name, _)| *name == language)
        .map(|(_, coord)| *coord)
}

/// Places each language count on the map. Languages without an anchor are dropped.
pub fn language_points(counts: &[CategoryTotal]) -> Vec<LanguagePoint> {
    counts
        .iter()
        .filter_map(|c| {
            let (longitude, latitude) = language_anchor(&c.category)?;
            Some(LanguagePoint {
                language: c.category.clone(),
                count: c.total as u64,
                longitude,
                latitude,
            })
        })
        .collect()
}
