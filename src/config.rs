use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// DatasetConfig – static descriptor for one indicator dataset
// ---------------------------------------------------------------------------

/// Static descriptor for one marine indicator dataset. The full list is
/// built once at startup by [`builtin_datasets`] and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetConfig {
    /// Stable key identifying the dataset (also used in fallback citations).
    pub key: String,
    /// Human-readable name shown in the UI.
    pub label: String,
    /// CSV resource: file name under the data folder, or an http(s) URL.
    pub csv_resource: String,
    /// JSON resource supplying `subtitle` / `citation`.
    pub metadata_resource: String,
    /// Original CSV header → semantic field name.
    pub columns: BTreeMap<String, String>,
    /// Inclusive year bounds; rows outside are dropped at load time.
    pub min_year: i32,
    pub max_year: i32,
    /// Semantic name of the field plotted by default.
    pub indicator: String,
    /// Axis label for the main indicator.
    pub y_label: String,
    /// Shown until the metadata resource supplies a subtitle.
    pub description: String,
}

impl DatasetConfig {
    #[allow(clippy::too_many_arguments)]
    pub fn new<'a>(
        key: &str,
        label: &str,
        csv_resource: &str,
        columns: impl IntoIterator<Item = (&'a str, &'a str)>,
        (min_year, max_year): (i32, i32),
        indicator: &str,
        y_label: &str,
        description: &str,
    ) -> Self {
        // The metadata resource sits next to the CSV, OWID-style:
        // `<name>.csv` → `<name>.metadata.json`.
        let metadata_resource = format!("{}.metadata.json", csv_resource.trim_end_matches(".csv"));
        DatasetConfig {
            key: key.to_string(),
            label: label.to_string(),
            csv_resource: csv_resource.to_string(),
            metadata_resource,
            columns: columns
                .into_iter()
                .map(|(header, field)| (header.to_string(), field.to_string()))
                .collect(),
            min_year,
            max_year,
            indicator: indicator.to_string(),
            y_label: y_label.to_string(),
            description: description.to_string(),
        }
    }
}

/// The fixed list of SDG 14 datasets the dashboard knows about.
pub fn builtin_datasets() -> Vec<DatasetConfig> {
    vec![
        DatasetConfig::new(
            "marine-protected-areas",
            "Áreas Marinhas Protegidas",
            "marine-protected-areas.csv",
            [("Marine protected areas (% of territorial waters)", "coverage")],
            (1950, 2024),
            "coverage",
            "% Áreas Protegidas",
            "Porcentagem de áreas marinhas protegidas em relação às águas territoriais",
        ),
        DatasetConfig::new(
            "coastal-eutrophication",
            "Eutrofização Costeira",
            "coastal-eutrophication.csv",
            [(
                "14.1.1 - Coastal eutrophication: Total Nitrogen (TN) (kilograms of nitrogen from algae biomass per sq. km. of river basin area per day) - EN_MAR_TN",
                "nitrogen",
            )],
            (2005, 2024),
            "nitrogen",
            "Nitrogênio (kg/km²/dia)",
            "Níveis de nitrogênio que indicam eutrofização costeira",
        ),
        DatasetConfig::new(
            "ocean-acidification",
            "Acidificação dos Oceanos",
            "ocean-acidification.csv",
            [(
                "14.3.1 - Average marine acidity (pH) measured at agreed representative sampling stations - EN_MAR_OACID",
                "ph",
            )],
            (1985, 2024),
            "ph",
            "pH médio",
            "Medição da acidez média dos oceanos",
        ),
        DatasetConfig::new(
            "ocean-health-index",
            "Índice de Saúde dos Oceanos (OHI)",
            "ocean-health-index.csv",
            [("Ocean Health Index (score)", "ohi_score")],
            (2012, 2024),
            "ohi_score",
            "Pontuação OHI",
            "Índice de saúde dos oceanos (0-100)",
        ),
        DatasetConfig::new(
            "illegal-fishing",
            "Combate à Pesca Ilegal",
            "regulation-illegal-fishing.csv",
            [(
                "14.6.1 - Progress by countries in the degree of implementation of international instruments aiming to combat illegal, unreported and unregulated fishing (level of implementation: 1 lowest to 5 highest) - ER_REG_UNFCIM",
                "implementation",
            )],
            (2018, 2024),
            "implementation",
            "Nível de Implementação",
            "Progresso na implementação de instrumentos contra pesca ilegal",
        ),
    ]
}
