//! Matrix and method paragraphs for the narrative. Keyword matching only;
//! these strings never feed classification.

const HARD_ROCK: &[&str] = &[
    "rock", "rocks", "hardrock", "hard rock", "core", "grab", "float", "chip",
];
const SOIL: &[&str] = &[
    "soil",
    "soils",
    "soil sample",
    "b horizon",
    "c horizon",
    "ah horizon",
];
const ORGANIC_SOIL: &[&str] = &["organic soil", "peat", "humus", "ah", "o/a", "o horizon"];
const TILL: &[&str] = &["till", "glacial till", "till sample", "basal till"];
const VEGETATION: &[&str] = &["vegetation", "plant", "veg", "leaf", "needle"];
const TALUS: &[&str] = &["talus fines", "talus", "colluvium"];
const STREAM_SEDIMENT: &[&str] = &["stream sediment", "sediment", "fluvial", "ss", "stream sed"];
const LAKE_SEDIMENT: &[&str] = &["lake sediment", "lacustrine"];
const MIXED: &[&str] = &["mixed", "unknown", "various", "composite"];

pub fn matrix_context(matrix_type: Option<&str>) -> String {
    let raw = matrix_type.map(str::trim).filter(|m| !m.is_empty());
    let m = raw.unwrap_or("unknown").to_ascii_lowercase();
    let m = m.as_str();

    let text = if HARD_ROCK.contains(&m) {
        "Duplicate precision in hard-rock material is usually reliable; elevated RPD values \
         point to subsampling variability or the analytical precision limit."
    } else if SOIL.contains(&m) {
        "These samples are soils, whose clay content, organics and oxide coatings vary. \
         Moderate duplicate variability is common, especially for elements sensitive to \
         adsorption or partial digestion."
    } else if ORGANIC_SOIL.contains(&m) {
        "Organic-rich soils often show elevated duplicate variability from heterogeneous \
         organic content and uneven digestion efficiency."
    } else if TILL.contains(&m) {
        "Glacial till is inherently heterogeneous; duplicate RPD values may be elevated by \
         grain-size and mineralogical variability."
    } else if VEGETATION.contains(&m) {
        "Vegetation samples often show elevated duplicate variability from heterogeneous \
         organic content and incomplete digestion of resistant tissue."
    } else if TALUS.contains(&m) {
        "Talus fines commonly show moderate duplicate variability from mixed lithologies \
         and variable weathering products."
    } else if STREAM_SEDIMENT.contains(&m) {
        "Stream sediments are sorted hydraulically; duplicate RPD values may be elevated for \
         elements held in minor mineral phases."
    } else if LAKE_SEDIMENT.contains(&m) {
        "Lake sediments carry fine clays and organics, which can affect duplicate precision \
         through natural compositional variability."
    } else if MIXED.contains(&m) {
        "These samples represent a mixed or unspecified matrix. Read duplicate precision with \
         matrix-specific heterogeneity and digestion behaviour in mind."
    } else {
        return format!(
            "Duplicate precision for samples classified as '{}' should be read with \
             matrix-specific heterogeneity and digestion behaviour in mind.",
            raw.unwrap_or("unknown")
        );
    };
    text.to_string()
}

fn is_aqua_regia_icpms(m: &str) -> bool {
    ["AR-ICPMS", "AR ICPMS", "AR-MS", "AR MS", "ARMS"]
        .iter()
        .any(|k| m.contains(k))
        || (m.contains("AR") && m.contains("ICP") && m.contains("MS") && !m.contains("OES"))
}

pub fn method_context(method_code: Option<&str>) -> String {
    let raw = method_code.map(str::trim).filter(|m| !m.is_empty());
    let Some(code) = raw else {
        return "No analytical method code was supplied; method-specific digestion and \
                detection behaviour is not described."
            .to_string();
    };
    let m = code.to_ascii_uppercase();

    let text = if is_aqua_regia_icpms(&m) {
        "Aqua regia digestion (HCl-HNO3) with ICP-MS detection gives high sensitivity for \
         trace elements. The digestion dissolves sulfides, carbonates and other labile hosts \
         but does not fully decompose silicates or refractory phases such as zircon, chromite, \
         barite or monazite, so elements hosted in resistant minerals may under-recover. \
         ICP-MS offers low detection limits but is exposed to matrix-dependent polyatomic \
         interferences. Precision is typically 5-10% RSD at 10x the detection limit or more."
    } else if m.contains("AR-ICPOES")
        || m.contains("AR ICP-OES")
        || (m.contains("AR") && m.contains("ICP-OES"))
    {
        "Aqua regia digestion (HCl-HNO3) with ICP-OES detection suits major, minor and some \
         trace elements. Sulfides and labile phases dissolve; silicates and refractory \
         minerals do not fully break down. ICP-OES is more robust than ICP-MS in high-TDS \
         matrices but has higher detection limits. Precision is commonly a few to about 10% \
         RSD at 10x the detection limit or more."
    } else if ["4A", "4-ACID", "4ACID", "4AC"].iter().any(|k| m.contains(k)) {
        "Four-acid digestion (HF-HClO4-HNO3-HCl) is a near-total decomposition that breaks \
         down most silicate, oxide and sulfide minerals. Highly refractory phases (zircon, \
         chromite, barite) may remain partly undissolved, and some elements (As, Sb, Cr, U, \
         Au) can be lost to volatilisation. Precision is typically a few to about 10% RSD \
         above roughly 10x the detection limit."
    } else if m.contains("FA-AAS") {
        "Fire assay with AAS finish gives high accuracy for Au and, in some methods, PGEs. \
         Routine precision is a few to about 10% RSD, with greater variability near the \
         detection limit."
    } else if ["FA-ICP", "FA ICP", "FA-ICPMS", "FA-ICPOES"]
        .iter()
        .any(|k| m.contains(k))
    {
        "Fire assay with ICP-MS or ICP-OES finish collects precious metals effectively and \
         offers lower detection limits and a wider dynamic range than AAS. Precision is \
         typically a few to about 10% RSD for Au above the practical detection limit, with \
         more variability at low grade or in difficult matrices."
    } else if m.contains("PHOTON") {
        "Photon Assay is a non-destructive high-energy X-ray activation technique used mainly \
         for gold. No digestion is involved, so matrix effects are minimal; coarse gold, \
         nugget effects and sample heterogeneity dominate precision."
    } else if m.contains("INAA") {
        "Instrumental Neutron Activation Analysis is digestion-free with high potential \
         accuracy for many lithophile and siderophile elements. Precision depends mainly on \
         neutron flux and counting statistics; duplicate variability often reflects \
         mineralogical heterogeneity rather than analytical error."
    } else {
        return format!(
            "The {code} method was used. Interpret results with digestion completeness, \
             matrix effects and concentration-dependent precision in mind."
        );
    };
    text.to_string()
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/context.rs"]
mod tests;
