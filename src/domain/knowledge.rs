// Agricultural knowledge snippets retrieved into AI prompts
use super::sensor_context::GeminiVariables;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    CropManagement,
    PestControl,
    SoilHealth,
    Weather,
    MarketPrices,
    Fertilizers,
    Irrigation,
}

#[derive(Debug, Clone)]
pub struct KnowledgeDocument {
    pub id: &'static str,
    pub title: &'static str,
    pub content: &'static str,
    pub category: Category,
    pub keywords: &'static [&'static str],
}

pub const KNOWLEDGE_BASE: [KnowledgeDocument; 6] = [
    KnowledgeDocument {
        id: "crop_rotation_1",
        title: "Crop Rotation Best Practices for Indian Agriculture",
        content: "Crop rotation is essential for maintaining soil health. For rice-wheat systems in North India, follow a 3-year rotation: Rice → Wheat → Legumes (like chickpea or lentil). This helps break pest cycles, improves soil nitrogen through legume fixation, and reduces disease pressure. In South India, rice-cotton-sugarcane rotation works well.",
        category: Category::CropManagement,
        keywords: &["crop rotation", "soil health", "rice", "wheat", "legumes", "nitrogen fixation", "pest management"],
    },
    KnowledgeDocument {
        id: "npk_management_1",
        title: "NPK Management for Optimal Crop Growth",
        content: "Nitrogen (N): Essential for leaf growth and chlorophyll. Deficiency shows as yellowing leaves. Apply 120-150 kg/ha for rice, 100-120 kg/ha for wheat. Phosphorus (P): Critical for root development and flowering. Apply 60-80 kg/ha. Potassium (K): Improves disease resistance and water regulation. Apply 40-60 kg/ha. Split application is recommended: 50% at planting, 25% at tillering, 25% at flowering.",
        category: Category::Fertilizers,
        keywords: &["npk", "nitrogen", "phosphorus", "potassium", "fertilizer", "application rates", "split application", "deficiency symptoms"],
    },
    KnowledgeDocument {
        id: "soil_moisture_1",
        title: "Soil Moisture Management Techniques",
        content: "Optimal soil moisture for most crops is 60-80% field capacity. Below 40% indicates water stress. Above 90% can cause root rot and nutrient leaching. Use drip irrigation for 30-40% water savings. Mulching with organic matter reduces evaporation by 25-30%. Monitor soil moisture at 15cm and 30cm depths for better irrigation scheduling.",
        category: Category::Irrigation,
        keywords: &["soil moisture", "irrigation", "field capacity", "water stress", "drip irrigation", "mulching", "evaporation"],
    },
    KnowledgeDocument {
        id: "pest_integrated_1",
        title: "Integrated Pest Management (IPM) Strategies",
        content: "IPM combines biological, cultural, and chemical controls. Use pheromone traps for early pest detection. Encourage beneficial insects like ladybugs and parasitic wasps. Neem-based pesticides are effective against aphids and caterpillars. Rotate pesticide classes to prevent resistance. Economic threshold: treat only when pest population exceeds damage threshold.",
        category: Category::PestControl,
        keywords: &["ipm", "integrated pest management", "biological control", "pheromone traps", "beneficial insects", "neem", "pesticide resistance"],
    },
    KnowledgeDocument {
        id: "weather_monsoon_1",
        title: "Monsoon Weather Patterns and Crop Planning",
        content: "Southwest monsoon (June-September) brings 70-80% of annual rainfall. Plan kharif crops (rice, cotton, sugarcane) during this period. Northeast monsoon (October-December) supports rabi crops (wheat, barley, chickpea). Use weather forecasts for irrigation scheduling. Extreme weather events are increasing - consider climate-resilient varieties.",
        category: Category::Weather,
        keywords: &["monsoon", "kharif", "rabi", "rainfall", "weather forecast", "climate resilient", "seasonal planning"],
    },
    KnowledgeDocument {
        id: "market_prices_1",
        title: "Agricultural Market Price Trends and MSP",
        content: "Minimum Support Price (MSP) provides price security for farmers. Check current MSP rates on government portals. Market prices fluctuate based on supply-demand, weather, and global trends. Use e-NAM platform for better price discovery. Post-harvest storage and value addition can increase farmer income by 15-25%.",
        category: Category::MarketPrices,
        keywords: &["msp", "minimum support price", "market prices", "e-nam", "price discovery", "post-harvest", "value addition"],
    },
];

const STOP_WORDS: [&str; 15] = [
    "the", "is", "at", "which", "on", "and", "or", "but", "in", "with", "to", "for", "of", "as", "by",
];

const CATEGORY_KEYWORDS: [(Category, &[&str]); 7] = [
    (Category::CropManagement, &["crop", "planting", "harvesting", "rotation", "variety"]),
    (Category::PestControl, &["pest", "insect", "disease", "fungus", "spray", "control"]),
    (Category::SoilHealth, &["soil", "ph", "organic", "compost", "erosion"]),
    (Category::Weather, &["weather", "rain", "temperature", "climate", "monsoon"]),
    (Category::MarketPrices, &["price", "market", "sell", "msp", "cost", "profit"]),
    (Category::Fertilizers, &["fertilizer", "npk", "nitrogen", "phosphorus", "potassium", "urea"]),
    (Category::Irrigation, &["water", "irrigation", "moisture", "drip", "sprinkler"]),
];

const SEARCH_TRIGGERS: [&str; 16] = [
    "search", "find", "lookup", "what is", "what are", "tell me about", "current price", "latest",
    "recent", "today", "now", "predict", "forecast", "market rate", "news about", "information on",
];

pub const NO_KNOWLEDGE: &str =
    "No specific agricultural knowledge found for this query. Using general agricultural expertise.";

fn search_terms(query: &str) -> Vec<&str> {
    query
        .split_whitespace()
        .filter(|word| word.chars().count() > 2 && !STOP_WORDS.contains(word))
        .collect()
}

fn category_of(query: &str) -> Category {
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| query.contains(k)))
        .map_or(Category::CropManagement, |(category, _)| *category)
}

fn score(doc: &KnowledgeDocument, query: &str, terms: &[&str], category: Category) -> u32 {
    let mut score = 0;
    if doc.title.to_lowercase().contains(query) {
        score += 10;
    }
    score += 5 * doc.keywords.iter().filter(|k| query.contains(*k)).count() as u32;
    let content = doc.content.to_lowercase();
    score += 2 * terms.iter().filter(|t| content.contains(*t)).count() as u32;
    if doc.category == category {
        score += 3;
    }
    score
}

/// Keyword-scored retrieval over the built-in knowledge base. Documents with
/// a zero score are never returned; ties keep knowledge-base order.
pub fn retrieve(query: &str, max_results: usize) -> Vec<&'static KnowledgeDocument> {
    let query = query.to_lowercase();
    let terms = search_terms(&query);
    let category = category_of(&query);

    let mut scored: Vec<(u32, &'static KnowledgeDocument)> = KNOWLEDGE_BASE
        .iter()
        .map(|doc| (score(doc, &query, &terms, category), doc))
        .filter(|(score, _)| *score > 0)
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().take(max_results).map(|(_, doc)| doc).collect()
}

/// Prompt section built from the top documents for `query`.
pub fn knowledge_context(query: &str, max_results: usize) -> String {
    let docs = retrieve(query, max_results);
    if docs.is_empty() {
        return NO_KNOWLEDGE.to_string();
    }
    let parts: Vec<String> = docs
        .iter()
        .map(|doc| format!("**{}**\n{}\n", doc.title, doc.content))
        .collect();
    format!("AGRICULTURAL KNOWLEDGE CONTEXT:\n{}", parts.join("\n"))
}

pub fn contains_search_triggers(query: &str) -> bool {
    let query = query.to_lowercase();
    SEARCH_TRIGGERS.iter().any(|t| query.contains(t))
}

pub fn moisture_status(moisture: f64) -> &'static str {
    match moisture {
        m if m < 20.0 => "Very Dry - Immediate irrigation needed",
        m if m < 40.0 => "Dry - Irrigation recommended",
        m if m < 60.0 => "Moderate - Monitor closely",
        m if m < 80.0 => "Good - Optimal range",
        _ => "Very Wet - Check drainage",
    }
}

/// Sensor summary with advisory flags, appended to chat prompts.
pub fn sensor_context(vars: &GeminiVariables) -> String {
    let mut context = String::from("CURRENT SENSOR READINGS:\n");
    context.push_str(&format!("Location: {}\n", vars.location_name));
    context.push_str(&format!(
        "Soil Moisture: {}% ({})\n",
        vars.soil_moisture,
        moisture_status(vars.soil_moisture)
    ));
    context.push_str(&format!(
        "NPK Levels: N={}ppm, P={}ppm, K={}ppm\n",
        vars.npk_nitrogen, vars.npk_phosphorus, vars.npk_potassium
    ));
    context.push_str(&format!("Humidity: {}%\n\n", vars.humidity));

    if vars.soil_moisture < 40.0 {
        context.push_str("ALERT: Low soil moisture detected. Consider irrigation.\n");
    }
    if vars.soil_moisture > 80.0 {
        context.push_str("ALERT: High soil moisture detected. Check drainage.\n");
    }
    if vars.npk_average < 50.0 {
        context.push_str("ALERT: Low NPK levels detected. Consider fertilizer application.\n");
    }
    context
}
