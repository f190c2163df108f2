//! Typo-tolerant airport ranking
//!
//! Every airport gets a weighted score from its codes, name, municipality
//! and keywords; anything under the caller's minimum is dropped.

use serde::Serialize;
use strsim::jaro_winkler;

use super::airport::Airport;

const ICAO_EXACT: f64 = 100.0;
const ICAO_PREFIX: f64 = 80.0;
const ICAO_FUZZY: f64 = 60.0;
const IATA_EXACT: f64 = 90.0;
const IATA_PREFIX: f64 = 70.0;
const IATA_FUZZY: f64 = 50.0;
const NAME_PREFIX: f64 = 70.0;
const NAME_PARTIAL: f64 = 40.0;
const CITY_PREFIX: f64 = 60.0;
const CITY_PARTIAL: f64 = 30.0;
const KEYWORDS: f64 = 35.0;
const CITY_PHONETIC: f64 = 25.0;
const CODE_PHONETIC: f64 = 20.0;
const TRANSPOSITION: f64 = 40.0;

/// Default cutoff for general fuzzy searches
pub const DEFAULT_MIN_SCORE: f64 = 15.0;

/// Queries shorter than this never match
const MIN_QUERY_LEN: usize = 2;

/// A scored airport and the reasons it matched
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuzzyMatch {
    #[serde(flatten)]
    pub airport: Airport,
    #[serde(rename = "fuzzy_score")]
    pub score: f64,
    pub matches: Vec<String>,
}

impl std::fmt::Display for FuzzyMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:6.1}  {}", self.score, self.airport)
    }
}

/// Score one airport against a query. Returns the total and a
/// description of each contributing match.
pub fn score_airport(airport: &Airport, query: &str) -> (f64, Vec<String>) {
    let query = query.trim().to_lowercase();
    let query_upper = query.to_uppercase();
    let query_len = query.chars().count();
    let mut score = 0.0;
    let mut matches = Vec::new();

    if let Some(icao) = airport.icao_code.as_deref() {
        let icao = icao.to_uppercase();
        if icao == query_upper {
            score += ICAO_EXACT;
            matches.push("ICAO exact match".to_string());
        } else if icao.starts_with(&query_upper) {
            score += ICAO_PREFIX;
            matches.push("ICAO prefix match".to_string());
        } else {
            let similarity = jaro_winkler(&icao, &query_upper);
            if similarity > 0.7 {
                score += ICAO_FUZZY * similarity;
                matches.push(format!("ICAO fuzzy match ({:.1}%)", similarity * 100.0));
            }
        }
    }

    if let Some(iata) = airport.iata_code.as_deref() {
        let iata = iata.to_uppercase();
        if iata == query_upper {
            score += IATA_EXACT;
            matches.push("IATA exact match".to_string());
        } else if iata.starts_with(&query_upper) {
            score += IATA_PREFIX;
            matches.push("IATA prefix match".to_string());
        } else {
            let similarity = jaro_winkler(&iata, &query_upper);
            if similarity > 0.6 {
                score += IATA_FUZZY * similarity;
                matches.push(format!("IATA fuzzy match ({:.1}%)", similarity * 100.0));
            }
        }
    }

    let query_words: Vec<&str> = query.split_whitespace().collect();

    let name = airport.name.to_lowercase();
    if name.contains(&query) {
        if name.starts_with(&query) {
            score += NAME_PREFIX;
            matches.push("Name starts with query".to_string());
        } else {
            score += NAME_PARTIAL;
            matches.push("Name contains query".to_string());
        }
    } else {
        for name_word in name.split_whitespace() {
            for query_word in query_words.iter().filter(|w| w.chars().count() >= 3) {
                let similarity = jaro_winkler(name_word, query_word);
                if similarity > 0.8 {
                    score += NAME_PARTIAL * similarity * 0.5;
                    matches.push(format!("Name word fuzzy match: {:?} ~ {:?}", name_word, query_word));
                }
            }
        }
    }

    if let Some(city) = airport.municipality.as_deref() {
        let (city_score, city_matches) = score_city(&city.to_lowercase(), &query, &query_words);
        score += city_score;
        matches.extend(city_matches);
    }

    if let Some(keywords) = airport.keywords.as_deref() {
        if keywords.to_lowercase().contains(&query) {
            score += KEYWORDS;
            matches.push("Keywords match".to_string());
        }
    }

    if let Some(icao) = airport.icao_code.as_deref() {
        if query_len >= 3 {
            let code = soundex(&query);
            if code == soundex(icao) && code != "0000" {
                score += CODE_PHONETIC;
                matches.push("Phonetic similarity".to_string());
            }
        }
        if query_len == 4 && icao.chars().count() == 4 && is_transposition(&query_upper, icao) {
            score += TRANSPOSITION;
            matches.push("Likely character transposition".to_string());
        }
    }

    (score, matches)
}

fn score_city(city: &str, query: &str, query_words: &[&str]) -> (f64, Vec<String>) {
    let mut score = 0.0;
    let mut matches = Vec::new();

    if city.contains(query) {
        if city.starts_with(query) {
            score += CITY_PREFIX;
            matches.push("City starts with query".to_string());
        } else {
            score += CITY_PARTIAL;
            matches.push("City contains query".to_string());
        }
        return (score, matches);
    }

    // Compound names like "Frankfurt am Main" or "Paris (Roissy)"
    let city_words: Vec<&str> = city
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '-' | '(' | ')'))
        .filter(|w| w.chars().count() >= 3)
        .collect();

    let mut best: Option<(f64, &str, &str)> = None;
    for query_word in query_words.iter().filter(|w| w.chars().count() >= 3) {
        for city_word in &city_words {
            let similarity = jaro_winkler(city_word, query_word);
            if similarity > 0.65 && best.map_or(true, |(s, _, _)| similarity > s) {
                best = Some((similarity, *city_word, *query_word));
            }
        }
    }
    if let Some((similarity, city_word, query_word)) = best {
        score += (CITY_PREFIX * similarity).round();
        matches.push(format!(
            "City fuzzy match: {:?} ~ {:?} ({:.1}%)",
            city_word,
            query_word,
            similarity * 100.0
        ));
    }

    if query.chars().count() >= 4 {
        if let Some(word) = city_words
            .iter()
            .find(|w| w.starts_with(query) || query.starts_with(**w))
        {
            score += (CITY_PARTIAL * 0.8).round();
            matches.push(format!("City partial match: {:?}", word));
        }

        let code = soundex(query);
        if let Some(word) = city_words
            .iter()
            .find(|w| w.chars().count() >= 4 && soundex(w) == code)
        {
            score += CITY_PHONETIC;
            matches.push(format!("City phonetic match: {:?}", word));
        }
    }

    (score, matches)
}

/// Rank `airports` against `query`, keeping those scoring at least
/// `min_score`. Equal scores keep their input order.
pub fn rank(airports: &[Airport], query: &str, limit: usize, min_score: f64) -> Vec<FuzzyMatch> {
    if query.trim().chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }

    let mut ranked: Vec<FuzzyMatch> = airports
        .iter()
        .filter_map(|airport| {
            let (score, matches) = score_airport(airport, query);
            (score >= min_score).then(|| FuzzyMatch {
                airport: airport.clone(),
                score,
                matches,
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(limit);
    ranked
}

/// ICAO codes, then IATA codes, that start with the query
pub fn suggestions(airports: &[Airport], query: &str, limit: usize) -> Vec<String> {
    if query.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }

    let prefix = query.to_uppercase();
    let mut found: Vec<String> = Vec::new();
    for airport in airports {
        if let Some(icao) = airport.icao_code.as_deref() {
            if icao.starts_with(&prefix) && !found.iter().any(|s| s == icao) {
                found.push(icao.to_string());
            }
        }
        if let Some(iata) = airport.iata_code.as_deref() {
            if iata.starts_with(&prefix) && found.len() < limit && !found.iter().any(|s| s == iata) {
                found.push(iata.to_string());
            }
        }
    }

    found.truncate(limit);
    found
}

/// Four-character phonetic code. Vowels and unmapped letters are skipped
/// rather than acting as separators.
fn soundex(s: &str) -> String {
    let upper = s.to_uppercase();
    let mut chars = upper.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    let mut code = String::with_capacity(4);
    code.push(first);
    for c in chars {
        if code.chars().count() >= 4 {
            break;
        }
        let digit = match c {
            'B' | 'F' | 'P' | 'V' => '1',
            'C' | 'G' | 'J' | 'K' | 'Q' | 'S' | 'X' | 'Z' => '2',
            'D' | 'T' => '3',
            'L' => '4',
            'M' | 'N' => '5',
            'R' => '6',
            _ => continue,
        };
        if code.chars().last() != Some(digit) {
            code.push(digit);
        }
    }

    while code.chars().count() < 4 {
        code.push('0');
    }
    code
}

/// True when `a` and `b` differ only by one swapped adjacent pair
fn is_transposition(a: &str, b: &str) -> bool {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len() != b.len() {
        return false;
    }

    let diffs: Vec<usize> = (0..a.len()).filter(|&i| a[i] != b[i]).collect();
    match diffs[..] {
        [i, j] if j == i + 1 => a[i] == b[j] && a[j] == b[i],
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn airport(id: i64, name: &str, city: &str, icao: &str, iata: &str) -> Airport {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Airport {
            id,
            ident: icao.to_string(),
            airport_type: "large_airport".to_string(),
            name: name.to_string(),
            latitude_deg: None,
            longitude_deg: None,
            elevation_ft: None,
            continent: None,
            country_name: None,
            iso_country: None,
            region_name: None,
            iso_region: None,
            local_region: None,
            municipality: opt(city),
            scheduled_service: None,
            gps_code: None,
            icao_code: opt(icao),
            iata_code: opt(iata),
            local_code: None,
            home_link: None,
            wikipedia_link: None,
            keywords: None,
            score: None,
            last_updated: String::new(),
        }
    }

    fn sample() -> Vec<Airport> {
        vec![
            airport(1, "London Heathrow Airport", "London", "EGLL", "LHR"),
            airport(2, "Munich Airport", "Munich", "EDDM", "MUC"),
            airport(3, "Frankfurt am Main Airport", "Frankfurt am Main", "EDDF", "FRA"),
        ]
    }

    #[test]
    fn test_soundex() {
        assert_eq!(soundex("London"), "L535");
        assert_eq!(soundex("londn"), "L535");
        assert_eq!(soundex("EGLL"), "E240");
        assert_eq!(soundex("A"), "A000");
        assert_eq!(soundex(""), "");
    }

    #[test]
    fn test_is_transposition() {
        assert!(is_transposition("ELGL", "EGLL"));
        assert!(!is_transposition("EGLL", "EGLL"));
        assert!(!is_transposition("LGEL", "EGLL"));
        assert!(!is_transposition("EGL", "EGLL"));
    }

    #[test]
    fn test_exact_codes_score_highest() {
        let airports = sample();
        let (icao, _) = score_airport(&airports[0], "egll");
        let (iata, _) = score_airport(&airports[0], "LHR");
        let (other, _) = score_airport(&airports[1], "LHR");
        assert!(icao >= ICAO_EXACT);
        assert!(iata >= IATA_EXACT);
        assert!(other < iata);
    }

    #[test]
    fn test_misspelled_name_ranks_match_first() {
        let ranked = rank(&sample(), "Heathrw", 10, DEFAULT_MIN_SCORE);
        assert_eq!(ranked[0].airport.id, 1);
        assert!(ranked[0].matches.iter().any(|m| m.starts_with("Name word fuzzy match")));
    }

    #[test]
    fn test_transposed_icao() {
        let (score, matches) = score_airport(&sample()[0], "ELGL");
        assert!(score >= TRANSPOSITION);
        assert!(matches.contains(&"Likely character transposition".to_string()));
    }

    #[test]
    fn test_compound_city_word() {
        let (score, matches) = score_airport(&sample()[2], "Frankfrut");
        assert!(score > 0.0);
        assert!(matches.iter().any(|m| m.starts_with("City fuzzy match")));
    }

    #[test]
    fn test_short_query_and_cutoff() {
        assert!(rank(&sample(), "L", 10, 0.0).is_empty());
        assert!(rank(&sample(), "zzzzzz", 10, DEFAULT_MIN_SCORE).is_empty());
        assert_eq!(rank(&sample(), "airport", 2, DEFAULT_MIN_SCORE).len(), 2);
    }

    #[test]
    fn test_suggestions() {
        let airports = sample();
        assert_eq!(suggestions(&airports, "ed", 10), ["EDDM", "EDDF"]);
        assert_eq!(suggestions(&airports, "ED", 1), ["EDDM"]);
        assert_eq!(suggestions(&airports, "MU", 10), ["MUC"]);
        assert!(suggestions(&airports, "E", 10).is_empty());
    }
}
