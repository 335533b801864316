//! Hand-curated JEL code corrections.
//!
//! These papers were published with code lists that no pattern rule can
//! repair (codes in the wrong field, running text, missing separators). The
//! corrected lists were checked against the full texts and must stay
//! byte-for-byte as they are to reproduce the reference corpus.

/// Corrected JEL code lists keyed by DP number, sorted by DP number.
pub(crate) const MANUAL_JEL_CODES: &[(u32, &[&str])] = &[
    (1359, &["O10", "P2", "J31"]),
    (2139, &["F02", "I12", "J16", "I21"]),
    (3640, &["A20", "C31", "H43", "H75", "I20", "J24", "L26"]),
    (7240, &["L11", "L51", "J8", "L25", "D6"]),
    (8263, &["D1", "D7", "D9"]),
    (8342, &["I20", "I21", "I22"]),
    (9279, &["I10", "I26"]),
    (9577, &["J31", "D86"]),
    (10095, &["O10", "N00"]),
    (11031, &["D00", "G2", "K35"]),
    (11954, &["H00", "J60"]),
    (11982, &["H00", "C93", "I28", "J10", "J24"]),
    (12670, &["I24"]),
    (12870, &["E24", "E62", "J20", "J24", "J31", "J45"]),
    (12897, &["H12", "J13"]),
    (13237, &["H00", "P00"]),
    (14064, &["J00"]),
    (14103, &["J63", "Z22"]),
    (14597, &["I15", "J13", "O15"]),
    (14837, &["C80", "H00", "I10", "J00"]),
    (14883, &["H00"]),
    (14923, &["F01", "P20"]),
    (15194, &["K00", "J71"]),
    (15227, &["J2", "I18", "I38", "H51", "H75"]),
    (15264, &["I15", "J13", "O15", "O47"]),
    (15285, &["O15", "O19", "J24", "F16", "F63"]),
    (15368, &["I18", "J22"]),
    (15387, &["I13", "J22", "J26", "I38", "D64"]),
    (15393, &["I24"]),
    (15399, &["F22", "O15"]),
    (15408, &["J46", "J64", "J68", "O15"]),
    (15419, &["I00"]),
    (15489, &["I18", "J13"]),
    (15509, &["C21", "C45", "C52", "H53", "R23"]),
    (16285, &["I00", "J00"]),
    (16325, &["I26", "J31", "O14", "O33"]),
    (16551, &["D13", "J22", "O13", "O17", "Q53", "Q56"]),
    (16746, &["JO8", "J23", "O47", "O31"]),
    (17026, &["I21", "I22", "J15", "J24", "J61", "J62", "J71"]),
    (17322, &["I32", "J23", "J31", "J42", "R23"]),
    (17355, &["F22", "O12", "Z10"]),
    (17431, &["N00", "O10"]),
    (17463, &["H00", "O10", "N56"]),
    (17490, &["I25", "J10", "O10", "O40", "Z10"]),
    (17610, &["I25", "J24", "O12", "O15"]),
    (17622, &["I20", "I24", "O33"]),
];

/// Look up the corrected code list for a paper.
pub(crate) fn manual_jel_codes(dp_number: u32) -> Option<&'static [&'static str]> {
    MANUAL_JEL_CODES
        .binary_search_by_key(&dp_number, |&(number, _)| number)
        .ok()
        .map(|i| MANUAL_JEL_CODES[i].1)
}
