//! Regex patterns for structural drawing callouts.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Wide-flange beam designation: W<depth>X<weight>, e.g. W12X26
    pub static ref BEAM_LABEL: Regex = Regex::new(
        r"(?i)(W[0-9]+X[0-9]+)"
    ).unwrap();

    // Stud counts enclosed in square brackets: [12], [ 12 ]
    pub static ref COUNT_SQUARE: Regex = Regex::new(
        r"\[\s*([0-9]+)\s*\]"
    ).unwrap();

    // Stud counts enclosed in parentheses or square brackets
    pub static ref COUNT_ANY: Regex = Regex::new(
        r"[\(\[]\s*([0-9]+)\s*[\)\]]"
    ).unwrap();

    // Beam label followed directly by its count: W12X14[10]
    pub static ref LABELED_SQUARE: Regex = Regex::new(
        r"(?i)(W[0-9]+X[0-9]+)\s*\[\s*([0-9]+)\s*\]"
    ).unwrap();

    // Beam label followed directly by its count: W12X14(10), W12X14 [10]
    pub static ref LABELED_ANY: Regex = Regex::new(
        r"(?i)(W[0-9]+X[0-9]+)\s*[\(\[]\s*([0-9]+)\s*[\)\]]"
    ).unwrap();

    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}
