//! Heuristic byte-size estimation for allocation events
//!
//! C-family sizes are derived from the allocation call's argument text;
//! other languages multiply a literal element/size hint by a per-language
//! word size. These are visualization heuristics, not allocator guarantees.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::language::Language;

/// Assumed size of one `new`-allocated scalar object.
pub const DEFAULT_SCALAR_SIZE: u64 = 8;

static INT_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("int literal pattern"));

static SIZEOF_LEFT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<lit>\d+)\s*\*\s*sizeof\s*\(\s*(?P<ty>[^)]*)\)").expect("sizeof-left pattern")
});

static SIZEOF_RIGHT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"sizeof\s*\(\s*(?P<ty>[^)]*)\)\s*\*\s*(?P<lit>\d+)").expect("sizeof-right pattern")
});

/// Estimate the byte size of one allocation.
pub fn estimate(function: &str, raw_args: &str, language: Language) -> u64 {
    if language.is_c_family() {
        estimate_c_family(function, raw_args)
    } else {
        // Element/size hint times the language's unit cost; this models
        // typed vs. untyped unit cost, not a real allocator.
        first_int(raw_args).unwrap_or(1) * language.word_size()
    }
}

fn estimate_c_family(function: &str, raw_args: &str) -> u64 {
    match function {
        "calloc" => {
            // Product of the two operands' literals; a missing literal
            // counts as 1.
            let mut parts = raw_args.splitn(2, ',');
            let count = parts.next().and_then(first_int).unwrap_or(1);
            let elem = parts.next().and_then(first_int).unwrap_or(1);
            count * elem
        }
        "new" => DEFAULT_SCALAR_SIZE,
        "new[]" => first_int(raw_args).unwrap_or(1) * DEFAULT_SCALAR_SIZE,
        _ => {
            if let Some(caps) = SIZEOF_LEFT
                .captures(raw_args)
                .or_else(|| SIZEOF_RIGHT.captures(raw_args))
            {
                let lit: u64 = caps["lit"].parse().unwrap_or(1);
                return lit * type_size(&caps["ty"]);
            }
            first_int(raw_args).unwrap_or(1)
        }
    }
}

/// Fixed sizeof table, resolved by substring match; unknown types
/// default to 4.
fn type_size(ty: &str) -> u64 {
    if ty.contains("char") {
        1
    } else if ty.contains("double") || ty.contains("long long") {
        8
    } else if ty.contains("int") || ty.contains("float") {
        4
    } else {
        4
    }
}

fn first_int(text: &str) -> Option<u64> {
    INT_LITERAL
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}
