//! Natural ("human friendly") ordering of file names.
//!
//! A name is split into alternating runs of non-digits and digits, always
//! starting with a (possibly empty) text run, so two keys line up run for run:
//! text against text, number against number. Text runs compare case-folded,
//! number runs compare by integer value, and a key that is a prefix of the
//! other sorts first. `img2.png` therefore sorts before `img10.png`.

use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Run<'a> {
    Text(String),
    Number(&'a str),
}

fn runs(name: &str) -> Vec<Run<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits = false;

    for (idx, ch) in name.char_indices() {
        let is_digit = ch.is_ascii_digit();
        if is_digit != in_digits {
            push_run(&mut out, &name[start..idx], in_digits);
            start = idx;
            in_digits = is_digit;
        }
    }
    push_run(&mut out, &name[start..], in_digits);
    out
}

fn push_run<'a>(out: &mut Vec<Run<'a>>, segment: &'a str, digits: bool) {
    if digits {
        out.push(Run::Number(segment));
    } else {
        out.push(Run::Text(segment.to_lowercase()));
    }
}

/// Compare two digit strings by numeric value without parsing, so arbitrarily
/// long runs cannot overflow.
fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn cmp_runs(a: &Run<'_>, b: &Run<'_>) -> Ordering {
    match (a, b) {
        (Run::Text(x), Run::Text(y)) => x.cmp(y),
        (Run::Number(x), Run::Number(y)) => cmp_digits(x, y),
        // Alternation keeps kinds aligned; this arm only guards the match.
        (Run::Text(_), Run::Number(_)) => Ordering::Less,
        (Run::Number(_), Run::Text(_)) => Ordering::Greater,
    }
}

/// Natural comparison of two names.
///
/// Names that are equal under natural ordering (`A.png` / `a.png`,
/// `img01` / `img1`) fall back to plain byte order so the result is a total
/// order and listings are reproducible.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let ra = runs(a);
    let rb = runs(b);

    for (x, y) in ra.iter().zip(rb.iter()) {
        let ord = cmp_runs(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    ra.len().cmp(&rb.len()).then_with(|| a.cmp(b))
}

/// Sort names in place using [`natural_cmp`].
pub fn natural_sort<S: AsRef<str>>(names: &mut [S]) {
    names.sort_by(|a, b| natural_cmp(a.as_ref(), b.as_ref()));
}
