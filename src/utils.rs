// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Utility functions for string processing.

#[cfg(feature = "unicode-normalization")]
use unicode_normalization::UnicodeNormalization;

/// Normalize a name for comparison: fold diacritics and punctuation, lowercase, trim.
///
/// The same function runs at index time and at query time, so substring checks
/// on the normalized forms are meaningful:
/// - "Grey's Anatomy" → "greys anatomy"
/// - "Marvel's Agents of S.H.I.E.L.D." → "marvels agents of s h i e l d"
/// - "Amélie" → "amelie"
/// - "Law & Order: SVU" → "law order svu"
///
/// # Algorithm (with unicode-normalization feature)
///
/// 1. NFD normalize and drop combining marks
/// 2. Remove apostrophes, so possessives stay one word
/// 3. Collapse every run of punctuation, symbols and whitespace into one space
/// 4. Lowercase and trim
///
/// Without the feature step 1 is skipped; input is assumed to be pre-normalized.
pub fn normalize(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_space = false;

    for c in fold_marks(value) {
        if is_apostrophe(c) {
            continue;
        }
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(c.to_lowercase());
        } else {
            pending_space = true;
        }
    }

    out
}

#[cfg(feature = "unicode-normalization")]
fn fold_marks(value: &str) -> impl Iterator<Item = char> + '_ {
    value.nfd().filter(|c| !is_combining_mark(*c))
}

#[cfg(not(feature = "unicode-normalization"))]
fn fold_marks(value: &str) -> impl Iterator<Item = char> + '_ {
    value.chars()
}

fn is_apostrophe(c: char) -> bool {
    matches!(c, '\'' | '`' | '´' | '‘' | '’' | 'ʻ')
}

/// Check if a character is a combining mark (diacritic).
///
/// Combining marks have Unicode category "Mn" (Mark, Nonspacing).
#[cfg(feature = "unicode-normalization")]
fn is_combining_mark(c: char) -> bool {
    matches!(c,
        '\u{0300}'..='\u{036F}' |  // Combining Diacritical Marks
        '\u{1AB0}'..='\u{1AFF}' |  // Combining Diacritical Marks Extended
        '\u{1DC0}'..='\u{1DFF}' |  // Combining Diacritical Marks Supplement
        '\u{20D0}'..='\u{20FF}' |  // Combining Diacritical Marks for Symbols
        '\u{FE20}'..='\u{FE2F}'    // Combining Half Marks
    )
}
