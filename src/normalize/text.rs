//! Text folding shared by marker matching and column resolution.
//!
//! Government exports mix encodings, casing and accents freely ("PÚBLICO",
//! "Publico", "PÃºblico"). Everything that compares free text goes through
//! `fold` first so a single configured token covers all of those spellings.

/// Undo the common "UTF-8 read as Latin-1" corruption and drop replacement chars.
///
/// Only attempted when the text shows the telltale `Ã`/`Â` lead characters and
/// every char fits in a single Latin-1 byte; otherwise the input is returned as is.
pub fn repair_mojibake(text: &str) -> String {
    let mut out = text.to_string();
    if out.contains('Ã') || out.contains('Â') {
        let bytes: Option<Vec<u8>> = out
            .chars()
            .map(|c| u8::try_from(u32::from(c)).ok())
            .collect();
        if let Some(repaired) = bytes.and_then(|b| String::from_utf8(b).ok()) {
            out = repaired;
        }
    }
    if out.contains('\u{FFFD}') {
        out = out.replace('\u{FFFD}', "");
    }
    out
}

/// Fold text for substring matching: mojibake repair, lowercase, diacritics
/// stripped to their base letter, whitespace removed.
pub fn fold(text: &str) -> String {
    repair_mojibake(text)
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .map(strip_diacritic)
        .collect()
}

/// Normalize a column name for lookups: folded, alphanumerics only.
///
/// `"Código OACI"`, `"codigo_oaci"` and `"CODIGO-OACI"` all become `"codigooaci"`.
/// Also strips the BOM some spreadsheet tools put in front of the first header.
pub fn normalize_name(name: &str) -> String {
    fold(name.trim_start_matches('\u{feff}'))
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Levenshtein edit distance over chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0usize; b_chars.len() + 1];
    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_chars.len()]
}

fn strip_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}
