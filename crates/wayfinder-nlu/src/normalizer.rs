//! Script-aware place name normalization.
//!
//! Place names that contain Devanagari are transliterated to ITRANS so the
//! geocoder can search them. Anything else is returned untouched, which
//! keeps normalization idempotent: the output never contains Devanagari.

const NUKTA: char = '\u{093C}';
const VIRAMA: char = '\u{094D}';

/// True when `c` falls in the Devanagari block (U+0900..=U+097F).
pub fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c)
}

/// True when any character of `text` is Devanagari.
pub fn contains_devanagari(text: &str) -> bool {
    text.chars().any(is_devanagari)
}

/// Normalize a place name for geocoding.
///
/// Never fails: Latin (or any non-Devanagari) text is returned unchanged.
pub fn normalize_place_name(place_name: &str) -> String {
    if contains_devanagari(place_name) {
        let latin = transliterate_itrans(place_name);
        tracing::debug!(original = %place_name, normalized = %latin, "Transliterated place name");
        latin
    } else {
        place_name.to_string()
    }
}

/// Transliterate Devanagari text to the ITRANS scheme.
///
/// Consonants carry the inherent `a` unless a vowel sign or virama follows.
/// Letters outside classical ITRANS map to their nearest base letter; marks
/// with no Latin form are dropped. Non-Devanagari characters pass through.
pub fn transliterate_itrans(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if let Some(mut base) = consonant(c) {
            let mut next = i + 1;
            if chars.get(next) == Some(&NUKTA) {
                if let Some(nukta) = nukta_form(c) {
                    base = nukta;
                }
                next += 1;
            }
            out.push_str(base);

            match chars.get(next).copied() {
                Some(VIRAMA) => next += 1,
                Some(sign) => match vowel_sign(sign) {
                    Some(vowel) => {
                        out.push_str(vowel);
                        next += 1;
                    }
                    None => out.push('a'),
                },
                None => out.push('a'),
            }
            i = next;
            continue;
        }

        if let Some(vowel) = independent_vowel(c) {
            out.push_str(vowel);
        } else if let Some(vowel) = vowel_sign(c) {
            // Stray vowel sign without a consonant.
            out.push_str(vowel);
        } else if let Some(mark) = other_sign(c) {
            out.push_str(mark);
        } else if let Some(digit) = devanagari_digit(c) {
            out.push(digit);
        } else if is_devanagari(c) {
            // Stray nukta or virama, accent marks, unassigned code points.
        } else {
            out.push(c);
        }
        i += 1;
    }

    out
}

fn consonant(c: char) -> Option<&'static str> {
    let latin = match c {
        'क' => "k",
        'ख' => "kh",
        'ग' => "g",
        'घ' => "gh",
        'ङ' => "~N",
        'च' => "ch",
        'छ' => "Ch",
        'ज' => "j",
        'झ' => "jh",
        'ञ' => "~n",
        'ट' => "T",
        'ठ' => "Th",
        'ड' => "D",
        'ढ' => "Dh",
        'ण' => "N",
        'त' => "t",
        'थ' => "th",
        'द' => "d",
        'ध' => "dh",
        'न' | '\u{0929}' => "n",
        'प' => "p",
        'फ' => "ph",
        'ब' => "b",
        'भ' => "bh",
        'म' => "m",
        'य' => "y",
        'र' | '\u{0931}' => "r",
        'ल' => "l",
        'ळ' => "L",
        '\u{0934}' => "zh",
        'व' => "v",
        'श' => "sh",
        'ष' => "Sh",
        'स' => "s",
        'ह' => "h",
        // Sindhi and Marwari additions.
        '\u{0978}' | '\u{097E}' => "D",
        '\u{0979}' => "zh",
        '\u{097A}' => "y",
        '\u{097B}' => "g",
        '\u{097C}' => "j",
        '\u{097F}' => "b",
        // Precomposed nukta consonants.
        '\u{0958}' => "q",
        '\u{0959}' => "K",
        '\u{095A}' => "G",
        '\u{095B}' => "z",
        '\u{095C}' => ".D",
        '\u{095D}' => ".Dh",
        '\u{095E}' => "f",
        '\u{095F}' => "Y",
        _ => return None,
    };
    Some(latin)
}

/// ITRANS for a base consonant followed by a combining nukta.
fn nukta_form(c: char) -> Option<&'static str> {
    let latin = match c {
        'क' => "q",
        'ख' => "K",
        'ग' => "G",
        'ज' => "z",
        'ड' => ".D",
        'ढ' => ".Dh",
        'फ' => "f",
        'य' => "Y",
        _ => return None,
    };
    Some(latin)
}

fn independent_vowel(c: char) -> Option<&'static str> {
    let latin = match c {
        'अ' | '\u{0904}' | '\u{0972}' => "a",
        'आ' => "A",
        'इ' => "i",
        'ई' => "I",
        'उ' => "u",
        'ऊ' => "U",
        'ऋ' => "RRi",
        'ॠ' => "RRI",
        'ऌ' => "LLi",
        'ॡ' => "LLI",
        'ऍ' | 'ऎ' | 'ए' => "e",
        'ऐ' => "ai",
        'ऑ' | 'ऒ' | 'ओ' => "o",
        'औ' | '\u{0975}' => "au",
        '\u{0973}' | '\u{0974}' => "o",
        '\u{0976}' => "u",
        '\u{0977}' => "U",
        _ => return None,
    };
    Some(latin)
}

fn vowel_sign(c: char) -> Option<&'static str> {
    let latin = match c {
        '\u{093E}' => "A",
        '\u{093F}' => "i",
        '\u{0940}' => "I",
        '\u{0941}' => "u",
        '\u{0942}' => "U",
        '\u{0943}' => "RRi",
        '\u{0944}' => "RRI",
        '\u{0962}' => "LLi",
        '\u{0963}' => "LLI",
        '\u{0945}' | '\u{0946}' | '\u{0947}' => "e",
        '\u{0948}' => "ai",
        '\u{0949}' | '\u{094A}' | '\u{094B}' => "o",
        '\u{094C}' | '\u{094F}' => "au",
        '\u{093A}' | '\u{093B}' => "o",
        '\u{094E}' | '\u{0955}' => "e",
        '\u{0956}' => "u",
        '\u{0957}' => "U",
        _ => return None,
    };
    Some(latin)
}

fn other_sign(c: char) -> Option<&'static str> {
    let latin = match c {
        '\u{0901}' => ".N",
        '\u{0902}' => "M",
        '\u{0903}' => "H",
        '\u{093D}' => ".a",
        '\u{0950}' => "OM",
        '\u{0964}' => "|",
        '\u{0965}' => "||",
        '\u{0970}' => ".",
        _ => return None,
    };
    Some(latin)
}

fn devanagari_digit(c: char) -> Option<char> {
    let offset = (c as u32).checked_sub('\u{0966}' as u32)?;
    if offset < 10 {
        char::from_digit(offset, 10)
    } else {
        None
    }
}
