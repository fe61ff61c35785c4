//! Romanization for display: stored value first, else tone-marked pinyin for Chinese.
//!
//! Example:
//!   输入: "学而不思则罔"
//!   输出: "xué ér bù sī zé wǎng"
use pinyin::ToPinyin;

use crate::domain::{Content, LanguageCode};

pub fn romanization_for(content: &Content) -> Option<String> {
    if let Some(r) = content.romanization.as_ref().filter(|r| !r.trim().is_empty()) {
        return Some(r.clone());
    }
    match content.language {
        LanguageCode::Zh => Some(to_pinyin_diacritics(&content.text)),
        _ => None,
    }
}

/// Convert Chinese text into Hanyu Pinyin with tone diacritics, space-separated.
/// Non-Chinese characters are copied as-is. Per-character, so polyphonic
/// characters use their default reading.
pub fn to_pinyin_diacritics(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let mut last_was_hanzi = false;

    for ch in text.chars() {
        if let Some(py) = ch.to_pinyin() {
            if last_was_hanzi {
                out.push(' ');
            }
            out.push_str(py.with_tone());
            last_was_hanzi = true;
        } else {
            out.push(ch);
            last_was_hanzi = false;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeds::test_content;

    #[test]
    fn chinese_text_gets_pinyin() {
        assert_eq!(to_pinyin_diacritics("你好!"), "nǐ hǎo!");
        let mut c = test_content("zh", 1.0);
        c.language = LanguageCode::Zh;
        c.text = "中国".into();
        assert_eq!(romanization_for(&c).as_deref(), Some("zhōng guó"));
    }

    #[test]
    fn stored_value_wins_and_other_languages_have_none() {
        let mut c = test_content("ja", 1.0);
        assert_eq!(romanization_for(&c), None);
        c.romanization = Some("nana korobi".into());
        assert_eq!(romanization_for(&c).as_deref(), Some("nana korobi"));
    }
}
