//! ブロックリスト照合用のテキスト正規化

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// 見た目を変えずに単語を分割できる文字
const INVISIBLE_CHARS: &[char] = &[
    ' ', '\t', '\n', '\r',
    '\u{00AD}', // soft hyphen
    '\u{180E}', // mongolian vowel separator
    '\u{200B}', // zero width space
    '\u{200C}', // zero width non-joiner
    '\u{200D}', // zero width joiner
    '\u{200E}', // left-to-right mark
    '\u{200F}', // right-to-left mark
    '\u{2060}', // word joiner
    '\u{2061}', '\u{2062}', '\u{2063}', '\u{2064}', // invisible operators
    '\u{FEFF}', // zero width no-break space
];

/// 部分一致用に `text` を正規化
///
/// 互換分解（NFKD）のあと結合文字と不可視文字を除き、ASCII 以外を捨てて小文字化する。
/// 失敗はしない（最悪でも空文字列を返す）。
pub fn normalize(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| !INVISIBLE_CHARS.contains(c))
        .filter(char::is_ascii)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
