//! 正規化済みテキストに対するブロックリスト判定

use super::normalizer::normalize;

/// 1 メッセージの判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Block,
}

/// 部分一致ルールの一覧（正規化した形で保持）
#[derive(Debug, Clone, Default)]
pub struct Blocklist {
    rules: Vec<String>,
}

impl Blocklist {
    /// ルールを一度だけ正規化する。
    /// 正規化すると空になるルールは全メッセージに一致してしまうため除外する。
    pub fn new<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized_rules: Vec<String> = Vec::new();
        for rule in rules {
            let normalized = normalize(rule.as_ref());
            if normalized.is_empty() {
                tracing::warn!(
                    "Ignoring blocklist rule '{}': empty after normalization",
                    rule.as_ref()
                );
                continue;
            }
            if !normalized_rules.contains(&normalized) {
                normalized_rules.push(normalized);
            }
        }
        Self {
            rules: normalized_rules,
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 先頭から順に判定し、最初に一致したルールでブロック
    pub fn evaluate(&self, text: &str) -> Verdict {
        let normalized = normalize(text);
        if self.rules.iter().any(|rule| normalized.contains(rule.as_str())) {
            Verdict::Block
        } else {
            Verdict::Allow
        }
    }
}
