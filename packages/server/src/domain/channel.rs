//! 表示クライアントが購読できるチャンネルの定義

use std::{collections::HashSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::error::ChannelParseError;

/// オーバーレイのチャンネル
///
/// 各チャンネルは最新のスナップショットを 1 つだけ持つ。
/// `Chat` のスナップショットは上限付きの履歴で、受理されたメッセージはその差分として配信される。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Playback,
    Lyrics,
    Stats,
    Chat,
    Subtext,
    Slides,
}

impl Channel {
    /// 全チャンネル（キャッチアップの送信順）
    pub const ALL: [Channel; 6] = [
        Channel::Subtext,
        Channel::Slides,
        Channel::Playback,
        Channel::Lyrics,
        Channel::Stats,
        Channel::Chat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Playback => "playback",
            Channel::Lyrics => "lyrics",
            Channel::Stats => "stats",
            Channel::Chat => "chat",
            Channel::Subtext => "subtext",
            Channel::Slides => "slides",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = ChannelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "playback" => Ok(Channel::Playback),
            "lyrics" => Ok(Channel::Lyrics),
            "stats" => Ok(Channel::Stats),
            "chat" => Ok(Channel::Chat),
            "subtext" => Ok(Channel::Subtext),
            "slides" => Ok(Channel::Slides),
            other => Err(ChannelParseError::Unknown(other.to_string())),
        }
    }
}

/// 1 つの購読者が受け取るチャンネルの集合
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSet(HashSet<Channel>);

impl ChannelSet {
    pub fn all() -> Self {
        Self(Channel::ALL.into_iter().collect())
    }

    /// `"playback,chat"` のようなカンマ区切りのリストをパース
    ///
    /// 空のリストは全チャンネルを意味する。`playback` を指定すると歌詞も一緒に届く。
    pub fn parse_list(list: &str) -> Result<Self, ChannelParseError> {
        let mut channels = HashSet::new();
        for name in list.split(',').filter(|name| !name.trim().is_empty()) {
            let channel: Channel = name.parse()?;
            if channel == Channel::Playback {
                channels.insert(Channel::Lyrics);
            }
            channels.insert(channel);
        }

        if channels.is_empty() {
            Ok(Self::all())
        } else {
            Ok(Self(channels))
        }
    }

    pub fn contains(&self, channel: Channel) -> bool {
        self.0.contains(&channel)
    }

    /// 含まれるチャンネル（キャッチアップの送信順）
    pub fn iter(&self) -> impl Iterator<Item = Channel> + '_ {
        Channel::ALL.into_iter().filter(|c| self.0.contains(c))
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_round_trips_through_name() {
        // テスト項目: チャンネル名から Channel に変換できる
        // given (前提条件):

        // when (操作):
        let parsed: Vec<Channel> = Channel::ALL
            .iter()
            .map(|c| c.as_str().parse().unwrap())
            .collect();

        // then (期待する結果):
        assert_eq!(parsed, Channel::ALL.to_vec());
    }

    #[test]
    fn test_unknown_channel_is_rejected() {
        // テスト項目: 未知のチャンネル名はエラーになる
        // given (前提条件):

        // when (操作):
        let result = "weather".parse::<Channel>();

        // then (期待する結果):
        assert!(matches!(result, Err(ChannelParseError::Unknown(name)) if name == "weather"));
    }

    #[test]
    fn test_parse_list_empty_means_all() {
        // テスト項目: 空のリストは全チャンネルを意味する
        // given (前提条件):

        // when (操作):
        let set = ChannelSet::parse_list("").unwrap();

        // then (期待する結果):
        assert_eq!(set, ChannelSet::all());
    }

    #[test]
    fn test_parse_list_playback_implies_lyrics() {
        // テスト項目: playback を購読すると lyrics も購読される
        // given (前提条件):

        // when (操作):
        let set = ChannelSet::parse_list("playback, chat").unwrap();

        // then (期待する結果):
        assert!(set.contains(Channel::Playback));
        assert!(set.contains(Channel::Lyrics));
        assert!(set.contains(Channel::Chat));
        assert!(!set.contains(Channel::Stats));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Channel::Playback, Channel::Lyrics, Channel::Chat]
        );
    }
}
