//! Domain 層
//!
//! オーバーレイのデータ型とルール、および外側の層が実装する trait
//! （スナップショットストア、Publisher、外部サービス）を定義します。
//! この層では I/O を行いません。

pub mod channel;
pub mod chat;
pub mod collaborator;
pub mod error;
pub mod event;
pub mod moderation;
pub mod normalizer;
pub mod playback;
pub mod publisher;
pub mod repository;
pub mod stats;

pub use channel::{Channel, ChannelSet};
pub use chat::{ChatHistory, ChatMessage, InboundChatEvent};
pub use collaborator::{ChatProvider, LyricsCandidate, LyricsSearch, PlaybackSource, StatsPageFetcher};
pub use error::{ChannelParseError, ChatError, LyricsError, SourceError};
pub use event::{LyricsPayload, OverlayEvent, SlidesPayload, SubtextPayload};
pub use moderation::{Blocklist, Verdict};
pub use normalizer::normalize;
pub use playback::{PlaybackRaw, PlaybackSnapshot, TrackItem, compute_progress};
pub use publisher::OverlayPublisher;
pub use repository::SnapshotStore;
pub use stats::{EmbeddedJsonDelimiters, Segment, StatsSnapshot};
