//! ドメイン層
//!
//! ルーム・セッション・メッセージのドメインモデルと、データアクセス
//! （Registry）およびメッセージ通知（MessagePusher）のインターフェースを
//! 定義します。具体的な実装は Infrastructure 層が提供します。

pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod registry;
pub mod value_object;

pub use entity::{ChatMessage, Participant, Room, Session, MESSAGE_HISTORY_CAPACITY};
pub use error::{DomainError, MessagePushError};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use registry::{RemovedMember, RoomRegistry, RoomSnapshot};
pub use value_object::{ClientId, MessageBody, RoomId, Timestamp, Username, MAX_MESSAGE_CHARS};
