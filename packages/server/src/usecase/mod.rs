//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層と Session 管理を操作します。

pub mod announce_presence;
pub mod authenticate_session;
pub mod disconnect_session;
pub mod error;
pub mod join_room;
pub mod leave_room;
pub mod notify_recipient;
pub mod send_message;

pub use announce_presence::AnnouncePresenceUseCase;
pub use authenticate_session::AuthenticateSessionUseCase;
pub use disconnect_session::{DisconnectOutcome, DisconnectSessionUseCase};
pub use error::{HandshakeError, PresenceError, SendMessageError};
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use notify_recipient::{NotificationDelivery, NotifyRecipientUseCase};
pub use send_message::{RelayOutcome, SendMessageUseCase};
